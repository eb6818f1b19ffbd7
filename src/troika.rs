//! Meta-troika: election of the recent and steady meta-page among the three candidates.
//!
//! Generalizes the two-way "highest txnid wins" comparison that used to live in
//! `EnvInner::meta()` to the three fixed meta-page slots (pgno 0, 1, 2).

use crate::meta::MetaPage;

/// Index of one of the three meta-page slots.
pub type MetaIndex = usize;

/// Result of `tap()`: which slot is newest, which is newest-and-durable, and which
/// is safe to overwrite on the next commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Troika {
    /// Index of the meta with the highest valid txnid.
    pub recent: MetaIndex,
    /// Index of the highest-txnid meta that is also steady (synced).
    pub prefer_steady: MetaIndex,
    /// Index of the meta that will be overwritten by the next commit.
    pub tail: MetaIndex,
    /// Per-slot steady bit, indexed the same as the meta array.
    pub steady: [bool; 3],
}

/// A meta is "better than" another if its txnid is strictly greater, or txnids are
/// equal and it is steady while the other is not.
fn better(a_txnid: u64, a_valid: bool, a_steady: bool, b_txnid: u64, b_valid: bool, b_steady: bool) -> bool {
    if !a_valid {
        return false;
    }
    if !b_valid {
        return true;
    }
    match a_txnid.cmp(&b_txnid) {
        std::cmp::Ordering::Greater => true,
        std::cmp::Ordering::Less => false,
        std::cmp::Ordering::Equal => a_steady && !b_steady,
    }
}

/// Read the three meta-pages and elect `recent`, `prefer_steady` and `tail`.
///
/// A meta whose two txnid copies (`txnid_a`/`txnid_b`) disagree is treated as txnid 0
/// and not steady — it is mid-write from a crashed commit.
pub fn tap(metas: &[MetaPage; 3]) -> Troika {
    let valid: [bool; 3] = std::array::from_fn(|i| metas[i].txnid_consistent());
    let txnid: [u64; 3] = std::array::from_fn(|i| if valid[i] { metas[i].txnid_a } else { 0 });
    let steady: [bool; 3] = std::array::from_fn(|i| valid[i] && metas[i].is_steady());

    let mut recent = 0;
    let mut prefer_steady = 0;
    for i in 1..3 {
        if better(txnid[i], valid[i], steady[i], txnid[recent], valid[recent], steady[recent]) {
            recent = i;
        }
    }
    for i in 0..3 {
        if steady[i]
            && (!steady[prefer_steady]
                || better(txnid[i], valid[i], steady[i], txnid[prefer_steady], valid[prefer_steady], steady[prefer_steady]))
        {
            prefer_steady = i;
        }
    }
    if !steady.iter().any(|&s| s) {
        prefer_steady = recent;
    }

    // tail: the slot that is neither `recent` nor `prefer_steady`; if those two
    // coincide, the tail is the worse of the two remaining indices.
    let tail = (0..3)
        .filter(|&i| i != recent)
        .min_by(|&a, &b| {
            let a_better = better(txnid[a], valid[a], steady[a], txnid[b], valid[b], steady[b]);
            if a == prefer_steady && b != prefer_steady {
                std::cmp::Ordering::Greater
            } else if b == prefer_steady && a != prefer_steady {
                std::cmp::Ordering::Less
            } else if a_better {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Less
            }
        })
        .unwrap_or((recent + 1) % 3);

    Troika { recent, prefer_steady, tail, steady }
}

/// Re-tap and compare; `true` means a concurrent commit raced the snapshot and the
/// caller should redo whatever read it was doing under the old troika.
pub fn should_retry(old: &Troika, metas: &[MetaPage; 3]) -> bool {
    tap(metas) != *old
}
