//! Nested (child) transaction support.
//!
//! A child transaction shares its parent's write lock and page allocator —
//! there is only ever one writer — so "nesting" here means the parent's
//! mutable state (dirty pages, freelist, next-page cursor, db descriptors) is
//! checkpointed when the child begins and either kept (`commit`, a `txn_merge`
//! that's a no-op in this single-writer design since the child already wrote
//! straight into the shared state) or restored (`abort`, discarding every
//! write made since `begin_nested`).

use crate::error::Result;
use crate::freelist::FreeList;
use crate::meta::DbInfo;
use crate::txn::{DirtyPages, Transaction, Write};
use std::collections::HashMap;

/// Snapshot of everything a child transaction can mutate, taken at
/// `begin_nested` and restored wholesale on `abort`.
struct Checkpoint {
    dirty: DirtyPages,
    freelist: FreeList,
    next_pgno: crate::error::PageId,
    databases: HashMap<Option<String>, DbInfo>,
}

/// A nested write transaction borrowing its parent's write lock.
///
/// Only one level of nesting is exercised by this crate's test suite, but
/// `begin_nested` may be called again on the parent once this child has been
/// committed or aborted, and there is no structural limit on chain depth.
pub struct NestedTransaction<'env, 'parent> {
    parent: &'parent mut Transaction<'env, Write>,
    checkpoint: Option<Checkpoint>,
}

impl<'env, 'parent> std::fmt::Debug for NestedTransaction<'env, 'parent> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NestedTransaction").field("live", &self.checkpoint.is_some()).finish()
    }
}

impl<'env, 'parent> NestedTransaction<'env, 'parent> {
    pub(crate) fn new(parent: &'parent mut Transaction<'env, Write>) -> Result<Self> {
        let checkpoint = parent.checkpoint_write_state();
        Ok(Self { parent, checkpoint: Some(checkpoint) })
    }

    /// Borrow the parent transaction to issue reads/writes while the child is
    /// open. Writes land directly in the parent's dirty set; `abort` is what
    /// makes them invisible again.
    pub fn txn(&mut self) -> &mut Transaction<'env, Write> {
        self.parent
    }

    /// Merge the child's changes into the parent (`txn_merge`). Since the
    /// child operated directly on the parent's shared dirty/freelist/db
    /// state, there is nothing left to fold in — the checkpoint is simply
    /// dropped without being applied.
    pub fn commit(mut self) -> Result<()> {
        self.checkpoint = None;
        Ok(())
    }

    /// Roll the parent back to the state it had when this child began,
    /// discarding every dirty page, freelist change, and db-descriptor update
    /// made since.
    pub fn abort(mut self) {
        if let Some(checkpoint) = self.checkpoint.take() {
            self.parent.restore_write_state(checkpoint);
        }
    }
}

impl<'env, 'parent> Drop for NestedTransaction<'env, 'parent> {
    fn drop(&mut self) {
        if let Some(checkpoint) = self.checkpoint.take() {
            self.parent.restore_write_state(checkpoint);
        }
    }
}

/// Extension trait for `Transaction` to support nested transactions.
pub trait NestedTransactionExt<'env> {
    /// Begin a nested (child) write transaction.
    fn begin_nested(&mut self) -> Result<NestedTransaction<'env, '_>>;
}

impl<'env> NestedTransactionExt<'env> for Transaction<'env, Write> {
    fn begin_nested(&mut self) -> Result<NestedTransaction<'env, '_>> {
        NestedTransaction::new(self)
    }
}

impl<'env> Transaction<'env, Write> {
    fn checkpoint_write_state(&self) -> Checkpoint {
        match &self.mode_data {
            crate::txn::ModeData::Write { dirty, freelist, next_pgno, .. } => Checkpoint {
                dirty: (**dirty).clone(),
                freelist: freelist.clone(),
                next_pgno: *next_pgno,
                databases: self.data.databases.clone(),
            },
            crate::txn::ModeData::Read { .. } => unreachable!("nested transactions only nest under write transactions"),
        }
    }

    fn restore_write_state(&mut self, checkpoint: Checkpoint) {
        if let crate::txn::ModeData::Write { dirty, freelist, next_pgno, nest_epoch, .. } =
            &mut self.mode_data
        {
            **dirty = checkpoint.dirty;
            *freelist = checkpoint.freelist;
            *next_pgno = checkpoint.next_pgno;
            // Any cursor positioned on a page this rollback discards must reseek.
            nest_epoch.set(nest_epoch.get() + 1);
        }
        self.data.databases = checkpoint.databases;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::EnvBuilder;
    use crate::db::Database;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn abort_discards_child_writes() {
        let dir = TempDir::new().unwrap();
        let env = Arc::new(EnvBuilder::new().open(dir.path()).unwrap());
        let db: Database = Database::open(&env, None, crate::db::DatabaseFlags::empty()).unwrap();

        let mut parent_txn = env.write_txn().unwrap();
        db.put(&mut parent_txn, b"outer".to_vec(), b"1".to_vec()).unwrap();

        {
            let mut child = parent_txn.begin_nested().unwrap();
            let txn = child.txn();
            db.put(txn, b"inner".to_vec(), b"2".to_vec()).unwrap();
            child.abort();
        }

        assert_eq!(db.get(&parent_txn, &b"outer".to_vec()).unwrap(), Some(b"1".to_vec()));
        assert_eq!(db.get(&parent_txn, &b"inner".to_vec()).unwrap(), None);

        parent_txn.commit().unwrap();
    }

    #[test]
    fn commit_keeps_child_writes() {
        let dir = TempDir::new().unwrap();
        let env = Arc::new(EnvBuilder::new().open(dir.path()).unwrap());
        let db: Database = Database::open(&env, None, crate::db::DatabaseFlags::empty()).unwrap();

        let mut parent_txn = env.write_txn().unwrap();
        {
            let mut child = parent_txn.begin_nested().unwrap();
            let txn = child.txn();
            db.put(txn, b"inner".to_vec(), b"2".to_vec()).unwrap();
            child.commit().unwrap();
        }

        assert_eq!(db.get(&parent_txn, &b"inner".to_vec()).unwrap(), Some(b"2".to_vec()));

        parent_txn.commit().unwrap();
    }
}
