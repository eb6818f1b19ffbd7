//! Transaction management with compile-time safety

use parking_lot::MutexGuard;
use std::cell::Cell;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::rc::Rc;
use std::sync::atomic::Ordering;
use std::sync::{RwLockReadGuard, RwLockWriteGuard};

use crate::env::{state, Environment};
use crate::error::{Error, PageId, Result, TransactionId};
use crate::freelist::FreeList;
use crate::meta::DbInfo;
use crate::pnl::Pnl;
pub use crate::nested_txn::NestedTransactionExt;
use crate::page::{Page, PageFlags};
use crate::segregated_freelist::SegregatedFreeList;

/// Helper function to safely read from a RwLock
fn read_lock<'a, T>(
    lock: &'a std::sync::RwLock<T>,
    context: &'static str,
) -> Result<RwLockReadGuard<'a, T>> {
    lock.read()
        .map_err(|_| Error::Custom(format!("RwLock poisoned: {}", context).into()))
}

/// Helper function to safely write to a RwLock
fn write_lock<'a, T>(
    lock: &'a std::sync::RwLock<T>,
    context: &'static str,
) -> Result<RwLockWriteGuard<'a, T>> {
    lock.write()
        .map_err(|_| Error::Custom(format!("RwLock poisoned: {}", context).into()))
}

/// Helper function to get a mutable reference from HashMap with proper error
fn get_mut_page<'a>(pages: &'a mut HashMap<PageId, Box<Page>>, page_id: &PageId) -> Result<&'a mut Box<Page>> {
    pages.get_mut(page_id)
        .ok_or_else(|| Error::Custom(format!("Page {} not found in dirty pages", page_id.0).into()))
}

/// Bulk-append GC records into the FREE sub-db.
///
/// `freelist_data` arrives pre-sorted ascending (txn-id major, bigfoot-segment
/// minor), so this never needs to touch an existing key or rebalance — each
/// record either fits in the current rightmost leaf or starts a new one, which
/// is appended as the new rightmost child of the (possibly newly created)
/// branch chain. This avoids needing a full recursive B+tree insert, which
/// would require borrowing the whole `Transaction` while its `ModeData::Write`
/// fields are already exclusively borrowed here.
fn gc_bulk_append(
    dirty: &mut DirtyPages,
    next_pgno: &mut PageId,
    free_db_info: &mut DbInfo,
    io: &dyn crate::io::IoBackend,
    checksum_mode: crate::checksum::ChecksumMode,
    freelist_data: Vec<(Vec<u8>, Vec<u8>)>,
) -> Result<()> {
    const MAX_PAGE_ID: u64 = 1 << 48;

    let alloc_page_id = |next_pgno: &mut PageId| -> Result<PageId> {
        let page_id = *next_pgno;
        next_pgno.0 += 1;
        if page_id.0 >= MAX_PAGE_ID {
            return Err(Error::Custom(
                format!("Page ID {} exceeds maximum allowed value", page_id.0).into(),
            ));
        }
        Ok(page_id)
    };

    // Branch chain from the root down to the rightmost leaf's parent, built
    // lazily the first time the leaf overflows. Index 0 is the top.
    let mut branch_chain: Vec<PageId> = Vec::new();
    let mut current_leaf = free_db_info.root;

    for (key, value) in freelist_data {
        let fits = {
            let leaf_page = if let Some(page) = dirty.pages.get_mut(&current_leaf) {
                page
            } else {
                let num_pages = io.size_in_pages();
                if current_leaf.0 >= num_pages {
                    return Err(Error::InvalidPageId(current_leaf));
                }
                let page = io.read_page(current_leaf)?;
                if checksum_mode != crate::checksum::ChecksumMode::None {
                    use crate::checksum::ChecksummedPage;
                    page.validate_checksum()?;
                }
                let mut new_page = Page::new(current_leaf, page.header.flags | PageFlags::DIRTY);
                new_page.header = page.header;
                new_page.header.flags |= PageFlags::DIRTY;
                new_page.data.copy_from_slice(&page.data);
                dirty.mark_dirty(current_leaf, new_page);
                get_mut_page(&mut dirty.pages, &current_leaf)?
            };

            match leaf_page.add_node_sorted(&key, &value) {
                Ok(_) => {
                    free_db_info.entries += 1;
                    true
                }
                Err(Error::Custom(msg)) if msg.contains("Page full") => false,
                Err(e) => return Err(e),
            }
        };

        if fits {
            continue;
        }

        // Current leaf is full: start a new rightmost leaf and link it in.
        let new_leaf_id = alloc_page_id(next_pgno)?;
        let new_leaf = Page::new(new_leaf_id, PageFlags::LEAF | PageFlags::DIRTY);
        dirty.mark_dirty(new_leaf_id, new_leaf);
        free_db_info.leaf_pages += 1;

        if branch_chain.is_empty() {
            // First split: promote the tree from a single leaf to leaf + branch root.
            let branch_id = alloc_page_id(next_pgno)?;
            let mut branch_page = Page::new(branch_id, PageFlags::BRANCH | PageFlags::DIRTY);
            crate::branch::BranchPage::init_root(&mut branch_page, &key, current_leaf, new_leaf_id)?;
            dirty.mark_dirty(branch_id, branch_page);
            free_db_info.root = branch_id;
            free_db_info.branch_pages += 1;
            free_db_info.depth = 2;
            branch_chain.push(branch_id);
        } else {
            // Append the new leaf as the rightmost child of the deepest branch,
            // growing a new branch level above it if that branch is also full.
            let mut level = branch_chain.len();
            loop {
                level -= 1;
                let branch_id = branch_chain[level];
                let branch_page = get_mut_page(&mut dirty.pages, &branch_id)?;
                match crate::branch::BranchPage::add_split_child(branch_page, &key, new_leaf_id) {
                    Ok(()) => break,
                    Err(Error::Custom(msg)) if msg.contains("Page full") => {
                        if level == 0 {
                            // Root branch is full too: grow a new root above it.
                            let new_root_id = alloc_page_id(next_pgno)?;
                            let mut new_root = Page::new(new_root_id, PageFlags::BRANCH | PageFlags::DIRTY);
                            crate::branch::BranchPage::init_root(&mut new_root, &key, branch_id, new_leaf_id)?;
                            dirty.mark_dirty(new_root_id, new_root);
                            free_db_info.root = new_root_id;
                            free_db_info.branch_pages += 1;
                            branch_chain.insert(0, new_root_id);
                            break;
                        }
                        continue;
                    }
                    Err(e) => return Err(e),
                }
            }
        }

        current_leaf = new_leaf_id;
        match get_mut_page(&mut dirty.pages, &current_leaf)?.add_node_sorted(&key, &value) {
            Ok(_) => free_db_info.entries += 1,
            Err(e) => return Err(e),
        }
    }

    Ok(())
}

/// Transaction mode marker traits
pub mod mode {
    /// Sealed trait for transaction modes
    pub(crate) mod sealed {
        pub trait Sealed {}
    }

    /// Transaction mode trait
    pub trait Mode: sealed::Sealed {
        /// Whether this is a write transaction
        const IS_WRITE: bool;
    }
}

/// Read-only transaction mode
#[derive(Debug)]
pub struct Read;

impl crate::txn::mode::sealed::Sealed for Read {}
impl mode::Mode for Read {
    const IS_WRITE: bool = false;
}

/// Read-write transaction mode
#[derive(Debug)]
pub struct Write;

impl crate::txn::mode::sealed::Sealed for Write {}
impl mode::Mode for Write {
    const IS_WRITE: bool = true;
}

/// Dirty page tracking for write transactions
#[derive(Clone)]
pub struct DirtyPages {
    /// Map of page ID to dirty page
    pub(crate) pages: HashMap<PageId, Box<Page>>,
    /// Allocated pages that need to be written
    pub(crate) allocated: Pnl,
    /// Pages marked for COW but not yet copied (lazy COW)
    #[allow(dead_code)]
    pub(crate) cow_pending: HashMap<PageId, PageId>, // old_id -> new_id
}

impl DirtyPages {
    /// Create new dirty page tracker
    pub(crate) fn new() -> Self {
        Self { pages: HashMap::new(), allocated: Pnl::default(), cow_pending: HashMap::new() }
    }

    /// Mark a page as dirty
    pub(crate) fn mark_dirty(&mut self, page_id: PageId, page: Box<Page>) {
        self.pages.insert(page_id, page);
    }

    /// Get a dirty page
    pub(crate) fn get(&self, page_id: &PageId) -> Option<&Page> {
        self.pages.get(page_id).map(|p| p.as_ref())
    }

    /// Get a mutable dirty page
    #[allow(dead_code)]
    pub(crate) fn get_mut(&mut self, page_id: &PageId) -> Option<&mut Page> {
        self.pages.get_mut(page_id).map(|p| p.as_mut())
    }
}

/// Transaction data shared between read and write modes
pub(crate) struct TxnData<'env> {
    /// Reference to environment
    pub(crate) env: &'env Environment<state::Open>,
    /// Transaction ID
    id: TransactionId,
    /// Database info cache
    pub(crate) databases: HashMap<Option<String>, DbInfo>,
}

/// A database transaction
pub struct Transaction<'env, M: mode::Mode> {
    /// Shared transaction data
    pub(crate) data: TxnData<'env>,
    /// Mode-specific data
    pub(crate) mode_data: ModeData<'env>,
    /// Phantom for mode
    _mode: PhantomData<M>,
}

/// Mode-specific transaction data
pub(crate) enum ModeData<'env> {
    /// Read transaction data
    Read {
        /// Reader slot index (for cleanup)
        reader_slot: Option<usize>,
    },
    /// Write transaction data
    Write {
        /// Write lock guard
        _write_guard: MutexGuard<'env, ()>,
        /// Dirty pages
        dirty: Box<DirtyPages>,
        /// Free list manager (old)
        freelist: FreeList,
        /// Segregated free list (new)
        segregated_freelist: Box<Option<SegregatedFreeList>>,
        /// Next page ID to allocate
        next_pgno: PageId,
        /// Bumped every time a nested transaction aborts and rolls back
        /// write state out from under live cursors. Cursors compare this
        /// against the epoch they last observed to know their cached
        /// position may now point at a restored-away page.
        nest_epoch: Rc<Cell<u64>>,
    },
}

impl<'env> Transaction<'env, Read> {
    /// Create a new read transaction
    pub(crate) fn new_read(env: &'env Environment<state::Open>) -> Result<Self> {
        let inner = env.inner();

        // Get the current transaction ID for snapshot isolation
        // Read transactions see the state as of the last committed write transaction
        let current_txn_id = TransactionId(inner.txn_id.load(Ordering::Acquire));

        // Try to acquire a reader slot
        let reader_slot = inner.readers.acquire(current_txn_id).map_err(|_| Error::ReadersFull)?;

        // Publish this reader's snapshot sizes right after its txn_id.
        if let Ok(meta) = inner.meta() {
            inner.readers.publish_snapshot(reader_slot, meta.last_pg.0, meta.pages_retired);
        }

        // Copy database info at this snapshot
        let databases = read_lock(&inner.databases, "reading databases for read transaction")?.clone();

        Ok(Self {
            data: TxnData { env, id: current_txn_id, databases },
            mode_data: ModeData::Read { reader_slot: Some(reader_slot) },
            _mode: PhantomData,
        })
    }
}

impl<'env> Transaction<'env, Write> {
    /// Create a new write transaction
    pub(crate) fn new_write(env: &'env Environment<state::Open>) -> Result<Self> {
        let inner = env.inner();

        // Get write lock first to ensure exclusive access
        let write_guard = inner.write_lock.lock();

        // Increment transaction ID for the new write transaction
        // This ensures write transactions have unique, monotonically increasing IDs
        let new_txn_id = TransactionId(inner.txn_id.fetch_add(1, Ordering::AcqRel) + 1);

        // Copy database info under write lock to ensure consistency
        let databases = read_lock(&inner.databases, "reading databases for write transaction")?.clone();

        // Get current meta page to read database state
        let meta = inner.meta()?;
        let next_pgno = PageId(meta.last_pg.0 + 1);

        // Create a temporary read transaction to load the free list
        // This is safe because we hold the write lock
        let temp_read_txn = Transaction {
            data: TxnData {
                env,
                id: TransactionId(meta.last_txnid.0), // Use last committed txn ID
                databases: databases.clone(),
            },
            mode_data: ModeData::Read { reader_slot: None },
            _mode: PhantomData::<Read>,
        };

        // Load the free list from the last committed state
        let mut freelist =
            FreeList::load(&temp_read_txn, &meta.free_db).unwrap_or_else(|_| FreeList::new());

        // Update freelist with current reader state
        if let Some(oldest_reader) = inner.readers.oldest_reader() {
            freelist.set_oldest_reader(oldest_reader);
        } else {
            // No active readers
            freelist.set_oldest_reader(TransactionId(0));
        }

        // Update free pages based on reader state
        freelist.update_free_pages();

        // Initialize segregated freelist if enabled
        let segregated_freelist = if env.config().use_segregated_freelist {
            let seg_list = SegregatedFreeList::new();
            // Migrate existing free pages from simple freelist
            // This will be populated as pages are freed
            Some(seg_list)
        } else {
            None
        };

        Ok(Self {
            data: TxnData { env, id: new_txn_id, databases },
            mode_data: ModeData::Write {
                _write_guard: write_guard,
                dirty: Box::new(DirtyPages::new()),
                freelist,
                segregated_freelist: Box::new(segregated_freelist),
                next_pgno,
                nest_epoch: Rc::new(Cell::new(0)),
            },
            _mode: PhantomData,
        })
    }

    /// Shared counter bumped whenever a nested transaction rolls back write
    /// state. Cursors stash the value they last saw and reseek when it has
    /// moved on, instead of trusting a cached position that a rollback may
    /// have invalidated.
    pub(crate) fn nest_epoch(&self) -> Rc<Cell<u64>> {
        match &self.mode_data {
            ModeData::Write { nest_epoch, .. } => nest_epoch.clone(),
            ModeData::Read { .. } => unreachable!("write transaction always has ModeData::Write"),
        }
    }
}

/// Type alias for read-only transaction
pub type ReadTransaction<'env> = Transaction<'env, Read>;

/// Type alias for read-write transaction
pub type WriteTransaction<'env> = Transaction<'env, Write>;

impl<'env, M: mode::Mode> Transaction<'env, M> {
    /// Get the transaction ID
    pub fn id(&self) -> TransactionId {
        self.data.id
    }

    /// Get a page by ID
    #[inline]
    pub fn get_page(&self, page_id: PageId) -> Result<&Page> {
        // Validate page ID bounds first
        let inner = self.data.env.inner();
        let num_pages = inner.io.size_in_pages();
        if page_id.0 >= num_pages {
            return Err(Error::InvalidPageId(page_id));
        }
        
        // Special handling for meta pages (0 and 1)
        if page_id.0 <= 1 {
            // Meta pages should always exist, but double-check
            if num_pages < 2 {
                return Err(Error::Corruption {
                    details: "Database file too small to contain meta pages".to_string(),
                    page_id: Some(page_id),
                });
            }
        }
        
        // Check dirty pages first if write transaction
        if M::IS_WRITE {
            if let ModeData::Write { ref dirty, .. } = self.mode_data {
                if let Some(page) = dirty.get(&page_id) {
                    return Ok(page);
                }
            }
        }

        // For read operations, use zero-copy access directly from mmap
        // SAFETY: The returned page reference is valid for the transaction lifetime
        // because:
        // 1. The environment (and thus the mmap) outlives the transaction
        // 2. The mmap base address is stable during the transaction
        // 3. Pages are immutable once written (COW semantics)
        // 4. We validated the page ID is within bounds above
        let page = unsafe { inner.io.get_page_ref(page_id)? };
        
        // Validate checksum if enabled
        self.validate_page_checksum(page)?;
        
        Ok(page)
    }

    /// Get database info
    pub fn db_info(&self, name: Option<&str>) -> Result<&DbInfo> {
        self.data.databases.get(&name.map(|s| s.to_string())).ok_or(Error::InvalidDatabase)
    }

    /// Update database info (only for write transactions)
    pub fn update_db_info(&mut self, name: Option<&str>, info: DbInfo) -> Result<()> {
        if !M::IS_WRITE {
            return Err(Error::InvalidOperation("Cannot update database info in read transaction"));
        }

        self.data.databases.insert(name.map(|s| s.to_string()), info);
        Ok(())
    }
    
    /// Validate page checksum based on environment checksum mode
    #[inline]
    fn validate_page_checksum(&self, page: &Page) -> Result<()> {
        let inner = self.data.env.inner();
        
        match inner.checksum_mode {
            crate::checksum::ChecksumMode::None => Ok(()),
            crate::checksum::ChecksumMode::MetaOnly => {
                // Only validate meta pages
                if page.header.flags.contains(PageFlags::META) {
                    use crate::checksum::ChecksummedPage;
                    page.validate_checksum()
                } else {
                    Ok(())
                }
            }
            crate::checksum::ChecksumMode::Full => {
                // Validate all pages
                use crate::checksum::ChecksummedPage;
                page.validate_checksum()
            }
        }
    }

    /// Commit the transaction
    pub fn commit(mut self) -> Result<()> {
        // Extract checksum mode before the mutable borrow
        let checksum_mode = self.data.env.inner().checksum_mode;
        
        match self.mode_data {
            ModeData::Read { .. } => {
                // Nothing to do for read transactions
                Ok(())
            }
            ModeData::Write {
                ref mut dirty,
                ref mut freelist,
                ref mut segregated_freelist,
                ref mut next_pgno,
                ..
            } => {
                if dirty.pages.is_empty() && freelist.pending_len() == 0 {
                    // No changes, nothing to commit
                    return Ok(());
                }

                let inner = self.data.env.inner();

                // Get oldest reader to determine which pages can be freed
                if let Some(oldest_reader) = inner.readers.oldest_reader() {
                    freelist.set_oldest_reader(oldest_reader);
                }

                // Don't commit here - we'll do it after updating reader state

                // Get current meta page and determine which meta page to write to
                let current_meta = inner.meta()?;
                let next_meta_page_id = inner.next_meta_page_id()?;

                // Create new meta content
                let mut new_meta = current_meta;

                // Update transaction ID and last page. `set_txnid` keeps
                // `txnid_a`/`txnid_b`/`canary[3]` in lockstep with `last_txnid` so the
                // troika election in the environment's meta reader can tell this meta
                // apart from the other two slots once this commit lands; leaving them
                // frozen at their old value is how two stale slots end up tied.
                new_meta.set_txnid(self.data.id.0);
                new_meta.last_pg =
                    PageId(next_pgno.0.saturating_sub(1).max(current_meta.last_pg.0));

                // A meta is only "steady" once both the data it references and the
                // meta page itself are confirmed on stable storage. NoSync/AsyncFlush
                // never sync the meta page before it's readable again, and SyncData
                // syncs only the data pages, so all three leave this meta weak;
                // FullSync is the only mode that earns METASIGN_STEADY.
                new_meta.sign = match inner.durability {
                    crate::env::DurabilityMode::FullSync => crate::meta::METASIGN_STEADY,
                    _ => crate::meta::METASIGN_WEAK,
                };

                // Update main database info
                if let Some(main_db_info) = self.data.databases.get(&None) {
                    new_meta.main_db = *main_db_info;
                }

                // Update freelist with current reader state
                if let Some(oldest_reader) = inner.readers.oldest_reader() {
                    freelist.set_oldest_reader(oldest_reader);
                    if let Some(seg_list) = segregated_freelist.as_mut() {
                        seg_list.update_oldest_reader(oldest_reader);
                    }
                } else {
                    // No active readers
                    freelist.set_oldest_reader(TransactionId(0));
                    if let Some(seg_list) = segregated_freelist.as_mut() {
                        seg_list.update_oldest_reader(TransactionId(0));
                    }
                }

                // Commit pending pages to the appropriate freelist
                if let Some(seg_list) = segregated_freelist.as_mut() {
                    seg_list.commit(self.data.id);
                } else {
                    freelist.commit_pending(self.data.id);
                }

                // Save the freelist to the free database if needed
                if freelist.has_txn_free_pages() {
                    // Get the data to save before any borrows
                    let freelist_data = freelist.get_save_data();

                    // Make a copy of free_db info to modify
                    let mut free_db_info = new_meta.free_db;

                    // If free database doesn't exist, create it
                    if free_db_info.root.0 == 0 {
                        // Allocate a new page for the free database root
                        let page_id = PageId(next_pgno.0);
                        next_pgno.0 += 1;
                        
                        // Ensure we're not allocating beyond reasonable limits
                        const MAX_PAGE_ID: u64 = 1 << 48; // 256TB with 4KB pages
                        if page_id.0 >= MAX_PAGE_ID {
                            return Err(Error::Custom(
                                format!("Page ID {} exceeds maximum allowed value", page_id.0).into()
                            ));
                        }

                        let page = Page::new(page_id, PageFlags::LEAF | PageFlags::DIRTY);
                        dirty.mark_dirty(page_id, page);

                        let root_page = get_mut_page(&mut dirty.pages, &page_id)?;
                        root_page.header.num_keys = 0;

                        free_db_info.root = page_id;
                        free_db_info.leaf_pages = 1;
                        free_db_info.depth = 1;
                    }

                    // Save the freelist data to the free database, splitting the
                    // leaf chain (and growing branch levels) as entries overflow
                    // a single page instead of silently dropping them.
                    gc_bulk_append(
                        dirty,
                        next_pgno,
                        &mut free_db_info,
                        inner.io.as_ref(),
                        checksum_mode,
                        freelist_data,
                    )?;

                    // Update meta with the free database info
                    new_meta.free_db = free_db_info;
                }

                // Write all dirty pages BEFORE meta page
                // This ensures data is on disk before the meta page references it
                for (_page_id, page) in dirty.pages.iter_mut() {
                    // Update checksum if enabled
                    if checksum_mode != crate::checksum::ChecksumMode::None {
                        use crate::checksum::ChecksummedPage;
                        page.update_checksum();
                    }

                    // Write page to disk
                    inner.io.write_page(page)?;
                }

                // Handle durability and meta page writing
                match inner.durability {
                    crate::env::DurabilityMode::NoSync => {
                        // No sync - fastest but no durability guarantees
                        // Write meta page without syncing
                        let mut meta_page = Page::from_meta(&new_meta, next_meta_page_id);
                        
                        // Update checksum if enabled (meta pages always get checksums in MetaOnly mode)
                        if checksum_mode != crate::checksum::ChecksumMode::None {
                            use crate::checksum::ChecksummedPage;
                            meta_page.update_checksum();
                        }
                        
                        inner.io.write_page(&meta_page)?;
                    }
                    crate::env::DurabilityMode::AsyncFlush => {
                        // Write meta page
                        let mut meta_page = Page::from_meta(&new_meta, next_meta_page_id);
                        
                        // Update checksum if enabled (meta pages always get checksums in MetaOnly mode)
                        if checksum_mode != crate::checksum::ChecksumMode::None {
                            use crate::checksum::ChecksummedPage;
                            meta_page.update_checksum();
                        }
                        
                        inner.io.write_page(&meta_page)?;
                        // Schedule async flush (OS will sync eventually)
                        // Note: Data loss possible if system crashes before flush
                        inner.io.sync()?;
                    }
                    crate::env::DurabilityMode::SyncData => {
                        // Sync data pages first to ensure they're durable
                        if !dirty.pages.is_empty() {
                            inner.io.sync()?;
                        }

                        // Write meta page after data is synced
                        // This ensures data pages are durable before meta references them
                        let mut meta_page = Page::from_meta(&new_meta, next_meta_page_id);
                        
                        // Update checksum if enabled (meta pages always get checksums in MetaOnly mode)
                        if checksum_mode != crate::checksum::ChecksumMode::None {
                            use crate::checksum::ChecksummedPage;
                            meta_page.update_checksum();
                        }
                        
                        inner.io.write_page(&meta_page)?;
                        // Meta page is not synced - OS crash could lose this commit
                    }
                    crate::env::DurabilityMode::FullSync => {
                        // Most durable mode - full ACID compliance
                        // Step 1: Sync all data pages
                        if !dirty.pages.is_empty() {
                            inner.io.sync()?;
                        }

                        // Step 2: Write meta page after data is guaranteed durable
                        let mut meta_page = Page::from_meta(&new_meta, next_meta_page_id);
                        
                        // Update checksum if enabled (meta pages always get checksums in MetaOnly mode)
                        if checksum_mode != crate::checksum::ChecksumMode::None {
                            use crate::checksum::ChecksummedPage;
                            meta_page.update_checksum();
                        }
                        
                        inner.io.write_page(&meta_page)?;

                        // Step 3: Sync meta page to ensure commit is durable
                        inner.io.sync()?;
                    }
                }

                // Update databases in environment atomically
                {
                    let mut env_dbs = write_lock(&inner.databases, "updating databases on commit")?;
                    *env_dbs = self.data.databases.clone();
                }

                // Update the global transaction ID to reflect this commit
                // This makes the committed changes visible to new readers
                inner.txn_id.store(self.data.id.0, Ordering::Release);

                // The free list changes are already persisted in the free_db
                // They will be loaded by the next write transaction

                Ok(())
            }
        }
    }

    /// Abort the transaction
    pub fn abort(self) {
        // Transaction is aborted on drop
    }
}

impl<'env> Transaction<'env, Read> {
    /// Upgrade a read transaction to a write transaction
    pub fn upgrade(self) -> Result<Transaction<'env, Write>> {
        let inner = self.data.env.inner();

        // Try to acquire write lock
        let _write_guard =
            inner.write_lock.try_lock().ok_or(Error::Conflict(crate::error::ConflictDetails {
                txn_id: self.data.id,
                conflicting_page: PageId(0),
                operation: crate::error::Operation::Write,
            }))?;

        // Drop the read transaction and create a new write transaction
        let env = self.data.env;
        drop(self);

        // Now create a fresh write transaction
        Transaction::new_write(env)
    }
}

impl<'env> Transaction<'env, Write> {
    /// Get a mutable page with Copy-on-Write semantics
    /// Returns the page ID (which may be new) and a mutable reference to the page
    pub fn get_page_cow(&mut self, page_id: PageId) -> Result<(PageId, &mut Page)> {
        // Validate page ID bounds first
        let inner = self.data.env.inner();
        let num_pages = inner.io.size_in_pages();
        if page_id.0 >= num_pages {
            return Err(Error::InvalidPageId(page_id));
        }
        
        // Check if already dirty in this transaction
        if let ModeData::Write { ref dirty, .. } = self.mode_data {
            if dirty.pages.contains_key(&page_id) {
                if let ModeData::Write { ref mut dirty, .. } = self.mode_data {
                    return Ok((page_id, get_mut_page(&mut dirty.pages, &page_id)?.as_mut()));
                }
            }
        }

        // Page is not dirty - need to copy it (Copy-on-Write)
        let original_page = inner.io.read_page(page_id)?;
        
        // Validate checksum if enabled
        self.validate_page_checksum(&original_page)?;

        // Check if this is a leaf page with overflow references that need copying
        let overflow_updates = if original_page.header.flags.contains(PageFlags::LEAF)
            && original_page.header.num_keys > 0
        {
            let mut updates = Vec::new();
            for i in 0..original_page.header.num_keys as usize {
                if let Ok(node) = original_page.node(i) {
                    if let Ok(Some(overflow_id)) = node.overflow_page() {
                        updates.push((i, overflow_id));
                    }
                } 
            }
            updates
        } else {
            Vec::new()
        };

        // Copy overflow chains if needed
        let mut overflow_mappings = Vec::new();
        for (node_idx, old_overflow_id) in overflow_updates {
            let new_overflow_id = crate::overflow::copy_overflow_chain(self, old_overflow_id)?;
            overflow_mappings.push((node_idx, new_overflow_id));
        }

        // Now create the new page with updated overflow references
        if let ModeData::Write { ref mut dirty, ref mut freelist, ref mut next_pgno, .. } =
            self.mode_data
        {
            // Allocate a new page for the copy
            let new_page_id = if let Some(free_page_id) = freelist.alloc_page() {
                free_page_id
            } else {
                // Allocate new page from end of file
                let id =
                    PageId(inner.next_page_id.fetch_add(1, std::sync::atomic::Ordering::SeqCst));
                *next_pgno = PageId(id.0 + 1);
                id
            };

            // Get page from pool or allocate new one
            let mut new_page =
                inner.page_pool.get(new_page_id, original_page.header.flags | PageFlags::DIRTY);

            // Copy header fields (except pgno and flags which are already set)
            new_page.header.num_keys = original_page.header.num_keys;
            new_page.header.lower = original_page.header.lower;
            new_page.header.upper = original_page.header.upper;
            new_page.header.overflow = original_page.header.overflow;
            new_page.header.next_pgno = original_page.header.next_pgno;
            new_page.header.prev_pgno = original_page.header.prev_pgno;
            new_page.header.checksum = 0; // Reset checksum for new page

            // Copy data
            new_page.data = original_page.data;

            // Update overflow references in the new page
            // Only update if we have overflow mappings
            if !overflow_mappings.is_empty() {
                // We need to be careful here - the node indices from the original page
                // should still be valid in the copied page since we copied the data array as-is
                for (node_idx, new_overflow_id) in overflow_mappings {
                    // Double-check that the node index is valid
                    if node_idx >= new_page.header.num_keys as usize {
                        return Err(Error::Corruption {
                            details: format!(
                                "Node index {} out of bounds during COW (num_keys={})",
                                node_idx, new_page.header.num_keys
                            ),
                            page_id: Some(page_id),
                        });
                    }

                    let mut node_data = new_page.node_data_mut(node_idx)?;
                    node_data.set_overflow(new_overflow_id)?;
                }
            }

            // Mark the new page as dirty and track allocation
            dirty.mark_dirty(new_page_id, new_page);
            dirty.allocated.append(new_page_id)?;

            // Free the old page (it will be added to freelist after oldest reader)
            freelist.free_page(page_id);

            Ok((new_page_id, get_mut_page(&mut dirty.pages, &new_page_id)?))
        } else {
            unreachable!("Write transaction must have write mode data");
        }
    }

    /// Get a mutable page (for backward compatibility - uses COW internally)
    pub fn get_page_mut(&mut self, page_id: PageId) -> Result<&mut Page> {
        // Validate page ID bounds first
        let inner = self.data.env.inner();
        let num_pages = inner.io.size_in_pages();
        if page_id.0 >= num_pages {
            return Err(Error::InvalidPageId(page_id));
        }
        
        // For now, keep the old behavior for compatibility
        // TODO: Update all callers to handle the new page ID from COW
        // First check if already dirty
        let already_dirty = if let ModeData::Write { ref dirty, .. } = self.mode_data {
            dirty.pages.contains_key(&page_id)
        } else {
            unreachable!("Write transaction must have write mode data");
        };
        
        if already_dirty {
            if let ModeData::Write { ref mut dirty, .. } = self.mode_data {
                return Ok(get_mut_page(&mut dirty.pages, &page_id)?);
            }
        }

        // Load and copy page
        let mut page = inner.io.read_page(page_id)?;
        
        // Validate checksum if enabled
        self.validate_page_checksum(&page)?;

        // Mark as dirty
        page.header.flags.insert(PageFlags::DIRTY);
        
        if let ModeData::Write { ref mut dirty, .. } = self.mode_data {
            dirty.mark_dirty(page_id, page);
            Ok(get_mut_page(&mut dirty.pages, &page_id)?)
        } else {
            unreachable!("Write transaction must have write mode data");
        }
    }

    /// Allocate a new page
    pub fn alloc_page(&mut self, flags: PageFlags) -> Result<(PageId, &mut Page)> {
        if let ModeData::Write {
            ref mut dirty,
            ref mut freelist,
            ref mut segregated_freelist,
            ref mut next_pgno,
            ..
        } = self.mode_data
        {
            // Check transaction page limit to prevent runaway allocation
            let max_txn_pages = self.data.env.config().max_txn_pages;
            if dirty.allocated.len() >= max_txn_pages {
                return Err(Error::Custom(
                    format!("Transaction page limit exceeded: {} pages. Consider committing more frequently for random write workloads.", 
                            max_txn_pages).into()
                ));
            }
            // Try to get a page from the appropriate free list
            let page_id = if let Some(seg_list) = segregated_freelist.as_mut() {
                // Use segregated freelist if enabled
                if let Some(free_page_id) = seg_list.allocate(1) {
                    free_page_id
                } else {
                    // Allocate new page from end of file
                    let inner = self.data.env.inner();
                    let id = PageId(
                        inner.next_page_id.fetch_add(1, std::sync::atomic::Ordering::SeqCst),
                    );
                    // Update local tracking
                    *next_pgno = PageId(id.0 + 1);
                    id
                }
            } else {
                // Use simple freelist
                if let Some(free_page_id) = freelist.alloc_page() {
                    free_page_id
                } else {
                    // Allocate new page from end of file
                    let inner = self.data.env.inner();
                    let id = PageId(
                        inner.next_page_id.fetch_add(1, std::sync::atomic::Ordering::SeqCst),
                    );
                    // Update local tracking
                    *next_pgno = PageId(id.0 + 1);
                    id
                }
            };

            // Create new page
            let page = Page::new(page_id, flags | PageFlags::DIRTY);
            dirty.mark_dirty(page_id, page);
            dirty.allocated.append(page_id)?;

            Ok((page_id, get_mut_page(&mut dirty.pages, &page_id)?.as_mut()))
        } else {
            unreachable!("Write transaction must have write mode data");
        }
    }

    /// Free a page
    pub fn free_page(&mut self, page_id: PageId) -> Result<()> {
        // Validate page ID
        if page_id.0 <= 1 {
            return Err(Error::Custom("Cannot free meta pages (0 or 1)".into()));
        }
        
        let inner = self.data.env.inner();
        let num_pages = inner.io.size_in_pages();
        if page_id.0 >= num_pages {
            return Err(Error::InvalidPageId(page_id));
        }
        
        if let ModeData::Write { ref mut freelist, ref mut segregated_freelist, .. } =
            self.mode_data
        {
            if let Some(seg_list) = segregated_freelist.as_mut() {
                // Use segregated freelist
                seg_list.free(page_id, 1);
            } else {
                // Use simple freelist
                freelist.free_page(page_id);
            }
            Ok(())
        } else {
            unreachable!("Write transaction must have write mode data");
        }
    }

    /* TODO: Fix borrow checker issues with returning multiple mutable references
    /// Allocate multiple contiguous pages (useful for overflow pages)
    pub fn alloc_pages(&mut self, count: usize, flags: PageFlags) -> Result<Vec<(PageId, &mut Page)>> {
        if count == 0 {
            return Ok(Vec::new());
        }

        if let ModeData::Write { ref mut dirty, ref mut freelist, ref mut segregated_freelist, ref mut next_pgno, .. } = self.mode_data {
            let mut pages = Vec::with_capacity(count);

            // Try to allocate contiguous pages from segregated freelist
            if let Some(seg_list) = segregated_freelist.as_mut() {
                if count > 1 {
                    // Try to get contiguous pages
                    if let Some(start_page_id) = seg_list.allocate(count) {
                        // We got contiguous pages
                        let page_ids: Vec<PageId> = (0..count)
                            .map(|i| PageId(start_page_id.0 + i as u64))
                            .collect();

                        // First, allocate all pages
                        for &page_id in &page_ids {
                            let page = Page::new(page_id, flags | PageFlags::DIRTY);
                            dirty.mark_dirty(page_id, page);
                            dirty.allocated.append(page_id)?;
                        }

                        // Then collect mutable references
                        for &page_id in &page_ids {
                            pages.push((page_id, get_mut_page(&mut dirty.pages, &page_id)?.as_mut()));
                        }

                        return Ok(pages);
                    }
                }
            }

            // Fall back to allocating pages one by one
            // We need to collect page IDs first, then get references
            let mut allocated_ids = Vec::new();

            for _ in 0..count {
                // Allocate page ID
                let page_id = if let Some(seg_list) = segregated_freelist.as_mut() {
                    if let Some(free_page_id) = seg_list.allocate(1) {
                        free_page_id
                    } else {
                        let inner = self.data.env.inner();
                        let id = PageId(inner.next_page_id.fetch_add(1, std::sync::atomic::Ordering::SeqCst));
                        *next_pgno = PageId(id.0 + 1);
                        id
                    }
                } else {
                    if let Some(free_page_id) = freelist.alloc_page() {
                        free_page_id
                    } else {
                        let inner = self.data.env.inner();
                        let id = PageId(inner.next_page_id.fetch_add(1, std::sync::atomic::Ordering::SeqCst));
                        *next_pgno = PageId(id.0 + 1);
                        id
                    }
                };

                // Create and mark page as dirty
                let page = Page::new(page_id, flags | PageFlags::DIRTY);
                dirty.mark_dirty(page_id, page);
                dirty.allocated.append(page_id)?;
                allocated_ids.push(page_id);
            }

            // Now collect the mutable references
            for page_id in allocated_ids {
                pages.push((page_id, get_mut_page(&mut dirty.pages, &page_id)?.as_mut()));
            }

            Ok(pages)
        } else {
            unreachable!("Write transaction must have write mode data");
        }
    }
    */

    /// Free multiple contiguous pages
    pub fn free_pages(&mut self, start_page_id: PageId, count: usize) -> Result<()> {
        if count == 0 {
            return Ok(());
        }
        
        // Validate start page ID
        if start_page_id.0 <= 1 {
            return Err(Error::Custom("Cannot free meta pages (0 or 1)".into()));
        }
        
        let inner = self.data.env.inner();
        let num_pages = inner.io.size_in_pages();
        
        // Validate start and end pages
        if start_page_id.0 >= num_pages {
            return Err(Error::InvalidPageId(start_page_id));
        }
        
        let end_page_id = PageId(start_page_id.0 + count as u64 - 1);
        if end_page_id.0 >= num_pages {
            return Err(Error::Custom(
                format!("Cannot free pages beyond database bounds: {} to {}", start_page_id.0, end_page_id.0).into()
            ));
        }

        if let ModeData::Write { ref mut freelist, ref mut segregated_freelist, .. } =
            self.mode_data
        {
            if let Some(seg_list) = segregated_freelist.as_mut() {
                // Use segregated freelist - can free as a single extent
                seg_list.free(start_page_id, count);
            } else {
                // Use simple freelist - free pages one by one
                for i in 0..count {
                    let page_id = PageId(start_page_id.0 + i as u64);
                    freelist.free_page(page_id);
                }
            }
            Ok(())
        } else {
            unreachable!("Write transaction must have write mode data");
        }
    }

    /// Internal method to allocate a page (used during commit)
    #[allow(dead_code)]
    fn alloc_page_internal<'a>(
        &mut self,
        dirty: &'a mut DirtyPages,
        next_pgno: &mut PageId,
        flags: PageFlags,
    ) -> Result<(PageId, &'a mut Page)> {
        if let ModeData::Write { ref mut freelist, .. } = self.mode_data {
            // Try to get a page from the free list first
            let page_id = if let Some(free_page_id) = freelist.alloc_page() {
                free_page_id
            } else {
                // Allocate new page from end of file
                let id = *next_pgno;
                *next_pgno = PageId(id.0 + 1);
                id
            };

            // Create new page
            let page = Page::new(page_id, flags | PageFlags::DIRTY);
            dirty.mark_dirty(page_id, page);
            dirty.allocated.append(page_id)?;

            Ok((page_id, get_mut_page(&mut dirty.pages, &page_id)?.as_mut()))
        } else {
            unreachable!("Write transaction must have write mode data");
        }
    }

    /// Downgrade a write transaction to a read transaction
    pub fn downgrade(self) -> Result<Transaction<'env, Read>> {
        let env = self.data.env;

        // Abort any changes
        drop(self);

        // Create new read transaction
        Transaction::new_read(env)
    }
}

impl<'env, M: mode::Mode> Drop for Transaction<'env, M> {
    fn drop(&mut self) {
        match &self.mode_data {
            ModeData::Read { reader_slot } => {
                // Release reader slot
                if let Some(slot_idx) = reader_slot {
                    let inner = self.data.env.inner();
                    inner.readers.release(*slot_idx);
                }
            }
            ModeData::Write { .. } => {
                // Write transaction aborted if not committed
                // Write lock released automatically
            }
        }
    }
}
