//! Environment management with type-state pattern

use parking_lot::Mutex;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicU64;
use std::sync::{Arc, RwLock};

use crate::error::{Error, PageId, Result, TransactionId};
use crate::freelist::ReclaimPolicy;
use crate::io::{IoBackend, MmapBackend};
use crate::meta::{DbInfo, MetaPage, META_PAGE_1, META_PAGE_2, META_PAGE_3};
use crate::page::Page;
use crate::reader::{ReaderInfo, ReaderTable};
use crate::troika::{self, Troika};
use crate::txn::{Read, Transaction, Write};



/// Environment state marker traits
pub mod state {
    /// Sealed trait for environment states
    mod sealed {
        pub trait Sealed {}
    }

    /// Environment state trait
    pub trait State: sealed::Sealed {}

    /// Closed environment state
    #[derive(Debug)]
    pub struct Closed;
    impl sealed::Sealed for Closed {}
    impl State for Closed {}

    /// Open environment state
    #[derive(Debug)]
    pub struct Open;
    impl sealed::Sealed for Open {}
    impl State for Open {}

    /// Read-only environment state
    #[derive(Debug)]
    pub struct ReadOnly;
    impl sealed::Sealed for ReadOnly {}
    impl State for ReadOnly {}
}

use state::*;

/// Maximum number of named databases
pub const MAX_DBS: u32 = 128;

/// Default map size (1GB)
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

/// Durability modes for write transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurabilityMode {
    /// No sync - fastest but no durability guarantees
    NoSync,
    /// Async sync - data is flushed asynchronously (default)
    AsyncFlush,
    /// Sync data pages only - metadata might be lost
    SyncData,
    /// Full sync - both data and metadata are synced (safest)
    FullSync,
}

/// Default cap on the number of dirty pages a single write transaction may hold
/// before `alloc_page` starts rejecting further allocations with `TxnFull`.
pub const DEFAULT_MAX_TXN_PAGES: usize = 1 << 20;

/// Callback invoked to decide whether a slow reader should be evicted so the
/// writer can reclaim the pages it is pinning. Returns `true` to evict.
pub type HsrCallback = Arc<dyn Fn(&ReaderInfo) -> bool + Send + Sync>;

/// Environment-wide configuration consulted by transactions and the allocator.
#[derive(Clone)]
pub struct EnvConfig {
    /// Whether new write transactions should maintain a `SegregatedFreeList`
    /// fast-path index alongside the durable `FreeList`.
    pub use_segregated_freelist: bool,
    /// Upper bound on the number of dirty pages a write transaction may accumulate.
    pub max_txn_pages: usize,
    /// FIFO vs LIFO GC-record reclaim order (spec §4.F step 4).
    pub reclaim_policy: ReclaimPolicy,
    /// Optional handle-slow-reader hook; never invoked automatically by this crate.
    pub hsr_callback: Option<HsrCallback>,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            use_segregated_freelist: false,
            max_txn_pages: DEFAULT_MAX_TXN_PAGES,
            reclaim_policy: ReclaimPolicy::Fifo,
            hsr_callback: None,
        }
    }
}

impl std::fmt::Debug for EnvConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvConfig")
            .field("use_segregated_freelist", &self.use_segregated_freelist)
            .field("max_txn_pages", &self.max_txn_pages)
            .field("reclaim_policy", &self.reclaim_policy)
            .field("hsr_callback", &self.hsr_callback.is_some())
            .finish()
    }
}



/// Shared environment data
pub(crate) struct EnvInner {
    /// Path to the database
    _path: PathBuf,
    /// I/O backend
    pub(crate) io: Box<dyn IoBackend>,
    /// Current map size
    pub(crate) map_size: usize,
    /// Current transaction ID
    pub(crate) txn_id: AtomicU64,
    /// Write lock
    pub(crate) write_lock: Mutex<()>,
    /// Reader table
    pub(crate) readers: ReaderTable,
    /// Named databases
    pub(crate) databases: RwLock<HashMap<Option<String>, DbInfo>>,
    /// Free pages tracking
    pub(crate) _free_pages: RwLock<Vec<PageId>>,
    /// Durability mode
    pub(crate) durability: DurabilityMode,

    /// Next page ID to allocate
    pub(crate) next_page_id: AtomicU64,

    /// Environment-wide tunables consulted by transactions and the allocator.
    pub(crate) config: EnvConfig,

    /// Page checksum validation mode.
    pub(crate) checksum_mode: crate::checksum::ChecksumMode,

    /// Reserve pool of single-page buffers reused by the writer to avoid a
    /// malloc/free cycle per dirty page (spec §4.F `page_alloc_finalize`).
    pub(crate) page_pool: Mutex<Vec<Box<Page>>>,
}

// Safety: EnvInner is Send/Sync because IoBackend is Send/Sync
unsafe impl Send for EnvInner {}
unsafe impl Sync for EnvInner {}

impl EnvInner {
    /// Read all three meta-pages into an array, keyed by slot index.
    fn read_metas(&self) -> Result<[MetaPage; 3]> {
        let ids = [META_PAGE_1, META_PAGE_2, META_PAGE_3];
        let mut out = [MetaPage::new(); 3];
        for (i, id) in ids.into_iter().enumerate() {
            let page = self.io.read_page(id)?;

            if size_of::<MetaPage>() > page.data.len() {
                return Err(Error::Corruption {
                    details: "MetaPage size exceeds page data".into(),
                    page_id: None,
                });
            }
            if page.data.as_ptr() as usize % std::mem::align_of::<MetaPage>() != 0 {
                return Err(Error::Corruption {
                    details: "MetaPage not properly aligned".into(),
                    page_id: None,
                });
            }

            let meta = unsafe { &*(page.data.as_ptr() as *const MetaPage) };
            out[i] = *meta;
        }
        Ok(out)
    }

    /// Elect the recent/prefer_steady/tail slots among the three meta-pages.
    pub(crate) fn troika(&self) -> Result<Troika> {
        let metas = self.read_metas()?;
        Ok(troika::tap(&metas))
    }

    /// Get the current (most recent valid) meta page.
    pub(crate) fn meta(&self) -> Result<MetaPage> {
        let metas = self.read_metas()?;
        let troika = troika::tap(&metas);
        let recent = metas[troika.recent];
        if recent.validate().is_err() && !recent.txnid_consistent() {
            return Err(Error::Corrupted);
        }
        Ok(recent)
    }

    /// Get the meta-page slot id that the next commit should overwrite.
    pub(crate) fn next_meta_page_id(&self) -> Result<PageId> {
        let troika = self.troika()?;
        Ok([META_PAGE_1, META_PAGE_2, META_PAGE_3][troika.tail])
    }

    /// Environment-wide tunables.
    pub(crate) fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Take a reusable page buffer from the reserve pool, or allocate a fresh one.
    pub(crate) fn take_pooled_page(&self) -> Box<Page> {
        self.page_pool
            .lock()
            .pop()
            .unwrap_or_else(|| Box::new(Page::new(PageId(0), crate::page::PageFlags::empty())))
    }

    /// Return a page buffer to the reserve pool for reuse.
    pub(crate) fn return_pooled_page(&self, mut page: Box<Page>) {
        const MAX_POOL_SIZE: usize = 64;
        let mut pool = self.page_pool.lock();
        if pool.len() < MAX_POOL_SIZE {
            page.header = crate::page::PageHeader::new(0, crate::page::PageFlags::empty());
            pool.push(page);
        }
    }
}

/// Database environment
pub struct Environment<S: State = Closed> {
    inner: Option<Arc<EnvInner>>,
    _state: PhantomData<S>,
}

/// Builder for creating environments
pub struct EnvBuilder {
    map_size: usize,
    max_readers: u32,
    max_dbs: u32,
    _flags: u32,
    durability: DurabilityMode,
    use_numa: bool,
    use_segregated_freelist: bool,
    max_txn_pages: usize,
    reclaim_policy: ReclaimPolicy,
    hsr_callback: Option<HsrCallback>,
    checksum_mode: crate::checksum::ChecksumMode,
}

impl EnvBuilder {
    /// Create a new environment builder
    pub fn new() -> Self {
        Self {
            map_size: DEFAULT_MAP_SIZE,
            max_readers: 126,
            max_dbs: MAX_DBS,
            _flags: 0,
            durability: DurabilityMode::AsyncFlush,
            use_numa: false,
            use_segregated_freelist: false,
            max_txn_pages: DEFAULT_MAX_TXN_PAGES,
            reclaim_policy: ReclaimPolicy::Fifo,
            hsr_callback: None,
            checksum_mode: crate::checksum::ChecksumMode::default(),
        }
    }

    /// Select the page checksum validation mode.
    pub fn checksum_mode(mut self, mode: crate::checksum::ChecksumMode) -> Self {
        self.checksum_mode = mode;
        self
    }

    /// Enable the segregated (size-classed) in-memory freelist index.
    pub fn use_segregated_freelist(mut self, enabled: bool) -> Self {
        self.use_segregated_freelist = enabled;
        self
    }

    /// Cap on dirty pages a single write transaction may accumulate.
    pub fn max_txn_pages(mut self, max: usize) -> Self {
        self.max_txn_pages = max;
        self
    }

    /// Select FIFO or LIFO GC-record reclaim order.
    pub fn reclaim_policy(mut self, policy: ReclaimPolicy) -> Self {
        self.reclaim_policy = policy;
        self
    }

    /// Install a handle-slow-reader callback (never invoked automatically).
    pub fn hsr_callback(mut self, callback: HsrCallback) -> Self {
        self.hsr_callback = Some(callback);
        self
    }

    fn build_config(&self) -> EnvConfig {
        EnvConfig {
            use_segregated_freelist: self.use_segregated_freelist,
            max_txn_pages: self.max_txn_pages,
            reclaim_policy: self.reclaim_policy,
            hsr_callback: self.hsr_callback.clone(),
        }
    }

    /// Set the map size
    pub fn map_size(mut self, size: usize) -> Self {
        self.map_size = size;
        self
    }

    /// Set the maximum number of readers
    pub fn max_readers(mut self, readers: u32) -> Self {
        self.max_readers = readers;
        self
    }

    /// Set the maximum number of named databases
    pub fn max_dbs(mut self, dbs: u32) -> Self {
        self.max_dbs = dbs.min(MAX_DBS);
        self
    }

    /// Set the durability mode
    pub fn durability(mut self, mode: DurabilityMode) -> Self {
        self.durability = mode;
        self
    }





    /// Enable NUMA-aware memory allocation for multi-socket systems
    pub fn use_numa(mut self, enabled: bool) -> Self {
        self.use_numa = enabled;
        self
    }





    /// Build and open the environment
    pub fn open(self, path: impl AsRef<Path>) -> Result<Environment<Open>> {
        let path = path.as_ref();

        // Create directory if it doesn't exist
        std::fs::create_dir_all(path)?;

        let data_path = path.join("data.mdb");
        let _lock_path = path.join("lock.mdb");

        // Create I/O backend
        let mut io: Box<dyn IoBackend> =
            Box::new(MmapBackend::with_options(&data_path, self.map_size as u64)?);

        // Check if this is a new database by trying to read meta pages
        let is_new_db = match io.read_page(META_PAGE_1) {
            Ok(page) => {
                let meta = unsafe { &*(page.data.as_ptr() as *const MetaPage) };
                meta.magic != crate::meta::MAGIC
            }
            Err(_) => true,
        };

        let last_txn_id;
        let mut last_page_id = 4; // after three meta pages and two root pages
        let meta_info;

        if is_new_db {
            // Initialize new database: three meta-pages at pgno 0,1,2, troika elects
            // slot 1 as `recent` (txnid 1) and slot 2 as `tail` for the next commit.
            let mut meta = MetaPage::new();
            meta.mapsize = self.map_size as u64;
            meta.maxreaders = self.max_readers;
            meta.dbs = self.max_dbs;
            meta.free_db.root = PageId(3);
            meta.main_db.root = PageId(4);
            meta.last_pg = PageId(4);
            meta.geo_lower = (self.map_size / crate::page::PAGE_SIZE) as u32;
            meta.geo_upper = (self.map_size / crate::page::PAGE_SIZE) as u32;
            meta.geo_next = 5;

            meta.set_txnid(0);
            meta.sign = crate::meta::METASIGN_WEAK;
            let meta_page0 = Page::from_meta(&meta, META_PAGE_1);
            io.write_page(&meta_page0)?;

            meta.set_txnid(1);
            meta.sign = crate::meta::METASIGN_STEADY;
            let meta_page1 = Page::from_meta(&meta, META_PAGE_2);
            io.write_page(&meta_page1)?;

            // Third meta slot starts as a copy of the genesis meta (txnid 0, weak);
            // it becomes the troika's tail until the second commit overwrites it.
            meta.set_txnid(0);
            meta.sign = crate::meta::METASIGN_WEAK;
            let meta_page2 = Page::from_meta(&meta, META_PAGE_3);
            io.write_page(&meta_page2)?;

            // Initialize free DB root page
            let free_page = Page::new(PageId(3), crate::page::PageFlags::LEAF);
            io.write_page(&free_page)?;

            // Initialize main DB root page
            let main_page = Page::new(PageId(4), crate::page::PageFlags::LEAF);
            io.write_page(&main_page)?;

            // Sync to disk
            io.sync()?;

            last_txn_id = 1;
            meta.set_txnid(1);
            meta_info = meta;
        } else {
            // Load existing meta info
            let inner = Arc::new(EnvInner {
                _path: path.to_path_buf(),
                io,
                map_size: self.map_size,
                txn_id: AtomicU64::new(0),
                write_lock: Mutex::new(()),
                readers: ReaderTable::new(self.max_readers as usize),
                databases: RwLock::new(HashMap::new()),
                _free_pages: RwLock::new(Vec::new()),
                durability: self.durability,
                next_page_id: AtomicU64::new(0),
                config: self.build_config(),
                checksum_mode: self.checksum_mode,
                page_pool: Mutex::new(Vec::new()),
            });

            meta_info = inner.meta()?;
            last_txn_id = meta_info.last_txnid.0;
            last_page_id = meta_info.last_pg.0;

            // Recreate with correct values
            drop(inner);
            io = Box::new(MmapBackend::with_options(&data_path, self.map_size as u64)?);
        }

        // Initialize reader table
        let readers = ReaderTable::new(self.max_readers as usize);

        let inner = Arc::new(EnvInner {
            _path: path.to_path_buf(),
            io,
            map_size: self.map_size,
            txn_id: AtomicU64::new(last_txn_id),
            write_lock: Mutex::new(()),
            readers,
            databases: RwLock::new(HashMap::new()),
            _free_pages: RwLock::new(Vec::new()),
            durability: self.durability,
            next_page_id: AtomicU64::new(last_page_id + 1),
            config: self.build_config(),
            checksum_mode: self.checksum_mode,
            page_pool: Mutex::new(Vec::new()),
        });

        // Initialize main database entry
        {
            let mut dbs = inner.databases.write()
                .expect("Failed to acquire database lock during initialization");
            dbs.insert(None, meta_info.main_db);
        }

        // Note: Named databases will be loaded on-demand from the catalog
        // We can't load them here because we'd need a transaction, but the
        // environment isn't fully constructed yet

        Ok(Environment { inner: Some(inner), _state: PhantomData })
    }
}

impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for Environment<Closed> {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment<Closed> {
    /// Create a new closed environment
    pub fn new() -> Self {
        Self { inner: None, _state: PhantomData }
    }

    /// Open the environment
    pub fn open(self, path: impl AsRef<Path>) -> Result<Environment<Open>> {
        EnvBuilder::new().open(path)
    }
}

impl Environment<Open> {
    /// Begin a read transaction
    pub fn read_txn(&self) -> Result<Transaction<'_, Read>> {
        Transaction::new_read(self)
    }

    /// Begin a write transaction
    pub fn write_txn(&self) -> Result<Transaction<'_, Write>> {
        Transaction::new_write(self)
    }

    /// Get inner reference (for internal use)
    pub(crate) fn inner(&self) -> &Arc<EnvInner> {
        self.inner.as_ref().expect("Environment not open")
    }



    /// Get inner reference (for testing)
    #[cfg(test)]
    #[allow(dead_code)]
    pub(crate) fn inner_test(&self) -> &Arc<EnvInner> {
        self.inner()
    }

    /// Sync data to disk
    pub fn sync(&self) -> Result<()> {
        let inner = self.inner();
        match inner.durability {
            DurabilityMode::NoSync => {
                // No sync requested
                Ok(())
            }
            DurabilityMode::AsyncFlush | DurabilityMode::SyncData | DurabilityMode::FullSync => {
                inner.io.sync()?;
                Ok(())
            }
        }
    }

    /// Force a full synchronous sync regardless of durability mode
    pub fn force_sync(&self) -> Result<()> {
        let inner = self.inner();
        inner.io.sync()?;
        Ok(())
    }
    
    /// Get current space usage information
    pub fn space_info(&self) -> Result<crate::space_info::SpaceInfo> {
        let inner = self.inner();
        let total_pages = inner.io.size_in_pages();
        let next_page_id = inner.next_page_id.load(std::sync::atomic::Ordering::Acquire);
        
        // Get free pages count from a read transaction
        let free_pages = {
            let _txn = self.read_txn()?;
            // Count regular freelist pages
            total_pages.saturating_sub(next_page_id)
        };
        
        let used_pages = next_page_id;
        let map_size = inner.map_size as u64;
        
        Ok(crate::space_info::SpaceInfo::new(
            total_pages,
            used_pages,
            free_pages,
            map_size,
        ))
    }

    /// Get environment statistics
    pub fn stat(&self) -> Result<crate::meta::DbStats> {
        let inner = self.inner();
        let meta = inner.meta()?;

        Ok(crate::meta::DbStats {
            psize: meta.psize,
            depth: meta.main_db.depth,
            branch_pages: meta.main_db.branch_pages,
            leaf_pages: meta.main_db.leaf_pages,
            overflow_pages: meta.main_db.overflow_pages,
            entries: meta.main_db.entries,
        })
    }
}

impl<S: State> Drop for Environment<S> {
    fn drop(&mut self) {
        if let Some(_inner) = self.inner.take() {
            // Meta page alternation handled in commit
        }
    }
}
