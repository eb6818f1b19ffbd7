//! Free page management and recycling
//!
//! This module manages the list of free pages that can be reused
//! instead of allocating new pages from the end of the file.

use crate::error::{Error, PageId, Result, TransactionId};
use crate::meta::DbInfo;
use crate::page::{Page, PageFlags, PAGE_SIZE};
use crate::pnl::Pnl;
use crate::txn::{Transaction, Write};
use std::collections::BTreeMap;

/// GC-record scan order (spec §4.F step 4).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReclaimPolicy {
    /// Scan forward from the last reclaimed id toward `oldest_reader` (default).
    #[default]
    Fifo,
    /// Scan backward from `oldest_reader - 1`, skipping ids already reclaimed this txn.
    Lifo,
}

/// Maximum number of page numbers a single GC record may hold before the
/// retired-list for a transaction must be split across additional ("bigfoot")
/// records. Mirrors `maxgc_ov1page = (psize - headerlen) / sizeof(pgno) - 1`.
pub const MAXGC_OV1PAGE: usize =
    (PAGE_SIZE - crate::page::PageHeader::SIZE) / std::mem::size_of::<u64>() - 1;

/// Free list manager
#[derive(Clone)]
pub struct FreeList {
    /// Loose pages: already safe to reuse, drawn from first on every allocation.
    free_pages: Pnl,
    /// Pages freed in the current transaction (cannot be reused yet)
    pending_pages: Pnl,
    /// Map of transaction ID to pages retired by that transaction, still behind
    /// `oldest_reader` or not yet pulled into `free_pages` one record at a time.
    txn_free_pages: BTreeMap<TransactionId, Pnl>,
    /// Oldest reader transaction ID (pages can only be reused after this)
    oldest_reader: TransactionId,
    /// Track if the freelist needs to be saved
    needs_save: bool,
    /// FIFO vs LIFO GC-record scan order.
    policy: ReclaimPolicy,
    /// LIFO stack of GC-record txn-ids already consumed by this write transaction,
    /// so a backward LIFO scan does not reclaim the same record twice.
    lifo_reclaimed: Vec<TransactionId>,
}

impl Default for FreeList {
    fn default() -> Self {
        Self::new()
    }
}

impl FreeList {
    /// Create a new free list
    pub fn new() -> Self {
        Self {
            free_pages: Pnl::default(),
            pending_pages: Pnl::default(),
            txn_free_pages: BTreeMap::new(),
            oldest_reader: TransactionId(0),
            needs_save: false,
            policy: ReclaimPolicy::Fifo,
            lifo_reclaimed: Vec::new(),
        }
    }

    /// Select the GC-record scan order used by future reclaims.
    pub fn set_policy(&mut self, policy: ReclaimPolicy) {
        self.policy = policy;
    }

    /// Record that a GC record has been consumed this transaction, so a LIFO scan
    /// skips it on a later call within the same commit cycle.
    pub fn mark_reclaimed(&mut self, txn_id: TransactionId) {
        self.lifo_reclaimed.push(txn_id);
    }

    /// Load free pages from the free database
    pub fn load<'txn>(
        txn: &Transaction<'txn, impl crate::txn::mode::Mode>,
        free_db: &DbInfo,
    ) -> Result<Self> {
        let mut freelist = Self::new();

        if free_db.root.0 == 0 {
            // No free pages yet
            return Ok(freelist);
        }

        // Create a cursor to iterate through the free database
        // The free database stores: txn_id -> list of page IDs
        let current_page_id = free_db.root;
        let mut stack = vec![current_page_id];

        while let Some(page_id) = stack.pop() {
            let page = txn.get_page(page_id)?;

            if page.header.flags.contains(PageFlags::LEAF) {
                // Process leaf page entries
                for i in 0..page.header.num_keys as usize {
                    let node = page.node(i)?;
                    let key_bytes = node.key()?;
                    let page_list_bytes = node.value()?;

                    // Keys are either 8 bytes (primary GC record for a txn-id) or
                    // 8+4 bytes (a "bigfoot" continuation: base txn-id + segment index).
                    if key_bytes.len() != 8 && key_bytes.len() != 12 {
                        continue;
                    }
                    let txn_id = TransactionId(u64::from_le_bytes(
                        key_bytes[0..8].try_into().expect("checked length"),
                    ));

                    // Decode page list (array of 8-byte page IDs)
                    let mut pages = Vec::new();
                    for chunk in page_list_bytes.chunks(8) {
                        if chunk.len() == 8 {
                            let page_id = PageId(u64::from_le_bytes([
                                chunk[0], chunk[1], chunk[2], chunk[3], chunk[4], chunk[5],
                                chunk[6], chunk[7],
                            ]));
                            pages.push(page_id);
                        }
                    }

                    freelist
                        .txn_free_pages
                        .entry(txn_id)
                        .or_insert_with(|| Pnl::new(usize::MAX))
                        .merge_slice(&{
                            let mut sorted = pages;
                            sorted.sort();
                            sorted.dedup();
                            sorted
                        })?;
                }
            } else {
                // Branch page - add children to stack
                for i in 0..page.header.num_keys as usize {
                    let node = page.node(i)?;
                    stack.push(node.page_number()?);
                }
            }
        }

        Ok(freelist)
    }

    /// Set the oldest reader transaction ID
    pub fn set_oldest_reader(&mut self, txn_id: TransactionId) {
        self.oldest_reader = txn_id;
    }

    /// Add a page to the free list (to be freed after transaction commits)
    pub fn free_page(&mut self, page_id: PageId) {
        let _ = self.pending_pages.append(page_id);
    }

    /// Try to allocate a page from the free list, in the order spec'd for the
    /// allocator: first the loose pool (pages already safe to reuse), then an
    /// incremental scan of the oldest (or, under LIFO, newest-eligible) still-
    /// pending GC record, one record at a time rather than eagerly draining
    /// every eligible record up front. Returns `None` only once both are
    /// exhausted, leaving the caller to grow the file.
    pub fn alloc_page(&mut self) -> Option<PageId> {
        if let Some(page_id) = self.pop_loose() {
            return Some(page_id);
        }
        self.reclaim_one_record()?;
        self.pop_loose()
    }

    fn pop_loose(&mut self) -> Option<PageId> {
        match self.policy {
            ReclaimPolicy::Fifo => self.free_pages.pop_first(),
            ReclaimPolicy::Lifo => self.free_pages.pop_last(),
        }
    }

    /// Pull exactly one eligible GC record's pages into the loose pool, using
    /// `scan_for_sequence` to report whether that record held a contiguous run
    /// (useful to callers that need more than a single page; `alloc_page`
    /// itself only needs the first id either way). Returns `None` if no
    /// record is currently eligible.
    fn reclaim_one_record(&mut self) -> Option<()> {
        let candidate = match self.policy {
            ReclaimPolicy::Fifo => self
                .txn_free_pages
                .keys()
                .copied()
                .find(|id| self.is_reclaimable(*id)),
            ReclaimPolicy::Lifo => self
                .txn_free_pages
                .keys()
                .rev()
                .copied()
                .find(|id| self.is_reclaimable(*id) && !self.lifo_reclaimed.contains(id)),
        }?;

        let record = self.txn_free_pages.remove(&candidate)?;
        // scan_for_sequence(1) degenerates to "does this record hold any page"; kept
        // as the hook multi-page allocation will call with n > 1 once it exists.
        let _ = record.scan_for_sequence(1);
        self.free_pages.merge(&record).ok()?;
        if self.policy == ReclaimPolicy::Lifo {
            self.lifo_reclaimed.push(candidate);
        }
        Some(())
    }

    fn is_reclaimable(&self, txn_id: TransactionId) -> bool {
        self.oldest_reader.0 == 0 || txn_id.0 < self.oldest_reader.0
    }

    /// Commit pending pages to the free list
    /// This should be called after a transaction commits successfully
    pub fn commit_pending(&mut self, txn_id: TransactionId) {
        if !self.pending_pages.is_empty() {
            // Store pending pages with this transaction ID
            let pages = std::mem::replace(&mut self.pending_pages, Pnl::default());
            self.txn_free_pages.insert(txn_id, pages);
            self.needs_save = true;
        }

        // Check which pages can be made available for reuse
        self.update_free_pages();
    }

    /// Update the free pages based on the oldest reader
    pub fn update_free_pages(&mut self) {
        // Remove transactions that are safe to reuse
        let safe_txns: Vec<TransactionId> =
            self.txn_free_pages.keys().copied().filter(|id| self.is_reclaimable(*id)).collect();

        // Move pages from safe transactions to free_pages
        for txn_id in safe_txns {
            if let Some(pages) = self.txn_free_pages.remove(&txn_id) {
                let _ = self.free_pages.merge(&pages);
            }
        }
    }

    /// Get serialized freelist data for saving.
    ///
    /// A retired-list larger than [`MAXGC_OV1PAGE`] entries does not fit in a single
    /// GC record; it is split ("bigfoot") into a primary 8-byte-keyed record plus one
    /// or more 12-byte-keyed continuation records (`txn_id || segment_index`), all
    /// consumed together by [`FreeList::load`].
    pub fn get_save_data(&self) -> Vec<(Vec<u8>, Vec<u8>)> {
        let mut result = Vec::new();

        for (&txn_id, pages) in &self.txn_free_pages {
            for (segment, chunk) in pages.as_slice().chunks(MAXGC_OV1PAGE).enumerate() {
                let key = if segment == 0 {
                    txn_id.0.to_le_bytes().to_vec()
                } else {
                    let mut key = txn_id.0.to_le_bytes().to_vec();
                    key.extend_from_slice(&(segment as u32).to_le_bytes());
                    key
                };

                let mut value = Vec::with_capacity(chunk.len() * 8);
                for page_id in chunk {
                    value.extend_from_slice(&page_id.0.to_le_bytes());
                }

                result.push((key, value));
            }
        }

        result
    }

    /// Get the number of free pages
    pub fn len(&self) -> usize {
        self.free_pages.len()
    }

    /// Check if the free list is empty
    pub fn is_empty(&self) -> bool {
        self.free_pages.is_empty()
    }

    /// Get the number of pending pages
    pub fn pending_len(&self) -> usize {
        self.pending_pages.len()
    }

    /// Check if there are any transaction free pages
    pub fn has_txn_free_pages(&self) -> bool {
        !self.txn_free_pages.is_empty()
    }

    /// Check if the freelist needs to be saved
    pub fn needs_save(&self) -> bool {
        self.needs_save
    }

    /// Persist this freelist's outstanding GC records into the free-database
    /// B+Tree, allocating a root leaf first if the free database doesn't have
    /// one yet. Writes through the ordinary `BTree::insert` COW path, same as
    /// any other database, rather than the bulk leaf/branch builder `commit()`
    /// uses for the records gathered fresh at commit time.
    pub fn save(&mut self, txn: &mut Transaction<'_, Write>, free_db: &mut DbInfo) -> Result<()> {
        if free_db.root.0 == 0 {
            let (root_id, root_page) = txn.alloc_page(PageFlags::LEAF)?;
            root_page.header.num_keys = 0;
            free_db.root = root_id;
            free_db.leaf_pages = 1;
            free_db.depth = 1;
        }

        let mut root = free_db.root;
        for (key, value) in self.get_save_data() {
            crate::btree::BTree::<crate::comparator::LexicographicComparator>::insert(
                txn, &mut root, free_db, &key, &value,
            )?;
        }
        free_db.root = root;
        self.needs_save = false;
        Ok(())
    }
}

/// Free page header for storing lists of free pages
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct FreePageHeader {
    /// Number of page IDs in this page
    pub count: u16,
    /// Padding for alignment
    pub _pad: u16,
    /// Next free list page (0 if last)
    pub next: PageId,
}

impl FreePageHeader {
    /// Size of the header
    pub const SIZE: usize = std::mem::size_of::<Self>();

    /// Maximum number of page IDs that fit in a page
    pub const MAX_IDS: usize =
        (PAGE_SIZE - crate::page::PageHeader::SIZE - Self::SIZE) / std::mem::size_of::<u64>();
}

/// A page containing a list of free page IDs
pub struct FreePage<'a> {
    page: &'a Page,
}

impl<'a> FreePage<'a> {
    /// Create a free page view from a page
    pub fn from_page(page: &'a Page) -> Result<Self> {
        if !page.header.flags.contains(PageFlags::OVERFLOW) {
            return Err(Error::InvalidPageType {
                expected: crate::error::PageType::Overflow,
                found: page.header.page_type(),
            });
        }

        Ok(Self { page })
    }

    /// Get the header
    pub fn header(&self) -> &FreePageHeader {
        unsafe { &*(self.page.data.as_ptr() as *const FreePageHeader) }
    }

    /// Get the page IDs
    pub fn page_ids(&self) -> &[PageId] {
        let header = self.header();
        let count = header.count as usize;

        unsafe {
            let ids_ptr = self.page.data.as_ptr().add(FreePageHeader::SIZE) as *const PageId;
            std::slice::from_raw_parts(ids_ptr, count)
        }
    }
}

/// Mutable free page
pub struct FreePageMut<'a> {
    page: &'a mut Page,
}

impl<'a> FreePageMut<'a> {
    /// Create a new free page
    pub fn new(page: &'a mut Page) -> Self {
        page.header.flags = PageFlags::OVERFLOW; // Reuse overflow flag for free pages

        // Initialize header
        let header = FreePageHeader { count: 0, _pad: 0, next: PageId(0) };

        unsafe {
            let header_ptr = page.data.as_mut_ptr() as *mut FreePageHeader;
            *header_ptr = header;
        }

        Self { page }
    }

    /// Get mutable header
    pub fn header_mut(&mut self) -> &mut FreePageHeader {
        unsafe { &mut *(self.page.data.as_mut_ptr() as *mut FreePageHeader) }
    }

    /// Add a page ID to the list
    pub fn add_page_id(&mut self, page_id: PageId) -> Result<()> {
        let count = self.header_mut().count as usize;
        if count >= FreePageHeader::MAX_IDS {
            return Err(Error::Custom("Free page is full".into()));
        }

        unsafe {
            let ids_ptr = self.page.data.as_mut_ptr().add(FreePageHeader::SIZE) as *mut PageId;
            *ids_ptr.add(count) = page_id;
        }

        self.header_mut().count += 1;
        Ok(())
    }

    /// Set the next page
    pub fn set_next(&mut self, next: PageId) {
        self.header_mut().next = next;
    }
}
