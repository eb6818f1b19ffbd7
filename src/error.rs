//! Error types for zerodb

use std::borrow::Cow;
use std::fmt;
use std::io;
use thiserror::Error;

/// The main error type for zerodb operations
#[derive(Error, Debug, Clone)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(String),

    /// Transaction conflict detected
    #[error("Transaction conflict: {0}")]
    Conflict(ConflictDetails),

    /// Database corruption detected
    #[error("Corruption detected: {details}")]
    Corruption {
        /// Description of the corruption
        details: String,
        /// Page where corruption was detected
        page_id: Option<PageId>,
    },

    /// Key not found in database
    #[error("Key not found")]
    KeyNotFound,

    /// Database is full
    #[error("Database full: current size is {current_size} bytes, max is {max_size} bytes")]
    DatabaseFull {
        /// Current database size
        current_size: u64,
        /// Maximum allowed size
        max_size: u64,
    },

    /// Invalid operation attempted
    #[error("Invalid operation: {0}")]
    InvalidOperation(&'static str),

    /// Version mismatch
    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch {
        /// Expected version
        expected: u32,
        /// Found version
        found: u32,
    },

    /// Bad transaction
    #[error("Bad transaction")]
    BadTransaction,

    /// Invalid database
    #[error("Invalid database")]
    InvalidDatabase,

    /// Page not found
    #[error("Page {0} not found")]
    PageNotFound(PageId),

    /// Encoding error
    #[error("Encoding error: {0}")]
    Encoding(Cow<'static, str>),

    /// Decoding error
    #[error("Decoding error: {0}")]
    Decoding(Cow<'static, str>),

    /// Environment already open
    #[error("Environment already open")]
    EnvironmentAlreadyOpen,

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// Map full - too many databases open
    #[error("Map full: too many databases open")]
    MapFull,

    /// Reader table full
    #[error("Reader table full")]
    ReadersFull,

    /// Transaction too big
    #[error("Transaction too big: {size} bytes")]
    TxnFull {
        /// Size that was attempted
        size: usize,
    },

    /// Cursor is not positioned
    #[error("Cursor is not positioned")]
    NotFound,

    /// Invalid page ID
    #[error("Invalid page ID: {0}")]
    InvalidPageId(PageId),

    /// Invalid page type
    #[error("Invalid page type: expected {expected:?}, found {found:?}")]
    InvalidPageType {
        /// Expected page type
        expected: PageType,
        /// Found page type
        found: PageType,
    },

    /// Database corrupted
    #[error("Database corrupted")]
    Corrupted,

    /// Fatal, unrecoverable error; the containing transaction must abort and
    /// the environment should be treated as needing recovery.
    #[error("Panic: {0}")]
    Panic(Cow<'static, str>),

    /// Invalid argument/state, not covered by a more specific variant.
    #[error("Invalid: {0}")]
    Invalid(Cow<'static, str>),

    /// Too many named sub-databases already open.
    #[error("Too many databases (dbs) open")]
    DbsFull,

    /// Cursor stack exceeded the configured nesting depth.
    #[error("Cursor stack is full")]
    CursorFull,

    /// A single page cannot hold the requested node.
    #[error("Page is full")]
    PageFull,

    /// The memory map could not be extended to the requested size.
    #[error("Unable to extend mapsize")]
    UnableExtendMapsize,

    /// Environment flags/version are incompatible with an existing operation.
    #[error("Incompatible operation for this database")]
    Incompatible,

    /// Invalid reader slot (stale or out of range).
    #[error("Invalid reader slot")]
    BadRslot,

    /// Transaction is not valid for the requested operation (wrong state/thread).
    #[error("Bad transaction")]
    BadTxn,

    /// Supplied key/value size is outside the permitted range.
    #[error("Bad value size")]
    BadValsize,

    /// Invalid database handle (dbi).
    #[error("Bad database handle")]
    BadDbi,

    /// Internal consistency problem detected outside normal error paths.
    #[error("Internal problem: {0}")]
    Problem(Cow<'static, str>),

    /// Resource (write lock, reader slot) is currently held by someone else.
    #[error("Resource busy")]
    Busy,

    /// Operation is only valid on keys with a single value (no MDB_DUPSORT).
    #[error("Key has multiple values")]
    Multivalue,

    /// Environment was not shut down cleanly and needs recovery before writes.
    #[error("Environment needs recovery")]
    WannaRecovery,

    /// Key ordering does not match the database's comparator.
    #[error("Key order mismatch")]
    KeyMismatch,

    /// Key or value exceeds the maximum size this page size allows.
    #[error("Key/value too large for this page size")]
    TooLarge,

    /// Transaction used from a thread other than the one that created it.
    #[error("Transaction used from the wrong thread")]
    ThreadMismatch,

    /// A read transaction overlaps a write transaction on the same thread in
    /// a way that would deadlock.
    #[error("Transaction overlaps another on this thread")]
    TxnOverlapping,

    /// Boot-id changed unexpectedly between commits (duplicate/duplicated clock).
    #[error("Duplicated clock/boot-id")]
    DuplicatedClk,

    /// The GC backlog of reclaimable pages was exhausted before a commit
    /// could satisfy an allocation.
    #[error("GC backlog depleted")]
    BacklogDepleted,

    /// A `NoOverwrite`-flagged put found the key already present.
    #[error("Key already exists")]
    KeyExist {
        /// The value currently stored under the key.
        existing: Vec<u8>,
    },

    /// Custom error
    #[error("{0}")]
    Custom(Cow<'static, str>),
}

impl Error {
    /// Whether this error must abort the containing transaction outright
    /// (the `TXN_ERROR`/`FATAL_ERROR` bits of the commit protocol): once one
    /// of these is observed, the transaction is unusable even for `abort`
    /// cleanup beyond releasing its resources.
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Panic(_) | Error::Problem(_) | Error::Corrupted | Error::Corruption { .. })
    }
}

/// Details about a transaction conflict
#[derive(Debug, Clone)]
pub struct ConflictDetails {
    /// The transaction that had the conflict
    pub txn_id: TransactionId,
    /// The page that was in conflict
    pub conflicting_page: PageId,
    /// The operation that caused the conflict
    pub operation: Operation,
}

impl fmt::Display for ConflictDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "transaction {} conflicted on page {} during {:?}",
            self.txn_id, self.conflicting_page, self.operation
        )
    }
}

/// Type of database operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Read operation
    Read,
    /// Write operation
    Write,
    /// Delete operation
    Delete,
    /// Cursor operation
    Cursor,
}

/// Page identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PageId(pub u64);

impl PageId {
    /// Convert to byte offset in file
    pub fn to_offset(self, page_size: usize) -> u64 {
        self.0 * page_size as u64
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transaction identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TransactionId(pub u64);

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Page type enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageType {
    /// Branch page (internal node)
    Branch,
    /// Leaf page (contains data)
    Leaf,
    /// Overflow page (for large data)
    Overflow,
    /// Meta page (database metadata)
    Meta,
    /// Free page
    Free,
}

/// Result type alias for zerodb operations
pub type Result<T> = std::result::Result<T, Error>;

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err.to_string())
    }
}

/// Convert LMDB error codes to our error type (for compatibility)
impl Error {
    /// Convert from LMDB error code
    pub fn from_err_code(code: i32) -> Self {
        match code {
            libc::ENOENT => Error::NotFound,
            libc::EIO => Error::Io("I/O error".to_string()),
            libc::ENOMEM => Error::Io("out of memory".to_string()),
            libc::EACCES => Error::Io("permission denied".to_string()),
            libc::EBUSY => Error::Io("resource busy".to_string()),
            libc::EINVAL => Error::InvalidParameter("invalid parameter"),
            libc::ENOSPC => Error::MapFull,
            -30799 => Error::KeyNotFound,             // MDB_NOTFOUND
            -30798 => Error::PageNotFound(PageId(0)), // MDB_PAGE_NOTFOUND
            -30797 => Error::Corruption { details: "corrupted database".into(), page_id: None }, // MDB_CORRUPTED
            -30796 => Error::Panic("panic in transaction".into()),  // MDB_PANIC
            -30795 => Error::VersionMismatch { expected: 1, found: 0 }, // MDB_VERSION_MISMATCH
            -30794 => Error::Invalid("invalid environment".into()), // MDB_INVALID
            -30793 => Error::MapFull,                               // MDB_MAP_FULL
            -30792 => Error::DbsFull,                               // MDB_DBS_FULL
            -30791 => Error::ReadersFull,                           // MDB_READERS_FULL
            -30790 => Error::WannaRecovery,                         // MDB_WANNA_RECOVERY
            -30789 => Error::KeyMismatch,                           // MDB_KEYEXIST-adjacent key-order mismatch
            -30788 => Error::TxnFull { size: 0 },                   // MDB_TXN_FULL
            -30787 => Error::CursorFull,                            // MDB_CURSOR_FULL
            -30786 => Error::PageFull,                              // MDB_PAGE_FULL
            -30785 => Error::DatabaseFull { current_size: 0, max_size: 0 }, // MDB_MAP_RESIZED
            -30784 => Error::Incompatible,                          // MDB_INCOMPATIBLE
            -30783 => Error::BadRslot,                              // MDB_BAD_RSLOT
            -30782 => Error::BadTxn,                                // MDB_BAD_TXN
            -30781 => Error::BadValsize,                            // MDB_BAD_VALSIZE
            -30780 => Error::BadDbi,                                // MDB_BAD_DBI
            _ => Error::Custom(format!("unknown error code: {}", code).into()),
        }
    }

    /// Convert to LMDB error code (for compatibility)
    pub fn to_err_code(&self) -> i32 {
        match self {
            Error::Io(_) => libc::EIO,
            Error::KeyNotFound => -30799,
            Error::PageNotFound(_) => -30798,
            Error::Corruption { .. } => -30797,
            Error::VersionMismatch { .. } => -30795,
            Error::InvalidDatabase => -30794,
            Error::MapFull => -30793,
            Error::ReadersFull => -30791,
            Error::WannaRecovery => -30790,
            Error::KeyMismatch => -30789,
            Error::TxnFull { .. } => -30788,
            Error::CursorFull => -30787,
            Error::PageFull => -30786,
            Error::DatabaseFull { .. } => -30785,
            Error::Incompatible => -30784,
            Error::BadRslot => -30783,
            Error::BadTxn | Error::BadTransaction => -30782,
            Error::BadValsize => -30781,
            Error::BadDbi => -30780,
            Error::DbsFull => -30792,
            Error::Panic(_) => -30796,
            Error::Invalid(_) => -30794,
            Error::NotFound => -30799,
            Error::KeyExist { .. } => -30800, // MDB_KEYEXIST
            _ => -1,
        }
    }
}
