//! In-memory storage backend for testing.
//!
//! Rows are kept in ordered maps wrapped in `Arc<RwLock<_>>`, so range
//! queries see sort keys in the same byte order DynamoDB uses.
//!
//! # Example
//!
//! ```rust,ignore
//! use gymdb::storage::inmemory::MemoryStore;
//!
//! let store = MemoryStore::new();
//! // Use store for testing...
//! ```

mod store;

pub use store::MemoryStore;
