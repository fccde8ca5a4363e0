//! # Transactional Store Traits
//!
//! This module defines the interface every storage backend exposes to the
//! client adapter. A backend hands out short-lived transactions; the adapter
//! never touches the engine directly.
//!
//! ## Implementations
//!
//! - `RwLockEngine`: ordered in-memory storage using RwLock<BTreeMap>
//! - `SledEngine`: persistent storage on top of sled

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::error::Result;

/// A key and its value, both raw bytes.
pub type KvPair = (Vec<u8>, Vec<u8>);

/// Forward iterator over committed pairs, in ascending key order.
pub type KvIter = Box<dyn Iterator<Item = Result<KvPair>>>;

/// Handle to an opened store.
///
/// The handle lives for the whole process and is only ever used by one
/// command at a time.
#[cfg_attr(test, mockall::automock)]
pub trait TxnStore {
    /// Start a new transaction.
    fn begin(&self) -> Result<Box<dyn Transaction>>;
}

/// A single transaction.
///
/// Writes are buffered until `commit`, which applies them atomically. Dropping
/// a transaction without committing discards its writes.
#[cfg_attr(test, mockall::automock)]
pub trait Transaction {
    /// Read a key, seeing this transaction's own buffered writes first.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>>;

    /// Buffer a write.
    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()>;

    /// Buffer a tombstone.
    fn delete(&mut self, key: &[u8]) -> Result<()>;

    /// Iterate committed pairs starting at the first key >= `begin`.
    fn seek(&self, begin: &[u8]) -> Result<KvIter>;

    /// Apply every buffered write in one step.
    fn commit(&mut self) -> Result<()>;
}

/// Buffered writes of a transaction. `None` marks a tombstone.
#[derive(Debug, Default)]
pub struct WriteBuffer {
    writes: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
}

/// What the buffer knows about a key.
#[derive(Debug, PartialEq)]
pub enum Buffered<'a> {
    Value(&'a [u8]),
    Deleted,
    Untouched,
}

impl WriteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put(&mut self, key: &[u8], value: &[u8]) {
        self.writes.insert(key.to_vec(), Some(value.to_vec()));
    }

    pub fn tombstone(&mut self, key: &[u8]) {
        self.writes.insert(key.to_vec(), None);
    }

    pub fn lookup(&self, key: &[u8]) -> Buffered<'_> {
        match self.writes.get(key) {
            Some(Some(value)) => Buffered::Value(value),
            Some(None) => Buffered::Deleted,
            None => Buffered::Untouched,
        }
    }

    pub fn len(&self) -> usize {
        self.writes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.writes.is_empty()
    }

    /// Hand over all writes in key order, leaving the buffer empty.
    pub fn drain(&mut self) -> btree_map::IntoIter<Vec<u8>, Option<Vec<u8>>> {
        std::mem::take(&mut self.writes).into_iter()
    }
}
