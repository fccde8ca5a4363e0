//! # In-Memory Transactional Engine
//!
//! This module provides an ordered in-memory storage engine behind the
//! `TxnStore` interface. It backs the `memory://` DSN and most of the tests.
//!
//! ## Implementation
//!
//! The data lives in `RwLock<BTreeMap<Vec<u8>, Vec<u8>>>`:
//! - **Ordered keys**: `BTreeMap` gives the lexicographic byte order scans need
//! - **Buffered writes**: a transaction keeps its writes in a `WriteBuffer`
//! - **Atomic commit**: all buffered writes are applied under one write lock
//!
//! Reads inside a transaction see committed data plus the transaction's own
//! writes. Scans only see committed data.
//!
//! **Note**: This engine is not persistent! All data is lost when the process
//! terminates.

use std::collections::BTreeMap;
use std::ops::Bound;
use std::sync::{Arc, RwLock};

use super::kv_trait::{Buffered, KvIter, KvPair, Transaction, TxnStore, WriteBuffer};
use crate::error::{Error, Result};

type SharedMap = Arc<RwLock<BTreeMap<Vec<u8>, Vec<u8>>>>;

fn poisoned() -> Error {
    Error::transaction("memory store lock poisoned")
}

/// Ordered in-memory storage engine.
///
/// Cloning the engine shares the underlying map.
#[derive(Clone, Default)]
pub struct RwLockEngine {
    data: SharedMap,
}

impl RwLockEngine {
    /// Create an empty engine.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of committed keys.
    pub fn len(&self) -> Result<usize> {
        let data = self.data.read().map_err(|_| poisoned())?;
        Ok(data.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

impl TxnStore for RwLockEngine {
    fn begin(&self) -> Result<Box<dyn Transaction>> {
        Ok(Box::new(RwLockTransaction {
            data: Arc::clone(&self.data),
            writes: WriteBuffer::new(),
        }))
    }
}

/// Transaction over a `RwLockEngine`.
pub struct RwLockTransaction {
    data: SharedMap,
    writes: WriteBuffer,
}

impl Transaction for RwLockTransaction {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.writes.lookup(key) {
            Buffered::Value(value) => return Ok(Some(value.to_vec())),
            Buffered::Deleted => return Ok(None),
            Buffered::Untouched => {}
        }
        // Shared read lock, released before returning
        let data = self.data.read().map_err(|_| poisoned())?;
        Ok(data.get(key).cloned())
    }

    fn set(&mut self, key: &[u8], value: &[u8]) -> Result<()> {
        self.writes.put(key, value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.writes.tombstone(key);
        Ok(())
    }

    fn seek(&self, begin: &[u8]) -> Result<KvIter> {
        Ok(Box::new(RangeCursor {
            data: Arc::clone(&self.data),
            next_bound: Bound::Included(begin.to_vec()),
            done: false,
        }))
    }

    fn commit(&mut self) -> Result<()> {
        if self.writes.is_empty() {
            return Ok(());
        }
        // Exclusive write lock - every buffered write lands at once
        let mut data = self.data.write().map_err(|_| poisoned())?;
        for (key, value) in self.writes.drain() {
            match value {
                Some(value) => {
                    data.insert(key, value);
                }
                None => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }
}

/// Walks the map one entry at a time, taking the read lock per step so that
/// the transaction can still commit while a cursor is alive.
struct RangeCursor {
    data: SharedMap,
    next_bound: Bound<Vec<u8>>,
    done: bool,
}

impl Iterator for RangeCursor {
    type Item = Result<KvPair>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let data = match self.data.read() {
            Ok(data) => data,
            Err(_) => {
                self.done = true;
                return Some(Err(poisoned()));
            }
        };
        let range = (self.next_bound.clone(), Bound::Unbounded);
        match data.range::<Vec<u8>, _>(range).next() {
            Some((key, value)) => {
                self.next_bound = Bound::Excluded(key.clone());
                Some(Ok((key.clone(), value.clone())))
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn put(engine: &RwLockEngine, key: &str, value: &str) {
        let mut txn = engine.begin().unwrap();
        txn.set(key.as_bytes(), value.as_bytes()).unwrap();
        txn.commit().unwrap();
    }

    #[test]
    fn test_kv_operations() {
        let engine = RwLockEngine::new();

        // Test basic set and get operations
        put(&engine, "key1", "value1");
        let txn = engine.begin().unwrap();
        assert_eq!(txn.get(b"key1").unwrap(), Some(b"value1".to_vec()));

        // Test overwriting an existing key
        put(&engine, "key1", "new_value");
        let txn = engine.begin().unwrap();
        assert_eq!(txn.get(b"key1").unwrap(), Some(b"new_value".to_vec()));

        // Test delete operation
        let mut txn = engine.begin().unwrap();
        txn.delete(b"key1").unwrap();
        txn.commit().unwrap();
        let txn = engine.begin().unwrap();
        assert_eq!(txn.get(b"key1").unwrap(), None);
        assert!(engine.is_empty().unwrap());
    }

    #[test]
    fn test_uncommitted_writes_are_discarded() {
        let engine = RwLockEngine::new();
        {
            let mut txn = engine.begin().unwrap();
            txn.set(b"ghost", b"boo").unwrap();
            // Own writes are visible inside the transaction
            assert_eq!(txn.get(b"ghost").unwrap(), Some(b"boo".to_vec()));
        }
        assert_eq!(engine.len().unwrap(), 0);
    }

    #[test]
    fn test_buffered_tombstone_hides_committed_value() {
        let engine = RwLockEngine::new();
        put(&engine, "k", "v");

        let mut txn = engine.begin().unwrap();
        txn.delete(b"k").unwrap();
        assert_eq!(txn.get(b"k").unwrap(), None);
    }

    #[test]
    fn test_seek_is_ordered_from_begin() {
        let engine = RwLockEngine::new();
        for key in ["b", "a2", "c", "a1", "a3"] {
            put(&engine, key, "x");
        }

        let txn = engine.begin().unwrap();
        let keys: Vec<Vec<u8>> = txn
            .seek(b"a2")
            .unwrap()
            .map(|pair| pair.unwrap().0)
            .collect();
        assert_eq!(
            keys,
            vec![b"a2".to_vec(), b"a3".to_vec(), b"b".to_vec(), b"c".to_vec()]
        );
    }

    #[test]
    fn test_seek_between_keys_starts_at_next() {
        let engine = RwLockEngine::new();
        put(&engine, "apple", "1");
        put(&engine, "banana", "2");

        let txn = engine.begin().unwrap();
        let mut iter = txn.seek(b"b").unwrap();
        assert_eq!(iter.next().unwrap().unwrap().0, b"banana".to_vec());
        assert!(iter.next().is_none());
    }

    #[test]
    fn test_commit_while_cursor_is_open() {
        let engine = RwLockEngine::new();
        for key in ["a", "b", "c"] {
            put(&engine, key, "x");
        }

        let mut txn = engine.begin().unwrap();
        let iter = txn.seek(b"").unwrap();
        for pair in iter {
            let (key, _) = pair.unwrap();
            txn.delete(&key).unwrap();
        }
        txn.commit().unwrap();
        assert!(engine.is_empty().unwrap());
    }
}
