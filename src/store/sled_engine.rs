// src/store/sled_engine.rs
use log::{debug, warn};
use sled::{Batch, Db, Mode, Tree};

use super::kv_trait::{Buffered, KvIter, Transaction, TxnStore, WriteBuffer};
use crate::error::{Error, Result};

const TREE_NAME: &[u8] = b"txnkv";

/// Tuning knobs accepted in the query string of a `sled://` DSN.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SledOptions {
    pub cache_capacity: Option<u64>,
    pub low_space: bool,
    pub temporary: bool,
}

pub struct SledEngine {
    db: Db,
    tree: Tree,
}

impl SledEngine {
    pub fn open(path: &str, options: &SledOptions) -> Result<Self> {
        let mut config = sled::Config::new()
            .path(path)
            .temporary(options.temporary)
            .mode(if options.low_space {
                Mode::LowSpace
            } else {
                Mode::HighThroughput
            });
        if let Some(capacity) = options.cache_capacity {
            config = config.cache_capacity(capacity);
        }
        let db = config.open()?;
        let tree = db.open_tree(TREE_NAME)?;
        debug!("opened sled tree at {} ({} keys)", path, tree.len());
        Ok(Self { db, tree })
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

impl Drop for SledEngine {
    fn drop(&mut self) {
        if let Err(e) = self.db.flush() {
            warn!("failed to flush sled on close: {}", e);
        }
    }
}

impl TxnStore for SledEngine {
    fn begin(&self) -> Result<Box<dyn Transaction>> {
        Ok(Box::new(SledTransaction {
            tree: self.tree.clone(),
            writes: WriteBuffer::new(),
        }))
    }
}

pub struct SledTransaction {
    tree: Tree,
    writes: WriteBuffer,
}

impl Transaction for SledTransaction {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>> {
        match self.writes.lookup(key) {
            Buffered::Value(value) => Ok(Some(value.to_vec())),
            Buffered::Deleted => Ok(None),
            Buffered::Untouched => Ok(self.tree.get(key)?.map(|ivec| ivec.to_vec())),
        }
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
        let iter = self
            .tree
            .range::<&[u8], _>(begin..)
            .map(|item| item.map(|(k, v)| (k.to_vec(), v.to_vec())).map_err(Error::from));
        Ok(Box::new(iter))
    }

    fn commit(&mut self) -> Result<()> {
        if self.writes.is_empty() {
            return Ok(());
        }
        let mut batch = Batch::default();
        for (key, value) in self.writes.drain() {
            match value {
                Some(value) => batch.insert(key, value),
                None => batch.remove(key),
            }
        }
        self.tree.apply_batch(batch)?;
        self.tree.flush()?;
        Ok(())
    }
}
