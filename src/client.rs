//! Transactional store client
//!
//! Every call runs in its own transaction: begin, operate, and for mutations
//! commit. Nothing is retried; errors from the store come back as they are.

use log::{debug, info};

use crate::error::{Error, Result};
use crate::escape::quote;
use crate::store::{self, TxnStore};

/// Client for a transactional key-value store
///
/// # Example
///
/// ```rust,no_run
/// use txnkv::TxnClient;
///
/// let client = TxnClient::dial("sled://./data")?;
/// client.set(b"key", b"value")?;
/// let value = client.get(b"key")?;
/// client.delete(b"key")?;
/// # Ok::<(), txnkv::Error>(())
/// ```
pub struct TxnClient {
    store: Box<dyn TxnStore>,
}

impl TxnClient {
    /// Open the store named by `url`
    ///
    /// # Errors
    ///
    /// * `Error::Connection` if the url is malformed or the store cannot be opened
    pub fn dial(url: &str) -> Result<Self> {
        info!("Opening store at {}", url);
        let store = store::open(url)?;
        info!("Opened store at {}", url);
        Ok(Self { store })
    }

    /// Wrap an already opened store
    pub fn with_store(store: Box<dyn TxnStore>) -> Self {
        Self { store }
    }

    /// Get the value of `key`
    ///
    /// # Errors
    ///
    /// * `Error::KeyNotFound` if the key does not exist
    /// * any error from beginning the transaction or reading
    pub fn get(&self, key: &[u8]) -> Result<Vec<u8>> {
        debug!("GET {}", quote(key));
        let txn = self.store.begin()?;
        txn.get(key)?
            .ok_or_else(|| Error::key_not_found(quote(key)))
    }

    /// Set `key` to `value` and commit
    ///
    /// A failed commit is reported even though the write itself was accepted.
    pub fn set(&self, key: &[u8], value: &[u8]) -> Result<()> {
        debug!("SET {} ({} bytes)", quote(key), value.len());
        let mut txn = self.store.begin()?;
        txn.set(key, value)?;
        txn.commit()
    }

    /// Delete `key` and commit
    ///
    /// Deleting a key that does not exist is not an error.
    pub fn delete(&self, key: &[u8]) -> Result<()> {
        debug!("DELETE {}", quote(key));
        let mut txn = self.store.begin()?;
        txn.delete(key)?;
        txn.commit()
    }

    /// Walk keys in ascending order starting at the first key >= `begin`
    ///
    /// `visit` is called for each pair and returns whether to keep going. The
    /// walk also stops after `limit` visited keys (a negative limit means no
    /// limit) or when the keys run out. The key `visit` refused is not counted.
    ///
    /// With `delete`, every visited key is deleted in the scan's transaction,
    /// which is committed once at the end. Either all visited keys are deleted
    /// or none are.
    ///
    /// # Returns
    ///
    /// The number of keys visited
    ///
    /// # Errors
    ///
    /// * the error from beginning the transaction or seeking, before any visit
    /// * `Error::ScanAborted` carrying the visit count for anything later
    pub fn scan<F>(&self, begin: &[u8], limit: i64, delete: bool, mut visit: F) -> Result<u64>
    where
        F: FnMut(&[u8], &[u8]) -> bool,
    {
        debug!("SCAN from {} limit {} delete {}", quote(begin), limit, delete);
        let mut txn = self.store.begin()?;
        let iter = txn.seek(begin)?;

        let mut remaining = limit;
        let mut visited = 0u64;
        for item in iter {
            if remaining == 0 {
                break;
            }
            let (key, value) = item.map_err(|e| Error::scan_aborted(visited, e))?;
            if !visit(&key, &value) {
                break;
            }
            if delete {
                txn.delete(&key)
                    .map_err(|e| Error::scan_aborted(visited, e))?;
            }
            visited += 1;
            if remaining > 0 {
                remaining -= 1;
            }
        }

        if delete {
            txn.commit().map_err(|e| Error::scan_aborted(visited, e))?;
        }
        debug!("SCAN visited {} keys", visited);
        Ok(visited)
    }
}
