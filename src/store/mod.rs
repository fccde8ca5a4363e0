//! # Storage Backend Module
//!
//! This module contains the storage components behind the client adapter:
//!
//! - **`kv_trait`**: `TxnStore` and `Transaction`, the interface every backend implements
//! - **`rwlock_engine`**: ordered in-memory storage using RwLock<BTreeMap>
//! - **`sled_engine`**: persistent storage on sled
//!
//! A backend is picked by the scheme of the store DSN:
//!
//! ```text
//! memory://                                  (alias mem://)
//! sled://./data
//! sled:///var/lib/txnkv?cache_capacity=1073741824&mode=low_space
//! sled://scratch?temporary=true
//! ```

pub mod kv_trait;
pub mod rwlock_engine;
pub mod sled_engine;

use std::str::FromStr;

use crate::error::{Error, Result};

// Re-export the traits and engines for convenience
pub use kv_trait::{KvIter, KvPair, Transaction, TxnStore};
pub use rwlock_engine::RwLockEngine;
pub use sled_engine::{SledEngine, SledOptions};

/// A parsed store DSN.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreUrl {
    Memory,
    Sled { path: String, options: SledOptions },
}

impl FromStr for StoreUrl {
    type Err = Error;

    fn from_str(url: &str) -> Result<Self> {
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| Error::connection(format!("missing scheme in store url {:?}", url)))?;

        match scheme.to_ascii_lowercase().as_str() {
            "memory" | "mem" => {
                if !rest.is_empty() {
                    return Err(Error::connection(format!(
                        "memory store takes no path, got {:?}",
                        rest
                    )));
                }
                Ok(StoreUrl::Memory)
            }
            "sled" => {
                let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
                if path.is_empty() {
                    return Err(Error::connection("sled store requires a path"));
                }
                Ok(StoreUrl::Sled {
                    path: path.to_string(),
                    options: parse_sled_options(query)?,
                })
            }
            other => Err(Error::connection(format!(
                "unsupported store scheme {:?} (expected memory:// or sled://)",
                other
            ))),
        }
    }
}

fn parse_sled_options(query: &str) -> Result<SledOptions> {
    let mut options = SledOptions::default();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| Error::connection(format!("sled option {:?} needs a value", pair)))?;
        match name {
            "cache_capacity" => {
                let capacity = value.parse::<u64>().map_err(|e| {
                    Error::connection(format!("invalid cache_capacity {:?}: {}", value, e))
                })?;
                options.cache_capacity = Some(capacity);
            }
            "mode" => {
                options.low_space = match value {
                    "low_space" => true,
                    "high_throughput" => false,
                    _ => {
                        return Err(Error::connection(format!(
                            "invalid mode {:?} (expected low_space or high_throughput)",
                            value
                        )))
                    }
                };
            }
            "temporary" => {
                options.temporary = value.parse::<bool>().map_err(|_| {
                    Error::connection(format!("invalid temporary flag {:?}", value))
                })?;
            }
            _ => {
                return Err(Error::connection(format!("unknown sled option {:?}", name)));
            }
        }
    }
    Ok(options)
}

/// Open the backend named by `url`.
pub fn open(url: &str) -> Result<Box<dyn TxnStore>> {
    match url.parse::<StoreUrl>()? {
        StoreUrl::Memory => Ok(Box::new(RwLockEngine::new())),
        StoreUrl::Sled { path, options } => {
            let engine = SledEngine::open(&path, &options)
                .map_err(|e| Error::connection(format!("failed to open sled at {}: {}", path, e)))?;
            Ok(Box::new(engine))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_memory_url() {
        assert_eq!("memory://".parse::<StoreUrl>().unwrap(), StoreUrl::Memory);
        assert_eq!("MEM://".parse::<StoreUrl>().unwrap(), StoreUrl::Memory);
        assert!("memory://somewhere".parse::<StoreUrl>().is_err());
    }

    #[test]
    fn test_parse_sled_url() {
        let url = "sled:///var/lib/txnkv?cache_capacity=1024&mode=low_space&temporary=true";
        assert_eq!(
            url.parse::<StoreUrl>().unwrap(),
            StoreUrl::Sled {
                path: "/var/lib/txnkv".to_string(),
                options: SledOptions {
                    cache_capacity: Some(1024),
                    low_space: true,
                    temporary: true,
                },
            }
        );

        assert_eq!(
            "sled://./data".parse::<StoreUrl>().unwrap(),
            StoreUrl::Sled {
                path: "./data".to_string(),
                options: SledOptions::default(),
            }
        );
    }

    #[test]
    fn test_parse_url_errors() {
        // Test various error conditions
        assert!("".parse::<StoreUrl>().is_err()); // No scheme
        assert!("./data".parse::<StoreUrl>().is_err()); // Bare path
        assert!("tikv://pd1:2379".parse::<StoreUrl>().is_err()); // Unsupported scheme
        assert!("sled://".parse::<StoreUrl>().is_err()); // Missing path
        assert!("sled://db?cache_capacity=lots".parse::<StoreUrl>().is_err());
        assert!("sled://db?mode=fast".parse::<StoreUrl>().is_err());
        assert!("sled://db?temporary".parse::<StoreUrl>().is_err());
        assert!("sled://db?compression=on".parse::<StoreUrl>().is_err());
    }

    #[test]
    fn test_open_errors_are_connection_errors() {
        let err = open("tikv://pd1:2379").err().unwrap();
        assert!(matches!(err, Error::Connection { .. }));
    }

    #[test]
    fn test_open_memory() {
        let store = open("memory://").unwrap();
        let mut txn = store.begin().unwrap();
        txn.set(b"k", b"v").unwrap();
        txn.commit().unwrap();
        assert_eq!(store.begin().unwrap().get(b"k").unwrap(), Some(b"v".to_vec()));
    }
}
