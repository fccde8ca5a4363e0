//! # Configuration
//!
//! Two records live here:
//! - `ShellConfig`: settings for the whole process, built once from the
//!   command line (store DSN, escaping, prompt, history file)
//! - `ScanOptions`: settings for a single `scan`, rebuilt for every invocation
//!
//! There is no configuration file and no environment lookup; flags are the
//! only source.

use std::path::PathBuf;

/// Prompt shown by the interactive shell.
pub const DEFAULT_PROMPT: &str = "> ";

/// Process-wide shell settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellConfig {
    /// Store DSN, e.g. `sled://./data` or `memory://`
    pub url: String,

    /// Decode `\xHH` escapes in keys and values. When off, arguments are
    /// taken literally.
    pub escape: bool,

    /// Prompt for the interactive shell
    pub prompt: String,

    /// Where the interactive shell keeps its line history, if anywhere
    pub history: Option<PathBuf>,
}

impl ShellConfig {
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            escape: true,
            prompt: DEFAULT_PROMPT.to_string(),
            history: None,
        }
    }
}

/// Options for one `scan` invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    /// First key to look at; iteration starts at the first key >= `begin`
    pub begin: Vec<u8>,

    /// Maximum number of keys to visit; any negative value means unbounded
    pub limit: i64,

    /// Only visit keys that start with `begin`
    pub prefix: bool,

    /// Stop after the last key <= `until`
    pub until: Option<Vec<u8>>,

    /// Delete every visited key
    pub delete: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            begin: Vec::new(),
            limit: -1,
            prefix: false,
            until: None,
            delete: false,
        }
    }
}

impl ScanOptions {
    /// Whether `key` is inside the bounds set by `prefix` and `until`.
    ///
    /// Keys arrive in ascending order, so the first key outside the bounds
    /// ends the scan.
    pub fn admits(&self, key: &[u8]) -> bool {
        if self.prefix && !key.starts_with(&self.begin) {
            return false;
        }
        match &self.until {
            Some(until) => key <= until.as_slice(),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ShellConfig::new("memory://");
        assert_eq!(config.url, "memory://");
        assert!(config.escape);
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.history, None);

        let opts = ScanOptions::default();
        assert_eq!(opts.limit, -1);
        assert!(opts.begin.is_empty());
        assert!(!opts.prefix && !opts.delete);
    }

    #[test]
    fn test_admits_prefix() {
        let opts = ScanOptions {
            begin: b"user:".to_vec(),
            prefix: true,
            ..Default::default()
        };
        assert!(opts.admits(b"user:1"));
        assert!(opts.admits(b"user:"));
        assert!(!opts.admits(b"users"));
        assert!(!opts.admits(b"v"));
    }

    #[test]
    fn test_admits_until_is_inclusive() {
        let opts = ScanOptions {
            until: Some(b"k5".to_vec()),
            ..Default::default()
        };
        assert!(opts.admits(b"k4"));
        assert!(opts.admits(b"k5"));
        assert!(!opts.admits(b"k50"));
        assert!(!opts.admits(b"k6"));
    }

    #[test]
    fn test_admits_without_bounds() {
        let opts = ScanOptions {
            begin: b"a".to_vec(),
            ..Default::default()
        };
        assert!(opts.admits(b"zzz"));
    }
}
