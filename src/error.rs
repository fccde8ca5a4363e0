//! Error types for txnkv operations

use thiserror::Error;

/// Result type alias for txnkv operations
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure the adapter or the shell can report.
///
/// Only `Connection` is fatal, and only at startup. Everything else is printed
/// and the shell moves on to the next command.
#[derive(Error, Debug)]
pub enum Error {
    /// The store could not be opened (bad DSN, unreachable path, ...)
    #[error("connection error: {message}")]
    Connection { message: String },

    /// Get of a key that does not exist
    #[error("key not found: {key}")]
    KeyNotFound { key: String },

    /// Error raised by the sled engine, passed through untouched
    #[error(transparent)]
    Storage(#[from] sled::Error),

    /// Engine-level transaction failure
    #[error("transaction error: {message}")]
    Transaction { message: String },

    /// A scan failed part way; `visited` keys were already handed to the visitor
    #[error("scan aborted after {visited} keys: {source}")]
    ScanAborted {
        visited: u64,
        #[source]
        source: Box<Error>,
    },

    /// Malformed arguments or flags
    #[error("{message}")]
    Parse { message: String },

    /// First token of a line is not a known command
    #[error("unknown command: {name}")]
    UnknownCommand { name: String },

    /// Output stream or history file failures
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// Line editor failure in the interactive shell
    #[error("line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl Error {
    /// Create a connection error
    pub fn connection<S: Into<String>>(msg: S) -> Self {
        Error::Connection {
            message: msg.into(),
        }
    }

    /// Create a key not found error
    pub fn key_not_found<S: Into<String>>(key: S) -> Self {
        Error::KeyNotFound { key: key.into() }
    }

    /// Create a transaction error
    pub fn transaction<S: Into<String>>(msg: S) -> Self {
        Error::Transaction {
            message: msg.into(),
        }
    }

    /// Create a parse error
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        Error::Parse {
            message: msg.into(),
        }
    }

    /// Create an unknown command error
    pub fn unknown_command<S: Into<String>>(name: S) -> Self {
        Error::UnknownCommand { name: name.into() }
    }

    /// Wrap a failure that interrupted a scan after `visited` keys
    pub fn scan_aborted(visited: u64, source: Error) -> Self {
        Error::ScanAborted {
            visited,
            source: Box::new(source),
        }
    }

    /// Number of keys a scan got through before this error, if it was a scan
    pub fn visited(&self) -> Option<u64> {
        match self {
            Error::ScanAborted { visited, .. } => Some(*visited),
            _ => None,
        }
    }
}
