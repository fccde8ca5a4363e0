//! # txnkv - shell for transactional key-value stores
//!
//! A thin command layer over a transactional, ordered key-value store. Every
//! command opens a transaction, performs one operation and, for mutations,
//! commits.
//!
//! ## Architecture Overview
//!
//! - **Store**: backends behind the `TxnStore` / `Transaction` traits (memory, sled)
//! - **Client**: `TxnClient`, one transaction per Get / Set / Delete / Scan
//! - **Protocol**: parses shell lines into the closed `Command` enum
//! - **Shell**: runs commands and formats their output
//! - **REPL**: line editing, history and completion for interactive use

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod escape;
pub mod protocol;
pub mod repl;
pub mod shell;
pub mod store;

pub use client::TxnClient;
pub use config::{ScanOptions, ShellConfig};
pub use error::{Error, Result};
pub use protocol::{Command, Protocol};
pub use shell::{Flow, Shell};
