//! # Command Parser
//!
//! This module turns one line of shell input into a `Command`.
//!
//! ## Grammar
//!
//! Lines are split on whitespace; the first word names the command
//! (case-insensitive):
//!
//! - `get <key> [key2] ...` - Print the value of each key
//! - `set <key> <value>` - Store a key-value pair
//! - `delete <key> [key2] ...` or `del ...` - Delete keys
//! - `scan [begin] [-n limit] [-p] [-u until] [-d]` - Walk keys in order
//! - `quit` or `exit` - Leave the shell
//!
//! `scan` flags follow the same grammar as the `txnkv scan` subcommand (see
//! `cli::ScanArgs`): they may appear anywhere on the line, have long forms
//! `--limit`, `--prefix`, `--until` (or `-U`) and `--delete`, take attached
//! values (`-n5`, `--limit=5`, `-d=false`), group (`-pd`), and stop at `--`.
//!
//! ## Escapes
//!
//! Keys, values and scan bounds may contain `\xHH` byte literals and `\\`
//! unless escaping is turned off.
//!
//! ## Example Usage
//! ```text
//! set user:123 john_doe
//! get user:123 user:456
//! set bin\x00key \xde\xad
//! scan user: -p -n 10
//! scan -u user:200 user:100 -d
//! delete user:123
//! ```

use crate::cli::ScanLine;
use crate::config::ScanOptions;
use crate::error::{Error, Result};
use crate::escape::unescape;

/// The commands the shell understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Read one or more keys
    Get {
        /// Keys to look up, in order
        keys: Vec<Vec<u8>>,
    },

    /// Store a key-value pair
    Set {
        /// The key to store
        key: Vec<u8>,
        /// The value to associate with the key
        value: Vec<u8>,
    },

    /// Delete one or more keys
    Delete {
        /// Keys to delete, in order
        keys: Vec<Vec<u8>>,
    },

    /// Walk keys in ascending order
    Scan(ScanOptions),

    /// Leave the shell
    Quit,
}

impl Command {
    /// Name used in messages and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Get { .. } => "get",
            Command::Set { .. } => "set",
            Command::Delete { .. } => "delete",
            Command::Scan(_) => "scan",
            Command::Quit => "quit",
        }
    }
}

/// Converts shell lines and arguments into `Command` values.
///
/// The parser holds no per-command state; every call builds a fresh command.
#[derive(Debug, Clone, Copy)]
pub struct Protocol {
    escape: bool,
}

impl Default for Protocol {
    fn default() -> Self {
        Self::new(true)
    }
}

impl Protocol {
    /// Create a parser. With `escape` off, arguments are taken literally.
    pub fn new(escape: bool) -> Self {
        Self { escape }
    }

    /// Parse one line of input.
    ///
    /// # Errors
    /// - `Error::UnknownCommand` if the first word is not a command
    /// - `Error::Parse` for an empty line, missing arguments, bad flags or bad
    ///   escapes
    pub fn parse(&self, input: &str) -> Result<Command> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let (name, args) = match parts.split_first() {
            Some((name, args)) => (*name, args),
            None => return Err(Error::parse("empty command")),
        };

        match name.to_ascii_lowercase().as_str() {
            "get" => Ok(Command::Get {
                keys: self.keys("get", args)?,
            }),
            "set" => self.set(args),
            "delete" | "del" => Ok(Command::Delete {
                keys: self.keys("delete", args)?,
            }),
            "scan" => Ok(Command::Scan(self.scan(args)?)),
            "quit" | "exit" => Ok(Command::Quit),
            _ => Err(Error::unknown_command(name)),
        }
    }

    /// Turn one argument into bytes.
    pub fn decode(&self, arg: &str) -> Result<Vec<u8>> {
        if self.escape {
            unescape(arg)
        } else {
            Ok(arg.as_bytes().to_vec())
        }
    }

    /// Keys for `get` and `delete`; at least one is required.
    pub fn keys<S: AsRef<str>>(&self, command: &str, args: &[S]) -> Result<Vec<Vec<u8>>> {
        if args.is_empty() {
            return Err(Error::parse(format!("{} requires at least one key", command)));
        }
        args.iter().map(|arg| self.decode(arg.as_ref())).collect()
    }

    /// Key and value for `set`.
    pub fn set<S: AsRef<str>>(&self, args: &[S]) -> Result<Command> {
        match args {
            [key, value] => Ok(Command::Set {
                key: self.decode(key.as_ref())?,
                value: self.decode(value.as_ref())?,
            }),
            _ => Err(Error::parse("set requires <key> <value>")),
        }
    }

    /// Options for `scan`: flags anywhere, then at most one begin key.
    pub fn scan(&self, args: &[&str]) -> Result<ScanOptions> {
        ScanLine::parse_words(args)?.into_options(self)
    }
}
