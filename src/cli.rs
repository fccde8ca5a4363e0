//! Command-line surface.
//!
//! `txnkv --url <dsn> <command> ...` runs one command and exits; without a
//! command the shell starts reading lines.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

use crate::config::{ScanOptions, ShellConfig, DEFAULT_PROMPT};
use crate::error::{Error, Result};
use crate::protocol::{Command, Protocol};

#[derive(Parser, Debug)]
#[command(
    name = "txnkv",
    version,
    about = "Interactive shell for transactional key-value stores"
)]
pub struct Cli {
    /// Store to connect to: memory:// or sled://<path>[?cache_capacity=..&mode=..&temporary=..]
    #[arg(short, long, value_name = "DSN")]
    pub url: String,

    /// Take keys and values literally instead of decoding \xHH escapes
    #[arg(long)]
    pub no_escape: bool,

    /// File to load and save interactive history
    #[arg(long, value_name = "FILE")]
    pub history: Option<PathBuf>,

    /// Prompt for the interactive shell
    #[arg(long, default_value = DEFAULT_PROMPT)]
    pub prompt: String,

    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Subcommand, Debug)]
pub enum CliCommand {
    /// Print the value of each key
    Get {
        #[arg(required = true, value_name = "KEY")]
        keys: Vec<String>,
    },
    /// Store a key-value pair
    Set { key: String, value: String },
    /// Delete keys
    #[command(visible_alias = "del")]
    Delete {
        #[arg(required = true, value_name = "KEY")]
        keys: Vec<String>,
    },
    /// Walk keys in ascending order
    Scan(ScanArgs),
}

/// Flags of `scan`, shared by the one-shot subcommand and shell lines.
///
/// Switches accept an explicit value the way `-d=false` or `--prefix=true`
/// spell it; a bare `-d` means true.
#[derive(Args, Debug)]
pub struct ScanArgs {
    /// First key to look at
    pub begin: Option<String>,

    /// Number of keys to scan, negative for no limit
    #[arg(short = 'n', long, default_value_t = -1, allow_negative_numbers = true)]
    pub limit: i64,

    /// Only scan keys starting with the begin key
    #[arg(
        short,
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true"
    )]
    pub prefix: bool,

    /// Stop after this key
    #[arg(short = 'U', short_alias = 'u', long, value_name = "KEY")]
    pub until: Option<String>,

    /// Delete every scanned key
    #[arg(
        short,
        long,
        action = ArgAction::Set,
        num_args = 0..=1,
        require_equals = true,
        default_value_t = false,
        default_missing_value = "true"
    )]
    pub delete: bool,
}

impl ScanArgs {
    /// Decode the key arguments and build the options for one scan.
    pub fn into_options(self, protocol: &Protocol) -> Result<ScanOptions> {
        Ok(ScanOptions {
            begin: match self.begin {
                Some(begin) => protocol.decode(&begin)?,
                None => Vec::new(),
            },
            limit: self.limit,
            prefix: self.prefix,
            until: self.until.map(|u| protocol.decode(&u)).transpose()?,
            delete: self.delete,
        })
    }
}

/// Arguments of a `scan` typed into the shell, without the command word.
#[derive(Parser, Debug)]
#[command(name = "scan", no_binary_name = true, disable_help_flag = true)]
pub struct ScanLine {
    #[command(flatten)]
    pub args: ScanArgs,
}

impl ScanLine {
    /// Parse the words after `scan`.
    ///
    /// # Errors
    /// * `Error::Parse` with the first line of clap's message
    pub fn parse_words(words: &[&str]) -> Result<ScanArgs> {
        match Self::try_parse_from(words.iter().copied()) {
            Ok(line) => Ok(line.args),
            Err(e) => {
                let rendered = e.to_string();
                let message = rendered.lines().next().unwrap_or_default();
                Err(Error::parse(message.trim_start_matches("error: ")))
            }
        }
    }
}

impl Cli {
    pub fn shell_config(&self) -> ShellConfig {
        ShellConfig {
            escape: !self.no_escape,
            prompt: self.prompt.clone(),
            history: self.history.clone(),
            ..ShellConfig::new(self.url.as_str())
        }
    }
}

impl CliCommand {
    /// Convert parsed arguments into the shell's command type.
    pub fn into_command(self, protocol: &Protocol) -> Result<Command> {
        match self {
            CliCommand::Get { keys } => Ok(Command::Get {
                keys: protocol.keys("get", &keys)?,
            }),
            CliCommand::Set { key, value } => protocol.set(&[key, value]),
            CliCommand::Delete { keys } => Ok(Command::Delete {
                keys: protocol.keys("delete", &keys)?,
            }),
            CliCommand::Scan(args) => Ok(Command::Scan(args.into_options(protocol)?)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("txnkv").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
        ScanLine::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_starts_shell() {
        let cli = parse(&["--url", "memory://"]);
        assert!(cli.command.is_none());

        let config = cli.shell_config();
        assert_eq!(config.url, "memory://");
        assert!(config.escape);
        assert_eq!(config.prompt, "> ");
    }

    #[test]
    fn test_url_is_required() {
        assert!(Cli::try_parse_from(["txnkv", "get", "k"]).is_err());
    }

    #[test]
    fn test_get_and_delete() {
        let protocol = Protocol::default();
        let cli = parse(&["-u", "memory://", "get", "a", "b\\x21"]);
        assert_eq!(
            cli.command.unwrap().into_command(&protocol).unwrap(),
            Command::Get {
                keys: vec![b"a".to_vec(), b"b!".to_vec()]
            }
        );

        let cli = parse(&["-u", "memory://", "del", "a"]);
        assert_eq!(
            cli.command.unwrap().into_command(&protocol).unwrap(),
            Command::Delete {
                keys: vec![b"a".to_vec()]
            }
        );

        assert!(Cli::try_parse_from(["txnkv", "-u", "memory://", "get"]).is_err());
    }

    #[test]
    fn test_set_requires_two_arguments() {
        assert!(Cli::try_parse_from(["txnkv", "-u", "memory://", "set", "k"]).is_err());
        let cli = parse(&["-u", "memory://", "set", "k", "v"]);
        assert_eq!(
            cli.command.unwrap().into_command(&Protocol::default()).unwrap(),
            Command::Set {
                key: b"k".to_vec(),
                value: b"v".to_vec()
            }
        );
    }

    #[test]
    fn test_scan_arguments() {
        let cli = parse(&[
            "--url", "memory://", "--no-escape", "scan", "a\\x00", "-n", "2", "-p", "-U", "a9", "-d",
        ]);
        let protocol = Protocol::new(!cli.no_escape);
        assert_eq!(
            cli.command.unwrap().into_command(&protocol).unwrap(),
            Command::Scan(ScanOptions {
                begin: b"a\\x00".to_vec(),
                limit: 2,
                prefix: true,
                until: Some(b"a9".to_vec()),
                delete: true,
            })
        );
    }

    #[test]
    fn test_scan_defaults_and_negative_limit() {
        let cli = parse(&["-u", "memory://", "scan"]);
        match cli.command.unwrap().into_command(&Protocol::default()).unwrap() {
            Command::Scan(opts) => assert_eq!(opts, ScanOptions::default()),
            other => panic!("expected scan, got {:?}", other),
        }

        let cli = parse(&["-u", "memory://", "scan", "-n", "-1", "-u", "z"]);
        match cli.command.unwrap().into_command(&Protocol::default()).unwrap() {
            Command::Scan(opts) => {
                assert_eq!(opts.limit, -1);
                assert_eq!(opts.until, Some(b"z".to_vec()));
            }
            other => panic!("expected scan, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_switches_take_explicit_values() {
        let cli = parse(&["-u", "memory://", "scan", "-d=false", "--prefix=true", "k"]);
        match cli.command.unwrap().into_command(&Protocol::default()).unwrap() {
            Command::Scan(opts) => {
                assert!(!opts.delete);
                assert!(opts.prefix);
                assert_eq!(opts.begin, b"k".to_vec());
            }
            other => panic!("expected scan, got {:?}", other),
        }
    }

    #[test]
    fn test_scan_line_errors_are_one_line() {
        let err = ScanLine::parse_words(&["-n", "lots"]).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        let message = err.to_string();
        assert!(message.contains("lots"), "{}", message);
        assert!(!message.contains('\n'));
        assert!(!message.starts_with("error:"));
    }
}
