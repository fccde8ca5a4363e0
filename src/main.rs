//! # txnkv - Command Line Entry Point
//!
//! Three modes:
//! - **One-shot**: `txnkv --url <dsn> COMMAND ...` runs a single command and exits
//! - **REPL**: `txnkv --url <dsn>` with a terminal on stdin starts the interactive shell
//! - **Pipe**: `echo "get foo" | txnkv --url <dsn>` runs stdin line by line
//!
//! Exit code is 0 on success and 1 when the store cannot be opened or a
//! command fails.

use std::io::{self, IsTerminal};
use std::process;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Env;

use txnkv::cli::Cli;
use txnkv::shell::write_error;
use txnkv::{repl, Protocol, Shell, TxnClient};

/// Main entry point for txnkv.
///
/// 1. Initializes logging using env_logger (RUST_LOG overrides the `warn` default)
/// 2. Parses the command line
/// 3. Opens the store; failing to do so is fatal
/// 4. Runs one command, the REPL, or stdin lines
fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let config = cli.shell_config();

    let client = TxnClient::dial(&config.url)
        .with_context(|| format!("failed to connect to {}", config.url))?;
    let mut shell = Shell::new(client, Protocol::new(config.escape), io::stdout().lock());

    let code = match cli.command {
        Some(command) => {
            let result = command
                .into_command(shell.protocol())
                .and_then(|command| shell.execute(command));
            match result {
                Ok(_) => 0,
                Err(e) => {
                    write_error(&mut io::stderr().lock(), &e)?;
                    1
                }
            }
        }
        None if io::stdin().is_terminal() => {
            repl::run(&mut shell, &config)?;
            0
        }
        None => {
            if shell.run_lines(io::stdin().lock())? {
                0
            } else {
                1
            }
        }
    };

    // Close the store before exiting so pending writes reach disk
    drop(shell);
    process::exit(code);
}
