//! # Command Shell
//!
//! Executes parsed commands against the store and formats the results:
//!
//! - `get`: the quoted key, then the quoted value, one per line
//! - `set` / `delete`: nothing on success
//! - `scan`: one `"key":"value"` line per visited pair, then `Total scanned <n>`
//!
//! The shell runs one command at a time. Per-command failures are reported and
//! the shell keeps going; only the caller decides whether a failure ends the
//! process.

use std::io::{self, BufRead, Write};

use log::{debug, warn};

use crate::client::TxnClient;
use crate::config::ScanOptions;
use crate::error::{Error, Result};
use crate::escape::quote;
use crate::protocol::{Command, Protocol};

/// Write `err` the way the shell shows failures. A failed scan is followed by
/// the number of keys it got through.
pub fn write_error<O: Write>(out: &mut O, err: &Error) -> io::Result<()> {
    writeln!(out, "(error) {}", err)?;
    if let Some(visited) = err.visited() {
        writeln!(out, "Total scanned {}", visited)?;
    }
    out.flush()
}

/// What the caller should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<W: Write> {
    client: TxnClient,
    protocol: Protocol,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(client: TxnClient, protocol: Protocol, out: W) -> Self {
        Self {
            client,
            protocol,
            out,
        }
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    /// Give back the output stream.
    pub fn into_output(self) -> W {
        self.out
    }

    /// Parse and run one line. Blank lines do nothing.
    pub fn process_line(&mut self, line: &str) -> Result<Flow> {
        if line.trim().is_empty() {
            return Ok(Flow::Continue);
        }
        let command = self.protocol.parse(line)?;
        self.execute(command)
    }

    /// Run one command.
    pub fn execute(&mut self, command: Command) -> Result<Flow> {
        debug!("executing {}", command.name());
        match command {
            Command::Get { keys } => self.get(&keys)?,
            Command::Set { key, value } => self.client.set(&key, &value)?,
            Command::Delete { keys } => {
                for key in &keys {
                    self.client.delete(key)?;
                }
            }
            Command::Scan(opts) => self.scan(&opts)?,
            Command::Quit => return Ok(Flow::Quit),
        }
        self.out.flush()?;
        Ok(Flow::Continue)
    }

    /// Print a failed command's error. Unknown commands only get a log line.
    pub fn report(&mut self, err: &Error) -> Result<()> {
        match err {
            Error::UnknownCommand { name } => warn!("unknown command {}", name),
            _ => write_error(&mut self.out, err)?,
        }
        Ok(())
    }

    /// Run lines from `input` until it ends or a line asks to quit.
    ///
    /// A line that is not valid UTF-8 fails like any other bad command.
    ///
    /// # Returns
    /// * `bool` - true if every line succeeded
    pub fn run_lines<R: BufRead>(&mut self, input: R) -> Result<bool> {
        let mut all_ok = true;
        for line in input.split(b'\n') {
            let mut line = line?;
            if line.last() == Some(&b'\r') {
                line.pop();
            }
            let outcome = match String::from_utf8(line) {
                Ok(line) => self.process_line(&line),
                Err(_) => Err(Error::parse("line is not valid UTF-8")),
            };
            match outcome {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => {
                    all_ok = false;
                    self.report(&e)?;
                }
            }
        }
        Ok(all_ok)
    }

    fn get(&mut self, keys: &[Vec<u8>]) -> Result<()> {
        for key in keys {
            writeln!(self.out, "{}", quote(key))?;
            let value = self.client.get(key)?;
            writeln!(self.out, "{}", quote(&value))?;
        }
        Ok(())
    }

    fn scan(&mut self, opts: &ScanOptions) -> Result<()> {
        let out = &mut self.out;
        let mut output_error = None;

        let result = self
            .client
            .scan(&opts.begin, opts.limit, opts.delete, |key, value| {
                if !opts.admits(key) {
                    return false;
                }
                match writeln!(out, "{}:{}", quote(key), quote(value)) {
                    Ok(()) => true,
                    Err(e) => {
                        output_error = Some(e);
                        false
                    }
                }
            });

        if let Some(e) = output_error {
            return Err(e.into());
        }
        match result {
            Ok(visited) => {
                writeln!(self.out, "Total scanned {}", visited)?;
                Ok(())
            }
            // The total is printed after the error when it is reported
            Err(e) if e.visited().is_some() => Err(e),
            Err(e) => Err(Error::scan_aborted(0, e)),
        }
    }
}
