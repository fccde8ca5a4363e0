//! Interactive front-end on top of `Shell`.
//!
//! Line editing, history and completion come from rustyline. Ctrl-C, Ctrl-D,
//! `quit` and `exit` all leave the loop.

use std::io::Write;

use log::{debug, warn};
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

use crate::config::ShellConfig;
use crate::error::Result;
use crate::shell::{Flow, Shell};

/// Command names offered on tab, with a usage line each.
const SUGGESTIONS: &[(&str, &str)] = &[
    ("get", "get <key1> [key2] [key3]..."),
    ("set", "set <key> <val>"),
    ("delete", "delete <key> [key2]..."),
    ("scan", "scan [begin] [-n 10] [-p] [-u until] [-d]"),
    ("quit", "quit the shell"),
    ("exit", "quit the shell"),
];

/// Completes the command word; arguments are left alone.
pub struct CommandHelper;

impl CommandHelper {
    fn candidates(word: &str) -> Vec<Pair> {
        let word = word.to_ascii_lowercase();
        SUGGESTIONS
            .iter()
            .filter(|(name, _)| name.starts_with(&word))
            .map(|(name, usage)| Pair {
                display: format!("{:<8}{}", name, usage),
                replacement: name.to_string(),
            })
            .collect()
    }
}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let before = &line[..pos];
        if before.trim_start().contains(char::is_whitespace) {
            return Ok((pos, Vec::new()));
        }
        let start = before.len() - before.trim_start().len();
        Ok((start, Self::candidates(&before[start..])))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {}

impl Validator for CommandHelper {}

impl Helper for CommandHelper {}

/// Read lines from the terminal until the user leaves.
pub fn run<W: Write>(shell: &mut Shell<W>, config: &ShellConfig) -> Result<()> {
    let mut editor: Editor<CommandHelper, DefaultHistory> = Editor::new()?;
    editor.set_helper(Some(CommandHelper));

    if let Some(path) = &config.history {
        if let Err(e) = editor.load_history(path) {
            debug!("no history loaded from {}: {}", path.display(), e);
        }
    }

    loop {
        match editor.readline(&config.prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                editor.add_history_entry(line)?;
                match shell.process_line(line) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Quit) => break,
                    Err(e) => shell.report(&e)?,
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    if let Some(path) = &config.history {
        if let Err(e) = editor.save_history(path) {
            warn!("failed to save history to {}: {}", path.display(), e);
        }
    }
    Ok(())
}
