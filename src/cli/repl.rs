//! # REPL - Read-Eval-Print Loop
//!
//! The interactive loop used when stdin is a terminal. Handles:
//!
//! - Reading input with rustyline (history, line editing)
//! - Dispatching each line through `CommandHandler`
//! - Printing output to stdout and errors to stderr
//!
//! ## Execution Flow
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Read Line                            │
//! └──────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │            CommandHandler::execute(line)                 │
//! └──────────────────────────────────────────────────────────┘
//!       │ Output      │ Error       │ Exit        │ Fatal
//!       ▼             ▼             ▼             ▼
//!   print, loop   eprint, loop    sync, end   save history,
//!                                              return Err
//! ```
//!
//! ## Error Handling
//!
//! Ordinary errors are displayed and the loop continues. A corrupt bag ends
//! the session with an error so the process exits non-zero. Use `.quit` or
//! Ctrl+D to exit normally.

use eyre::{bail, Result, WrapErr};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::cli::commands::{CommandHandler, CommandResult};
use crate::cli::history::history_path;
use crate::storage::Region;
use crate::Bag;

const PROMPT: &str = "bagdb> ";

pub struct Repl<R: Region> {
    bag: Bag<R>,
    editor: DefaultEditor,
}

impl<R: Region> Repl<R> {
    pub fn new(bag: Bag<R>) -> Result<Self> {
        let mut editor = DefaultEditor::new().wrap_err("failed to initialize line editor")?;

        if let Some(history_file) = history_path() {
            let _ = editor.load_history(&history_file);
        }

        Ok(Self { bag, editor })
    }

    pub fn run(&mut self) -> Result<()> {
        self.print_welcome();

        let outcome = self.read_loop();
        self.save_history();
        outcome?;

        self.bag.sync()
    }

    fn read_loop(&mut self) -> Result<()> {
        loop {
            match self.editor.readline(PROMPT) {
                Ok(line) => {
                    if !self.handle_line(&line)? {
                        return Ok(());
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye");
                    return Ok(());
                }
                Err(err) => {
                    eprintln!("Error reading input: {}", err);
                    return Ok(());
                }
            }
        }
    }

    fn handle_line(&mut self, line: &str) -> Result<bool> {
        if line.trim().is_empty() {
            return Ok(true);
        }

        self.editor.add_history_entry(line).ok();

        match CommandHandler::execute(line, &mut self.bag) {
            CommandResult::Exit => Ok(false),
            CommandResult::Output(text) => {
                println!("{}", text);
                Ok(true)
            }
            CommandResult::Continue => Ok(true),
            CommandResult::Error(msg) => {
                eprintln!("Error: {}", msg);
                Ok(true)
            }
            CommandResult::Fatal(msg) => bail!(msg),
        }
    }

    fn print_welcome(&self) {
        println!("bagdb version {}", env!("CARGO_PKG_VERSION"));
        println!("Enter \".help\" for usage hints.");
        println!();
    }

    fn save_history(&mut self) {
        if let Some(history_file) = history_path() {
            if let Err(e) = self.editor.save_history(&history_file) {
                eprintln!("Warning: could not save history: {}", e);
            }
        }
    }
}
