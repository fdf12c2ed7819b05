//! # Batch Sessions
//!
//! When stdin is not a terminal, lines are read to the end of input and fed
//! through the same `CommandHandler` as the REPL, without prompts, welcome
//! text, or history. Output goes to `out`, error messages to `err`.
//!
//! Lines are split on `\n` and decoded lossily, so bytes that are not UTF-8
//! become U+FFFD instead of ending the session.
//!
//! The session ends at end of input or `.quit`, after which the region is
//! synced. A `Fatal` result stops reading immediately and is returned as an
//! error without syncing.

use std::io::{BufRead, Write};

use eyre::{bail, Result, WrapErr};

use crate::cli::commands::{CommandHandler, CommandResult};
use crate::storage::Region;
use crate::Bag;

pub fn run_batch<R, I, O, E>(
    bag: &mut Bag<R>,
    mut input: I,
    out: &mut O,
    err: &mut E,
) -> Result<()>
where
    R: Region,
    I: BufRead,
    O: Write,
    E: Write,
{
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let read = input
            .read_until(b'\n', &mut buf)
            .wrap_err("failed to read command input")?;
        if read == 0 {
            break;
        }

        let line = String::from_utf8_lossy(trim_line_ending(&buf));

        match CommandHandler::execute(&line, bag) {
            CommandResult::Exit => break,
            CommandResult::Output(text) => {
                writeln!(out, "{}", text).wrap_err("failed to write output")?;
            }
            CommandResult::Continue => {}
            CommandResult::Error(msg) => {
                writeln!(err, "Error: {}", msg).wrap_err("failed to write error output")?;
            }
            CommandResult::Fatal(msg) => bail!(msg),
        }
    }

    out.flush().wrap_err("failed to flush output")?;
    bag.sync()
}

fn trim_line_ending(line: &[u8]) -> &[u8] {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    line.strip_suffix(b"\r").unwrap_or(line)
}
