//! # Command Handler
//!
//! Every input line is either a bag operation or a dot command.
//!
//! ## Bag Operations
//!
//! The first character selects the operation and the argument is everything
//! after the first two characters, spaces included:
//!
//! | Line         | Operation     | Output                              |
//! |--------------|---------------|-------------------------------------|
//! | `a <string>` | insert        | `Trying to add a duplicate` if present  |
//! | `d <string>` | remove        | `Not found: <string>` if absent     |
//! | `l`          | list          | one stored string per line          |
//!
//! Lines starting with any other character are ignored.
//!
//! ## Dot Commands
//!
//! | Command              | Description                              |
//! |----------------------|------------------------------------------|
//! | `.quit` / `.exit`    | End the session                          |
//! | `.stats`             | Entry and byte accounting                |
//! | `.check`             | Audit the entry chain                    |
//! | `.sync`              | Flush the region to disk                 |
//! | `.help`              | Show available commands                  |
//!
//! Dot commands are case-insensitive.
//!
//! ## Results
//!
//! Execution never panics or returns `Err`; failures become `Error` (print
//! and keep going) or `Fatal` (the bag is corrupt; end the session).

use crate::error::BagError;
use crate::storage::Region;
use crate::Bag;

#[derive(Debug, PartialEq)]
pub enum CommandResult {
    Output(String),
    Exit,
    Continue,
    Error(String),
    Fatal(String),
}

/// A parsed bag operation borrowing its argument from the input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request<'a> {
    Add(&'a str),
    Delete(&'a str),
    List,
}

impl<'a> Request<'a> {
    pub fn parse(line: &'a str) -> Option<Self> {
        let argument = line.char_indices().nth(2).map_or("", |(i, _)| &line[i..]);

        match line.as_bytes().first().copied()? {
            b'a' => Some(Request::Add(argument)),
            b'd' => Some(Request::Delete(argument)),
            b'l' => Some(Request::List),
            _ => None,
        }
    }
}

pub struct CommandHandler;

impl CommandHandler {
    pub fn is_command(input: &str) -> bool {
        input.trim().starts_with('.')
    }

    pub fn execute<R: Region>(input: &str, bag: &mut Bag<R>) -> CommandResult {
        if Self::is_command(input) {
            return execute_dot(input, bag);
        }

        match Request::parse(input) {
            Some(request) => apply(request, bag),
            None => CommandResult::Continue,
        }
    }
}

pub fn apply<R: Region>(request: Request<'_>, bag: &mut Bag<R>) -> CommandResult {
    match request {
        Request::Add(key) => match bag.insert(key) {
            Ok(()) => CommandResult::Continue,
            Err(e) if matches!(BagError::of(&e), Some(BagError::DuplicateKey { .. })) => {
                CommandResult::Output("Trying to add a duplicate".to_string())
            }
            Err(e) => failure(e),
        },
        Request::Delete(key) => match bag.remove(key) {
            Ok(()) => CommandResult::Continue,
            Err(e) if matches!(BagError::of(&e), Some(BagError::NotFound { .. })) => {
                CommandResult::Output(format!("Not found: {}", key))
            }
            Err(e) => failure(e),
        },
        Request::List => match bag.list() {
            Ok(keys) if keys.is_empty() => CommandResult::Continue,
            Ok(keys) => CommandResult::Output(keys.join("\n")),
            Err(e) => failure(e),
        },
    }
}

fn execute_dot<R: Region>(input: &str, bag: &mut Bag<R>) -> CommandResult {
    let input = input.trim();
    let parts: Vec<&str> = input.split_whitespace().collect();

    let Some(cmd) = parts.first().map(|c| c.to_lowercase()) else {
        return CommandResult::Continue;
    };

    match cmd.as_str() {
        ".quit" | ".exit" | ".q" => CommandResult::Exit,
        ".help" | ".h" | ".?" => CommandResult::Output(help_text()),
        ".stats" => match bag.stats() {
            Ok(stats) => CommandResult::Output(format!(
                "{}\nutilization: {:.1}%",
                stats,
                stats.utilization_percent()
            )),
            Err(e) => failure(e),
        },
        ".check" => match bag.check() {
            Ok(()) => CommandResult::Output("ok".to_string()),
            Err(e) => failure(e),
        },
        ".sync" => match bag.sync() {
            Ok(()) => CommandResult::Continue,
            Err(e) => failure(e),
        },
        _ => CommandResult::Error(format!(
            "Unknown command: {}. Type .help for available commands.",
            cmd
        )),
    }
}

fn failure(e: eyre::Report) -> CommandResult {
    if BagError::is_corrupt(&e) {
        CommandResult::Fatal(format!("{:#}", e))
    } else {
        CommandResult::Error(format!("{:#}", e))
    }
}

fn help_text() -> String {
    r#"bagdb commands:

  a STRING             Add STRING to the bag
  d STRING             Remove STRING from the bag
  l                    List every string in the bag

  .quit, .exit, .q     End the session
  .help, .h, .?        Show this help message
  .stats               Show entry and byte accounting
  .check               Verify the bag's entry chain
  .sync                Flush changes to disk

The argument starts after the first two characters of the line.
Use Ctrl+D or .quit to exit."#
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BagConfig, BAG_HEADER_SIZE};
    use crate::storage::MemRegion;

    fn bag() -> Bag<MemRegion> {
        Bag::from_region(MemRegion::new(), BagConfig::default()).unwrap()
    }

    #[test]
    fn parse_takes_everything_after_two_characters() {
        assert_eq!(Request::parse("a alpha"), Some(Request::Add("alpha")));
        assert_eq!(Request::parse("a  two words "), Some(Request::Add(" two words ")));
        assert_eq!(Request::parse("dxbeta"), Some(Request::Delete("beta")));
        assert_eq!(Request::parse("l"), Some(Request::List));
        assert_eq!(Request::parse("a"), Some(Request::Add("")));
    }

    #[test]
    fn parse_counts_characters_not_bytes() {
        assert_eq!(Request::parse("aétude"), Some(Request::Add("tude")));
        assert_eq!(Request::parse("d→ünï"), Some(Request::Delete("ünï")));
        assert_eq!(Request::parse("aé"), Some(Request::Add("")));
    }

    #[test]
    fn multibyte_separator_stores_the_rest_of_the_line() {
        let mut bag = bag();

        assert_eq!(CommandHandler::execute("aétude", &mut bag), CommandResult::Continue);

        assert_eq!(bag.list().unwrap(), vec!["tude"]);
    }

    #[test]
    fn parse_ignores_other_lines() {
        assert_eq!(Request::parse(""), None);
        assert_eq!(Request::parse("x alpha"), None);
        assert_eq!(Request::parse("A alpha"), None);
    }

    #[test]
    fn is_command_returns_true_for_dot_prefix() {
        assert!(CommandHandler::is_command(".quit"));
        assert!(CommandHandler::is_command("  .help"));
        assert!(!CommandHandler::is_command("a .hidden"));
        assert!(!CommandHandler::is_command(""));
    }

    #[test]
    fn add_list_and_delete() {
        let mut bag = bag();

        assert_eq!(CommandHandler::execute("a alpha", &mut bag), CommandResult::Continue);
        assert_eq!(CommandHandler::execute("a beta", &mut bag), CommandResult::Continue);
        assert_eq!(
            CommandHandler::execute("l", &mut bag),
            CommandResult::Output("alpha\nbeta".to_string())
        );
        assert_eq!(CommandHandler::execute("d alpha", &mut bag), CommandResult::Continue);
        assert_eq!(
            CommandHandler::execute("l", &mut bag),
            CommandResult::Output("beta".to_string())
        );
    }

    #[test]
    fn listing_an_empty_bag_prints_nothing() {
        let mut bag = bag();

        assert_eq!(CommandHandler::execute("l", &mut bag), CommandResult::Continue);
    }

    #[test]
    fn duplicate_and_missing_messages() {
        let mut bag = bag();
        CommandHandler::execute("a alpha", &mut bag);

        assert_eq!(
            CommandHandler::execute("a alpha", &mut bag),
            CommandResult::Output("Trying to add a duplicate".to_string())
        );
        assert_eq!(
            CommandHandler::execute("d gamma", &mut bag),
            CommandResult::Output("Not found: gamma".to_string())
        );
    }

    #[test]
    fn quit_commands_return_exit() {
        let mut bag = bag();

        assert_eq!(CommandHandler::execute(".quit", &mut bag), CommandResult::Exit);
        assert_eq!(CommandHandler::execute(".EXIT", &mut bag), CommandResult::Exit);
        assert_eq!(CommandHandler::execute(".q", &mut bag), CommandResult::Exit);
    }

    #[test]
    fn help_lists_operations() {
        let mut bag = bag();

        match CommandHandler::execute(".help", &mut bag) {
            CommandResult::Output(text) => {
                assert!(text.contains("a STRING"));
                assert!(text.contains(".stats"));
            }
            other => panic!("Expected Output, got {:?}", other),
        }
    }

    #[test]
    fn stats_and_check_report_on_the_bag() {
        let mut bag = bag();
        CommandHandler::execute("a alpha", &mut bag);

        match CommandHandler::execute(".stats", &mut bag) {
            CommandResult::Output(text) => assert!(text.contains("allocated:1/14B")),
            other => panic!("Expected Output, got {:?}", other),
        }
        assert_eq!(
            CommandHandler::execute(".check", &mut bag),
            CommandResult::Output("ok".to_string())
        );
        assert_eq!(CommandHandler::execute(".sync", &mut bag), CommandResult::Continue);
    }

    #[test]
    fn unknown_command_returns_error() {
        let mut bag = bag();

        match CommandHandler::execute(".tables", &mut bag) {
            CommandResult::Error(msg) => assert!(msg.contains("Unknown command")),
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    #[test]
    fn nul_byte_is_an_ordinary_error() {
        let mut bag = bag();

        match CommandHandler::execute("a bad\0key", &mut bag) {
            CommandResult::Error(msg) => assert!(msg.contains("invalid key")),
            other => panic!("Expected Error, got {:?}", other),
        }
    }

    #[test]
    fn corruption_is_fatal() {
        let mut bag = bag();
        bag.region_mut().as_bytes_mut()[BAG_HEADER_SIZE + 4..BAG_HEADER_SIZE + 8].fill(0xFF);

        assert!(matches!(
            CommandHandler::execute("a alpha", &mut bag),
            CommandResult::Fatal(_)
        ));
        assert!(matches!(
            CommandHandler::execute("l", &mut bag),
            CommandResult::Fatal(_)
        ));
    }
}
