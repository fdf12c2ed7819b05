//! # bagdb CLI Module
//!
//! This module provides the command-line front end for a bag file. It
//! supports:
//!
//! - The line protocol `a <string>`, `d <string>`, `l`
//! - Dot commands for introspection and session control
//! - An interactive REPL with history when stdin is a terminal
//! - Batch execution of piped input otherwise
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      CLI Entry Point                        │
//! │                      (bin/bagdb.rs)                         │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │          REPL Loop           │         Batch Loop           │
//! │  rustyline, prompts, history │  BufRead lines, no prompts   │
//! ├──────────────────────────────┴──────────────────────────────┤
//! │                     Command Handler                         │
//! │     a / d / l  →  Bag::insert / remove / list               │
//! │     .stats .check .sync .help .quit                         │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Open or create a bag file
//! bagdb ./words.bag
//!
//! # Apply commands without writing anything back
//! printf 'a alpha\nl\n' | bagdb -t ./words.bag
//! ```
//!
//! ## Module Organization
//!
//! - `commands`: line parsing and execution against a bag
//! - `repl`: interactive loop with rustyline integration
//! - `batch`: non-interactive loop over any `BufRead`
//! - `history`: history file path resolution

pub mod batch;
pub mod commands;
pub mod history;
pub mod repl;

pub use batch::run_batch;
pub use commands::{CommandHandler, CommandResult, Request};
pub use repl::Repl;
