//! This module defines the core data structures and types shared by the pushdown automaton
//! explorer: symbols, transition table records, limits, explorer configuration and error types.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Rule;

/// A single input or stack symbol. The empty string stands for ε.
pub type Symbol = String;

/// The empty symbol (ε). Used for transitions that ignore the input or the stack top.
pub const EPSILON: &str = "";
/// How ε is spelled when a symbol is displayed, and an accepted alias in table files.
pub const EPSILON_DISPLAY: &str = "ε";
/// The marker placed at the bottom of every initial stack.
pub const BOTTOM_MARKER: &str = "$";
/// The default maximum number of breadth-first rounds before a search gives up.
pub const DEFAULT_MAX_ROUNDS: usize = 10_000;
/// The default maximum number of distinct configurations a search may hold.
pub const DEFAULT_MAX_CONFIGURATIONS: usize = 100_000;

/// A transition table as loaded from a file: the accept-state names and the ordered rules.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Table {
    /// Names of the accepting states.
    pub accept: Vec<String>,
    /// The transition rules in registration order. The first rule's `from` is the start state.
    pub rules: Vec<TableRule>,
}

/// One row of a transition table: `(from, input, pop, push, to)`.
///
/// Empty `input`, `pop` or `push` fields mean ε.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableRule {
    pub from: String,
    pub input: Symbol,
    pub pop: Symbol,
    pub push: Symbol,
    pub to: String,
}

impl TableRule {
    /// Convenience constructor, mostly used by tests and embedded tables.
    pub fn new(from: &str, input: &str, pop: &str, push: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            input: input.to_string(),
            pop: pop.to_string(),
            push: push.to_string(),
            to: to.to_string(),
        }
    }
}

/// Bounds applied to a single search.
///
/// A pushdown automaton whose ε-transitions keep growing the stack has an infinite
/// configuration space, so every search runs under these ceilings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ExplorerConfig {
    /// Maximum number of rounds (generations) to process.
    pub max_rounds: usize,
    /// Maximum number of distinct configurations seen plus queued.
    pub max_configurations: usize,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
            max_configurations: DEFAULT_MAX_CONFIGURATIONS,
        }
    }
}

/// Returns a printable form of a symbol, spelling out ε.
pub fn display_symbol(symbol: &str) -> &str {
    if symbol.is_empty() {
        EPSILON_DISPLAY
    } else {
        symbol
    }
}

/// Errors that make a transition table unusable. They are reported before any search starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The table contains no rules, so there is no start state.
    #[error("Transition table has no rules")]
    EmptyTable,
    /// A rule has an empty `from` or `to` state name.
    #[error("Rule {index} has an empty state name")]
    EmptyStateName { index: usize },
    /// A rule targets a state that was never declared.
    #[error("Rule {index} references unresolved state '{state}'")]
    UnresolvedState { index: usize, state: String },
    /// An accept-state name does not appear in any rule.
    #[error("Accept state '{0}' does not appear in any rule")]
    UnknownAcceptState(String),
}

/// Represents the errors surfaced by the library.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PdaError {
    /// The table was parsed but cannot be turned into an automaton.
    #[error("Invalid transition table: {0}")]
    Config(#[from] ConfigError),
    /// The table text does not follow the table format.
    #[error("Table parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Reading a table from the file system failed.
    #[error("File error: {0}")]
    FileError(String),
}
