//! This crate provides the core logic for exploring nondeterministic pushdown automata.
//! It includes modules for parsing and loading transition tables, building the automaton,
//! branching configurations one transition at a time, and searching every execution path
//! breadth-first to decide whether an input is accepted.

pub mod analyzer;
pub mod automaton;
pub mod configuration;
pub mod explorer;
pub mod lineage;
pub mod loader;
pub mod parser;
pub mod programs;
pub mod snapshot;
pub mod stack;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function from the analyzer module.
pub use analyzer::analyze;
/// Re-exports the automaton model.
pub use automaton::{Automaton, Edge, Match, StateId};
/// Re-exports the `Configuration` struct from the configuration module.
pub use configuration::Configuration;
/// Re-exports the search driver and its results.
pub use explorer::{Explorer, Limit, Observer, Outcome, Recorder, Search, Step, Verdict};
/// Re-exports the branch-lineage types.
pub use lineage::{BranchPath, LineageCounter};
/// Re-exports the `TableLoader` struct from the loader module.
pub use loader::TableLoader;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `NamedTable`, `TableInfo`, `TableLibrary`, and `TABLES` from the programs module.
pub use programs::{NamedTable, TableInfo, TableLibrary, TABLES};
/// Re-exports the renderer-facing views.
pub use snapshot::{Graph, Snapshot};
/// Re-exports the persistent `Stack`.
pub use stack::Stack;
/// Re-exports various types related to tables, limits and errors from the types module.
pub use types::{ConfigError, ExplorerConfig, PdaError, Symbol, Table, TableRule};
