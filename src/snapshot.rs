//! Serializable views of the search for external renderers.

use serde::Serialize;

use crate::automaton::{Automaton, Edge};
use crate::configuration::Configuration;
use crate::lineage::BranchPath;
use crate::stack::Stack;
use crate::types::Symbol;

/// What an observer sees of one configuration during a round.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Round the configuration was processed in, starting at 1.
    pub round: usize,
    pub lineage: BranchPath,
    pub state: String,
    /// Stack contents, top first.
    pub stack: Stack,
    pub remaining: Vec<Symbol>,
    /// This configuration is the accepting, terminal one.
    pub accepting: bool,
    /// This is the initial configuration of the search.
    pub initial: bool,
}

impl Snapshot {
    pub fn capture(configuration: &Configuration, automaton: &Automaton, round: usize) -> Self {
        Self {
            round,
            lineage: configuration.lineage().clone(),
            state: automaton.name(configuration.state()).to_string(),
            stack: configuration.stack().clone(),
            remaining: configuration.remaining().to_vec(),
            accepting: configuration.is_accepting(automaton),
            initial: configuration.lineage().is_root(),
        }
    }
}

/// The static shape of an automaton, rendered once per search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Graph {
    pub states: Vec<String>,
    pub start: String,
    pub accept: Vec<String>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn of(automaton: &Automaton) -> Self {
        Self {
            states: automaton
                .states()
                .iter()
                .map(|state| state.name().to_string())
                .collect(),
            start: automaton.name(automaton.start()).to_string(),
            accept: automaton.accept_states().to_vec(),
            edges: automaton.edges(),
        }
    }
}
