//! This module defines the state/transition model of a pushdown automaton.
//!
//! An [`Automaton`] is built once from an ordered list of table rules and is read-only
//! afterwards. States are addressed by dense [`StateId`]s so configurations can refer to
//! them cheaply, and every state keeps its transition relation keyed by
//! `(input symbol or ε, stack-top symbol or ε)`.

use serde::Serialize;
use std::collections::{HashMap, HashSet};

use crate::analyzer::{analyze, multi_symbol_inputs, unreachable_states};
use crate::types::{display_symbol, ConfigError, Symbol, Table, TableRule, EPSILON};

/// Index of a state inside its [`Automaton`].
///
/// Ids are only handed out by the automaton that owns the state, so they always resolve:
///
/// ```compile_fail
/// let id = pda::StateId(7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StateId(pub(crate) usize);

impl StateId {
    /// Position of the state in [`Automaton::states`].
    pub fn index(self) -> usize {
        self.0
    }
}

/// `(input symbol, pop symbol)`; either may be ε.
type TransitionKey = (Symbol, Symbol);

/// One registered choice under a transition key.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Choice {
    push: Symbol,
    target: StateId,
}

/// A named state and its transition relation.
#[derive(Debug, Clone)]
pub struct State {
    name: String,
    transitions: HashMap<TransitionKey, Vec<Choice>>,
}

impl State {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transitions: HashMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn connect(&mut self, input: &str, pop: &str, push: &str, target: StateId) {
        self.transitions
            .entry((input.to_string(), pop.to_string()))
            .or_default()
            .push(Choice {
                push: push.to_string(),
                target,
            });
    }

    fn choices(&self, input: &str, pop: &str) -> &[Choice] {
        self.transitions
            .get(&(input.to_string(), pop.to_string()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}

/// A transition that applies to a given input head and stack top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    /// The matched rule pops the stack top.
    pub pops: bool,
    /// The matched rule consumes the input head.
    pub consumes: bool,
    /// Symbol to push, or ε.
    pub push: &'a str,
    pub target: StateId,
}

/// A static edge of the automaton's state graph, for renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub input: Symbol,
    pub pop: Symbol,
    pub push: Symbol,
}

impl Edge {
    /// Label of the form `input,pop-->push` with ε spelled out.
    pub fn label(&self) -> String {
        format!(
            "{},{}-->{}",
            display_symbol(&self.input),
            display_symbol(&self.pop),
            display_symbol(&self.push)
        )
    }
}

/// A nondeterministic pushdown automaton.
#[derive(Debug, Clone)]
pub struct Automaton {
    states: Vec<State>,
    index: HashMap<String, StateId>,
    start: StateId,
    accept: HashSet<StateId>,
    accept_names: Vec<String>,
    rules: Vec<TableRule>,
}

impl Automaton {
    /// Builds an automaton from an ordered rule list and the names of its accept states.
    ///
    /// Every state named as `from` or `to` is created, each rule is registered under its
    /// `(input, pop)` key in order, and the `from` of the first rule becomes the start state.
    ///
    /// # Returns
    ///
    /// * `Ok(Automaton)` on success.
    /// * `Err(ConfigError)` if the rules are empty, a state reference cannot be resolved, or
    ///   an accept name does not appear among the rules.
    pub fn build(rules: &[TableRule], accept_names: &[String]) -> Result<Self, ConfigError> {
        analyze(rules, accept_names)?;

        let mut states = Vec::new();
        let mut index = HashMap::new();
        for rule in rules {
            for name in [&rule.from, &rule.to] {
                if !index.contains_key(name) {
                    index.insert(name.clone(), StateId(states.len()));
                    states.push(State::new(name));
                }
            }
        }

        for (i, rule) in rules.iter().enumerate() {
            let resolve = |name: &String| {
                index
                    .get(name)
                    .copied()
                    .ok_or_else(|| ConfigError::UnresolvedState {
                        index: i,
                        state: name.clone(),
                    })
            };
            let from = resolve(&rule.from)?;
            let to = resolve(&rule.to)?;

            states[from.0].connect(&rule.input, &rule.pop, &rule.push, to);
        }

        let start = rules
            .first()
            .and_then(|rule| index.get(&rule.from).copied())
            .ok_or(ConfigError::EmptyTable)?;

        let accept = accept_names
            .iter()
            .map(|name| {
                index
                    .get(name)
                    .copied()
                    .ok_or_else(|| ConfigError::UnknownAcceptState(name.clone()))
            })
            .collect::<Result<HashSet<_>, _>>()?;

        let unreachable = unreachable_states(rules);
        if !unreachable.is_empty() {
            tracing::warn!(states = ?unreachable, "unreachable states in transition table");
        }

        let unmatchable = multi_symbol_inputs(rules);
        if !unmatchable.is_empty() {
            tracing::warn!(
                rules = ?unmatchable,
                "input fields longer than one character never match"
            );
        }

        tracing::debug!(
            states = states.len(),
            rules = rules.len(),
            start = %states[start.0].name,
            "built automaton"
        );

        Ok(Self {
            states,
            index,
            start,
            accept,
            accept_names: accept_names.to_vec(),
            rules: rules.to_vec(),
        })
    }

    /// Builds an automaton from a loaded [`Table`].
    pub fn from_table(table: &Table) -> Result<Self, ConfigError> {
        Self::build(&table.rules, &table.accept)
    }

    /// Returns the transitions that apply in `state` when the input head is `input` and the
    /// stack top is `top` (either may be ε).
    ///
    /// Candidates are gathered under three keys in a fixed order:
    ///
    /// 1. `(input, top)`, an exact match
    /// 2. `(input, ε)`, input matched and stack ignored
    /// 3. `(ε, ε)`, a full wildcard
    ///
    /// A key that repeats an earlier candidate (for example when `input` is ε) is only
    /// consulted once. Choices under a key keep their registration order.
    pub fn transitions_for(&self, state: StateId, input: &str, top: &str) -> Vec<Match<'_>> {
        let state = &self.states[state.0];
        let keys = [(input, top), (input, EPSILON), (EPSILON, EPSILON)];

        let mut matches = Vec::new();
        for (i, &(key_input, key_pop)) in keys.iter().enumerate() {
            if keys[..i].contains(&(key_input, key_pop)) {
                continue;
            }

            matches.extend(state.choices(key_input, key_pop).iter().map(|choice| Match {
                pops: !key_pop.is_empty(),
                consumes: !key_input.is_empty(),
                push: choice.push.as_str(),
                target: choice.target,
            }));
        }

        matches
    }

    pub fn start(&self) -> StateId {
        self.start
    }

    pub fn state(&self, id: StateId) -> &State {
        &self.states[id.0]
    }

    /// Looks up a state by name.
    pub fn state_id(&self, name: &str) -> Option<StateId> {
        self.index.get(name).copied()
    }

    /// Returns the name of a state.
    pub fn name(&self, id: StateId) -> &str {
        &self.states[id.0].name
    }

    /// All states in creation order.
    pub fn states(&self) -> &[State] {
        &self.states
    }

    pub fn is_accepting(&self, id: StateId) -> bool {
        self.accept.contains(&id)
    }

    /// Accept-state names as given to [`Automaton::build`].
    pub fn accept_states(&self) -> &[String] {
        &self.accept_names
    }

    /// The rules the automaton was built from, in registration order.
    pub fn rules(&self) -> &[TableRule] {
        &self.rules
    }

    /// Static edge list of the state graph, in rule order.
    pub fn edges(&self) -> Vec<Edge> {
        self.rules
            .iter()
            .map(|rule| Edge {
                from: rule.from.clone(),
                to: rule.to.clone(),
                input: rule.input.clone(),
                pop: rule.pop.clone(),
                push: rule.push.clone(),
            })
            .collect()
    }
}
