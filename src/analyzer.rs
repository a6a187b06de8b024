//! This module provides functions for analyzing transition tables to detect errors before an
//! automaton is built. Fatal problems are reported as `ConfigError`. Unreachable states and
//! multi-character input fields are only reported as diagnostics.

use crate::types::{ConfigError, TableRule};
use std::collections::{HashMap, HashSet};

type Check = fn(&[TableRule], &[String]) -> Result<(), ConfigError>;

/// Analyzes a rule list and its accept-state names for structural errors.
///
/// The checks run in order and the first failure is returned.
///
/// # Returns
///
/// * `Ok(())` if no errors are found.
/// * `Err(ConfigError)` describing the first violated rule.
pub fn analyze(rules: &[TableRule], accept: &[String]) -> Result<(), ConfigError> {
    const CHECKS: [Check; 3] = [check_not_empty, check_state_names, check_accept_states];

    CHECKS
        .iter()
        .find_map(|check| check(rules, accept).err())
        .map_or(Ok(()), Err)
}

/// Checks that the table contains at least one rule, which defines the start state.
fn check_not_empty(rules: &[TableRule], _accept: &[String]) -> Result<(), ConfigError> {
    if rules.is_empty() {
        return Err(ConfigError::EmptyTable);
    }

    Ok(())
}

/// Checks that every rule names both its source and target state.
fn check_state_names(rules: &[TableRule], _accept: &[String]) -> Result<(), ConfigError> {
    rules
        .iter()
        .position(|rule| rule.from.is_empty() || rule.to.is_empty())
        .map_or(Ok(()), |index| Err(ConfigError::EmptyStateName { index }))
}

/// Checks that every accept-state name appears as a `from` or `to` in some rule.
fn check_accept_states(rules: &[TableRule], accept: &[String]) -> Result<(), ConfigError> {
    let declared: HashSet<&str> = rules
        .iter()
        .flat_map(|rule| [rule.from.as_str(), rule.to.as_str()])
        .collect();

    match accept.iter().find(|name| !declared.contains(name.as_str())) {
        Some(name) => Err(ConfigError::UnknownAcceptState(name.clone())),
        None => Ok(()),
    }
}

/// Returns the states that no sequence of transitions can reach from the start state.
///
/// The start state is the `from` of the first rule. The result is sorted for deterministic
/// output.
pub fn unreachable_states(rules: &[TableRule]) -> Vec<String> {
    let Some(start) = rules.first().map(|rule| rule.from.as_str()) else {
        return Vec::new();
    };

    let mut edges: HashMap<&str, Vec<&str>> = HashMap::new();
    for rule in rules {
        edges.entry(&rule.from).or_default().push(&rule.to);
    }

    let mut visited = HashSet::new();
    let mut queue = vec![start];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        if let Some(targets) = edges.get(state) {
            queue.extend(targets.iter().filter(|t| !visited.contains(*t)));
        }
    }

    let mut unreachable: Vec<String> = rules
        .iter()
        .flat_map(|rule| [rule.from.as_str(), rule.to.as_str()])
        .filter(|state| !visited.contains(state))
        .map(str::to_string)
        .collect();

    unreachable.sort();
    unreachable.dedup();
    unreachable
}

/// Returns the indices of rules whose input field spans more than one character.
///
/// Input strings are read one character per symbol, so such a rule can never fire.
pub fn multi_symbol_inputs(rules: &[TableRule]) -> Vec<usize> {
    rules
        .iter()
        .enumerate()
        .filter(|(_, rule)| rule.input.chars().nth(1).is_some())
        .map(|(index, _)| index)
        .collect()
}
