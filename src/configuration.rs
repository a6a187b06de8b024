//! Machine configurations and the one-step branching rule.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::automaton::{Automaton, StateId};
use crate::lineage::{BranchPath, LineageCounter};
use crate::stack::Stack;
use crate::types::{Symbol, EPSILON};

/// One possible snapshot of the machine: state, stack, remaining input and lineage.
///
/// Configurations are immutable. Equality and hashing cover the state, the full stack and
/// the remaining input; the lineage label is bookkeeping and is ignored.
#[derive(Debug, Clone)]
pub struct Configuration {
    state: StateId,
    stack: Stack,
    input: Arc<[Symbol]>,
    position: usize,
    lineage: BranchPath,
}

impl Configuration {
    /// The configuration a search starts from: the start state, a stack holding only the
    /// bottom marker, and the whole input.
    pub fn initial(automaton: &Automaton, input: &str) -> Self {
        Self {
            state: automaton.start(),
            stack: Stack::with_bottom(),
            input: tokenize(input),
            position: 0,
            lineage: BranchPath::root(),
        }
    }

    pub fn state(&self) -> StateId {
        self.state
    }

    pub fn stack(&self) -> &Stack {
        &self.stack
    }

    /// Input symbols not consumed yet.
    pub fn remaining(&self) -> &[Symbol] {
        &self.input[self.position..]
    }

    pub fn lineage(&self) -> &BranchPath {
        &self.lineage
    }

    /// Whether the automaton accepts in this configuration: the input is exhausted and the
    /// state is an accept state.
    pub fn is_accepting(&self, automaton: &Automaton) -> bool {
        self.remaining().is_empty() && automaton.is_accepting(self.state)
    }

    /// Computes every configuration reachable from this one through a single transition.
    ///
    /// The head symbol and stack top are ε when the input or the stack is exhausted. For
    /// each applicable transition the child pops the stack iff the matched rule pops, then
    /// pushes the rule's symbol unless it is ε, moves to the target state, and consumes one
    /// input symbol iff the matched rule reads input. An empty result is a dead end.
    ///
    /// Fork discriminators for the children's lineage are drawn from `counter`.
    pub fn step(&self, automaton: &Automaton, counter: &mut LineageCounter) -> Vec<Self> {
        let head = self.remaining().first().map_or(EPSILON, String::as_str);
        let top = self.stack.top().unwrap_or(EPSILON);

        let matches = automaton.transitions_for(self.state, head, top);
        let forks = matches.len() > 1;

        matches
            .into_iter()
            .map(|m| {
                let mut stack = if m.pops {
                    self.stack.pop()
                } else {
                    self.stack.clone()
                };
                if !m.push.is_empty() {
                    stack = stack.push(m.push);
                }

                Self {
                    state: m.target,
                    stack,
                    input: Arc::clone(&self.input),
                    position: self.position + usize::from(m.consumes),
                    lineage: if forks {
                        self.lineage.fork(counter)
                    } else {
                        self.lineage.advance()
                    },
                }
            })
            .collect()
    }

    /// Renders the configuration for logs.
    pub fn describe(&self, automaton: &Automaton) -> String {
        format!(
            "{} state={} stack={} input={}",
            self.lineage,
            automaton.name(self.state),
            self.stack,
            self.remaining().concat()
        )
    }
}

impl PartialEq for Configuration {
    fn eq(&self, other: &Self) -> bool {
        self.state == other.state
            && self.remaining() == other.remaining()
            && self.stack == other.stack
    }
}

impl Eq for Configuration {}

impl Hash for Configuration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.state.hash(state);
        self.remaining().hash(state);
        self.stack.hash(state);
    }
}

/// Splits an input string into one symbol per character.
fn tokenize(input: &str) -> Arc<[Symbol]> {
    input.chars().map(String::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TableRule;

    fn automaton(rules: &[TableRule], accept: &[&str]) -> Automaton {
        let accept: Vec<String> = accept.iter().map(|n| n.to_string()).collect();
        Automaton::build(rules, &accept).unwrap()
    }

    #[test]
    fn test_initial_configuration() {
        let a = automaton(&[TableRule::new("s", "a", "", "", "f")], &["f"]);
        let c = Configuration::initial(&a, "ab");

        assert_eq!(c.state(), a.start());
        assert_eq!(c.stack().to_vec(), vec!["$"]);
        assert_eq!(c.remaining(), ["a", "b"]);
        assert!(c.lineage().is_root());
    }

    #[test]
    fn test_step_consumes_and_pushes() {
        let a = automaton(&[TableRule::new("s", "a", "", "A", "s")], &[]);
        let c = Configuration::initial(&a, "ab");

        let children = c.step(&a, &mut LineageCounter::new());

        assert_eq!(children.len(), 1);
        assert_eq!(children[0].remaining(), ["b"]);
        assert_eq!(children[0].stack().to_vec(), vec!["A", "$"]);
        assert_eq!(children[0].lineage().to_string(), "_1");
        // parent untouched
        assert_eq!(c.remaining(), ["a", "b"]);
        assert_eq!(c.stack().to_vec(), vec!["$"]);
    }

    #[test]
    fn test_step_epsilon_input_keeps_input() {
        let a = automaton(&[TableRule::new("s", "", "", "X", "t")], &[]);
        let c = Configuration::initial(&a, "a");

        let children = c.step(&a, &mut LineageCounter::new());

        assert_eq!(children.len(), 1);
        assert_eq!(children[0].remaining(), ["a"]);
        assert_eq!(a.name(children[0].state()), "t");
    }

    #[test]
    fn test_step_pop_then_push_replaces_top() {
        let a = automaton(&[TableRule::new("s", "a", "$", "Z", "s")], &[]);
        let c = Configuration::initial(&a, "a");

        let children = c.step(&a, &mut LineageCounter::new());

        assert_eq!(children[0].stack().to_vec(), vec!["Z"]);
    }

    #[test]
    fn test_step_dead_end() {
        let a = automaton(&[TableRule::new("s", "a", "", "", "f")], &["f"]);
        let c = Configuration::initial(&a, "b");

        assert!(c.step(&a, &mut LineageCounter::new()).is_empty());
    }

    #[test]
    fn test_step_forks_lineage() {
        let a = automaton(
            &[
                TableRule::new("s", "a", "", "", "t"),
                TableRule::new("s", "a", "", "", "u"),
            ],
            &[],
        );
        let c = Configuration::initial(&a, "a");
        let mut counter = LineageCounter::new();

        let children = c.step(&a, &mut counter);
        let labels: Vec<String> = children.iter().map(|c| c.lineage().to_string()).collect();

        assert_eq!(labels, vec!["_1A_0", "_1B_0"]);
        assert_eq!(counter.issued(), 2);
    }

    #[test]
    fn test_push_then_matching_pop_restores_stack() {
        let a = automaton(
            &[
                TableRule::new("s", "a", "", "X", "t"),
                TableRule::new("t", "b", "X", "", "u"),
            ],
            &["u"],
        );
        let mut counter = LineageCounter::new();
        let start = Configuration::initial(&a, "ab");

        let pushed = start.step(&a, &mut counter).remove(0);
        assert_eq!(pushed.stack().to_vec(), vec!["X", "$"]);

        let popped = pushed.step(&a, &mut counter).remove(0);
        assert_eq!(popped.stack(), start.stack());
        assert!(popped.is_accepting(&a));
    }

    #[test]
    fn test_equivalence_ignores_lineage() {
        let a = automaton(
            &[
                TableRule::new("s", "", "", "", "s"),
                TableRule::new("s", "", "", "", "s"),
            ],
            &[],
        );
        let c = Configuration::initial(&a, "x");

        let children = c.step(&a, &mut LineageCounter::new());

        assert_ne!(children[0].lineage(), children[1].lineage());
        assert_eq!(children[0], children[1]);
        assert_eq!(children[0], c);
    }

    #[test]
    fn test_equivalence_distinguishes_stack_and_input() {
        let a = automaton(
            &[
                TableRule::new("s", "", "", "A", "s"),
                TableRule::new("s", "x", "", "", "s"),
            ],
            &[],
        );
        let c = Configuration::initial(&a, "x");

        let children = c.step(&a, &mut LineageCounter::new());

        assert_eq!(children.len(), 2);
        assert_ne!(children[0], c);
        assert_ne!(children[1], c);
        assert_ne!(children[0], children[1]);
    }

    #[test]
    fn test_is_accepting_requires_exhausted_input() {
        let a = automaton(&[TableRule::new("f", "a", "", "", "f")], &["f"]);

        assert!(!Configuration::initial(&a, "a").is_accepting(&a));
        assert!(Configuration::initial(&a, "").is_accepting(&a));
    }
}
