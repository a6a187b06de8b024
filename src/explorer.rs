//! This module defines the `Explorer`, which searches every execution path of a
//! nondeterministic pushdown automaton breadth-first and decides whether the input is
//! accepted.
//!
//! A search proceeds in rounds. Each round processes the whole frontier: every configuration
//! is reported to an [`Observer`], checked for acceptance, and expanded through
//! [`Configuration::step`]. The children are stable-sorted by remaining input length, so
//! branches closer to exhausting the input come first, and configurations equivalent to one
//! already seen are dropped. An empty next frontier means the input is rejected.

use std::collections::HashSet;

use crate::automaton::Automaton;
use crate::configuration::Configuration;
use crate::lineage::LineageCounter;
use crate::snapshot::Snapshot;
use crate::types::ExplorerConfig;

/// Receives the progress of a search.
///
/// All methods have no-op defaults. `is_cancelled` is polled at the top of every round and
/// stops the search cooperatively.
pub trait Observer {
    /// Called once per round before its configurations are processed.
    fn on_round(&mut self, _round: usize, _frontier: &[Configuration]) {}

    /// Called for every configuration processed, in frontier order.
    fn on_configuration(&mut self, _snapshot: &Snapshot) {}

    fn is_cancelled(&self) -> bool {
        false
    }
}

impl Observer for () {}

/// An observer that keeps every snapshot it is shown.
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    pub snapshots: Vec<Snapshot>,
}

impl Observer for Recorder {
    fn on_configuration(&mut self, snapshot: &Snapshot) {
        self.snapshots.push(snapshot.clone());
    }
}

/// The ceiling a search ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Rounds(usize),
    Configurations(usize),
}

/// How a search ended. Every variant carries the configuration it ended on.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// An accepting configuration was found.
    Accepted(Configuration),
    /// Every path dead-ended or looped; carries the last configuration processed.
    Rejected(Configuration),
    /// The search hit a configured ceiling before reaching a verdict.
    LimitExceeded {
        limit: Limit,
        last: Configuration,
    },
    /// The observer asked the search to stop.
    Cancelled(Configuration),
}

/// Result of a single round.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// The round finished and the next frontier is not empty.
    Continue,
    /// The search is over.
    Halt(Outcome),
}

/// The final result of a search.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub outcome: Outcome,
    /// Number of rounds processed.
    pub rounds: usize,
    /// Number of distinct configurations queued over the whole search.
    pub explored: usize,
}

impl Verdict {
    pub fn accepted(&self) -> bool {
        matches!(self.outcome, Outcome::Accepted(_))
    }

    /// The configuration the search ended on.
    pub fn terminal(&self) -> &Configuration {
        match &self.outcome {
            Outcome::Accepted(c) | Outcome::Rejected(c) | Outcome::Cancelled(c) => c,
            Outcome::LimitExceeded { last, .. } => last,
        }
    }
}

/// Runs breadth-first searches over one automaton.
///
/// The automaton is only borrowed, so any number of explorers can share it.
#[derive(Debug, Clone, Copy)]
pub struct Explorer<'a> {
    automaton: &'a Automaton,
    config: ExplorerConfig,
}

impl<'a> Explorer<'a> {
    pub fn new(automaton: &'a Automaton) -> Self {
        Self {
            automaton,
            config: ExplorerConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ExplorerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ExplorerConfig {
        &self.config
    }

    /// Starts a search over `input` that can be driven one round at a time.
    pub fn explore(&self, input: &str) -> Search<'a> {
        Search::new(self.automaton, self.config, input)
    }

    /// Searches `input` to completion without observing it.
    pub fn run(&self, input: &str) -> Verdict {
        self.run_with(input, &mut ())
    }

    /// Searches `input` to completion, reporting progress to `observer`.
    pub fn run_with<O: Observer>(&self, input: &str, observer: &mut O) -> Verdict {
        self.explore(input).run(observer)
    }
}

/// The state of one search.
#[derive(Debug, Clone)]
pub struct Search<'a> {
    automaton: &'a Automaton,
    config: ExplorerConfig,
    frontier: Vec<Configuration>,
    seen: HashSet<Configuration>,
    counter: LineageCounter,
    round: usize,
    last: Configuration,
    halted: Option<Outcome>,
}

impl<'a> Search<'a> {
    fn new(automaton: &'a Automaton, config: ExplorerConfig, input: &str) -> Self {
        let initial = Configuration::initial(automaton, input);

        Self {
            automaton,
            config,
            frontier: vec![initial.clone()],
            seen: HashSet::from([initial.clone()]),
            counter: LineageCounter::new(),
            round: 0,
            last: initial,
            halted: None,
        }
    }

    /// Processes one round.
    ///
    /// Once the search has halted, every further call returns the same outcome.
    pub fn round<O: Observer>(&mut self, observer: &mut O) -> Step {
        if let Some(outcome) = &self.halted {
            return Step::Halt(outcome.clone());
        }

        if observer.is_cancelled() {
            return self.halt(Outcome::Cancelled(self.last.clone()));
        }

        if self.round >= self.config.max_rounds {
            return self.halt(Outcome::LimitExceeded {
                limit: Limit::Rounds(self.config.max_rounds),
                last: self.last.clone(),
            });
        }

        self.round += 1;
        let round = self.round;
        let automaton = self.automaton;

        tracing::debug!(round, frontier = self.frontier.len(), "exploring round");
        observer.on_round(round, &self.frontier);

        let frontier = std::mem::take(&mut self.frontier);
        let mut pool = Vec::new();

        for configuration in frontier {
            observer.on_configuration(&Snapshot::capture(&configuration, automaton, round));
            tracing::trace!(round, "{}", configuration.describe(automaton));

            if configuration.is_accepting(automaton) {
                return self.halt(Outcome::Accepted(configuration));
            }

            pool.extend(configuration.step(automaton, &mut self.counter));
            self.last = configuration;
        }

        // Prefer branches closer to exhausting the input. The sort is stable so ties keep
        // the order they were produced in.
        pool.sort_by_key(|c| c.remaining().len());

        // `seen` holds every configuration ever queued, which covers the frontier just
        // expanded as well as duplicates inside the pool.
        let next: Vec<Configuration> = pool
            .into_iter()
            .filter(|c| self.seen.insert(c.clone()))
            .collect();

        if next.is_empty() {
            return self.halt(Outcome::Rejected(self.last.clone()));
        }

        if self.seen.len() > self.config.max_configurations {
            // An accepting configuration already queued decides the search.
            if let Some(accepting) = next.iter().find(|c| c.is_accepting(automaton)) {
                observer.on_configuration(&Snapshot::capture(accepting, automaton, round + 1));
                return self.halt(Outcome::Accepted(accepting.clone()));
            }

            return self.halt(Outcome::LimitExceeded {
                limit: Limit::Configurations(self.config.max_configurations),
                last: self.last.clone(),
            });
        }

        self.frontier = next;
        Step::Continue
    }

    /// Processes rounds until the search halts.
    pub fn run<O: Observer>(mut self, observer: &mut O) -> Verdict {
        loop {
            if let Step::Halt(outcome) = self.round(observer) {
                return Verdict {
                    outcome,
                    rounds: self.round,
                    explored: self.seen.len(),
                };
            }
        }
    }

    /// Configurations waiting to be processed in the next round.
    pub fn frontier(&self) -> &[Configuration] {
        &self.frontier
    }

    /// Number of rounds processed so far.
    pub fn rounds(&self) -> usize {
        self.round
    }

    /// Number of distinct configurations queued so far.
    pub fn explored(&self) -> usize {
        self.seen.len()
    }

    fn halt(&mut self, outcome: Outcome) -> Step {
        let automaton = self.automaton;
        match &outcome {
            Outcome::Accepted(c) => {
                tracing::info!(round = self.round, "accepted at {}", c.describe(automaton))
            }
            Outcome::Rejected(c) => {
                tracing::info!(round = self.round, "rejected after {}", c.describe(automaton))
            }
            Outcome::LimitExceeded { limit, .. } => {
                tracing::warn!(round = self.round, ?limit, "search limit exceeded")
            }
            Outcome::Cancelled(_) => tracing::info!(round = self.round, "search cancelled"),
        }

        self.frontier.clear();
        self.halted = Some(outcome.clone());
        Step::Halt(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn automaton(table: &str) -> Automaton {
        Automaton::from_table(&parse(table).unwrap()).unwrap()
    }

    const BALANCED: &str = "acc
q, (, , (, q
q, ), (, , q
q, , $, , acc";

    #[test]
    fn test_balanced_parentheses() {
        let a = automaton(BALANCED);
        let explorer = Explorer::new(&a);

        assert!(explorer.run("(())").accepted());
        assert!(explorer.run("()()").accepted());
        assert!(explorer.run("").accepted());
        assert!(!explorer.run("(()").accepted());
        assert!(!explorer.run("())").accepted());
    }

    #[test]
    fn test_rejection_reports_last_configuration() {
        let a = automaton(BALANCED);

        let verdict = Explorer::new(&a).run("(()");

        match &verdict.outcome {
            Outcome::Rejected(last) => {
                assert_eq!(a.name(last.state()), "q");
                assert!(last.remaining().is_empty());
                assert_eq!(last.stack().to_vec(), vec!["(", "$"]);
            }
            other => panic!("Expected rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_terminal_configuration_of_acceptance() {
        let a = automaton(BALANCED);

        let verdict = Explorer::new(&a).run("()");

        assert_eq!(a.name(verdict.terminal().state()), "acc");
        assert!(verdict.terminal().stack().is_empty());
        assert_eq!(verdict.rounds, 4);
    }

    #[test]
    fn test_deterministic() {
        let a = automaton(
            "f
q, a, , a, q
q, b, , b, q
q, a, , , r
q, b, , , r
q, , , , r
r, a, a, , r
r, b, b, , r
r, , $, , f",
        );
        let explorer = Explorer::new(&a);

        let first = explorer.run("abbaabba");
        let second = explorer.run("abbaabba");

        assert!(first.accepted());
        assert_eq!(first, second);
        assert_eq!(
            first.terminal().lineage().to_string(),
            second.terminal().lineage().to_string()
        );
    }

    #[test]
    fn test_epsilon_self_loop_terminates() {
        let a = automaton(
            "f
s, , , , s
s, x, , , f",
        );

        let verdict = Explorer::new(&a).run("");

        assert!(matches!(verdict.outcome, Outcome::Rejected(_)));
        assert_eq!(verdict.rounds, 1);
    }

    #[test]
    fn test_shorter_accepting_derivation_wins() {
        // s -ε-> t -a-> f is two steps; s -a-> u -ε-> v -ε-> w -ε-> f is four.
        let a = automaton(
            "f
s, , , , t
s, a, , X, u
t, a, , , f
u, , X, , v
v, , , , w
w, , , , f",
        );

        let verdict = Explorer::new(&a).run("a");

        assert!(verdict.accepted());
        assert_eq!(verdict.rounds, 3);
        assert_eq!(a.name(verdict.terminal().state()), "f");
        assert_eq!(verdict.terminal().stack().to_vec(), vec!["$"]);
    }

    #[test]
    fn test_unbounded_stack_growth_hits_configuration_limit() {
        let a = automaton(
            "f
s, , , A, s
s, x, , , f",
        );
        let config = ExplorerConfig {
            max_rounds: 1_000,
            max_configurations: 50,
        };

        let verdict = Explorer::new(&a).with_config(config).run("");

        match verdict.outcome {
            Outcome::LimitExceeded { limit, .. } => {
                assert_eq!(limit, Limit::Configurations(50))
            }
            other => panic!("Expected limit, got {:?}", other),
        }
    }

    #[test]
    fn test_next_frontier_sorted_and_deduplicated() {
        let a = automaton(
            "f
s, , , , t
s, a, , , u
s, a, , , u
t, z, , , t
u, b, , , f",
        );
        let mut search = Explorer::new(&a).explore("ab");

        assert_eq!(search.round(&mut ()), Step::Continue);

        let frontier: Vec<(&str, usize)> = search
            .frontier()
            .iter()
            .map(|c| (a.name(c.state()), c.remaining().len()))
            .collect();
        assert_eq!(frontier, vec![("u", 1), ("t", 2)]);
        assert_eq!(search.explored(), 3);
    }

    #[test]
    fn test_queued_acceptance_beats_configuration_limit() {
        let a = automaton(
            "f
s, a, , , f",
        );
        let config = ExplorerConfig {
            max_configurations: 1,
            ..ExplorerConfig::default()
        };
        let mut recorder = Recorder::default();

        let verdict = Explorer::new(&a)
            .with_config(config)
            .run_with("a", &mut recorder);

        assert!(verdict.accepted());
        assert_eq!(a.name(verdict.terminal().state()), "f");
        assert!(recorder.snapshots.last().unwrap().accepting);
    }

    #[test]
    fn test_round_limit() {
        let a = automaton(
            "f
s, , , A, s
s, x, , , f",
        );
        let config = ExplorerConfig {
            max_rounds: 10,
            ..ExplorerConfig::default()
        };

        let verdict = Explorer::new(&a).with_config(config).run("");

        assert_eq!(verdict.rounds, 10);
        assert!(matches!(
            verdict.outcome,
            Outcome::LimitExceeded {
                limit: Limit::Rounds(10),
                ..
            }
        ));
    }

    #[test]
    fn test_lineage_unique_across_search_tree() {
        let a = automaton(
            "f
q, a, , a, q
q, b, , b, q
q, a, , , r
q, b, , , r
q, , , , r
r, a, a, , r
r, b, b, , r
r, , $, , f",
        );
        let mut recorder = Recorder::default();

        Explorer::new(&a).run_with("abaaba", &mut recorder);

        let labels: Vec<String> = recorder
            .snapshots
            .iter()
            .map(|s| s.lineage.to_string())
            .collect();
        let unique: HashSet<&String> = labels.iter().collect();

        assert!(labels.iter().any(|l| l.contains('A')));
        assert_eq!(unique.len(), labels.len());
    }

    #[test]
    fn test_observer_sees_rounds_in_order() {
        let a = automaton(BALANCED);
        let mut recorder = Recorder::default();

        let verdict = Explorer::new(&a).run_with("()", &mut recorder);

        let rounds: Vec<usize> = recorder.snapshots.iter().map(|s| s.round).collect();
        assert_eq!(rounds, vec![1, 2, 3, 4]);
        assert!(recorder.snapshots[0].initial);
        assert!(recorder.snapshots.last().unwrap().accepting);
        assert_eq!(verdict.rounds, 4);
    }

    struct CancelAfter {
        rounds: usize,
        seen: usize,
    }

    impl Observer for CancelAfter {
        fn on_round(&mut self, _round: usize, _frontier: &[Configuration]) {
            self.seen += 1;
        }

        fn is_cancelled(&self) -> bool {
            self.seen >= self.rounds
        }
    }

    #[test]
    fn test_cancellation() {
        let a = automaton(BALANCED);

        let mut observer = CancelAfter { rounds: 0, seen: 0 };
        let verdict = Explorer::new(&a).run_with("(())", &mut observer);
        assert!(matches!(verdict.outcome, Outcome::Cancelled(_)));
        assert_eq!(verdict.rounds, 0);

        let mut observer = CancelAfter { rounds: 2, seen: 0 };
        let verdict = Explorer::new(&a).run_with("(())", &mut observer);
        assert!(matches!(verdict.outcome, Outcome::Cancelled(_)));
        assert_eq!(verdict.rounds, 2);
    }

    #[test]
    fn test_stepping_rounds() {
        let a = automaton(BALANCED);
        let mut search = Explorer::new(&a).explore("()");

        assert_eq!(search.round(&mut ()), Step::Continue);
        assert_eq!(search.rounds(), 1);
        assert_eq!(search.frontier().len(), 1);

        let mut step = Step::Continue;
        while step == Step::Continue {
            step = search.round(&mut ());
        }

        assert!(matches!(step, Step::Halt(Outcome::Accepted(_))));
        assert_eq!(search.round(&mut ()), step);
    }

    #[test]
    fn test_shared_automaton_across_threads() {
        let a = automaton(BALANCED);

        std::thread::scope(|scope| {
            let handles: Vec<_> = ["(())", "(()", "()()()"]
                .into_iter()
                .map(|input| {
                    let a = &a;
                    scope.spawn(move || Explorer::new(a).run(input).accepted())
                })
                .collect();

            let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
            assert_eq!(results, vec![true, false, true]);
        });
    }
}
