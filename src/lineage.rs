//! Branch-lineage labels.
//!
//! Every configuration carries a [`BranchPath`] describing where it sits in the search
//! tree. The label is for presentation only: it names frames for a renderer and never
//! takes part in equivalence, acceptance or ordering.
//!
//! A label is a sequence of generation counters. A configuration with a single child
//! passes on its label with the last counter incremented. When a configuration forks, the
//! incremented counter is tagged with a discriminator drawn from a [`LineageCounter`] and
//! a new counter starting at zero is appended, so `_1` forks into `_2A_0` and `_2B_0`,
//! whose children are `_2A_1` and `_2B_1`.

use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Segment {
    generation: u32,
    branch: Option<u32>,
}

/// A structured, monotonically extended path identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchPath {
    segments: Vec<Segment>,
}

impl BranchPath {
    /// The label of the initial configuration, `_0`.
    pub fn root() -> Self {
        Self {
            segments: vec![Segment {
                generation: 0,
                branch: None,
            }],
        }
    }

    /// Label for the only child of this configuration.
    pub fn advance(&self) -> Self {
        let mut segments = self.segments.clone();
        if let Some(last) = segments.last_mut() {
            last.generation += 1;
        }
        Self { segments }
    }

    /// Label for one of several children of this configuration.
    pub fn fork(&self, counter: &mut LineageCounter) -> Self {
        let mut child = self.advance();
        if let Some(last) = child.segments.last_mut() {
            last.branch = Some(counter.next());
        }
        child.segments.push(Segment {
            generation: 0,
            branch: None,
        });
        child
    }

    /// Number of forks between the root and this label.
    pub fn depth(&self) -> usize {
        self.segments.len() - 1
    }

    /// Whether this is the label of the initial configuration.
    pub fn is_root(&self) -> bool {
        *self == Self::root()
    }
}

impl Default for BranchPath {
    fn default() -> Self {
        Self::root()
    }
}

impl fmt::Display for BranchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.segments {
            write!(f, "_{}", segment.generation)?;
            if let Some(branch) = segment.branch {
                f.write_str(&letters(branch))?;
            }
        }
        Ok(())
    }
}

impl Serialize for BranchPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Spells a discriminator in bijective base 26: `A`..`Z`, `AA`, `AB`, ...
fn letters(mut n: u32) -> String {
    let mut out = Vec::new();
    loop {
        out.push(b'A' + (n % 26) as u8);
        if n < 26 {
            break;
        }
        n = n / 26 - 1;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Source of fork discriminators for one search.
///
/// The counter is owned by the search and threaded through every child-creation call;
/// drawing from it is the only way to fork a label, which keeps labels unique across the
/// whole search tree.
#[derive(Debug, Default, Clone)]
pub struct LineageCounter {
    next: u32,
}

impl LineageCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a discriminator that has not been handed out before.
    pub fn next(&mut self) -> u32 {
        let n = self.next;
        self.next += 1;
        n
    }

    /// Number of discriminators handed out so far.
    pub fn issued(&self) -> u32 {
        self.next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_label() {
        assert_eq!(BranchPath::root().to_string(), "_0");
        assert!(BranchPath::root().is_root());
    }

    #[test]
    fn test_advance() {
        let label = BranchPath::root().advance().advance();

        assert_eq!(label.to_string(), "_2");
        assert_eq!(label.depth(), 0);
    }

    #[test]
    fn test_fork() {
        let mut counter = LineageCounter::new();
        let parent = BranchPath::root().advance();

        let a = parent.fork(&mut counter);
        let b = parent.fork(&mut counter);

        assert_eq!(a.to_string(), "_2A_0");
        assert_eq!(b.to_string(), "_2B_0");
        assert_eq!(a.advance().to_string(), "_2A_1");
        assert_eq!(a.depth(), 1);
        assert_eq!(counter.issued(), 2);
    }

    #[test]
    fn test_letters() {
        assert_eq!(letters(0), "A");
        assert_eq!(letters(25), "Z");
        assert_eq!(letters(26), "AA");
        assert_eq!(letters(27), "AB");
        assert_eq!(letters(26 + 26 * 26), "AAA");
    }

    #[test]
    fn test_forks_from_distinct_parents_stay_distinct() {
        let mut counter = LineageCounter::new();
        let root = BranchPath::root();

        let left = root.fork(&mut counter);
        let right = root.fork(&mut counter);
        let left_child = left.fork(&mut counter);
        let right_child = right.fork(&mut counter);

        assert_ne!(left_child, right_child);
        assert_ne!(left_child.to_string(), right_child.to_string());
    }

    #[test]
    fn test_serialize_as_string() {
        let label = BranchPath::root().fork(&mut LineageCounter::new());

        assert_eq!(serde_json::to_string(&label).unwrap(), "\"_1A_0\"");
    }
}
