//! A persistent stack of symbols.
//!
//! Every configuration owns a stack, and a single configuration can branch into many
//! children per round. Frames are shared between stacks through `Arc`, so a push or pop
//! produces a new stack in constant time without copying, and the stacks of sibling
//! configurations never interfere with each other.

use serde::{Serialize, Serializer};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::types::{Symbol, BOTTOM_MARKER};

struct Frame {
    symbol: Symbol,
    below: Option<Arc<Frame>>,
}

/// An immutable stack whose top is the first element.
#[derive(Clone, Default)]
pub struct Stack {
    top: Option<Arc<Frame>>,
    len: usize,
}

impl Stack {
    /// Creates an empty stack.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the stack every search starts from: just the bottom marker.
    pub fn with_bottom() -> Self {
        Self::new().push(BOTTOM_MARKER)
    }

    /// Returns a new stack with `symbol` on top of this one.
    pub fn push(&self, symbol: &str) -> Self {
        Self {
            top: Some(Arc::new(Frame {
                symbol: symbol.to_string(),
                below: self.top.clone(),
            })),
            len: self.len + 1,
        }
    }

    /// Returns the stack without its top element. Popping an empty stack yields an empty stack.
    pub fn pop(&self) -> Self {
        match &self.top {
            Some(frame) => Self {
                top: frame.below.clone(),
                len: self.len - 1,
            },
            None => Self::new(),
        }
    }

    /// Returns the top symbol, if any.
    pub fn top(&self) -> Option<&str> {
        self.top.as_deref().map(|frame| frame.symbol.as_str())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates from the top of the stack down to the bottom.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.top.as_deref(),
        }
    }

    /// Copies the symbols out, top first.
    pub fn to_vec(&self) -> Vec<Symbol> {
        self.iter().map(str::to_string).collect()
    }
}

impl Drop for Stack {
    // Unlink uniquely owned frames one at a time so dropping a deep stack cannot
    // overflow the call stack through recursive `Arc` drops.
    fn drop(&mut self) {
        let mut next = self.top.take();
        while let Some(frame) = next {
            match Arc::try_unwrap(frame) {
                Ok(mut frame) => next = frame.below.take(),
                Err(_) => break,
            }
        }
    }
}

impl<'a> FromIterator<&'a str> for Stack {
    /// Builds a stack from symbols listed top first.
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let symbols: Vec<&str> = iter.into_iter().collect();
        symbols
            .into_iter()
            .rev()
            .fold(Stack::new(), |stack, symbol| stack.push(symbol))
    }
}

/// Iterator over the symbols of a [`Stack`], top first.
pub struct Iter<'a> {
    next: Option<&'a Frame>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|frame| {
            self.next = frame.below.as_deref();
            frame.symbol.as_str()
        })
    }
}

impl PartialEq for Stack {
    fn eq(&self, other: &Self) -> bool {
        if self.len != other.len {
            return false;
        }

        match (&self.top, &other.top) {
            (Some(a), Some(b)) if Arc::ptr_eq(a, b) => true,
            _ => self.iter().eq(other.iter()),
        }
    }
}

impl Eq for Stack {}

impl Hash for Stack {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for symbol in self.iter() {
            symbol.hash(state);
        }
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for symbol in self.iter() {
            f.write_str(symbol)?;
        }
        Ok(())
    }
}

impl Serialize for Stack {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}
