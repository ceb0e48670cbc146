//! Stack-based balance evaluation.
//!
//! Each line gets its own stack. The scan stops at the first failure; the
//! verdict is the same as scanning the whole line.

use std::sync::OnceLock;

use crate::grammar::{Grammar, OtherChars, Symbol};

/// Result of scanning a single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Balanced,
    /// A closing symbol had nothing open, or the wrong kind open.
    Mismatch { position: usize, found: char },
    /// An opening symbol is not allowed where it appeared.
    Misplaced { position: usize, found: char },
    /// A character that is not a bracket, under [`OtherChars::Reject`].
    Stray { position: usize, found: char },
    /// The line ended with brackets still open.
    Unclosed { depth: usize },
}

impl Outcome {
    pub const fn is_balanced(&self) -> bool {
        matches!(self, Self::Balanced)
    }
}

/// Scan `line` under `grammar` and describe the first failure, if any.
///
/// `position` fields are character offsets, not byte offsets.
pub fn check(grammar: &Grammar, line: &str) -> Outcome {
    let mut stack: Vec<usize> = Vec::new();

    for (position, found) in line.chars().enumerate() {
        match grammar.symbol(found) {
            Some(Symbol::Open(kind)) => {
                if !grammar.may_open(stack.last().copied(), kind) {
                    return Outcome::Misplaced { position, found };
                }
                stack.push(kind);
            }
            Some(Symbol::Close(kind)) => {
                if stack.pop() != Some(kind) {
                    return Outcome::Mismatch { position, found };
                }
            }
            None => {
                if grammar.other_chars() == OtherChars::Reject {
                    return Outcome::Stray { position, found };
                }
            }
        }
    }

    if stack.is_empty() {
        Outcome::Balanced
    } else {
        Outcome::Unclosed { depth: stack.len() }
    }
}

/// Verdict for one line: `true` iff balanced under `grammar`.
pub fn evaluate(grammar: &Grammar, line: &str) -> bool {
    let outcome = check(grammar, line);
    if !outcome.is_balanced() {
        tracing::trace!(?outcome, "line is unbalanced");
    }
    outcome.is_balanced()
}

/// Plain nesting balance over `()`, `[]` and `{}`, ignoring everything else.
pub fn is_balanced(line: &str) -> bool {
    static NESTED: OnceLock<Grammar> = OnceLock::new();
    evaluate(NESTED.get_or_init(Grammar::nested), line)
}
