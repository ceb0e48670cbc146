//! Bracket grammar definitions.
//!
//! A grammar is the set of bracket kinds the evaluator recognises, which kinds
//! may be opened at top level or directly inside another kind, and what to do
//! with characters that are not bracket symbols.
//!
//! [`GrammarDef`] is the serde-facing description (settings files, presets).
//! [`Grammar`] is the validated, lookup-ready form the evaluator runs on.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A named pair of opening and closing symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketKind {
    /// Kind identifier, referenced by `contains` and `top_level`.
    pub name: String,
    pub open: char,
    pub close: char,
    /// Kinds that may be opened directly inside this one. `None` allows all.
    #[serde(default)]
    pub contains: Option<Vec<String>>,
}

impl BracketKind {
    fn new(name: &str, open: char, close: char, contains: Option<&[&str]>) -> Self {
        Self {
            name: name.to_string(),
            open,
            close,
            contains: contains.map(|names| names.iter().map(|n| (*n).to_string()).collect()),
        }
    }
}

/// Policy for characters that are not bracket symbols.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OtherChars {
    /// Skip them; they never affect the verdict.
    Ignore,
    /// Any such character makes the line unbalanced.
    #[default]
    Reject,
}

/// Built-in grammar presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// `(` at top level, `{` inside `()`, `[` inside `{}`, anything inside `[]`.
    /// Non-bracket characters are rejected.
    #[default]
    Ordered,
    /// Plain nesting: any kind anywhere, non-bracket characters ignored.
    Nested,
}

impl Preset {
    pub fn definition(self) -> GrammarDef {
        match self {
            Self::Ordered => GrammarDef::ordered(),
            Self::Nested => GrammarDef::nested(),
        }
    }

    pub fn grammar(self) -> Grammar {
        Grammar::build(&self.definition())
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ordered => write!(f, "ordered"),
            Self::Nested => write!(f, "nested"),
        }
    }
}

impl FromStr for Preset {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ordered" => Ok(Self::Ordered),
            "nested" => Ok(Self::Nested),
            other => Err(Error::Grammar(format!(
                "unknown grammar preset {other:?} (expected \"ordered\" or \"nested\")"
            ))),
        }
    }
}

/// Serializable grammar description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrammarDef {
    pub kinds: Vec<BracketKind>,
    /// Kinds that may be opened when nothing is open. `None` allows all.
    #[serde(default)]
    pub top_level: Option<Vec<String>>,
    #[serde(default)]
    pub other_chars: OtherChars,
}

impl GrammarDef {
    pub fn ordered() -> Self {
        Self {
            kinds: vec![
                BracketKind::new("round", '(', ')', Some(&["curly"])),
                BracketKind::new("square", '[', ']', None),
                BracketKind::new("curly", '{', '}', Some(&["square"])),
            ],
            top_level: Some(vec!["round".to_string()]),
            other_chars: OtherChars::Reject,
        }
    }

    pub fn nested() -> Self {
        Self {
            kinds: vec![
                BracketKind::new("round", '(', ')', None),
                BracketKind::new("square", '[', ']', None),
                BracketKind::new("curly", '{', '}', None),
            ],
            top_level: None,
            other_chars: OtherChars::Ignore,
        }
    }

    /// Check the definition for duplicate symbols and dangling references.
    pub fn validate(&self) -> Result<()> {
        if self.kinds.is_empty() {
            return Err(Error::Grammar("grammar defines no bracket kinds".into()));
        }

        let mut names: Vec<&str> = Vec::with_capacity(self.kinds.len());
        let mut symbols: HashMap<char, &str> = HashMap::new();
        for kind in &self.kinds {
            if names.contains(&kind.name.as_str()) {
                return Err(Error::Grammar(format!("duplicate kind name {:?}", kind.name)));
            }
            names.push(&kind.name);

            if kind.open == kind.close {
                return Err(Error::Grammar(format!(
                    "kind {:?} uses {:?} for both open and close",
                    kind.name, kind.open
                )));
            }
            for symbol in [kind.open, kind.close] {
                if let Some(owner) = symbols.insert(symbol, &kind.name) {
                    return Err(Error::Grammar(format!(
                        "symbol {symbol:?} is used by both {owner:?} and {:?}",
                        kind.name
                    )));
                }
            }
        }

        let check_refs = |refs: &[String], context: &str| -> Result<()> {
            match refs.iter().find(|r| !names.contains(&r.as_str())) {
                Some(unknown) => Err(Error::Grammar(format!(
                    "{context} references unknown kind {unknown:?}"
                ))),
                None => Ok(()),
            }
        };
        for kind in &self.kinds {
            if let Some(contains) = &kind.contains {
                check_refs(contains.as_slice(), format!("kind {:?}", kind.name).as_str())?;
            }
        }
        if let Some(top) = &self.top_level {
            check_refs(top.as_slice(), "top_level")?;
        }
        Ok(())
    }
}

impl Default for GrammarDef {
    fn default() -> Self {
        Self::ordered()
    }
}

/// What a single character means under a grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    Open(usize),
    Close(usize),
}

/// Validated grammar ready for scanning.
#[derive(Debug, Clone)]
pub struct Grammar {
    symbols: HashMap<char, Symbol>,
    /// `nests[outer][inner]`: may `inner` be opened directly inside `outer`.
    nests: Vec<Vec<bool>>,
    top_level: Vec<bool>,
    other_chars: OtherChars,
}

impl Grammar {
    /// Validate and compile a grammar definition.
    pub fn compile(def: &GrammarDef) -> Result<Self> {
        def.validate()?;
        Ok(Self::build(def))
    }

    pub fn ordered() -> Self {
        Preset::Ordered.grammar()
    }

    pub fn nested() -> Self {
        Preset::Nested.grammar()
    }

    /// Build lookup tables. The definition must already be valid.
    fn build(def: &GrammarDef) -> Self {
        let names: Vec<String> = def.kinds.iter().map(|k| k.name.clone()).collect();
        let index_of = |name: &str| names.iter().position(|n| n == name);
        let mask = |allowed: Option<&Vec<String>>| -> Vec<bool> {
            allowed.map_or_else(
                || vec![true; names.len()],
                |list| {
                    let mut mask = vec![false; names.len()];
                    for idx in list.iter().filter_map(|n| index_of(n.as_str())) {
                        mask[idx] = true;
                    }
                    mask
                },
            )
        };

        let mut symbols = HashMap::with_capacity(def.kinds.len() * 2);
        for (idx, kind) in def.kinds.iter().enumerate() {
            symbols.insert(kind.open, Symbol::Open(idx));
            symbols.insert(kind.close, Symbol::Close(idx));
        }

        Self {
            nests: def.kinds.iter().map(|k| mask(k.contains.as_ref())).collect(),
            top_level: mask(def.top_level.as_ref()),
            symbols,
            other_chars: def.other_chars,
        }
    }

    pub fn symbol(&self, c: char) -> Option<Symbol> {
        self.symbols.get(&c).copied()
    }

    /// Whether `inner` may be opened with `outer` on top of the stack
    /// (`None` meaning nothing is open).
    pub fn may_open(&self, outer: Option<usize>, inner: usize) -> bool {
        match outer {
            None => self.top_level[inner],
            Some(outer) => self.nests[outer][inner],
        }
    }

    pub const fn other_chars(&self) -> OtherChars {
        self.other_chars
    }
}

impl Default for Grammar {
    fn default() -> Self {
        Self::ordered()
    }
}
