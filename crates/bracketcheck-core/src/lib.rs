//! `bracketcheck` Core Library
//!
//! Shared functionality for the `partone` and `parttwo` validators:
//! - Bracket grammars and the stack-based balance evaluator
//! - The header/data line protocol gate
//! - Verdict rendering and the session driver
//! - Configuration resolution and common error types

pub mod config;
pub mod error;
pub mod evaluator;
pub mod format;
pub mod grammar;
pub mod pool;
pub mod protocol;
pub mod session;
pub mod tracing_init;

pub use config::Config;
pub use error::{Error, Result};
pub use evaluator::{evaluate, is_balanced};
pub use format::OutputVariant;
pub use grammar::{Grammar, GrammarDef, Preset};
pub use session::{Session, Summary};
