//! Error Types
//!
//! Every fallible operation in the engine reports a [`TraitError`]. Errors
//! are local to the operation that produced them; the graph never swallows
//! one silently.

use thiserror::Error;

use crate::graph::TraitId;
use crate::value::{Value, ValueKind};

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TraitError>;

/// Errors produced while building, resolving, or evaluating a trait graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TraitError {
    /// No trait with this name is registered.
    #[error("trait not found: {0}")]
    NotFound(String),

    /// The trait exists but has not produced a value yet.
    #[error("trait {0} has not been evaluated")]
    Unevaluated(String),

    /// The trait exists but carries a different value kind.
    #[error("trait {name} holds {found}, not {expected}")]
    TypeMismatch {
        name: String,
        expected: ValueKind,
        found: ValueKind,
    },

    /// A declared dependency was never registered.
    #[error("trait {trait_name} depends on unknown trait {dependency}")]
    DanglingDependency {
        trait_name: String,
        dependency: String,
    },

    /// One document declared the same absolute trait name twice.
    #[error("trait {name} is declared more than once")]
    DuplicateTrait { name: String },

    /// The dependency edges contain a cycle.
    #[error("dependency cycle among: {}", involved.join(", "))]
    CycleDetected { involved: Vec<String> },

    /// A vertex slot lost its payload. Indicates a bug in the graph.
    #[error("vertex {0:?} has no payload")]
    NullVertex(TraitId),

    /// The handle refers to a vertex that has since been replaced.
    #[error("stale trait handle {0:?}")]
    StaleHandle(TraitId),

    /// The selector exists in the vocabulary but has no resolution rule.
    #[error("selector {0}() is not implemented")]
    Unimplemented(String),

    /// The selector resolved to nothing where a name was required.
    #[error("selector {selector} resolves to nothing from {from}")]
    UnresolvedSelector { selector: String, from: String },

    /// Selector text could not be parsed.
    #[error("malformed selector: {0}")]
    BadSelector(String),

    /// A value could not be coerced to the requested kind.
    #[error("cannot convert {value:?} to {to}")]
    Conversion { value: Value, to: ValueKind },

    /// Integer division or modulo by zero inside a chain.
    #[error("integer division by zero in operator {name}")]
    DivisionByZero { name: &'static str },

    /// A binary operator was declared without an operand.
    #[error("operator {op} requires an operand")]
    MissingOperand { op: &'static str },
}
