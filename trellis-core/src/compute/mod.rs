//! Computations
//!
//! This module implements the restricted dataflow language used for
//! computed trait attributes.
//!
//! # Concepts
//!
//! ## Chains
//!
//! A chain is an ordered list of operators applied to a working value. The
//! head `copy` seeds the working value from a literal or from another
//! trait. Without such a head the working value is the computation's own
//! previous output.
//!
//! ## Switch Dispatch
//!
//! A `copy` whose source is a [`Operand::Switch`] prefix reads the trait
//! named `prefix + working value`, so the current value selects among
//! several same-prefixed alternatives at runtime.
//!
//! ## Environments
//!
//! Inputs are never passed as arguments. A computation looks up other
//! traits by absolute name through an [`Environment`], which the graph
//! backs with the values produced earlier in the same update.

mod computation;
mod environment;
mod operator;

pub use computation::{Computation, Dependency};
pub use environment::Environment;
pub use operator::{OpCode, Operand, Operator};
