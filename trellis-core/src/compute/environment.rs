//! Evaluation Environment
//!
//! A computation never receives its inputs as arguments. It looks them up
//! by absolute name in whatever environment the evaluator hands it; inside
//! a graph that is the set of values produced earlier in the same update.

use std::collections::HashMap;
use std::hash::BuildHasher;

use crate::error::{Result, TraitError};
use crate::value::Value;

/// Name-based read access to current trait values.
pub trait Environment {
    /// Look up the current value of the trait with this absolute name.
    fn lookup(&self, name: &str) -> Result<&Value>;
}

impl<S: BuildHasher> Environment for HashMap<String, Value, S> {
    fn lookup(&self, name: &str) -> Result<&Value> {
        self.get(name)
            .ok_or_else(|| TraitError::NotFound(name.to_string()))
    }
}
