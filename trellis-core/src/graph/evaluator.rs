//! Per-frame Evaluation
//!
//! `update()` walks the cached order once. Each computation reads its
//! inputs by name from the values produced earlier in the same walk, and
//! the result is pushed into the trait's sink, if any.

use super::trait_graph::TraitGraph;
use crate::error::Result;

impl TraitGraph {
    /// Evaluate every trait in dependency order and feed the sinks.
    ///
    /// Sorts first when the cached order is stale. Construction errors
    /// (dangling dependency, cycle) surface here before any sink is called.
    /// Evaluation stops at the first computation that fails.
    pub fn update(&mut self) -> Result<()> {
        if !self.is_sorted() {
            self.sort()?;
        }

        let Self {
            arena,
            index,
            scheduler,
            ..
        } = self;
        let Some(order) = scheduler.order() else {
            return Ok(());
        };

        for &id in order {
            arena.evaluate(id, index)?;
        }
        tracing::trace!(traits = order.len(), "update complete");
        Ok(())
    }
}
