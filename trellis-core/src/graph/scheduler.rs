//! Evaluation Scheduler
//!
//! The scheduler determines the order in which traits are evaluated each
//! update. It ensures that dependencies are always evaluated before their
//! dependents.
//!
//! # Algorithm
//!
//! We use Kahn's algorithm over the whole graph:
//!
//! 1. Count each vertex's incoming edges (its dependencies)
//! 2. Seed a queue with every vertex that has none
//! 3. Pop a vertex, append it to the order, and decrement each dependent
//! 4. Any vertex left with a nonzero count sits on, or behind, a cycle
//!
//! The order is cached until the graph changes, so a steady-state update is
//! a plain walk over a vector.

use std::collections::{HashMap, VecDeque};

use super::arena::Arena;
use super::node::TraitId;
use crate::error::{Result, TraitError};

/// Cached topological order over the trait graph.
#[derive(Debug, Default)]
pub struct Scheduler {
    order: Option<Vec<TraitId>>,
}

impl Scheduler {
    /// Create a scheduler with no cached order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a valid order is cached.
    pub fn is_sorted(&self) -> bool {
        self.order.is_some()
    }

    /// Drop the cached order.
    pub fn invalidate(&mut self) {
        self.order = None;
    }

    /// The cached order, if sorted.
    pub fn order(&self) -> Option<&[TraitId]> {
        self.order.as_deref()
    }

    /// Sort the arena's current edge set and cache the result.
    ///
    /// On a cycle the cache stays empty, so no evaluation can happen until
    /// the graph is corrected.
    pub(crate) fn sort(&mut self, arena: &Arena) -> Result<()> {
        self.order = None;
        let order = topological_sort(arena)?;
        tracing::debug!(vertices = order.len(), "sorted trait graph");
        self.order = Some(order);
        Ok(())
    }
}

/// Return every vertex so that dependencies come before dependents.
fn topological_sort(arena: &Arena) -> Result<Vec<TraitId>> {
    let mut in_degree: HashMap<TraitId, usize> = HashMap::with_capacity(arena.len());
    let mut result = Vec::with_capacity(arena.len());
    let mut queue = VecDeque::new();

    for (id, vertex) in arena.iter() {
        let degree = vertex.dependencies().len();
        in_degree.insert(id, degree);
        if degree == 0 {
            queue.push_back(id);
        }
    }

    while let Some(id) = queue.pop_front() {
        result.push(id);

        if let Some(vertex) = arena.get(id) {
            for &dependent in vertex.dependents() {
                if let Some(degree) = in_degree.get_mut(&dependent) {
                    *degree = degree.saturating_sub(1);
                    if *degree == 0 {
                        queue.push_back(dependent);
                    }
                }
            }
        }
    }

    if result.len() < in_degree.len() {
        let mut involved: Vec<String> = in_degree
            .iter()
            .filter(|(_, degree)| **degree > 0)
            .filter_map(|(id, _)| arena.get(*id))
            .map(|vertex| vertex.payload().name().to_string())
            .collect();
        involved.sort();
        return Err(TraitError::CycleDetected { involved });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Computation;
    use crate::graph::node::{Trait, Vertex};

    fn add(arena: &mut Arena, name: &str) -> TraitId {
        arena.insert(Vertex::new(Trait::new(
            name.to_string(),
            Computation::constant(0),
            false,
        )))
    }

    fn edge(arena: &mut Arena, dependency: TraitId, dependent: TraitId) {
        if let Some(vertex) = arena.get_mut(dependency) {
            vertex.add_dependent(dependent);
        }
        if let Some(vertex) = arena.get_mut(dependent) {
            vertex.add_dependency(dependency);
        }
    }

    #[test]
    fn chain_sorts_in_dependency_order() {
        let mut arena = Arena::default();

        // Declared out of order: c -> b -> a
        let c = add(&mut arena, "c");
        let a = add(&mut arena, "a");
        let b = add(&mut arena, "b");
        edge(&mut arena, a, b);
        edge(&mut arena, b, c);

        let mut scheduler = Scheduler::new();
        assert!(!scheduler.is_sorted());
        scheduler.sort(&arena).unwrap();

        let order = scheduler.order().unwrap();
        let position = |id| order.iter().position(|&x| x == id);
        assert!(position(a) < position(b));
        assert!(position(b) < position(c));
    }

    #[test]
    fn cycle_leaves_scheduler_unsorted() {
        let mut arena = Arena::default();
        let a = add(&mut arena, "a");
        let b = add(&mut arena, "b");
        let free = add(&mut arena, "free");
        edge(&mut arena, a, b);
        edge(&mut arena, b, a);

        let mut scheduler = Scheduler::new();
        let err = scheduler.sort(&arena).unwrap_err();
        assert_eq!(
            err,
            TraitError::CycleDetected {
                involved: vec!["a".to_string(), "b".to_string()]
            }
        );
        assert!(!scheduler.is_sorted());
        assert!(arena.get(free).is_some());
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let mut arena = Arena::default();
        let a = add(&mut arena, "a");
        edge(&mut arena, a, a);

        let mut scheduler = Scheduler::new();
        assert!(matches!(
            scheduler.sort(&arena),
            Err(TraitError::CycleDetected { .. })
        ));
    }

    #[test]
    fn invalidate_drops_order() {
        let mut arena = Arena::default();
        add(&mut arena, "a");

        let mut scheduler = Scheduler::new();
        scheduler.sort(&arena).unwrap();
        assert_eq!(scheduler.order().map(<[TraitId]>::len), Some(1));

        scheduler.invalidate();
        assert!(scheduler.order().is_none());
    }
}
