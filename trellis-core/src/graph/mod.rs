//! Trait Graph
//!
//! This module implements the dependency graph that orders trait
//! evaluation.
//!
//! # Overview
//!
//! The graph is a directed acyclic graph (DAG) where:
//!
//! - Vertices are traits, indexed by absolute name
//! - Edges are dependencies: if B reads A, there is an edge from A to B
//!
//! Each update walks a cached topological order, evaluating every trait
//! after everything it reads.
//!
//! # Design Decisions
//!
//! 1. Vertices live in an arena addressed by generational handles. The
//!    graph is the sole owner of every trait; nothing is shared.
//!
//! 2. Edges are derived data, regenerated in one pass from the declared
//!    dependency lists rather than maintained on every insertion.
//!
//! 3. We keep both forward (dependencies) and reverse (dependents) edges so
//!    that Kahn's algorithm can run without building adjacency on the fly.

mod arena;
mod evaluator;
mod node;
mod scheduler;
mod trait_graph;

pub use node::{Trait, TraitId, TypedTrait};
pub use scheduler::Scheduler;
pub use trait_graph::TraitGraph;
