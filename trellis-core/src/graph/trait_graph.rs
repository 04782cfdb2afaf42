//! The Trait Graph
//!
//! Vertices are traits keyed by absolute name. Edges are not maintained by
//! hand: [`TraitGraph::rebuild_dependencies`] regenerates all of them from
//! the dependency lists the computations declare. Declarations arrive in
//! any order, usually in one bulk pass from a document, so edge building is
//! deferred until they are all in.

use indexmap::IndexMap;
use tracing::{debug, warn};

use super::arena::Arena;
use super::node::{Trait, TraitId, TypedTrait, Vertex};
use super::scheduler::Scheduler;
use crate::compute::{Computation, Dependency};
use crate::config::EngineConfig;
use crate::error::{Result, TraitError};
use crate::sink::Sink;
use crate::value::{TraitValue, Value};

/// A dependency graph of named, computed traits.
#[derive(Debug, Default)]
pub struct TraitGraph {
    config: EngineConfig,
    pub(super) arena: Arena,
    pub(super) index: IndexMap<String, TraitId>,
    pub(super) scheduler: Scheduler,
    edges_stale: bool,
}

impl TraitGraph {
    /// Create an empty graph using the default naming conventions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty graph with explicit naming conventions.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Naming conventions in effect.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Insert a trait, replacing any trait of the same name.
    ///
    /// A replaced trait's sink carries over to the new vertex when the
    /// value kinds agree. Handles to the replaced vertex go stale.
    pub fn add_trait(&mut self, name: impl Into<String>, computation: Computation) -> TraitId {
        let name = name.into();
        let custom = self.config.is_custom(&name);
        let kind = computation.kind();
        let mut payload = Trait::new(name.clone(), computation, custom);

        if let Some(&previous) = self.index.get(&name) {
            if let Some(old) = self.arena.remove(previous) {
                let mut old = old.into_payload();
                debug!(name = %name, "replacing trait");
                match old.take_sink() {
                    Some(sink) if sink.kind() == kind => payload.set_sink(sink),
                    Some(sink) => warn!(
                        name = %name,
                        sink = %sink.kind(),
                        trait_kind = %kind,
                        "dropping sink of replaced trait with a different kind"
                    ),
                    None => {}
                }
            }
        }

        let id = self.arena.insert(Vertex::new(payload));
        self.index.insert(name, id);
        self.edges_stale = true;
        self.scheduler.invalidate();
        id
    }

    /// Attach a sink to the trait behind `handle`.
    pub fn bind(&mut self, handle: TraitId, sink: Sink) -> Result<()> {
        let vertex = self
            .arena
            .get_mut(handle)
            .ok_or(TraitError::StaleHandle(handle))?;
        let payload = vertex.payload_mut();
        if payload.kind() != sink.kind() {
            return Err(TraitError::TypeMismatch {
                name: payload.name().to_string(),
                expected: payload.kind(),
                found: sink.kind(),
            });
        }
        payload.set_sink(sink);
        Ok(())
    }

    /// Attach a sink to the trait with this name.
    pub fn bind_name(&mut self, name: &str, sink: Sink) -> Result<TraitId> {
        let handle = self.handle(name)?;
        self.bind(handle, sink)?;
        Ok(handle)
    }

    /// Current handle of the trait with this name.
    pub fn handle(&self, name: &str) -> Result<TraitId> {
        self.index
            .get(name)
            .copied()
            .ok_or_else(|| TraitError::NotFound(name.to_string()))
    }

    /// Whether a trait with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of traits.
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    /// Whether the graph has no traits.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Trait names in first-declaration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.index.keys().map(String::as_str)
    }

    /// Look up a trait regardless of its kind.
    pub fn get_trait_variant(&self, name: &str) -> Result<&Trait> {
        let id = self.handle(name)?;
        self.arena
            .get(id)
            .map(Vertex::payload)
            .ok_or(TraitError::NullVertex(id))
    }

    /// Look up a trait whose kind must be `T`'s.
    pub fn get_trait<T: TraitValue>(&self, name: &str) -> Result<TypedTrait<'_, T>> {
        let id = self.handle(name)?;
        let payload = self
            .arena
            .get(id)
            .map(Vertex::payload)
            .ok_or(TraitError::NullVertex(id))?;
        if payload.kind() != T::KIND {
            return Err(TraitError::TypeMismatch {
                name: name.to_string(),
                expected: T::KIND,
                found: payload.kind(),
            });
        }
        Ok(TypedTrait::new(payload, self.arena.value(id)))
    }

    /// Value produced by the latest update.
    pub fn value(&self, name: &str) -> Result<&Value> {
        let id = self.handle(name)?;
        self.arena
            .value(id)
            .ok_or_else(|| TraitError::Unevaluated(name.to_string()))
    }

    /// Non-custom traits that have no sink attached.
    pub fn unbound_traits(&self) -> Vec<&str> {
        self.arena
            .iter()
            .map(|(_, vertex)| vertex.payload())
            .filter(|payload| !payload.is_custom() && !payload.is_bound())
            .map(Trait::name)
            .collect()
    }

    /// Regenerate every edge from the declared dependency lists.
    ///
    /// Exact dependencies must name a registered trait. Prefix dependencies
    /// (switch sources) expand to every other trait with that prefix and
    /// must match at least one. On failure nothing is changed.
    pub fn rebuild_dependencies(&mut self) -> Result<()> {
        let mut edges = Vec::new();

        for (id, vertex) in self.arena.iter() {
            let payload = vertex.payload();
            for dependency in payload.computation().dependencies() {
                let before = edges.len();
                match dependency {
                    Dependency::Exact(name) => {
                        if let Some(&from) = self.index.get(name) {
                            edges.push((from, id));
                        }
                    }
                    Dependency::Prefix(prefix) => edges.extend(
                        self.index
                            .iter()
                            .filter(|&(name, &from)| {
                                from != id && name.starts_with(prefix.as_str())
                            })
                            .map(|(_, &from)| (from, id)),
                    ),
                }
                if edges.len() == before {
                    return Err(TraitError::DanglingDependency {
                        trait_name: payload.name().to_string(),
                        dependency: dependency.name().to_string(),
                    });
                }
            }
        }

        for vertex in self.arena.iter_mut() {
            vertex.clear_edges();
        }
        for &(dependency, dependent) in &edges {
            if let Some(vertex) = self.arena.get_mut(dependency) {
                vertex.add_dependent(dependent);
            }
            if let Some(vertex) = self.arena.get_mut(dependent) {
                vertex.add_dependency(dependency);
            }
        }

        debug!(
            vertices = self.arena.len(),
            edges = edges.len(),
            "rebuilt trait dependencies"
        );
        self.edges_stale = false;
        self.scheduler.invalidate();
        Ok(())
    }

    /// Names of the direct dependencies of `name`, as currently wired.
    pub fn dependencies_of(&self, name: &str) -> Result<Vec<&str>> {
        let id = self.handle(name)?;
        let vertex = self.arena.get(id).ok_or(TraitError::NullVertex(id))?;
        Ok(vertex
            .dependencies()
            .iter()
            .filter_map(|&dep| self.arena.get(dep))
            .map(|dep| dep.payload().name())
            .collect())
    }

    /// Whether a current evaluation order is cached.
    pub fn is_sorted(&self) -> bool {
        !self.edges_stale && self.scheduler.is_sorted()
    }

    /// Order the graph for evaluation, rebuilding stale edges first.
    pub fn sort(&mut self) -> Result<()> {
        if self.edges_stale {
            self.rebuild_dependencies()?;
        }
        if self.scheduler.is_sorted() {
            return Ok(());
        }
        self.scheduler.sort(&self.arena)
    }

    /// Trait names in evaluation order, if sorted.
    pub fn evaluation_order(&self) -> Option<Vec<&str>> {
        if !self.is_sorted() {
            return None;
        }
        let order = self.scheduler.order()?;
        Some(
            order
                .iter()
                .filter_map(|&id| self.arena.get(id))
                .map(|vertex| vertex.payload().name())
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::{OpCode, Operand, Operator};
    use crate::value::ValueKind;

    fn copy_of(name: &str) -> Computation {
        Computation::chain(ValueKind::Int, vec![Operator::copy_trait(name)])
    }

    #[test]
    fn replacement_keeps_one_vertex() {
        let mut graph = TraitGraph::new();
        let first = graph.add_trait("menu.x", Computation::constant(1));
        let second = graph.add_trait("menu.x", Computation::constant(2));

        assert_eq!(graph.len(), 1);
        assert_ne!(first, second);
        assert_eq!(graph.handle("menu.x"), Ok(second));
        assert_eq!(
            graph.bind(first, Sink::from_fn(|_: i32| {})),
            Err(TraitError::StaleHandle(first))
        );
    }

    #[test]
    fn get_trait_checks_kind() {
        let mut graph = TraitGraph::new();
        graph.add_trait("menu.title", Computation::constant("Inventory"));

        assert!(graph.get_trait::<String>("menu.title").is_ok());
        assert_eq!(
            graph.get_trait::<i32>("menu.title").err(),
            Some(TraitError::TypeMismatch {
                name: "menu.title".to_string(),
                expected: ValueKind::Int,
                found: ValueKind::String,
            })
        );
        assert_eq!(
            graph.get_trait::<i32>("menu.missing").err(),
            Some(TraitError::NotFound("menu.missing".to_string()))
        );
        assert!(graph.get_trait_variant("menu.title").is_ok());
    }

    #[test]
    fn bind_rejects_wrong_kind() {
        let mut graph = TraitGraph::new();
        let handle = graph.add_trait("menu.alpha", Computation::constant(255));

        assert!(matches!(
            graph.bind(handle, Sink::from_fn(|_: f32| {})),
            Err(TraitError::TypeMismatch { .. })
        ));
        assert!(graph.bind(handle, Sink::from_fn(|_: i32| {})).is_ok());
        assert!(graph.get_trait_variant("menu.alpha").unwrap().is_bound());
    }

    #[test]
    fn sink_survives_replacement_of_same_kind() {
        let mut graph = TraitGraph::new();
        graph.add_trait("menu.alpha", Computation::constant(255));
        graph.bind_name("menu.alpha", Sink::from_fn(|_: i32| {})).unwrap();

        graph.add_trait("menu.alpha", Computation::constant(128));
        assert!(graph.get_trait_variant("menu.alpha").unwrap().is_bound());

        graph.add_trait("menu.alpha", Computation::constant(0.5f32));
        assert!(!graph.get_trait_variant("menu.alpha").unwrap().is_bound());
    }

    #[test]
    fn rebuild_wires_edges() {
        let mut graph = TraitGraph::new();
        graph.add_trait("menu.b", copy_of("menu.a"));
        graph.add_trait("menu.a", Computation::constant(1));

        graph.rebuild_dependencies().unwrap();
        assert_eq!(graph.dependencies_of("menu.b"), Ok(vec!["menu.a"]));
        assert_eq!(graph.dependencies_of("menu.a"), Ok(vec![]));
    }

    #[test]
    fn dangling_dependency_changes_nothing() {
        let mut graph = TraitGraph::new();
        graph.add_trait("menu.a", Computation::constant(1));
        graph.add_trait("menu.b", copy_of("menu.a"));
        graph.rebuild_dependencies().unwrap();

        graph.add_trait("menu.c", copy_of("ghost.trait"));
        let err = graph.rebuild_dependencies().unwrap_err();
        assert_eq!(
            err,
            TraitError::DanglingDependency {
                trait_name: "menu.c".to_string(),
                dependency: "ghost.trait".to_string(),
            }
        );
        assert_eq!(graph.names().collect::<Vec<_>>(), ["menu.a", "menu.b", "menu.c"]);
        assert_eq!(graph.dependencies_of("menu.b"), Ok(vec!["menu.a"]));
    }

    #[test]
    fn prefix_dependency_expands_to_alternatives() {
        let mut graph = TraitGraph::new();
        graph.add_trait("menu.opt_a", Computation::constant(1));
        graph.add_trait("menu.opt_b", Computation::constant(2));
        graph.add_trait("menu.other", Computation::constant(3));
        graph.add_trait(
            "menu.pick",
            Computation::chain(
                ValueKind::Int,
                vec![
                    Operator::new(OpCode::Copy, Operand::Literal(Value::from("a"))),
                    Operator::new(OpCode::Copy, Operand::Switch("menu.opt_".to_string())),
                ],
            ),
        );

        graph.rebuild_dependencies().unwrap();
        assert_eq!(
            graph.dependencies_of("menu.pick"),
            Ok(vec!["menu.opt_a", "menu.opt_b"])
        );
    }

    #[test]
    fn switch_alternative_reading_back_is_a_cycle() {
        let mut graph = TraitGraph::new();
        graph.add_trait("m.mode", Computation::constant("a"));
        graph.add_trait("m.opt_a", Computation::constant(1));
        // Never selected while mode is "a", but still a switch candidate.
        graph.add_trait("m.opt_label", copy_of("m.pick"));
        graph.add_trait(
            "m.pick",
            Computation::chain(
                ValueKind::Int,
                vec![
                    Operator::copy_trait("m.mode"),
                    Operator::new(OpCode::Copy, Operand::Switch("m.opt_".to_string())),
                ],
            ),
        );

        graph.rebuild_dependencies().unwrap();
        assert_eq!(
            graph.sort(),
            Err(TraitError::CycleDetected {
                involved: vec!["m.opt_label".to_string(), "m.pick".to_string()]
            })
        );
    }

    #[test]
    fn unmatched_prefix_is_dangling() {
        let mut graph = TraitGraph::new();
        graph.add_trait(
            "menu.pick",
            Computation::chain(
                ValueKind::Int,
                vec![Operator::new(OpCode::Copy, Operand::Switch("menu.opt_".to_string()))],
            ),
        );
        assert!(matches!(
            graph.rebuild_dependencies(),
            Err(TraitError::DanglingDependency { .. })
        ));
    }

    #[test]
    fn add_invalidates_order() {
        let mut graph = TraitGraph::new();
        graph.add_trait("menu.a", Computation::constant(1));
        graph.sort().unwrap();
        assert!(graph.is_sorted());

        graph.add_trait("menu.b", copy_of("menu.a"));
        assert!(!graph.is_sorted());
        assert!(graph.evaluation_order().is_none());

        graph.sort().unwrap();
        assert_eq!(graph.evaluation_order(), Some(vec!["menu.a", "menu.b"]));
    }

    #[test]
    fn unbound_traits_skip_custom() {
        let mut graph = TraitGraph::new();
        graph.add_trait("menu.width", Computation::constant(10));
        graph.add_trait("menu._scratch", Computation::constant(0));
        let bound = graph.add_trait("menu.height", Computation::constant(5));
        graph.bind(bound, Sink::from_fn(|_: i32| {})).unwrap();

        assert_eq!(graph.unbound_traits(), vec!["menu.width"]);
    }
}
