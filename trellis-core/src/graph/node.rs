//! Graph Vertices
//!
//! This module defines the vertex types that live in the trait graph.

use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexSet;

use crate::compute::Computation;
use crate::sink::Sink;
use crate::value::{TraitValue, Value, ValueKind};

/// Handle to a vertex in a [`TraitGraph`](super::TraitGraph).
///
/// Handles are generational: once the trait they point at is replaced, the
/// old handle is stale and operations on it fail.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraitId {
    slot: u32,
    generation: u32,
}

impl TraitId {
    pub(crate) fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    /// Position in the arena.
    pub(crate) fn slot(self) -> usize {
        self.slot as usize
    }

    /// Generation of the slot this handle was issued for.
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for TraitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TraitId({}v{})", self.slot, self.generation)
    }
}

/// A named computation plus an optional sink.
#[derive(Debug)]
pub struct Trait {
    name: String,
    computation: Computation,
    sink: Option<Sink>,
    custom: bool,
}

impl Trait {
    pub(crate) fn new(name: String, computation: Computation, custom: bool) -> Self {
        Self {
            name,
            computation,
            sink: None,
            custom,
        }
    }

    /// Absolute, dot-delimited name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared value kind.
    pub fn kind(&self) -> ValueKind {
        self.computation.kind()
    }

    /// The computation producing this trait's value.
    pub fn computation(&self) -> &Computation {
        &self.computation
    }

    pub(crate) fn computation_mut(&mut self) -> &mut Computation {
        &mut self.computation
    }

    /// Whether a sink is attached.
    pub fn is_bound(&self) -> bool {
        self.sink.is_some()
    }

    /// Custom traits carry the custom marker and need no sink.
    pub fn is_custom(&self) -> bool {
        self.custom
    }

    pub(crate) fn sink_mut(&mut self) -> Option<&mut Sink> {
        self.sink.as_mut()
    }

    pub(crate) fn set_sink(&mut self, sink: Sink) {
        self.sink = Some(sink);
    }

    pub(crate) fn take_sink(&mut self) -> Option<Sink> {
        self.sink.take()
    }
}

/// Typed view of a trait whose kind matched `T`.
pub struct TypedTrait<'a, T> {
    inner: &'a Trait,
    value: Option<&'a Value>,
    _kind: PhantomData<T>,
}

impl<'a, T: TraitValue> TypedTrait<'a, T> {
    pub(crate) fn new(inner: &'a Trait, value: Option<&'a Value>) -> Self {
        Self {
            inner,
            value,
            _kind: PhantomData,
        }
    }

    /// Absolute name.
    pub fn name(&self) -> &'a str {
        self.inner.name()
    }

    /// Value produced by the latest update, if the trait has been evaluated.
    pub fn value(&self) -> Option<T> {
        self.value.and_then(T::from_value)
    }

    /// The untyped trait.
    pub fn as_trait(&self) -> &'a Trait {
        self.inner
    }
}

/// A trait plus its derived edges.
///
/// Edges are never edited one by one from outside the graph; they are
/// regenerated wholesale from the declared dependencies.
#[derive(Debug)]
pub(crate) struct Vertex {
    payload: Trait,

    /// Vertices this one reads from.
    dependencies: IndexSet<TraitId>,

    /// Vertices that read from this one.
    dependents: IndexSet<TraitId>,
}

impl Vertex {
    pub(crate) fn new(payload: Trait) -> Self {
        Self {
            payload,
            dependencies: IndexSet::new(),
            dependents: IndexSet::new(),
        }
    }

    pub(crate) fn payload(&self) -> &Trait {
        &self.payload
    }

    pub(crate) fn payload_mut(&mut self) -> &mut Trait {
        &mut self.payload
    }

    pub(crate) fn into_payload(self) -> Trait {
        self.payload
    }

    pub(crate) fn add_dependency(&mut self, id: TraitId) {
        self.dependencies.insert(id);
    }

    pub(crate) fn add_dependent(&mut self, id: TraitId) {
        self.dependents.insert(id);
    }

    pub(crate) fn dependencies(&self) -> &IndexSet<TraitId> {
        &self.dependencies
    }

    pub(crate) fn dependents(&self) -> &IndexSet<TraitId> {
        &self.dependents
    }

    pub(crate) fn clear_edges(&mut self) {
        self.dependencies.clear();
        self.dependents.clear();
    }
}
