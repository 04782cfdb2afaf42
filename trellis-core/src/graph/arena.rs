//! Vertex Arena
//!
//! Vertices live in a slot vector addressed by generational [`TraitId`]s.
//! Removing a vertex frees its slot and bumps the slot's generation, so
//! handles issued before the removal no longer resolve. Last produced
//! values are kept beside the slots so that one vertex can be evaluated
//! mutably while the others are read.

use indexmap::IndexMap;

use super::node::{TraitId, Vertex};
use crate::compute::Environment;
use crate::error::{Result, TraitError};
use crate::value::Value;

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    vertex: Option<Vertex>,
}

#[derive(Debug, Default)]
pub(crate) struct Arena {
    slots: Vec<Slot>,
    values: Vec<Option<Value>>,
    free: Vec<u32>,
    live: usize,
}

impl Arena {
    pub(crate) fn insert(&mut self, vertex: Vertex) -> TraitId {
        self.live += 1;
        if let Some(slot_index) = self.free.pop() {
            let slot = &mut self.slots[slot_index as usize];
            slot.vertex = Some(vertex);
            return TraitId::new(slot_index, slot.generation);
        }
        let slot_index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Slot {
            generation: 0,
            vertex: Some(vertex),
        });
        self.values.push(None);
        TraitId::new(slot_index, 0)
    }

    pub(crate) fn remove(&mut self, id: TraitId) -> Option<Vertex> {
        let slot = self.slots.get_mut(id.slot())?;
        if slot.generation != id.generation() {
            return None;
        }
        let vertex = slot.vertex.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        if let Some(value) = self.values.get_mut(id.slot()) {
            *value = None;
        }
        self.free.push(id.slot() as u32);
        self.live -= 1;
        Some(vertex)
    }

    pub(crate) fn get(&self, id: TraitId) -> Option<&Vertex> {
        self.slots
            .get(id.slot())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.vertex.as_ref())
    }

    pub(crate) fn get_mut(&mut self, id: TraitId) -> Option<&mut Vertex> {
        self.slots
            .get_mut(id.slot())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.vertex.as_mut())
    }

    pub(crate) fn value(&self, id: TraitId) -> Option<&Value> {
        self.get(id)?;
        self.values.get(id.slot()).and_then(Option::as_ref)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (TraitId, &Vertex)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            let vertex = slot.vertex.as_ref()?;
            Some((TraitId::new(index as u32, slot.generation), vertex))
        })
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut Vertex> {
        self.slots.iter_mut().filter_map(|slot| slot.vertex.as_mut())
    }

    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// Evaluate one vertex against the values already stored, push the
    /// result into its sink, then store it.
    pub(crate) fn evaluate(
        &mut self,
        id: TraitId,
        index: &IndexMap<String, TraitId>,
    ) -> Result<()> {
        let Self { slots, values, .. } = self;
        let vertex = slots
            .get_mut(id.slot())
            .filter(|slot| slot.generation == id.generation())
            .and_then(|slot| slot.vertex.as_mut())
            .ok_or(TraitError::NullVertex(id))?;

        let env = ValueView {
            index,
            values: values.as_slice(),
        };
        let payload = vertex.payload_mut();
        let value = payload.computation_mut().evaluate(&env)?;
        tracing::trace!(name = payload.name(), ?value, "evaluated trait");

        if let Some(sink) = payload.sink_mut() {
            sink.push(&value);
        }
        if let Some(stored) = values.get_mut(id.slot()) {
            *stored = Some(value);
        }
        Ok(())
    }
}

/// The environment seen by a computation during an update.
struct ValueView<'a> {
    index: &'a IndexMap<String, TraitId>,
    values: &'a [Option<Value>],
}

impl Environment for ValueView<'_> {
    fn lookup(&self, name: &str) -> Result<&Value> {
        let id = self
            .index
            .get(name)
            .ok_or_else(|| TraitError::NotFound(name.to_string()))?;
        self.values
            .get(id.slot())
            .and_then(Option::as_ref)
            .ok_or_else(|| TraitError::Unevaluated(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Computation;
    use crate::graph::node::Trait;

    fn vertex(name: &str) -> Vertex {
        Vertex::new(Trait::new(name.to_string(), Computation::constant(1), false))
    }

    #[test]
    fn removed_handles_go_stale() {
        let mut arena = Arena::default();
        let first = arena.insert(vertex("a"));
        assert_eq!(arena.len(), 1);

        assert!(arena.remove(first).is_some());
        assert!(arena.get(first).is_none());
        assert!(arena.remove(first).is_none());
        assert_eq!(arena.len(), 0);

        // The slot is reused under a new generation.
        let second = arena.insert(vertex("b"));
        assert_eq!(second.slot(), first.slot());
        assert_ne!(second, first);
        assert_eq!(arena.get(second).map(|v| v.payload().name()), Some("b"));
    }

    #[test]
    fn evaluate_stores_value() {
        let mut arena = Arena::default();
        let id = arena.insert(vertex("a"));
        let mut index = IndexMap::new();
        index.insert("a".to_string(), id);

        assert!(arena.value(id).is_none());
        arena.evaluate(id, &index).unwrap();
        assert_eq!(arena.value(id), Some(&Value::Int(1)));
    }

    #[test]
    fn evaluate_reports_null_vertex() {
        let mut arena = Arena::default();
        let id = arena.insert(vertex("a"));
        arena.remove(id);

        assert_eq!(
            arena.evaluate(id, &IndexMap::new()),
            Err(TraitError::NullVertex(id))
        );
    }
}
