//! Host Sources
//!
//! Elements the implementation provides rather than the document, such as
//! screen settings and the localised string table. They are constructed
//! explicitly by the host and installed as constant traits under a
//! well-known name that `screen()` and `strings()` resolve to.

use crate::compute::Computation;
use crate::config::EngineConfig;
use crate::graph::{TraitGraph, TraitId};
use crate::value::Value;

/// A host-provided element with constant traits.
#[derive(Debug, Clone, PartialEq)]
pub struct HostSource {
    name: String,
    traits: Vec<(String, Value)>,
}

impl HostSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            traits: Vec::new(),
        }
    }

    /// The screen element under the configured name.
    pub fn screen(config: &EngineConfig) -> Self {
        Self::new(config.screen_name.clone())
    }

    /// The string table element under the configured name.
    pub fn strings(config: &EngineConfig) -> Self {
        Self::new(config.strings_name.clone())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    /// Set or overwrite one trait.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.traits.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.traits.push((key, value)),
        }
    }

    /// Add every trait to `graph`, replacing earlier installs.
    pub fn install(&self, graph: &mut TraitGraph) -> Vec<TraitId> {
        let config = graph.config().clone();
        self.traits
            .iter()
            .map(|(key, value)| {
                graph.add_trait(config.join(&self.name, key), Computation::constant(value.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn install_uses_well_known_name() {
        let mut graph = TraitGraph::new();
        let screen = HostSource::screen(graph.config())
            .with("width", 1280)
            .with("height", 720)
            .with("width", 1920);

        let handles = screen.install(&mut graph);
        assert_eq!(handles.len(), 2);

        graph.update().unwrap();
        assert_eq!(graph.value("__screen.width"), Ok(&Value::Int(1920)));
        assert_eq!(graph.value("__screen.height"), Ok(&Value::Int(720)));
    }

    #[test]
    fn reinstall_replaces_values() {
        let mut graph = TraitGraph::new();
        let mut strings = HostSource::strings(graph.config()).with("sOk", "OK");
        strings.install(&mut graph);

        strings.set("sOk", "Okay");
        strings.install(&mut graph);
        graph.update().unwrap();

        assert_eq!(graph.len(), 1);
        assert_eq!(graph.value("__strings.sOk"), Ok(&Value::from("Okay")));
    }
}
