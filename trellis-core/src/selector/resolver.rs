//! Selector Resolution
//!
//! Turns a selector, evaluated from the element that declares a trait,
//! into an absolute element name. Resolution happens once at declaration
//! time; the result is baked into the computation's dependency list.

use tracing::warn;

use super::parse::{Selector, SiblingTarget};
use super::tree::{ElementId, StructureTree};
use crate::config::EngineConfig;
use crate::error::{Result, TraitError};

/// Resolves selectors against a structural snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SelectorResolver<'a> {
    tree: &'a StructureTree,
    config: &'a EngineConfig,
}

impl<'a> SelectorResolver<'a> {
    pub fn new(tree: &'a StructureTree, config: &'a EngineConfig) -> Self {
        Self { tree, config }
    }

    pub fn config(&self) -> &'a EngineConfig {
        self.config
    }

    /// Resolve selector text to an absolute element name.
    ///
    /// `Ok(None)` means the selector is valid but points at nothing.
    pub fn resolve(&self, from: ElementId, text: &str) -> Result<Option<String>> {
        self.resolve_selector(from, &Selector::parse(text)?)
    }

    /// Resolve a parsed selector to an absolute element name.
    pub fn resolve_selector(&self, from: ElementId, selector: &Selector) -> Result<Option<String>> {
        let tree = self.tree;
        let element = match selector {
            Selector::Me => Some(from),
            Selector::Parent => tree.parent(from),
            Selector::Child(None) => tree.last_named_child(from),
            Selector::Child(Some(name)) => tree.find_descendant(from, name),
            Selector::Sibling(SiblingTarget::Preceding) => tree.preceding_named_sibling(from),
            Selector::Sibling(SiblingTarget::Named(name)) => self.resolve_sibling(from, name),
            Selector::Sibling(SiblingTarget::Me) => None,
            Selector::Last => return Err(TraitError::Unimplemented("last".to_string())),
            Selector::Screen => return Ok(Some(self.config.screen_name.clone())),
            Selector::Strings => return Ok(Some(self.config.strings_name.clone())),
            Selector::Raw(name) => return Ok(Some(self.resolve_raw(from, name))),
        };
        Ok(element.map(|element| self.qualified_name(element)))
    }

    /// Resolve the absolute name of trait `key` on the element `src`
    /// designates. A missing `src` means the declaring element itself.
    pub fn resolve_trait(&self, from: ElementId, src: Option<&str>, key: &str) -> Result<String> {
        let src = src.unwrap_or("me()");
        let element = self
            .resolve(from, src)?
            .ok_or_else(|| TraitError::UnresolvedSelector {
                selector: src.to_string(),
                from: self.qualified_name(from),
            })?;
        Ok(self.config.join(&element, key))
    }

    /// Absolute name of an element.
    pub fn qualified_name(&self, element: ElementId) -> String {
        self.tree.qualified_name(element, self.config.separator)
    }

    /// `sibling(x)` names a unique sibling; ties keep the first declared.
    fn resolve_sibling(&self, from: ElementId, name: &str) -> Option<ElementId> {
        let siblings = self.tree.siblings_named(from, name);
        if siblings.len() > 1 {
            warn!(
                name,
                from = %self.qualified_name(from),
                candidates = siblings.len(),
                "ambiguous sibling reference; using the first declared"
            );
        }
        siblings.first().copied()
    }

    /// A raw name refers to the structurally closest element its first
    /// segment names, from which any remaining segments descend through
    /// named children. Host element names and paths absent from the tree
    /// are taken as already absolute.
    fn resolve_raw(&self, from: ElementId, name: &str) -> String {
        let config = self.config;
        let mut segments = name.split(config.separator);
        let head = segments.next().unwrap_or(name);
        if head == config.screen_name || head == config.strings_name {
            return name.to_string();
        }
        let rest: Vec<&str> = segments.collect();

        let tree = self.tree;
        let matches = tree.closest_matches(from, |element| {
            tree.name(element) == Some(head)
                && tree.descend(element, rest.iter().copied()).is_some()
        });
        let Some(target) = matches
            .first()
            .and_then(|&closest| tree.descend(closest, rest.iter().copied()))
        else {
            return name.to_string();
        };
        let resolved = self.qualified_name(target);
        if matches.len() > 1 {
            warn!(
                name,
                from = %self.qualified_name(from),
                candidates = matches.len(),
                resolved = %resolved,
                "ambiguous element reference; using the first closest match"
            );
        }
        resolved
    }
}
