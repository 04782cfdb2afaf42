//! Menu Loader
//!
//! Turns a declaration tree into traits. Loading runs in two passes:
//!
//! 1. Snapshot the element tree into a [`StructureTree`]
//! 2. Resolve every operator source against the snapshot, build the
//!    computations, and only then add them all to the graph
//!
//! A resolution error in any declaration leaves the graph untouched.

use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use super::decl::{ElementDecl, OperatorDecl, TraitBody, TraitDecl};
use crate::compute::{Computation, Operand, Operator};
use crate::error::{Result, TraitError};
use crate::graph::{TraitGraph, TraitId};
use crate::selector::{ElementId, SelectorResolver, StructureTree};

/// Handles of the traits one document declared.
#[derive(Debug)]
pub struct LoadedMenu {
    traits: IndexMap<String, TraitId>,
    tree: StructureTree,
}

impl LoadedMenu {
    /// Handle of a declared trait, by absolute name.
    pub fn handle(&self, name: &str) -> Option<TraitId> {
        self.traits.get(name).copied()
    }

    /// Declared traits in document order.
    pub fn handles(&self) -> impl Iterator<Item = (&str, TraitId)> {
        self.traits.iter().map(|(name, &id)| (name.as_str(), id))
    }

    pub fn len(&self) -> usize {
        self.traits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traits.is_empty()
    }

    /// The structural snapshot the selectors were resolved against.
    pub fn tree(&self) -> &StructureTree {
        &self.tree
    }
}

/// Declare every trait of `root` and its descendants in `graph`.
pub fn load_menu(graph: &mut TraitGraph, root: &ElementDecl) -> Result<LoadedMenu> {
    let mut tree = StructureTree::new();
    let mut elements = Vec::new();
    let root_id = tree.add_root(root.name.as_deref());
    snapshot(&mut tree, root_id, root, &mut elements);

    let config = graph.config().clone();
    let resolver = SelectorResolver::new(&tree, &config);
    let mut built = Vec::new();
    let mut seen = IndexSet::new();
    for &(element, declaration) in &elements {
        let qualified = resolver.qualified_name(element);
        for trait_decl in &declaration.traits {
            let name = config.join(&qualified, &trait_decl.key);
            // Anonymous elements share their parent's prefix.
            if !seen.insert(name.clone()) {
                return Err(TraitError::DuplicateTrait { name });
            }
            let computation = build_computation(&resolver, element, trait_decl)?;
            built.push((name, computation));
        }
    }

    let mut traits = IndexMap::with_capacity(built.len());
    for (name, computation) in built {
        let id = graph.add_trait(name.clone(), computation);
        traits.insert(name, id);
    }
    debug!(
        elements = tree.len(),
        traits = traits.len(),
        "loaded menu declarations"
    );

    Ok(LoadedMenu { traits, tree })
}

fn snapshot<'d>(
    tree: &mut StructureTree,
    id: ElementId,
    declaration: &'d ElementDecl,
    out: &mut Vec<(ElementId, &'d ElementDecl)>,
) {
    out.push((id, declaration));
    for child in &declaration.children {
        let child_id = tree.add_child(id, child.name.as_deref());
        snapshot(tree, child_id, child, out);
    }
}

fn build_computation(
    resolver: &SelectorResolver<'_>,
    element: ElementId,
    declaration: &TraitDecl,
) -> Result<Computation> {
    match &declaration.body {
        TraitBody::Literal(value) => Computation::literal(declaration.kind, value.clone()),
        TraitBody::Operators(operators) => Ok(Computation::chain(
            declaration.kind,
            build_operators(resolver, element, operators)?,
        )),
    }
}

fn build_operators(
    resolver: &SelectorResolver<'_>,
    element: ElementId,
    operators: &[OperatorDecl],
) -> Result<Vec<Operator>> {
    operators
        .iter()
        .map(|operator| build_operator(resolver, element, operator))
        .collect()
}

fn build_operator(
    resolver: &SelectorResolver<'_>,
    element: ElementId,
    declaration: &OperatorDecl,
) -> Result<Operator> {
    let op = declaration.op;
    let operand = if !declaration.operands.is_empty() {
        Some(Operand::Chain(build_operators(
            resolver,
            element,
            &declaration.operands,
        )?))
    } else if let Some(key) = &declaration.trait_key {
        let name = resolver.resolve_trait(element, declaration.src.as_deref(), key)?;
        if resolver.config().is_switch(&name) {
            Some(Operand::Switch(name))
        } else {
            Some(Operand::Trait(name))
        }
    } else if let Some(value) = &declaration.value {
        Some(Operand::Literal(value.clone()))
    } else {
        None
    };

    if operand.is_none() && !op.is_unary() {
        return Err(TraitError::MissingOperand { op: op.name() });
    }
    Ok(Operator { op, operand })
}
