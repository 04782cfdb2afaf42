//! Structural Snapshot
//!
//! A read-only copy of the declaration tree as it stood when the traits
//! were declared. Selectors resolve against this snapshot once; the graph
//! itself only ever sees the absolute names they produce.

use std::collections::VecDeque;

/// Index of an element in a [`StructureTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(usize);

#[derive(Debug, Clone)]
struct Element {
    name: Option<String>,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

/// Elements with optional names, parent links and ordered children.
///
/// Several roots may coexist; each is the top of one document.
#[derive(Debug, Clone, Default)]
pub struct StructureTree {
    elements: Vec<Element>,
}

impl StructureTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level element.
    pub fn add_root(&mut self, name: Option<&str>) -> ElementId {
        self.push(name, None)
    }

    /// Append a child under `parent`.
    pub fn add_child(&mut self, parent: ElementId, name: Option<&str>) -> ElementId {
        let id = self.push(name, Some(parent));
        if let Some(element) = self.elements.get_mut(parent.0) {
            element.children.push(id);
        }
        id
    }

    fn push(&mut self, name: Option<&str>, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            name: name.map(str::to_string),
            parent,
            children: Vec::new(),
        });
        id
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn name(&self, id: ElementId) -> Option<&str> {
        self.elements.get(id.0)?.name.as_deref()
    }

    pub fn parent(&self, id: ElementId) -> Option<ElementId> {
        self.elements.get(id.0)?.parent
    }

    pub fn children(&self, id: ElementId) -> &[ElementId] {
        self.elements
            .get(id.0)
            .map(|element| element.children.as_slice())
            .unwrap_or_default()
    }

    /// Named ancestors and the element itself, joined root first.
    pub fn qualified_name(&self, id: ElementId, separator: char) -> String {
        let mut segments = Vec::new();
        let mut current = Some(id);
        while let Some(element_id) = current {
            if let Some(name) = self.name(element_id) {
                segments.push(name);
            }
            current = self.parent(element_id);
        }
        segments.reverse();
        segments.join(&separator.to_string())
    }

    /// The last child that has a name.
    pub fn last_named_child(&self, id: ElementId) -> Option<ElementId> {
        self.children(id)
            .iter()
            .rev()
            .copied()
            .find(|&child| self.name(child).is_some())
    }

    /// Depth-first search over descendants, last child first.
    pub fn find_descendant(&self, id: ElementId, name: &str) -> Option<ElementId> {
        self.children(id).iter().rev().find_map(|&child| {
            if self.name(child) == Some(name) {
                Some(child)
            } else {
                self.find_descendant(child, name)
            }
        })
    }

    /// The nearest named sibling declared before `id`.
    pub fn preceding_named_sibling(&self, id: ElementId) -> Option<ElementId> {
        let siblings = self.children(self.parent(id)?);
        let position = siblings.iter().position(|&sibling| sibling == id)?;
        siblings
            .get(..position)?
            .iter()
            .rev()
            .copied()
            .find(|&sibling| self.name(sibling).is_some())
    }

    /// The first sibling of `id` named `name`; never `id` itself.
    pub fn sibling_named(&self, id: ElementId, name: &str) -> Option<ElementId> {
        self.siblings_named(id, name).first().copied()
    }

    /// Every sibling of `id` named `name`, in declaration order.
    pub fn siblings_named(&self, id: ElementId, name: &str) -> Vec<ElementId> {
        let Some(parent) = self.parent(id) else {
            return Vec::new();
        };
        self.children(parent)
            .iter()
            .copied()
            .filter(|&sibling| sibling != id && self.name(sibling) == Some(name))
            .collect()
    }

    /// The first child of `id` named `name`. Anonymous children are
    /// looked through, since they add no segment to qualified names.
    pub fn named_child(&self, id: ElementId, name: &str) -> Option<ElementId> {
        self.children(id).iter().find_map(|&child| match self.name(child) {
            Some(child_name) if child_name == name => Some(child),
            Some(_) => None,
            None => self.named_child(child, name),
        })
    }

    /// Follow `path` down from `id` one named child per segment.
    pub fn descend<'p>(
        &self,
        id: ElementId,
        path: impl IntoIterator<Item = &'p str>,
    ) -> Option<ElementId> {
        path.into_iter()
            .try_fold(id, |element, segment| self.named_child(element, segment))
    }

    /// All matches at the smallest tree distance from `from`.
    ///
    /// Breadth-first over the undirected tree, visiting children in order
    /// before the parent; `from` itself is at distance zero. Matches come
    /// back in visiting order.
    pub fn closest_matches(
        &self,
        from: ElementId,
        mut predicate: impl FnMut(ElementId) -> bool,
    ) -> Vec<ElementId> {
        if from.0 >= self.elements.len() {
            return Vec::new();
        }
        let mut visited = vec![false; self.elements.len()];
        let mut queue = VecDeque::from([(from, 0usize)]);
        let mut matches = Vec::new();
        let mut match_distance = None;
        visited[from.0] = true;

        while let Some((id, distance)) = queue.pop_front() {
            if match_distance.is_some_and(|found| distance > found) {
                break;
            }
            if predicate(id) {
                match_distance = Some(distance);
                matches.push(id);
                continue;
            }
            let neighbours = self.children(id).iter().copied().chain(self.parent(id));
            for next in neighbours {
                if let Some(seen) = visited.get_mut(next.0) {
                    if !*seen {
                        *seen = true;
                        queue.push_back((next, distance + 1));
                    }
                }
            }
        }
        matches
    }

    /// The first match at the smallest tree distance from `from`.
    pub fn find_closest(
        &self,
        from: ElementId,
        predicate: impl FnMut(ElementId) -> bool,
    ) -> Option<ElementId> {
        self.closest_matches(from, predicate).first().copied()
    }
}

#[cfg(test)]
pub(crate) mod fixture {
    use super::*;

    /// `A{B{E,F,G}, C{H, I{L}}, D{J,K}}`
    pub(crate) fn letters() -> (StructureTree, Vec<(&'static str, ElementId)>) {
        let mut tree = StructureTree::new();
        let a = tree.add_root(Some("A"));
        let b = tree.add_child(a, Some("B"));
        let e = tree.add_child(b, Some("E"));
        let f = tree.add_child(b, Some("F"));
        let g = tree.add_child(b, Some("G"));
        let c = tree.add_child(a, Some("C"));
        let h = tree.add_child(c, Some("H"));
        let i = tree.add_child(c, Some("I"));
        let l = tree.add_child(i, Some("L"));
        let d = tree.add_child(a, Some("D"));
        let j = tree.add_child(d, Some("J"));
        let k = tree.add_child(d, Some("K"));
        let ids = vec![
            ("A", a),
            ("B", b),
            ("C", c),
            ("D", d),
            ("E", e),
            ("F", f),
            ("G", g),
            ("H", h),
            ("I", i),
            ("J", j),
            ("K", k),
            ("L", l),
        ];
        (tree, ids)
    }
}
