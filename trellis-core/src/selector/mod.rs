//! Selectors
//!
//! Structural references such as `parent()` or `sibling(label)` let a
//! declaration name another element relative to its own position. They are
//! resolved once, while the declaration tree is still at hand, into the
//! absolute names the trait graph works with. No selector text survives
//! past construction.
//!
//! # Vocabulary
//!
//! - `me()`: the declaring element
//! - `parent()`: its structural parent
//! - `child()` / `child(x)`: the last named child, or the descendant named
//!   `x` found depth-first from the last child backwards
//! - `sibling()` / `sibling(x)`: the nearest preceding named sibling, or the
//!   sibling named `x` (`sibling(me())` is nothing)
//! - `last()`: reserved, reported as unimplemented
//! - `screen()` / `strings()`: the host-provided screen and string table
//!
//! A bare name resolves to the structurally closest element of that name.

mod parse;
mod resolver;
mod tree;

pub use parse::{Selector, SiblingTarget};
pub use resolver::SelectorResolver;
pub use tree::{ElementId, StructureTree};
