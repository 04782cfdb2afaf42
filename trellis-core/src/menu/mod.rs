//! Menu Construction
//!
//! The bridge between a parsed menu document and the trait graph. The
//! loader walks already-parsed declarations, resolves their selectors once
//! against a structural snapshot, and declares one trait per attribute.
//! Host sources supply the implementation-provided elements that selectors
//! like `screen()` refer to.

mod decl;
mod host;
mod loader;

pub use decl::{ElementDecl, OperatorDecl, TraitBody, TraitDecl};
pub use host::HostSource;
pub use loader::{load_menu, LoadedMenu};
