//! Trellis Core
//!
//! This crate provides the trait dependency graph that drives declarative
//! menu state. It implements:
//!
//! - Typed trait values and a small dataflow language for computed traits
//! - Stateful computations that remember their previous output
//! - Declaration-time selector resolution (`parent()`, `sibling(x)`, ...)
//! - A dependency graph with cached topological evaluation order
//! - Sinks that push each frame's values into host-owned objects
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `value`: The closed set of value kinds
//! - `compute`: Operators, chains and computations
//! - `graph`: The trait graph, its scheduler and the per-frame update
//! - `selector`: Structural references and their resolution
//! - `menu`: Declarations, the loader and host-provided elements
//! - `sink`: Capabilities connecting traits to external setters
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use trellis_core::{Computation, Operator, OpCode, Operand, Sink, TraitGraph, Value, ValueKind};
//!
//! let mut graph = TraitGraph::new();
//!
//! // Declarations may arrive in any order.
//! let half = graph.add_trait(
//!     "Menu.panel.width",
//!     Computation::chain(
//!         ValueKind::Float,
//!         vec![
//!             Operator::copy_trait("Menu.width"),
//!             Operator::new(OpCode::Div, Operand::Literal(Value::Int(2))),
//!         ],
//!     ),
//! );
//! graph.add_trait("Menu.width", Computation::constant(640));
//!
//! let seen = Arc::new(Mutex::new(0.0));
//! let target = Arc::clone(&seen);
//! graph
//!     .bind(half, Sink::from_fn(move |width: f32| {
//!         if let Ok(mut seen) = target.lock() {
//!             *seen = width;
//!         }
//!     }))
//!     .unwrap();
//!
//! graph.rebuild_dependencies().unwrap();
//! graph.update().unwrap();
//! assert_eq!(*seen.lock().unwrap(), 320.0);
//! ```

pub mod compute;
pub mod config;
pub mod error;
pub mod graph;
pub mod menu;
pub mod selector;
pub mod sink;
pub mod value;

pub use compute::{Computation, Dependency, Environment, OpCode, Operand, Operator};
pub use config::EngineConfig;
pub use error::{Result, TraitError};
pub use graph::{Trait, TraitGraph, TraitId, TypedTrait};
pub use menu::{load_menu, ElementDecl, HostSource, LoadedMenu, OperatorDecl, TraitBody, TraitDecl};
pub use selector::{ElementId, Selector, SelectorResolver, StructureTree};
pub use sink::Sink;
pub use value::{TraitValue, Value, ValueKind};
