//! Sinks
//!
//! A [`Sink`] connects a trait to an externally owned object. It is a
//! capability, not ownership: the graph holds an opaque handle (an `Arc`,
//! an index into the host's own storage, a channel) and a setter, and calls
//! the setter with every value the trait produces. The graph never
//! constructs or inspects the target.
//!
//! Sinks are called synchronously from `update()` and must not re-enter the
//! graph.

use std::fmt;

use crate::value::{TraitValue, Value, ValueKind};

type PushFn = Box<dyn FnMut(&Value) + Send>;

/// A typed setter capability bound to a trait.
pub struct Sink {
    kind: ValueKind,
    push: PushFn,
}

impl Sink {
    /// Wrap a target handle and a setter for values of type `T`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use std::sync::{Arc, Mutex};
    /// use trellis_core::Sink;
    ///
    /// struct Rect { width: f32 }
    ///
    /// let rect = Arc::new(Mutex::new(Rect { width: 0.0 }));
    /// let sink = Sink::new(Arc::clone(&rect), |rect: &mut Arc<Mutex<Rect>>, width: f32| {
    ///     if let Ok(mut rect) = rect.lock() {
    ///         rect.width = width;
    ///     }
    /// });
    /// # let _ = sink;
    /// ```
    pub fn new<H, T>(mut target: H, setter: fn(&mut H, T)) -> Self
    where
        H: Send + 'static,
        T: TraitValue,
    {
        Self {
            kind: T::KIND,
            push: Box::new(move |value| {
                if let Some(value) = T::from_value(value) {
                    setter(&mut target, value);
                }
            }),
        }
    }

    /// Build a sink from a closure over values of type `T`.
    pub fn from_fn<T, F>(mut set: F) -> Self
    where
        T: TraitValue,
        F: FnMut(T) + Send + 'static,
    {
        Self {
            kind: T::KIND,
            push: Box::new(move |value| {
                if let Some(value) = T::from_value(value) {
                    set(value);
                }
            }),
        }
    }

    /// Kind of value the setter accepts.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Deliver a value. Values of another kind are dropped; binding
    /// rejects kind mismatches up front.
    pub(crate) fn push(&mut self, value: &Value) {
        tracing::trace!(?value, "sink push");
        (self.push)(value);
    }
}

impl fmt::Debug for Sink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sink").field("kind", &self.kind).finish()
    }
}
