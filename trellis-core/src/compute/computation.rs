//! Computations
//!
//! A [`Computation`] is the deferred function behind a trait. It is either
//! a constant or a chain of operators. Chains that do not begin with a
//! plain `copy` seed their working value from a private one-slot register
//! holding the previous result, which turns them into per-frame state
//! machines (counters, toggles, accumulators).
//!
//! # Register Write-back
//!
//! Only [`Computation::evaluate`] touches the register, and it writes it
//! exactly once, after the whole chain (nested helper chains included) has
//! produced its final value. A failed evaluation leaves the register as it
//! was.

use smallvec::SmallVec;

use super::environment::Environment;
use super::operator::{run_chain, OpCode, Operand, Operator};
use crate::error::Result;
use crate::value::{Value, ValueKind};

/// A name a computation reads from at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Dependency {
    /// Exactly this trait.
    Exact(String),
    /// Every trait whose name starts with this prefix (switch sources).
    Prefix(String),
}

impl Dependency {
    /// The declared name or prefix.
    pub fn name(&self) -> &str {
        match self {
            Dependency::Exact(name) | Dependency::Prefix(name) => name,
        }
    }
}

#[derive(Debug, Clone)]
enum Body {
    Constant(Value),
    Chain {
        operators: Vec<Operator>,
        register: Option<Value>,
    },
}

/// The function that produces a trait's value.
#[derive(Debug, Clone)]
pub struct Computation {
    kind: ValueKind,
    body: Body,
    dependencies: SmallVec<[Dependency; 2]>,
}

impl Computation {
    /// A constant whose kind is the value's own kind.
    pub fn constant(value: impl Into<Value>) -> Self {
        let value = value.into();
        Self {
            kind: value.kind(),
            body: Body::Constant(value),
            dependencies: SmallVec::new(),
        }
    }

    /// A constant of a declared kind. The literal is coerced once, here.
    pub fn literal(kind: ValueKind, value: Value) -> Result<Self> {
        Ok(Self {
            kind,
            body: Body::Constant(value.coerce(kind)?),
            dependencies: SmallVec::new(),
        })
    }

    /// A chain of operators producing a value of `kind`.
    ///
    /// Dependencies are collected from every trait and switch operand,
    /// including those inside helper chains.
    pub fn chain(kind: ValueKind, operators: Vec<Operator>) -> Self {
        let mut dependencies = SmallVec::new();
        collect_dependencies(&operators, &mut dependencies);

        let seeded_by_copy = matches!(
            operators.first(),
            Some(Operator {
                op: OpCode::Copy,
                operand: Some(operand),
            }) if !matches!(operand, Operand::Switch(_))
        );
        let register = (!seeded_by_copy).then(|| Value::zero(kind));

        Self {
            kind,
            body: Body::Chain {
                operators,
                register,
            },
            dependencies,
        }
    }

    /// Declare an extra dependency the operands do not reveal.
    pub fn with_dependency(mut self, name: impl Into<String>) -> Self {
        push_unique(&mut self.dependencies, Dependency::Exact(name.into()));
        self
    }

    /// Declared value kind.
    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Names this computation may read.
    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    /// Whether this computation carries a previous-value register.
    pub fn is_stateful(&self) -> bool {
        matches!(
            self.body,
            Body::Chain {
                register: Some(_),
                ..
            }
        )
    }

    /// The register content, if any.
    pub fn register(&self) -> Option<&Value> {
        match &self.body {
            Body::Chain { register, .. } => register.as_ref(),
            Body::Constant(_) => None,
        }
    }

    /// Produce a fresh value, reading inputs from `env`.
    pub fn evaluate(&mut self, env: &dyn Environment) -> Result<Value> {
        match &mut self.body {
            Body::Constant(value) => Ok(value.clone()),
            Body::Chain {
                operators,
                register,
            } => {
                let seed = register.clone().unwrap_or_else(|| Value::zero(self.kind));
                let value = run_chain(operators, seed, env)?.coerce(self.kind)?;
                if let Some(slot) = register {
                    *slot = value.clone();
                }
                Ok(value)
            }
        }
    }
}

fn push_unique(dependencies: &mut SmallVec<[Dependency; 2]>, dependency: Dependency) {
    if !dependencies.contains(&dependency) {
        dependencies.push(dependency);
    }
}

fn collect_dependencies(operators: &[Operator], out: &mut SmallVec<[Dependency; 2]>) {
    for operator in operators {
        match &operator.operand {
            Some(Operand::Trait(name)) => push_unique(out, Dependency::Exact(name.clone())),
            Some(Operand::Switch(prefix)) => push_unique(out, Dependency::Prefix(prefix.clone())),
            Some(Operand::Chain(nested)) => collect_dependencies(nested, out),
            Some(Operand::Literal(_)) | None => {}
        }
    }
}
