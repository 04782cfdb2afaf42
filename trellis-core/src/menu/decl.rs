//! Declarations
//!
//! Already-parsed menu declarations as a document loader hands them over.
//! The types derive `Deserialize` so any loader can produce them directly;
//! this crate parses no document format itself.

use serde::Deserialize;

use crate::compute::OpCode;
use crate::value::{Value, ValueKind};

/// One element of a menu document.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ElementDecl {
    /// Anonymous elements contribute no segment to qualified names.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub traits: Vec<TraitDecl>,
    #[serde(default)]
    pub children: Vec<ElementDecl>,
}

impl ElementDecl {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            traits: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_trait(mut self, declaration: TraitDecl) -> Self {
        self.traits.push(declaration);
        self
    }

    pub fn with_child(mut self, child: ElementDecl) -> Self {
        self.children.push(child);
        self
    }
}

/// One declared attribute of an element.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TraitDecl {
    pub key: String,
    pub kind: ValueKind,
    #[serde(flatten)]
    pub body: TraitBody,
}

impl TraitDecl {
    pub fn literal(key: impl Into<String>, kind: ValueKind, value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            kind,
            body: TraitBody::Literal(value.into()),
        }
    }

    pub fn operators(
        key: impl Into<String>,
        kind: ValueKind,
        operators: Vec<OperatorDecl>,
    ) -> Self {
        Self {
            key: key.into(),
            kind,
            body: TraitBody::Operators(operators),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TraitBody {
    Literal(Value),
    Operators(Vec<OperatorDecl>),
}

/// One operator with its raw, unresolved source.
///
/// The operand is, in order of precedence: the nested `operands` chain, the
/// trait `trait` on the element `src` designates (the declaring element
/// when `src` is absent), or the literal `value`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OperatorDecl {
    pub op: OpCode,
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default, rename = "trait")]
    pub trait_key: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub operands: Vec<OperatorDecl>,
}

impl OperatorDecl {
    fn bare(op: OpCode) -> Self {
        Self {
            op,
            src: None,
            trait_key: None,
            value: None,
            operands: Vec::new(),
        }
    }

    pub fn unary(op: OpCode) -> Self {
        Self::bare(op)
    }

    pub fn value(op: OpCode, value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            ..Self::bare(op)
        }
    }

    pub fn source(op: OpCode, src: Option<&str>, trait_key: &str) -> Self {
        Self {
            src: src.map(str::to_string),
            trait_key: Some(trait_key.to_string()),
            ..Self::bare(op)
        }
    }

    pub fn nested(op: OpCode, operands: Vec<OperatorDecl>) -> Self {
        Self {
            operands,
            ..Self::bare(op)
        }
    }
}
