//! Chain Operators
//!
//! A chain is a list of operators applied left to right to a working
//! value. Each operator may take one operand: a literal, the current value
//! of another trait, a switch over same-prefixed traits, or a nested
//! helper chain.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::environment::Environment;
use crate::error::{Result, TraitError};
use crate::value::Value;

/// Operator codes understood by chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpCode {
    // Seeding
    Copy,

    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Min,
    Max,

    // Unary
    Abs,
    Neg,
    Floor,
    Ceil,
    Round,
    Not,

    // Comparison
    Gt,
    Gte,
    Lt,
    Lte,
    Eq,
    Neq,

    // Logic
    And,
    Or,
    OnlyIf,
    OnlyIfNot,
}

impl OpCode {
    /// Lowercase name as it appears in declarations.
    pub fn name(self) -> &'static str {
        match self {
            OpCode::Copy => "copy",
            OpCode::Add => "add",
            OpCode::Sub => "sub",
            OpCode::Mul => "mul",
            OpCode::Div => "div",
            OpCode::Mod => "mod",
            OpCode::Min => "min",
            OpCode::Max => "max",
            OpCode::Abs => "abs",
            OpCode::Neg => "neg",
            OpCode::Floor => "floor",
            OpCode::Ceil => "ceil",
            OpCode::Round => "round",
            OpCode::Not => "not",
            OpCode::Gt => "gt",
            OpCode::Gte => "gte",
            OpCode::Lt => "lt",
            OpCode::Lte => "lte",
            OpCode::Eq => "eq",
            OpCode::Neq => "neq",
            OpCode::And => "and",
            OpCode::Or => "or",
            OpCode::OnlyIf => "onlyif",
            OpCode::OnlyIfNot => "onlyifnot",
        }
    }

    /// Unary operators ignore their operand.
    pub fn is_unary(self) -> bool {
        matches!(
            self,
            OpCode::Abs | OpCode::Neg | OpCode::Floor | OpCode::Ceil | OpCode::Round | OpCode::Not
        )
    }
}

/// Where an operator gets its right-hand side from.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// A fixed value.
    Literal(Value),
    /// The current value of the trait with this absolute name.
    Trait(String),
    /// The trait named `prefix` followed by the stringified working value.
    Switch(String),
    /// A helper chain, seeded with the current working value.
    Chain(Vec<Operator>),
}

impl Operand {
    fn value(&self, working: &Value, env: &dyn Environment) -> Result<Value> {
        match self {
            Operand::Literal(value) => Ok(value.clone()),
            Operand::Trait(name) => env.lookup(name).cloned(),
            Operand::Switch(prefix) => {
                let name = format!("{prefix}{working}");
                env.lookup(&name).cloned()
            }
            Operand::Chain(operators) => run_chain(operators, working.clone(), env),
        }
    }
}

/// One step of a chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    pub op: OpCode,
    pub operand: Option<Operand>,
}

impl Operator {
    /// An operator with an operand.
    pub fn new(op: OpCode, operand: Operand) -> Self {
        Self {
            op,
            operand: Some(operand),
        }
    }

    /// A unary operator.
    pub fn unary(op: OpCode) -> Self {
        Self { op, operand: None }
    }

    /// `copy` from another trait.
    pub fn copy_trait(name: impl Into<String>) -> Self {
        Self::new(OpCode::Copy, Operand::Trait(name.into()))
    }

    /// Apply this operator to the working value.
    pub fn apply(&self, working: Value, env: &dyn Environment) -> Result<Value> {
        if self.op.is_unary() {
            return unary(self.op, working);
        }
        let operand = match &self.operand {
            Some(operand) => operand.value(&working, env)?,
            None => return Err(TraitError::MissingOperand { op: self.op.name() }),
        };
        binary(self.op, working, operand)
    }
}

/// Run `operators` over `seed` and return the final working value.
///
/// Never touches any register; the caller owns write-back.
pub(crate) fn run_chain(
    operators: &[Operator],
    seed: Value,
    env: &dyn Environment,
) -> Result<Value> {
    operators
        .iter()
        .try_fold(seed, |working, operator| operator.apply(working, env))
}

#[derive(Debug, Clone, Copy)]
enum Num {
    Int(i32),
    Float(f32),
}

impl Num {
    fn as_f32(self) -> f32 {
        match self {
            Num::Int(v) => v as f32,
            Num::Float(v) => v,
        }
    }
}

fn numeric(value: &Value) -> Result<Num> {
    match value {
        Value::Int(v) => Ok(Num::Int(*v)),
        Value::Float(v) => Ok(Num::Float(*v)),
        Value::Bool(v) => Ok(Num::Int(i32::from(*v))),
        Value::String(text) => {
            let text = text.trim();
            if let Ok(v) = text.parse::<i32>() {
                Ok(Num::Int(v))
            } else if let Ok(v) = text.parse::<f32>() {
                Ok(Num::Float(v))
            } else {
                Err(TraitError::Conversion {
                    value: value.clone(),
                    to: crate::value::ValueKind::Float,
                })
            }
        }
    }
}

fn arithmetic(
    lhs: &Value,
    rhs: &Value,
    int_op: impl Fn(i32, i32) -> Option<i32>,
    float_op: impl Fn(f32, f32) -> f32,
    name: &'static str,
) -> Result<Value> {
    match (numeric(lhs)?, numeric(rhs)?) {
        (Num::Int(a), Num::Int(b)) => int_op(a, b)
            .map(Value::Int)
            .ok_or(TraitError::DivisionByZero { name }),
        (a, b) => Ok(Value::Float(float_op(a.as_f32(), b.as_f32()))),
    }
}

fn ordering(lhs: &Value, rhs: &Value) -> Result<Option<Ordering>> {
    if let (Value::String(a), Value::String(b)) = (lhs, rhs) {
        return Ok(Some(a.cmp(b)));
    }
    Ok(match (numeric(lhs)?, numeric(rhs)?) {
        (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
        (a, b) => a.as_f32().partial_cmp(&b.as_f32()),
    })
}

fn unary(op: OpCode, working: Value) -> Result<Value> {
    if op == OpCode::Not {
        return Ok(Value::Bool(!working.is_truthy()));
    }
    let value = match numeric(&working)? {
        Num::Int(v) => Value::Int(match op {
            OpCode::Abs => v.wrapping_abs(),
            OpCode::Neg => v.wrapping_neg(),
            _ => v,
        }),
        Num::Float(v) => Value::Float(match op {
            OpCode::Abs => v.abs(),
            OpCode::Neg => -v,
            OpCode::Floor => v.floor(),
            OpCode::Ceil => v.ceil(),
            OpCode::Round => v.round(),
            _ => v,
        }),
    };
    Ok(value)
}

fn binary(op: OpCode, working: Value, operand: Value) -> Result<Value> {
    let name = op.name();
    match op {
        OpCode::Copy => Ok(operand),
        OpCode::Add => {
            if matches!(working, Value::String(_)) || matches!(operand, Value::String(_)) {
                Ok(Value::String(format!("{working}{operand}")))
            } else {
                arithmetic(&working, &operand, |a, b| Some(a.wrapping_add(b)), |a, b| a + b, name)
            }
        }
        OpCode::Sub => {
            arithmetic(&working, &operand, |a, b| Some(a.wrapping_sub(b)), |a, b| a - b, name)
        }
        OpCode::Mul => {
            arithmetic(&working, &operand, |a, b| Some(a.wrapping_mul(b)), |a, b| a * b, name)
        }
        OpCode::Div => arithmetic(
            &working,
            &operand,
            |a, b| (b != 0).then(|| a.wrapping_div(b)),
            |a, b| a / b,
            name,
        ),
        OpCode::Mod => arithmetic(
            &working,
            &operand,
            |a, b| (b != 0).then(|| a.wrapping_rem(b)),
            |a, b| a % b,
            name,
        ),
        OpCode::Min => arithmetic(&working, &operand, |a, b| Some(a.min(b)), f32::min, name),
        OpCode::Max => arithmetic(&working, &operand, |a, b| Some(a.max(b)), f32::max, name),
        OpCode::Gt => Ok(Value::Bool(ordering(&working, &operand)? == Some(Ordering::Greater))),
        OpCode::Gte => Ok(Value::Bool(matches!(
            ordering(&working, &operand)?,
            Some(Ordering::Greater | Ordering::Equal)
        ))),
        OpCode::Lt => Ok(Value::Bool(ordering(&working, &operand)? == Some(Ordering::Less))),
        OpCode::Lte => Ok(Value::Bool(matches!(
            ordering(&working, &operand)?,
            Some(Ordering::Less | Ordering::Equal)
        ))),
        OpCode::Eq => Ok(Value::Bool(ordering(&working, &operand)? == Some(Ordering::Equal))),
        OpCode::Neq => Ok(Value::Bool(ordering(&working, &operand)? != Some(Ordering::Equal))),
        OpCode::And => Ok(Value::Bool(working.is_truthy() && operand.is_truthy())),
        OpCode::Or => Ok(Value::Bool(working.is_truthy() || operand.is_truthy())),
        OpCode::OnlyIf | OpCode::OnlyIfNot => {
            let keep = operand.is_truthy() == (op == OpCode::OnlyIf);
            if keep {
                Ok(working)
            } else {
                Ok(Value::zero(working.kind()))
            }
        }
        OpCode::Abs | OpCode::Neg | OpCode::Floor | OpCode::Ceil | OpCode::Round | OpCode::Not => {
            unary(op, working)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lit(op: OpCode, value: impl Into<Value>) -> Operator {
        Operator::new(op, Operand::Literal(value.into()))
    }

    fn run(operators: &[Operator], seed: impl Into<Value>) -> Result<Value> {
        let env: HashMap<String, Value> = HashMap::new();
        run_chain(operators, seed.into(), &env)
    }

    #[test]
    fn integer_arithmetic_stays_integer() {
        let chain = [lit(OpCode::Add, 5), lit(OpCode::Mul, 3), lit(OpCode::Sub, 1)];
        assert_eq!(run(&chain, 1), Ok(Value::Int(17)));
    }

    #[test]
    fn float_operand_promotes() {
        let chain = [lit(OpCode::Div, 4.0f32)];
        assert_eq!(run(&chain, 10), Ok(Value::Float(2.5)));
    }

    #[test]
    fn integer_division_by_zero_fails() {
        let chain = [lit(OpCode::Div, 0)];
        assert_eq!(
            run(&chain, 10),
            Err(TraitError::DivisionByZero { name: "div" })
        );
        let chain = [lit(OpCode::Mod, 0)];
        assert_eq!(
            run(&chain, 10),
            Err(TraitError::DivisionByZero { name: "mod" })
        );
    }

    #[test]
    fn add_concatenates_strings() {
        let chain = [lit(OpCode::Add, 2), lit(OpCode::Add, "px")];
        assert_eq!(run(&chain, "width "), Ok(Value::from("width 2px")));
    }

    #[test]
    fn unary_operators_ignore_operand() {
        assert_eq!(run(&[Operator::unary(OpCode::Abs)], -4), Ok(Value::Int(4)));
        assert_eq!(run(&[Operator::unary(OpCode::Floor)], 2.7f32), Ok(Value::Float(2.0)));
        assert_eq!(run(&[Operator::unary(OpCode::Round)], 2.5f32), Ok(Value::Float(3.0)));
        assert_eq!(run(&[Operator::unary(OpCode::Not)], 0), Ok(Value::Bool(true)));
    }

    #[test]
    fn comparisons_produce_bools() {
        assert_eq!(run(&[lit(OpCode::Gt, 2)], 3), Ok(Value::Bool(true)));
        assert_eq!(run(&[lit(OpCode::Lte, 2.5f32)], 3), Ok(Value::Bool(false)));
        assert_eq!(run(&[lit(OpCode::Eq, "abc")], "abc"), Ok(Value::Bool(true)));
        assert_eq!(run(&[lit(OpCode::Neq, 1)], true), Ok(Value::Bool(false)));
    }

    #[test]
    fn gates_zero_the_working_value() {
        assert_eq!(run(&[lit(OpCode::OnlyIf, false)], 9), Ok(Value::Int(0)));
        assert_eq!(run(&[lit(OpCode::OnlyIf, true)], 9), Ok(Value::Int(9)));
        assert_eq!(run(&[lit(OpCode::OnlyIfNot, true)], "x"), Ok(Value::from("")));
    }

    #[test]
    fn missing_operand_is_reported() {
        let chain = [Operator {
            op: OpCode::Add,
            operand: None,
        }];
        assert_eq!(run(&chain, 1), Err(TraitError::MissingOperand { op: "add" }));
    }

    #[test]
    fn switch_reads_name_built_from_working_value() {
        let mut env = HashMap::new();
        env.insert("opt_a".to_string(), Value::Int(1));
        env.insert("opt_b".to_string(), Value::Int(2));
        env.insert("opt_true".to_string(), Value::Int(7));

        let chain = [Operator::new(OpCode::Copy, Operand::Switch("opt_".to_string()))];
        assert_eq!(run_chain(&chain, Value::from("b"), &env), Ok(Value::Int(2)));
        assert_eq!(run_chain(&chain, Value::Bool(true), &env), Ok(Value::Int(7)));
        assert_eq!(
            run_chain(&chain, Value::from("c"), &env),
            Err(TraitError::NotFound("opt_c".to_string()))
        );
    }

    #[test]
    fn nested_chain_seeds_from_working_value() {
        let mut env = HashMap::new();
        env.insert("menu.w".to_string(), Value::Int(10));

        // 3 + (menu.w * 2)
        let helper = vec![Operator::copy_trait("menu.w"), lit(OpCode::Mul, 2)];
        let chain = [Operator::new(OpCode::Add, Operand::Chain(helper))];
        assert_eq!(run_chain(&chain, Value::Int(3), &env), Ok(Value::Int(23)));
    }
}
