// Copyright 2026 FedSQL Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Scalar expression evaluation
//!
//! Expressions are evaluated against the current scope chain with SQL
//! three-valued logic. Scalar subqueries run through the data manager and
//! may suspend; the evaluation context caches a completed subquery value so
//! a retried evaluation does not re-execute it.

use std::cmp::Ordering;

use crate::core::error::{Error, Result};
use crate::core::step::{PollResult, Step};
use crate::core::types::DataType;
use crate::core::value::Value;
use crate::exec::plan::RelationalPlan;
use crate::ready;

/// What an expression needs from the interpreter to evaluate
pub trait EvalContext {
    /// Resolve a variable from the scope chain
    fn variable(&self, name: &str) -> Option<Value>;

    /// Evaluate a scalar subquery to its single value, suspending if the
    /// subordinate source is not ready
    fn scalar_subquery(&mut self, plan: &RelationalPlan) -> PollResult<Value>;
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Concat,
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Not,
    Negate,
    IsNull,
}

/// A scalar expression template, immutable after compilation
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A constant value
    Literal(Value),

    /// A scope-chain variable reference
    Variable(String),

    /// A unary operation
    Unary {
        op: UnaryOp,
        operand: Box<Expression>,
    },

    /// A binary operation
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },

    /// A subquery expected to yield at most one row and one column
    ScalarSubquery(RelationalPlan),
}

impl Expression {
    /// Shorthand for a literal integer
    pub fn integer(value: i64) -> Self {
        Expression::Literal(Value::integer(value))
    }

    /// Shorthand for a literal string
    pub fn text(value: impl Into<String>) -> Self {
        Expression::Literal(Value::text(value))
    }

    /// Shorthand for a variable reference
    pub fn variable(name: impl Into<String>) -> Self {
        Expression::Variable(name.into())
    }

    /// Shorthand for a binary operation
    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Evaluate against the given context
    pub fn evaluate(&self, ctx: &mut dyn EvalContext) -> PollResult<Value> {
        match self {
            Expression::Literal(value) => Ok(Step::Ready(value.clone())),
            Expression::Variable(name) => match ctx.variable(name) {
                Some(value) => Ok(Step::Ready(value)),
                None => Err(Error::VariableNotFound(name.clone())),
            },
            Expression::Unary { op, operand } => {
                let value = ready!(operand.evaluate(ctx));
                Ok(Step::Ready(eval_unary(*op, &value)?))
            }
            Expression::Binary { op, left, right } => {
                let lhs = ready!(left.evaluate(ctx));
                let rhs = ready!(right.evaluate(ctx));
                Ok(Step::Ready(eval_binary(*op, &lhs, &rhs)?))
            }
            Expression::ScalarSubquery(plan) => ctx.scalar_subquery(plan),
        }
    }
}

fn eval_unary(op: UnaryOp, value: &Value) -> Result<Value> {
    match op {
        UnaryOp::Not => match value.as_boolean() {
            Some(b) => Ok(Value::boolean(!b)),
            None if value.is_null() => Ok(Value::null(DataType::Boolean)),
            None => Err(Error::expression(format!(
                "cannot negate {}",
                value.data_type()
            ))),
        },
        UnaryOp::Negate => {
            Value::integer(0).subtract(value)
        }
        UnaryOp::IsNull => Ok(Value::boolean(value.is_null())),
    }
}

fn eval_binary(op: BinaryOp, lhs: &Value, rhs: &Value) -> Result<Value> {
    match op {
        BinaryOp::Add => lhs.add(rhs),
        BinaryOp::Subtract => lhs.subtract(rhs),
        BinaryOp::Multiply => lhs.multiply(rhs),
        BinaryOp::Divide => lhs.divide(rhs),
        BinaryOp::Concat => {
            if lhs.is_null() || rhs.is_null() {
                return Ok(Value::null(DataType::Text));
            }
            match (lhs.as_string(), rhs.as_string()) {
                (Some(a), Some(b)) => Ok(Value::text(a + &b)),
                _ => Err(Error::expression("cannot concatenate non-text values")),
            }
        }
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Lte | BinaryOp::Gt
        | BinaryOp::Gte => {
            // Comparison with NULL yields NULL, not an error
            if lhs.is_null() || rhs.is_null() {
                return Ok(Value::null(DataType::Boolean));
            }
            let ordering = lhs.compare(rhs)?;
            let outcome = match op {
                BinaryOp::Eq => ordering == Ordering::Equal,
                BinaryOp::Ne => ordering != Ordering::Equal,
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::Lte => ordering != Ordering::Greater,
                BinaryOp::Gt => ordering == Ordering::Greater,
                BinaryOp::Gte => ordering != Ordering::Less,
                _ => false,
            };
            Ok(Value::boolean(outcome))
        }
        BinaryOp::And => {
            let a = lhs.as_boolean();
            let b = rhs.as_boolean();
            // three-valued logic: FALSE dominates NULL
            match (a, b) {
                (Some(false), _) | (_, Some(false)) => Ok(Value::boolean(false)),
                (Some(true), Some(true)) => Ok(Value::boolean(true)),
                _ => Ok(Value::null(DataType::Boolean)),
            }
        }
        BinaryOp::Or => {
            let a = lhs.as_boolean();
            let b = rhs.as_boolean();
            // three-valued logic: TRUE dominates NULL
            match (a, b) {
                (Some(true), _) | (_, Some(true)) => Ok(Value::boolean(true)),
                (Some(false), Some(false)) => Ok(Value::boolean(false)),
                _ => Ok(Value::null(DataType::Boolean)),
            }
        }
    }
}
