use std::{cmp::Ordering, collections::BTreeMap};

use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};
use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, SelectClause, UnaryOp},
    context::{Context, Lookup},
    functions::{self, Builtin},
    value::Value,
};

/// Errors that can occur while solving an expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Call to a name missing from the function table
    #[error("Unknown function: {0}")]
    UnknownFunction(String),

    /// Operator or function applied to values of the wrong kind
    #[error("Type error: {0}")]
    Type(String),

    /// Built-in called with the wrong number of arguments
    #[error("{name}() takes {expected} argument(s), got {got}")]
    Arity {
        name: String,
        expected: String,
        got: usize,
    },

    #[error("Division by zero")]
    DivisionByZero,
}

/// Solves expression trees against a [`Context`].
///
/// Holds the function table; the built-ins are registered by
/// [`Evaluator::new`] and more can be added with [`Evaluator::with_function`].
///
/// # Examples
///
/// ```
/// use dataview::{Context, Evaluator, Value, parser::parse_expression};
///
/// let expr = parse_expression("sum(1, 2) * 2").unwrap();
/// let value = Evaluator::new().solve(&expr, &Context::new()).unwrap();
/// assert_eq!(value, Value::Integer(6));
/// ```
#[derive(Debug, Clone)]
pub struct Evaluator {
    functions: BTreeMap<String, Builtin>,
}

impl Default for Evaluator {
    fn default() -> Self {
        let functions = functions::builtins()
            .into_iter()
            .map(|(name, f)| (name.to_string(), f))
            .collect();
        Evaluator { functions }
    }
}

impl Evaluator {
    /// Creates an evaluator with the built-in functions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers (or replaces) a function under `name`.
    pub fn with_function(mut self, name: impl Into<String>, function: Builtin) -> Self {
        self.functions.insert(name.into(), function);
        self
    }

    /// Reduces `expr` to a single value, bottom-up.
    pub fn solve(&self, expr: &Expr, context: &Context) -> Result<Value, EvalError> {
        match expr {
            Expr::Float(n) => Ok(Value::Float(*n)),
            Expr::Integer(n) => Ok(Value::Integer(*n)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Boolean(b) => Ok(Value::Boolean(*b)),
            Expr::Null => Ok(Value::Null),

            // A missing path is the empty string; a present null stays null.
            Expr::Identifier { path, .. } => match context.lookup(path) {
                Lookup::Found(value) => Ok(value.clone()),
                Lookup::Absent => Ok(Value::String(String::new())),
            },

            Expr::BinaryOp { op, left, right } => {
                let left_val = self.solve(left, context)?;
                let right_val = self.solve(right, context)?;
                apply_binop(*op, &left_val, &right_val)
            }

            Expr::UnaryOp { op, operand } => {
                let value = self.solve(operand, context)?;
                apply_unary(*op, &value)
            }

            Expr::FunctionCall { name, args } => {
                let function = self
                    .functions
                    .get(name)
                    .ok_or_else(|| EvalError::UnknownFunction(name.clone()))?;

                let values = args
                    .iter()
                    .map(|arg| self.solve(arg, context))
                    .collect::<Result<Vec<_>, _>>()?;
                function(&values)
            }

            Expr::Object(pairs) => {
                let mut obj = BTreeMap::new();
                for (key, value_expr) in pairs {
                    let value = self.solve(value_expr, context)?;
                    obj.insert(key.clone(), value);
                }
                Ok(Value::Object(obj))
            }

            Expr::Array(elements) => {
                let values = elements
                    .iter()
                    .map(|e| self.solve(e, context))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Value::Array(values))
            }
        }
    }

    /// One value per select item, in order. Aliases do not affect values.
    pub fn solve_select(&self, select: &SelectClause, context: &Context) -> Result<Vec<Value>, EvalError> {
        select
            .items
            .iter()
            .map(|item| self.solve(&item.expr, context))
            .collect()
    }
}

/// Applies a binary operator to two already reduced operands.
pub fn apply_binop(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    match op {
        BinOp::Add => match (left, right) {
            (Value::Integer(a), Value::Integer(b)) => Ok(match a.checked_add(*b) {
                Some(n) => Value::Integer(n),
                None => Value::Float(*a as f64 + *b as f64),
            }),
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a + b)),
            (Value::Integer(_), Value::Float(_)) | (Value::Float(_), Value::Integer(_)) => mixed(op, left, right),
            (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
            (Value::Array(a), Value::Array(b)) => Ok(Value::Array(a.iter().chain(b).cloned().collect())),
            (a, b) => Err(EvalError::Type(format!(
                "Cannot add {} and {}",
                a.type_name(),
                b.type_name()
            ))),
        },
        BinOp::Subtract => match (left, right) {
            (Value::Integer(a), Value::Integer(b)) => Ok(match a.checked_sub(*b) {
                Some(n) => Value::Integer(n),
                None => Value::Float(*a as f64 - *b as f64),
            }),
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a - b)),
            (Value::Integer(_), Value::Float(_)) | (Value::Float(_), Value::Integer(_)) => mixed(op, left, right),
            (a, b) => Err(EvalError::Type(format!(
                "Cannot subtract {} from {}",
                b.type_name(),
                a.type_name()
            ))),
        },
        BinOp::Multiply => match (left, right) {
            (Value::Integer(a), Value::Integer(b)) => Ok(match a.checked_mul(*b) {
                Some(n) => Value::Integer(n),
                None => Value::Float(*a as f64 * *b as f64),
            }),
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a * b)),
            (Value::Integer(_), Value::Float(_)) | (Value::Float(_), Value::Integer(_)) => mixed(op, left, right),
            (a, b) => Err(EvalError::Type(format!(
                "Cannot multiply {} by {}",
                a.type_name(),
                b.type_name()
            ))),
        },
        BinOp::Divide => match (left, right) {
            (_, Value::Integer(0)) => Err(EvalError::DivisionByZero),
            (_, Value::Float(b)) if *b == 0.0 => Err(EvalError::DivisionByZero),
            // True division: integers always give a float
            (Value::Integer(a), Value::Integer(b)) => Ok(Value::Float(*a as f64 / *b as f64)),
            (Value::Float(a), Value::Float(b)) => Ok(Value::Float(a / b)),
            (Value::Integer(_), Value::Float(_)) | (Value::Float(_), Value::Integer(_)) => mixed(op, left, right),
            (a, b) => Err(EvalError::Type(format!(
                "Cannot divide {} by {}",
                a.type_name(),
                b.type_name()
            ))),
        },

        BinOp::Equal => Ok(Value::Boolean(values_equal(left, right))),
        BinOp::NotEqual => Ok(Value::Boolean(!values_equal(left, right))),
        BinOp::LessThan => compare_values(left, right).map(|o| Value::Boolean(o == Ordering::Less)),
        BinOp::GreaterThan => compare_values(left, right).map(|o| Value::Boolean(o == Ordering::Greater)),
        BinOp::LessEqual => compare_values(left, right).map(|o| Value::Boolean(o != Ordering::Greater)),
        BinOp::GreaterEqual => compare_values(left, right).map(|o| Value::Boolean(o != Ordering::Less)),

        BinOp::In => contains(right, left).map(Value::Boolean),
        BinOp::Contains => contains(left, right).map(Value::Boolean),

        // Both sides are already reduced; only their truthiness matters
        BinOp::And => Ok(Value::Boolean(left.is_truthy() && right.is_truthy())),
        BinOp::Or => Ok(Value::Boolean(left.is_truthy() || right.is_truthy())),
    }
}

fn apply_unary(op: UnaryOp, value: &Value) -> Result<Value, EvalError> {
    match (op, value) {
        (UnaryOp::Not, Value::Boolean(b)) => Ok(Value::Boolean(!b)),
        (UnaryOp::Not, Value::Integer(n)) => Ok(Value::Boolean(*n == 0)),
        (UnaryOp::Negate, Value::Integer(n)) => Ok(match n.checked_neg() {
            Some(n) => Value::Integer(n),
            None => Value::Float(-(*n as f64)),
        }),
        (UnaryOp::Negate, Value::Float(n)) => Ok(Value::Float(-n)),
        (UnaryOp::Plus, Value::Integer(_) | Value::Float(_)) => Ok(value.clone()),
        (UnaryOp::Not, v) => Err(EvalError::Type(format!(
            "NOT expects a boolean or integer, got {}",
            v.type_name()
        ))),
        (_, v) => Err(EvalError::Type(format!(
            "Cannot apply sign to {}",
            v.type_name()
        ))),
    }
}

/// Integer/float arithmetic, computed in decimal to avoid binary rounding
/// (`0.1 + 2` is `2.1`). The result is always a float.
fn mixed(op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
    let (Some(a), Some(b)) = (left.as_float(), right.as_float()) else {
        return Err(EvalError::Type(format!(
            "Cannot apply {} to {} and {}",
            op.symbol(),
            left.type_name(),
            right.type_name()
        )));
    };

    if let Some(ad) = to_decimal(left)
        && let Some(bd) = to_decimal(right)
    {
        let rd = match op {
            BinOp::Add => ad.checked_add(bd),
            BinOp::Subtract => ad.checked_sub(bd),
            BinOp::Multiply => ad.checked_mul(bd),
            BinOp::Divide => ad.checked_div(bd),
            _ => None,
        };
        if let Some(r) = rd.and_then(|rd| rd.to_f64()) {
            return Ok(Value::Float(r));
        }
    }

    let res = match op {
        BinOp::Add => a + b,
        BinOp::Subtract => a - b,
        BinOp::Multiply => a * b,
        _ => a / b,
    };
    Ok(Value::Float(res))
}

fn to_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Integer(n) => Decimal::from_i64(*n),
        Value::Float(n) => Decimal::from_f64(*n),
        _ => None,
    }
}

/// Structural equality where numbers compare numerically, booleans counting
/// as `0` and `1` (`0 == false`).
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Integer(x), Value::Float(y)) | (Value::Float(y), Value::Integer(x)) => *x as f64 == *y,
        (Value::Boolean(x), Value::Integer(y)) | (Value::Integer(y), Value::Boolean(x)) => i64::from(*x) == *y,
        (Value::Boolean(x), Value::Float(y)) | (Value::Float(y), Value::Boolean(x)) => f64::from(u8::from(*x)) == *y,
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(key, x)| ys.get(key).is_some_and(|y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

/// Ordering for `< > <= >=`; only values of the same kind are comparable.
pub fn compare_values(a: &Value, b: &Value) -> Result<Ordering, EvalError> {
    let incomparable = || EvalError::Type(format!("Cannot compare {} and {}", a.type_name(), b.type_name()));

    match (a, b) {
        (Value::Integer(x), Value::Integer(y)) => Ok(x.cmp(y)),
        (Value::Integer(_) | Value::Float(_), Value::Integer(_) | Value::Float(_)) => {
            let (Some(x), Some(y)) = (a.as_float(), b.as_float()) else {
                return Err(incomparable());
            };
            x.partial_cmp(&y).ok_or_else(incomparable)
        }
        (Value::String(x), Value::String(y)) => Ok(x.cmp(y)),
        (Value::Boolean(x), Value::Boolean(y)) => Ok(x.cmp(y)),
        (Value::Array(xs), Value::Array(ys)) => {
            for (x, y) in xs.iter().zip(ys) {
                match compare_values(x, y)? {
                    Ordering::Equal => continue,
                    other => return Ok(other),
                }
            }
            Ok(xs.len().cmp(&ys.len()))
        }
        _ => Err(incomparable()),
    }
}

/// Membership test behind `IN`, `CONTAINS` and `econtains`.
pub fn contains(haystack: &Value, needle: &Value) -> Result<bool, EvalError> {
    match (haystack, needle) {
        (Value::Array(items), _) => Ok(items.iter().any(|item| values_equal(item, needle))),
        (Value::String(s), Value::String(sub)) => Ok(s.contains(sub.as_str())),
        (Value::Object(obj), Value::String(key)) => Ok(obj.contains_key(key)),
        (h, n) => Err(EvalError::Type(format!(
            "Cannot test membership of {} in {}",
            n.type_name(),
            h.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixed_arithmetic_uses_decimal() {
        let result = apply_binop(BinOp::Add, &Value::Float(0.1), &Value::Integer(2)).unwrap();
        assert_eq!(result, Value::Float(2.1));

        let result = apply_binop(BinOp::Multiply, &Value::Integer(3), &Value::Float(0.1)).unwrap();
        assert_eq!(result, Value::Float(0.3));
    }

    #[test]
    fn integer_division() {
        assert_eq!(
            apply_binop(BinOp::Divide, &Value::Integer(6), &Value::Integer(3)).unwrap(),
            Value::Float(2.0)
        );
        assert_eq!(
            apply_binop(BinOp::Divide, &Value::Integer(1), &Value::Integer(2)).unwrap(),
            Value::Float(0.5)
        );
        assert_eq!(
            apply_binop(BinOp::Divide, &Value::Integer(1), &Value::Integer(0)),
            Err(EvalError::DivisionByZero)
        );
    }

    #[test]
    fn numeric_equality_across_kinds() {
        assert!(values_equal(&Value::Integer(2), &Value::Float(2.0)));
        assert!(values_equal(&Value::Integer(0), &Value::Boolean(false)));
        assert!(values_equal(&Value::Boolean(true), &Value::Float(1.0)));
        assert!(!values_equal(&Value::Integer(2), &Value::from("2")));
    }

    #[test]
    fn mixed_kinds_are_not_ordered() {
        assert!(compare_values(&Value::Integer(1), &Value::from("a")).is_err());
        assert_eq!(
            compare_values(&Value::from("a"), &Value::from("b")).unwrap(),
            Ordering::Less
        );
    }
}
