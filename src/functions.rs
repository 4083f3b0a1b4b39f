//! Built-in functions callable from queries.
//!
//! | name        | arguments                 | result                                    |
//! |-------------|---------------------------|-------------------------------------------|
//! | `sum`       | any number of numbers     | their sum, `0` when called without args   |
//! | `econtains` | sequence, value           | whether the value is in the sequence      |
//! | `length`    | string, array or object   | number of items, `0` for null             |
//! | `date`      | value                     | the value as a string                     |
//! | `link`      | path, optional display    | `[display](path)`                         |
//! | `choice`    | condition, a, b           | `a` when the condition is truthy, else `b`|
//! | `default`   | value, fallback           | fallback when value is null or `"null"`   |

use crate::{
    ast::BinOp,
    evaluator::{EvalError, apply_binop, contains},
    value::Value,
};

/// Signature shared by every callable function.
pub type Builtin = fn(&[Value]) -> Result<Value, EvalError>;

/// The default function table.
pub fn builtins() -> Vec<(&'static str, Builtin)> {
    vec![
        ("sum", sum as Builtin),
        ("econtains", econtains),
        ("length", length),
        ("date", date),
        ("link", link),
        ("choice", choice),
        ("default", default),
    ]
}

fn arity(name: &str, args: &[Value], min: usize, max: usize) -> Result<(), EvalError> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            min.to_string()
        } else {
            format!("{} to {}", min, max)
        };
        return Err(EvalError::Arity {
            name: name.to_string(),
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

pub fn sum(args: &[Value]) -> Result<Value, EvalError> {
    let mut total = Value::Integer(0);
    for arg in args {
        match arg {
            Value::Integer(_) | Value::Float(_) => total = apply_binop(BinOp::Add, &total, arg)?,
            other => {
                return Err(EvalError::Type(format!(
                    "sum() expects numbers, got {}",
                    other.type_name()
                )));
            }
        }
    }
    Ok(total)
}

pub fn econtains(args: &[Value]) -> Result<Value, EvalError> {
    arity("econtains", args, 2, 2)?;
    contains(&args[0], &args[1]).map(Value::Boolean)
}

pub fn length(args: &[Value]) -> Result<Value, EvalError> {
    arity("length", args, 1, 1)?;
    let len = match &args[0] {
        Value::Null => 0,
        Value::String(s) => s.chars().count(),
        Value::Array(items) => items.len(),
        Value::Object(obj) => obj.len(),
        other => {
            return Err(EvalError::Type(format!(
                "length() of {} is undefined",
                other.type_name()
            )));
        }
    };
    Ok(Value::Integer(len as i64))
}

/// Dates are carried as their textual form.
pub fn date(args: &[Value]) -> Result<Value, EvalError> {
    arity("date", args, 1, 1)?;
    Ok(Value::String(args[0].to_cell()))
}

pub fn link(args: &[Value]) -> Result<Value, EvalError> {
    arity("link", args, 1, 2)?;
    let path = args[0].to_cell();
    let display = match args.get(1) {
        Some(display) if display.is_truthy() => display.to_cell(),
        _ => path.clone(),
    };
    Ok(Value::String(format!("[{}]({})", display, path)))
}

pub fn choice(args: &[Value]) -> Result<Value, EvalError> {
    arity("choice", args, 3, 3)?;
    if args[0].is_truthy() {
        Ok(args[1].clone())
    } else {
        Ok(args[2].clone())
    }
}

pub fn default(args: &[Value]) -> Result<Value, EvalError> {
    arity("default", args, 2, 2)?;
    match &args[0] {
        Value::Null => Ok(args[1].clone()),
        Value::String(s) if s == "null" => Ok(args[1].clone()),
        value => Ok(value.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sum_of_mixed_numbers() {
        assert_eq!(sum(&[]).unwrap(), Value::Integer(0));
        assert_eq!(sum(&[Value::Integer(1), Value::Integer(2)]).unwrap(), Value::Integer(3));
        assert_eq!(sum(&[Value::Integer(1), Value::Float(0.5)]).unwrap(), Value::Float(1.5));
        assert!(sum(&[Value::from("a")]).is_err());
    }

    #[test]
    fn link_uses_path_without_display() {
        assert_eq!(link(&[Value::from("a.md")]).unwrap(), Value::from("[a.md](a.md)"));
        assert_eq!(
            link(&[Value::from("a.md"), Value::from("A")]).unwrap(),
            Value::from("[A](a.md)")
        );
    }

    #[test]
    fn default_replaces_null_text() {
        assert_eq!(default(&[Value::from("null"), Value::Integer(1)]).unwrap(), Value::Integer(1));
        assert_eq!(default(&[Value::from("x"), Value::Integer(1)]).unwrap(), Value::from("x"));
    }

    #[test]
    fn arity_is_checked() {
        let err = choice(&[Value::Boolean(true)]).unwrap_err();
        assert_eq!(
            err,
            EvalError::Arity {
                name: "choice".to_string(),
                expected: "3".to_string(),
                got: 1
            }
        );
    }
}
