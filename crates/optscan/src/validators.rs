//! Built-in validators, addressable by name from declarative option files.

use std::sync::Arc;

use crate::error::{DeclareError, ValidationError};
use crate::spec::Validator;
use crate::value::Value;

/// Names accepted by [`named`].
pub const NAMES: &[&str] = &["int", "uint", "float", "bool", "non-empty"];

/// Look up a built-in validator.
pub fn named(name: &str) -> Option<Validator> {
    let v: Validator = match name {
        "int" => Arc::new(int),
        "uint" => Arc::new(uint),
        "float" => Arc::new(float),
        "bool" => Arc::new(boolean),
        "non-empty" => Arc::new(non_empty),
        _ => return None,
    };
    Some(v)
}

/// Like [`named`], but an unknown name is an invalid declaration of `option`.
pub fn resolve(option: &str, name: &str) -> Result<Validator, DeclareError> {
    named(name).ok_or_else(|| {
        DeclareError::invalid(
            option,
            format!(
                "unknown validator '{name}' (expected one of: {})",
                NAMES.join(", ")
            ),
        )
    })
}

pub fn int(raw: &str) -> Result<Value, ValidationError> {
    raw.trim()
        .parse::<i64>()
        .map(Value::Int)
        .map_err(|_| ValidationError::new(format!("expected an integer, got '{raw}'")))
}

pub fn uint(raw: &str) -> Result<Value, ValidationError> {
    raw.trim()
        .parse::<u64>()
        .ok()
        .and_then(|n| i64::try_from(n).ok())
        .map(Value::Int)
        .ok_or_else(|| ValidationError::new(format!("expected a non-negative integer, got '{raw}'")))
}

pub fn float(raw: &str) -> Result<Value, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .map(Value::Float)
        .map_err(|_| ValidationError::new(format!("expected a number, got '{raw}'")))
}

pub fn boolean(raw: &str) -> Result<Value, ValidationError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(Value::Bool(true)),
        "false" | "no" | "off" | "0" => Ok(Value::Bool(false)),
        _ => Err(ValidationError::new(format!("expected a boolean, got '{raw}'"))),
    }
}

pub fn non_empty(raw: &str) -> Result<Value, ValidationError> {
    if raw.trim().is_empty() {
        Err(ValidationError::new("value must not be empty"))
    } else {
        Ok(Value::from(raw))
    }
}

/// Remainder validator accepting between `min` and `max` (inclusive) tokens.
pub fn arity(
    min: usize,
    max: Option<usize>,
) -> impl Fn(&[String]) -> Result<Vec<String>, ValidationError> + Send + Sync + 'static {
    move |rest: &[String]| {
        if rest.len() < min {
            return Err(ValidationError::new(format!(
                "expected at least {min} trailing argument(s), got {}",
                rest.len()
            )));
        }
        if let Some(max) = max {
            if rest.len() > max {
                return Err(ValidationError::new(format!(
                    "expected at most {max} trailing argument(s), got {}",
                    rest.len()
                )));
            }
        }
        Ok(rest.to_vec())
    }
}
