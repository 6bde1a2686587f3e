//! Evaluation with JavaScript-like semantics.
//!
//! Values follow the usual loose rules: truthiness, `==` coercion between
//! numbers, strings and booleans, `null == undefined`, and relational
//! comparison of strings by code unit order. Arrays and objects compare
//! structurally.

use std::cmp::Ordering;

use serde_json::{Map, Number, Value};

use super::ConditionError;
use super::parser::{BinaryOp, Expr, LogicalOp};

/// Runtime value of an expression.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    Object(Map<String, Value>),
}

impl From<&Value> for Operand {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Self::String(s.clone()),
            Value::Array(items) => Self::Array(items.clone()),
            Value::Object(map) => Self::Object(map.clone()),
        }
    }
}

impl Operand {
    pub(crate) fn is_truthy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => false,
            Self::Bool(b) => *b,
            Self::Number(n) => *n != 0.0 && !n.is_nan(),
            Self::String(s) => !s.is_empty(),
            Self::Array(_) | Self::Object(_) => true,
        }
    }

    fn into_value(self) -> Value {
        match self {
            Self::Undefined | Self::Null => Value::Null,
            Self::Bool(b) => Value::Bool(b),
            Self::Number(n) => Number::from_f64(n).map_or(Value::Null, Value::Number),
            Self::String(s) => Value::String(s),
            Self::Array(items) => Value::Array(items),
            Self::Object(map) => Value::Object(map),
        }
    }

    fn to_number(&self) -> f64 {
        match self {
            Self::Undefined | Self::Object(_) => f64::NAN,
            Self::Null => 0.0,
            Self::Bool(b) => f64::from(u8::from(*b)),
            Self::Number(n) => *n,
            Self::String(s) => string_to_number(s),
            Self::Array(_) => string_to_number(&self.to_primitive_string()),
        }
    }

    /// String form used when an array or object meets a primitive.
    fn to_primitive_string(&self) -> String {
        match self {
            Self::Undefined => "undefined".to_owned(),
            Self::Null => "null".to_owned(),
            Self::Bool(b) => b.to_string(),
            Self::Number(n) => number_to_string(*n),
            Self::String(s) => s.clone(),
            Self::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Null => String::new(),
                    other => Operand::from(other).to_primitive_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Self::Object(_) => "[object Object]".to_owned(),
        }
    }

    fn is_compound(&self) -> bool {
        matches!(self, Self::Array(_) | Self::Object(_))
    }
}

fn string_to_number(s: &str) -> f64 {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else {
        format!("{n}")
    }
}

#[allow(clippy::float_cmp)]
fn strict_equals(left: &Operand, right: &Operand) -> bool {
    match (left, right) {
        (Operand::Number(a), Operand::Number(b)) => a == b,
        _ => left == right,
    }
}

#[allow(clippy::float_cmp)]
fn loose_equals(left: &Operand, right: &Operand) -> bool {
    match (left, right) {
        (Operand::Undefined | Operand::Null, Operand::Undefined | Operand::Null) => true,
        (Operand::Undefined | Operand::Null, _) | (_, Operand::Undefined | Operand::Null) => false,
        (Operand::Number(_), Operand::String(_)) | (Operand::String(_), Operand::Number(_)) => {
            left.to_number() == right.to_number()
        }
        (Operand::Bool(_), _) => loose_equals(&Operand::Number(left.to_number()), right),
        (_, Operand::Bool(_)) => loose_equals(left, &Operand::Number(right.to_number())),
        (a, b) if a.is_compound() && !b.is_compound() => {
            loose_equals(&Operand::String(a.to_primitive_string()), b)
        }
        (a, b) if !a.is_compound() && b.is_compound() => {
            loose_equals(a, &Operand::String(b.to_primitive_string()))
        }
        _ => strict_equals(left, right),
    }
}

fn compare(left: &Operand, right: &Operand) -> Option<Ordering> {
    let left_str = match left {
        Operand::String(s) => Some(s.clone()),
        other if other.is_compound() => Some(other.to_primitive_string()),
        _ => None,
    };
    let right_str = match right {
        Operand::String(s) => Some(s.clone()),
        other if other.is_compound() => Some(other.to_primitive_string()),
        _ => None,
    };

    if let (Some(a), Some(b)) = (&left_str, &right_str) {
        // JavaScript compares UTF-16 code units
        return Some(a.encode_utf16().cmp(b.encode_utf16()));
    }
    left.to_number().partial_cmp(&right.to_number())
}

fn binary(op: BinaryOp, left: &Operand, right: &Operand) -> bool {
    match op {
        BinaryOp::Eq => loose_equals(left, right),
        BinaryOp::NotEq => !loose_equals(left, right),
        BinaryOp::StrictEq => strict_equals(left, right),
        BinaryOp::StrictNotEq => !strict_equals(left, right),
        BinaryOp::Lt => compare(left, right) == Some(Ordering::Less),
        BinaryOp::Le => matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ),
        BinaryOp::Gt => compare(left, right) == Some(Ordering::Greater),
        BinaryOp::Ge => matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
    }
}

/// Property key from an index operand (`a[0]`, `a["key"]`).
fn property_key(key: &Operand) -> String {
    match key {
        Operand::String(s) => s.clone(),
        other => other.to_primitive_string(),
    }
}

fn member(object: &Operand, property: &str) -> Result<Operand, ConditionError> {
    let result = match object {
        Operand::Undefined | Operand::Null => {
            return Err(ConditionError::NullMember {
                property: property.to_owned(),
                target: object.to_primitive_string(),
            });
        }
        Operand::Object(map) => map.get(property).map_or(Operand::Undefined, Operand::from),
        Operand::Array(items) if property == "length" => {
            Operand::Number(usize_to_f64(items.len()))
        }
        Operand::Array(items) => property
            .parse::<usize>()
            .ok()
            .and_then(|i| items.get(i))
            .map_or(Operand::Undefined, Operand::from),
        Operand::String(s) if property == "length" => {
            Operand::Number(usize_to_f64(s.encode_utf16().count()))
        }
        Operand::String(s) => property
            .parse::<usize>()
            .ok()
            .and_then(|i| s.chars().nth(i))
            .map_or(Operand::Undefined, |c| Operand::String(c.to_string())),
        Operand::Bool(_) | Operand::Number(_) => Operand::Undefined,
    };
    Ok(result)
}

#[allow(clippy::cast_precision_loss)]
fn usize_to_f64(n: usize) -> f64 {
    n as f64
}

/// Evaluate an expression against a variable context.
pub(crate) fn eval(expr: &Expr, context: &Map<String, Value>) -> Result<Operand, ConditionError> {
    let value = match expr {
        Expr::Undefined => Operand::Undefined,
        Expr::Literal(value) => Operand::from(value),
        Expr::Number(n) => Operand::Number(*n),
        Expr::Ident(name) => context
            .get(name)
            .map(Operand::from)
            .ok_or_else(|| ConditionError::UnknownIdentifier(name.clone()))?,
        Expr::Member(object, property) => member(&eval(object, context)?, property)?,
        Expr::Index(object, index) => {
            let object = eval(object, context)?;
            let key = property_key(&eval(index, context)?);
            member(&object, &key)?
        }
        Expr::Not(inner) => Operand::Bool(!eval(inner, context)?.is_truthy()),
        Expr::Neg(inner) => Operand::Number(-eval(inner, context)?.to_number()),
        Expr::Binary(op, left, right) => {
            let left = eval(left, context)?;
            let right = eval(right, context)?;
            Operand::Bool(binary(*op, &left, &right))
        }
        Expr::Logical(op, left, right) => {
            let left = eval(left, context)?;
            match (op, left.is_truthy()) {
                (LogicalOp::And, false) | (LogicalOp::Or, true) => left,
                _ => eval(right, context)?,
            }
        }
        Expr::Array(items) => Operand::Array(
            items
                .iter()
                .map(|item| eval(item, context).map(Operand::into_value))
                .collect::<Result<_, _>>()?,
        ),
        Expr::Object(entries) => Operand::Object(
            entries
                .iter()
                .map(|(key, item)| Ok((key.clone(), eval(item, context)?.into_value())))
                .collect::<Result<_, ConditionError>>()?,
        ),
    };
    Ok(value)
}
