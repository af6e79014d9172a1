//! # Runtime Value Representation
//!
//! `Value` is the owned cell type stored in records. Views own their data
//! outright; joins build new records out of clones, so there is no
//! borrowing back into source buffers here.
//!
//! ## Comparison Semantics
//!
//! `compare_values` returns `Option<Ordering>` where `None` encodes SQL
//! UNKNOWN:
//!
//! - any NULL operand compares as `None`
//! - Integer and Float promote to a common numeric comparison
//! - a String compares numerically against Integer/Float when it parses
//!   as a number, and temporally against Datetime when the session's
//!   datetime formats recognize it
//! - remaining cross-type pairs are incomparable (`None`)

use crate::config::Session;
use crate::types::Ternary;
use chrono::NaiveDateTime;
use std::cmp::Ordering;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    String(String),
    Ternary(Ternary),
    Datetime(NaiveDateTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Three-valued collapse used when a value stands in predicate
    /// position.
    pub fn ternary(&self) -> Ternary {
        match self {
            Value::Ternary(t) => *t,
            Value::Integer(1) => Ternary::True,
            Value::Integer(0) => Ternary::False,
            Value::Float(f) if *f == 1.0 => Ternary::True,
            Value::Float(f) if *f == 0.0 => Ternary::False,
            Value::String(s) => Ternary::parse(s).unwrap_or(Ternary::Unknown),
            _ => Ternary::Unknown,
        }
    }

    fn as_number(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(s) => f.write_str(s),
            Value::Ternary(t) => write!(f, "{}", t),
            Value::Datetime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S%.f")),
        }
    }
}

/// NULL-aware comparison. `None` is UNKNOWN: a NULL operand, an
/// unparseable coercion or an incomparable type pair.
pub fn compare_values(lhs: &Value, rhs: &Value, session: &Session) -> Option<Ordering> {
    match (lhs, rhs) {
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
        (Value::Datetime(a), Value::Datetime(b)) => Some(a.cmp(b)),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Ternary(a), Value::Ternary(b)) => {
            if a == b {
                Some(Ordering::Equal)
            } else {
                None
            }
        }
        (Value::Datetime(a), Value::String(s)) => {
            session.parse_datetime(s).map(|b| a.cmp(&b))
        }
        (Value::String(s), Value::Datetime(b)) => {
            session.parse_datetime(s).map(|a| a.cmp(b))
        }
        _ => {
            let a = lhs.as_number()?;
            let b = rhs.as_number()?;
            a.partial_cmp(&b)
        }
    }
}
