//! # Predicate Evaluation
//!
//! The join executor needs one thing from the expression layer: given a
//! predicate AST, the merged header and a single candidate row, produce a
//! three-valued truth value or an error. [`Evaluator`] is that contract;
//! [`Filter`] is the engine's implementation.
//!
//! Evaluators must be cheap and referentially transparent: workers invoke
//! one concurrently, each with its own scratch row, so any hidden state
//! would be a data race waiting to happen.

use crate::config::Session;
use crate::query::view::{FieldError, Header, Record};
use crate::sql::{Expr, LogicOp};
use crate::types::{compare_values, Ternary, Value};
use eyre::{bail, Result};
use std::cmp::Ordering;

/// Three-valued predicate evaluation over one scratch row.
pub trait Evaluator: Sync {
    fn evaluate(&self, expr: &Expr<'_>, header: &Header, record: &Record) -> Result<Ternary>;
}

/// Outer-scope bindings a correlated reference can fall back to when a
/// column is absent from the scratch header.
#[derive(Clone, Copy)]
pub struct ParentScope<'a> {
    pub header: &'a Header,
    pub record: &'a Record,
}

pub struct Filter<'a> {
    session: &'a Session,
    parent: Option<ParentScope<'a>>,
}

impl<'a> Filter<'a> {
    pub fn new(session: &'a Session) -> Self {
        Self {
            session,
            parent: None,
        }
    }

    pub fn with_parent(session: &'a Session, parent: ParentScope<'a>) -> Self {
        Self {
            session,
            parent: Some(parent),
        }
    }

    fn field_value(
        &self,
        reference: &crate::sql::FieldRef<'_>,
        header: &Header,
        record: &Record,
    ) -> Result<Value> {
        match header.field_index(reference) {
            Ok(idx) => cell(record, idx),
            Err(err @ FieldError::NotFound { .. }) => match self.parent {
                Some(scope) => {
                    let idx = scope.header.field_index(reference)?;
                    cell(scope.record, idx)
                }
                None => Err(err.into()),
            },
            Err(err) => Err(err.into()),
        }
    }

    fn value_of(&self, expr: &Expr<'_>, header: &Header, record: &Record) -> Result<Value> {
        match expr {
            Expr::Field(reference) => self.field_value(reference, header, record),
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Comparison { .. } | Expr::Logic { .. } => {
                Ok(Value::Ternary(self.truth_of(expr, header, record)?))
            }
        }
    }

    fn truth_of(&self, expr: &Expr<'_>, header: &Header, record: &Record) -> Result<Ternary> {
        match expr {
            Expr::Comparison { lhs, op, rhs } => {
                let left = self.value_of(lhs, header, record)?;
                let right = self.value_of(rhs, header, record)?;
                compare_with_operator(&left, op, &right, self.session)
            }
            Expr::Logic { lhs, op, rhs } => {
                let left = self.truth_of(lhs, header, record)?;
                let right = self.truth_of(rhs, header, record)?;
                Ok(match op {
                    LogicOp::And => left.and(right),
                    LogicOp::Or => left.or(right),
                })
            }
            _ => Ok(self.value_of(expr, header, record)?.ternary()),
        }
    }
}

impl Evaluator for Filter<'_> {
    fn evaluate(&self, expr: &Expr<'_>, header: &Header, record: &Record) -> Result<Ternary> {
        self.truth_of(expr, header, record)
    }
}

fn cell(record: &Record, idx: usize) -> Result<Value> {
    match record.get(idx) {
        Some(value) => Ok(value.clone()),
        None => bail!("record is narrower than its header at index {}", idx),
    }
}

fn compare_with_operator(
    lhs: &Value,
    op: &str,
    rhs: &Value,
    session: &Session,
) -> Result<Ternary> {
    let ordering = compare_values(lhs, rhs, session);
    let truth = match op {
        "=" | "==" => ordering.map(|o| o == Ordering::Equal),
        "<>" | "!=" => ordering.map(|o| o != Ordering::Equal),
        "<" => ordering.map(|o| o == Ordering::Less),
        ">" => ordering.map(|o| o == Ordering::Greater),
        "<=" => ordering.map(|o| o != Ordering::Greater),
        ">=" => ordering.map(|o| o != Ordering::Less),
        _ => bail!("comparison operator {} is not supported", op),
    };
    Ok(truth.map_or(Ternary::Unknown, Ternary::from_bool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::view::HeaderField;
    use crate::sql::FieldRef;

    fn header() -> Header {
        Header::from_fields(vec![
            HeaderField::new("t1", "k"),
            HeaderField::new("t2", "k"),
        ])
    }

    fn record(left: Value, right: Value) -> Record {
        Record::new(vec![left, right])
    }

    #[test]
    fn equality_over_matching_cells() {
        let session = Session::new();
        let filter = Filter::new(&session);
        let lhs = Expr::Field(FieldRef::qualified("t1", "k"));
        let rhs = Expr::Field(FieldRef::qualified("t2", "k"));
        let expr = Expr::Comparison {
            lhs: &lhs,
            op: "=",
            rhs: &rhs,
        };
        let truth = filter
            .evaluate(
                &expr,
                &header(),
                &record(Value::Integer(2), Value::Integer(2)),
            )
            .unwrap();
        assert_eq!(truth, Ternary::True);
    }

    #[test]
    fn null_operand_yields_unknown() {
        let session = Session::new();
        let filter = Filter::new(&session);
        let lhs = Expr::Field(FieldRef::qualified("t1", "k"));
        let rhs = Expr::Field(FieldRef::qualified("t2", "k"));
        let expr = Expr::Comparison {
            lhs: &lhs,
            op: "=",
            rhs: &rhs,
        };
        let truth = filter
            .evaluate(&expr, &header(), &record(Value::Null, Value::Integer(2)))
            .unwrap();
        assert_eq!(truth, Ternary::Unknown);
    }

    #[test]
    fn logic_combines_ternary() {
        let session = Session::new();
        let filter = Filter::new(&session);
        let lhs = Expr::Literal(Value::Ternary(Ternary::True));
        let rhs = Expr::Literal(Value::Ternary(Ternary::Unknown));
        let both = Expr::Logic {
            lhs: &lhs,
            op: LogicOp::And,
            rhs: &rhs,
        };
        let truth = filter
            .evaluate(&both, &header(), &record(Value::Null, Value::Null))
            .unwrap();
        assert_eq!(truth, Ternary::Unknown);
    }

    #[test]
    fn missing_field_is_an_error() {
        let session = Session::new();
        let filter = Filter::new(&session);
        let expr = Expr::Field(FieldRef::new("nope"));
        let err = filter
            .evaluate(&expr, &header(), &record(Value::Null, Value::Null))
            .unwrap_err();
        assert!(err.downcast_ref::<FieldError>().is_some());
    }

    #[test]
    fn parent_scope_resolves_correlated_reference() {
        let session = Session::new();
        let outer_header = Header::new("outer", &["city"]);
        let outer_record = Record::new(vec![Value::String("Osaka".into())]);
        let filter = Filter::with_parent(
            &session,
            ParentScope {
                header: &outer_header,
                record: &outer_record,
            },
        );

        let lhs = Expr::Field(FieldRef::new("city"));
        let rhs = Expr::Literal(Value::String("Osaka".into()));
        let expr = Expr::Comparison {
            lhs: &lhs,
            op: "=",
            rhs: &rhs,
        };
        let truth = filter
            .evaluate(&expr, &header(), &record(Value::Null, Value::Null))
            .unwrap();
        assert_eq!(truth, Ternary::True);
    }

    #[test]
    fn comparison_operators_map_to_orderings() {
        let session = Session::new();
        let cases = [
            ("<", Value::Integer(1), Value::Integer(2), Ternary::True),
            (">=", Value::Integer(1), Value::Integer(2), Ternary::False),
            ("<>", Value::Integer(1), Value::Integer(2), Ternary::True),
            ("==", Value::Float(1.0), Value::Integer(1), Ternary::True),
        ];
        for (op, lhs, rhs, expected) in cases {
            assert_eq!(
                compare_with_operator(&lhs, op, &rhs, &session).unwrap(),
                expected,
                "operator {}",
                op
            );
        }
    }
}
