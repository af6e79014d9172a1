//! # Expression and Join AST
//!
//! The AST slice the join layer consumes and produces. Nodes are
//! arena-allocated (bumpalo) with `&'a` child references and `&'a str`
//! leaves, so the join-condition rewriter can synthesize predicates
//! without owning an allocation graph; the whole tree is dropped with the
//! arena.
//!
//! Conjunctions are binary and left-leaning: the rewriter folds
//! multi-column USING sets into `((c1 AND c2) AND c3) …`, which keeps
//! consumers that pattern-match binary AND working.

use crate::types::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicOp {
    And,
    Or,
}

/// A column reference, optionally qualified by its origin view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldRef<'a> {
    pub view: Option<&'a str>,
    pub column: &'a str,
}

impl<'a> FieldRef<'a> {
    pub fn new(column: &'a str) -> Self {
        Self { view: None, column }
    }

    pub fn qualified(view: &'a str, column: &'a str) -> Self {
        Self {
            view: Some(view),
            column,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr<'a> {
    Field(FieldRef<'a>),
    Literal(Value),
    Comparison {
        lhs: &'a Expr<'a>,
        /// Operator spelling as written, e.g. `"="` or `"<>"`.
        op: &'a str,
        rhs: &'a Expr<'a>,
    },
    Logic {
        lhs: &'a Expr<'a>,
        op: LogicOp,
        rhs: &'a Expr<'a>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinDirection {
    Undefined,
    Left,
    Right,
    Full,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum JoinCondition<'a> {
    None,
    On(&'a Expr<'a>),
    Using(&'a [&'a str]),
}

/// One join node as written by the user. `natural` excludes both On and
/// Using.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JoinClause<'a> {
    pub direction: JoinDirection,
    pub natural: bool,
    pub condition: JoinCondition<'a>,
}

impl<'a> JoinClause<'a> {
    pub fn cross() -> Self {
        Self {
            direction: JoinDirection::Undefined,
            natural: false,
            condition: JoinCondition::None,
        }
    }

    pub fn natural(direction: JoinDirection) -> Self {
        Self {
            direction,
            natural: true,
            condition: JoinCondition::None,
        }
    }

    pub fn on(direction: JoinDirection, expr: &'a Expr<'a>) -> Self {
        Self {
            direction,
            natural: false,
            condition: JoinCondition::On(expr),
        }
    }

    pub fn using(direction: JoinDirection, columns: &'a [&'a str]) -> Self {
        Self {
            direction,
            natural: false,
            condition: JoinCondition::Using(columns),
        }
    }
}
