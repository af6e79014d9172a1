//! # tabql - SQL Query Engine Core for Tabular Sources
//!
//! tabql is the core of a SQL-style query engine that treats delimited
//! text files as relations. This crate contains the two subsystems the
//! rest of the engine is built around: the lexical scanner for the
//! SQL-superset dialect, and the relational join executor with
//! data-parallel partitioning.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │          query text (dialect)         │
//! ├──────────────────────────────────────┤
//! │   sql::lexer  — token stream          │
//! │   sql::token  — kinds + catalogs      │
//! ├──────────────────────────────────────┤
//! │   (external parser)  — AST            │
//! │   sql::ast    — expressions, joins    │
//! ├──────────────────────────────────────┤
//! │   query::join — rewrite + execute     │
//! │   query::filter — predicate truth     │
//! │   query::view — headers and records   │
//! │   query::parallel — fan-out sizing    │
//! ├──────────────────────────────────────┤
//! │   types — cells, three-valued logic   │
//! │   config — session environment        │
//! └──────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use tabql::config::Session;
//! use tabql::query::{inner_join, Filter, Header, Record, View};
//! use tabql::sql::Scanner;
//!
//! let session = Session::new();
//!
//! let mut scanner = Scanner::new("SELECT * FROM a JOIN b USING (k)", "q.sql", &session);
//! let token = scanner.scan()?;
//!
//! let filter = Filter::new(&session);
//! inner_join(&mut left, &right, Some(condition), &filter)?;
//! ```
//!
//! ## Concurrency Model
//!
//! The scanner is single-owner and single-threaded. Joins fork scoped
//! workers over disjoint contiguous ranges of the outer side; the only
//! shared mutable state is a first-error-wins slot published with
//! release/acquire semantics. Output order is deterministic for any
//! worker count.

pub mod config;
pub mod query;
pub mod sql;
pub mod types;

pub use config::Session;
pub use query::{
    cross_join, inner_join, outer_join, parse_join_condition, Evaluator, FieldError, Filter,
    Header, HeaderField, Record, View,
};
pub use sql::{Keyword, LexError, Scanner, Token, TokenKind};
pub use types::{Ternary, Value};
