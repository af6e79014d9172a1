//! # Query Execution Layer
//!
//! The relational side of the engine: views and records, predicate
//! evaluation, and the join rewriter/executor with its fan-out helper.
//!
//! A join call consumes two views, rewrites USING / NATURAL clauses into
//! explicit predicates, runs the cartesian envelope across worker
//! threads, and overwrites the left view with the result. Everything
//! else (scans, projection, ordering) happens in the surrounding
//! pipeline.

pub mod filter;
pub mod join;
pub mod parallel;
pub mod view;

pub use filter::{Evaluator, Filter, ParentScope};
pub use join::{
    cross_join, inner_join, outer_join, parse_join_condition, RewrittenCondition,
};
pub use view::{
    merge_records_list, FieldError, FileInfo, Header, HeaderField, Record, View,
    INTERNAL_ID_COLUMN,
};
