//! # Join Rewriter and Executor
//!
//! Two collaborating pieces:
//!
//! - [`parse_join_condition`] rewrites USING / NATURAL join clauses into
//!   an explicit equality predicate plus the column sets the projection
//!   stage keeps and elides.
//! - [`cross_join`] / [`inner_join`] / [`outer_join`] execute the
//!   cartesian envelope with data-parallel partitioning of the outer
//!   side, evaluating the predicate through an [`Evaluator`] and
//!   overwriting the left view with the result.
//!
//! ## Ordering
//!
//! Output order is deterministic and equal to the serial left-major
//! order for any worker count: partitions are contiguous ranges of the
//! outer side and partition buffers are concatenated in partition order.
//! FULL-outer padding for unmatched right rows is collected in a
//! dedicated tail buffer appended after all partitions, in right-input
//! order.
//!
//! ## Failure
//!
//! The first evaluation error wins: it is published to a shared slot
//! under a mutex, a halt flag is released for the other workers, and the
//! join returns that error with the left view untouched.

use crate::query::filter::Evaluator;
use crate::query::parallel::{record_range, worker_count};
use crate::query::view::{merge_records_list, FieldError, Header, Record, View, INTERNAL_ID_COLUMN};
use crate::sql::{Expr, FieldRef, JoinClause, JoinCondition, JoinDirection, LogicOp};
use bumpalo::Bump;
use eyre::{Report, Result};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::debug;

/// A USING / NATURAL clause rewritten to an explicit predicate.
/// `include` names the columns the projection keeps, `exclude` the
/// other side's duplicates it elides.
#[derive(Debug, Clone, PartialEq)]
pub struct RewrittenCondition<'a> {
    pub on: &'a Expr<'a>,
    pub include: Vec<FieldRef<'a>>,
    pub exclude: Vec<FieldRef<'a>>,
}

/// Expands a join clause against the two input views. Returns `None`
/// when there is nothing to filter on (cross join), the ON expression
/// as-is, or the synthesized equality conjunction for USING / NATURAL.
pub fn parse_join_condition<'a>(
    arena: &'a Bump,
    join: &JoinClause<'a>,
    view: &View,
    join_view: &View,
) -> Result<Option<RewrittenCondition<'a>>> {
    let using: Vec<&'a str> = if join.natural {
        let mut columns = Vec::new();
        for field in view.header.fields() {
            if field.column == INTERNAL_ID_COLUMN {
                continue;
            }
            let column: &'a str = arena.alloc_str(&field.column);
            match join_view.field_index(&FieldRef::new(column)) {
                Ok(_) => columns.push(column),
                Err(err @ FieldError::Ambiguous { .. }) => return Err(err.into()),
                Err(FieldError::NotFound { .. }) => continue,
            }
        }
        columns
    } else {
        match join.condition {
            JoinCondition::None => return Ok(None),
            JoinCondition::On(expr) => {
                return Ok(Some(RewrittenCondition {
                    on: expr,
                    include: Vec::new(),
                    exclude: Vec::new(),
                }))
            }
            JoinCondition::Using(columns) => columns.to_vec(),
        }
    };

    if using.is_empty() {
        return Ok(None);
    }

    let mut include = Vec::with_capacity(using.len());
    let mut exclude = Vec::with_capacity(using.len());
    let mut comparisons = Vec::with_capacity(using.len());

    for column in using {
        let reference = FieldRef::new(column);

        let lhs_idx = view.field_index(&reference)?;
        let lhs_view: &'a str = arena.alloc_str(&view.header.fields()[lhs_idx].view);
        let lhs = FieldRef::qualified(lhs_view, column);

        let rhs_idx = join_view.field_index(&reference)?;
        let rhs_view: &'a str = arena.alloc_str(&join_view.header.fields()[rhs_idx].view);
        let rhs = FieldRef::qualified(rhs_view, column);

        let comparison: &'a Expr<'a> = arena.alloc(Expr::Comparison {
            lhs: arena.alloc(Expr::Field(lhs)),
            op: "=",
            rhs: arena.alloc(Expr::Field(rhs)),
        });
        comparisons.push(comparison);

        if join.direction == JoinDirection::Right {
            include.push(rhs);
            exclude.push(lhs);
        } else {
            include.push(lhs);
            exclude.push(rhs);
        }
    }

    let mut iter = comparisons.into_iter();
    let Some(first) = iter.next() else {
        return Ok(None);
    };
    // ((c1 AND c2) AND c3) …, single comparison returned bare
    let on = iter.fold(first, |acc, comparison| {
        &*arena.alloc(Expr::Logic {
            lhs: acc,
            op: LogicOp::And,
            rhs: comparison,
        })
    });

    Ok(Some(RewrittenCondition {
        on,
        include,
        exclude,
    }))
}

/// Cartesian product in left-major order. The left view becomes the
/// joined view.
pub fn cross_join(view: &mut View, join_view: &View) {
    let workers = worker_count(view.record_len());
    cross_join_with_workers(view, join_view, workers);
}

fn cross_join_with_workers(view: &mut View, join_view: &View, workers: usize) {
    let merged_header = Header::merge(&view.header, &join_view.header);
    let right_len = join_view.record_len();
    let total = view.record_len() * right_len;
    let mut records: Vec<Record> = vec![Record::default(); total];

    debug!(
        workers,
        left = view.record_len(),
        right = right_len,
        "cross join fan-out"
    );

    let left_records = &view.records;
    let right_records = &join_view.records;
    thread::scope(|s| {
        let mut rest = records.as_mut_slice();
        for th_idx in 0..workers {
            let (start, end) = record_range(th_idx, left_records.len(), workers);
            let (chunk, tail) = rest.split_at_mut((end - start) * right_len);
            rest = tail;
            s.spawn(move || {
                let mut idx = 0;
                for left in &left_records[start..end] {
                    for right in right_records {
                        chunk[idx] = Record::merge(left, right);
                        idx += 1;
                    }
                }
            });
        }
    });

    view.header = merged_header;
    view.records = records;
    view.file_info = None;
}

/// Inner join: the cartesian envelope filtered by `condition`. A nil
/// condition degenerates to a cross join.
pub fn inner_join<E: Evaluator>(
    view: &mut View,
    join_view: &View,
    condition: Option<&Expr<'_>>,
    filter: &E,
) -> Result<()> {
    match condition {
        None => {
            cross_join(view, join_view);
            Ok(())
        }
        Some(condition) => {
            let workers = worker_count(view.record_len());
            inner_join_with_workers(view, join_view, condition, filter, workers)
        }
    }
}

fn inner_join_with_workers<E: Evaluator>(
    view: &mut View,
    join_view: &View,
    condition: &Expr<'_>,
    filter: &E,
    workers: usize,
) -> Result<()> {
    let merged_header = Header::merge(&view.header, &join_view.header);
    let error_slot: Mutex<Option<Report>> = Mutex::new(None);
    let halt = AtomicBool::new(false);

    debug!(
        workers,
        left = view.record_len(),
        right = join_view.record_len(),
        "inner join fan-out"
    );

    let left_records = &view.records;
    let right_records = &join_view.records;
    let partitions: Vec<Vec<Record>> = thread::scope(|s| {
        let mut handles = Vec::with_capacity(workers);
        for th_idx in 0..workers {
            let merged_header = &merged_header;
            let error_slot = &error_slot;
            let halt = &halt;
            handles.push(s.spawn(move || {
                let (start, end) = record_range(th_idx, left_records.len(), workers);
                let mut kept = Vec::with_capacity(end - start);

                'partition: for left in &left_records[start..end] {
                    for right in right_records {
                        if halt.load(Ordering::Acquire) {
                            break 'partition;
                        }
                        let merged = Record::merge(left, right);
                        match filter.evaluate(condition, merged_header, &merged) {
                            Ok(truth) if truth.is_true() => kept.push(merged),
                            Ok(_) => {}
                            Err(err) => {
                                publish_error(error_slot, halt, err);
                                break 'partition;
                            }
                        }
                    }
                }
                kept
            }));
        }
        handles
            .into_iter()
            .map(|handle| handle.join().expect("join worker panicked"))
            .collect()
    });

    if let Some(err) = error_slot.into_inner() {
        return Err(err);
    }

    view.header = merged_header;
    view.records = merge_records_list(partitions);
    view.file_info = None;
    Ok(())
}

/// Outer join. `Undefined` is treated as LEFT; RIGHT logically swaps the
/// operands for the pass, so output columns stay left-original then
/// right-original either way. Every unmatched outer row emerges exactly
/// once, null-padded on the inner side; FULL additionally pads unmatched
/// inner rows after the barrier.
pub fn outer_join<E: Evaluator>(
    view: &mut View,
    join_view: &View,
    condition: &Expr<'_>,
    direction: JoinDirection,
    filter: &E,
) -> Result<()> {
    let direction = match direction {
        JoinDirection::Undefined => JoinDirection::Left,
        other => other,
    };
    let outer_len = match direction {
        JoinDirection::Right => join_view.record_len(),
        _ => view.record_len(),
    };
    let workers = worker_count(outer_len);
    outer_join_with_workers(view, join_view, condition, direction, filter, workers)
}

fn outer_join_with_workers<E: Evaluator>(
    view: &mut View,
    join_view: &View,
    condition: &Expr<'_>,
    direction: JoinDirection,
    filter: &E,
    workers: usize,
) -> Result<()> {
    let direction = match direction {
        JoinDirection::Undefined => JoinDirection::Left,
        other => other,
    };
    let merged_header = Header::merge(&view.header, &join_view.header);

    // The outer side drives the scan; RIGHT swaps roles for the pass.
    let (outer, inner): (&View, &View) = match direction {
        JoinDirection::Right => (join_view, &*view),
        _ => (&*view, join_view),
    };

    let outer_empty = Record::new_empty(outer.field_len());
    let inner_empty = Record::new_empty(inner.field_len());

    let error_slot: Mutex<Option<Report>> = Mutex::new(None);
    let halt = AtomicBool::new(false);

    debug!(
        workers,
        ?direction,
        outer = outer.record_len(),
        inner = inner.record_len(),
        "outer join fan-out"
    );

    let outer_records = &outer.records;
    let inner_records = &inner.records;
    let results: Vec<(Vec<Record>, Vec<bool>)> = thread::scope(|s| {
        let mut handles = Vec::with_capacity(workers);
        for th_idx in 0..workers {
            let merged_header = &merged_header;
            let error_slot = &error_slot;
            let halt = &halt;
            let inner_empty = &inner_empty;
            handles.push(s.spawn(move || {
                let (start, end) = record_range(th_idx, outer_records.len(), workers);
                let mut kept = Vec::with_capacity((end - start) * 2);
                let mut inner_matches = vec![false; inner_records.len()];

                'partition: for outer_record in &outer_records[start..end] {
                    let mut matched = false;
                    for (j, inner_record) in inner_records.iter().enumerate() {
                        if halt.load(Ordering::Acquire) {
                            break 'partition;
                        }
                        let merged = match direction {
                            JoinDirection::Right => Record::merge(inner_record, outer_record),
                            _ => Record::merge(outer_record, inner_record),
                        };
                        match filter.evaluate(condition, merged_header, &merged) {
                            Ok(truth) if truth.is_true() => {
                                if direction == JoinDirection::Full {
                                    inner_matches[j] = true;
                                }
                                kept.push(merged);
                                matched = true;
                            }
                            Ok(_) => {}
                            Err(err) => {
                                publish_error(error_slot, halt, err);
                                break 'partition;
                            }
                        }
                    }

                    if !matched {
                        let padded = match direction {
                            JoinDirection::Right => Record::merge(inner_empty, outer_record),
                            _ => Record::merge(outer_record, inner_empty),
                        };
                        kept.push(padded);
                    }
                }
                (kept, inner_matches)
            }));
        }
        handles
            .into_iter()
            .map(|handle| handle.join().expect("join worker panicked"))
            .collect()
    });

    if let Some(err) = error_slot.into_inner() {
        return Err(err);
    }

    let (partitions, bitmaps): (Vec<Vec<Record>>, Vec<Vec<bool>>) = results.into_iter().unzip();
    let mut records = merge_records_list(partitions);

    if direction == JoinDirection::Full {
        // Unmatched right rows land last, in right-input order.
        for (j, inner_record) in inner_records.iter().enumerate() {
            let matched = bitmaps.iter().any(|bitmap| bitmap[j]);
            if !matched {
                records.push(Record::merge(&outer_empty, inner_record));
            }
        }
    }

    view.header = merged_header;
    view.records = records;
    view.file_info = None;
    Ok(())
}

/// First error wins; the halt flag is published with release ordering so
/// peers observe it at their next acquire load.
fn publish_error(slot: &Mutex<Option<Report>>, halt: &AtomicBool, err: Report) {
    {
        let mut slot = slot.lock();
        if slot.is_none() {
            debug!("join worker halting peers on first error");
            *slot = Some(err);
        }
    }
    halt.store(true, Ordering::Release);
}
