//! # Views, Headers and Records
//!
//! The in-memory relation model the join executor works over. A view is
//! an ordered header plus ordered records; every record has exactly the
//! header's arity. Joins consume two views and overwrite the left one
//! with the merged result, clearing its file origin since the result is
//! no longer backed by a single file.
//!
//! Field resolution is case-insensitive and distinguishes "no such
//! column" from "column name matches in more than one origin view"; the
//! NATURAL-join rewriter depends on telling those apart.

use crate::sql::FieldRef;
use crate::types::Value;
use smallvec::SmallVec;
use std::fmt;
use std::path::PathBuf;

/// Reserved column carrying engine-internal row identity. Excluded from
/// NATURAL-join matching.
pub const INTERNAL_ID_COLUMN: &str = "@__internal_id";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    NotFound { field: String },
    Ambiguous { field: String },
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldError::NotFound { field } => write!(f, "field {} does not exist", field),
            FieldError::Ambiguous { field } => write!(f, "field {} is ambiguous", field),
        }
    }
}

impl std::error::Error for FieldError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    /// Origin relation name.
    pub view: String,
    pub column: String,
}

impl HeaderField {
    pub fn new(view: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            view: view.into(),
            column: column.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    fields: Vec<HeaderField>,
}

impl Header {
    /// Header for a single relation: every column tagged with `view`.
    pub fn new(view: &str, columns: &[&str]) -> Self {
        Self {
            fields: columns
                .iter()
                .map(|c| HeaderField::new(view, *c))
                .collect(),
        }
    }

    pub fn from_fields(fields: Vec<HeaderField>) -> Self {
        Self { fields }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[HeaderField] {
        &self.fields
    }

    pub fn get(&self, idx: usize) -> Option<&HeaderField> {
        self.fields.get(idx)
    }

    /// Order-preserving concatenation: all of `left`, then all of
    /// `right`.
    pub fn merge(left: &Header, right: &Header) -> Header {
        let mut fields = Vec::with_capacity(left.len() + right.len());
        fields.extend_from_slice(&left.fields);
        fields.extend_from_slice(&right.fields);
        Header { fields }
    }

    /// Resolves a field reference to a column index. A qualified
    /// reference must match both view and column; an unqualified one
    /// matches on column alone. Matching is case-insensitive.
    pub fn field_index(&self, reference: &FieldRef<'_>) -> Result<usize, FieldError> {
        let mut hits: SmallVec<[usize; 4]> = SmallVec::new();
        for (idx, field) in self.fields.iter().enumerate() {
            if !field.column.eq_ignore_ascii_case(reference.column) {
                continue;
            }
            if let Some(view) = reference.view {
                if !field.view.eq_ignore_ascii_case(view) {
                    continue;
                }
            }
            hits.push(idx);
        }

        match hits.as_slice() {
            [] => Err(FieldError::NotFound {
                field: display_ref(reference),
            }),
            [idx] => Ok(*idx),
            _ => Err(FieldError::Ambiguous {
                field: display_ref(reference),
            }),
        }
    }
}

fn display_ref(reference: &FieldRef<'_>) -> String {
    match reference.view {
        Some(view) => format!("{}.{}", view, reference.column),
        None => reference.column.to_string(),
    }
}

/// An ordered tuple of cells. Arity always equals the owning view's
/// header length.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    values: Vec<Value>,
}

impl Record {
    pub fn new(values: Vec<Value>) -> Self {
        Self { values }
    }

    /// A record of `n` NULL cells, used for outer-join padding.
    pub fn new_empty(n: usize) -> Self {
        Self {
            values: vec![Value::Null; n],
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Concatenates two records into a new one; inputs are untouched.
    pub fn merge(left: &Record, right: &Record) -> Record {
        let mut values = Vec::with_capacity(left.len() + right.len());
        values.extend_from_slice(&left.values);
        values.extend_from_slice(&right.values);
        Record { values }
    }
}

impl From<Vec<Value>> for Record {
    fn from(values: Vec<Value>) -> Self {
        Record::new(values)
    }
}

/// Concatenates partition outputs in partition order.
pub fn merge_records_list(lists: Vec<Vec<Record>>) -> Vec<Record> {
    let total = lists.iter().map(Vec::len).sum();
    let mut records = Vec::with_capacity(total);
    for list in lists {
        records.extend(list);
    }
    records
}

/// File origin of a loaded view. Kept as metadata only; cleared by joins
/// since the result no longer mirrors one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub path: PathBuf,
    pub delimiter: char,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct View {
    pub header: Header,
    pub records: Vec<Record>,
    pub file_info: Option<FileInfo>,
}

impl View {
    pub fn new(header: Header, records: Vec<Record>) -> Self {
        Self {
            header,
            records,
            file_info: None,
        }
    }

    pub fn record_len(&self) -> usize {
        self.records.len()
    }

    pub fn field_len(&self) -> usize {
        self.header.len()
    }

    pub fn field_index(&self, reference: &FieldRef<'_>) -> Result<usize, FieldError> {
        self.header.field_index(reference)
    }
}
