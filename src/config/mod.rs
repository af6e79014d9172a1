//! # Session Environment
//!
//! Process-wide context the query pipeline needs but must never reach for
//! through globals: the clock, the random source and the datetime formats
//! used for literal recognition. A [`Session`] is constructed once at the
//! boundary and threaded by reference; workers only see what was captured
//! explicitly.
//!
//! Tests override "now" and the RNG seed through the corresponding
//! constructors instead of mutating hidden state, so runs are
//! reproducible.
//!
//! ## Datetime Recognition
//!
//! `parse_datetime` is the single authority on what counts as a datetime
//! string. The scanner uses it to promote string literals to DATETIME
//! tokens, and value comparison uses it to coerce strings against
//! datetime cells. User-supplied formats (chrono syntax) are tried before
//! the built-in list.

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Built-in formats tried after any user-supplied ones, in order.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%m/%d/%Y %H:%M:%S%.f",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

#[derive(Debug, Clone, Default)]
pub struct Session {
    now_override: Option<NaiveDateTime>,
    rng_seed: Option<u64>,
    datetime_formats: Vec<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pins the session clock. Every call to [`Session::now`] returns this
    /// instant.
    pub fn with_now(mut self, now: NaiveDateTime) -> Self {
        self.now_override = Some(now);
        self
    }

    /// Seeds the session RNG for reproducible runs.
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng_seed = Some(seed);
        self
    }

    /// Prepends user datetime formats (chrono syntax) to the recognition
    /// chain.
    pub fn with_datetime_formats<I, S>(mut self, formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.datetime_formats = formats.into_iter().map(Into::into).collect();
        self
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now_override
            .unwrap_or_else(|| Local::now().naive_local())
    }

    pub fn rng(&self) -> StdRng {
        match self.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Attempts to read `s` as a datetime. Returns `None` when no format
    /// in the chain matches the full input.
    pub fn parse_datetime(&self, s: &str) -> Option<NaiveDateTime> {
        let s = s.trim();
        if s.is_empty() {
            return None;
        }

        for fmt in &self.datetime_formats {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt);
            }
            if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
                return Some(d.and_hms_opt(0, 0, 0).unwrap_or_default());
            }
        }

        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.naive_local());
        }
        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
                return Some(dt);
            }
        }
        for fmt in DATE_FORMATS {
            if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
                return Some(d.and_hms_opt(0, 0, 0).unwrap_or_default());
            }
        }
        None
    }
}
