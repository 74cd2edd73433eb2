//! Per-type error counters.
//!
//! Enabled with `feature = "metrics"`. Cost per `AnnotatedError`
//! construction: one `AtomicU64::fetch_add(1, Relaxed)`.
//!
//! # Architecture
//!
//! ```text
//! AnnotatedError::new(.., error_type, ..)
//!       │
//!       ▼  index = error_type.id()
//! COUNTERS[index].fetch_add(1, Relaxed)
//!       │
//!       ▼  Prometheus scrape / log dump
//! global registry name_of(index) → "NotFound", "NetworkFail", ...
//! ```
//!
//! Counters are indexed by id only. Ids at or above [`MAX_TYPES`] are not
//! counted.

use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::registry;
use crate::ErrorType;

/// Maximum number of counted error types. 4096 × 8 bytes = 32KB.
pub const MAX_TYPES: usize = 4096;

/// Global counter array. Index = `ErrorType::id()`.
static COUNTERS: [AtomicU64; MAX_TYPES] = {
    const ZERO: AtomicU64 = AtomicU64::new(0);
    [ZERO; MAX_TYPES]
};

/// Increment the counter for a type. Called from `AnnotatedError` constructors.
///
/// Returns the previous count.
#[inline(always)]
pub fn bump(t: ErrorType) -> u64 {
    match COUNTERS.get(t.index()) {
        Some(counter) => counter.fetch_add(1, Ordering::Relaxed),
        None => 0,
    }
}

/// Read the current count for a type.
#[inline]
pub fn count(t: ErrorType) -> u64 {
    COUNTERS
        .get(t.index())
        .map_or(0, |c| c.load(Ordering::Relaxed))
}

/// Reset the counter for a type. Returns the old value.
#[inline]
pub fn reset(t: ErrorType) -> u64 {
    COUNTERS
        .get(t.index())
        .map_or(0, |c| c.swap(0, Ordering::Relaxed))
}

/// Reset all counters.
pub fn reset_all() {
    for counter in COUNTERS.iter() {
        counter.store(0, Ordering::Relaxed);
    }
}

// ── Dump ──────────────────────────────────────────────────────────

/// Snapshot of one type's counter.
#[derive(Debug, Clone)]
pub struct TypeSnapshot {
    pub error_type: ErrorType,
    /// `None` if the id is not in the process-wide registry.
    pub name: Option<Arc<str>>,
    pub count: u64,
}

/// All non-zero counters, in id order.
pub fn dump() -> Vec<TypeSnapshot> {
    let registry = registry::global();
    let mut result = Vec::new();
    for (idx, counter) in COUNTERS.iter().enumerate() {
        let count = counter.load(Ordering::Relaxed);
        if count > 0 {
            let error_type = ErrorType::from_raw(idx as u32);
            result.push(TypeSnapshot {
                error_type,
                name: registry.try_name_of(error_type).ok(),
                count,
            });
        }
    }
    result
}

/// All non-zero counters as a table.
pub fn dump_string() -> String {
    let mut out = String::new();
    for snap in dump() {
        match &snap.name {
            Some(name) => {
                out.push_str(&format!(
                    "[{:>5}] count={:<10} type={}\n",
                    snap.error_type.id(), snap.count, name
                ));
            }
            None => {
                out.push_str(&format!(
                    "[{:>5}] count={:<10} (unregistered)\n",
                    snap.error_type.id(), snap.count
                ));
            }
        }
    }
    out
}

/// Counters in OpenMetrics/Prometheus exposition format.
pub fn dump_prometheus() -> String {
    let mut out = String::from(
        "# HELP annoterr_errors_total Annotated errors created, by error type\n\
         # TYPE annoterr_errors_total counter\n",
    );
    for snap in dump() {
        let label = match &snap.name {
            Some(name) => escape_label(name),
            None => format!("#{}", snap.error_type.id()),
        };
        out.push_str(&format!(
            "annoterr_errors_total{{type=\"{}\",id=\"{}\"}} {}\n",
            label,
            snap.error_type.id(),
            snap.count
        ));
    }
    out
}

fn escape_label(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out
}
