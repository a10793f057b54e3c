//! Plugin adapters: pure `rows -> fragment` reductions, one per plugin.
//!
//! Adapters never abort the pipeline. Every statistic is guarded on its own:
//! a missing column, a malformed cell, or an empty row set degrades that one
//! statistic to its documented default (0 for counts, 0.0 for means and
//! ratios) while the rest of the fragment is still computed. Malformed
//! numeric cells are excluded from aggregates, never coerced to zero —
//! zero-filling a sum would corrupt it.

pub mod callbacks;
pub mod dlllist;
pub mod handles;
pub mod ldrmodules;
pub mod malfind;
pub mod modules;
pub mod pslist;
pub mod psxview;
pub mod svcscan;

use std::collections::BTreeSet;

use crate::row::PluginRow;

/// Valid numeric values of a column, with malformed cells skipped.
pub(crate) fn numeric_values<'a>(
    rows: &'a [PluginRow],
    column: &'a str,
) -> impl Iterator<Item = f64> + 'a {
    rows.iter().filter_map(move |row| row.get_number(column))
}

/// Mean of a column's valid numeric values; 0.0 when none are usable.
pub(crate) fn numeric_mean(rows: &[PluginRow], column: &str) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for value in numeric_values(rows, column) {
        sum += value;
        count += 1;
    }
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Number of distinct present values in a column.
pub(crate) fn distinct_count(rows: &[PluginRow], column: &str) -> usize {
    rows.iter()
        .filter_map(|row| row.token(column))
        .collect::<BTreeSet<_>>()
        .len()
}

/// Rows whose column equals `wanted` exactly. Exact matching is deliberate:
/// the per-type buckets must line up with the trained schema, so unknown
/// variants fall into no bucket at all.
pub(crate) fn count_text_eq(rows: &[PluginRow], column: &str, wanted: &str) -> i64 {
    rows.iter()
        .filter(|row| row.get_text(column) == Some(wanted))
        .count() as i64
}

/// Rows whose boolean column is an explicit false. Missing or malformed
/// flags count as neither true nor false.
pub(crate) fn count_flag_false(rows: &[PluginRow], column: &str) -> i64 {
    rows.iter()
        .filter(|row| row.get_flag(column) == Some(false))
        .count() as i64
}

/// `total / groups` with the empty-group case pinned to 0.0.
pub(crate) fn per_group_mean(total: usize, groups: usize) -> f64 {
    if groups == 0 {
        0.0
    } else {
        total as f64 / groups as f64
    }
}
