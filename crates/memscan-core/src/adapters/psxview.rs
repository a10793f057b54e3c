//! Cross-view consistency adapter — the hidden-process detector.
//!
//! Each row is one process as seen by several independent enumeration
//! methods: the naive process list, a pool-tag scan of process objects, and
//! the csrss handle-table cross-reference. A process absent from a method it
//! should appear in is the hallmark of a rootkit unlinking itself.

use crate::adapters::count_flag_false;
use crate::features::{FeatureFragment, FeatureValue};
use crate::row::PluginRow;

const DETECTION_METHODS: &[(&str, &str, &str)] = &[
    (
        "psxview.not_in_pslist",
        "psxview.not_in_pslist_false_avg",
        "pslist",
    ),
    (
        "psxview.not_in_eprocess_pool",
        "psxview.not_in_eprocess_pool_false_avg",
        "psscan",
    ),
    (
        "psxview.not_in_csrss_handles",
        "psxview.not_in_csrss_handles_false_avg",
        "csrss",
    ),
];

pub fn adapt(rows: &[PluginRow]) -> FeatureFragment {
    // A method column the engine did not report says nothing about hiding,
    // so a missing flag counts as present. The denominator is pinned to at
    // least 1 so an empty view yields 0.0 ratios instead of dividing by zero.
    let total = rows.len().max(1) as f64;

    let mut fragment = FeatureFragment::new();
    for &(count_key, ratio_key, column) in DETECTION_METHODS {
        let absent = count_flag_false(rows, column);
        fragment.insert(count_key.into(), FeatureValue::Int(absent));
        fragment.insert(
            ratio_key.into(),
            FeatureValue::Float(absent as f64 / total),
        );
    }
    fragment
}
