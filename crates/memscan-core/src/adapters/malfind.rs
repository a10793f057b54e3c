//! Code-injection adapter.

use crate::adapters::{count_text_eq, distinct_count, numeric_values};
use crate::features::{FeatureFragment, FeatureValue};
use crate::row::PluginRow;

/// Memory protection granting read, write, and execute at once — the
/// permission set injected shellcode regions typically carry.
const FULLY_PERMISSIVE: &str = "PAGE_EXECUTE_READWRITE";

pub fn adapt(rows: &[PluginRow]) -> FeatureFragment {
    // Non-numeric commit charges are skipped, not zero-filled; a zero-fill
    // would corrupt the sum the same way a bogus value would.
    let commit_charge: f64 = numeric_values(rows, "CommitCharge").sum();

    let mut fragment = FeatureFragment::new();
    fragment.insert(
        "malfind.ninjections".into(),
        FeatureValue::Int(rows.len() as i64),
    );
    fragment.insert(
        "malfind.commitCharge".into(),
        FeatureValue::Float(commit_charge),
    );
    fragment.insert(
        "malfind.protection".into(),
        FeatureValue::Int(count_text_eq(rows, "Protection", FULLY_PERMISSIVE)),
    );
    fragment.insert(
        "malfind.uniqueInjections".into(),
        FeatureValue::Int(distinct_count(rows, "PID") as i64),
    );
    fragment
}
