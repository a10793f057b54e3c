//! Process-list adapter.

use crate::adapters::{count_flag_false, distinct_count, numeric_mean};
use crate::features::{FeatureFragment, FeatureValue};
use crate::row::PluginRow;

/// Statistics over the naive process enumeration.
///
/// `nprocs64bit` counts processes whose `Wow64` flag is false: WOW64 marks a
/// 32-bit process on a 64-bit OS, so its inverse is the 64-bit count. Older
/// engine builds render the flag under `IsWow64`, so that column is the
/// fallback when no row carries `Wow64`.
pub fn adapt(rows: &[PluginRow]) -> FeatureFragment {
    let wow64_column = if rows.iter().any(|row| row.get_flag("Wow64").is_some()) {
        "Wow64"
    } else {
        "IsWow64"
    };

    let mut fragment = FeatureFragment::new();
    fragment.insert(
        "pslist.nproc".into(),
        FeatureValue::Int(rows.len() as i64),
    );
    fragment.insert(
        "pslist.nppid".into(),
        FeatureValue::Int(distinct_count(rows, "PPID") as i64),
    );
    fragment.insert(
        "pslist.avg_threads".into(),
        FeatureValue::Float(numeric_mean(rows, "Threads")),
    );
    fragment.insert(
        "pslist.nprocs64bit".into(),
        FeatureValue::Int(count_flag_false(rows, wow64_column)),
    );
    fragment
}
