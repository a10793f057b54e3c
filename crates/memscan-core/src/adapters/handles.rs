//! Handle-table adapter.

use crate::adapters::{count_text_eq, distinct_count, per_group_mean};
use crate::features::{FeatureFragment, FeatureValue};
use crate::row::PluginRow;

/// The enumerated object types with their own buckets. Types outside this
/// set are excluded from every bucket rather than summed into an "other"
/// column, matching the schema the classifier was trained on.
const HANDLE_TYPES: &[(&str, &str)] = &[
    ("handles.nport", "Port"),
    ("handles.nfile", "File"),
    ("handles.nevent", "Event"),
    ("handles.ndesktop", "Desktop"),
    ("handles.nkey", "Key"),
    ("handles.nthread", "Thread"),
    ("handles.ndirectory", "Directory"),
    ("handles.nsemaphore", "Semaphore"),
    ("handles.ntimer", "Timer"),
    ("handles.nsection", "Section"),
    ("handles.nmutant", "Mutant"),
];

pub fn adapt(rows: &[PluginRow]) -> FeatureFragment {
    let nprocs = distinct_count(rows, "PID");

    let mut fragment = FeatureFragment::new();
    fragment.insert(
        "handles.nhandles".into(),
        FeatureValue::Int(rows.len() as i64),
    );
    fragment.insert(
        "handles.avg_handles_per_proc".into(),
        FeatureValue::Float(per_group_mean(rows.len(), nprocs)),
    );
    for &(feature, object_type) in HANDLE_TYPES {
        fragment.insert(
            feature.into(),
            FeatureValue::Int(count_text_eq(rows, "Type", object_type)),
        );
    }
    fragment
}
