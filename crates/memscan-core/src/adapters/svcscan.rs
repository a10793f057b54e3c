//! Services adapter.

use crate::adapters::count_text_eq;
use crate::features::{FeatureFragment, FeatureValue};
use crate::row::PluginRow;

const SERVICE_TYPES: &[(&str, &str)] = &[
    ("svcscan.kernel_drivers", "SERVICE_KERNEL_DRIVER"),
    ("svcscan.fs_drivers", "SERVICE_FILE_SYSTEM_DRIVER"),
    ("svcscan.process_services", "SERVICE_WIN32_OWN_PROCESS"),
    ("svcscan.shared_process_services", "SERVICE_WIN32_SHARE_PROCESS"),
];

pub fn adapt(rows: &[PluginRow]) -> FeatureFragment {
    let mut fragment = FeatureFragment::new();
    fragment.insert(
        "svcscan.nservices".into(),
        FeatureValue::Int(rows.len() as i64),
    );
    for &(feature, service_type) in SERVICE_TYPES {
        fragment.insert(
            feature.into(),
            FeatureValue::Int(count_text_eq(rows, "Type", service_type)),
        );
    }
    // Interactive services combine with another type flag, so this one is a
    // substring match rather than an exact one.
    let interactive = rows
        .iter()
        .filter(|row| {
            row.get_text("Type")
                .map(|t| t.contains("INTERACTIVE_PROCESS"))
                .unwrap_or(false)
        })
        .count() as i64;
    fragment.insert(
        "svcscan.interactive_process_services".into(),
        FeatureValue::Int(interactive),
    );
    fragment.insert(
        "svcscan.nactive".into(),
        FeatureValue::Int(count_text_eq(rows, "State", "SERVICE_RUNNING")),
    );
    fragment
}
