//! Loaded-modules (DLL list) adapter.

use crate::adapters::{distinct_count, per_group_mean};
use crate::features::{FeatureFragment, FeatureValue};
use crate::row::PluginRow;

pub fn adapt(rows: &[PluginRow]) -> FeatureFragment {
    let nprocs = distinct_count(rows, "PID");

    let mut fragment = FeatureFragment::new();
    fragment.insert(
        "dlllist.ndlls".into(),
        FeatureValue::Int(rows.len() as i64),
    );
    fragment.insert(
        "dlllist.avg_dlls_per_proc".into(),
        FeatureValue::Float(per_group_mean(rows.len(), nprocs)),
    );
    fragment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::fixtures::rows;
    use serde_json::json;

    #[test]
    fn empty_rows_yield_documented_defaults() {
        let fragment = adapt(&[]);
        assert_eq!(fragment["dlllist.ndlls"], FeatureValue::Int(0));
        assert_eq!(
            fragment["dlllist.avg_dlls_per_proc"],
            FeatureValue::Float(0.0)
        );
    }

    #[test]
    fn averages_over_distinct_processes() {
        let fixture = rows(json!([
            {"PID": 100, "Name": "ntdll.dll"},
            {"PID": 100, "Name": "kernel32.dll"},
            {"PID": 100, "Name": "user32.dll"},
            {"PID": 200, "Name": "ntdll.dll"}
        ]));

        let fragment = adapt(&fixture);
        assert_eq!(fragment["dlllist.ndlls"], FeatureValue::Int(4));
        assert_eq!(
            fragment["dlllist.avg_dlls_per_proc"],
            FeatureValue::Float(2.0)
        );
    }

    #[test]
    fn rows_without_pids_guard_the_divide() {
        let fixture = rows(json!([{"Name": "orphan.dll"}]));
        let fragment = adapt(&fixture);
        assert_eq!(fragment["dlllist.ndlls"], FeatureValue::Int(1));
        assert_eq!(
            fragment["dlllist.avg_dlls_per_proc"],
            FeatureValue::Float(0.0)
        );
    }
}
