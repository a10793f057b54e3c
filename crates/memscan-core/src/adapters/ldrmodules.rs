//! Module-load-state adapter.
//!
//! Each row carries three presence flags for one module: whether it appears
//! in the loader's load order, initialization order, and memory order lists.
//! A module missing from any of them is a classic unlinking artifact.

use crate::adapters::count_flag_false;
use crate::features::{FeatureFragment, FeatureValue};
use crate::row::PluginRow;

const PRESENCE_LISTS: &[(&str, &str, &str)] = &[
    ("ldrmodules.not_in_load", "ldrmodules.not_in_load_avg", "InLoad"),
    ("ldrmodules.not_in_init", "ldrmodules.not_in_init_avg", "InInit"),
    ("ldrmodules.not_in_mem", "ldrmodules.not_in_mem_avg", "InMem"),
];

pub fn adapt(rows: &[PluginRow]) -> FeatureFragment {
    let total = rows.len();

    let mut fragment = FeatureFragment::new();
    for &(count_key, ratio_key, column) in PRESENCE_LISTS {
        let missing = count_flag_false(rows, column);
        let ratio = if total == 0 {
            0.0
        } else {
            missing as f64 / total as f64
        };
        fragment.insert(count_key.into(), FeatureValue::Int(missing));
        fragment.insert(ratio_key.into(), FeatureValue::Float(ratio));
    }
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
        for (count_key, ratio_key, _) in PRESENCE_LISTS {
            assert_eq!(fragment[*count_key], FeatureValue::Int(0));
            assert_eq!(fragment[*ratio_key], FeatureValue::Float(0.0));
        }
    }

    #[test]
    fn counts_and_ratios_per_presence_list() {
        let fixture = rows(json!([
            {"InLoad": true,  "InInit": true,  "InMem": true},
            {"InLoad": false, "InInit": true,  "InMem": true},
            {"InLoad": false, "InInit": false, "InMem": true},
            {"InLoad": true,  "InInit": false, "InMem": true}
        ]));

        let fragment = adapt(&fixture);
        assert_eq!(fragment["ldrmodules.not_in_load"], FeatureValue::Int(2));
        assert_eq!(fragment["ldrmodules.not_in_init"], FeatureValue::Int(2));
        assert_eq!(fragment["ldrmodules.not_in_mem"], FeatureValue::Int(0));
        assert_eq!(
            fragment["ldrmodules.not_in_load_avg"],
            FeatureValue::Float(0.5)
        );
        assert_eq!(
            fragment["ldrmodules.not_in_mem_avg"],
            FeatureValue::Float(0.0)
        );
    }

    #[test]
    fn textual_flags_count_the_same() {
        let fixture = rows(json!([
            {"InLoad": "False", "InInit": "True", "InMem": "True"},
            {"InLoad": "True",  "InInit": "True", "InMem": "True"}
        ]));
        assert_eq!(
            adapt(&fixture)["ldrmodules.not_in_load"],
            FeatureValue::Int(1)
        );
    }
}
