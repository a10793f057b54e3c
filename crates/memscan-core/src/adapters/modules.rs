//! Kernel-modules adapter.

use crate::features::{FeatureFragment, FeatureValue};
use crate::row::PluginRow;

pub fn adapt(rows: &[PluginRow]) -> FeatureFragment {
    let mut fragment = FeatureFragment::new();
    fragment.insert(
        "modules.nmodules".into(),
        FeatureValue::Int(rows.len() as i64),
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
        assert_eq!(adapt(&[])["modules.nmodules"], FeatureValue::Int(0));
    }

    #[test]
    fn counts_every_row() {
        let fixture = rows(json!([
            {"Base": "0xf80000000000", "Name": "ntoskrnl.exe"},
            {"Base": "0xf80000400000", "Name": "hal.dll"}
        ]));
        assert_eq!(adapt(&fixture)["modules.nmodules"], FeatureValue::Int(2));
    }
}
