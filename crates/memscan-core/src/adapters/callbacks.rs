//! Kernel-callbacks adapter.

use crate::adapters::count_text_eq;
use crate::features::{FeatureFragment, FeatureValue};
use crate::row::PluginRow;

pub fn adapt(rows: &[PluginRow]) -> FeatureFragment {
    let mut fragment = FeatureFragment::new();
    fragment.insert(
        "callbacks.ncallbacks".into(),
        FeatureValue::Int(rows.len() as i64),
    );
    // Callbacks the engine cannot attribute to a loaded module are the
    // interesting ones; legitimate drivers resolve to a module name.
    fragment.insert(
        "callbacks.nanonymous".into(),
        FeatureValue::Int(count_text_eq(rows, "Module", "UNKNOWN")),
    );
    fragment.insert(
        "callbacks.ngeneric".into(),
        FeatureValue::Int(count_text_eq(rows, "Type", "GenericKernelCallback")),
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
        assert_eq!(fragment["callbacks.ncallbacks"], FeatureValue::Int(0));
        assert_eq!(fragment["callbacks.nanonymous"], FeatureValue::Int(0));
        assert_eq!(fragment["callbacks.ngeneric"], FeatureValue::Int(0));
    }

    #[test]
    fn counts_anonymous_and_generic_callbacks() {
        let fixture = rows(json!([
            {"Type": "GenericKernelCallback", "Module": "UNKNOWN"},
            {"Type": "GenericKernelCallback", "Module": "ntoskrnl.exe"},
            {"Type": "IoRegisterShutdownNotification", "Module": "ndis.sys"}
        ]));

        let fragment = adapt(&fixture);
        assert_eq!(fragment["callbacks.ncallbacks"], FeatureValue::Int(3));
        assert_eq!(fragment["callbacks.nanonymous"], FeatureValue::Int(1));
        assert_eq!(fragment["callbacks.ngeneric"], FeatureValue::Int(2));
    }
}
