//! Feature values, fragments, records, and the canonical dataset schema.
//!
//! Every adapter reduces its plugin's rows to a small `FeatureFragment`
//! keyed by `<plugin>.<stat>` names. The orchestrator merges the fragments
//! of one image into a `FeatureRecord`; the dataset writer lays that record
//! out under [`CANONICAL_COLUMNS`], the fixed column order the downstream
//! classifier was trained on.

use std::collections::BTreeMap;
use std::fmt;

/// Column holding the source image's base filename, always last.
pub const IMAGE_NAME_COLUMN: &str = "mem.name_extn";

/// The fixed, ordered column set of the dataset. Adapters may only produce
/// keys listed here; the writer default-fills any key a degraded run lost.
pub const CANONICAL_COLUMNS: &[&str] = &[
    "pslist.nproc",
    "pslist.nppid",
    "pslist.avg_threads",
    "pslist.nprocs64bit",
    "dlllist.ndlls",
    "dlllist.avg_dlls_per_proc",
    "handles.nhandles",
    "handles.avg_handles_per_proc",
    "handles.nport",
    "handles.nfile",
    "handles.nevent",
    "handles.ndesktop",
    "handles.nkey",
    "handles.nthread",
    "handles.ndirectory",
    "handles.nsemaphore",
    "handles.ntimer",
    "handles.nsection",
    "handles.nmutant",
    "ldrmodules.not_in_load",
    "ldrmodules.not_in_init",
    "ldrmodules.not_in_mem",
    "ldrmodules.not_in_load_avg",
    "ldrmodules.not_in_init_avg",
    "ldrmodules.not_in_mem_avg",
    "malfind.ninjections",
    "malfind.commitCharge",
    "malfind.protection",
    "malfind.uniqueInjections",
    "modules.nmodules",
    "svcscan.nservices",
    "svcscan.kernel_drivers",
    "svcscan.fs_drivers",
    "svcscan.process_services",
    "svcscan.shared_process_services",
    "svcscan.interactive_process_services",
    "svcscan.nactive",
    "callbacks.ncallbacks",
    "callbacks.nanonymous",
    "callbacks.ngeneric",
    "psxview.not_in_pslist",
    "psxview.not_in_eprocess_pool",
    "psxview.not_in_csrss_handles",
    "psxview.not_in_pslist_false_avg",
    "psxview.not_in_eprocess_pool_false_avg",
    "psxview.not_in_csrss_handles_false_avg",
    IMAGE_NAME_COLUMN,
];

/// One scalar summary statistic.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureValue {
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Int(v) => write!(f, "{v}"),
            FeatureValue::Float(v) => write!(f, "{v}"),
            FeatureValue::Text(v) => write!(f, "{v}"),
        }
    }
}

/// The statistics one adapter derived from one plugin's rows. Keys are
/// namespaced by the producing plugin, so fragments never collide.
pub type FeatureFragment = BTreeMap<String, FeatureValue>;

/// The full feature set for one memory image.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureRecord {
    values: BTreeMap<String, FeatureValue>,
}

impl FeatureRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge one adapter's fragment. Fragment namespaces are disjoint, so
    /// merge order cannot change the result.
    pub fn merge(&mut self, fragment: FeatureFragment) {
        self.values.extend(fragment);
    }

    /// Stamp the mandatory identity field with the image's base filename.
    pub fn stamp_identity(&mut self, name_extn: &str) {
        self.values.insert(
            IMAGE_NAME_COLUMN.to_string(),
            FeatureValue::Text(name_extn.to_string()),
        );
    }

    pub fn get(&self, key: &str) -> Option<&FeatureValue> {
        self.values.get(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
