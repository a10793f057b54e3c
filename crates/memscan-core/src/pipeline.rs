//! Pipeline orchestration with progress tracking for CLI and embedded use.
//!
//! One run processes one memory image: every configured plugin is invoked in
//! a fixed order, each success is reduced to a feature fragment, and failures
//! are contained per plugin — a dead plugin costs its own features, never the
//! run. The assembled record is appended to the dataset by the caller-owned
//! [`DatasetWriter`](crate::dataset::DatasetWriter).

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use serde::Serialize;

use crate::adapters;
use crate::dataset::DatasetWriter;
use crate::engine::AnalysisEngine;
use crate::error::ExtractError;
use crate::features::{FeatureFragment, FeatureRecord};
use crate::image::MemoryImage;
use crate::row::PluginRow;

/// One entry of the declarative plugin table.
#[derive(Clone, Copy)]
pub struct PluginSpec {
    /// Short identifier, also the feature-name namespace.
    pub id: &'static str,
    /// Full plugin path handed to the analysis engine.
    pub plugin: &'static str,
    /// Pure reduction from the plugin's rows to its feature fragment.
    pub adapt: fn(&[PluginRow]) -> FeatureFragment,
}

/// The canonical plugin set, in dispatch order. There is exactly one of
/// these tables; the dataset schema is derived from it.
pub const DEFAULT_PLUGINS: &[PluginSpec] = &[
    PluginSpec {
        id: "pslist",
        plugin: "windows.pslist.PsList",
        adapt: adapters::pslist::adapt,
    },
    PluginSpec {
        id: "dlllist",
        plugin: "windows.dlllist.DllList",
        adapt: adapters::dlllist::adapt,
    },
    PluginSpec {
        id: "handles",
        plugin: "windows.handles.Handles",
        adapt: adapters::handles::adapt,
    },
    PluginSpec {
        id: "ldrmodules",
        plugin: "windows.ldrmodules.LdrModules",
        adapt: adapters::ldrmodules::adapt,
    },
    PluginSpec {
        id: "malfind",
        plugin: "windows.malfind.Malfind",
        adapt: adapters::malfind::adapt,
    },
    PluginSpec {
        id: "modules",
        plugin: "windows.modules.Modules",
        adapt: adapters::modules::adapt,
    },
    PluginSpec {
        id: "svcscan",
        plugin: "windows.svcscan.SvcScan",
        adapt: adapters::svcscan::adapt,
    },
    PluginSpec {
        id: "callbacks",
        plugin: "windows.callbacks.Callbacks",
        adapt: adapters::callbacks::adapt,
    },
    PluginSpec {
        id: "psxview",
        plugin: "windows.psxview.PsXView",
        adapt: adapters::psxview::adapt,
    },
];

/// A recovered per-plugin failure. The plugin's features are absent from the
/// record; everything else in the run is unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginError {
    pub plugin: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Running,
    Finished,
    Failed,
}

/// One textual progress event. Callers may render, log, or discard these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub plugin: String,
    pub message: String,
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: &ProgressEvent);
}

/// Sink that discards every event.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: &ProgressEvent) {}
}

/// Atomic progress tracking — no Mutex contention with a polling front-end.
pub struct ExtractProgress {
    pub plugins_total: AtomicUsize,
    pub plugins_done: AtomicUsize,
    pub plugin_errors: AtomicUsize,
    pub cancel: AtomicBool,
}

impl ExtractProgress {
    pub fn new() -> Self {
        Self {
            plugins_total: AtomicUsize::new(0),
            plugins_done: AtomicUsize::new(0),
            plugin_errors: AtomicUsize::new(0),
            cancel: AtomicBool::new(false),
        }
    }
}

impl Default for ExtractProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of one orchestrated run: the (possibly partial) record plus every
/// per-plugin failure. An empty error list means a fully clean run.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineRun {
    pub record: FeatureRecord,
    pub errors: Vec<PluginError>,
}

/// Run every configured plugin against one image and assemble the record.
///
/// Plugins execute sequentially in table order. Cancellation is observed
/// between plugins and propagated into the in-flight engine call; a
/// cancelled run returns [`ExtractError::Cancelled`] and must not be
/// persisted.
pub fn run_pipeline(
    engine: &dyn AnalysisEngine,
    image: &MemoryImage,
    plugins: &[PluginSpec],
    sink: &dyn ProgressSink,
    progress: &ExtractProgress,
) -> Result<PipelineRun, ExtractError> {
    progress.plugins_total.store(plugins.len(), Ordering::Relaxed);

    let mut record = FeatureRecord::new();
    let mut errors = Vec::new();

    for spec in plugins {
        if progress.cancel.load(Ordering::Relaxed) {
            return Err(ExtractError::Cancelled);
        }

        sink.emit(&ProgressEvent {
            stage: Stage::Running,
            plugin: spec.id.to_string(),
            message: format!("running {}", spec.plugin),
        });

        match engine.run_plugin(image.path(), spec.plugin, &progress.cancel) {
            Ok(rows) => {
                record.merge((spec.adapt)(&rows));
                sink.emit(&ProgressEvent {
                    stage: Stage::Finished,
                    plugin: spec.id.to_string(),
                    message: format!("finished {} ({} rows)", spec.plugin, rows.len()),
                });
            }
            Err(err) => {
                // An engine error after cancellation is just the aborted
                // subprocess reporting in; don't record it as a plugin fault.
                if progress.cancel.load(Ordering::Relaxed) {
                    return Err(ExtractError::Cancelled);
                }
                let message = format!("{err:#}");
                progress.plugin_errors.fetch_add(1, Ordering::Relaxed);
                sink.emit(&ProgressEvent {
                    stage: Stage::Failed,
                    plugin: spec.id.to_string(),
                    message: format!("error in {}: {message}", spec.plugin),
                });
                errors.push(PluginError {
                    plugin: spec.id.to_string(),
                    message,
                });
            }
        }

        progress.plugins_done.fetch_add(1, Ordering::Relaxed);
    }

    record.stamp_identity(&image.name_extn());
    Ok(PipelineRun { record, errors })
}

/// Result of the full extract-and-persist entry point.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Dataset file the record was appended to.
    pub dataset_path: PathBuf,
    pub record: FeatureRecord,
    pub errors: Vec<PluginError>,
}

/// Pipeline entry point: run the canonical plugin set against one image and
/// append the record to the dataset.
///
/// Per-plugin failures come back in `errors`; only cancellation, schema
/// mismatch, and write failure are hard errors, and none of them leave a
/// partial row behind.
pub fn extract_features(
    engine: &dyn AnalysisEngine,
    image: &MemoryImage,
    writer: &DatasetWriter,
    sink: &dyn ProgressSink,
    progress: &ExtractProgress,
) -> Result<Extraction, ExtractError> {
    let run = run_pipeline(engine, image, DEFAULT_PLUGINS, sink, progress)?;
    writer.append(&run.record)?;
    Ok(Extraction {
        dataset_path: writer.path().to_path_buf(),
        record: run.record,
        errors: run.errors,
    })
}
