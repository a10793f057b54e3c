//! Analysis-engine boundary and the Volatility3 subprocess implementation.
//!
//! The pipeline treats the engine as opaque: a plugin name goes in, rows come
//! out, and any failure is just text. `VolatilityEngine` shells out to a
//! Volatility3 installation (`python vol.py -f <image> -r=json <plugin>`)
//! and parses the rendered JSON tree into flat [`PluginRow`]s.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::Value as Json;

use crate::row::PluginRow;

/// How often the subprocess is polled for exit or cancellation.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Boundary to the memory-forensics engine that walks OS kernel structures.
///
/// Implementations must honor `cancel`: once it flips, the call should stop
/// the underlying work and return an error promptly, since a single plugin
/// can scan a multi-gigabyte image for tens of seconds.
pub trait AnalysisEngine: Send + Sync {
    fn run_plugin(&self, image: &Path, plugin: &str, cancel: &AtomicBool)
        -> Result<Vec<PluginRow>>;
}

/// Runs plugins through an external Volatility3 installation.
#[derive(Debug, Clone)]
pub struct VolatilityEngine {
    python: PathBuf,
    vol_script: PathBuf,
}

impl VolatilityEngine {
    pub fn new(python: impl Into<PathBuf>, vol_script: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
            vol_script: vol_script.into(),
        }
    }
}

impl AnalysisEngine for VolatilityEngine {
    fn run_plugin(
        &self,
        image: &Path,
        plugin: &str,
        cancel: &AtomicBool,
    ) -> Result<Vec<PluginRow>> {
        let mut child = Command::new(&self.python)
            .arg(&self.vol_script)
            .arg("-f")
            .arg(image)
            .arg("-r=json")
            .arg(plugin)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| {
                format!(
                    "cannot launch {} {}",
                    self.python.display(),
                    self.vol_script.display()
                )
            })?;

        // Drain both pipes off-thread so a chatty plugin cannot fill a pipe
        // buffer and deadlock against our poll loop.
        let stdout_reader = drain(child.stdout.take());
        let stderr_reader = drain(child.stderr.take());

        let status = loop {
            if cancel.load(Ordering::Relaxed) {
                let _ = child.kill();
                let _ = child.wait();
                bail!("{plugin} cancelled");
            }
            match child.try_wait().context("cannot poll volatility process")? {
                Some(status) => break status,
                None => std::thread::sleep(POLL_INTERVAL),
            }
        };

        let stdout = join_drained(stdout_reader);
        let stderr = join_drained(stderr_reader);

        if !status.success() {
            bail!("{plugin} failed ({status}): {}", last_line(&stderr));
        }

        parse_rows(&stdout).with_context(|| format!("{plugin} produced unparseable output"))
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> Option<std::thread::JoinHandle<String>> {
    pipe.map(|mut stream| {
        std::thread::spawn(move || {
            let mut buf = String::new();
            let _ = stream.read_to_string(&mut buf);
            buf
        })
    })
}

fn join_drained(reader: Option<std::thread::JoinHandle<String>>) -> String {
    reader
        .and_then(|handle| handle.join().ok())
        .unwrap_or_default()
}

// Volatility prints progress noise before the actual failure reason; the
// last stderr line is the useful one.
fn last_line(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed.lines().next_back().unwrap_or(trimmed)
}

/// Parse a Volatility3 JSON render into flat rows. The renderer emits a tree
/// where each node may carry nested rows under `"__children"`; those count as
/// real rows and are flattened in.
pub fn parse_rows(output: &str) -> Result<Vec<PluginRow>> {
    let value: Json = serde_json::from_str(output.trim())?;
    let Some(nodes) = value.as_array() else {
        bail!("expected a JSON array of rows");
    };
    let mut rows = Vec::new();
    flatten_tree(nodes, &mut rows);
    Ok(rows)
}

fn flatten_tree(nodes: &[Json], rows: &mut Vec<PluginRow>) {
    for node in nodes {
        let row = PluginRow::from_json(node);
        if !row.is_empty() {
            rows.push(row);
        }
        if let Some(children) = node.get("__children").and_then(Json::as_array) {
            flatten_tree(children, rows);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_rows_flattens_children() {
        let output = json!([
            {
                "PID": 4, "PPID": 0, "ImageFileName": "System",
                "__children": [
                    {"PID": 108, "PPID": 4, "ImageFileName": "Registry", "__children": []}
                ]
            },
            {"PID": 356, "PPID": 4, "ImageFileName": "smss.exe", "__children": []}
        ])
        .to_string();

        let rows = parse_rows(&output).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].get_number("PID"), Some(108.0));
        assert_eq!(rows[2].get_text("ImageFileName"), Some("smss.exe"));
    }

    #[test]
    fn parse_rows_rejects_non_array_output() {
        assert!(parse_rows("{\"error\": \"nope\"}").is_err());
        assert!(parse_rows("not json at all").is_err());
    }

    #[test]
    fn parse_rows_accepts_empty_output() {
        let rows = parse_rows("[]").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn missing_interpreter_is_an_engine_error() {
        let engine = VolatilityEngine::new("/nonexistent/python3", "/nonexistent/vol.py");
        let cancel = AtomicBool::new(false);
        let result = engine.run_plugin(
            Path::new("/tmp/missing.raw"),
            "windows.pslist.PsList",
            &cancel,
        );
        assert!(result.is_err());
    }

    #[test]
    fn last_line_prefers_the_final_stderr_line() {
        assert_eq!(last_line("progress...\nTraceback: boom"), "Traceback: boom");
        assert_eq!(last_line("  single  "), "single");
        assert_eq!(last_line(""), "");
    }
}
