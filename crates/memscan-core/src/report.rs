//! Output formatting for extraction results.

use std::path::PathBuf;

use serde::Serialize;

use crate::pipeline::PluginError;

/// Outcome of one image's run, for human or machine consumption.
#[derive(Debug, Clone, Serialize)]
pub struct ImageOutcome {
    pub image: PathBuf,
    /// Number of feature values present in the record (identity included).
    pub features: usize,
    pub row_written: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub plugin_errors: Vec<PluginError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {s}. Use 'text' or 'json'.")),
        }
    }
}

pub fn print_results(outcomes: &[ImageOutcome], format: OutputFormat) {
    match format {
        OutputFormat::Text => print_text(outcomes),
        OutputFormat::Json => print_json(outcomes),
    }
}

fn print_text(outcomes: &[ImageOutcome]) {
    let failed: Vec<_> = outcomes.iter().filter(|o| o.error.is_some()).collect();
    let degraded: Vec<_> = outcomes
        .iter()
        .filter(|o| o.error.is_none() && !o.plugin_errors.is_empty())
        .collect();
    let clean = outcomes.len() - failed.len() - degraded.len();

    println!("\n{}", "=".repeat(70));
    println!("EXTRACTION RESULTS");
    println!("{}", "=".repeat(70));

    if !degraded.is_empty() {
        println!("\nDEGRADED IMAGES ({}):", degraded.len());
        for o in &degraded {
            println!(
                "  [{} plugin errors] {}",
                o.plugin_errors.len(),
                o.image.display()
            );
            for e in &o.plugin_errors {
                println!("      {} -- {}", e.plugin, e.message);
            }
        }
    }

    if !failed.is_empty() {
        println!("\nFAILED IMAGES ({}):", failed.len());
        for o in &failed {
            let err = o.error.as_deref().unwrap_or("unknown");
            println!("  [ERR ] {} -- {}", o.image.display(), err);
        }
    }

    println!("\nSUMMARY:");
    println!("  Total images:        {}", outcomes.len());
    println!("  Clean:               {clean}");
    println!("  Degraded:            {}", degraded.len());
    println!("  Failed:              {}", failed.len());
    println!("{}", "=".repeat(70));
}

fn print_json(outcomes: &[ImageOutcome]) {
    let output = serde_json::json!({
        "results": outcomes,
        "summary": {
            "total": outcomes.len(),
            "clean": outcomes
                .iter()
                .filter(|o| o.error.is_none() && o.plugin_errors.is_empty())
                .count(),
            "degraded": outcomes
                .iter()
                .filter(|o| o.error.is_none() && !o.plugin_errors.is_empty())
                .count(),
            "failed": outcomes.iter().filter(|o| o.error.is_some()).count(),
        }
    });
    println!("{}", serde_json::to_string_pretty(&output).unwrap_or_default());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_format_parses_case_insensitively() {
        assert_eq!("TEXT".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("json".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("xml".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn outcome_serializes_to_json() {
        let outcome = ImageOutcome {
            image: PathBuf::from("/dumps/sample.raw"),
            features: 47,
            row_written: true,
            plugin_errors: vec![PluginError {
                plugin: "handles".into(),
                message: "symbol table not found".into(),
            }],
            sha256: None,
            error: None,
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["features"], 47);
        assert_eq!(json["row_written"], true);
        assert_eq!(json["plugin_errors"][0]["plugin"], "handles");
        assert!(json.get("sha256").is_none());
        assert!(json.get("error").is_none());
    }

    #[test]
    fn clean_outcome_omits_empty_error_list() {
        let outcome = ImageOutcome {
            image: PathBuf::from("/dumps/clean.raw"),
            features: 47,
            row_written: true,
            plugin_errors: Vec::new(),
            sha256: Some("abc123".into()),
            error: None,
        };

        let json = serde_json::to_value(&outcome).unwrap();
        assert!(json.get("plugin_errors").is_none());
        assert_eq!(json["sha256"], "abc123");
    }
}
