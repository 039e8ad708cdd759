use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// How the batch report is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!(
                "Invalid type: Expected (\"text\" | \"json\") but received \"{}\"",
                other
            )),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Text => f.write_str("text"),
            LogFormat::Json => f.write_str("json"),
        }
    }
}

/// Exactly what the user typed. `None` means the flag was not given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawCliOptions {
    pub out_dir: Option<String>,
    pub header: Option<String>,
    pub footer: Option<String>,
    pub remove_source: Option<bool>,
    pub hide_command: Option<bool>,
    pub log_format: Option<LogFormat>,
    pub quiet: Option<bool>,
    pub config: Option<String>,
}

/// Options read from a configuration file. Same fields as the CLI minus `config`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFileOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub header: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_source: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_command: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_format: Option<LogFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quiet: Option<bool>,
}

/// Represents the final options after merging CLI args, config file and defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingOptions {
    /// `None` writes each output next to its source file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub out_dir: Option<PathBuf>,
    pub header: String,
    pub footer: String,
    pub remove_source: bool,
    pub hide_command: bool,
    pub log_format: LogFormat,
    pub quiet: bool,
}

/// Result of converting one discovered file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionOutcome {
    #[serde(rename = "source")]
    pub source_path: PathBuf,
    #[serde(rename = "output")]
    pub output_path: PathBuf,
    #[serde(rename = "success")]
    pub converted: bool,
    #[serde(rename = "error", skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
}

impl ConversionOutcome {
    pub fn success(source_path: PathBuf, output_path: PathBuf) -> Self {
        Self {
            source_path,
            output_path,
            converted: true,
            failure_reason: None,
        }
    }

    pub fn failure(source_path: PathBuf, output_path: PathBuf, reason: String) -> Self {
        Self {
            source_path,
            output_path,
            converted: false,
            failure_reason: Some(reason),
        }
    }
}

/// Aggregated batch result. `outcomes` keeps file discovery order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchReport {
    #[serde(rename = "totalFiles")]
    pub total: usize,
    #[serde(rename = "successful")]
    pub succeeded: usize,
    pub failed: usize,
    #[serde(rename = "files")]
    pub outcomes: Vec<ConversionOutcome>,
}

impl BatchReport {
    pub fn from_outcomes(outcomes: Vec<ConversionOutcome>) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.converted).count();
        Self {
            total: outcomes.len(),
            succeeded,
            failed: outcomes.len() - succeeded,
            outcomes,
        }
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_follow_outcomes() {
        let report = BatchReport::from_outcomes(vec![
            ConversionOutcome::success("a.mmd".into(), "a.md".into()),
            ConversionOutcome::failure("b.mmd".into(), "b.md".into(), "denied".into()),
            ConversionOutcome::success("c.mmd".into(), "c.md".into()),
        ]);

        assert_eq!(report.total, 3);
        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert!(report.has_failures());
    }

    #[test]
    fn report_serializes_with_public_field_names() {
        let report = BatchReport::from_outcomes(vec![
            ConversionOutcome::success("a.mmd".into(), "a.md".into()),
            ConversionOutcome::failure("b.mmd".into(), "b.md".into(), "denied".into()),
        ]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["totalFiles"], 2);
        assert_eq!(json["successful"], 1);
        assert_eq!(json["failed"], 1);
        assert_eq!(json["files"][0]["source"], "a.mmd");
        assert_eq!(json["files"][0]["success"], true);
        assert!(json["files"][0].get("error").is_none());
        assert_eq!(json["files"][1]["error"], "denied");
    }

    #[test]
    fn log_format_parses_known_values_only() {
        assert_eq!("json".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("text".parse::<LogFormat>(), Ok(LogFormat::Text));
        assert!("xml".parse::<LogFormat>().unwrap_err().contains("\"xml\""));
    }
}
