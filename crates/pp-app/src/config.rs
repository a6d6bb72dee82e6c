//! Pipeline configuration.

use std::path::{Path, PathBuf};

use pp_core::{DEFAULT_AREA_ID, MalformedRecord};
use pp_parser::{Decision, ExtractConfig, PLACEHOLDER_SUMMARY_METRIC};
use pp_schema::DocumentFormat;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Headless answer to a malformed record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    #[default]
    Skip,
    Abort,
}

impl MalformedPolicy {
    pub fn decide(self, _record: &MalformedRecord) -> Decision {
        match self {
            Self::Skip => Decision::Continue,
            Self::Abort => Decision::Abort,
        }
    }
}

/// Settings for one pipeline run. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Area used when a block carries no `Area <n>`.
    pub default_area_id: String,
    /// Metric recorded for summary rows that carry none.
    pub summary_placeholder_metric: u32,
    /// Log the offending lines of every malformed record.
    pub show_skipped: bool,
    /// Used when the caller injects no decision hook.
    pub on_malformed: MalformedPolicy,
    /// Where the canonical document is written; `.json`, `.yaml` or `.yml`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_area_id: DEFAULT_AREA_ID.to_string(),
            summary_placeholder_metric: PLACEHOLDER_SUMMARY_METRIC,
            show_skipped: false,
            on_malformed: MalformedPolicy::Skip,
            export_path: None,
        }
    }
}

impl PipelineConfig {
    /// Load from a JSON file (`.json`) or YAML file (anything else).
    pub fn load(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| AppError::InputRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = match DocumentFormat::from_path(path) {
            Some(DocumentFormat::Json) => {
                serde_json::from_str(&content).map_err(|e| e.to_string())
            }
            _ => serde_yaml::from_str(&content).map_err(|e| e.to_string()),
        }
        .map_err(|message| AppError::Config {
            path: path.to_path_buf(),
            message,
        })?;
        Ok(config)
    }

    pub fn extract_config(&self) -> ExtractConfig {
        ExtractConfig {
            default_area_id: self.default_area_id.clone(),
            summary_placeholder_metric: self.summary_placeholder_metric,
        }
    }
}
