//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::coerce::dates::GENERIC_DATE_FORMATS;
use crate::error::{BilltrackError, Result};
use crate::models::record::PaymentStatus;

/// Main configuration for the billtrack pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BilltrackConfig {
    /// Supplier classifier configuration.
    pub classifier: ClassifierConfig,

    /// Record normalization configuration.
    pub normalizer: NormalizerConfig,

    /// PDF text-layer configuration.
    pub pdf: PdfConfig,

    /// Language-model fallback configuration.
    pub fallback: FallbackConfig,
}

/// Thresholds for fuzzy supplier classification (0 - 100).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum partial-ratio score to accept an invoice layout.
    pub invoice_threshold: f64,

    /// Minimum partial-ratio score to accept a statement layout.
    pub statement_threshold: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            invoice_threshold: 85.0,
            statement_threshold: 70.0,
        }
    }
}

/// Record normalization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizerConfig {
    /// chrono formats tried, in order, on every date field.
    pub date_formats: Vec<String>,

    /// Status assigned to freshly extracted records.
    pub default_status: PaymentStatus,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            date_formats: GENERIC_DATE_FORMATS.iter().map(|f| f.to_string()).collect(),
            default_status: PaymentStatus::Unpaid,
        }
    }
}

/// PDF text-layer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PdfConfig {
    /// Minimum text length to consider the PDF text-based.
    pub min_text_length: usize,

    /// Cap on characters handed to the pipeline per document (0 = unlimited).
    pub max_text_chars: usize,
}

impl Default for PdfConfig {
    fn default() -> Self {
        Self {
            min_text_length: 20,
            max_text_chars: 0,
        }
    }
}

/// Language-model fallback configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    /// Allow the fallback when no layout matches.
    pub enabled: bool,

    /// OpenAI-compatible chat completions endpoint.
    pub endpoint: String,

    /// Models tried in order until one answers.
    pub models: Vec<String>,

    /// Environment variable holding the API key.
    pub api_key_env: String,

    /// Document characters included in the prompt.
    pub max_prompt_chars: usize,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
            models: vec!["gpt-4-turbo".to_string(), "gpt-3.5-turbo".to_string()],
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_prompt_chars: 4000,
            timeout_secs: 60,
        }
    }
}

impl BilltrackConfig {
    /// Load configuration from a JSON file and check it.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| BilltrackError::Config(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        self.validate()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the pipeline cannot work with.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("classifier.invoice_threshold", self.classifier.invoice_threshold),
            ("classifier.statement_threshold", self.classifier.statement_threshold),
        ] {
            if !(0.0..=100.0).contains(&value) {
                return Err(BilltrackError::Config(format!(
                    "{} must be between 0 and 100, got {}",
                    name, value
                )));
            }
        }

        if self.normalizer.date_formats.is_empty() {
            return Err(BilltrackError::Config(
                "normalizer.date_formats must list at least one format".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: BilltrackConfig =
            serde_json::from_str(r#"{ "classifier": { "invoice_threshold": 90 } }"#).unwrap();

        assert_eq!(config.classifier.invoice_threshold, 90.0);
        assert_eq!(config.classifier.statement_threshold, 70.0);
        assert_eq!(config.normalizer.default_status, PaymentStatus::Unpaid);
        assert!(!config.fallback.enabled);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = BilltrackConfig::default();
        config.fallback.max_prompt_chars = 1000;
        config.save(&path).unwrap();

        let loaded = BilltrackConfig::from_file(&path).unwrap();
        assert_eq!(loaded.fallback.max_prompt_chars, 1000);
        assert_eq!(loaded.normalizer.date_formats, config.normalizer.date_formats);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = BilltrackConfig::from_file(&path).unwrap_err();
        assert!(matches!(err, BilltrackError::Config(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = BilltrackConfig::from_file(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, BilltrackError::Io(_)));
    }

    #[test]
    fn test_out_of_range_threshold_rejected() {
        let mut config = BilltrackConfig::default();
        config.classifier.statement_threshold = 150.0;

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("classifier.statement_threshold"));

        let dir = tempfile::tempdir().unwrap();
        assert!(config.save(&dir.path().join("config.json")).is_err());
    }

    #[test]
    fn test_empty_date_formats_rejected() {
        let mut config = BilltrackConfig::default();
        config.normalizer.date_formats.clear();
        assert!(matches!(config.validate(), Err(BilltrackError::Config(_))));
    }
}
