use crate::utils::IdScanError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Settings for turning raw recognitions into text and for the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    /// Fragments at or below this confidence are discarded.
    pub min_fragment_confidence: f32,
    /// Join fragments on one row when their vertical centers differ by less
    /// than this fraction of the row height. Zero keeps one fragment per line.
    pub row_merge_tolerance: f32,
    /// Tesseract language code.
    pub language: String,
    /// Tesseract data directory; engine default when absent.
    pub tessdata_path: Option<String>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            min_fragment_confidence: 0.2,
            row_merge_tolerance: 0.5,
            language: "eng".to_string(),
            tessdata_path: None,
        }
    }
}

impl ExtractorConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, IdScanError> {
        let contents = std::fs::read_to_string(&path)?;
        let config: ExtractorConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), IdScanError> {
        if !(0.0..=1.0).contains(&self.min_fragment_confidence) {
            return Err(IdScanError::ConfigError(format!(
                "min_fragment_confidence must be within [0, 1], got {}",
                self.min_fragment_confidence
            )));
        }
        if self.row_merge_tolerance < 0.0 {
            return Err(IdScanError::ConfigError(format!(
                "row_merge_tolerance must not be negative, got {}",
                self.row_merge_tolerance
            )));
        }
        if self.language.trim().is_empty() {
            return Err(IdScanError::ConfigError("language must not be empty".to_string()));
        }
        Ok(())
    }
}
