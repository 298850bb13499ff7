use crate::models::{RawRecognition, TextFragment};
use crate::utils::{ExtractorConfig, IdScanError};
use log::debug;

/// Turns image bytes into positioned text fragments.
pub trait TextRecognizer: Send + Sync {
    fn recognize(&self, image: &[u8]) -> Result<RawRecognition, IdScanError>;

    fn name(&self) -> &str;
}

/// Returns a fixed recognition regardless of the image. Used for replaying
/// saved OCR output.
#[derive(Debug, Clone, Default)]
pub struct StaticRecognizer {
    recognition: RawRecognition,
}

impl StaticRecognizer {
    pub fn new(recognition: RawRecognition) -> Self {
        StaticRecognizer { recognition }
    }
}

impl TextRecognizer for StaticRecognizer {
    fn recognize(&self, _image: &[u8]) -> Result<RawRecognition, IdScanError> {
        Ok(self.recognition.clone())
    }

    fn name(&self) -> &str {
        "static"
    }
}

/// Word-level fragments from Tesseract TSV output.
/// Columns: level page block par line word left top width height conf text
pub fn parse_tsv(tsv: &str) -> RawRecognition {
    let mut fragments = Vec::new();
    for row in tsv.lines() {
        let cols: Vec<&str> = row.split('\t').collect();
        if cols.len() < 12 || cols[0] != "5" {
            continue;
        }
        let numbers: Option<Vec<f32>> = cols[6..11].iter().map(|c| c.trim().parse::<f32>().ok()).collect();
        let numbers = match numbers {
            Some(n) => n,
            None => {
                debug!("Skipping malformed TSV row: {}", row);
                continue;
            }
        };
        let text = cols[11].trim();
        if text.is_empty() || numbers[4] < 0.0 {
            continue;
        }
        fragments.push(TextFragment::from_rect(
            text,
            numbers[0],
            numbers[1],
            numbers[2],
            numbers[3],
            numbers[4] / 100.0,
        ));
    }
    RawRecognition::new(fragments)
}

/// Names of the recognizers compiled into this build.
pub fn available_engines() -> Vec<&'static str> {
    let mut engines = vec!["static"];
    if cfg!(feature = "tesseract") {
        engines.push("tesseract");
    }
    engines
}

/// Default image recognizer for this build.
pub fn default_recognizer(config: &ExtractorConfig) -> Result<Box<dyn TextRecognizer>, IdScanError> {
    #[cfg(feature = "tesseract")]
    {
        Ok(Box::new(tesseract_engine::TesseractRecognizer::new(config)))
    }
    #[cfg(not(feature = "tesseract"))]
    {
        log::warn!("No OCR engine compiled in (language {})", config.language);
        Err(IdScanError::EngineUnavailable(
            "built without the `tesseract` feature".to_string(),
        ))
    }
}

#[cfg(feature = "tesseract")]
pub mod tesseract_engine {
    use super::{parse_tsv, TextRecognizer};
    use crate::models::RawRecognition;
    use crate::utils::{ExtractorConfig, IdScanError};
    use log::info;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tesseract::Tesseract;

    pub struct TesseractRecognizer {
        language: String,
        tessdata_path: Option<String>,
    }

    impl TesseractRecognizer {
        pub fn new(config: &ExtractorConfig) -> Self {
            TesseractRecognizer {
                language: config.language.clone(),
                tessdata_path: config.tessdata_path.clone(),
            }
        }
    }

    impl TextRecognizer for TesseractRecognizer {
        fn recognize(&self, image: &[u8]) -> Result<RawRecognition, IdScanError> {
            let mut temp_file = NamedTempFile::new()?;
            temp_file.write_all(image)?;
            let path = temp_file
                .path()
                .to_str()
                .ok_or_else(|| IdScanError::RecognitionError("Could not convert path to string".to_string()))?;

            let mut tess = Tesseract::new(self.tessdata_path.as_deref(), Some(self.language.as_str()))
                .map_err(|e| IdScanError::EngineUnavailable(format!("Failed to initialize Tesseract: {}", e)))?
                .set_image(path)
                .map_err(|e| IdScanError::RecognitionError(format!("Failed to set image: {}", e)))?
                .recognize()
                .map_err(|e| IdScanError::RecognitionError(format!("Recognition failed: {}", e)))?;

            let tsv = tess
                .get_tsv_text(0)
                .map_err(|e| IdScanError::RecognitionError(format!("Failed to read TSV output: {}", e)))?;

            let recognition = parse_tsv(&tsv);
            info!("Tesseract returned {} word fragments", recognition.fragments.len());
            Ok(recognition)
        }

        fn name(&self) -> &str {
            "tesseract"
        }
    }
}
