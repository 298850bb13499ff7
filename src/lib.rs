pub mod id_extractor;
pub mod models;
pub mod processing;
pub mod utils;

pub use id_extractor::IdExtractor;
pub use models::{DocumentType, ExtractionResult, FieldMap, RawRecognition, TextFragment};
pub use processing::extractors::mapping::FieldMapping;
pub use utils::{ExtractorConfig, IdScanError};
