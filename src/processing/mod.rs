pub mod extractors;
pub mod lines;
pub mod normalizer;
pub mod recognizer;

pub use extractors::{DocumentText, Extraction, PIPELINE};
pub use lines::{assemble_text, classify_lines};
pub use recognizer::{StaticRecognizer, TextRecognizer};
