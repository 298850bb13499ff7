// Field extractors. Each one is a pure function over a DocumentText that
// returns the fields it is confident about.

pub mod address;
pub mod dates;
pub mod demographics;
pub mod id_number;
pub mod license_fields;
pub mod license_number;
pub mod mapping;
pub mod name;

use crate::models::{ClassifiedLine, DocumentRules, DocumentType, FieldMap};
use crate::processing::lines::classify_lines;

/// Everything an extractor may look at for one call.
#[derive(Debug, Clone)]
pub struct DocumentText {
    pub raw: String,
    pub lines: Vec<ClassifiedLine>,
    pub document_type: DocumentType,
}

impl DocumentText {
    pub fn new(raw: &str, document_type: DocumentType) -> Self {
        DocumentText {
            raw: raw.to_string(),
            lines: classify_lines(raw),
            document_type,
        }
    }

    pub fn rules(&self) -> &'static DocumentRules {
        self.document_type.rules()
    }

    pub fn line_texts(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(|l| l.text.as_str())
    }
}

/// Partial result of one extractor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    pub fields: FieldMap,
    /// The extractor found something it recognized.
    pub acted: bool,
}

impl Extraction {
    pub fn none() -> Self {
        Extraction::default()
    }

    pub fn from_fields(fields: FieldMap) -> Self {
        let acted = !fields.is_empty();
        Extraction { fields, acted }
    }

    pub fn single(name: &str, value: String) -> Self {
        let mut fields = FieldMap::new();
        fields.insert(name.to_string(), value);
        Self::from_fields(fields)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }
}

pub type ExtractorFn = fn(&DocumentText) -> Extraction;

/// Extractors in priority order. Earlier entries win on field collisions.
pub const PIPELINE: [(&str, ExtractorFn); 8] = [
    ("id_number", id_number::extract),
    ("name", name::extract),
    ("address", address::extract),
    ("dates", dates::extract),
    ("sex", demographics::extract_sex),
    ("nationality", demographics::extract_nationality),
    ("blood_type", demographics::extract_blood_type),
    ("license_fields", license_fields::extract),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_acted_tracks_fields() {
        assert!(!Extraction::none().acted);
        assert!(!Extraction::from_fields(FieldMap::new()).acted);
        let single = Extraction::single("sex", "M".to_string());
        assert!(single.acted);
        assert_eq!(single.get("sex"), Some("M"));
    }

    #[test]
    fn test_document_text_classifies_lines() {
        let doc = DocumentText::new("REPUBLIC OF THE PHILIPPINES\n\nSANTOS, MARIA REYES", DocumentType::Umid);
        assert_eq!(doc.lines.len(), 2);
        assert_eq!(doc.rules().id_field, "crnNumber");
        assert_eq!(doc.line_texts().last(), Some("SANTOS, MARIA REYES"));
    }
}
