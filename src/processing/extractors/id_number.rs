use super::license_number::extract_license_number;
use super::{DocumentText, Extraction};
use crate::models::rules::DOCUMENT_RULES;
use crate::models::{DocumentRules, DocumentType};
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;
use std::collections::HashMap;

/// Canonical field name; the aggregator renames it per document type.
pub const ID_NUMBER_FIELD: &str = "idNumber";

lazy_static! {
    static ref SCHEME_PATTERNS: HashMap<DocumentType, Regex> = DOCUMENT_RULES
        .iter()
        .filter_map(|rules| {
            rules
                .id_pattern
                .map(|p| (rules.document_type, Regex::new(&format!("(?i){}", p)).unwrap()))
        })
        .collect();

    static ref LABELED_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\bid[ \t]*(?:no\.?|number|#)[: \t]*([A-Z0-9][- \t0-9A-Z]+)").unwrap(),
        Regex::new(r"(?i)registration[ \t]*(?:no\.?|number|#)[: \t]*(\d{6,7})").unwrap(),
        Regex::new(r"(?i)\b(?:crn|pcn|psn)[: \t]*([A-Z0-9][- \t0-9A-Z]+)").unwrap(),
    ];

    static ref DIGIT_RUN: Regex = Regex::new(r"\d{6,}").unwrap();
}

/// Number in the document family's own numbering scheme.
pub fn match_scheme(text: &str, rules: &DocumentRules) -> Option<String> {
    let pattern = SCHEME_PATTERNS.get(&rules.document_type)?;
    pattern
        .captures_iter(text)
        .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim().to_string()))
        .find(|value| !rules.id_requires_digit || value.chars().any(|c| c.is_ascii_digit()))
}

/// Value printed after an "ID No." / "Registration No." / CRN / PCN / PSN label.
pub fn match_labeled(text: &str) -> Option<String> {
    LABELED_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .map(|caps| caps[1].trim().to_string())
            .filter(|value| !value.is_empty())
    })
}

/// Last resort: the first run of six or more digits.
pub fn match_digit_run(text: &str) -> Option<String> {
    DIGIT_RUN.find(text).map(|m| m.as_str().to_string())
}

pub fn extract_id_number(text: &str, rules: &DocumentRules) -> Option<String> {
    debug!("Parsing ID number for type: {}", rules.document_type);

    if rules.license_number {
        return extract_license_number(text);
    }

    let found = match_scheme(text, rules)
        .or_else(|| match_labeled(text))
        .or_else(|| match_digit_run(text));
    if let Some(number) = &found {
        info!("Found ID number: {}", number);
    }
    found
}

pub fn extract(doc: &DocumentText) -> Extraction {
    match extract_id_number(&doc.raw, doc.rules()) {
        Some(number) => Extraction::single(ID_NUMBER_FIELD, number),
        None => Extraction::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id_for(text: &str, doc_type: DocumentType) -> Option<String> {
        extract(&DocumentText::new(text, doc_type)).fields.remove(ID_NUMBER_FIELD)
    }

    #[test]
    fn test_national_id_groups() {
        let text = "PAMBANSANG PAGKAKAKILANLAN\n1234-5678-9012\nDELA CRUZ";
        assert_eq!(id_for(text, DocumentType::NationalId).as_deref(), Some("1234-5678-9012"));
    }

    #[test]
    fn test_national_id_rejects_longer_runs() {
        // 13 digits is not a 4-4-4 PCN; falls through to the digit run
        assert_eq!(id_for("1234567890123", DocumentType::NationalId).as_deref(), Some("1234567890123"));
        let rules = DocumentType::NationalId.rules();
        assert_eq!(match_scheme("1234 5678 9012 3456", rules), None);
        assert_eq!(match_scheme("0000-1234 5678 9012", rules), None);
        assert_eq!(match_scheme("PCN: 1234 5678 9012\nSex: Male", rules).as_deref(), Some("1234 5678 9012"));
    }

    #[test]
    fn test_sss_groups() {
        assert_eq!(id_for("SS No. 34-1234567-8", DocumentType::SssId).as_deref(), Some("34-1234567-8"));
    }

    #[test]
    fn test_passport_needs_a_digit() {
        let text = "REPUBLIKA NG PILIPINAS\nPASSPORT\nP1234567A";
        assert_eq!(id_for(text, DocumentType::Passport).as_deref(), Some("P1234567A"));
    }

    #[test]
    fn test_tin_groups() {
        assert_eq!(id_for("TIN 123-456-789-000", DocumentType::TinId).as_deref(), Some("123-456-789-000"));
    }

    #[test]
    fn test_labeled_fallback() {
        let text = "MEMBER\nCRN: 0028-1234567-9\n";
        assert_eq!(id_for(text, DocumentType::Unknown).as_deref(), Some("0028-1234567-9"));
    }

    #[test]
    fn test_digit_run_fallback() {
        assert_eq!(id_for("POSTAL\nREF 98765432", DocumentType::Unknown).as_deref(), Some("98765432"));
    }

    #[test]
    fn test_soft_miss() {
        assert_eq!(id_for("NO DIGITS AT ALL", DocumentType::PrcId), None);
        assert!(!extract(&DocumentText::new("", DocumentType::Umid)).acted);
    }

    #[test]
    fn test_drivers_license_uses_reconstruction() {
        assert_eq!(id_for("Ai2-23-OO3519", DocumentType::DriversLicense).as_deref(), Some("A12-23-003519"));
    }
}
