use crate::models::*;
use crate::processing::extractors::id_number::ID_NUMBER_FIELD;
use crate::processing::extractors::mapping::{apply_mapping, FieldMapping};
use crate::processing::*;
use crate::utils::{ExtractorConfig, IdScanError};
use log::{debug, info};

/// Turns OCR output for one ID card into named fields.
///
/// Holds no per-call state, so one instance can serve concurrent requests.
#[derive(Debug, Clone, Default)]
pub struct IdExtractor {
    config: ExtractorConfig,
}

impl IdExtractor {
    pub fn new() -> Self {
        IdExtractor::default()
    }

    pub fn with_config(config: ExtractorConfig) -> Self {
        IdExtractor { config }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    // Main extraction function that runs every field extractor over the text
    pub fn extract(
        &self,
        raw_text: &str,
        document_type: DocumentType,
        mapping: Option<&FieldMapping>,
    ) -> ExtractionResult {
        if raw_text.trim().is_empty() {
            debug!("Empty OCR text, nothing to extract");
            return ExtractionResult::empty(raw_text);
        }

        // Step 1: Split and classify the lines
        let doc = DocumentText::new(raw_text, document_type);

        // Step 2: Run the extractors, earlier ones win on collisions
        let mut fields = FieldMap::new();
        for (name, extractor) in PIPELINE.iter() {
            let extraction = extractor(&doc);
            if !extraction.acted {
                continue;
            }
            debug!("Extractor {} produced {} field(s)", name, extraction.fields.len());
            for (key, value) in extraction.fields {
                fields.entry(key).or_insert(value);
            }
        }

        // Step 3: Publish under the document family's field names
        let mut fields = publish_fields(fields, doc.rules());

        // Step 4: Caller-supplied keywords fill whatever is still missing
        if let Some(mapping) = mapping {
            apply_mapping(&doc, mapping, &mut fields);
        }

        let result = ExtractionResult::new(raw_text, fields);
        info!(
            "Extracted {} field(s) from {} text (confidence {:.2})",
            result.extracted_fields.len(),
            document_type,
            result.confidence
        );
        result
    }

    /// Extract from positioned fragments, assembling them into lines first.
    pub fn extract_recognition(
        &self,
        recognition: &RawRecognition,
        document_type: DocumentType,
        mapping: Option<&FieldMapping>,
    ) -> ExtractionResult {
        let text = assemble_text(recognition, &self.config);
        self.extract(&text, document_type, mapping)
    }

    /// Recognize an image and extract from the result.
    pub fn scan(
        &self,
        recognizer: &dyn TextRecognizer,
        image: &[u8],
        document_type: DocumentType,
        mapping: Option<&FieldMapping>,
    ) -> Result<ExtractionResult, IdScanError> {
        info!("Recognizing {} byte image with {}", image.len(), recognizer.name());
        let recognition = recognizer.recognize(image)?;
        Ok(self.extract_recognition(&recognition, document_type, mapping))
    }
}

fn publish_fields(mut fields: FieldMap, rules: &DocumentRules) -> FieldMap {
    if let Some(number) = fields.remove(ID_NUMBER_FIELD) {
        fields.insert(rules.id_field.to_string(), number);
    }

    match rules.name_schema {
        NameSchema::Standard => {}
        NameSchema::PhilSys => {
            if let Some(first) = fields.remove("firstName") {
                fields.insert("givenName".to_string(), first);
            }
        }
        NameSchema::Passport => {
            if let Some(last) = fields.remove("lastName") {
                fields.insert("surname".to_string(), last);
            }
            let given: Vec<String> = [fields.remove("firstName"), fields.remove("middleName")]
                .into_iter()
                .flatten()
                .collect();
            if !given.is_empty() {
                fields.insert("givenNames".to_string(), given.join(" "));
            }
        }
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const LICENSE: &str = "REPUBLIC OF THE PHILIPPINES
DEPARTMENT OF TRANSPORTATION
LAND TRANSPORTATION OFFICE
DRIVER'S LICENSE
Last Name, First Name, Middle Name
DELA CRUZ, JUAN BAUTISTA SANTOS
Nationality Sex Date of Birth
PHL M 1990/01/15
Weight (kg): 70 Height (m): 1.65
Address
133, -, Roxas Boulevard (POB)
San Carlos City
Pangasinan
2420
License No. Expiration Date Agency Code
A12-23-003519 2030/01/15 A12
Blood Type: O+
Eyes Color: BLACK
DL Codes
B,B1,B2
Conditions: NONE";

    const NATIONAL_ID: &str = "REPUBLIKA NG PILIPINAS
PHILIPPINE IDENTIFICATION CARD
PCN 1234-5678-9012
DELA CRUZ, JUAN SANTOS
Sex: Male
Date of Birth: JANUARY 15, 1990
Address: 12 Rizal St, Brgy Malinta, Valenzuela City, 1440";

    const PASSPORT: &str = "REPUBLIKA NG PILIPINAS
PASSPORT
P1234567A
SANTOS, MARIA CLARA REYES
Sex: F
Date of Birth 15 JAN 1985
Date of Issue 01 MAR 2020
Valid Until 01 MAR 2030";

    fn field<'a>(result: &'a ExtractionResult, name: &str) -> Option<&'a str> {
        result.extracted_fields.get(name).map(String::as_str)
    }

    #[test]
    fn test_full_license() {
        let result = IdExtractor::new().extract(LICENSE, DocumentType::DriversLicense, None);
        let expected = [
            ("licenseNumber", "A12-23-003519"),
            ("lastName", "DELA CRUZ"),
            ("firstName", "JUAN BAUTISTA"),
            ("middleName", "SANTOS"),
            ("streetAddress", "133"),
            ("barangay", "Roxas Boulevard"),
            ("city", "San Carlos City"),
            ("province", "Pangasinan"),
            ("postalCode", "2420"),
            ("dateOfBirth", "1990/01/15"),
            ("expiryDate", "2030/01/15"),
            ("sex", "M"),
            ("nationality", "PHL"),
            ("bloodType", "O+"),
            ("dlCodes", "B,B1,B2"),
            ("agencyCode", "A12"),
            ("conditions", "NONE"),
            ("eyesColor", "BLACK"),
            ("weight", "70"),
            ("height", "1.65"),
        ];
        for (name, value) in expected {
            assert_eq!(field(&result, name), Some(value), "{}", name);
        }
        assert_eq!(result.extracted_fields.len(), expected.len());
        assert_eq!(result.confidence, 1.0);
        assert_eq!(result.raw_text, LICENSE);
    }

    #[test]
    fn test_national_id_naming() {
        let result = IdExtractor::new().extract(NATIONAL_ID, DocumentType::NationalId, None);
        assert_eq!(field(&result, "pcn"), Some("1234-5678-9012"));
        assert_eq!(field(&result, "lastName"), Some("DELA CRUZ"));
        assert_eq!(field(&result, "givenName"), Some("JUAN"));
        assert_eq!(field(&result, "middleName"), Some("SANTOS"));
        assert_eq!(field(&result, "sex"), Some("Male"));
        assert_eq!(field(&result, "dateOfBirth"), Some("JANUARY 15, 1990"));
        assert_eq!(field(&result, "city"), Some("Valenzuela City"));
        assert_eq!(field(&result, "barangay"), Some("Malinta"));
        assert_eq!(field(&result, "postalCode"), Some("1440"));
        assert_eq!(field(&result, "firstName"), None);
        assert_eq!(field(&result, "idNumber"), None);
    }

    #[test]
    fn test_national_id_without_name_line() {
        let text = "REPUBLIKA NG PILIPINAS\nPHILIPPINE IDENTIFICATION CARD\n1234-5678-9012";
        let result = IdExtractor::new().extract(text, DocumentType::NationalId, None);
        assert_eq!(field(&result, "pcn"), Some("1234-5678-9012"));
        assert_eq!(field(&result, "lastName"), None);
        assert_eq!(result.extracted_fields.len(), 1);
        assert_eq!(result.confidence, 0.25);
    }

    #[test]
    fn test_passport_naming() {
        let result = IdExtractor::new().extract(PASSPORT, DocumentType::Passport, None);
        assert_eq!(field(&result, "passportNumber"), Some("P1234567A"));
        assert_eq!(field(&result, "surname"), Some("SANTOS"));
        assert_eq!(field(&result, "givenNames"), Some("MARIA CLARA REYES"));
        assert_eq!(field(&result, "sex"), Some("F"));
        assert_eq!(field(&result, "dateOfBirth"), Some("15 JAN 1985"));
        assert_eq!(field(&result, "dateOfIssue"), Some("01 MAR 2020"));
        assert_eq!(field(&result, "expiryDate"), Some("01 MAR 2030"));
        assert_eq!(field(&result, "lastName"), None);
        assert_eq!(field(&result, "middleName"), None);
    }

    #[test]
    fn test_blank_text_is_empty_result() {
        let extractor = IdExtractor::new();
        for text in ["", "   \n\t "] {
            let result = extractor.extract(text, DocumentType::Umid, None);
            assert!(result.extracted_fields.is_empty());
            assert_eq!(result.confidence, 0.0);
            assert_eq!(result.raw_text, text);
        }
    }

    #[test]
    fn test_partial_confidence() {
        let result = IdExtractor::new().extract("Sex: F\nBlood Type: A+", DocumentType::Unknown, None);
        assert_eq!(result.extracted_fields.len(), 2);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_repeat_calls_are_identical() {
        let extractor = IdExtractor::new();
        let first = extractor.extract(LICENSE, DocumentType::DriversLicense, None);
        let second = extractor.extract(LICENSE, DocumentType::DriversLicense, None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_mapping_fills_gaps_only() {
        let mut mapping = FieldMapping::new();
        mapping.insert("employer".to_string(), vec!["employer".to_string()]);
        mapping.insert("sex".to_string(), vec!["sex".to_string()]);
        let text = "Employer: ACME CORP\nSex: F";

        let result = IdExtractor::new().extract(text, DocumentType::Unknown, Some(&mapping));
        assert_eq!(field(&result, "employer"), Some("ACME CORP"));
        assert_eq!(field(&result, "sex"), Some("Female"));
    }

    #[test]
    fn test_extract_from_fragments() {
        let recognition = RawRecognition::new(vec![
            TextFragment::from_rect("CRUZ,", 160.0, 40.0, 60.0, 20.0, 0.9),
            TextFragment::from_rect("JUAN", 230.0, 42.0, 50.0, 20.0, 0.9),
            TextFragment::from_rect("DELA", 100.0, 41.0, 50.0, 20.0, 0.9),
            TextFragment::from_rect("SANTOS", 290.0, 40.0, 70.0, 20.0, 0.9),
            TextFragment::from_rect("Sex: M", 100.0, 100.0, 80.0, 20.0, 0.9),
            TextFragment::from_rect("smudge", 100.0, 160.0, 80.0, 20.0, 0.05),
        ]);
        let result = IdExtractor::new().extract_recognition(&recognition, DocumentType::SssId, None);
        assert_eq!(result.raw_text, "DELA CRUZ, JUAN SANTOS\nSex: M");
        assert_eq!(field(&result, "lastName"), Some("DELA CRUZ"));
        assert_eq!(field(&result, "sex"), Some("Male"));
    }

    #[test]
    fn test_scan_with_replayed_recognition() {
        let recognition = RawRecognition::new(vec![TextFragment::from_rect(
            "SSS No. 34-1234567-8",
            0.0,
            0.0,
            200.0,
            20.0,
            0.95,
        )]);
        let recognizer = StaticRecognizer::new(recognition);
        let result = IdExtractor::new()
            .scan(&recognizer, b"image", DocumentType::SssId, None)
            .unwrap();
        assert_eq!(field(&result, "sssNumber"), Some("34-1234567-8"));
    }

    #[test]
    fn test_extractor_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<IdExtractor>();
    }
}
