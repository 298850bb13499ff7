use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Field name -> sanitized value. Ordered so that serialized output is stable.
pub type FieldMap = BTreeMap<String, String>;

/// Minimum field count for a "complete" extraction: ID number, last name,
/// first name and one date.
pub const EXPECTED_MINIMUM_FIELDS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// One text fragment as returned by the OCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextFragment {
    pub text: String,
    /// Corner points, clockwise from top-left.
    pub polygon: [Point; 4],
    pub confidence: f32,
}

impl TextFragment {
    pub fn new(text: &str, polygon: [Point; 4], confidence: f32) -> Self {
        TextFragment {
            text: text.to_string(),
            polygon,
            confidence,
        }
    }

    /// Axis-aligned fragment from a top-left corner and a size.
    pub fn from_rect(text: &str, left: f32, top: f32, width: f32, height: f32, confidence: f32) -> Self {
        let polygon = [
            Point { x: left, y: top },
            Point { x: left + width, y: top },
            Point { x: left + width, y: top + height },
            Point { x: left, y: top + height },
        ];
        Self::new(text, polygon, confidence)
    }

    pub fn top(&self) -> f32 {
        self.polygon.iter().map(|p| p.y).fold(f32::INFINITY, f32::min)
    }

    pub fn bottom(&self) -> f32 {
        self.polygon.iter().map(|p| p.y).fold(f32::NEG_INFINITY, f32::max)
    }

    pub fn left(&self) -> f32 {
        self.polygon.iter().map(|p| p.x).fold(f32::INFINITY, f32::min)
    }

    pub fn height(&self) -> f32 {
        (self.bottom() - self.top()).max(0.0)
    }

    pub fn center_y(&self) -> f32 {
        (self.top() + self.bottom()) / 2.0
    }
}

/// Raw OCR output for one image.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecognition {
    pub fragments: Vec<TextFragment>,
}

impl RawRecognition {
    pub fn new(fragments: Vec<TextFragment>) -> Self {
        RawRecognition { fragments }
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LineRole {
    Label,
    NameCandidate,
    AddressCandidate,
    HeaderNoise,
    Unclassified,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedLine {
    pub text: String,
    pub role: LineRole,
    pub index: usize,
}

/// Name split into its Philippine-convention parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameComponents {
    pub last_name: Option<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
}

impl NameComponents {
    pub fn is_empty(&self) -> bool {
        self.last_name.is_none() && self.first_name.is_none() && self.middle_name.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressComponents {
    /// House number only, as printed on Philippine licenses.
    pub street_address: Option<String>,
    pub barangay: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
}

impl AddressComponents {
    pub fn into_fields(self) -> FieldMap {
        let mut fields = FieldMap::new();
        let parts = [
            ("streetAddress", self.street_address),
            ("barangay", self.barangay),
            ("city", self.city),
            ("province", self.province),
            ("postalCode", self.postal_code),
        ];
        for (name, value) in parts {
            if let Some(value) = value {
                fields.insert(name.to_string(), value);
            }
        }
        fields
    }

    /// Single-line rendering, comma separated.
    pub fn to_line(&self) -> Option<String> {
        let parts: Vec<&str> = [
            &self.street_address,
            &self.barangay,
            &self.city,
            &self.province,
            &self.postal_code,
        ]
        .iter()
        .filter_map(|p| p.as_deref())
        .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(", "))
        }
    }
}

/// Final output of one extraction call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub raw_text: String,
    pub extracted_fields: FieldMap,
    pub confidence: f64,
}

impl ExtractionResult {
    pub fn empty(raw_text: &str) -> Self {
        ExtractionResult {
            raw_text: raw_text.to_string(),
            extracted_fields: FieldMap::new(),
            confidence: 0.0,
        }
    }

    pub fn new(raw_text: &str, extracted_fields: FieldMap) -> Self {
        let confidence = score_confidence(extracted_fields.len());
        ExtractionResult {
            raw_text: raw_text.to_string(),
            extracted_fields,
            confidence,
        }
    }
}

pub fn score_confidence(field_count: usize) -> f64 {
    (field_count as f64 / EXPECTED_MINIMUM_FIELDS as f64).min(1.0)
}
