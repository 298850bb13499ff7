use crate::utils::IdScanError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Philippine ID document families the extractor knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    #[serde(alias = "philsys_id")]
    NationalId,
    DriversLicense,
    Passport,
    SssId,
    Umid,
    PrcId,
    TinId,
    VotersId,
    PostalId,
    Unknown,
}

impl DocumentType {
    pub const ALL: [DocumentType; 10] = [
        DocumentType::NationalId,
        DocumentType::DriversLicense,
        DocumentType::Passport,
        DocumentType::SssId,
        DocumentType::Umid,
        DocumentType::PrcId,
        DocumentType::TinId,
        DocumentType::VotersId,
        DocumentType::PostalId,
        DocumentType::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::NationalId => "national_id",
            DocumentType::DriversLicense => "drivers_license",
            DocumentType::Passport => "passport",
            DocumentType::SssId => "sss_id",
            DocumentType::Umid => "umid",
            DocumentType::PrcId => "prc_id",
            DocumentType::TinId => "tin_id",
            DocumentType::VotersId => "voters_id",
            DocumentType::PostalId => "postal_id",
            DocumentType::Unknown => "unknown",
        }
    }

    pub fn rules(&self) -> &'static DocumentRules {
        // DOCUMENT_RULES is ordered like ALL
        let idx = Self::ALL.iter().position(|t| t == self).unwrap_or(Self::ALL.len() - 1);
        &DOCUMENT_RULES[idx]
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocumentType {
    type Err = IdScanError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_lowercase().replace('-', "_");
        if key == "philsys_id" {
            return Ok(DocumentType::NationalId);
        }
        Self::ALL
            .iter()
            .find(|t| t.as_str() == key)
            .copied()
            .ok_or_else(|| IdScanError::UnknownDocumentType(s.to_string()))
    }
}

/// How name components are published for a document family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameSchema {
    /// lastName / firstName / middleName
    Standard,
    /// lastName / givenName / middleName
    PhilSys,
    /// surname / givenNames (first + middle)
    Passport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SexStyle {
    /// "M" / "F"
    Letter,
    /// "Male" / "Female"
    Word,
}

/// Per-document-type dispatch entry.
pub struct DocumentRules {
    pub document_type: DocumentType,
    /// Field the ID number is published under.
    pub id_field: &'static str,
    /// Numbering-scheme pattern. Group 1 holds the number.
    pub id_pattern: Option<&'static str>,
    /// The scheme pattern must contain a digit to count (rejects words).
    pub id_requires_digit: bool,
    /// Use the driver's-license number reconstruction instead of id_pattern.
    pub license_number: bool,
    pub name_schema: NameSchema,
    pub sex_style: SexStyle,
    /// Assign dates by position when keywords fail.
    pub positional_dates: bool,
    /// Additional field that mirrors dateOfIssue.
    pub issue_date_alias: Option<&'static str>,
    /// Run the driver's-license attribute extractors.
    pub license_fields: bool,
}

const fn rule(document_type: DocumentType, id_field: &'static str, id_pattern: Option<&'static str>) -> DocumentRules {
    DocumentRules {
        document_type,
        id_field,
        id_pattern,
        id_requires_digit: false,
        license_number: false,
        name_schema: NameSchema::Standard,
        sex_style: SexStyle::Word,
        positional_dates: false,
        issue_date_alias: None,
        license_fields: false,
    }
}

pub static DOCUMENT_RULES: [DocumentRules; 10] = [
    DocumentRules {
        name_schema: NameSchema::PhilSys,
        ..rule(
            DocumentType::NationalId,
            "pcn",
            // not part of a longer run, grouped or not
            Some(r"(?:^|[^\d\s-]|(?:^|\D)[-\s])(\d{4}[-\s]?\d{4}[-\s]?\d{4})(?:$|[^\d\s-]|[-\s](?:$|\D))"),
        )
    },
    DocumentRules {
        license_number: true,
        sex_style: SexStyle::Letter,
        positional_dates: true,
        license_fields: true,
        ..rule(DocumentType::DriversLicense, "licenseNumber", None)
    },
    DocumentRules {
        id_requires_digit: true,
        name_schema: NameSchema::Passport,
        sex_style: SexStyle::Letter,
        ..rule(DocumentType::Passport, "passportNumber", Some(r"\b([A-Z][A-Z0-9]{7,8})\b"))
    },
    rule(DocumentType::SssId, "sssNumber", Some(r"(\d{2}[-\s]?\d{7}[-\s]?\d)")),
    rule(DocumentType::Umid, "crnNumber", Some(r"(\d{4}[-\s]?\d{7}[-\s]?\d)")),
    DocumentRules {
        issue_date_alias: Some("registrationDate"),
        ..rule(DocumentType::PrcId, "registrationNumber", Some(r"\b(\d{6,7})\b"))
    },
    rule(DocumentType::TinId, "tinNumber", Some(r"(\d{3}[-\s]?\d{3}[-\s]?\d{3}(?:[-\s]?\d{3})?)")),
    rule(
        DocumentType::VotersId,
        "vinNumber",
        Some(r"(\d{4}[-\s]?\d{4}[A-Z]?[-\s]?[A-Z]?\d{3,4}[A-Z]*\d*)"),
    ),
    rule(DocumentType::PostalId, "postalIdNumber", Some(r"(\d{8,12})")),
    rule(DocumentType::Unknown, "idNumber", None),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_table_is_aligned() {
        for doc_type in DocumentType::ALL {
            assert_eq!(doc_type.rules().document_type, doc_type);
        }
    }

    #[test]
    fn test_parse_document_type() {
        assert_eq!("drivers_license".parse::<DocumentType>().unwrap(), DocumentType::DriversLicense);
        assert_eq!("philsys_id".parse::<DocumentType>().unwrap(), DocumentType::NationalId);
        assert_eq!("SSS-ID".parse::<DocumentType>().unwrap(), DocumentType::SssId);
        assert!("library_card".parse::<DocumentType>().is_err());
    }

    #[test]
    fn test_serde_alias() {
        let parsed: DocumentType = serde_json::from_str("\"philsys_id\"").unwrap();
        assert_eq!(parsed, DocumentType::NationalId);
        assert_eq!(serde_json::to_string(&DocumentType::TinId).unwrap(), "\"tin_id\"");
    }

    #[test]
    fn test_patterns_compile() {
        for rules in DOCUMENT_RULES.iter() {
            if let Some(pattern) = rules.id_pattern {
                assert!(regex::Regex::new(pattern).is_ok(), "{}", pattern);
            }
        }
    }
}
