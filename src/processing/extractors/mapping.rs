use super::DocumentText;
use crate::models::FieldMap;
use log::{info, warn};
use regex::{Regex, RegexBuilder};
use std::collections::BTreeMap;

/// Caller-supplied field name -> label keywords.
pub type FieldMapping = BTreeMap<String, Vec<String>>;

fn keyword_value(line: &str, keyword: &str) -> Option<String> {
    let pattern: Regex = match RegexBuilder::new(&format!(r"{}[:\s]+(.+)", regex::escape(keyword)))
        .case_insensitive(true)
        .build()
    {
        Ok(pattern) => pattern,
        Err(e) => {
            warn!("Skipping mapping keyword '{}': {}", keyword, e);
            return None;
        }
    };
    pattern
        .captures(line)
        .map(|caps| caps[1].trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Fill fields not found by the built-in extractors from "<keyword>: value"
/// lines. Existing fields are never overwritten.
pub fn apply_mapping(doc: &DocumentText, mapping: &FieldMapping, fields: &mut FieldMap) {
    for (field, keywords) in mapping {
        if fields.contains_key(field) {
            continue;
        }
        let found = doc.line_texts().find_map(|line| {
            let lower = line.to_lowercase();
            keywords
                .iter()
                .filter(|kw| !kw.is_empty() && lower.contains(&kw.to_lowercase()))
                .find_map(|kw| keyword_value(line, kw))
        });
        if let Some(value) = found {
            info!("Extracted {}: {} (via mapping)", field, value);
            fields.insert(field.clone(), value);
        }
    }
}
