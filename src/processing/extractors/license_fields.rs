// Driver's-license attributes: restriction codes, agency code, conditions,
// eye color, weight and height.

use super::license_number::extract_license_number;
use super::{DocumentText, Extraction};
use crate::models::FieldMap;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

const EYE_COLORS: [&str; 7] = ["BLACK", "BROWN", "BLUE", "GREEN", "HAZEL", "GRAY", "GREY"];

/// Lines carrying another field's label cannot hold bare DL codes.
const NON_CODE_LABELS: [&str; 8] = ["name", "address", "birth", "blood", "eyes", "signature", "atty", "condition"];

lazy_static! {
    static ref DL_CODES_LABELED: Regex = Regex::new(r"(?i)dl\s*codes?[:\s]*([A-Z0-9][A-Z0-9,.\s]*)").unwrap();
    static ref DL_CODE: Regex = Regex::new(r"(?i)\b([A-D](?:[1-2E])?)\b").unwrap();
    static ref MERGED_CODES: Regex = Regex::new(r"^[AB][AB12]+$").unwrap();
    static ref CODE_RUN: Regex = Regex::new(
        r"(?i)\b([A-D](?:[1-2E])?)[,.\s]*([A-D](?:[1-2E])?)?[,.\s]*([A-D](?:[1-2E])?)?[,.\s]*([A-D](?:[1-2E])?)?\b"
    ).unwrap();

    static ref AGENCY_LABELED: Regex = Regex::new(r"(?i)agency\s*(?:code)?[:\s]*([A-Z]\d{2})").unwrap();
    static ref AGENCY_IN_NUMBER: Regex = Regex::new(r"(?i)([A-Z]\d{2})[-\s]?\d{2}[-\s]?\d{4,6}").unwrap();

    static ref CONDITIONS_LABELED: Regex = Regex::new(r"(?i)conditions?[:\s]*(none|\d[,\s\d]*)").unwrap();
    // last column of a value row, e.g. "BB1B2 NONE" or "B,B1 1, 2"
    static ref CONDITIONS_VALUE: Regex = Regex::new(r"(?:^|\s)(NONE|\d+(?:\s*,\s*\d+)*)\s*$").unwrap();

    static ref EYES_LABELED: Regex = Regex::new(r"(?i)eyes?\s*(?:colou?r)?[:\s]*([A-Z]+)").unwrap();

    static ref WEIGHT: Regex = Regex::new(r"(?i)weight\s*(?:\(kg\))?[:\s]*(\d+(?:\.\d+)?)").unwrap();
    static ref HEIGHT: Regex = Regex::new(r"(?i)height\s*(?:\(m\))?[:\s]*(\d+(?:\.\d+)?)").unwrap();
}

fn join_codes<'a>(codes: impl Iterator<Item = &'a str>) -> String {
    codes.map(str::to_uppercase).collect::<Vec<String>>().join(",")
}

/// "BB1B2" -> ["B", "B1", "B2"]
pub fn split_merged_codes(token: &str) -> Vec<String> {
    let chars: Vec<char> = token.chars().collect();
    let mut codes = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if matches!(c, 'A'..='D') {
            match chars.get(i + 1) {
                Some(d @ ('1' | '2')) => {
                    codes.push(format!("{}{}", c, d));
                    i += 2;
                }
                _ => {
                    codes.push(c.to_string());
                    i += 1;
                }
            }
        } else {
            i += 1;
        }
    }
    codes
}

pub fn find_dl_codes(lines: &[&str]) -> Option<String> {
    for (i, line) in lines.iter().enumerate() {
        if !line.to_lowercase().contains("dl code") {
            continue;
        }
        debug!("Found DL codes line: {}", line);
        if let Some(caps) = DL_CODES_LABELED.captures(line) {
            let codes: Vec<&str> = DL_CODE.find_iter(&caps[1]).map(|m| m.as_str()).collect();
            if !codes.is_empty() {
                return Some(join_codes(codes.into_iter()));
            }
        }
        if let Some(next) = lines.get(i + 1) {
            let codes: Vec<&str> = DL_CODE.find_iter(next).map(|m| m.as_str()).collect();
            if !codes.is_empty() {
                return Some(join_codes(codes.into_iter()));
            }
        }
    }

    for line in lines {
        let lower = line.to_lowercase();
        if NON_CODE_LABELS.iter().any(|kw| lower.contains(kw)) {
            continue;
        }
        let upper = line.trim().to_uppercase();

        if MERGED_CODES.is_match(&upper) && upper.len() >= 4 {
            let codes = split_merged_codes(&upper);
            if codes.len() >= 2 {
                debug!("Found DL codes from merged token: {:?}", codes);
                return Some(codes.join(","));
            }
        }

        if let Some(caps) = CODE_RUN.captures(&upper) {
            let codes: Vec<&str> = caps.iter().skip(1).flatten().map(|m| m.as_str()).collect();
            if codes.len() >= 2 {
                return Some(join_codes(codes.into_iter()));
            }
        }
    }
    None
}

/// Labeled value, else the prefix of the recovered license number, else the
/// first number-shaped run in the raw text.
pub fn find_agency_code(text: &str, lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .filter(|line| line.to_lowercase().contains("agency"))
        .find_map(|line| AGENCY_LABELED.captures(line).map(|caps| caps[1].to_uppercase()))
        .or_else(|| extract_license_number(text).map(|number| number.chars().take(3).collect()))
        .or_else(|| AGENCY_IN_NUMBER.captures(text).map(|caps| caps[1].to_uppercase()))
}

pub fn find_conditions(lines: &[&str]) -> Option<String> {
    for (i, line) in lines.iter().enumerate() {
        if !line.to_lowercase().contains("condition") {
            continue;
        }
        if let Some(caps) = CONDITIONS_LABELED.captures(line) {
            return Some(caps[1].trim().to_uppercase());
        }
        if let Some(next) = lines.get(i + 1) {
            let next = next.trim().to_uppercase();
            if let Some(caps) = CONDITIONS_VALUE.captures(&next) {
                return Some(caps[1].to_string());
            }
        }
    }
    None
}

pub fn find_eyes_color(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .filter(|line| line.to_lowercase().contains("eye"))
        .filter_map(|line| EYES_LABELED.captures(line).map(|caps| caps[1].to_uppercase()))
        .find(|color| EYE_COLORS.contains(&color.as_str()))
}

fn first_capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern.captures(text).map(|caps| caps[1].to_string())
}

pub fn extract(doc: &DocumentText) -> Extraction {
    if !doc.rules().license_fields {
        return Extraction::none();
    }
    let lines: Vec<&str> = doc.line_texts().collect();

    let found = [
        ("dlCodes", find_dl_codes(&lines)),
        ("agencyCode", find_agency_code(&doc.raw, &lines)),
        ("conditions", find_conditions(&lines)),
        ("eyesColor", find_eyes_color(&lines)),
        ("weight", first_capture(&WEIGHT, &doc.raw)),
        ("height", first_capture(&HEIGHT, &doc.raw)),
    ];

    let mut fields = FieldMap::new();
    for (name, value) in found {
        if let Some(value) = value {
            debug!("Found {}: {}", name, value);
            fields.insert(name.to_string(), value);
        }
    }
    Extraction::from_fields(fields)
}
