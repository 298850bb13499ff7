// Sex, nationality and blood type. Each is a single labeled value that may sit
// on the label line or, on column-layout cards, on the line below it.

use super::{DocumentText, Extraction};
use crate::models::SexStyle;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

const VALID_NATIONALITIES: [&str; 6] = ["PH", "PHL", "PHILIPPINE", "PHILIPPINES", "FILIPINO", "FILIPINA"];
const NOT_NATIONALITIES: [&str; 6] = ["SEX", "GENDER", "MALE", "FEMALE", "M", "F"];

lazy_static! {
    static ref SEX_LABELED: Regex = Regex::new(r"(?i)\b(?:sex|gender)\b[:\s]*(female|male|f|m)\b").unwrap();
    static ref SEX_TOKEN: Regex = Regex::new(r"(?i)^(?:sex|gender):?$").unwrap();
    static ref SEX_VALUE: Regex = Regex::new(r"(?i)^(female|male|f|m)$").unwrap();

    static ref NATIONALITY_LABEL: Regex = Regex::new(r"(?i)^.*nationality[:\s]*").unwrap();
    static ref NATIONALITY_CHARS: Regex = Regex::new(r"[^A-Za-z\s/]").unwrap();

    static ref BLOOD_LABELED: Regex = Regex::new(
        r"(?i)\bblood\s*type[:\s]*(AB|A|B|O)\s*(\+|-|POSITIVE|NEGATIVE|POS|NEG)"
    ).unwrap();
    static ref BLOOD_VALUE: Regex = Regex::new(
        r"(?i)^(AB|A|B|O)\s*(\+|-|POSITIVE|NEGATIVE|POS|NEG)"
    ).unwrap();
}

fn sex_value(raw: &str, style: SexStyle) -> &'static str {
    let female = raw.to_uppercase().starts_with('F');
    match (style, female) {
        (SexStyle::Letter, false) => "M",
        (SexStyle::Letter, true) => "F",
        (SexStyle::Word, false) => "Male",
        (SexStyle::Word, true) => "Female",
    }
}

pub fn find_sex(doc: &DocumentText) -> Option<String> {
    let style = doc.rules().sex_style;
    if let Some(caps) = SEX_LABELED.captures(&doc.raw) {
        return Some(sex_value(&caps[1], style).to_string());
    }

    // column layout: the value sits in the same column on the row below
    let lines: Vec<&str> = doc.line_texts().collect();
    lines.windows(2).find_map(|pair| {
        let column = pair[0].split_whitespace().position(|t| SEX_TOKEN.is_match(t))?;
        let value = pair[1].split_whitespace().nth(column)?;
        SEX_VALUE
            .captures(value)
            .map(|caps| sex_value(&caps[1], style).to_string())
    })
}

pub fn extract_sex(doc: &DocumentText) -> Extraction {
    match find_sex(doc) {
        Some(sex) => {
            debug!("Found sex: {}", sex);
            Extraction::single("sex", sex)
        }
        None => Extraction::none(),
    }
}

fn clean_nationality(raw: &str) -> String {
    NATIONALITY_CHARS.replace_all(raw, "").trim().to_uppercase()
}

/// Canonical value, a verbatim value, or nothing when the text is really
/// another label or a sex value.
pub fn accept_nationality(raw: &str) -> Option<String> {
    let cleaned = clean_nationality(raw);
    if VALID_NATIONALITIES.contains(&cleaned.as_str()) {
        return Some(cleaned);
    }
    let first = cleaned.split_whitespace().next()?;
    if VALID_NATIONALITIES.contains(&first) {
        return Some(first.to_string());
    }
    if NOT_NATIONALITIES.contains(&first) || NOT_NATIONALITIES.contains(&cleaned.as_str()) {
        return None;
    }
    if cleaned.chars().count() >= 3 {
        Some(cleaned)
    } else {
        None
    }
}

pub fn find_nationality(doc: &DocumentText) -> Option<String> {
    let lines: Vec<&str> = doc.line_texts().collect();
    for (i, line) in lines.iter().enumerate() {
        if !line.to_lowercase().contains("nationality") {
            continue;
        }
        let same_line = NATIONALITY_LABEL.replace(line, "");
        if let Some(value) = accept_nationality(&same_line) {
            return Some(value);
        }
        return lines.get(i + 1).and_then(|next| accept_nationality(next));
    }
    None
}

pub fn extract_nationality(doc: &DocumentText) -> Extraction {
    match find_nationality(doc) {
        Some(nationality) => {
            debug!("Found nationality: {}", nationality);
            Extraction::single("nationality", nationality)
        }
        None => Extraction::none(),
    }
}

fn blood_value(group: &str, sign: &str) -> String {
    let sign = if sign.starts_with('-') || sign.to_uppercase().starts_with('N') {
        '-'
    } else {
        '+'
    };
    format!("{}{}", group.to_uppercase(), sign)
}

/// One of the eight ABO/Rh combinations; a bare group such as the "B1"
/// restriction code never qualifies.
pub fn find_blood_type(doc: &DocumentText) -> Option<String> {
    if let Some(caps) = BLOOD_LABELED.captures(&doc.raw) {
        return Some(blood_value(&caps[1], &caps[2]));
    }
    let lines: Vec<&str> = doc.line_texts().collect();
    lines.windows(2).find_map(|pair| {
        if !pair[0].to_lowercase().contains("blood") {
            return None;
        }
        BLOOD_VALUE
            .captures(pair[1])
            .map(|caps| blood_value(&caps[1], &caps[2]))
    })
}

pub fn extract_blood_type(doc: &DocumentText) -> Extraction {
    match find_blood_type(doc) {
        Some(blood_type) => {
            debug!("Found blood type: {}", blood_type);
            Extraction::single("bloodType", blood_type)
        }
        None => Extraction::none(),
    }
}
