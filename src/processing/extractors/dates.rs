use super::{DocumentText, Extraction};
use crate::models::FieldMap;
use chrono::NaiveDate;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

pub const DATE_OF_BIRTH: &str = "dateOfBirth";
pub const EXPIRY_DATE: &str = "expiryDate";
pub const DATE_OF_ISSUE: &str = "dateOfIssue";

/// Characters of context inspected on each side of a date.
const CONTEXT_WINDOW: usize = 50;

const ROLE_KEYWORDS: [(&str, &[&str]); 3] = [
    (DATE_OF_BIRTH, &["birth", "dob", "born"]),
    (EXPIRY_DATE, &["expir", "valid until", "exp"]),
    (DATE_OF_ISSUE, &["issue", "registration"]),
];

const NUMERIC_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%d-%m-%Y", "%d/%m/%Y"];
const SHORT_YEAR_FORMATS: [&str; 2] = ["%d-%m-%y", "%d/%m/%y"];
const NAMED_FORMATS: [&str; 4] = ["%b %d %Y", "%B %d %Y", "%d %b %Y", "%d %B %Y"];

lazy_static! {
    static ref DATE_PATTERN: Regex = Regex::new(
        r"(?i)\b(?:\d{4}[-/]\d{2}[-/]\d{2}|\d{2}[-/]\d{2}[-/]\d{4}|\d{2}[-/]\d{2}[-/]\d{2}|(?:JAN|FEB|MAR|APR|MAY|JUN|JUL|AUG|SEP|OCT|NOV|DEC)[A-Z]*\.?\s+\d{1,2},?\s+\d{4}|\d{1,2}\s+(?:JAN|FEB|MAR|APR|MAY|JUN|JUL|AUG|SEP|OCT|NOV|DEC)[A-Z]*\.?\s+\d{4})\b"
    ).unwrap();
}

/// A date as printed, with its byte span in the raw text.
#[derive(Debug, Clone, PartialEq)]
pub struct DateMention {
    pub value: String,
    pub start: usize,
    pub end: usize,
}

pub fn find_dates(text: &str) -> Vec<DateMention> {
    DATE_PATTERN
        .find_iter(text)
        .map(|m| DateMention {
            value: m.as_str().to_string(),
            start: m.start(),
            end: m.end(),
        })
        .collect()
}

/// Best-effort calendar value for ordering.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let cleaned: String = value.chars().filter(|c| *c != ',' && *c != '.').collect();
    let cleaned = cleaned.split_whitespace().collect::<Vec<&str>>().join(" ");
    // dd/mm/yy would otherwise parse as a four-digit year 0090
    let short_year = cleaned.len() == 8 && cleaned.chars().filter(char::is_ascii_digit).count() == 6;
    let formats: Vec<&str> = if short_year {
        SHORT_YEAR_FORMATS.to_vec()
    } else {
        NUMERIC_FORMATS.iter().chain(NAMED_FORMATS.iter()).copied().collect()
    };
    formats
        .into_iter()
        .find_map(|format| NaiveDate::parse_from_str(&cleaned, format).ok())
}

fn char_floor(text: &str, mut idx: usize) -> usize {
    while idx > 0 && !text.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

fn char_ceil(text: &str, mut idx: usize) -> usize {
    while idx < text.len() && !text.is_char_boundary(idx) {
        idx += 1;
    }
    idx
}

fn role_at(context: &str, position: fn(&str, &str) -> Option<usize>) -> Vec<(usize, &'static str)> {
    ROLE_KEYWORDS
        .iter()
        .flat_map(|(role, keywords)| keywords.iter().filter_map(move |kw| position(context, kw).map(|p| (p, *role))))
        .collect()
}

/// Role of a date from the closest keyword before it, else the closest after it.
pub fn classify_date(text: &str, mention: &DateMention) -> Option<&'static str> {
    let before_start = char_floor(text, mention.start.saturating_sub(CONTEXT_WINDOW));
    let after_end = char_ceil(text, (mention.end + CONTEXT_WINDOW).min(text.len()));
    let before = text[before_start..mention.start].to_lowercase();
    let after = text[mention.end..after_end].to_lowercase();

    let preceding = role_at(&before, |ctx, kw| ctx.rfind(kw));
    if let Some((_, role)) = preceding.into_iter().max_by_key(|(p, _)| *p) {
        return Some(role);
    }
    let following = role_at(&after, |ctx, kw| ctx.find(kw));
    following.into_iter().min_by_key(|(p, _)| *p).map(|(_, role)| role)
}

/// Earliest and latest of the distinct dates, chronologically when every
/// date parses and lexically otherwise.
fn chronological(values: Vec<String>) -> Vec<String> {
    let mut values = values;
    let parsed: Option<Vec<NaiveDate>> = values.iter().map(|v| parse_date(v)).collect();
    match parsed {
        Some(dates) => {
            let mut paired: Vec<(NaiveDate, String)> = dates.into_iter().zip(values).collect();
            paired.sort();
            paired.into_iter().map(|(_, v)| v).collect()
        }
        None => {
            values.sort();
            values
        }
    }
}

/// Labels printed side by side on one row can invert the keyword roles; a
/// birth date can never follow the expiry.
fn order_birth_before_expiry(fields: &mut FieldMap) {
    let birth = fields.get(DATE_OF_BIRTH).and_then(|v| parse_date(v));
    let expiry = fields.get(EXPIRY_DATE).and_then(|v| parse_date(v));
    if let (Some(birth), Some(expiry)) = (birth, expiry) {
        if expiry < birth {
            debug!("Expiry precedes birth, swapping the two dates");
            let birth_value = fields.remove(DATE_OF_BIRTH);
            let expiry_value = fields.remove(EXPIRY_DATE);
            if let (Some(birth_value), Some(expiry_value)) = (birth_value, expiry_value) {
                fields.insert(DATE_OF_BIRTH.to_string(), expiry_value);
                fields.insert(EXPIRY_DATE.to_string(), birth_value);
            }
        }
    }
}

pub fn extract(doc: &DocumentText) -> Extraction {
    let rules = doc.rules();
    let mentions = find_dates(&doc.raw);
    let mut fields = FieldMap::new();

    for mention in &mentions {
        let role = classify_date(&doc.raw, mention);
        debug!("Found date '{}' with role {:?}", mention.value, role);
        if let Some(role) = role {
            fields.entry(role.to_string()).or_insert_with(|| mention.value.clone());
        }
    }

    if rules.positional_dates {
        let mut distinct: Vec<String> = Vec::new();
        for mention in &mentions {
            if !distinct.contains(&mention.value) {
                distinct.push(mention.value.clone());
            }
        }
        if distinct.len() >= 2 {
            let unused: Vec<String> = distinct
                .into_iter()
                .filter(|value| !fields.values().any(|v| v == value))
                .collect();
            let mut ordered = chronological(unused);
            if !fields.contains_key(DATE_OF_BIRTH) && !ordered.is_empty() {
                let earliest = ordered.remove(0);
                debug!("Assigning earliest date {} as date of birth", earliest);
                fields.insert(DATE_OF_BIRTH.to_string(), earliest);
            }
            if !fields.contains_key(EXPIRY_DATE) {
                if let Some(latest) = ordered.pop() {
                    debug!("Assigning latest date {} as expiry", latest);
                    fields.insert(EXPIRY_DATE.to_string(), latest);
                }
            }
        }
    }

    if rules.positional_dates {
        order_birth_before_expiry(&mut fields);
    }

    if let (Some(alias), Some(issued)) = (rules.issue_date_alias, fields.get(DATE_OF_ISSUE).cloned()) {
        fields.insert(alias.to_string(), issued);
    }

    Extraction::from_fields(fields)
}
