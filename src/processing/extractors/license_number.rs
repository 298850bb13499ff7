// Philippine driver's license number: X00-00-000000
//   X      agency code letter
//   00     agency code digits
//   00     year digits
//   000000 5-6 digit serial
//
// OCR regularly splits the number across lines or reads digits as letters, so
// it is recovered through a cascade of tiers; the first tier that yields a
// number wins.

use crate::processing::normalizer::{count_digits, correct_numeric_code};
use lazy_static::lazy_static;
use log::{debug, info, warn};
use regex::{Captures, Regex};

lazy_static! {
    static ref FULL_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)([A-Z])(\d{2})[-\s]?(\d{2})[-\s]?(\d{5,6})").unwrap(),
        // 1 read as I/i/l, 0 read as O/o
        Regex::new(r"(?i)\b([A-Z])([0-9IL]{2})[-\s]?([0-9OIL]{2})[-\s]?([0-9OIL]{5,6})").unwrap(),
        // a serial digit lost
        Regex::new(r"(?i)([A-Z])(\d{2})[-\s]?(\d{2})[-\s]?(\d{4,6})").unwrap(),
    ];

    static ref LABELED_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)license\s*(?:no\.?|number|#)?[:.\s]*([A-Z]\d{2}[-\s]?\d{2}[-\s]?\d{4,6})").unwrap(),
        Regex::new(r"(?i)(?:no\.?|#)[:.\s]*([A-Z]\d{2}[-\s]?\d{2}[-\s]?\d{4,6})").unwrap(),
        Regex::new(r"(?i)license\s*(?:no\.?|number|#)?[:.\s]*([A-Z][-\d\s]{8,14})").unwrap(),
    ];

    static ref AGENCY_TOKEN: Regex = Regex::new(r"\b([A-Z]\d{2})\b").unwrap();

    static ref CONTINUATION_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"[-\s.]?(\d{2})[-\s.]?(\d{5,6})").unwrap(),
        Regex::new(r"[-\s.]?(\d{2})[-\s.]?(\d{4,6})").unwrap(),
    ];

    static ref SEPARATOR_RUN: Regex = Regex::new(r"[-\s]+").unwrap();
    static ref DIGIT_RUN: Regex = Regex::new(r"\d+").unwrap();
}

/// Minimum real digits in a tolerant match; keeps words like "BOLLOOIL" out.
const MIN_TRUE_DIGITS: usize = 5;

/// Recover the license number from raw OCR text.
pub fn extract_license_number(text: &str) -> Option<String> {
    let found = match_full_pattern(text)
        .or_else(|| match_labeled(text))
        .or_else(|| reconstruct_from_lines(text))
        .or_else(|| reconstruct_global(text));

    if found.is_none() {
        warn!("Could not find driver's license number");
    }
    found
}

fn assemble(caps: &Captures) -> String {
    // The agency letter is never digit-corrected
    let agency = caps[1].to_uppercase();
    format!(
        "{}{}-{}-{}",
        agency,
        correct_numeric_code(&caps[2]),
        correct_numeric_code(&caps[3]),
        correct_numeric_code(&caps[4])
    )
}

/// Tier 1: the whole number in one place, with letter/digit repair.
pub fn match_full_pattern(text: &str) -> Option<String> {
    for pattern in FULL_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            let numeric = format!("{}{}{}", &caps[2], &caps[3], &caps[4]);
            if count_digits(&numeric) < MIN_TRUE_DIGITS {
                continue;
            }
            let result = assemble(&caps);
            info!("Found driver's license number: {}", result);
            return Some(result);
        }
    }
    None
}

/// Tier 2: number printed after a "License No" / "No." / "#" label.
pub fn match_labeled(text: &str) -> Option<String> {
    for pattern in LABELED_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(text) {
            let raw = caps[1].trim().trim_end_matches(|c: char| c == '-' || c.is_whitespace());
            let result = SEPARATOR_RUN.replace_all(raw, "-").to_uppercase();
            info!("Found driver's license number (labeled): {}", result);
            return Some(result);
        }
    }
    None
}

fn find_continuation(text: &str) -> Option<(String, String)> {
    CONTINUATION_PATTERNS.iter().find_map(|pattern| {
        pattern
            .captures(text)
            .map(|caps| (caps[1].to_string(), caps[2].to_string()))
    })
}

/// Tier 3: agency code on one line, the rest on the same or the next line.
pub fn reconstruct_from_lines(text: &str) -> Option<String> {
    let lines: Vec<String> = text.lines().map(str::to_uppercase).collect();

    for (i, line) in lines.iter().enumerate() {
        let agency = match AGENCY_TOKEN.find(line) {
            Some(m) => m,
            None => continue,
        };
        debug!("Found agency code candidate: {}", agency.as_str());

        if let Some((year, serial)) = find_continuation(&line[agency.end()..]) {
            let result = format!("{}-{}-{}", agency.as_str(), year, serial);
            info!("Reconstructed driver's license number: {}", result);
            return Some(result);
        }

        if let Some((year, serial)) = lines.get(i + 1).and_then(|next| find_continuation(next)) {
            let result = format!("{}-{}-{}", agency.as_str(), year, serial);
            info!("Reconstructed driver's license number (multi-line): {}", result);
            return Some(result);
        }
    }
    None
}

/// Tier 4: any agency-like token followed by enough digits within 30 chars.
pub fn reconstruct_global(text: &str) -> Option<String> {
    let all_text = text.to_uppercase().replace('\n', " ");

    for caps in AGENCY_TOKEN.captures_iter(&all_text) {
        let agency = &caps[1];
        // first occurrence of this token, as later repeats see the same text
        let start = match all_text.find(agency) {
            Some(idx) => idx + agency.len(),
            None => continue,
        };
        let window: String = all_text[start..].chars().take(30).collect();
        let digits: Vec<&str> = DIGIT_RUN.find_iter(&window).map(|m| m.as_str()).collect();
        if digits.len() < 2 || digits[1].len() < 4 {
            continue;
        }

        let year: String = digits[0].chars().take(2).collect();
        let serial: String = digits[1].chars().take(6).collect();
        let result = format!("{}-{}-{}", agency, year, serial);
        info!("Reconstructed driver's license number (last resort): {}", result);
        return Some(result);
    }
    None
}
