// Text cleanup shared by every extractor: alphabet filtering for names and
// addresses, whitespace collapsing and OCR confusion fixes.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

/// Field kinds for context-aware correction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Digit segments of ID numbers
    NumericCode,
    Name,
    Address,
}

lazy_static! {
    // Character preferences per field kind: OCR output char -> intended char
    static ref FIELD_CHAR_PREFERENCES: HashMap<FieldKind, HashMap<char, char>> = {
        let mut prefs = HashMap::new();

        let mut numeric = HashMap::new();
        numeric.insert('O', '0');
        numeric.insert('o', '0');
        numeric.insert('I', '1');
        numeric.insert('i', '1');
        numeric.insert('l', '1');
        numeric.insert('L', '1');
        numeric.insert('|', '1');
        prefs.insert(FieldKind::NumericCode, numeric);

        let mut name = HashMap::new();
        name.insert('0', 'O');
        name.insert('1', 'I');
        name.insert('5', 'S');
        name.insert('8', 'B');
        prefs.insert(FieldKind::Name, name);

        prefs.insert(FieldKind::Address, HashMap::new());
        prefs
    };

    static ref CITY_CONFUSION: Regex = Regex::new(r"(?i)GITY|CLTY|C1TY").unwrap();
    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

/// Allowed alphabet for names and addresses: ASCII letters, whitespace,
/// common punctuation, Ñ/ñ and the Latin-1 accented range.
fn is_allowed(c: char) -> bool {
    c.is_ascii_alphabetic()
        || c.is_whitespace()
        || matches!(c, ',' | '.' | '\'' | '-' | 'Ñ' | 'ñ')
        || ('\u{C0}'..='\u{FF}').contains(&c)
}

/// Strip characters outside the allowed alphabet and collapse whitespace.
pub fn sanitize(text: &str) -> String {
    let filtered: String = text.chars().filter(|&c| is_allowed(c)).collect();
    collapse_whitespace(&filtered)
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<&str>>().join(" ")
}

/// Repair OCR corruptions of the CITY keyword (GITY, ClTY, C1TY).
pub fn fix_city_keyword(text: &str) -> String {
    CITY_CONFUSION.replace_all(text, "CITY").into_owned()
}

/// Map characters to their preferred form for the given field kind.
pub fn correct_with_context(text: &str, kind: FieldKind) -> String {
    let preferences = &FIELD_CHAR_PREFERENCES[&kind];
    let corrected: String = text
        .chars()
        .map(|c| preferences.get(&c).copied().unwrap_or(c))
        .collect();

    match kind {
        FieldKind::Address => collapse_whitespace(&fix_city_keyword(&corrected)),
        FieldKind::Name => sanitize(&corrected),
        FieldKind::NumericCode => corrected,
    }
}

/// Name cleanup: digits inside words are read as the letters they resemble
/// ("SANT0S" -> "SANTOS"); all-digit tokens are dropped by sanitizing.
pub fn correct_name(text: &str) -> String {
    let words: Vec<String> = text
        .split_whitespace()
        .map(|word| {
            if word.chars().any(char::is_alphabetic) {
                correct_with_context(word, FieldKind::Name)
            } else {
                word.to_string()
            }
        })
        .collect();
    sanitize(&words.join(" "))
}

/// Letter/digit confusion repair inside a numeric code segment.
pub fn correct_numeric_code(text: &str) -> String {
    correct_with_context(text, FieldKind::NumericCode)
}

/// Python-style title case: first letter of every alphabetic run upper-cased.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

pub fn count_digits(text: &str) -> usize {
    text.chars().filter(|c| c.is_ascii_digit()).count()
}

pub fn count_letters(text: &str) -> usize {
    text.chars().filter(|&c| c.is_ascii_alphabetic() || c == 'Ñ' || c == 'ñ').count()
}
