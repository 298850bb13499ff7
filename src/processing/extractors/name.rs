use super::{DocumentText, Extraction};
use crate::models::{ClassifiedLine, FieldMap, LineRole, NameComponents};
use crate::processing::lines::{is_address_text, is_header_text};
use crate::processing::normalizer::{correct_name, count_digits, count_letters};
use log::{debug, info};

const BANNER_WORDS: [&str; 2] = ["REPUBLIC", "PHILIPPINES"];
const COMMA_LINE_REJECTS: [&str; 6] = [
    "REPUBLIC",
    "PHILIPPINES",
    "DEPARTMENT",
    "TRANSPORTATION",
    "SIGNATURE",
    "ASSISTANT",
];
const CONSONANTS: &str = "BCDFGHJKLMNPQRSTVWXYZ";
const VOWELS: &str = "AEIOU";

fn contains_any(line: &str, words: &[&str]) -> bool {
    let upper = line.to_uppercase();
    words.iter().any(|w| upper.contains(w))
}

/// Line right below a "Last Name, First Name, Middle Name" header.
fn name_after_label(lines: &[ClassifiedLine]) -> Option<String> {
    for pair in lines.windows(2) {
        let (label, next) = (&pair[0], &pair[1].text);
        if label.role != LineRole::Label {
            continue;
        }
        debug!("Found name label line '{}', checking next line: '{}'", label.text, next);

        if contains_any(next, &BANNER_WORDS) || is_address_text(next) {
            continue;
        }
        if next.chars().count() <= 5 || !next.contains(' ') {
            continue;
        }
        let name = correct_name(next);
        if name.split_whitespace().count() >= 2 && !is_address_text(&name) {
            info!("Found name after label: {}", name);
            return Some(name);
        }
    }
    None
}

/// "LASTNAME, FIRSTNAME MIDDLENAME" anywhere in the text.
fn name_with_comma(lines: &[ClassifiedLine]) -> Option<String> {
    for line in lines.iter().filter(|l| l.role != LineRole::Label).map(|l| l.text.as_str()) {
        let (before, after) = match line.split_once(',') {
            Some(parts) => parts,
            None => continue,
        };
        if count_digits(line) > 2 || is_address_text(line) || contains_any(line, &COMMA_LINE_REJECTS) {
            continue;
        }
        if count_letters(before) >= 2 && count_letters(after) >= 3 {
            let name = correct_name(line);
            if name.chars().count() > 5 {
                info!("Found name with comma pattern: {}", name);
                return Some(name);
            }
        }
    }
    None
}

/// All-caps line of at least three words.
fn all_caps_name(lines: &[ClassifiedLine]) -> Option<String> {
    for line in lines.iter().filter(|l| l.role != LineRole::Label).map(|l| l.text.as_str()) {
        let has_alpha = line.chars().any(char::is_alphabetic);
        let is_upper = has_alpha && !line.chars().any(char::is_lowercase);
        if line.chars().count() < 8 || !is_upper || count_digits(line) > 0 {
            continue;
        }
        if is_address_text(line) || is_header_text(line) {
            continue;
        }
        let words: Vec<&str> = line.split_whitespace().collect();
        if words.len() >= 3 && words[..3].iter().all(|w| w.chars().count() >= 2) {
            let name = correct_name(line);
            info!("Found all-caps name: {}", name);
            return Some(name);
        }
    }
    None
}

/// Locate the holder's full name, most reliable source first.
pub fn find_full_name(lines: &[ClassifiedLine]) -> Option<String> {
    let found = name_after_label(lines)
        .or_else(|| name_with_comma(lines))
        .or_else(|| all_caps_name(lines));
    if found.is_none() {
        info!("No name found");
    }
    found
}

/// Split an over-long first token that OCR glued together ("SOTOJUAN").
/// Best effort: the first split point where the tail starts with a consonant
/// or the head ends with a vowel.
fn split_merged_token(token: &str) -> Option<(String, String)> {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() < 6 {
        return None;
    }
    (3..=chars.len() - 3).find_map(|i| {
        let tail_start = chars[i].to_ascii_uppercase();
        let head_end = chars[i - 1].to_ascii_uppercase();
        if CONSONANTS.contains(tail_start) || VOWELS.contains(head_end) {
            let head: String = chars[..i].iter().collect();
            let tail: String = chars[i..].iter().collect();
            Some((head, tail))
        } else {
            None
        }
    })
}

/// Break a full name into last / first / middle using Philippine conventions:
/// "LAST, FIRST(S) MIDDLE", where middle is the mother's maiden surname.
pub fn parse_name_components(full_name: &str) -> NameComponents {
    let name = correct_name(full_name);
    let mut parts = NameComponents::default();
    if name.is_empty() {
        return parts;
    }
    info!("Parsing name components: '{}'", name);

    if let Some((last, rest)) = name.split_once(',') {
        let last = last.trim();
        if !last.is_empty() {
            parts.last_name = Some(last.to_string());
        }
        let words: Vec<&str> = rest.split_whitespace().collect();
        match words.len() {
            0 => {}
            1 => parts.first_name = Some(words[0].to_string()),
            2 => {
                parts.first_name = Some(words[0].to_string());
                parts.middle_name = Some(words[1].to_string());
            }
            n => {
                parts.first_name = Some(words[..n - 1].join(" "));
                parts.middle_name = Some(words[n - 1].to_string());
            }
        }
        return parts;
    }

    let words: Vec<&str> = name.split_whitespace().collect();
    match words.len() {
        0 => {}
        1 => parts.last_name = Some(words[0].to_string()),
        2 => {
            parts.first_name = Some(words[0].to_string());
            parts.last_name = Some(words[1].to_string());
        }
        n => {
            parts.middle_name = Some(words[n - 1].to_string());
            let given = words[1..n - 1].join(" ");
            let merged = if n == 3 && words[0].chars().count() > 6 {
                split_merged_token(words[0])
            } else {
                None
            };
            match merged {
                Some((last, first)) => {
                    info!("Split merged name: {} -> {} / {}", words[0], last, first);
                    parts.last_name = Some(last);
                    parts.first_name = Some(format!("{} {}", first, given));
                }
                None => {
                    parts.last_name = Some(words[0].to_string());
                    parts.first_name = Some(given);
                }
            }
        }
    }
    parts
}

pub fn name_fields(components: NameComponents) -> FieldMap {
    let mut fields = FieldMap::new();
    let parts = [
        ("lastName", components.last_name),
        ("firstName", components.first_name),
        ("middleName", components.middle_name),
    ];
    for (key, value) in parts {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            fields.insert(key.to_string(), value);
        }
    }
    fields
}

pub fn extract(doc: &DocumentText) -> Extraction {
    match find_full_name(&doc.lines) {
        Some(full_name) => Extraction::from_fields(name_fields(parse_name_components(&full_name))),
        None => Extraction::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentType;
    use crate::processing::lines::classify_lines;

    fn parsed(name: &str) -> (Option<String>, Option<String>, Option<String>) {
        let c = parse_name_components(name);
        (c.last_name, c.first_name, c.middle_name)
    }

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_comma_form_last_word_is_middle() {
        assert_eq!(
            parsed("DELA CRUZ, JUAN BAUTISTA SANTOS"),
            (some("DELA CRUZ"), some("JUAN BAUTISTA"), some("SANTOS"))
        );
        assert_eq!(parsed("SANTOS, MARIA REYES"), (some("SANTOS"), some("MARIA"), some("REYES")));
        assert_eq!(parsed("SANTOS, MARIA"), (some("SANTOS"), some("MARIA"), None));
    }

    #[test]
    fn test_no_comma_forms() {
        assert_eq!(parsed("DIAZ MARK CABALSI"), (some("DIAZ"), some("MARK"), some("CABALSI")));
        assert_eq!(parsed("JUAN SANTOS"), (some("SANTOS"), some("JUAN"), None));
        assert_eq!(parsed("SANTOS"), (some("SANTOS"), None, None));
        assert!(parse_name_components("123 #").is_empty());
    }

    #[test]
    fn test_merged_first_token_is_split() {
        assert_eq!(
            parsed("SOTOJUAN PEDRO REYES"),
            (some("SOTO"), some("JUAN PEDRO"), some("REYES"))
        );
        // four words: no split attempted
        assert_eq!(
            parsed("SOTOJUAN PEDRO LUIS REYES"),
            (some("SOTOJUAN"), some("PEDRO LUIS"), some("REYES"))
        );
    }

    #[test]
    fn test_name_after_label_line() {
        let lines = classify_lines("Last Name, First Name, Middle Name\nDELA CRUZ, JUAN SANTOS\nAddress");
        assert_eq!(find_full_name(&lines).as_deref(), Some("DELA CRUZ, JUAN SANTOS"));
    }

    #[test]
    fn test_label_followed_by_address_is_skipped() {
        let text = "Last Name, First Name, Middle Name\n133 ROXAS BOULEVARD\nREYES, ANA LIM";
        let lines = classify_lines(text);
        assert_eq!(find_full_name(&lines).as_deref(), Some("REYES, ANA LIM"));
    }

    #[test]
    fn test_comma_line_rejections() {
        let text = "REPUBLIC OF THE PHILIPPINES, DOTR\nA12-23-003519, 1990\nSANTOS, MARIA REYES";
        let lines = classify_lines(text);
        assert_eq!(find_full_name(&lines).as_deref(), Some("SANTOS, MARIA REYES"));
    }

    #[test]
    fn test_all_caps_fallback() {
        let text = "LAND TRANSPORTATION OFFICE\nDIAZ MARK CABALSI\n1990/01/15";
        let lines = classify_lines(text);
        assert_eq!(find_full_name(&lines).as_deref(), Some("DIAZ MARK CABALSI"));
    }

    #[test]
    fn test_extract_fields() {
        let doc = DocumentText::new("SANTOS, MARIA REYES", DocumentType::Umid);
        let result = extract(&doc);
        assert!(result.acted);
        assert_eq!(result.get("lastName"), Some("SANTOS"));
        assert_eq!(result.get("firstName"), Some("MARIA"));
        assert_eq!(result.get("middleName"), Some("REYES"));
    }

    #[test]
    fn test_digits_read_as_letters() {
        let doc = DocumentText::new("SANT0S, MAR1A REYES", DocumentType::Umid);
        let result = extract(&doc);
        assert_eq!(result.get("lastName"), Some("SANTOS"));
        assert_eq!(result.get("firstName"), Some("MARIA"));
    }

    #[test]
    fn test_card_banner_is_not_a_name() {
        let doc = DocumentText::new(
            "REPUBLIKA NG PILIPINAS\nPHILIPPINE IDENTIFICATION CARD\n1234-5678-9012",
            DocumentType::NationalId,
        );
        assert!(!extract(&doc).acted);
    }

    #[test]
    fn test_no_name() {
        let doc = DocumentText::new("123456\n2024/01/01", DocumentType::Unknown);
        assert!(!extract(&doc).acted);
    }
}
