use crate::models::{ClassifiedLine, LineRole, RawRecognition, TextFragment};
use crate::processing::normalizer::{count_digits, count_letters};
use crate::utils::ExtractorConfig;
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;

lazy_static! {
    // Whole words only: "RD" must not fire inside EDUARDO.
    static ref ADDRESS_KEYWORDS: Regex = Regex::new(
        r"(?i)\b(?:BOULEVARD|BLVD|STREET|AVENUE|AVE|ROAD|RD|DRIVE|LANE|LN|HIGHWAY|HWY|BARANGAY|BRGY|POB|POBLACION|CITY|MUNICIPALITY|PROVINCE|SUBDIVISION|SUBD|VILLAGE|VILL|COMPOUND)\b|\b(?:ST|DR)\."
    ).unwrap();
}

/// Substring match, so PHILIPPINE also covers PHILIPPINES.
pub const HEADER_KEYWORDS: [&str; 15] = [
    "REPUBLIC", "PHILIPPINE", "REPUBLIKA", "PILIPINAS", "PAMBANSANG", "PAGKAKAKILANLAN", "IDENTIFICATION",
    "DEPARTMENT", "TRANSPORTATION", "LICENSE", "DRIVER", "SIGNATURE", "ATTY", "ASSISTANT", "SECRETARY",
];

/// Does the line read like address text rather than a name?
pub fn is_address_text(line: &str) -> bool {
    ADDRESS_KEYWORDS.is_match(line)
}

/// Government banner, signature block and similar card furniture.
pub fn is_header_text(line: &str) -> bool {
    let upper = line.to_uppercase();
    HEADER_KEYWORDS.iter().any(|kw| upper.contains(kw))
}

/// Column header row such as "Last Name, First Name, Middle Name".
pub fn is_label_text(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.matches("name").count() >= 2 && !lower.contains("address")
}

fn looks_like_name(line: &str) -> bool {
    if is_header_text(line) {
        return false;
    }
    if let Some((before, after)) = line.split_once(',') {
        if count_digits(line) <= 2 && count_letters(before) >= 2 && count_letters(after) >= 3 {
            return true;
        }
    }
    let has_lower = line.chars().any(|c| c.is_lowercase());
    let has_alpha = line.chars().any(|c| c.is_alphabetic());
    line.chars().count() >= 8
        && has_alpha
        && !has_lower
        && count_digits(line) == 0
        && line.split_whitespace().count() >= 2
}

pub fn classify_line(line: &str) -> LineRole {
    if is_label_text(line) {
        LineRole::Label
    } else if is_address_text(line) {
        LineRole::AddressCandidate
    } else if looks_like_name(line) {
        LineRole::NameCandidate
    } else if is_header_text(line) {
        LineRole::HeaderNoise
    } else {
        LineRole::Unclassified
    }
}

/// Split raw text into trimmed, non-blank lines and tag each with a role.
pub fn classify_lines(text: &str) -> Vec<ClassifiedLine> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(index, line)| {
            let role = classify_line(line);
            debug!("Line {} [{:?}]: '{}'", index, role, line);
            ClassifiedLine {
                text: line.to_string(),
                role,
                index,
            }
        })
        .collect()
}

/// Build the raw text of a recognition: drop low-confidence fragments, order
/// them top-to-bottom then left-to-right and join same-row fragments.
pub fn assemble_text(recognition: &RawRecognition, config: &ExtractorConfig) -> String {
    let mut fragments: Vec<&TextFragment> = recognition
        .fragments
        .iter()
        .filter(|f| f.confidence > config.min_fragment_confidence && !f.text.trim().is_empty())
        .collect();

    fragments.sort_by(|a, b| {
        a.top()
            .total_cmp(&b.top())
            .then_with(|| a.left().total_cmp(&b.left()))
    });

    let mut rows: Vec<Vec<&TextFragment>> = Vec::new();
    for fragment in fragments {
        let joins_last_row = rows.last().map_or(false, |row| {
            let anchor = row[0];
            let tolerance = anchor.height().max(fragment.height()) * config.row_merge_tolerance;
            (fragment.center_y() - anchor.center_y()).abs() < tolerance
        });
        match rows.last_mut() {
            Some(row) if joins_last_row => row.push(fragment),
            _ => rows.push(vec![fragment]),
        }
    }

    rows.into_iter()
        .map(|mut row| {
            row.sort_by(|a, b| a.left().total_cmp(&b.left()));
            row.iter()
                .map(|f| f.text.trim())
                .collect::<Vec<&str>>()
                .join(" ")
        })
        .collect::<Vec<String>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roles_follow_priority() {
        assert_eq!(classify_line("Last Name, First Name, Middle Name"), LineRole::Label);
        // label wins over address keywords
        assert_eq!(classify_line("Name of City / Name of Street"), LineRole::Label);
        assert_eq!(classify_line("133 ROXAS BOULEVARD"), LineRole::AddressCandidate);
        assert_eq!(classify_line("DELA CRUZ, JUAN SANTOS"), LineRole::NameCandidate);
        assert_eq!(classify_line("REPUBLIC OF THE PHILIPPINES"), LineRole::HeaderNoise);
        assert_eq!(classify_line("REPUBLIKA NG PILIPINAS"), LineRole::HeaderNoise);
        assert_eq!(classify_line("PHILIPPINE IDENTIFICATION CARD"), LineRole::HeaderNoise);
        assert_eq!(classify_line("A12-23-003519"), LineRole::Unclassified);
    }

    #[test]
    fn test_address_keywords_are_whole_words() {
        assert!(is_address_text("133, -, Roxas Boulevard (POB)"));
        assert!(is_address_text("12 Mabini St. Brgy Uno"));
        assert!(!is_address_text("EDUARDO RICHARD DAVE"));
    }

    #[test]
    fn test_all_non_blank_lines_kept() {
        let lines = classify_lines("REPUBLIC OF THE PHILIPPINES\n\n  Last Name  \nxyz\n");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1].text, "Last Name");
        assert_eq!(lines[2].index, 2);
    }

    #[test]
    fn test_assemble_orders_and_merges_rows() {
        let recognition = RawRecognition::new(vec![
            TextFragment::from_rect("CRUZ", 200.0, 52.0, 80.0, 20.0, 0.9),
            TextFragment::from_rect("DELA", 100.0, 50.0, 80.0, 20.0, 0.8),
            TextFragment::from_rect("REPUBLIC", 100.0, 10.0, 200.0, 20.0, 0.95),
            TextFragment::from_rect("noise", 100.0, 90.0, 50.0, 20.0, 0.1),
            TextFragment::from_rect("2420", 100.0, 120.0, 50.0, 20.0, 0.7),
        ]);
        let text = assemble_text(&recognition, &ExtractorConfig::default());
        assert_eq!(text, "REPUBLIC\nDELA CRUZ\n2420");
    }

    #[test]
    fn test_zero_tolerance_keeps_fragments_apart() {
        let recognition = RawRecognition::new(vec![
            TextFragment::from_rect("DELA", 100.0, 50.0, 80.0, 20.0, 0.8),
            TextFragment::from_rect("CRUZ", 200.0, 52.0, 80.0, 20.0, 0.9),
        ]);
        let config = ExtractorConfig {
            row_merge_tolerance: 0.0,
            ..Default::default()
        };
        assert_eq!(assemble_text(&recognition, &config), "DELA\nCRUZ");
    }
}
