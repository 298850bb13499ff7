// Philippine license addresses are printed as
//   house_no, -, barangay, city, province, postal_code
// e.g. "133, -, ROXAS BOULEVARD (POB), SAN CARLOS CITY, PANGASINAN, 2420".
// Components are peeled off a residual string in a fixed order; each step
// returns the shortened residual.

use super::{DocumentText, Extraction};
use crate::models::{AddressComponents, ClassifiedLine};
use crate::processing::normalizer::{collapse_whitespace, correct_with_context, title_case, FieldKind};
use lazy_static::lazy_static;
use log::{debug, info};
use regex::Regex;

pub const PROVINCES: [&str; 89] = [
    "ABRA", "AGUSAN DEL NORTE", "AGUSAN DEL SUR", "AKLAN", "ALBAY", "ANTIQUE", "APAYAO",
    "AURORA", "BASILAN", "BATAAN", "BATANES", "BATANGAS", "BENGUET", "BILIRAN", "BOHOL",
    "BUKIDNON", "BULACAN", "CAGAYAN", "CAMARINES NORTE", "CAMARINES SUR", "CAMARINES",
    "CAMIGUIN", "CAPIZ", "CATANDUANES", "CAVITE", "CEBU", "COTABATO", "DAVAO DE ORO",
    "DAVAO DEL NORTE", "DAVAO DEL SUR", "DAVAO OCCIDENTAL", "DAVAO ORIENTAL", "DAVAO",
    "DINAGAT ISLANDS", "EASTERN SAMAR", "GUIMARAS", "IFUGAO", "ILOCOS NORTE", "ILOCOS SUR",
    "ILOCOS", "ILOILO", "ISABELA", "KALINGA", "LA UNION", "LAGUNA", "LANAO DEL NORTE",
    "LANAO DEL SUR", "LEYTE", "MAGUINDANAO", "MARINDUQUE", "MASBATE", "MISAMIS OCCIDENTAL",
    "MISAMIS ORIENTAL", "MISAMIS", "MOUNTAIN PROVINCE", "NEGROS OCCIDENTAL", "NEGROS ORIENTAL",
    "NEGROS", "NORTHERN SAMAR", "NUEVA ECIJA", "NUEVA VIZCAYA", "OCCIDENTAL MINDORO",
    "ORIENTAL MINDORO", "PALAWAN", "PAMPANGA", "PANGASINAN", "QUEZON", "QUIRINO", "RIZAL",
    "ROMBLON", "SAMAR", "SARANGANI", "SIQUIJOR", "SORSOGON", "SOUTH COTABATO", "SOUTHERN LEYTE",
    "SULTAN KUDARAT", "SULU", "SURIGAO DEL NORTE", "SURIGAO DEL SUR", "TARLAC", "TAWI-TAWI",
    "ZAMBALES", "ZAMBOANGA DEL NORTE", "ZAMBOANGA DEL SUR", "ZAMBOANGA SIBUGAY", "METRO MANILA",
    "NCR", "MANILA",
];

const STOP_KEYWORDS: [&str; 12] = [
    "license", "expir", "blood", "date", "sex", "nationality", "agency", "eyes", "dl code",
    "condition", "weight", "height",
];

const CITY_PREFIXES: [&str; 6] = ["SAN", "SANTA", "SANTO", "GENERAL", "LAS", "LOS"];

lazy_static! {
    static ref ADDRESS_LABEL: Regex = Regex::new(r"(?i)^.*address\s*:?\s*").unwrap();
    static ref NUMBER_BETWEEN_COMMAS: Regex = Regex::new(r",\s*(\d+)\s*,").unwrap();

    // Longest names first so "NEGROS OCCIDENTAL" wins over "NEGROS".
    static ref PROVINCE_PATTERN: Regex = {
        let mut names: Vec<&str> = PROVINCES.to_vec();
        names.sort_by(|a, b| b.len().cmp(&a.len()));
        let alternation = names
            .iter()
            .map(|n| regex::escape(n).replace(' ', r"\s+"))
            .collect::<Vec<String>>()
            .join("|");
        Regex::new(&format!(r"(?i)\b(?:{})\b", alternation)).unwrap()
    };

    // A province name that is really part of a city or street name.
    static ref PLACE_WORD_AFTER: Regex = Regex::new(
        r"(?i)^\s+(?:CITY|STREET|ST\.?|AVENUE|AVE\.?|ROAD|RD\.?|BOULEVARD|BLVD\.?|DRIVE|DR\.?)(?:\W|$)"
    ).unwrap();

    static ref CITY_PATTERNS: Vec<Regex> = vec![
        Regex::new(r"(?i)\b((?:SAN|SANTA|SANTO|CITY OF|MUNICIPALITY OF)?\s*[A-ZÑ]+\s+CITY)\b").unwrap(),
        Regex::new(r"(?i)\b(CITY\s+OF\s+[A-ZÑ]+)").unwrap(),
        Regex::new(r"(?i)\b([A-ZÑ]+\s+CITY)\b").unwrap(),
        Regex::new(r"(?i)\b([A-ZÑ]+\s+MUNICIPALITY)\b").unwrap(),
    ];

    static ref PREFIX_PATTERNS: Vec<(&'static str, Regex)> = CITY_PREFIXES
        .iter()
        .map(|prefix| {
            let pattern = format!(r"(?i)\b((?:BARANGAY|BRGY)\.?\s+)?\b({})\b[ \t]*([A-ZÑ]*)", prefix);
            (*prefix, Regex::new(&pattern).unwrap())
        })
        .collect();

    static ref HOUSE_AND_BARANGAY: Regex = Regex::new(
        r"(?i)\b(\d{1,3}[A-Z]?)\s*,\s*-\s*,?\s*([^,()]+?)\s*(?:[,(]|\s\d{4}\s*$|$)"
    ).unwrap();
    static ref POBLACION: Regex = Regex::new(r"(?i)\(?\s*\b(?:POB|POBLACION)\b\.?\s*\)?").unwrap();
    static ref BARANGAY_LABEL: Regex = Regex::new(
        r"(?i)\b(?:BARANGAY|BRGY)\.?\s+([A-Z0-9 \-]+?)\s*(?:[,;)]|$)"
    ).unwrap();
    static ref HOUSE_NUMBER: Regex = Regex::new(r"(?i)\b(\d{1,3}[A-Z]?)\s*,").unwrap();
    static ref POSTAL_CODE: Regex = Regex::new(r"(?:^|[,\s])\s*(\d{4})\s*$").unwrap();
}

/// Drop `start..end` from the residual along with the separators around it.
fn cut(residual: &str, start: usize, end: usize) -> String {
    let is_separator = |c: char| c == ',' || c.is_whitespace();
    let left = residual[..start].trim_end_matches(is_separator);
    let right = residual[end..].trim_start_matches(is_separator);
    match (left.is_empty(), right.is_empty()) {
        (true, _) => right.to_string(),
        (_, true) => left.to_string(),
        _ => format!("{}, {}", left, right),
    }
}

/// Lines from the "Address" label up to the next labeled field.
pub fn collect_address_lines(lines: &[ClassifiedLine]) -> Vec<String> {
    let mut collected = Vec::new();
    let mut in_section = false;

    for line in lines.iter().map(|l| l.text.as_str()) {
        let lower = line.to_lowercase();
        if lower.contains("address") {
            in_section = true;
            let trailing = ADDRESS_LABEL.replace(line, "");
            let trailing = trailing.trim();
            if trailing.chars().count() > 3 {
                collected.push(trailing.to_string());
            }
            continue;
        }
        if !in_section {
            continue;
        }
        if STOP_KEYWORDS.iter().any(|kw| lower.contains(kw)) {
            break;
        }
        if line.chars().count() > 1 {
            collected.push(line.to_string());
        }
    }

    debug!("Address lines collected: {:?}", collected);
    collected
}

/// Joined address text with OCR spacing and CITY repairs applied.
pub fn normalize_address(lines: &[String]) -> String {
    let joined = lines.join(" ");
    let joined = NUMBER_BETWEEN_COMMAS.replace_all(&joined, ", $1,");
    correct_with_context(&joined, FieldKind::Address)
}

fn display_province(name: &str) -> String {
    let canonical = collapse_whitespace(&name.to_uppercase());
    if canonical.len() <= 3 {
        canonical
    } else {
        title_case(&canonical)
    }
}

pub fn take_province(residual: &str) -> (Option<String>, String) {
    for m in PROVINCE_PATTERN.find_iter(residual) {
        if PLACE_WORD_AFTER.is_match(&residual[m.end()..]) {
            continue;
        }
        if residual[..m.start()].trim_end().to_uppercase().ends_with("CITY OF") {
            continue;
        }
        let province = display_province(m.as_str());
        debug!("Found province: {}", province);
        return (Some(province), cut(residual, m.start(), m.end()));
    }
    (None, residual.to_string())
}

pub fn take_city(residual: &str) -> (Option<String>, String) {
    for pattern in CITY_PATTERNS.iter() {
        if let Some(caps) = pattern.captures(residual) {
            let (whole, name) = match (caps.get(0), caps.get(1)) {
                (Some(w), Some(n)) => (w, n),
                _ => continue,
            };
            let city = collapse_whitespace(&title_case(name.as_str()));
            let rest = cut(residual, whole.start(), whole.end());
            return repair_city_prefix(city, rest);
        }
    }
    (None, residual.to_string())
}

/// A standalone prefix left in the residual after the city was cut out.
/// Group 1 is a barangay label in front of it, group 3 the word after it;
/// either one means the prefix belongs to another place name.
fn stray_prefix(residual: &str, pattern: &Regex) -> Option<(usize, usize)> {
    pattern.captures_iter(residual).find_map(|caps| {
        let labeled = caps.get(1).is_some();
        let followed = caps.get(3).map_or(false, |m| !m.as_str().is_empty());
        if labeled || followed {
            return None;
        }
        caps.get(2).map(|m| (m.start(), m.end()))
    })
}

/// OCR sometimes separates "SAN" from "CARLOS CITY"; rejoin it.
fn repair_city_prefix(city: String, residual: String) -> (Option<String>, String) {
    let city_upper = city.to_uppercase();
    if !city_upper.ends_with(" CITY") {
        return (Some(city), residual);
    }

    for (prefix, pattern) in PREFIX_PATTERNS.iter() {
        if city_upper.starts_with(&format!("{} ", prefix)) {
            continue;
        }
        if let Some((start, end)) = stray_prefix(&residual, pattern) {
            let repaired = title_case(&format!("{} {}", prefix, city_upper));
            debug!("Rejoined city prefix: {}", repaired);
            return (Some(repaired), cut(&residual, start, end));
        }
    }
    (Some(city), residual)
}

/// House number and barangay. Returns (house, barangay, residual).
pub fn take_house_and_barangay(residual: &str) -> (Option<String>, Option<String>, String) {
    if let Some(caps) = HOUSE_AND_BARANGAY.captures(residual) {
        if let (Some(whole), Some(house), Some(name)) = (caps.get(0), caps.get(1), caps.get(2)) {
            let barangay = name.as_str().replace(|c: char| c == '(' || c == ')', "");
            let barangay = barangay.trim();
            if !barangay.is_empty() {
                info!("Found house number and barangay: {}, {}", house.as_str(), barangay);
                return (
                    Some(house.as_str().to_string()),
                    Some(title_case(barangay)),
                    cut(residual, whole.start(), name.end()),
                );
            }
        }
    }

    let mut rest = residual.to_string();
    let mut barangay = None;
    if let Some(m) = POBLACION.find(&rest) {
        barangay = Some("Poblacion".to_string());
        rest = cut(&rest, m.start(), m.end());
    } else if let Some(caps) = BARANGAY_LABEL.captures(&rest) {
        if let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) {
            barangay = Some(title_case(name.as_str().trim()));
            rest = cut(&rest, whole.start(), whole.end());
        }
    }

    let mut house = None;
    if let Some(caps) = HOUSE_NUMBER.captures(&rest) {
        if let (Some(whole), Some(number)) = (caps.get(0), caps.get(1)) {
            house = Some(number.as_str().to_string());
            rest = cut(&rest, whole.start(), whole.end());
        }
    }
    (house, barangay, rest)
}

/// Four digits, only at the very end of the residual.
pub fn take_postal_code(residual: &str) -> (Option<String>, String) {
    match POSTAL_CODE.captures(residual).and_then(|caps| caps.get(1)) {
        Some(code) => (Some(code.as_str().to_string()), cut(residual, code.start(), code.end())),
        None => (None, residual.to_string()),
    }
}

pub fn parse_address(full_address: &str) -> AddressComponents {
    let (province, residual) = take_province(full_address);
    let (city, residual) = take_city(&residual);
    let (street_address, barangay, residual) = take_house_and_barangay(&residual);
    let (postal_code, residual) = take_postal_code(&residual);
    debug!("Unparsed address remainder: '{}'", residual);

    AddressComponents {
        street_address,
        barangay,
        city,
        province,
        postal_code,
    }
}

pub fn extract(doc: &DocumentText) -> Extraction {
    let lines = collect_address_lines(&doc.lines);
    let full_address = normalize_address(&lines);
    if full_address.is_empty() {
        return Extraction::none();
    }
    info!("Full address text: {}", full_address);

    let components = parse_address(&full_address);
    if let Some(line) = components.to_line() {
        info!("Extracted address: {}", line);
    }
    Extraction::from_fields(components.into_fields())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentType;

    fn doc(lines: &[&str]) -> DocumentText {
        DocumentText::new(&lines.join("\n"), DocumentType::DriversLicense)
    }

    #[test]
    fn test_license_address_layout() {
        let result = extract(&doc(&[
            "Address",
            "133, -, Roxas Boulevard (POB)",
            "San Carlos City",
            "Pangasinan",
            "2420",
        ]));
        assert_eq!(result.get("streetAddress"), Some("133"));
        assert_eq!(result.get("barangay"), Some("Roxas Boulevard"));
        assert_eq!(result.get("city"), Some("San Carlos City"));
        assert_eq!(result.get("province"), Some("Pangasinan"));
        assert_eq!(result.get("postalCode"), Some("2420"));
    }

    #[test]
    fn test_collection_stops_at_next_label() {
        let lines = doc(&["Address: 12 Mabini St.", "Makati City", "License No. A12-23-003519", "Pangasinan"]).lines;
        assert_eq!(collect_address_lines(&lines), vec!["12 Mabini St.", "Makati City"]);
    }

    #[test]
    fn test_four_digit_house_number_is_not_postal() {
        let parsed = parse_address("1234 Mabini Ave, Makati City");
        assert_eq!(parsed.postal_code, None);
        assert_eq!(parsed.street_address, None);
        assert_eq!(parsed.city.as_deref(), Some("Makati City"));

        let parsed = parse_address("1234, Mabini Street, Makati City, 1200");
        assert_eq!(parsed.postal_code.as_deref(), Some("1200"));
        assert_eq!(parsed.street_address, None);
    }

    #[test]
    fn test_province_inside_city_name_is_skipped() {
        let parsed = parse_address("45, -, Bagong Pag-asa, Quezon City, 1105");
        assert_eq!(parsed.province, None);
        assert_eq!(parsed.city.as_deref(), Some("Quezon City"));
        assert_eq!(parsed.barangay.as_deref(), Some("Bagong Pag-Asa"));
        assert_eq!(parsed.street_address.as_deref(), Some("45"));
        assert_eq!(parsed.postal_code.as_deref(), Some("1105"));
    }

    #[test]
    fn test_multiword_province_and_city_of() {
        let parsed = parse_address("Brgy San Roque, City of Manila, Metro Manila");
        assert_eq!(parsed.province.as_deref(), Some("Metro Manila"));
        assert_eq!(parsed.city.as_deref(), Some("City Of Manila"));
    }

    #[test]
    fn test_split_city_prefix_is_rejoined() {
        let parsed = parse_address("BOULEVARD (POB), SAN 133, CARLOS CITY, 2420");
        assert_eq!(parsed.city.as_deref(), Some("San Carlos City"));
        assert_eq!(parsed.barangay.as_deref(), Some("Poblacion"));
        assert_eq!(parsed.street_address.as_deref(), Some("133"));
        assert_eq!(parsed.postal_code.as_deref(), Some("2420"));
    }

    #[test]
    fn test_prefix_inside_barangay_name_stays_put() {
        let parsed = parse_address("Brgy San Roque, Valenzuela City, 1440");
        assert_eq!(parsed.city.as_deref(), Some("Valenzuela City"));
        assert_eq!(parsed.barangay.as_deref(), Some("San Roque"));
        assert_eq!(parsed.postal_code.as_deref(), Some("1440"));

        let parsed = parse_address("12 San Jose St, Pasig City");
        assert_eq!(parsed.city.as_deref(), Some("Pasig City"));
    }

    #[test]
    fn test_municipality_pattern() {
        let parsed = parse_address("Poblacion, Pateros Municipality, 1620");
        assert_eq!(parsed.city.as_deref(), Some("Pateros Municipality"));
        assert_eq!(parsed.barangay.as_deref(), Some("Poblacion"));
        assert_eq!(parsed.postal_code.as_deref(), Some("1620"));
    }

    #[test]
    fn test_barangay_label_fallback() {
        let parsed = parse_address("Brgy. Malinta, Valenzuela City");
        assert_eq!(parsed.barangay.as_deref(), Some("Malinta"));
        assert_eq!(parsed.city.as_deref(), Some("Valenzuela City"));
    }

    #[test]
    fn test_city_keyword_repair_before_parsing() {
        let full = normalize_address(&["San Carlos GITY".to_string()]);
        assert_eq!(full, "San Carlos CITY");
        assert_eq!(parse_address(&full).city.as_deref(), Some("San Carlos City"));
    }

    #[test]
    fn test_no_address_section() {
        assert!(!extract(&doc(&["DELA CRUZ, JUAN", "A12-23-003519"])).acted);
    }
}
