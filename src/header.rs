use serde::Serialize;

use crate::dates::parse_embedded_date;

const IDENTIFIER_NAMES: &[&str] = &["site code", "sitecode", "site_code"];
const ATTRIBUTE_NAMES: &[&str] = &["attribute", "attributes"];
const SERIAL_NAMES: &[&str] = &[
    "slno",
    "sl_no",
    "sl no",
    "s.no",
    "s no",
    "serial",
    "serialno",
    "serial_no",
    "serial no",
];

const CIRCLE_NAMES: &[&str] = &["circle", "circle name"];
const DIVISION_NAMES: &[&str] = &["division", "division name", "div"];
const SUB_DIVISION_NAMES: &[&str] = &[
    "sub division",
    "sub-division",
    "subdivision",
    "sub_division",
    "sub division name",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    Identifier,
    DateStamped,
    SerialNumber,
    Attribute,
    Plain,
}

impl ColumnRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnRole::Identifier => "identifier",
            ColumnRole::DateStamped => "date-stamped",
            ColumnRole::SerialNumber => "serial-number",
            ColumnRole::Attribute => "attribute",
            ColumnRole::Plain => "plain",
        }
    }
}

pub fn normalize(header: &str) -> String {
    header.trim().to_lowercase()
}

pub fn classify(header: &str) -> ColumnRole {
    let key = normalize(header);
    if IDENTIFIER_NAMES.contains(&key.as_str()) {
        ColumnRole::Identifier
    } else if ATTRIBUTE_NAMES.contains(&key.as_str()) {
        ColumnRole::Attribute
    } else if is_serial_key(&key) {
        ColumnRole::SerialNumber
    } else if parse_embedded_date(header).is_some() {
        ColumnRole::DateStamped
    } else {
        ColumnRole::Plain
    }
}

fn is_serial_key(key: &str) -> bool {
    SERIAL_NAMES.contains(&key)
        || (key.contains("sl") && key.contains("no"))
        || key.starts_with("sl.")
        || key.starts_with("s.no")
}

pub fn find_role(headers: &[String], role: ColumnRole) -> Option<&str> {
    headers
        .iter()
        .find(|h| classify(h) == role)
        .map(String::as_str)
}

pub fn is_identifier(header: &str) -> bool {
    classify(header) == ColumnRole::Identifier
}

pub fn is_date_stamped(header: &str) -> bool {
    classify(header) == ColumnRole::DateStamped
}

fn words(key: &str) -> impl Iterator<Item = &str> {
    key.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

pub fn is_device_status(header: &str) -> bool {
    let key = normalize(header);
    key.contains("device") && key.contains("status")
}

pub fn is_switch_status(header: &str) -> bool {
    let key = normalize(header);
    let status_like = key.contains("status") || key.contains("state");
    let switch_like = key.contains("switch") || words(&key).any(|w| w == "sw");
    status_like && switch_like
}

pub fn is_days_offline(header: &str) -> bool {
    let key = normalize(header);
    let day_like = key.contains("day");
    let offline_like =
        key.contains("offline") || key.contains("off line") || key.contains("off-line");
    day_like && offline_like
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterRole {
    Circle,
    Division,
    SubDivision,
    DeviceStatus,
}

impl FilterRole {
    pub const ALL: [FilterRole; 4] = [
        FilterRole::Circle,
        FilterRole::Division,
        FilterRole::SubDivision,
        FilterRole::DeviceStatus,
    ];

    pub fn matches(&self, header: &str) -> bool {
        let key = normalize(header);
        match self {
            FilterRole::Circle => CIRCLE_NAMES.contains(&key.as_str()),
            FilterRole::Division => DIVISION_NAMES.contains(&key.as_str()),
            FilterRole::SubDivision => SUB_DIVISION_NAMES.contains(&key.as_str()),
            FilterRole::DeviceStatus => is_device_status(header),
        }
    }

    pub fn resolve<'a>(&self, headers: &'a [String]) -> Option<&'a str> {
        headers
            .iter()
            .find(|h| self.matches(h))
            .map(String::as_str)
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterRole::Circle => "circle",
            FilterRole::Division => "division",
            FilterRole::SubDivision => "sub-division",
            FilterRole::DeviceStatus => "device status",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_trims_and_folds_case() {
        assert_eq!(normalize("  Site Code "), "site code");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn classify_recognises_identifier_variants() {
        for label in ["SITE CODE", " sitecode", "Site_Code"] {
            assert_eq!(classify(label), ColumnRole::Identifier, "{label}");
        }
        assert_eq!(classify("SITE CODES"), ColumnRole::Plain);
    }

    #[test]
    fn classify_recognises_serial_number_families() {
        for label in ["SL NO", "Sl.No", "S.NO.", "serial", "SLNO.", "sl. no"] {
            assert_eq!(classify(label), ColumnRole::SerialNumber, "{label}");
        }
    }

    #[test]
    fn classify_prefers_named_roles_over_dates() {
        assert_eq!(classify("ATTRIBUTES"), ColumnRole::Attribute);
        assert_eq!(classify("DATE 01-01-2025"), ColumnRole::DateStamped);
        assert_eq!(classify("REMARKS"), ColumnRole::Plain);
    }

    #[test]
    fn switch_status_needs_both_tokens() {
        assert!(is_switch_status("SWITCH STATUS"));
        assert!(is_switch_status("sw state"));
        assert!(!is_switch_status("SWITCH"));
        assert!(!is_switch_status("ANSWER STATUS"));
    }

    #[test]
    fn days_offline_needs_both_tokens() {
        assert!(is_days_offline("DAYS OFFLINE"));
        assert!(is_days_offline("No. of days off-line"));
        assert!(!is_days_offline("OFFLINE SINCE"));
    }

    #[test]
    fn sub_division_does_not_resolve_as_division() {
        let headers = vec!["SUB DIVISION".to_string(), "DIVISION".to_string()];
        assert_eq!(FilterRole::Division.resolve(&headers), Some("DIVISION"));
        assert_eq!(FilterRole::SubDivision.resolve(&headers), Some("SUB DIVISION"));
    }
}
