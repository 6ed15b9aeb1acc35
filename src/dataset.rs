//! Tabular data model shared by every stage of reconciliation.
//!
//! A [`Dataset`] is an ordered header list plus a sequence of [`Record`]s. A
//! record maps column labels to [`Scalar`] cells. Records are ordered maps so
//! that field iteration, and therefore every derived output, is deterministic
//! across runs.
//!
//! [`ReconciledDataset`] is the terminal artifact of a reconciliation pass. It
//! only hands out shared references; views are derived from it, never written
//! back into it.

use std::{collections::BTreeMap, collections::HashSet, fmt};

use serde::{Deserialize, Serialize};

use crate::error::{DatasetError, DatasetResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
    #[default]
    Empty,
}

impl Scalar {
    pub fn from_raw(raw: &str) -> Self {
        if raw.is_empty() {
            Scalar::Empty
        } else {
            Scalar::Text(raw.to_string())
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Scalar::Empty => String::new(),
            Scalar::Text(s) => s.clone(),
            Scalar::Number(n) => {
                if *n == 0.0 {
                    "0".to_string()
                } else if n.fract() == 0.0 && n.is_finite() {
                    format!("{n:.0}")
                } else {
                    n.to_string()
                }
            }
        }
    }

    pub fn is_blank(&self) -> bool {
        match self {
            Scalar::Empty => true,
            Scalar::Text(s) => s.trim().is_empty(),
            Scalar::Number(_) => false,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::from_raw(value)
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        if value.is_empty() {
            Scalar::Empty
        } else {
            Scalar::Text(value)
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

pub type Record = BTreeMap<String, Scalar>;

pub fn record<K, V, I>(fields: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Scalar>,
{
    fields
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Record>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Record>) -> DatasetResult<Self> {
        validate_headers(&headers)?;
        Ok(Self { headers, rows })
    }

    pub fn from_records(headers: Vec<String>, records: Vec<Vec<String>>) -> DatasetResult<Self> {
        validate_headers(&headers)?;
        let mut rows = Vec::with_capacity(records.len());
        for (idx, raw) in records.into_iter().enumerate() {
            if raw.len() != headers.len() {
                return Err(DatasetError::RowWidth {
                    row: idx + 1,
                    expected: headers.len(),
                    found: raw.len(),
                });
            }
            rows.push(
                headers
                    .iter()
                    .zip(raw)
                    .map(|(header, value)| (header.clone(), Scalar::from(value)))
                    .collect(),
            );
        }
        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn validate_headers(headers: &[String]) -> DatasetResult<()> {
    if headers.is_empty() {
        return Err(DatasetError::EmptyHeaders);
    }
    let mut seen = HashSet::with_capacity(headers.len());
    for (idx, header) in headers.iter().enumerate() {
        if !seen.insert(header.as_str()) {
            return Err(DatasetError::DuplicateHeader {
                header: header.clone(),
                position: idx + 1,
            });
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledDataset {
    headers: Vec<String>,
    rows: Vec<Record>,
}

impl ReconciledDataset {
    pub(crate) fn new(headers: Vec<String>, rows: Vec<Record>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn value(&self, row: usize, header: &str) -> Option<&Scalar> {
        self.rows.get(row).and_then(|r| r.get(header))
    }

    pub fn to_string_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| string_row(&self.headers, row))
            .collect()
    }
}

pub fn string_row(headers: &[String], row: &Record) -> Vec<String> {
    headers
        .iter()
        .map(|h| row.get(h).map(Scalar::as_display).unwrap_or_default())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn scalar_display_trims_integral_numbers() {
        assert_eq!(Scalar::Number(42.0).as_display(), "42");
        assert_eq!(Scalar::Number(4.5).as_display(), "4.5");
        assert_eq!(Scalar::Empty.as_display(), "");
    }

    #[test]
    fn large_integral_numbers_display_without_saturating() {
        assert_eq!(Scalar::Number(1e20).as_display(), "100000000000000000000");
        assert_eq!(Scalar::Number(-3e19).as_display(), "-30000000000000000000");
        assert_ne!(
            Scalar::Number(1e20).as_display(),
            Scalar::Number(2e20).as_display()
        );
        assert_eq!(Scalar::Number(-0.0).as_display(), "0");
    }

    #[test]
    fn whitespace_text_counts_as_blank() {
        assert!(Scalar::from("   ").is_blank());
        assert!(!Scalar::from("x").is_blank());
        assert!(!Scalar::Number(0.0).is_blank());
    }

    #[test]
    fn duplicate_headers_are_rejected() {
        let err = Dataset::new(headers(&["A", "B", "A"]), Vec::new()).unwrap_err();
        assert_eq!(
            err,
            DatasetError::DuplicateHeader {
                header: "A".into(),
                position: 3
            }
        );
    }

    #[test]
    fn empty_header_list_is_rejected() {
        assert_eq!(
            Dataset::new(Vec::new(), Vec::new()).unwrap_err(),
            DatasetError::EmptyHeaders
        );
    }

    #[test]
    fn from_records_checks_row_width() {
        let err = Dataset::from_records(
            headers(&["A", "B"]),
            vec![vec!["1".into(), "2".into()], vec!["3".into()]],
        )
        .unwrap_err();
        assert_eq!(
            err,
            DatasetError::RowWidth {
                row: 2,
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn from_records_maps_empty_cells_to_empty() {
        let dataset =
            Dataset::from_records(headers(&["A", "B"]), vec![vec!["x".into(), String::new()]])
                .unwrap();
        assert_eq!(dataset.rows()[0].get("B"), Some(&Scalar::Empty));
        assert_eq!(dataset.rows()[0].get("A"), Some(&Scalar::from("x")));
    }
}
