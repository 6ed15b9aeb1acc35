use log::debug;
use serde::Serialize;

use crate::{
    dataset::Record,
    header::{ColumnRole, classify},
};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct SerialCollapse {
    pub kept: Option<String>,
    pub dropped: Vec<String>,
}

pub fn serial_fields(headers: &[String], rows: &[Record]) -> Vec<String> {
    let mut found: Vec<String> = headers
        .iter()
        .filter(|h| classify(h) == ColumnRole::SerialNumber)
        .cloned()
        .collect();
    for row in rows {
        for field in row.keys() {
            if !found.contains(field) && classify(field) == ColumnRole::SerialNumber {
                found.push(field.clone());
            }
        }
    }
    found
}

pub fn collapse_serial_columns(headers: &mut Vec<String>, rows: &mut [Record]) -> SerialCollapse {
    let mut fields = serial_fields(headers, rows).into_iter();
    let kept = fields.next();
    let dropped: Vec<String> = fields.collect();
    if dropped.is_empty() {
        return SerialCollapse { kept, dropped };
    }

    headers.retain(|h| !dropped.contains(h));
    for row in rows.iter_mut() {
        for field in &dropped {
            row.remove(field);
        }
    }
    debug!("Kept serial column {kept:?}, dropped {dropped:?}");
    SerialCollapse { kept, dropped }
}

pub fn display_serial(page: usize, page_size: usize, index: usize) -> usize {
    page.saturating_sub(1) * page_size + index + 1
}
