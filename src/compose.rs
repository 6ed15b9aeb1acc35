use itertools::Itertools;
use log::warn;

use crate::{
    dataset::{Record, Scalar},
    group::ColumnGroup,
    header::{ColumnRole, classify},
};

pub fn merged_columns<'a, I>(groups: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a ColumnGroup>,
{
    groups
        .into_iter()
        .flat_map(|g| g.members.iter().cloned())
        .unique()
        .collect()
}

fn position_of(headers: &[String], role: ColumnRole) -> Option<usize> {
    headers.iter().position(|h| classify(h) == role)
}

pub fn insert_before_identifier(headers: &mut Vec<String>, merged: &[String]) {
    let fresh = merged
        .iter()
        .filter(|m| !headers.contains(m))
        .cloned()
        .collect_vec();
    match position_of(headers, ColumnRole::Identifier) {
        Some(idx) => {
            headers.splice(idx..idx, fresh);
        }
        None => headers.extend(fresh),
    }
}

pub fn reorder_trailing(headers: Vec<String>, merged: &[String]) -> Vec<String> {
    let attribute = position_of(&headers, ColumnRole::Attribute).map(|i| headers[i].clone());
    let identifier = position_of(&headers, ColumnRole::Identifier).map(|i| headers[i].clone());

    let mut ordered = headers
        .into_iter()
        .filter(|h| {
            Some(h) != attribute.as_ref() && Some(h) != identifier.as_ref() && !merged.contains(h)
        })
        .collect_vec();
    ordered.extend(attribute);
    ordered.extend(identifier);
    ordered.extend(merged.iter().cloned());
    ordered
}

// Idempotent.
pub fn restore_invariants(
    headers: Vec<String>,
    merged: &[String],
    rows: &mut [Record],
) -> Vec<String> {
    let mut headers = headers.into_iter().unique().collect_vec();
    let missing = merged
        .iter()
        .filter(|m| !headers.contains(m))
        .cloned()
        .collect_vec();
    if !missing.is_empty() {
        warn!("Re-inserting dropped merged column(s): {missing:?}");
        insert_before_identifier(&mut headers, &missing);
    }
    for row in rows.iter_mut() {
        for header in &headers {
            row.entry(header.clone()).or_insert(Scalar::Empty);
        }
    }
    headers
}

pub fn compose(primary_headers: &[String], merged: &[String], rows: &mut [Record]) -> Vec<String> {
    let mut headers = primary_headers.to_vec();
    if !merged.is_empty() {
        insert_before_identifier(&mut headers, merged);
        headers = reorder_trailing(headers, merged);
    }
    restore_invariants(headers, merged, rows)
}
