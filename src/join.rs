use std::collections::HashMap;

use log::debug;
use serde::Serialize;

use crate::{
    dataset::{Dataset, Record, Scalar},
    group::ColumnGroup,
    header::{ColumnRole, find_role, normalize},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinSide {
    Primary,
    Auxiliary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct JoinStats {
    pub matched_rows: usize,
    pub unmatched_rows: usize,
    pub duplicate_keys: usize,
}

pub fn join_key(value: Option<&Scalar>) -> String {
    value.map(|v| normalize(&v.as_display())).unwrap_or_default()
}

pub fn resolve_identifiers<'a>(
    primary_headers: &'a [String],
    auxiliary_headers: &'a [String],
) -> Result<(&'a str, &'a str), JoinSide> {
    let primary = find_role(primary_headers, ColumnRole::Identifier).ok_or(JoinSide::Primary)?;
    let auxiliary =
        find_role(auxiliary_headers, ColumnRole::Identifier).ok_or(JoinSide::Auxiliary)?;
    Ok((primary, auxiliary))
}

// On a repeated key the first row wins unless only the newcomer has an anchor date value.
pub fn build_lookup<'a>(
    auxiliary: &'a Dataset,
    identifier: &str,
    anchor: Option<&str>,
) -> (HashMap<String, &'a Record>, usize) {
    let mut map: HashMap<String, &'a Record> = HashMap::with_capacity(auxiliary.len());
    let mut duplicates = 0usize;
    let has_anchor_value = |row: &Record| {
        anchor
            .and_then(|a| row.get(a))
            .is_some_and(|v| !v.is_blank())
    };

    for row in auxiliary.rows() {
        let key = join_key(row.get(identifier));
        if key.is_empty() {
            continue;
        }
        let replace = match map.get(&key) {
            None => true,
            Some(existing) => {
                duplicates += 1;
                has_anchor_value(row) && !has_anchor_value(*existing)
            }
        };
        if replace {
            map.insert(key, row);
        }
    }
    (map, duplicates)
}

pub fn merge_group(
    rows: &mut [Record],
    identifier: &str,
    lookup: &HashMap<String, &Record>,
    group: &ColumnGroup,
) -> JoinStats {
    let mut stats = JoinStats::default();
    for row in rows.iter_mut() {
        let key = join_key(row.get(identifier));
        let matched = if key.is_empty() {
            None
        } else {
            lookup.get(&key)
        };
        match matched {
            Some(source) => {
                stats.matched_rows += 1;
                for member in &group.members {
                    let value = source.get(member).cloned().unwrap_or_default();
                    row.insert(member.clone(), value);
                }
            }
            None => {
                stats.unmatched_rows += 1;
                for member in &group.members {
                    row.insert(member.clone(), Scalar::Empty);
                }
            }
        }
    }
    stats
}

pub fn join_source(
    rows: &mut [Record],
    primary_identifier: &str,
    auxiliary: &Dataset,
    auxiliary_identifier: &str,
    group: &ColumnGroup,
) -> JoinStats {
    let (lookup, duplicate_keys) =
        build_lookup(auxiliary, auxiliary_identifier, group.anchor.as_deref());
    let mut stats = merge_group(rows, primary_identifier, &lookup, group);
    stats.duplicate_keys = duplicate_keys;
    debug!(
        "Joined {} key(s): {} matched, {} unmatched, {} duplicate key(s)",
        lookup.len(),
        stats.matched_rows,
        stats.unmatched_rows,
        stats.duplicate_keys
    );
    stats
}
