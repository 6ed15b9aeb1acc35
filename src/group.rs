use std::{collections::HashSet, fmt, str::FromStr};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::header::{
    is_date_stamped, is_days_offline, is_device_status, is_identifier, is_switch_status,
    normalize,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SelectionPolicy {
    #[serde(alias = "status", alias = "a")]
    StatusSummary,
    #[serde(alias = "tracker", alias = "b")]
    TrackerLog,
}

impl SelectionPolicy {
    pub fn rank(&self) -> u8 {
        match self {
            SelectionPolicy::StatusSummary => 0,
            SelectionPolicy::TrackerLog => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionPolicy::StatusSummary => "status-summary",
            SelectionPolicy::TrackerLog => "tracker-log",
        }
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SelectionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "status" | "status-summary" | "summary" | "a" => Ok(SelectionPolicy::StatusSummary),
            "tracker" | "tracker-log" | "log" | "b" => Ok(SelectionPolicy::TrackerLog),
            other => Err(format!(
                "Unknown source policy '{other}' (expected 'status' or 'tracker')"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ColumnGroup {
    pub anchor: Option<String>,
    pub members: Vec<String>,
}

impl ColumnGroup {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub group: ColumnGroup,
    pub used_fallback: bool,
    pub collisions: Vec<String>,
}

pub fn select_column_group(
    policy: SelectionPolicy,
    headers: &[String],
    latest: Option<&str>,
    taken: &HashSet<String>,
) -> Selection {
    let anchor_position = latest.and_then(|a| headers.iter().position(|h| h == a));
    let (candidates, used_fallback) = match policy {
        SelectionPolicy::StatusSummary => status_summary_candidates(headers, anchor_position),
        SelectionPolicy::TrackerLog => tracker_log_candidates(headers, anchor_position),
    };

    let mut members: Vec<String> = Vec::with_capacity(candidates.len());
    let mut collisions = Vec::new();
    for header in candidates {
        if is_identifier(header) || members.iter().any(|m| m == header) {
            continue;
        }
        if taken.contains(&normalize(header)) {
            collisions.push(header.to_string());
            continue;
        }
        members.push(header.to_string());
    }

    debug!(
        "{policy} selection: anchor={:?} members={:?} fallback={} collisions={:?}",
        latest, members, used_fallback, collisions
    );

    Selection {
        group: ColumnGroup {
            anchor: anchor_position.map(|idx| headers[idx].clone()),
            members,
        },
        used_fallback,
        collisions,
    }
}

fn status_summary_candidates(headers: &[String], anchor: Option<usize>) -> (Vec<&str>, bool) {
    if let Some(start) = anchor {
        let mut picked = Vec::new();
        let mut take_next = false;
        for header in &headers[start + 1..] {
            if is_date_stamped(header) {
                break;
            }
            if take_next {
                picked.push(header.as_str());
                take_next = false;
            } else if is_device_status(header) || is_switch_status(header) {
                picked.push(header.as_str());
            } else if is_days_offline(header) {
                picked.push(header.as_str());
                take_next = true;
            }
        }
        if !picked.is_empty() {
            return (picked, false);
        }
        debug!("No status columns after '{}'; scanning whole header", headers[start]);
    }

    let mut device = false;
    let mut switch = false;
    let mut offline = false;
    let mut picked = Vec::new();
    for header in headers {
        if !device && is_device_status(header) {
            device = true;
            picked.push(header.as_str());
        } else if !switch && is_switch_status(header) {
            switch = true;
            picked.push(header.as_str());
        } else if !offline && is_days_offline(header) {
            offline = true;
            picked.push(header.as_str());
        }
    }
    (picked, true)
}

fn tracker_log_candidates(headers: &[String], anchor: Option<usize>) -> (Vec<&str>, bool) {
    let (start, used_fallback) = match anchor {
        Some(idx) => (Some(idx), false),
        None => (headers.iter().position(|h| is_identifier(h)), true),
    };
    let Some(start) = start else {
        return (Vec::new(), true);
    };
    let picked = headers[start + 1..]
        .iter()
        .filter(|h| !is_identifier(h) && !is_date_stamped(h))
        .map(String::as_str)
        .collect();
    (picked, used_fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn status_summary_takes_the_column_after_days_offline() {
        let h = headers(&[
            "SITE CODE",
            "DATE 01-01-2025",
            "DEVICE STATUS",
            "DAYS OFFLINE",
            "REMARKS",
            "OWNER",
        ]);
        let selection = select_column_group(
            SelectionPolicy::StatusSummary,
            &h,
            Some("DATE 01-01-2025"),
            &HashSet::new(),
        );
        assert_eq!(
            selection.group.members,
            vec!["DEVICE STATUS", "DAYS OFFLINE", "REMARKS"]
        );
        assert!(!selection.used_fallback);
    }

    #[test]
    fn status_summary_scan_stops_at_next_date() {
        let h = headers(&[
            "SITE CODE",
            "DATE 05-01-2025",
            "DEVICE STATUS NEW",
            "DATE 01-01-2025",
            "DEVICE STATUS",
            "DAYS OFFLINE",
        ]);
        let selection = select_column_group(
            SelectionPolicy::StatusSummary,
            &h,
            Some("DATE 05-01-2025"),
            &HashSet::new(),
        );
        assert_eq!(selection.group.members, vec!["DEVICE STATUS NEW"]);
        assert!(!selection.used_fallback);
    }

    #[test]
    fn status_summary_picks_switch_status_after_anchor() {
        let h = headers(&[
            "SITE CODE",
            "DATE 01-01-2025",
            "SWITCH STATUS",
            "NOTE",
            "DEVICE STATUS",
        ]);
        let selection = select_column_group(
            SelectionPolicy::StatusSummary,
            &h,
            Some("DATE 01-01-2025"),
            &HashSet::new(),
        );
        assert_eq!(selection.group.members, vec!["SWITCH STATUS", "DEVICE STATUS"]);
    }

    #[test]
    fn status_summary_rescans_whole_header_when_anchor_block_is_empty() {
        let h = headers(&[
            "SITE CODE",
            "DEVICE STATUS",
            "DAYS OFFLINE",
            "DATE 01-01-2025",
            "REMARKS",
        ]);
        let selection = select_column_group(
            SelectionPolicy::StatusSummary,
            &h,
            Some("DATE 01-01-2025"),
            &HashSet::new(),
        );
        assert_eq!(selection.group.members, vec!["DEVICE STATUS", "DAYS OFFLINE"]);
        assert!(selection.used_fallback);
        assert_eq!(selection.group.anchor.as_deref(), Some("DATE 01-01-2025"));
    }

    #[test]
    fn tracker_log_without_date_starts_after_identifier() {
        let h = headers(&["ZONE", "SITE CODE", "ENGINEER", "ACTION"]);
        let selection =
            select_column_group(SelectionPolicy::TrackerLog, &h, None, &HashSet::new());
        assert_eq!(selection.group.members, vec!["ENGINEER", "ACTION"]);
        assert!(selection.used_fallback);
        assert_eq!(selection.group.anchor, None);
    }

    #[test]
    fn taken_headers_are_reported_as_collisions() {
        let h = headers(&["SITE CODE", "DATE 02-02-2025", "OWNER", "NOTE"]);
        let taken: HashSet<String> = ["owner".to_string()].into_iter().collect();
        let selection = select_column_group(
            SelectionPolicy::TrackerLog,
            &h,
            Some("DATE 02-02-2025"),
            &taken,
        );
        assert_eq!(selection.group.members, vec!["NOTE"]);
        assert_eq!(selection.collisions, vec!["OWNER"]);
    }

    #[test]
    fn policy_parses_from_short_names() {
        assert_eq!("status".parse::<SelectionPolicy>(), Ok(SelectionPolicy::StatusSummary));
        assert_eq!(" Tracker ".parse::<SelectionPolicy>(), Ok(SelectionPolicy::TrackerLog));
        assert!("ledger".parse::<SelectionPolicy>().is_err());
    }
}
