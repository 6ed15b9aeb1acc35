use std::{
    collections::HashSet,
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

use chrono::NaiveDate;
use log::{debug, info, warn};
use serde::Serialize;

use crate::{
    compose::{compose, merged_columns},
    dataset::{Dataset, ReconciledDataset},
    dates::find_latest_date_column,
    group::{ColumnGroup, SelectionPolicy, select_column_group},
    header::normalize,
    join::{JoinSide, JoinStats, join_source, resolve_identifiers},
    serial::{SerialCollapse, collapse_serial_columns},
};

#[derive(Debug, Clone)]
pub struct AuxiliarySource {
    pub label: String,
    pub policy: SelectionPolicy,
    pub dataset: Dataset,
}

impl AuxiliarySource {
    pub fn new(label: impl Into<String>, policy: SelectionPolicy, dataset: Dataset) -> Self {
        Self {
            label: label.into(),
            policy,
            dataset,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    MissingIdentifierColumn { side: JoinSide },
    NoDateColumnFound,
    HeaderCollision { column: String },
    EmptyColumnGroup,
    NoMatchingRows { primary_rows: usize },
}

impl Notice {
    pub fn severity(&self) -> Severity {
        match self {
            Notice::NoDateColumnFound => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::MissingIdentifierColumn { side } => {
                let side = match side {
                    JoinSide::Primary => "primary",
                    JoinSide::Auxiliary => "auxiliary",
                };
                write!(f, "{side} dataset has no identifier column; source skipped")
            }
            Notice::NoDateColumnFound => {
                write!(f, "no date-stamped column found; fallback selection used")
            }
            Notice::HeaderCollision { column } => {
                write!(f, "column '{column}' already exists; keeping existing values")
            }
            Notice::EmptyColumnGroup => write!(f, "no columns qualified for merging"),
            Notice::NoMatchingRows { primary_rows } => write!(
                f,
                "none of {primary_rows} primary row(s) matched; merged columns left empty"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SourceReport {
    pub index: usize,
    pub label: String,
    pub policy: SelectionPolicy,
    pub anchor: Option<String>,
    pub anchor_date: Option<NaiveDate>,
    pub merged_columns: Vec<String>,
    pub stats: JoinStats,
    pub notices: Vec<Notice>,
}

impl SourceReport {
    fn new(index: usize, source: &AuxiliarySource) -> Self {
        Self {
            index,
            label: source.label.clone(),
            policy: source.policy,
            anchor: None,
            anchor_date: None,
            merged_columns: Vec::new(),
            stats: JoinStats::default(),
            notices: Vec::new(),
        }
    }

    pub fn is_skipped(&self) -> bool {
        self.notices
            .iter()
            .any(|n| matches!(n, Notice::MissingIdentifierColumn { .. }))
    }

    pub fn has_warnings(&self) -> bool {
        self.notices
            .iter()
            .any(|n| n.severity() == Severity::Warning)
    }

    fn note(&mut self, notice: Notice) {
        match notice.severity() {
            Severity::Warning => warn!("Source '{}': {notice}", self.label),
            Severity::Info => info!("Source '{}': {notice}", self.label),
        }
        self.notices.push(notice);
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reconciliation {
    pub dataset: ReconciledDataset,
    pub reports: Vec<SourceReport>,
    pub serial: SerialCollapse,
}

impl Reconciliation {
    pub fn warnings(&self) -> impl Iterator<Item = (&SourceReport, &Notice)> {
        self.reports.iter().flat_map(|r| {
            r.notices
                .iter()
                .filter(|n| n.severity() == Severity::Warning)
                .map(move |n| (r, n))
        })
    }
}

pub fn reconcile(primary: &Dataset, sources: &[AuxiliarySource]) -> Reconciliation {
    let mut rows = primary.rows().to_vec();
    let mut taken: HashSet<String> = primary.headers().iter().map(|h| normalize(h)).collect();
    let mut groups: Vec<ColumnGroup> = Vec::with_capacity(sources.len());
    let mut reports = Vec::with_capacity(sources.len());

    let mut order: Vec<usize> = (0..sources.len()).collect();
    // Stable: caller order holds within a policy.
    order.sort_by_key(|&idx| sources[idx].policy.rank());

    for idx in order {
        let source = &sources[idx];
        let mut report = SourceReport::new(idx, source);
        debug!(
            "Merging source '{}' ({}) with {} row(s)",
            source.label,
            source.policy,
            source.dataset.len()
        );

        let (primary_id, auxiliary_id) =
            match resolve_identifiers(primary.headers(), source.dataset.headers()) {
                Ok(ids) => ids,
                Err(side) => {
                    report.note(Notice::MissingIdentifierColumn { side });
                    reports.push(report);
                    continue;
                }
            };

        let latest = find_latest_date_column(source.dataset.headers());
        if latest.is_none() {
            report.note(Notice::NoDateColumnFound);
        }
        report.anchor_date = latest.map(|(_, date)| date);

        let selection = select_column_group(
            source.policy,
            source.dataset.headers(),
            latest.map(|(header, _)| header),
            &taken,
        );
        report.anchor = selection.group.anchor.clone();
        for column in selection.collisions {
            report.note(Notice::HeaderCollision { column });
        }
        if selection.group.is_empty() {
            report.note(Notice::EmptyColumnGroup);
            reports.push(report);
            continue;
        }

        let stats = join_source(
            &mut rows,
            primary_id,
            &source.dataset,
            auxiliary_id,
            &selection.group,
        );
        if stats.matched_rows == 0 && !rows.is_empty() {
            report.note(Notice::NoMatchingRows {
                primary_rows: rows.len(),
            });
        }
        report.stats = stats;
        report.merged_columns = selection.group.members.clone();
        taken.extend(selection.group.members.iter().map(|m| normalize(m)));
        groups.push(selection.group);
        reports.push(report);
    }

    let merged = merged_columns(&groups);
    let mut headers = compose(primary.headers(), &merged, &mut rows);
    let serial = collapse_serial_columns(&mut headers, &mut rows);
    reports.sort_by_key(|r| r.index);

    info!(
        "Reconciled {} row(s): {} column(s), {} merged from {} source(s)",
        rows.len(),
        headers.len(),
        merged.len(),
        sources.len()
    );

    Reconciliation {
        dataset: ReconciledDataset::new(headers, rows),
        reports,
        serial,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PassTicket(u64);

#[derive(Debug, Default)]
pub struct Supersession {
    latest: AtomicU64,
}

impl Supersession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&self) -> PassTicket {
        PassTicket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, ticket: PassTicket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    pub fn accept<T>(&self, ticket: PassTicket, result: T) -> Option<T> {
        if self.is_current(ticket) {
            Some(result)
        } else {
            debug!("Discarding result of superseded pass {}", ticket.0);
            None
        }
    }

    pub fn run(&self, primary: &Dataset, sources: &[AuxiliarySource]) -> Option<Reconciliation> {
        let ticket = self.begin();
        let result = reconcile(primary, sources);
        self.accept(ticket, result)
    }
}
