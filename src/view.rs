use std::{cmp::Ordering, collections::HashMap, fmt, str::FromStr};

use itertools::Itertools;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::{
    dataset::{ReconciledDataset, Record, Scalar},
    header::{ColumnRole, FilterRole, classify, is_days_offline, normalize},
    serial::display_serial,
};

pub const DEFAULT_ORDER_FIELD: &str = "_id";
pub const SERIAL_HEADER: &str = "SL NO";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub enum PageSize {
    #[default]
    TwentyFive,
    Fifty,
    SeventyFive,
    Hundred,
}

impl PageSize {
    pub const ALL: [PageSize; 4] = [
        PageSize::TwentyFive,
        PageSize::Fifty,
        PageSize::SeventyFive,
        PageSize::Hundred,
    ];

    pub fn value(&self) -> usize {
        match self {
            PageSize::TwentyFive => 25,
            PageSize::Fifty => 50,
            PageSize::SeventyFive => 75,
            PageSize::Hundred => 100,
        }
    }
}

impl TryFrom<usize> for PageSize {
    type Error = String;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        PageSize::ALL
            .into_iter()
            .find(|size| size.value() == value)
            .ok_or_else(|| format!("Page size must be one of 25, 50, 75 or 100 (got {value})"))
    }
}

impl From<PageSize> for usize {
    fn from(size: PageSize) -> Self {
        size.value()
    }
}

impl FromStr for PageSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: usize = s
            .trim()
            .parse()
            .map_err(|_| format!("Invalid page size '{s}'"))?;
        PageSize::try_from(value)
    }
}

impl fmt::Display for PageSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViewerRole {
    #[default]
    Operator,
    Administrator,
}

impl FromStr for ViewerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "operator" | "user" => Ok(ViewerRole::Operator),
            "admin" | "administrator" => Ok(ViewerRole::Administrator),
            other => Err(format!("Unknown viewer role '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ViewQuery {
    pub filters: HashMap<FilterRole, String>,
    pub min_days_offline: Option<f64>,
    pub search: Option<String>,
    pub order_field: Option<String>,
    pub viewer: ViewerRole,
    pub restricted_columns: Vec<String>,
}

impl ViewQuery {
    pub fn with_filter(mut self, role: FilterRole, value: impl Into<String>) -> Self {
        self.filters.insert(role, value.into());
        self
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

// "12 days" -> 12.0, garbage -> 0.0
pub fn parse_permissive_number(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned.parse().unwrap_or(0.0)
}

pub fn visible_headers<'a>(
    dataset: &'a ReconciledDataset,
    viewer: ViewerRole,
    restricted: &[String],
) -> Vec<&'a str> {
    let hidden = restricted.iter().map(|h| normalize(h)).collect_vec();
    dataset
        .headers()
        .iter()
        .filter(|h| viewer == ViewerRole::Administrator || !hidden.contains(&normalize(h)))
        .map(String::as_str)
        .collect()
}

pub fn filter_options(dataset: &ReconciledDataset, role: FilterRole) -> Vec<String> {
    let Some(column) = role.resolve(dataset.headers()) else {
        return Vec::new();
    };
    dataset
        .rows()
        .iter()
        .filter_map(|row| row.get(column))
        .filter(|v| !v.is_blank())
        .map(Scalar::as_display)
        .unique()
        .sorted()
        .collect()
}

#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    headers: Vec<&'a str>,
    rows: Vec<&'a Record>,
}

pub fn apply<'a>(dataset: &'a ReconciledDataset, query: &ViewQuery) -> FilteredView<'a> {
    let headers = visible_headers(dataset, query.viewer, &query.restricted_columns);

    let mut active: Vec<(&str, &str)> = Vec::new();
    for (role, value) in query.filters.iter().sorted_by_key(|(r, _)| r.label()) {
        match role.resolve(dataset.headers()) {
            Some(column) => active.push((column, value.as_str())),
            None => warn!("No {} column in dataset; ignoring filter", role.label()),
        }
    }
    let offline_column = query.min_days_offline.and_then(|min| {
        match dataset.headers().iter().find(|h| is_days_offline(h)) {
            Some(column) => Some((column.as_str(), min)),
            None => {
                warn!("No days-offline column in dataset; ignoring threshold");
                None
            }
        }
    });
    let search = query.search_term();
    let hidden = match query.viewer {
        ViewerRole::Administrator => Vec::new(),
        ViewerRole::Operator => query
            .restricted_columns
            .iter()
            .map(|h| normalize(h))
            .collect_vec(),
    };

    let mut rows = dataset
        .rows()
        .iter()
        .filter(|row| {
            active.iter().all(|(column, wanted)| {
                row.get(*column).map(Scalar::as_display).unwrap_or_default() == *wanted
            })
        })
        .filter(|row| match offline_column {
            Some((column, min)) => {
                let raw = row.get(column).map(Scalar::as_display).unwrap_or_default();
                parse_permissive_number(&raw) >= min
            }
            None => true,
        })
        .filter(|row| match &search {
            Some(term) => row.iter().any(|(field, value)| {
                !hidden.contains(&normalize(field))
                    && value.as_display().to_lowercase().contains(term.as_str())
            }),
            None => true,
        })
        .collect_vec();

    let order_field = query.order_field.as_deref().unwrap_or(DEFAULT_ORDER_FIELD);
    if rows.iter().any(|row| recency(row, order_field).is_some()) {
        rows.sort_by(|a, b| match (recency(a, order_field), recency(b, order_field)) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
    }

    FilteredView { headers, rows }
}

fn recency(row: &Record, field: &str) -> Option<String> {
    row.get(field)
        .filter(|v| !v.is_blank())
        .map(Scalar::as_display)
}

impl<'a> FilteredView<'a> {
    pub fn headers(&self) -> &[&'a str] {
        &self.headers
    }

    pub fn rows(&self) -> &[&'a Record] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn all(&self) -> PageView<'a> {
        PageView {
            headers: self.headers.clone(),
            rows: self
                .rows
                .iter()
                .enumerate()
                .map(|(idx, row)| (idx + 1, *row))
                .collect(),
            page: 1,
            page_count: 1,
            total_rows: self.rows.len(),
        }
    }

    pub fn page(&self, pager: &Pager) -> PageView<'a> {
        let size = pager.page_size().value();
        let page_count = page_count(self.rows.len(), size);
        let page = pager.page().clamp(1, page_count);
        let rows = self
            .rows
            .iter()
            .skip((page - 1) * size)
            .take(size)
            .enumerate()
            .map(|(idx, row)| (display_serial(page, size, idx), *row))
            .collect();
        PageView {
            headers: self.headers.clone(),
            rows,
            page,
            page_count,
            total_rows: self.rows.len(),
        }
    }
}

fn page_count(rows: usize, size: usize) -> usize {
    rows.div_ceil(size).max(1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    page_size: PageSize,
    page: usize,
    row_count: usize,
    search: String,
}

impl Default for Pager {
    fn default() -> Self {
        Self::new(PageSize::default())
    }
}

impl Pager {
    pub fn new(page_size: PageSize) -> Self {
        Self {
            page_size,
            page: 1,
            row_count: 0,
            search: String::new(),
        }
    }

    pub fn sync(&mut self, page_size: PageSize, row_count: usize, search: &str) {
        if page_size != self.page_size || row_count != self.row_count || search != self.search {
            self.page = 1;
        }
        self.page_size = page_size;
        self.row_count = row_count;
        self.search = search.to_string();
    }

    pub fn go_to(&mut self, page: usize) {
        self.page = page.clamp(1, self.page_count());
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> PageSize {
        self.page_size
    }

    pub fn page_count(&self) -> usize {
        page_count(self.row_count, self.page_size.value())
    }
}

#[derive(Debug, Clone)]
pub struct PageView<'a> {
    pub headers: Vec<&'a str>,
    pub rows: Vec<(usize, &'a Record)>,
    pub page: usize,
    pub page_count: usize,
    pub total_rows: usize,
}

impl PageView<'_> {
    pub fn to_string_rows(&self) -> (Vec<String>, Vec<Vec<String>>) {
        let serial_visible = self
            .headers
            .iter()
            .any(|h| classify(h) == ColumnRole::SerialNumber);
        let mut headers = Vec::with_capacity(self.headers.len() + 1);
        if !serial_visible {
            headers.push(SERIAL_HEADER.to_string());
        }
        headers.extend(self.headers.iter().map(|h| h.to_string()));

        let rows = self
            .rows
            .iter()
            .map(|(serial, row)| {
                let mut cells = Vec::with_capacity(headers.len());
                if !serial_visible {
                    cells.push(serial.to_string());
                }
                for header in &self.headers {
                    if classify(header) == ColumnRole::SerialNumber {
                        cells.push(serial.to_string());
                    } else {
                        cells.push(row.get(*header).map(Scalar::as_display).unwrap_or_default());
                    }
                }
                cells
            })
            .collect();
        (headers, rows)
    }
}
