//! YAML run configuration.
//!
//! A run file lists the auxiliary exports to merge and the console's view
//! defaults, so a recurring reconciliation does not need a long command line:
//!
//! ```yaml
//! sources:
//!   - path: status_summary.csv
//!     policy: status
//!   - path: tracker.csv
//!     policy: tracker
//!     label: field tracker
//! view:
//!   page_size: 50
//!   order_field: _id
//!   restricted_columns: [CONTACT NUMBER]
//! ```
//!
//! Relative source paths resolve against the directory holding the file.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use crate::{group::SelectionPolicy, view::PageSize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub sources: Vec<SourceConfig>,
    pub view: ViewConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceConfig {
    pub path: PathBuf,
    pub policy: SelectionPolicy,
    #[serde(default)]
    pub label: Option<String>,
}

impl SourceConfig {
    pub fn display_label(&self) -> String {
        self.label.clone().unwrap_or_else(|| label_for_path(&self.path))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    pub page_size: PageSize,
    pub order_field: Option<String>,
    pub restricted_columns: Vec<String>,
}

pub fn label_for_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

impl RunConfig {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).map_err(|err| anyhow!("Invalid run configuration: {err}"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Reading run configuration {path:?}"))?;
        let mut config =
            Self::from_yaml_str(&raw).with_context(|| format!("Parsing {path:?}"))?;
        if let Some(base) = path.parent() {
            for source in &mut config.sources {
                if source.path.is_relative() {
                    source.path = base.join(&source.path);
                }
            }
        }
        Ok(config)
    }

    pub fn to_yaml_string(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Serializing run configuration")
    }
}
