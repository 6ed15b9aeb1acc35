#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use sheet_reconcile::{AuxiliarySource, Dataset, SelectionPolicy};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Builds a dataset from positional string rows.
pub fn dataset(headers: &[&str], rows: &[&[&str]]) -> Dataset {
    Dataset::from_records(
        strings(headers),
        rows.iter().map(|row| strings(row)).collect(),
    )
    .expect("valid dataset")
}

pub fn status_source(dataset: Dataset) -> AuxiliarySource {
    AuxiliarySource::new("status", SelectionPolicy::StatusSummary, dataset)
}

pub fn tracker_source(dataset: Dataset) -> AuxiliarySource {
    AuxiliarySource::new("tracker", SelectionPolicy::TrackerLog, dataset)
}

pub const PRIMARY_CSV: &str = "\
SL NO,CIRCLE,DIVISION,SITE NAME,ATTRIBUTE,SITE CODE,_id
1,North,D1,Hill Top,IN PRODUCTION,S1,0001
2,North,D2,River Side,IN PRODUCTION,S2,0002
3,South,D3,Market,STANDBY,S3,0003
";

pub const STATUS_CSV: &str = "\
SITE CODE,DATE 28-12-2024,OLD STATUS,DATE 01-01-2025,DEVICE STATUS,DAYS OFFLINE,REMARKS
s1,x,ONLINE,x,OFFLINE,4 days,battery
 S2 ,x,ONLINE,x,ONLINE,0,fine
";

pub const TRACKER_CSV: &str = "\
SITE CODE,DATE 03-01-2025,ENGINEER,ACTION
S3,y,Ravi,Replaced modem
";
