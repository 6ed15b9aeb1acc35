use thiserror::Error;

pub type DatasetResult<T> = Result<T, DatasetError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DatasetError {
    #[error("dataset has no header row")]
    EmptyHeaders,

    #[error("duplicate header '{header}' at column {position}")]
    DuplicateHeader { header: String, position: usize },

    #[error("row {row} has {found} field(s) but the header declares {expected}")]
    RowWidth {
        row: usize,
        expected: usize,
        found: usize,
    },
}
