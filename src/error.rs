//src/error.rs

use thiserror::Error;

pub type Result<T> = std::result::Result<T, UcError>;

#[derive(Debug, Error)]
pub enum UcError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("line {line} in .uc file has {fields} fields, expected at least 10")]
    MalformedRecord { line: usize, fields: usize },

    #[error("line {line} in taxonomy file is malformed: {reason}")]
    MalformedTaxonomy { line: usize, reason: String },

    #[error("line {line} in taxonomy file repeats identifier '{id}'")]
    DuplicateTaxonomy { line: usize, id: String },

    #[error("line {line} in .uc file: '{id}' not found in taxonomy")]
    UnresolvedId { line: usize, id: String },

    #[error("lineage has {ranks} ranks, only {max} rank prefixes are defined")]
    LineageTooDeep { ranks: usize, max: usize },

    #[error("OTU '{cluster}' has {expected} members but its sample counts sum to {observed}")]
    CountMismatch {
        cluster: String,
        expected: u64,
        observed: u64,
    },
}
