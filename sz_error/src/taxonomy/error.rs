//! Errors raised while loading a taxonomy table at runtime

use std::path::PathBuf;

pub type TaxonomyResult<T> = Result<T, TaxonomyError>;

/// Taxonomy loading and validation errors
#[derive(Debug, thiserror::Error)]
pub enum TaxonomyError {
    #[error("Failed to read taxonomy file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid taxonomy TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Taxonomy code '{key}' is not a positive integer")]
    InvalidCode { key: String },

    #[error("Invalid taxonomy range {first}..={last}")]
    InvalidRange { first: u64, last: u64 },

    #[error("Taxonomy code {code} has no umbrella tag")]
    MissingUmbrella { code: u64 },

    #[error("Taxonomy code {code} is defined more than once")]
    DuplicateCode { code: u64 },
}

impl TaxonomyError {
    /// Short stable identifier for log context
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io { .. } => "TAX001",
            Self::Parse(_) => "TAX002",
            Self::InvalidCode { .. } => "TAX003",
            Self::InvalidRange { .. } => "TAX004",
            Self::MissingUmbrella { .. } => "TAX005",
            Self::DuplicateCode { .. } => "TAX006",
        }
    }
}
