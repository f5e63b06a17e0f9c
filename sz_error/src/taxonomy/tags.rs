//! Category tags for engine errors
//!
//! Two tiers share one enum. Umbrella tags answer membership queries;
//! detail tags only refine an umbrella and shape the wrapper chain.
//!
//! ```text
//! Base
//! ├── BadInput
//! │   ├── NotFound
//! │   └── UnknownDataSource
//! ├── Configuration
//! ├── ReplaceConflict (under Base)
//! ├── Retryable
//! │   ├── DatabaseConnectionLost
//! │   └── RetryTimeoutExceeded
//! └── Unrecoverable
//!     ├── Database
//!     ├── License
//!     ├── NotInitialized
//!     └── Unhandled
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// A taxonomy label attached to an engine error code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CategoryTag {
    // Umbrella tags
    BadInput,
    #[serde(alias = "General")]
    Base,
    Configuration,
    Retryable,
    Unrecoverable,

    // Detail tags
    Database,
    DatabaseConnectionLost,
    License,
    NotFound,
    NotInitialized,
    ReplaceConflict,
    RetryTimeoutExceeded,
    Unhandled,
    UnknownDataSource,
}

impl CategoryTag {
    /// The five membership-bearing tags
    pub const UMBRELLA: [CategoryTag; 5] = [
        CategoryTag::BadInput,
        CategoryTag::Base,
        CategoryTag::Configuration,
        CategoryTag::Retryable,
        CategoryTag::Unrecoverable,
    ];

    /// Every tag, umbrella tags first
    pub const ALL: [CategoryTag; 14] = [
        CategoryTag::BadInput,
        CategoryTag::Base,
        CategoryTag::Configuration,
        CategoryTag::Retryable,
        CategoryTag::Unrecoverable,
        CategoryTag::Database,
        CategoryTag::DatabaseConnectionLost,
        CategoryTag::License,
        CategoryTag::NotFound,
        CategoryTag::NotInitialized,
        CategoryTag::ReplaceConflict,
        CategoryTag::RetryTimeoutExceeded,
        CategoryTag::Unhandled,
        CategoryTag::UnknownDataSource,
    ];

    pub fn is_umbrella(&self) -> bool {
        matches!(
            self,
            CategoryTag::BadInput
                | CategoryTag::Base
                | CategoryTag::Configuration
                | CategoryTag::Retryable
                | CategoryTag::Unrecoverable
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryTag::BadInput => "BadInput",
            CategoryTag::Base => "Base",
            CategoryTag::Configuration => "Configuration",
            CategoryTag::Retryable => "Retryable",
            CategoryTag::Unrecoverable => "Unrecoverable",
            CategoryTag::Database => "Database",
            CategoryTag::DatabaseConnectionLost => "DatabaseConnectionLost",
            CategoryTag::License => "License",
            CategoryTag::NotFound => "NotFound",
            CategoryTag::NotInitialized => "NotInitialized",
            CategoryTag::ReplaceConflict => "ReplaceConflict",
            CategoryTag::RetryTimeoutExceeded => "RetryTimeoutExceeded",
            CategoryTag::Unhandled => "Unhandled",
            CategoryTag::UnknownDataSource => "UnknownDataSource",
        }
    }

    /// Case-insensitive parse; "General" is accepted for `Base`.
    pub fn from_str(s: &str) -> Option<Self> {
        if s.eq_ignore_ascii_case("general") {
            return Some(CategoryTag::Base);
        }
        Self::ALL
            .iter()
            .copied()
            .find(|tag| tag.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
