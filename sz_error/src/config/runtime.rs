// RUNTIME PREFERENCES

use crate::taxonomy::Generation;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

/// Environment variables read by [`ClassifierPreferences::default`]
pub mod env_vars {
    /// `sz` / `current` or `g2` / `legacy`
    pub const GENERATION: &str = "SZ_ERROR_GENERATION";

    /// Path of a taxonomy TOML file overlaid on the built-in table
    pub const TAXONOMY_FILE: &str = "SZ_ERROR_TAXONOMY_FILE";
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifierPreferences {
    /// Built-in table to classify against
    pub generation: Generation,

    /// Site-specific entries layered over the built-in table
    pub taxonomy_file: Option<PathBuf>,
}

impl Default for ClassifierPreferences {
    fn default() -> Self {
        Self {
            generation: env::var(env_vars::GENERATION)
                .ok()
                .and_then(|v| parse_generation(&v))
                .unwrap_or_default(),
            taxonomy_file: env::var(env_vars::TAXONOMY_FILE)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }
}

impl ClassifierPreferences {
    /// Preferences for a built-in table with no overlay, ignoring the environment
    pub fn for_generation(generation: Generation) -> Self {
        Self {
            generation,
            taxonomy_file: None,
        }
    }
}

/// Parse generation from string (used for environment variables)
fn parse_generation(value: &str) -> Option<Generation> {
    let parsed = Generation::from_str(value);
    if parsed.is_none() {
        log::warn!(
            "Ignoring {}={:?}; expected sz or g2",
            env_vars::GENERATION,
            value
        );
    }
    parsed
}
