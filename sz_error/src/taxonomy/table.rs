//! Code to category lookup table
//!
//! A [`Taxonomy`] is the compatibility contract with the engine's error code
//! space. Built-in tables are compiled from TOML by build.rs; the same TOML
//! schema can be loaded at runtime to override or extend them.

use super::builtin;
use super::error::{TaxonomyError, TaxonomyResult};
use super::tags::CategoryTag;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, OnceLock};

/// Upper bound on codes a single range may expand to
const MAX_RANGE_SPAN: u64 = 100_000;

static SZ_TAXONOMY: OnceLock<Arc<Taxonomy>> = OnceLock::new();
static G2_TAXONOMY: OnceLock<Arc<Taxonomy>> = OnceLock::new();

/// Engine code space generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Generation {
    /// Current code space
    #[default]
    Sz,
    /// Legacy code space
    G2,
}

impl Generation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Generation::Sz => "sz",
            Generation::G2 => "g2",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "sz" | "current" => Some(Generation::Sz),
            "g2" | "legacy" => Some(Generation::G2),
            _ => None,
        }
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable mapping from engine error code to an ordered tag list
#[derive(Debug, Clone)]
pub struct Taxonomy {
    name: String,
    version: String,
    entries: HashMap<u64, Arc<[CategoryTag]>>,
}

// On-disk schema, shared with build.rs
#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    #[serde(default)]
    taxonomy: TaxonomyHeader,
    #[serde(default)]
    codes: BTreeMap<String, Vec<CategoryTag>>,
    #[serde(default)]
    ranges: Vec<RangeEntry>,
}

#[derive(Debug, Deserialize)]
struct TaxonomyHeader {
    name: String,
    #[serde(default)]
    version: String,
}

impl Default for TaxonomyHeader {
    fn default() -> Self {
        Self {
            name: "custom".to_string(),
            version: String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RangeEntry {
    first: u64,
    last: u64,
    tags: Vec<CategoryTag>,
}

impl Taxonomy {
    /// Build a table from static data. Entries are trusted to be validated already.
    pub fn from_static(name: &str, version: &str, entries: &[(u64, &[CategoryTag])]) -> Self {
        let entries = entries
            .iter()
            .filter(|(_, tags)| !tags.is_empty())
            .map(|(code, tags)| (*code, Arc::from(*tags)))
            .collect();

        Self {
            name: name.to_string(),
            version: version.to_string(),
            entries,
        }
    }

    /// Shared built-in table for a generation, built once per process
    pub fn builtin(generation: Generation) -> Arc<Taxonomy> {
        let cell = match generation {
            Generation::Sz => &SZ_TAXONOMY,
            Generation::G2 => &G2_TAXONOMY,
        };

        cell.get_or_init(|| {
            let taxonomy = match generation {
                Generation::Sz => {
                    Taxonomy::from_static(builtin::sz::NAME, builtin::sz::VERSION, builtin::sz::ENTRIES)
                }
                Generation::G2 => {
                    Taxonomy::from_static(builtin::g2::NAME, builtin::g2::VERSION, builtin::g2::ENTRIES)
                }
            };
            log::debug!(
                "Loaded built-in taxonomy '{}' v{} ({} codes)",
                taxonomy.name,
                taxonomy.version,
                taxonomy.len()
            );
            Arc::new(taxonomy)
        })
        .clone()
    }

    /// Shared table for the current code space
    pub fn current() -> Arc<Taxonomy> {
        Self::builtin(Generation::Sz)
    }

    /// Parse a table from TOML text
    pub fn from_toml_str(content: &str) -> TaxonomyResult<Self> {
        let file: TaxonomyFile = toml::from_str(content)?;
        let mut entries: HashMap<u64, Arc<[CategoryTag]>> = HashMap::new();

        for (key, tags) in file.codes {
            let code = key
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|code| *code > 0)
                .ok_or_else(|| TaxonomyError::InvalidCode { key: key.clone() })?;
            insert_entry(&mut entries, code, &tags)?;
        }

        for range in file.ranges {
            if range.first == 0
                || range.first > range.last
                || range.last - range.first >= MAX_RANGE_SPAN
            {
                return Err(TaxonomyError::InvalidRange {
                    first: range.first,
                    last: range.last,
                });
            }
            for code in range.first..=range.last {
                insert_entry(&mut entries, code, &range.tags)?;
            }
        }

        Ok(Self {
            name: file.taxonomy.name,
            version: file.taxonomy.version,
            entries,
        })
    }

    /// Load a table from a TOML file
    pub fn load(path: &Path) -> TaxonomyResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| TaxonomyError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match Self::from_toml_str(&content) {
            Ok(taxonomy) => {
                log::debug!(
                    "Loaded taxonomy '{}' from {} ({} codes)",
                    taxonomy.name,
                    path.display(),
                    taxonomy.len()
                );
                Ok(taxonomy)
            }
            Err(e) => {
                log::warn!("[{}] Rejected taxonomy file {}: {}", e.error_code(), path.display(), e);
                Err(e)
            }
        }
    }

    /// Tags for `code`, innermost wrapper first. Empty when the code is unknown.
    pub fn lookup(&self, code: u64) -> &[CategoryTag] {
        self.entries.get(&code).map(|tags| &tags[..]).unwrap_or(&[])
    }

    pub(crate) fn lookup_shared(&self, code: u64) -> Option<Arc<[CategoryTag]>> {
        self.entries.get(&code).cloned()
    }

    pub fn contains(&self, code: u64) -> bool {
        self.entries.contains_key(&code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Known codes in ascending order
    pub fn codes(&self) -> Vec<u64> {
        let mut codes: Vec<u64> = self.entries.keys().copied().collect();
        codes.sort_unstable();
        codes
    }

    /// All entries in ascending code order
    pub fn entries(&self) -> Vec<(u64, &[CategoryTag])> {
        let mut entries: Vec<(u64, &[CategoryTag])> = self
            .entries
            .iter()
            .map(|(code, tags)| (*code, &tags[..]))
            .collect();
        entries.sort_unstable_by_key(|(code, _)| *code);
        entries
    }

    /// A new table with `other`'s entries replacing or extending this one's.
    /// Name and version are taken from `other`.
    pub fn overlay(&self, other: &Taxonomy) -> Taxonomy {
        let mut entries = self.entries.clone();
        for (code, tags) in &other.entries {
            entries.insert(*code, tags.clone());
        }

        Taxonomy {
            name: other.name.clone(),
            version: other.version.clone(),
            entries,
        }
    }
}

fn insert_entry(
    entries: &mut HashMap<u64, Arc<[CategoryTag]>>,
    code: u64,
    tags: &[CategoryTag],
) -> TaxonomyResult<()> {
    if tags.is_empty() {
        return Ok(());
    }
    if !tags.iter().any(|tag| tag.is_umbrella()) {
        return Err(TaxonomyError::MissingUmbrella { code });
    }
    if entries.insert(code, Arc::from(tags)).is_some() {
        return Err(TaxonomyError::DuplicateCode { code });
    }
    Ok(())
}
