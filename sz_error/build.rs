// build.rs - TOML-driven taxonomy table generation
use std::collections::BTreeMap;
use std::env;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// Generations compiled into the crate, in generation order.
const GENERATIONS: &[&str] = &["sz", "g2"];

const UMBRELLA_TAGS: &[&str] = &[
    "BadInput",
    "Base",
    "Configuration",
    "Retryable",
    "Unrecoverable",
];

const DETAIL_TAGS: &[&str] = &[
    "Database",
    "DatabaseConnectionLost",
    "License",
    "NotFound",
    "NotInitialized",
    "ReplaceConflict",
    "RetryTimeoutExceeded",
    "Unhandled",
    "UnknownDataSource",
];

/// Alternate spellings accepted for a tag, mirroring the serde aliases on CategoryTag
const TAG_ALIASES: &[(&str, &str)] = &[("General", "Base")];

/// Upper bound on codes a single range may expand to
const MAX_RANGE_SPAN: u64 = 100_000;

#[derive(serde::Deserialize)]
struct TaxonomyFile {
    taxonomy: TaxonomyHeader,
    #[serde(default)]
    codes: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    ranges: Vec<RangeEntry>,
}

#[derive(serde::Deserialize)]
struct TaxonomyHeader {
    name: String,
    version: String,
}

#[derive(serde::Deserialize)]
struct RangeEntry {
    first: u64,
    last: u64,
    tags: Vec<String>,
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=SZ_ERROR_TAXONOMY_DIR");

    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap();
    let taxonomy_dir = env::var("SZ_ERROR_TAXONOMY_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| Path::new(&manifest_dir).join("taxonomy"));
    println!(
        "cargo:rustc-env=SZ_ERROR_BUILD_TAXONOMY_DIR={}",
        taxonomy_dir.display()
    );

    let mut generated = String::from(
        "// Generated taxonomy tables from TOML data\n// DO NOT EDIT - Generated by build.rs\n",
    );

    for generation in GENERATIONS {
        let path = taxonomy_dir.join(format!("{}.toml", generation));
        println!("cargo:rerun-if-changed={}", path.display());

        if !path.exists() {
            panic!(
                "Taxonomy file not found: {}\nTaxonomy dir: {}",
                path.display(),
                taxonomy_dir.display()
            );
        }

        let content = fs::read_to_string(&path)
            .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));

        let file: TaxonomyFile = toml::from_str(&content)
            .unwrap_or_else(|e| panic!("Invalid TOML in {}: {}", path.display(), e));

        let entries = collect_entries(&file, &path);
        generate_module(&mut generated, generation, &file.taxonomy, &path, &entries);
    }

    let out_dir = env::var("OUT_DIR").unwrap();
    let output_path = Path::new(&out_dir).join("taxonomy_tables.rs");
    fs::write(output_path, generated).unwrap();
}

fn collect_entries(file: &TaxonomyFile, path: &Path) -> BTreeMap<u64, Vec<String>> {
    let mut entries: BTreeMap<u64, Vec<String>> = BTreeMap::new();

    for (key, tags) in &file.codes {
        let code: u64 = key
            .trim()
            .parse()
            .unwrap_or_else(|_| panic!("{}: code '{}' is not an integer", path.display(), key));
        insert_entry(&mut entries, code, tags, path);
    }

    for range in &file.ranges {
        if range.first > range.last || range.last - range.first >= MAX_RANGE_SPAN {
            panic!(
                "{}: invalid range {}..={}",
                path.display(),
                range.first,
                range.last
            );
        }
        for code in range.first..=range.last {
            insert_entry(&mut entries, code, &range.tags, path);
        }
    }

    entries
}

fn canonical_tag(tag: &str) -> &str {
    TAG_ALIASES
        .iter()
        .find(|(alias, _)| *alias == tag)
        .map(|(_, canonical)| *canonical)
        .unwrap_or(tag)
}

fn insert_entry(entries: &mut BTreeMap<u64, Vec<String>>, code: u64, tags: &[String], path: &Path) {
    let tags: Vec<String> = tags.iter().map(|t| canonical_tag(t).to_string()).collect();
    if code == 0 {
        panic!("{}: code 0 is reserved for 'no code'", path.display());
    }
    for tag in &tags {
        if !UMBRELLA_TAGS.contains(&tag.as_str()) && !DETAIL_TAGS.contains(&tag.as_str()) {
            panic!("{}: code {} uses unknown tag '{}'", path.display(), code, tag);
        }
    }
    if !tags.is_empty() && !tags.iter().any(|t| UMBRELLA_TAGS.contains(&t.as_str())) {
        panic!(
            "{}: code {} has no umbrella tag (one of {:?})",
            path.display(),
            code,
            UMBRELLA_TAGS
        );
    }
    if tags.is_empty() {
        return;
    }
    if entries.insert(code, tags).is_some() {
        panic!("{}: code {} is defined more than once", path.display(), code);
    }
}

fn generate_module(
    out: &mut String,
    generation: &str,
    header: &TaxonomyHeader,
    path: &Path,
    entries: &BTreeMap<u64, Vec<String>>,
) {
    writeln!(out).unwrap();
    writeln!(out, "pub mod {} {{", generation).unwrap();
    writeln!(out, "    use crate::taxonomy::CategoryTag;").unwrap();
    writeln!(out).unwrap();
    writeln!(out, "    pub const NAME: &str = {:?};", header.name).unwrap();
    writeln!(out, "    pub const VERSION: &str = {:?};", header.version).unwrap();
    writeln!(out, "    pub const SOURCE: &str = {:?};", path.display().to_string()).unwrap();
    writeln!(out).unwrap();
    writeln!(out, "    pub static ENTRIES: &[(u64, &[CategoryTag])] = &[").unwrap();
    for (code, tags) in entries {
        let tags = tags
            .iter()
            .map(|t| format!("CategoryTag::{}", t))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(out, "        ({}, &[{}]),", code, tags).unwrap();
    }
    writeln!(out, "    ];").unwrap();
    writeln!(out, "}}").unwrap();
}
