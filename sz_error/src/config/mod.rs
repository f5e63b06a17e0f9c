//! Configuration for sz_error
//! Built-in taxonomy tables are generated at compile time from TOML data

pub mod runtime;

pub use runtime::ClassifierPreferences;

/// Build information about the compiled-in taxonomy tables
pub mod build_info {
    use crate::taxonomy::{builtin_source, Generation, Taxonomy};

    /// Directory the taxonomy TOML files were read from during build
    pub fn taxonomy_dir() -> &'static str {
        option_env!("SZ_ERROR_BUILD_TAXONOMY_DIR").unwrap_or("taxonomy")
    }

    /// Returns taxonomy source information for one generation
    pub fn source_info(generation: Generation) -> String {
        let taxonomy = Taxonomy::builtin(generation);
        format!(
            "Generated from {} ({} v{}, {} codes)",
            builtin_source(generation),
            taxonomy.name(),
            taxonomy.version(),
            taxonomy.len()
        )
    }

}
