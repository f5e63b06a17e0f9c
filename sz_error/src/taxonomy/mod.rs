//! Taxonomy of engine error codes
//!
//! Maps numeric engine error codes to ordered lists of [`CategoryTag`]s.
//! Tables are static, process-wide data; lookups need no synchronization.

mod builtin;
pub mod error;
pub mod table;
pub mod tags;

pub use error::{TaxonomyError, TaxonomyResult};
pub use table::{Generation, Taxonomy};
pub use tags::CategoryTag;

/// Built-in table provenance, for diagnostics
pub fn builtin_source(generation: Generation) -> &'static str {
    match generation {
        Generation::Sz => builtin::sz::SOURCE,
        Generation::G2 => builtin::g2::SOURCE,
    }
}
