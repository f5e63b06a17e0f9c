//! Typed classification of entity-resolution engine errors
//!
//! The engine reports failures as text: a bare `<code><severity>|<message>`
//! token, or a JSON log envelope nesting that token several layers deep.
//! This crate recovers the numeric code, looks it up in a taxonomy table and
//! wraps the message in a chain of [`ClassifiedError`] layers whose
//! categories callers can test with [`is`] or [`SzErrorExt`].
//!
//! ```
//! use sz_error::{CategoryTag, SzErrorExt};
//!
//! let err = sz_error::convert("0023E|Conflicting DATA_SOURCE values 'CUSTOMERS' and 'BOB'".into());
//! assert!(err.is_bad_input());
//! assert!(!sz_error::is(&*err, CategoryTag::Unrecoverable));
//! assert_eq!(err.to_string(), "0023E|Conflicting DATA_SOURCE values 'CUSTOMERS' and 'BOB'");
//! ```

// Internal modules
pub mod classify;
pub mod config;
pub mod extract;
pub mod harvest;
pub mod taxonomy;

// Re-export key types for library consumers
pub use classify::{
    cast, classification, convert, default_classifier, is, is_in_list, new, tags_of, BoxError,
    ClassifiedError, Classifier, RawError, SzErrorExt, SzResultExt,
};
pub use config::ClassifierPreferences;
pub use extract::{extract_code, extract_message_text, extract_severity};
pub use harvest::{harvest_candidates, harvest_code, harvest_match, HarvestMatch};
pub use taxonomy::{CategoryTag, Generation, Taxonomy, TaxonomyError, TaxonomyResult};
