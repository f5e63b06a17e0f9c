//! Category membership queries on error chains

use super::error::ClassifiedError;
use crate::taxonomy::CategoryTag;
use std::error::Error;

/// Outermost umbrella layer of `err`'s chain.
///
/// Walks `source()` from `err` inward, skipping detail layers and foreign
/// errors, and returns the first layer that stores a tag list.
pub fn classification<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a ClassifiedError> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(layer) = e.downcast_ref::<ClassifiedError>() {
            if layer.is_umbrella() {
                return Some(layer);
            }
        }
        current = e.source();
    }
    None
}

/// Complete tag list `err` was classified with, if any
pub fn tags_of<'a>(err: &'a (dyn Error + 'static)) -> Option<&'a [CategoryTag]> {
    classification(err).and_then(|layer| layer.tags())
}

/// Whether `err` carries `tag`.
///
/// Only the umbrella layer's stored list is consulted. Detail tags of a
/// multi-tag entry are in that list, so `is(err, NotFound)` works too.
pub fn is(err: &(dyn Error + 'static), tag: CategoryTag) -> bool {
    classification(err).is_some_and(|layer| layer.has_tag(tag))
}

/// Whether `err` carries any of `tags`
pub fn is_in_list(err: &(dyn Error + 'static), tags: &[CategoryTag]) -> bool {
    tags.iter().any(|tag| is(err, *tag))
}

/// Category queries as methods on any error
pub trait SzErrorExt {
    fn is_sz(&self, tag: CategoryTag) -> bool;

    fn is_sz_any(&self, tags: &[CategoryTag]) -> bool {
        tags.iter().any(|tag| self.is_sz(*tag))
    }

    /// Transient; the call may succeed if repeated
    fn is_retryable(&self) -> bool {
        self.is_sz(CategoryTag::Retryable)
    }

    fn is_bad_input(&self) -> bool {
        self.is_sz(CategoryTag::BadInput)
    }

    fn is_configuration(&self) -> bool {
        self.is_sz(CategoryTag::Configuration)
    }

    fn is_unrecoverable(&self) -> bool {
        self.is_sz(CategoryTag::Unrecoverable)
    }
}

impl SzErrorExt for dyn Error + 'static {
    fn is_sz(&self, tag: CategoryTag) -> bool {
        is(self, tag)
    }
}

impl SzErrorExt for dyn Error + Send + Sync + 'static {
    fn is_sz(&self, tag: CategoryTag) -> bool {
        is(self, tag)
    }
}

impl SzErrorExt for ClassifiedError {
    fn is_sz(&self, tag: CategoryTag) -> bool {
        is(self, tag)
    }
}
