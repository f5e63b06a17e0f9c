//! Error values produced by classification

use crate::taxonomy::CategoryTag;
use std::sync::Arc;

/// Owned, thread-safe error trait object
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Terminal error holding the engine's message verbatim
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct RawError {
    message: String,
}

impl RawError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// One layer of a classified error chain.
///
/// A classified error is a chain of these layers, one per tag of the
/// taxonomy entry, ending in a [`RawError`]. Layers built from umbrella tags
/// also hold the entry's complete tag list, which answers membership queries
/// without walking the chain. Display always delegates to the cause, so the
/// message is the engine's text however deep the chain is.
#[derive(Debug, thiserror::Error)]
#[error("{cause}")]
pub struct ClassifiedError {
    tag: CategoryTag,
    tags: Option<Arc<[CategoryTag]>>,
    #[source]
    cause: BoxError,
}

impl ClassifiedError {
    /// Wrap `cause` in a layer for `tag`. Only umbrella layers keep `tags`.
    pub(crate) fn wrap(cause: BoxError, tag: CategoryTag, tags: &Arc<[CategoryTag]>) -> Self {
        Self {
            tag,
            tags: tag.is_umbrella().then(|| Arc::clone(tags)),
            cause,
        }
    }

    /// Tag this layer was built from
    pub fn tag(&self) -> CategoryTag {
        self.tag
    }

    /// Complete tag list of the entry, for umbrella layers
    pub fn tags(&self) -> Option<&[CategoryTag]> {
        self.tags.as_deref()
    }

    pub(crate) fn shared_tags(&self) -> Option<&Arc<[CategoryTag]>> {
        self.tags.as_ref()
    }

    pub fn is_umbrella(&self) -> bool {
        self.tags.is_some()
    }

    /// Umbrella category of this layer, if it is an umbrella layer
    pub fn umbrella(&self) -> Option<CategoryTag> {
        self.is_umbrella().then_some(self.tag)
    }

    /// Whether `tag` belongs to this layer's stored list
    pub fn has_tag(&self, tag: CategoryTag) -> bool {
        self.tags().is_some_and(|tags| tags.contains(&tag))
    }

    /// Next layer inward
    pub fn cause(&self) -> &(dyn std::error::Error + Send + Sync + 'static) {
        self.cause.as_ref()
    }
}
