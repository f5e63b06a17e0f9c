//! Classified error construction and conversion
//!
//! [`Classifier::build`] wraps an engine message in one [`ClassifiedError`]
//! layer per tag of its taxonomy entry, innermost tag first:
//!
//! ```text
//! code 33 -> [NotFound, BadInput]
//! BadInput { tags: [NotFound, BadInput] }
//!   -> NotFound
//!     -> RawError("33E|...")
//! ```
//!
//! Wrapping is purely structural: every layer displays the engine's message
//! unchanged.

pub mod error;
pub mod query;

pub use error::{BoxError, ClassifiedError, RawError};
pub use query::{classification, is, is_in_list, tags_of, SzErrorExt};

use crate::config::runtime::ClassifierPreferences;
use crate::harvest::harvest_code;
use crate::taxonomy::{CategoryTag, Generation, Taxonomy, TaxonomyResult};
use std::error::Error;
use std::sync::{Arc, OnceLock};

static DEFAULT_CLASSIFIER: OnceLock<Classifier> = OnceLock::new();

/// Turns engine messages into classified errors against one taxonomy
#[derive(Debug, Clone)]
pub struct Classifier {
    taxonomy: Arc<Taxonomy>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(Taxonomy::current())
    }
}

impl Classifier {
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self { taxonomy }
    }

    /// Classifier over a built-in table
    pub fn for_generation(generation: Generation) -> Self {
        Self::new(Taxonomy::builtin(generation))
    }

    /// Classifier over the preferred generation, overlaid with the preferred
    /// taxonomy file when one is set
    pub fn from_preferences(preferences: &ClassifierPreferences) -> TaxonomyResult<Self> {
        let builtin = Taxonomy::builtin(preferences.generation);
        let taxonomy = match &preferences.taxonomy_file {
            Some(path) => Arc::new(builtin.overlay(&Taxonomy::load(path)?)),
            None => builtin,
        };
        Ok(Self::new(taxonomy))
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Error for `code` displaying `message` verbatim.
    ///
    /// Codes absent from the taxonomy produce a plain [`RawError`] with no
    /// category membership.
    pub fn build(&self, code: u64, message: impl Into<String>) -> BoxError {
        let raw: BoxError = Box::new(RawError::new(message));
        match self.taxonomy.lookup_shared(code) {
            Some(tags) => wrap_error(raw, &tags),
            None => raw,
        }
    }

    /// Classify `original` by the engine code found in its message.
    ///
    /// Without a recoverable code, or with a code the taxonomy does not know,
    /// `original` is returned untouched.
    pub fn convert(&self, original: BoxError) -> BoxError {
        let message = original.to_string();

        let Some(code) = harvest_code(&message) else {
            log::trace!("No engine code in message; passing error through");
            return original;
        };

        let Some(tags) = self.taxonomy.lookup_shared(code) else {
            log::debug!(
                "Engine code {} not in taxonomy '{}'; passing error through",
                code,
                self.taxonomy.name()
            );
            return original;
        };

        log::debug!("Classified engine code {} as {:?}", code, &tags[..]);
        wrap_error(Box::new(RawError::new(message)), &tags)
    }
}

/// Process-wide classifier over the current generation
pub fn default_classifier() -> &'static Classifier {
    DEFAULT_CLASSIFIER.get_or_init(Classifier::default)
}

/// [`Classifier::build`] on the default classifier
pub fn new(code: u64, message: impl Into<String>) -> BoxError {
    default_classifier().build(code, message)
}

/// [`Classifier::convert`] on the default classifier
pub fn convert(original: BoxError) -> BoxError {
    default_classifier().convert(original)
}

/// Give `original` the category shape of `exemplar`, keeping `original`'s text.
///
/// The tag list comes from `exemplar`'s umbrella layer, so no taxonomy is
/// consulted and the result is the same whichever classifier built
/// `exemplar`. An unclassified exemplar leaves `original` untouched. An
/// already classified `original` is flattened to its message first so its
/// old categories do not leak through.
pub fn cast(original: BoxError, exemplar: &(dyn Error + 'static)) -> BoxError {
    let Some(tags) = classification(exemplar).and_then(|layer| layer.shared_tags().cloned())
    else {
        return original;
    };

    let cause: BoxError = if is_in_list(&*original, &CategoryTag::ALL) {
        Box::new(RawError::new(original.to_string()))
    } else {
        original
    };
    wrap_error(cause, &tags)
}

fn wrap_error(cause: BoxError, tags: &Arc<[CategoryTag]>) -> BoxError {
    tags.iter().fold(cause, |inner, tag| {
        Box::new(ClassifiedError::wrap(inner, *tag, tags)) as BoxError
    })
}

/// Classification of the error arm of a `Result`
pub trait SzResultExt<T> {
    /// Convert the error with the default classifier
    fn classify(self) -> Result<T, BoxError>;

    fn classify_with(self, classifier: &Classifier) -> Result<T, BoxError>;
}

impl<T, E> SzResultExt<T> for Result<T, E>
where
    E: Into<BoxError>,
{
    fn classify(self) -> Result<T, BoxError> {
        self.classify_with(default_classifier())
    }

    fn classify_with(self, classifier: &Classifier) -> Result<T, BoxError> {
        self.map_err(|e| classifier.convert(e.into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{extract_code, extract_message_text};
    use CategoryTag::*;

    struct TestCase {
        name: &'static str,
        senzing_message: &'static str,
        message: &'static str,
        expected_code: u64,
        expected_message: &'static str,
        expected_umbrella: CategoryTag,
        expected_types: &'static [CategoryTag],
        false_types: &'static [CategoryTag],
    }

    const TEST_CASES: &[TestCase] = &[
        TestCase {
            name: "szerror-0005",
            senzing_message: "5I|Test message",
            message: r#"{
                "errors": [
                    {"id": "senzing-60044001", "text": "Not a Senzing message"},
                    {"id": "senzing-60044001", "text": "5I|Test message"}
                ]
            }"#,
            expected_code: 5,
            expected_message: "Test message",
            expected_umbrella: Base,
            expected_types: &[Base],
            false_types: &[Unrecoverable],
        },
        TestCase {
            name: "szerror-0007",
            senzing_message: "7W|Test message",
            message: r#"{"errors": [{"text": "7W|Test message", "status": "Warning"}]}"#,
            expected_code: 7,
            expected_message: "Test message",
            expected_umbrella: BadInput,
            expected_types: &[BadInput],
            false_types: &[Unrecoverable],
        },
        TestCase {
            name: "szerror-0010",
            senzing_message: "10E|Test message",
            message: r#"{"errors": [{"text": "10E|Test message"}]}"#,
            expected_code: 10,
            expected_message: "Test message",
            expected_umbrella: Retryable,
            expected_types: &[RetryTimeoutExceeded, Retryable],
            false_types: &[Unrecoverable],
        },
        TestCase {
            name: "szerror-0014",
            senzing_message: "14W|Test message",
            message: r#"{"errors": [{"text": "14W|Test message"}]}"#,
            expected_code: 14,
            expected_message: "Test message",
            expected_umbrella: Configuration,
            expected_types: &[Configuration],
            false_types: &[Unrecoverable],
        },
        TestCase {
            name: "szerror-0023",
            senzing_message: "0023E|Conflicting DATA_SOURCE values 'CUSTOMERS' and 'BOB'",
            message: r#"{
                "errors": ["0023E|Conflicting DATA_SOURCE values 'CUSTOMERS' and 'BOB'"],
            }"#,
            expected_code: 23,
            expected_message: "Conflicting DATA_SOURCE values 'CUSTOMERS' and 'BOB'",
            expected_umbrella: BadInput,
            expected_types: &[BadInput],
            false_types: &[Unrecoverable],
        },
        TestCase {
            name: "szerror-0027",
            senzing_message: "27E|Test message",
            message: r#"{"errors": [{"text": "27E|Test message"}]}"#,
            expected_code: 27,
            expected_message: "Test message",
            expected_umbrella: BadInput,
            expected_types: &[UnknownDataSource, BadInput],
            false_types: &[Unrecoverable],
        },
        TestCase {
            name: "szerror-0033",
            senzing_message: "33E|Test message",
            message: r#"{"errors": [{"text": "33E|Test message"}]}"#,
            expected_code: 33,
            expected_message: "Test message",
            expected_umbrella: BadInput,
            expected_types: &[NotFound, BadInput],
            false_types: &[Unrecoverable],
        },
        TestCase {
            name: "szerror-0048",
            senzing_message: "48E|Test message",
            message: r#"{"errors": [{"text": "48E|Test message"}]}"#,
            expected_code: 48,
            expected_message: "Test message",
            expected_umbrella: Unrecoverable,
            expected_types: &[NotInitialized, Unrecoverable],
            false_types: &[BadInput],
        },
        TestCase {
            name: "szerror-0054",
            senzing_message: "54E|Test message",
            message: r#"{"errors": [{"text": "54E|Test message"}]}"#,
            expected_code: 54,
            expected_message: "Test message",
            expected_umbrella: Unrecoverable,
            expected_types: &[Database, Unrecoverable],
            false_types: &[BadInput],
        },
        TestCase {
            name: "szerror-0087",
            senzing_message: "87E|Test message",
            message: r#"{"errors": [{"text": "87E|Test message"}]}"#,
            expected_code: 87,
            expected_message: "Test message",
            expected_umbrella: Unrecoverable,
            expected_types: &[Unhandled, Unrecoverable],
            false_types: &[BadInput],
        },
        TestCase {
            name: "szerror-0999",
            senzing_message: "999E|Test message",
            message: r#"{"errors": [{"text": "999E|Test message"}]}"#,
            expected_code: 999,
            expected_message: "Test message",
            expected_umbrella: Unrecoverable,
            expected_types: &[License, Unrecoverable],
            false_types: &[BadInput],
        },
        TestCase {
            name: "szerror-1006",
            senzing_message: "1006E|Test message",
            message: r#"{"errors": [{"text": "1006E|Test message"}]}"#,
            expected_code: 1006,
            expected_message: "Test message",
            expected_umbrella: Retryable,
            expected_types: &[DatabaseConnectionLost, Retryable],
            false_types: &[Unrecoverable],
        },
        TestCase {
            name: "szerror-1019",
            senzing_message: "1019E|Test message",
            message: r#"{
                "level": "FATAL",
                "text": "During setup, call to setupSenzingConfig() failed.",
                "errors": [{
                    "text": {
                        "text": "During setup, call to g2configmgr.Init() failed.",
                        "errors": [{
                            "text": {
                                "text": "Call to G2ConfigMgr_init(Test module name, {}, 0) failed. Return code: -2",
                                "errors": [{"text": "1019E|Datastore schema tables not found."}]
                            }
                        }]
                    }
                }]
            }"#,
            expected_code: 1019,
            expected_message: "Test message",
            expected_umbrella: Configuration,
            expected_types: &[Configuration],
            false_types: &[Unrecoverable],
        },
    ];

    fn raw(message: &str) -> BoxError {
        Box::new(RawError::new(message))
    }

    fn chain_len(err: &(dyn Error + 'static)) -> usize {
        let mut count = 0;
        let mut current = Some(err);
        while let Some(e) = current {
            count += 1;
            current = e.source();
        }
        count
    }

    #[test]
    fn test_extract_code_and_message() {
        for case in TEST_CASES {
            assert_eq!(extract_code(case.senzing_message), case.expected_code, "{}", case.name);
            assert_eq!(
                extract_message_text(case.senzing_message),
                case.expected_message,
                "{}",
                case.name
            );
        }
    }

    #[test]
    fn test_build() {
        let classifier = Classifier::default();
        for case in TEST_CASES {
            let err = classifier.build(extract_code(case.senzing_message), case.message);
            assert_eq!(err.to_string(), case.message, "{}", case.name);
            let layer = classification(&*err).expect(case.name);
            assert_eq!(layer.umbrella(), Some(case.expected_umbrella), "{}", case.name);
            assert!(err.downcast_ref::<ClassifiedError>().is_some(), "{}", case.name);
        }
    }

    #[test]
    fn test_is() {
        for case in TEST_CASES {
            let err = new(extract_code(case.senzing_message), case.message);
            for tag in case.expected_types {
                assert!(is(&*err, *tag), "{}: expected {}", case.name, tag);
            }
            for tag in case.false_types {
                assert!(!is(&*err, *tag), "{}: unexpected {}", case.name, tag);
            }
        }
    }

    #[test]
    fn test_is_in_list() {
        for case in TEST_CASES {
            let err = new(extract_code(case.senzing_message), case.message);
            assert!(is_in_list(&*err, case.expected_types), "{}", case.name);
            assert!(!is_in_list(&*err, case.false_types), "{}", case.name);
            assert!(!is_in_list(&*err, &[]), "{}", case.name);
        }
    }

    #[test]
    fn test_convert() {
        for case in TEST_CASES {
            let converted = convert(raw(case.message));
            assert_eq!(converted.to_string(), case.message, "{}", case.name);
            assert_eq!(
                classification(&*converted).and_then(|l| l.umbrella()),
                Some(case.expected_umbrella),
                "{}",
                case.name
            );
            for tag in case.expected_types {
                assert!(is(&*converted, *tag), "{}: expected {}", case.name, tag);
            }
            for tag in case.false_types {
                assert!(!is(&*converted, *tag), "{}: unexpected {}", case.name, tag);
            }
        }
    }

    #[test]
    fn test_cast() {
        for case in TEST_CASES {
            let exemplar = new(extract_code(case.senzing_message), case.message);
            let cast_err = cast(raw(case.message), &*exemplar);
            assert_eq!(cast_err.to_string(), case.message, "{}", case.name);
            assert_eq!(
                classification(&*cast_err).and_then(|l| l.umbrella()),
                Some(case.expected_umbrella),
                "{}",
                case.name
            );
            for tag in case.expected_types {
                assert!(is(&*cast_err, *tag), "{}: expected {}", case.name, tag);
            }
            for tag in case.false_types {
                assert!(!is(&*cast_err, *tag), "{}: unexpected {}", case.name, tag);
            }
        }
    }

    #[test]
    fn test_cast_with_unclassified_exemplar() {
        let exemplar = RawError::new("no categories here");
        let cast_err = cast(raw("keep this text"), &exemplar);
        assert_eq!(cast_err.to_string(), "keep this text");
        assert!(cast_err.downcast_ref::<RawError>().is_some());
        assert!(!is_in_list(&*cast_err, &CategoryTag::ALL));
    }

    #[test]
    fn test_cast_preserves_text_and_changes_shape() {
        let exemplar = new(33, "33E|exemplar");
        let cast_err = cast(raw("keep this text"), &*exemplar);

        assert_eq!(cast_err.to_string(), "keep this text");
        assert!(is(&*cast_err, BadInput));
        assert!(is(&*cast_err, NotFound));
        assert!(!is(&*cast_err, Retryable));
        assert_eq!(chain_len(&*cast_err), 3);
    }

    #[test]
    fn test_cast_takes_tags_from_exemplar_only() {
        let legacy = Classifier::for_generation(Generation::G2);
        let exemplar = legacy.build(35, "35E|legacy configuration");
        let cast_err = cast(raw("14W|current configuration"), &*exemplar);

        assert_eq!(tags_of(&*cast_err), Some(&[Configuration, Retryable][..]));
        assert!(cast_err.is_retryable());
        assert!(cast_err.is_configuration());
    }

    #[test]
    fn test_cast_flattens_classified_original() {
        let original = new(1006, "1006E|connection dropped");
        let exemplar = new(48, "48E|exemplar");
        let cast_err = cast(original, &*exemplar);

        assert_eq!(cast_err.to_string(), "1006E|connection dropped");
        assert!(is(&*cast_err, Unrecoverable));
        assert!(!is(&*cast_err, Retryable));
        assert!(!is(&*cast_err, DatabaseConnectionLost));
        // Old chain replaced by a single raw layer
        assert_eq!(chain_len(&*cast_err), 3);
    }

    #[test]
    fn test_cast_keeps_foreign_original_as_cause() {
        let original: BoxError = Box::new(std::io::Error::new(
            std::io::ErrorKind::Other,
            "socket closed",
        ));
        let exemplar = new(99930, "99930E|exemplar");
        let cast_err = cast(original, &*exemplar);

        assert_eq!(cast_err.to_string(), "socket closed");
        assert!(cast_err.is_retryable());
        let cause = cast_err.source().unwrap();
        assert!(cause.downcast_ref::<std::io::Error>().is_some());
    }

    #[test]
    fn test_message_preserved_for_every_code() {
        let classifier = Classifier::default();
        let message = "{\"text\": \"arbitrary | text\"}";
        for code in classifier.taxonomy().codes() {
            assert_eq!(classifier.build(code, message).to_string(), message);
        }
        assert_eq!(classifier.build(0, message).to_string(), message);
        assert_eq!(classifier.build(999_999_999, message).to_string(), message);
    }

    #[test]
    fn test_unwrap_depth() {
        let classifier = Classifier::default();
        for (code, tags) in classifier.taxonomy().entries() {
            let err = classifier.build(code, "Test message");
            assert_eq!(chain_len(&*err), tags.len() + 1, "code {}", code);
        }

        let err = classifier.build(999_999_999, "Test message");
        assert_eq!(chain_len(&*err), 1);
        assert!(err.source().is_none());
    }

    #[test]
    fn test_unwrap_layers_in_order() {
        let err = new(33, "33E|Test message");
        let outer = err.downcast_ref::<ClassifiedError>().unwrap();
        assert_eq!(outer.tag(), BadInput);
        assert_eq!(outer.tags(), Some(&[NotFound, BadInput][..]));

        let detail = outer.cause().downcast_ref::<ClassifiedError>().unwrap();
        assert_eq!(detail.tag(), NotFound);
        assert!(!detail.is_umbrella());
        assert_eq!(detail.tags(), None);

        let base = detail.cause().downcast_ref::<RawError>().unwrap();
        assert_eq!(base.message(), "33E|Test message");
        assert!(base.source().is_none());
    }

    #[test]
    fn test_membership_round_trip() {
        let classifier = Classifier::default();
        for (code, tags) in classifier.taxonomy().entries() {
            let err = classifier.build(code, "msg");
            for umbrella in CategoryTag::UMBRELLA {
                assert_eq!(
                    is(&*err, umbrella),
                    tags.contains(&umbrella),
                    "code {} umbrella {}",
                    code,
                    umbrella
                );
            }
        }
    }

    #[test]
    fn test_detail_layer_alone_answers_nothing() {
        let err = new(33, "33E|Test message");
        let detail = err.source().unwrap();
        assert!(!is(detail, NotFound));
        assert!(!is(detail, BadInput));
    }

    #[test]
    fn test_convert_idempotent() {
        for case in TEST_CASES {
            let once = convert(raw(case.message));
            let once_tags = tags_of(&*once).map(|t| t.to_vec());
            let twice = convert(once);
            assert_eq!(tags_of(&*twice).map(|t| t.to_vec()), once_tags, "{}", case.name);
            assert_eq!(twice.to_string(), case.message, "{}", case.name);
        }
    }

    #[test]
    fn test_unknown_code_passthrough() {
        let converted = convert(raw("999999999|mystery"));
        assert_eq!(converted.to_string(), "999999999|mystery");
        assert!(!is_in_list(&*converted, &CategoryTag::ALL));
        assert!(converted.downcast_ref::<RawError>().is_some());
    }

    #[test]
    fn test_no_code_passthrough_keeps_original() {
        let original: BoxError = Box::new(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "plain failure",
        ));
        let converted = convert(original);
        assert!(converted.downcast_ref::<std::io::Error>().is_some());
        assert!(!is_in_list(&*converted, &CategoryTag::ALL));
    }

    #[test]
    fn test_end_to_end_conflicting_data_source() {
        let message = "0023E|Conflicting DATA_SOURCE values 'CUSTOMERS' and 'BOB'";
        assert_eq!(harvest_code(message), Some(23));

        let err = convert(raw(message));
        assert!(is(&*err, BadInput));
        assert!(!is(&*err, Unrecoverable));
        assert_eq!(err.to_string(), message);
        assert!(err.is_bad_input());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_multiple_umbrellas_share_tags() {
        let classifier = Classifier::for_generation(Generation::G2);
        let err = classifier.build(35, "35E|config reload");

        let outer = err.downcast_ref::<ClassifiedError>().unwrap();
        assert_eq!(outer.umbrella(), Some(Retryable));
        let inner = outer.cause().downcast_ref::<ClassifiedError>().unwrap();
        assert_eq!(inner.umbrella(), Some(Configuration));
        assert!(Arc::ptr_eq(
            outer.shared_tags().unwrap(),
            inner.shared_tags().unwrap()
        ));
        assert!(err.is_configuration());
        assert!(err.is_retryable());
    }

    #[test]
    fn test_generations_classify_differently() {
        let legacy = Classifier::for_generation(Generation::G2);
        let converted = legacy.convert(raw("54E|repository purged"));
        assert!(is(&*converted, Retryable));

        let current = convert(raw("54E|database failure"));
        assert!(is(&*current, Unrecoverable));
    }

    #[test]
    fn test_result_ext() {
        let result: Result<(), String> = Err("1007E|connection lost".to_string());
        let err = result.classify().unwrap_err();
        assert!(err.is_retryable());
        assert!(err.is_sz(DatabaseConnectionLost));

        let ok: Result<u8, BoxError> = Ok(3);
        assert_eq!(ok.classify().unwrap(), 3);
    }

    #[test]
    fn test_from_preferences_overlay() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("site.toml");
        std::fs::write(&path, "[codes]\n5 = [\"Retryable\"]\n").unwrap();

        let preferences = ClassifierPreferences {
            generation: Generation::Sz,
            taxonomy_file: Some(path),
        };
        let classifier = Classifier::from_preferences(&preferences).unwrap();
        let err = classifier.convert(raw("5I|now retryable"));
        assert!(is(&*err, Retryable));
        assert!(!is(&*err, Base));
        assert!(is(&*classifier.build(33, "x"), NotFound));
    }

    #[test]
    fn test_errors_are_thread_safe() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<ClassifiedError>();
        assert_send_sync::<Classifier>();

        let classifier = Classifier::default();
        std::thread::scope(|scope| {
            for case in TEST_CASES {
                let classifier = &classifier;
                scope.spawn(move || {
                    let err = classifier.convert(raw(case.message));
                    assert!(is(&*err, case.expected_umbrella), "{}", case.name);
                });
            }
        });
    }
}
