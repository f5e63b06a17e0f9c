//! JSON log envelope walking

use serde_json::{Map, Value};

/// Borrowed view of a JSON log envelope.
///
/// Each logging layer wraps the failure below it:
///
/// ```text
/// "text": "x",
/// "errors": [{
///     "text": {
///         "text": "y",
///         "errors": [{
///             "text": "1019E|Datastore schema..."
/// ```
///
/// Any JSON object is an envelope; fields other than `text` and `errors`
/// are ignored.
#[derive(Debug, Clone, Copy)]
pub struct DiagnosticEnvelope<'a> {
    text: Option<&'a Value>,
    errors: Option<&'a Value>,
}

impl<'a> DiagnosticEnvelope<'a> {
    pub fn from_map(map: &'a Map<String, Value>) -> Self {
        Self {
            text: map.get("text"),
            errors: map.get("errors"),
        }
    }

    /// Candidate texts in document order, nested envelopes spliced in place.
    ///
    /// For the example above this yields `["x", "y", "1019E|Datastore schema..."]`.
    /// A `text` is a candidate only when it is a string; an object `text` is a
    /// nested envelope only inside an `errors` entry.
    pub fn candidates(&self) -> Vec<&'a str> {
        let mut candidates = Vec::new();
        let mut pending: Vec<std::slice::Iter<'a, Value>> = Vec::new();
        self.open(&mut candidates, &mut pending);

        while let Some(entries) = pending.last_mut() {
            let Some(entry) = entries.next() else {
                pending.pop();
                continue;
            };

            match entry {
                Value::String(text) => candidates.push(text.as_str()),
                Value::Object(detail) => match detail.get("text") {
                    Some(Value::String(text)) => candidates.push(text.as_str()),
                    Some(Value::Object(nested)) => {
                        Self::from_map(nested).open(&mut candidates, &mut pending)
                    }
                    _ => {}
                },
                _ => {}
            }
        }
        candidates
    }

    fn open(&self, candidates: &mut Vec<&'a str>, pending: &mut Vec<std::slice::Iter<'a, Value>>) {
        if let Some(Value::String(text)) = self.text {
            candidates.push(text.as_str());
        }
        // Anything but an array contributes nothing
        if let Some(Value::Array(errors)) = self.errors {
            pending.push(errors.iter());
        }
    }
}
