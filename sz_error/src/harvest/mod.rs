//! Error code recovery from raw engine diagnostics
//!
//! A diagnostic is either a bare token (`"0023E|..."`) or a JSON log
//! envelope that nests the token under any number of logging layers. The
//! harvester lists candidate texts in document order and returns the first
//! one that carries a positive code. Malformed input never fails; it simply
//! yields fewer candidates. Nesting depth is unbounded: parsing grows the
//! stack on demand and walking and dropping the tree are iterative.

pub mod envelope;

pub use envelope::DiagnosticEnvelope;

use crate::extract::extract_code;
use serde::Deserialize;
use serde_json::Value;

/// Winning candidate of a harvest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarvestMatch {
    pub code: u64,
    /// Position of the candidate in document order
    pub index: usize,
    pub candidate: String,
}

/// Engine error code carried by `raw`, if any
pub fn harvest_code(raw: &str) -> Option<u64> {
    with_candidates(raw, |candidates| {
        first_code(candidates).map(|(_, code)| code)
    })
}

/// Like [`harvest_code`], also reporting which candidate produced the code
pub fn harvest_match(raw: &str) -> Option<HarvestMatch> {
    with_candidates(raw, |candidates| {
        first_code(candidates).map(|(index, code)| HarvestMatch {
            code,
            index,
            candidate: candidates[index].to_string(),
        })
    })
}

/// Every candidate text in the order they are tried
pub fn harvest_candidates(raw: &str) -> Vec<String> {
    with_candidates(raw, |candidates| {
        candidates.iter().map(|c| c.to_string()).collect()
    })
}

fn first_code(candidates: &[&str]) -> Option<(usize, u64)> {
    log::trace!("Harvesting from {} candidate(s)", candidates.len());
    candidates
        .iter()
        .enumerate()
        .map(|(index, candidate)| (index, extract_code(candidate)))
        .find(|(_, code)| *code > 0)
}

fn with_candidates<R>(raw: &str, f: impl FnOnce(&[&str]) -> R) -> R {
    let value = match parse_unbounded(raw) {
        Ok(value) => value,
        // Not JSON: the raw text is itself the token
        Err(_) => return f(&[raw]),
    };

    let result = match &value {
        Value::Object(map) => f(&DiagnosticEnvelope::from_map(map).candidates()),
        // A quoted token stays a token; a quoted document is not an envelope
        Value::String(inner) if !is_json(inner) => f(&[raw]),
        _ => f(&[]),
    };
    dismantle(value);
    result
}

fn parse_unbounded(text: &str) -> serde_json::Result<Value> {
    let mut json = serde_json::Deserializer::from_str(text);
    json.disable_recursion_limit();
    let value = Value::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(value)
}

fn is_json(text: &str) -> bool {
    parse_unbounded(text).map(dismantle).is_ok()
}

/// Drop a parsed tree without recursing into it
fn dismantle(value: Value) {
    let mut pending = vec![value];
    while let Some(value) = pending.pop() {
        match value {
            Value::Array(items) => pending.extend(items),
            Value::Object(map) => pending.extend(map.into_iter().map(|(_, v)| v)),
            _ => {}
        }
    }
}
