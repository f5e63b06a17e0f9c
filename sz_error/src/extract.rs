//! Diagnostic token parsing
//!
//! The engine emits failures as `<digits><severity>|<text>`, for example
//! `0037E|Unknown resolved entity value '-4'`. Only the digits before the
//! first `|` identify the failure.

use regex::Regex;
use std::sync::OnceLock;

static NON_DIGITS: OnceLock<Regex> = OnceLock::new();

fn non_digits() -> &'static Regex {
    NON_DIGITS.get_or_init(|| Regex::new("[^0-9]+").expect("static pattern"))
}

/// Numeric error code of a diagnostic token, `0` when there is none.
///
/// The text before the first `|` is stripped of every non-digit and parsed.
/// Tokens without `|`, without digits, or with a digit run that does not fit
/// in a `u64` all yield `0`.
pub fn extract_code(token: &str) -> u64 {
    let Some((prefix, _)) = token.split_once('|') else {
        return 0;
    };

    let digits = non_digits().replace_all(prefix, "");
    digits.parse().unwrap_or(0)
}

/// Free text after the first `|`, trimmed. Empty when there is no `|`.
pub fn extract_message_text(token: &str) -> &str {
    token
        .split_once('|')
        .map(|(_, text)| text.trim())
        .unwrap_or("")
}

/// Severity letter following the code (`E`, `W`, `I`, ...), if present.
///
/// The letter must directly follow the last digit of the prefix, so
/// `SENZ0037E|...` yields `E` and a prefix without digits yields nothing.
pub fn extract_severity(token: &str) -> Option<char> {
    let (prefix, _) = token.split_once('|')?;
    let last_digit = prefix.rfind(|c: char| c.is_ascii_digit())?;
    prefix[last_digit + 1..]
        .chars()
        .next()
        .filter(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_code() {
        assert_eq!(extract_code("5I|Test message"), 5);
        assert_eq!(extract_code("0023E|Conflicting DATA_SOURCE values 'CUSTOMERS' and 'BOB'"), 23);
        assert_eq!(extract_code("99911E|Test message"), 99911);
        assert_eq!(extract_code("1019E|Datastore schema tables not found."), 1019);
    }

    #[test]
    fn test_extract_code_without_pipe() {
        assert_eq!(extract_code("0023E Conflicting DATA_SOURCE values"), 0);
        assert_eq!(extract_code(""), 0);
        assert_eq!(extract_code("Not a Senzing message"), 0);
    }

    #[test]
    fn test_extract_code_strips_every_non_digit() {
        assert_eq!(extract_code("SENZ0037E|Unknown"), 37);
        assert_eq!(extract_code("{\"errors\": [\"0023E|Conflicting\"],}"), 23);
        assert_eq!(extract_code("E|no digits"), 0);
        assert_eq!(extract_code("|leading pipe"), 0);
    }

    #[test]
    fn test_extract_code_uses_first_pipe() {
        assert_eq!(extract_code("7W|first|88E|second"), 7);
    }

    #[test]
    fn test_extract_code_overflow_is_zero() {
        assert_eq!(extract_code("99999999999999999999999E|too big"), 0);
    }

    #[test]
    fn test_extract_message_text() {
        assert_eq!(extract_message_text("5I|Test message"), "Test message");
        assert_eq!(extract_message_text("5I|   padded   "), "padded");
        assert_eq!(extract_message_text("no pipe"), "");
        assert_eq!(extract_message_text("7W|first|second"), "first|second");
    }

    #[test]
    fn test_extract_severity() {
        assert_eq!(extract_severity("0023E|x"), Some('E'));
        assert_eq!(extract_severity("7W|x"), Some('W'));
        assert_eq!(extract_severity("42|x"), None);
        assert_eq!(extract_severity("no pipe"), None);
        assert_eq!(extract_severity("SENZ0037E|Unknown resolved entity value"), Some('E'));
        assert_eq!(extract_severity(" 0023W |x"), Some('W'));
        assert_eq!(extract_severity("E|no digits"), None);
    }
}
