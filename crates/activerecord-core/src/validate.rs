//! Reusable column validators.
//!
//! Each constructor returns a closure suitable for
//! [`ColumnDef::validate`](crate::ColumnDef::validate). NULL input passes
//! every validator here; required-ness is checked separately.

use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};

use regex::Regex;

use crate::field::DATETIME_FORMAT;
use crate::value::Value;

/// Compiled patterns, shared process-wide.
struct RegexCache {
    cache: RwLock<HashMap<String, Regex>>,
}

impl RegexCache {
    fn new() -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
        }
    }

    fn get_or_compile(&self, pattern: &str) -> Result<Regex, regex::Error> {
        {
            let cache = self.cache.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(regex) = cache.get(pattern) {
                return Ok(regex.clone());
            }
        }

        let regex = Regex::new(pattern)?;
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pattern.to_string(), regex.clone());
        Ok(regex)
    }
}

fn regex_cache() -> &'static RegexCache {
    static CACHE: OnceLock<RegexCache> = OnceLock::new();
    CACHE.get_or_init(RegexCache::new)
}

/// Check if a string matches a regex pattern.
///
/// An invalid pattern is logged and treated as a non-match.
pub fn matches_pattern(value: &str, pattern: &str) -> bool {
    match regex_cache().get_or_compile(pattern) {
        Ok(regex) => regex.is_match(value),
        Err(e) => {
            tracing::warn!(
                pattern = pattern,
                error = %e,
                "Invalid regex pattern in validation, treating as non-match"
            );
            false
        }
    }
}

/// Text must match `pattern`.
pub fn pattern(
    pattern: &'static str,
    message: &'static str,
) -> impl Fn(&Value) -> Result<(), String> + Send + Sync {
    move |value| match value {
        Value::Null => Ok(()),
        Value::Text(s) if matches_pattern(s, pattern) => Ok(()),
        _ => Err(message.to_string()),
    }
}

/// Text must be non-empty after trimming.
pub fn not_empty() -> impl Fn(&Value) -> Result<(), String> + Send + Sync {
    |value| match value {
        Value::Text(s) if s.trim().is_empty() => Err("Value can not be empty".to_string()),
        _ => Ok(()),
    }
}

/// Text must be at most `max` characters.
pub fn max_length(max: usize) -> impl Fn(&Value) -> Result<(), String> + Send + Sync {
    move |value| match value {
        Value::Text(s) if s.chars().count() > max => {
            Err(format!("Value can be at most {} characters long", max))
        }
        _ => Ok(()),
    }
}

/// Text must be at least `min` characters.
pub fn min_length(min: usize) -> impl Fn(&Value) -> Result<(), String> + Send + Sync {
    move |value| match value {
        Value::Text(s) if s.chars().count() < min => {
            Err(format!("Value must be at least {} characters long", min))
        }
        _ => Ok(()),
    }
}

/// Integer (or integer text) within `min..=max`.
pub fn int_range(min: i64, max: i64) -> impl Fn(&Value) -> Result<(), String> + Send + Sync {
    move |value| {
        if value.is_null() {
            return Ok(());
        }
        match value.to_i64() {
            Some(n) if (min..=max).contains(&n) => Ok(()),
            Some(_) => Err(format!("Value must be between {} and {}", min, max)),
            None => Err("Value must be an integer".to_string()),
        }
    }
}

/// Text in `YYYY-MM-DD HH:MM:SS` form.
pub fn datetime() -> impl Fn(&Value) -> Result<(), String> + Send + Sync {
    |value| match value {
        Value::Null => Ok(()),
        Value::Text(s) if chrono::NaiveDateTime::parse_from_str(s, DATETIME_FORMAT).is_ok() => {
            Ok(())
        }
        _ => Err("Value is not a valid datetime".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_email_pattern() {
        let email_pattern = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

        assert!(matches_pattern("test@example.com", email_pattern));
        assert!(!matches_pattern("invalid", email_pattern));
        assert!(!matches_pattern("test@", email_pattern));
    }

    #[test]
    fn test_invalid_pattern_returns_false() {
        assert!(!matches_pattern("anything", r"[unclosed"));
    }

    #[test]
    fn test_regex_caching() {
        let pattern = r"^test\d+$";
        assert!(matches_pattern("test123", pattern));
        assert!(matches_pattern("test456", pattern));
        assert!(!matches_pattern("invalid", pattern));
    }

    #[test]
    fn test_pattern_validator() {
        let check = pattern(r"^[a-z]+$", "lowercase letters only");
        assert!(check(&Value::from("abc")).is_ok());
        assert!(check(&Value::Null).is_ok());
        assert_eq!(
            check(&Value::from("test'; DROP TABLE users;--")),
            Err("lowercase letters only".to_string())
        );
        assert!(check(&Value::from(5)).is_err());
    }

    #[test]
    fn test_length_validators() {
        assert!(max_length(3)(&Value::from("abc")).is_ok());
        assert!(max_length(3)(&Value::from("abcd")).is_err());
        assert!(min_length(8)(&Value::from("short")).is_err());
        assert!(min_length(8)(&Value::from("long enough")).is_ok());
        assert!(not_empty()(&Value::from("  ")).is_err());
        assert!(not_empty()(&Value::Null).is_ok());
    }

    #[test]
    fn test_int_range() {
        let check = int_range(1, 10);
        assert!(check(&Value::from(5)).is_ok());
        assert!(check(&Value::from("7")).is_ok());
        assert!(check(&Value::from(11)).is_err());
        assert_eq!(check(&Value::from("x")), Err("Value must be an integer".to_string()));
    }

    #[test]
    fn test_datetime() {
        assert!(datetime()(&Value::from("2024-01-02 03:04:05")).is_ok());
        assert!(datetime()(&Value::from("yesterday")).is_err());
    }
}
