/*
 * pattern.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Reference marker recognition.
//!
//! The marker regex is assembled once from the [`ReferenceSyntax`]:
//!
//! ```text
//! prefix := SEP? | (UP{1,2} SEP)+
//! key    := prefix KEY (SEP (UP{1,2} SEP)* KEY)*
//! marker := reference_pattern with {key} replaced by (?P<key>key)
//! ```
//!
//! Matching never keeps a scan position between calls, so a compiled
//! pattern can be reused on any number of strings.

use std::ops::Range;

use regex::Regex;

use crate::error::{PropRefError, PropRefResult};
use crate::options::{KEY_PLACEHOLDER, ReferenceSyntax};

/// One reference marker found in a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMatch {
    /// The captured key expression, e.g. `.prod.siteUrl` or `--.name`.
    pub key: String,

    /// Byte offset of the marker.
    pub start: usize,

    /// Byte length of the marker.
    pub len: usize,

    /// Whether the marker spans the entire string.
    pub whole: bool,
}

impl ReferenceMatch {
    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Compiled matcher for reference markers.
#[derive(Debug, Clone)]
pub struct ReferencePattern {
    regex: Regex,
}

impl ReferencePattern {
    /// Build the marker regex from the given syntax.
    ///
    /// Fails with [`PropRefError::Configuration`] when the reference pattern
    /// does not contain the `{key}` placeholder exactly once, or when the
    /// assembled regex does not compile.
    pub fn compile(syntax: &ReferenceSyntax) -> PropRefResult<Self> {
        let placeholders = syntax.reference_pattern.matches(KEY_PLACEHOLDER).count();
        if placeholders != 1 {
            return Err(PropRefError::configuration(format!(
                "reference pattern '{}' must contain '{}' exactly once (found {})",
                syntax.reference_pattern, KEY_PLACEHOLDER, placeholders
            )));
        }
        if syntax.key_pattern.is_empty() {
            return Err(PropRefError::configuration("key pattern must not be empty"));
        }
        Regex::new(&syntax.key_pattern).map_err(|e| {
            PropRefError::configuration(format!(
                "invalid key pattern '{}': {}",
                syntax.key_pattern, e
            ))
        })?;

        let sep = regex::escape(&syntax.separator);
        let up = regex::escape(&syntax.up_level_token);
        let segment = &syntax.key_pattern;

        let relative = format!("(?:(?:{up}){{1,2}}{sep})+");
        let key = format!(
            "(?:{relative}|{sep})?(?:{segment})(?:{sep}(?:{relative})?(?:{segment}))*"
        );
        let source = syntax
            .reference_pattern
            .replace(KEY_PLACEHOLDER, &format!("(?P<key>{key})"));

        let regex = Regex::new(&source).map_err(|e| {
            PropRefError::configuration(format!(
                "invalid reference pattern '{}': {}",
                syntax.reference_pattern, e
            ))
        })?;

        Ok(Self { regex })
    }

    /// The assembled regex source.
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    /// Find the first marker in `text`.
    pub fn find(&self, text: &str) -> Option<ReferenceMatch> {
        self.regex
            .captures(text)
            .and_then(|caps| to_match(&caps, text))
    }

    /// Find every non-overlapping marker in `text`, left to right.
    pub fn find_all(&self, text: &str) -> Vec<ReferenceMatch> {
        self.regex
            .captures_iter(text)
            .filter_map(|caps| to_match(&caps, text))
            .collect()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }
}

fn to_match(caps: &regex::Captures<'_>, text: &str) -> Option<ReferenceMatch> {
    let marker = caps.get(0)?;
    let key = caps.name("key")?;
    Some(ReferenceMatch {
        key: key.as_str().to_string(),
        start: marker.start(),
        len: marker.len(),
        whole: marker.start() == 0 && marker.end() == text.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern() -> ReferencePattern {
        ReferencePattern::compile(&ReferenceSyntax::default()).unwrap()
    }

    #[test]
    fn test_whole_string_marker() {
        let m = pattern().find("@{ .prod.siteUrl }").unwrap();
        assert_eq!(m.key, ".prod.siteUrl");
        assert_eq!(m.start, 0);
        assert_eq!(m.len, 18);
        assert!(m.whole);
    }

    #[test]
    fn test_embedded_marker() {
        let text = "prefix-@{a.x}-suffix";
        let m = pattern().find(text).unwrap();
        assert_eq!(m.key, "a.x");
        assert_eq!(&text[m.range()], "@{a.x}");
        assert!(!m.whole);
    }

    #[test]
    fn test_relative_keys() {
        let p = pattern();
        assert_eq!(p.find("@{ -.name }").unwrap().key, "-.name");
        assert_eq!(p.find("@{--.--.name}").unwrap().key, "--.--.name");
        assert_eq!(p.find("@{ a.--.b }").unwrap().key, "a.--.b");
    }

    #[test]
    fn test_rejects_malformed_keys() {
        let p = pattern();
        assert!(p.find("@{ ---.name }").is_none());
        assert!(p.find("@{ a. }").is_none());
        assert!(p.find("@{ }").is_none());
        assert!(p.find("{ a }").is_none());
        assert!(p.find("@{ a b }").is_none());
    }

    #[test]
    fn test_find_all() {
        let text = "@{a} and @{ b.c } and @{--.d}";
        let keys: Vec<String> = pattern().find_all(text).into_iter().map(|m| m.key).collect();
        assert_eq!(keys, vec!["a", "b.c", "--.d"]);
    }

    #[test]
    fn test_repeated_scans_are_independent() {
        let p = pattern();
        let first = "x @{a} y @{b}";
        let second = "@{c}";

        for _ in 0..3 {
            assert_eq!(p.find(first).map(|m| m.key), Some("a".to_string()));
            assert_eq!(p.find(second).map(|m| m.key), Some("c".to_string()));
            assert_eq!(p.find_all(first).len(), 2);
        }
    }

    #[test]
    fn test_custom_syntax() {
        let syntax = ReferenceSyntax {
            reference_pattern: r"\$\(\s*{key}\s*\)".to_string(),
            key_pattern: "[a-z-]+".to_string(),
            separator: "/".to_string(),
            up_level_token: "^".to_string(),
        };
        let p = ReferencePattern::compile(&syntax).unwrap();

        let m = p.find("url: $( ^^/base-url )").unwrap();
        assert_eq!(m.key, "^^/base-url");
        assert!(p.find("@{ a }").is_none());
    }

    #[test]
    fn test_key_pattern_with_groups() {
        let syntax = ReferenceSyntax {
            key_pattern: "(foo|bar)[0-9]*".to_string(),
            ..ReferenceSyntax::default()
        };
        let p = ReferencePattern::compile(&syntax).unwrap();
        assert_eq!(p.find("@{ foo1.bar }").unwrap().key, "foo1.bar");
    }

    #[test]
    fn test_placeholder_required_once() {
        for reference_pattern in [r"@\{\s*\}", r"{key}{key}"] {
            let syntax = ReferenceSyntax {
                reference_pattern: reference_pattern.to_string(),
                ..ReferenceSyntax::default()
            };
            let err = ReferencePattern::compile(&syntax).unwrap_err();
            assert!(matches!(err, PropRefError::Configuration { .. }));
        }
    }

    #[test]
    fn test_invalid_regex() {
        let syntax = ReferenceSyntax {
            key_pattern: "[a-z".to_string(),
            ..ReferenceSyntax::default()
        };
        assert!(ReferencePattern::compile(&syntax).is_err());

        let syntax = ReferenceSyntax {
            reference_pattern: r"@\{({key}".to_string(),
            ..ReferenceSyntax::default()
        };
        assert!(ReferencePattern::compile(&syntax).is_err());
    }
}
