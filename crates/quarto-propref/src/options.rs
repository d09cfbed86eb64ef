/*
 * options.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Parser configuration.
//!
//! [`PropRefOptions`] starts from the built-in defaults and is adjusted with
//! `with_*` builder methods, or by merging a [`PropRefSettings`] loaded from
//! a settings file. The options become immutable once they are handed to
//! [`PropRefParser::new`](crate::PropRefParser::new).

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::getter::{PostParser, PropertyGetter};

/// Placeholder in [`ReferenceSyntax::reference_pattern`] where the key grammar is spliced.
pub const KEY_PLACEHOLDER: &str = "{key}";

/// Default marker wrapper: `@{ key }`, whitespace around the key is allowed.
pub const DEFAULT_REFERENCE_PATTERN: &str = r"@\{\s*{key}\s*\}";

/// Default grammar of a single key segment.
pub const DEFAULT_KEY_PATTERN: &str = "[a-zA-Z0-9_]+";

pub const DEFAULT_SEPARATOR: &str = ".";

pub const DEFAULT_UP_LEVEL_TOKEN: &str = "-";

/// Default limit on nested reference chains.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// How the parser obtains a getter when none is supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GetterMode {
    /// Fall back to [`KeyPathGetter`](crate::KeyPathGetter).
    #[default]
    Default,
    /// Construction fails unless a getter was supplied.
    Required,
}

/// When `key_base` is prepended by [`KeyPathRules::resolve`](crate::KeyPathRules::resolve).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum KeyBasePolicy {
    /// Only when the first segment is not absolute.
    #[default]
    Contextual,
    /// Whenever a key base is configured.
    Always,
}

/// How up-level tokens move through a keypath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UpLevelMode {
    /// One token stays at the current level, two tokens climb one level.
    ///
    /// `a.b` + `-.c` is `a.b.c`; `a.b.c` + `--.d` is `a.b.d`.
    #[default]
    Sibling,
    /// Every token climbs one level.
    ///
    /// `a.b` + `-.c` is `a.c`; `a.b.c` + `--.d` is `a.d`.
    Parent,
}

/// The textual grammar of reference markers and keypaths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ReferenceSyntax {
    /// Regex wrapping the key expression; must contain [`KEY_PLACEHOLDER`] once.
    pub reference_pattern: String,

    /// Regex matching a single key segment.
    pub key_pattern: String,

    /// Literal text separating keypath levels.
    pub separator: String,

    /// Literal text used for relative navigation.
    pub up_level_token: String,
}

impl Default for ReferenceSyntax {
    fn default() -> Self {
        Self {
            reference_pattern: DEFAULT_REFERENCE_PATTERN.to_string(),
            key_pattern: DEFAULT_KEY_PATTERN.to_string(),
            separator: DEFAULT_SEPARATOR.to_string(),
            up_level_token: DEFAULT_UP_LEVEL_TOKEN.to_string(),
        }
    }
}

/// Serializable subset of the options, every field optional.
///
/// Fields left as `None` keep whatever the options already hold, so a
/// settings file only needs to mention what it changes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct PropRefSettings {
    pub reference_pattern: Option<String>,
    pub key_pattern: Option<String>,
    pub separator: Option<String>,
    pub up_level_token: Option<String>,
    pub key_base: Option<String>,
    pub preserve_data_type: Option<bool>,
    pub getter_mode: Option<GetterMode>,
    pub key_base_policy: Option<KeyBasePolicy>,
    pub up_level_mode: Option<UpLevelMode>,
    pub max_depth: Option<usize>,
}

/// Options controlling reference recognition and resolution.
#[derive(Clone)]
pub struct PropRefOptions {
    pub getter: Option<Arc<dyn PropertyGetter>>,
    pub post_parser: Option<Arc<dyn PostParser>>,
    pub syntax: ReferenceSyntax,

    /// Implicit root prefix used by `resolve`.
    pub key_base: String,

    /// Keep the native type of a value referenced by a whole-string marker.
    pub preserve_data_type: bool,

    pub getter_mode: GetterMode,
    pub key_base_policy: KeyBasePolicy,
    pub up_level_mode: UpLevelMode,

    /// Maximum length of a chain of nested references.
    pub max_depth: usize,
}

impl Default for PropRefOptions {
    fn default() -> Self {
        Self {
            getter: None,
            post_parser: None,
            syntax: ReferenceSyntax::default(),
            key_base: String::new(),
            preserve_data_type: true,
            getter_mode: GetterMode::Default,
            key_base_policy: KeyBasePolicy::Contextual,
            up_level_mode: UpLevelMode::Sibling,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl fmt::Debug for PropRefOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PropRefOptions")
            .field("getter", &self.getter.as_ref().map(|_| "<getter>"))
            .field("post_parser", &self.post_parser.as_ref().map(|_| "<post-parser>"))
            .field("syntax", &self.syntax)
            .field("key_base", &self.key_base)
            .field("preserve_data_type", &self.preserve_data_type)
            .field("getter_mode", &self.getter_mode)
            .field("key_base_policy", &self.key_base_policy)
            .field("up_level_mode", &self.up_level_mode)
            .field("max_depth", &self.max_depth)
            .finish()
    }
}

impl PropRefOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_getter(mut self, getter: impl PropertyGetter + 'static) -> Self {
        self.getter = Some(Arc::new(getter));
        self
    }

    pub fn with_post_parser(mut self, post_parser: impl PostParser + 'static) -> Self {
        self.post_parser = Some(Arc::new(post_parser));
        self
    }

    pub fn with_syntax(mut self, syntax: ReferenceSyntax) -> Self {
        self.syntax = syntax;
        self
    }

    pub fn with_reference_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.syntax.reference_pattern = pattern.into();
        self
    }

    pub fn with_key_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.syntax.key_pattern = pattern.into();
        self
    }

    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.syntax.separator = separator.into();
        self
    }

    pub fn with_up_level_token(mut self, token: impl Into<String>) -> Self {
        self.syntax.up_level_token = token.into();
        self
    }

    pub fn with_key_base(mut self, key_base: impl Into<String>) -> Self {
        self.key_base = key_base.into();
        self
    }

    pub fn with_preserve_data_type(mut self, preserve: bool) -> Self {
        self.preserve_data_type = preserve;
        self
    }

    pub fn with_getter_mode(mut self, mode: GetterMode) -> Self {
        self.getter_mode = mode;
        self
    }

    pub fn with_key_base_policy(mut self, policy: KeyBasePolicy) -> Self {
        self.key_base_policy = policy;
        self
    }

    pub fn with_up_level_mode(mut self, mode: UpLevelMode) -> Self {
        self.up_level_mode = mode;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Merge settings over these options; unset fields are left alone.
    pub fn merge_settings(mut self, settings: PropRefSettings) -> Self {
        let PropRefSettings {
            reference_pattern,
            key_pattern,
            separator,
            up_level_token,
            key_base,
            preserve_data_type,
            getter_mode,
            key_base_policy,
            up_level_mode,
            max_depth,
        } = settings;

        if let Some(v) = reference_pattern {
            self.syntax.reference_pattern = v;
        }
        if let Some(v) = key_pattern {
            self.syntax.key_pattern = v;
        }
        if let Some(v) = separator {
            self.syntax.separator = v;
        }
        if let Some(v) = up_level_token {
            self.syntax.up_level_token = v;
        }
        if let Some(v) = key_base {
            self.key_base = v;
        }
        if let Some(v) = preserve_data_type {
            self.preserve_data_type = v;
        }
        if let Some(v) = getter_mode {
            self.getter_mode = v;
        }
        if let Some(v) = key_base_policy {
            self.key_base_policy = v;
        }
        if let Some(v) = up_level_mode {
            self.up_level_mode = v;
        }
        if let Some(v) = max_depth {
            self.max_depth = v;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = PropRefOptions::default();
        assert!(options.getter.is_none());
        assert!(options.post_parser.is_none());
        assert_eq!(options.syntax.separator, ".");
        assert_eq!(options.syntax.up_level_token, "-");
        assert_eq!(options.syntax.key_pattern, "[a-zA-Z0-9_]+");
        assert!(options.syntax.reference_pattern.contains(KEY_PLACEHOLDER));
        assert_eq!(options.key_base, "");
        assert!(options.preserve_data_type);
        assert_eq!(options.getter_mode, GetterMode::Default);
        assert_eq!(options.key_base_policy, KeyBasePolicy::Contextual);
        assert_eq!(options.up_level_mode, UpLevelMode::Sibling);
    }

    #[test]
    fn test_merge_settings_only_touches_set_fields() {
        let settings: PropRefSettings = serde_json::from_str(
            r#"{"separator": "/", "key-base": "site", "up-level-mode": "parent"}"#,
        )
        .unwrap();

        let options = PropRefOptions::new()
            .with_preserve_data_type(false)
            .merge_settings(settings);

        assert_eq!(options.syntax.separator, "/");
        assert_eq!(options.syntax.up_level_token, "-");
        assert_eq!(options.key_base, "site");
        assert_eq!(options.up_level_mode, UpLevelMode::Parent);
        assert!(!options.preserve_data_type);
    }

    #[test]
    fn test_settings_reject_unknown_fields() {
        let result: Result<PropRefSettings, _> = serde_json::from_str(r#"{"seperator": "/"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_debug_hides_collaborators() {
        let options = PropRefOptions::new().with_getter(crate::DirectGetter);
        let debug = format!("{:?}", options);
        assert!(debug.contains("<getter>"));
        assert!(debug.contains("Sibling"));
    }
}
