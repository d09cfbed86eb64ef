/*
 * engine.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Parser construction and public entry points.

use std::sync::Arc;

use crate::error::{PropRefError, PropRefResult};
use crate::getter::{KeyPathGetter, PropertyGetter};
use crate::keypath::KeyPathRules;
use crate::options::{GetterMode, PropRefOptions};
use crate::pattern::ReferencePattern;
use crate::resolution::ResolutionState;
use crate::value::PropValue;

/// Resolves reference markers in a property tree.
///
/// The parser owns the tree it was built with and never modifies it: every
/// call returns a freshly resolved value. All regexes are compiled once in
/// [`PropRefParser::new`].
pub struct PropRefParser {
    pub(crate) props: PropValue,
    pub(crate) options: PropRefOptions,
    pub(crate) getter: Arc<dyn PropertyGetter>,
    pub(crate) pattern: ReferencePattern,
    pub(crate) keys: KeyPathRules,
}

impl std::fmt::Debug for PropRefParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropRefParser")
            .field("props", &self.props)
            .field("options", &self.options)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

impl PropRefParser {
    /// Build a parser for `props`.
    ///
    /// Fails with [`PropRefError::Configuration`] if the syntax options are
    /// invalid, or if `options.getter_mode` is [`GetterMode::Required`] and
    /// no getter was supplied.
    pub fn new(props: impl Into<PropValue>, options: PropRefOptions) -> PropRefResult<Self> {
        let getter: Arc<dyn PropertyGetter> = match (&options.getter, options.getter_mode) {
            (Some(getter), _) => Arc::clone(getter),
            (None, GetterMode::Default) => Arc::new(KeyPathGetter),
            (None, GetterMode::Required) => {
                return Err(PropRefError::configuration(
                    "a getter is required to look up referenced property values",
                ));
            }
        };

        let keys = KeyPathRules::from_options(&options)?;
        let pattern = ReferencePattern::compile(&options.syntax)?;

        tracing::debug!(
            pattern = pattern.as_str(),
            separator = %options.syntax.separator,
            up_level_token = %options.syntax.up_level_token,
            key_base = %options.key_base,
            "Compiled property reference parser"
        );

        Ok(Self {
            props: props.into(),
            options,
            getter,
            pattern,
            keys,
        })
    }

    /// Build a parser with the default options.
    pub fn with_defaults(props: impl Into<PropValue>) -> PropRefResult<Self> {
        Self::new(props, PropRefOptions::default())
    }

    pub fn props(&self) -> &PropValue {
        &self.props
    }

    pub fn options(&self) -> &PropRefOptions {
        &self.options
    }

    pub fn pattern(&self) -> &ReferencePattern {
        &self.pattern
    }

    pub fn key_rules(&self) -> &KeyPathRules {
        &self.keys
    }

    /// Join segments into a normalized key.
    pub fn key_join<S: AsRef<str>>(&self, segments: &[S]) -> String {
        self.keys.join(segments)
    }

    /// Join segments into a normalized key, applying the key base.
    pub fn key_resolve<S: AsRef<str>>(&self, segments: &[S]) -> String {
        self.keys.resolve(segments)
    }

    /// Look up `key` with the getter and resolve every reference in the result.
    pub fn get(&self, key: &str) -> PropRefResult<PropValue> {
        let mut state = ResolutionState::new(self.options.max_depth);
        self.get_with(key, &mut state)
    }

    /// Resolve the whole property tree.
    pub fn parse(&self) -> PropRefResult<PropValue> {
        let mut state = ResolutionState::new(self.options.max_depth);
        self.walk(&self.props, &[], &mut state)
    }

    /// Resolve `value` as if it were located at `context`.
    ///
    /// `context` is the path of the value itself; relative references inside
    /// string scalars resolve against its container.
    pub fn parse_value<S: AsRef<str>>(
        &self,
        value: &PropValue,
        context: &[S],
    ) -> PropRefResult<PropValue> {
        let mut state = ResolutionState::new(self.options.max_depth);
        let context: Vec<String> = context.iter().map(|s| s.as_ref().to_string()).collect();
        self.walk(value, &context, &mut state)
    }

    /// Like [`parse_value`](Self::parse_value), with the context given as a key.
    pub fn parse_value_at(&self, value: &PropValue, key: &str) -> PropRefResult<PropValue> {
        let mut state = ResolutionState::new(self.options.max_depth);
        let context = self.keys.split(key);
        self.walk(value, &context, &mut state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GetterError;
    use crate::options::ReferenceSyntax;
    use serde_json::json;

    #[test]
    fn test_required_getter_missing() {
        let options = PropRefOptions::default().with_getter_mode(GetterMode::Required);
        let err = PropRefParser::new(PropValue::map(), options).unwrap_err();
        assert!(matches!(err, PropRefError::Configuration { .. }));
        assert!(err.to_string().contains("getter"));
    }

    #[test]
    fn test_required_getter_supplied() {
        let options = PropRefOptions::default()
            .with_getter_mode(GetterMode::Required)
            .with_getter(
                |_: &PropValue, key: &str, _: &PropRefOptions| -> Result<PropValue, GetterError> {
                    Ok(PropValue::from(format!("<{}>", key)))
                },
            );
        let parser = PropRefParser::new(PropValue::map(), options).unwrap();
        assert_eq!(parser.get("a.b").unwrap(), PropValue::from("<a.b>"));
    }

    #[test]
    fn test_invalid_syntax_is_configuration_error() {
        let options = PropRefOptions::default().with_syntax(ReferenceSyntax {
            reference_pattern: "no placeholder".to_string(),
            ..ReferenceSyntax::default()
        });
        let err = PropRefParser::new(PropValue::Null, options).unwrap_err();
        assert!(matches!(err, PropRefError::Configuration { .. }));
    }

    #[test]
    fn test_key_join_and_resolve() {
        let parser = PropRefParser::new(
            PropValue::Null,
            PropRefOptions::default().with_key_base("site"),
        )
        .unwrap();

        assert_eq!(parser.key_join(&["a", "b", "c"]), "a.b.c");
        assert_eq!(parser.key_resolve(&["a", "b"]), "site.a.b");
        assert_eq!(parser.key_resolve(&[".a.b"]), "a.b");
    }

    #[test]
    fn test_parse_does_not_mutate_props() {
        let props = PropValue::from(json!({"a": 1, "b": "@{ a }"}));
        let parser = PropRefParser::with_defaults(props.clone()).unwrap();

        let resolved = parser.parse().unwrap();
        assert_eq!(resolved.get("b"), Some(&PropValue::from(1i64)));
        assert_eq!(parser.props(), &props);
    }
}
