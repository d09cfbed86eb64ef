/*
 * walker.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Recursive value walker and marker substitution.
//!
//! The walker rebuilds a value bottom-up:
//!
//! - Lists: every element is resolved under the list's own context (the
//!   index is not appended).
//! - Maps: every entry is resolved under the context extended by its key.
//! - Scalars: the context is reduced by one segment, so relative references
//!   inside a string resolve against the container of the field.
//!
//! Strings are scanned for markers until none remain. A marker spanning the
//! whole string is replaced by the referenced value itself (keeping its type)
//! when `preserve_data_type` is set; any other marker is replaced by the
//! rendered value and the string is scanned again from the start.

use crate::engine::PropRefParser;
use crate::error::{PropRefError, PropRefResult};
use crate::resolution::ResolutionState;
use crate::value::PropValue;

impl PropRefParser {
    /// Fetch `key` with the getter and resolve the raw value under `key`.
    pub(crate) fn get_with(
        &self,
        key: &str,
        state: &mut ResolutionState,
    ) -> PropRefResult<PropValue> {
        state.enter(key)?;
        let result = self.fetch(key, state);
        state.exit();
        result
    }

    fn fetch(&self, key: &str, state: &mut ResolutionState) -> PropRefResult<PropValue> {
        let raw = self
            .getter
            .get(&self.props, key, &self.options)
            .map_err(|source| PropRefError::Resolution {
                key: key.to_string(),
                source,
            })?;

        let context = self.keys.split(key);
        self.walk(&raw, &context, state)
    }

    /// Resolve `value`, located at `context`.
    pub(crate) fn walk(
        &self,
        value: &PropValue,
        context: &[String],
        state: &mut ResolutionState,
    ) -> PropRefResult<PropValue> {
        match value {
            PropValue::List(items) => items
                .iter()
                .map(|item| self.walk(item, context, state))
                .collect::<PropRefResult<Vec<_>>>()
                .map(PropValue::List),

            PropValue::Map(entries) => {
                let mut resolved = indexmap::IndexMap::with_capacity(entries.len());
                let mut child_context = context.to_vec();
                for (key, entry) in entries {
                    child_context.push(key.clone());
                    let value = self.walk(entry, &child_context, state)?;
                    child_context.pop();
                    resolved.insert(key.clone(), value);
                }
                Ok(PropValue::Map(resolved))
            }

            PropValue::String(text) => {
                let frame = &context[..context.len().saturating_sub(1)];
                self.substitute(text, frame, state)
            }

            PropValue::Null | PropValue::Bool(_) | PropValue::Number(_) => Ok(value.clone()),
        }
    }

    /// Replace every marker in `text`; `frame` is the path of its container.
    fn substitute(
        &self,
        text: &str,
        frame: &[String],
        state: &mut ResolutionState,
    ) -> PropRefResult<PropValue> {
        let mut current = text.to_string();
        let mut untouched = true;

        while let Some(found) = self.pattern.find(&current) {
            let key = self.reference_key(&found.key, frame);
            tracing::trace!(
                context = %frame.join(self.keys.separator()),
                expression = %found.key,
                key = %key,
                "Resolving reference"
            );

            let value = self.get_with(&key, state)?;
            tracing::trace!(key = %key, kind = value.kind(), whole = found.whole, "Resolved reference");

            if untouched && found.whole && self.options.preserve_data_type {
                match value {
                    PropValue::String(s) => current = s,
                    other => return Ok(other),
                }
            } else {
                current.replace_range(found.range(), &value.render());
            }
            untouched = false;
        }

        self.post_parse(current, frame)
    }

    /// Normalized key for a captured key expression.
    fn reference_key(&self, expression: &str, frame: &[String]) -> String {
        if self.keys.is_absolute(expression) {
            self.keys.resolve(&[expression])
        } else {
            let context = frame.join(self.keys.separator());
            self.keys.resolve(&[context.as_str(), expression])
        }
    }

    fn post_parse(&self, value: String, frame: &[String]) -> PropRefResult<PropValue> {
        match &self.options.post_parser {
            Some(post_parser) => post_parser
                .parse(&self.props, &value, &self.options)
                .map_err(|source| PropRefError::PostParse {
                    context: frame.join(self.keys.separator()),
                    source,
                }),
            None => Ok(PropValue::String(value)),
        }
    }
}
