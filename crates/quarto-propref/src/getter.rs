/*
 * getter.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Property lookup and post-processing collaborators.
//!
//! The parser never reads the property tree directly. Every resolved key is
//! handed to a [`PropertyGetter`], which returns the raw (unresolved) value
//! for that key. Fully substituted strings can additionally be passed through
//! a [`PostParser`].

use std::collections::HashMap;

use crate::error::GetterError;
use crate::options::PropRefOptions;
use crate::value::PropValue;

/// Trait for looking up the raw value of a resolved key.
///
/// Returning `Ok(PropValue::Null)` for an unknown key is not an error; the
/// reference simply resolves to null. Returning `Err` aborts the whole
/// resolution call with [`PropRefError::Resolution`](crate::PropRefError::Resolution).
pub trait PropertyGetter: Send + Sync {
    /// Look up `key` in `props`.
    ///
    /// # Arguments
    /// * `props` - The property tree the parser was built with
    /// * `key` - A normalized key (no up-level tokens, no leading separator)
    /// * `options` - The parser options, e.g. for the configured separator
    fn get(
        &self,
        props: &PropValue,
        key: &str,
        options: &PropRefOptions,
    ) -> Result<PropValue, GetterError>;
}

impl<F> PropertyGetter for F
where
    F: Fn(&PropValue, &str, &PropRefOptions) -> Result<PropValue, GetterError> + Send + Sync,
{
    fn get(
        &self,
        props: &PropValue,
        key: &str,
        options: &PropRefOptions,
    ) -> Result<PropValue, GetterError> {
        self(props, key, options)
    }
}

/// Trait for transforming fully substituted string values.
pub trait PostParser: Send + Sync {
    fn parse(
        &self,
        props: &PropValue,
        value: &str,
        options: &PropRefOptions,
    ) -> Result<PropValue, GetterError>;
}

impl<F> PostParser for F
where
    F: Fn(&PropValue, &str, &PropRefOptions) -> Result<PropValue, GetterError> + Send + Sync,
{
    fn parse(
        &self,
        props: &PropValue,
        value: &str,
        options: &PropRefOptions,
    ) -> Result<PropValue, GetterError> {
        self(props, value, options)
    }
}

/// Getter that treats the whole key as a single top-level entry.
///
/// `"dev.siteUrl"` is looked up as the literal key `dev.siteUrl`, which suits
/// flat property maps.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectGetter;

impl PropertyGetter for DirectGetter {
    fn get(
        &self,
        props: &PropValue,
        key: &str,
        _options: &PropRefOptions,
    ) -> Result<PropValue, GetterError> {
        Ok(props.get(key).cloned().unwrap_or_default())
    }
}

/// Getter used when no getter is supplied.
///
/// Tries the literal top-level key first, then splits the key on the
/// configured separator and walks nested mappings.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyPathGetter;

impl PropertyGetter for KeyPathGetter {
    fn get(
        &self,
        props: &PropValue,
        key: &str,
        options: &PropRefOptions,
    ) -> Result<PropValue, GetterError> {
        if let Some(value) = props.get(key) {
            return Ok(value.clone());
        }

        let path: Vec<&str> = key.split(options.syntax.separator.as_str()).collect();
        Ok(props.get_path(&path).cloned().unwrap_or_default())
    }
}

/// Getter that serves values from an in-memory table instead of the tree.
///
/// Useful for testing and for values computed outside the property tree
/// (environment, command line).
#[derive(Debug, Clone, Default)]
pub struct MemoryGetter {
    values: HashMap<String, PropValue>,
}

impl MemoryGetter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value; the key must be in normalized form.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<PropValue>) -> &mut Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn with_values(
        values: impl IntoIterator<Item = (impl Into<String>, impl Into<PropValue>)>,
    ) -> Self {
        let mut getter = Self::new();
        for (key, value) in values {
            getter.add(key, value);
        }
        getter
    }
}

impl PropertyGetter for MemoryGetter {
    fn get(
        &self,
        _props: &PropValue,
        key: &str,
        _options: &PropRefOptions,
    ) -> Result<PropValue, GetterError> {
        Ok(self.values.get(key).cloned().unwrap_or_default())
    }
}
