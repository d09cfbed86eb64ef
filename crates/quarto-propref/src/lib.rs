/*
 * lib.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Cross-reference resolution for hierarchical property trees.
//!
//! Values in a property tree may reference other values of the same tree
//! with markers such as `@{ .prod.siteUrl }`. This crate finds those markers
//! and substitutes the referenced values. It supports:
//!
//! - Absolute keys: `@{ .prod.siteUrl }`
//! - Keys relative to the containing mapping: `@{ siteUrl }`, `@{ -.siteUrl }`
//! - Up-level navigation: `@{ --.name }` refers to `name` one level up
//! - Type preservation: a string that is exactly one marker becomes the
//!   referenced value itself (number, boolean, list, map)
//! - Interpolation: markers inside longer strings are replaced by the
//!   rendered value
//! - Transitive resolution with cycle detection
//!
//! The marker syntax, key grammar, separator and up-level token are all
//! configurable through [`PropRefOptions`].
//!
//! # Example
//!
//! ```
//! use quarto_propref::{PropRefParser, PropValue};
//! use serde_json::json;
//!
//! let parser = PropRefParser::with_defaults(json!({
//!     "dev": {"siteUrl": "https://www.example.test", "prodUrl": "@{ .prod.siteUrl }"},
//!     "prod": {"siteUrl": "https://www.example.com", "port": 443, "url": "@{ siteUrl }:@{ port }"},
//! }))?;
//!
//! let resolved = parser.parse()?;
//! assert_eq!(
//!     resolved.get_path(&["dev", "prodUrl"]),
//!     Some(&PropValue::from("https://www.example.com"))
//! );
//! assert_eq!(
//!     resolved.get_path(&["prod", "url"]),
//!     Some(&PropValue::from("https://www.example.com:443"))
//! );
//! # Ok::<(), quarto_propref::PropRefError>(())
//! ```

pub mod engine;
pub mod error;
pub mod getter;
pub mod keypath;
pub mod options;
pub mod pattern;
pub mod resolution;
pub mod value;
mod walker;

// Re-export main types at crate root
pub use engine::PropRefParser;
pub use error::{GetterError, PropRefError, PropRefResult};
pub use getter::{DirectGetter, KeyPathGetter, MemoryGetter, PostParser, PropertyGetter};
pub use keypath::KeyPathRules;
pub use options::{
    GetterMode, KeyBasePolicy, PropRefOptions, PropRefSettings, ReferenceSyntax, UpLevelMode,
};
pub use pattern::{ReferenceMatch, ReferencePattern};
pub use value::PropValue;
