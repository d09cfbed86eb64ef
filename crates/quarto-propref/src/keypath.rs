/*
 * keypath.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Keypath joining and normalization.
//!
//! A keypath is a list of segments joined by the configured separator.
//! Relative navigation is written with up-level groups: the up-level token,
//! once or twice, followed by the separator (`-.` and `--.` by default).
//!
//! Normalization of a joined path runs in this order:
//!
//! 1. Each run of climbing groups removes trailing segments from the text
//!    that precedes it (never more than are available).
//! 2. In [`UpLevelMode::Sibling`], remaining single groups become a plain
//!    separator.
//! 3. Runs of separators collapse into one.
//! 4. One leading separator is stripped.
//!
//! ```
//! use quarto_propref::{KeyPathRules, PropRefOptions};
//!
//! let rules = KeyPathRules::from_options(&PropRefOptions::default()).unwrap();
//! assert_eq!(rules.join(&["a", "b", "c"]), "a.b.c");
//! assert_eq!(rules.join(&["a.b.c", "--.d"]), "a.b.d");
//! assert_eq!(rules.join(&[".prod.siteUrl"]), "prod.siteUrl");
//! ```

use regex::{NoExpand, Regex};

use crate::error::{PropRefError, PropRefResult};
use crate::options::{KeyBasePolicy, PropRefOptions, UpLevelMode};

/// Precompiled keypath algebra for one set of options.
#[derive(Debug, Clone)]
pub struct KeyPathRules {
    separator: String,
    up_level_token: String,
    mode: UpLevelMode,
    key_base: String,
    key_base_policy: KeyBasePolicy,

    /// Runs of groups that remove segments.
    climb_re: Regex,
    /// A single group inside a climbing run; `ups` captures the tokens.
    group_re: Regex,
    /// Runs of single groups (sibling mode only).
    stay_re: Option<Regex>,
    /// Two or more consecutive separators.
    collapse_re: Regex,
}

impl KeyPathRules {
    /// Compile the rules for the given options.
    pub fn from_options(options: &PropRefOptions) -> PropRefResult<Self> {
        let separator = options.syntax.separator.as_str();
        let token = options.syntax.up_level_token.as_str();
        validate_tokens(separator, token)?;

        let sep = regex::escape(separator);
        let up = regex::escape(token);

        let climb_source = match options.up_level_mode {
            UpLevelMode::Sibling => format!("(?:(?:{up}){{2}}{sep})+"),
            UpLevelMode::Parent => format!("(?:(?:{up}){{1,2}}{sep})+"),
        };
        let stay_re = match options.up_level_mode {
            UpLevelMode::Sibling => Some(compile(&format!("(?:(?:{up}){sep})+"))?),
            UpLevelMode::Parent => None,
        };

        Ok(Self {
            separator: separator.to_string(),
            up_level_token: token.to_string(),
            mode: options.up_level_mode,
            key_base: options.key_base.clone(),
            key_base_policy: options.key_base_policy,
            climb_re: compile(&climb_source)?,
            group_re: compile(&format!("(?P<ups>(?:{up}){{1,2}}){sep}"))?,
            stay_re,
            collapse_re: compile(&format!("(?:{sep}){{2,}}"))?,
        })
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn up_level_token(&self) -> &str {
        &self.up_level_token
    }

    /// Whether `key` starts with the separator and names something after it.
    pub fn is_absolute(&self, key: &str) -> bool {
        key.len() > self.separator.len() && key.starts_with(self.separator.as_str())
    }

    /// Split a key into its segments. The empty key has no segments.
    pub fn split(&self, key: &str) -> Vec<String> {
        if key.is_empty() {
            return Vec::new();
        }
        key.split(self.separator.as_str())
            .map(str::to_string)
            .collect()
    }

    /// Join segments and normalize the result into a canonical key.
    pub fn join<S: AsRef<str>>(&self, segments: &[S]) -> String {
        let sep = self.separator.as_str();
        let mut key = segments
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<&str>>()
            .join(sep);

        while let Some(run) = self.climb_re.find(&key) {
            let climb = self.climb_count(run.as_str());
            let before = &key[..run.start()];
            let before = before.strip_suffix(sep).unwrap_or(before);

            let mut prefix: Vec<&str> = if before.is_empty() {
                Vec::new()
            } else {
                before.split(sep).collect()
            };
            prefix.truncate(prefix.len().saturating_sub(climb));

            let next = format!("{}{}{}", prefix.join(sep), sep, &key[run.end()..]);
            key = next;
        }

        if let Some(stay_re) = &self.stay_re {
            key = stay_re.replace_all(&key, NoExpand(sep)).into_owned();
        }
        key = self.collapse_re.replace_all(&key, NoExpand(sep)).into_owned();

        match key.strip_prefix(sep) {
            Some(rest) => rest.to_string(),
            None => key,
        }
    }

    /// Like [`join`](Self::join), with the key base prepended according to
    /// the configured [`KeyBasePolicy`].
    pub fn resolve<S: AsRef<str>>(&self, segments: &[S]) -> String {
        let prepend = !self.key_base.is_empty()
            && match self.key_base_policy {
                KeyBasePolicy::Always => true,
                KeyBasePolicy::Contextual => !segments
                    .first()
                    .is_some_and(|first| self.is_absolute(first.as_ref())),
            };

        if !prepend {
            return self.join(segments);
        }

        let mut with_base: Vec<&str> = Vec::with_capacity(segments.len() + 1);
        with_base.push(&self.key_base);
        with_base.extend(segments.iter().map(AsRef::as_ref));
        self.join(&with_base)
    }

    /// Number of segments a run of climbing groups removes.
    fn climb_count(&self, run: &str) -> usize {
        let token_len = self.up_level_token.len();
        self.group_re
            .captures_iter(run)
            .filter_map(|caps| caps.name("ups"))
            .map(|ups| {
                let tokens = ups.as_str().len() / token_len;
                match self.mode {
                    UpLevelMode::Sibling => tokens.saturating_sub(1),
                    UpLevelMode::Parent => tokens,
                }
            })
            .sum()
    }
}

fn validate_tokens(separator: &str, token: &str) -> PropRefResult<()> {
    if separator.is_empty() {
        return Err(PropRefError::configuration("separator must not be empty"));
    }
    if token.is_empty() {
        return Err(PropRefError::configuration(
            "up-level token must not be empty",
        ));
    }
    if separator.contains(token) || token.contains(separator) {
        return Err(PropRefError::configuration(format!(
            "separator '{}' and up-level token '{}' must not overlap",
            separator, token
        )));
    }
    Ok(())
}

fn compile(source: &str) -> PropRefResult<Regex> {
    Regex::new(source)
        .map_err(|e| PropRefError::configuration(format!("invalid pattern '{}': {}", source, e)))
}
