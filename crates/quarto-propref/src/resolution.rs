/*
 * resolution.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Per-call resolution state.
//!
//! A [`ResolutionState`] is created for every top-level `parse`/`get` call
//! and threaded through the walker. It tracks the chain of keys currently
//! being resolved, which is what detects cycles (`a -> b -> a`) and bounds
//! the depth of nested references.

use crate::error::{PropRefError, PropRefResult};

#[derive(Debug)]
pub struct ResolutionState {
    /// Keys whose values are being resolved, outermost first.
    chain: Vec<String>,

    /// Maximum chain length before error.
    max_depth: usize,
}

impl ResolutionState {
    pub fn new(max_depth: usize) -> Self {
        Self {
            chain: Vec::new(),
            max_depth,
        }
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.chain.len()
    }

    pub fn chain(&self) -> &[String] {
        &self.chain
    }

    /// Push `key` onto the chain.
    ///
    /// Fails if `key` is already being resolved, or if the chain would grow
    /// past the maximum depth. Every successful `enter` must be paired with
    /// an [`exit`](Self::exit).
    pub fn enter(&mut self, key: &str) -> PropRefResult<()> {
        if self.chain.iter().any(|k| k == key) {
            let mut chain = self.chain.clone();
            chain.push(key.to_string());
            tracing::debug!(key, chain = %chain.join(" -> "), "Cyclic reference");
            return Err(PropRefError::CyclicReference {
                key: key.to_string(),
                chain,
            });
        }

        if self.chain.len() >= self.max_depth {
            tracing::debug!(key, max_depth = self.max_depth, "Reference chain too deep");
            return Err(PropRefError::DepthExceeded {
                key: key.to_string(),
                max_depth: self.max_depth,
            });
        }

        self.chain.push(key.to_string());
        Ok(())
    }

    /// Pop the innermost key.
    pub fn exit(&mut self) {
        self.chain.pop();
    }
}
