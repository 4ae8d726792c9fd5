//! Address character-class check.

use regex::Regex;
use thiserror::Error;

use crate::config::InputConfig;

/// Why an address was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputRejection {
    #[error("Address input is required")]
    Missing,

    #[error("Only , . - # symbols are accepted")]
    Pattern,
}

/// Compiled address pattern.
#[derive(Debug, Clone)]
pub struct InputPolicy {
    pattern: Regex,
}

impl InputPolicy {
    pub fn new(config: &InputConfig) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(&config.pattern)?,
        })
    }

    /// Check an address, ignoring surrounding whitespace.
    pub fn check(&self, address: &str) -> Result<(), InputRejection> {
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(InputRejection::Missing);
        }
        if !self.pattern.is_match(trimmed) {
            return Err(InputRejection::Pattern);
        }
        Ok(())
    }
}
