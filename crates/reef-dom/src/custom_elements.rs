//! Defined-tag registry
//!
//! Tracks which custom tag names the host has upgraded to live
//! components. The placeholder manager only masks elements whose tag
//! looks custom (contains a hyphen) but is not yet defined here.

use std::collections::HashSet;

/// Registry of defined custom tag names
#[derive(Debug, Default)]
pub struct DefinedRegistry {
    defined: HashSet<String>,
}

impl DefinedRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a custom tag name as defined
    pub fn define(&mut self, name: &str) -> Result<(), DefineError> {
        if !Self::is_valid_name(name) {
            return Err(DefineError::InvalidName);
        }
        if self.defined.contains(name) {
            return Err(DefineError::AlreadyDefined);
        }
        self.defined.insert(name.to_string());
        Ok(())
    }

    /// Check if a tag name has been defined
    pub fn is_defined(&self, name: &str) -> bool {
        self.defined.contains(name)
    }

    /// Check if a tag name could name a custom element at all
    #[inline]
    pub fn is_custom_name(name: &str) -> bool {
        name.contains('-')
    }

    /// Validate a custom element name
    fn is_valid_name(name: &str) -> bool {
        // Must contain hyphen
        if !name.contains('-') {
            return false;
        }

        // Must start with lowercase letter
        if !name
            .chars()
            .next()
            .map(|c| c.is_ascii_lowercase())
            .unwrap_or(false)
        {
            return false;
        }

        // Reserved names
        let reserved = [
            "annotation-xml",
            "color-profile",
            "font-face",
            "font-face-src",
            "font-face-uri",
            "font-face-format",
            "font-face-name",
            "missing-glyph",
        ];
        if reserved.contains(&name) {
            return false;
        }

        true
    }
}

/// Errors from defining a custom tag name
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DefineError {
    #[error("invalid custom element name")]
    InvalidName,
    #[error("custom element already defined")]
    AlreadyDefined,
}
