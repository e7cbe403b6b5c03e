//! Pluggable capitalization strategies for the naming resolver.
//!
//! A strategy only proposes a candidate name; collision handling and
//! original-name preservation are the naming pass's job. Leaving a strategy
//! slot unset in [`TransformOptions`](crate::config::TransformOptions) is
//! the identity strategy — nothing is renamed.

use std::fmt;

/// A capitalization strategy applied to type, property, or enum-value names.
///
/// Implement this to supply a user-defined strategy through the options
/// struct; the built-in [`FirstCharacterCapitalizer`] covers the common
/// schema-to-target convention.
pub trait Capitalizer: fmt::Debug + Send + Sync {
    /// Propose a capitalized form of `name`. Returning `name` unchanged
    /// means no rename.
    fn capitalize(&self, name: &str) -> String;
}

/// Upper-cases the first character, leaving the rest of the name untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstCharacterCapitalizer;

impl Capitalizer for FirstCharacterCapitalizer {
    fn capitalize(&self, name: &str) -> String {
        let mut chars = name.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
