//! Final identifier validation, run after every transformation stage.
//!
//! The pipeline renames freely; before the model is handed to the emitter,
//! every surviving type and member name must be a valid target-language
//! identifier. A violation aborts the run.

use std::sync::OnceLock;

use regex::Regex;

use crate::error::TransformError;
use crate::model::CodeModel;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid pattern"))
}

/// Check every type and member name in the model.
pub fn validate_identifiers(model: &CodeModel) -> Result<(), TransformError> {
    for decl in &model.types {
        if !identifier_pattern().is_match(&decl.name) {
            return Err(TransformError::InvalidIdentifier {
                name: decl.name.clone(),
                owner: "namespace".to_string(),
            });
        }
        for member in &decl.members {
            if !identifier_pattern().is_match(&member.name) {
                return Err(TransformError::InvalidIdentifier {
                    name: member.name.clone(),
                    owner: format!("type '{}'", decl.name),
                });
            }
        }
    }
    Ok(())
}

// ===========================================================================
// Tests
// ===========================================================================
