//! Error types for model transformation.
//!
//! Every failure aborts the whole run — a partially-transformed model is
//! unsafe to hand to the emitter, so nothing here is retried or degraded.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    /// An import source path is neither a file nor a directory.
    #[error("import '{path}' is not a file nor a directory")]
    InvalidImportSource { path: String },

    /// A property reached the ordering step without the element or array
    /// annotation the inference step guarantees. Indicates an upstream bug.
    #[error("property '{type_name}.{property}' has no element or array annotation at ordering")]
    MissingElementAnnotation {
        type_name: String,
        property: String,
    },

    /// A final identifier is not valid in the target language.
    #[error("'{name}' on {owner} is not a valid identifier")]
    InvalidIdentifier { name: String, owner: String },

    /// An import directory could not be read.
    #[error("failed to read import directory '{path}': {source}")]
    ImportIo {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
