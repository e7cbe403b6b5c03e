//! Configuration for model transformation.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::capitalize::{Capitalizer, FirstCharacterCapitalizer};
use crate::error::TransformError;

/// Resolved options controlling the transformation pipeline.
///
/// ## Serialization Format
///
/// Fields are serialized in `kebab-case` (e.g., `use-lists`,
/// `preserve-order`). The capitalizer strategy slots are trait objects and
/// are skipped; deserialized options start with no strategies set.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TransformOptions {
    /// Convert fixed arrays into growable ordered sequences.
    pub use_lists: bool,
    /// Collapse `(value, presence-flag)` pairs into nullable properties.
    pub use_nullable_types: bool,
    /// Assign explicit order indices to content-model members.
    pub preserve_order: bool,
    /// Rewrite the importer's mixed-content member pair.
    pub mixed_content: bool,
    /// Add change-notification plumbing to generated classes.
    pub enable_data_binding: bool,
    /// Prune types that only exist to serve imported schemas.
    pub exclude_imported_types: bool,
    /// Stricter prune protection: a type must be declared by name at a
    /// processed schema's top level, not merely share its namespace.
    pub exclude_imported_types_by_name_and_namespace: bool,
    /// Treat every class as a serialization root.
    pub all_types_are_root: bool,
    /// Extra type names to treat as serialization roots.
    pub additional_root_types: HashSet<String>,
    /// Annotation names stripped from every type (e.g. debugging markers).
    pub attributes_to_remove: HashSet<String>,
    /// Mark the renamed underlying members of synthesized nullable
    /// properties as non-browsable.
    pub hide_underlying_nullable_properties: bool,
    /// Qualified schema type names the importer must skip entirely. The
    /// engine carries this so one options struct configures the whole run;
    /// it is consumed when top-level mappings are selected, before the
    /// model reaches the pipeline.
    pub exclude_xml_types: HashSet<String>,

    /// Strategy for type names; `None` leaves them untouched.
    #[serde(skip)]
    pub type_name_capitalizer: Option<Arc<dyn Capitalizer>>,
    /// Strategy for property names; `None` leaves them untouched.
    #[serde(skip)]
    pub property_name_capitalizer: Option<Arc<dyn Capitalizer>>,
    /// Strategy for enum values; `None` leaves them untouched.
    #[serde(skip)]
    pub enum_value_capitalizer: Option<Arc<dyn Capitalizer>>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            use_lists: true,
            use_nullable_types: true,
            preserve_order: false,
            mixed_content: false,
            enable_data_binding: false,
            exclude_imported_types: false,
            exclude_imported_types_by_name_and_namespace: false,
            all_types_are_root: false,
            additional_root_types: HashSet::new(),
            attributes_to_remove: HashSet::from(["DebuggerStepThrough".to_string()]),
            hide_underlying_nullable_properties: false,
            exclude_xml_types: HashSet::new(),
            type_name_capitalizer: None,
            property_name_capitalizer: Some(Arc::new(FirstCharacterCapitalizer)),
            enum_value_capitalizer: None,
        }
    }
}

/// Expand configured import sources into concrete schema file paths.
///
/// A source may be a single schema file or a directory, in which case every
/// `.xsd` file directly inside it is taken. Anything else is a fatal
/// configuration error. Loading and compiling the resulting files is the
/// external importer's job.
pub fn resolve_import_sources(sources: &[PathBuf]) -> Result<Vec<PathBuf>, TransformError> {
    let mut resolved = Vec::new();
    for source in sources {
        if source.is_file() {
            resolved.push(source.clone());
        } else if source.is_dir() {
            let entries = fs::read_dir(source).map_err(|e| TransformError::ImportIo {
                path: source.display().to_string(),
                source: e,
            })?;
            let mut files: Vec<PathBuf> = entries
                .filter_map(Result::ok)
                .map(|e| e.path())
                .filter(|p| p.extension().is_some_and(|ext| ext == "xsd"))
                .collect();
            // Directory iteration order is platform-dependent.
            files.sort();
            resolved.extend(files);
        } else {
            return Err(TransformError::InvalidImportSource {
                path: source.display().to_string(),
            });
        }
    }
    Ok(resolved)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_serde_round_trip() {
        let opts = TransformOptions {
            preserve_order: true,
            additional_root_types: HashSet::from(["Envelope".to_string()]),
            ..TransformOptions::default()
        };

        let json = serde_json::to_string(&opts).unwrap();

        // Kebab-case field names are the public contract.
        assert!(json.contains("\"use-lists\""));
        assert!(json.contains("\"preserve-order\""));
        assert!(json.contains("\"additional-root-types\""));

        let back: TransformOptions = serde_json::from_str(&json).unwrap();
        assert!(back.use_lists);
        assert!(back.preserve_order);
        assert!(back.additional_root_types.contains("Envelope"));
        // Strategy slots are skipped, not round-tripped.
        assert!(back.property_name_capitalizer.is_none());
    }

    #[test]
    fn test_default_options_mirror_legacy_fallback() {
        let opts = TransformOptions::default();
        assert!(opts.use_lists);
        assert!(opts.use_nullable_types);
        assert!(opts.property_name_capitalizer.is_some());
        assert!(opts.attributes_to_remove.contains("DebuggerStepThrough"));
    }

    #[test]
    fn test_resolve_import_sources_rejects_missing_path() {
        let missing = PathBuf::from("/does/not/exist-at-all.xsd");
        let err = resolve_import_sources(&[missing]).unwrap_err();
        assert!(matches!(err, TransformError::InvalidImportSource { .. }));
    }

    #[test]
    fn test_resolve_import_sources_accepts_file_and_dir() {
        let dir = std::env::temp_dir().join("xsd-codedom-import-test");
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let a = dir.join("a.xsd");
        let b = dir.join("b.xsd");
        let other = dir.join("notes.txt");
        fs::write(&a, "<schema/>").unwrap();
        fs::write(&b, "<schema/>").unwrap();
        fs::write(&other, "ignored").unwrap();

        let resolved = resolve_import_sources(&[a.clone(), dir.clone()]).unwrap();
        assert_eq!(resolved, vec![a.clone(), a, b]);

        fs::remove_dir_all(&dir).unwrap();
    }
}
