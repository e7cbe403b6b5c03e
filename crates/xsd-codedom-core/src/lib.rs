//! Post-processing engine for schema-derived code models.
//!
//! Generic schema importers produce technically correct but awkward code
//! models: collision-suffixed lowercase names, `X`/`XSpecified` optional
//! pairs, raw arrays everywhere, and a trail of anonymous helper types
//! nothing uses. This crate rewrites such a [`CodeModel`] in place through
//! a fixed pipeline of seven passes:
//!
//! 0. naming — pluggable capitalization with original-name preservation
//! 1. nullable synthesis — optional pairs become one nullable facade
//! 2. collection normalization — arrays become `List<T>`
//! 3. mixed content — text/items pairs become one opaque content array
//! 4. annotation & ordering — explicit roles, order indices, data binding
//! 5. stripping & pruning — drop noise annotations and unreachable types
//! 6. reference fixup — rewrite every reference through the rename table
//!
//! Each pass other than naming and fixup is gated by a flag on
//! [`TransformOptions`]. The entry point is [`transform`]:
//!
//! ```
//! use xsd_codedom_core::{transform, CodeModel, TransformOptions};
//!
//! let mut model = CodeModel::new();
//! transform(&mut model, &[], &TransformOptions::default())?;
//! # Ok::<(), xsd_codedom_core::TransformError>(())
//! ```

pub mod capitalize;
pub mod config;
pub mod error;
pub mod model;
pub mod passes;
pub mod validate;

pub use capitalize::{Capitalizer, FirstCharacterCapitalizer};
pub use config::{resolve_import_sources, TransformOptions};
pub use error::TransformError;
pub use model::{
    Annotation, AnnotationArgument, AnnotationKind, AnnotationValue, CodeModel, Member,
    MemberKind, PropertyAccessors, SchemaDocument, Statement, TopLevelItem, TopLevelKind,
    TypeDeclaration, TypeKind, TypeReference, Visibility,
};
pub use passes::p0_naming::RenameTable;
pub use validate::validate_identifiers;

/// Run the full transformation pipeline over `model`.
///
/// `schemas` are the compiled documents the model was imported from; the
/// pruning pass consults their top-level declarations to decide which
/// types are protected and, under imported-type exclusion, which types
/// belong to the processed set at all. The model is modified in place; on
/// error it may be left partially transformed.
pub fn transform(
    model: &mut CodeModel,
    schemas: &[SchemaDocument],
    options: &TransformOptions,
) -> Result<(), TransformError> {
    transform_with_validator(model, schemas, options, |_, _| {})
}

/// [`transform`], plus a per-document inspection hook.
///
/// After the pipeline completes, `inspect` is called once per schema
/// document with the finished model, mirroring generators that let
/// callers veto or post-process output per input file. The hook runs
/// before final identifier validation, so it sees the model even when
/// validation subsequently rejects a name.
pub fn transform_with_validator(
    model: &mut CodeModel,
    schemas: &[SchemaDocument],
    options: &TransformOptions,
    mut inspect: impl FnMut(&CodeModel, &SchemaDocument),
) -> Result<(), TransformError> {
    tracing::debug!(types = model.types.len(), "starting transformation");

    let renames = passes::p0_naming::resolve_names(model, options);
    tracing::debug!(renamed = renames.len(), "naming resolved");

    passes::p1_nullable::synthesize_nullable(model, options);
    passes::p2_collections::normalize_collections(model, options);
    passes::p3_mixed_content::rewrite_mixed_content(model, options);
    passes::p4_annotate::annotate_members(model, options)?;

    passes::p5_prune::strip_annotations(model, options);
    passes::p5_prune::prune_unused(model, schemas, options, &renames);

    passes::p6_fixup::fix_type_references(model, &renames);

    for schema in schemas {
        inspect(model, schema);
    }

    validate::validate_identifiers(model)?;
    tracing::debug!(types = model.types.len(), "transformation complete");
    Ok(())
}
