//! Pass 3: Mixed-Content Rewriting
//!
//! The importer represents XML mixed content as a `(textField, itemsField)`
//! member pair: one member carrying the interleaved text runs, one carrying
//! the structured children. When mixed-content mode is enabled and a type
//! declares both canonical fields, this pass collapses them into a single
//! generic content member:
//!
//! - the text-backed field and the property reading it are removed;
//! - the items-backed field and property are retyped to an array of opaque
//!   object references;
//! - the property form additionally gains a text annotation typed as
//!   string, so the serializer treats the member as raw text content
//!   interleaved with structured children.

use crate::config::TransformOptions;
use crate::model::{
    well_known, Annotation, AnnotationArgument, AnnotationKind, AnnotationValue, CodeModel,
    TypeReference,
};

/// Collapse the importer's canonical mixed-content member pair.
pub fn rewrite_mixed_content(model: &mut CodeModel, options: &TransformOptions) {
    if !options.mixed_content {
        return;
    }

    for decl in model.types.iter_mut().filter(|t| t.is_class()) {
        let has_pair = decl
            .members
            .iter()
            .any(|m| m.is_field() && m.name == well_known::TEXT_FIELD)
            && decl
                .members
                .iter()
                .any(|m| m.is_field() && m.name == well_known::ITEMS_FIELD);
        if !has_pair {
            continue;
        }

        tracing::debug!(type_name = %decl.name, "rewriting mixed content");

        // Drop the text-backed side: the field itself and any property
        // reading it.
        decl.members.retain(|m| {
            !(m.is_field() && m.name == well_known::TEXT_FIELD
                || m.is_property() && m.backing_field() == Some(well_known::TEXT_FIELD))
        });

        let opaque_items = TypeReference::array_of(TypeReference::scalar(well_known::OBJECT));
        for member in &mut decl.members {
            if member.is_field() && member.name == well_known::ITEMS_FIELD {
                member.ty = opaque_items.clone();
            } else if member.is_property()
                && member.backing_field() == Some(well_known::ITEMS_FIELD)
            {
                member.ty = opaque_items.clone();
                member.push_annotation(Annotation::with_args(
                    AnnotationKind::Text,
                    vec![AnnotationArgument::positional(AnnotationValue::TypeOf(
                        TypeReference::scalar(well_known::STRING),
                    ))],
                ));
            }
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
