//! Pass 2: Collection Normalization
//!
//! Converts fixed arrays into growable ordered sequences (`List<T>`) on
//! every field and property, with two exclusions:
//!
//! - members whose resolved wire data type is a binary blob kind
//!   (`hexBinary`, `base64Binary`) — byte-for-byte semantics break under
//!   sequence substitution;
//! - choice discriminators, identified by the reserved discriminator
//!   enumeration name pattern or a choice-identifier annotation — the
//!   discriminator array must stay index-aligned with its choice group.
//!
//! Fields consult the property backed by them for the wire data type and
//! choice-identifier check, since the importer puts those annotations on
//! the property form only.
//!
//! Idempotent: a normalized member has array-rank 0, so a second run finds
//! nothing to convert.

use std::collections::HashMap;

use crate::config::TransformOptions;
use crate::model::{
    well_known, AnnotationKind, CodeModel, Member, MemberKind, TypeDeclaration, TypeReference,
};

/// Rewrite array-ranked member types as growable sequences.
pub fn normalize_collections(model: &mut CodeModel, options: &TransformOptions) {
    if !options.use_lists {
        return;
    }

    for decl in &mut model.types {
        let conversions = plan_conversions(decl);
        for (index, new_ty) in conversions {
            decl.members[index].ty = new_ty;
        }
    }
}

/// Decide, per member, which arrays become sequences. Read-only planning
/// phase so the backing-property lookups don't fight the rewrites.
fn plan_conversions(decl: &TypeDeclaration) -> Vec<(usize, TypeReference)> {
    let property_by_field = backing_field_index(decl);

    let mut conversions = Vec::new();
    for (index, member) in decl.members.iter().enumerate() {
        if !member.ty.is_array() {
            continue;
        }

        // The annotated form of this member: properties speak for
        // themselves, fields defer to the property backed by them.
        let annotated = match member.kind {
            MemberKind::Field => property_by_field
                .get(member.name.as_str())
                .map(|&i| &decl.members[i])
                .unwrap_or(member),
            _ => member,
        };

        if is_binary_blob(annotated) || is_choice_discriminator(member, annotated) {
            continue;
        }

        let element = member
            .ty
            .element
            .as_deref()
            .cloned()
            .unwrap_or_else(|| TypeReference::scalar(member.ty.base.clone()));
        conversions.push((index, TypeReference::list_of(element)));
    }
    conversions
}

/// Map backing-field name → index of the property reading it.
fn backing_field_index(decl: &TypeDeclaration) -> HashMap<&str, usize> {
    decl.members
        .iter()
        .enumerate()
        .filter(|(_, m)| m.is_property())
        .filter_map(|(i, m)| m.backing_field().map(|f| (f, i)))
        .collect()
}

fn is_binary_blob(annotated: &Member) -> bool {
    annotated
        .xml_data_type()
        .is_some_and(|dt| well_known::BINARY_DATA_TYPES.contains(&dt))
}

fn is_choice_discriminator(member: &Member, annotated: &Member) -> bool {
    member
        .ty
        .element_type()
        .starts_with(well_known::CHOICE_ENUM_PREFIX)
        || annotated.has_annotation(&AnnotationKind::ChoiceIdentifier)
}

// ===========================================================================
// Tests
// ===========================================================================
