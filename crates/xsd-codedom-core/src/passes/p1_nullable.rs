//! Pass 1: Optional-Field Synthesis
//!
//! The importer represents an optional scalar as a `(value, presence-flag)`
//! property pair: `Count` plus a boolean `CountSpecified`. When nullable
//! optional fields are enabled this pass collapses each pair into a single
//! public `Nullable`-typed property:
//!
//! - its read path returns the underlying value only while the flag is set;
//! - its write path stores a present value and raises the flag, or clears
//!   the flag on an absent value;
//! - it carries an ignore annotation — the facade itself is never
//!   serialized, the underlying pair still is.
//!
//! The original pair is renamed with the internal `_` prefix so it cannot
//! collide with the facade. Before renaming, the explicit wire name is
//! transplanted onto the original's element/attribute annotations (adding an
//! element annotation when the member relied on name-by-convention), since
//! the rename would otherwise change the wire name. With
//! `hide-underlying-nullable-properties` both originals are additionally
//! marked non-browsable.
//!
//! Runs after naming (pass 0) so pair detection sees final member names,
//! and before fixup (pass 6) so the facade's type survives rename
//! propagation.

use crate::config::TransformOptions;
use crate::model::{
    well_known, Annotation, AnnotationArgument, AnnotationKind, AnnotationValue, CodeModel,
    Member, MemberKind, PropertyAccessors, Statement, TypeReference, Visibility,
};

/// Collapse every `(P, PSpecified)` property pair into a nullable facade.
pub fn synthesize_nullable(model: &mut CodeModel, options: &TransformOptions) {
    if !options.use_nullable_types {
        return;
    }

    let mut synthesized = 0usize;
    for decl in model.types.iter_mut().filter(|t| t.is_class()) {
        let pairs = detect_pairs(&decl.members);
        for (value_index, flag_index) in pairs {
            let facade = build_facade(&decl.members[value_index]);

            transplant_wire_name(&mut decl.members[value_index]);

            for index in [value_index, flag_index] {
                let member = &mut decl.members[index];
                member.name = format!("{}{}", well_known::INTERNAL_PREFIX, member.name);
                if options.hide_underlying_nullable_properties {
                    member.push_annotation(Annotation::new(AnnotationKind::NonBrowsable));
                }
            }

            decl.members.push(facade);
            synthesized += 1;
        }
    }

    if synthesized > 0 {
        tracing::debug!(count = synthesized, "synthesized nullable properties");
    }
}

// ---------------------------------------------------------------------------
// Pair detection
// ---------------------------------------------------------------------------

/// Indices of `(value property, presence-flag companion)` pairs. The
/// companion may be a field or a property; the value member must be a
/// property, not itself a companion, and not an already-hidden internal
/// member.
fn detect_pairs(members: &[Member]) -> Vec<(usize, usize)> {
    let mut pairs = Vec::new();
    for (index, member) in members.iter().enumerate() {
        if !member.is_property()
            || member.name.starts_with(well_known::INTERNAL_PREFIX)
            || is_companion(&member.name, members)
        {
            continue;
        }
        let companion_name = format!("{}{}", member.name, well_known::SPECIFIED_SUFFIX);
        if let Some(companion_index) = members.iter().position(|m| m.name == companion_name) {
            pairs.push((index, companion_index));
        }
    }
    pairs
}

/// Whether `name` is the `XSpecified` companion of a sibling member `X`.
fn is_companion(name: &str, members: &[Member]) -> bool {
    name.strip_suffix(well_known::SPECIFIED_SUFFIX)
        .is_some_and(|base| !base.is_empty() && members.iter().any(|m| m.name == base))
}

// ---------------------------------------------------------------------------
// Facade construction
// ---------------------------------------------------------------------------

fn build_facade(value_property: &Member) -> Member {
    let value_field = backing_field_of(value_property);
    let flag_field = format!("{}{}", value_field, well_known::SPECIFIED_SUFFIX);

    Member {
        name: value_property.name.clone(),
        kind: MemberKind::Property,
        ty: TypeReference::nullable_of(value_property.ty.base.clone()),
        visibility: Visibility::Public,
        annotations: vec![Annotation::new(AnnotationKind::Ignore)],
        accessors: Some(PropertyAccessors {
            get: vec![Statement::GuardedReturn {
                flag_field: flag_field.clone(),
                value_field: value_field.clone(),
            }],
            set: vec![Statement::StoreOptional {
                value_field,
                flag_field,
            }],
        }),
    }
}

/// The backing field the facade reads and writes: the value property's own
/// backing field when its get body exposes one, otherwise derived from the
/// importer's naming convention (`Count` → `countField`).
fn backing_field_of(property: &Member) -> String {
    if let Some(field) = property.backing_field() {
        return field.to_string();
    }
    let mut chars = property.name.chars();
    let field: String = match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    };
    format!("{}{}", field, well_known::FIELD_SUFFIX)
}

// ---------------------------------------------------------------------------
// Wire-name transplantation
// ---------------------------------------------------------------------------

/// Ensure the soon-to-be-renamed original keeps its wire name: add an
/// explicit name argument to every element/attribute annotation lacking
/// one, or a fresh element annotation with the explicit name when the
/// member had neither and relied on name-by-convention.
fn transplant_wire_name(property: &mut Member) {
    let wire_name = property.name.clone();
    let mut has_target = false;

    for annotation in &mut property.annotations {
        let argument_name = match annotation.kind {
            AnnotationKind::Attribute => "AttributeName",
            AnnotationKind::Element => "ElementName",
            _ => continue,
        };
        has_target = true;
        if annotation.has_positional_name() || annotation.named_arg(argument_name).is_some() {
            continue;
        }
        annotation.args.push(AnnotationArgument::named(
            argument_name,
            AnnotationValue::Str(wire_name.clone()),
        ));
    }

    if !has_target {
        property.push_annotation(Annotation::with_args(
            AnnotationKind::Element,
            vec![AnnotationArgument::named(
                "ElementName",
                AnnotationValue::Str(wire_name),
            )],
        ));
    }
}

// ===========================================================================
// Tests
// ===========================================================================
