//! Pass 5: Annotation Stripping & Usage Pruning
//!
//! Two clean-ups that shrink the model down to what a consumer actually
//! needs:
//!
//! * Stripping removes annotations that never belong in the output: kinds
//!   the caller listed in `attributes-to-remove`, root annotations on
//!   enums, and root annotations declared nullable.
//! * Pruning, active only under `exclude-imported-types`, walks the type
//!   reference graph to a fixed point and drops generated helper types
//!   nothing reaches. A type is a removal candidate when it is anonymous
//!   and not a root, or explicitly excluded from the schema; a candidate
//!   survives only while some surviving type still refers to it, or a
//!   processed schema declares it at top level in the type's namespace.
//!   Non-candidates survive when they are attributable to one of the
//!   processed schema documents. With the flag off, nothing is removed.
//!
//! Pruning runs before reference fixup, so member types still carry
//! pre-rename names; the usage tree translates every reference through the
//! rename table before matching it against declarations.

use std::collections::{HashMap, HashSet};

use crate::config::TransformOptions;
use crate::model::{
    AnnotationKind, AnnotationValue, CodeModel, SchemaDocument, TypeDeclaration, TypeReference,
};
use crate::passes::p0_naming::RenameTable;

// ---------------------------------------------------------------------------
// Annotation stripping
// ---------------------------------------------------------------------------

/// Drop annotations the output should never carry.
pub fn strip_annotations(model: &mut CodeModel, options: &TransformOptions) {
    for decl in &mut model.types {
        let is_enum = !decl.is_class();
        decl.annotations.retain(|annotation| {
            if options.attributes_to_remove.contains(annotation.kind.name()) {
                tracing::debug!(
                    type_name = %decl.name,
                    annotation = annotation.kind.name(),
                    "stripping listed annotation"
                );
                return false;
            }
            if annotation.kind != AnnotationKind::Root {
                return true;
            }
            // Root serialization is meaningless on an enum, and a nullable
            // root marks a synthetic wrapper rather than a real document
            // element.
            if is_enum {
                return false;
            }
            annotation.named_arg("IsNullable") != Some(&AnnotationValue::Bool(true))
        });
    }
}

// ---------------------------------------------------------------------------
// Usage tree
// ---------------------------------------------------------------------------

/// One inbound reference to a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Referrer {
    /// Declared name of the referring type.
    pub owner: String,
    /// Property the reference flows through.
    pub member: String,
}

/// Inbound reference index over the whole model, keyed by post-rename
/// declared name. Only property references count: a raw backing field
/// without a property form does not keep its element type alive.
#[derive(Debug, Default)]
pub struct UsageTree {
    referrers: HashMap<String, Vec<Referrer>>,
}

impl UsageTree {
    pub fn build(model: &CodeModel, renames: &RenameTable) -> Self {
        let mut tree = Self::default();
        for decl in &model.types {
            for member in decl.members.iter().filter(|m| m.is_property()) {
                tree.record(&member.ty, renames, &decl.name, &member.name);
                for reference in member.annotation_type_refs() {
                    tree.record(reference, renames, &decl.name, &member.name);
                }
            }
        }
        tree
    }

    fn record(&mut self, ty: &TypeReference, renames: &RenameTable, owner: &str, member: &str) {
        let target = renames.resolve(ty.element_type()).to_string();
        self.referrers.entry(target).or_default().push(Referrer {
            owner: owner.to_string(),
            member: member.to_string(),
        });
        for arg in &ty.type_args {
            self.record(arg, renames, owner, member);
        }
    }

    pub fn referrers(&self, name: &str) -> &[Referrer] {
        self.referrers.get(name).map_or(&[], Vec::as_slice)
    }

    fn has_live_referrer(&self, name: &str, removed: &HashSet<&str>) -> bool {
        self.referrers(name)
            .iter()
            .any(|r| r.owner != name && !removed.contains(r.owner.as_str()))
    }
}

// ---------------------------------------------------------------------------
// Pruning
// ---------------------------------------------------------------------------

/// Remove unreachable helper types and imported types. A no-op unless
/// `exclude-imported-types` is set.
pub fn prune_unused(
    model: &mut CodeModel,
    schemas: &[SchemaDocument],
    options: &TransformOptions,
    renames: &RenameTable,
) {
    if !options.exclude_imported_types {
        return;
    }
    let usage = UsageTree::build(model, renames);

    let candidates: HashSet<&str> = model
        .types
        .iter()
        .filter(|t| (t.is_anonymous() && !t.is_root()) || !t.include_in_schema())
        .map(|t| t.name.as_str())
        .collect();

    // Start with everything marked removed and rescue types until nothing
    // changes. The order of rescues within a sweep doesn't matter; a
    // rescue in a later sweep can only add survivors.
    let mut removed: HashSet<&str> = model.types.iter().map(|t| t.name.as_str()).collect();
    let mut changed = true;
    while changed {
        changed = false;
        for decl in &model.types {
            let name = decl.name.as_str();
            if !removed.contains(name) {
                continue;
            }
            let keep = if candidates.contains(name) {
                usage.has_live_referrer(name, &removed) || declared_top_level(schemas, decl)
            } else {
                retained_by_schemas(schemas, decl, options)
            };
            if keep {
                removed.remove(name);
                changed = true;
            }
        }
    }

    if removed.is_empty() {
        return;
    }
    for name in &removed {
        tracing::debug!(type_name = %name, "pruning unreachable type");
    }
    let removed: HashSet<String> = removed.into_iter().map(str::to_string).collect();
    model.types.retain(|t| !removed.contains(&t.name));
}

/// Whether a processed schema declares the type at top level, matching by
/// simple name within the type's namespace when one is recorded.
fn declared_top_level(schemas: &[SchemaDocument], decl: &TypeDeclaration) -> bool {
    let name = decl.xml_name();
    match decl.xml_namespace() {
        Some(namespace) => schemas
            .iter()
            .any(|s| s.target_namespace.as_deref() == Some(namespace) && s.declares(name)),
        None => schemas.iter().any(|s| s.declares(name)),
    }
}

fn retained_by_schemas(
    schemas: &[SchemaDocument],
    decl: &TypeDeclaration,
    options: &TransformOptions,
) -> bool {
    // A recorded origin is decisive either way.
    if let Some(origin) = &decl.origin {
        return schemas.iter().any(|s| &s.id == origin);
    }
    let name = decl.xml_name();
    if options.exclude_imported_types_by_name_and_namespace {
        // An undeterminable namespace skips the namespace comparison and
        // matches by name across every processed schema.
        return match decl.xml_namespace() {
            Some(namespace) => schemas
                .iter()
                .any(|s| s.target_namespace.as_deref() == Some(namespace) && s.declares(name)),
            None => schemas.iter().any(|s| s.declares(name)),
        };
    }
    // Without a recorded namespace the lookup cannot attribute the type to
    // an import, so it counts as local.
    if decl.xml_namespace().is_none() {
        return true;
    }
    schemas.iter().any(|s| s.declares(name))
}

// ===========================================================================
// Tests
// ===========================================================================
