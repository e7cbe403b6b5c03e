//! Pass 0: Naming Resolution
//!
//! Applies the configured capitalization strategies to type names, enum
//! values, and property names. Renames are collision-safe: a candidate that
//! collides inside its scope (the namespace for types, the owning type for
//! members) gets an increasing integer suffix. Whenever a rename changes a
//! schema-derived name, the original is recorded as the first positional
//! argument of the relevant serialization annotation so the wire name is
//! preserved — except on ignored members (not serialized at all) and
//! anonymous-type annotations (no stable original name exists).
//!
//! Type renames are additionally collected into a [`RenameTable`], consumed
//! by the reachability pruner (pass 5) and the reference fixup (pass 6).

use std::collections::{HashMap, HashSet};

use crate::config::TransformOptions;
use crate::model::{
    Annotation, AnnotationKind, AnnotationValue, CodeModel, MemberKind, TypeDeclaration,
};

/// Mapping of old type name → new type name, recorded while renaming.
#[derive(Debug, Clone, Default)]
pub struct RenameTable {
    map: HashMap<String, String>,
}

impl RenameTable {
    pub fn insert(&mut self, old: impl Into<String>, new: impl Into<String>) {
        self.map.insert(old.into(), new.into());
    }

    pub fn get(&self, old: &str) -> Option<&str> {
        self.map.get(old).map(String::as_str)
    }

    /// The post-rename name: the new name if `name` was renamed, `name`
    /// itself otherwise.
    pub fn resolve<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).unwrap_or(name)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.map.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Apply the configured naming strategies to the whole model.
///
/// Returns the table of type renames for later fixup. Member renames stay
/// local to their owning type and need no table: the wire name travels on
/// the annotation, and nothing else refers to members by name.
pub fn resolve_names(model: &mut CodeModel, options: &TransformOptions) -> RenameTable {
    let mut renames = RenameTable::default();

    if let Some(capitalizer) = &options.type_name_capitalizer {
        // Seed with every current name so a rename can never land on an
        // untouched declaration.
        let mut assigned: HashSet<String> = model.types.iter().map(|t| t.name.clone()).collect();
        for decl in &mut model.types {
            let candidate = capitalizer.capitalize(&decl.name);
            if candidate == decl.name {
                continue;
            }
            let original = decl.xml_name().to_string();
            set_original_name(&mut decl.annotations, &original, AnnotationKind::Type);
            assigned.remove(&decl.name);
            let unique = uniquify(candidate, &mut assigned);
            renames.insert(decl.name.clone(), unique.clone());
            decl.name = unique;
        }
        if !renames.is_empty() {
            tracing::debug!(count = renames.len(), "renamed type declarations");
        }
    }

    if let Some(capitalizer) = &options.enum_value_capitalizer {
        for decl in model.types.iter_mut().filter(|t| t.is_enum()) {
            rename_members(decl, MemberKind::Field, AnnotationKind::EnumValue, |name| {
                capitalizer.capitalize(name)
            });
        }
    }

    if let Some(capitalizer) = &options.property_name_capitalizer {
        for decl in model.types.iter_mut().filter(|t| t.is_class()) {
            rename_members(decl, MemberKind::Property, AnnotationKind::Element, |name| {
                capitalizer.capitalize(name)
            });
        }
    }

    renames
}

// ---------------------------------------------------------------------------
// Member renaming (shared between enum values and properties)
// ---------------------------------------------------------------------------

fn rename_members(
    decl: &mut TypeDeclaration,
    kind: MemberKind,
    fallback_annotation: AnnotationKind,
    capitalize: impl Fn(&str) -> String,
) {
    let mut taken: HashSet<String> = decl.members.iter().map(|m| m.name.clone()).collect();
    for member in decl.members.iter_mut().filter(|m| m.kind == kind) {
        let candidate = capitalize(&member.name);
        if candidate == member.name {
            continue;
        }
        let original = recorded_original(member.annotations.as_slice(), &member.name);
        set_original_name(
            &mut member.annotations,
            &original,
            fallback_annotation.clone(),
        );
        taken.remove(&member.name);
        member.name = uniquify(candidate, &mut taken);
    }
}

/// The member's original wire name: a previously recorded positional name
/// if one exists, the current name otherwise.
fn recorded_original(annotations: &[Annotation], current: &str) -> String {
    annotations
        .iter()
        .find_map(Annotation::positional_name)
        .unwrap_or(current)
        .to_string()
}

fn uniquify(candidate: String, taken: &mut HashSet<String>) -> String {
    if taken.insert(candidate.clone()) {
        return candidate;
    }
    let mut index = 0;
    loop {
        index += 1;
        let suffixed = format!("{candidate}{index}");
        if taken.insert(suffixed.clone()) {
            return suffixed;
        }
    }
}

// ---------------------------------------------------------------------------
// Original-name preservation
// ---------------------------------------------------------------------------

/// Annotation kinds that carry a wire name as their first positional
/// argument.
const NEEDS_NAME: &[AnnotationKind] = &[
    AnnotationKind::Attribute,
    AnnotationKind::Element,
    AnnotationKind::ArrayItem,
    AnnotationKind::EnumValue,
    AnnotationKind::Type,
    AnnotationKind::Root,
];

/// Record `original` as the positional name argument of every name-bearing
/// annotation that lacks one, creating a `fallback` annotation when none
/// exists. Ignored members are skipped entirely; anonymous-type annotations
/// never receive a name.
fn set_original_name(
    annotations: &mut Vec<Annotation>,
    original: &str,
    fallback: AnnotationKind,
) {
    if annotations.iter().any(|a| a.kind == AnnotationKind::Ignore) {
        return;
    }

    let mut targets: Vec<usize> = annotations
        .iter()
        .enumerate()
        .filter(|(_, a)| NEEDS_NAME.contains(&a.kind))
        .map(|(i, _)| i)
        .collect();

    if targets.is_empty() {
        annotations.push(Annotation::new(fallback));
        targets.push(annotations.len() - 1);
    }

    for index in targets {
        let annotation = &mut annotations[index];
        if annotation.kind == AnnotationKind::Type && is_anonymous_argument(annotation) {
            continue;
        }
        let already_named = annotation
            .args
            .iter()
            .any(|a| a.is_positional() && matches!(a.value, AnnotationValue::Str(_)));
        if !already_named {
            annotation.insert_positional_name(original);
        }
    }
}

fn is_anonymous_argument(annotation: &Annotation) -> bool {
    matches!(
        annotation.named_arg("AnonymousType"),
        Some(AnnotationValue::Bool(true))
    )
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    use crate::capitalize::FirstCharacterCapitalizer;
    use crate::model::{AnnotationArgument, Member, TypeReference};

    fn capitalize_all() -> TransformOptions {
        TransformOptions {
            type_name_capitalizer: Some(Arc::new(FirstCharacterCapitalizer)),
            property_name_capitalizer: Some(Arc::new(FirstCharacterCapitalizer)),
            enum_value_capitalizer: Some(Arc::new(FirstCharacterCapitalizer)),
            ..TransformOptions::default()
        }
    }

    #[test]
    fn test_type_rename_records_original_and_table() {
        let mut model = CodeModel {
            types: vec![TypeDeclaration::class("purchaseOrder")],
        };

        let renames = resolve_names(&mut model, &capitalize_all());

        assert_eq!(model.types[0].name, "PurchaseOrder");
        assert_eq!(renames.get("purchaseOrder"), Some("PurchaseOrder"));
        // Original name lands on a fresh type annotation.
        let annotation = model.types[0].annotation(&AnnotationKind::Type).unwrap();
        assert_eq!(annotation.positional_name(), Some("purchaseOrder"));
    }

    #[test]
    fn test_type_rename_collision_gets_suffix() {
        let mut model = CodeModel {
            types: vec![
                TypeDeclaration::class("Order"),
                TypeDeclaration::class("order"),
            ],
        };

        let renames = resolve_names(&mut model, &capitalize_all());

        assert_eq!(model.types[0].name, "Order");
        assert_eq!(model.types[1].name, "Order1");
        assert_eq!(renames.get("order"), Some("Order1"));
        assert_eq!(renames.get("Order"), None);
    }

    #[test]
    fn test_no_strategy_is_identity() {
        let mut model = CodeModel {
            types: vec![TypeDeclaration::class("purchaseOrder")],
        };
        let options = TransformOptions {
            type_name_capitalizer: None,
            property_name_capitalizer: None,
            enum_value_capitalizer: None,
            ..TransformOptions::default()
        };

        let renames = resolve_names(&mut model, &options);

        assert_eq!(model.types[0].name, "purchaseOrder");
        assert!(renames.is_empty());
        assert!(model.types[0].annotations.is_empty());
    }

    #[test]
    fn test_property_rename_records_element_name() {
        let mut decl = TypeDeclaration::class("Order");
        decl.members.push(Member::property(
            "total",
            TypeReference::scalar("Decimal"),
            "totalField",
        ));
        let mut model = CodeModel { types: vec![decl] };

        resolve_names(&mut model, &capitalize_all());

        let member = &model.types[0].members[0];
        assert_eq!(member.name, "Total");
        let annotation = member.annotation(&AnnotationKind::Element).unwrap();
        assert_eq!(annotation.positional_name(), Some("total"));
    }

    #[test]
    fn test_ignored_member_rename_records_nothing() {
        let mut decl = TypeDeclaration::class("Order");
        let mut prop = Member::property("total", TypeReference::scalar("Decimal"), "totalField");
        prop.push_annotation(Annotation::new(AnnotationKind::Ignore));
        decl.members.push(prop);
        let mut model = CodeModel { types: vec![decl] };

        resolve_names(&mut model, &capitalize_all());

        let member = &model.types[0].members[0];
        // Rename still applies; the excluded member just records no name.
        assert_eq!(member.name, "Total");
        assert!(member.annotation(&AnnotationKind::Element).is_none());
    }

    #[test]
    fn test_anonymous_type_annotation_receives_no_name() {
        let mut decl = TypeDeclaration::class("innerType");
        decl.push_annotation(Annotation::with_args(
            AnnotationKind::Type,
            vec![AnnotationArgument::named(
                "AnonymousType",
                AnnotationValue::Bool(true),
            )],
        ));
        let mut model = CodeModel { types: vec![decl] };

        let renames = resolve_names(&mut model, &capitalize_all());

        assert_eq!(model.types[0].name, "InnerType");
        assert_eq!(renames.get("innerType"), Some("InnerType"));
        let annotation = model.types[0].annotation(&AnnotationKind::Type).unwrap();
        assert_eq!(annotation.positional_name(), None);
    }

    #[test]
    fn test_existing_positional_name_is_kept() {
        let mut decl = TypeDeclaration::class("order");
        let mut annotation = Annotation::new(AnnotationKind::Type);
        annotation.insert_positional_name("wire-order");
        decl.push_annotation(annotation);
        let mut model = CodeModel { types: vec![decl] };

        resolve_names(&mut model, &capitalize_all());

        let annotation = model.types[0].annotation(&AnnotationKind::Type).unwrap();
        // The previously recorded wire name wins over the pre-rename name.
        assert_eq!(annotation.positional_name(), Some("wire-order"));
    }

    #[test]
    fn test_enum_value_rename_records_enum_annotation() {
        let mut decl = TypeDeclaration::enumeration("Status");
        decl.members
            .push(Member::field("pending", TypeReference::scalar("Status")));
        decl.members
            .push(Member::field("shipped", TypeReference::scalar("Status")));
        let mut model = CodeModel { types: vec![decl] };

        resolve_names(&mut model, &capitalize_all());

        let decl = &model.types[0];
        assert_eq!(decl.members[0].name, "Pending");
        assert_eq!(decl.members[1].name, "Shipped");
        let annotation = decl.members[0].annotation(&AnnotationKind::EnumValue).unwrap();
        assert_eq!(annotation.positional_name(), Some("pending"));
    }

    #[test]
    fn test_member_rename_collision_within_type() {
        let mut decl = TypeDeclaration::class("Order");
        decl.members.push(Member::property(
            "Value",
            TypeReference::scalar("String"),
            "valueField2",
        ));
        decl.members.push(Member::property(
            "value",
            TypeReference::scalar("String"),
            "valueField",
        ));
        let mut model = CodeModel { types: vec![decl] };

        resolve_names(&mut model, &capitalize_all());

        let names: Vec<&str> = model.types[0]
            .members
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, vec!["Value", "Value1"]);
    }
}
