//! Pass 4: Attribute Annotation & Ordering
//!
//! Makes every property's serialization role explicit before the pruner and
//! the emitter reason about it:
//!
//! 1. Root promotion — under `all-types-are-root` (or for names listed in
//!    `additional-root-types`) a class without a root annotation gains one,
//!    carrying the type's namespace and a non-nullable flag.
//! 2. Inference — a property with no recognized serialization annotation is
//!    an element by implication; one already describing its collectionItems
//!    via an array-item annotation gets the matching array annotation.
//! 3. Ordering — under `preserve-order`, element/array annotations of
//!    ordinary content members receive a per-type `Order` index, strictly
//!    increasing in declaration order from 0. A content member with no
//!    element/array annotation at this point is an internal consistency
//!    failure: inference above guarantees one exists.
//! 4. Data binding — under `enable-data-binding`, base-less classes gain
//!    the change event and a protected raise operation, and the write path
//!    of every non-companion, non-internal property ends with a
//!    raise-change statement targeting the facade, never the hidden
//!    underlying member.

use crate::config::TransformOptions;
use crate::error::TransformError;
use crate::model::{
    well_known, Annotation, AnnotationArgument, AnnotationKind, AnnotationValue, CodeModel,
    Member, MemberKind, Statement, TypeDeclaration, TypeReference, Visibility,
};

/// Serialization annotations that already state a property's role.
const RECOGNIZED: &[AnnotationKind] = &[
    AnnotationKind::EnumValue,
    AnnotationKind::Text,
    AnnotationKind::Ignore,
    AnnotationKind::Attribute,
    AnnotationKind::Element,
    AnnotationKind::AnyAttribute,
    AnnotationKind::AnyElement,
];

/// Annotations that exclude a property from content-model ordering.
const NON_ELEMENT: &[AnnotationKind] = &[
    AnnotationKind::Attribute,
    AnnotationKind::Ignore,
    AnnotationKind::Text,
];

/// Annotate, order, and wire change notification across the model.
pub fn annotate_members(
    model: &mut CodeModel,
    options: &TransformOptions,
) -> Result<(), TransformError> {
    for decl in &mut model.types {
        promote_root(decl, options);

        if !decl.is_class() {
            continue;
        }

        infer_roles(decl);

        if options.preserve_order {
            assign_order(decl)?;
        }

        if options.enable_data_binding {
            add_data_binding(decl);
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Root promotion
// ---------------------------------------------------------------------------

fn promote_root(decl: &mut TypeDeclaration, options: &TransformOptions) {
    let wants_root =
        options.all_types_are_root || options.additional_root_types.contains(&decl.name);
    if !wants_root || decl.is_root() {
        return;
    }
    // Without a recorded namespace there is nothing to root the type in.
    let Some(namespace) = decl.xml_namespace().map(str::to_string) else {
        return;
    };
    decl.push_annotation(Annotation::with_args(
        AnnotationKind::Root,
        vec![
            AnnotationArgument::named("Namespace", AnnotationValue::Str(namespace)),
            AnnotationArgument::named("IsNullable", AnnotationValue::Bool(false)),
        ],
    ));
}

// ---------------------------------------------------------------------------
// Role inference
// ---------------------------------------------------------------------------

fn infer_roles(decl: &mut TypeDeclaration) {
    for member in decl.members.iter_mut().filter(|m| m.is_property()) {
        let has_role = member
            .annotations
            .iter()
            .any(|a| RECOGNIZED.contains(&a.kind));
        if has_role {
            continue;
        }
        if member.has_annotation(&AnnotationKind::ArrayItem) {
            // Item form already described: collection-as-element semantics.
            member.push_annotation(Annotation::new(AnnotationKind::Array));
        } else {
            // Implied element; make the role explicit.
            member.push_annotation(Annotation::new(AnnotationKind::Element));
        }
    }
}

// ---------------------------------------------------------------------------
// Order assignment
// ---------------------------------------------------------------------------

fn assign_order(decl: &mut TypeDeclaration) -> Result<(), TransformError> {
    let type_name = decl.name.clone();
    let mut order_index = 0i64;
    for member in decl.members.iter_mut().filter(|m| m.is_property()) {
        let excluded = member
            .annotations
            .iter()
            .any(|a| NON_ELEMENT.contains(&a.kind));
        if excluded {
            continue;
        }

        let mut found = false;
        for annotation in member.annotations.iter_mut().filter(|a| {
            matches!(a.kind, AnnotationKind::Element | AnnotationKind::Array)
        }) {
            annotation.args.push(AnnotationArgument::named(
                "Order",
                AnnotationValue::Int(order_index),
            ));
            found = true;
        }
        if !found {
            // Inference above adds element/array to every ordinary content
            // member; reaching this is an upstream bug.
            return Err(TransformError::MissingElementAnnotation {
                type_name,
                property: member.name.clone(),
            });
        }
        order_index += 1;
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Data binding
// ---------------------------------------------------------------------------

fn add_data_binding(decl: &mut TypeDeclaration) {
    if decl.base_types.is_empty() {
        decl.members.push(Member {
            name: well_known::PROPERTY_CHANGED.to_string(),
            kind: MemberKind::Event,
            ty: TypeReference::scalar(well_known::PROPERTY_CHANGED_HANDLER),
            visibility: Visibility::Public,
            annotations: Vec::new(),
            accessors: None,
        });
        decl.members.push(Member {
            name: well_known::RAISE_PROPERTY_CHANGED.to_string(),
            kind: MemberKind::Method,
            ty: TypeReference::scalar(well_known::VOID),
            visibility: Visibility::Protected,
            annotations: Vec::new(),
            accessors: None,
        });
    }

    let names: Vec<String> = decl.members.iter().map(|m| m.name.clone()).collect();
    for member in decl.members.iter_mut().filter(|m| m.is_property()) {
        if member.name.starts_with(well_known::INTERNAL_PREFIX)
            || is_presence_companion(&member.name, &names)
        {
            continue;
        }
        let property = member.name.clone();
        if let Some(accessors) = member.accessors.as_mut() {
            accessors.set.push(Statement::RaiseChanged { property });
        }
    }
}

/// A `XSpecified` name is only a presence companion when the base-named
/// sibling `X` actually exists.
fn is_presence_companion(name: &str, sibling_names: &[String]) -> bool {
    name.strip_suffix(well_known::SPECIFIED_SUFFIX)
        .is_some_and(|base| !base.is_empty() && sibling_names.iter().any(|n| n == base))
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    use crate::model::PropertyAccessors;

    fn options() -> TransformOptions {
        TransformOptions::default()
    }

    fn property(name: &str) -> Member {
        Member::property(
            name,
            TypeReference::scalar("String"),
            format!("{}Field", name.to_lowercase()),
        )
    }

    #[test]
    fn test_plain_property_becomes_element() {
        let mut decl = TypeDeclaration::class("Order");
        decl.members.push(property("Name"));
        let mut model = CodeModel { types: vec![decl] };

        annotate_members(&mut model, &options()).unwrap();

        let member = &model.types[0].members[0];
        assert!(member.has_annotation(&AnnotationKind::Element));
        assert!(!member.has_annotation(&AnnotationKind::Array));
    }

    #[test]
    fn test_array_item_property_becomes_array() {
        let mut decl = TypeDeclaration::class("Order");
        let mut member = property("Lines");
        member.push_annotation(Annotation::new(AnnotationKind::ArrayItem));
        decl.members.push(member);
        let mut model = CodeModel { types: vec![decl] };

        annotate_members(&mut model, &options()).unwrap();

        let member = &model.types[0].members[0];
        assert!(member.has_annotation(&AnnotationKind::Array));
        assert!(!member.has_annotation(&AnnotationKind::Element));
    }

    #[test]
    fn test_annotated_property_untouched() {
        let mut decl = TypeDeclaration::class("Order");
        let mut member = property("Id");
        member.push_annotation(Annotation::new(AnnotationKind::Attribute));
        decl.members.push(member);
        let mut model = CodeModel { types: vec![decl] };

        annotate_members(&mut model, &options()).unwrap();

        let member = &model.types[0].members[0];
        assert!(member.has_annotation(&AnnotationKind::Attribute));
        assert!(!member.has_annotation(&AnnotationKind::Element));
    }

    #[test]
    fn test_order_indices_start_at_zero_and_increase() {
        let mut decl = TypeDeclaration::class("Order");
        decl.members.push(property("First"));
        let mut attr = property("Id");
        attr.push_annotation(Annotation::new(AnnotationKind::Attribute));
        decl.members.push(attr);
        decl.members.push(property("Second"));
        decl.members.push(property("Third"));
        let mut model = CodeModel { types: vec![decl] };
        let options = TransformOptions {
            preserve_order: true,
            ..TransformOptions::default()
        };

        annotate_members(&mut model, &options).unwrap();

        let order_of = |name: &str| {
            model.types[0]
                .member(name)
                .unwrap()
                .annotation(&AnnotationKind::Element)
                .unwrap()
                .named_arg("Order")
                .cloned()
        };
        assert_eq!(order_of("First"), Some(AnnotationValue::Int(0)));
        assert_eq!(order_of("Second"), Some(AnnotationValue::Int(1)));
        assert_eq!(order_of("Third"), Some(AnnotationValue::Int(2)));
        // Attribute members take no index and don't consume one.
        assert_eq!(
            model.types[0]
                .member("Id")
                .unwrap()
                .annotation(&AnnotationKind::Attribute)
                .unwrap()
                .named_arg("Order"),
            None
        );
    }

    #[test]
    fn test_order_restarts_per_type() {
        let mut first = TypeDeclaration::class("A");
        first.members.push(property("One"));
        let mut second = TypeDeclaration::class("B");
        second.members.push(property("Two"));
        let mut model = CodeModel {
            types: vec![first, second],
        };
        let options = TransformOptions {
            preserve_order: true,
            ..TransformOptions::default()
        };

        annotate_members(&mut model, &options).unwrap();

        let order = model.types[1].members[0]
            .annotation(&AnnotationKind::Element)
            .unwrap()
            .named_arg("Order")
            .cloned();
        assert_eq!(order, Some(AnnotationValue::Int(0)));
    }

    #[test]
    fn test_missing_element_annotation_is_internal_error() {
        // An any-element property is recognized (no inference) but not
        // excluded from ordering, so ordering finds no element/array
        // annotation to index.
        let mut decl = TypeDeclaration::class("Order");
        let mut member = property("Extra");
        member.push_annotation(Annotation::new(AnnotationKind::AnyElement));
        decl.members.push(member);
        let mut model = CodeModel { types: vec![decl] };
        let options = TransformOptions {
            preserve_order: true,
            ..TransformOptions::default()
        };

        let err = annotate_members(&mut model, &options).unwrap_err();
        assert!(matches!(
            err,
            TransformError::MissingElementAnnotation { property, .. } if property == "Extra"
        ));
    }

    #[test]
    fn test_root_promotion_uses_type_namespace() {
        let mut decl = TypeDeclaration::class("Order");
        decl.push_annotation(Annotation::with_args(
            AnnotationKind::Type,
            vec![AnnotationArgument::named(
                "Namespace",
                AnnotationValue::Str("urn:orders".into()),
            )],
        ));
        let mut model = CodeModel { types: vec![decl] };
        let options = TransformOptions {
            all_types_are_root: true,
            ..TransformOptions::default()
        };

        annotate_members(&mut model, &options).unwrap();

        let root = model.types[0].annotation(&AnnotationKind::Root).unwrap();
        assert_eq!(
            root.named_arg("Namespace"),
            Some(&AnnotationValue::Str("urn:orders".into()))
        );
        assert_eq!(
            root.named_arg("IsNullable"),
            Some(&AnnotationValue::Bool(false))
        );
    }

    #[test]
    fn test_root_promotion_skips_namespaceless_and_existing_roots() {
        let mut bare = TypeDeclaration::class("Bare");
        let mut rooted = TypeDeclaration::class("Rooted");
        rooted.push_annotation(Annotation::new(AnnotationKind::Root));
        bare.members.push(property("X"));
        let mut model = CodeModel {
            types: vec![bare, rooted],
        };
        let options = TransformOptions {
            all_types_are_root: true,
            ..TransformOptions::default()
        };

        annotate_members(&mut model, &options).unwrap();

        assert!(!model.types[0].is_root());
        // The existing root annotation is not duplicated.
        assert_eq!(
            model.types[1]
                .annotations
                .iter()
                .filter(|a| a.kind == AnnotationKind::Root)
                .count(),
            1
        );
    }

    #[test]
    fn test_data_binding_adds_event_and_raise_to_baseless_class() {
        let mut decl = TypeDeclaration::class("Order");
        decl.members.push(property("Name"));
        let mut derived = TypeDeclaration::class("Derived");
        derived.base_types.push(TypeReference::scalar("Order"));
        let mut model = CodeModel {
            types: vec![decl, derived],
        };
        let options = TransformOptions {
            enable_data_binding: true,
            ..TransformOptions::default()
        };

        annotate_members(&mut model, &options).unwrap();

        let base = &model.types[0];
        assert!(base
            .members
            .iter()
            .any(|m| m.kind == MemberKind::Event && m.name == well_known::PROPERTY_CHANGED));
        let raise = base
            .members
            .iter()
            .find(|m| m.kind == MemberKind::Method)
            .unwrap();
        assert_eq!(raise.name, well_known::RAISE_PROPERTY_CHANGED);
        assert_eq!(raise.visibility, Visibility::Protected);

        // Derived classes inherit the capability instead of redeclaring it.
        assert!(!model.types[1]
            .members
            .iter()
            .any(|m| m.kind == MemberKind::Event));
    }

    #[test]
    fn test_data_binding_targets_facade_not_hidden_members() {
        let mut decl = TypeDeclaration::class("Order");
        decl.members.push(property("_Count"));
        decl.members.push(property("CountSpecified"));
        let mut facade = Member {
            name: "Count".to_string(),
            kind: MemberKind::Property,
            ty: TypeReference::nullable_of("Int"),
            visibility: Visibility::Public,
            annotations: vec![Annotation::new(AnnotationKind::Ignore)],
            accessors: Some(PropertyAccessors::default()),
        };
        facade.accessors.as_mut().unwrap().set.push(Statement::StoreOptional {
            value_field: "countField".into(),
            flag_field: "countFieldSpecified".into(),
        });
        decl.members.push(facade);
        let mut model = CodeModel { types: vec![decl] };
        let options = TransformOptions {
            enable_data_binding: true,
            ..TransformOptions::default()
        };

        annotate_members(&mut model, &options).unwrap();

        let raised = |name: &str| {
            model.types[0]
                .member(name)
                .unwrap()
                .accessors
                .as_ref()
                .unwrap()
                .set
                .iter()
                .any(|s| matches!(s, Statement::RaiseChanged { .. }))
        };
        assert!(raised("Count"));
        assert!(!raised("_Count"));
        assert!(!raised("CountSpecified"));
    }

    #[test]
    fn test_data_binding_keeps_specified_named_property_without_sibling() {
        // "DeliverySpecified" is only a presence companion when a sibling
        // "Delivery" exists; on its own it is an ordinary property.
        let mut decl = TypeDeclaration::class("Order");
        decl.members.push(property("DeliverySpecified"));
        let mut model = CodeModel { types: vec![decl] };
        let options = TransformOptions {
            enable_data_binding: true,
            ..TransformOptions::default()
        };

        annotate_members(&mut model, &options).unwrap();

        let set = &model.types[0]
            .member("DeliverySpecified")
            .unwrap()
            .accessors
            .as_ref()
            .unwrap()
            .set;
        assert!(matches!(
            set.last(),
            Some(Statement::RaiseChanged { property }) if property == "DeliverySpecified"
        ));
    }
}
