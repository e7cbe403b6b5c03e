//! Pass 6: Type Reference Fixup
//!
//! Earlier passes rename declarations but deliberately leave every
//! reference — base types, member types, `typeof`-style annotation
//! arguments — spelling the old names, so that the usage analysis can
//! match references against the rename table instead of chasing a moving
//! target. This pass closes the loop: it rewrites every reference in the
//! surviving model through the table. Enums carry no outbound references
//! and are skipped.

use crate::model::{Annotation, AnnotationValue, CodeModel, TypeReference};
use crate::passes::p0_naming::RenameTable;

/// Rewrite all type references through the rename table.
pub fn fix_type_references(model: &mut CodeModel, renames: &RenameTable) {
    if renames.is_empty() {
        return;
    }
    for decl in &mut model.types {
        if !decl.is_class() {
            continue;
        }
        for base in &mut decl.base_types {
            fix_reference(base, renames);
        }
        for annotation in &mut decl.annotations {
            fix_annotation(annotation, renames);
        }
        for member in &mut decl.members {
            fix_reference(&mut member.ty, renames);
            for annotation in &mut member.annotations {
                fix_annotation(annotation, renames);
            }
        }
    }
}

fn fix_annotation(annotation: &mut Annotation, renames: &RenameTable) {
    for arg in &mut annotation.args {
        if let AnnotationValue::TypeOf(ty) = &mut arg.value {
            fix_reference(ty, renames);
        }
    }
}

fn fix_reference(ty: &mut TypeReference, renames: &RenameTable) {
    if let Some(renamed) = renames.get(&ty.base) {
        ty.base = renamed.to_string();
    }
    if let Some(element) = ty.element.as_deref_mut() {
        fix_reference(element, renames);
    }
    for arg in &mut ty.type_args {
        fix_reference(arg, renames);
    }
}

// ===========================================================================
// Tests
// ===========================================================================
