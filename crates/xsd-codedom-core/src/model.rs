//! The code model rewritten by the transformation pipeline.
//!
//! An external schema importer constructs a [`CodeModel`] from one or more
//! compiled schema documents; the pipeline stages mutate it in place; an
//! external serializer prints the finished model. Nothing in this module
//! performs schema parsing or source emission — it is a pure in-memory
//! representation of types, members, and serialization annotations.

use serde::{Deserialize, Serialize};

/// Names and markers with fixed meaning across the pipeline.
pub mod well_known {
    /// Growable ordered sequence type produced by collection normalization.
    pub const LIST: &str = "List";
    /// Wrapper type produced by optional-field synthesis.
    pub const NULLABLE: &str = "Nullable";
    /// Opaque reference type used for mixed content items.
    pub const OBJECT: &str = "Object";
    /// Text content type.
    pub const STRING: &str = "String";
    /// Return type of operations that yield nothing.
    pub const VOID: &str = "Void";

    /// Prefix marking members reserved for internal use after synthesis.
    pub const INTERNAL_PREFIX: &str = "_";
    /// Suffix identifying a presence-flag companion member.
    pub const SPECIFIED_SUFFIX: &str = "Specified";
    /// Suffix the importer appends to backing field names.
    pub const FIELD_SUFFIX: &str = "Field";

    /// Importer's canonical text member of a mixed-content type.
    pub const TEXT_FIELD: &str = "textField";
    /// Importer's canonical items member of a mixed-content type.
    pub const ITEMS_FIELD: &str = "itemsField";

    /// Name prefix reserved for choice-discriminator enumerations.
    pub const CHOICE_ENUM_PREFIX: &str = "ItemsChoiceType";
    /// Wire data types with byte-for-byte binary semantics.
    pub const BINARY_DATA_TYPES: &[&str] = &["hexBinary", "base64Binary"];

    /// Change-notification event added under data binding.
    pub const PROPERTY_CHANGED: &str = "PropertyChanged";
    /// Handler type of the change-notification event.
    pub const PROPERTY_CHANGED_HANDLER: &str = "PropertyChangedHandler";
    /// Protected raise operation added under data binding.
    pub const RAISE_PROPERTY_CHANGED: &str = "RaisePropertyChanged";
}

// ---------------------------------------------------------------------------
// Type references
// ---------------------------------------------------------------------------

/// A reference to a type by name, optionally wrapped as an array or carrying
/// generic type arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeReference {
    /// Referenced base-type name. For arrays this names the element type.
    pub base: String,
    /// Array rank; 0 means scalar.
    #[serde(default)]
    pub array_rank: usize,
    /// Element type when `array_rank > 0`.
    #[serde(default)]
    pub element: Option<Box<TypeReference>>,
    /// Generic type arguments, e.g. the element of a `List`.
    #[serde(default)]
    pub type_args: Vec<TypeReference>,
}

impl TypeReference {
    /// A scalar reference to a named type.
    pub fn scalar(base: impl Into<String>) -> Self {
        Self {
            base: base.into(),
            array_rank: 0,
            element: None,
            type_args: Vec::new(),
        }
    }

    /// A rank-1 array of the given element type.
    pub fn array_of(element: TypeReference) -> Self {
        Self {
            base: element.base.clone(),
            array_rank: 1,
            element: Some(Box::new(element)),
            type_args: Vec::new(),
        }
    }

    /// A generic instantiation, e.g. `List<T>`.
    pub fn generic(base: impl Into<String>, type_args: Vec<TypeReference>) -> Self {
        Self {
            base: base.into(),
            array_rank: 0,
            element: None,
            type_args,
        }
    }

    /// A growable ordered sequence of the given element type.
    pub fn list_of(element: TypeReference) -> Self {
        Self::generic(well_known::LIST, vec![element])
    }

    /// A nullable wrapper around the named scalar type.
    pub fn nullable_of(base: impl Into<String>) -> Self {
        Self::generic(well_known::NULLABLE, vec![TypeReference::scalar(base)])
    }

    pub fn is_array(&self) -> bool {
        self.array_rank > 0
    }

    /// The name of the ultimately referenced type, unwrapping one level of
    /// array or sequence wrapping.
    pub fn element_type(&self) -> &str {
        if self.array_rank > 0 {
            return self.element.as_deref().map_or(&self.base, |e| &e.base);
        }
        if self.base == well_known::LIST {
            if let Some(first) = self.type_args.first() {
                return &first.base;
            }
        }
        &self.base
    }
}

// ---------------------------------------------------------------------------
// Annotations
// ---------------------------------------------------------------------------

/// Recognized serialization-annotation kinds, plus pass-through custom markers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationKind {
    /// Marks a type as a top-level serialization root.
    Root,
    /// Names and qualifies a type on the wire.
    Type,
    /// Serializes a member as a child element.
    Element,
    /// Serializes a member as an attribute.
    Attribute,
    /// Serializes a collection member as an element with nested items.
    Array,
    /// Describes the element form of a collection's items.
    ArrayItem,
    /// Excludes a member from serialization.
    Ignore,
    /// Serializes a member as raw text content.
    Text,
    /// Catch-all for unanticipated child elements.
    AnyElement,
    /// Catch-all for unanticipated attributes.
    AnyAttribute,
    /// Names an enumeration value on the wire.
    EnumValue,
    /// Identifies the discriminator companion of a choice group.
    ChoiceIdentifier,
    /// Hides a member from tooling without removing it.
    NonBrowsable,
    /// A marker annotation outside the recognized serialization set.
    Custom(String),
}

impl AnnotationKind {
    /// Canonical name used when matching configured removal lists.
    pub fn name(&self) -> &str {
        match self {
            AnnotationKind::Root => "root",
            AnnotationKind::Type => "type",
            AnnotationKind::Element => "element",
            AnnotationKind::Attribute => "attribute",
            AnnotationKind::Array => "array",
            AnnotationKind::ArrayItem => "array-item",
            AnnotationKind::Ignore => "ignore",
            AnnotationKind::Text => "text",
            AnnotationKind::AnyElement => "any-element",
            AnnotationKind::AnyAttribute => "any-attribute",
            AnnotationKind::EnumValue => "enum-value",
            AnnotationKind::ChoiceIdentifier => "choice-identifier",
            AnnotationKind::NonBrowsable => "non-browsable",
            AnnotationKind::Custom(name) => name,
        }
    }
}

/// A literal or type-valued annotation argument value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotationValue {
    Str(String),
    Bool(bool),
    Int(i64),
    /// A reference to a type, e.g. a choice companion or text content type.
    TypeOf(TypeReference),
}

/// A named or positional annotation argument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationArgument {
    /// `None` for positional arguments.
    pub name: Option<String>,
    pub value: AnnotationValue,
}

impl AnnotationArgument {
    pub fn positional(value: AnnotationValue) -> Self {
        Self { name: None, value }
    }

    pub fn named(name: impl Into<String>, value: AnnotationValue) -> Self {
        Self {
            name: Some(name.into()),
            value,
        }
    }

    pub fn is_positional(&self) -> bool {
        self.name.is_none()
    }
}

/// A serialization annotation attached to a type or member.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub kind: AnnotationKind,
    #[serde(default)]
    pub args: Vec<AnnotationArgument>,
}

impl Annotation {
    pub fn new(kind: AnnotationKind) -> Self {
        Self {
            kind,
            args: Vec::new(),
        }
    }

    pub fn with_args(kind: AnnotationKind, args: Vec<AnnotationArgument>) -> Self {
        Self { kind, args }
    }

    /// Value of the named argument, if present.
    pub fn named_arg(&self, name: &str) -> Option<&AnnotationValue> {
        self.args
            .iter()
            .find(|a| a.name.as_deref() == Some(name))
            .map(|a| &a.value)
    }

    /// Whether the first argument is a positional name argument.
    pub fn has_positional_name(&self) -> bool {
        matches!(
            self.args.first(),
            Some(AnnotationArgument {
                name: None,
                value: AnnotationValue::Str(_),
            })
        )
    }

    /// First positional string argument — the recorded wire name.
    pub fn positional_name(&self) -> Option<&str> {
        match self.args.first() {
            Some(AnnotationArgument {
                name: None,
                value: AnnotationValue::Str(s),
            }) => Some(s),
            _ => None,
        }
    }

    /// Insert a positional name argument in first position.
    pub fn insert_positional_name(&mut self, name: &str) {
        self.args.insert(
            0,
            AnnotationArgument::positional(AnnotationValue::Str(name.to_string())),
        );
    }
}

// ---------------------------------------------------------------------------
// Members
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field,
    Property,
    Event,
    Method,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    #[default]
    Public,
    Protected,
}

/// An abstract accessor statement. Accessor bodies are modeled only as far
/// as the pipeline needs to reason about them: which backing state a
/// property reads and writes, and which side effects its write path carries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Statement {
    /// Return the value of a backing field.
    ReturnField { field: String },
    /// Return the backing value when the presence flag is set, absent
    /// otherwise.
    GuardedReturn {
        flag_field: String,
        value_field: String,
    },
    /// Store the written value into a backing field.
    StoreValue { field: String },
    /// On a present value, set the presence flag and store the underlying
    /// value; on an absent value, clear the flag.
    StoreOptional {
        value_field: String,
        flag_field: String,
    },
    /// Raise the change-notification event for the named property.
    RaiseChanged { property: String },
}

/// Get/set statement bodies of a property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyAccessors {
    #[serde(default)]
    pub get: Vec<Statement>,
    #[serde(default)]
    pub set: Vec<Statement>,
}

/// A member of a type declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub name: String,
    pub kind: MemberKind,
    pub ty: TypeReference,
    #[serde(default)]
    pub visibility: Visibility,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    /// Present for properties only.
    #[serde(default)]
    pub accessors: Option<PropertyAccessors>,
}

impl Member {
    pub fn field(name: impl Into<String>, ty: TypeReference) -> Self {
        Self {
            name: name.into(),
            kind: MemberKind::Field,
            ty,
            visibility: Visibility::Public,
            annotations: Vec::new(),
            accessors: None,
        }
    }

    /// A property whose get returns the named backing field and whose set
    /// stores into it — the shape the importer produces.
    pub fn property(
        name: impl Into<String>,
        ty: TypeReference,
        backing_field: impl Into<String>,
    ) -> Self {
        let field = backing_field.into();
        Self {
            name: name.into(),
            kind: MemberKind::Property,
            ty,
            visibility: Visibility::Public,
            annotations: Vec::new(),
            accessors: Some(PropertyAccessors {
                get: vec![Statement::ReturnField {
                    field: field.clone(),
                }],
                set: vec![Statement::StoreValue { field }],
            }),
        }
    }

    pub fn is_field(&self) -> bool {
        self.kind == MemberKind::Field
    }

    pub fn is_property(&self) -> bool {
        self.kind == MemberKind::Property
    }

    pub fn has_annotation(&self, kind: &AnnotationKind) -> bool {
        self.annotations.iter().any(|a| &a.kind == kind)
    }

    pub fn annotation(&self, kind: &AnnotationKind) -> Option<&Annotation> {
        self.annotations.iter().find(|a| &a.kind == kind)
    }

    pub fn push_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// The backing field this property reads, when its get body is a plain
    /// backing-state read.
    pub fn backing_field(&self) -> Option<&str> {
        let accessors = self.accessors.as_ref()?;
        accessors.get.iter().find_map(|s| match s {
            Statement::ReturnField { field } => Some(field.as_str()),
            _ => None,
        })
    }

    /// Resolved wire data type from the `DataType` argument of an element,
    /// attribute, or array-item annotation.
    pub fn xml_data_type(&self) -> Option<&str> {
        self.annotations
            .iter()
            .filter(|a| {
                matches!(
                    a.kind,
                    AnnotationKind::Element | AnnotationKind::Attribute | AnnotationKind::ArrayItem
                )
            })
            .find_map(|a| match a.named_arg("DataType") {
                Some(AnnotationValue::Str(s)) => Some(s.as_str()),
                _ => None,
            })
    }

    /// Type references embedded in this member's annotation arguments.
    pub fn annotation_type_refs(&self) -> impl Iterator<Item = &TypeReference> {
        self.annotations.iter().flat_map(|a| {
            a.args.iter().filter_map(|arg| match &arg.value {
                AnnotationValue::TypeOf(t) => Some(t),
                _ => None,
            })
        })
    }
}

// ---------------------------------------------------------------------------
// Type declarations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Enum,
}

/// A class or enum declaration in the output namespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDeclaration {
    pub name: String,
    pub kind: TypeKind,
    #[serde(default)]
    pub base_types: Vec<TypeReference>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    /// Identifier of the schema document this declaration was imported
    /// from, stamped by the importer at construction time.
    #[serde(default)]
    pub origin: Option<String>,
}

impl TypeDeclaration {
    pub fn class(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: TypeKind::Class,
            base_types: Vec::new(),
            members: Vec::new(),
            annotations: Vec::new(),
            origin: None,
        }
    }

    pub fn enumeration(name: impl Into<String>) -> Self {
        Self {
            kind: TypeKind::Enum,
            ..Self::class(name)
        }
    }

    pub fn is_class(&self) -> bool {
        self.kind == TypeKind::Class
    }

    pub fn is_enum(&self) -> bool {
        self.kind == TypeKind::Enum
    }

    pub fn has_annotation(&self, kind: &AnnotationKind) -> bool {
        self.annotations.iter().any(|a| &a.kind == kind)
    }

    pub fn annotation(&self, kind: &AnnotationKind) -> Option<&Annotation> {
        self.annotations.iter().find(|a| &a.kind == kind)
    }

    pub fn push_annotation(&mut self, annotation: Annotation) {
        self.annotations.push(annotation);
    }

    /// Whether the importer synthesized this type in place for a nameless
    /// schema construct.
    pub fn is_anonymous(&self) -> bool {
        matches!(
            self.annotation(&AnnotationKind::Type)
                .and_then(|a| a.named_arg("AnonymousType")),
            Some(AnnotationValue::Bool(true))
        )
    }

    /// Whether this type carries a root-serialization annotation.
    pub fn is_root(&self) -> bool {
        self.has_annotation(&AnnotationKind::Root)
    }

    /// Whether this type participates in a schema's serializable surface.
    pub fn include_in_schema(&self) -> bool {
        !matches!(
            self.annotation(&AnnotationKind::Type)
                .and_then(|a| a.named_arg("IncludeInSchema")),
            Some(AnnotationValue::Bool(false))
        )
    }

    /// The schema-facing name of this type: the recorded original name when
    /// a rename preserved one, the declaration name otherwise.
    pub fn xml_name(&self) -> &str {
        self.annotation(&AnnotationKind::Type)
            .and_then(Annotation::positional_name)
            .or_else(|| {
                self.annotation(&AnnotationKind::Root)
                    .and_then(Annotation::positional_name)
            })
            .unwrap_or(&self.name)
    }

    /// Target namespace recorded on the type annotation, if any.
    pub fn xml_namespace(&self) -> Option<&str> {
        match self
            .annotation(&AnnotationKind::Type)
            .and_then(|a| a.named_arg("Namespace"))
        {
            Some(AnnotationValue::Str(s)) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members.iter().find(|m| m.name == name)
    }

    pub fn member_mut(&mut self, name: &str) -> Option<&mut Member> {
        self.members.iter_mut().find(|m| m.name == name)
    }
}

// ---------------------------------------------------------------------------
// The model
// ---------------------------------------------------------------------------

/// The complete imported model: every declaration of one output namespace.
/// Declaration order is preserved through to emission; names are unique.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodeModel {
    pub types: Vec<TypeDeclaration>,
}

impl CodeModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, decl: TypeDeclaration) {
        self.types.push(decl);
    }

    pub fn get(&self, name: &str) -> Option<&TypeDeclaration> {
        self.types.iter().find(|t| t.name == name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TypeDeclaration> {
        self.types.iter_mut().find(|t| t.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}

// ---------------------------------------------------------------------------
// Schema documents (importer contract)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopLevelKind {
    Element,
    ComplexType,
    SimpleType,
}

/// A name declared at the top level of a schema document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopLevelItem {
    pub name: String,
    pub kind: TopLevelKind,
}

/// The slice of a compiled schema document the pruner needs: its identity,
/// target namespace, and top-level declaration list. Produced by the
/// external importer alongside the model itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub id: String,
    pub target_namespace: Option<String>,
    #[serde(default)]
    pub top_level: Vec<TopLevelItem>,
}

impl SchemaDocument {
    pub fn new(id: impl Into<String>, target_namespace: Option<&str>) -> Self {
        Self {
            id: id.into(),
            target_namespace: target_namespace.map(str::to_string),
            top_level: Vec::new(),
        }
    }

    pub fn declare(&mut self, name: impl Into<String>, kind: TopLevelKind) {
        self.top_level.push(TopLevelItem {
            name: name.into(),
            kind,
        });
    }

    /// Whether the document declares the given name at its top level.
    pub fn declares(&self, name: &str) -> bool {
        self.top_level.iter().any(|item| item.name == name)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
