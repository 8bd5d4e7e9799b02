//! Proto type names for attributes and references.

use ecore2proto_model::builtins::{builtin_proto_type, FALLBACK_SCALAR};
use ecore2proto_model::naming::{to_message_name, to_proto_package};
use ecore2proto_model::{Attribute, Package, Reference};
use ecore2proto_resolve::{TypeIndex, TypeKind};

/// A field type as written in the unit, plus the foreign package that owns
/// it (when the name is qualified).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldType {
    pub proto: String,
    pub foreign_package: Option<String>,
}

impl FieldType {
    fn local(proto: impl Into<String>) -> Self {
        Self {
            proto: proto.into(),
            foreign_package: None,
        }
    }

    fn foreign(package: &str, name: &str, prefix: &str) -> Self {
        Self {
            proto: format!("{}.{}", to_proto_package(package, prefix), to_message_name(name)),
            foreign_package: Some(package.to_string()),
        }
    }
}

/// Attribute type lookup order:
/// built-in scalar → local data type → local enum → any enum → any data type → `string`.
pub fn attribute_type(attr: &Attribute, pkg: &Package, index: &TypeIndex, proto_prefix: &str) -> FieldType {
    let name = attr.e_type.as_str();

    if let Some(scalar) = builtin_proto_type(name) {
        return FieldType::local(scalar);
    }

    if let Some(scalar) = pkg
        .find_data_type(name)
        .and_then(|dt| dt.instance_class_name.as_deref())
        .and_then(builtin_proto_type)
    {
        return FieldType::local(scalar);
    }

    if pkg.find_enum(name).is_some() {
        return FieldType::local(to_message_name(name));
    }

    if let Some(owner) = index.resolve_type(name, attr.source_hint.as_deref(), &pkg.name, TypeKind::Enum) {
        return if owner == pkg.name {
            FieldType::local(to_message_name(name))
        } else {
            FieldType::foreign(&owner, name, proto_prefix)
        };
    }

    if let Some(scalar) = index.datatype_native(name).and_then(builtin_proto_type) {
        return FieldType::local(scalar);
    }

    tracing::debug!(
        package = %pkg.name,
        attribute = %attr.name,
        e_type = %name,
        "unknown attribute type; falling back to string"
    );
    FieldType::local(FALLBACK_SCALAR)
}

/// Reference target type: a class of the current package renders
/// unqualified; otherwise the resolved package qualifies the name, and an
/// unresolved target stays unqualified.
pub fn reference_type(reference: &Reference, pkg: &Package, proto_prefix: &str) -> FieldType {
    let name = reference.e_type.as_str();

    if pkg.find_class(name).is_some() {
        return FieldType::local(to_message_name(name));
    }

    match reference.resolved_package.as_deref() {
        Some(owner) if owner != pkg.name => FieldType::foreign(owner, name, proto_prefix),
        _ => FieldType::local(to_message_name(name)),
    }
}
