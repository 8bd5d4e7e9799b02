//! Ecore metamodel IR (packages, classes, enums, data types, annotations).
//!
//! The IR is an **owned tree**: a [`Package`] owns its classifiers and its
//! sub-packages. Nothing inside the tree points back to its parent; classes
//! and enums only remember the *name* of their owning package.
//!
//! Passes that need a global view (resolution, annotation collection) work on
//! a non-owning flattened view built with [`flatten_packages`].
//!
//! Lifecycle of one conversion run:
//!
//! ```text
//! .ecore text ──parse──► Vec<Package> ──resolve──► Vec<Package> (resolved)
//!                                                   │
//!                                 collect annotations + render proto3
//! ```
//!
//! Resolution only ever writes two fields: [`Class::resolved_supers`] and
//! [`Reference::resolved_package`].

pub mod builtins;
pub mod naming;
pub mod type_ref;

use serde::{Deserialize, Serialize};

pub use type_ref::{parse_type_ref, TypeRef};

pub type Name = String;

// ============================================================================
// Annotations
// ============================================================================

/// An `eAnnotations` block: a source string plus ordered key/value details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Annotation {
    pub source: String,
    pub details: Vec<(String, String)>,
}

impl Annotation {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            details: Vec::new(),
        }
    }

    /// Insert a detail; a repeated key keeps its first position and takes the
    /// latest value.
    pub fn insert_detail(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.details.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.details.push((key, value)),
        }
    }

    pub fn detail(&self, key: &str) -> Option<&str> {
        self.details
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.details.is_empty()
    }
}

// ============================================================================
// Classifiers
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumLiteral {
    pub name: Name,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enum {
    pub name: Name,
    pub package_name: Name,
    pub literals: Vec<EnumLiteral>,
    pub annotations: Vec<Annotation>,
}

/// A type alias (`EDataType`), optionally backed by a native (Java) type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataType {
    pub name: Name,
    pub instance_class_name: Option<String>,
}

/// Upper bound value meaning "unbounded" (`-1` in Ecore).
pub const UNBOUNDED: i32 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: Name,
    /// Type name extracted from the `eType` token (e.g. `EString`).
    pub e_type: Name,
    pub lower_bound: i32,
    pub upper_bound: i32,
    pub default_value: Option<String>,
    pub source_hint: Option<String>,
    pub annotations: Vec<Annotation>,
}

impl Attribute {
    pub fn is_many(&self) -> bool {
        self.upper_bound == UNBOUNDED
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub name: Name,
    /// Target class name extracted from the `eType` token.
    pub e_type: Name,
    pub containment: bool,
    pub lower_bound: i32,
    pub upper_bound: i32,
    pub opposite: Option<String>,
    /// Package defining the target; `None` until resolution.
    pub resolved_package: Option<Name>,
    pub source_hint: Option<String>,
    pub annotations: Vec<Annotation>,
}

impl Reference {
    pub fn is_many(&self) -> bool {
        self.upper_bound == UNBOUNDED
    }
}

/// A resolved super type: `(owning package name, class name)`.
pub type ResolvedSuper = (Name, Name);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    pub name: Name,
    pub is_abstract: bool,
    pub is_interface: bool,
    pub package_name: Name,
    /// Raw `eSuperTypes` tokens, as written in the source.
    pub super_types: Vec<String>,
    /// One entry per raw token, same order. Filled by resolution.
    pub resolved_supers: Vec<ResolvedSuper>,
    pub attributes: Vec<Attribute>,
    pub references: Vec<Reference>,
    pub annotations: Vec<Annotation>,
}

// ============================================================================
// Packages
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub name: Name,
    pub ns_uri: String,
    pub ns_prefix: String,
    /// Identity of the source unit this package was parsed from (usually a path).
    pub source_file: String,
    pub classes: Vec<Class>,
    pub enums: Vec<Enum>,
    pub data_types: Vec<DataType>,
    pub sub_packages: Vec<Package>,
    pub annotations: Vec<Annotation>,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn find_class(&self, name: &str) -> Option<&Class> {
        self.classes.iter().find(|c| c.name == name)
    }

    pub fn find_enum(&self, name: &str) -> Option<&Enum> {
        self.enums.iter().find(|e| e.name == name)
    }

    pub fn find_data_type(&self, name: &str) -> Option<&DataType> {
        self.data_types.iter().find(|d| d.name == name)
    }
}

/// Depth-first, parent-before-children view over a package forest.
pub fn flatten_packages(packages: &[Package]) -> Vec<&Package> {
    fn push<'a>(out: &mut Vec<&'a Package>, pkg: &'a Package) {
        out.push(pkg);
        for sub in &pkg.sub_packages {
            push(out, sub);
        }
    }

    let mut out = Vec::new();
    for pkg in packages {
        push(&mut out, pkg);
    }
    out
}
