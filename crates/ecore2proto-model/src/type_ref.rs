//! `eType` / `eSuperTypes` token parsing.
//!
//! Ecore encodes type references as URI fragments:
//!
//! | token                                              | name        | hint          |
//! |----------------------------------------------------|-------------|---------------|
//! | `#//MyClass`                                       | `MyClass`   | —             |
//! | `assetcommon.ecore#//Logging`                      | `Logging`   | `assetcommon` |
//! | `ecore:EDataType http://…/emf/2002/Ecore#//EString` | `EString`   | —             |
//! | `#//sub/ClassName`                                 | `ClassName` | —             |
//! | `platform:/resource/proj/base.ecore#//Named`       | `Named`     | `base`        |
//!
//! The hint is the filename stem of the prefix. Framework namespaces (EMF's
//! own Ecore URI, W3C XML schema URIs) denote built-in types and never yield a
//! hint.

use serde::{Deserialize, Serialize};

/// Fragment marker separating the resource prefix from the type path.
pub const FRAGMENT_MARKER: &str = "#//";

/// Type name used when an `eType` is missing entirely.
pub const DEFAULT_TYPE_NAME: &str = "EString";

const BUILTIN_NAMESPACE_MARKERS: &[&str] = &["eclipse.org/emf", "www.w3.org"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeRef {
    pub name: String,
    pub source_hint: Option<String>,
}

pub fn parse_type_ref(raw: &str) -> TypeRef {
    if raw.trim().is_empty() {
        return TypeRef {
            name: DEFAULT_TYPE_NAME.to_string(),
            source_hint: None,
        };
    }

    if let Some((left, right)) = raw.rsplit_once(FRAGMENT_MARKER) {
        let name = right.rsplit('/').next().unwrap_or(right).trim().to_string();
        return TypeRef {
            name,
            source_hint: source_hint(left),
        };
    }

    let name = raw.split_whitespace().last().unwrap_or(raw).to_string();
    TypeRef {
        name,
        source_hint: None,
    }
}

fn source_hint(prefix: &str) -> Option<String> {
    let prefix = prefix.trim();
    if prefix.is_empty()
        || BUILTIN_NAMESPACE_MARKERS
            .iter()
            .any(|marker| prefix.contains(marker))
    {
        return None;
    }

    // `ecore:EClass other.ecore` → `other.ecore`
    let location = prefix.split_whitespace().last().unwrap_or(prefix);
    let basename = location.rsplit('/').next().unwrap_or(location);
    let stem = match basename.rsplit_once('.') {
        Some((stem, _ext)) => stem,
        None => basename,
    };

    let stem = stem.trim();
    (!stem.is_empty()).then(|| stem.to_string())
}
