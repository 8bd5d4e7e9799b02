//! Cross-package type resolution.
//!
//! Every classifier name maps to the ordered list of packages that define it
//! (first-seen order over the depth-first package walk). A lookup with more
//! than one candidate is disambiguated in this order:
//!
//! 1. the `source_hint` mapped through the file-stem index,
//! 2. the `source_hint` taken as a package name,
//! 3. the package the lookup starts from,
//! 4. the first-seen candidate.
//!
//! Step 4 depends on input order. Callers that want reproducible output feed
//! units in a stable order.

use ecore2proto_model::{flatten_packages, parse_type_ref, Class, Package};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Class,
    Enum,
}

#[derive(Debug, Clone, Default)]
pub struct TypeIndex {
    class_index: HashMap<String, Vec<String>>,
    enum_index: HashMap<String, Vec<String>>,
    /// Data type name → native instance type (`java.lang.String`, `int`, …).
    datatype_index: HashMap<String, String>,
    file_stem_to_package: HashMap<String, String>,
}

impl TypeIndex {
    pub fn build(packages: &[Package]) -> Self {
        let mut index = Self::default();

        for pkg in flatten_packages(packages) {
            // Later registrations win: a file's stem ends up naming the
            // last package of that file in walk order.
            if let Some(stem) = Path::new(&pkg.source_file)
                .file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| !s.is_empty())
            {
                index
                    .file_stem_to_package
                    .insert(stem.to_string(), pkg.name.clone());
            }
            index
                .file_stem_to_package
                .insert(pkg.name.clone(), pkg.name.clone());

            for class in &pkg.classes {
                register(&mut index.class_index, &class.name, &pkg.name);
            }
            for en in &pkg.enums {
                register(&mut index.enum_index, &en.name, &pkg.name);
            }
            for dt in &pkg.data_types {
                if let Some(native) = dt.instance_class_name.as_deref().filter(|n| !n.is_empty()) {
                    index.datatype_index.insert(dt.name.clone(), native.to_string());
                }
            }
        }

        index
    }

    pub fn candidates(&self, name: &str, kind: TypeKind) -> &[String] {
        let map = match kind {
            TypeKind::Class => &self.class_index,
            TypeKind::Enum => &self.enum_index,
        };
        map.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Package that defines `name`, or `None` when no package does.
    pub fn resolve_type(
        &self,
        name: &str,
        hint: Option<&str>,
        current_pkg: &str,
        kind: TypeKind,
    ) -> Option<String> {
        let candidates = self.candidates(name, kind);
        match candidates {
            [] => None,
            [only] => Some(only.clone()),
            _ => Some(disambiguate(self, candidates, hint, current_pkg).to_string()),
        }
    }

    /// Native type behind a data type name, if the data type declared one.
    pub fn datatype_native(&self, name: &str) -> Option<&str> {
        self.datatype_index.get(name).map(String::as_str)
    }

    pub fn package_for_stem(&self, stem: &str) -> Option<&str> {
        self.file_stem_to_package.get(stem).map(String::as_str)
    }
}

fn register(index: &mut HashMap<String, Vec<String>>, name: &str, pkg: &str) {
    let owners = index.entry(name.to_string()).or_default();
    if !owners.iter().any(|p| p == pkg) {
        owners.push(pkg.to_string());
    }
}

fn disambiguate<'a>(
    index: &TypeIndex,
    candidates: &'a [String],
    hint: Option<&str>,
    current_pkg: &str,
) -> &'a str {
    let pick = |wanted: &str| candidates.iter().find(|c| c.as_str() == wanted);

    if let Some(hint) = hint {
        if let Some(found) = index.package_for_stem(hint).and_then(|pkg| pick(pkg)) {
            return found;
        }
        if let Some(found) = pick(hint) {
            return found;
        }
    }
    if let Some(found) = pick(current_pkg) {
        return found;
    }

    tracing::debug!(
        candidates = ?candidates,
        current_pkg,
        hint = hint.unwrap_or(""),
        "ambiguous type name; using first-seen package"
    );
    &candidates[0]
}

// ============================================================================
// Resolution pass
// ============================================================================

/// Fill `resolved_supers` and `resolved_package` across the whole forest.
///
/// Idempotent: `resolved_supers` is recomputed from `super_types` rather than
/// appended to.
pub fn resolve(packages: &mut [Package]) {
    let index = TypeIndex::build(packages);
    resolve_with(&index, packages);
}

/// Like [`resolve`], against a prebuilt index.
pub fn resolve_with(index: &TypeIndex, packages: &mut [Package]) {
    for pkg in packages.iter_mut() {
        resolve_package(index, pkg);
    }
}

fn resolve_package(index: &TypeIndex, pkg: &mut Package) {
    let mut fallbacks = 0usize;

    for class in &mut pkg.classes {
        fallbacks += resolve_class(index, &pkg.name, class);
    }

    tracing::debug!(
        package = %pkg.name,
        classes = pkg.classes.len(),
        fallbacks,
        "resolved package"
    );

    for sub in &mut pkg.sub_packages {
        resolve_package(index, sub);
    }
}

/// Returns how many lookups fell back to the current package.
fn resolve_class(index: &TypeIndex, pkg_name: &str, class: &mut Class) -> usize {
    let mut fallbacks = 0;

    class.resolved_supers = class
        .super_types
        .iter()
        .map(|raw| {
            let token = parse_type_ref(raw);
            let owner = index
                .resolve_type(&token.name, token.source_hint.as_deref(), pkg_name, TypeKind::Class)
                .unwrap_or_else(|| {
                    fallbacks += 1;
                    tracing::debug!(
                        class = %class.name,
                        super_type = %token.name,
                        "unresolved super type; assuming current package"
                    );
                    pkg_name.to_string()
                });
            (owner, token.name)
        })
        .collect();

    for reference in &mut class.references {
        let hint = reference.source_hint.as_deref();
        let owner = index
            .resolve_type(&reference.e_type, hint, pkg_name, TypeKind::Class)
            .or_else(|| index.resolve_type(&reference.e_type, hint, pkg_name, TypeKind::Enum))
            .unwrap_or_else(|| {
                fallbacks += 1;
                tracing::debug!(
                    class = %class.name,
                    reference = %reference.name,
                    target = %reference.e_type,
                    "unresolved reference target; assuming current package"
                );
                pkg_name.to_string()
            });
        reference.resolved_package = Some(owner);
    }

    fallbacks
}
