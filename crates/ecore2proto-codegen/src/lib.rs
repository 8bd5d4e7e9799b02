//! proto3 generation for resolved Ecore packages.
//!
//! One unit per package (sub-packages included), plus a shared options unit
//! when any annotation detail was registered:
//!
//! ```text
//! resolved packages ──► <pkg>.proto ...
//! finalized registry ──► <options_package>_options.proto
//! ```
//!
//! Output is keyed by file name; callers decide where the files land.

pub mod fields;
pub mod types;

use ecore2proto_model::builtins::well_known_import;
use ecore2proto_model::naming::{
    enum_value_name, shorten_source, to_field_name, to_message_name, to_proto_package,
};
use ecore2proto_model::{Class, Enum, Package};
use ecore2proto_resolve::{AnnotationRegistry, Finalized, TypeIndex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};

pub use fields::{field_options, format_field_line, format_option_value};
pub use types::{attribute_type, reference_type, FieldType};

// ============================================================================
// Options
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Package of the shared options unit; also the prefix of every
    /// `(pkg.field)` option reference.
    pub options_package: String,
    /// `option java_package = "<prefix>.<package>";` when non-empty.
    pub java_package_prefix: String,
    /// `option go_package = "<prefix>/<package>";` when non-empty.
    pub go_package_prefix: String,
    /// Prepended to every proto package, the options package included.
    pub proto_package_prefix: String,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            options_package: "ui".to_string(),
            java_package_prefix: String::new(),
            go_package_prefix: String::new(),
            proto_package_prefix: String::new(),
        }
    }
}

impl GeneratorOptions {
    pub fn options_file_name(&self) -> String {
        format!("{}_options.proto", self.options_package)
    }

    pub fn options_proto_package(&self) -> String {
        if self.proto_package_prefix.is_empty() {
            self.options_package.clone()
        } else {
            format!("{}.{}", self.proto_package_prefix, self.options_package)
        }
    }

    pub fn proto_package(&self, package_name: &str) -> String {
        to_proto_package(package_name, &self.proto_package_prefix)
    }
}

/// `snake_case` file name for a package.
pub fn package_file_name(package_name: &str) -> String {
    format!("{}.proto", to_field_name(package_name))
}

// ============================================================================
// Entry point
// ============================================================================

/// Render every package (and the options unit, if needed).
pub fn render(
    packages: &[Package],
    registry: &AnnotationRegistry<Finalized>,
    options: &GeneratorOptions,
) -> BTreeMap<String, String> {
    let index = TypeIndex::build(packages);
    let ctx = RenderContext {
        index: &index,
        registry,
        options,
    };

    let mut units = BTreeMap::new();

    if !registry.is_empty() {
        units.insert(
            options.options_file_name(),
            registry.options_unit(&options.options_proto_package()),
        );
    }

    for pkg in packages {
        render_tree(&ctx, pkg, &mut units);
    }

    tracing::info!(
        units = units.len(),
        annotation_options = registry.len(),
        "rendered proto units"
    );
    units
}

struct RenderContext<'a> {
    index: &'a TypeIndex,
    registry: &'a AnnotationRegistry<Finalized>,
    options: &'a GeneratorOptions,
}

fn render_tree(ctx: &RenderContext<'_>, pkg: &Package, units: &mut BTreeMap<String, String>) {
    let file_name = package_file_name(&pkg.name);
    let content = render_package(ctx, pkg);
    if units.insert(file_name.clone(), content).is_some() {
        tracing::warn!(
            file = %file_name,
            package = %pkg.name,
            "two packages map to the same file; keeping the later one"
        );
    }

    for sub in &pkg.sub_packages {
        render_tree(ctx, sub, units);
    }
}

// ============================================================================
// Package unit
// ============================================================================

fn render_package(ctx: &RenderContext<'_>, pkg: &Package) -> String {
    let opts = ctx.options;
    let mut lines: Vec<String> = Vec::new();

    lines.push("syntax = \"proto3\";".to_string());
    lines.push(String::new());
    lines.push(format!("package {};", opts.proto_package(&pkg.name)));
    lines.push(String::new());

    if !opts.java_package_prefix.is_empty() {
        lines.push(format!(
            "option java_package = \"{}.{}\";",
            opts.java_package_prefix, pkg.name
        ));
    }
    if !opts.go_package_prefix.is_empty() {
        lines.push(format!(
            "option go_package = \"{}/{}\";",
            opts.go_package_prefix,
            pkg.name.to_lowercase()
        ));
    }
    if !opts.java_package_prefix.is_empty() || !opts.go_package_prefix.is_empty() {
        lines.push(String::new());
    }

    let imports = collect_imports(ctx, pkg);
    if !imports.is_empty() {
        for import in &imports {
            lines.push(format!("import \"{import}\";"));
        }
        lines.push(String::new());
    }

    for en in &pkg.enums {
        lines.extend(render_enum(en));
        lines.push(String::new());
    }

    for class in &pkg.classes {
        lines.extend(render_message(ctx, class, pkg));
        lines.push(String::new());
    }

    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.push(String::new());

    tracing::debug!(
        package = %pkg.name,
        messages = pkg.classes.len(),
        enums = pkg.enums.len(),
        imports = imports.len(),
        "rendered package"
    );

    lines.join("\n")
}

fn collect_imports(ctx: &RenderContext<'_>, pkg: &Package) -> BTreeSet<String> {
    let prefix = &ctx.options.proto_package_prefix;
    let has_options = !ctx.registry.is_empty();
    let mut imports = BTreeSet::new();

    for class in &pkg.classes {
        for attr in &class.attributes {
            let ty = attribute_type(attr, pkg, ctx.index, prefix);
            if let Some(import) = well_known_import(&ty.proto) {
                imports.insert(import.to_string());
            }
            if let Some(owner) = &ty.foreign_package {
                imports.insert(package_file_name(owner));
            }
            if has_options && !attr.annotations.is_empty() {
                imports.insert(ctx.options.options_file_name());
            }
        }

        for reference in &class.references {
            if let Some(owner) = reference.resolved_package.as_deref().filter(|p| *p != pkg.name) {
                imports.insert(package_file_name(owner));
            }
            if has_options && !reference.annotations.is_empty() {
                imports.insert(ctx.options.options_file_name());
            }
        }

        for (owner, _) in &class.resolved_supers {
            if *owner != pkg.name {
                imports.insert(package_file_name(owner));
            }
        }
    }

    imports
}

// ============================================================================
// Enums and messages
// ============================================================================

/// An enum block. proto3 needs a zero value, so one is synthesized when the
/// model has none; duplicate values turn on `allow_alias`.
pub fn render_enum(en: &Enum) -> Vec<String> {
    let mut lines = vec![format!("enum {} {{", to_message_name(&en.name))];

    let mut seen = HashSet::new();
    if en.literals.iter().any(|lit| !seen.insert(lit.value)) {
        lines.push("  option allow_alias = true;".to_string());
    }

    if !en.literals.iter().any(|lit| lit.value == 0) {
        lines.push(format!("  {} = 0;", enum_value_name(&en.name, "UNSPECIFIED")));
    }
    for lit in &en.literals {
        lines.push(format!("  {} = {};", enum_value_name(&en.name, &lit.name), lit.value));
    }

    lines.push("}".to_string());
    lines
}

fn render_message(ctx: &RenderContext<'_>, class: &Class, pkg: &Package) -> Vec<String> {
    let prefix = &ctx.options.proto_package_prefix;
    let options_package = &ctx.options.options_package;
    let mut lines = Vec::new();

    if class.is_abstract {
        lines.push(format!("// Abstract base: {}", class.name));
    }
    if class.is_interface {
        lines.push(format!("// Interface: {}", class.name));
    }
    for annotation in &class.annotations {
        let source = shorten_source(&annotation.source);
        for (key, value) in &annotation.details {
            let mut value_lines = value.lines();
            let first = value_lines.next().unwrap_or_default();
            lines.push(format!("// @{source}.{key}: {first}"));
            lines.extend(value_lines.map(|line| format!("//   {line}")));
        }
    }

    lines.push(format!("message {} {{", to_message_name(&class.name)));

    let mut number: u32 = 1;

    for (owner, super_name) in &class.resolved_supers {
        let mut type_name = to_message_name(super_name);
        if *owner != pkg.name {
            type_name = format!("{}.{}", ctx.options.proto_package(owner), type_name);
        }
        lines.push(format!("  // Inherited from {super_name}"));
        lines.push(format!("  {type_name} {} = {number};", to_field_name(super_name)));
        number += 1;
    }

    for attr in &class.attributes {
        let ty = attribute_type(attr, pkg, ctx.index, prefix);
        let comment = attr
            .default_value
            .as_ref()
            .map(|v| format!("  // default: {}", single_line(v)))
            .unwrap_or_default();
        let options = field_options(&attr.annotations, ctx.registry, options_package);
        lines.extend(format_field_line(
            &with_label(&ty.proto, attr.is_many()),
            &to_field_name(&attr.name),
            number,
            &options,
            &comment,
        ));
        number += 1;
    }

    for reference in &class.references {
        let ty = reference_type(reference, pkg, prefix);
        let mut notes = Vec::new();
        if reference.containment {
            notes.push("containment".to_string());
        }
        if let Some(opposite) = &reference.opposite {
            notes.push(format!("opposite: {opposite}"));
        }
        let comment = if notes.is_empty() {
            String::new()
        } else {
            format!("  // {}", notes.join(", "))
        };
        let options = field_options(&reference.annotations, ctx.registry, options_package);
        lines.extend(format_field_line(
            &with_label(&ty.proto, reference.is_many()),
            &to_field_name(&reference.name),
            number,
            &options,
            &comment,
        ));
        number += 1;
    }

    lines.push("}".to_string());
    lines
}

/// Line breaks folded into spaces, for trailing comments.
fn single_line(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join(" ")
}

fn with_label(proto_type: &str, many: bool) -> String {
    if many {
        format!("repeated {proto_type}")
    } else {
        proto_type.to_string()
    }
}
