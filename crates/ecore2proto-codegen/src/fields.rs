//! Field declaration lines and their `[...]` option lists.

use ecore2proto_model::Annotation;
use ecore2proto_resolve::{AnnotationRegistry, Finalized, OptionType};

/// Render an annotation value as a proto option literal.
pub fn format_option_value(value: &str, ty: OptionType) -> String {
    match ty {
        OptionType::Bool => value.to_lowercase(),
        OptionType::Int32 | OptionType::Double => value.to_string(),
        OptionType::String => {
            let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
            format!("\"{escaped}\"")
        }
    }
}

/// `(pkg.field) = value` entries for every registered detail, in declaration order.
pub fn field_options(
    annotations: &[Annotation],
    registry: &AnnotationRegistry<Finalized>,
    options_package: &str,
) -> Vec<String> {
    let mut parts = Vec::new();
    for annotation in annotations {
        for (key, value) in &annotation.details {
            if let Some(def) = registry.option_for(annotation, key) {
                parts.push(format!(
                    "({options_package}.{}) = {}",
                    def.field_name,
                    format_option_value(value, def.proto_type)
                ));
            }
        }
    }
    parts
}

/// One field declaration, indented for a message body.
///
/// ```text
/// string name = 1;
/// string name = 1 [(ui.label) = "Name"];
/// string email = 4 [
///   (ui.label) = "Email",
///   (ui.required) = true
/// ];
/// ```
///
/// `comment` is appended verbatim after the closing `;`.
pub fn format_field_line(
    type_str: &str,
    field_name: &str,
    number: u32,
    options: &[String],
    comment: &str,
) -> Vec<String> {
    match options {
        [] => vec![format!("  {type_str} {field_name} = {number};{comment}")],
        [only] => vec![format!("  {type_str} {field_name} = {number} [{only}];{comment}")],
        many => {
            let mut lines = Vec::with_capacity(many.len() + 2);
            lines.push(format!("  {type_str} {field_name} = {number} ["));
            let last = many.len() - 1;
            for (i, opt) in many.iter().enumerate() {
                let comma = if i < last { "," } else { "" };
                lines.push(format!("    {opt}{comma}"));
            }
            lines.push(format!("  ];{comment}"));
            lines
        }
    }
}
