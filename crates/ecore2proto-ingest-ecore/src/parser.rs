//! XML element tree → Ecore IR.

use crate::classify::{classify_classifier, classify_feature, instance_type_name, ClassifierKind, FeatureKind};
use crate::error::ParseError;
use crate::xml::XmlElement;
use ecore2proto_model::{
    parse_type_ref, Annotation, Attribute, Class, DataType, Enum, EnumLiteral, Package, Reference,
};

const CLASSIFIER_TAGS: &[&str] = &["eClassifiers", "EClassifiers"];
const SUBPACKAGE_TAGS: &[&str] = &["eSubpackages", "ESubpackages"];
const WRAPPER_TAGS: &[&str] = &["XMI", "Resource"];

/// Packages declared by one document root.
pub(crate) fn packages_from_root(root: &XmlElement, identity: &str) -> Result<Vec<Package>, ParseError> {
    if root.name == "EPackage" {
        return Ok(vec![parse_package(root, identity)?]);
    }

    if WRAPPER_TAGS.contains(&root.name.as_str()) {
        return root
            .children_named(&["EPackage"])
            .map(|child| parse_package(child, identity))
            .collect();
    }

    // Unknown root: treat it as an implicit package if it is named.
    let pkg = parse_package(root, identity)?;
    Ok(if pkg.name.is_empty() { Vec::new() } else { vec![pkg] })
}

fn parse_package(element: &XmlElement, identity: &str) -> Result<Package, ParseError> {
    let mut pkg = Package {
        name: element.attr("name").unwrap_or_default().to_string(),
        ns_uri: element.attr("nsURI").unwrap_or_default().to_string(),
        ns_prefix: element.attr("nsPrefix").unwrap_or_default().to_string(),
        source_file: identity.to_string(),
        annotations: parse_annotations(element),
        ..Default::default()
    };

    for child in &element.children {
        if CLASSIFIER_TAGS.contains(&child.name.as_str()) {
            match classify_classifier(child) {
                ClassifierKind::Class => pkg.classes.push(parse_class(child, &pkg.name)?),
                ClassifierKind::Enum => pkg.enums.push(parse_enum(child, &pkg.name)?),
                ClassifierKind::DataType => pkg.data_types.push(parse_data_type(child)),
            }
        } else if SUBPACKAGE_TAGS.contains(&child.name.as_str()) {
            pkg.sub_packages.push(parse_package(child, identity)?);
        }
    }

    Ok(pkg)
}

fn parse_class(element: &XmlElement, package_name: &str) -> Result<Class, ParseError> {
    let mut class = Class {
        name: element.attr("name").unwrap_or("UnknownClass").to_string(),
        is_abstract: bool_attr(element, "abstract"),
        is_interface: bool_attr(element, "interface"),
        package_name: package_name.to_string(),
        super_types: element
            .attr("eSuperTypes")
            .map(|s| s.split_whitespace().map(str::to_string).collect())
            .unwrap_or_default(),
        resolved_supers: Vec::new(),
        attributes: Vec::new(),
        references: Vec::new(),
        annotations: parse_annotations(element),
    };

    for feature in element.children_named(&["eStructuralFeatures"]) {
        match classify_feature(feature) {
            FeatureKind::Attribute => class.attributes.push(parse_attribute(feature)?),
            FeatureKind::Reference => class.references.push(parse_reference(feature)?),
        }
    }

    Ok(class)
}

fn parse_attribute(element: &XmlElement) -> Result<Attribute, ParseError> {
    let type_ref = parse_type_ref(element.attr("eType").unwrap_or_default());
    Ok(Attribute {
        name: element.attr("name").unwrap_or("unknown").to_string(),
        e_type: type_ref.name,
        lower_bound: int_attr(element, "lowerBound", 0)?,
        upper_bound: int_attr(element, "upperBound", 1)?,
        default_value: element.attr("defaultValueLiteral").map(str::to_string),
        source_hint: type_ref.source_hint,
        annotations: parse_annotations(element),
    })
}

fn parse_reference(element: &XmlElement) -> Result<Reference, ParseError> {
    let type_ref = parse_type_ref(element.attr("eType").unwrap_or_default());
    Ok(Reference {
        name: element.attr("name").unwrap_or("unknown").to_string(),
        e_type: type_ref.name,
        containment: bool_attr(element, "containment"),
        lower_bound: int_attr(element, "lowerBound", 0)?,
        upper_bound: int_attr(element, "upperBound", 1)?,
        opposite: element.attr("eOpposite").map(str::to_string),
        resolved_package: None,
        source_hint: type_ref.source_hint,
        annotations: parse_annotations(element),
    })
}

fn parse_enum(element: &XmlElement, package_name: &str) -> Result<Enum, ParseError> {
    let literals = element
        .children_named(&["eLiterals"])
        .map(|lit| {
            Ok(EnumLiteral {
                name: lit.attr("name").unwrap_or("UNKNOWN").to_string(),
                value: int_attr(lit, "value", 0)?,
            })
        })
        .collect::<Result<Vec<_>, ParseError>>()?;

    Ok(Enum {
        name: element.attr("name").unwrap_or("UnknownEnum").to_string(),
        package_name: package_name.to_string(),
        literals,
        annotations: parse_annotations(element),
    })
}

fn parse_data_type(element: &XmlElement) -> DataType {
    DataType {
        name: element.attr("name").unwrap_or_default().to_string(),
        instance_class_name: instance_type_name(element).map(str::to_string),
    }
}

/// `eAnnotations` blocks of an element. Detail-less blocks are dropped.
///
/// ```xml
/// <eAnnotations source="http://example.com/ui">
///   <details key="label" value="Full Name"/>
///   <details key="readonly" value="true"/>
/// </eAnnotations>
/// ```
fn parse_annotations(element: &XmlElement) -> Vec<Annotation> {
    element
        .children_named(&["eAnnotations"])
        .filter_map(|block| {
            let mut annotation = Annotation::new(block.attr("source").unwrap_or_default());
            for detail in block.children_named(&["details"]) {
                let key = detail.attr("key").unwrap_or_default();
                if key.is_empty() {
                    continue;
                }
                annotation.insert_detail(key, detail.attr("value").unwrap_or_default());
            }
            (!annotation.is_empty()).then_some(annotation)
        })
        .collect()
}

fn bool_attr(element: &XmlElement, name: &str) -> bool {
    element
        .attr(name)
        .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"))
}

fn int_attr(element: &XmlElement, name: &str, default: i32) -> Result<i32, ParseError> {
    match element.attr(name) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ParseError::InvalidInteger {
            element: element.name.clone(),
            attribute: name.to_string(),
            value: raw.to_string(),
        }),
    }
}
