//! Element-kind classification for `eClassifiers` and `eStructuralFeatures`.
//!
//! Real-world `.ecore` files are frequently hand-edited or emitted by tools
//! that drop `xsi:type`. When the discriminator is missing (or names something
//! we do not recognize) we fall back to an ordered chain of shape predicates.
//! Each predicate is pure, so the same element shape always classifies the
//! same way.

use crate::xml::XmlElement;
use ecore2proto_model::builtins::is_builtin;
use ecore2proto_model::parse_type_ref;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    Class,
    Enum,
    DataType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Attribute,
    Reference,
}

/// Classify an `eClassifiers` element.
///
/// Order: explicit `xsi:type` → literal children (enum) → structural feature
/// children (class) → native instance type (data type) → class.
pub fn classify_classifier(element: &XmlElement) -> ClassifierKind {
    explicit_classifier_kind(element)
        .or_else(|| has_literals(element).then_some(ClassifierKind::Enum))
        .or_else(|| has_structural_features(element).then_some(ClassifierKind::Class))
        .or_else(|| has_instance_type(element).then_some(ClassifierKind::DataType))
        .unwrap_or(ClassifierKind::Class)
}

/// Classify an `eStructuralFeatures` element.
///
/// Without an explicit discriminator, a feature whose type is not a built-in
/// scalar is a reference.
pub fn classify_feature(element: &XmlElement) -> FeatureKind {
    if let Some(xsi_type) = element.xsi_type() {
        if xsi_type.contains("EReference") {
            return FeatureKind::Reference;
        }
        if xsi_type.contains("EAttribute") {
            return FeatureKind::Attribute;
        }
    }

    let type_ref = parse_type_ref(element.attr("eType").unwrap_or_default());
    if is_builtin(&type_ref.name) {
        FeatureKind::Attribute
    } else {
        FeatureKind::Reference
    }
}

fn explicit_classifier_kind(element: &XmlElement) -> Option<ClassifierKind> {
    let xsi_type = element.xsi_type()?;
    let local = xsi_type.rsplit(':').next().unwrap_or(xsi_type).trim();
    match local {
        "EClass" => Some(ClassifierKind::Class),
        "EEnum" => Some(ClassifierKind::Enum),
        "EDataType" => Some(ClassifierKind::DataType),
        _ => None,
    }
}

fn has_literals(element: &XmlElement) -> bool {
    element
        .children
        .iter()
        .any(|c| c.name == "eLiterals" || c.name.to_lowercase().contains("literal"))
}

fn has_structural_features(element: &XmlElement) -> bool {
    element
        .children
        .iter()
        .any(|c| c.name == "eStructuralFeatures" || c.name.to_lowercase().contains("feature"))
}

pub(crate) fn has_instance_type(element: &XmlElement) -> bool {
    instance_type_name(element).is_some()
}

pub(crate) fn instance_type_name(element: &XmlElement) -> Option<&str> {
    element
        .attr("instanceClassName")
        .or_else(|| element.attr("instanceTypeName"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::{XmlAttribute, XmlElement};

    fn element(name: &str, attrs: &[(&str, &str)], children: Vec<XmlElement>) -> XmlElement {
        XmlElement {
            name: name.to_string(),
            attributes: attrs
                .iter()
                .map(|(k, v)| XmlAttribute {
                    qname: k.to_string(),
                    local_name: k.rsplit(':').next().unwrap_or(k).to_string(),
                    namespace: k
                        .starts_with("xsi:")
                        .then(|| crate::xml::XSI_NS.to_string()),
                    value: v.to_string(),
                })
                .collect(),
            children,
        }
    }

    #[test]
    fn explicit_discriminator_wins() {
        let e = element(
            "eClassifiers",
            &[("xsi:type", "ecore:EDataType")],
            vec![element("eLiterals", &[], vec![])],
        );
        assert_eq!(classify_classifier(&e), ClassifierKind::DataType);
    }

    #[test]
    fn unknown_discriminator_falls_back_to_shape() {
        let e = element(
            "eClassifiers",
            &[("xsi:type", "ecore:ESomethingElse")],
            vec![element("eLiterals", &[], vec![])],
        );
        assert_eq!(classify_classifier(&e), ClassifierKind::Enum);
    }

    #[test]
    fn shape_chain_order() {
        let literals_and_features = element(
            "eClassifiers",
            &[],
            vec![
                element("eStructuralFeatures", &[], vec![]),
                element("eLiterals", &[], vec![]),
            ],
        );
        assert_eq!(classify_classifier(&literals_and_features), ClassifierKind::Enum);

        let features_and_native = element(
            "eClassifiers",
            &[("instanceClassName", "java.lang.String")],
            vec![element("eStructuralFeatures", &[], vec![])],
        );
        assert_eq!(classify_classifier(&features_and_native), ClassifierKind::Class);

        let native = element("eClassifiers", &[("instanceTypeName", "int")], vec![]);
        assert_eq!(classify_classifier(&native), ClassifierKind::DataType);

        let empty = element("eClassifiers", &[("name", "Marker")], vec![]);
        assert_eq!(classify_classifier(&empty), ClassifierKind::Class);
    }

    #[test]
    fn feature_kind_from_type_token() {
        let attr = element(
            "eStructuralFeatures",
            &[("eType", "ecore:EDataType http://www.eclipse.org/emf/2002/Ecore#//EInt")],
            vec![],
        );
        assert_eq!(classify_feature(&attr), FeatureKind::Attribute);

        let reference = element("eStructuralFeatures", &[("eType", "#//Shape")], vec![]);
        assert_eq!(classify_feature(&reference), FeatureKind::Reference);

        let untyped = element("eStructuralFeatures", &[], vec![]);
        assert_eq!(classify_feature(&untyped), FeatureKind::Attribute);

        let forced = element(
            "eStructuralFeatures",
            &[("xsi:type", "ecore:EAttribute"), ("eType", "#//Color")],
            vec![],
        );
        assert_eq!(classify_feature(&forced), FeatureKind::Attribute);
    }
}
