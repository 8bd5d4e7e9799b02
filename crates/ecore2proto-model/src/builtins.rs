//! Built-in Ecore / Java scalar types and their proto3 equivalents.
//!
//! The same table drives two decisions:
//! - the parser's attribute-vs-reference heuristic (a feature whose type is
//!   *not* in this table is treated as a reference), and
//! - the generator's scalar mapping.

/// `(source type name, proto3 type)`.
pub const BUILTIN_SCALARS: &[(&str, &str)] = &[
    // Ecore built-in types
    ("EString", "string"),
    ("EInt", "int32"),
    ("EInteger", "int32"),
    ("ELong", "int64"),
    ("EFloat", "float"),
    ("EDouble", "double"),
    ("EBoolean", "bool"),
    ("EByte", "int32"),
    ("EShort", "int32"),
    ("EChar", "string"),
    ("EDate", "google.protobuf.Timestamp"),
    ("EBigInteger", "int64"),
    ("EBigDecimal", "string"),
    ("EByteArray", "bytes"),
    ("EResource", "string"),
    ("EJavaObject", "google.protobuf.Any"),
    ("EJavaClass", "string"),
    ("EFeatureMapEntry", "google.protobuf.Any"),
    ("EMap", "google.protobuf.Struct"),
    ("EEList", "google.protobuf.ListValue"),
    ("ETreeIterator", "string"),
    ("EEnumerator", "int32"),
    // Java instance-class names (from `instanceClassName`)
    ("java.lang.String", "string"),
    ("java.lang.Integer", "int32"),
    ("java.lang.Long", "int64"),
    ("java.lang.Float", "float"),
    ("java.lang.Double", "double"),
    ("java.lang.Boolean", "bool"),
    ("java.lang.Byte", "int32"),
    ("java.lang.Short", "int32"),
    ("java.lang.Character", "string"),
    ("java.util.Date", "google.protobuf.Timestamp"),
    ("java.math.BigInteger", "int64"),
    ("java.math.BigDecimal", "string"),
    ("int", "int32"),
    ("long", "int64"),
    ("float", "float"),
    ("double", "double"),
    ("boolean", "bool"),
    ("byte", "int32"),
    ("short", "int32"),
    ("char", "string"),
];

/// Well-known proto types and the import each one needs.
pub const WELL_KNOWN_TYPE_IMPORTS: &[(&str, &str)] = &[
    ("google.protobuf.Timestamp", "google/protobuf/timestamp.proto"),
    ("google.protobuf.Any", "google/protobuf/any.proto"),
    ("google.protobuf.Struct", "google/protobuf/struct.proto"),
    ("google.protobuf.ListValue", "google/protobuf/struct.proto"),
];

/// Fallback proto type when nothing else matches.
pub const FALLBACK_SCALAR: &str = "string";

pub fn builtin_proto_type(type_name: &str) -> Option<&'static str> {
    BUILTIN_SCALARS
        .iter()
        .find(|(name, _)| *name == type_name)
        .map(|(_, proto)| *proto)
}

pub fn is_builtin(type_name: &str) -> bool {
    builtin_proto_type(type_name).is_some()
}

pub fn well_known_import(proto_type: &str) -> Option<&'static str> {
    WELL_KNOWN_TYPE_IMPORTS
        .iter()
        .find(|(ty, _)| *ty == proto_type)
        .map(|(_, import)| *import)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ecore_and_java_names_map() {
        assert_eq!(builtin_proto_type("EString"), Some("string"));
        assert_eq!(builtin_proto_type("EDate"), Some("google.protobuf.Timestamp"));
        assert_eq!(builtin_proto_type("java.lang.Long"), Some("int64"));
        assert_eq!(builtin_proto_type("boolean"), Some("bool"));
        assert_eq!(builtin_proto_type("Shape"), None);
        assert!(!is_builtin("EClass"));
    }

    #[test]
    fn only_message_types_need_imports() {
        assert_eq!(
            well_known_import("google.protobuf.ListValue"),
            Some("google/protobuf/struct.proto")
        );
        assert_eq!(well_known_import("string"), None);
        for (_, proto) in BUILTIN_SCALARS {
            if proto.starts_with("google.protobuf.") {
                assert!(well_known_import(proto).is_some(), "{proto} lacks an import");
            }
        }
    }
}
