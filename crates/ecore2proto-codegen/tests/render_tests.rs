use ecore2proto_codegen::{render, GeneratorOptions};
use ecore2proto_ingest_ecore::{parse_sources, SourceUnit};
use ecore2proto_resolve::{collect_annotations, resolve};
use std::collections::BTreeMap;

const ECORE_NS: &str = r#"xmlns:xmi="http://www.omg.org/XMI" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xmlns:ecore="http://www.eclipse.org/emf/2002/Ecore""#;

fn generate(units: &[(&str, String)], options: &GeneratorOptions) -> BTreeMap<String, String> {
    let units: Vec<SourceUnit> = units
        .iter()
        .map(|(identity, text)| SourceUnit::new(*identity, text.clone()))
        .collect();
    let outcome = parse_sources(&units);
    assert!(outcome.diagnostics.is_empty(), "{:?}", outcome.diagnostics);

    let mut packages = outcome.packages;
    resolve(&mut packages);
    let registry = collect_annotations(&packages);
    render(&packages, &registry, options)
}

fn ecore(body: &str, name: &str) -> String {
    format!(r#"<?xml version="1.0" encoding="UTF-8"?>
<ecore:EPackage {ECORE_NS} name="{name}" nsURI="http://example.com/{name}" nsPrefix="{name}">
{body}
</ecore:EPackage>
"#)
}

#[test]
fn scalar_only_package_has_no_imports() {
    let text = ecore(
        r#"<eClassifiers xsi:type="ecore:EClass" name="Note">
    <eStructuralFeatures xsi:type="ecore:EAttribute" name="text" eType="ecore:EDataType http://www.eclipse.org/emf/2002/Ecore#//EString"/>
  </eClassifiers>"#,
        "notes",
    );

    let out = generate(&[("notes.ecore", text)], &GeneratorOptions::default());
    assert_eq!(out.len(), 1);
    assert_eq!(
        out["notes.proto"],
        "syntax = \"proto3\";\n\npackage notes;\n\nmessage Note {\n  string text = 1;\n}\n"
    );
}

#[test]
fn multi_line_values_stay_inside_comments() {
    let text = ecore(
        r#"<eClassifiers xsi:type="ecore:EClass" name="Page">
    <eAnnotations source="http://www.eclipse.org/emf/2002/GenModel">
      <details key="documentation" value="First line.&#xA;Second line."/>
    </eAnnotations>
    <eStructuralFeatures xsi:type="ecore:EAttribute" name="title" defaultValueLiteral="Untitled&#xA;draft"
        eType="ecore:EDataType http://www.eclipse.org/emf/2002/Ecore#//EString"/>
  </eClassifiers>"#,
        "docs",
    );

    let out = generate(&[("docs.ecore", text)], &GeneratorOptions::default());
    let expected = "\
syntax = \"proto3\";

package docs;

// @genmodel.documentation: First line.
//   Second line.
message Page {
  string title = 1;  // default: Untitled draft
}
";
    assert_eq!(out["docs.proto"], expected);
}

#[test]
fn timestamp_import_appears_once() {
    let text = ecore(
        r#"<eClassifiers xsi:type="ecore:EClass" name="Event">
    <eStructuralFeatures xsi:type="ecore:EAttribute" name="startsAt" eType="ecore:EDataType http://www.eclipse.org/emf/2002/Ecore#//EDate"/>
    <eStructuralFeatures xsi:type="ecore:EAttribute" name="endsAt" eType="ecore:EDataType http://www.eclipse.org/emf/2002/Ecore#//EDate"/>
    <eStructuralFeatures xsi:type="ecore:EAttribute" name="tags" upperBound="-1" eType="ecore:EDataType http://www.eclipse.org/emf/2002/Ecore#//EString"/>
  </eClassifiers>"#,
        "calendar",
    );

    let out = generate(&[("calendar.ecore", text)], &GeneratorOptions::default());
    let expected = "\
syntax = \"proto3\";

package calendar;

import \"google/protobuf/timestamp.proto\";

message Event {
  google.protobuf.Timestamp starts_at = 1;
  google.protobuf.Timestamp ends_at = 2;
  repeated string tags = 3;
}
";
    assert_eq!(out["calendar.proto"], expected);
}

#[test]
fn annotated_model_with_cross_package_types() {
    let common = ecore(
        r#"<eClassifiers xsi:type="ecore:EClass" name="Address">
    <eStructuralFeatures xsi:type="ecore:EAttribute" name="city" eType="ecore:EDataType http://www.eclipse.org/emf/2002/Ecore#//EString"/>
  </eClassifiers>
  <eClassifiers xsi:type="ecore:EClass" name="NamedElement" abstract="true">
    <eStructuralFeatures xsi:type="ecore:EAttribute" name="name" eType="ecore:EDataType http://www.eclipse.org/emf/2002/Ecore#//EString"/>
  </eClassifiers>
  <eClassifiers xsi:type="ecore:EEnum" name="Country">
    <eLiterals name="Unknown"/>
    <eLiterals name="France" value="1"/>
  </eClassifiers>"#,
        "common",
    );

    let crm = ecore(
        r##"<eClassifiers xsi:type="ecore:EClass" name="Customer" eSuperTypes="common.ecore#//NamedElement">
    <eAnnotations source="http://www.eclipse.org/emf/2002/GenModel">
      <details key="documentation" value="A paying customer"/>
    </eAnnotations>
    <eStructuralFeatures xsi:type="ecore:EAttribute" name="email" eType="ecore:EDataType http://www.eclipse.org/emf/2002/Ecore#//EString">
      <eAnnotations source="http://example.com/ui">
        <details key="label" value="E-mail &quot;primary&quot;"/>
        <details key="required" value="true"/>
      </eAnnotations>
    </eStructuralFeatures>
    <eStructuralFeatures xsi:type="ecore:EAttribute" name="vipLevel" defaultValueLiteral="0" eType="ecore:EDataType http://www.eclipse.org/emf/2002/Ecore#//EInt">
      <eAnnotations source="http://example.com/ui">
        <details key="order" value="2"/>
      </eAnnotations>
    </eStructuralFeatures>
    <eStructuralFeatures xsi:type="ecore:EAttribute" name="country" eType="common.ecore#//Country"/>
    <eStructuralFeatures xsi:type="ecore:EReference" name="addresses" upperBound="-1" containment="true" eType="common.ecore#//Address"/>
    <eStructuralFeatures xsi:type="ecore:EReference" name="account" eType="#//Account" eOpposite="#//Account/owner"/>
  </eClassifiers>
  <eClassifiers xsi:type="ecore:EClass" name="Account">
    <eStructuralFeatures xsi:type="ecore:EReference" name="owner" eType="#//Customer" eOpposite="#//Customer/account"/>
  </eClassifiers>"##,
        "crm",
    );

    let options = GeneratorOptions {
        java_package_prefix: "com.acme".to_string(),
        go_package_prefix: "github.com/acme/gen".to_string(),
        ..GeneratorOptions::default()
    };
    let out = generate(&[("models/common.ecore", common), ("models/crm.ecore", crm)], &options);

    let names: Vec<&str> = out.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["common.proto", "crm.proto", "ui_options.proto"]);

    let expected_crm = "\
syntax = \"proto3\";

package crm;

option java_package = \"com.acme.crm\";
option go_package = \"github.com/acme/gen/crm\";

import \"common.proto\";
import \"ui_options.proto\";

// @genmodel.documentation: A paying customer
message Customer {
  // Inherited from NamedElement
  common.NamedElement named_element = 1;
  string email = 2 [
    (ui.label) = \"E-mail \\\"primary\\\"\",
    (ui.required) = true
  ];
  int32 vip_level = 3 [(ui.order) = 2];  // default: 0
  common.Country country = 4;
  repeated common.Address addresses = 5;  // containment
  Account account = 6;  // opposite: #//Account/owner
}

message Account {
  Customer owner = 1;  // opposite: #//Customer/account
}
";
    assert_eq!(out["crm.proto"], expected_crm);

    let common_unit = &out["common.proto"];
    assert!(common_unit.contains("// Abstract base: NamedElement\nmessage NamedElement {"));
    assert!(common_unit.contains("enum Country {\n  COUNTRY_UNKNOWN = 0;\n  COUNTRY_FRANCE = 1;\n}"));
    assert!(!common_unit.contains("import"));

    let expected_options = "\
syntax = \"proto3\";

package ui;

import \"google/protobuf/descriptor.proto\";

extend google.protobuf.FieldOptions {
  // Source: http://www.eclipse.org/emf/2002/GenModel
  optional string documentation = 50000;

  // Source: http://example.com/ui
  optional string label = 50001;
  optional bool required = 50002;
  optional int32 order = 50003;
}
";
    assert_eq!(out["ui_options.proto"], expected_options);
}

#[test]
fn sub_packages_get_their_own_units() {
    let text = ecore(
        r##"<eClassifiers xsi:type="ecore:EClass" name="Root"/>
  <eSubpackages name="Detail" nsURI="http://example.com/detail" nsPrefix="d">
    <eClassifiers xsi:type="ecore:EClass" name="Leaf" eSuperTypes="#//Root"/>
  </eSubpackages>"##,
        "outer",
    );

    let options = GeneratorOptions {
        proto_package_prefix: "acme".to_string(),
        ..GeneratorOptions::default()
    };
    let out = generate(&[("outer.ecore", text)], &options);
    let detail = &out["detail.proto"];
    assert!(detail.contains("package acme.detail;"));
    assert!(detail.contains("import \"outer.proto\";"));
    assert!(detail.contains("  acme.outer.Root root = 1;"));
    assert!(!out.contains_key("ui_options.proto"));
}
