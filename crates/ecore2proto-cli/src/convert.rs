//! The conversion pipeline behind the `ecore2proto` binary.
//!
//! ```text
//! files ──read──► SourceUnit ──parse──► packages ──resolve──► annotations ──render──► units
//! ```

use anyhow::{bail, Context, Result};
use ecore2proto_codegen::{render, GeneratorOptions};
use ecore2proto_ingest_ecore::{parse_sources, SourceUnit};
use ecore2proto_model::{flatten_packages, Package};
use ecore2proto_resolve::{collect_annotations, resolve};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Conversion {
    /// Resolved top-level packages.
    pub packages: Vec<Package>,
    /// File name → proto3 text.
    pub units: BTreeMap<String, String>,
    /// Units that failed to parse and were skipped.
    pub skipped: Vec<String>,
}

/// Read, parse, resolve, and render `files`.
///
/// Fails when a file cannot be read or when no packages survive parsing.
/// Files that cannot be decoded or parsed are skipped and listed.
pub fn convert_files(files: &[PathBuf], options: &GeneratorOptions) -> Result<Conversion> {
    let mut skipped = Vec::new();
    let mut units = Vec::with_capacity(files.len());
    for path in files {
        let bytes = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        let identity = path.display().to_string();
        match SourceUnit::from_bytes(identity.clone(), &bytes) {
            Ok(unit) => units.push(unit),
            Err(error) => {
                tracing::warn!(
                    identity = %identity,
                    error = %error,
                    "skipping source unit that could not be decoded"
                );
                skipped.push(identity);
            }
        }
    }

    let outcome = parse_sources(&units);
    skipped.extend(outcome.diagnostics.iter().map(|d| d.identity.clone()));

    let mut packages = outcome.packages;
    if packages.is_empty() {
        bail!("No packages found in the provided ecore files");
    }

    for pkg in flatten_packages(&packages) {
        tracing::info!(
            package = %pkg.name,
            classes = pkg.classes.len(),
            enums = pkg.enums.len(),
            data_types = pkg.data_types.len(),
            "found package"
        );
    }

    resolve(&mut packages);
    let registry = collect_annotations(&packages);
    for opt in registry.iter() {
        tracing::info!(
            source = %opt.source_short,
            key = %opt.key,
            proto_type = %opt.proto_type,
            field_number = opt.field_number,
            "annotation option"
        );
    }

    let units = render(&packages, &registry, options);

    Ok(Conversion {
        packages,
        units,
        skipped,
    })
}

/// Write every unit under `output_dir`, creating it if needed.
pub fn write_units(output_dir: &Path, units: &BTreeMap<String, String>) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let mut written = Vec::with_capacity(units.len());
    for (name, content) in units {
        let path = output_dir.join(name);
        fs::write(&path, content).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "wrote unit");
        written.push(path);
    }
    Ok(written)
}

/// Dump the resolved IR as pretty JSON.
pub fn dump_ir(path: &Path, packages: &[Package]) -> Result<()> {
    let json = serde_json::to_string_pretty(packages).context("failed to serialize IR")?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SHAPES: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ecore:EPackage xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xmlns:ecore="http://www.eclipse.org/emf/2002/Ecore" name="shapes">
  <eClassifiers xsi:type="ecore:EClass" name="Shape">
    <eStructuralFeatures xsi:type="ecore:EAttribute" name="area"
        eType="ecore:EDataType http://www.eclipse.org/emf/2002/Ecore#//EDouble">
      <eAnnotations source="http://example.com/ui">
        <details key="label" value="Area"/>
      </eAnnotations>
    </eStructuralFeatures>
  </eClassifiers>
</ecore:EPackage>
"#;

    #[test]
    fn converts_and_writes_units() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("shapes.ecore");
        let broken = dir.path().join("broken.ecore");
        fs::write(&input, SHAPES).expect("write input");
        fs::write(&broken, "<EPackage name=\"x\">").expect("write input");

        let conversion =
            convert_files(&[broken.clone(), input], &GeneratorOptions::default()).expect("converts");
        assert_eq!(conversion.skipped, vec![broken.display().to_string()]);
        let names: Vec<&str> = conversion.units.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["shapes.proto", "ui_options.proto"]);

        let out_dir = dir.path().join("out/proto");
        let written = write_units(&out_dir, &conversion.units).expect("writes");
        assert_eq!(written.len(), 2);
        let shapes = fs::read_to_string(out_dir.join("shapes.proto")).expect("read back");
        assert!(shapes.contains("import \"ui_options.proto\";"));
        assert!(shapes.contains("  double area = 1 [(ui.label) = \"Area\"];"));
    }

    #[test]
    fn undecodable_file_is_skipped_not_fatal() {
        let dir = tempfile::tempdir().expect("tempdir");
        let good = dir.path().join("good.ecore");
        let latin = dir.path().join("latin.ecore");
        let stray = dir.path().join("stray.ecore");
        fs::write(&good, SHAPES).expect("write input");
        fs::write(
            &latin,
            b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?>\n<EPackage name=\"legacy\">\
<eClassifiers name=\"Menu\"><eStructuralFeatures name=\"dish\" eType=\"EString\" \
defaultValueLiteral=\"Caf\xE9\"/></eClassifiers></EPackage>",
        )
        .expect("write input");
        fs::write(&stray, b"<EPackage name=\"caf\xE9\"/>").expect("write input");

        let conversion = convert_files(&[good, latin, stray.clone()], &GeneratorOptions::default())
            .expect("converts");
        assert_eq!(conversion.skipped, vec![stray.display().to_string()]);
        assert!(conversion.units.contains_key("shapes.proto"));
        assert!(conversion.units["legacy.proto"].contains("  string dish = 1;  // default: Caf\u{e9}"));
    }

    #[test]
    fn no_packages_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("empty.ecore");
        fs::write(&input, "<model/>").expect("write input");

        let err = convert_files(&[input], &GeneratorOptions::default()).expect_err("should fail");
        assert!(err.to_string().contains("No packages found"));
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("missing.ecore");
        let err = convert_files(&[missing], &GeneratorOptions::default()).expect_err("should fail");
        assert!(format!("{err:#}").contains("failed to read"));
    }

    #[test]
    fn dumps_resolved_ir() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("shapes.ecore");
        fs::write(&input, SHAPES).expect("write input");
        let conversion = convert_files(&[input], &GeneratorOptions::default()).expect("converts");

        let ir_path = dir.path().join("ir/shapes.json");
        dump_ir(&ir_path, &conversion.packages).expect("dumps");
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&ir_path).expect("read")).expect("json");
        assert_eq!(value[0]["name"], "shapes");
        assert_eq!(value[0]["classes"][0]["attributes"][0]["e_type"], "EDouble");
    }
}
