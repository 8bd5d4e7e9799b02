//! Input discovery: explicit `.ecore` files and directories to walk.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const ECORE_EXTENSION: &str = "ecore";

fn is_ecore(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == ECORE_EXTENSION)
}

/// Expand `inputs` into `.ecore` files.
///
/// Files are kept in argument order; each directory contributes its
/// `.ecore` files (recursively) in sorted order. Anything else is skipped
/// with a warning.
pub fn discover_inputs(inputs: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for input in inputs {
        if input.is_file() && is_ecore(input) {
            files.push(input.clone());
        } else if input.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(input)
                .follow_links(false)
                .into_iter()
                .filter_map(|entry| match entry {
                    Ok(entry) => Some(entry),
                    Err(err) => {
                        tracing::warn!(error = %err, "skipping unreadable directory entry");
                        None
                    }
                })
                .filter(|entry| entry.file_type().is_file() && is_ecore(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            found.sort();
            files.extend(found);
        } else {
            tracing::warn!(
                path = %input.display(),
                "skipping input (not a .ecore file or directory)"
            );
        }
    }

    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn walks_directories_sorted_and_skips_other_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let root = dir.path();
        fs::create_dir_all(root.join("nested/deeper")).expect("mkdir");
        fs::write(root.join("b.ecore"), "<EPackage name=\"b\"/>").expect("write");
        fs::write(root.join("a.ecore"), "<EPackage name=\"a\"/>").expect("write");
        fs::write(root.join("nested/deeper/c.ecore"), "<EPackage name=\"c\"/>").expect("write");
        fs::write(root.join("notes.txt"), "ignore me").expect("write");

        let files = discover_inputs(&[root.to_path_buf()]);
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(root).expect("under root").to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["a.ecore", "b.ecore", "nested/deeper/c.ecore"]);
    }

    #[test]
    fn explicit_files_keep_argument_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let z = dir.path().join("z.ecore");
        let a = dir.path().join("a.ecore");
        let txt = dir.path().join("model.xml");
        for path in [&z, &a, &txt] {
            fs::write(path, "<EPackage name=\"x\"/>").expect("write");
        }
        let missing = dir.path().join("missing.ecore");

        let files = discover_inputs(&[z.clone(), txt, missing, a.clone()]);
        assert_eq!(files, vec![z, a]);
    }
}
