//! Ecore ingestion (`.ecore` XMI/XML → IR packages).
//!
//! Accepted document shapes:
//! - `<ecore:EPackage …>` as the root,
//! - an `<xmi:XMI>` / `<Resource>` wrapper holding several `EPackage`s,
//! - any other root element, treated as an implicit package when it has a
//!   `name` attribute.
//!
//! Failure is per unit: a malformed document produces a [`ParseDiagnostic`]
//! and no packages, and the batch keeps going.

pub mod classify;
pub mod error;
pub mod xml;

mod parser;

pub use classify::{ClassifierKind, FeatureKind};
pub use error::ParseError;

use ecore2proto_model::Package;

/// One raw input: an identity (usually the file path) and its text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceUnit {
    pub identity: String,
    pub text: String,
}

impl SourceUnit {
    pub fn new(identity: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            text: text.into(),
        }
    }

    /// A unit from raw file bytes; see [`xml::decode_document`] for the
    /// accepted encodings.
    pub fn from_bytes(identity: impl Into<String>, bytes: &[u8]) -> Result<Self, ParseError> {
        Ok(Self::new(identity, xml::decode_document(bytes)?))
    }
}

/// A unit that was skipped, and why.
#[derive(Debug)]
pub struct ParseDiagnostic {
    pub identity: String,
    pub error: ParseError,
}

#[derive(Debug, Default)]
pub struct ParseOutcome {
    /// Top-level packages in input order (sub-packages stay nested).
    pub packages: Vec<Package>,
    pub diagnostics: Vec<ParseDiagnostic>,
}

/// Parse one `.ecore` document.
pub fn parse_document(text: &str, identity: &str) -> Result<Vec<Package>, ParseError> {
    let root = xml::parse_document(text)?;
    parser::packages_from_root(&root, identity)
}

/// Parse every unit, skipping (and reporting) the ones that fail.
pub fn parse_sources(units: &[SourceUnit]) -> ParseOutcome {
    let mut outcome = ParseOutcome::default();

    for unit in units {
        match parse_document(&unit.text, &unit.identity) {
            Ok(packages) => {
                tracing::debug!(
                    identity = %unit.identity,
                    packages = packages.len(),
                    "parsed source unit"
                );
                outcome.packages.extend(packages);
            }
            Err(error) => {
                tracing::warn!(
                    identity = %unit.identity,
                    error = %error,
                    "skipping source unit that failed to parse"
                );
                outcome.diagnostics.push(ParseDiagnostic {
                    identity: unit.identity.clone(),
                    error,
                });
            }
        }
    }

    outcome
}
