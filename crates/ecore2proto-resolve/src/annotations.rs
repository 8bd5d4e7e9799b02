//! Annotation registry: every distinct `(source, detail key)` pair becomes one
//! custom `google.protobuf.FieldOptions` extension.
//!
//! The registry is a typestate:
//!
//! ```text
//! AnnotationRegistry<Collecting> ──finalize──► AnnotationRegistry<Finalized>
//!   scan(): assign field numbers,              option_for(), iter(),
//!           gather value samples                options_unit()
//! ```
//!
//! Field names and value types are only known once every sample has been
//! seen, so lookups are not available while collecting.

use ecore2proto_model::naming::{shorten_source, to_option_field_name};
use ecore2proto_model::{Annotation, Package};
use regex::Regex;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::marker::PhantomData;
use std::sync::OnceLock;

/// First extension field number (the range reserved for custom options).
pub const EXTENSION_FIELD_START: u32 = 50000;

/// Registry lifecycle state.
pub trait RegistryState {}

/// Still scanning packages; field names and types are placeholders.
#[derive(Debug)]
pub enum Collecting {}

/// Names and types assigned; read-only.
#[derive(Debug)]
pub enum Finalized {}

impl RegistryState for Collecting {}
impl RegistryState for Finalized {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    Bool,
    Int32,
    Double,
    String,
}

impl OptionType {
    pub fn as_str(self) -> &'static str {
        match self {
            OptionType::Bool => "bool",
            OptionType::Int32 => "int32",
            OptionType::Double => "double",
            OptionType::String => "string",
        }
    }

    /// Narrowest type that fits every sample: bool, then int32, then
    /// double, else string.
    pub fn infer<'a>(samples: impl IntoIterator<Item = &'a str>) -> OptionType {
        let values: Vec<&str> = samples.into_iter().collect();
        if values.is_empty() {
            return OptionType::String;
        }

        if values
            .iter()
            .all(|v| v.eq_ignore_ascii_case("true") || v.eq_ignore_ascii_case("false"))
        {
            OptionType::Bool
        } else if values.iter().all(|v| integer_pattern().is_match(v)) {
            OptionType::Int32
        } else if values.iter().all(|v| decimal_pattern().is_match(v)) {
            OptionType::Double
        } else {
            OptionType::String
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn integer_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+$").expect("static regex"))
}

fn decimal_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^-?\d+\.?\d*$").expect("static regex"))
}

/// One `optional <type> <name> = <number>;` line of the options unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationOptionDef {
    /// Detail key as written in the model.
    pub key: String,
    pub field_name: String,
    pub proto_type: OptionType,
    pub field_number: u32,
    pub source_short: String,
    /// Source URI of the first annotation that registered this key.
    pub source_full: String,
}

#[derive(Debug)]
pub struct AnnotationRegistry<S: RegistryState> {
    /// In registration order, so field numbers are strictly increasing.
    options: Vec<AnnotationOptionDef>,
    lookup: HashMap<(String, String), usize>,
    samples: Vec<BTreeSet<String>>,
    next_field_number: u32,
    _state: PhantomData<S>,
}

impl Default for AnnotationRegistry<Collecting> {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationRegistry<Collecting> {
    pub fn new() -> Self {
        Self {
            options: Vec::new(),
            lookup: HashMap::new(),
            samples: Vec::new(),
            next_field_number: EXTENSION_FIELD_START,
            _state: PhantomData,
        }
    }

    /// Register every annotation detail in `packages`, sub-packages included.
    pub fn scan(mut self, packages: &[Package]) -> Self {
        for pkg in packages {
            self.scan_package(pkg);
        }
        self
    }

    fn scan_package(&mut self, pkg: &Package) {
        self.register_all(&pkg.annotations);
        for class in &pkg.classes {
            self.register_all(&class.annotations);
            for attr in &class.attributes {
                self.register_all(&attr.annotations);
            }
            for reference in &class.references {
                self.register_all(&reference.annotations);
            }
        }
        for en in &pkg.enums {
            self.register_all(&en.annotations);
        }
        for sub in &pkg.sub_packages {
            self.scan_package(sub);
        }
    }

    fn register_all(&mut self, annotations: &[Annotation]) {
        for annotation in annotations {
            self.register(annotation);
        }
    }

    pub fn register(&mut self, annotation: &Annotation) {
        let source_short = shorten_source(&annotation.source);

        for (key, value) in &annotation.details {
            let lookup_key = (source_short.clone(), key.clone());
            let slot = match self.lookup.get(&lookup_key) {
                Some(&slot) => slot,
                None => {
                    let slot = self.options.len();
                    self.options.push(AnnotationOptionDef {
                        key: key.clone(),
                        field_name: String::new(),
                        proto_type: OptionType::String,
                        field_number: self.next_field_number,
                        source_short: source_short.clone(),
                        source_full: annotation.source.clone(),
                    });
                    self.samples.push(BTreeSet::new());
                    self.lookup.insert(lookup_key, slot);
                    self.next_field_number += 1;
                    slot
                }
            };
            self.samples[slot].insert(value.clone());
        }
    }

    /// Infer value types and assign field names.
    ///
    /// A key registered under two or more shortened sources gets the source
    /// as a name prefix; a key seen under exactly one source never does.
    pub fn finalize(mut self) -> AnnotationRegistry<Finalized> {
        let mut sources_per_key: HashMap<&str, BTreeSet<&str>> = HashMap::new();
        for opt in &self.options {
            sources_per_key
                .entry(opt.key.as_str())
                .or_default()
                .insert(opt.source_short.as_str());
        }
        let colliding: BTreeSet<String> = sources_per_key
            .into_iter()
            .filter(|(_, sources)| sources.len() > 1)
            .map(|(key, _)| key.to_string())
            .collect();

        for (opt, samples) in self.options.iter_mut().zip(&self.samples) {
            opt.proto_type = OptionType::infer(samples.iter().map(String::as_str));
            let prefix = colliding
                .contains(&opt.key)
                .then_some(opt.source_short.as_str());
            opt.field_name = to_option_field_name(prefix, &opt.key);
        }

        tracing::debug!(
            options = self.options.len(),
            colliding_keys = colliding.len(),
            "finalized annotation registry"
        );

        AnnotationRegistry {
            options: self.options,
            lookup: self.lookup,
            samples: self.samples,
            next_field_number: self.next_field_number,
            _state: PhantomData,
        }
    }
}

impl AnnotationRegistry<Finalized> {
    /// Option definition for one detail of `annotation`.
    pub fn option_for(&self, annotation: &Annotation, key: &str) -> Option<&AnnotationOptionDef> {
        self.lookup_short(&shorten_source(&annotation.source), key)
    }

    pub fn lookup_short(&self, source_short: &str, key: &str) -> Option<&AnnotationOptionDef> {
        self.lookup
            .get(&(source_short.to_string(), key.to_string()))
            .map(|&slot| &self.options[slot])
    }

    /// Distinct values observed for an option.
    pub fn samples(&self, def: &AnnotationOptionDef) -> impl Iterator<Item = &str> {
        self.lookup
            .get(&(def.source_short.clone(), def.key.clone()))
            .map(|&slot| &self.samples[slot])
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Definitions in field-number order.
    pub fn iter(&self) -> impl Iterator<Item = &AnnotationOptionDef> {
        self.options.iter()
    }

    /// Definitions grouped by shortened source, groups in first-registration order.
    pub fn groups(&self) -> Vec<(&str, Vec<&AnnotationOptionDef>)> {
        let mut groups: Vec<(&str, Vec<&AnnotationOptionDef>)> = Vec::new();
        for opt in &self.options {
            match groups.iter_mut().find(|(source, _)| *source == opt.source_short) {
                Some((_, members)) => members.push(opt),
                None => groups.push((opt.source_short.as_str(), vec![opt])),
            }
        }
        groups
    }

    /// The shared options unit declaring every extension field.
    pub fn options_unit(&self, proto_package: &str) -> String {
        let mut out = String::new();
        out.push_str("syntax = \"proto3\";\n\n");
        out.push_str(&format!("package {proto_package};\n\n"));
        out.push_str("import \"google/protobuf/descriptor.proto\";\n\n");
        out.push_str("extend google.protobuf.FieldOptions {\n");

        for (i, (_, members)) in self.groups().into_iter().enumerate() {
            if i > 0 {
                out.push('\n');
            }
            out.push_str(&format!("  // Source: {}\n", members[0].source_full));
            for opt in members {
                out.push_str(&format!(
                    "  optional {} {} = {};\n",
                    opt.proto_type, opt.field_name, opt.field_number
                ));
            }
        }

        out.push_str("}\n");
        out
    }
}

/// Scan and finalize in one step.
pub fn collect_annotations(packages: &[Package]) -> AnnotationRegistry<Finalized> {
    AnnotationRegistry::new().scan(packages).finalize()
}
