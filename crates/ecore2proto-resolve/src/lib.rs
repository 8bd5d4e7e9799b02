//! Post-parse passes over the package forest.
//!
//! - [`resolver`]: which package owns each super type and reference target.
//! - [`annotations`]: the registry of custom field options derived from
//!   `eAnnotations` details.
//!
//! Both passes see every package at once; run them after all units are
//! parsed.

pub mod annotations;
pub mod resolver;

pub use annotations::{
    collect_annotations, AnnotationOptionDef, AnnotationRegistry, Collecting, Finalized,
    OptionType, RegistryState, EXTENSION_FIELD_START,
};
pub use resolver::{resolve, resolve_with, TypeIndex, TypeKind};
