use quick_xml::events::attributes::AttrError;
use thiserror::Error;

/// Why a single source unit could not be turned into packages.
///
/// Any of these aborts the whole unit: a unit either yields all of its
/// packages or none.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed XML attribute: {0}")]
    Attribute(#[from] AttrError),
    #[error("document is not valid {encoding}: {source}")]
    Encoding {
        encoding: String,
        source: std::str::Utf8Error,
    },
    #[error("invalid UTF-8 in XML name: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("document has no root element")]
    NoRootElement,
    #[error("document has more than one root element (second is <{0}>)")]
    MultipleRoots(String),
    #[error("unexpected end of document inside <{0}>")]
    UnclosedElement(String),
    #[error("closing tag without a matching opening tag")]
    UnexpectedClosingTag,
    #[error("<{element}> attribute `{attribute}`: expected an integer, found `{value}`")]
    InvalidInteger {
        element: String,
        attribute: String,
        value: String,
    },
}
