//! Minimal owned XML element tree on top of `quick-xml`.
//!
//! Ecore documents are small and read once, so we materialize the whole tree
//! and let the parser walk it with plain slices. Element names are stored by
//! *local* name; attributes keep their qualified name plus the resolved
//! namespace, which is what `xsi:type` lookups need.

use crate::error::ParseError;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::reader::{NsReader, Reader};

pub const XSI_NS: &str = "http://www.w3.org/2001/XMLSchema-instance";

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Labels (lowercased) that decode byte-for-byte to the first 256 code points.
const LATIN1_LABELS: &[&str] = &["iso-8859-1", "iso8859-1", "iso_8859-1", "latin-1", "latin1", "l1"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Qualified name as written (`xsi:type`, `name`).
    pub qname: String,
    pub local_name: String,
    /// Resolved namespace URI for prefixed attributes.
    pub namespace: Option<String>,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<XmlAttribute>,
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    /// Unprefixed attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.qname == name)
            .map(|a| a.value.as_str())
    }

    /// `xsi:type`, matched by namespace (or by the conventional `xsi` prefix
    /// when the document never declares it).
    pub fn xsi_type(&self) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| {
                a.local_name == "type"
                    && (a.namespace.as_deref() == Some(XSI_NS) || a.qname == "xsi:type")
            })
            .map(|a| a.value.as_str())
    }

    pub fn children_named<'a>(&'a self, names: &'a [&'a str]) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children
            .iter()
            .filter(move |c| names.contains(&c.name.as_str()))
    }
}

/// Decode raw document bytes into text.
///
/// A Latin-1 XML declaration is honored; everything else must be UTF-8
/// (a leading byte-order mark is dropped).
pub fn decode_document(bytes: &[u8]) -> Result<String, ParseError> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);

    match declared_encoding(bytes) {
        Some(label) if LATIN1_LABELS.contains(&label.as_str()) => {
            Ok(bytes.iter().copied().map(char::from).collect())
        }
        declared => std::str::from_utf8(bytes)
            .map(str::to_string)
            .map_err(|source| ParseError::Encoding {
                encoding: declared.unwrap_or_else(|| "utf-8".to_string()),
                source,
            }),
    }
}

/// `encoding="…"` of the XML declaration, lowercased.
fn declared_encoding(bytes: &[u8]) -> Option<String> {
    let mut reader = Reader::from_reader(bytes);
    let mut buf = Vec::new();
    match reader.read_event_into(&mut buf) {
        Ok(Event::Decl(decl)) => decl
            .encoding()
            .and_then(Result::ok)
            .map(|label| String::from_utf8_lossy(&label).trim().to_ascii_lowercase()),
        _ => None,
    }
}

/// Parse a whole document and return its single root element.
pub fn parse_document(text: &str) -> Result<XmlElement, ParseError> {
    let mut reader = NsReader::from_str(text);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let element = open_element(&reader, &start)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = open_element(&reader, &start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack.pop().ok_or(ParseError::UnexpectedClosingTag)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Eof => break,
            // Text, comments, processing instructions, CDATA, doctype.
            _ => {}
        }
    }

    if let Some(open) = stack.pop() {
        return Err(ParseError::UnclosedElement(open.name));
    }
    root.ok_or(ParseError::NoRootElement)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<(), ParseError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_some() => return Err(ParseError::MultipleRoots(element.name)),
        None => *root = Some(element),
    }
    Ok(())
}

fn open_element(reader: &NsReader<&[u8]>, start: &BytesStart<'_>) -> Result<XmlElement, ParseError> {
    let name = std::str::from_utf8(start.local_name().as_ref())?.to_string();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr?;
        let qname = std::str::from_utf8(attr.key.as_ref())?.to_string();
        let (resolved, local) = reader.resolve_attribute(attr.key);
        let namespace = match resolved {
            ResolveResult::Bound(Namespace(ns)) => Some(std::str::from_utf8(ns)?.to_string()),
            _ => None,
        };
        let local_name = std::str::from_utf8(local.as_ref())?.to_string();
        let value = attr.unescape_value()?.into_owned();
        attributes.push(XmlAttribute {
            qname,
            local_name,
            namespace,
            value,
        });
    }

    Ok(XmlElement {
        name,
        attributes,
        children: Vec::new(),
    })
}
