//! Content negotiation and XML flattening for API responses.
//!
//! # Design
//! GoCanvas answers with an XML document wrapped in a `CanvasResult` root,
//! except for the images endpoint, which serves binary data under the same
//! path prefix and sometimes with an XML content type. Decoding therefore
//! looks at both the `content-type` header and the request path, and the
//! `images.xml` exception is kept as a literal path check.
//!
//! Parsed documents are flattened into `serde_json::Value` with fixed rules:
//!
//! 1. The root element is unwrapped; the result is its flattened content.
//! 2. An element with neither attributes nor child elements becomes a
//!    string holding its trimmed text (`""` when empty).
//! 3. A plural wrapper collapses to an array of its children's values. A
//!    wrapper is an element with no attributes and no text whose child
//!    elements all share one tag, and whose own name is that tag plus `s` or
//!    `es` (`Forms`/`Form`, `Responses`/`Response`). The array is produced
//!    even for a single child, so list shapes do not depend on the count.
//! 4. Any other element becomes an object. Attributes and child elements
//!    become members keyed by name, a name repeated among siblings becomes an
//!    array in document order, and non-blank text is stored under `"_"`.
//!    An attribute and a child element with the same name count as a repeat:
//!    the member is an array holding the attribute value first.
//! 5. Blank text between elements is ignored. Entities and CDATA sections are
//!    resolved to text.
//! 6. Scalars stay strings; nothing is coerced to a number.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde_json::{Map, Value};

use crate::error::{ApiError, Result};
use crate::http::HttpResponse;

/// Member name used for an element's own text when it also has attributes
/// or children.
pub const TEXT_KEY: &str = "_";

const IMAGES_ENDPOINT: &str = "images.xml";

/// Result of decoding a response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// Flattened XML document.
    Xml(Value),
    /// Body bytes, untouched.
    Raw(Vec<u8>),
}

impl Decoded {
    pub fn as_xml(&self) -> Option<&Value> {
        match self {
            Decoded::Xml(value) => Some(value),
            Decoded::Raw(_) => None,
        }
    }

    pub fn into_xml(self) -> Option<Value> {
        match self {
            Decoded::Xml(value) => Some(value),
            Decoded::Raw(_) => None,
        }
    }

    pub fn into_raw(self) -> Option<Vec<u8>> {
        match self {
            Decoded::Raw(bytes) => Some(bytes),
            Decoded::Xml(_) => None,
        }
    }
}

/// Whether a response for `request_path` should go through the XML parser.
pub fn is_xml_response(request_path: &str, content_type: Option<&str>) -> bool {
    let xml = content_type.is_some_and(|ct| ct.to_ascii_lowercase().contains("application/xml"));
    xml && !request_path.contains(IMAGES_ENDPOINT)
}

/// Decodes `response`, which was returned for a request to `request_path`.
pub fn decode_response(request_path: &str, response: HttpResponse) -> Result<Decoded> {
    if !is_xml_response(request_path, response.header("content-type")) {
        return Ok(Decoded::Raw(response.body));
    }
    let text = String::from_utf8(response.body).map_err(|e| ApiError::Parse(e.to_string()))?;
    parse_document(&text).map(Decoded::Xml)
}

/// Parses an XML document and returns the flattened content of its root.
pub fn parse_document(xml: &str) -> Result<Value> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Value> = None;

    loop {
        let event = reader.read_event().map_err(|e| parse_error(&reader, e))?;
        match event {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(ApiError::Parse("more than one root element".to_string()));
                }
                stack.push(Element::open(&start)?);
            }
            Event::Empty(start) => {
                if root.is_some() {
                    return Err(ApiError::Parse("more than one root element".to_string()));
                }
                let element = Element::open(&start)?;
                close(element, &mut stack, &mut root);
            }
            Event::End(_) => {
                // quick-xml has already verified the end tag name.
                let element = stack
                    .pop()
                    .ok_or_else(|| ApiError::Parse("unexpected closing tag".to_string()))?;
                close(element, &mut stack, &mut root);
            }
            Event::Text(text) => {
                let text = text.unescape().map_err(|e| parse_error(&reader, e))?;
                push_text(&mut stack, &text)?;
            }
            Event::CData(data) => {
                push_text(&mut stack, &String::from_utf8_lossy(&data))?;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ApiError::Parse(format!("unclosed element <{}>", open.name)));
    }
    root.ok_or_else(|| ApiError::Parse("document has no root element".to_string()))
}

fn parse_error<E: std::fmt::Display>(reader: &Reader<&[u8]>, err: E) -> ApiError {
    ApiError::Parse(format!("at byte {}: {err}", reader.buffer_position()))
}

fn push_text(stack: &mut [Element], text: &str) -> Result<()> {
    match stack.last_mut() {
        Some(element) => {
            element.text.push_str(text);
            Ok(())
        }
        None if text.trim().is_empty() => Ok(()),
        None => Err(ApiError::Parse("text outside of the root element".to_string())),
    }
}

fn close(element: Element, stack: &mut [Element], root: &mut Option<Value>) {
    let name = element.name.clone();
    let value = element.flatten();
    match stack.last_mut() {
        Some(parent) => parent.children.push((name, value)),
        None => *root = Some(value),
    }
}

struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<(String, Value)>,
    text: String,
}

impl Element {
    fn open(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| ApiError::Parse(e.to_string()))?;
            let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
            let value = attr.unescape_value().map_err(|e| ApiError::Parse(e.to_string()))?;
            attributes.push((key, value.into_owned()));
        }
        Ok(Self {
            name,
            attributes,
            children: Vec::new(),
            text: String::new(),
        })
    }

    fn flatten(self) -> Value {
        let text = self.text.trim();
        if self.attributes.is_empty() && self.children.is_empty() {
            return Value::String(text.to_string());
        }
        if self.attributes.is_empty() && text.is_empty() && self.is_plural_wrapper() {
            return Value::Array(self.children.into_iter().map(|(_, value)| value).collect());
        }

        let mut members = self
            .attributes
            .into_iter()
            .map(|(key, value)| (key, Value::String(value)))
            .chain(self.children)
            .collect::<Vec<_>>();
        if !text.is_empty() {
            members.push((TEXT_KEY.to_string(), Value::String(text.to_string())));
        }
        Value::Object(group_members(members))
    }

    fn is_plural_wrapper(&self) -> bool {
        let Some((tag, _)) = self.children.first() else {
            return false;
        };
        let plural = self
            .name
            .strip_prefix(tag.as_str())
            .is_some_and(|suffix| suffix == "s" || suffix == "es");
        plural && self.children.iter().all(|(name, _)| name == tag)
    }
}

/// Builds the member map, turning names that occur more than once into
/// arrays in their original order. Collapsed wrappers are arrays too, so
/// repetition is counted here rather than read back from the values.
fn group_members(members: Vec<(String, Value)>) -> Map<String, Value> {
    let mut grouped: Vec<(String, Vec<Value>)> = Vec::new();
    for (key, value) in members {
        match grouped.iter_mut().find(|(name, _)| *name == key) {
            Some((_, values)) => values.push(value),
            None => grouped.push((key, vec![value])),
        }
    }
    grouped
        .into_iter()
        .map(|(key, mut values)| {
            let value = if values.len() == 1 {
                values.remove(0)
            } else {
                Value::Array(values)
            };
            (key, value)
        })
        .collect()
}
