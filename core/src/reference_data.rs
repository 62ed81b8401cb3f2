//! Reference data lists and their XML upload format.
//!
//! A list renders as
//!
//! ```xml
//! <?xml version="1.0" encoding="utf-8"?>
//! <List Name="Sites"><Columns><c>Code</c><c>City</c></Columns><Rows><r><v>S1</v><v>Oslo</v></r></Rows></List>
//! ```
//!
//! Root attributes are written in a fixed order and only when set to a
//! non-empty value.

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, Result};

/// A reference data list to upload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceData {
    #[serde(rename = "Name", default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "UserGroup", default, skip_serializing_if = "Option::is_none")]
    pub user_group: Option<String>,
    #[serde(rename = "UserGroupColumn", default, skip_serializing_if = "Option::is_none")]
    pub user_group_column: Option<String>,
    #[serde(rename = "Department", default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(rename = "Action", default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<String>>,
}

impl ReferenceData {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Root attributes in their fixed order; unset and empty values are
    /// left out.
    fn root_attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        [
            ("Name", self.name.as_deref()),
            ("UserGroup", self.user_group.as_deref()),
            ("UserGroupColumn", self.user_group_column.as_deref()),
            ("Department", self.department.as_deref()),
            ("Action", self.action.as_deref()),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.filter(|v| !v.is_empty()).map(|v| (name, v)))
    }

    /// Renders the upload document, declaring `encoding` in the prolog.
    ///
    /// Fails with `ApiError::Serialization` if any value contains a
    /// character XML 1.0 cannot represent, or if `encoding` is not a valid
    /// encoding name.
    pub fn to_xml(&self, encoding: &str) -> Result<String> {
        if !is_encoding_name(encoding) {
            return Err(ApiError::Serialization(format!("invalid encoding name {encoding:?}")));
        }
        let attributes = self.root_attributes().collect::<Vec<_>>();
        for (_, value) in &attributes {
            check_chars(value)?;
        }

        let mut writer = Writer::new(Vec::new());
        write(&mut writer, Event::Decl(BytesDecl::new("1.0", Some(encoding), None)))?;
        write(&mut writer, Event::Start(BytesStart::new("List").with_attributes(attributes)))?;
        write_list(&mut writer, "Columns", "c", &self.columns)?;
        if self.rows.is_empty() {
            write(&mut writer, Event::Empty(BytesStart::new("Rows")))?;
        } else {
            write(&mut writer, Event::Start(BytesStart::new("Rows")))?;
            for row in &self.rows {
                write_list(&mut writer, "r", "v", row)?;
            }
            write(&mut writer, Event::End(BytesEnd::new("Rows")))?;
        }
        write(&mut writer, Event::End(BytesEnd::new("List")))?;

        String::from_utf8(writer.into_inner()).map_err(|e| ApiError::Serialization(e.to_string()))
    }
}

/// Writes `<{tag}>` holding one `<{item}>` per value, or `<{tag}/>` when
/// there are none. Empty values become `<{item}/>`.
fn write_list(writer: &mut Writer<Vec<u8>>, tag: &str, item: &str, values: &[String]) -> Result<()> {
    if values.is_empty() {
        return write(writer, Event::Empty(BytesStart::new(tag)));
    }
    write(writer, Event::Start(BytesStart::new(tag)))?;
    for value in values {
        check_chars(value)?;
        if value.is_empty() {
            write(writer, Event::Empty(BytesStart::new(item)))?;
        } else {
            write(writer, Event::Start(BytesStart::new(item)))?;
            write(writer, Event::Text(BytesText::new(value)))?;
            write(writer, Event::End(BytesEnd::new(item)))?;
        }
    }
    write(writer, Event::End(BytesEnd::new(tag)))
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| ApiError::Serialization(e.to_string()))
}

fn check_chars(value: &str) -> Result<()> {
    match value.chars().find(|c| !is_xml_char(*c)) {
        Some(bad) => Err(ApiError::Serialization(format!(
            "character U+{:04X} is not allowed in XML",
            bad as u32
        ))),
        None => Ok(()),
    }
}

/// The XML 1.0 `EncName` production.
fn is_encoding_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
}

/// The XML 1.0 `Char` production.
fn is_xml_char(c: char) -> bool {
    matches!(c,
        '\u{9}' | '\u{A}' | '\u{D}'
        | '\u{20}'..='\u{D7FF}'
        | '\u{E000}'..='\u{FFFD}'
        | '\u{10000}'..='\u{10FFFF}')
}
