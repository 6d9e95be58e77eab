//! Record-level metadata and narrative

use crate::datatypes::Coding;
use crate::element::Element;
use crate::error::Result;
use crate::field_list;
use crate::fields::{FieldList, FieldReader, FieldWriter, WireFields};
use crate::model::Model;

/// Metadata about a record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Meta {
    pub element: Element,
    pub version_id: Option<String>,
    pub last_updated: Option<String>,
    pub source: Option<String>,
    /// Profiles the record claims to conform to
    pub profile: Option<Vec<String>>,
    pub security: Option<Vec<Coding>>,
    pub tag: Option<Vec<Coding>>,
}

impl Meta {
    pub fn with_profile(profile: impl Into<String>) -> Self {
        Self {
            profile: Some(vec![profile.into()]),
            ..Default::default()
        }
    }

    pub fn profiles(&self) -> &[String] {
        self.profile.as_deref().unwrap_or(&[])
    }
}

impl WireFields for Meta {
    fn write_fields(&self, out: &mut FieldWriter) -> Result<()> {
        self.element.write_fields(out)?;
        out.put("versionId", &self.version_id)?;
        out.put("lastUpdated", &self.last_updated)?;
        out.put("source", &self.source)?;
        out.put("profile", &self.profile)?;
        out.put("security", &self.security)?;
        out.put("tag", &self.tag)
    }

    fn read_fields(input: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            element: Element::read_fields(input)?,
            version_id: input.take("versionId")?,
            last_updated: input.take("lastUpdated")?,
            source: input.take("source")?,
            profile: input.take("profile")?,
            security: input.take("security")?,
            tag: input.take("tag")?,
        })
    }
}

impl Model for Meta {
    const TYPE_NAME: &'static str = "Meta";

    fn field_list() -> &'static FieldList {
        field_list!(FieldList::extending(Element::field_list())
            .field("versionId")
            .field("lastUpdated")
            .field("source")
            .field("profile")
            .field("security")
            .field("tag")
            .build())
    }
}

/// Human-readable summary of a record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Narrative {
    pub element: Element,
    /// generated | extensions | additional | empty
    pub status: Option<String>,
    /// Limited XHTML content, kept verbatim
    pub div: Option<String>,
}

impl Narrative {
    pub fn generated(div: impl Into<String>) -> Self {
        Self {
            element: Element::default(),
            status: Some("generated".to_string()),
            div: Some(div.into()),
        }
    }
}

impl WireFields for Narrative {
    fn write_fields(&self, out: &mut FieldWriter) -> Result<()> {
        self.element.write_fields(out)?;
        out.put("status", &self.status)?;
        out.put("div", &self.div)
    }

    fn read_fields(input: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            element: Element::read_fields(input)?,
            status: input.take("status")?,
            div: input.take("div")?,
        })
    }
}

impl Model for Narrative {
    const TYPE_NAME: &'static str = "Narrative";

    fn field_list() -> &'static FieldList {
        field_list!(FieldList::extending(Element::field_list())
            .field("status")
            .field("div")
            .build())
    }
}

crate::impl_wire_serde!(Meta, Narrative);
