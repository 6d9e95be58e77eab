//! Base layers shared by every concrete type
//!
//! `Element` → `BackboneElement` → `DomainResource`. Each layer holds its
//! ancestor by value and appends its own fields after the ancestor's, so a
//! concrete type's wire form always starts with the layered base fields.

use crate::datatypes::{Extension, Meta, Narrative};
use crate::error::Result;
use crate::fields::{FieldList, FieldReader, FieldWriter, WireFields};
use crate::field_list;
use crate::model::Model;
use serde_json::Value;

/// Leaf layer: identifier plus extensions.
///
/// Also the shape of every `_name` extension sidecar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub id: Option<String>,
    pub extension: Option<Vec<Extension>>,
}

impl Element {
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            extension: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.extension.is_none()
    }

    pub fn extensions(&self) -> &[Extension] {
        self.extension.as_deref().unwrap_or(&[])
    }

    /// First extension with the given url
    pub fn extension_by_url(&self, url: &str) -> Option<&Extension> {
        self.extensions()
            .iter()
            .find(|e| e.url.as_deref() == Some(url))
    }
}

impl WireFields for Element {
    fn write_fields(&self, out: &mut FieldWriter) -> Result<()> {
        out.put("id", &self.id)?;
        out.put("extension", &self.extension)
    }

    fn read_fields(input: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            id: input.take("id")?,
            extension: input.take("extension")?,
        })
    }
}

impl Model for Element {
    const TYPE_NAME: &'static str = "Element";

    fn field_list() -> &'static FieldList {
        field_list!(FieldList::builder().field("id").field("extension").build())
    }
}

crate::impl_wire_serde!(Element);

/// Composite layer for nested, named groupings inside a record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BackboneElement {
    pub element: Element,
    /// Extensions that change the meaning of sibling fields. Kept in order,
    /// never interpreted here.
    pub modifier_extension: Option<Vec<Extension>>,
}

impl BackboneElement {
    pub fn field_list() -> &'static FieldList {
        field_list!(FieldList::extending(Element::field_list())
            .field("modifierExtension")
            .build())
    }

    pub fn modifier_extensions(&self) -> &[Extension] {
        self.modifier_extension.as_deref().unwrap_or(&[])
    }
}

impl WireFields for BackboneElement {
    fn write_fields(&self, out: &mut FieldWriter) -> Result<()> {
        self.element.write_fields(out)?;
        out.put("modifierExtension", &self.modifier_extension)
    }

    fn read_fields(input: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            element: Element::read_fields(input)?,
            modifier_extension: input.take("modifierExtension")?,
        })
    }
}

/// Top-level record layer: metadata, narrative and contained records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DomainResource {
    pub backbone: BackboneElement,
    pub meta: Option<Meta>,
    pub implicit_rules: Option<String>,
    pub implicit_rules_ext: Option<Element>,
    pub language: Option<String>,
    pub language_ext: Option<Element>,
    pub text: Option<Narrative>,
    /// Embedded records of any kind, kept as opaque JSON
    pub contained: Option<Vec<Value>>,
}

impl DomainResource {
    pub fn field_list() -> &'static FieldList {
        field_list!(FieldList::extending(BackboneElement::field_list())
            .field("meta")
            .primitive("implicitRules")
            .primitive("language")
            .field("text")
            .field("contained")
            .build())
    }

    pub fn element(&self) -> &Element {
        &self.backbone.element
    }

    pub fn element_mut(&mut self) -> &mut Element {
        &mut self.backbone.element
    }

    pub fn contained(&self) -> &[Value] {
        self.contained.as_deref().unwrap_or(&[])
    }
}

impl WireFields for DomainResource {
    fn write_fields(&self, out: &mut FieldWriter) -> Result<()> {
        self.backbone.write_fields(out)?;
        out.put("meta", &self.meta)?;
        out.put("implicitRules", &self.implicit_rules)?;
        out.put("_implicitRules", &self.implicit_rules_ext)?;
        out.put("language", &self.language)?;
        out.put("_language", &self.language_ext)?;
        out.put("text", &self.text)?;
        out.put("contained", &self.contained)
    }

    fn read_fields(input: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            backbone: BackboneElement::read_fields(input)?,
            meta: input.take("meta")?,
            implicit_rules: input.take("implicitRules")?,
            implicit_rules_ext: input.take_sidecar("implicitRules")?,
            language: input.take("language")?,
            language_ext: input.take_sidecar("language")?,
            text: input.take("text")?,
            contained: input.take("contained")?,
        })
    }
}
