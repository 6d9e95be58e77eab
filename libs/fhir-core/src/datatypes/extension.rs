//! Extension: url plus an optional `value[x]`

use crate::builder::{push_to, Builder, ElementBuilder};
use crate::choice::{decode_variant, encode_variant, Choice, ChoiceField, ChoiceGroup, ChoiceVariant};
use crate::datatypes::{CodeableConcept, Coding, Identifier, Period, Quantity, Reference};
use crate::element::Element;
use crate::error::Result;
use crate::field_list;
use crate::fields::{FieldList, FieldReader, FieldWriter, WireFields};
use crate::model::Model;
use serde_json::{Number, Value};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extension {
    pub element: Element,
    /// Identifies the meaning of the extension
    pub url: Option<String>,
    pub value: Option<Choice<ExtensionValue>>,
}

impl Extension {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }

    pub fn with_value(mut self, value: ExtensionValue) -> Self {
        self.value = Some(Choice::new(value));
        self
    }

    pub fn value(&self) -> Option<&ExtensionValue> {
        self.value.as_ref().and_then(Choice::value)
    }
}

/// `Extension.value[x]`
#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionValue {
    Boolean(bool),
    Integer(i64),
    Decimal(Number),
    String(String),
    Code(String),
    Uri(String),
    DateTime(String),
    Coding(Coding),
    CodeableConcept(CodeableConcept),
    Quantity(Quantity),
    Reference(Reference),
    Identifier(Identifier),
    Period(Period),
}

impl ChoiceField for ExtensionValue {
    const GROUP: ChoiceGroup = ChoiceGroup::new(
        "value",
        &[
            ChoiceVariant::primitive("Boolean"),
            ChoiceVariant::primitive("Integer"),
            ChoiceVariant::primitive("Decimal"),
            ChoiceVariant::primitive("String"),
            ChoiceVariant::primitive("Code"),
            ChoiceVariant::primitive("Uri"),
            ChoiceVariant::primitive("DateTime"),
            ChoiceVariant::complex("Coding"),
            ChoiceVariant::complex("CodeableConcept"),
            ChoiceVariant::complex("Quantity"),
            ChoiceVariant::complex("Reference"),
            ChoiceVariant::complex("Identifier"),
            ChoiceVariant::complex("Period"),
        ],
    );

    fn variant_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "Boolean",
            Self::Integer(_) => "Integer",
            Self::Decimal(_) => "Decimal",
            Self::String(_) => "String",
            Self::Code(_) => "Code",
            Self::Uri(_) => "Uri",
            Self::DateTime(_) => "DateTime",
            Self::Coding(_) => "Coding",
            Self::CodeableConcept(_) => "CodeableConcept",
            Self::Quantity(_) => "Quantity",
            Self::Reference(_) => "Reference",
            Self::Identifier(_) => "Identifier",
            Self::Period(_) => "Period",
        }
    }

    fn to_wire_value(&self) -> Result<Value> {
        match self {
            Self::Boolean(v) => encode_variant(v),
            Self::Integer(v) => encode_variant(v),
            Self::Decimal(v) => encode_variant(v),
            Self::String(v) | Self::Code(v) | Self::Uri(v) | Self::DateTime(v) => encode_variant(v),
            Self::Coding(v) => v.to_json(),
            Self::CodeableConcept(v) => v.to_json(),
            Self::Quantity(v) => v.to_json(),
            Self::Reference(v) => v.to_json(),
            Self::Identifier(v) => v.to_json(),
            Self::Period(v) => v.to_json(),
        }
    }

    fn from_wire_value(variant: &str, value: Value) -> Result<Self> {
        let group = &Self::GROUP;
        Ok(match variant {
            "Boolean" => Self::Boolean(decode_variant(group, variant, value)?),
            "Integer" => Self::Integer(decode_variant(group, variant, value)?),
            "Decimal" => Self::Decimal(decode_variant(group, variant, value)?),
            "String" => Self::String(decode_variant(group, variant, value)?),
            "Code" => Self::Code(decode_variant(group, variant, value)?),
            "Uri" => Self::Uri(decode_variant(group, variant, value)?),
            "DateTime" => Self::DateTime(decode_variant(group, variant, value)?),
            "Coding" => Self::Coding(decode_variant(group, variant, value)?),
            "CodeableConcept" => Self::CodeableConcept(decode_variant(group, variant, value)?),
            "Quantity" => Self::Quantity(decode_variant(group, variant, value)?),
            "Reference" => Self::Reference(decode_variant(group, variant, value)?),
            "Identifier" => Self::Identifier(decode_variant(group, variant, value)?),
            "Period" => Self::Period(decode_variant(group, variant, value)?),
            other => return Err(group.unknown_variant(other)),
        })
    }
}

impl WireFields for Extension {
    fn write_fields(&self, out: &mut FieldWriter) -> Result<()> {
        self.element.write_fields(out)?;
        out.put("url", &self.url)?;
        out.put_choice(&self.value)
    }

    fn read_fields(input: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            element: Element::read_fields(input)?,
            url: input.take("url")?,
            value: input.take_choice()?,
        })
    }
}

impl Model for Extension {
    const TYPE_NAME: &'static str = "Extension";

    fn field_list() -> &'static FieldList {
        field_list!(FieldList::extending(Element::field_list())
            .field("url")
            .choice(&ExtensionValue::GROUP)
            .build())
    }

    fn choice_groups() -> &'static [ChoiceGroup] {
        const GROUPS: &[ChoiceGroup] = &[ExtensionValue::GROUP];
        GROUPS
    }
}

crate::impl_wire_serde!(Extension);

#[derive(Debug, Default)]
pub struct ExtensionBuilder {
    data: Extension,
}

impl ExtensionBuilder {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            data: Extension::new(url),
        }
    }

    pub fn set_value(mut self, value: ExtensionValue) -> Self {
        self.data.value = Some(Choice::new(value));
        self
    }

    /// Set `value[x]` from a variant name and its wire value.
    pub fn set_value_by_name(mut self, variant: &str, value: Value) -> Result<Self> {
        self.data.value = Some(Choice::new(ExtensionValue::from_named(variant, value)?));
        Ok(self)
    }

    /// Nested extensions go on the element layer.
    pub fn add_nested(mut self, extension: Extension) -> Self {
        push_to(&mut self.data.element.extension, extension);
        self
    }
}

impl Builder for ExtensionBuilder {
    type Output = Extension;

    fn build(self) -> Extension {
        self.data
    }
}

impl ElementBuilder for ExtensionBuilder {
    fn element_mut(&mut self) -> &mut Element {
        &mut self.data.element
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extension_wire_order() {
        let ext = ExtensionBuilder::new("http://example.org/flag")
            .set_value(ExtensionValue::Boolean(false))
            .set_id("e1")
            .build();

        let json = ext.to_json().unwrap();
        assert_eq!(
            json.as_object().unwrap().keys().collect::<Vec<_>>(),
            vec!["id", "url", "valueBoolean"]
        );
        assert_eq!(json["valueBoolean"], json!(false));
    }

    #[test]
    fn test_extension_value_by_name() {
        let ext = ExtensionBuilder::new("http://example.org/count")
            .set_value_by_name("Integer", json!(0))
            .unwrap()
            .build();
        assert_eq!(ext.value(), Some(&ExtensionValue::Integer(0)));

        let err = ExtensionBuilder::new("http://example.org/x")
            .set_value_by_name("Ratio", json!({}))
            .unwrap_err();
        assert!(matches!(err, crate::Error::UnknownChoiceVariant { .. }));
    }

    #[test]
    fn test_decimal_keeps_number_shape() {
        let ext = Extension::from_json(&json!({"url": "u", "valueDecimal": 2})).unwrap();
        assert_eq!(ext.to_json().unwrap()["valueDecimal"], json!(2));
    }
}
