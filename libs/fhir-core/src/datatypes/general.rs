//! General-purpose data types

use crate::element::Element;
use crate::error::Result;
use crate::field_list;
use crate::fields::{FieldList, FieldReader, FieldWriter, WireFields};
use crate::model::Model;
use serde_json::Number;

/// A code defined by a terminology system
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Coding {
    pub element: Element,
    pub system: Option<String>,
    pub version: Option<String>,
    pub code: Option<String>,
    pub display: Option<String>,
    pub user_selected: Option<bool>,
}

impl Coding {
    pub fn new(system: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            code: Some(code.into()),
            ..Default::default()
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display = Some(display.into());
        self
    }
}

impl WireFields for Coding {
    fn write_fields(&self, out: &mut FieldWriter) -> Result<()> {
        self.element.write_fields(out)?;
        out.put("system", &self.system)?;
        out.put("version", &self.version)?;
        out.put("code", &self.code)?;
        out.put("display", &self.display)?;
        out.put("userSelected", &self.user_selected)
    }

    fn read_fields(input: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            element: Element::read_fields(input)?,
            system: input.take("system")?,
            version: input.take("version")?,
            code: input.take("code")?,
            display: input.take("display")?,
            user_selected: input.take("userSelected")?,
        })
    }
}

impl Model for Coding {
    const TYPE_NAME: &'static str = "Coding";

    fn field_list() -> &'static FieldList {
        field_list!(FieldList::extending(Element::field_list())
            .field("system")
            .field("version")
            .field("code")
            .field("display")
            .field("userSelected")
            .build())
    }
}

/// Concept given by codings and/or text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CodeableConcept {
    pub element: Element,
    pub coding: Option<Vec<Coding>>,
    pub text: Option<String>,
}

impl CodeableConcept {
    pub fn from_coding(coding: Coding) -> Self {
        Self {
            coding: Some(vec![coding]),
            ..Default::default()
        }
    }

    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    pub fn codings(&self) -> &[Coding] {
        self.coding.as_deref().unwrap_or(&[])
    }

    /// Whether any coding matches `system` and `code`.
    pub fn has_coding(&self, system: &str, code: &str) -> bool {
        self.codings()
            .iter()
            .any(|c| c.system.as_deref() == Some(system) && c.code.as_deref() == Some(code))
    }
}

impl WireFields for CodeableConcept {
    fn write_fields(&self, out: &mut FieldWriter) -> Result<()> {
        self.element.write_fields(out)?;
        out.put("coding", &self.coding)?;
        out.put("text", &self.text)
    }

    fn read_fields(input: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            element: Element::read_fields(input)?,
            coding: input.take("coding")?,
            text: input.take("text")?,
        })
    }
}

impl Model for CodeableConcept {
    const TYPE_NAME: &'static str = "CodeableConcept";

    fn field_list() -> &'static FieldList {
        field_list!(FieldList::extending(Element::field_list())
            .field("coding")
            .field("text")
            .build())
    }
}

/// Business identifier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Identifier {
    pub element: Element,
    /// usual | official | temp | secondary | old
    pub use_: Option<String>,
    pub type_: Option<CodeableConcept>,
    /// Namespace of the identifier value
    pub system: Option<String>,
    pub value: Option<String>,
    pub period: Option<Period>,
}

impl Identifier {
    pub fn new(system: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            value: Some(value.into()),
            ..Default::default()
        }
    }
}

impl WireFields for Identifier {
    fn write_fields(&self, out: &mut FieldWriter) -> Result<()> {
        self.element.write_fields(out)?;
        out.put("use", &self.use_)?;
        out.put("type", &self.type_)?;
        out.put("system", &self.system)?;
        out.put("value", &self.value)?;
        out.put("period", &self.period)
    }

    fn read_fields(input: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            element: Element::read_fields(input)?,
            use_: input.take("use")?,
            type_: input.take("type")?,
            system: input.take("system")?,
            value: input.take("value")?,
            period: input.take("period")?,
        })
    }
}

impl Model for Identifier {
    const TYPE_NAME: &'static str = "Identifier";

    fn field_list() -> &'static FieldList {
        field_list!(FieldList::extending(Element::field_list())
            .field("use")
            .field("type")
            .field("system")
            .field("value")
            .field("period")
            .build())
    }
}

/// Measured amount
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Quantity {
    pub element: Element,
    pub value: Option<Number>,
    /// < | <= | >= | >
    pub comparator: Option<String>,
    pub unit: Option<String>,
    pub system: Option<String>,
    pub code: Option<String>,
}

impl Quantity {
    /// UCUM quantity with `unit` doubling as the code.
    pub fn ucum(value: impl Into<Number>, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        Self {
            value: Some(value.into()),
            system: Some("http://unitsofmeasure.org".to_string()),
            code: Some(unit.clone()),
            unit: Some(unit),
            ..Default::default()
        }
    }

    pub fn value_f64(&self) -> Option<f64> {
        self.value.as_ref().and_then(Number::as_f64)
    }
}

impl WireFields for Quantity {
    fn write_fields(&self, out: &mut FieldWriter) -> Result<()> {
        self.element.write_fields(out)?;
        out.put("value", &self.value)?;
        out.put("comparator", &self.comparator)?;
        out.put("unit", &self.unit)?;
        out.put("system", &self.system)?;
        out.put("code", &self.code)
    }

    fn read_fields(input: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            element: Element::read_fields(input)?,
            value: input.take("value")?,
            comparator: input.take("comparator")?,
            unit: input.take("unit")?,
            system: input.take("system")?,
            code: input.take("code")?,
        })
    }
}

impl Model for Quantity {
    const TYPE_NAME: &'static str = "Quantity";

    fn field_list() -> &'static FieldList {
        field_list!(FieldList::extending(Element::field_list())
            .field("value")
            .field("comparator")
            .field("unit")
            .field("system")
            .field("code")
            .build())
    }
}

/// Reference from one record to another
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reference {
    pub element: Element,
    /// Literal reference, relative or absolute URL
    pub reference: Option<String>,
    pub type_: Option<String>,
    /// Logical reference, when the literal one is unknown
    pub identifier: Option<Identifier>,
    pub display: Option<String>,
}

impl Reference {
    pub fn to(reference: impl Into<String>) -> Self {
        Self {
            reference: Some(reference.into()),
            ..Default::default()
        }
    }
}

impl WireFields for Reference {
    fn write_fields(&self, out: &mut FieldWriter) -> Result<()> {
        self.element.write_fields(out)?;
        out.put("reference", &self.reference)?;
        out.put("type", &self.type_)?;
        out.put("identifier", &self.identifier)?;
        out.put("display", &self.display)
    }

    fn read_fields(input: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            element: Element::read_fields(input)?,
            reference: input.take("reference")?,
            type_: input.take("type")?,
            identifier: input.take("identifier")?,
            display: input.take("display")?,
        })
    }
}

impl Model for Reference {
    const TYPE_NAME: &'static str = "Reference";

    fn field_list() -> &'static FieldList {
        field_list!(FieldList::extending(Element::field_list())
            .field("reference")
            .field("type")
            .field("identifier")
            .field("display")
            .build())
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Period {
    pub element: Element,
    pub start: Option<String>,
    pub end: Option<String>,
}

impl Period {
    pub fn new(start: Option<String>, end: Option<String>) -> Self {
        Self {
            element: Element::default(),
            start,
            end,
        }
    }
}

impl WireFields for Period {
    fn write_fields(&self, out: &mut FieldWriter) -> Result<()> {
        self.element.write_fields(out)?;
        out.put("start", &self.start)?;
        out.put("end", &self.end)
    }

    fn read_fields(input: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            element: Element::read_fields(input)?,
            start: input.take("start")?,
            end: input.take("end")?,
        })
    }
}

impl Model for Period {
    const TYPE_NAME: &'static str = "Period";

    fn field_list() -> &'static FieldList {
        field_list!(FieldList::extending(Element::field_list())
            .field("start")
            .field("end")
            .build())
    }
}

crate::impl_wire_serde!(Coding, CodeableConcept, Identifier, Quantity, Reference, Period);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_identifier_keyword_fields() {
        let input = json!({
            "value": "123",
            "use": "official",
            "type": {"text": "MRN"},
            "system": "urn:x"
        });

        let identifier = Identifier::from_json(&input).unwrap();
        assert_eq!(identifier.use_.as_deref(), Some("official"));
        assert_eq!(identifier.type_.as_ref().unwrap().text.as_deref(), Some("MRN"));

        let out = identifier.to_json().unwrap();
        assert_eq!(
            out.as_object().unwrap().keys().collect::<Vec<_>>(),
            vec!["use", "type", "system", "value"]
        );
    }

    #[test]
    fn test_nested_types_drop_unknown_keys() {
        let input = json!({
            "coding": [{"system": "http://loinc.org", "code": "8867-4", "rank": 1}],
            "text": "Heart rate"
        });

        let concept = CodeableConcept::from_json(&input).unwrap();
        assert!(concept.has_coding("http://loinc.org", "8867-4"));
        assert_eq!(
            concept.to_json().unwrap(),
            json!({"coding": [{"system": "http://loinc.org", "code": "8867-4"}], "text": "Heart rate"})
        );
    }

    #[test]
    fn test_quantity_ucum() {
        let q = Quantity::ucum(72, "/min");
        assert_eq!(q.value_f64(), Some(72.0));
        assert_eq!(
            q.to_json().unwrap(),
            json!({"value": 72, "unit": "/min", "system": "http://unitsofmeasure.org", "code": "/min"})
        );
    }

    #[test]
    fn test_invalid_nested_value_reports_path() {
        let err = Reference::from_json(&json!({"identifier": {"value": 5}})).unwrap_err();
        assert!(matches!(err, crate::Error::InvalidField { ref field, .. } if field == "Reference.identifier"));
    }
}
