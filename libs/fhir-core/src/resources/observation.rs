//! Observation: measurements and simple assertions about a subject

use crate::builder::{
    push_to, BackboneElementBuilder, Builder, DomainResourceBuilder, ElementBuilder,
};
use crate::choice::{decode_variant, encode_variant, Choice, ChoiceField, ChoiceGroup, ChoiceVariant};
use crate::datatypes::{CodeableConcept, Identifier, Period, Quantity, Reference};
use crate::element::{BackboneElement, DomainResource, Element};
use crate::error::Result;
use crate::field_list;
use crate::fields::{FieldList, FieldReader, FieldWriter, WireFields};
use crate::model::{Model, Resource};
use serde_json::Value;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Observation {
    pub domain: DomainResource,
    pub identifier: Option<Vec<Identifier>>,
    /// registered | preliminary | final | amended | ...
    pub status: Option<String>,
    pub status_ext: Option<Element>,
    pub category: Option<Vec<CodeableConcept>>,
    pub code: Option<CodeableConcept>,
    pub subject: Option<Reference>,
    pub effective: Option<Choice<ObservationEffective>>,
    pub issued: Option<String>,
    pub issued_ext: Option<Element>,
    pub value: Option<Choice<ObservationValue>>,
    pub data_absent_reason: Option<CodeableConcept>,
    pub component: Option<Vec<ObservationComponent>>,
}

impl Observation {
    pub fn builder() -> ObservationBuilder {
        ObservationBuilder::default()
    }

    pub fn value(&self) -> Option<&ObservationValue> {
        self.value.as_ref().and_then(Choice::value)
    }

    pub fn effective(&self) -> Option<&ObservationEffective> {
        self.effective.as_ref().and_then(Choice::value)
    }

    pub fn components(&self) -> &[ObservationComponent] {
        self.component.as_deref().unwrap_or(&[])
    }
}

/// `Observation.effective[x]`
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationEffective {
    DateTime(String),
    Period(Period),
    Instant(String),
}

impl ChoiceField for ObservationEffective {
    const GROUP: ChoiceGroup = ChoiceGroup::new(
        "effective",
        &[
            ChoiceVariant::primitive("DateTime"),
            ChoiceVariant::complex("Period"),
            ChoiceVariant::primitive("Instant"),
        ],
    );

    fn variant_name(&self) -> &'static str {
        match self {
            Self::DateTime(_) => "DateTime",
            Self::Period(_) => "Period",
            Self::Instant(_) => "Instant",
        }
    }

    fn to_wire_value(&self) -> Result<Value> {
        match self {
            Self::DateTime(v) | Self::Instant(v) => encode_variant(v),
            Self::Period(v) => v.to_json(),
        }
    }

    fn from_wire_value(variant: &str, value: Value) -> Result<Self> {
        let group = &Self::GROUP;
        Ok(match variant {
            "DateTime" => Self::DateTime(decode_variant(group, variant, value)?),
            "Period" => Self::Period(decode_variant(group, variant, value)?),
            "Instant" => Self::Instant(decode_variant(group, variant, value)?),
            other => return Err(group.unknown_variant(other)),
        })
    }
}

/// `Observation.value[x]`, also used by components
#[derive(Debug, Clone, PartialEq)]
pub enum ObservationValue {
    Quantity(Quantity),
    CodeableConcept(CodeableConcept),
    String(String),
    Boolean(bool),
    Integer(i64),
    Period(Period),
}

impl ChoiceField for ObservationValue {
    const GROUP: ChoiceGroup = ChoiceGroup::new(
        "value",
        &[
            ChoiceVariant::complex("Quantity"),
            ChoiceVariant::complex("CodeableConcept"),
            ChoiceVariant::primitive("String"),
            ChoiceVariant::primitive("Boolean"),
            ChoiceVariant::primitive("Integer"),
            ChoiceVariant::complex("Period"),
        ],
    );

    fn variant_name(&self) -> &'static str {
        match self {
            Self::Quantity(_) => "Quantity",
            Self::CodeableConcept(_) => "CodeableConcept",
            Self::String(_) => "String",
            Self::Boolean(_) => "Boolean",
            Self::Integer(_) => "Integer",
            Self::Period(_) => "Period",
        }
    }

    fn to_wire_value(&self) -> Result<Value> {
        match self {
            Self::Quantity(v) => v.to_json(),
            Self::CodeableConcept(v) => v.to_json(),
            Self::String(v) => encode_variant(v),
            Self::Boolean(v) => encode_variant(v),
            Self::Integer(v) => encode_variant(v),
            Self::Period(v) => v.to_json(),
        }
    }

    fn from_wire_value(variant: &str, value: Value) -> Result<Self> {
        let group = &Self::GROUP;
        Ok(match variant {
            "Quantity" => Self::Quantity(decode_variant(group, variant, value)?),
            "CodeableConcept" => Self::CodeableConcept(decode_variant(group, variant, value)?),
            "String" => Self::String(decode_variant(group, variant, value)?),
            "Boolean" => Self::Boolean(decode_variant(group, variant, value)?),
            "Integer" => Self::Integer(decode_variant(group, variant, value)?),
            "Period" => Self::Period(decode_variant(group, variant, value)?),
            other => return Err(group.unknown_variant(other)),
        })
    }
}

impl WireFields for Observation {
    fn write_fields(&self, out: &mut FieldWriter) -> Result<()> {
        self.domain.write_fields(out)?;
        out.put("identifier", &self.identifier)?;
        out.put("status", &self.status)?;
        out.put("_status", &self.status_ext)?;
        out.put("category", &self.category)?;
        out.put("code", &self.code)?;
        out.put("subject", &self.subject)?;
        out.put_choice(&self.effective)?;
        out.put("issued", &self.issued)?;
        out.put("_issued", &self.issued_ext)?;
        out.put_choice(&self.value)?;
        out.put("dataAbsentReason", &self.data_absent_reason)?;
        out.put("component", &self.component)
    }

    fn read_fields(input: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            domain: DomainResource::read_fields(input)?,
            identifier: input.take("identifier")?,
            status: input.take("status")?,
            status_ext: input.take_sidecar("status")?,
            category: input.take("category")?,
            code: input.take("code")?,
            subject: input.take("subject")?,
            effective: input.take_choice()?,
            issued: input.take("issued")?,
            issued_ext: input.take_sidecar("issued")?,
            value: input.take_choice()?,
            data_absent_reason: input.take("dataAbsentReason")?,
            component: input.take("component")?,
        })
    }
}

impl Model for Observation {
    const TYPE_NAME: &'static str = "Observation";
    const RESOURCE_TYPE: Option<&'static str> = Some("Observation");

    fn field_list() -> &'static FieldList {
        field_list!(FieldList::extending(DomainResource::field_list())
            .field("identifier")
            .primitive("status")
            .field("category")
            .field("code")
            .field("subject")
            .choice(&ObservationEffective::GROUP)
            .primitive("issued")
            .choice(&ObservationValue::GROUP)
            .field("dataAbsentReason")
            .field("component")
            .build())
    }

    fn choice_groups() -> &'static [ChoiceGroup] {
        const GROUPS: &[ChoiceGroup] = &[ObservationEffective::GROUP, ObservationValue::GROUP];
        GROUPS
    }
}

impl Resource for Observation {
    fn domain(&self) -> &DomainResource {
        &self.domain
    }
}

/// Component results, e.g. systolic and diastolic of one blood pressure
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObservationComponent {
    pub backbone: BackboneElement,
    pub code: Option<CodeableConcept>,
    pub value: Option<Choice<ObservationValue>>,
    pub data_absent_reason: Option<CodeableConcept>,
}

impl ObservationComponent {
    pub fn builder() -> ObservationComponentBuilder {
        ObservationComponentBuilder::default()
    }

    pub fn value(&self) -> Option<&ObservationValue> {
        self.value.as_ref().and_then(Choice::value)
    }
}

impl WireFields for ObservationComponent {
    fn write_fields(&self, out: &mut FieldWriter) -> Result<()> {
        self.backbone.write_fields(out)?;
        out.put("code", &self.code)?;
        out.put_choice(&self.value)?;
        out.put("dataAbsentReason", &self.data_absent_reason)
    }

    fn read_fields(input: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            backbone: BackboneElement::read_fields(input)?,
            code: input.take("code")?,
            value: input.take_choice()?,
            data_absent_reason: input.take("dataAbsentReason")?,
        })
    }
}

impl Model for ObservationComponent {
    const TYPE_NAME: &'static str = "Observation.component";

    fn field_list() -> &'static FieldList {
        field_list!(FieldList::extending(BackboneElement::field_list())
            .field("code")
            .choice(&ObservationValue::GROUP)
            .field("dataAbsentReason")
            .build())
    }

    fn choice_groups() -> &'static [ChoiceGroup] {
        const GROUPS: &[ChoiceGroup] = &[ObservationValue::GROUP];
        GROUPS
    }
}

crate::impl_wire_serde!(Observation, ObservationComponent);

#[derive(Debug, Default)]
pub struct ObservationBuilder {
    data: Observation,
}

impl ObservationBuilder {
    pub fn add_identifier(mut self, identifier: Identifier) -> Self {
        push_to(&mut self.data.identifier, identifier);
        self
    }

    pub fn set_status(mut self, status: impl Into<String>) -> Self {
        self.data.status = Some(status.into());
        self
    }

    /// Extensions on `status` (`_status`).
    pub fn set_status_extension(mut self, sidecar: Element) -> Self {
        self.data.status_ext = Some(sidecar);
        self
    }

    /// Extensions on `issued` (`_issued`).
    pub fn set_issued_extension(mut self, sidecar: Element) -> Self {
        self.data.issued_ext = Some(sidecar);
        self
    }

    pub fn add_category(mut self, category: CodeableConcept) -> Self {
        push_to(&mut self.data.category, category);
        self
    }

    pub fn set_code(mut self, code: CodeableConcept) -> Self {
        self.data.code = Some(code);
        self
    }

    pub fn set_subject(mut self, subject: Reference) -> Self {
        self.data.subject = Some(subject);
        self
    }

    pub fn set_effective(mut self, effective: ObservationEffective) -> Self {
        self.data.effective = Some(Choice::new(effective));
        self
    }

    pub fn set_effective_by_name(mut self, variant: &str, value: Value) -> Result<Self> {
        self.data.effective = Some(Choice::new(ObservationEffective::from_named(
            variant, value,
        )?));
        Ok(self)
    }

    pub fn set_issued(mut self, instant: impl Into<String>) -> Self {
        self.data.issued = Some(instant.into());
        self
    }

    /// Replaces whichever `value[x]` variant was set before.
    pub fn set_value(mut self, value: ObservationValue) -> Self {
        self.data.value = Some(Choice::new(value));
        self
    }

    /// Set `value[x]` including its sidecar, or a sidecar alone.
    pub fn set_value_choice(mut self, value: Choice<ObservationValue>) -> Self {
        self.data.value = Some(value);
        self
    }

    pub fn set_value_by_name(mut self, variant: &str, value: Value) -> Result<Self> {
        self.data.value = Some(Choice::new(ObservationValue::from_named(variant, value)?));
        Ok(self)
    }

    pub fn set_data_absent_reason(mut self, reason: CodeableConcept) -> Self {
        self.data.data_absent_reason = Some(reason);
        self
    }

    pub fn add_component(mut self, component: ObservationComponent) -> Self {
        push_to(&mut self.data.component, component);
        self
    }
}

impl Builder for ObservationBuilder {
    type Output = Observation;

    fn build(self) -> Observation {
        self.data
    }
}

impl ElementBuilder for ObservationBuilder {
    fn element_mut(&mut self) -> &mut Element {
        self.data.domain.element_mut()
    }
}

impl BackboneElementBuilder for ObservationBuilder {
    fn backbone_mut(&mut self) -> &mut BackboneElement {
        &mut self.data.domain.backbone
    }
}

impl DomainResourceBuilder for ObservationBuilder {
    fn domain_mut(&mut self) -> &mut DomainResource {
        &mut self.data.domain
    }
}

#[derive(Debug, Default)]
pub struct ObservationComponentBuilder {
    data: ObservationComponent,
}

impl ObservationComponentBuilder {
    pub fn set_code(mut self, code: CodeableConcept) -> Self {
        self.data.code = Some(code);
        self
    }

    pub fn set_value(mut self, value: ObservationValue) -> Self {
        self.data.value = Some(Choice::new(value));
        self
    }

    pub fn set_value_choice(mut self, value: Choice<ObservationValue>) -> Self {
        self.data.value = Some(value);
        self
    }

    pub fn set_value_by_name(mut self, variant: &str, value: Value) -> Result<Self> {
        self.data.value = Some(Choice::new(ObservationValue::from_named(variant, value)?));
        Ok(self)
    }

    pub fn set_data_absent_reason(mut self, reason: CodeableConcept) -> Self {
        self.data.data_absent_reason = Some(reason);
        self
    }
}

impl Builder for ObservationComponentBuilder {
    type Output = ObservationComponent;

    fn build(self) -> ObservationComponent {
        self.data
    }
}

impl ElementBuilder for ObservationComponentBuilder {
    fn element_mut(&mut self) -> &mut Element {
        &mut self.data.backbone.element
    }
}

impl BackboneElementBuilder for ObservationComponentBuilder {
    fn backbone_mut(&mut self) -> &mut BackboneElement {
        &mut self.data.backbone
    }
}
