#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use ferrum_core::{
    field_list, BackboneElement, BackboneElementBuilder, Builder, ElementBuilder, FieldList,
    FieldReader, FieldWriter, Identifier, IssueCode, JsonObject, Model, ResourceValidator,
    Result, ValidationIssue, ValidationOutcome, WireFields,
};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

static TRACING: OnceLock<()> = OnceLock::new();

/// Route library logs to the test writer; filter with `RUST_LOG`.
pub fn init_tracing() {
    TRACING.get_or_init(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn object(value: Value) -> JsonObject {
    value
        .as_object()
        .cloned()
        .expect("fixture must be a JSON object")
}

pub fn keys(value: &Value) -> Vec<&str> {
    value
        .as_object()
        .expect("expected a JSON object")
        .keys()
        .map(String::as_str)
        .collect()
}

pub fn heart_rate_json() -> Value {
    serde_json::json!({
        "resourceType": "Observation",
        "id": "hr-1",
        "meta": {"profile": ["http://hl7.org/fhir/StructureDefinition/heartrate"]},
        "identifier": [{"system": "urn:x", "value": "123"}],
        "status": "final",
        "category": [{
            "coding": [{
                "system": "http://terminology.hl7.org/CodeSystem/observation-category",
                "code": "vital-signs"
            }]
        }],
        "code": {"coding": [{"system": "http://loinc.org", "code": "8867-4", "display": "Heart rate"}]},
        "subject": {"reference": "Patient/example"},
        "effectiveDateTime": "2024-03-01T09:30:00Z",
        "_effectiveDateTime": {"id": "eff"},
        "valueQuantity": {"value": 72, "unit": "beats/minute", "system": "http://unitsofmeasure.org", "code": "/min"}
    })
}

/// Minimal backbone-level type: `status` then `identifier`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registration {
    pub backbone: BackboneElement,
    pub status: Option<String>,
    pub identifier: Option<Vec<Identifier>>,
}

impl WireFields for Registration {
    fn write_fields(&self, out: &mut FieldWriter) -> Result<()> {
        self.backbone.write_fields(out)?;
        out.put("status", &self.status)?;
        out.put("identifier", &self.identifier)
    }

    fn read_fields(input: &mut FieldReader) -> Result<Self> {
        Ok(Self {
            backbone: BackboneElement::read_fields(input)?,
            status: input.take("status")?,
            identifier: input.take("identifier")?,
        })
    }
}

impl Model for Registration {
    const TYPE_NAME: &'static str = "Registration";

    fn field_list() -> &'static FieldList {
        field_list!(FieldList::extending(BackboneElement::field_list())
            .field("status")
            .field("identifier")
            .build())
    }
}

#[derive(Debug, Default)]
pub struct RegistrationBuilder {
    data: Registration,
}

impl RegistrationBuilder {
    pub fn set_status(mut self, status: impl Into<String>) -> Self {
        self.data.status = Some(status.into());
        self
    }

    pub fn add_identifier(mut self, identifier: Identifier) -> Self {
        ferrum_core::push_to(&mut self.data.identifier, identifier);
        self
    }
}

impl Builder for RegistrationBuilder {
    type Output = Registration;

    fn build(self) -> Registration {
        self.data
    }
}

impl ElementBuilder for RegistrationBuilder {
    fn element_mut(&mut self) -> &mut ferrum_core::Element {
        &mut self.data.backbone.element
    }
}

impl BackboneElementBuilder for RegistrationBuilder {
    fn backbone_mut(&mut self) -> &mut BackboneElement {
        &mut self.data.backbone
    }
}

/// Returns the same issues for every call and counts the calls.
pub struct StaticValidator {
    issues: Vec<ValidationIssue>,
    calls: Arc<AtomicUsize>,
}

impl StaticValidator {
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self {
            issues,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn passing() -> Self {
        Self::new(Vec::new())
    }

    pub fn with_error(diagnostics: &str) -> Self {
        Self::new(vec![ValidationIssue::error(IssueCode::Invalid, diagnostics)])
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl ResourceValidator for StaticValidator {
    async fn validate(&self, resource: &Value) -> Result<ValidationOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let resource_type = resource
            .get("resourceType")
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(ValidationOutcome::from_issues(
            resource_type,
            self.issues.clone(),
        ))
    }
}
