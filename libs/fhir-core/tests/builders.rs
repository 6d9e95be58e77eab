//! Builder hierarchy tests

use ferrum_core::prelude::*;
use ferrum_core::{
    push_to, CodeableConcept, Coding, Extension, Identifier, Meta, Narrative, Observation,
    ObservationComponent, ObservationEffective, ObservationValue, Period, Quantity, Reference,
};
use serde_json::json;
mod test_support;

use test_support::{keys, RegistrationBuilder};

#[test]
fn test_minimal_type_serializes_exactly() {
    let registration = RegistrationBuilder::default()
        .set_status("active")
        .add_identifier(Identifier::new("urn:x", "123"))
        .build();

    let json = registration.to_json_string().unwrap();
    assert_eq!(
        json,
        r#"{"status":"active","identifier":[{"system":"urn:x","value":"123"}]}"#
    );
}

#[test]
fn test_setter_call_order_does_not_affect_output_order() {
    let registration = RegistrationBuilder::default()
        .add_identifier(Identifier::new("urn:x", "123"))
        .set_status("active")
        .add_modifier_extension(Extension::new("http://example.org/m"))
        .set_id("r1")
        .build();

    let json = registration.to_json().unwrap();
    assert_eq!(
        keys(&json),
        vec!["id", "modifierExtension", "status", "identifier"]
    );
}

#[test]
fn test_array_setters_append_in_order() {
    let mut slot: Option<Vec<&str>> = None;
    push_to(&mut slot, "a");
    push_to(&mut slot, "b");
    push_to(&mut slot, "c");
    assert_eq!(slot, Some(vec!["a", "b", "c"]));

    let obs = Observation::builder()
        .add_identifier(Identifier::new("urn:x", "a"))
        .add_identifier(Identifier::new("urn:x", "b"))
        .add_identifier(Identifier::new("urn:x", "c"))
        .build();
    let values: Vec<&str> = obs
        .identifier
        .as_deref()
        .unwrap()
        .iter()
        .filter_map(|i| i.value.as_deref())
        .collect();
    assert_eq!(values, vec!["a", "b", "c"]);
}

#[test]
fn test_domain_resource_setters() {
    let patient = json!({"resourceType": "Patient", "id": "p1"});
    let obs = Observation::builder()
        .set_text(Narrative::generated("<div xmlns=\"http://www.w3.org/1999/xhtml\">72 bpm</div>"))
        .set_language("en")
        .set_meta(Meta::with_profile("http://example.org/profile"))
        .set_implicit_rules("http://example.org/rules")
        .add_contained_json(patient.clone())
        .add_extension(Extension::new("http://example.org/e"))
        .set_id("o1")
        .build();

    let json = obs.to_json().unwrap();
    assert_eq!(
        keys(&json),
        vec![
            "resourceType",
            "id",
            "extension",
            "meta",
            "implicitRules",
            "language",
            "text",
            "contained"
        ]
    );
    assert_eq!(json["contained"][0], patient);
    assert_eq!(obs.domain.meta.as_ref().unwrap().profiles(), ["http://example.org/profile"]);
}

#[test]
fn test_add_contained_model() {
    let inner = Observation::builder().set_id("inner").set_status("final").build();
    let outer = Observation::builder()
        .add_contained(&inner)
        .unwrap()
        .build();

    assert_eq!(
        outer.domain().contained(),
        [json!({"resourceType": "Observation", "id": "inner", "status": "final"})]
    );
}

#[test]
fn test_full_observation_with_components() {
    let systolic = ObservationComponent::builder()
        .set_code(CodeableConcept::from_coding(Coding::new("http://loinc.org", "8480-6")))
        .set_value(ObservationValue::Quantity(Quantity::ucum(120, "mm[Hg]")))
        .build();
    let diastolic = ObservationComponent::builder()
        .set_code(CodeableConcept::from_coding(Coding::new("http://loinc.org", "8462-4")))
        .set_value(ObservationValue::Quantity(Quantity::ucum(80, "mm[Hg]")))
        .build();

    let obs = Observation::builder()
        .set_status("final")
        .set_code(CodeableConcept::from_coding(
            Coding::new("http://loinc.org", "85354-9").with_display("Blood pressure"),
        ))
        .set_subject(Reference::to("Patient/example"))
        .set_effective(ObservationEffective::Period(Period::new(
            Some("2024-03-01T09:00:00Z".to_string()),
            None,
        )))
        .add_component(systolic)
        .add_component(diastolic)
        .build();

    let json = obs.to_json().unwrap();
    assert_eq!(
        keys(&json),
        vec!["resourceType", "status", "code", "subject", "effectivePeriod", "component"]
    );
    assert_eq!(json["component"][1]["valueQuantity"]["value"], 80);

    let parsed = Observation::from_json(&json).unwrap();
    assert_eq!(parsed, obs);
    assert!(parsed.components()[0]
        .code
        .as_ref()
        .unwrap()
        .has_coding("http://loinc.org", "8480-6"));
}

#[test]
fn test_status_extension_setter() {
    let sidecar = ferrum_core::Element {
        id: None,
        extension: Some(vec![Extension::new("http://example.org/reason")]),
    };
    let obs = Observation::builder()
        .set_status_extension(sidecar)
        .set_status("preliminary")
        .build();

    assert_eq!(
        keys(&obs.to_json().unwrap()),
        vec!["resourceType", "status", "_status"]
    );
}
