//! Choice-field exclusivity and sidecar tests

use ferrum_core::prelude::*;
use ferrum_core::{
    Choice, ChoiceGroup, Element, Error, Extension, ExtensionValue, JsonObject, Observation,
    ObservationValue, Quantity,
};
use serde_json::json;
mod test_support;

use test_support::{keys, object};

fn value_group() -> ChoiceGroup {
    ObservationValue::GROUP
}

#[test]
fn test_setting_a_variant_clears_the_previous_one() {
    let group = value_group();
    let mut staging = JsonObject::new();

    group
        .set_variant(&mut staging, "Quantity", json!({"value": 1}))
        .unwrap();
    group
        .set_variant(&mut staging, "String", json!("high"))
        .unwrap();
    group
        .set_variant_sidecar(&mut staging, "String", json!({"id": "s"}))
        .unwrap();

    assert!(!staging.contains_key("valueQuantity"));
    assert_eq!(
        staging.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["valueString", "_valueString"]
    );
}

#[test]
fn test_switching_away_drops_the_old_sidecar() {
    let group = value_group();
    let mut staging = object(json!({"valueString": "x", "_valueString": {"id": "s"}}));

    group
        .set_variant(&mut staging, "Boolean", json!(true))
        .unwrap();

    assert_eq!(
        staging.keys().map(String::as_str).collect::<Vec<_>>(),
        vec!["valueBoolean"]
    );
}

#[test]
fn test_unknown_variant_name_fails() {
    let mut staging = JsonObject::new();
    let err = value_group()
        .set_variant(&mut staging, "Ratio", json!({}))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownChoiceVariant { group: "value", ref variant } if variant == "Ratio"));
}

#[test]
fn test_sidecar_only_on_primitive_variants() {
    let mut staging = JsonObject::new();
    let err = value_group()
        .set_variant_sidecar(&mut staging, "Quantity", json!({"id": "q"}))
        .unwrap_err();
    assert!(matches!(err, Error::SidecarNotAllowed { group: "value", variant: "Quantity" }));
}

#[test]
fn test_two_variants_on_input_are_rejected() {
    let input = json!({
        "resourceType": "Observation",
        "valueQuantity": {"value": 1},
        "valueString": "also"
    });

    let err = Observation::from_json(&input).unwrap_err();
    match err {
        Error::ConflictingChoiceVariants { group, variants } => {
            assert_eq!(group, "value");
            assert_eq!(variants, vec!["valueQuantity", "valueString"]);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_primitive_variant_with_sidecar_round_trips() {
    let input = json!({
        "resourceType": "Observation",
        "valueString": "positive",
        "_valueString": {
            "extension": [{"url": "http://example.org/source", "valueCode": "lab"}]
        }
    });

    let obs = Observation::from_json(&input).unwrap();
    let choice = obs.value.as_ref().unwrap();
    assert_eq!(choice.variant(), "String");
    assert_eq!(choice.wire_key(), "valueString");
    assert_eq!(
        choice
            .sidecar()
            .unwrap()
            .extension_by_url("http://example.org/source")
            .and_then(Extension::value),
        Some(&ExtensionValue::Code("lab".to_string()))
    );
    assert_eq!(obs.to_json().unwrap(), input);
}

#[test]
fn test_sidecar_without_value_round_trips() {
    let input = json!({
        "resourceType": "Observation",
        "_valueBoolean": {"extension": [{"url": "http://example.org/data-absent", "valueCode": "unknown"}]}
    });

    let obs = Observation::from_json(&input).unwrap();
    assert!(obs.value().is_none());
    assert_eq!(obs.value.as_ref().unwrap().variant(), "Boolean");
    assert_eq!(obs.to_json().unwrap(), input);
}

#[test]
fn test_builder_setters_replace_variant() {
    let obs = Observation::builder()
        .set_value(ObservationValue::Quantity(Quantity::ucum(1, "mg")))
        .set_value(ObservationValue::String("trace".to_string()))
        .build();

    let json = obs.to_json().unwrap();
    assert_eq!(keys(&json), vec!["resourceType", "valueString"]);
}

#[test]
fn test_builder_by_name_setter() {
    let obs = Observation::builder()
        .set_value_by_name("CodeableConcept", json!({"text": "negative"}))
        .unwrap()
        .build();
    assert!(matches!(obs.value(), Some(ObservationValue::CodeableConcept(c)) if c.text.as_deref() == Some("negative")));

    let err = Observation::builder()
        .set_value_by_name("Attachment", json!({}))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownChoiceVariant { .. }));

    let err = Observation::builder()
        .set_value_by_name("Integer", json!("seven"))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidField { ref field, .. } if field == "valueInteger"));
}

#[test]
fn test_builder_choice_with_sidecar() {
    let sidecar = Element {
        id: None,
        extension: Some(vec![Extension::new("http://example.org/note")
            .with_value(ExtensionValue::String("estimated".to_string()))]),
    };
    let choice = Choice::new(ObservationValue::Integer(3))
        .with_sidecar(sidecar)
        .unwrap();

    let obs = Observation::builder().set_value_choice(choice).build();
    let json = obs.to_json().unwrap();
    assert_eq!(keys(&json), vec!["resourceType", "valueInteger", "_valueInteger"]);
    assert_eq!(
        json["_valueInteger"]["extension"][0]["valueString"],
        "estimated"
    );
}

#[test]
fn test_with_choice_variant_returns_new_instance() {
    let original = Observation::builder()
        .set_value(ObservationValue::Quantity(Quantity::ucum(1, "mg")))
        .build();

    let updated = original
        .with_choice_variant("value", "Boolean", json!(true))
        .unwrap();

    assert_eq!(updated.value(), Some(&ObservationValue::Boolean(true)));
    assert!(matches!(original.value(), Some(ObservationValue::Quantity(_))));

    let err = original
        .with_choice_variant("onset", "String", json!("x"))
        .unwrap_err();
    assert!(matches!(err, Error::UnknownChoiceGroup { type_name: "Observation", ref group } if group == "onset"));
}
