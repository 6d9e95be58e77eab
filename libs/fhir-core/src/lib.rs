//! FHIR core object model
//!
//! The machinery every concrete FHIR type is built on: field-list
//! descriptors driving order-preserving JSON (de)serialization, the
//! `Element` → `BackboneElement` → `DomainResource` layers, mutually
//! exclusive choice fields with extension sidecars, fluent builders, a
//! pluggable async validator and immutable-update helpers.
//!
//! # Example
//!
//! ```rust
//! use ferrum_core::prelude::*;
//! use ferrum_core::{CodeableConcept, Observation, ObservationValue, Quantity};
//! use serde_json::json;
//!
//! let obs = Observation::builder()
//!     .set_id("hr-1")
//!     .set_status("final")
//!     .set_code(CodeableConcept::from_text("Heart rate"))
//!     .set_value(ObservationValue::Quantity(Quantity::ucum(72, "/min")))
//!     .build();
//!
//! let json = obs.to_json().unwrap();
//! assert_eq!(json["resourceType"], "Observation");
//! assert_eq!(json["valueQuantity"]["value"], 72);
//!
//! // Derive a new instance; the original is untouched.
//! let amended = obs
//!     .with_changes(json!({"status": "amended"}).as_object().cloned().unwrap())
//!     .unwrap();
//! assert_eq!(amended.status.as_deref(), Some("amended"));
//! assert_eq!(obs.status.as_deref(), Some("final"));
//! ```

pub mod builder;
pub mod choice;
pub mod config;
pub mod datatypes;
pub mod element;
pub mod error;
pub mod fields;
pub mod model;
pub mod resources;
pub mod validation;

pub use builder::{
    push_to, BackboneElementBuilder, Builder, DomainResourceBuilder, ElementBuilder,
};
pub use choice::{Choice, ChoiceField, ChoiceGroup, ChoiceVariant};
pub use config::{ChoiceConflictPolicy, MergeConfig, ModelConfig, ModelConfigBuilder, ValidationConfig};
pub use datatypes::*;
pub use element::{BackboneElement, DomainResource, Element};
pub use error::{Error, Result};
pub use fields::{sidecar_key, FieldList, FieldListBuilder, FieldReader, FieldWriter, JsonObject, WireFields};
pub use model::{Model, Resource, RESOURCE_TYPE_KEY};
pub use resources::*;
pub use validation::{
    FnValidator, IssueCode, IssueSeverity, ResourceValidator, ValidationIssue, ValidationOutcome,
    ValidatorHook,
};

/// Traits needed to call model and builder methods
pub mod prelude {
    pub use crate::builder::{
        BackboneElementBuilder, Builder, DomainResourceBuilder, ElementBuilder,
    };
    pub use crate::choice::ChoiceField;
    pub use crate::fields::WireFields;
    pub use crate::model::{Model, Resource};
}
