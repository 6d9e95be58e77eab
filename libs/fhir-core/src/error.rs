//! Error types for the FHIR object model

use crate::validation::ValidationIssue;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Expected a JSON object for {0}")]
    ExpectedObject(&'static str),

    #[error("Resource type mismatch: expected {expected}, got {actual}")]
    ResourceTypeMismatch {
        expected: &'static str,
        actual: String,
    },

    #[error("Invalid value for {field}: {source}")]
    InvalidField {
        field: String,
        source: serde_json::Error,
    },

    #[error("Field {field} is not declared for {type_name}")]
    UndeclaredField {
        type_name: &'static str,
        field: String,
    },

    #[error("{type_name} declares fields its reader never consumed: {}", .fields.join(", "))]
    UnreadFields {
        type_name: &'static str,
        fields: Vec<String>,
    },

    #[error("Unknown variant '{variant}' for choice field {group}[x]")]
    UnknownChoiceVariant { group: &'static str, variant: String },

    #[error("{type_name} has no choice field {group}[x]")]
    UnknownChoiceGroup {
        type_name: &'static str,
        group: String,
    },

    #[error("Choice variant {group}{variant} is not primitive and cannot carry an extension sidecar")]
    SidecarNotAllowed {
        group: &'static str,
        variant: &'static str,
    },

    #[error("Choice field {group}[x] has more than one populated variant: {}", .variants.join(", "))]
    ConflictingChoiceVariants {
        group: &'static str,
        variants: Vec<String>,
    },

    #[error("No validator registered; the resource was not checked")]
    ValidatorNotConfigured,

    #[error("{resource_type} failed validation with {blocking} blocking issue(s)")]
    ValidationFailed {
        resource_type: &'static str,
        blocking: usize,
        issues: Vec<ValidationIssue>,
    },

    #[error("Validator error: {0}")]
    Validator(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl Error {
    /// Issues carried by a validation failure, empty for every other error.
    pub fn issues(&self) -> &[ValidationIssue] {
        match self {
            Error::ValidationFailed { issues, .. } => issues,
            _ => &[],
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
