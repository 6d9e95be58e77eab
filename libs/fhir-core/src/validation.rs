//! Pluggable validation
//!
//! The rule engine lives elsewhere. Models reach it through a
//! [`ValidatorHook`], an explicitly passed handle holding at most one
//! [`ResourceValidator`]; the hook turns the validator's issue list into a
//! pass/fail decision.

use crate::config::ValidationConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

/// Result of one validator call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationOutcome {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    pub valid: bool,
    #[serde(default)]
    pub issues: Vec<ValidationIssue>,
}

impl ValidationOutcome {
    pub fn success(resource_type: Option<String>) -> Self {
        Self {
            resource_type,
            valid: true,
            issues: Vec::new(),
        }
    }

    /// Outcome whose `valid` flag follows the issues: no error or fatal issue.
    pub fn from_issues(resource_type: Option<String>, issues: Vec<ValidationIssue>) -> Self {
        let valid = !issues
            .iter()
            .any(|i| i.severity.is_blocking(IssueSeverity::Error));
        Self {
            resource_type,
            valid,
            issues,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.valid
    }

    pub fn error_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Error || i.severity == IssueSeverity::Fatal)
            .count()
    }

    pub fn warning_count(&self) -> usize {
        self.issues
            .iter()
            .filter(|i| i.severity == IssueSeverity::Warning)
            .count()
    }

    /// Issues at `threshold` or worse
    pub fn blocking_issues(&self, threshold: IssueSeverity) -> Vec<&ValidationIssue> {
        self.issues
            .iter()
            .filter(|i| i.severity.is_blocking(threshold))
            .collect()
    }

    pub fn to_operation_outcome(&self) -> Value {
        serde_json::json!({
            "resourceType": "OperationOutcome",
            "issue": self.issues.iter().map(|i| i.to_json()).collect::<Vec<_>>()
        })
    }
}

/// Individual validation issue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub code: IssueCode,
    pub diagnostics: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Field paths the issue refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<Vec<String>>,
}

impl ValidationIssue {
    pub fn new(severity: IssueSeverity, code: IssueCode, diagnostics: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            diagnostics: diagnostics.into(),
            location: None,
            expression: None,
        }
    }

    pub fn fatal(code: IssueCode, diagnostics: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Fatal, code, diagnostics)
    }

    pub fn error(code: IssueCode, diagnostics: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Error, code, diagnostics)
    }

    pub fn warning(code: IssueCode, diagnostics: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Warning, code, diagnostics)
    }

    pub fn information(code: IssueCode, diagnostics: impl Into<String>) -> Self {
        Self::new(IssueSeverity::Information, code, diagnostics)
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_expression(mut self, expression: Vec<String>) -> Self {
        self.expression = Some(expression);
        self
    }

    fn to_json(&self) -> Value {
        let mut issue = serde_json::json!({
            "severity": self.severity.to_string().to_lowercase(),
            "code": self.code.to_string(),
            "diagnostics": self.diagnostics,
        });

        if let Some(ref loc) = self.location {
            issue["location"] = serde_json::json!([loc]);
        }

        if let Some(ref expr) = self.expression {
            issue["expression"] = serde_json::json!(expr);
        }

        issue
    }
}

/// Ordered from most to least severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Fatal,
    Error,
    Warning,
    Information,
}

impl IssueSeverity {
    /// Whether this severity is at `threshold` or worse.
    pub fn is_blocking(self, threshold: IssueSeverity) -> bool {
        self <= threshold
    }
}

impl std::fmt::Display for IssueSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fatal => write!(f, "Fatal"),
            Self::Error => write!(f, "Error"),
            Self::Warning => write!(f, "Warning"),
            Self::Information => write!(f, "Information"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueCode {
    Invalid,
    Structure,
    Required,
    Value,
    Invariant,
    Security,
    Login,
    Unknown,
    Expired,
    Forbidden,
    Suppressed,
    Processing,
    NotSupported,
    Duplicate,
    MultipleMatches,
    NotFound,
    Deleted,
    TooLong,
    CodeInvalid,
    Extension,
    TooCostly,
    BusinessRule,
    Conflict,
    Transient,
    LockError,
    NoStore,
    Exception,
    Timeout,
    Incomplete,
    Throttled,
    Informational,
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Invalid => "invalid",
            Self::Structure => "structure",
            Self::Required => "required",
            Self::Value => "value",
            Self::Invariant => "invariant",
            Self::Security => "security",
            Self::Login => "login",
            Self::Unknown => "unknown",
            Self::Expired => "expired",
            Self::Forbidden => "forbidden",
            Self::Suppressed => "suppressed",
            Self::Processing => "processing",
            Self::NotSupported => "not-supported",
            Self::Duplicate => "duplicate",
            Self::MultipleMatches => "multiple-matches",
            Self::NotFound => "not-found",
            Self::Deleted => "deleted",
            Self::TooLong => "too-long",
            Self::CodeInvalid => "code-invalid",
            Self::Extension => "extension",
            Self::TooCostly => "too-costly",
            Self::BusinessRule => "business-rule",
            Self::Conflict => "conflict",
            Self::Transient => "transient",
            Self::LockError => "lock-error",
            Self::NoStore => "no-store",
            Self::Exception => "exception",
            Self::Timeout => "timeout",
            Self::Incomplete => "incomplete",
            Self::Throttled => "throttled",
            Self::Informational => "informational",
        };
        write!(f, "{}", s)
    }
}

/// The external rule engine, as seen from the object model.
#[async_trait]
pub trait ResourceValidator: Send + Sync {
    async fn validate(&self, resource: &Value) -> Result<ValidationOutcome>;
}

/// Adapts an async closure into a [`ResourceValidator`].
pub struct FnValidator<F> {
    func: F,
}

impl<F> FnValidator<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F, Fut> ResourceValidator for FnValidator<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ValidationOutcome>> + Send + 'static,
{
    async fn validate(&self, resource: &Value) -> Result<ValidationOutcome> {
        (self.func)(resource.clone()).await
    }
}

/// Shared validator slot.
///
/// Clones share the slot: a registration made through any clone is seen by
/// all of them, and the most recent registration wins.
#[derive(Clone, Default)]
pub struct ValidatorHook {
    inner: Arc<HookInner>,
}

#[derive(Default)]
struct HookInner {
    validator: RwLock<Option<Arc<dyn ResourceValidator>>>,
    config: ValidationConfig,
}

impl std::fmt::Debug for ValidatorHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidatorHook")
            .field("registered", &self.is_registered())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl ValidatorHook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ValidationConfig) -> Self {
        Self {
            inner: Arc::new(HookInner {
                validator: RwLock::new(None),
                config,
            }),
        }
    }

    /// Hook with `validator` already registered.
    pub fn with_validator(validator: impl ResourceValidator + 'static) -> Self {
        let hook = Self::new();
        hook.register(validator);
        hook
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.inner.config
    }

    /// Install `validator`, replacing any previous one.
    pub fn register(&self, validator: impl ResourceValidator + 'static) {
        let mut slot = self
            .inner
            .validator
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let replaced = slot.replace(Arc::new(validator)).is_some();
        tracing::debug!(replaced, "registered resource validator");
    }

    /// Install an async closure as the validator.
    pub fn register_fn<F, Fut>(&self, func: F)
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<ValidationOutcome>> + Send + 'static,
    {
        self.register(FnValidator::new(func));
    }

    /// Remove the validator; returns whether one was registered.
    pub fn unregister(&self) -> bool {
        let mut slot = self
            .inner
            .validator
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let removed = slot.take().is_some();
        tracing::debug!(removed, "unregistered resource validator");
        removed
    }

    pub fn is_registered(&self) -> bool {
        self.current().is_some()
    }

    pub fn current(&self) -> Option<Arc<dyn ResourceValidator>> {
        self.inner
            .validator
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Run the registered validator and return its outcome as is.
    pub async fn validate(&self, resource: &Value) -> Result<ValidationOutcome> {
        let validator = self.current().ok_or(Error::ValidatorNotConfigured)?;
        let outcome = validator.validate(resource).await?;
        tracing::debug!(
            valid = outcome.valid,
            errors = outcome.error_count(),
            warnings = outcome.warning_count(),
            issues = outcome.issues.len(),
            "validation finished"
        );
        Ok(outcome)
    }

    /// Run the registered validator and reject when any issue blocks.
    ///
    /// Issues below the configured blocking severity never reject; they stay
    /// in the returned outcome.
    pub async fn validate_or_throw(
        &self,
        resource_type: &'static str,
        resource: &Value,
    ) -> Result<ValidationOutcome> {
        let outcome = self.validate(resource).await?;
        let config = self.config();
        let blocking = outcome.blocking_issues(config.blocking_severity).len();

        if blocking > 0 || (!outcome.valid && config.reject_when_flagged_invalid) {
            return Err(Error::ValidationFailed {
                resource_type,
                blocking,
                issues: outcome.issues,
            });
        }

        if !outcome.valid {
            tracing::debug!(
                resource_type,
                "validator flagged resource invalid without blocking issues"
            );
        }
        Ok(outcome)
    }
}
