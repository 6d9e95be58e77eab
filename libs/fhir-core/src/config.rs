//! Runtime configuration
//!
//! ```rust
//! use ferrum_core::{ChoiceConflictPolicy, IssueSeverity, ModelConfig};
//!
//! let cfg = ModelConfig::builder()
//!     .blocking_severity(IssueSeverity::Warning)
//!     .choice_conflicts(ChoiceConflictPolicy::Reject)
//!     .build();
//!
//! let yaml = cfg.to_yaml().unwrap();
//! assert_eq!(ModelConfig::from_yaml(&yaml).unwrap(), cfg);
//! ```

use crate::error::Result;
use crate::validation::{IssueSeverity, ValidatorHook};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub validation: ValidationConfig,
    pub merge: MergeConfig,
}

impl ModelConfig {
    pub fn builder() -> ModelConfigBuilder {
        ModelConfigBuilder::default()
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Empty validator slot governed by this configuration
    pub fn validator_hook(&self) -> ValidatorHook {
        ValidatorHook::with_config(self.validation.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Issues at this severity or worse reject `validate_or_throw`.
    pub blocking_severity: IssueSeverity,
    /// Also reject when the validator reports `valid: false` without any
    /// blocking issue.
    pub reject_when_flagged_invalid: bool,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            blocking_severity: IssueSeverity::Error,
            reject_when_flagged_invalid: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub choice_conflicts: ChoiceConflictPolicy,
}

/// What `with_changes` does when a change set populates a choice variant
/// while the snapshot holds a different one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceConflictPolicy {
    /// Drop the stale variant and its sidecar.
    #[default]
    ClearSiblings,
    /// Fail with `ConflictingChoiceVariants`.
    Reject,
}

#[derive(Debug, Default)]
pub struct ModelConfigBuilder {
    config: ModelConfig,
}

impl ModelConfigBuilder {
    pub fn blocking_severity(mut self, severity: IssueSeverity) -> Self {
        self.config.validation.blocking_severity = severity;
        self
    }

    pub fn reject_when_flagged_invalid(mut self, reject: bool) -> Self {
        self.config.validation.reject_when_flagged_invalid = reject;
        self
    }

    pub fn choice_conflicts(mut self, policy: ChoiceConflictPolicy) -> Self {
        self.config.merge.choice_conflicts = policy;
        self
    }

    pub fn build(self) -> ModelConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_defaults() {
        let cfg = ModelConfig::default();
        assert_eq!(cfg.validation.blocking_severity, IssueSeverity::Error);
        assert!(!cfg.validation.reject_when_flagged_invalid);
        assert_eq!(cfg.merge.choice_conflicts, ChoiceConflictPolicy::ClearSiblings);
    }

    #[test]
    fn test_from_yaml_partial() {
        let yaml = r#"
merge:
  choice_conflicts: Reject
"#;
        let cfg = ModelConfig::from_yaml(yaml).unwrap();
        assert_eq!(cfg.merge.choice_conflicts, ChoiceConflictPolicy::Reject);
        assert_eq!(cfg.validation, ValidationConfig::default());
    }

    #[test]
    fn test_from_yaml_validation() {
        let yaml = r#"
validation:
  blocking_severity: fatal
  reject_when_flagged_invalid: true
"#;
        let cfg = ModelConfig::from_yaml(yaml).unwrap();
        assert_eq!(cfg.validation.blocking_severity, IssueSeverity::Fatal);
        assert!(cfg.validation.reject_when_flagged_invalid);
    }

    #[test]
    fn test_from_yaml_unknown_policy() {
        let yaml = "merge:\n  choice_conflicts: Sometimes\n";
        assert!(matches!(ModelConfig::from_yaml(yaml), Err(Error::Yaml(_))));
    }
}
