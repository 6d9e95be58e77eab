//! The contract every concrete type fulfils
//!
//! A [`Model`] is built from a partial JSON object (keeping only declared
//! fields), serialized back in declared order, derived immutably, cloned and
//! validated through an injected [`ValidatorHook`].

use crate::choice::ChoiceGroup;
use crate::config::MergeConfig;
use crate::element::DomainResource;
use crate::error::{Error, Result};
use crate::fields::{FieldList, FieldReader, FieldWriter, JsonObject, WireFields};
use crate::validation::{ValidationOutcome, ValidatorHook};
use async_trait::async_trait;
use serde_json::Value;

/// Discriminator key of top-level records
pub const RESOURCE_TYPE_KEY: &str = "resourceType";

/// Implements `Serialize`/`Deserialize` for models through their wire form,
/// so models nest inside each other and inside plain serde types.
#[macro_export]
macro_rules! impl_wire_serde {
    ($($ty:ty),+ $(,)?) => {$(
        impl ::serde::Serialize for $ty {
            fn serialize<S>(&self, serializer: S) -> ::std::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                let object = <$ty as $crate::Model>::to_object(self)
                    .map_err(<S::Error as ::serde::ser::Error>::custom)?;
                ::serde::Serialize::serialize(&object, serializer)
            }
        }

        impl<'de> ::serde::Deserialize<'de> for $ty {
            fn deserialize<D>(deserializer: D) -> ::std::result::Result<Self, D::Error>
            where
                D: ::serde::Deserializer<'de>,
            {
                let object = <$crate::JsonObject as ::serde::Deserialize>::deserialize(deserializer)?;
                <$ty as $crate::Model>::from_object(&object)
                    .map_err(<D::Error as ::serde::de::Error>::custom)
            }
        }
    )+};
}

#[async_trait]
pub trait Model: WireFields + Clone + Send + Sync + 'static {
    /// Type name used in diagnostics and field paths
    const TYPE_NAME: &'static str;

    /// `resourceType` of top-level records; `None` for everything else.
    const RESOURCE_TYPE: Option<&'static str> = None;

    /// All wire names of this type, base layers first.
    fn field_list() -> &'static FieldList;

    /// Choice groups declared directly on this type.
    fn choice_groups() -> &'static [ChoiceGroup] {
        &[]
    }

    /// Build an instance from a partial object.
    ///
    /// Undeclared keys are dropped without error; use [`Model::unknown_fields`]
    /// to see what would be lost.
    fn from_object(source: &JsonObject) -> Result<Self> {
        if let Some(expected) = Self::RESOURCE_TYPE {
            check_resource_type(expected, source)?;
        }

        let dropped = Self::unknown_fields(source);
        if !dropped.is_empty() {
            tracing::debug!(
                type_name = Self::TYPE_NAME,
                dropped = ?dropped,
                "dropping undeclared input fields"
            );
        }

        let mut input = FieldReader::new(Self::TYPE_NAME, Self::field_list(), source);
        let value = Self::read_fields(&mut input)?;
        input.finish()?;
        Ok(value)
    }

    fn from_json(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or(Error::ExpectedObject(Self::TYPE_NAME))?;
        Self::from_object(object)
    }

    fn from_json_str(input: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_json(&value)
    }

    /// Keys of `source` that construction would drop.
    fn unknown_fields(source: &JsonObject) -> Vec<String> {
        Self::field_list()
            .unknown_fields(source)
            .into_iter()
            .filter(|key| Self::RESOURCE_TYPE.is_none() || *key != RESOURCE_TYPE_KEY)
            .map(str::to_string)
            .collect()
    }

    /// Canonical wire object: `resourceType` (records only), then populated
    /// fields in declared order.
    fn to_object(&self) -> Result<JsonObject> {
        let mut fields = FieldWriter::new(Self::TYPE_NAME);
        self.write_fields(&mut fields)?;

        let mut object = JsonObject::new();
        if let Some(resource_type) = Self::RESOURCE_TYPE {
            object.insert(
                RESOURCE_TYPE_KEY.to_string(),
                Value::String(resource_type.to_string()),
            );
        }
        fields.finish(Self::field_list(), &mut object)?;
        Ok(object)
    }

    fn to_json(&self) -> Result<Value> {
        self.to_object().map(Value::Object)
    }

    fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.to_json()?)?)
    }

    /// New instance from the current snapshot shallow-merged with `changes`.
    ///
    /// A `null` change removes the key. Choice exclusivity is re-enforced with
    /// the default [`MergeConfig`].
    fn with_changes(&self, changes: JsonObject) -> Result<Self> {
        self.merge_changes(changes, &MergeConfig::default())
    }

    fn merge_changes(&self, changes: JsonObject, config: &MergeConfig) -> Result<Self> {
        let merged = merge_snapshot(self.to_object()?, changes, Self::choice_groups(), config)?;
        Self::from_object(&merged)
    }

    /// New instance from the current snapshot shallow-merged with whatever
    /// `transform` returns for that snapshot.
    fn apply_transform<F>(&self, transform: F) -> Result<Self>
    where
        F: FnOnce(&JsonObject) -> JsonObject,
    {
        let snapshot = self.to_object()?;
        let changes = transform(&snapshot);
        let merged = merge_snapshot(
            snapshot,
            changes,
            Self::choice_groups(),
            &MergeConfig::default(),
        )?;
        Self::from_object(&merged)
    }

    /// New instance with one variant of the choice field `base` set by name.
    fn with_choice_variant(&self, base: &str, variant: &str, value: Value) -> Result<Self> {
        let group = Self::choice_groups()
            .iter()
            .find(|g| g.base() == base)
            .ok_or_else(|| Error::UnknownChoiceGroup {
                type_name: Self::TYPE_NAME,
                group: base.to_string(),
            })?;

        let mut snapshot = self.to_object()?;
        group.set_variant(&mut snapshot, variant, value)?;
        Self::from_object(&snapshot)
    }

    /// Re-materialize from the serialized form; shares nothing with `self`.
    fn deep_clone(&self) -> Result<Self> {
        let snapshot = self.to_json()?;
        Self::from_json(&snapshot)
    }

    /// Run the registered validator and return its full outcome, blocking
    /// issues included.
    async fn validate(&self, hook: &ValidatorHook) -> Result<ValidationOutcome> {
        let json = self.to_json()?;
        hook.validate(&json).await
    }

    /// Run the registered validator; fail when any issue blocks.
    async fn validate_or_throw(&self, hook: &ValidatorHook) -> Result<ValidationOutcome> {
        let json = self.to_json()?;
        hook.validate_or_throw(Self::TYPE_NAME, &json).await
    }
}

/// A top-level, externally identifiable record.
pub trait Resource: Model {
    fn domain(&self) -> &DomainResource;

    fn resource_type(&self) -> &'static str {
        Self::RESOURCE_TYPE.unwrap_or(Self::TYPE_NAME)
    }

    fn id(&self) -> Option<&str> {
        self.domain().element().id.as_deref()
    }
}

fn check_resource_type(expected: &'static str, source: &JsonObject) -> Result<()> {
    match source.get(RESOURCE_TYPE_KEY) {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(actual)) if actual == expected => Ok(()),
        Some(other) => Err(Error::ResourceTypeMismatch {
            expected,
            actual: other
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| other.to_string()),
        }),
    }
}

fn merge_snapshot(
    mut snapshot: JsonObject,
    changes: JsonObject,
    groups: &[ChoiceGroup],
    config: &MergeConfig,
) -> Result<JsonObject> {
    for group in groups {
        group.reconcile(&mut snapshot, &changes, config.choice_conflicts)?;
    }

    for (key, value) in changes {
        if value.is_null() {
            snapshot.remove(&key);
        } else {
            snapshot.insert(key, value);
        }
    }
    Ok(snapshot)
}
