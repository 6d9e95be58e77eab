//! Choice fields (`value[x]` and friends)
//!
//! On the wire a choice field is flattened onto its parent as mutually
//! exclusive `{base}{Variant}` keys, each primitive variant optionally paired
//! with an `_{base}{Variant}` extension sidecar. In memory it is a Rust enum
//! implementing [`ChoiceField`], wrapped in [`Choice`], so at most one variant
//! can ever be populated.

use crate::config::ChoiceConflictPolicy;
use crate::element::Element;
use crate::error::{Error, Result};
use crate::fields::{sidecar_key, FieldReader, FieldWriter, JsonObject};
use crate::model::Model;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// One declared shape of a choice field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceVariant {
    pub name: &'static str,
    pub is_primitive: bool,
}

impl ChoiceVariant {
    /// A primitive variant; may carry an extension sidecar.
    pub const fn primitive(name: &'static str) -> Self {
        Self {
            name,
            is_primitive: true,
        }
    }

    pub const fn complex(name: &'static str) -> Self {
        Self {
            name,
            is_primitive: false,
        }
    }
}

/// The declared variants of one choice field, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceGroup {
    base: &'static str,
    variants: &'static [ChoiceVariant],
}

impl ChoiceGroup {
    pub const fn new(base: &'static str, variants: &'static [ChoiceVariant]) -> Self {
        Self { base, variants }
    }

    pub fn base(&self) -> &'static str {
        self.base
    }

    pub fn variants(&self) -> &'static [ChoiceVariant] {
        self.variants
    }

    /// Look up a variant by its suffix (`"Quantity"`, `"String"`, ...).
    pub fn variant(&self, name: &str) -> Result<&'static ChoiceVariant> {
        self.variants
            .iter()
            .find(|v| v.name == name)
            .ok_or_else(|| self.unknown_variant(name))
    }

    pub fn unknown_variant(&self, name: &str) -> Error {
        Error::UnknownChoiceVariant {
            group: self.base,
            variant: name.to_string(),
        }
    }

    /// Wire key of a variant, e.g. `valueQuantity`
    pub fn key(&self, variant: &str) -> String {
        format!("{}{}", self.base, variant)
    }

    /// Wire key of a variant's sidecar, e.g. `_valueString`
    pub fn sidecar_key(&self, variant: &str) -> String {
        sidecar_key(&self.key(variant))
    }

    /// Every key this group may occupy, each primitive variant followed by
    /// its sidecar.
    pub fn wire_keys(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.variants.len() * 2);
        for variant in self.variants {
            keys.push(self.key(variant.name));
            if variant.is_primitive {
                keys.push(self.sidecar_key(variant.name));
            }
        }
        keys
    }

    /// Variants with a non-null value or sidecar in `object`, in declared order.
    pub fn populated_variants(&self, object: &JsonObject) -> Vec<&'static str> {
        let populated = |key: String| object.get(&key).is_some_and(|v| !v.is_null());
        self.variants
            .iter()
            .filter(|v| populated(self.key(v.name)) || populated(self.sidecar_key(v.name)))
            .map(|v| v.name)
            .collect()
    }

    /// Remove every variant key and sidecar of this group.
    pub fn clear(&self, target: &mut JsonObject) {
        for variant in self.variants {
            self.clear_variant(target, variant.name);
        }
    }

    /// Set `variant` to `value` on a staging object and clear every sibling
    /// variant together with its sidecar. The chosen variant's own sidecar is
    /// left as it is.
    pub fn set_variant(&self, target: &mut JsonObject, variant: &str, value: Value) -> Result<()> {
        let chosen = self.variant(variant)?;
        self.clear_siblings(target, chosen.name);
        target.insert(self.key(chosen.name), value);
        Ok(())
    }

    /// Set the extension sidecar of a primitive `variant`, clearing siblings.
    pub fn set_variant_sidecar(
        &self,
        target: &mut JsonObject,
        variant: &str,
        sidecar: Value,
    ) -> Result<()> {
        let chosen = self.variant(variant)?;
        if !chosen.is_primitive {
            return Err(Error::SidecarNotAllowed {
                group: self.base,
                variant: chosen.name,
            });
        }
        self.clear_siblings(target, chosen.name);
        target.insert(self.sidecar_key(chosen.name), sidecar);
        Ok(())
    }

    /// Make a shallow change set safe to merge onto `snapshot`.
    ///
    /// When `changes` populates one variant, sibling variants already present
    /// in `snapshot` are cleared or rejected according to `policy`. A change
    /// set that populates two variants of this group is always rejected.
    pub fn reconcile(
        &self,
        snapshot: &mut JsonObject,
        changes: &JsonObject,
        policy: ChoiceConflictPolicy,
    ) -> Result<()> {
        let incoming = self.populated_variants(changes);
        let chosen = match incoming.as_slice() {
            [] => return Ok(()),
            [chosen] => *chosen,
            many => return Err(self.conflict(many)),
        };

        let mut stale: Vec<&'static str> = self
            .populated_variants(snapshot)
            .into_iter()
            .filter(|v| *v != chosen && !self.cleared_by(v, snapshot, changes))
            .collect();
        if stale.is_empty() {
            return Ok(());
        }

        match policy {
            ChoiceConflictPolicy::ClearSiblings => {
                for variant in stale {
                    self.clear_variant(snapshot, variant);
                }
                Ok(())
            }
            ChoiceConflictPolicy::Reject => {
                stale.push(chosen);
                Err(self.conflict(&stale))
            }
        }
    }

    /// Whether `changes` removes every key `variant` holds in `snapshot`.
    fn cleared_by(&self, variant: &str, snapshot: &JsonObject, changes: &JsonObject) -> bool {
        let gone = |key: String| {
            changes.get(&key).is_some_and(Value::is_null)
                || snapshot.get(&key).map_or(true, Value::is_null)
        };
        gone(self.key(variant)) && gone(self.sidecar_key(variant))
    }

    fn clear_siblings(&self, target: &mut JsonObject, chosen: &str) {
        for other in self.variants.iter().filter(|v| v.name != chosen) {
            self.clear_variant(target, other.name);
        }
    }

    fn clear_variant(&self, target: &mut JsonObject, variant: &str) {
        target.remove(&self.key(variant));
        target.remove(&self.sidecar_key(variant));
    }

    fn conflict(&self, variants: &[&str]) -> Error {
        Error::ConflictingChoiceVariants {
            group: self.base,
            variants: variants.iter().map(|v| self.key(v)).collect(),
        }
    }
}

/// A Rust enum standing for one choice field.
pub trait ChoiceField: Sized + Clone + Send + Sync {
    const GROUP: ChoiceGroup;

    /// Suffix of the populated variant; must be one of `GROUP`'s variants.
    fn variant_name(&self) -> &'static str;

    fn to_wire_value(&self) -> Result<Value>;

    fn from_wire_value(variant: &str, value: Value) -> Result<Self>;

    /// Decode a variant given by name, failing on names the group does not
    /// declare.
    fn from_named(variant: &str, value: Value) -> Result<Self> {
        let declared = Self::GROUP.variant(variant)?;
        Self::from_wire_value(declared.name, value)
    }
}

/// Decode the payload of one choice variant.
pub fn decode_variant<T: DeserializeOwned>(
    group: &ChoiceGroup,
    variant: &str,
    value: Value,
) -> Result<T> {
    serde_json::from_value(value).map_err(|source| Error::InvalidField {
        field: group.key(variant),
        source,
    })
}

/// Encode the payload of one choice variant.
pub fn encode_variant<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(Error::from)
}

/// One populated variant of a choice field, with its optional sidecar.
///
/// A primitive variant may be present through its sidecar alone.
#[derive(Debug, Clone, PartialEq)]
pub struct Choice<C> {
    variant: &'static str,
    value: Option<C>,
    sidecar: Option<Element>,
}

impl<C: ChoiceField> Choice<C> {
    pub fn new(value: C) -> Self {
        Self {
            variant: value.variant_name(),
            value: Some(value),
            sidecar: None,
        }
    }

    /// Attach an extension sidecar; only primitive variants accept one.
    pub fn with_sidecar(mut self, sidecar: Element) -> Result<Self> {
        let variant = C::GROUP.variant(self.variant)?;
        if !variant.is_primitive {
            return Err(Error::SidecarNotAllowed {
                group: C::GROUP.base(),
                variant: variant.name,
            });
        }
        self.sidecar = Some(sidecar);
        Ok(self)
    }

    /// A primitive variant known only through its extensions.
    pub fn sidecar_only(variant: &str, sidecar: Element) -> Result<Self> {
        let declared = C::GROUP.variant(variant)?;
        Self {
            variant: declared.name,
            value: None,
            sidecar: None,
        }
        .with_sidecar(sidecar)
    }

    pub fn variant(&self) -> &'static str {
        self.variant
    }

    pub fn value(&self) -> Option<&C> {
        self.value.as_ref()
    }

    pub fn into_value(self) -> Option<C> {
        self.value
    }

    pub fn sidecar(&self) -> Option<&Element> {
        self.sidecar.as_ref()
    }

    pub fn wire_key(&self) -> String {
        C::GROUP.key(self.variant)
    }

    /// Flatten onto the parent's field buffer.
    pub fn to_wire_shape(&self, out: &mut FieldWriter) -> Result<()> {
        let group = C::GROUP;
        if let Some(value) = &self.value {
            out.put_value(group.key(self.variant), value.to_wire_value()?);
        }
        if let Some(sidecar) = &self.sidecar {
            out.put_value(
                group.sidecar_key(self.variant),
                Value::Object(sidecar.to_object()?),
            );
        }
        Ok(())
    }

    /// Parse the flattened sibling keys of this group, if any are present.
    pub fn from_wire_shape(input: &mut FieldReader) -> Result<Option<Self>> {
        let group = C::GROUP;
        let populated: Vec<&'static ChoiceVariant> = group
            .variants()
            .iter()
            .filter(|v| input.contains(&group.key(v.name)) || input.contains(&group.sidecar_key(v.name)))
            .collect();

        let variant = match populated.as_slice() {
            [] => return Ok(None),
            [variant] => *variant,
            many => {
                let names: Vec<&str> = many.iter().map(|v| v.name).collect();
                return Err(group.conflict(&names));
            }
        };

        let value = match input.take_raw(&group.key(variant.name)) {
            Some(raw) => Some(C::from_wire_value(variant.name, raw)?),
            None => None,
        };
        let sidecar = if variant.is_primitive {
            input.take_sidecar(&group.key(variant.name))?
        } else {
            None
        };

        Ok(Some(Self {
            variant: variant.name,
            value,
            sidecar,
        }))
    }
}

impl<C: ChoiceField> From<C> for Choice<C> {
    fn from(value: C) -> Self {
        Choice::new(value)
    }
}
