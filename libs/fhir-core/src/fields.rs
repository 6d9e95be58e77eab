//! Field-list descriptors and the known-field copy/emit engine
//!
//! Every concrete type owns one [`FieldList`]: the ordered wire names it
//! declares, ancestors' layers first. The list decides both which input keys
//! survive construction and the order in which populated keys are written.

use crate::choice::{Choice, ChoiceField, ChoiceGroup};
use crate::element::Element;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

/// Insertion-ordered JSON object (the crate enables `preserve_order`).
pub type JsonObject = Map<String, Value>;

/// Name of the extension sidecar key paired with a primitive field.
pub fn sidecar_key(name: &str) -> String {
    format!("_{name}")
}

/// Lazily builds a `&'static FieldList` on first use.
///
/// ```rust
/// use ferrum_core::{field_list, FieldList};
///
/// fn fields() -> &'static FieldList {
///     field_list!(FieldList::builder().field("status").field("identifier").build())
/// }
///
/// assert_eq!(fields().names().collect::<Vec<_>>(), vec!["status", "identifier"]);
/// ```
#[macro_export]
macro_rules! field_list {
    ($init:expr) => {{
        static FIELDS: ::std::sync::OnceLock<$crate::FieldList> = ::std::sync::OnceLock::new();
        FIELDS.get_or_init(|| $init)
    }};
}

/// Ordered, append-only list of the wire names a type declares.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldList {
    names: Vec<String>,
}

impl FieldList {
    pub fn builder() -> FieldListBuilder {
        FieldListBuilder::default()
    }

    /// Start a list containing every field of `base`, in the same order.
    pub fn extending(base: &FieldList) -> FieldListBuilder {
        FieldListBuilder {
            names: base.names.clone(),
        }
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Declared position of `name`, if any
    pub fn position(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Copy every declared key of `source`, in declared order.
    ///
    /// Falsy values (`false`, `0`, `""`, `[]`) are copied like any other;
    /// `null` means absent and is skipped.
    pub fn assign_known_fields(&self, source: &JsonObject) -> JsonObject {
        let mut known = JsonObject::new();
        for name in &self.names {
            if let Some(value) = source.get(name) {
                if !value.is_null() {
                    known.insert(name.clone(), value.clone());
                }
            }
        }
        known
    }

    /// Keys of `source` that construction would silently drop.
    pub fn unknown_fields<'a>(&self, source: &'a JsonObject) -> Vec<&'a str> {
        source
            .keys()
            .map(String::as_str)
            .filter(|key| !self.contains(key))
            .collect()
    }

    /// Move every populated value of `fields` onto `target` in declared order.
    ///
    /// A value under a name this list does not declare is a definition bug in
    /// the writing type and is reported rather than dropped.
    pub fn emit_known_fields(
        &self,
        type_name: &'static str,
        target: &mut JsonObject,
        mut fields: JsonObject,
    ) -> Result<()> {
        for name in &self.names {
            if let Some(value) = fields.remove(name) {
                target.insert(name.clone(), value);
            }
        }

        match fields.keys().next() {
            Some(field) => Err(Error::UndeclaredField {
                type_name,
                field: field.clone(),
            }),
            None => Ok(()),
        }
    }
}

/// Append-only builder for a [`FieldList`].
#[derive(Debug, Default)]
pub struct FieldListBuilder {
    names: Vec<String>,
}

impl FieldListBuilder {
    /// Append a field; names already present keep their first position.
    pub fn field(mut self, name: &str) -> Self {
        if !self.names.iter().any(|n| n == name) {
            self.names.push(name.to_string());
        }
        self
    }

    /// Append a primitive field followed by its `_name` sidecar.
    pub fn primitive(self, name: &str) -> Self {
        let sidecar = sidecar_key(name);
        self.field(name).field(&sidecar)
    }

    /// Append every wire key of a choice group.
    pub fn choice(mut self, group: &ChoiceGroup) -> Self {
        for key in group.wire_keys() {
            self = self.field(&key);
        }
        self
    }

    pub fn build(self) -> FieldList {
        FieldList { names: self.names }
    }
}

/// Per-layer wire contract: read my fields from, and append my fields to,
/// the shared buffer of the concrete type being (de)serialized.
pub trait WireFields: Sized {
    fn write_fields(&self, out: &mut FieldWriter) -> Result<()>;

    fn read_fields(input: &mut FieldReader) -> Result<Self>;
}

/// Typed reader over the known-field projection of one input object.
#[derive(Debug)]
pub struct FieldReader {
    type_name: &'static str,
    fields: JsonObject,
}

impl FieldReader {
    pub fn new(type_name: &'static str, list: &FieldList, source: &JsonObject) -> Self {
        Self {
            type_name,
            fields: list.assign_known_fields(source),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    /// Remove and decode one field; `None` when it was not populated.
    pub fn take<T: DeserializeOwned>(&mut self, key: &str) -> Result<Option<T>> {
        match self.fields.remove(key) {
            None => Ok(None),
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|source| Error::InvalidField {
                    field: format!("{}.{}", self.type_name, key),
                    source,
                }),
        }
    }

    /// Remove one field without decoding it.
    pub fn take_raw(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    /// Remove the `_name` extension sidecar of a primitive field.
    pub fn take_sidecar(&mut self, name: &str) -> Result<Option<Element>> {
        self.take(&sidecar_key(name))
    }

    pub fn take_choice<C: ChoiceField>(&mut self) -> Result<Option<Choice<C>>> {
        Choice::from_wire_shape(self)
    }

    /// Fail when a declared, populated field was left behind by every layer.
    pub fn finish(self) -> Result<()> {
        if self.fields.is_empty() {
            return Ok(());
        }
        Err(Error::UnreadFields {
            type_name: self.type_name,
            fields: self.fields.into_iter().map(|(key, _)| key).collect(),
        })
    }
}

/// Collects a type's populated fields before they are emitted in order.
#[derive(Debug)]
pub struct FieldWriter {
    type_name: &'static str,
    fields: JsonObject,
}

impl FieldWriter {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            fields: JsonObject::new(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Write `value` under `key` when populated.
    pub fn put<T: Serialize>(&mut self, key: &str, value: &Option<T>) -> Result<()> {
        if let Some(value) = value {
            let encoded = serde_json::to_value(value).map_err(|source| Error::InvalidField {
                field: format!("{}.{}", self.type_name, key),
                source,
            })?;
            self.fields.insert(key.to_string(), encoded);
        }
        Ok(())
    }

    pub fn put_value(&mut self, key: String, value: Value) {
        self.fields.insert(key, value);
    }

    pub fn put_choice<C: ChoiceField>(&mut self, choice: &Option<Choice<C>>) -> Result<()> {
        match choice {
            Some(choice) => choice.to_wire_shape(self),
            None => Ok(()),
        }
    }

    /// Emit everything written so far onto `target`, ordered by `list`.
    pub fn finish(self, list: &FieldList, target: &mut JsonObject) -> Result<()> {
        list.emit_known_fields(self.type_name, target, self.fields)
    }
}
