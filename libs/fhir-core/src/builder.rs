//! Fluent builders
//!
//! Builders stage fields by value and are consumed by their terminal step,
//! so a builder cannot be reused after `build`. The layered traits give every
//! concrete builder the base-layer setters for free.

use crate::datatypes::{Extension, Meta, Narrative};
use crate::element::{BackboneElement, DomainResource, Element};
use crate::error::Result;
use crate::model::Model;
use crate::validation::{ValidationOutcome, ValidatorHook};
use async_trait::async_trait;
use serde_json::Value;

/// Append to an optional list, creating it on first use.
pub fn push_to<T>(slot: &mut Option<Vec<T>>, value: T) {
    slot.get_or_insert_with(Vec::new).push(value);
}

#[async_trait]
pub trait Builder: Sized + Send {
    type Output: Model;

    /// Materialize the staged fields.
    fn build(self) -> Self::Output;

    /// Build, then validate through `hook`; fails on any blocking issue.
    async fn build_or_throw(self, hook: &ValidatorHook) -> Result<Self::Output> {
        let built = self.build();
        let type_name = <Self::Output as Model>::TYPE_NAME;
        tracing::trace!(type_name, "validating built instance");
        built.validate_or_throw(hook).await?;
        Ok(built)
    }

    /// Like [`Builder::build_or_throw`], also returning the outcome so
    /// non-blocking issues can be inspected.
    async fn build_and_validate(
        self,
        hook: &ValidatorHook,
    ) -> Result<(Self::Output, ValidationOutcome)> {
        let built = self.build();
        let type_name = <Self::Output as Model>::TYPE_NAME;
        tracing::trace!(type_name, "validating built instance");
        let outcome = built.validate_or_throw(hook).await?;
        Ok((built, outcome))
    }
}

pub trait ElementBuilder: Builder {
    fn element_mut(&mut self) -> &mut Element;

    fn set_id(mut self, id: impl Into<String>) -> Self {
        self.element_mut().id = Some(id.into());
        self
    }

    fn add_extension(mut self, extension: Extension) -> Self {
        push_to(&mut self.element_mut().extension, extension);
        self
    }
}

pub trait BackboneElementBuilder: ElementBuilder {
    fn backbone_mut(&mut self) -> &mut BackboneElement;

    fn add_modifier_extension(mut self, extension: Extension) -> Self {
        push_to(&mut self.backbone_mut().modifier_extension, extension);
        self
    }
}

pub trait DomainResourceBuilder: BackboneElementBuilder {
    fn domain_mut(&mut self) -> &mut DomainResource;

    fn set_meta(mut self, meta: Meta) -> Self {
        self.domain_mut().meta = Some(meta);
        self
    }

    fn set_implicit_rules(mut self, uri: impl Into<String>) -> Self {
        self.domain_mut().implicit_rules = Some(uri.into());
        self
    }

    fn set_language(mut self, code: impl Into<String>) -> Self {
        self.domain_mut().language = Some(code.into());
        self
    }

    fn set_text(mut self, text: Narrative) -> Self {
        self.domain_mut().text = Some(text);
        self
    }

    /// Embed another record; it must serialize with its own `resourceType`.
    fn add_contained<R: Model>(mut self, resource: &R) -> Result<Self> {
        let json = resource.to_json()?;
        push_to(&mut self.domain_mut().contained, json);
        Ok(self)
    }

    fn add_contained_json(mut self, resource: Value) -> Self {
        push_to(&mut self.domain_mut().contained, resource);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_to_creates_then_appends() {
        let mut slot: Option<Vec<u8>> = None;
        push_to(&mut slot, 1);
        push_to(&mut slot, 2);
        assert_eq!(slot, Some(vec![1, 2]));
    }
}
