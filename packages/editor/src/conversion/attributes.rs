//! Attribute-only converters
//!
//! These shuttle one attribute between an already converted model element and
//! its view counterpart without creating or destroying nodes. They always run
//! after the structural converter of the element.

use postkit_model::{ModelElement, ViewElement};
use tracing::trace;

/// Maps `model_attribute` on the listed model elements to `view_attribute` on
/// the view element (or on its first `view_element` descendant)
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeConverter {
    pub model_elements: Vec<String>,
    pub model_attribute: String,
    /// Tag of the descendant carrying the attribute; `None` means the mapped
    /// view element itself
    pub view_element: Option<String>,
    pub view_attribute: String,
}

impl AttributeConverter {
    /// Same attribute name on both sides, on the mapped element itself
    pub fn on_element<I, S>(model_elements: I, attribute: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let attribute = attribute.into();
        Self {
            model_elements: model_elements.into_iter().map(Into::into).collect(),
            model_attribute: attribute.clone(),
            view_element: None,
            view_attribute: attribute,
        }
    }

    /// Attribute carried by a descendant of the mapped view element
    pub fn on_descendant<I, S>(
        model_elements: I,
        model_attribute: impl Into<String>,
        view_element: impl Into<String>,
        view_attribute: impl Into<String>,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            model_elements: model_elements.into_iter().map(Into::into).collect(),
            model_attribute: model_attribute.into(),
            view_element: Some(view_element.into()),
            view_attribute: view_attribute.into(),
        }
    }

    pub fn applies_to(&self, model_name: &str) -> bool {
        self.model_elements.iter().any(|name| name == model_name)
    }

    /// Copy the model attribute onto the view; no-op when either side is missing
    pub fn downcast(&self, model: &ModelElement, view: &mut ViewElement) {
        let Some(value) = model.attribute(&self.model_attribute) else {
            return;
        };

        let target = match &self.view_element {
            Some(tag) => view.find_descendant_mut(tag),
            None => Some(view),
        };

        match target {
            Some(target) => {
                target
                    .attributes
                    .insert(self.view_attribute.clone(), value.to_string());
            }
            None => trace!(
                model = %model.name,
                attribute = %self.model_attribute,
                "no view descendant to carry attribute"
            ),
        }
    }

    /// Copy the view attribute onto the model; no-op when either side is missing
    pub fn upcast(&self, view: &ViewElement, model: &mut ModelElement) {
        let source = match &self.view_element {
            Some(tag) if &view.tag == tag => Some(view),
            Some(tag) => view.find_descendant(tag),
            None => Some(view),
        };

        if let Some(value) = source.and_then(|source| source.attribute(&self.view_attribute)) {
            model
                .attributes
                .insert(self.model_attribute.clone(), value.to_string());
        }
    }
}
