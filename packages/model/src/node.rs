use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute mapping of a model element (keys are unique)
pub type Attributes = BTreeMap<String, String>;

/// Name of the document root element
pub const ROOT_NAME: &str = "$root";

/// Name used for text nodes in change records and schema contexts
pub const TEXT_NAME: &str = "$text";

/// Generic element names the custom kinds are mixed with
pub const PARAGRAPH: &str = "paragraph";
pub const IMAGE_BLOCK: &str = "imageBlock";
pub const IMAGE_INLINE: &str = "imageInline";

/// Custom structural element kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    Attachment,
    Emotion,
    Quote,
}

impl NodeKind {
    pub const ALL: [NodeKind; 3] = [NodeKind::Attachment, NodeKind::Emotion, NodeKind::Quote];

    /// Element name used for this kind inside the model tree
    pub fn model_name(self) -> &'static str {
        match self {
            NodeKind::Attachment => "attachment",
            NodeKind::Emotion => "emotion",
            NodeKind::Quote => "blockQuote",
        }
    }

    pub fn from_model_name(name: &str) -> Option<Self> {
        NodeKind::ALL.into_iter().find(|kind| kind.model_name() == name)
    }
}

/// Node of the internal document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ModelNode {
    Element(ModelElement),
    Text { data: String },
}

impl ModelNode {
    pub fn text(data: impl Into<String>) -> Self {
        ModelNode::Text { data: data.into() }
    }

    /// Element name, or `$text` for text nodes
    pub fn name(&self) -> &str {
        match self {
            ModelNode::Element(element) => &element.name,
            ModelNode::Text { .. } => TEXT_NAME,
        }
    }

    pub fn kind(&self) -> Option<NodeKind> {
        self.as_element().and_then(ModelElement::kind)
    }

    pub fn as_element(&self) -> Option<&ModelElement> {
        match self {
            ModelNode::Element(element) => Some(element),
            ModelNode::Text { .. } => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ModelElement> {
        match self {
            ModelNode::Element(element) => Some(element),
            ModelNode::Text { .. } => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, ModelNode::Text { .. })
    }
}

impl From<ModelElement> for ModelNode {
    fn from(element: ModelElement) -> Self {
        ModelNode::Element(element)
    }
}

/// Element of the internal document tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelElement {
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: Attributes,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ModelNode>,
}

impl ModelElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    pub fn of_kind(kind: NodeKind) -> Self {
        Self::new(kind.model_name())
    }

    pub fn root() -> Self {
        Self::new(ROOT_NAME)
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: impl Into<ModelNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = ModelNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn kind(&self) -> Option<NodeKind> {
        NodeKind::from_model_name(&self.name)
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.name == kind.model_name()
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_model_name(kind.model_name()), Some(kind));
        }
        assert_eq!(NodeKind::from_model_name("paragraph"), None);
    }

    #[test]
    fn test_node_serialization_shape() {
        let quote = ModelElement::of_kind(NodeKind::Quote)
            .with_attr("data-from", "alice")
            .with_child(ModelElement::new(PARAGRAPH).with_child(ModelNode::text("hi")));

        let json = serde_json::to_value(ModelNode::from(quote.clone())).unwrap();
        assert_eq!(json["type"], "element");
        assert_eq!(json["name"], "blockQuote");
        assert_eq!(json["children"][0]["children"][0]["type"], "text");

        let back: ModelNode = serde_json::from_value(json).unwrap();
        assert_eq!(back, ModelNode::Element(quote));
    }
}
