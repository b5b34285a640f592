use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Node of the external (rendered) tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ViewNode {
    Element(ViewElement),
    Text { content: String },
}

impl ViewNode {
    pub fn text(content: impl Into<String>) -> Self {
        ViewNode::Text {
            content: content.into(),
        }
    }

    pub fn as_element(&self) -> Option<&ViewElement> {
        match self {
            ViewNode::Element(element) => Some(element),
            ViewNode::Text { .. } => None,
        }
    }
}

impl From<ViewElement> for ViewNode {
    fn from(element: ViewElement) -> Self {
        ViewNode::Element(element)
    }
}

/// Tagged element of the external tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewElement {
    pub tag: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ViewNode>,
}

impl ViewElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Set the attribute only when a value is present
    pub fn with_optional_attr(mut self, key: impl Into<String>, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.attributes.insert(key.into(), value.to_string());
        }
        self
    }

    pub fn with_child(mut self, child: impl Into<ViewNode>) -> Self {
        self.children.push(child.into());
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = ViewNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class")
            .unwrap_or_default()
            .split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    /// First descendant with the given tag, depth first
    pub fn find_descendant(&self, tag: &str) -> Option<&ViewElement> {
        self.children.iter().find_map(|child| match child {
            ViewNode::Element(element) if element.tag == tag => Some(element),
            ViewNode::Element(element) => element.find_descendant(tag),
            ViewNode::Text { .. } => None,
        })
    }

    pub fn find_descendant_mut(&mut self, tag: &str) -> Option<&mut ViewElement> {
        // Locate the subtree first so only one mutable borrow is taken
        let index = self.children.iter().position(|child| match child {
            ViewNode::Element(element) => element.tag == tag || element.find_descendant(tag).is_some(),
            ViewNode::Text { .. } => false,
        })?;

        match &mut self.children[index] {
            ViewNode::Element(element) => {
                if element.tag == tag {
                    Some(element)
                } else {
                    element.find_descendant_mut(tag)
                }
            }
            ViewNode::Text { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_matching() {
        let el = ViewElement::new("blockquote").with_attr("class", "quote  exists-quote");
        assert!(el.has_class("quote"));
        assert!(el.has_class("exists-quote"));
        assert!(!el.has_class("quo"));
        assert!(!ViewElement::new("p").has_class("quote"));
    }

    #[test]
    fn test_find_descendant_skips_self() {
        let figure = ViewElement::new("figure")
            .with_child(ViewElement::new("span").with_child(ViewElement::new("img").with_attr("src", "a.png")));

        assert_eq!(figure.find_descendant("img").and_then(|img| img.attribute("src")), Some("a.png"));
        assert!(figure.find_descendant("figure").is_none());
    }

    #[test]
    fn test_find_descendant_mut_reaches_nested_match() {
        let mut figure = ViewElement::new("figure")
            .with_child(ViewNode::text("caption"))
            .with_child(ViewElement::new("span").with_child(ViewElement::new("img")))
            .with_child(ViewElement::new("img").with_attr("src", "second.png"));

        let img = figure.find_descendant_mut("img").unwrap();
        img.attributes.insert("upload-id".to_string(), "42".to_string());

        let first = figure.find_descendant("img").unwrap();
        assert_eq!(first.attribute("upload-id"), Some("42"));
        assert_eq!(first.attribute("src"), None);
        assert!(figure.find_descendant_mut("video").is_none());
    }
}
