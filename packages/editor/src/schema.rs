//! # Schema Registry
//!
//! Declares, per element name, where the element may appear, what it may
//! contain and which attributes it may carry. Lookups are pure; the registry
//! is built once and shared read-only (`Arc<SchemaRegistry>`).
//!
//! Legality of a child is decided from the full ancestor context, not just the
//! immediate parent, so that non-nestable elements (quotes) cannot appear
//! anywhere below another element of the same name.

use postkit_model::{
    ModelElement, ModelNode, NodeKind, IMAGE_BLOCK, IMAGE_INLINE, PARAGRAPH, ROOT_NAME, TEXT_NAME,
};
use std::collections::{BTreeSet, HashMap};

/// Where an element may be placed (`allowWhere`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllowWhere {
    /// Wherever a block may be placed
    Block,
    /// Wherever text may be placed
    Text,
    /// Nowhere (the root)
    Nowhere,
}

/// What an element may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentModel {
    /// Block content, like the root
    Blocks,
    /// Text and inline elements
    Inline,
    /// Nothing (leaf)
    Empty,
}

/// Schema rule for one element name
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaRule {
    pub name: String,
    pub allow_where: AllowWhere,
    pub content: ContentModel,
    pub is_inline: bool,
    pub is_block: bool,
    /// Opaque to selection; treated as a single unit
    pub is_object: bool,
    /// Selection cannot leave the element
    pub is_limit: bool,
    /// May not appear below another element of the same name
    pub non_nestable: bool,
    pub allowed_attributes: BTreeSet<String>,
    /// Identifying attributes an object cannot live without
    pub required_attributes: Vec<String>,
}

impl SchemaRule {
    fn new(name: impl Into<String>, allow_where: AllowWhere, content: ContentModel) -> Self {
        Self {
            name: name.into(),
            allow_where,
            content,
            is_inline: allow_where == AllowWhere::Text,
            is_block: allow_where == AllowWhere::Block,
            is_object: false,
            is_limit: false,
            non_nestable: false,
            allowed_attributes: BTreeSet::new(),
            required_attributes: Vec::new(),
        }
    }

    /// Element placed where blocks go
    pub fn block(name: impl Into<String>, content: ContentModel) -> Self {
        Self::new(name, AllowWhere::Block, content)
    }

    /// Element placed where text goes
    pub fn inline(name: impl Into<String>) -> Self {
        Self::new(name, AllowWhere::Text, ContentModel::Empty)
    }

    pub fn container(name: impl Into<String>) -> Self {
        Self::new(name, AllowWhere::Nowhere, ContentModel::Blocks)
    }

    pub fn object(mut self) -> Self {
        self.is_object = true;
        self
    }

    pub fn limit(mut self) -> Self {
        self.is_limit = true;
        self
    }

    pub fn non_nestable(mut self) -> Self {
        self.non_nestable = true;
        self
    }

    pub fn allow_attributes<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_attributes.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Require an attribute (it is also allowed)
    pub fn require_attribute(mut self, key: impl Into<String>) -> Self {
        let key = key.into();
        self.allowed_attributes.insert(key.clone());
        self.required_attributes.push(key);
        self
    }

    fn accepts(&self, child: &SchemaRule) -> bool {
        matches!(
            (self.content, child.allow_where),
            (ContentModel::Blocks, AllowWhere::Block) | (ContentModel::Inline, AllowWhere::Text)
        )
    }
}

/// Rule of a custom node kind
pub fn kind_rule(kind: NodeKind) -> SchemaRule {
    match kind {
        NodeKind::Attachment => SchemaRule::inline(kind.model_name())
            .object()
            .limit()
            .require_attribute("upload-id")
            .allow_attributes(["filename"]),

        NodeKind::Emotion => SchemaRule::inline(kind.model_name())
            .object()
            .require_attribute("emotion-id")
            .allow_attributes(["url"]),

        NodeKind::Quote => SchemaRule::block(kind.model_name(), ContentModel::Blocks)
            .non_nestable()
            .allow_attributes(["data-from", "data-floor"]),
    }
}

const IMAGE_ATTRIBUTES: [&str; 4] = ["src", "alt", "upload-id", "data-upload-id"];

/// Rules per element name
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    rules: HashMap<String, SchemaRule>,
}

impl SchemaRegistry {
    /// Registry without any rule
    pub fn new() -> Self {
        Self::default()
    }

    /// Generic content (root, paragraphs, images, text) plus every custom kind
    pub fn standard() -> Self {
        let mut registry = Self::new();

        registry.register(SchemaRule::container(ROOT_NAME));
        registry.register(SchemaRule::block(PARAGRAPH, ContentModel::Inline));
        registry.register(SchemaRule::inline(TEXT_NAME));
        registry.register(
            SchemaRule::block(IMAGE_BLOCK, ContentModel::Empty)
                .object()
                .allow_attributes(IMAGE_ATTRIBUTES),
        );
        registry.register(
            SchemaRule::inline(IMAGE_INLINE)
                .object()
                .allow_attributes(IMAGE_ATTRIBUTES),
        );

        for kind in NodeKind::ALL {
            registry.register(kind_rule(kind));
        }

        registry
    }

    /// Store a rule, replacing any previous rule of the same name
    pub fn register(&mut self, rule: SchemaRule) {
        self.rules.insert(rule.name.clone(), rule);
    }

    pub fn rule(&self, name: &str) -> Option<&SchemaRule> {
        self.rules.get(name)
    }

    pub fn rule_for(&self, kind: NodeKind) -> Option<&SchemaRule> {
        self.rule(kind.model_name())
    }

    /// Whether an element named `child` may be placed inside the last element
    /// of `context` (names from the root down to the parent)
    pub fn is_legal_child(&self, context: &[&str], child: &str) -> bool {
        let Some(parent) = context.last().and_then(|name| self.rule(name)) else {
            return false;
        };
        let Some(child_rule) = self.rule(child) else {
            return false;
        };

        if !parent.accepts(child_rule) {
            return false;
        }

        !(child_rule.non_nestable && context.contains(&child))
    }

    pub fn allowed_attributes(&self, name: &str) -> Option<&BTreeSet<String>> {
        self.rule(name).map(|rule| &rule.allowed_attributes)
    }

    pub fn is_attribute_allowed(&self, name: &str, key: &str) -> bool {
        self.allowed_attributes(name)
            .is_some_and(|allowed| allowed.contains(key))
    }

    /// First attribute of `element` or its descendants that the schema does
    /// not allow, as `(element name, key)`
    pub fn find_disallowed_attribute<'a>(&self, element: &'a ModelElement) -> Option<(&'a str, &'a str)> {
        if let Some(key) = element
            .attributes
            .keys()
            .find(|key| !self.is_attribute_allowed(&element.name, key))
        {
            return Some((element.name.as_str(), key.as_str()));
        }

        element
            .children
            .iter()
            .filter_map(ModelNode::as_element)
            .find_map(|child| self.find_disallowed_attribute(child))
    }

    pub fn is_inline(&self, name: &str) -> bool {
        self.rule(name).is_some_and(|rule| rule.is_inline)
    }

    pub fn is_non_nestable(&self, name: &str) -> bool {
        self.rule(name).is_some_and(|rule| rule.non_nestable)
    }

    /// Required attributes missing from `element`
    pub fn missing_required_attributes<'a>(&'a self, element: &ModelElement) -> Vec<&'a str> {
        self.rule(&element.name)
            .map(|rule| {
                rule.required_attributes
                    .iter()
                    .filter(|key| !element.attributes.contains_key(key.as_str()))
                    .map(String::as_str)
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_is_legal_in_root_only_once() {
        let schema = SchemaRegistry::standard();

        assert!(schema.is_legal_child(&["$root"], "blockQuote"));
        assert!(!schema.is_legal_child(&["$root", "blockQuote"], "blockQuote"));
        assert!(!schema.is_legal_child(&["$root", "paragraph"], "blockQuote"));
        assert!(schema.is_legal_child(&["$root", "blockQuote"], "paragraph"));
    }

    #[test]
    fn test_non_nestable_consults_every_ancestor() {
        let mut schema = SchemaRegistry::standard();
        schema.register(SchemaRule::block("tableCell", ContentModel::Blocks));

        assert!(schema.is_legal_child(&["$root", "tableCell"], "blockQuote"));
        assert!(!schema.is_legal_child(&["$root", "blockQuote", "tableCell"], "blockQuote"));
    }

    #[test]
    fn test_inline_kinds_need_text_position() {
        let schema = SchemaRegistry::standard();

        assert!(schema.is_legal_child(&["$root", "paragraph"], "emotion"));
        assert!(schema.is_legal_child(&["$root", "paragraph"], "attachment"));
        assert!(!schema.is_legal_child(&["$root"], "emotion"));
        assert!(!schema.is_legal_child(&["$root", "paragraph"], "paragraph"));
    }

    #[test]
    fn test_unknown_names_are_never_legal() {
        let schema = SchemaRegistry::standard();
        assert!(!schema.is_legal_child(&["$root"], "marquee"));
        assert!(!schema.is_legal_child(&["marquee"], "paragraph"));
        assert!(!schema.is_legal_child(&[], "paragraph"));
    }

    #[test]
    fn test_allowed_attributes_are_closed_sets() {
        let schema = SchemaRegistry::standard();

        let quote: Vec<&str> = schema
            .allowed_attributes("blockQuote")
            .unwrap()
            .iter()
            .map(String::as_str)
            .collect();
        assert_eq!(quote, vec!["data-floor", "data-from"]);

        assert!(schema.is_attribute_allowed("attachment", "upload-id"));
        assert!(schema.is_attribute_allowed("attachment", "filename"));
        assert!(!schema.is_attribute_allowed("attachment", "url"));
    }

    #[test]
    fn test_finds_disallowed_attribute_in_descendants() {
        let schema = SchemaRegistry::standard();
        let quote = ModelElement::of_kind(NodeKind::Quote).with_child(
            ModelElement::new(PARAGRAPH)
                .with_child(ModelElement::of_kind(NodeKind::Emotion).with_attr("onclick", "x")),
        );

        assert_eq!(schema.find_disallowed_attribute(&quote), Some(("emotion", "onclick")));
    }

    #[test]
    fn test_missing_required_attributes() {
        let schema = SchemaRegistry::standard();
        let attachment = ModelElement::of_kind(NodeKind::Attachment).with_attr("filename", "a.zip");

        assert_eq!(schema.missing_required_attributes(&attachment), vec!["upload-id"]);
        assert!(schema
            .missing_required_attributes(&ModelElement::of_kind(NodeKind::Quote))
            .is_empty());
    }
}
