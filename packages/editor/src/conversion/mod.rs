//! # Converter Pairs
//!
//! Bidirectional conversion between the model tree and the view tree.
//!
//! ## Dispatch
//!
//! Structural conversion is a closed table: every convertible model element
//! maps to one [`ElementConverter`] variant, selected by `match` on the model
//! name (downcast) or by the first [`UpcastRule`] whose [`ViewMatcher`]
//! accepts the view element (upcast). Rules are ordered by [`Priority`], then
//! by registration order, so a specific rule registered late can still win
//! over a permissive default registered early.
//!
//! [`AttributeConverter`]s run after the structural converter of an element.
//!
//! ## Unmatched content
//!
//! A view element matched by no rule is not an error: its children are
//! converted in place. Inline runs that end up directly in block content are
//! wrapped in a paragraph.

mod attributes;
pub mod downcast;
pub mod upcast;

pub use attributes::AttributeConverter;

use crate::schema::{ContentModel, SchemaRegistry};
use postkit_model::{
    ModelElement, ModelNode, NodeKind, ViewElement, ViewNode, IMAGE_BLOCK, IMAGE_INLINE, PARAGRAPH,
};
use std::sync::Arc;
use tracing::{debug, trace};

/// Upcast rule priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low,
    Normal,
    High,
}

/// Tag + class signature of a view element
#[derive(Debug, Clone, PartialEq)]
pub struct ViewMatcher {
    pub tag: String,
    pub classes: Vec<String>,
}

impl ViewMatcher {
    pub fn tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            classes: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn matches(&self, view: &ViewElement) -> bool {
        view.tag == self.tag && self.classes.iter().all(|class| view.has_class(class))
    }
}

/// Structural converter pair of one model element
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementConverter {
    Attachment,
    Emotion,
    Quote,
    Paragraph,
    ImageBlock,
    ImageInline,
}

impl ElementConverter {
    pub fn for_kind(kind: NodeKind) -> Self {
        match kind {
            NodeKind::Attachment => ElementConverter::Attachment,
            NodeKind::Emotion => ElementConverter::Emotion,
            NodeKind::Quote => ElementConverter::Quote,
        }
    }

    pub fn for_model_name(name: &str) -> Option<Self> {
        if let Some(kind) = NodeKind::from_model_name(name) {
            return Some(Self::for_kind(kind));
        }
        match name {
            PARAGRAPH => Some(ElementConverter::Paragraph),
            IMAGE_BLOCK => Some(ElementConverter::ImageBlock),
            IMAGE_INLINE => Some(ElementConverter::ImageInline),
            _ => None,
        }
    }

    /// Content model of the model element's children
    fn content(self) -> ContentModel {
        match self {
            ElementConverter::Quote => ContentModel::Blocks,
            ElementConverter::Paragraph => ContentModel::Inline,
            _ => ContentModel::Empty,
        }
    }

    fn downcast(self, model: &ModelElement, children: Vec<ViewNode>) -> ViewElement {
        match self {
            ElementConverter::Attachment => downcast::attachment(model),
            ElementConverter::Emotion => downcast::emotion(model),
            ElementConverter::Quote => downcast::quote(model, children),
            ElementConverter::Paragraph => downcast::paragraph(children),
            ElementConverter::ImageBlock => downcast::image_block(model),
            ElementConverter::ImageInline => downcast::image_inline(model),
        }
    }

    fn upcast(self, view: &ViewElement, children: Vec<ModelNode>) -> ModelElement {
        match self {
            ElementConverter::Attachment => upcast::attachment(view),
            ElementConverter::Emotion => upcast::emotion(view),
            ElementConverter::Quote => upcast::quote(view, children),
            ElementConverter::Paragraph => upcast::paragraph(children),
            ElementConverter::ImageBlock => upcast::image_block(view),
            ElementConverter::ImageInline => upcast::image_inline(view),
        }
    }
}

/// What a matched view element becomes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpcastTarget {
    Element(ElementConverter),
    /// The element disappears; its children are converted in place
    Transparent,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpcastRule {
    pub matcher: ViewMatcher,
    pub target: UpcastTarget,
    pub priority: Priority,
}

impl UpcastRule {
    pub fn new(matcher: ViewMatcher, target: UpcastTarget) -> Self {
        Self {
            matcher,
            target,
            priority: Priority::Normal,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }
}

/// Conversion table shared by every document
#[derive(Debug, Clone)]
pub struct Conversion {
    schema: Arc<SchemaRegistry>,
    upcast_rules: Vec<UpcastRule>,
    attribute_converters: Vec<AttributeConverter>,
}

impl Conversion {
    /// Table without any rule
    pub fn empty(schema: Arc<SchemaRegistry>) -> Self {
        Self {
            schema,
            upcast_rules: Vec::new(),
            attribute_converters: Vec::new(),
        }
    }

    /// Generic defaults followed by the custom kinds and upload attributes
    pub fn standard(schema: Arc<SchemaRegistry>) -> Self {
        let mut conversion = Self::empty(schema);

        // Generic content
        conversion.add_upcast_rule(UpcastRule::new(
            ViewMatcher::tag("p"),
            UpcastTarget::Element(ElementConverter::Paragraph),
        ));
        conversion.add_upcast_rule(UpcastRule::new(
            ViewMatcher::tag("figure").with_class(downcast::IMAGE_BLOCK_CLASS),
            UpcastTarget::Element(ElementConverter::ImageBlock),
        ));
        conversion.add_upcast_rule(UpcastRule::new(
            ViewMatcher::tag("span").with_class(downcast::IMAGE_INLINE_CLASS),
            UpcastTarget::Element(ElementConverter::ImageInline),
        ));
        conversion.add_upcast_rule(UpcastRule::new(
            ViewMatcher::tag("img"),
            UpcastTarget::Element(ElementConverter::ImageInline),
        ));
        conversion.add_upcast_rule(UpcastRule::new(ViewMatcher::tag("span"), UpcastTarget::Transparent));

        // Custom kinds
        conversion.add_upcast_rule(UpcastRule::new(
            ViewMatcher::tag("blockquote").with_class(downcast::QUOTE_CLASS),
            UpcastTarget::Element(ElementConverter::Quote),
        ));
        conversion.add_upcast_rule(
            UpcastRule::new(
                ViewMatcher::tag("span").with_class(downcast::ATTACHMENT_CLASS),
                UpcastTarget::Element(ElementConverter::Attachment),
            )
            .with_priority(Priority::High),
        );
        conversion.add_upcast_rule(
            UpcastRule::new(
                ViewMatcher::tag("img").with_class(downcast::EMOTION_CLASS),
                UpcastTarget::Element(ElementConverter::Emotion),
            )
            .with_priority(Priority::High),
        );

        // Upload id of images
        conversion.add_attribute_converter(AttributeConverter::on_element(
            [IMAGE_BLOCK, IMAGE_INLINE],
            "data-upload-id",
        ));
        conversion.add_attribute_converter(AttributeConverter::on_descendant(
            [IMAGE_BLOCK, IMAGE_INLINE],
            "data-upload-id",
            "img",
            "upload-id",
        ));

        conversion
    }

    pub fn schema(&self) -> &SchemaRegistry {
        &self.schema
    }

    /// Add a rule after every rule of the same or higher priority
    pub fn add_upcast_rule(&mut self, rule: UpcastRule) {
        let index = self
            .upcast_rules
            .iter()
            .position(|existing| existing.priority < rule.priority)
            .unwrap_or(self.upcast_rules.len());
        self.upcast_rules.insert(index, rule);
    }

    pub fn add_attribute_converter(&mut self, converter: AttributeConverter) {
        self.attribute_converters.push(converter);
    }

    /// Winning rule for a view element
    pub fn match_upcast(&self, view: &ViewElement) -> Option<&UpcastRule> {
        self.upcast_rules.iter().find(|rule| rule.matcher.matches(view))
    }

    /// Downcast the children of the root element
    pub fn downcast(&self, root: &ModelElement) -> Vec<ViewNode> {
        self.downcast_children(&root.children)
    }

    fn downcast_children(&self, children: &[ModelNode]) -> Vec<ViewNode> {
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            match child {
                ModelNode::Text { data } => out.push(ViewNode::text(data.clone())),
                ModelNode::Element(element) => match self.downcast_element(element) {
                    Some(view) => out.push(view.into()),
                    None => {
                        debug!(model = %element.name, "no downcast converter, rendering children in place");
                        out.extend(self.downcast_children(&element.children));
                    }
                },
            }
        }
        out
    }

    /// Downcast one element, or `None` when no converter knows its name
    pub fn downcast_element(&self, model: &ModelElement) -> Option<ViewElement> {
        let converter = ElementConverter::for_model_name(&model.name)?;
        let children = match converter.content() {
            ContentModel::Empty => Vec::new(),
            _ => self.downcast_children(&model.children),
        };

        let mut view = converter.downcast(model, children);
        for attribute in self.attribute_converters.iter().filter(|c| c.applies_to(&model.name)) {
            attribute.downcast(model, &mut view);
        }
        Some(view)
    }

    /// Upcast view nodes placed at the document root
    pub fn upcast(&self, nodes: &[ViewNode]) -> Vec<ModelNode> {
        self.upcast_children(nodes, ContentModel::Blocks)
    }

    /// Upcast one view element, or `None` when no structural rule matches it
    pub fn upcast_element(&self, view: &ViewElement) -> Option<ModelElement> {
        match self.match_upcast(view)?.target {
            UpcastTarget::Element(converter) => Some(self.upcast_with(converter, view)),
            UpcastTarget::Transparent => None,
        }
    }

    fn upcast_with(&self, converter: ElementConverter, view: &ViewElement) -> ModelElement {
        let children = match converter.content() {
            ContentModel::Empty => Vec::new(),
            content => self.upcast_children(&view.children, content),
        };

        let mut model = converter.upcast(view, children);
        let name = model.name.clone();
        for attribute in self.attribute_converters.iter().filter(|c| c.applies_to(&name)) {
            attribute.upcast(view, &mut model);
        }
        model
    }

    fn upcast_children(&self, nodes: &[ViewNode], content: ContentModel) -> Vec<ModelNode> {
        let mut out = Vec::new();
        for node in nodes {
            match node {
                ViewNode::Text { content: text } => out.push(ModelNode::text(text.clone())),
                ViewNode::Element(view) => match self.match_upcast(view).map(|rule| rule.target) {
                    Some(UpcastTarget::Element(converter)) => {
                        out.push(self.upcast_with(converter, view).into());
                    }
                    Some(UpcastTarget::Transparent) => {
                        out.extend(self.upcast_children(&view.children, content));
                    }
                    None => {
                        trace!(tag = %view.tag, "no upcast rule matched, converting children in place");
                        out.extend(self.upcast_children(&view.children, content));
                    }
                },
            }
        }

        if content == ContentModel::Blocks {
            self.wrap_inline_runs(out)
        } else {
            out
        }
    }

    /// Wrap consecutive inline nodes of block content in paragraphs; runs of
    /// whitespace-only text are dropped
    fn wrap_inline_runs(&self, nodes: Vec<ModelNode>) -> Vec<ModelNode> {
        let mut out = Vec::with_capacity(nodes.len());
        let mut run: Vec<ModelNode> = Vec::new();

        for node in nodes {
            if self.schema.is_inline(node.name()) {
                run.push(node);
            } else {
                self.flush_run(&mut run, &mut out);
                out.push(node);
            }
        }
        self.flush_run(&mut run, &mut out);
        out
    }

    fn flush_run(&self, run: &mut Vec<ModelNode>, out: &mut Vec<ModelNode>) {
        let blank = run.iter().all(|node| match node {
            ModelNode::Text { data } => data.trim().is_empty(),
            ModelNode::Element(_) => false,
        });
        let nodes = std::mem::take(run);
        if !blank {
            out.push(upcast::paragraph(nodes).into());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversion() -> Conversion {
        Conversion::standard(Arc::new(SchemaRegistry::standard()))
    }

    #[test]
    fn test_rules_are_ordered_by_priority_then_registration() {
        let conversion = conversion();
        let priorities: Vec<Priority> = conversion.upcast_rules.iter().map(|r| r.priority).collect();
        let mut sorted = priorities.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(priorities, sorted);

        let first_normal = conversion
            .upcast_rules
            .iter()
            .find(|rule| rule.priority == Priority::Normal)
            .unwrap();
        assert_eq!(first_normal.matcher, ViewMatcher::tag("p"));
    }

    #[test]
    fn test_matcher_requires_every_class() {
        let matcher = ViewMatcher::tag("blockquote").with_class("quote");
        assert!(matcher.matches(&ViewElement::new("blockquote").with_attr("class", "exists-quote quote")));
        assert!(!matcher.matches(&ViewElement::new("blockquote")));
        assert!(!matcher.matches(&ViewElement::new("div").with_attr("class", "quote")));
    }

    #[test]
    fn test_unknown_model_element_renders_children_in_place() {
        let conversion = conversion();
        let root = ModelElement::root().with_child(
            ModelElement::new("heading").with_child(ModelNode::text("title")),
        );

        assert_eq!(conversion.downcast(&root), vec![ViewNode::text("title")]);
    }

    #[test]
    fn test_whitespace_between_blocks_is_dropped() {
        let conversion = conversion();
        let nodes = vec![
            ViewNode::text("\n  "),
            ViewElement::new("p").with_child(ViewNode::text("a")).into(),
            ViewNode::text("\n"),
        ];

        let model = conversion.upcast(&nodes);
        assert_eq!(model.len(), 1);
        assert_eq!(model[0].name(), PARAGRAPH);
    }
}
