//! View → model structural converters
//!
//! These run only after a [`ViewMatcher`](super::ViewMatcher) accepted the
//! view element. Only mapped attributes are carried over.

use postkit_model::{ModelElement, ModelNode, NodeKind, ViewElement, IMAGE_BLOCK, IMAGE_INLINE, PARAGRAPH};

fn copy_attr(model: ModelElement, key: &str, value: Option<&str>) -> ModelElement {
    match value {
        Some(value) => model.with_attr(key, value),
        None => model,
    }
}

pub fn attachment(view: &ViewElement) -> ModelElement {
    let model = ModelElement::of_kind(NodeKind::Attachment);
    let model = copy_attr(model, "filename", view.attribute("data-filename"));
    copy_attr(model, "upload-id", view.attribute("upload-id"))
}

pub fn emotion(view: &ViewElement) -> ModelElement {
    let model = ModelElement::of_kind(NodeKind::Emotion);
    let model = copy_attr(model, "url", view.attribute("src"));
    copy_attr(model, "emotion-id", view.attribute("emotion-id"))
}

/// A quote keeps its floor only together with its source
pub fn quote(view: &ViewElement, children: Vec<ModelNode>) -> ModelElement {
    let model = ModelElement::of_kind(NodeKind::Quote);
    let model = match view.attribute("data-from") {
        Some(from) => copy_attr(model.with_attr("data-from", from), "data-floor", view.attribute("data-floor")),
        None => model,
    };
    model.with_children(children)
}

pub fn paragraph(children: Vec<ModelNode>) -> ModelElement {
    ModelElement::new(PARAGRAPH).with_children(children)
}

fn image(name: &str, view: &ViewElement) -> ModelElement {
    let img = if view.tag == "img" {
        Some(view)
    } else {
        view.find_descendant("img")
    };

    let model = ModelElement::new(name);
    match img {
        Some(img) => {
            let model = copy_attr(model, "src", img.attribute("src"));
            copy_attr(model, "alt", img.attribute("alt"))
        }
        None => model,
    }
}

pub fn image_block(view: &ViewElement) -> ModelElement {
    image(IMAGE_BLOCK, view)
}

pub fn image_inline(view: &ViewElement) -> ModelElement {
    image(IMAGE_INLINE, view)
}
