//! Model → view structural converters
//!
//! Each converter is total over legal model elements and never emits an
//! attribute whose model value is absent.

use postkit_model::{ModelElement, ViewElement, ViewNode};

pub const ATTACHMENT_CLASS: &str = "editor-attachment";
pub const EMOTION_CLASS: &str = "emotion";
pub const QUOTE_CLASS: &str = "quote";
pub const QUOTE_WITH_SOURCE_CLASS: &str = "exists-quote";
pub const QUOTE_WITHOUT_SOURCE_CLASS: &str = "no-from-quote";
pub const IMAGE_BLOCK_CLASS: &str = "image";
pub const IMAGE_INLINE_CLASS: &str = "image-inline";

/// `attachment` → `<span class="editor-attachment" data-filename upload-id>`
pub fn attachment(model: &ModelElement) -> ViewElement {
    ViewElement::new("span")
        .with_attr("class", ATTACHMENT_CLASS)
        .with_optional_attr("data-filename", model.attribute("filename"))
        .with_optional_attr("upload-id", model.attribute("upload-id"))
}

/// `emotion` → `<img class="emotion" src emotion-id>`
pub fn emotion(model: &ModelElement) -> ViewElement {
    ViewElement::new("img")
        .with_attr("class", EMOTION_CLASS)
        .with_optional_attr("src", model.attribute("url"))
        .with_optional_attr("emotion-id", model.attribute("emotion-id"))
}

/// `blockQuote` → `<blockquote class="quote exists-quote" data-from data-floor>`,
/// or the reduced `<blockquote class="quote no-from-quote">` when the quote has
/// no source
pub fn quote(model: &ModelElement, children: Vec<ViewNode>) -> ViewElement {
    let view = match model.attribute("data-from") {
        Some(from) => ViewElement::new("blockquote")
            .with_attr("class", format!("{} {}", QUOTE_CLASS, QUOTE_WITH_SOURCE_CLASS))
            .with_attr("data-from", from)
            .with_optional_attr("data-floor", model.attribute("data-floor")),
        None => ViewElement::new("blockquote")
            .with_attr("class", format!("{} {}", QUOTE_CLASS, QUOTE_WITHOUT_SOURCE_CLASS)),
    };
    view.with_children(children)
}

pub fn paragraph(children: Vec<ViewNode>) -> ViewElement {
    ViewElement::new("p").with_children(children)
}

fn image(model: &ModelElement) -> ViewElement {
    ViewElement::new("img")
        .with_optional_attr("src", model.attribute("src"))
        .with_optional_attr("alt", model.attribute("alt"))
}

/// `imageBlock` → `<figure class="image"><img src alt></figure>`
pub fn image_block(model: &ModelElement) -> ViewElement {
    ViewElement::new("figure")
        .with_attr("class", IMAGE_BLOCK_CLASS)
        .with_child(image(model))
}

/// `imageInline` → `<span class="image-inline"><img src alt></span>`
pub fn image_inline(model: &ModelElement) -> ViewElement {
    ViewElement::new("span")
        .with_attr("class", IMAGE_INLINE_CLASS)
        .with_child(image(model))
}
