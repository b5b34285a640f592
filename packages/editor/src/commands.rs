//! Insertion commands exposed to the host UI
//!
//! A command knows its host-facing name, whether it can run at a position,
//! and which mutations it expands to. Inline content asked for at a block
//! position is wrapped in a paragraph first.

use crate::emotions::EmotionCatalog;
use crate::errors::EditorError;
use crate::mutations::Mutation;
use crate::schema::SchemaRegistry;
use postkit_model::{Document as ModelDocument, ModelElement, ModelNode, NodeKind, Position, PARAGRAPH};
use postkit_upload::UploadedFile;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "camelCase")]
pub enum EditorCommand {
    InsertEmotion {
        id: String,
        url: String,
    },

    /// Quote holding one empty paragraph; `floor` is ignored without `from`
    InsertQuote {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        from: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        floor: Option<String>,
    },

    #[serde(rename_all = "camelCase")]
    InsertAttachment {
        upload_id: String,
        filename: String,
    },
}

impl EditorCommand {
    /// Emotion command for a catalog entry
    pub fn insert_emotion(catalog: &EmotionCatalog, id: &str) -> Option<Self> {
        catalog.get_emotion(id).map(|url| EditorCommand::InsertEmotion {
            id: id.to_string(),
            url: url.to_string(),
        })
    }

    /// Attachment command for a finished upload
    pub fn from_upload(file: &UploadedFile) -> Self {
        EditorCommand::InsertAttachment {
            upload_id: file.upload_id.clone(),
            filename: file.upload_name.clone(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EditorCommand::InsertEmotion { .. } => "insertEmotion",
            EditorCommand::InsertQuote { .. } => "insertQuote",
            EditorCommand::InsertAttachment { .. } => "insertAttachment",
        }
    }

    /// Element the command inserts
    pub fn element(&self) -> ModelElement {
        match self {
            EditorCommand::InsertEmotion { id, url } => ModelElement::of_kind(NodeKind::Emotion)
                .with_attr("emotion-id", id.as_str())
                .with_attr("url", url.as_str()),

            EditorCommand::InsertQuote { from, floor } => {
                let quote = ModelElement::of_kind(NodeKind::Quote);
                let quote = match from {
                    Some(from) => {
                        let quote = quote.with_attr("data-from", from.as_str());
                        match floor {
                            Some(floor) => quote.with_attr("data-floor", floor.as_str()),
                            None => quote,
                        }
                    }
                    None => quote,
                };
                quote.with_child(ModelElement::new(PARAGRAPH))
            }

            EditorCommand::InsertAttachment { upload_id, filename } => {
                ModelElement::of_kind(NodeKind::Attachment)
                    .with_attr("upload-id", upload_id.as_str())
                    .with_attr("filename", filename.as_str())
            }
        }
    }

    /// Node to insert at `position`, wrapped in a paragraph when needed, or
    /// `None` when the schema forbids it there
    fn placement(&self, doc: &ModelDocument, schema: &SchemaRegistry, position: &Position) -> Option<ModelNode> {
        let context = doc.context(&position.parent)?;
        let element = self.element();

        if schema.is_legal_child(&context, &element.name) {
            return Some(element.into());
        }
        if schema.is_inline(&element.name) && schema.is_legal_child(&context, PARAGRAPH) {
            return Some(ModelElement::new(PARAGRAPH).with_child(element).into());
        }
        None
    }

    /// Enabled state shown by the host UI
    ///
    /// Emotions are always offered; the other commands follow the schema.
    pub fn is_enabled(&self, doc: &ModelDocument, schema: &SchemaRegistry, position: &Position) -> bool {
        match self {
            EditorCommand::InsertEmotion { .. } => true,
            _ => self.placement(doc, schema, position).is_some(),
        }
    }

    /// Mutations performing the command at `position`
    pub fn to_mutations(
        &self,
        doc: &ModelDocument,
        schema: &SchemaRegistry,
        position: &Position,
    ) -> Result<Vec<Mutation>, EditorError> {
        let node = self
            .placement(doc, schema, position)
            .ok_or(EditorError::CommandDisabled(self.name()))?;

        Ok(vec![Mutation::InsertNodes {
            position: position.clone(),
            nodes: vec![node],
        }])
    }
}
