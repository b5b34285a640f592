//! # Editor Document
//!
//! Model tree plus its editing state.
//!
//! ## Lifecycle
//!
//! ```text
//! Load/Upcast → Mutate → Repair → Render
//!      ↓           ↓        ↓        ↓
//!  view tree   batches  post-fix  view tree
//! ```
//!
//! A batch either applies completely (including its repairs) or not at all:
//! the tree is restored when any mutation or the repair pass fails.

use crate::commands::EditorCommand;
use crate::conversion::Conversion;
use crate::emotions::EmotionCatalog;
use crate::errors::EditorError;
use crate::mutations::{Mutation, MutationResult};
use crate::post_fixers::PostFixerEngine;
use crate::schema::SchemaRegistry;
use postkit_model::{
    to_html, Document as ModelDocument, ModelElement, ModelNode, NodeKind, Path, Position,
    ViewNode, IMAGE_BLOCK, IMAGE_INLINE,
};
use postkit_upload::UploadedFile;
use std::sync::Arc;
use tracing::{debug, warn};

/// Registries shared by every document of an editor
#[derive(Debug, Clone)]
pub struct EditorContext {
    pub schema: Arc<SchemaRegistry>,
    pub conversion: Arc<Conversion>,
    pub post_fixers: Arc<PostFixerEngine>,
    pub emotions: Arc<EmotionCatalog>,
}

impl EditorContext {
    /// Standard schema, conversion table and fixers with an empty emotion
    /// catalog
    pub fn standard() -> Self {
        let schema = Arc::new(SchemaRegistry::standard());
        Self {
            conversion: Arc::new(Conversion::standard(schema.clone())),
            schema,
            post_fixers: Arc::new(PostFixerEngine::new()),
            emotions: Arc::new(EmotionCatalog::new()),
        }
    }

    pub fn with_emotions(mut self, emotions: EmotionCatalog) -> Self {
        self.emotions = Arc::new(emotions);
        self
    }

    pub fn with_post_fixers(mut self, post_fixers: PostFixerEngine) -> Self {
        self.post_fixers = Arc::new(post_fixers);
        self
    }
}

impl Default for EditorContext {
    fn default() -> Self {
        Self::standard()
    }
}

/// Editable document
#[derive(Debug, Clone)]
pub struct Document {
    /// Current version number (increments on each applied batch)
    pub version: u64,

    model: ModelDocument,
    ctx: EditorContext,
}

impl Document {
    /// Empty document
    pub fn new(ctx: EditorContext) -> Self {
        Self {
            version: 0,
            model: ModelDocument::new(),
            ctx,
        }
    }

    /// Load the children of `root` as the first batch, repairing them
    pub fn load(ctx: EditorContext, root: ModelElement) -> Result<Self, EditorError> {
        let mut doc = Self::new(ctx);
        if !root.children.is_empty() {
            doc.apply(Mutation::InsertNodes {
                position: Position::new(Path::root(), 0),
                nodes: root.children,
            })?;
        }
        Ok(doc)
    }

    /// Upcast an external tree and load it
    pub fn from_view(ctx: EditorContext, nodes: &[ViewNode]) -> Result<Self, EditorError> {
        let children = ctx.conversion.upcast(nodes);
        Self::load(ctx, ModelElement::root().with_children(children))
    }

    pub fn context(&self) -> &EditorContext {
        &self.ctx
    }

    pub fn model(&self) -> &ModelDocument {
        &self.model
    }

    pub fn root(&self) -> &ModelElement {
        self.model.root()
    }

    /// Apply a single mutation
    pub fn apply(&mut self, mutation: Mutation) -> Result<MutationResult, EditorError> {
        self.apply_batch(vec![mutation])
    }

    /// Apply a batch, then run the repair pass over its changes
    pub fn apply_batch(&mut self, mutations: Vec<Mutation>) -> Result<MutationResult, EditorError> {
        let snapshot = self.model.clone();

        match self.apply_and_repair(mutations) {
            Ok(corrections) => {
                self.version += 1;
                let changes = self.model.take_changes();
                debug!(
                    version = self.version,
                    changes = changes.len(),
                    corrections,
                    "batch applied"
                );
                Ok(MutationResult {
                    version: self.version,
                    changes,
                    corrections,
                })
            }
            Err(err) => {
                warn!(error = %err, "batch rejected, restoring document");
                self.model = snapshot;
                Err(err)
            }
        }
    }

    fn apply_and_repair(&mut self, mutations: Vec<Mutation>) -> Result<usize, EditorError> {
        for mutation in &mutations {
            mutation.apply(&mut self.model, &self.ctx.schema)?;
        }
        self.ctx.post_fixers.run(&mut self.model, &self.ctx.schema)
    }

    pub fn is_command_enabled(&self, command: &EditorCommand, position: &Position) -> bool {
        command.is_enabled(&self.model, &self.ctx.schema, position)
    }

    /// Run a command at `position`
    pub fn execute(&mut self, command: &EditorCommand, position: &Position) -> Result<MutationResult, EditorError> {
        let mutations = command.to_mutations(&self.model, &self.ctx.schema, position)?;
        debug!(command = command.name(), position = %position, "executing command");
        self.apply_batch(mutations)
    }

    /// Bind a finished upload to the node that stood for it
    ///
    /// Images get `upload-id` and `data-upload-id`; an attachment gets its
    /// `upload-id` and `filename`.
    pub fn apply_upload_result(&mut self, path: &Path, file: &UploadedFile) -> Result<MutationResult, EditorError> {
        let name = self
            .model
            .element(path)
            .filter(|_| !path.is_root())
            .map(|element| element.name.clone())
            .ok_or_else(|| EditorError::NotAnUploadTarget(path.clone()))?;

        let set = |key: &str, value: &str| Mutation::SetAttribute {
            path: path.clone(),
            key: key.to_string(),
            value: value.to_string(),
        };

        let mutations = match name.as_str() {
            IMAGE_BLOCK | IMAGE_INLINE => vec![
                set("upload-id", &file.upload_id),
                set("data-upload-id", &file.upload_id),
            ],
            name if name == NodeKind::Attachment.model_name() => vec![
                set("upload-id", &file.upload_id),
                set("filename", &file.upload_name),
            ],
            _ => return Err(EditorError::NotAnUploadTarget(path.clone())),
        };
        self.apply_batch(mutations)
    }

    /// Downcast the model to the external tree
    pub fn render(&self) -> Vec<ViewNode> {
        self.ctx.conversion.downcast(self.model.root())
    }

    pub fn to_html(&self) -> String {
        to_html(&self.render())
    }

    /// Node at `path` in the model
    pub fn node(&self, path: &Path) -> Option<&ModelNode> {
        self.model.node(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutations::MutationError;
    use postkit_model::PARAGRAPH;

    fn paragraph(text: &str) -> ModelElement {
        ModelElement::new(PARAGRAPH).with_child(ModelNode::text(text))
    }

    #[test]
    fn test_document_version_increments() {
        let mut doc = Document::new(EditorContext::standard());
        assert_eq!(doc.version, 0);

        let result = doc
            .apply(Mutation::InsertNodes {
                position: Position::new(Path::root(), 0),
                nodes: vec![paragraph("a").into()],
            })
            .unwrap();

        assert_eq!(result.version, 1);
        assert_eq!(doc.version, 1);
        assert_eq!(result.changes.len(), 1);
        assert!(doc.model().changes().is_empty());
    }

    #[test]
    fn test_failed_batch_restores_tree() {
        let mut doc = Document::load(
            EditorContext::standard(),
            ModelElement::root().with_child(paragraph("a")),
        )
        .unwrap();
        let before = doc.root().clone();

        let result = doc.apply_batch(vec![
            Mutation::RemoveNode {
                path: Path::new(vec![0]),
            },
            Mutation::RemoveNode {
                path: Path::new(vec![0]),
            },
        ]);

        assert!(matches!(
            result,
            Err(EditorError::Mutation(MutationError::NodeNotFound(_)))
        ));
        assert_eq!(doc.root(), &before);
        assert_eq!(doc.version, 1);
    }

    #[test]
    fn test_load_repairs_nested_quotes() {
        let root = ModelElement::root().with_child(
            ModelElement::of_kind(NodeKind::Quote)
                .with_child(ModelElement::of_kind(NodeKind::Quote).with_child(paragraph("inner"))),
        );
        let doc = Document::load(EditorContext::standard(), root).unwrap();

        let quote = doc.model().element(&Path::new(vec![0])).unwrap();
        assert!(quote.is(NodeKind::Quote));
        assert_eq!(quote.children, vec![paragraph("inner").into()]);
    }

    #[test]
    fn test_upload_result_on_image() {
        let mut doc = Document::load(
            EditorContext::standard(),
            ModelElement::root().with_child(ModelElement::new(IMAGE_BLOCK).with_attr("src", "blob:1")),
        )
        .unwrap();
        let file = UploadedFile::new("/files/a.png", "77", 120, "a.png");

        doc.apply_upload_result(&Path::new(vec![0]), &file).unwrap();

        let image = doc.model().element(&Path::new(vec![0])).unwrap();
        assert_eq!(image.attribute("upload-id"), Some("77"));
        assert_eq!(image.attribute("data-upload-id"), Some("77"));

        assert!(matches!(
            doc.apply_upload_result(&Path::root(), &file),
            Err(EditorError::NotAnUploadTarget(_))
        ));
    }
}
