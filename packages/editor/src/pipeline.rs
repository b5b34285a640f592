//! # Rendering Pipeline
//!
//! Coordinates Mutate → Repair → Downcast and keeps the last rendered view
//! tree for the host.

use crate::{Document, EditorError, Mutation};
use postkit_model::{Change, ViewNode};

/// Manages the edit → render pipeline
#[derive(Debug)]
pub struct Pipeline {
    document: Document,
    last_view: Option<Vec<ViewNode>>,
}

impl Pipeline {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            last_view: None,
        }
    }

    /// Apply a batch and render the result
    ///
    /// On error the document is unchanged and the cached view stays valid.
    pub fn apply_batch(&mut self, mutations: Vec<Mutation>) -> Result<PipelineResult, EditorError> {
        let result = self.document.apply_batch(mutations)?;
        let view = self.full_render();

        Ok(PipelineResult {
            version: result.version,
            view,
            changes: result.changes,
        })
    }

    /// Render from scratch (initial render, recovery)
    pub fn full_render(&mut self) -> Vec<ViewNode> {
        let view = self.document.render();
        self.last_view = Some(view.clone());
        view
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn last_view(&self) -> Option<&[ViewNode]> {
        self.last_view.as_deref()
    }

    pub fn clear_cache(&mut self) {
        self.last_view = None;
    }
}

/// Result of pipeline execution
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub version: u64,

    /// Full view tree after the batch
    pub view: Vec<ViewNode>,

    /// Model changes of the batch, corrections included
    pub changes: Vec<Change>,
}
