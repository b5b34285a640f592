//! # Postkit Editor
//!
//! Editing engine for rich-text documents carrying attachments, emotions and
//! quotes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ conversion: view tree → model (upcast)      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document + mutations                │
//! │  - Apply batches with validation            │
//! │  - Repair pass (post-fixers) to fixed point │
//! │  - Commands gated by the schema             │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ conversion: model → view tree (downcast)    │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **The model is the source of truth**: view trees are derived
//! 2. **Repair, don't reject**: structurally illegal batches are applied and
//!    then repaired; only unknown elements and disallowed attributes are
//!    refused up front
//! 3. **Content is kept**: misplaced containers are unwrapped, not deleted
//!
//! ## Usage
//!
//! ```rust,ignore
//! use postkit_editor::{Document, EditorCommand, EditorContext};
//!
//! let mut doc = Document::from_view(EditorContext::standard(), &view_nodes)?;
//!
//! let quote = EditorCommand::InsertQuote { from: Some("alice".into()), floor: None };
//! if doc.is_command_enabled(&quote, &position) {
//!     doc.execute(&quote, &position)?;
//! }
//!
//! let html = doc.to_html();
//! ```

mod commands;
pub mod conversion;
mod document;
mod emotions;
mod errors;
mod mutations;
mod pipeline;
mod post_fixers;
pub mod schema;

pub use commands::EditorCommand;
pub use conversion::{AttributeConverter, Conversion, ElementConverter, Priority, UpcastRule, UpcastTarget, ViewMatcher};
pub use document::{Document, EditorContext};
pub use emotions::{
    EmotionCatalog, EmotionData, EmotionGroup, EmotionGroupData, EmotionPage, EmotionTile, DEFAULT_PER_PAGE,
};
pub use errors::EditorError;
pub use mutations::{Mutation, MutationError, MutationResult};
pub use pipeline::{Pipeline, PipelineResult};
pub use post_fixers::{NonNestableIntegrity, ObjectIntegrity, PostFixer, PostFixerEngine, DEFAULT_MAX_CORRECTIONS};
pub use schema::{SchemaRegistry, SchemaRule};

// Re-export common types for convenience
pub use postkit_model::{Document as ModelDocument, ModelElement, ModelNode, NodeKind, Path, Position, ViewElement, ViewNode};
