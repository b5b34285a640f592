//! # Postkit Model
//!
//! Data model shared by the editor plugins:
//!
//! - **Internal tree**: [`Document`] of [`ModelNode`]s, mutated only through
//!   recorded primitives so every batch of edits yields a [`Change`] list
//! - **External tree**: [`ViewNode`]s, the rendered/serialized counterpart
//!   produced by downcast and consumed by upcast
//!
//! ```text
//!   ViewNode ──upcast──▶ ModelNode ──downcast──▶ ViewNode
//!                           │
//!                     Document + Differ
//! ```

pub mod differ;
pub mod document;
pub mod error;
pub mod node;
pub mod path;
pub mod serializer;
pub mod view;

pub use differ::{Change, Differ};
pub use document::Document;
pub use error::{ModelError, ModelResult};
pub use node::{
    Attributes, ModelElement, ModelNode, NodeKind, IMAGE_BLOCK, IMAGE_INLINE, PARAGRAPH, ROOT_NAME,
    TEXT_NAME,
};
pub use path::{Operation, Path, Position};
pub use serializer::to_html;
pub use view::{ViewElement, ViewNode};
