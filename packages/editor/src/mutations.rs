//! # Model Mutations
//!
//! Edits a host (or a command) applies to the model tree.
//!
//! ## Design Principles
//!
//! 1. **Structural, not semantic**: mutations are the tree primitives; the
//!    post-fixers restore structural invariants afterwards
//! 2. **Validated addressing**: a mutation fails if its path or position does
//!    not exist
//! 3. **Closed attribute sets**: no mutation can give an element an attribute
//!    its schema rule does not allow
//!
//! Structural legality (e.g. a quote inside a quote) is deliberately *not*
//! validated here. Such edits are applied and repaired afterwards.

use crate::schema::SchemaRegistry;
use postkit_model::{Document as ModelDocument, ModelError, ModelNode, Path, Position};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tree edits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mutation {
    /// Insert nodes at a position, in order
    InsertNodes {
        position: Position,
        nodes: Vec<ModelNode>,
    },

    /// Remove a node and its descendants
    RemoveNode { path: Path },

    /// Replace an element with its children
    UnwrapNode { path: Path },

    SetAttribute {
        path: Path,
        key: String,
        value: String,
    },

    RemoveAttribute { path: Path, key: String },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(Path),

    #[error("Parent not found: {0}")]
    ParentNotFound(Path),

    #[error("Node is not an element: {0}")]
    NotAnElement(Path),

    #[error("Attribute '{key}' is not allowed on '{element}'")]
    AttributeNotAllowed { element: String, key: String },

    #[error("Unknown element: {0}")]
    UnknownElement(String),

    #[error("Invalid structure: {0}")]
    InvalidStructure(String),

    #[error(transparent)]
    Model(#[from] ModelError),
}

impl Mutation {
    /// Apply mutation to the model with validation
    pub fn apply(&self, doc: &mut ModelDocument, schema: &SchemaRegistry) -> Result<(), MutationError> {
        self.validate(doc, schema)?;

        match self {
            Mutation::InsertNodes { position, nodes } => doc.insert(position, nodes.clone())?,
            Mutation::RemoveNode { path } => {
                doc.remove(path)?;
            }
            Mutation::UnwrapNode { path } => doc.unwrap(path)?,
            Mutation::SetAttribute { path, key, value } => {
                doc.set_attribute(path, key.clone(), value.clone())?;
            }
            Mutation::RemoveAttribute { path, key } => {
                doc.remove_attribute(path, key)?;
            }
        }
        Ok(())
    }

    /// Validate without applying
    pub fn validate(&self, doc: &ModelDocument, schema: &SchemaRegistry) -> Result<(), MutationError> {
        match self {
            Mutation::InsertNodes { position, nodes } => {
                let parent = doc
                    .element(&position.parent)
                    .ok_or_else(|| MutationError::ParentNotFound(position.parent.clone()))?;

                if position.offset > parent.children.len() {
                    return Err(MutationError::InvalidStructure(format!(
                        "offset {} is past the end of {}",
                        position.offset, position.parent
                    )));
                }

                for element in nodes.iter().filter_map(ModelNode::as_element) {
                    Self::validate_element(element, schema)?;
                }
                Ok(())
            }

            Mutation::RemoveNode { path } => {
                if path.is_root() {
                    return Err(MutationError::InvalidStructure(
                        "the root cannot be removed".to_string(),
                    ));
                }
                doc.node(path)
                    .ok_or_else(|| MutationError::NodeNotFound(path.clone()))?;
                Ok(())
            }

            Mutation::UnwrapNode { path } => {
                if path.is_root() {
                    return Err(MutationError::InvalidStructure(
                        "the root cannot be unwrapped".to_string(),
                    ));
                }
                Self::expect_element(doc, path)?;
                Ok(())
            }

            Mutation::SetAttribute { path, key, .. } => {
                let element = Self::expect_element(doc, path)?;
                if !schema.is_attribute_allowed(&element.name, key) {
                    return Err(MutationError::AttributeNotAllowed {
                        element: element.name.clone(),
                        key: key.clone(),
                    });
                }
                Ok(())
            }

            Mutation::RemoveAttribute { path, .. } => {
                Self::expect_element(doc, path)?;
                Ok(())
            }
        }
    }

    fn expect_element<'a>(
        doc: &'a ModelDocument,
        path: &Path,
    ) -> Result<&'a postkit_model::ModelElement, MutationError> {
        match doc.node(path) {
            _ if path.is_root() => Ok(doc.root()),
            None => Err(MutationError::NodeNotFound(path.clone())),
            Some(ModelNode::Text { .. }) => Err(MutationError::NotAnElement(path.clone())),
            Some(ModelNode::Element(element)) => Ok(element),
        }
    }

    fn validate_element(
        element: &postkit_model::ModelElement,
        schema: &SchemaRegistry,
    ) -> Result<(), MutationError> {
        if schema.rule(&element.name).is_none() {
            return Err(MutationError::UnknownElement(element.name.clone()));
        }
        if let Some((name, key)) = schema.find_disallowed_attribute(element) {
            return Err(MutationError::AttributeNotAllowed {
                element: name.to_string(),
                key: key.to_string(),
            });
        }
        for child in element.children.iter().filter_map(ModelNode::as_element) {
            Self::validate_element(child, schema)?;
        }
        Ok(())
    }
}

/// Result of applying a batch
#[derive(Debug, Clone, PartialEq)]
pub struct MutationResult {
    /// New version number
    pub version: u64,

    /// Changes of the batch, including post-fixer corrections
    pub changes: Vec<postkit_model::Change>,

    /// Number of corrections the post-fixers applied
    pub corrections: usize,
}
