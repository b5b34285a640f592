//! # Model Document
//!
//! The internal document tree plus the change list of the batch being applied.
//!
//! All structural edits go through the primitives here (`insert`, `remove`,
//! `unwrap`, attribute setters), which keep the [`Differ`] in step with the
//! tree. Reads are path based.

use crate::differ::{Change, Differ};
use crate::error::{ModelError, ModelResult};
use crate::node::{ModelElement, ModelNode};
use crate::path::{Operation, Path, Position};
use serde::{Deserialize, Serialize};

/// Internal document tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    root: ModelElement,

    #[serde(skip)]
    differ: Differ,
}

impl Document {
    /// Empty document
    pub fn new() -> Self {
        Self::from_root(ModelElement::root())
    }

    /// Wrap an existing tree without recording any change
    pub fn from_root(root: ModelElement) -> Self {
        Self {
            root,
            differ: Differ::new(),
        }
    }

    pub fn root(&self) -> &ModelElement {
        &self.root
    }

    pub fn into_root(self) -> ModelElement {
        self.root
    }

    /// Node at `path` (the root element itself has no node)
    pub fn node(&self, path: &Path) -> Option<&ModelNode> {
        let (last, parents) = path.indices().split_last()?;
        let mut element = &self.root;
        for index in parents {
            element = element.children.get(*index)?.as_element()?;
        }
        element.children.get(*last)
    }

    pub fn element(&self, path: &Path) -> Option<&ModelElement> {
        if path.is_root() {
            return Some(&self.root);
        }
        self.node(path)?.as_element()
    }

    /// Element names from the root down to the element at `path`, inclusive
    pub fn context(&self, path: &Path) -> Option<Vec<&str>> {
        let mut names = vec![self.root.name.as_str()];
        let mut element = &self.root;
        for index in path.indices() {
            element = element.children.get(*index)?.as_element()?;
            names.push(element.name.as_str());
        }
        Some(names)
    }

    pub fn changes(&self) -> &[Change] {
        self.differ.changes()
    }

    pub fn take_changes(&mut self) -> Vec<Change> {
        self.differ.take()
    }

    /// Insert `nodes` at `position`, in order
    pub fn insert(&mut self, position: &Position, nodes: Vec<ModelNode>) -> ModelResult<()> {
        let parent = self.expect_element_mut(&position.parent)?;
        let len = parent.children.len();
        if position.offset > len {
            return Err(ModelError::OffsetOutOfRange {
                path: position.parent.clone(),
                offset: position.offset,
                len,
            });
        }

        let names: Vec<String> = nodes.iter().map(|node| node.name().to_string()).collect();
        parent.children.splice(position.offset..position.offset, nodes);

        let op = Operation::Insert {
            position: position.clone(),
            count: names.len(),
        };
        let recorded = names.into_iter().enumerate().map(|(i, name)| Change::Insert {
            path: position.parent.child(position.offset + i),
            name,
        });
        self.differ.record(Some(&op), recorded);
        Ok(())
    }

    /// Remove the node at `path` and return it
    pub fn remove(&mut self, path: &Path) -> ModelResult<ModelNode> {
        let position = Position::before(path).ok_or(ModelError::RootOperation("removed"))?;
        let parent = self.expect_element_mut(&position.parent)?;
        if position.offset >= parent.children.len() {
            return Err(ModelError::NodeNotFound(path.clone()));
        }
        let removed = parent.children.remove(position.offset);

        let op = Operation::Remove {
            position: position.clone(),
            count: 1,
        };
        let name = removed.name().to_string();
        self.differ.record(Some(&op), [Change::Remove { position, name }]);
        Ok(removed)
    }

    /// Replace the element at `path` with its children
    pub fn unwrap(&mut self, path: &Path) -> ModelResult<()> {
        let position = Position::before(path).ok_or(ModelError::RootOperation("unwrapped"))?;
        let parent = self.expect_element_mut(&position.parent)?;

        match parent.children.get(position.offset) {
            None => return Err(ModelError::NodeNotFound(path.clone())),
            Some(ModelNode::Text { .. }) => return Err(ModelError::NotAnElement(path.clone())),
            Some(ModelNode::Element(_)) => {}
        }
        let ModelNode::Element(element) = parent.children.remove(position.offset) else {
            return Err(ModelError::NotAnElement(path.clone()));
        };

        let child_names: Vec<String> = element
            .children
            .iter()
            .map(|child| child.name().to_string())
            .collect();
        let count = child_names.len();
        parent
            .children
            .splice(position.offset..position.offset, element.children);

        let op = Operation::Unwrap {
            path: path.clone(),
            child_count: count,
        };
        let mut recorded: Vec<Change> = child_names
            .into_iter()
            .enumerate()
            .map(|(i, name)| Change::Insert {
                path: position.parent.child(position.offset + i),
                name,
            })
            .collect();
        recorded.push(Change::Remove {
            position: Position::new(position.parent.clone(), position.offset + count),
            name: element.name,
        });
        self.differ.record(Some(&op), recorded);
        Ok(())
    }

    /// Set an attribute, returning the previous value
    pub fn set_attribute(
        &mut self,
        path: &Path,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> ModelResult<Option<String>> {
        let key = key.into();
        let value = value.into();
        let element = self.expect_element_mut(path)?;
        let old_value = element.attributes.insert(key.clone(), value.clone());

        self.differ.record(
            None,
            [Change::Attribute {
                path: path.clone(),
                key,
                old_value: old_value.clone(),
                new_value: Some(value),
            }],
        );
        Ok(old_value)
    }

    /// Remove an attribute, returning the previous value
    pub fn remove_attribute(&mut self, path: &Path, key: &str) -> ModelResult<Option<String>> {
        let element = self.expect_element_mut(path)?;
        let old_value = element.attributes.remove(key);

        if old_value.is_some() {
            self.differ.record(
                None,
                [Change::Attribute {
                    path: path.clone(),
                    key: key.to_string(),
                    old_value: old_value.clone(),
                    new_value: None,
                }],
            );
        }
        Ok(old_value)
    }

    fn expect_element_mut(&mut self, path: &Path) -> ModelResult<&mut ModelElement> {
        if !path.is_root() {
            match self.node(path) {
                None => return Err(ModelError::NodeNotFound(path.clone())),
                Some(ModelNode::Text { .. }) => return Err(ModelError::NotAnElement(path.clone())),
                Some(ModelNode::Element(_)) => {}
            }
        }

        let mut element = &mut self.root;
        for index in path.indices() {
            element = element
                .children
                .get_mut(*index)
                .and_then(ModelNode::as_element_mut)
                .ok_or_else(|| ModelError::NodeNotFound(path.clone()))?;
        }
        Ok(element)
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
