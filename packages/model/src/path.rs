//! # Tree addressing
//!
//! A [`Path`] is the list of child indices leading from the root element to a
//! node. A [`Position`] is a gap between two children of an element: the
//! parent's path plus an offset.
//!
//! Both can be transformed by a tree [`Operation`] so that addresses recorded
//! earlier in a batch keep pointing at the same node after later edits. A
//! transform returns `None` when the addressed node no longer exists.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Address of a node, as child indices from the root
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path(Vec<usize>);

impl Path {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(indices: Vec<usize>) -> Self {
        Self(indices)
    }

    pub fn indices(&self) -> &[usize] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }

    pub fn child(&self, index: usize) -> Path {
        let mut indices = self.0.clone();
        indices.push(index);
        Path(indices)
    }

    pub fn parent(&self) -> Option<Path> {
        let (_, rest) = self.0.split_last()?;
        Some(Path(rest.to_vec()))
    }

    /// Index of the node within its parent
    pub fn last(&self) -> Option<usize> {
        self.0.last().copied()
    }

    /// True when `self` addresses a strict ancestor of `other`
    pub fn is_ancestor_of(&self, other: &Path) -> bool {
        other.0.len() > self.0.len() && other.0.starts_with(&self.0)
    }

    pub fn transformed(&self, op: &Operation) -> Option<Path> {
        match op {
            Operation::Insert { position, count } => {
                let mut indices = self.0.clone();
                if position.parent.is_ancestor_of(self) {
                    let slot = &mut indices[position.parent.depth()];
                    if *slot >= position.offset {
                        *slot += count;
                    }
                }
                Some(Path(indices))
            }

            Operation::Remove { position, count } => {
                let mut indices = self.0.clone();
                if position.parent.is_ancestor_of(self) {
                    let slot = &mut indices[position.parent.depth()];
                    if *slot >= position.offset + count {
                        *slot -= count;
                    } else if *slot >= position.offset {
                        return None;
                    }
                }
                Some(Path(indices))
            }

            Operation::Unwrap { path, child_count } => {
                if self == path {
                    return None;
                }
                let parent = path.parent()?;
                let offset = path.last()?;

                if path.is_ancestor_of(self) {
                    let depth = path.depth();
                    let mut indices = parent.0;
                    indices.push(offset + self.0[depth]);
                    indices.extend_from_slice(&self.0[depth + 1..]);
                    return Some(Path(indices));
                }

                let mut indices = self.0.clone();
                if parent.is_ancestor_of(self) {
                    let slot = &mut indices[parent.depth()];
                    if *slot > offset {
                        *slot = *slot + child_count - 1;
                    }
                }
                Some(Path(indices))
            }
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for index in &self.0 {
            write!(f, "/{}", index)?;
        }
        Ok(())
    }
}

/// Gap between children of an element
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub parent: Path,
    pub offset: usize,
}

impl Position {
    pub fn new(parent: Path, offset: usize) -> Self {
        Self { parent, offset }
    }

    /// Position directly before the node at `path`
    pub fn before(path: &Path) -> Option<Position> {
        Some(Position::new(path.parent()?, path.last()?))
    }

    /// Path of the node directly after this position
    pub fn node_after(&self) -> Path {
        self.parent.child(self.offset)
    }

    pub fn transformed(&self, op: &Operation) -> Option<Position> {
        match op {
            Operation::Insert { position, count } => {
                let parent = self.parent.transformed(op)?;
                let offset = if self.parent == position.parent && self.offset > position.offset {
                    self.offset + count
                } else {
                    self.offset
                };
                Some(Position::new(parent, offset))
            }

            Operation::Remove { position, count } => {
                let parent = self.parent.transformed(op)?;
                let offset = if self.parent != position.parent || self.offset <= position.offset {
                    self.offset
                } else if self.offset > position.offset + count {
                    self.offset - count
                } else {
                    position.offset
                };
                Some(Position::new(parent, offset))
            }

            Operation::Unwrap { path, child_count } => {
                let unwrapped_at = Position::before(path)?;
                if &self.parent == path {
                    return Some(Position::new(
                        unwrapped_at.parent,
                        unwrapped_at.offset + self.offset,
                    ));
                }

                let parent = self.parent.transformed(op)?;
                let offset = if self.parent == unwrapped_at.parent && self.offset > unwrapped_at.offset {
                    self.offset + child_count - 1
                } else {
                    self.offset
                };
                Some(Position::new(parent, offset))
            }
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.parent, self.offset)
    }
}

/// Structural tree edit, as seen by recorded addresses
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// `count` nodes inserted at `position`
    Insert { position: Position, count: usize },

    /// `count` nodes removed starting at `position`
    Remove { position: Position, count: usize },

    /// Element at `path` replaced by its `child_count` children
    Unwrap { path: Path, child_count: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(indices: &[usize]) -> Path {
        Path::new(indices.to_vec())
    }

    #[test]
    fn test_display() {
        assert_eq!(Path::root().to_string(), "/");
        assert_eq!(p(&[0, 3]).to_string(), "/0/3");
        assert_eq!(Position::new(p(&[1]), 2).to_string(), "/1@2");
    }

    #[test]
    fn test_insert_shifts_following_siblings_and_their_descendants() {
        let op = Operation::Insert {
            position: Position::new(p(&[0]), 1),
            count: 2,
        };

        assert_eq!(p(&[0, 0]).transformed(&op), Some(p(&[0, 0])));
        assert_eq!(p(&[0, 1]).transformed(&op), Some(p(&[0, 3])));
        assert_eq!(p(&[0, 2, 5]).transformed(&op), Some(p(&[0, 4, 5])));
        assert_eq!(p(&[1, 1]).transformed(&op), Some(p(&[1, 1])));
        assert_eq!(p(&[0]).transformed(&op), Some(p(&[0])));
    }

    #[test]
    fn test_remove_drops_removed_subtree() {
        let op = Operation::Remove {
            position: Position::new(p(&[]), 1),
            count: 1,
        };

        assert_eq!(p(&[1]).transformed(&op), None);
        assert_eq!(p(&[1, 0, 2]).transformed(&op), None);
        assert_eq!(p(&[2, 0]).transformed(&op), Some(p(&[1, 0])));
        assert_eq!(p(&[0, 4]).transformed(&op), Some(p(&[0, 4])));
    }

    #[test]
    fn test_unwrap_lifts_children_into_parent() {
        // Element at /1 with three children is unwrapped.
        let op = Operation::Unwrap {
            path: p(&[1]),
            child_count: 3,
        };

        assert_eq!(p(&[1]).transformed(&op), None);
        assert_eq!(p(&[1, 0]).transformed(&op), Some(p(&[1])));
        assert_eq!(p(&[1, 2, 4]).transformed(&op), Some(p(&[3, 4])));
        assert_eq!(p(&[2]).transformed(&op), Some(p(&[4])));
        assert_eq!(p(&[0, 7]).transformed(&op), Some(p(&[0, 7])));
    }

    #[test]
    fn test_unwrap_of_empty_element_closes_gap() {
        let op = Operation::Unwrap {
            path: p(&[0, 1]),
            child_count: 0,
        };

        assert_eq!(p(&[0, 2]).transformed(&op), Some(p(&[0, 1])));
    }

    #[test]
    fn test_position_collapses_into_removed_range() {
        let op = Operation::Remove {
            position: Position::new(p(&[0]), 1),
            count: 2,
        };

        let inside = Position::new(p(&[0]), 2);
        assert_eq!(inside.transformed(&op), Some(Position::new(p(&[0]), 1)));

        let after = Position::new(p(&[0]), 5);
        assert_eq!(after.transformed(&op), Some(Position::new(p(&[0]), 3)));

        let within_removed = Position::new(p(&[0, 1]), 0);
        assert_eq!(within_removed.transformed(&op), None);
    }

    #[test]
    fn test_position_inside_unwrapped_element_moves_to_parent() {
        let op = Operation::Unwrap {
            path: p(&[2]),
            child_count: 2,
        };

        let inside = Position::new(p(&[2]), 1);
        assert_eq!(inside.transformed(&op), Some(Position::new(p(&[]), 3)));
    }
}
