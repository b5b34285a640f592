use crate::path::Path;
use thiserror::Error;

pub type ModelResult<T> = Result<T, ModelError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("No node at {0}")]
    NodeNotFound(Path),

    #[error("Node at {0} is not an element")]
    NotAnElement(Path),

    #[error("Offset {offset} is out of range for {path} ({len} children)")]
    OffsetOutOfRange { path: Path, offset: usize, len: usize },

    #[error("The root element cannot be {0}")]
    RootOperation(&'static str),
}
