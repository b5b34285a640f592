//! Error types for the editor

use postkit_model::{ModelError, Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] crate::mutations::MutationError),

    /// The repair pass did not reach a fixed point within its iteration cap
    #[error("Document did not become consistent after {iterations} corrections")]
    Consistency { iterations: usize },

    #[error("Command '{0}' is disabled at this position")]
    CommandDisabled(&'static str),

    #[error("Node at {0} cannot receive an upload result")]
    NotAnUploadTarget(Path),
}
