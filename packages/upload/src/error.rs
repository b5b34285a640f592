use thiserror::Error;

/// Why an upload did not succeed
///
/// Every error is terminal for its attempt; retrying means starting a new
/// upload.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UploadError {
    #[error("{name}: file is too large")]
    FileTooLarge { name: String, size: u64, max_size: u64 },

    #[error("{name}: file type is not allowed")]
    ExtensionNotAllowed { name: String, extension: String },

    /// Rejected by an observer's rule check
    #[error("{0}")]
    RuleRejected(String),

    #[error("{message}")]
    Transport { message: String, detail: String },

    /// The endpoint answered with a non-zero status code
    #[error("{message}")]
    Rejected { code: i64, message: String },

    #[error("{message}")]
    MalformedResponse { message: String, detail: String },

    #[error("Upload aborted")]
    Aborted,

    #[error("Invalid upload endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("{message}")]
    Timeout { message: String, secs: u64 },
}

impl UploadError {
    /// Raised before any network activity
    pub fn is_policy_violation(&self) -> bool {
        matches!(
            self,
            UploadError::FileTooLarge { .. }
                | UploadError::ExtensionNotAllowed { .. }
                | UploadError::RuleRejected(_)
        )
    }
}
