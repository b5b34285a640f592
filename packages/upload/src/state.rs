use crate::error::UploadError;
use crate::response::UploadedFile;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Succeeded,
    Failed,
    Aborted,
}

impl UploadStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, UploadStatus::Pending)
    }
}

/// Transport progress tick; `sent` never decreases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UploadProgress {
    pub sent: u64,
    pub total: u64,
}

/// Terminal result of an upload
#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Succeeded(UploadedFile),
    Failed(UploadError),
    Aborted,
}

impl UploadOutcome {
    pub fn status(&self) -> UploadStatus {
        match self {
            UploadOutcome::Succeeded(_) => UploadStatus::Succeeded,
            UploadOutcome::Failed(_) => UploadStatus::Failed,
            UploadOutcome::Aborted => UploadStatus::Aborted,
        }
    }

    pub fn into_result(self) -> Result<UploadedFile, UploadError> {
        match self {
            UploadOutcome::Succeeded(file) => Ok(file),
            UploadOutcome::Failed(err) => Err(err),
            UploadOutcome::Aborted => Err(UploadError::Aborted),
        }
    }
}

/// State of one upload as observed by the caller
#[derive(Debug, Clone, PartialEq)]
pub struct UploadState {
    pub file_name: String,
    pub sent: u64,
    pub total: u64,
    pub status: UploadStatus,
    /// Set once the upload succeeded
    pub result: Option<UploadedFile>,
    /// Set once the upload failed
    pub error: Option<String>,
}

impl UploadState {
    pub fn pending(file_name: impl Into<String>, total: u64) -> Self {
        Self {
            file_name: file_name.into(),
            sent: 0,
            total,
            status: UploadStatus::Pending,
            result: None,
            error: None,
        }
    }

    /// Record progress; ignored once terminal and never moves backwards
    pub fn advance(&mut self, sent: u64) {
        if !self.status.is_terminal() {
            self.sent = self.sent.max(sent.min(self.total));
        }
    }

    /// Enter a terminal state; the first terminal state sticks
    pub fn finish(&mut self, outcome: &UploadOutcome) -> bool {
        if self.status.is_terminal() {
            return false;
        }
        self.status = outcome.status();
        match outcome {
            UploadOutcome::Succeeded(file) => {
                self.sent = self.total;
                self.result = Some(file.clone());
            }
            UploadOutcome::Failed(err) => self.error = Some(err.to_string()),
            UploadOutcome::Aborted => {}
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_is_monotonic() {
        let mut state = UploadState::pending("a.png", 100);
        state.advance(40);
        state.advance(20);
        assert_eq!(state.sent, 40);
        state.advance(500);
        assert_eq!(state.sent, 100);
    }

    #[test]
    fn test_terminal_state_is_final() {
        let mut state = UploadState::pending("a.png", 10);
        assert!(state.finish(&UploadOutcome::Aborted));
        assert!(!state.finish(&UploadOutcome::Succeeded(UploadedFile::new("/f", "1", 10, "a.png"))));

        assert_eq!(state.status, UploadStatus::Aborted);
        assert!(state.result.is_none());

        state.advance(5);
        assert_eq!(state.sent, 0);
    }

    #[test]
    fn test_failure_keeps_message() {
        let mut state = UploadState::pending("a.png", 10);
        state.finish(&UploadOutcome::Failed(UploadError::Rejected {
            code: 1,
            message: "quota exceeded".to_string(),
        }));
        assert_eq!(state.status, UploadStatus::Failed);
        assert_eq!(state.error.as_deref(), Some("quota exceeded"));
    }
}
