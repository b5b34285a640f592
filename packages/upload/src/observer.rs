use crate::file::UploadFile;
use crate::response::UploadedFile;
use crate::state::UploadProgress;

/// Host hooks around an upload
///
/// All methods default to no-ops. `index` is the value `init_file` returned
/// for this upload.
pub trait UploadObserver: Send + Sync {
    /// External rule check run after the built-in policy; an `Err` message
    /// rejects the upload before any network activity
    fn check_rules(&self, _file: &UploadFile) -> Result<(), String> {
        Ok(())
    }

    fn init_file(&self, _file: &UploadFile) -> usize {
        0
    }

    fn on_uploading(&self, _progress: UploadProgress, _index: usize) {}

    fn on_error(&self, _message: &str, _index: usize) {}

    fn on_success(&self, _file: &UploadedFile, _index: usize) {}
}

/// Observer that does nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl UploadObserver for NoopObserver {}
