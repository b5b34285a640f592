//! # Postkit Upload
//!
//! File upload transport for editor attachments and images.
//!
//! An upload validates the file against [`UploadConfig`] policy, posts it as
//! multipart form data with progress reporting, and resolves to a normalized
//! [`UploadedFile`] or an [`UploadError`]. Uploads can be aborted at any time
//! through their [`UploadHandle`].
//!
//! ```rust,ignore
//! let uploader = Uploader::new(config).on_uploaded(|file| println!("{}", file.urls.default));
//! let mut handle = uploader.start(UploadFile::from_path(path).await?);
//! while let Some(tick) = handle.progress.recv().await {
//!     println!("{}/{}", tick.sent, tick.total);
//! }
//! let outcome = handle.finish().await;
//! ```

pub mod config;
pub mod error;
pub mod file;
pub mod observer;
pub mod policy;
pub mod response;
pub mod state;
pub mod transport;

pub use config::UploadConfig;
pub use error::UploadError;
pub use file::UploadFile;
pub use observer::{NoopObserver, UploadObserver};
pub use response::{UploadResponse, UploadUrls, UploadedFile};
pub use state::{UploadOutcome, UploadProgress, UploadState, UploadStatus};
pub use transport::{UploadHandle, Uploader, UploadedCallback, CHUNK_SIZE};
