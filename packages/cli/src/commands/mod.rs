pub mod emotions;
pub mod ingest;
pub mod render;
pub mod upload;

pub use emotions::{emotions, EmotionsArgs};
pub use ingest::{ingest, IngestArgs};
pub use render::{render, RenderArgs};
pub use upload::{upload, UploadArgs};
