//! # Upload Transport
//!
//! One background task per upload:
//!
//! ```text
//! policy → rule check → multipart POST (streamed, progress) → normalize
//!                             ↑
//!                   cancel token / timeout
//! ```
//!
//! The task reports progress on an unbounded channel and the current
//! [`UploadState`] on a watch channel. It ends in exactly one
//! [`UploadOutcome`]. Once cancelled it emits no further progress and drops
//! the request, which releases the connection.

use crate::config::UploadConfig;
use crate::error::UploadError;
use crate::file::UploadFile;
use crate::observer::{NoopObserver, UploadObserver};
use crate::policy;
use crate::response::{UploadResponse, UploadedFile};
use crate::state::{UploadOutcome, UploadProgress, UploadState};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Url};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

/// Bytes per body chunk; one progress tick per chunk
pub const CHUNK_SIZE: usize = 16 * 1024;

/// Completion side effect installed by the host
pub type UploadedCallback = Arc<dyn Fn(&UploadedFile) + Send + Sync>;

#[derive(Clone)]
pub struct Uploader {
    config: UploadConfig,
    client: Client,
    observer: Arc<dyn UploadObserver>,
    on_uploaded: Option<UploadedCallback>,
}

impl fmt::Debug for Uploader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Uploader")
            .field("config", &self.config)
            .field("on_uploaded", &self.on_uploaded.is_some())
            .finish()
    }
}

impl Uploader {
    pub fn new(config: UploadConfig) -> Self {
        Self {
            config,
            client: Client::new(),
            observer: Arc::new(NoopObserver),
            on_uploaded: None,
        }
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    pub fn with_observer(mut self, observer: Arc<dyn UploadObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn on_uploaded(mut self, callback: impl Fn(&UploadedFile) + Send + Sync + 'static) -> Self {
        self.on_uploaded = Some(Arc::new(callback));
        self
    }

    pub fn config(&self) -> &UploadConfig {
        &self.config
    }

    /// Spawn the upload on the current tokio runtime
    pub fn start(&self, file: UploadFile) -> UploadHandle {
        let (progress_tx, progress_rx) = mpsc::unbounded_channel();
        let (state_tx, state_rx) = watch::channel(UploadState::pending(&file.name, file.size));
        let cancel = CancellationToken::new();

        let uploader = self.clone();
        let token = cancel.clone();
        let file_name = file.name.clone();
        let join = tokio::spawn(async move { uploader.run(file, progress_tx, state_tx, token).await });

        UploadHandle {
            file_name,
            progress: progress_rx,
            state: state_rx,
            _abort_on_drop: cancel.clone().drop_guard(),
            cancel,
            join,
        }
    }

    /// Upload and wait for the outcome, ignoring progress
    pub async fn upload(&self, file: UploadFile) -> UploadOutcome {
        self.start(file).finish().await
    }

    async fn run(
        self,
        file: UploadFile,
        progress: mpsc::UnboundedSender<UploadProgress>,
        state: watch::Sender<UploadState>,
        cancel: CancellationToken,
    ) -> UploadOutcome {
        let name = file.name.clone();
        info!(file = %name, size = file.size, endpoint = %self.config.endpoint(), "upload started");

        let outcome = self.execute(file, progress, &state, &cancel).await;
        match &outcome {
            UploadOutcome::Succeeded(uploaded) => {
                info!(file = %name, upload_id = %uploaded.upload_id, "upload finished")
            }
            UploadOutcome::Failed(err) => warn!(file = %name, error = %err, "upload failed"),
            UploadOutcome::Aborted => info!(file = %name, "upload aborted"),
        }

        state.send_modify(|state| {
            state.finish(&outcome);
        });
        outcome
    }

    async fn execute(
        &self,
        file: UploadFile,
        progress: mpsc::UnboundedSender<UploadProgress>,
        state: &watch::Sender<UploadState>,
        cancel: &CancellationToken,
    ) -> UploadOutcome {
        if let Err(err) = policy::check(&self.config, &file) {
            return UploadOutcome::Failed(err);
        }
        if let Err(message) = self.observer.check_rules(&file) {
            return UploadOutcome::Failed(UploadError::RuleRejected(message));
        }

        let index = self.observer.init_file(&file);
        if cancel.is_cancelled() {
            return UploadOutcome::Aborted;
        }

        let generic = policy::generic_error(&file.name);
        let url = match Url::parse(&self.config.endpoint()) {
            Ok(url) => url,
            Err(err) => {
                return self.failed(
                    UploadError::InvalidEndpoint(format!("{}: {}", self.config.endpoint(), err)),
                    index,
                )
            }
        };

        let form = self.form(file, progress, state.clone(), cancel.clone(), index);
        let request = self.client.post(url).multipart(form).send();
        let exchange = async move { request.await?.bytes().await };

        let timeout_secs = self.config.timeout_secs;
        let deadline = async move {
            match timeout_secs {
                Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
                None => std::future::pending::<()>().await,
            }
        };

        let body = tokio::select! {
            biased;

            _ = cancel.cancelled() => return UploadOutcome::Aborted,
            _ = deadline => {
                return self.failed(
                    UploadError::Timeout {
                        message: generic,
                        secs: timeout_secs.unwrap_or_default(),
                    },
                    index,
                );
            }
            result = exchange => match result {
                Ok(body) => body,
                Err(err) => {
                    return self.failed(
                        UploadError::Transport {
                            message: generic,
                            detail: err.to_string(),
                        },
                        index,
                    );
                }
            },
        };

        // The status code is judged from the payload, not from HTTP
        let response: UploadResponse = match serde_json::from_slice(&body) {
            Ok(response) => response,
            Err(err) => {
                return self.failed(
                    UploadError::MalformedResponse {
                        message: generic,
                        detail: err.to_string(),
                    },
                    index,
                )
            }
        };

        if response.code != 0 {
            let message = response.msg.filter(|msg| !msg.is_empty()).unwrap_or(generic);
            return self.failed(
                UploadError::Rejected {
                    code: response.code,
                    message,
                },
                index,
            );
        }

        let Some(data) = response.data else {
            return self.failed(
                UploadError::MalformedResponse {
                    message: generic,
                    detail: "response has no data".to_string(),
                },
                index,
            );
        };

        if cancel.is_cancelled() {
            return UploadOutcome::Aborted;
        }

        let uploaded = UploadedFile::from(data);
        if let Some(callback) = &self.on_uploaded {
            callback(&uploaded);
        }
        self.observer.on_success(&uploaded, index);
        UploadOutcome::Succeeded(uploaded)
    }

    fn failed(&self, err: UploadError, index: usize) -> UploadOutcome {
        self.observer.on_error(&err.to_string(), index);
        UploadOutcome::Failed(err)
    }

    /// Multipart body: the configured fields, then the file streamed in
    /// chunks that report progress as the transport pulls them
    fn form(
        &self,
        file: UploadFile,
        progress: mpsc::UnboundedSender<UploadProgress>,
        state: watch::Sender<UploadState>,
        cancel: CancellationToken,
        index: usize,
    ) -> Form {
        let total = file.size;
        let observer = self.observer.clone();
        let chunks: Vec<Vec<u8>> = file.bytes.chunks(CHUNK_SIZE).map(<[u8]>::to_vec).collect();

        let mut sent = 0u64;
        let stream = futures_util::stream::iter(chunks).map(move |chunk| {
            sent += chunk.len() as u64;
            if !cancel.is_cancelled() {
                let tick = UploadProgress { sent, total };
                debug!(sent, total, "upload progress");
                // The caller may have dropped the receiver
                let _ = progress.send(tick);
                state.send_modify(|state| state.advance(sent));
                observer.on_uploading(tick, index);
            }
            Ok::<_, std::io::Error>(chunk)
        });

        let part = Part::stream_with_length(Body::wrap_stream(stream), total).file_name(file.name);

        let form = self
            .config
            .upload_params
            .iter()
            .fold(Form::new(), |form, (key, value)| form.text(key.clone(), value.clone()));
        form.part(self.config.file_field.clone(), part)
    }
}

/// Caller side of a running upload
///
/// Dropping the handle aborts the upload.
#[derive(Debug)]
pub struct UploadHandle {
    file_name: String,
    /// Progress ticks, closed when the upload ends
    pub progress: mpsc::UnboundedReceiver<UploadProgress>,
    state: watch::Receiver<UploadState>,
    cancel: CancellationToken,
    _abort_on_drop: DropGuard,
    join: JoinHandle<UploadOutcome>,
}

impl UploadHandle {
    /// Request cancellation; the outcome becomes [`UploadOutcome::Aborted`]
    /// unless the upload already finished
    pub fn abort(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Current state snapshot
    pub fn state(&self) -> UploadState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UploadState> {
        self.state.clone()
    }

    /// Wait for the terminal outcome
    pub async fn finish(self) -> UploadOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(err) => UploadOutcome::Failed(UploadError::Transport {
                message: policy::generic_error(&self.file_name),
                detail: err.to_string(),
            }),
        }
    }
}
