//! Upload transport against a mock endpoint
//!
//! Policy violations must never reach the network, so their mocks expect
//! zero requests.

use postkit_upload::{
    UploadConfig, UploadError, UploadFile, UploadObserver, UploadOutcome, UploadProgress, UploadStatus,
    UploadedFile, Uploader,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> UploadConfig {
    UploadConfig {
        base_url: Some(server.uri()),
        ..Default::default()
    }
}

fn success_body() -> serde_json::Value {
    json!({
        "code": 0,
        "data": { "url": "/f/1.png", "id": "42", "size": 100, "name": "a.png" }
    })
}

async fn mount_success(server: &MockServer, expected: u64) {
    Mock::given(method("POST"))
        .and(path("/attach/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .expect(expected)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_upload_success_is_normalized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/attach/upload"))
        .and(body_string_contains("name=\"upload\"; filename=\"a.png\""))
        .and(body_string_contains("name=\"category\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(success_body()))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = config_for(&server);
    config
        .upload_params
        .insert("category".to_string(), "posts".to_string());

    let uploaded = Arc::new(AtomicUsize::new(0));
    let counter = uploaded.clone();
    let uploader = Uploader::new(config).on_uploaded(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let outcome = uploader.upload(UploadFile::new("a.png", vec![7; 100])).await;

    assert_eq!(
        outcome,
        UploadOutcome::Succeeded(UploadedFile::new("/f/1.png", "42", 100, "a.png"))
    );
    assert_eq!(uploaded.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_progress_is_monotonic_and_reaches_total() {
    let server = MockServer::start().await;
    mount_success(&server, 1).await;

    let uploader = Uploader::new(config_for(&server));
    let mut handle = uploader.start(UploadFile::new("big.png", vec![1; 40_000]));

    let mut ticks: Vec<UploadProgress> = Vec::new();
    while let Some(tick) = handle.progress.recv().await {
        ticks.push(tick);
    }
    let outcome = handle.finish().await;

    assert_eq!(outcome.status(), UploadStatus::Succeeded);
    assert!(!ticks.is_empty());
    assert!(ticks.windows(2).all(|pair| pair[0].sent <= pair[1].sent));
    assert!(ticks.iter().all(|tick| tick.total == 40_000));
    assert_eq!(ticks.last().map(|tick| tick.sent), Some(40_000));
}

#[tokio::test]
async fn test_oversized_file_is_rejected_before_network() {
    let server = MockServer::start().await;
    mount_success(&server, 0).await;

    let config = UploadConfig {
        max_size: 1000,
        ..config_for(&server)
    };
    let outcome = Uploader::new(config)
        .upload(UploadFile::new("huge.png", vec![0; 1001]))
        .await;

    let err = match outcome {
        UploadOutcome::Failed(err) => err,
        other => panic!("expected a failure, got {other:?}"),
    };
    assert!(err.is_policy_violation());
    assert!(err.to_string().contains("huge.png"));
}

#[tokio::test]
async fn test_only_listed_extensions_are_uploaded() {
    let server = MockServer::start().await;
    mount_success(&server, 1).await;

    let config = UploadConfig {
        allow_ext: vec!["png".to_string(), "jpg".to_string()],
        ..config_for(&server)
    };
    let uploader = Uploader::new(config);

    // An extension outside the list is refused even though the list is not empty
    let outcome = uploader.upload(UploadFile::new("tool.exe", vec![1])).await;
    assert_eq!(
        outcome,
        UploadOutcome::Failed(UploadError::ExtensionNotAllowed {
            name: "tool.exe".to_string(),
            extension: "exe".to_string()
        })
    );

    let outcome = uploader.upload(UploadFile::new("photo.PNG", vec![1])).await;
    assert_eq!(outcome.status(), UploadStatus::Succeeded);
}

#[tokio::test]
async fn test_nonzero_code_is_rejected_with_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 1, "msg": "quota exceeded" })))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = Uploader::new(config_for(&server))
        .upload(UploadFile::new("a.png", vec![1]))
        .await;

    assert_eq!(
        outcome,
        UploadOutcome::Failed(UploadError::Rejected {
            code: 1,
            message: "quota exceeded".to_string()
        })
    );
}

#[tokio::test]
async fn test_nonzero_code_without_message_uses_generic_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "code": 500 })))
        .mount(&server)
        .await;

    let outcome = Uploader::new(config_for(&server))
        .upload(UploadFile::new("a.png", vec![1]))
        .await;

    let err = match outcome {
        UploadOutcome::Failed(err) => err,
        other => panic!("expected a failure, got {other:?}"),
    };
    assert_eq!(err.to_string(), "Upload failed: a.png.");
    assert!(!err.is_policy_violation());
}

#[tokio::test]
async fn test_malformed_response_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway error</html>"))
        .mount(&server)
        .await;

    let uploader = Uploader::new(config_for(&server));
    let outcome = uploader.upload(UploadFile::new("a.png", vec![1])).await;
    assert!(matches!(
        outcome,
        UploadOutcome::Failed(UploadError::MalformedResponse { .. })
    ));
}

#[tokio::test]
async fn test_success_code_without_data_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 0 })))
        .mount(&server)
        .await;

    let outcome = Uploader::new(config_for(&server))
        .upload(UploadFile::new("a.png", vec![1]))
        .await;
    assert!(matches!(
        outcome,
        UploadOutcome::Failed(UploadError::MalformedResponse { .. })
    ));
}

#[tokio::test]
async fn test_abort_ends_in_aborted_state() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(success_body())
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let called = Arc::new(AtomicUsize::new(0));
    let counter = called.clone();
    let uploader = Uploader::new(config_for(&server)).on_uploaded(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let handle = uploader.start(UploadFile::new("a.png", vec![1; 10]));
    let mut state = handle.subscribe();
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.abort();

    let outcome = tokio::time::timeout(Duration::from_secs(5), handle.finish())
        .await
        .expect("abort should end the upload promptly");

    assert_eq!(outcome, UploadOutcome::Aborted);
    assert_eq!(state.borrow_and_update().status, UploadStatus::Aborted);
    assert_eq!(called.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_timeout_fails_when_configured() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(success_body())
                .set_delay(Duration::from_secs(10)),
        )
        .mount(&server)
        .await;

    let config = UploadConfig {
        timeout_secs: Some(1),
        ..config_for(&server)
    };
    let outcome = Uploader::new(config)
        .upload(UploadFile::new("a.png", vec![1]))
        .await;

    assert!(matches!(
        outcome,
        UploadOutcome::Failed(UploadError::Timeout { secs: 1, .. })
    ));
}

#[tokio::test]
async fn test_relative_endpoint_without_base_is_invalid() {
    let outcome = Uploader::new(UploadConfig::default())
        .upload(UploadFile::new("a.png", vec![1]))
        .await;

    assert!(matches!(
        outcome,
        UploadOutcome::Failed(UploadError::InvalidEndpoint(_))
    ));
}

#[derive(Default)]
struct RecordingObserver {
    reject: Option<String>,
    events: Mutex<Vec<String>>,
}

impl RecordingObserver {
    fn push(&self, event: String) {
        self.events.lock().unwrap().push(event);
    }
}

impl UploadObserver for RecordingObserver {
    fn check_rules(&self, _file: &UploadFile) -> Result<(), String> {
        match &self.reject {
            Some(message) => Err(message.clone()),
            None => Ok(()),
        }
    }

    fn init_file(&self, file: &UploadFile) -> usize {
        self.push(format!("init {}", file.name));
        3
    }

    fn on_uploading(&self, _progress: UploadProgress, index: usize) {
        self.push(format!("uploading {index}"));
    }

    fn on_error(&self, message: &str, index: usize) {
        self.push(format!("error {index} {message}"));
    }

    fn on_success(&self, file: &UploadedFile, index: usize) {
        self.push(format!("success {index} {}", file.upload_id));
    }
}

#[tokio::test]
async fn test_observer_sees_lifecycle() {
    let server = MockServer::start().await;
    mount_success(&server, 1).await;

    let observer = Arc::new(RecordingObserver::default());
    let uploader = Uploader::new(config_for(&server)).with_observer(observer.clone());
    let outcome = uploader.upload(UploadFile::new("a.png", vec![1; 8])).await;
    assert_eq!(outcome.status(), UploadStatus::Succeeded);

    let events = observer.events.lock().unwrap().clone();
    assert_eq!(events.first().map(String::as_str), Some("init a.png"));
    assert!(events.contains(&"uploading 3".to_string()));
    assert_eq!(events.last().map(String::as_str), Some("success 3 42"));
}

#[tokio::test]
async fn test_observer_rule_rejection_skips_network() {
    let server = MockServer::start().await;
    mount_success(&server, 0).await;

    let observer = Arc::new(RecordingObserver {
        reject: Some("too many attachments".to_string()),
        ..Default::default()
    });
    let outcome = Uploader::new(config_for(&server))
        .with_observer(observer.clone())
        .upload(UploadFile::new("a.png", vec![1]))
        .await;

    assert_eq!(
        outcome,
        UploadOutcome::Failed(UploadError::RuleRejected("too many attachments".to_string()))
    );
    assert!(observer.events.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_dropping_handle_aborts_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(success_body())
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let called = Arc::new(AtomicUsize::new(0));
    let counter = called.clone();
    let observer = Arc::new(RecordingObserver::default());
    let uploader = Uploader::new(config_for(&server))
        .with_observer(observer.clone())
        .on_uploaded(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

    let handle = uploader.start(UploadFile::new("a.png", vec![1; 10]));
    let mut state = handle.subscribe();
    drop(handle);

    tokio::time::timeout(Duration::from_secs(5), async {
        while !state.borrow_and_update().status.is_terminal() {
            if state.changed().await.is_err() {
                break;
            }
        }
    })
    .await
    .expect("dropped upload should end promptly");
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(state.borrow().status, UploadStatus::Aborted);
    assert_eq!(called.load(Ordering::SeqCst), 0);
    assert!(!observer
        .events
        .lock()
        .unwrap()
        .iter()
        .any(|event| event.starts_with("success")));
}
