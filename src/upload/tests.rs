//! Tests for the image upload widget

use super::*;
use crate::http::{ApiClient, ApiClientConfig};
use crate::notify::{MemoryNotifier, Notice};
use crate::session::{MemoryNavigator, MemoryTokenStore};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Widget {
    uploader: ImageUploader,
    notifier: Arc<MemoryNotifier>,
    changes: Arc<Mutex<Vec<ImageValue>>>,
}

impl Widget {
    fn changes(&self) -> Vec<ImageValue> {
        self.changes.lock().unwrap().clone()
    }
}

fn widget(server: &MockServer, options: UploadOptions, initial: Option<ImageValue>) -> Widget {
    let config = ApiClientConfig::builder().base_url(server.uri()).build();
    let client = ApiClient::new(
        config,
        Arc::new(MemoryTokenStore::with_token("admin-token")),
        Arc::new(MemoryNavigator::new("/books/new")),
    )
    .unwrap();

    let notifier = Arc::new(MemoryNotifier::new());
    let changes = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&changes);

    let mut uploader = ImageUploader::new(Arc::new(client), notifier.clone(), options)
        .on_change(move |value| sink.lock().unwrap().push(value.clone()));
    if let Some(value) = initial {
        uploader = uploader.with_value(value);
    }

    Widget {
        uploader,
        notifier,
        changes,
    }
}

fn png(name: &str) -> SelectedFile {
    SelectedFile::new(name, "image/png", format!("png-bytes-of-{name}").into_bytes())
}

/// Respond to uploads of `file_name` with `url`
async fn mount_upload(server: &MockServer, file_name: &str, url: &str) {
    Mock::given(method("POST"))
        .and(path("/upload/single"))
        .and(body_string_contains(format!("filename=\"{file_name}\"")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": {"fileUrl": url}
        })))
        .mount(server)
        .await;
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.unwrap().len()
}

#[tokio::test]
async fn test_three_images_in_multi_mode() {
    let server = MockServer::start().await;
    for n in 1..=3 {
        mount_upload(&server, &format!("p{n}.png"), &format!("https://cdn/p{n}.png")).await;
    }

    let mut w = widget(&server, UploadOptions::multiple(5), None);
    let outcome = w
        .uploader
        .select_files(vec![png("p1.png"), png("p2.png"), png("p3.png")])
        .await;

    let expected = vec![
        "https://cdn/p1.png".to_string(),
        "https://cdn/p2.png".to_string(),
        "https://cdn/p3.png".to_string(),
    ];
    assert_eq!(outcome.uploaded(), expected.as_slice());
    assert_eq!(w.uploader.previews(), expected.as_slice());
    assert_eq!(w.changes(), vec![ImageValue::Multiple(expected)]);
    assert_eq!(
        w.notifier.notices(),
        vec![Notice::success("3 images uploaded successfully")]
    );
    assert!(!w.uploader.is_uploading());
}

#[tokio::test]
async fn test_multi_mode_appends_to_existing() {
    let server = MockServer::start().await;
    mount_upload(&server, "new.png", "https://cdn/new.png").await;

    let mut w = widget(
        &server,
        UploadOptions::multiple(5),
        Some(ImageValue::Multiple(vec!["https://cdn/old.png".into()])),
    );
    w.uploader.select_files(vec![png("new.png")]).await;

    assert_eq!(
        w.uploader.previews(),
        &["https://cdn/old.png".to_string(), "https://cdn/new.png".to_string()]
    );
    assert_eq!(w.notifier.messages(), vec!["1 image uploaded successfully"]);
}

#[tokio::test]
async fn test_batch_over_max_images_rejected_without_upload() {
    let server = MockServer::start().await;
    mount_upload(&server, "a.png", "https://cdn/a.png").await;

    let existing: Vec<String> = (0..4).map(|i| format!("https://cdn/{i}.png")).collect();
    let mut w = widget(
        &server,
        UploadOptions::multiple(5),
        Some(ImageValue::Multiple(existing.clone())),
    );

    let outcome = w
        .uploader
        .select_files(vec![png("a.png"), png("b.png")])
        .await;

    assert_eq!(
        outcome,
        UploadOutcome::Rejected {
            message: "Maximum 5 images allowed".to_string()
        }
    );
    assert_eq!(request_count(&server).await, 0);
    assert_eq!(w.uploader.previews(), existing.as_slice());
    assert!(w.changes().is_empty());
    assert_eq!(
        w.notifier.notices(),
        vec![Notice::error("Maximum 5 images allowed")]
    );
}

#[tokio::test]
async fn test_single_mode_rejects_several_files() {
    let server = MockServer::start().await;

    let mut w = widget(&server, UploadOptions::single(), None);
    let outcome = w
        .uploader
        .select_files(vec![png("a.png"), png("b.png")])
        .await;

    assert!(matches!(outcome, UploadOutcome::Rejected { .. }));
    assert_eq!(w.notifier.messages(), vec!["Please select only one image"]);
    assert_eq!(request_count(&server).await, 0);
    assert!(w.uploader.previews().is_empty());
}

#[tokio::test]
async fn test_empty_selection_is_ignored() {
    let server = MockServer::start().await;

    let mut w = widget(&server, UploadOptions::multiple(3), None);
    let outcome = w.uploader.select_files(Vec::new()).await;

    assert_eq!(outcome, UploadOutcome::Ignored);
    assert!(w.notifier.notices().is_empty());
    assert!(w.changes().is_empty());
}

#[tokio::test]
async fn test_oversized_file_in_single_mode() {
    let server = MockServer::start().await;

    let mut w = widget(&server, UploadOptions::single(), None);
    let big = SelectedFile::new("big.png", "image/png", vec![0u8; 6 * 1024 * 1024]);
    let outcome = w.uploader.select_files(vec![big]).await;

    assert_eq!(
        outcome,
        UploadOutcome::Completed {
            uploaded: Vec::new(),
            skipped: vec![SkippedFile {
                name: "big.png".to_string(),
                reason: SkipReason::TooLarge,
            }],
        }
    );
    assert_eq!(
        w.notifier.messages(),
        vec!["big.png is too large. Maximum size is 5MB"]
    );
    assert_eq!(request_count(&server).await, 0);
    assert!(w.uploader.previews().is_empty());
    assert!(w.changes().is_empty());
}

#[tokio::test]
async fn test_invalid_files_skipped_valid_ones_uploaded() {
    let server = MockServer::start().await;
    mount_upload(&server, "ok.jpg", "https://cdn/ok.jpg").await;

    let mut w = widget(&server, UploadOptions::multiple(5), None);
    let files = vec![
        SelectedFile::new("notes.pdf", "application/pdf", b"%PDF".to_vec()),
        SelectedFile::new("ok.jpg", "image/jpeg", b"jpeg".to_vec()),
        SelectedFile::new("huge.png", "image/png", vec![0u8; 5 * 1024 * 1024 + 1]),
    ];
    let outcome = w.uploader.select_files(files).await;

    assert_eq!(outcome.uploaded(), &["https://cdn/ok.jpg".to_string()]);
    assert_eq!(
        w.notifier.messages(),
        vec![
            "notes.pdf is not an image file",
            "huge.png is too large. Maximum size is 5MB",
            "1 image uploaded successfully",
        ]
    );
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_file_at_size_limit_is_accepted() {
    let server = MockServer::start().await;
    mount_upload(&server, "edge.png", "https://cdn/edge.png").await;

    let mut w = widget(&server, UploadOptions::single(), None);
    let edge = SelectedFile::new("edge.png", "image/png", vec![b'x'; 5 * 1024 * 1024]);
    let outcome = w.uploader.select_files(vec![edge]).await;

    assert_eq!(outcome.uploaded(), &["https://cdn/edge.png".to_string()]);
}

#[tokio::test]
async fn test_response_without_url_is_dropped_silently() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/single"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let mut w = widget(&server, UploadOptions::multiple(5), None);
    let outcome = w.uploader.select_files(vec![png("lost.png")]).await;

    assert_eq!(
        outcome,
        UploadOutcome::Completed {
            uploaded: Vec::new(),
            skipped: Vec::new(),
        }
    );
    assert!(w.notifier.notices().is_empty());
    assert!(w.changes().is_empty());
    assert!(w.uploader.previews().is_empty());
}

#[tokio::test]
async fn test_upload_failure_uses_server_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/single"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "Storage quota exceeded"})),
        )
        .mount(&server)
        .await;

    let mut w = widget(&server, UploadOptions::multiple(5), None);
    let outcome = w.uploader.select_files(vec![png("a.png")]).await;

    assert_eq!(
        outcome,
        UploadOutcome::Failed {
            message: "Storage quota exceeded".to_string(),
            skipped: Vec::new(),
        }
    );
    assert_eq!(
        w.notifier.notices(),
        vec![Notice::error("Storage quota exceeded")]
    );
    assert!(!w.uploader.is_uploading());
    assert!(w.uploader.picker().enabled);
}

#[tokio::test]
async fn test_upload_failure_stops_batch_and_keeps_nothing() {
    let server = MockServer::start().await;
    mount_upload(&server, "first.png", "https://cdn/first.png").await;

    Mock::given(method("POST"))
        .and(path("/upload/single"))
        .and(body_string_contains("filename=\"second.png\""))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let mut w = widget(&server, UploadOptions::multiple(5), None);
    let outcome = w
        .uploader
        .select_files(vec![png("first.png"), png("second.png"), png("third.png")])
        .await;

    assert!(matches!(outcome, UploadOutcome::Failed { ref message, .. } if message == UPLOAD_FAILED_MESSAGE));
    assert!(w.uploader.previews().is_empty());
    assert!(w.changes().is_empty());
    // third.png is never sent
    assert_eq!(request_count(&server).await, 2);
}

#[tokio::test]
async fn test_single_mode_replaces_value() {
    let server = MockServer::start().await;
    mount_upload(&server, "cover.png", "https://cdn/cover.png").await;

    let mut w = widget(
        &server,
        UploadOptions::single().label("Cover"),
        Some(ImageValue::Single("https://cdn/old.png".into())),
    );
    assert!(!w.uploader.picker().enabled);

    w.uploader.select_files(vec![png("cover.png")]).await;

    assert_eq!(w.uploader.previews(), &["https://cdn/cover.png".to_string()]);
    assert_eq!(
        w.changes(),
        vec![ImageValue::Single("https://cdn/cover.png".into())]
    );
}

#[tokio::test]
async fn test_upload_sends_bearer_token_and_file_field() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/single"))
        .and(header("Authorization", "Bearer admin-token"))
        .and(body_string_contains("name=\"file\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"url": "https://cdn/u.png"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut w = widget(&server, UploadOptions::single(), None);
    let outcome = w.uploader.select_files(vec![png("u.png")]).await;

    assert_eq!(outcome.uploaded(), &["https://cdn/u.png".to_string()]);
}

#[tokio::test]
async fn test_custom_settings() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/media"))
        .and(body_string_contains("name=\"image\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"fileUrl": "https://cdn/m.png"})))
        .expect(1)
        .mount(&server)
        .await;

    let mut w = widget(&server, UploadOptions::single(), None);
    w.uploader = w.uploader.with_settings(UploadSettings {
        path: "/media".to_string(),
        field_name: "image".to_string(),
        max_file_size_bytes: 1024,
    });

    let outcome = w.uploader.select_files(vec![png("m.png")]).await;
    assert_eq!(outcome.uploaded(), &["https://cdn/m.png".to_string()]);

    let big = SelectedFile::new("big.png", "image/png", vec![0u8; 2048]);
    w.uploader.remove_at(0);
    w.uploader.select_files(vec![big]).await;
    assert_eq!(
        w.notifier.messages().last().unwrap(),
        "big.png is too large. Maximum size is 1KB"
    );
}

#[tokio::test]
async fn test_remove_at_preserves_order() {
    let server = MockServer::start().await;
    let urls: Vec<String> = ["a", "b", "c", "d"]
        .iter()
        .map(|s| format!("https://cdn/{s}.png"))
        .collect();

    let mut w = widget(
        &server,
        UploadOptions::multiple(5),
        Some(ImageValue::Multiple(urls.clone())),
    );

    assert!(w.uploader.remove_at(1));
    let expected = vec![urls[0].clone(), urls[2].clone(), urls[3].clone()];
    assert_eq!(w.uploader.previews(), expected.as_slice());
    assert_eq!(w.changes(), vec![ImageValue::Multiple(expected)]);

    assert!(!w.uploader.remove_at(10));
    assert_eq!(w.changes().len(), 1);
    assert_eq!(request_count(&server).await, 0);
}

#[tokio::test]
async fn test_remove_in_single_mode_reports_empty_string() {
    let server = MockServer::start().await;

    let mut w = widget(
        &server,
        UploadOptions::single(),
        Some(ImageValue::Single("https://cdn/x.png".into())),
    );
    assert!(w.uploader.remove_at(0));

    assert_eq!(w.changes(), vec![ImageValue::Single(String::new())]);
    assert!(w.uploader.picker().enabled);
}

#[tokio::test]
async fn test_picker_state() {
    let server = MockServer::start().await;

    let w = widget(
        &server,
        UploadOptions::multiple(3).accept("image/png,image/jpeg"),
        Some(ImageValue::Multiple(vec!["a".into(), "b".into()])),
    );
    let picker = w.uploader.picker();
    assert!(picker.enabled);
    assert_eq!(picker.indicator(), Some("2/3".to_string()));
    assert_eq!(picker.accept, "image/png,image/jpeg");

    let full = widget(
        &server,
        UploadOptions::multiple(2),
        Some(ImageValue::Multiple(vec!["a".into(), "b".into()])),
    );
    assert!(!full.uploader.picker().enabled);

    let single = widget(&server, UploadOptions::single(), None);
    let picker = single.uploader.picker();
    assert!(picker.enabled);
    assert_eq!(picker.indicator(), None);
}

#[test]
fn test_image_value_seeding() {
    assert!(ImageValue::Single(String::new()).into_previews().is_empty());
    assert_eq!(
        ImageValue::Single("u".into()).into_previews(),
        vec!["u".to_string()]
    );
    assert_eq!(
        ImageValue::Multiple(vec!["a".into(), "a".into()]).into_previews(),
        vec!["a".to_string(), "a".to_string()]
    );
}

#[test]
fn test_image_value_serializes_untagged() {
    assert_eq!(
        serde_json::to_value(ImageValue::Single("u".into())).unwrap(),
        json!("u")
    );
    assert_eq!(
        serde_json::to_value(ImageValue::Multiple(vec!["a".into()])).unwrap(),
        json!(["a"])
    );
}

#[tokio::test]
async fn test_selected_file_from_path() {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("poster.jpg");
    std::fs::write(&file_path, b"jpeg-data").unwrap();

    let file = SelectedFile::from_path(&file_path).await.unwrap();
    assert_eq!(file.name, "poster.jpg");
    assert_eq!(file.content_type, "image/jpeg");
    assert_eq!(file.size, 9);
    assert!(file.is_image());

    let missing = SelectedFile::from_path(dir.path().join("nope.png")).await;
    assert!(matches!(
        missing,
        Err(crate::error::Error::FileNotFound { .. })
    ));
}

#[tokio::test]
async fn test_expired_session_during_upload_uses_generic_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/single"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let mut w = widget(&server, UploadOptions::single(), None);
    let outcome = w.uploader.select_files(vec![png("a.png")]).await;

    assert_eq!(
        outcome,
        UploadOutcome::Failed {
            message: UPLOAD_FAILED_MESSAGE.to_string(),
            skipped: Vec::new(),
        }
    );
    assert_eq!(w.notifier.messages(), vec![UPLOAD_FAILED_MESSAGE]);
    assert!(w.uploader.previews().is_empty());
}

#[tokio::test]
async fn test_uploading_flag_set_for_whole_batch() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/single"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"url": "https://cdn/slow.png"}))
                .set_delay(Duration::from_millis(400)),
        )
        .mount(&server)
        .await;

    let mut w = widget(&server, UploadOptions::multiple(5), None);
    let flag = w.uploader.uploading_flag();
    assert!(!flag.is_set());

    let watcher = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        flag.is_set()
    };
    let (outcome, mid_batch) = tokio::join!(w.uploader.select_files(vec![png("a.png")]), watcher);

    assert!(mid_batch);
    assert_eq!(outcome.uploaded(), ["https://cdn/slow.png".to_string()].as_slice());
    assert!(!flag.is_set());
    assert!(w.uploader.picker().enabled);
}

#[tokio::test]
async fn test_uploading_flag_reset_after_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/upload/single"))
        .respond_with(ResponseTemplate::new(500).set_delay(Duration::from_millis(400)))
        .mount(&server)
        .await;

    let mut w = widget(&server, UploadOptions::single(), None);
    let flag = w.uploader.uploading_flag();

    let watcher = async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        flag.is_set()
    };
    let (outcome, mid_batch) = tokio::join!(w.uploader.select_files(vec![png("a.png")]), watcher);

    assert!(mid_batch);
    assert!(matches!(outcome, UploadOutcome::Failed { .. }));
    assert!(!flag.is_set());
    assert!(w.uploader.picker().enabled);
}
