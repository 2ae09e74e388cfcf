//! HTTP sender tests against a local stub registry.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::Router;
use parking_lot::Mutex;
use tollgate::config::ApiConfig;
use tollgate::error::TollgateError;
use tollgate::gate::AdmissionGate;
use tollgate::submit::{
    Description, Document, DocumentSender, HttpSender, Product, SubmissionError,
    SubmissionRequest, SubmissionService,
};

const PATH: &str = "/api/v3/lk/documents/create";

#[derive(Debug, Clone)]
struct Captured {
    content_type: Option<String>,
    signature: Option<String>,
    body: String,
}

#[derive(Clone)]
struct RegistryState {
    captured: Arc<Mutex<Vec<Captured>>>,
    status: StatusCode,
}

async fn create_document(
    State(state): State<RegistryState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, String) {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    state.captured.lock().push(Captured {
        content_type: header("content-type"),
        signature: header("signature"),
        body,
    });

    let reply = if state.status.is_success() {
        r#"{"value":"accepted"}"#
    } else {
        r#"{"error_message":"invalid signature"}"#
    };
    (state.status, reply.to_string())
}

/// Start a stub registry and return its endpoint URL.
async fn spawn_registry(status: StatusCode) -> (String, Arc<Mutex<Vec<Captured>>>) {
    let captured = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new()
        .route(PATH, post(create_document))
        .with_state(RegistryState {
            captured: Arc::clone(&captured),
            status,
        });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}{}", addr, PATH), captured)
}

fn sender_for(url: String) -> HttpSender {
    HttpSender::new(&ApiConfig {
        url,
        ..ApiConfig::default()
    })
    .unwrap()
}

fn sample_document() -> Document {
    Document {
        description: Some(Description {
            participant_inn: "1234567890".to_string(),
        }),
        doc_id: "doc-1".to_string(),
        doc_status: "NEW".to_string(),
        doc_type: "LP_INTRODUCE_GOODS".to_string(),
        import_request: true,
        owner_inn: "7700000001".to_string(),
        participant_inn: "7700000002".to_string(),
        producer_inn: "7700000003".to_string(),
        production_date: "2020-01-23".to_string(),
        production_type: "OWN_PRODUCTION".to_string(),
        products: vec![Product {
            tnved_code: "6401100000".to_string(),
            uit_code: "010463003407001221SxMGorvNuq6Wk".to_string(),
            ..Default::default()
        }],
        reg_date: "2020-01-23".to_string(),
        reg_number: "reg-1".to_string(),
    }
}

#[tokio::test]
async fn test_posts_json_with_signature_header() {
    let (url, captured) = spawn_registry(StatusCode::OK).await;
    let sender = sender_for(url.clone());
    assert_eq!(sender.url(), url);

    let request = SubmissionRequest::new(sample_document(), "c2lnbmF0dXJl");
    let outcome = sender.send(&request).await.unwrap();

    assert_eq!(outcome.status, 200);
    assert_eq!(outcome.body, r#"{"value":"accepted"}"#);

    let captured = captured.lock();
    assert_eq!(captured.len(), 1);
    assert_eq!(captured[0].content_type.as_deref(), Some("application/json"));
    assert_eq!(captured[0].signature.as_deref(), Some("c2lnbmF0dXJl"));

    let body: serde_json::Value = serde_json::from_str(&captured[0].body).unwrap();
    assert_eq!(body["doc_id"], "doc-1");
    assert_eq!(body["importRequest"], true);
    assert_eq!(body["description"]["participantInn"], "1234567890");
    assert_eq!(body["products"][0]["tnved_code"], "6401100000");
}

#[tokio::test]
async fn test_non_success_status_is_an_error() {
    let (url, _captured) = spawn_registry(StatusCode::UNAUTHORIZED).await;
    let sender = sender_for(url);

    let result = sender
        .send(&SubmissionRequest::new(sample_document(), "bad"))
        .await;

    match result {
        Err(SubmissionError::Status { status, body }) => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid signature"));
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_registry_is_a_transport_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let sender = sender_for(format!("http://{}{}", addr, PATH));
    let result = sender
        .send(&SubmissionRequest::new(sample_document(), "sig"))
        .await;

    assert!(matches!(result, Err(SubmissionError::Http(_))));
}

#[tokio::test]
async fn test_service_limits_http_submissions() {
    let (url, captured) = spawn_registry(StatusCode::OK).await;
    let gate = Arc::new(AdmissionGate::new(Duration::from_millis(300), 1).unwrap());
    let service = SubmissionService::new(Arc::clone(&gate), sender_for(url));
    let request = SubmissionRequest::new(sample_document(), "sig");

    let start = Instant::now();
    service.submit(&request).await.unwrap();
    service.submit(&request).await.unwrap();

    assert!(start.elapsed() >= Duration::from_millis(250));
    assert_eq!(captured.lock().len(), 2);
    gate.shutdown();
}

#[tokio::test]
async fn test_rejected_submission_still_consumes_slot() {
    let (url, captured) = spawn_registry(StatusCode::BAD_REQUEST).await;
    let gate = Arc::new(AdmissionGate::new(Duration::from_secs(60), 1).unwrap());
    let service = SubmissionService::new(Arc::clone(&gate), sender_for(url));
    let request = SubmissionRequest::new(sample_document(), "sig");

    let result = service.submit(&request).await;
    assert!(matches!(
        result,
        Err(TollgateError::Submission(SubmissionError::Status { status: 400, .. }))
    ));
    assert_eq!(gate.available(), 0);

    let retry = service
        .submit_until(&request, tokio::time::sleep(Duration::from_millis(50)))
        .await;
    assert!(matches!(retry, Err(TollgateError::Cancelled)));
    assert_eq!(captured.lock().len(), 1);
}

#[tokio::test]
async fn test_unserializable_document_still_consumes_slot() {
    let (url, captured) = spawn_registry(StatusCode::OK).await;
    let gate = Arc::new(AdmissionGate::new(Duration::from_secs(60), 2).unwrap());
    let service = SubmissionService::new(Arc::clone(&gate), sender_for(url));

    // JSON object keys must be strings, so tuple keys cannot be encoded
    let mut document: HashMap<(u8, u8), u8> = HashMap::new();
    document.insert((1, 2), 3);

    let result = service
        .submit(&SubmissionRequest::new(document, "sig"))
        .await;

    assert!(matches!(
        result,
        Err(TollgateError::Submission(SubmissionError::Serialize(_)))
    ));
    assert_eq!(gate.used(), 1);
    assert!(captured.lock().is_empty());
}
