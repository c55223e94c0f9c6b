/*!
 * HTTP model backend tests against a local stand-in server
 */

use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use finlate::errors::ModelError;
use finlate::providers::{DecodingParams, HttpModel, HttpModelConfig, TranslationModel};
use finlate::translation::core::{ModelService, ServiceOptions};
use finlate::translation::pipeline::{PipelineConfig, Route, TranslationPipeline};

use crate::common::minimal_document;

type Handler = Arc<dyn Fn(usize, &str, &Value) -> (u16, String) + Send + Sync>;

/// Minimal HTTP/1.1 server answering one request per connection
struct FakeModelServer {
    endpoint: String,
    requests: Arc<Mutex<Vec<Value>>>,
    hits: Arc<AtomicUsize>,
}

impl FakeModelServer {
    async fn start(handler: Handler) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let endpoint = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let hits = Arc::new(AtomicUsize::new(0));

        let recorded = Arc::clone(&requests);
        let counter = Arc::clone(&hits);
        tokio::spawn(async move {
            loop {
                let Ok((stream, _)) = listener.accept().await else {
                    break;
                };
                let index = counter.fetch_add(1, Ordering::SeqCst);
                let handler = Arc::clone(&handler);
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    serve_one(stream, index, handler, recorded).await;
                });
            }
        });

        Self {
            endpoint,
            requests,
            hits,
        }
    }

    fn requests(&self) -> Vec<Value> {
        self.requests.lock().clone()
    }

    fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

async fn serve_one(
    mut stream: TcpStream,
    index: usize,
    handler: Handler,
    recorded: Arc<Mutex<Vec<Value>>>,
) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let read = match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => n,
        };
        buffer.extend_from_slice(&chunk[..read]);
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let request_line = head.lines().next().unwrap_or_default().to_string();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buffer.len() < header_end + content_length {
        match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buffer.extend_from_slice(&chunk[..n]),
        }
    }

    let body: Value = serde_json::from_slice(&buffer[header_end..]).unwrap_or(Value::Null);
    if !body.is_null() {
        recorded.lock().push(body.clone());
    }

    let path = request_line.split_whitespace().nth(1).unwrap_or("/").to_string();
    let (status, response_body) = handler(index, &path, &body);
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        if status < 400 { "OK" } else { "Error" },
        response_body.len(),
        response_body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

/// Stand-in translation: known terms, otherwise a placeholder
fn translate_texts(body: &Value) -> String {
    let texts = body["texts"].as_array().cloned().unwrap_or_default();
    let translations: Vec<String> = texts
        .iter()
        .map(|t| match t.as_str().unwrap_or_default() {
            "الأصول" => "Assets".to_string(),
            "النقد" => "Cash".to_string(),
            other => format!("text of {} chars", other.chars().count()),
        })
        .collect();
    json!({ "translations": translations }).to_string()
}

fn model_for(endpoint: &str, max_retries: u32) -> HttpModel {
    HttpModel::new(HttpModelConfig {
        endpoint: endpoint.to_string(),
        model: "Helsinki-NLP/opus-mt-ar-en".to_string(),
        source_language: "ar".to_string(),
        target_language: "en".to_string(),
        timeout_secs: 5,
        max_retries,
        retry_backoff_ms: 10,
        max_new_tokens: 256,
    })
}

fn texts(items: &[&str]) -> Vec<String> {
    items.iter().map(|t| t.to_string()).collect()
}

#[tokio::test]
async fn test_translateBatch_shouldPostTextsAndDecodingParams() {
    let server = FakeModelServer::start(Arc::new(|_, _, body| (200, translate_texts(body)))).await;
    let model = model_for(&server.endpoint, 0);

    let params = DecodingParams::new(8, 3).with_length_penalty(0.8);
    let out = model
        .translate_batch(&texts(&["الأصول", "النقد"]), &params)
        .await
        .unwrap();

    assert_eq!(out, vec!["Assets", "Cash"]);
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["num_beams"], 8);
    assert_eq!(requests[0]["no_repeat_ngram_size"], 3);
    assert_eq!(requests[0]["max_new_tokens"], 256);
    assert_eq!(requests[0]["model"], "Helsinki-NLP/opus-mt-ar-en");
    assert_eq!(requests[0]["texts"][1], "النقد");
}

#[tokio::test]
async fn test_translateBatch_withServerError_shouldRetryThenSucceed() {
    let server = FakeModelServer::start(Arc::new(|index, _, body| {
        if index == 0 {
            (500, r#"{"detail":"CUDA out of memory"}"#.to_string())
        } else {
            (200, translate_texts(body))
        }
    }))
    .await;
    let model = model_for(&server.endpoint, 2);

    let out = model
        .translate_batch(&texts(&["الأصول"]), &DecodingParams::default())
        .await
        .unwrap();

    assert_eq!(out, vec!["Assets"]);
    assert_eq!(server.hits(), 2);
}

#[tokio::test]
async fn test_translateBatch_withClientError_shouldNotRetry() {
    let server = FakeModelServer::start(Arc::new(|_, _, _| {
        (422, r#"{"detail":"texts must be a list"}"#.to_string())
    }))
    .await;
    let model = model_for(&server.endpoint, 3);

    let result = model
        .translate_batch(&texts(&["الأصول"]), &DecodingParams::default())
        .await;

    assert!(matches!(result, Err(ModelError::ApiError { status_code: 422, .. })));
    assert_eq!(server.hits(), 1);
}

#[tokio::test]
async fn test_translateBatch_withWrongCount_shouldReportMismatch() {
    let server = FakeModelServer::start(Arc::new(|_, _, _| {
        (200, r#"{"translations":["only one"]}"#.to_string())
    }))
    .await;
    let model = model_for(&server.endpoint, 0);

    let result = model
        .translate_batch(&texts(&["الأصول", "النقد"]), &DecodingParams::default())
        .await;

    assert!(matches!(
        result,
        Err(ModelError::BatchSizeMismatch { expected: 2, actual: 1 })
    ));
}

#[tokio::test]
async fn test_translateBatch_withGarbageBody_shouldFailToParse() {
    let server = FakeModelServer::start(Arc::new(|_, _, _| (200, "<html>".to_string()))).await;
    let model = model_for(&server.endpoint, 0);

    let result = model
        .translate_batch(&texts(&["الأصول"]), &DecodingParams::default())
        .await;
    assert!(matches!(result, Err(ModelError::ParseError(_))));
}

#[tokio::test]
async fn test_healthCheck_shouldHitHealthEndpoint() {
    let server = FakeModelServer::start(Arc::new(|_, path, _| {
        if path == "/health" {
            (200, r#"{"status":"ok"}"#.to_string())
        } else {
            (404, "{}".to_string())
        }
    }))
    .await;

    assert!(model_for(&server.endpoint, 0).health_check().await.is_ok());
}

#[tokio::test]
async fn test_healthCheck_withNoServer_shouldBeUnavailable() {
    // Bind then drop to get a port nobody listens on
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let result = model_for(&endpoint, 0).health_check().await;
    assert!(matches!(result, Err(ModelError::Unavailable(_))));
}

/// The whole pipeline over the HTTP backend
#[tokio::test]
async fn test_pipeline_overHttpModel_shouldTranslateMinimalDocument() {
    let server = FakeModelServer::start(Arc::new(|_, _, body| (200, translate_texts(body)))).await;
    let model: Arc<dyn TranslationModel> = Arc::new(model_for(&server.endpoint, 0));
    let service = Arc::new(ModelService::new(model, ServiceOptions::default()));
    let pipeline = TranslationPipeline::new(service, PipelineConfig::default()).unwrap();

    let result = pipeline.run(&minimal_document()).await.unwrap();

    assert_eq!(result.plan.ops[0].text, "Assets");
    assert_eq!(result.plan.ops[0].route, Route::Model);
    assert_eq!(result.plan.ops[1].text, "123");
    // The number never reached the server
    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0]["texts"], json!(["الأصول"]));
}
