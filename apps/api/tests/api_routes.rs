use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use factcheck::analysis::{Lexicon, Prompt, RequestBuilder, ResponseInterpreter};
use factcheck::detector::Detector;
use factcheck::llm_client::{Completion, LlmBackend, LlmError};
use factcheck::routes::build_router;
use factcheck::state::AppState;

const FAKE_REPLY: &str = "PREDICTION: FAKE NEWS\nCONFIDENCE: 99%\nSOURCE QUALITY: Poor\nFACTUAL ACCURACY: Low\nRED FLAGS: Sensational headline, Lack of sources\nREASONING: Extraordinary claim without evidence.";

enum Behaviour {
    Reply(&'static str),
    Fail(fn() -> LlmError),
}

struct CannedBackend(Behaviour);

#[async_trait]
impl LlmBackend for CannedBackend {
    fn model(&self) -> &str {
        "canned"
    }

    async fn complete(&self, _prompt: &Prompt) -> Result<Completion, LlmError> {
        match &self.0 {
            Behaviour::Reply(text) => Ok(Completion {
                text: text.to_string(),
                model: "canned".to_string(),
                finish_reason: Some("STOP".to_string()),
            }),
            Behaviour::Fail(make) => Err(make()),
        }
    }
}

fn app(behaviour: Behaviour) -> Router {
    let detector = Detector::new(
        RequestBuilder::new(500),
        ResponseInterpreter::new(&Lexicon::default(), 10).unwrap(),
        Arc::new(CannedBackend(behaviour)),
        2,
    );
    build_router(AppState {
        detector,
        max_batch_size: 3,
    })
}

async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn health_reports_model() {
    let (status, body) = send(app(Behaviour::Reply(FAKE_REPLY)), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["model"], "canned");
}

#[tokio::test]
async fn root_and_models_describe_the_service() {
    let (status, body) = send(app(Behaviour::Reply(FAKE_REPLY)), "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["endpoints"]["POST /api/v1/predict"].is_string());

    let (status, body) = send(app(Behaviour::Reply(FAKE_REPLY)), "GET", "/models", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["gemini"]["name"], "canned");
}

#[tokio::test]
async fn predict_single_returns_every_field() {
    let (status, body) = send(
        app(Behaviour::Reply(FAKE_REPLY)),
        "POST",
        "/api/v1/predict/single",
        Some(json!({"text": "Celebrity cures cancer with lemons"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["text"], "Celebrity cures cancer with lemons");
    assert_eq!(body["prediction"], "FAKE");
    assert!((body["confidence"].as_f64().unwrap() - 0.99).abs() < 1e-9);
    assert_eq!(body["source_quality"], "Poor");
    assert_eq!(body["factual_accuracy"], "Low");
    assert_eq!(
        body["red_flags"],
        json!(["Sensational headline", "Lack of sources"])
    );
    assert_eq!(body["reasoning"], "Extraordinary claim without evidence.");
    assert_eq!(body["degraded"], false);
    assert_eq!(body["low_confidence_parse"], false);
    assert_eq!(body["input_truncated"], false);
}

#[tokio::test]
async fn predict_single_off_format_reply_is_degraded_not_an_error() {
    let (status, body) = send(
        app(Behaviour::Reply("This seems mostly fine.")),
        "POST",
        "/api/v1/predict/single",
        Some(json!({"text": "Town fair opens Saturday"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "REAL");
    assert_eq!(body["confidence"], 0.5);
    assert_eq!(body["source_quality"], "Fair");
    assert_eq!(body["factual_accuracy"], "Medium");
    assert_eq!(body["degraded"], true);
    assert_eq!(body["low_confidence_parse"], true);
}

#[tokio::test]
async fn predict_single_rejects_blank_text() {
    let (status, body) = send(
        app(Behaviour::Reply(FAKE_REPLY)),
        "POST",
        "/api/v1/predict/single",
        Some(json!({"text": "  \n "})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn predict_batch_returns_results_in_order() {
    let (status, body) = send(
        app(Behaviour::Reply(FAKE_REPLY)),
        "POST",
        "/api/v1/predict",
        Some(json!({"texts": ["one", "two"]})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_texts"], 2);
    assert_eq!(body["model_type"], "gemini");
    assert_eq!(body["results"].as_array().unwrap().len(), 2);
    assert_eq!(body["results"][1]["prediction"], "FAKE");
}

#[tokio::test]
async fn predict_batch_validates_size_and_content() {
    let cases = [
        json!({"texts": []}),
        json!({"texts": ["a", "b", "c", "d"]}),
        json!({"texts": ["a", " "]}),
    ];
    for payload in cases {
        let (status, body) = send(
            app(Behaviour::Reply(FAKE_REPLY)),
            "POST",
            "/api/v1/predict",
            Some(payload),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}

#[tokio::test]
async fn predict_batch_names_blank_index() {
    let (_, body) = send(
        app(Behaviour::Reply(FAKE_REPLY)),
        "POST",
        "/api/v1/predict",
        Some(json!({"texts": ["a", " "]})),
    )
    .await;
    assert_eq!(body["error"]["message"], "texts[1] cannot be empty");
}

#[tokio::test]
async fn llm_failures_map_to_gateway_statuses() {
    let (status, body) = send(
        app(Behaviour::Fail(|| LlmError::RateLimited { retries: 3 })),
        "POST",
        "/api/v1/predict/single",
        Some(json!({"text": "anything"})),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"]["code"], "RATE_LIMITED");

    let (status, body) = send(
        app(Behaviour::Fail(|| LlmError::EmptyContent)),
        "POST",
        "/api/v1/predict/single",
        Some(json!({"text": "anything"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "LLM_ERROR");
}
