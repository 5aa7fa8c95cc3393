//! HTTP gateway for answerline.
//!
//! Stands in for the pipeline host: `POST /answer` takes `{ "question": ... }`
//! and returns `[{ "output": ... }]`; `GET /health` reports liveness.
//!
//! Built on Axum.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::State,
    response::Json,
    routing::{get, post},
};
use serde::Serialize;
use tracing::info;

use answerline_config::AppConfig;
use answerline_core::event::EventBus;
use answerline_orchestrator::{AnswerOrchestrator, AnswerOutput, HostInput, OrchestratorSettings};
use answerline_providers::RouterError;

/// Request bodies above this size are rejected with 413.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Shared application state for the gateway.
pub struct GatewayState {
    pub orchestrator: AnswerOrchestrator,
}

type SharedState = Arc<GatewayState>;

/// Wire providers, models, and tools from `config` into an orchestrator.
pub fn build_orchestrator(
    config: &AppConfig,
    event_bus: Arc<EventBus>,
) -> Result<AnswerOrchestrator, RouterError> {
    let router = answerline_providers::build_from_config(config);
    let models = answerline_providers::build_model_handles(config, &router)?;
    let tools = Arc::new(answerline_tools::registry_from_config(&config.tools));

    Ok(AnswerOrchestrator::new(models, tools, event_bus)
        .with_settings(OrchestratorSettings::from_config(config)))
}

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/answer", post(answer_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let orchestrator = build_orchestrator(&config, Arc::new(EventBus::default()))?;
    info!(
        models = config.models.len(),
        tools = ?orchestrator.tools().names(),
        bind_tools_to = %orchestrator.settings().bind_tools_to,
        "Orchestrator ready"
    );

    let app = build_router(Arc::new(GatewayState { orchestrator }));

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn answer_handler(
    State(state): State<SharedState>,
    Json(input): Json<HostInput>,
) -> Json<Vec<AnswerOutput>> {
    info!(question_len = input.question.len(), "Question received");
    Json(state.orchestrator.run(&input).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use answerline_core::error::ProviderError;
    use answerline_core::message::Message;
    use answerline_core::model::ModelHandle;
    use answerline_core::provider::{Provider, ProviderRequest, ProviderResponse};
    use answerline_core::tool::ToolRegistry;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    /// A mock provider that echoes the question back.
    struct EchoProvider;

    #[async_trait::async_trait]
    impl Provider for EchoProvider {
        fn name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            request: ProviderRequest,
        ) -> Result<ProviderResponse, ProviderError> {
            let question = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(ProviderResponse {
                message: Message::assistant(format!("echo: {question}")),
                usage: None,
                model: request.model,
            })
        }
    }

    fn test_state(models: Vec<ModelHandle>) -> SharedState {
        let orchestrator = AnswerOrchestrator::new(
            models,
            Arc::new(ToolRegistry::new()),
            Arc::new(EventBus::default()),
        );
        Arc::new(GatewayState { orchestrator })
    }

    fn echo_state() -> SharedState {
        test_state(vec![ModelHandle::new(Arc::new(EchoProvider), "llama3")])
    }

    fn post_answer(body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/answer")
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.into())
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(echo_state());

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();

        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn answer_returns_output_array() {
        let app = build_router(echo_state());

        let response = app
            .oneshot(post_answer(r#"{"question": "What is Rust?"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!([{ "output": "echo: What is Rust?" }])
        );
    }

    #[tokio::test]
    async fn orchestration_failure_is_still_ok_with_error_text() {
        let app = build_router(test_state(vec![]));

        let response = app
            .oneshot(post_answer(r#"{"question": "hi"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            serde_json::json!([{ "output": "No secondary model available for tool binding" }])
        );
    }

    #[tokio::test]
    async fn missing_question_is_rejected() {
        let app = build_router(echo_state());

        let response = app.oneshot(post_answer("{}")).await.unwrap();
        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let app = build_router(echo_state());

        let big = format!(r#"{{"question": "{}"}}"#, "a".repeat(MAX_BODY_BYTES + 1));
        let response = app.oneshot(post_answer(big)).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn orchestrator_from_default_config() {
        let orchestrator =
            build_orchestrator(&AppConfig::default(), Arc::new(EventBus::default())).unwrap();
        assert_eq!(
            orchestrator.models().primary().unwrap().model_id(),
            "gpt-4o-mini"
        );
        assert_eq!(
            orchestrator.models().secondary().unwrap().model_id(),
            "llama-3.3-70b-versatile"
        );
        assert!(orchestrator.tools().is_empty());
    }

    #[test]
    fn orchestrator_requires_models() {
        let config = AppConfig {
            models: vec![],
            ..Default::default()
        };
        let err = build_orchestrator(&config, Arc::new(EventBus::default())).unwrap_err();
        assert!(matches!(err, RouterError::NoModels));
    }
}
