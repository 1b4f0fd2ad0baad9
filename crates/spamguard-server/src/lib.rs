//! HTTP service: routes, shared state, CORS, and the serve loop.

mod config;
mod error;
mod routes;

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::http::{Method, header};
use axum::routing::{get, post};
use spamguard_ai::{LazyModel, SourceLoader, SpamClassifier};
use spamguard_core::Vocabulary;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

pub use config::{ConfigError, DEFAULT_BIND, MODEL_ENV, ServerConfig};
pub use error::ApiError;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub classifier: SpamClassifier,
}

/// Build the application router.
///
/// With `cors` set, every response (errors included) carries
/// `Access-Control-Allow-Origin: *`.
pub fn router(state: AppState, cors: bool) -> Router {
    let app = Router::new()
        .route(
            "/api/spam",
            post(routes::classify_spam).fallback(routes::method_not_allowed),
        )
        .route("/health", get(routes::health))
        .with_state(state);

    if cors { app.layer(cors_layer()) } else { app }
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
}

/// Load the vocabulary, wire up the model, and serve until Ctrl-C.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    config.validate()?;

    let vocab = Vocabulary::load(&config.vocab_path).context("loading vocabulary")?;
    let model = LazyModel::new(SourceLoader::new(config.model.clone(), config.backend));
    if config.preload {
        model.preload().await.context("preloading model")?;
    }

    let state = AppState {
        classifier: SpamClassifier::new(Arc::new(vocab), Arc::new(model)),
    };
    let app = router(state, config.cors);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("binding {}", config.bind))?;
    info!(
        addr = %config.bind,
        backend = %config.backend,
        model = %config.model,
        preload = config.preload,
        cors = config.cors,
        "spamguard listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server")?;
    info!("shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use spamguard_ai::{InferenceBackend, ModelError, ModelLoader, StaticLoader};
    use spamguard_core::EncodedSequence;
    use tower::ServiceExt;

    struct Fixed(f64);

    #[async_trait]
    impl InferenceBackend for Fixed {
        fn name(&self) -> &'static str {
            "fixed"
        }

        async fn predict(&self, _input: &EncodedSequence) -> Result<f64, ModelError> {
            Ok(self.0)
        }
    }

    struct Unreachable;

    #[async_trait]
    impl ModelLoader for Unreachable {
        async fn load(&self) -> Result<Arc<dyn InferenceBackend>, ModelError> {
            Err(ModelError::Load("connection refused".into()))
        }

        fn describe(&self) -> String {
            "unreachable".into()
        }
    }

    fn vocab() -> Arc<Vocabulary> {
        let lookup: HashMap<String, i64> = [("buy", 5), ("now", 6), ("free", 7), ("money", 8)]
            .into_iter()
            .map(|(w, i)| (w.to_string(), i))
            .collect();
        Arc::new(Vocabulary::new(lookup, 0, 2, 1))
    }

    fn app_with(model: LazyModel, cors: bool) -> Router {
        let state = AppState {
            classifier: SpamClassifier::new(vocab(), Arc::new(model)),
        };
        router(state, cors)
    }

    fn app(probability: f64) -> Router {
        app_with(LazyModel::new(StaticLoader(Arc::new(Fixed(probability)))), true)
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/spam")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::ORIGIN, "https://example.com")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(resp: Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn is_json(resp: &Response) -> bool {
        resp.headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("application/json"))
    }

    fn allows_any_origin(resp: &Response) -> bool {
        resp.headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .is_some_and(|v| v == "*")
    }

    #[tokio::test]
    async fn classifies_spam() {
        let resp = app(0.95)
            .oneshot(post_json(r#"{"text": "buy now free money"}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(is_json(&resp));
        assert!(allows_any_origin(&resp));
        let body = json_body(resp).await;
        assert_eq!(body["isSpam"], true);
        assert!((body["spamProbability"].as_f64().unwrap() - 0.95).abs() < 1e-6);
    }

    #[tokio::test]
    async fn classifies_ham() {
        let resp = app(0.3)
            .oneshot(post_json(r#"{"text": "lunch tomorrow?"}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["isSpam"], false);
    }

    #[tokio::test]
    async fn missing_text_is_bad_request() {
        let resp = app(0.5).oneshot(post_json("{}")).await.unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert!(is_json(&resp));
        assert!(allows_any_origin(&resp));
        assert_eq!(json_body(resp).await, json!({ "error": "Text is required" }));
    }

    #[tokio::test]
    async fn empty_text_is_bad_request() {
        let resp = app(0.5).oneshot(post_json(r#"{"text": ""}"#)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn get_is_method_not_allowed() {
        let req = Request::builder()
            .method(Method::GET)
            .uri("/api/spam")
            .body(Body::empty())
            .unwrap();
        let resp = app(0.5).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert!(is_json(&resp));
        assert!(allows_any_origin(&resp));
        assert_eq!(json_body(resp).await, json!({ "error": "Method not allowed" }));
    }

    #[tokio::test]
    async fn model_load_failure_is_internal_error() {
        let resp = app_with(LazyModel::new(Unreachable), true)
            .oneshot(post_json(r#"{"text": "free money"}"#))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(allows_any_origin(&resp));
        assert_eq!(
            json_body(resp).await,
            json!({ "error": "Internal server error" })
        );
    }

    #[tokio::test]
    async fn malformed_json_is_internal_error() {
        let resp = app(0.5).oneshot(post_json("{not json")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(resp).await,
            json!({ "error": "Internal server error" })
        );
    }

    #[tokio::test]
    async fn null_body_is_internal_error() {
        let resp = app(0.5).oneshot(post_json("null")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(allows_any_origin(&resp));
        assert_eq!(
            json_body(resp).await,
            json!({ "error": "Internal server error" })
        );
    }

    #[tokio::test]
    async fn no_cors_headers_when_disabled() {
        let app = app_with(LazyModel::new(StaticLoader(Arc::new(Fixed(0.1)))), false);
        let resp = app.oneshot(post_json(r#"{"text": "hi"}"#)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
    }

    #[tokio::test]
    async fn preflight_advertises_methods() {
        let req = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/spam")
            .header(header::ORIGIN, "https://example.com")
            .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
            .body(Body::empty())
            .unwrap();
        let resp = app(0.5).oneshot(req).await.unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let methods = resp
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(methods.contains("POST"));
        assert!(methods.contains("DELETE"));
    }

    #[tokio::test]
    async fn health_reports_lazy_model() {
        let app = app(0.5);

        let health = || {
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap()
        };

        let resp = app.clone().oneshot(health()).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["modelLoaded"], false);

        let resp = app
            .clone()
            .oneshot(post_json(r#"{"text": "buy"}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let resp = app.oneshot(health()).await.unwrap();
        let body = json_body(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["modelLoaded"], true);
    }
}
