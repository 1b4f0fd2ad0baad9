//! Request handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Serialize;
use serde_json::Value;
use spamguard_core::Verdict;

use crate::AppState;
use crate::error::ApiError;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub model_loaded: bool,
}

/// `POST /api/spam` with `{"text": "..."}`.
pub async fn classify_spam(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Verdict>, ApiError> {
    let body: Value =
        serde_json::from_slice(&body).map_err(|e| ApiError::BadBody(e.to_string()))?;
    let text = required_text(&body)?;
    let verdict = state.classifier.classify(text).await?;
    Ok(Json(verdict))
}

/// Any method other than POST on the classify route.
pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        model_loaded: state.classifier.model().is_loaded(),
    })
}

/// The `text` field, rejecting missing and falsy values (`null`, `""`,
/// `false`, `0`). Truthy non-strings cannot be tokenized and are a server-side
/// failure rather than a validation error, as is a `null` body, which has no
/// fields to read.
fn required_text(body: &Value) -> Result<&str, ApiError> {
    if body.is_null() {
        return Err(ApiError::BadBody("body is null".into()));
    }
    match body.get("text") {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Err(ApiError::TextRequired),
        Some(Value::String(s)) if s.is_empty() => Err(ApiError::TextRequired),
        Some(Value::Number(n)) if n.as_f64() == Some(0.0) => Err(ApiError::TextRequired),
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(ApiError::BadBody(format!("text is not a string: {other}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_present() {
        assert_eq!(required_text(&json!({ "text": "hello" })).unwrap(), "hello");
    }

    #[test]
    fn falsy_text_is_required_error() {
        for body in [
            json!({}),
            json!({ "text": null }),
            json!({ "text": "" }),
            json!({ "text": false }),
            json!({ "text": 0 }),
            json!([]),
            json!("text"),
            json!(7),
        ] {
            assert!(
                matches!(required_text(&body), Err(ApiError::TextRequired)),
                "expected 400 for {body}"
            );
        }
    }

    #[test]
    fn truthy_non_string_is_server_error() {
        for body in [json!({ "text": 42 }), json!({ "text": ["a"] }), json!({ "text": true })] {
            assert!(matches!(required_text(&body), Err(ApiError::BadBody(_))));
        }
    }

    #[test]
    fn null_body_is_server_error() {
        assert!(matches!(required_text(&Value::Null), Err(ApiError::BadBody(_))));
    }

    #[test]
    fn whitespace_only_text_is_accepted() {
        assert_eq!(required_text(&json!({ "text": "   " })).unwrap(), "   ");
    }
}
