//! The HTTP surface: one generation endpoint plus a health check.
//!
//! Thin by design — validate, call the generator, build the font, encode,
//! respond. A failure at any step aborts the whole request with a JSON
//! error envelope; there are no retries and no partial results.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use base64::{engine::general_purpose, Engine as _};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::CorsLayer;

use crate::{
    font,
    generator::{ConlangPrompt, LanguageGenerator},
    language::{Grammar, Phonetics},
    GlossforgeError,
};

#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<dyn LanguageGenerator>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/generate", post(generate_language))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    pub name: String,
    pub vibe: String,
    pub description: String,
    pub complexity: i64,
}

impl GenerateRequest {
    fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() || self.name.chars().count() > 100 {
            return Err("name must be between 1 and 100 characters".to_string());
        }
        if self.vibe.is_empty() || self.vibe.chars().count() > 100 {
            return Err("vibe must be between 1 and 100 characters".to_string());
        }
        if self.description.is_empty() || self.description.chars().count() > 2000 {
            return Err("description must be between 1 and 2000 characters".to_string());
        }
        if !(1..=10).contains(&self.complexity) {
            return Err("complexity must be between 1 and 10".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub grammar: Grammar,
    pub phonetics: Phonetics,
    pub dictionary: IndexMap<String, String>,
    #[serde(rename = "fontBase64")]
    pub font_base64: String,
    #[serde(rename = "languageName")]
    pub language_name: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn generate_language(
    State(state): State<AppState>,
    Json(payload): Json<GenerateRequest>,
) -> Response {
    if let Err(details) = payload.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Invalid request body".to_string(),
                details,
            }),
        )
            .into_response();
    }

    let prompt = ConlangPrompt {
        name: payload.name.clone(),
        vibe: payload.vibe,
        description: payload.description,
        complexity: payload.complexity as u8,
    };

    let result = match state.generator.generate(&prompt).await {
        Ok(result) => result,
        Err(e) => {
            log::error!("Conlang generation failed: {e}");
            return internal_error(&e);
        }
    };

    let font_bytes = match font::build_font(&payload.name, &result.alphabet_mapping) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("Font build failed: {e}");
            return internal_error(&e);
        }
    };

    (
        StatusCode::OK,
        Json(GenerateResponse {
            grammar: result.grammar,
            phonetics: result.phonetics,
            dictionary: result.dictionary,
            font_base64: general_purpose::STANDARD.encode(&font_bytes),
            language_name: payload.name,
        }),
    )
        .into_response()
}

fn internal_error(err: &GlossforgeError) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Failed to generate language".to_string(),
            details: err.to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::language::LanguageResult;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    struct StubGenerator {
        calls: AtomicUsize,
    }

    impl StubGenerator {
        fn new() -> Arc<Self> {
            Arc::new(StubGenerator {
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl LanguageGenerator for StubGenerator {
        async fn generate(
            &self,
            _prompt: &ConlangPrompt,
        ) -> Result<LanguageResult, GlossforgeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(sample_result())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl LanguageGenerator for FailingGenerator {
        async fn generate(
            &self,
            _prompt: &ConlangPrompt,
        ) -> Result<LanguageResult, GlossforgeError> {
            Err(GlossforgeError::Generation("model unavailable".to_string()))
        }
    }

    fn sample_result() -> LanguageResult {
        crate::language::parse_language_result(
            r#"{
                "grammar": {"word_order": "VSO", "noun_cases": ["nom", "acc"]},
                "phonetics": {"vowels": "a i u", "consonants": "p t k s m n"},
                "dictionary": {"sola": "sun", "mira": "sea"},
                "alphabet_mapping": {"A": "circle", "B": "line", "C": "wave"}
            }"#,
        )
        .unwrap()
    }

    fn request_body(complexity: i64) -> String {
        json!({
            "name": "Test",
            "vibe": "mystical",
            "description": "flowing sounds",
            "complexity": complexity,
        })
        .to_string()
    }

    async fn post_generate(app: Router, body: String) -> axum::response::Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/generate")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let app = router(AppState {
            generator: StubGenerator::new(),
        });
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await, json!({"status": "ok"}));
    }

    #[tokio::test]
    async fn out_of_range_complexity_is_rejected_before_generation() {
        let generator = StubGenerator::new();
        let app = router(AppState {
            generator: generator.clone(),
        });
        let response = post_generate(app, request_body(15)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Invalid request body");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_fields_are_rejected() {
        let app = router(AppState {
            generator: StubGenerator::new(),
        });
        let body = json!({
            "name": "",
            "vibe": "mystical",
            "description": "flowing",
            "complexity": 5,
        })
        .to_string();
        let response = post_generate(app, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert!(body["details"]
            .as_str()
            .unwrap()
            .contains("name must be between"));
    }

    #[tokio::test]
    async fn generates_language_and_font() {
        let generator = StubGenerator::new();
        let app = router(AppState {
            generator: generator.clone(),
        });
        let response = post_generate(app, request_body(5)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["languageName"], "Test");
        assert_eq!(body["grammar"]["word_order"], "VSO");
        assert_eq!(body["dictionary"]["sola"], "sun");
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

        let font_bytes = general_purpose::STANDARD
            .decode(body["fontBase64"].as_str().unwrap())
            .unwrap();
        assert!(font_bytes.len() > 100);
        assert_eq!(&font_bytes[0..4], &[0x00, 0x01, 0x00, 0x00]);
    }

    #[tokio::test]
    async fn upstream_failure_maps_to_500() {
        let app = router(AppState {
            generator: Arc::new(FailingGenerator),
        });
        let response = post_generate(app, request_body(5)).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert_eq!(body["error"], "Failed to generate language");
        assert!(body["details"]
            .as_str()
            .unwrap()
            .contains("model unavailable"));
    }
}
