use serde::{Deserialize, Serialize};

use crate::models::NutritionEntry;

/// Body of `POST /api/analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(rename = "photoDataUri")]
    pub photo_data_uri: String,
}

#[derive(Debug, Deserialize)]
pub struct IngredientsRequest {
    #[serde(rename = "foodName")]
    pub food_name: String,
}

#[derive(Debug, Serialize)]
pub struct IngredientsResponse {
    pub ingredients: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct BreakdownRequest {
    #[serde(rename = "foodName")]
    pub food_name: String,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct BreakdownResponse {
    #[serde(rename = "nutritionalInformation")]
    pub nutritional_information: String,
    pub entries: Vec<NutritionEntry>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

// Axum integration (optional - requires axum dependency)
#[cfg(feature = "web-server")]
pub mod server {
    use super::*;
    use axum::{
        body::Bytes,
        extract::{DefaultBodyLimit, State},
        http::{header, HeaderMap, StatusCode},
        response::{IntoResponse, Response},
        routing::{get, post},
        Json, Router,
    };
    use std::sync::Arc;
    use tower::ServiceBuilder;
    use tower_http::limit::RequestBodyLimitLayer;

    use crate::handlers::session::{AnalysisView, SessionController, SessionError};
    use crate::models::NutritionFacts;
    use crate::services::analysis::{AnalysisError, FoodAnalyzer};
    use crate::services::intake::{self, ImageCandidate};
    use crate::services::nutrition;

    pub struct AppState {
        pub analyzer: Arc<FoodAnalyzer>,
        pub session: SessionController,
    }

    pub fn create_router(analyzer: Arc<FoodAnalyzer>, max_body_bytes: usize) -> Router {
        let state = Arc::new(AppState {
            session: SessionController::new(analyzer.clone()),
            analyzer,
        });

        // JSON bodies carry the image base64 encoded (4 bytes per 3), plus framing.
        let json_body_limit = max_body_bytes.div_ceil(3) * 4 + 1024;

        Router::new()
            .route("/", get(root_handler))
            .route("/health", get(health_check))
            .route("/api/analyze", post(analyze_handler))
            .route("/api/ingredients", post(ingredients_handler))
            .route("/api/nutrition", post(nutrition_handler))
            .route("/api/session", get(session_view_handler))
            .route(
                "/api/session/image",
                post(session_image_handler).layer(RequestBodyLimitLayer::new(max_body_bytes)),
            )
            .route("/api/session/analyze", post(session_analyze_handler))
            .route("/api/session/reset", post(session_reset_handler))
            .layer(
                ServiceBuilder::new()
                    .layer(DefaultBodyLimit::disable())
                    .layer(RequestBodyLimitLayer::new(json_body_limit)),
            )
            .with_state(state)
    }

    fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
        (
            status,
            Json(ErrorBody {
                error: message.into(),
            }),
        )
            .into_response()
    }

    fn analysis_error_response(err: AnalysisError) -> Response {
        let status = match err {
            AnalysisError::EmptyFoodName => StatusCode::BAD_REQUEST,
            AnalysisError::Failed | AnalysisError::LookupFailed => StatusCode::BAD_GATEWAY,
        };
        error_response(status, err.to_string())
    }

    fn session_error_response(err: SessionError) -> Response {
        let status = match &err {
            SessionError::Busy | SessionError::InvalidTransition { .. } => StatusCode::CONFLICT,
            SessionError::NoImageSelected => StatusCode::BAD_REQUEST,
            SessionError::Rejected(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
        };
        log::warn!("⚠️ Session request refused: {}", err);
        error_response(status, err.to_string())
    }

    async fn analyze_handler(
        State(state): State<Arc<AppState>>,
        Json(request): Json<AnalyzeRequest>,
    ) -> Response {
        let image = match intake::parse_payload(&request.photo_data_uri) {
            Ok(image) => image,
            Err(e) => {
                log::warn!("🚫 Invalid image payload: {}", e);
                return error_response(StatusCode::BAD_REQUEST, e.to_string());
            }
        };

        match state.analyzer.analyze(&image).await {
            Ok(result) => (StatusCode::OK, Json(AnalysisView::from_result(&result))).into_response(),
            Err(e) => analysis_error_response(e),
        }
    }

    async fn ingredients_handler(
        State(state): State<Arc<AppState>>,
        Json(request): Json<IngredientsRequest>,
    ) -> Response {
        match state.analyzer.list_ingredients(&request.food_name).await {
            Ok(ingredients) => (StatusCode::OK, Json(IngredientsResponse { ingredients })).into_response(),
            Err(e) => analysis_error_response(e),
        }
    }

    async fn nutrition_handler(
        State(state): State<Arc<AppState>>,
        Json(request): Json<BreakdownRequest>,
    ) -> Response {
        match state
            .analyzer
            .nutritional_breakdown(&request.food_name, &request.ingredients)
            .await
        {
            Ok(text) => {
                let entries = nutrition::normalize(&NutritionFacts::Text(text.clone()));
                (
                    StatusCode::OK,
                    Json(BreakdownResponse {
                        nutritional_information: text,
                        entries,
                    }),
                )
                    .into_response()
            }
            Err(e) => analysis_error_response(e),
        }
    }

    async fn session_view_handler(State(state): State<Arc<AppState>>) -> Response {
        Json(state.session.view()).into_response()
    }

    /// Raw image upload; the `Content-Type` header is the declared file type.
    async fn session_image_handler(
        State(state): State<Arc<AppState>>,
        headers: HeaderMap,
        body: Bytes,
    ) -> Response {
        let declared_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();
        log::info!("📸 Image selected: {} ({} bytes)", declared_type, body.len());

        match state
            .session
            .select_image(ImageCandidate::new(declared_type, body.to_vec()))
        {
            Ok(view) => Json(view).into_response(),
            Err(e) => session_error_response(e),
        }
    }

    async fn session_analyze_handler(State(state): State<Arc<AppState>>) -> Response {
        match state.session.analyze().await {
            Ok(view) => Json(view).into_response(),
            Err(e) => session_error_response(e),
        }
    }

    async fn session_reset_handler(State(state): State<Arc<AppState>>) -> Response {
        match state.session.reset() {
            Ok(view) => Json(view).into_response(),
            Err(e) => session_error_response(e),
        }
    }

    async fn root_handler() -> &'static str {
        "FoodWise analysis server - POST a photo to /api/analyze or /api/session/image"
    }

    async fn health_check() -> &'static str {
        "OK"
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::services::analysis::tests::{sample_reply, FakeProvider};
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        fn app(provider: Arc<FakeProvider>) -> Router {
            create_router(Arc::new(FoodAnalyzer::new(provider)), 1024 * 1024)
        }

        async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
            let response = app.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
            (status, json)
        }

        fn post_json(uri: &str, body: serde_json::Value) -> Request<Body> {
            Request::post(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap()
        }

        fn post_empty(uri: &str) -> Request<Body> {
            Request::post(uri).body(Body::empty()).unwrap()
        }

        fn post_image(content_type: &str, bytes: Vec<u8>) -> Request<Body> {
            Request::post("/api/session/image")
                .header(header::CONTENT_TYPE, content_type)
                .header(header::CONTENT_LENGTH, bytes.len())
                .body(Body::from(bytes))
                .unwrap()
        }

        #[tokio::test]
        async fn test_analyze_endpoint_success() {
            let provider = Arc::new(FakeProvider::replying(sample_reply()));
            let app = app(provider.clone());

            let (status, json) = send(
                &app,
                post_json("/api/analyze", serde_json::json!({"photoDataUri": "data:image/jpeg;base64,/9j/4A=="})),
            )
            .await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["foodName"], "Nasi Goreng");
            assert_eq!(json["nutritionEntries"][0]["icon"], "Flame");
            assert_eq!(provider.calls(), 1);
        }

        #[tokio::test]
        async fn test_analyze_endpoint_hides_provider_detail() {
            let provider = Arc::new(FakeProvider::failing("stack trace with api key"));
            let app = app(provider);

            let (status, json) = send(
                &app,
                post_json("/api/analyze", serde_json::json!({"photoDataUri": "data:image/png;base64,iVBORw=="})),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_GATEWAY);
            assert_eq!(json["error"], "Gagal menganalisis makanan dari gambar.");
        }

        #[tokio::test]
        async fn test_analyze_endpoint_rejects_unsupported_payload() {
            let provider = Arc::new(FakeProvider::replying(sample_reply()));
            let app = app(provider.clone());

            let (status, _) = send(
                &app,
                post_json("/api/analyze", serde_json::json!({"photoDataUri": "data:image/gif;base64,R0lGODlh"})),
            )
            .await;

            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(provider.calls(), 0);
        }

        #[tokio::test]
        async fn test_session_flow() {
            let provider = Arc::new(FakeProvider::replying(sample_reply()));
            let app = app(provider.clone());

            let (status, json) = send(&app, post_image("image/gif", vec![1, 2, 3])).await;
            assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
            assert!(json["error"].as_str().unwrap().contains("image/gif"));

            let (_, json) = send(&app, Request::get("/api/session").body(Body::empty()).unwrap()).await;
            assert_eq!(json["status"], "idle");
            assert_eq!(json["preview"], serde_json::Value::Null);

            let (status, _) = send(&app, post_empty("/api/session/analyze")).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);

            let (status, json) = send(&app, post_image("image/jpeg", vec![0xFF, 0xD8, 0xFF, 0xE0])).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["preview"], "data:image/jpeg;base64,/9j/4A==");

            let (status, json) = send(&app, post_empty("/api/session/analyze")).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["status"], "success");
            assert_eq!(json["result"]["foodName"], "Nasi Goreng");
            assert_eq!(provider.calls(), 1);

            let (status, json) = send(&app, post_empty("/api/session/reset")).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(
                json,
                serde_json::json!({"status": "idle", "result": null, "preview": null, "error": null})
            );
        }

        #[tokio::test]
        async fn test_raw_upload_is_capped_at_max_image_bytes() {
            let provider = Arc::new(FakeProvider::replying(sample_reply()));
            let app = create_router(Arc::new(FoodAnalyzer::new(provider)), 3000);

            let (status, _) = send(&app, post_image("image/jpeg", vec![0xFF; 3001])).await;
            assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);

            let (_, json) = send(&app, Request::get("/api/session").body(Body::empty()).unwrap()).await;
            assert_eq!(json["preview"], serde_json::Value::Null);

            let (status, json) = send(&app, post_image("image/jpeg", vec![0xFF; 3000])).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["status"], "idle");
            assert!(json["preview"].is_string());
        }

        #[tokio::test]
        async fn test_json_payload_of_max_size_image_is_accepted() {
            let provider = Arc::new(FakeProvider::replying(sample_reply()));
            let app = create_router(Arc::new(FoodAnalyzer::new(provider.clone())), 3000);

            let image = crate::services::intake::accept(ImageCandidate::new("image/jpeg", vec![0xFF; 3000])).unwrap();
            let (status, _) = send(
                &app,
                post_json("/api/analyze", serde_json::json!({"photoDataUri": image.as_str()})),
            )
            .await;

            assert_eq!(status, StatusCode::OK);
            assert_eq!(provider.calls(), 1);
        }

        #[tokio::test]
        async fn test_lookup_endpoints() {
            let provider = Arc::new(FakeProvider::replying(sample_reply()));
            let app = app(provider);

            let (status, json) = send(&app, post_json("/api/ingredients", serde_json::json!({"foodName": "Nasi Goreng"}))).await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["ingredients"], serde_json::json!(["rice", "egg"]));

            let (status, _) = send(&app, post_json("/api/ingredients", serde_json::json!({"foodName": " "}))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);

            let (status, json) = send(
                &app,
                post_json(
                    "/api/nutrition",
                    serde_json::json!({"foodName": "Nasi Goreng", "ingredients": ["rice"]}),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
            assert_eq!(json["nutritionalInformation"], "Nasi Goreng with rice: Calories: 400 kcal");
            assert_eq!(json["entries"][0]["label"], "Nasi Goreng with rice");
        }
    }
}
