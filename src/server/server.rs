use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, DefaultBodyLimit, Multipart,
        State,
    },
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

use super::metrics::metrics_handler;
use super::{log_requests, state::*, ServerConfig};
use crate::extraction::{normalize_attributes, AttributeExtractor, ImageDescriber};
use crate::recommend::{QueryError, RecommendationRequest, RecommendationService};

const INTEGER_FIELDS_ERROR: &str = "Calories and time must be integers if provided";
const NO_IMAGE_ERROR: &str = "No image file provided";

/// Upper bound for uploaded food photos.
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

const ENDPOINTS: [&str; 5] = [
    "/api/health",
    "/api/form-data",
    "/api/recommend",
    "/api/extract-recipe-attributes",
    "/api/analyze-food-image",
];

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    message: &'static str,
    endpoints: &'static [&'static str],
    version: String,
    uptime_sec: u64,
}

#[derive(Deserialize, Debug)]
struct ExtractBody {
    #[serde(default)]
    text: Option<String>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

async fn health(State(state): State<ServerState>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "alive",
        message: "Recipe Recommendation Service is Running",
        endpoints: &ENDPOINTS,
        version: state.hash.clone(),
        uptime_sec: state.start_time.elapsed().as_secs(),
    })
}

async fn form_data(State(config): State<ServerConfig>) -> Response {
    let Some(path) = config.form_data_path else {
        return error_response(StatusCode::NOT_FOUND, "No form data file configured");
    };
    match tokio::fs::read_to_string(&path).await {
        Ok(data) => ([(header::CONTENT_TYPE, "application/json")], data).into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => error_response(
            StatusCode::NOT_FOUND,
            format!("File not found at {}", path.display()),
        ),
        Err(e) => {
            error!("Failed to read form data {:?}: {}", path, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn recommend(
    State(service): State<GuardedRecommendationService>,
    body: Result<Json<RecommendationRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match body {
        Ok(body) => body,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };
    let query = match request.validate() {
        Ok(query) => query,
        Err(QueryError::InvalidInteger { .. }) => {
            return error_response(StatusCode::BAD_REQUEST, INTEGER_FIELDS_ERROR)
        }
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e.to_string()),
    };
    Json(service.recommend(&query).await).into_response()
}

async fn extract_recipe_attributes(
    State(service): State<GuardedRecommendationService>,
    State(extractor): State<OptionalExtractor>,
    body: Option<Json<ExtractBody>>,
) -> Response {
    let Some(Json(body)) = body else {
        return error_response(StatusCode::BAD_REQUEST, "No data provided");
    };
    let text = match body.text.as_deref().map(str::trim) {
        Some(text) if !text.is_empty() => text.to_string(),
        _ => return error_response(StatusCode::BAD_REQUEST, "No search text provided"),
    };
    let Some(extractor) = extractor else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Attribute extraction is not configured",
        );
    };

    recommend_from_text(&service, extractor.as_ref(), &text).await
}

/// Extracts attributes from `text`, normalizes them and recommends.
async fn recommend_from_text(
    service: &RecommendationService,
    extractor: &dyn AttributeExtractor,
    text: &str,
) -> Response {
    let extracted = match extractor.extract(text).await {
        Ok(attrs) => attrs,
        Err(e) => {
            warn!(extractor = extractor.name(), "Attribute extraction failed: {}", e);
            return error_response(StatusCode::BAD_GATEWAY, e.to_string());
        }
    };
    let query = match normalize_attributes(extracted, text).into_query() {
        Ok(query) => query,
        Err(_) => return error_response(StatusCode::BAD_REQUEST, "Invalid calories or time value"),
    };
    Json(service.recommend(&query).await).into_response()
}

struct UploadedImage {
    file_name: String,
    content_type: Option<String>,
    data: Vec<u8>,
}

/// Reads the `image` field of a multipart upload, skipping any other field.
async fn read_image_field(multipart: &mut Multipart) -> Result<Option<UploadedImage>, String> {
    let mut image = None;
    while let Some(field) = multipart.next_field().await.map_err(|e| e.to_string())? {
        if field.name() != Some("image") {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field.bytes().await.map_err(|e| e.to_string())?;
        image = Some(UploadedImage {
            file_name,
            content_type,
            data: data.to_vec(),
        });
    }
    Ok(image)
}

async fn analyze_food_image(
    State(service): State<GuardedRecommendationService>,
    State(extractor): State<OptionalExtractor>,
    State(describer): State<OptionalDescriber>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let Ok(mut multipart) = multipart else {
        return error_response(StatusCode::BAD_REQUEST, NO_IMAGE_ERROR);
    };
    let image = match read_image_field(&mut multipart).await {
        Ok(Some(image)) => image,
        Ok(None) => return error_response(StatusCode::BAD_REQUEST, NO_IMAGE_ERROR),
        Err(e) => {
            warn!("Failed to read image upload: {}", e);
            return error_response(StatusCode::BAD_REQUEST, "Failed to read image file");
        }
    };
    if image.file_name.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "No selected file");
    }
    if image.data.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "Empty image file");
    }
    let content_type = image
        .content_type
        .unwrap_or_else(|| "image/jpeg".to_string());
    if !content_type.starts_with("image/") {
        return error_response(StatusCode::BAD_REQUEST, "Uploaded file is not an image");
    }

    let (Some(describer), Some(extractor)) = (describer, extractor) else {
        return error_response(
            StatusCode::SERVICE_UNAVAILABLE,
            "Image analysis is not configured",
        );
    };

    let description = match describer.describe(&image.data, &content_type).await {
        Ok(description) => description,
        Err(e) => {
            warn!(describer = describer.name(), "Image description failed: {}", e);
            return error_response(StatusCode::BAD_GATEWAY, e.to_string());
        }
    };
    info!(
        "Described '{}' ({} bytes) as '{}'",
        image.file_name,
        image.data.len(),
        description
    );
    recommend_from_text(&service, extractor.as_ref(), &description).await
}

fn cors_layer(allowed_origin: Option<&str>) -> Result<CorsLayer> {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);
    Ok(match allowed_origin {
        Some(origin) => {
            let origin = origin.trim_end_matches('/');
            layer.allow_origin(
                HeaderValue::from_str(origin)
                    .with_context(|| format!("Invalid allowed origin: {}", origin))?,
            )
        }
        None => layer.allow_origin(Any),
    })
}

pub fn make_app(
    config: ServerConfig,
    service: Arc<RecommendationService>,
    extractor: Option<Arc<dyn AttributeExtractor>>,
    describer: Option<Arc<dyn ImageDescriber>>,
    hash: String,
) -> Result<Router> {
    let cors = cors_layer(config.allowed_origin.as_deref())?;
    let state = ServerState {
        config,
        start_time: Instant::now(),
        service,
        extractor,
        describer,
        hash,
    };

    let api_routes: Router = Router::new()
        .route("/health", get(health))
        .route("/form-data", get(form_data))
        .route("/recommend", post(recommend))
        .route("/extract-recipe-attributes", post(extract_recipe_attributes))
        .route(
            "/analyze-food-image",
            post(analyze_food_image).layer(DefaultBodyLimit::max(MAX_IMAGE_BYTES)),
        )
        .with_state(state.clone());

    let app = Router::new()
        .nest("/api", api_routes)
        .layer(cors)
        .layer(middleware::from_fn_with_state(state, log_requests));

    Ok(app)
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

pub async fn run_server(
    config: ServerConfig,
    service: Arc<RecommendationService>,
    extractor: Option<Arc<dyn AttributeExtractor>>,
    describer: Option<Arc<dyn ImageDescriber>>,
) -> Result<()> {
    let port = config.port;
    let metrics_port = config.metrics_port;
    let app = make_app(
        config,
        service,
        extractor,
        describer,
        env!("GIT_HASH").to_string(),
    )?;

    let metrics_listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", metrics_port))?;
    tokio::spawn(async move {
        if let Err(e) = axum::serve(metrics_listener, make_metrics_app()).await {
            error!("Metrics server stopped: {}", e);
        }
    });

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;
    info!("Ready to serve at port {}!", port);
    info!("Metrics available at port {}!", metrics_port);

    Ok(axum::serve(listener, app).await?)
}
