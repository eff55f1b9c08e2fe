mod config;

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use layout_core::{
    LabelDieline, LayoutOption, LayoutOptimizer, LayoutRequest, OptimizerError, SlotConfig,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ApiConfig;

const OPENAPI_SPEC: &str = include_str!("../../../openapi.yaml");
const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Label Layout Optimizer</title>
</head>
<body>
    <h1>Label Layout Optimizer API</h1>
    <h2>API Endpoints:</h2>
    <ul>
        <li>GET /api/health - Health check</li>
        <li>POST /api/optimize - Rank layout options for an order</li>
        <li>POST /api/slot-config - Press geometry for a dieline</li>
        <li>GET /docs - API documentation</li>
    </ul>
</body>
</html>"#;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env();

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.rust_log)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Label Layout API v{}", env!("CARGO_PKG_VERSION"));

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server listening on http://{}", addr);
    info!("Try: curl http://localhost:{}/api/health", config.port);

    axum::serve(listener, app()).await?;
    Ok(())
}

fn app() -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/api/health", get(health_check))
        .route("/api/optimize", post(optimize))
        .route("/api/slot-config", post(slot_config))
        .route("/openapi.yaml", get(serve_openapi_spec))
        .route("/docs", get(serve_swagger_ui))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Health check endpoint
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "service": "label-layout-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Main optimization endpoint
async fn optimize(
    Json(request): Json<LayoutRequest>,
) -> Result<Json<Vec<LayoutOption>>, AppError> {
    info!(
        "Received layout request with {} items on {} slots",
        request.items.len(),
        request.dieline.columns_across
    );

    let optimizer = LayoutOptimizer::new(request)?;
    let options = tokio::task::spawn_blocking(move || optimizer.generate_layout_options())
        .await
        .map_err(anyhow::Error::from)?;

    match options.first() {
        Some(best) => info!(
            "Generated {} options, best {:?} with score {:.3}",
            options.len(),
            best.id,
            best.overall_score
        ),
        None => info!("No layout options for an empty order"),
    }

    Ok(Json(options))
}

/// Press geometry for a dieline
async fn slot_config(Json(dieline): Json<LabelDieline>) -> Result<Json<SlotConfig>, AppError> {
    Ok(Json(SlotConfig::from_dieline(&dieline)?))
}

/// Application error type
struct AppError(anyhow::Error);

impl From<OptimizerError> for AppError {
    fn from(err: OptimizerError) -> Self {
        AppError(err.into())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        error!("Request error: {}", self.0);

        let status = if self.0.downcast_ref::<OptimizerError>().is_some() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        (
            status,
            Json(json!({
                "error": self.0.to_string(),
            })),
        )
            .into_response()
    }
}

async fn serve_index() -> impl IntoResponse {
    Html(INDEX_HTML)
}

async fn serve_openapi_spec() -> impl IntoResponse {
    (
        StatusCode::OK,
        [("Content-Type", "application/yaml")],
        OPENAPI_SPEC,
    )
}

async fn serve_swagger_ui() -> impl IntoResponse {
    Html(docs_page("/openapi.yaml"))
}

/// Swagger UI page titled after this crate, loading the document at `spec_url`.
fn docs_page(spec_url: &str) -> String {
    const SWAGGER_DIST: &str = "https://unpkg.com/swagger-ui-dist@5";

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8" />
    <title>{name} {version}</title>
    <link rel="stylesheet" href="{SWAGGER_DIST}/swagger-ui.css" />
</head>
<body>
    <div id="swagger-ui"></div>
    <script src="{SWAGGER_DIST}/swagger-ui-bundle.js"></script>
    <script>
        window.onload = () => SwaggerUIBundle({{ url: '{spec_url}', dom_id: '#swagger-ui' }});
    </script>
</body>
</html>"#,
        name = env!("CARGO_PKG_NAME"),
        version = env!("CARGO_PKG_VERSION"),
    )
}
