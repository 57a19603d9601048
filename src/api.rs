//! REST API for the carton optimizer.
//!
//! Provides HTTP endpoints for the embedded web UI.
//! Uses Axum as the web framework and supports CORS.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Json, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Router,
    http::{StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use std::sync::OnceLock;
use tokio::sync::mpsc;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use utoipa::{OpenApi, ToSchema};

use crate::config::ApiConfig;
use crate::error::AppError;
use crate::geometry::{Footprint, TopDownLayout};
use crate::model::{CartonCandidate, PackingConfiguration, Product, ValidationError};
use crate::optimizer::{
    SearchConstraints, SearchDiagnostics, SearchResult, find_best_carton,
    find_best_carton_with_progress,
};
use crate::render::render_svg;
use crate::types::{Dimensional, Vec3, Weighted, units};

pub const DIAGRAM_TITLE: &str = "2D Visualization - Best Carton";

#[derive(Clone, Default)]
struct ApiState {
    constraints: SearchConstraints,
}

static OPENAPI_DOC: OnceLock<utoipa::openapi::OpenApi> = OnceLock::new();

// SRI hashes verified against https://unpkg.com/swagger-ui-dist@5.17.14/ on 2025-10-29.
const SWAGGER_UI_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8" />
        <title>carton-fit API Docs</title>
        <link
            rel="stylesheet"
            href="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui.css"
            integrity="sha384-wxLW6kwyHktdDGr6Pv1zgm/VGJh99lfUbzSn6HNHBENZlCN7W602k9VkGdxuFvPn"
            crossorigin="anonymous"
        />
    </head>
    <body>
        <div id="swagger-ui"></div>
        <script
            src="https://unpkg.com/swagger-ui-dist@5.17.14/swagger-ui-bundle.js"
            integrity="sha384-wmyclcVGX/WhUkdkATwhaK1X1JtiNrr2EoYJ+diV3vj4v6OC5yCeSu+yW13SYJep"
            crossorigin="anonymous"
        ></script>
        <script>
            window.onload = function () {
                window.ui = SwaggerUIBundle({
                    url: "/docs/openapi.json",
                    dom_id: "#swagger-ui",
                });
            };
        </script>
    </body>
    </html>"##;

fn openapi_doc() -> &'static utoipa::openapi::OpenApi {
    OPENAPI_DOC.get_or_init(ApiDoc::openapi)
}

/// Embedded Web Assets (HTML, CSS, JS)
#[derive(RustEmbed)]
#[folder = "web/"]
struct WebAssets;

/// Request structure for the carton endpoints.
///
/// `dims` are the product's length, width and height in inches, `weight` is
/// the weight of one unit in pounds.
#[derive(Deserialize, Clone, ToSchema)]
#[schema(example = json!({ "dims": [10.0, 10.0, 10.0], "weight": 1.0 }))]
pub struct CartonRequest {
    #[schema(value_type = [f64; 3], example = json!([10.0, 10.0, 10.0]))]
    pub dims: (f64, f64, f64),
    pub weight: f64,
}

impl CartonRequest {
    fn into_product(self) -> Result<Product, ValidationError> {
        Product::new(self.dims, self.weight)
    }
}

/// Response structure with the best carton found.
///
/// All optional fields are `null` when `found` is `false`.
#[derive(Serialize, ToSchema)]
pub struct CartonResponse {
    pub found: bool,
    pub carton: Option<CartonCandidate>,
    /// Carton dimensions in centimeters
    pub carton_cm: Option<Vec3>,
    pub total_units: u64,
    pub total_weight_lbs: f64,
    pub total_weight_kg: f64,
    pub packing: Option<PackingConfiguration>,
    pub utilization_percent: Option<f64>,
    pub layout: Option<TopDownLayout>,
    /// Top-down diagram as SVG document
    pub svg: Option<String>,
    pub constraints: SearchConstraints,
    pub diagnostics: SearchDiagnostics,
}

impl CartonResponse {
    /// Creates a CartonResponse from a SearchResult.
    pub fn from_search_result(
        result: SearchResult,
        product: &Product,
        constraints: SearchConstraints,
    ) -> Self {
        let SearchResult { best, diagnostics } = result;

        match best {
            Some(solution) => {
                let layout = TopDownLayout::from_solution(&solution, product);
                let svg = render_svg(&layout, DIAGRAM_TITLE);
                Self {
                    found: true,
                    carton: Some(solution.carton),
                    carton_cm: Some(units::dims_to_cm(solution.carton.dimensions())),
                    total_units: solution.total_units,
                    total_weight_lbs: solution.weight(),
                    total_weight_kg: units::pounds_to_kg(solution.weight()),
                    packing: Some(solution.packing),
                    utilization_percent: Some(solution.utilization_percent(product)),
                    layout: Some(layout),
                    svg: Some(svg),
                    constraints,
                    diagnostics,
                }
            }
            None => Self {
                found: false,
                carton: None,
                carton_cm: None,
                total_units: 0,
                total_weight_lbs: 0.0,
                total_weight_kg: 0.0,
                packing: None,
                utilization_percent: None,
                layout: None,
                svg: None,
                constraints,
                diagnostics,
            },
        }
    }
}

#[derive(Serialize, ToSchema)]
struct ErrorResponse {
    error: String,
    details: String,
}

impl ErrorResponse {
    fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
        }
    }
}

fn error_response(
    status: StatusCode,
    error: impl Into<String>,
    details: impl Into<String>,
) -> Response {
    (status, Json(ErrorResponse::new(error, details))).into_response()
}

fn parse_carton_request(
    payload: Result<Json<CartonRequest>, JsonRejection>,
) -> Result<Product, Response> {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(err) => {
            return Err(error_response(
                StatusCode::UNPROCESSABLE_ENTITY,
                "Invalid JSON data",
                err.to_string(),
            ));
        }
    };

    payload.into_product().map_err(|err| {
        error_response(
            StatusCode::UNPROCESSABLE_ENTITY,
            "Invalid input data",
            err.to_string(),
        )
    })
}

#[derive(OpenApi)]
#[openapi(
    paths(handle_carton, handle_carton_stream),
    components(
        schemas(
            CartonRequest,
            CartonResponse,
            CartonCandidate,
            PackingConfiguration,
            TopDownLayout,
            Footprint,
            Vec3,
            SearchConstraints,
            SearchDiagnostics,
            ErrorResponse
        )
    ),
    tags((name = "carton", description = "Endpoints for carton size optimization"))
)]
struct ApiDoc;

fn build_router(state: ApiState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        // API endpoints
        .route("/carton", post(handle_carton))
        .route("/carton_stream", post(handle_carton_stream))
        // API documentation
        .route("/docs/openapi.json", get(serve_openapi_json))
        .route("/docs", get(serve_openapi_ui))
        // Web-UI (embedded)
        .route("/", get(serve_index))
        .route("/{*path}", get(serve_static))
        .layer(cors)
        .with_state(state)
}

/// Starts the API server.
///
/// Blocks until the server is terminated.
pub async fn start_api_server(config: ApiConfig) -> Result<(), AppError> {
    let app = build_router(ApiState::default());

    let addr = config.socket_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|err| AppError::Server(format!("could not bind to {}: {}", addr, err)))?;

    let display_host = config.display_host().to_string();
    info!("🚀 Server running on http://{}:{}", display_host, config.port());
    if config.binds_to_all_interfaces() && config.uses_default_host() {
        info!("💡 Local access: http://localhost:{}", config.port());
    }
    info!("📦 API endpoints: POST /carton, POST /carton_stream");
    info!("📑 Documentation: GET /docs, GET /docs/openapi.json");

    axum::serve(listener, app)
        .await
        .map_err(|err| AppError::Server(err.to_string()))
}

/// Handler for POST /carton endpoint.
///
/// Searches the carton size that holds the most units of the given product.
#[utoipa::path(
    post,
    path = "/carton",
    request_body = CartonRequest,
    responses(
        (status = 200, description = "Search finished (found may be false)", body = CartonResponse),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid product data",
            body = ErrorResponse
        )
    ),
    tag = "carton"
)]
async fn handle_carton(
    State(state): State<ApiState>,
    payload: Result<Json<CartonRequest>, JsonRejection>,
) -> impl IntoResponse {
    let product = match parse_carton_request(payload) {
        Ok(product) => product,
        Err(response) => return response,
    };

    let constraints = state.constraints;
    info!(
        "📥 New carton request: {:?} in, {} lbs",
        product.dimensions().as_tuple(),
        product.weight()
    );
    let result = find_best_carton(&product, &constraints);
    if result.is_feasible() {
        info!(
            "📦 Result: {} units, {:.2} lbs, {} candidates evaluated",
            result.total_units(),
            result.total_weight(),
            result.diagnostics.evaluated
        );
    } else {
        info!(
            "📦 Result: no feasible carton, {} candidates evaluated",
            result.diagnostics.evaluated
        );
    }

    let response = CartonResponse::from_search_result(result, &product, constraints);
    (StatusCode::OK, Json(response)).into_response()
}

/// Handler for POST /carton_stream endpoint (SSE).
///
/// Streams search events in real-time as Server-Sent Events (text/event-stream).
#[utoipa::path(
    post,
    path = "/carton_stream",
    request_body = CartonRequest,
    responses(
        (
            status = 200,
            description = "Streams search events in real-time",
            content_type = "text/event-stream",
            body = String
        ),
        (
            status = UNPROCESSABLE_ENTITY,
            description = "Invalid product data",
            body = ErrorResponse
        )
    ),
    tag = "carton"
)]
async fn handle_carton_stream(
    State(state): State<ApiState>,
    payload: Result<Json<CartonRequest>, JsonRejection>,
) -> impl IntoResponse {
    let product = match parse_carton_request(payload) {
        Ok(product) => product,
        Err(response) => return response,
    };

    let constraints = state.constraints;
    let (tx, rx) = mpsc::channel::<String>(32);

    tokio::task::spawn_blocking(move || {
        let _ = find_best_carton_with_progress(&product, &constraints, |evt| {
            match serde_json::to_string(evt) {
                // A closed receiver only means the client went away.
                Ok(json) => {
                    let _ = tx.blocking_send(json);
                }
                Err(err) => warn!("Could not serialize search event: {}", err),
            }
        });
    });

    let stream = ReceiverStream::new(rx)
        .map(|msg| Ok::<_, std::convert::Infallible>(Event::default().data(msg)));
    Sse::new(stream)
        .keep_alive(
            KeepAlive::new()
                .interval(std::time::Duration::from_secs(10))
                .text("keep-alive"),
        )
        .into_response()
}

/// Serves the index.html main page
async fn serve_index() -> Response {
    match WebAssets::get("index.html") {
        Some(content) => Html(content.data).into_response(),
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

/// Serves static assets (JS, CSS, etc.)
async fn serve_static(uri: Uri) -> Response {
    let path = uri.path().trim_start_matches('/');

    match WebAssets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            ([(header::CONTENT_TYPE, mime.as_ref())], content.data).into_response()
        }
        None => (StatusCode::NOT_FOUND, "404 Not Found").into_response(),
    }
}

async fn serve_openapi_json(State(_state): State<ApiState>) -> impl IntoResponse {
    Json(openapi_doc())
}

async fn serve_openapi_ui(State(_state): State<ApiState>) -> impl IntoResponse {
    Html(SWAGGER_UI_HTML)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> ApiState {
        ApiState::default()
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn openapi_doc_lists_expected_paths() {
        let doc = openapi_doc();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/carton"));
        assert!(paths.contains_key("/carton_stream"));
    }

    #[test]
    fn openapi_doc_contains_key_schemas() {
        let doc = openapi_doc();
        let schemas = &doc
            .components
            .as_ref()
            .expect("components should be present")
            .schemas;
        for name in [
            "CartonRequest",
            "CartonResponse",
            "CartonCandidate",
            "PackingConfiguration",
            "SearchDiagnostics",
            "ErrorResponse",
        ] {
            assert!(schemas.contains_key(name), "missing schema {}", name);
        }
    }

    #[test]
    fn carton_request_parses_dims_array() {
        let request: CartonRequest =
            serde_json::from_value(json!({ "dims": [4.0, 5.5, 6.0], "weight": 0.4 })).unwrap();
        let product = request.into_product().unwrap();
        assert_eq!(product.dimensions().as_tuple(), (4.0, 5.5, 6.0));
        assert_eq!(product.weight(), 0.4);
    }

    #[test]
    fn carton_request_rejects_negative_weight() {
        let request: CartonRequest =
            serde_json::from_value(json!({ "dims": [4.0, 5.5, 6.0], "weight": -1.0 })).unwrap();
        assert!(matches!(
            request.into_product(),
            Err(ValidationError::InvalidWeight(_))
        ));
    }

    #[test]
    fn response_for_found_carton_includes_metric_and_svg() {
        let product = Product::new((10.0, 10.0, 10.0), 1.0).unwrap();
        let constraints = SearchConstraints::default();
        let result = find_best_carton(&product, &constraints);
        let response = CartonResponse::from_search_result(result, &product, constraints);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["found"], true);
        assert_eq!(value["carton"], json!({ "length": 20, "width": 20, "height": 20 }));
        assert_eq!(
            value["packing"],
            json!({ "units_length": 2, "units_width": 2, "units_height": 2 })
        );
        assert_eq!(value["total_units"], 8);
        assert!((value["carton_cm"]["x"].as_f64().unwrap() - 50.8).abs() < 1e-9);
        assert!((value["total_weight_kg"].as_f64().unwrap() - 3.628736).abs() < 1e-9);
        assert_eq!(value["layout"]["units"].as_array().unwrap().len(), 4);
        assert!(value["svg"].as_str().unwrap().starts_with("<svg"));
    }

    #[test]
    fn response_without_carton_has_null_fields() {
        let product = Product::new((30.0, 5.0, 5.0), 1.0).unwrap();
        let constraints = SearchConstraints::default();
        let result = find_best_carton(&product, &constraints);
        let value =
            serde_json::to_value(CartonResponse::from_search_result(result, &product, constraints))
                .unwrap();

        assert_eq!(value["found"], false);
        assert!(value["carton"].is_null());
        assert!(value["svg"].is_null());
        assert_eq!(value["total_units"], 0);
        assert_eq!(value["constraints"]["max_carton_side"], 25);
    }

    #[tokio::test]
    async fn handle_carton_returns_best_carton() {
        let request = CartonRequest {
            dims: (5.0, 5.0, 5.0),
            weight: 2.0,
        };
        let response = handle_carton(State(test_state()), Ok(Json(request)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let value = body_json(response).await;
        assert_eq!(value["total_units"], 25);
        assert_eq!(value["total_weight_lbs"], 50.0);
    }

    #[tokio::test]
    async fn server_state_uses_fixed_search_limits() {
        let state = test_state();
        assert_eq!(state.constraints.max_carton_side, 25);
        assert_eq!(state.constraints.max_carton_weight, 50.0);
        assert_eq!(state.constraints.max_units_per_carton, 150);

        let request = CartonRequest {
            dims: (5.0, 5.0, 5.0),
            weight: 2.0,
        };
        let response = handle_carton(State(state), Ok(Json(request)))
            .await
            .into_response();
        let value = body_json(response).await;
        assert_eq!(value["carton"]["length"], 5);
        assert_eq!(value["carton"]["width"], 25);
        assert_eq!(value["carton"]["height"], 25);
        assert_eq!(value["constraints"]["max_carton_side"], 25);
        assert_eq!(value["constraints"]["max_units_per_carton"], 150);
    }

    #[tokio::test]
    async fn handle_carton_rejects_invalid_product() {
        let request = CartonRequest {
            dims: (0.0, 5.0, 5.0),
            weight: 2.0,
        };
        let response = handle_carton(State(test_state()), Ok(Json(request)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let value = body_json(response).await;
        assert_eq!(value["error"], "Invalid input data");
        assert!(value["details"].as_str().unwrap().contains("Length"));
    }

    #[tokio::test]
    async fn serves_embedded_index() {
        let response = serve_index().await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn serves_static_assets_with_mime_type() {
        let response = serve_static("/app.js".parse().unwrap()).await;
        assert_eq!(response.status(), StatusCode::OK);
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default()
            .to_string();
        assert!(content_type.contains("javascript"), "{}", content_type);

        let missing = serve_static("/missing.txt".parse().unwrap()).await;
        assert_eq!(missing.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn handle_carton_stream_emits_events() {
        let request = CartonRequest {
            dims: (10.0, 10.0, 10.0),
            weight: 1.0,
        };
        let response = handle_carton_stream(State(test_state()), Ok(Json(request)))
            .await
            .into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains(r#""type":"Started""#));
        assert!(body.contains(r#""type":"ImprovedBest""#));
        assert!(body.contains(r#""type":"Finished""#));
    }
}
