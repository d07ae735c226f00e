use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use std::sync::Arc;
use utoipa::{
    Modify, OpenApi,
    openapi::security::{Http, HttpAuthScheme, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    normalize_path::NormalizePath,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod sessions;

// Module for routing segregation (Public, Authenticated).
pub mod routes;
use auth::SessionToken;
use routes::{authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::ApiError;
pub use repository::{InMemoryEmployeeRepository, RepositoryState};
pub use sessions::{InMemorySessionStore, SessionState};

/// ApiDoc
///
/// Auto-generated OpenAPI document, served at `/api-docs/openapi.json` and rendered
/// by the Swagger UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::ping, handlers::get_status, handlers::login, handlers::logout,
        handlers::get_all_employees, handlers::get_employee, handlers::create_employee,
        handlers::update_employee, handlers::delete_employee
    ),
    components(
        schemas(
            models::Employee, models::Credential, models::CreateEmployeeRequest,
            models::EmployeePatch, models::TokenResponse, models::StatusResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "employee-api", description = "Session-authenticated employee registry")
    )
)]
pub struct ApiDoc;

/// Registers the `bearer` security scheme referenced by the gated paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

/// AppState
///
/// The single container for everything a handler may touch: both registries and the
/// loaded configuration. Built once in `main` and cloned (cheaply, via `Arc`) into
/// every request.
#[derive(Clone)]
pub struct AppState {
    /// Session registry: live bearer tokens.
    pub sessions: SessionState,
    /// Employee registry.
    pub repo: RepositoryState,
    /// The loaded, immutable configuration (including the credential store).
    pub config: AppConfig,
}

impl AppState {
    /// Fresh in-memory registries wired to `config`.
    pub fn new(config: AppConfig) -> Self {
        Self {
            sessions: Arc::new(InMemorySessionStore::new()) as SessionState,
            repo: Arc::new(InMemoryEmployeeRepository::new(config.id_policy)) as RepositoryState,
            config,
        }
    }
}

// --- Axum FromRef Extractor Implementations ---

// Lets `SessionToken` pull the session registry out of the state.
impl FromRef<AppState> for SessionState {
    fn from_ref(app_state: &AppState) -> SessionState {
        app_state.sessions.clone()
    }
}

/// auth_middleware
///
/// Gate for `authenticated_routes`. Extracting `SessionToken` is the whole check: a
/// missing or unknown token rejects with 401 before the handler runs.
async fn auth_middleware(_token: SessionToken, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies global and scoped middleware, and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .merge(
            authenticated::authenticated_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                auth_middleware,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// create_app
///
/// The router wrapped so that trailing slashes are trimmed *before* routing
/// (`/employees/` reaches the same handler as `/employees`). This is what `main`
/// serves.
pub fn create_app(state: AppState) -> NormalizePath<Router> {
    NormalizePath::trim_trailing_slash(create_router(state))
}

/// trace_span_logger
///
/// Builds the per-request span: method, URI and the `x-request-id` set above, so
/// every log line of one request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
