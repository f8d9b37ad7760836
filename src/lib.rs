use axum::{
    Router,
    extract::FromRef,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod document;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod models;
pub mod repository;

// Routing segregated by access tier (public, authenticated, admin).
pub mod routes;
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::AppError;
pub use memory::MemoryRepository;
pub use repository::{MongoRepository, RepositoryState};

/// ApiDoc
///
/// OpenAPI document for every route, served at `/api-docs/openapi.json` and browsable
/// through the Swagger UI at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::root, handlers::issue_jwt,
        handlers::list_users, handlers::check_admin, handlers::create_user, handlers::make_admin,
        handlers::list_pets_by_owner, handlers::list_pets, handlers::create_pet,
        handlers::get_pet, handlers::replace_pet, handlers::delete_pet, handlers::mark_pet_adopted,
        handlers::create_adoption, handlers::list_adoptions_by_owner, handlers::delete_adoption,
        handlers::mark_adoption_accepted,
        handlers::list_campaigns, handlers::get_campaign, handlers::create_campaign,
        handlers::list_campaigns_by_owner, handlers::replace_campaign
    ),
    components(
        schemas(
            models::User, models::Pet, models::AdoptionRequest, models::Campaign,
            models::PetUpdate, models::CampaignUpdate,
            models::MessageResponse, models::TokenResponse, models::AdminStatus,
            models::InsertAck, models::UpdateAck, models::DeleteAck,
            models::UserExists, models::CreateUserResponse,
        )
    ),
    tags(
        (name = "pet-lover", description = "Pet Lover adoption and campaign API")
    )
)]
pub struct ApiDoc;

/// AppState
///
/// Shared by every request: the persistence handle and the immutable configuration.
#[derive(Clone)]
pub struct AppState {
    /// One long-lived repository (and therefore one driver client) for the process.
    pub repo: RepositoryState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the route tiers, their auth layers, and the global tracing/CORS stack.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);
    let x_request_id = HeaderName::from_static("x-request-id");

    // Admin routes: token first (outermost), then the stored-role check.
    let admin_routes = admin::admin_routes()
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_admin,
        ))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_token,
        ));

    let authenticated_routes = authenticated::authenticated_routes().route_layer(
        middleware::from_fn_with_state(state.clone(), auth::require_token),
    );

    // Public routes are merged last so that, on paths shared with a protected tier,
    // unmatched methods get the plain 405 fallback rather than the auth layer.
    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(admin_routes)
        .merge(authenticated_routes)
        .merge(public::public_routes())
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

/// cors_layer
///
/// Allows the configured browser origins with credentials. Origins that are not valid
/// header values are skipped with a warning.
fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
}

/// trace_span_logger
///
/// Span for `TraceLayer` carrying method, uri and the `x-request-id` set above, so
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
