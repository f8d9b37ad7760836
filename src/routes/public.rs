use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Public Router Module
///
/// Endpoints reachable without a token: sign-in plumbing, public listings, and the
/// create/replace calls the web client issues before a session exists.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Liveness string.
        .route("/", get(handlers::root))
        // GET /health
        // Probe endpoint for load balancers.
        .route("/health", get(|| async { "ok" }))
        // POST /jwt
        // Signs the posted payload into a 365-day bearer token.
        .route("/jwt", post(handlers::issue_jwt))
        // POST /users
        // First sign-in: stores the user unless the email is already known.
        .route("/users", post(handlers::create_user))
        // --- Pets ---
        .route("/my-pets/{email}", get(handlers::list_pets_by_owner))
        .route("/pets", post(handlers::create_pet))
        // GET/PUT /pet/{id}
        // Read one pet, or overwrite its editable fields (upsert).
        .route(
            "/pet/{id}",
            get(handlers::get_pet).put(handlers::replace_pet),
        )
        // --- Adoption Requests ---
        .route("/adoption", post(handlers::create_adoption))
        // GET /adoption/{id}
        // The segment is the pet owner's email. It shares the `{id}` name with
        // DELETE /adoption/{id} because both live on the same path.
        .route("/adoption/{id}", get(handlers::list_adoptions_by_owner))
        // --- Campaigns ---
        .route("/campaigns", get(handlers::list_campaigns))
        .route("/campaign-details/{id}", get(handlers::get_campaign))
        .route("/campaign-res/{id}", get(handlers::get_campaign))
        .route("/campaign", post(handlers::create_campaign))
        .route("/campaign/{email}", get(handlers::list_campaigns_by_owner))
        .route("/update-campaign/{id}", put(handlers::replace_campaign))
}
