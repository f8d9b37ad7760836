use crate::{
    AppState,
    auth::{self, AuthUser},
    document::{documents_to_json, optional_document_to_json, parse_object_id},
    error::{AppError, Result},
    models::{
        AdminStatus, AdoptionRequest, Campaign, CampaignUpdate, CreateUserResponse, DeleteAck,
        InsertAck, Pet, PetUpdate, TokenResponse, UpdateAck, User, UserExists,
    },
};
use axum::{
    Json,
    extract::{Path, State},
};
use mongodb::bson::{Bson, Document};
use serde_json::{Map, Value};

// --- Liveness ---

/// root
///
/// [Public Route] Liveness string, kept verbatim for the existing uptime checks.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Server is up", body = String))
)]
pub async fn root() -> &'static str {
    "Pet Lover server is running"
}

// --- Tokens ---

/// issue_jwt
///
/// [Public Route] Signs whatever JSON object the client sends (normally `{ "email": ... }`)
/// into a bearer token valid for 365 days.
#[utoipa::path(
    post,
    path = "/jwt",
    request_body = User,
    responses((status = 200, description = "Signed token", body = TokenResponse))
)]
pub async fn issue_jwt(
    State(state): State<AppState>,
    Json(payload): Json<Map<String, Value>>,
) -> Result<Json<TokenResponse>> {
    let token = auth::issue_token(&state.config.token_secret, payload)?;
    Ok(Json(TokenResponse { token }))
}

// --- Users ---

/// list_users
///
/// [Admin Route] Every stored user.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "All users", body = [User]),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<Value>> {
    let users = state.repo.list_users().await?;
    Ok(Json(documents_to_json(users)))
}

/// check_admin
///
/// [Authenticated Route] Reports whether `email` belongs to an admin. Callers may only
/// ask about themselves: a token for a different email is refused with 403.
#[utoipa::path(
    get,
    path = "/users/admin/{id}",
    params(("id" = String, Path, description = "Email of the calling user")),
    responses(
        (status = 200, description = "Admin flag", body = AdminStatus),
        (status = 403, description = "Email does not match the token")
    )
)]
pub async fn check_admin(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<AdminStatus>> {
    if auth_user.email() != Some(email.as_str()) {
        return Err(AppError::Forbidden);
    }
    let user = state.repo.find_user_by_email(&email).await?;
    Ok(Json(AdminStatus {
        admin: user.as_ref().is_some_and(auth::is_admin),
    }))
}

/// create_user
///
/// [Public Route] Stores the body as a new user unless one with the same `email`
/// already exists. A body without `email` is checked against `email: null`, so only
/// the first such sign-up is stored. The check and the insert are two separate
/// operations, so two simultaneous sign-ups for one email can both be stored.
#[utoipa::path(
    post,
    path = "/users",
    request_body = User,
    responses((status = 200, description = "Insert acknowledgment or existing-user notice", body = CreateUserResponse))
)]
pub async fn create_user(
    State(state): State<AppState>,
    Json(user): Json<Document>,
) -> Result<Json<CreateUserResponse>> {
    let email = user.get("email").cloned().unwrap_or(Bson::Null);
    if state.repo.find_user_with_email(email).await?.is_some() {
        return Ok(Json(CreateUserResponse::Exists(UserExists::default())));
    }
    let ack = state.repo.insert_user(user).await?;
    tracing::info!(inserted_id = %ack.inserted_id, "user created");
    Ok(Json(CreateUserResponse::Created(ack)))
}

/// make_admin
///
/// [Admin Route] Sets `role: "admin"` on the user with the given id.
#[utoipa::path(
    patch,
    path = "/users/admin/{id}",
    params(("id" = String, Path, description = "User ObjectId")),
    responses(
        (status = 200, description = "Update acknowledgment", body = UpdateAck),
        (status = 403, description = "Caller is not an admin")
    )
)]
pub async fn make_admin(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpdateAck>> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.repo.make_admin(id).await?))
}

// --- Pets ---

/// list_pets_by_owner
///
/// [Public Route] Pets whose owner `email` matches.
#[utoipa::path(
    get,
    path = "/my-pets/{email}",
    params(("email" = String, Path, description = "Owner email")),
    responses((status = 200, description = "Owner's pets", body = [Pet]))
)]
pub async fn list_pets_by_owner(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Value>> {
    let pets = state.repo.list_pets_by_owner(&email).await?;
    Ok(Json(documents_to_json(pets)))
}

/// list_pets
///
/// [Authenticated Route] Every pet, for the admin dashboard.
#[utoipa::path(
    get,
    path = "/pets",
    responses((status = 200, description = "All pets", body = [Pet]))
)]
pub async fn list_pets(State(state): State<AppState>) -> Result<Json<Value>> {
    let pets = state.repo.list_pets().await?;
    Ok(Json(documents_to_json(pets)))
}

/// create_pet
///
/// [Public Route] Stores the body verbatim.
#[utoipa::path(
    post,
    path = "/pets",
    request_body = Pet,
    responses((status = 200, description = "Insert acknowledgment", body = InsertAck))
)]
pub async fn create_pet(
    State(state): State<AppState>,
    Json(pet): Json<Document>,
) -> Result<Json<InsertAck>> {
    Ok(Json(state.repo.insert_pet(pet).await?))
}

/// get_pet
///
/// [Public Route] One pet, or `null`.
#[utoipa::path(
    get,
    path = "/pet/{id}",
    params(("id" = String, Path, description = "Pet ObjectId")),
    responses((status = 200, description = "The pet or null", body = Pet))
)]
pub async fn get_pet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = parse_object_id(&id)?;
    let pet = state.repo.get_pet(id).await?;
    Ok(Json(optional_document_to_json(pet)))
}

/// replace_pet
///
/// [Public Route] Overwrites the editable fields of a pet, creating it if the id is
/// unknown. Owner and adoption status are never touched.
#[utoipa::path(
    put,
    path = "/pet/{id}",
    params(("id" = String, Path, description = "Pet ObjectId")),
    request_body = PetUpdate,
    responses((status = 200, description = "Update acknowledgment", body = UpdateAck))
)]
pub async fn replace_pet(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<PetUpdate>,
) -> Result<Json<UpdateAck>> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.repo.replace_pet(id, update).await?))
}

/// delete_pet
///
/// [Authenticated Route] Removes a pet. An unknown id yields `deletedCount: 0`.
#[utoipa::path(
    delete,
    path = "/pet/{id}",
    params(("id" = String, Path, description = "Pet ObjectId")),
    responses((status = 200, description = "Delete acknowledgment", body = DeleteAck))
)]
pub async fn delete_pet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.repo.delete_pet(id).await?))
}

/// mark_pet_adopted
///
/// [Authenticated Route] The owner accepts an adoption from their own listing.
#[utoipa::path(
    patch,
    path = "/adoption/adopted/{id}",
    params(("id" = String, Path, description = "Pet ObjectId")),
    responses((status = 200, description = "Update acknowledgment", body = UpdateAck))
)]
pub async fn mark_pet_adopted(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpdateAck>> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.repo.mark_pet_adopted(id).await?))
}

// --- Adoption Requests ---

/// create_adoption
///
/// [Public Route] Stores an adoption request verbatim.
#[utoipa::path(
    post,
    path = "/adoption",
    request_body = AdoptionRequest,
    responses((status = 200, description = "Insert acknowledgment", body = InsertAck))
)]
pub async fn create_adoption(
    State(state): State<AppState>,
    Json(request): Json<Document>,
) -> Result<Json<InsertAck>> {
    Ok(Json(state.repo.insert_adoption(request).await?))
}

/// list_adoptions_by_owner
///
/// [Public Route] Requests received for the pets of `ownerEmail`.
#[utoipa::path(
    get,
    path = "/adoption/{id}",
    params(("id" = String, Path, description = "Pet owner email")),
    responses((status = 200, description = "Adoption requests", body = [AdoptionRequest]))
)]
pub async fn list_adoptions_by_owner(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Value>> {
    let requests = state.repo.list_adoptions_by_owner(&email).await?;
    Ok(Json(documents_to_json(requests)))
}

/// delete_adoption
///
/// [Authenticated Route] Removes an adoption request.
#[utoipa::path(
    delete,
    path = "/adoption/{id}",
    params(("id" = String, Path, description = "Adoption request ObjectId")),
    responses((status = 200, description = "Delete acknowledgment", body = DeleteAck))
)]
pub async fn delete_adoption(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.repo.delete_adoption(id).await?))
}

/// mark_adoption_accepted
///
/// [Authenticated Route] The owner accepts a pending adoption request.
#[utoipa::path(
    patch,
    path = "/reqAdoption/reqAdopted/{id}",
    params(("id" = String, Path, description = "Adoption request ObjectId")),
    responses((status = 200, description = "Update acknowledgment", body = UpdateAck))
)]
pub async fn mark_adoption_accepted(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<UpdateAck>> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.repo.mark_adoption_accepted(id).await?))
}

// --- Campaigns ---

#[utoipa::path(
    get,
    path = "/campaigns",
    responses((status = 200, description = "All campaigns", body = [Campaign]))
)]
pub async fn list_campaigns(State(state): State<AppState>) -> Result<Json<Value>> {
    let campaigns = state.repo.list_campaigns().await?;
    Ok(Json(documents_to_json(campaigns)))
}

/// get_campaign
///
/// [Public Route] One campaign, or `null`. Served under both `/campaign-details/{id}`
/// (public detail page) and `/campaign-res/{id}` (owner's edit form).
#[utoipa::path(
    get,
    path = "/campaign-details/{id}",
    params(("id" = String, Path, description = "Campaign ObjectId")),
    responses((status = 200, description = "The campaign or null", body = Campaign))
)]
pub async fn get_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Value>> {
    let id = parse_object_id(&id)?;
    let campaign = state.repo.get_campaign(id).await?;
    Ok(Json(optional_document_to_json(campaign)))
}

#[utoipa::path(
    post,
    path = "/campaign",
    request_body = Campaign,
    responses((status = 200, description = "Insert acknowledgment", body = InsertAck))
)]
pub async fn create_campaign(
    State(state): State<AppState>,
    Json(campaign): Json<Document>,
) -> Result<Json<InsertAck>> {
    Ok(Json(state.repo.insert_campaign(campaign).await?))
}

/// list_campaigns_by_owner
///
/// [Public Route] Campaigns whose `ownerEmail` matches.
#[utoipa::path(
    get,
    path = "/campaign/{email}",
    params(("email" = String, Path, description = "Owner email")),
    responses((status = 200, description = "Owner's campaigns", body = [Campaign]))
)]
pub async fn list_campaigns_by_owner(
    State(state): State<AppState>,
    Path(email): Path<String>,
) -> Result<Json<Value>> {
    let campaigns = state.repo.list_campaigns_by_owner(&email).await?;
    Ok(Json(documents_to_json(campaigns)))
}

/// replace_campaign
///
/// [Public Route] Overwrites the editable fields of a campaign (upsert).
#[utoipa::path(
    put,
    path = "/update-campaign/{id}",
    params(("id" = String, Path, description = "Campaign ObjectId")),
    request_body = CampaignUpdate,
    responses((status = 200, description = "Update acknowledgment", body = UpdateAck))
)]
pub async fn replace_campaign(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<CampaignUpdate>,
) -> Result<Json<UpdateAck>> {
    let id = parse_object_id(&id)?;
    Ok(Json(state.repo.replace_campaign(id, update).await?))
}
