use mongodb::{
    bson::{Bson, Document, doc},
    results::{DeleteResult, InsertOneResult, UpdateResult},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use ts_rs::TS;
use utoipa::ToSchema;

use crate::document::to_json;

// --- Stored Document Shapes ---
//
// Bodies are stored verbatim, so these describe what the web client sends and reads
// back. They are used for the OpenAPI document and the exported TypeScript bindings.

/// User
///
/// A record in the `users` collection. Created at first sign-in.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub email: String,
    pub name: Option<String>,
    // Either "admin" or absent.
    pub role: Option<String>,
}

/// Pet
///
/// A pet listed for adoption, stored in the `pets` collection.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub category: String,
    pub image: String,
    pub post_date: String,
    pub age: String,
    pub location: String,
    pub short_description: String,
    pub long_description: String,
    // Owner's email.
    pub email: String,
    pub adoption_status: bool,
}

/// AdoptionRequest
///
/// A request to adopt a pet, stored in the `adoption` collection. Carries a snapshot
/// of the pet plus the requester's contact details.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AdoptionRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub owner_email: String,
    pub pet_id: Option<String>,
    pub name: String,
    pub image: String,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub adoption_status: bool,
}

/// Campaign
///
/// A donation campaign for a pet, stored in the `campaign` collection.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Campaign {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub pet_name: String,
    pub max_amount: f64,
    pub high_amount: f64,
    pub short_description: String,
    pub long_description: String,
    pub deadline: String,
    pub image: String,
    pub owner_email: String,
}

// --- Replace Payloads ---

/// PetUpdate
///
/// The editable fields of a pet (PUT /pet/{id}). Any other key in the request body is
/// dropped during deserialization, so owner and adoption status cannot be overwritten.
/// A field missing from the body is written as `null`.
#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct PetUpdate {
    #[schema(value_type = Option<Object>)]
    pub name: Option<Bson>,
    #[schema(value_type = Option<Object>)]
    pub category: Option<Bson>,
    #[schema(value_type = Option<Object>)]
    pub image: Option<Bson>,
    #[schema(value_type = Option<Object>)]
    pub post_date: Option<Bson>,
    #[schema(value_type = Option<Object>)]
    pub age: Option<Bson>,
    #[schema(value_type = Option<Object>)]
    pub location: Option<Bson>,
    #[schema(value_type = Option<Object>)]
    pub short_description: Option<Bson>,
    #[schema(value_type = Option<Object>)]
    pub long_description: Option<Bson>,
}

impl PetUpdate {
    /// The `$set` operator for this replacement.
    pub fn to_update_document(&self) -> Document {
        doc! {
            "$set": {
                "name": or_null(&self.name),
                "category": or_null(&self.category),
                "image": or_null(&self.image),
                "postDate": or_null(&self.post_date),
                "age": or_null(&self.age),
                "location": or_null(&self.location),
                "shortDescription": or_null(&self.short_description),
                "longDescription": or_null(&self.long_description),
            }
        }
    }
}

/// CampaignUpdate
///
/// The editable fields of a campaign (PUT /update-campaign/{id}). `ownerEmail` is not
/// among them.
#[derive(Debug, Clone, Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct CampaignUpdate {
    #[schema(value_type = Option<Object>)]
    pub pet_name: Option<Bson>,
    #[schema(value_type = Option<Object>)]
    pub max_amount: Option<Bson>,
    #[schema(value_type = Option<Object>)]
    pub high_amount: Option<Bson>,
    #[schema(value_type = Option<Object>)]
    pub short_description: Option<Bson>,
    #[schema(value_type = Option<Object>)]
    pub long_description: Option<Bson>,
    #[schema(value_type = Option<Object>)]
    pub deadline: Option<Bson>,
    #[schema(value_type = Option<Object>)]
    pub image: Option<Bson>,
}

impl CampaignUpdate {
    pub fn to_update_document(&self) -> Document {
        doc! {
            "$set": {
                "petName": or_null(&self.pet_name),
                "maxAmount": or_null(&self.max_amount),
                "highAmount": or_null(&self.high_amount),
                "shortDescription": or_null(&self.short_description),
                "longDescription": or_null(&self.long_description),
                "deadline": or_null(&self.deadline),
                "image": or_null(&self.image),
            }
        }
    }
}

fn or_null(value: &Option<Bson>) -> Bson {
    value.clone().unwrap_or(Bson::Null)
}

/// The update applied when an adoption is accepted.
pub fn adopted_update() -> Document {
    doc! { "$set": { "adoptionStatus": true } }
}

/// The update that promotes a user to admin.
pub fn admin_role_update() -> Document {
    doc! { "$set": { "role": "admin" } }
}

// --- Response Payloads ---

/// MessageResponse
///
/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

/// TokenResponse
///
/// Body returned by POST /jwt.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct TokenResponse {
    pub token: String,
}

/// AdminStatus
///
/// Body returned by GET /users/admin/{email}.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AdminStatus {
    pub admin: bool,
}

/// InsertAck
///
/// Acknowledgment of a single insert, carrying the generated `_id`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct InsertAck {
    pub acknowledged: bool,
    #[ts(type = "string")]
    #[schema(value_type = String)]
    pub inserted_id: Value,
}

impl From<InsertOneResult> for InsertAck {
    fn from(result: InsertOneResult) -> Self {
        Self {
            acknowledged: true,
            inserted_id: to_json(result.inserted_id),
        }
    }
}

/// UpdateAck
///
/// Acknowledgment of a single-document update, with the upserted `_id` when the
/// update created the document.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAck {
    pub acknowledged: bool,
    #[ts(type = "number")]
    pub matched_count: u64,
    #[ts(type = "number")]
    pub modified_count: u64,
    #[ts(type = "number")]
    pub upserted_count: u64,
    #[ts(type = "string | null")]
    #[schema(value_type = Option<String>)]
    pub upserted_id: Option<Value>,
}

impl From<UpdateResult> for UpdateAck {
    fn from(result: UpdateResult) -> Self {
        Self {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(result.upserted_id.is_some()),
            upserted_id: result.upserted_id.map(to_json),
        }
    }
}

/// DeleteAck
///
/// Acknowledgment of a single delete. `deletedCount` is 0 when nothing matched.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DeleteAck {
    pub acknowledged: bool,
    #[ts(type = "number")]
    pub deleted_count: u64,
}

impl From<DeleteResult> for DeleteAck {
    fn from(result: DeleteResult) -> Self {
        Self {
            acknowledged: true,
            deleted_count: result.deleted_count,
        }
    }
}

/// UserExists
///
/// Returned instead of an insert acknowledgment when the email is already registered.
/// `insertedId` is always `null`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct UserExists {
    pub message: String,
    #[ts(type = "null")]
    #[schema(value_type = Option<String>)]
    pub inserted_id: Option<Value>,
}

impl Default for UserExists {
    fn default() -> Self {
        Self {
            message: "user already exist".to_string(),
            inserted_id: None,
        }
    }
}

/// CreateUserResponse
///
/// Outcome of POST /users: either the insert acknowledgment or the `UserExists` notice.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
#[serde(untagged)]
pub enum CreateUserResponse {
    Created(InsertAck),
    Exists(UserExists),
}
