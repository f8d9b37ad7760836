use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    Client, Collection, Database,
    bson::{Bson, Document, doc, oid::ObjectId},
    options::{ClientOptions, ServerApi, ServerApiVersion},
};
use std::sync::Arc;

use crate::{
    error::Result,
    models::{
        CampaignUpdate, DeleteAck, InsertAck, PetUpdate, UpdateAck, admin_role_update,
        adopted_update,
    },
};

pub const USERS: &str = "users";
pub const PETS: &str = "pets";
pub const ADOPTIONS: &str = "adoption";
pub const CAMPAIGNS: &str = "campaign";

/// Repository Trait
///
/// The persistence contract the handlers are written against. Each method is exactly
/// one document-store operation; documents go in and come out as raw BSON so request
/// bodies are stored verbatim.
///
/// `Send + Sync` lets the trait object (`Arc<dyn Repository>`) live in the axum state.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn list_users(&self) -> Result<Vec<Document>>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<Document>>;
    // Sign-up check on the raw `email` value. `Null` also matches users stored without one.
    async fn find_user_with_email(&self, email: Bson) -> Result<Option<Document>>;
    async fn insert_user(&self, user: Document) -> Result<InsertAck>;
    async fn make_admin(&self, id: ObjectId) -> Result<UpdateAck>;

    // --- Pets ---
    async fn list_pets(&self) -> Result<Vec<Document>>;
    // Filters on the owner's `email` field.
    async fn list_pets_by_owner(&self, email: &str) -> Result<Vec<Document>>;
    async fn get_pet(&self, id: ObjectId) -> Result<Option<Document>>;
    async fn insert_pet(&self, pet: Document) -> Result<InsertAck>;
    // Upsert: a missing id creates a document with the allow-listed fields.
    async fn replace_pet(&self, id: ObjectId, update: PetUpdate) -> Result<UpdateAck>;
    async fn delete_pet(&self, id: ObjectId) -> Result<DeleteAck>;
    async fn mark_pet_adopted(&self, id: ObjectId) -> Result<UpdateAck>;

    // --- Adoption Requests ---
    async fn insert_adoption(&self, request: Document) -> Result<InsertAck>;
    // Filters on `ownerEmail`.
    async fn list_adoptions_by_owner(&self, email: &str) -> Result<Vec<Document>>;
    async fn delete_adoption(&self, id: ObjectId) -> Result<DeleteAck>;
    async fn mark_adoption_accepted(&self, id: ObjectId) -> Result<UpdateAck>;

    // --- Campaigns ---
    async fn list_campaigns(&self) -> Result<Vec<Document>>;
    // Filters on `ownerEmail`.
    async fn list_campaigns_by_owner(&self, email: &str) -> Result<Vec<Document>>;
    async fn get_campaign(&self, id: ObjectId) -> Result<Option<Document>>;
    async fn insert_campaign(&self, campaign: Document) -> Result<InsertAck>;
    async fn replace_campaign(&self, id: ObjectId, update: CampaignUpdate) -> Result<UpdateAck>;
}

/// RepositoryState
///
/// The shared handle to the persistence layer held in `AppState`.
pub type RepositoryState = Arc<dyn Repository>;

/// connect
///
/// Builds the single long-lived client used for the whole process, pinned to the
/// Stable API v1 in strict mode. The driver pools and multiplexes internally.
pub async fn connect(uri: &str) -> Result<Client> {
    let mut options = ClientOptions::parse(uri).await?;
    options.server_api = Some(
        ServerApi::builder()
            .version(ServerApiVersion::V1)
            .strict(true)
            .deprecation_errors(true)
            .build(),
    );
    options.app_name = Some("pet-lover-server".to_string());
    Ok(Client::with_options(options)?)
}

/// MongoRepository
///
/// The `Repository` implementation backed by MongoDB.
#[derive(Clone)]
pub struct MongoRepository {
    db: Database,
}

impl MongoRepository {
    pub fn new(client: Client, database_name: &str) -> Self {
        Self {
            db: client.database(database_name),
        }
    }

    /// Round-trips a `ping` to confirm the deployment is reachable.
    pub async fn ping(&self) -> Result<()> {
        self.db.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.db.collection(name)
    }

    async fn find_all(&self, name: &str, filter: Document) -> Result<Vec<Document>> {
        let cursor = self.collection(name).find(filter).await?;
        Ok(cursor.try_collect::<Vec<Document>>().await?)
    }

    async fn find_by_id(&self, name: &str, id: ObjectId) -> Result<Option<Document>> {
        Ok(self.collection(name).find_one(doc! { "_id": id }).await?)
    }

    async fn insert(&self, name: &str, document: Document) -> Result<InsertAck> {
        let result = self.collection(name).insert_one(document).await?;
        Ok(result.into())
    }

    async fn update_by_id(
        &self,
        name: &str,
        id: ObjectId,
        update: Document,
        upsert: bool,
    ) -> Result<UpdateAck> {
        let result = self
            .collection(name)
            .update_one(doc! { "_id": id }, update)
            .upsert(upsert)
            .await?;
        Ok(result.into())
    }

    async fn delete_by_id(&self, name: &str, id: ObjectId) -> Result<DeleteAck> {
        let result = self.collection(name).delete_one(doc! { "_id": id }).await?;
        Ok(result.into())
    }
}

#[async_trait]
impl Repository for MongoRepository {
    async fn list_users(&self) -> Result<Vec<Document>> {
        self.find_all(USERS, doc! {}).await
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<Document>> {
        Ok(self.collection(USERS).find_one(doc! { "email": email }).await?)
    }

    async fn find_user_with_email(&self, email: Bson) -> Result<Option<Document>> {
        Ok(self.collection(USERS).find_one(doc! { "email": email }).await?)
    }

    async fn insert_user(&self, user: Document) -> Result<InsertAck> {
        self.insert(USERS, user).await
    }

    async fn make_admin(&self, id: ObjectId) -> Result<UpdateAck> {
        self.update_by_id(USERS, id, admin_role_update(), false).await
    }

    async fn list_pets(&self) -> Result<Vec<Document>> {
        self.find_all(PETS, doc! {}).await
    }

    async fn list_pets_by_owner(&self, email: &str) -> Result<Vec<Document>> {
        self.find_all(PETS, doc! { "email": email }).await
    }

    async fn get_pet(&self, id: ObjectId) -> Result<Option<Document>> {
        self.find_by_id(PETS, id).await
    }

    async fn insert_pet(&self, pet: Document) -> Result<InsertAck> {
        self.insert(PETS, pet).await
    }

    async fn replace_pet(&self, id: ObjectId, update: PetUpdate) -> Result<UpdateAck> {
        self.update_by_id(PETS, id, update.to_update_document(), true)
            .await
    }

    async fn delete_pet(&self, id: ObjectId) -> Result<DeleteAck> {
        self.delete_by_id(PETS, id).await
    }

    async fn mark_pet_adopted(&self, id: ObjectId) -> Result<UpdateAck> {
        self.update_by_id(PETS, id, adopted_update(), false).await
    }

    async fn insert_adoption(&self, request: Document) -> Result<InsertAck> {
        self.insert(ADOPTIONS, request).await
    }

    async fn list_adoptions_by_owner(&self, email: &str) -> Result<Vec<Document>> {
        self.find_all(ADOPTIONS, doc! { "ownerEmail": email }).await
    }

    async fn delete_adoption(&self, id: ObjectId) -> Result<DeleteAck> {
        self.delete_by_id(ADOPTIONS, id).await
    }

    async fn mark_adoption_accepted(&self, id: ObjectId) -> Result<UpdateAck> {
        self.update_by_id(ADOPTIONS, id, adopted_update(), false)
            .await
    }

    async fn list_campaigns(&self) -> Result<Vec<Document>> {
        self.find_all(CAMPAIGNS, doc! {}).await
    }

    async fn list_campaigns_by_owner(&self, email: &str) -> Result<Vec<Document>> {
        self.find_all(CAMPAIGNS, doc! { "ownerEmail": email }).await
    }

    async fn get_campaign(&self, id: ObjectId) -> Result<Option<Document>> {
        self.find_by_id(CAMPAIGNS, id).await
    }

    async fn insert_campaign(&self, campaign: Document) -> Result<InsertAck> {
        self.insert(CAMPAIGNS, campaign).await
    }

    async fn replace_campaign(&self, id: ObjectId, update: CampaignUpdate) -> Result<UpdateAck> {
        self.update_by_id(CAMPAIGNS, id, update.to_update_document(), true)
            .await
    }
}
