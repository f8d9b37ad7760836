use async_trait::async_trait;
use mongodb::bson::{Bson, Document, oid::ObjectId};
use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

use crate::{
    document::to_json,
    error::Result,
    models::{
        CampaignUpdate, DeleteAck, InsertAck, PetUpdate, UpdateAck, admin_role_update,
        adopted_update,
    },
    repository::{ADOPTIONS, CAMPAIGNS, PETS, Repository, USERS},
};

/// MemoryRepository
///
/// An in-process `Repository` with the same observable behavior as `MongoRepository`
/// for the operations this API issues: equality filters, `_id` generation on insert,
/// `$set` updates with optional upsert, and single-document deletes. Backs the handler
/// and API test suites.
#[derive(Default)]
pub struct MemoryRepository {
    collections: Mutex<HashMap<&'static str, Vec<Document>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently stored in `collection`.
    pub fn count(&self, collection: &'static str) -> usize {
        self.lock().get(collection).map_or(0, Vec::len)
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<&'static str, Vec<Document>>> {
        // A poisoned lock only means a test panicked mid-operation; the data is still usable.
        self.collections
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn find_where(&self, collection: &'static str, field: &str, value: &Bson) -> Vec<Document> {
        self.lock()
            .get(collection)
            .map(|docs| {
                docs.iter()
                    // Equality on `null` also matches a missing field, as the server does.
                    .filter(|doc| doc.get(field).unwrap_or(&Bson::Null) == value)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    fn find_all(&self, collection: &'static str) -> Vec<Document> {
        self.lock().get(collection).cloned().unwrap_or_default()
    }

    fn find_by_id(&self, collection: &'static str, id: ObjectId) -> Option<Document> {
        self.find_where(collection, "_id", &Bson::ObjectId(id))
            .into_iter()
            .next()
    }

    fn insert(&self, collection: &'static str, mut document: Document) -> InsertAck {
        let id = match document.get("_id").cloned() {
            Some(id) => id,
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                // `_id` leads the document, as the server stores it.
                let mut with_id = Document::new();
                with_id.insert("_id", id.clone());
                for (field, value) in document {
                    with_id.insert(field, value);
                }
                document = with_id;
                id
            }
        };
        self.lock().entry(collection).or_default().push(document);
        InsertAck {
            acknowledged: true,
            inserted_id: to_json(id),
        }
    }

    fn update_by_id(
        &self,
        collection: &'static str,
        id: ObjectId,
        update: Document,
        upsert: bool,
    ) -> UpdateAck {
        let set = update.get_document("$set").cloned().unwrap_or_default();
        let key = Bson::ObjectId(id);
        let mut collections = self.lock();
        let docs = collections.entry(collection).or_default();

        if let Some(doc) = docs.iter_mut().find(|doc| doc.get("_id") == Some(&key)) {
            let mut changed = false;
            for (field, value) in set {
                if doc.get(&field) != Some(&value) {
                    doc.insert(field, value);
                    changed = true;
                }
            }
            return UpdateAck {
                acknowledged: true,
                matched_count: 1,
                modified_count: u64::from(changed),
                upserted_count: 0,
                upserted_id: None,
            };
        }

        if !upsert {
            return UpdateAck {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
                upserted_count: 0,
                upserted_id: None,
            };
        }

        let mut created = Document::new();
        created.insert("_id", key.clone());
        for (field, value) in set {
            created.insert(field, value);
        }
        docs.push(created);
        UpdateAck {
            acknowledged: true,
            matched_count: 0,
            modified_count: 0,
            upserted_count: 1,
            upserted_id: Some(to_json(key)),
        }
    }

    fn delete_by_id(&self, collection: &'static str, id: ObjectId) -> DeleteAck {
        let key = Bson::ObjectId(id);
        let mut collections = self.lock();
        let docs = collections.entry(collection).or_default();
        let deleted_count = match docs.iter().position(|doc| doc.get("_id") == Some(&key)) {
            Some(index) => {
                docs.remove(index);
                1
            }
            None => 0,
        };
        DeleteAck {
            acknowledged: true,
            deleted_count,
        }
    }
}

#[async_trait]
impl Repository for MemoryRepository {
    async fn list_users(&self) -> Result<Vec<Document>> {
        Ok(self.find_all(USERS))
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<Document>> {
        Ok(self
            .find_where(USERS, "email", &Bson::String(email.to_string()))
            .into_iter()
            .next())
    }

    async fn find_user_with_email(&self, email: Bson) -> Result<Option<Document>> {
        Ok(self.find_where(USERS, "email", &email).into_iter().next())
    }

    async fn insert_user(&self, user: Document) -> Result<InsertAck> {
        Ok(self.insert(USERS, user))
    }

    async fn make_admin(&self, id: ObjectId) -> Result<UpdateAck> {
        Ok(self.update_by_id(USERS, id, admin_role_update(), false))
    }

    async fn list_pets(&self) -> Result<Vec<Document>> {
        Ok(self.find_all(PETS))
    }

    async fn list_pets_by_owner(&self, email: &str) -> Result<Vec<Document>> {
        Ok(self.find_where(PETS, "email", &Bson::String(email.to_string())))
    }

    async fn get_pet(&self, id: ObjectId) -> Result<Option<Document>> {
        Ok(self.find_by_id(PETS, id))
    }

    async fn insert_pet(&self, pet: Document) -> Result<InsertAck> {
        Ok(self.insert(PETS, pet))
    }

    async fn replace_pet(&self, id: ObjectId, update: PetUpdate) -> Result<UpdateAck> {
        Ok(self.update_by_id(PETS, id, update.to_update_document(), true))
    }

    async fn delete_pet(&self, id: ObjectId) -> Result<DeleteAck> {
        Ok(self.delete_by_id(PETS, id))
    }

    async fn mark_pet_adopted(&self, id: ObjectId) -> Result<UpdateAck> {
        Ok(self.update_by_id(PETS, id, adopted_update(), false))
    }

    async fn insert_adoption(&self, request: Document) -> Result<InsertAck> {
        Ok(self.insert(ADOPTIONS, request))
    }

    async fn list_adoptions_by_owner(&self, email: &str) -> Result<Vec<Document>> {
        Ok(self.find_where(ADOPTIONS, "ownerEmail", &Bson::String(email.to_string())))
    }

    async fn delete_adoption(&self, id: ObjectId) -> Result<DeleteAck> {
        Ok(self.delete_by_id(ADOPTIONS, id))
    }

    async fn mark_adoption_accepted(&self, id: ObjectId) -> Result<UpdateAck> {
        Ok(self.update_by_id(ADOPTIONS, id, adopted_update(), false))
    }

    async fn list_campaigns(&self) -> Result<Vec<Document>> {
        Ok(self.find_all(CAMPAIGNS))
    }

    async fn list_campaigns_by_owner(&self, email: &str) -> Result<Vec<Document>> {
        Ok(self.find_where(CAMPAIGNS, "ownerEmail", &Bson::String(email.to_string())))
    }

    async fn get_campaign(&self, id: ObjectId) -> Result<Option<Document>> {
        Ok(self.find_by_id(CAMPAIGNS, id))
    }

    async fn insert_campaign(&self, campaign: Document) -> Result<InsertAck> {
        Ok(self.insert(CAMPAIGNS, campaign))
    }

    async fn replace_campaign(&self, id: ObjectId, update: CampaignUpdate) -> Result<UpdateAck> {
        Ok(self.update_by_id(CAMPAIGNS, id, update.to_update_document(), true))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::doc;

    #[tokio::test]
    async fn insert_generates_leading_object_id() {
        let repo = MemoryRepository::new();
        let ack = repo.insert_pet(doc! { "name": "Milo" }).await.unwrap();
        let id = ObjectId::parse_str(ack.inserted_id.as_str().unwrap()).unwrap();

        let stored = repo.get_pet(id).await.unwrap().unwrap();
        assert_eq!(stored.keys().next().map(String::as_str), Some("_id"));
        assert_eq!(stored.get_str("name").unwrap(), "Milo");
    }

    #[tokio::test]
    async fn repeated_status_flip_matches_without_modifying() {
        let repo = MemoryRepository::new();
        let ack = repo.insert_adoption(doc! { "ownerEmail": "o@x.com" }).await.unwrap();
        let id = ObjectId::parse_str(ack.inserted_id.as_str().unwrap()).unwrap();

        let first = repo.mark_adoption_accepted(id).await.unwrap();
        let second = repo.mark_adoption_accepted(id).await.unwrap();
        assert_eq!((first.matched_count, first.modified_count), (1, 1));
        assert_eq!((second.matched_count, second.modified_count), (1, 0));
    }

    #[tokio::test]
    async fn status_flip_on_missing_id_does_not_upsert() {
        let repo = MemoryRepository::new();
        let ack = repo.mark_pet_adopted(ObjectId::new()).await.unwrap();
        assert_eq!(ack.matched_count, 0);
        assert_eq!(repo.count(PETS), 0);
    }
}
