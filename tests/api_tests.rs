use mongodb::bson::doc;
use pet_lover_server::{
    AppConfig, AppState, MemoryRepository, create_router,
    repository::{PETS, Repository},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tokio::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub repo: Arc<MemoryRepository>,
    pub client: reqwest::Client,
}

impl TestApp {
    fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Goes through POST /jwt like the web client does after sign-in.
    async fn token_for(&self, email: &str) -> String {
        let body: Value = self
            .client
            .post(self.url("/jwt"))
            .json(&json!({ "email": email }))
            .send()
            .await
            .expect("jwt request failed")
            .json()
            .await
            .unwrap();
        body["token"].as_str().unwrap().to_string()
    }
}

async fn spawn_app() -> TestApp {
    let repo = Arc::new(MemoryRepository::new());
    let state = AppState {
        repo: repo.clone(),
        config: AppConfig::default(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        repo,
        client: reqwest::Client::new(),
    }
}

#[tokio::test]
async fn test_liveness_string() {
    let app = spawn_app().await;
    let response = app.client.get(app.url("/")).send().await.expect("req fail");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.text().await.unwrap(), "Pet Lover server is running");
}

#[tokio::test]
async fn test_health_probe() {
    let app = spawn_app().await;
    let response = app.client.get(app.url("/health")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = spawn_app().await;
    let id = "65f1c2a9e4b0a1b2c3d4e5f6";

    let requests = vec![
        app.client.get(app.url("/users")),
        app.client.get(app.url("/users/admin/a@x.com")),
        app.client.patch(app.url(&format!("/users/admin/{id}"))),
        app.client.get(app.url("/pets")),
        app.client.delete(app.url(&format!("/pet/{id}"))),
        app.client.delete(app.url(&format!("/adoption/{id}"))),
        app.client.patch(app.url(&format!("/adoption/adopted/{id}"))),
        app.client.patch(app.url(&format!("/reqAdoption/reqAdopted/{id}"))),
    ];

    for request in requests {
        let response = request.send().await.unwrap();
        assert_eq!(response.status(), 401);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({ "message": "unauthorized access" }));
    }
}

#[tokio::test]
async fn test_invalid_token_is_unauthorized() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(app.url("/pets"))
        .bearer_auth("not.a.token")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_admin_routes_forbid_non_admins() {
    let app = spawn_app().await;
    app.repo
        .insert_user(doc! { "email": "plain@x.com" })
        .await
        .unwrap();
    let token = app.token_for("plain@x.com").await;

    let response = app
        .client
        .get(app.url("/users"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "message": "forbidden access" }));

    // A token for an email that never signed up is no better.
    let stranger = app.token_for("stranger@x.com").await;
    let response = app
        .client
        .get(app.url("/users"))
        .bearer_auth(&stranger)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 403);
}

#[tokio::test]
async fn test_admin_can_list_and_promote_users() {
    let app = spawn_app().await;
    app.repo
        .insert_user(doc! { "email": "boss@x.com", "role": "admin" })
        .await
        .unwrap();
    let token = app.token_for("boss@x.com").await;

    // Sign-up goes through the public route.
    let created: Value = app
        .client
        .post(app.url("/users"))
        .json(&json!({ "email": "new@x.com", "name": "Newbie" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let new_id = created["insertedId"].as_str().unwrap().to_string();

    let users: Value = app
        .client
        .get(app.url("/users"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(users.as_array().unwrap().len(), 2);

    let response = app
        .client
        .patch(app.url(&format!("/users/admin/{new_id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let ack: Value = response.json().await.unwrap();
    assert_eq!(ack["modifiedCount"], 1);

    let promoted = app.token_for("new@x.com").await;
    let status: Value = app
        .client
        .get(app.url("/users/admin/new@x.com"))
        .bearer_auth(&promoted)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status, json!({ "admin": true }));
}

#[tokio::test]
async fn test_signup_twice_returns_existing_notice() {
    let app = spawn_app().await;

    let first: Value = app
        .client
        .post(app.url("/users"))
        .json(&json!({ "email": "a@x.com" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let second: Value = app
        .client
        .post(app.url("/users"))
        .json(&json!({ "email": "a@x.com" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(first["acknowledged"], true);
    assert!(first["insertedId"].is_string());
    assert_eq!(
        second,
        json!({ "message": "user already exist", "insertedId": null })
    );
}

#[tokio::test]
async fn test_pet_lifecycle() {
    let app = spawn_app().await;
    let token = app.token_for("owner@x.com").await;

    // Create
    let created: Value = app
        .client
        .post(app.url("/pets"))
        .json(&json!({
            "name": "Milo", "category": "cat", "age": 2, "location": "Dhaka",
            "email": "owner@x.com", "adoptionStatus": false
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["insertedId"].as_str().unwrap().to_string();

    // Replace: `email` is outside the allowlist and must survive untouched.
    let response = app
        .client
        .put(app.url(&format!("/pet/{id}")))
        .json(&json!({ "name": "Milo", "age": 3, "email": "intruder@x.com" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let pet: Value = app
        .client
        .get(app.url(&format!("/pet/{id}")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(pet["_id"], id.as_str());
    assert_eq!(pet["age"], 3);
    assert_eq!(pet["email"], "owner@x.com");

    // Accept adoption
    let ack: Value = app
        .client
        .patch(app.url(&format!("/adoption/adopted/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ack["matchedCount"], 1);

    // Delete twice: the second one matches nothing.
    for expected in [1, 0] {
        let ack: Value = app
            .client
            .delete(app.url(&format!("/pet/{id}")))
            .bearer_auth(&token)
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(ack, json!({ "acknowledged": true, "deletedCount": expected }));
    }
    assert_eq!(app.repo.count(PETS), 0);
}

#[tokio::test]
async fn test_campaign_routes() {
    let app = spawn_app().await;

    let created: Value = app
        .client
        .post(app.url("/campaign"))
        .json(&json!({ "petName": "Rex", "maxAmount": 1000, "ownerEmail": "o@x.com" }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = created["insertedId"].as_str().unwrap().to_string();

    let response = app
        .client
        .put(app.url(&format!("/update-campaign/{id}")))
        .json(&json!({ "petName": "Rex", "maxAmount": 1500, "deadline": "2025-01-01" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    for path in [format!("/campaign-details/{id}"), format!("/campaign-res/{id}")] {
        let campaign: Value = app
            .client
            .get(app.url(&path))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(campaign["maxAmount"], 1500);
        assert_eq!(campaign["ownerEmail"], "o@x.com");
    }

    let all: Value = app
        .client
        .get(app.url("/campaigns"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let mine: Value = app
        .client
        .get(app.url("/campaign/o@x.com"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(all.as_array().unwrap().len(), 1);
    assert_eq!(mine, all);
}

#[tokio::test]
async fn test_owner_lookups_are_public() {
    let app = spawn_app().await;
    app.repo
        .insert_adoption(doc! { "ownerEmail": "o@x.com", "name": "Milo" })
        .await
        .unwrap();
    app.repo
        .insert_pet(doc! { "name": "Milo", "email": "o@x.com" })
        .await
        .unwrap();

    // GET /adoption/{email} shares its path with the token-gated DELETE.
    for path in ["/adoption/o@x.com", "/my-pets/o@x.com"] {
        let response = app.client.get(app.url(path)).send().await.unwrap();
        assert_eq!(response.status(), 200, "{path}");
        let items: Value = response.json().await.unwrap();
        let items = items.as_array().unwrap();
        assert_eq!(items.len(), 1, "{path}");
        assert_eq!(items[0]["name"], "Milo");
    }

    let none: Value = app
        .client
        .get(app.url("/adoption/nobody@x.com"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(none, json!([]));
}

#[tokio::test]
async fn test_unknown_method_on_shared_path_is_not_auth_gated() {
    let app = spawn_app().await;
    let response = app
        .client
        .post(app.url("/pet/65f1c2a9e4b0a1b2c3d4e5f6"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 405);
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let app = spawn_app().await;
    let doc: Value = app
        .client
        .get(app.url("/api-docs/openapi.json"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(doc["paths"]["/reqAdoption/reqAdopted/{id}"].is_object());
    assert!(doc["components"]["schemas"]["Pet"].is_object());
}
