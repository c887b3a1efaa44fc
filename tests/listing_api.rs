//! End-to-end test: spin the router in-process over the in-memory store and
//! drive the full listing lifecycle through HTTP.

use listing_service::transport;
use listing_service::{InMemoryListingStore, ListingService};
use serde_json::json;
use std::sync::Arc;

const SERVICE_KEY: &str = "test-internal-key";

async fn spawn_server() -> String {
    let store = Arc::new(InMemoryListingStore::new());
    let service = Arc::new(ListingService::new(store));
    let app_state = transport::http::AppState {
        service,
        service_key: Arc::new(SERVICE_KEY.to_string()),
    };
    let router = transport::http::create_router(app_state);

    // Bind to an ephemeral port to avoid conflicts between tests.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://127.0.0.1:{}", port)
}

fn listing_body(owner_id: i64, image_urls: &[&str]) -> serde_json::Value {
    json!({
        "ownerId": owner_id,
        "title": "Agricola",
        "description": "Worker placement farming game",
        "condition": "Very good, complete",
        "language": "EN",
        "minPlayers": 1,
        "maxPlayers": 5,
        "images": image_urls
            .iter()
            .map(|u| json!({ "url": format!("https://img.example/{}.jpg", u) }))
            .collect::<Vec<_>>(),
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn full_listing_lifecycle_over_http() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    // Create: submitted SOLD status must be ignored.
    let mut body = listing_body(1, &["a", "b"]);
    body["status"] = json!("SOLD");
    let resp = client
        .post(format!("{}/listing", base))
        .header("X-Service-Key", SERVICE_KEY)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let created: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(created["status"], "PUBLISHED");
    assert_eq!(created["ownerId"], 1);
    let id = created["id"].as_i64().unwrap();
    let image_b_id = created["images"]
        .as_array()
        .unwrap()
        .iter()
        .find(|i| i["url"].as_str().unwrap().ends_with("b.jpg"))
        .and_then(|i| i["id"].as_i64())
        .unwrap();

    // Read back, both public and internal routes.
    for path in [format!("{}/listing/{}", base, id), format!("{}/internal/listing/{}", base, id)] {
        let resp = client
            .get(path)
            .header("X-Service-Key", SERVICE_KEY)
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200);
        let got: serde_json::Value = resp.json().await.unwrap();
        assert_eq!(got["id"].as_i64(), Some(id));
        assert!(got["createdAt"].is_string());
    }

    // Update: drop image "a", keep "b", add "c". "b" must keep its id.
    let mut update = listing_body(1, &["b", "c"]);
    update["id"] = json!(id);
    let resp = client
        .put(format!("{}/listing/{}", base, id))
        .header("X-Service-Key", SERVICE_KEY)
        .json(&update)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let got: serde_json::Value = client
        .get(format!("{}/listing/{}", base, id))
        .header("X-Service-Key", SERVICE_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let images = got["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert!(images[0]["url"].as_str().unwrap().ends_with("c.jpg"));
    assert!(images[1]["url"].as_str().unwrap().ends_with("b.jpg"));
    assert_eq!(images[1]["id"].as_i64(), Some(image_b_id));

    // Auction callback: move to IN_AUCTION, then content updates are 409.
    let resp = client
        .put(format!("{}/internal/listing/{}/status/in_auction", base, id))
        .header("X-Service-Key", SERVICE_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client
        .put(format!("{}/listing/{}", base, id))
        .header("X-Service-Key", SERVICE_KEY)
        .json(&update)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let conflict: serde_json::Value = resp.json().await.unwrap();
    assert!(conflict["error"].as_str().unwrap().contains(&id.to_string()));

    // Sold listings stay readable, then delete.
    let resp = client
        .put(format!("{}/internal/listing/{}/status/sold", base, id))
        .header("X-Service-Key", SERVICE_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client
        .delete(format!("{}/listing/{}", base, id))
        .header("X-Service-Key", SERVICE_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client
        .get(format!("{}/listing/{}", base, id))
        .header("X-Service-Key", SERVICE_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn service_key_is_required_on_every_guarded_route() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    // No key at all.
    let resp = client.get(format!("{}/listing/1", base)).send().await.unwrap();
    assert_eq!(resp.status(), 403);

    // Wrong key.
    let resp = client
        .get(format!("{}/internal/listing/1", base))
        .header("X-Service-Key", "nope")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 403);

    // Health stays open.
    let resp = client.get(format!("{}/health", base)).send().await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn boundary_rejections() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    // Create with a pre-set listing id.
    let mut body = listing_body(1, &[]);
    body["id"] = json!(10);
    let resp = client
        .post(format!("{}/listing", base))
        .header("X-Service-Key", SERVICE_KEY)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Create with a pre-set image id.
    let mut body = listing_body(1, &[]);
    body["images"] = json!([{ "id": 3, "url": "https://img.example/a.jpg" }]);
    let resp = client
        .post(format!("{}/listing", base))
        .header("X-Service-Key", SERVICE_KEY)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Update with mismatched path/body ids.
    let mut body = listing_body(1, &[]);
    body["id"] = json!(2);
    let resp = client
        .put(format!("{}/listing/1", base))
        .header("X-Service-Key", SERVICE_KEY)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Unknown status target on the internal transition route.
    let resp = client
        .put(format!("{}/internal/listing/1/status/archived", base))
        .header("X-Service-Key", SERVICE_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    // Malformed payload (missing required fields).
    let resp = client
        .post(format!("{}/listing", base))
        .header("X-Service-Key", SERVICE_KEY)
        .json(&json!({ "title": "x" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn owner_scoped_queries_and_bulk_delete() {
    let base = spawn_server().await;
    let client = reqwest::Client::new();

    for owner in [7, 7, 8] {
        let resp = client
            .post(format!("{}/listing", base))
            .header("X-Service-Key", SERVICE_KEY)
            .json(&listing_body(owner, &[]))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
    }

    let listings: Vec<serde_json::Value> = client
        .get(format!("{}/listing/user/7", base))
        .header("X-Service-Key", SERVICE_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listings.len(), 2);

    // Bulk delete for an owner with no listings is a successful no-op.
    let resp = client
        .delete(format!("{}/listing/user/42", base))
        .header("X-Service-Key", SERVICE_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let resp = client
        .delete(format!("{}/listing/user/7", base))
        .header("X-Service-Key", SERVICE_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 204);

    let listings: Vec<serde_json::Value> = client
        .get(format!("{}/listing/user/7", base))
        .header("X-Service-Key", SERVICE_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(listings.is_empty());

    // Owner 8 untouched.
    let listings: Vec<serde_json::Value> = client
        .get(format!("{}/listing/user/8", base))
        .header("X-Service-Key", SERVICE_KEY)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(listings.len(), 1);
}
