//! Tests for request routing, validation and error mapping

use itemd::api::ApiHandler;
use itemd::http::request::{Method, Request, RequestBuilder};
use itemd::http::response::{Response, StatusCode};
use itemd::model::{Item, ItemPatch};
use itemd::store::{ItemStore, MemoryItemStore, StoreError, StoreResult};
use serde_json::Value;
use std::sync::Arc;

fn setup() -> (ApiHandler, Arc<MemoryItemStore>) {
    let store = Arc::new(MemoryItemStore::new());
    (ApiHandler::new(store.clone()), store)
}

fn request(method: Method, path: &str, body: &str) -> Request {
    RequestBuilder::new()
        .method(method)
        .path(path)
        .header("Content-Type", "application/json")
        .body(body.as_bytes().to_vec())
        .build()
        .unwrap()
}

fn json(response: &Response) -> Value {
    serde_json::from_slice(&response.body).unwrap()
}

fn create(handler: &ApiHandler, name: &str) -> Value {
    let body = serde_json::json!({ "name": name }).to_string();
    let response = handler.handle(&request(Method::POST, "/items", &body));
    assert_eq!(response.status, StatusCode::Created);
    json(&response)
}

/// Store whose every operation fails internally.
struct BrokenStore;

impl ItemStore for BrokenStore {
    fn create(&self, _name: String) -> StoreResult<Item> {
        Err(StoreError::Internal("backend offline".into()))
    }

    fn get(&self, _id: &str) -> StoreResult<Item> {
        Err(StoreError::Internal("backend offline".into()))
    }

    fn list(&self) -> StoreResult<Vec<Item>> {
        Err(StoreError::Internal("backend offline".into()))
    }

    fn update(&self, _id: &str, _patch: ItemPatch) -> StoreResult<Item> {
        Err(StoreError::Internal("backend offline".into()))
    }

    fn delete(&self, _id: &str) -> StoreResult<()> {
        Err(StoreError::Internal("backend offline".into()))
    }
}

#[test]
fn test_health_ok() {
    let (handler, _) = setup();
    let response = handler.handle(&request(Method::GET, "/health", ""));

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(
        response.headers.get("Content-Type").unwrap(),
        "application/json"
    );
    assert_eq!(json(&response), serde_json::json!({"status": "ok"}));
}

#[test]
fn test_create_item() {
    let (handler, _) = setup();
    let item = create(&handler, "Apple");

    assert!(!item["id"].as_str().unwrap().is_empty());
    assert_eq!(item["name"], "Apple");
    assert_eq!(item["done"], false);
    assert_eq!(item["created_at"], item["updated_at"]);
}

#[test]
fn test_create_trims_name() {
    let (handler, _) = setup();
    let item = create(&handler, "  Apple  ");

    assert_eq!(item["name"], "Apple");
}

#[test]
fn test_create_empty_name_rejected() {
    let (handler, store) = setup();

    for body in [r#"{"name":""}"#, r#"{"name":"   "}"#, "{}", "null"] {
        let response = handler.handle(&request(Method::POST, "/items", body));

        assert_eq!(response.status, StatusCode::UnprocessableEntity, "body {body}");
        assert_eq!(
            json(&response),
            serde_json::json!({"error": "name must be non-empty"})
        );
    }
    assert!(store.is_empty().unwrap());
}

#[test]
fn test_create_malformed_json_rejected() {
    let (handler, store) = setup();

    for body in ["", "{", r#"{"name": 5}"#, "nonsense"] {
        let response = handler.handle(&request(Method::POST, "/items", body));

        assert_eq!(response.status, StatusCode::BadRequest, "body {body:?}");
        assert_eq!(json(&response), serde_json::json!({"error": "bad_request"}));
    }
    assert!(store.is_empty().unwrap());
}

#[test]
fn test_list_items() {
    let (handler, _) = setup();
    create(&handler, "Apple");
    create(&handler, "Banana");

    let response = handler.handle(&request(Method::GET, "/items", ""));
    assert_eq!(response.status, StatusCode::Ok);

    let body = json(&response);
    let items = body["items"].as_array().unwrap();
    assert_eq!(body["count"], 2);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["name"], "Apple");
    assert_eq!(items[1]["name"], "Banana");
}

#[test]
fn test_list_empty() {
    let (handler, _) = setup();

    let response = handler.handle(&request(Method::GET, "/items?ignored=1", ""));

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(json(&response), serde_json::json!({"items": [], "count": 0}));
}

#[test]
fn test_get_item() {
    let (handler, _) = setup();
    let created = create(&handler, "Apple");
    let id = created["id"].as_str().unwrap();

    let response = handler.handle(&request(Method::GET, &format!("/items/{id}"), ""));

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(json(&response), created);
}

#[test]
fn test_get_unknown_item() {
    let (handler, _) = setup();

    let response = handler.handle(&request(Method::GET, "/items/unknown-id", ""));

    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(json(&response), serde_json::json!({"error": "not_found"}));
}

#[test]
fn test_empty_or_nested_id_is_not_found() {
    let (handler, _) = setup();
    create(&handler, "Apple");

    for path in ["/items/", "/items/item-1/extra"] {
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            let response = handler.handle(&request(method, path, "{}"));
            assert_eq!(response.status, StatusCode::NotFound, "{method:?} {path}");
        }
    }
}

#[test]
fn test_update_item() {
    let (handler, _) = setup();
    let created = create(&handler, "Apple");
    let path = format!("/items/{}", created["id"].as_str().unwrap());

    let response = handler.handle(&request(
        Method::PUT,
        &path,
        r#"{"name":"Banana","done":true}"#,
    ));

    assert_eq!(response.status, StatusCode::Ok);
    let body = json(&response);
    assert_eq!(body["id"], created["id"]);
    assert_eq!(body["name"], "Banana");
    assert_eq!(body["done"], true);
    assert_eq!(body["created_at"], created["created_at"]);
}

#[test]
fn test_update_done_only() {
    let (handler, _) = setup();
    let created = create(&handler, "Apple");
    let path = format!("/items/{}", created["id"].as_str().unwrap());

    let response = handler.handle(&request(Method::PUT, &path, r#"{"done":true}"#));
    assert_eq!(json(&response)["name"], "Apple");
    assert_eq!(json(&response)["done"], true);

    let response = handler.handle(&request(Method::PUT, &path, r#"{"name":null}"#));
    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(json(&response)["name"], "Apple");
    assert_eq!(json(&response)["done"], true);
}

#[test]
fn test_update_empty_name_rejected() {
    let (handler, store) = setup();
    let created = create(&handler, "Apple");
    let id = created["id"].as_str().unwrap();
    let path = format!("/items/{id}");

    for body in [r#"{"name":""}"#, r#"{"name":"  ","done":true}"#] {
        let response = handler.handle(&request(Method::PUT, &path, body));

        assert_eq!(response.status, StatusCode::UnprocessableEntity);
        assert_eq!(
            json(&response),
            serde_json::json!({"error": "name must be non-empty"})
        );
    }

    let stored = store.get(id).unwrap();
    assert_eq!(stored.name, "Apple");
    assert!(!stored.done);
}

#[test]
fn test_update_validation_precedes_existence_check() {
    let (handler, _) = setup();

    let response = handler.handle(&request(Method::PUT, "/items/missing", r#"{"name":""}"#));
    assert_eq!(response.status, StatusCode::UnprocessableEntity);

    let response = handler.handle(&request(Method::PUT, "/items/missing", "{"));
    assert_eq!(response.status, StatusCode::BadRequest);

    let response = handler.handle(&request(Method::PUT, "/items/missing", r#"{"done":true}"#));
    assert_eq!(response.status, StatusCode::NotFound);
}

#[test]
fn test_delete_item() {
    let (handler, _) = setup();
    let created = create(&handler, "Apple");
    let path = format!("/items/{}", created["id"].as_str().unwrap());

    let response = handler.handle(&request(Method::DELETE, &path, ""));
    assert_eq!(response.status, StatusCode::NoContent);
    assert!(response.body.is_empty());

    let response = handler.handle(&request(Method::GET, &path, ""));
    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(json(&response), serde_json::json!({"error": "not_found"}));

    let response = handler.handle(&request(Method::DELETE, &path, ""));
    assert_eq!(response.status, StatusCode::NotFound);
}

#[test]
fn test_unsupported_methods() {
    let (handler, _) = setup();
    create(&handler, "Apple");

    for method in [Method::PUT, Method::DELETE, Method::PATCH, Method::OPTIONS] {
        let response = handler.handle(&request(method, "/items", ""));
        assert_eq!(response.status, StatusCode::MethodNotAllowed);
        assert!(response.body.is_empty());
    }

    for method in [Method::POST, Method::PATCH, Method::HEAD] {
        let response = handler.handle(&request(method, "/items/item-1", ""));
        assert_eq!(response.status, StatusCode::MethodNotAllowed);
        assert!(response.body.is_empty());
    }
}

#[test]
fn test_unknown_path() {
    let (handler, _) = setup();

    let response = handler.handle(&request(Method::GET, "/nope", ""));

    assert_eq!(response.status, StatusCode::NotFound);
    assert_eq!(json(&response), serde_json::json!({"error": "not_found"}));
}

#[test]
fn test_store_failures_map_to_500() {
    let handler = ApiHandler::new(Arc::new(BrokenStore));
    let expected = serde_json::json!({"error": "internal_server_error"});

    let cases = [
        (Method::GET, "/items", ""),
        (Method::POST, "/items", r#"{"name":"Apple"}"#),
        (Method::GET, "/items/item-1", ""),
        (Method::PUT, "/items/item-1", r#"{"done":true}"#),
        (Method::DELETE, "/items/item-1", ""),
    ];

    for (method, path, body) in cases {
        let response = handler.handle(&request(method, path, body));
        assert_eq!(response.status, StatusCode::InternalServerError, "{method:?} {path}");
        assert_eq!(json(&response), expected);
    }

    // Validation still runs before the store is consulted
    let response = handler.handle(&request(Method::POST, "/items", r#"{"name":" "}"#));
    assert_eq!(response.status, StatusCode::UnprocessableEntity);
}

#[test]
fn test_list_count_matches_items_after_mutations() {
    let (handler, _) = setup();
    let a = create(&handler, "a");
    create(&handler, "b");
    create(&handler, "c");
    handler.handle(&request(
        Method::DELETE,
        &format!("/items/{}", a["id"].as_str().unwrap()),
        "",
    ));

    let body = json(&handler.handle(&request(Method::GET, "/items", "")));
    assert_eq!(body["count"], 2);
    assert_eq!(body["items"].as_array().unwrap().len(), 2);
}
