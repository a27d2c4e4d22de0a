mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Request, StatusCode},
};
use common::TestApp;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn category_crud_over_http() {
    let app = TestApp::new().await;

    // Create
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/categories",
            json!({ "name": "Beverages", "description": "Drinks" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    assert_eq!(created["name"], "Beverages");
    assert_eq!(created["product_count"], 0);
    let id = created["id"].as_str().unwrap().to_string();

    // Duplicate name -> 409 with the offending field named
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/categories",
            json!({ "name": "Beverages" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let conflict = body_json(response).await;
    assert_eq!(conflict["message"], "Category name already exists");

    // List envelope
    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/v1/categories?skip=0&take=10"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let listing = body_json(response).await;
    assert_eq!(listing["meta"]["total"], 1);
    assert_eq!(listing["meta"]["skip"], 0);
    assert_eq!(listing["meta"]["take"], 10);
    assert_eq!(listing["data"][0]["name"], "Beverages");

    // Detail
    let response = app
        .router
        .clone()
        .oneshot(get_request(&format!("/api/v1/categories/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let detail = body_json(response).await;
    assert!(detail["products"].as_array().unwrap().is_empty());

    // Delete
    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/api/v1/categories/{}", id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let confirmation = body_json(response).await;
    assert_eq!(
        confirmation["message"],
        format!("Category with ID {} deleted successfully", id)
    );
}

#[tokio::test]
async fn unknown_ids_return_404_with_error_body() {
    let app = TestApp::new().await;
    let missing = Uuid::new_v4();

    for uri in [
        format!("/api/v1/categories/{}", missing),
        format!("/api/v1/suppliers/{}", missing),
        format!("/api/v1/products/{}", missing),
        format!("/api/v1/users/{}", missing),
        format!("/api/v1/posts/{}", missing),
    ] {
        let response = app.router.clone().oneshot(get_request(&uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);

        let body = body_json(response).await;
        assert_eq!(body["error"], "Not Found");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .contains(&missing.to_string()));
    }
}

#[tokio::test]
async fn invalid_payloads_are_rejected_with_400() {
    let app = TestApp::new().await;

    // Empty category name
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/categories",
            json!({ "name": "" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Malformed email
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users",
            json!({ "email": "not-an-email", "password": "long-enough" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Short password
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users",
            json!({ "email": "ok@example.com", "password": "short" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn user_payloads_never_leak_password_hashes() {
    let app = TestApp::new().await;

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            "/api/v1/users",
            json!({ "email": "safe@example.com", "password": "super-secret-pw" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    assert!(created.get("password").is_none());
    let id = created["id"].as_str().unwrap();

    let response = app
        .router
        .clone()
        .oneshot(get_request(&format!("/api/v1/users/{}", id)))
        .await
        .unwrap();
    let detail = body_json(response).await;
    assert!(detail.get("password").is_none());
}

fn multipart_body(boundary: &str, fields: &[(&str, &str)], image: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }
    if let Some((filename, content_type, bytes)) = image {
        body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n",
                filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());
    body
}

#[tokio::test]
async fn product_multipart_create_with_image() {
    let app = TestApp::new().await;
    let boundary = "test-boundary-7348";

    let body = multipart_body(
        boundary,
        &[
            ("name", "Sparkling Water"),
            ("sku", "SPARK-1"),
            ("price", "12.75"),
            ("stock", "40"),
            ("unit", "bottle"),
        ],
        Some(("front.png", "image/png", b"png bytes here")),
    );

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/products")
                .header(
                    CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let created = body_json(response).await;
    assert_eq!(created["sku"], "SPARK-1");
    assert_eq!(created["unit"], "bottle");

    let image_url = created["image_url"].as_str().expect("image_url missing");
    assert!(image_url.contains("products/SPARK-1-"));
    assert_eq!(app.storage.object_count(), 1);
}

#[tokio::test]
async fn product_multipart_rejects_disallowed_image_type() {
    let app = TestApp::new().await;
    let boundary = "test-boundary-9921";

    let body = multipart_body(
        boundary,
        &[
            ("name", "Animated"),
            ("sku", "GIF-1"),
            ("price", "1.00"),
            ("stock", "1"),
        ],
        Some(("anim.gif", "image/gif", b"gif bytes")),
    );

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/products")
                .header(
                    CONTENT_TYPE,
                    format!("multipart/form-data; boundary={}", boundary),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    // Nothing was uploaded
    assert_eq!(app.storage.object_count(), 0);
}

#[tokio::test]
async fn list_endpoints_default_to_first_ten_rows() {
    let app = TestApp::new().await;

    for i in 0..12 {
        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/v1/suppliers",
                json!({ "name": format!("Supplier {}", i) }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .router
        .clone()
        .oneshot(get_request("/api/v1/suppliers"))
        .await
        .unwrap();
    let listing = body_json(response).await;

    assert_eq!(listing["data"].as_array().unwrap().len(), 10);
    assert_eq!(listing["meta"]["total"], 12);
    assert_eq!(listing["meta"]["skip"], 0);
    assert_eq!(listing["meta"]["take"], 10);
    // Newest first
    assert_eq!(listing["data"][0]["name"], "Supplier 11");
}
