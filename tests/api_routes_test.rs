mod common;

use axum::http::{Method, StatusCode};
use chrono::Utc;
use common::{response_json, TestApp};
use sea_orm::{ActiveModelTrait, Set};
use serde_json::{json, Value};
use storefront_api::{
    entities::{commerce::product_variant, product::ProductType},
    middleware_helpers::REQUEST_ID_HEADER,
};
use uuid::Uuid;

#[tokio::test]
async fn health_reports_database() {
    let app = TestApp::new().await;

    let response = app.request(Method::GET, "/api/v1/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(REQUEST_ID_HEADER));

    let body = response_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["checks"]["database"], "healthy");
}

#[tokio::test]
async fn reconcile_then_list_over_http() {
    let app = TestApp::new().await;
    let shirt = app.tshirt().await;
    let base = format!("/api/v1/products/{}", shirt.product.id);

    let response = app
        .request(Method::POST, &format!("{base}/variants/reconcile"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["created"].as_array().unwrap().len(), 4);
    assert_eq!(body["data"]["unchanged"], 0);

    let response = app
        .request(Method::POST, &format!("{base}/variants/reconcile"), None)
        .await;
    let body = response_json(response).await;
    assert!(body["data"]["created"].as_array().unwrap().is_empty());
    assert_eq!(body["data"]["unchanged"], 4);

    let response = app
        .request(Method::GET, &format!("{base}/variants"), None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let variants = body["data"].as_array().unwrap();
    assert_eq!(variants.len(), 4);
    assert!(variants
        .iter()
        .all(|v| v["attributes"].as_array().unwrap().len() == 2));
}

#[tokio::test]
async fn attribute_sync_over_http() {
    let app = TestApp::new().await;
    let shirt = app.tshirt().await;
    let base = format!("/api/v1/products/{}", shirt.product.id);

    let payload = json!({
        "attributes": {
            shirt.color.id.to_string(): [shirt.red.id],
            shirt.size.id.to_string(): [shirt.small.id, shirt.medium.id],
        }
    });
    let response = app
        .request(Method::PUT, &format!("{base}/attributes"), Some(payload))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["created"].as_array().unwrap().len(), 2);

    let response = app
        .request(Method::GET, &format!("{base}/attributes"), None)
        .await;
    let body = response_json(response).await;
    let selections = body["data"].as_array().unwrap();
    assert_eq!(selections.len(), 2);
    assert_eq!(selections[0]["attribute_name"], "Color");
    assert_eq!(selections[0]["values"].as_array().unwrap().len(), 1);

    let response = app
        .request(Method::GET, &format!("{base}/stock"), None)
        .await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["total_stock"], 0);
}

#[tokio::test]
async fn mismatched_value_is_a_bad_request() {
    let app = TestApp::new().await;
    let shirt = app.tshirt().await;

    let payload = json!({
        "attributes": { shirt.color.id.to_string(): [shirt.small.id] }
    });
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/products/{}/attributes", shirt.product.id),
            Some(payload),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response_json(response).await;
    assert_eq!(body["error"], "Bad Request");
    assert!(body["request_id"].is_string());
}

#[tokio::test]
async fn nil_ids_fail_validation() {
    let app = TestApp::new().await;
    let shirt = app.tshirt().await;

    let nil = Uuid::nil().to_string();
    let payload = json!({ "attributes": { nil: [] } });
    let response = app
        .request(
            Method::PUT,
            &format!("/api/v1/products/{}/attributes", shirt.product.id),
            Some(payload),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn image_match_over_http() {
    let app = TestApp::new().await;
    let shirt = app.tshirt().await;
    let red = shirt.pair(&shirt.red);
    app.add_image(&shirt.product, "front.jpg", 0, &[]).await;
    app.add_image(&shirt.product, "red.jpg", 1, &[red]).await;

    let uri = format!("/api/v1/products/{}/images/match", shirt.product.id);

    let response = app
        .request(Method::POST, &uri, Some(json!({ "selection": [red] })))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    let images = body["data"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0]["image_url"], "red.jpg");
    assert_eq!(images[0]["label"], "Color: Red");

    let response = app.request(Method::POST, &uri, Some(json!({}))).await;
    let body = response_json(response).await;
    let urls: Vec<&Value> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| &i["image_url"])
        .collect();
    assert_eq!(urls, vec![&json!("front.jpg")]);
}

#[tokio::test]
async fn sku_conflict_is_409_without_driver_detail() {
    let app = TestApp::new().await;
    let shirt = app.tshirt().await;
    let other = app
        .create_product("Other", Some("OTHER"), ProductType::Simple)
        .await;

    let now = Utc::now();
    product_variant::ActiveModel {
        id: Set(Uuid::new_v4()),
        product_id: Set(other.id),
        sku: Set("TSHIRT-red-s".to_string()),
        price_override: Set(None),
        stock_quantity: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(app.db())
    .await
    .unwrap();

    let response = app
        .request(
            Method::POST,
            &format!("/api/v1/products/{}/variants/reconcile", shirt.product.id),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let body = response_json(response).await;
    assert_eq!(
        body["message"],
        "Conflict: Generated SKU TSHIRT-red-s already exists"
    );
    assert!(!body.to_string().contains("UNIQUE"));
}

#[tokio::test]
async fn unknown_product_is_404() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Method::GET,
            &format!("/api/v1/products/{}/variants", Uuid::new_v4()),
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn settings_over_http() {
    let app = TestApp::new().await;
    app.state.services.settings.seed_defaults().await.unwrap();

    let response = app.request(Method::GET, "/api/v1/settings/store", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["currency_symbol"], "$");

    let response = app
        .request(
            Method::PUT,
            "/api/v1/settings",
            Some(json!({ "settings": { "currency_symbol": "€", "bogus": 1 } })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["data"]["updated"], json!(["currency_symbol"]));

    let response = app.request(Method::GET, "/api/v1/settings", None).await;
    let body = response_json(response).await;
    assert_eq!(body["data"]["currency_symbol"], "€");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = TestApp::new().await;

    let response = app
        .request(Method::GET, "/api-docs/openapi.json", None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert!(body["paths"]
        .get("/api/v1/products/{id}/images/match")
        .is_some());
}
