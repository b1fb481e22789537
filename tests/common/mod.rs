#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde_json::Value;
use storefront_api::{
    common::AttributePair,
    config::AppConfig,
    db,
    entities::{
        commerce::{
            attribute, attribute_value, product_attribute, product_image, AttributeModel,
            AttributeType, AttributeValueModel, ProductImageModel, ProductModel,
        },
        product::{self, ProductStatus, ProductType},
    },
    events::{self, EventSender},
    logging, AppState,
};
use tokio::sync::mpsc;
use tower::ServiceExt;
use uuid::Uuid;

/// Application state backed by a private in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    _event_task: tokio::task::JoinHandle<()>,
}

/// The classic Color × Size catalogue: a variable T-shirt offering
/// Red/Blue in S/M.
pub struct TshirtFixture {
    pub product: ProductModel,
    pub color: AttributeModel,
    pub size: AttributeModel,
    pub red: AttributeValueModel,
    pub blue: AttributeValueModel,
    pub small: AttributeValueModel,
    pub medium: AttributeValueModel,
}

impl TshirtFixture {
    pub fn pair(&self, value: &AttributeValueModel) -> AttributePair {
        AttributePair::new(value.attribute_id, value.id)
    }
}

pub fn test_config() -> AppConfig {
    let mut cfg = AppConfig::new(
        "sqlite::memory:".to_string(),
        "127.0.0.1".to_string(),
        18_080,
        "test".to_string(),
    );
    // every pooled connection to sqlite::memory: is its own database
    cfg.db_max_connections = 1;
    cfg.db_min_connections = 1;
    cfg
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    pub async fn with_config(cfg: AppConfig) -> Self {
        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_tx, event_rx) = mpsc::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));
        let event_sender = Arc::new(EventSender::new(event_tx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);
        let router = storefront_api::build_router(state.clone(), logging::discard_logger());

        Self {
            router,
            state,
            _event_task: event_task,
        }
    }

    pub fn db(&self) -> &sea_orm::DatabaseConnection {
        &self.state.db
    }

    /// Send a request against the full router.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn create_attribute(
        &self,
        name: &str,
        attribute_type: AttributeType,
        sort_order: i32,
    ) -> AttributeModel {
        let now = Utc::now();
        attribute::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            slug: Set(format!("{}-{}", name.to_lowercase(), Uuid::new_v4().simple())),
            description: Set(None),
            attribute_type: Set(attribute_type),
            is_required: Set(false),
            sort_order: Set(sort_order),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db())
        .await
        .expect("seed attribute")
    }

    pub async fn create_value(
        &self,
        attribute: &AttributeModel,
        value: &str,
        sort_order: i32,
    ) -> AttributeValueModel {
        let now = Utc::now();
        attribute_value::ActiveModel {
            id: Set(Uuid::new_v4()),
            attribute_id: Set(attribute.id),
            value: Set(value.to_string()),
            hex: Set(None),
            sort_order: Set(sort_order),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db())
        .await
        .expect("seed attribute value")
    }

    pub async fn create_product(
        &self,
        name: &str,
        sku: Option<&str>,
        product_type: ProductType,
    ) -> ProductModel {
        let now = Utc::now();
        product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name.to_string()),
            sku: Set(sku.map(str::to_string)),
            description: Set(None),
            base_price: Set(Decimal::new(1999, 2)),
            product_type: Set(product_type),
            status: Set(ProductStatus::Active),
            stock_quantity: Set(7),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db())
        .await
        .expect("seed product")
    }

    /// Stores selections directly, bypassing the attribute service.
    pub async fn select_values(&self, product: &ProductModel, values: &[&AttributeValueModel]) {
        for value in values {
            product_attribute::ActiveModel {
                id: Set(Uuid::new_v4()),
                product_id: Set(product.id),
                attribute_id: Set(value.attribute_id),
                attribute_value_id: Set(value.id),
                created_at: Set(Utc::now()),
            }
            .insert(self.db())
            .await
            .expect("seed product attribute");
        }
    }

    pub async fn add_image(
        &self,
        product: &ProductModel,
        url: &str,
        sort_order: i32,
        pairs: &[AttributePair],
    ) -> ProductImageModel {
        let combination = if pairs.is_empty() {
            None
        } else {
            Some(serde_json::to_value(pairs).expect("encode pairs"))
        };
        product_image::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(product.id),
            image_url: Set(url.to_string()),
            alt_text: Set(None),
            sort_order: Set(sort_order),
            is_primary: Set(sort_order == 0),
            attribute_combination: Set(combination),
        }
        .insert(self.db())
        .await
        .expect("seed product image")
    }

    /// Seeds the Color × Size catalogue with both sizes and both colors selected.
    pub async fn tshirt(&self) -> TshirtFixture {
        let color = self.create_attribute("Color", AttributeType::Color, 0).await;
        let size = self.create_attribute("Size", AttributeType::Size, 1).await;
        let red = self.create_value(&color, "Red", 0).await;
        let blue = self.create_value(&color, "Blue", 1).await;
        let small = self.create_value(&size, "S", 0).await;
        let medium = self.create_value(&size, "M", 1).await;

        let product = self
            .create_product("Classic T-Shirt", Some("TSHIRT"), ProductType::Variable)
            .await;
        self.select_values(&product, &[&red, &blue, &small, &medium])
            .await;

        TshirtFixture {
            product,
            color,
            size,
            red,
            blue,
            small,
            medium,
        }
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn response_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read response body");
    serde_json::from_slice(&body).expect("response body is json")
}
