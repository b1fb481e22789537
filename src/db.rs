pub mod transaction;

use crate::config::AppConfig;
use crate::errors::ServiceError;
use metrics::{counter, gauge};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{debug, error, info};

pub use transaction::with_transaction;

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Configuration for database connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    /// Database connection URL
    pub url: String,
    /// Maximum number of connections
    pub max_connections: u32,
    /// Minimum number of connections
    pub min_connections: u32,
    /// Connection timeout duration
    pub connect_timeout: Duration,
    /// Idle timeout duration
    pub idle_timeout: Duration,
    /// Acquire connection timeout
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(8),
        }
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
        }
    }
}

/// Establishes a connection pool with default tuning
pub async fn establish_connection(database_url: &str) -> Result<DbPool, ServiceError> {
    let config = DbConfig {
        url: database_url.to_string(),
        ..Default::default()
    };

    establish_connection_with_config(&config).await
}

/// Establishes a connection pool to the database with custom configuration
///
/// # Errors
/// Returns `ServiceError::DatabaseError` if the connection cannot be established
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, ServiceError> {
    debug!(
        max_connections = config.max_connections,
        min_connections = config.min_connections,
        "Configuring database connection"
    );

    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(false);

    gauge!("storefront_db.max_connections", config.max_connections as f64);

    info!(
        "Connecting to database with max_connections={}",
        config.max_connections
    );

    let db_pool = Database::connect(opt).await.map_err(|e| {
        error!(error = %e, "Database connection establishment failed");
        ServiceError::DatabaseError(e)
    })?;

    info!("Database connection pool established successfully");

    Ok(db_pool)
}

/// Establish DB pool using AppConfig tuning
pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    let db_cfg: DbConfig = cfg.into();
    establish_connection_with_config(&db_cfg).await
}

/// Runs the embedded migrations
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    info!("Running database migrations");
    let start = std::time::Instant::now();

    let result = crate::migrator::Migrator::up(pool, None)
        .await
        .map_err(ServiceError::DatabaseError);

    let elapsed = start.elapsed();
    match &result {
        Ok(_) => info!(
            "Database migrations completed successfully in {:?}",
            elapsed
        ),
        Err(e) => error!("Database migrations failed after {:?}: {}", elapsed, e),
    }

    result
}

/// Checks if the database connection is active
pub async fn check_connection(pool: &DbPool) -> Result<(), ServiceError> {
    let start = std::time::Instant::now();

    let result = pool.ping().await.map_err(ServiceError::DatabaseError);

    let elapsed = start.elapsed();
    match &result {
        Ok(_) => {
            debug!("Database connection check successful in {:?}", elapsed);
            gauge!("storefront_db.connection_latency", elapsed.as_millis() as f64);
        }
        Err(e) => {
            error!(
                "Database connection check failed after {:?}: {}",
                elapsed, e
            );
            counter!("storefront_db.connection_failures", 1);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::EntityTrait;

    async fn memory_pool() -> DbPool {
        establish_connection_with_config(&DbConfig {
            url: "sqlite::memory:".to_string(),
            max_connections: 1,
            min_connections: 1,
            ..Default::default()
        })
        .await
        .expect("sqlite connection")
    }

    #[tokio::test]
    async fn connects_and_pings() {
        let pool = memory_pool().await;
        assert!(check_connection(&pool).await.is_ok());
    }

    #[tokio::test]
    async fn migrations_apply_cleanly_twice() {
        let pool = memory_pool().await;
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let products = crate::entities::product::Entity::find()
            .all(&pool)
            .await
            .expect("products table exists");
        assert!(products.is_empty());
    }

    #[tokio::test]
    async fn every_entity_round_trips_after_migration() {
        use crate::entities::{
            commerce::{
                attribute, attribute_value, product_attribute, product_image, product_variant,
                product_variant_attribute, AttributeType,
            },
            product::{self, ProductStatus, ProductType},
            site_setting::{self, SettingType},
        };
        use rust_decimal::Decimal;
        use sea_orm::{ActiveModelTrait, Set};
        use uuid::Uuid;

        let pool = memory_pool().await;
        run_migrations(&pool).await.unwrap();
        let now = chrono::Utc::now();

        let item = product::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set("Classic Tee".into()),
            sku: Set(Some("TEE".into())),
            description: Set(None),
            base_price: Set(Decimal::new(2450, 2)),
            product_type: Set(ProductType::Variable),
            status: Set(ProductStatus::Active),
            stock_quantity: Set(3),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&pool)
        .await
        .expect("insert product");
        let found = product::Entity::find_by_id(item.id).one(&pool).await.unwrap();
        assert_eq!(found.as_ref(), Some(&item));
        assert_eq!(item.base_price, Decimal::new(2450, 2));

        let color = attribute::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set("Color".into()),
            slug: Set("color".into()),
            description: Set(None),
            attribute_type: Set(AttributeType::Color),
            is_required: Set(true),
            sort_order: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&pool)
        .await
        .expect("insert attribute");
        let found = attribute::Entity::find_by_id(color.id).one(&pool).await.unwrap();
        assert_eq!(found.as_ref(), Some(&color));

        let red = attribute_value::ActiveModel {
            id: Set(Uuid::new_v4()),
            attribute_id: Set(color.id),
            value: Set("Red".into()),
            hex: Set(Some("#FF0000".into())),
            sort_order: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&pool)
        .await
        .expect("insert attribute value");
        let found = attribute_value::Entity::find_by_id(red.id).one(&pool).await.unwrap();
        assert_eq!(found.as_ref(), Some(&red));

        let selection = product_attribute::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(item.id),
            attribute_id: Set(color.id),
            attribute_value_id: Set(red.id),
            created_at: Set(now),
        }
        .insert(&pool)
        .await
        .expect("insert product attribute");
        let found = product_attribute::Entity::find_by_id(selection.id)
            .one(&pool)
            .await
            .unwrap();
        assert_eq!(found.as_ref(), Some(&selection));

        let variant = product_variant::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(item.id),
            sku: Set("TEE-red".into()),
            price_override: Set(Some(Decimal::new(2999, 2))),
            stock_quantity: Set(5),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&pool)
        .await
        .expect("insert variant");
        let found = product_variant::Entity::find_by_id(variant.id)
            .one(&pool)
            .await
            .unwrap();
        assert_eq!(found.as_ref(), Some(&variant));

        let attachment = product_variant_attribute::ActiveModel {
            id: Set(Uuid::new_v4()),
            variant_id: Set(variant.id),
            attribute_id: Set(color.id),
            attribute_value_id: Set(red.id),
        }
        .insert(&pool)
        .await
        .expect("insert variant attribute");
        let found = product_variant_attribute::Entity::find_by_id(attachment.id)
            .one(&pool)
            .await
            .unwrap();
        assert_eq!(found.as_ref(), Some(&attachment));

        let image = product_image::ActiveModel {
            id: Set(Uuid::new_v4()),
            product_id: Set(item.id),
            image_url: Set("red.jpg".into()),
            alt_text: Set(Some("Red tee".into())),
            sort_order: Set(1),
            is_primary: Set(false),
            attribute_combination: Set(Some(serde_json::json!([
                { "attribute_id": color.id, "attribute_value_id": red.id }
            ]))),
        }
        .insert(&pool)
        .await
        .expect("insert product image");
        let found = product_image::Entity::find_by_id(image.id).one(&pool).await.unwrap();
        assert_eq!(found.as_ref(), Some(&image));
        assert_eq!(image.attribute_pairs().unwrap().len(), 1);

        let setting = site_setting::ActiveModel {
            id: Set(Uuid::new_v4()),
            key: Set("site_name".into()),
            group: Set("general".into()),
            value: Set(Some("Shop".into())),
            setting_type: Set(SettingType::Text),
            label: Set("Site Name".into()),
            description: Set(None),
            is_public: Set(true),
            validation_rules: Set(None),
            sort_order: Set(0),
        }
        .insert(&pool)
        .await
        .expect("insert site setting");
        let found = site_setting::Entity::find_by_id(setting.id).one(&pool).await.unwrap();
        assert_eq!(found.as_ref(), Some(&setting));
    }

    #[test]
    fn db_config_follows_app_config() {
        let mut app = AppConfig::new(
            "sqlite::memory:".into(),
            "127.0.0.1".into(),
            8080,
            "test".into(),
        );
        app.db_max_connections = 4;
        app.db_acquire_timeout_secs = 3;

        let cfg = DbConfig::from(&app);
        assert_eq!(cfg.max_connections, 4);
        assert_eq!(cfg.acquire_timeout, Duration::from_secs(3));
        assert_eq!(cfg.url, "sqlite::memory:");
    }
}
