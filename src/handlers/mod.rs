pub mod common;
pub mod products;
pub mod settings;

use crate::cache::{CacheBackend, InMemoryCache};
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::events::EventSender;
use crate::services::{
    ProductAttributeService, ProductImageService, SiteSettingsService, VariantService,
};
use std::sync::Arc;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub variants: Arc<VariantService>,
    pub images: Arc<ProductImageService>,
    pub attributes: Arc<ProductAttributeService>,
    pub settings: Arc<SiteSettingsService>,
}

impl AppServices {
    /// Builds the service container with an in-process settings cache.
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>, config: &AppConfig) -> Self {
        let cache: Arc<dyn CacheBackend> = Arc::new(InMemoryCache::new());
        Self::with_cache(db_pool, event_sender, config, cache)
    }

    pub fn with_cache(
        db_pool: Arc<DbPool>,
        event_sender: Arc<EventSender>,
        config: &AppConfig,
        cache: Arc<dyn CacheBackend>,
    ) -> Self {
        let variants = Arc::new(VariantService::new(
            db_pool.clone(),
            event_sender.clone(),
            config.max_variant_combinations,
        ));
        let images = Arc::new(ProductImageService::new(db_pool.clone()));
        let attributes = Arc::new(ProductAttributeService::new(
            db_pool.clone(),
            event_sender.clone(),
            config.max_variant_combinations,
        ));
        let settings = Arc::new(SiteSettingsService::new(
            db_pool,
            cache,
            config.settings_cache_ttl(),
            event_sender,
        ));

        Self {
            variants,
            images,
            attributes,
            settings,
        }
    }
}
