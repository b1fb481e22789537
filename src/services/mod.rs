// Catalog core
pub mod product_images;
pub mod variant_service;
pub mod variants;

// Catalog administration
pub mod product_attributes;
pub mod site_settings;

pub use product_attributes::ProductAttributeService;
pub use product_images::ProductImageService;
pub use site_settings::SiteSettingsService;
pub use variant_service::{ReconcileSummary, VariantRecord, VariantService};
