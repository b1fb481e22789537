use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Storefront Catalog API",
        version = "0.1.0",
        description = r#"
# Storefront Catalog API

Administrative catalog operations for a storefront.

## Features

- **Variants**: variable products get one variant per combination of their selected attribute values.
  Reconciling is idempotent and never touches variants whose combination is still offered.
- **Attributes**: replacing a product's selections reconciles its variants in the same transaction.
- **Images**: images tagged with attribute pairs are shown when the shopper's selection covers every pair;
  untagged images are the fallback.
- **Settings**: grouped site settings served from a read-through cache.

## Error Handling

Errors share one response shape:

```json
{
  "error": "Not Found",
  "message": "Not found: Product 2f1c... not found",
  "request_id": "5b0e...",
  "timestamp": "2024-01-01T00:00:00Z"
}
```
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Variants", description = "Variant reconciliation and listing"),
        (name = "Attributes", description = "Product attribute selections"),
        (name = "Images", description = "Attribute-aware product images"),
        (name = "Settings", description = "Site settings")
    ),
    paths(
        // Variants
        crate::handlers::products::list_variants,
        crate::handlers::products::reconcile_variants,
        crate::handlers::products::product_stock,

        // Attributes
        crate::handlers::products::get_product_attributes,
        crate::handlers::products::sync_product_attributes,

        // Images
        crate::handlers::products::list_images,
        crate::handlers::products::match_images,

        // Settings
        crate::handlers::settings::list_settings,
        crate::handlers::settings::group_settings,
        crate::handlers::settings::update_settings,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::common::AttributePair,

            // Variant types
            crate::services::VariantRecord,
            crate::services::ReconcileSummary,
            crate::handlers::products::StockResponse,

            // Attribute types
            crate::handlers::products::SyncAttributesRequest,
            crate::services::product_attributes::AttributeSelection,
            crate::services::product_attributes::SelectedValue,

            // Image types
            crate::handlers::products::MatchImagesRequest,
            crate::services::product_images::LabeledImage,

            // Settings types
            crate::handlers::settings::UpdateSettingsRequest,
            crate::handlers::settings::UpdateSettingsResponse,

            // Error types
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
