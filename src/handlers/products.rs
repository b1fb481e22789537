use crate::common::AttributePair;
use crate::handlers::common::{map_service_error, success_response, validate_input};
use crate::services::product_attributes::AttributeSelectionInput;
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Creates the router for catalog endpoints under `/products`
pub fn products_routes() -> Router<AppState> {
    Router::new()
        .route("/:id/variants", get(list_variants))
        .route("/:id/variants/reconcile", post(reconcile_variants))
        .route("/:id/stock", get(product_stock))
        .route(
            "/:id/attributes",
            get(get_product_attributes).put(sync_product_attributes),
        )
        .route("/:id/images", get(list_images))
        .route("/:id/images/match", post(match_images))
}

fn validate_selection_ids(attributes: &AttributeSelectionInput) -> Result<(), ValidationError> {
    let has_nil = attributes
        .iter()
        .any(|(attribute_id, values)| attribute_id.is_nil() || values.iter().any(Uuid::is_nil));
    if has_nil {
        let mut err = ValidationError::new("nil_id");
        err.message = Some("attribute and value ids must not be nil".into());
        return Err(err);
    }
    Ok(())
}

/// Request body replacing a product's attribute selections
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct SyncAttributesRequest {
    /// attribute id -> selected value ids
    #[validate(custom = "validate_selection_ids")]
    #[schema(value_type = Object)]
    pub attributes: AttributeSelectionInput,
}

/// Request body for resolving images for a selection
#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct MatchImagesRequest {
    #[serde(default)]
    #[validate(length(max = 64))]
    pub selection: Vec<AttributePair>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct StockResponse {
    pub product_id: Uuid,
    pub total_stock: i64,
}

/// List a product's variants
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/variants",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Variants retrieved", body = crate::ApiResponse<Vec<crate::services::VariantRecord>>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Variants"
)]
pub async fn list_variants(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let variants = state
        .services
        .variants
        .list_variants(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(variants))
}

/// Reconcile a product's variants with its attribute selections
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/variants/reconcile",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Variants reconciled", body = crate::ApiResponse<crate::services::ReconcileSummary>),
        (status = 400, description = "Too many combinations", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Generated SKU already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "Variants"
)]
pub async fn reconcile_variants(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let summary = state
        .services
        .variants
        .reconcile(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(summary))
}

/// Total sellable stock of a product
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/stock",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Stock computed", body = crate::ApiResponse<StockResponse>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Variants"
)]
pub async fn product_stock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let total_stock = state
        .services
        .variants
        .total_stock(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(StockResponse {
        product_id: id,
        total_stock,
    }))
}

/// A product's attribute selections grouped by attribute
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/attributes",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Selections retrieved", body = crate::ApiResponse<Vec<crate::services::product_attributes::AttributeSelection>>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Attributes"
)]
pub async fn get_product_attributes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let selections = state
        .services
        .attributes
        .selected_attribute_values(id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(selections))
}

/// Replace a product's attribute selections and reconcile its variants
#[utoipa::path(
    put,
    path = "/api/v1/products/{id}/attributes",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = SyncAttributesRequest,
    responses(
        (status = 200, description = "Selections replaced", body = crate::ApiResponse<crate::services::ReconcileSummary>),
        (status = 400, description = "Invalid selection", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse),
        (status = 409, description = "Generated SKU already exists", body = crate::errors::ErrorResponse)
    ),
    tag = "Attributes"
)]
pub async fn sync_product_attributes(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SyncAttributesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let summary = state
        .services
        .attributes
        .sync_attributes(id, payload.attributes)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(summary))
}

/// All images of a product with their combination labels
#[utoipa::path(
    get,
    path = "/api/v1/products/{id}/images",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    responses(
        (status = 200, description = "Images retrieved", body = crate::ApiResponse<Vec<crate::services::product_images::LabeledImage>>),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Images"
)]
pub async fn list_images(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let images = state
        .services
        .images
        .list_images(id)
        .await
        .map_err(map_service_error)?;
    let labeled = state
        .services
        .images
        .label_images(images)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(labeled))
}

/// Images to display for an attribute selection
#[utoipa::path(
    post,
    path = "/api/v1/products/{id}/images/match",
    params(
        ("id" = Uuid, Path, description = "Product ID")
    ),
    request_body = MatchImagesRequest,
    responses(
        (status = 200, description = "Images resolved", body = crate::ApiResponse<Vec<crate::services::product_images::LabeledImage>>),
        (status = 400, description = "Invalid selection", body = crate::errors::ErrorResponse),
        (status = 404, description = "Product not found", body = crate::errors::ErrorResponse)
    ),
    tag = "Images"
)]
pub async fn match_images(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MatchImagesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let images = state
        .services
        .images
        .images_for_selection(id, &payload.selection)
        .await
        .map_err(map_service_error)?;
    let labeled = state
        .services
        .images
        .label_images(images)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(labeled))
}
