use crate::handlers::common::{map_service_error, success_response, validate_input};
use crate::{errors::ApiError, AppState};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

/// Creates the router for site settings endpoints
pub fn settings_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_settings).put(update_settings))
        .route("/:group", get(group_settings))
}

fn validate_setting_keys(values: &BTreeMap<String, Value>) -> Result<(), ValidationError> {
    if values.keys().any(|k| k.trim().is_empty()) {
        let mut err = ValidationError::new("blank_key");
        err.message = Some("setting keys must not be blank".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Serialize, Validate, ToSchema)]
pub struct UpdateSettingsRequest {
    /// key -> new value; unknown keys are ignored
    #[validate(custom = "validate_setting_keys")]
    #[schema(value_type = Object)]
    pub settings: BTreeMap<String, Value>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateSettingsResponse {
    pub updated: Vec<String>,
}

/// All site settings
#[utoipa::path(
    get,
    path = "/api/v1/settings",
    responses(
        (status = 200, description = "Settings retrieved", body = crate::ApiResponse<serde_json::Value>)
    ),
    tag = "Settings"
)]
pub async fn list_settings(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let settings = state
        .services
        .settings
        .all()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(settings))
}

/// Settings of one group
#[utoipa::path(
    get,
    path = "/api/v1/settings/{group}",
    params(
        ("group" = String, Path, description = "Settings group, e.g. `store`")
    ),
    responses(
        (status = 200, description = "Settings retrieved", body = crate::ApiResponse<serde_json::Value>)
    ),
    tag = "Settings"
)]
pub async fn group_settings(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let settings = state
        .services
        .settings
        .group(&group)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(settings))
}

/// Update several settings at once
#[utoipa::path(
    put,
    path = "/api/v1/settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Settings updated", body = crate::ApiResponse<UpdateSettingsResponse>),
        (status = 400, description = "Invalid input", body = crate::errors::ErrorResponse)
    ),
    tag = "Settings"
)]
pub async fn update_settings(
    State(state): State<AppState>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_input(&payload)?;

    let updated = state
        .services
        .settings
        .update_many(payload.settings)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(UpdateSettingsResponse { updated }))
}
