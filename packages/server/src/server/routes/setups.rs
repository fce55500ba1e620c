//! Saved tank setup endpoints.

use axum::extract::{Extension, Path};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use analysis::TankSetup;

use crate::domains::setups::{AnalysisInput, SavedTankSetup};
use crate::server::app::AxumAppState;
use crate::server::middleware::AuthState;

use super::error::{require_user, ApiError, ApiResult};

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveSetupRequest {
    name: String,
    setup: TankSetup,
    #[serde(default)]
    analysis: Option<AnalysisInput>,
}

/// Save a new tank setup with livestock and an optional analysis result
pub async fn save_setup_handler(
    Extension(state): Extension<AxumAppState>,
    Extension(auth): Extension<AuthState>,
    Json(request): Json<SaveSetupRequest>,
) -> ApiResult<Json<SavedTankSetup>> {
    let user = require_user(&auth)?;
    let saved = state
        .setups
        .save(user.user_id, request.name, request.setup, request.analysis)
        .await?;
    Ok(Json(saved))
}

/// List the caller's saved setups, newest first
pub async fn list_setups_handler(
    Extension(state): Extension<AxumAppState>,
    Extension(auth): Extension<AuthState>,
) -> ApiResult<Json<Vec<SavedTankSetup>>> {
    let user = require_user(&auth)?;
    let setups = state.setups.list(user.user_id).await?;
    Ok(Json(setups))
}

/// Fetch one saved setup
pub async fn get_setup_handler(
    Extension(state): Extension<AxumAppState>,
    Extension(auth): Extension<AuthState>,
    Path(id): Path<String>,
) -> ApiResult<Json<SavedTankSetup>> {
    let user = require_user(&auth)?;
    let setup_id = parse_setup_id(&id)?;
    let setup = state.setups.load(user.user_id, setup_id).await?;
    Ok(Json(setup))
}

/// Replace a saved setup and its livestock
pub async fn update_setup_handler(
    Extension(state): Extension<AxumAppState>,
    Extension(auth): Extension<AuthState>,
    Path(id): Path<String>,
    Json(request): Json<SaveSetupRequest>,
) -> ApiResult<Json<SavedTankSetup>> {
    let user = require_user(&auth)?;
    let setup_id = parse_setup_id(&id)?;
    let updated = state
        .setups
        .update(
            user.user_id,
            setup_id,
            request.name,
            request.setup,
            request.analysis,
        )
        .await?;
    Ok(Json(updated))
}

#[derive(Serialize)]
pub struct DeleteSetupResponse {
    message: String,
}

/// Delete a saved setup; deleting an id that is already gone still succeeds
pub async fn delete_setup_handler(
    Extension(state): Extension<AxumAppState>,
    Extension(auth): Extension<AuthState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteSetupResponse>> {
    let user = require_user(&auth)?;
    let setup_id = parse_setup_id(&id)?;
    state.setups.delete(user.user_id, setup_id).await?;
    Ok(Json(DeleteSetupResponse {
        message: "Tank setup deleted successfully".to_string(),
    }))
}

// Unparseable ids behave like ids that do not exist
fn parse_setup_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|_| ApiError::NotFound("Tank setup not found".to_string()))
}
