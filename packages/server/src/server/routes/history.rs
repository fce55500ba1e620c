//! Combined analysis history endpoint.

use axum::extract::Extension;
use axum::Json;
use serde::Serialize;

use crate::domains::images::ImageAnalysisEntry;
use crate::domains::setups::TankAnalysisEntry;
use crate::server::app::AxumAppState;
use crate::server::middleware::AuthState;

use super::error::{ApiError, ApiResult};

/// Cap on entries returned per history section
const HISTORY_LIMIT: usize = 50;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisHistory {
    tank_analyses: Vec<TankAnalysisEntry>,
    image_analyses: Vec<ImageAnalysisEntry>,
    total_tank_analyses: usize,
    total_image_analyses: usize,
}

/// Combined setup and image analysis history, newest first in each section
pub async fn analysis_history_handler(
    Extension(state): Extension<AxumAppState>,
    Extension(auth): Extension<AuthState>,
) -> ApiResult<Json<AnalysisHistory>> {
    let user = auth
        .user()
        .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

    let tank_analyses = state
        .setups
        .analysis_history(user.user_id, HISTORY_LIMIT)
        .await?;
    let image_analyses = state
        .images
        .analysis_history(user.user_id, HISTORY_LIMIT)
        .await?;

    let total_tank_analyses = tank_analyses.len();
    let total_image_analyses = image_analyses.len();
    Ok(Json(AnalysisHistory {
        tank_analyses,
        image_analyses,
        total_tank_analyses,
        total_image_analyses,
    }))
}
