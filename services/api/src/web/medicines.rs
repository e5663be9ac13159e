//! services/api/src/web/medicines.rs
//!
//! Handlers for the medicine reminder list: add, list, delete. Entries are
//! never updated; the UI deletes and recreates instead.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct AddMedicineRequest {
    pub name: String,
    pub dosage: String,
    /// Free-form time of day, e.g. "08:00" or "after dinner".
    pub time_of_day: String,
}

#[derive(Serialize, ToSchema)]
pub struct MedicineResponse {
    pub id: i64,
    pub name: String,
    pub dosage: String,
    pub time_of_day: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /medicines - Add a medicine entry
#[utoipa::path(
    post,
    path = "/medicines",
    request_body = AddMedicineRequest,
    responses(
        (status = 201, description = "Entry created", body = MedicineResponse),
        (status = 400, description = "Missing fields"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn add_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<AddMedicineRequest>,
) -> Result<(StatusCode, Json<MedicineResponse>), (StatusCode, String)> {
    if req.name.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "Medicine name must not be empty".to_string(),
        ));
    }

    let entry = state
        .db
        .add_medicine(&user.username, &req.name, &req.dosage, &req.time_of_day)
        .await
        .map_err(|e| {
            error!("Failed to add medicine: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to save the medicine entry".to_string(),
            )
        })?;

    Ok((
        StatusCode::CREATED,
        Json(MedicineResponse {
            id: entry.id,
            name: entry.name,
            dosage: entry.dosage,
            time_of_day: entry.time_of_day,
        }),
    ))
}

/// GET /medicines - List the caller's medicine entries, newest first
#[utoipa::path(
    get,
    path = "/medicines",
    responses(
        (status = 200, description = "Entries returned", body = [MedicineResponse]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<MedicineResponse>>, (StatusCode, String)> {
    let entries = state
        .db
        .medicines_by_owner(&user.username)
        .await
        .map_err(|e| {
            error!("Failed to list medicines: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load the medicine list".to_string(),
            )
        })?;

    let payload: Vec<MedicineResponse> = entries
        .into_iter()
        .map(|e| MedicineResponse {
            id: e.id,
            name: e.name,
            dosage: e.dosage,
            time_of_day: e.time_of_day,
        })
        .collect();

    Ok(Json(payload))
}

/// DELETE /medicines/{id} - Remove one entry
///
/// Scoped to the caller; deleting an id that does not exist for that caller
/// is a silent no-op.
#[utoipa::path(
    delete,
    path = "/medicines/{id}",
    params(
        ("id" = i64, Path, description = "The entry id to delete.")
    ),
    responses(
        (status = 204, description = "Entry deleted (or did not exist)"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Result<StatusCode, (StatusCode, String)> {
    state
        .db
        .delete_medicine(&user.username, id)
        .await
        .map_err(|e| {
            error!("Failed to delete medicine: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to delete the medicine entry".to_string(),
            )
        })?;

    Ok(StatusCode::NO_CONTENT)
}
