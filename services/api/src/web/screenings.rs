//! services/api/src/web/screenings.rs
//!
//! Handlers for the mental-health screening: submit a set of ordinal
//! responses, get the scored result back, and list past screenings.

use axum::{extract::State, http::StatusCode, Extension, Json};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;

use crate::web::middleware::AuthUser;
use crate::web::state::AppState;
use health_advisor_core::scoring::{screening_score, ResponseLevel};

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct ScreeningRequest {
    /// One ordinal value per question, each in 0..=3
    /// (never / several days / more than half the days / nearly every day).
    pub responses: Vec<u8>,
}

#[derive(Serialize, ToSchema)]
pub struct ScreeningResponse {
    pub total: u32,
    pub category: String,
}

#[derive(Serialize, ToSchema)]
pub struct ScreeningHistoryEntry {
    pub id: i64,
    pub recorded_at: String,
    pub score: i32,
    pub category: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /screenings - Score a screening submission and log it
#[utoipa::path(
    post,
    path = "/screenings",
    request_body = ScreeningRequest,
    responses(
        (status = 200, description = "Screening scored", body = ScreeningResponse),
        (status = 400, description = "Invalid responses"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn submit_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(req): Json<ScreeningRequest>,
) -> Result<Json<ScreeningResponse>, (StatusCode, String)> {
    if req.responses.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            "At least one response is required".to_string(),
        ));
    }

    // Convert the raw form values into typed levels at the boundary.
    let levels: Vec<ResponseLevel> = req
        .responses
        .iter()
        .map(|&raw| {
            ResponseLevel::from_raw(raw).ok_or((
                StatusCode::BAD_REQUEST,
                format!("Response value {} is out of range (expected 0..=3)", raw),
            ))
        })
        .collect::<Result<_, _>>()?;

    let result = screening_score(&levels);
    let category = result.category.label().to_string();

    // The screening result is shown even if the log write fails.
    let recorded_at = Utc::now().format("%Y-%m-%d").to_string();
    if let Err(e) = state
        .db
        .save_mental_score(&user.username, &recorded_at, result.total as i32, &category)
        .await
    {
        error!("Screening result shown but not persisted: {:?}", e);
    }

    Ok(Json(ScreeningResponse {
        total: result.total,
        category,
    }))
}

/// GET /screenings - Screening history, newest first
#[utoipa::path(
    get,
    path = "/screenings",
    operation_id = "screening_history",
    responses(
        (status = 200, description = "History returned", body = [ScreeningHistoryEntry]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn history_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ScreeningHistoryEntry>>, (StatusCode, String)> {
    let records = state
        .db
        .mental_scores_by_owner(&user.username)
        .await
        .map_err(|e| {
            error!("Failed to list screenings: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load screening history".to_string(),
            )
        })?;

    let entries: Vec<ScreeningHistoryEntry> = records
        .into_iter()
        .map(|r| ScreeningHistoryEntry {
            id: r.id,
            recorded_at: r.recorded_at,
            score: r.score,
            category: r.category,
        })
        .collect();

    Ok(Json(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::test_support::{seed_account, test_state, CannedAdvisor, MemoryDb};
    use std::sync::atomic::Ordering;

    fn caller(username: &str) -> AuthUser {
        AuthUser {
            session_id: "s1".to_string(),
            username: username.to_string(),
        }
    }

    #[tokio::test]
    async fn result_is_shown_even_when_the_log_write_fails() {
        let db = Arc::new(MemoryDb::default());
        let state = test_state(db.clone(), Arc::new(CannedAdvisor("ok")));
        seed_account(&state, "ana", "Ana").await;
        db.fail_log_writes.store(true, Ordering::SeqCst);

        let Json(result) = submit_handler(
            State(state.clone()),
            Extension(caller("ana")),
            Json(ScreeningRequest {
                responses: vec![3, 3, 3, 2],
            }),
        )
        .await
        .unwrap();
        assert_eq!(result.total, 11);
        assert!(state
            .db
            .mental_scores_by_owner("ana")
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn history_lists_the_newest_screening_first() {
        let db = Arc::new(MemoryDb::default());
        let state = test_state(db, Arc::new(CannedAdvisor("ok")));
        seed_account(&state, "ana", "Ana").await;

        for responses in [vec![0, 0, 0], vec![3, 3, 3]] {
            submit_handler(
                State(state.clone()),
                Extension(caller("ana")),
                Json(ScreeningRequest { responses }),
            )
            .await
            .unwrap();
        }

        let Json(entries) = history_handler(State(state), Extension(caller("ana")))
            .await
            .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].score, 9);
        assert_eq!(entries[1].score, 0);
    }

    #[tokio::test]
    async fn out_of_range_response_is_rejected() {
        let db = Arc::new(MemoryDb::default());
        let state = test_state(db, Arc::new(CannedAdvisor("ok")));
        seed_account(&state, "ana", "Ana").await;

        let err = submit_handler(
            State(state),
            Extension(caller("ana")),
            Json(ScreeningRequest {
                responses: vec![1, 4],
            }),
        )
        .await
        .err()
        .unwrap();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }
}
