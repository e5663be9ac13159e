//! services/api/src/web/consultations.rs
//!
//! Handlers for the AI doctor chat, the consultation history, and lab-report
//! summarization.

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::web::middleware::AuthUser;
use crate::web::state::AppState;
use health_advisor_core::ports::{ConsultationPrompt, PortError};

const LAB_REPORT_CATEGORY: &str = "lab_report";
const LAB_REPORT_QUESTION: &str = "Please summarize this lab report in plain language.";

//=========================================================================================
// Response Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct ConsultationResponse {
    pub answer: String,
}

#[derive(Serialize, ToSchema)]
pub struct ConsultationHistoryEntry {
    pub id: i64,
    pub recorded_at: String,
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
}

fn ai_error_response(e: PortError) -> (StatusCode, String) {
    match e {
        PortError::AiUnavailable(reason) => {
            error!("AI gateway unavailable: {}", reason);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                "The AI doctor is unavailable right now. Please try again later.".to_string(),
            )
        }
        other => {
            error!("Consultation failed: {:?}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to complete the consultation".to_string(),
            )
        }
    }
}

/// Writes the exchange to the consultation log. A failed write is logged and
/// swallowed: the reply has already been produced and is still shown, it is
/// just not persisted.
async fn persist_exchange(
    state: &AppState,
    username: &str,
    question: &str,
    answer: &str,
    category: Option<&str>,
) {
    let recorded_at = Utc::now().format("%Y-%m-%d %H:%M").to_string();
    if let Err(e) = state
        .db
        .save_consultation(username, &recorded_at, question, answer, category)
        .await
    {
        warn!("Consultation reply shown but not persisted: {:?}", e);
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// Ask the AI doctor a question.
///
/// Accepts multipart/form-data with a `question` text part and an optional
/// `image` file part (JPEG or PNG photo of a symptom or document).
#[utoipa::path(
    post,
    path = "/consultations",
    request_body(content_type = "multipart/form-data", description = "The question and optional image."),
    responses(
        (status = 200, description = "Answer produced", body = ConsultationResponse),
        (status = 400, description = "Missing question"),
        (status = 503, description = "AI service unavailable")
    )
)]
pub async fn ask_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<ConsultationResponse>, (StatusCode, String)> {
    // 1. Pull the question and the optional image out of the form
    let mut question: Option<String> = None;
    let mut image: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let name = field.name().map(|s| s.to_string());
        match name.as_deref() {
            Some("question") => {
                let text = field.text().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read question field: {}", e),
                    )
                })?;
                question = Some(text);
            }
            Some("image") => {
                let data = field.bytes().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read image bytes: {}", e),
                    )
                })?;
                image = Some(data.to_vec());
            }
            _ => {}
        }
    }

    let question = match question {
        Some(q) if !q.trim().is_empty() => q,
        _ => {
            return Err((
                StatusCode::BAD_REQUEST,
                "A non-empty 'question' field is required".to_string(),
            ))
        }
    };

    run_consultation(&state, &user, question, image).await
}

/// One full exchange with the AI doctor, after form parsing.
async fn run_consultation(
    state: &AppState,
    user: &AuthUser,
    question: String,
    image: Option<Vec<u8>>,
) -> Result<Json<ConsultationResponse>, (StatusCode, String)> {
    // 1. Resolve the patient's display name for the prompt persona
    let account = state.db.get_account(&user.username).await.map_err(|e| {
        error!("Failed to load account for consultation: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to load account".to_string(),
        )
    })?;

    // 2. Build the prompt from the session's volatile transcript
    let prompt = ConsultationPrompt {
        patient_name: account.display_name,
        question: question.clone(),
        transcript: state.transcripts.snapshot(&user.session_id),
        image,
        document_text: None,
    };

    // 3. One blocking round trip to the AI gateway; failure surfaces inline
    //    and leaves the transcript untouched
    let answer = state
        .consult_adapter
        .advise(&prompt)
        .await
        .map_err(ai_error_response)?;

    // 4. Record the exchange in the transcript, then best-effort persist it
    state
        .transcripts
        .push_exchange(&user.session_id, &question, &answer);
    persist_exchange(state, &user.username, &question, &answer, None).await;

    Ok(Json(ConsultationResponse { answer }))
}

/// GET /consultations - Consultation history, newest first
#[utoipa::path(
    get,
    path = "/consultations",
    operation_id = "consultation_history",
    responses(
        (status = 200, description = "History returned", body = [ConsultationHistoryEntry]),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn history_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<ConsultationHistoryEntry>>, (StatusCode, String)> {
    let records = state
        .db
        .consultations_by_owner(&user.username)
        .await
        .map_err(|e| {
            error!("Failed to list consultations: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load consultation history".to_string(),
            )
        })?;

    let entries: Vec<ConsultationHistoryEntry> = records
        .into_iter()
        .map(|r| ConsultationHistoryEntry {
            id: r.id,
            recorded_at: r.recorded_at,
            question: r.question,
            answer: r.answer,
            category: r.category,
        })
        .collect();

    Ok(Json(entries))
}

/// Upload a lab report PDF and get a plain-language summary.
///
/// Accepts multipart/form-data with a single `file` part. The extracted text
/// is truncated to the configured character budget before it reaches the AI
/// gateway.
#[utoipa::path(
    post,
    path = "/lab-reports",
    request_body(content_type = "multipart/form-data", description = "The lab report PDF."),
    responses(
        (status = 200, description = "Summary produced", body = ConsultationResponse),
        (status = 400, description = "Missing or unreadable document"),
        (status = 503, description = "AI service unavailable")
    )
)]
pub async fn lab_report_handler(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    mut multipart: Multipart,
) -> Result<Json<ConsultationResponse>, (StatusCode, String)> {
    // 1. Read the uploaded file
    let file_bytes = if let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        field
            .bytes()
            .await
            .map_err(|e| {
                (
                    StatusCode::BAD_REQUEST,
                    format!("Failed to read file bytes: {}", e),
                )
            })?
            .to_vec()
    } else {
        return Err((
            StatusCode::BAD_REQUEST,
            "Multipart form must include a file".to_string(),
        ));
    };

    // 2. Extract the text layer; an unreadable document is the user's problem
    //    to fix, not a server fault
    let document_text = state.document_adapter.extract_text(&file_bytes).map_err(|e| {
        warn!("Lab report could not be read: {:?}", e);
        (
            StatusCode::BAD_REQUEST,
            "The document could not be read. Please upload a text-based PDF.".to_string(),
        )
    })?;

    // 3. Summarize through the consultation gateway; the lab text rides along
    //    as a document section, with no chat transcript
    let account = state.db.get_account(&user.username).await.map_err(|e| {
        error!("Failed to load account for lab report: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to load account".to_string(),
        )
    })?;

    let prompt = ConsultationPrompt {
        patient_name: account.display_name,
        question: LAB_REPORT_QUESTION.to_string(),
        transcript: Vec::new(),
        image: None,
        document_text: Some(document_text),
    };

    let answer = state
        .consult_adapter
        .advise(&prompt)
        .await
        .map_err(ai_error_response)?;

    // 4. Best-effort persist under the lab-report category
    persist_exchange(
        &state,
        &user.username,
        LAB_REPORT_QUESTION,
        &answer,
        Some(LAB_REPORT_CATEGORY),
    )
    .await;

    Ok(Json(ConsultationResponse { answer }))
}
