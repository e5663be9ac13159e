//! crates/health_advisor_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    Account, AccountCredentials, AuthSession, ChatMessage, ConsultationRecord,
    MedicineEntry, MentalScoreRecord,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    Duplicate(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("AI service unavailable: {0}")]
    AiUnavailable(String),
    #[error("Document could not be read: {0}")]
    DocumentUnreadable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- Account Management ---

    /// Registers a new account. Fails with `PortError::Duplicate` if the
    /// username is taken; the existing row is never overwritten.
    async fn create_account(
        &self,
        username: &str,
        password_hash: &str,
        display_name: &str,
        gender: Option<&str>,
        age: Option<i32>,
        blood_type: Option<&str>,
    ) -> PortResult<Account>;

    async fn get_account(&self, username: &str) -> PortResult<Account>;

    /// Exact, case-sensitive lookup used by login.
    async fn get_credentials(&self, username: &str) -> PortResult<AccountCredentials>;

    // --- Auth Sessions ---

    async fn create_auth_session(
        &self,
        session_id: &str,
        username: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Returns the live session, or `Unauthorized`. An expired session is
    /// removed on first sight.
    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AuthSession>;

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()>;

    // --- Consultation Log (append-only) ---

    async fn save_consultation(
        &self,
        username: &str,
        recorded_at: &str,
        question: &str,
        answer: &str,
        category: Option<&str>,
    ) -> PortResult<()>;

    /// Owner's consultations, newest first.
    async fn consultations_by_owner(&self, username: &str)
        -> PortResult<Vec<ConsultationRecord>>;

    // --- Mental-Score Log (append-only) ---

    async fn save_mental_score(
        &self,
        username: &str,
        recorded_at: &str,
        score: i32,
        category: &str,
    ) -> PortResult<()>;

    /// Owner's screening history, newest first.
    async fn mental_scores_by_owner(&self, username: &str)
        -> PortResult<Vec<MentalScoreRecord>>;

    // --- Medicine Entries ---

    async fn add_medicine(
        &self,
        username: &str,
        name: &str,
        dosage: &str,
        time_of_day: &str,
    ) -> PortResult<MedicineEntry>;

    /// Owner's medicine list, newest first.
    async fn medicines_by_owner(&self, username: &str) -> PortResult<Vec<MedicineEntry>>;

    /// Deletes at most one entry, scoped to the owner. A missing id is a
    /// silent no-op, not an error.
    async fn delete_medicine(&self, username: &str, id: i64) -> PortResult<()>;
}

/// Everything the AI doctor needs for one exchange. The transcript and the
/// optional attachments are folded into a single prompt; every call is a
/// fresh, independent request with no conversation state on the remote side.
#[derive(Debug, Clone)]
pub struct ConsultationPrompt {
    pub patient_name: String,
    pub question: String,
    pub transcript: Vec<ChatMessage>,
    pub image: Option<Vec<u8>>,
    pub document_text: Option<String>,
}

#[async_trait]
pub trait ConsultationService: Send + Sync {
    /// Produces a free-text reply to the patient's question. Fails with
    /// `PortError::AiUnavailable` when the completion service cannot be
    /// reached (or no credential is configured).
    async fn advise(&self, prompt: &ConsultationPrompt) -> PortResult<String>;
}

/// The dietary goal selected by the user for meal planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DietGoal {
    LoseWeight,
    GainWeight,
    BuildMuscle,
}

impl DietGoal {
    pub fn label(self) -> &'static str {
        match self {
            DietGoal::LoseWeight => "lose weight",
            DietGoal::GainWeight => "gain weight",
            DietGoal::BuildMuscle => "build muscle",
        }
    }
}

/// Inputs for a one-day meal plan request.
#[derive(Debug, Clone)]
pub struct DietProfile {
    pub weight_kg: f64,
    pub height_cm: f64,
    pub goal: DietGoal,
    pub bmr: f64,
}

#[async_trait]
pub trait MealPlanService: Send + Sync {
    /// Generates a free-text one-day meal plan for the given profile.
    async fn generate_plan(&self, profile: &DietProfile) -> PortResult<String>;
}

pub trait DocumentTextService: Send + Sync {
    /// Extracts concatenated page text from a PDF-like byte stream,
    /// truncated to a fixed character budget. Fails with
    /// `PortError::DocumentUnreadable` when the bytes cannot be parsed.
    fn extract_text(&self, bytes: &[u8]) -> PortResult<String>;
}
