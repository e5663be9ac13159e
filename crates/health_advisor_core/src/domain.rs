//! crates/health_advisor_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};

/// A registered user account. Accounts are immutable after registration;
/// there is no update or delete path anywhere in the system.
#[derive(Debug, Clone)]
pub struct Account {
    pub username: String,
    pub display_name: String,
    pub gender: Option<String>,
    pub age: Option<i32>,
    pub blood_type: Option<String>,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    pub username: String,
    pub password_hash: String,
    pub display_name: String,
}

// Represents a browser login session (auth cookie)
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub id: String,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

/// One completed question-and-answer exchange with the AI doctor.
/// Append-only. `recorded_at` is formatted text (`YYYY-MM-DD HH:MM`),
/// matching the storage contract.
#[derive(Debug, Clone)]
pub struct ConsultationRecord {
    pub id: i64,
    pub username: String,
    pub recorded_at: String,
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
}

/// One submitted mental-health screening. The category is a deterministic
/// function of the score. `recorded_at` is `YYYY-MM-DD` text.
#[derive(Debug, Clone)]
pub struct MentalScoreRecord {
    pub id: i64,
    pub username: String,
    pub recorded_at: String,
    pub score: i32,
    pub category: String,
}

/// A medicine reminder entry. Created via form, deleted by id, never updated.
#[derive(Debug, Clone)]
pub struct MedicineEntry {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub dosage: String,
    pub time_of_day: String,
}

/// The author of a transcript message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// One role-tagged message in the volatile chat transcript. The transcript
/// lives in process memory only and is dropped at logout.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}
