//! services/api/src/web/test_support.rs
//!
//! In-memory doubles for the service ports, with the same contract as the
//! real adapters, so handler behavior can be exercised without Postgres or a
//! network credential.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::adapters::{DisabledAiAdapter, PdfTextAdapter};
use crate::config::Config;
use crate::web::state::{AppState, Transcripts};
use health_advisor_core::domain::{
    Account, AccountCredentials, AuthSession, ConsultationRecord, MedicineEntry,
    MentalScoreRecord,
};
use health_advisor_core::ports::{
    ConsultationPrompt, ConsultationService, DatabaseService, PortError, PortResult,
};

#[derive(Default)]
struct MemoryDbInner {
    accounts: HashMap<String, (Account, String)>,
    sessions: HashMap<String, AuthSession>,
    consultations: Vec<ConsultationRecord>,
    mental_scores: Vec<MentalScoreRecord>,
    medicines: Vec<MedicineEntry>,
    next_id: i64,
}

impl MemoryDbInner {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

/// An in-memory `DatabaseService` honoring the same contract as the Postgres
/// adapter: duplicates never overwrite, listings are newest first, deletes
/// are owner-scoped no-ops.
///
/// `fail_log_writes` makes every log insert fail; `fail_lookups` simulates a
/// storage outage on account reads.
#[derive(Default)]
pub struct MemoryDb {
    inner: Mutex<MemoryDbInner>,
    pub fail_log_writes: AtomicBool,
    pub fail_lookups: AtomicBool,
}

fn storage_offline() -> PortError {
    PortError::Unexpected("storage offline".to_string())
}

#[async_trait]
impl DatabaseService for MemoryDb {
    async fn create_account(
        &self,
        username: &str,
        password_hash: &str,
        display_name: &str,
        gender: Option<&str>,
        age: Option<i32>,
        blood_type: Option<&str>,
    ) -> PortResult<Account> {
        let mut inner = self.inner.lock().unwrap();
        if inner.accounts.contains_key(username) {
            return Err(PortError::Duplicate(format!(
                "Username '{}' is already registered",
                username
            )));
        }
        let account = Account {
            username: username.to_string(),
            display_name: display_name.to_string(),
            gender: gender.map(str::to_string),
            age,
            blood_type: blood_type.map(str::to_string),
        };
        inner.accounts.insert(
            username.to_string(),
            (account.clone(), password_hash.to_string()),
        );
        Ok(account)
    }

    async fn get_account(&self, username: &str) -> PortResult<Account> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(storage_offline());
        }
        let inner = self.inner.lock().unwrap();
        inner
            .accounts
            .get(username)
            .map(|(account, _)| account.clone())
            .ok_or_else(|| PortError::NotFound(format!("Account '{}' not found", username)))
    }

    async fn get_credentials(&self, username: &str) -> PortResult<AccountCredentials> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(storage_offline());
        }
        let inner = self.inner.lock().unwrap();
        inner
            .accounts
            .get(username)
            .map(|(account, hash)| AccountCredentials {
                username: account.username.clone(),
                password_hash: hash.clone(),
                display_name: account.display_name.clone(),
            })
            .ok_or(PortError::Unauthorized)
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        username: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.sessions.insert(
            session_id.to_string(),
            AuthSession {
                id: session_id.to_string(),
                username: username.to_string(),
                expires_at,
            },
        );
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AuthSession> {
        let mut inner = self.inner.lock().unwrap();
        let session = inner.sessions.get(session_id).cloned().ok_or(PortError::Unauthorized)?;
        if session.expires_at < Utc::now() {
            inner.sessions.remove(session_id);
            return Err(PortError::Unauthorized);
        }
        Ok(session)
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        self.inner.lock().unwrap().sessions.remove(session_id);
        Ok(())
    }

    async fn save_consultation(
        &self,
        username: &str,
        recorded_at: &str,
        question: &str,
        answer: &str,
        category: Option<&str>,
    ) -> PortResult<()> {
        if self.fail_log_writes.load(Ordering::SeqCst) {
            return Err(storage_offline());
        }
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.consultations.push(ConsultationRecord {
            id,
            username: username.to_string(),
            recorded_at: recorded_at.to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            category: category.map(str::to_string),
        });
        Ok(())
    }

    async fn consultations_by_owner(
        &self,
        username: &str,
    ) -> PortResult<Vec<ConsultationRecord>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .consultations
            .iter()
            .filter(|r| r.username == username)
            .rev()
            .cloned()
            .collect())
    }

    async fn save_mental_score(
        &self,
        username: &str,
        recorded_at: &str,
        score: i32,
        category: &str,
    ) -> PortResult<()> {
        if self.fail_log_writes.load(Ordering::SeqCst) {
            return Err(storage_offline());
        }
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        inner.mental_scores.push(MentalScoreRecord {
            id,
            username: username.to_string(),
            recorded_at: recorded_at.to_string(),
            score,
            category: category.to_string(),
        });
        Ok(())
    }

    async fn mental_scores_by_owner(
        &self,
        username: &str,
    ) -> PortResult<Vec<MentalScoreRecord>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .mental_scores
            .iter()
            .filter(|r| r.username == username)
            .rev()
            .cloned()
            .collect())
    }

    async fn add_medicine(
        &self,
        username: &str,
        name: &str,
        dosage: &str,
        time_of_day: &str,
    ) -> PortResult<MedicineEntry> {
        let mut inner = self.inner.lock().unwrap();
        let id = inner.next_id();
        let entry = MedicineEntry {
            id,
            username: username.to_string(),
            name: name.to_string(),
            dosage: dosage.to_string(),
            time_of_day: time_of_day.to_string(),
        };
        inner.medicines.push(entry.clone());
        Ok(entry)
    }

    async fn medicines_by_owner(&self, username: &str) -> PortResult<Vec<MedicineEntry>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .medicines
            .iter()
            .filter(|m| m.username == username)
            .rev()
            .cloned()
            .collect())
    }

    async fn delete_medicine(&self, username: &str, id: i64) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .medicines
            .retain(|m| !(m.id == id && m.username == username));
        Ok(())
    }
}

/// A `ConsultationService` that always answers with the same text.
pub struct CannedAdvisor(pub &'static str);

#[async_trait]
impl ConsultationService for CannedAdvisor {
    async fn advise(&self, _prompt: &ConsultationPrompt) -> PortResult<String> {
        Ok(self.0.to_string())
    }
}

/// Builds an `AppState` around the given doubles. The meal planner and the
/// document reader are the real keyless/offline adapters.
pub fn test_state(
    db: Arc<MemoryDb>,
    consult: Arc<dyn ConsultationService>,
) -> Arc<AppState> {
    let config = Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://localhost/unused".to_string(),
        log_level: tracing::Level::INFO,
        openai_api_key: None,
        consult_model: "test-model".to_string(),
        meal_model: "test-model".to_string(),
        ai_timeout_secs: 1,
        document_char_budget: 8000,
    };
    Arc::new(AppState {
        db,
        config: Arc::new(config),
        consult_adapter: consult,
        meal_adapter: Arc::new(DisabledAiAdapter),
        document_adapter: Arc::new(PdfTextAdapter::new(8000)),
        transcripts: Arc::new(Transcripts::new()),
    })
}

/// Registers an account directly through the port, bypassing password hashing.
pub async fn seed_account(state: &AppState, username: &str, display_name: &str) {
    state
        .db
        .create_account(username, "unused-hash", display_name, None, None, None)
        .await
        .unwrap();
}
