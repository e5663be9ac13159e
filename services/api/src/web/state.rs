//! services/api/src/web/state.rs
//!
//! Defines the application's shared state and the in-memory chat transcripts.

use std::collections::HashMap;
use std::sync::Mutex;

use crate::config::Config;
use health_advisor_core::domain::ChatMessage;
use health_advisor_core::ports::{
    ConsultationService, DatabaseService, DocumentTextService, MealPlanService,
};
use std::sync::Arc;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub config: Arc<Config>,
    pub consult_adapter: Arc<dyn ConsultationService>,
    pub meal_adapter: Arc<dyn MealPlanService>,
    pub document_adapter: Arc<dyn DocumentTextService>,
    pub transcripts: Arc<Transcripts>,
}

//=========================================================================================
// Transcripts (Volatile Chat History)
//=========================================================================================

/// The running chat transcript for each live auth session. Process-memory
/// only: it is never persisted, and it disappears at logout or restart.
#[derive(Default)]
pub struct Transcripts {
    inner: Mutex<HashMap<String, Vec<ChatMessage>>>,
}

impl Transcripts {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the transcript for one session, oldest message first.
    pub fn snapshot(&self, session_id: &str) -> Vec<ChatMessage> {
        self.inner
            .lock()
            .expect("transcript lock poisoned")
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Appends one completed question/answer exchange.
    pub fn push_exchange(&self, session_id: &str, question: &str, answer: &str) {
        let mut inner = self.inner.lock().expect("transcript lock poisoned");
        let transcript = inner.entry(session_id.to_string()).or_default();
        transcript.push(ChatMessage::user(question));
        transcript.push(ChatMessage::assistant(answer));
    }

    /// Drops the transcript for a session. Called at logout.
    pub fn clear(&self, session_id: &str) {
        self.inner
            .lock()
            .expect("transcript lock poisoned")
            .remove(session_id);
    }
}
