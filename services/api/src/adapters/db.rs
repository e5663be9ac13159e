//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.
//!
//! Queries use the runtime API (`query`/`query_as`) rather than the
//! compile-time checked macros so the crate builds without a live database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use health_advisor_core::domain::{
    Account, AccountCredentials, AuthSession, ConsultationRecord, MedicineEntry,
    MentalScoreRecord,
};
use health_advisor_core::ports::{DatabaseService, PortError, PortResult};
use sqlx::{FromRow, PgPool};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// One cheap round trip used at startup to surface a missing database
    /// as a warning instead of failing per-request later without context.
    pub async fn ping(&self) -> Result<(), sqlx::Error> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct AccountRecord {
    username: String,
    display_name: String,
    gender: Option<String>,
    age: Option<i32>,
    blood_type: Option<String>,
}
impl AccountRecord {
    fn to_domain(self) -> Account {
        Account {
            username: self.username,
            display_name: self.display_name,
            gender: self.gender,
            age: self.age,
            blood_type: self.blood_type,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    username: String,
    password_hash: String,
    display_name: String,
}
impl CredentialsRecord {
    fn to_domain(self) -> AccountCredentials {
        AccountCredentials {
            username: self.username,
            password_hash: self.password_hash,
            display_name: self.display_name,
        }
    }
}

#[derive(FromRow)]
struct AuthSessionRecord {
    id: String,
    username: String,
    expires_at: DateTime<Utc>,
}
impl AuthSessionRecord {
    fn to_domain(self) -> AuthSession {
        AuthSession {
            id: self.id,
            username: self.username,
            expires_at: self.expires_at,
        }
    }
}

#[derive(FromRow)]
struct ConsultationRow {
    id: i64,
    username: String,
    date: String,
    question: String,
    answer: String,
    category: Option<String>,
}
impl ConsultationRow {
    fn to_domain(self) -> ConsultationRecord {
        ConsultationRecord {
            id: self.id,
            username: self.username,
            recorded_at: self.date,
            question: self.question,
            answer: self.answer,
            category: self.category,
        }
    }
}

#[derive(FromRow)]
struct MentalScoreRow {
    id: i64,
    username: String,
    date: String,
    score: i32,
    category: String,
}
impl MentalScoreRow {
    fn to_domain(self) -> MentalScoreRecord {
        MentalScoreRecord {
            id: self.id,
            username: self.username,
            recorded_at: self.date,
            score: self.score,
            category: self.category,
        }
    }
}

#[derive(FromRow)]
struct MedicineRow {
    id: i64,
    username: String,
    name: String,
    dosage: String,
    time: String,
}
impl MedicineRow {
    fn to_domain(self) -> MedicineEntry {
        MedicineEntry {
            id: self.id,
            username: self.username,
            name: self.name,
            dosage: self.dosage,
            time_of_day: self.time,
        }
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_account(
        &self,
        username: &str,
        password_hash: &str,
        display_name: &str,
        gender: Option<&str>,
        age: Option<i32>,
        blood_type: Option<&str>,
    ) -> PortResult<Account> {
        // ON CONFLICT DO NOTHING keeps the original row intact; zero rows
        // affected means the username was already registered.
        let result = sqlx::query(
            "INSERT INTO users (username, password_hash, display_name, gender, age, blood_type) \
             VALUES ($1, $2, $3, $4, $5, $6) ON CONFLICT (username) DO NOTHING",
        )
        .bind(username)
        .bind(password_hash)
        .bind(display_name)
        .bind(gender)
        .bind(age)
        .bind(blood_type)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::Duplicate(format!(
                "Username '{}' is already registered",
                username
            )));
        }

        self.get_account(username).await
    }

    async fn get_account(&self, username: &str) -> PortResult<Account> {
        let record = sqlx::query_as::<_, AccountRecord>(
            "SELECT username, display_name, gender, age, blood_type FROM users \
             WHERE username = $1",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("Account '{}' not found", username))
            }
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn get_credentials(&self, username: &str) -> PortResult<AccountCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT username, password_hash, display_name FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::Unauthorized,
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn create_auth_session(
        &self,
        session_id: &str,
        username: &str,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query("INSERT INTO auth_sessions (id, username, expires_at) VALUES ($1, $2, $3)")
            .bind(session_id)
            .bind(username)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }

    async fn validate_auth_session(&self, session_id: &str) -> PortResult<AuthSession> {
        let record = sqlx::query_as::<_, AuthSessionRecord>(
            "SELECT id, username, expires_at FROM auth_sessions WHERE id = $1",
        )
        .bind(session_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::Unauthorized,
            _ => unexpected(e),
        })?;

        if record.expires_at < Utc::now() {
            // Expired sessions are removed on first sight.
            self.delete_auth_session(session_id).await?;
            return Err(PortError::Unauthorized);
        }

        Ok(record.to_domain())
    }

    async fn delete_auth_session(&self, session_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
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
        sqlx::query(
            "INSERT INTO consultations (username, date, question, answer, category) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(username)
        .bind(recorded_at)
        .bind(question)
        .bind(answer)
        .bind(category)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn consultations_by_owner(
        &self,
        username: &str,
    ) -> PortResult<Vec<ConsultationRecord>> {
        let records = sqlx::query_as::<_, ConsultationRow>(
            "SELECT id, username, date, question, answer, category FROM consultations \
             WHERE username = $1 ORDER BY id DESC",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn save_mental_score(
        &self,
        username: &str,
        recorded_at: &str,
        score: i32,
        category: &str,
    ) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO mental_logs (username, date, score, category) VALUES ($1, $2, $3, $4)",
        )
        .bind(username)
        .bind(recorded_at)
        .bind(score)
        .bind(category)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(())
    }

    async fn mental_scores_by_owner(
        &self,
        username: &str,
    ) -> PortResult<Vec<MentalScoreRecord>> {
        let records = sqlx::query_as::<_, MentalScoreRow>(
            "SELECT id, username, date, score, category FROM mental_logs \
             WHERE username = $1 ORDER BY id DESC",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn add_medicine(
        &self,
        username: &str,
        name: &str,
        dosage: &str,
        time_of_day: &str,
    ) -> PortResult<MedicineEntry> {
        let record = sqlx::query_as::<_, MedicineRow>(
            "INSERT INTO medicines (username, name, dosage, time) VALUES ($1, $2, $3, $4) \
             RETURNING id, username, name, dosage, time",
        )
        .bind(username)
        .bind(name)
        .bind(dosage)
        .bind(time_of_day)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn medicines_by_owner(&self, username: &str) -> PortResult<Vec<MedicineEntry>> {
        let records = sqlx::query_as::<_, MedicineRow>(
            "SELECT id, username, name, dosage, time FROM medicines \
             WHERE username = $1 ORDER BY id DESC",
        )
        .bind(username)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_medicine(&self, username: &str, id: i64) -> PortResult<()> {
        // Scoped to the owner; deleting a non-existent id is a no-op.
        sqlx::query("DELETE FROM medicines WHERE id = $1 AND username = $2")
            .bind(id)
            .bind(username)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(())
    }
}
