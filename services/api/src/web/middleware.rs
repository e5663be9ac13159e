//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::error;

use crate::web::state::AppState;
use health_advisor_core::ports::PortError;

/// The authenticated caller, inserted into request extensions by `require_auth`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub session_id: String,
    pub username: String,
}

/// Pulls the `session` cookie value out of a Cookie header.
pub fn session_id_from_cookies(cookie_header: &str) -> Option<&str> {
    cookie_header
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
}

/// Resolves the caller from the `session` cookie.
///
/// A cookie that no longer maps to a live session also drops that session's
/// leftover transcript: no logout will ever arrive for it, so this is the
/// last place it can be reclaimed.
pub(crate) async fn authenticate(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<AuthUser, StatusCode> {
    let cookie_header = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let auth_session_id = session_id_from_cookies(cookie_header)
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_string();

    match state.db.validate_auth_session(&auth_session_id).await {
        Ok(session) => Ok(AuthUser {
            session_id: session.id,
            username: session.username,
        }),
        Err(PortError::Unauthorized) => {
            state.transcripts.clear(&auth_session_id);
            Err(StatusCode::UNAUTHORIZED)
        }
        Err(e) => {
            error!("Failed to validate auth session: {:?}", e);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Middleware that validates the auth session cookie and extracts the username.
///
/// If valid, inserts an `AuthUser` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let user = authenticate(&state, req.headers()).await?;
    req.extensions_mut().insert(user);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::test_support::{seed_account, test_state, CannedAdvisor, MemoryDb};
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn cookie_headers(session_id: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            format!("session={}", session_id).parse().unwrap(),
        );
        headers
    }

    #[test]
    fn finds_session_cookie_among_others() {
        let header = "theme=dark; session=abc-123; lang=en";
        assert_eq!(session_id_from_cookies(header), Some("abc-123"));
    }

    #[test]
    fn missing_session_cookie_is_none() {
        assert_eq!(session_id_from_cookies("theme=dark; lang=en"), None);
        assert_eq!(session_id_from_cookies(""), None);
    }

    #[tokio::test]
    async fn live_session_resolves_the_owner() {
        let db = Arc::new(MemoryDb::default());
        let state = test_state(db, Arc::new(CannedAdvisor("ok")));
        seed_account(&state, "ana", "Ana").await;
        state
            .db
            .create_auth_session("s1", "ana", Utc::now() + Duration::days(1))
            .await
            .unwrap();

        let user = authenticate(&state, &cookie_headers("s1")).await.unwrap();
        assert_eq!(user.session_id, "s1");
        assert_eq!(user.username, "ana");
    }

    #[tokio::test]
    async fn unknown_session_cookie_drops_its_transcript() {
        let db = Arc::new(MemoryDb::default());
        let state = test_state(db, Arc::new(CannedAdvisor("ok")));
        state.transcripts.push_exchange("dead-session", "q", "a");

        let err = authenticate(&state, &cookie_headers("dead-session"))
            .await
            .err()
            .unwrap();
        assert_eq!(err, StatusCode::UNAUTHORIZED);
        assert!(state.transcripts.snapshot("dead-session").is_empty());
    }

    #[tokio::test]
    async fn expired_session_is_rejected_and_its_transcript_dropped() {
        let db = Arc::new(MemoryDb::default());
        let state = test_state(db, Arc::new(CannedAdvisor("ok")));
        seed_account(&state, "ana", "Ana").await;
        state
            .db
            .create_auth_session("s1", "ana", Utc::now() - Duration::hours(1))
            .await
            .unwrap();
        state.transcripts.push_exchange("s1", "q", "a");

        let err = authenticate(&state, &cookie_headers("s1")).await.err().unwrap();
        assert_eq!(err, StatusCode::UNAUTHORIZED);
        assert!(state.transcripts.snapshot("s1").is_empty());
    }
}
