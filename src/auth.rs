use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    response::{IntoResponse, Json, Response},
};
use model::{entities::user, tokens};
use thiserror::Error;
use tracing::{debug, error, trace};

use crate::schemas::{AppState, ErrorResponse};

/// Reasons an authenticated endpoint rejects a request
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication credentials were not provided")]
    MissingCredentials,

    #[error("Invalid authorization header")]
    MalformedHeader,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Failed to resolve token: {0}")]
    Lookup(#[from] model::accounts::AccountError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, code) = match self {
            AuthError::Lookup(_) => (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE_ERROR"),
            _ => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
        };
        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
            success: false,
        };
        (status, Json(body)).into_response()
    }
}

/// The caller of an authenticated endpoint.
///
/// Extracted from `Authorization: Token <key>`; `Bearer <key>` is accepted as well.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl AuthUser {
    pub fn id(&self) -> i32 {
        self.0.id
    }
}

/// Splits the key out of an authorization header value.
pub fn parse_authorization(value: &str) -> Result<&str, AuthError> {
    let (scheme, key) = value.trim().split_once(' ').ok_or(AuthError::MalformedHeader)?;
    let key = key.trim();
    if !(scheme.eq_ignore_ascii_case("token") || scheme.eq_ignore_ascii_case("bearer"))
        || key.is_empty()
        || key.contains(' ')
    {
        return Err(AuthError::MalformedHeader);
    }
    Ok(key)
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        trace!("Authenticating request");
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::MissingCredentials)?
            .to_str()
            .map_err(|_| AuthError::MalformedHeader)?;
        let key = parse_authorization(header)?;
        let digest = tokens::hash_token(key);

        let user_id = match state.token_cache.get(&digest).await {
            Some(user_id) => user_id,
            None => {
                let user_id = tokens::find_user_id(&state.db, &digest)
                    .await
                    .map_err(|e| {
                        error!("Token lookup failed: {}", e);
                        AuthError::Lookup(e)
                    })?
                    .ok_or(AuthError::InvalidToken)?;
                state.token_cache.insert(digest, user_id).await;
                user_id
            }
        };

        // The user row is re-read so deactivation takes effect immediately.
        let user = tokens::load_active_user(&state.db, user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        debug!("Authenticated user {}", user.id);
        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_authorization_accepts_token_and_bearer() {
        assert_eq!(parse_authorization("Token abc123").unwrap(), "abc123");
        assert_eq!(parse_authorization("bearer abc123").unwrap(), "abc123");
    }

    #[test]
    fn test_parse_authorization_rejects_malformed_values() {
        for value in ["", "Token", "Token ", "Basic abc123", "Token abc 123", "abc123"] {
            assert!(
                matches!(parse_authorization(value), Err(AuthError::MalformedHeader)),
                "expected {:?} to be rejected",
                value
            );
        }
    }
}
