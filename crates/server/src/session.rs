// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Session extraction for the server.
//!
//! Every route except login runs on behalf of a signed-in user. The
//! extractors here read the `Authorization: Bearer <token>` header and
//! resolve it to the current user before the handler runs.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use staffdesk_api::{AuthenticationService, CurrentUser};
use tracing::{debug, warn};

use crate::{AppState, HttpError};

/// The raw session token from the `Authorization` header.
///
/// Used on its own by logout, which must not fail for an expired session.
pub struct BearerToken(pub String);

impl<S: Send + Sync> FromRequestParts<S> for BearerToken {
    type Rejection = SessionError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header: &str = parts
            .headers
            .get("Authorization")
            .ok_or_else(|| {
                debug!("Missing Authorization header");
                SessionError::MissingAuthorizationHeader
            })?
            .to_str()
            .map_err(|_| {
                warn!("Invalid Authorization header encoding");
                SessionError::InvalidAuthorizationHeader
            })?;

        let token: &str = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            warn!("Authorization header does not start with 'Bearer '");
            SessionError::InvalidAuthorizationHeader
        })?;

        Ok(Self(token.trim().to_string()))
    }
}

/// Extractor for the signed-in user.
///
/// ```ignore
/// async fn my_handler(SessionUser(user): SessionUser) -> Json<CurrentUser> {
///     Json(user)
/// }
/// ```
///
/// Rejects with 401 when the header is missing or malformed, or when the
/// session is unknown or expired.
pub struct SessionUser(pub CurrentUser);

impl FromRequestParts<AppState> for SessionUser {
    type Rejection = SessionError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let BearerToken(token) = BearerToken::from_request_parts(parts, state).await?;

        let mut persistence = state.persistence.lock().await;
        let user: CurrentUser = AuthenticationService::validate_session(&mut persistence, &token)
            .map_err(|e| {
                warn!(error = %e, "Session validation failed");
                SessionError::InvalidSession(e.to_string())
            })?;
        drop(persistence);

        debug!(user_id = user.id, "Session validated");

        Ok(Self(user))
    }
}

/// Session extraction errors, all answered with 401.
#[derive(Debug)]
pub enum SessionError {
    MissingAuthorizationHeader,
    InvalidAuthorizationHeader,
    InvalidSession(String),
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        let message: String = match self {
            Self::MissingAuthorizationHeader => String::from("Missing Authorization header"),
            Self::InvalidAuthorizationHeader => String::from(
                "Invalid Authorization header format. Expected: 'Bearer <token>'",
            ),
            Self::InvalidSession(reason) => format!("Session validation failed: {reason}"),
        };

        HttpError {
            status: StatusCode::UNAUTHORIZED,
            message,
            cascade: None,
        }
        .into_response()
    }
}
