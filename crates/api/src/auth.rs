// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Authentication: accounts, login sessions and the current-user context.

use serde::Serialize;
use staffdesk_domain::RecordId;
use staffdesk_persistence::{
    Persistence, PersistenceError, SessionData, UserData, format_session_timestamp,
    parse_session_timestamp,
};
use time::{Duration, OffsetDateTime};
use tracing::{debug, info, warn};

use crate::error::ApiError;
use crate::password_policy::PasswordPolicy;
use crate::request_response::{CreateAccountRequest, LoginResponse};

/// The signed-in user on whose behalf a request runs.
///
/// Custom-database capability checks are made against `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUser {
    pub id: RecordId,
    pub email: String,
    pub full_name: String,
}

impl From<&UserData> for CurrentUser {
    fn from(user: &UserData) -> Self {
        Self {
            id: user.user_id,
            email: user.email.clone(),
            full_name: user.full_name.clone(),
        }
    }
}

/// Authentication service for login and session management.
pub struct AuthenticationService;

impl AuthenticationService {
    /// How long a session stays valid after login.
    pub const SESSION_DURATION: Duration = Duration::hours(8);

    /// Authenticates a user and opens a session.
    ///
    /// Unknown emails and wrong passwords produce the same error.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` if the credentials are wrong and
    /// `StoreUnavailable` if the session cannot be stored.
    pub fn login(
        persistence: &mut Persistence,
        email: &str,
        password: &str,
    ) -> Result<LoginResponse, ApiError> {
        let Some(user) = persistence.get_user_by_email(email)? else {
            warn!(email = %email, "Login attempt for unknown account");
            return Err(Self::invalid_credentials());
        };

        if !Persistence::verify_password(password, &user.password_hash)? {
            warn!(user_id = user.user_id, "Login attempt with wrong password");
            return Err(Self::invalid_credentials());
        }

        let session_token: String = Self::generate_session_token();
        let expires_at: String =
            format_session_timestamp(OffsetDateTime::now_utc() + Self::SESSION_DURATION)?;
        persistence.create_session(&session_token, user.user_id, &expires_at)?;

        info!(user_id = user.user_id, "User logged in");

        Ok(LoginResponse {
            session_token,
            expires_at,
            user: CurrentUser::from(&user),
        })
    }

    /// Resolves a session token to the signed-in user and records activity.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` if the token is unknown or expired.
    pub fn validate_session(
        persistence: &mut Persistence,
        session_token: &str,
    ) -> Result<CurrentUser, ApiError> {
        let session: SessionData = persistence
            .get_session_by_token(session_token)?
            .ok_or_else(|| ApiError::Unauthenticated {
                reason: String::from("Invalid session token"),
            })?;

        let expires_at: OffsetDateTime =
            parse_session_timestamp(&session.expires_at).map_err(|e| {
                ApiError::Unauthenticated {
                    reason: format!("Unreadable session expiry: {e}"),
                }
            })?;

        if OffsetDateTime::now_utc() > expires_at {
            debug!(session_id = session.session_id, "Rejected expired session");
            return Err(ApiError::Unauthenticated {
                reason: String::from("Session expired"),
            });
        }

        let user: UserData = persistence
            .get_user_by_id(session.user_id)?
            .ok_or_else(|| ApiError::Unauthenticated {
                reason: String::from("Session user no longer exists"),
            })?;

        persistence.update_session_activity(session.session_id)?;

        Ok(CurrentUser::from(&user))
    }

    /// Ends a session. Unknown tokens are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the session cannot be removed.
    pub fn logout(persistence: &mut Persistence, session_token: &str) -> Result<(), ApiError> {
        persistence.delete_session(session_token)?;
        info!("User logged out");
        Ok(())
    }

    /// Creates a dashboard account after checking the email and password.
    ///
    /// # Errors
    ///
    /// Returns `ValidationFailure` for a bad email, full name or password
    /// and `Conflict` if the email is already registered.
    pub fn create_account(
        persistence: &mut Persistence,
        request: &CreateAccountRequest,
        policy: &PasswordPolicy,
    ) -> Result<CurrentUser, ApiError> {
        let well_formed: bool = request
            .email
            .trim()
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
        if !well_formed {
            return Err(ApiError::ValidationFailure {
                message: format!("'{}' is not an email address", request.email),
            });
        }

        if request.full_name.trim().is_empty() {
            return Err(ApiError::ValidationFailure {
                message: String::from("Full name cannot be empty"),
            });
        }

        policy
            .validate(
                &request.password,
                &request.password_confirmation,
                &request.email,
                &request.full_name,
            )
            .map_err(|e| ApiError::ValidationFailure {
                message: e.to_string(),
            })?;

        let user_id: RecordId = persistence.create_user(
            &request.email,
            request.full_name.trim(),
            &request.password,
        )?;

        let user: UserData =
            persistence
                .get_user_by_id(user_id)?
                .ok_or_else(|| PersistenceError::NotFound(format!("user {user_id}")))?;

        info!(user_id, "Created account");

        Ok(CurrentUser::from(&user))
    }

    /// Creates the bootstrap administrator account unless the email is
    /// already registered.
    ///
    /// Returns `None` when the account already existed.
    ///
    /// # Errors
    ///
    /// Same as [`AuthenticationService::create_account`].
    pub fn ensure_account(
        persistence: &mut Persistence,
        email: &str,
        full_name: &str,
        password: &str,
        policy: &PasswordPolicy,
    ) -> Result<Option<CurrentUser>, ApiError> {
        if persistence.get_user_by_email(email)?.is_some() {
            debug!(email = %email, "Bootstrap account already present");
            return Ok(None);
        }

        let request: CreateAccountRequest = CreateAccountRequest {
            email: email.to_string(),
            full_name: full_name.to_string(),
            password: password.to_string(),
            password_confirmation: password.to_string(),
        };
        Self::create_account(persistence, &request, policy).map(Some)
    }

    /// Lists every account, for choosing database grantees.
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` if the accounts cannot be read.
    pub fn list_accounts(persistence: &mut Persistence) -> Result<Vec<CurrentUser>, ApiError> {
        Ok(persistence
            .list_users()?
            .iter()
            .map(CurrentUser::from)
            .collect())
    }

    fn invalid_credentials() -> ApiError {
        ApiError::Unauthenticated {
            reason: String::from("Invalid email or password"),
        }
    }

    fn generate_session_token() -> String {
        let timestamp: i128 = OffsetDateTime::now_utc().unix_timestamp_nanos();
        format!("session_{timestamp}_{}", rand::random::<u64>())
    }
}
