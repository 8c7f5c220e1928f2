//! Session lifecycle: login, refresh token rotation, logout.

use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use tollgate_core::config::auth::AuthConfig;
use tollgate_core::error::AppError;
use tollgate_core::result::AppResult;
use tollgate_database::stores::{SessionStore, UserStore};
use tollgate_entity::session::{Session, UpsertSession};
use tollgate_entity::user::User;

use crate::credentials::{PasswordHasher, generate_refresh_token, sha256_hex};
use crate::jwt::{IssuedToken, TokenSigner};

/// Result of a successful login or refresh.
#[derive(Debug, Clone)]
pub struct LoginResult {
    /// Signed session JWT bound to the requested service audience.
    pub access: IssuedToken,
    /// Opaque one-time refresh token. Only its digest is persisted.
    pub refresh_token: String,
    /// The live session row.
    pub session: Session,
}

/// Manages per-(user, tenant, service) sessions with rotating refresh
/// tokens, layered on the token subsystem.
#[derive(Clone)]
pub struct SessionService {
    users: Arc<dyn UserStore>,
    sessions: Arc<dyn SessionStore>,
    hasher: Arc<PasswordHasher>,
    signer: Arc<TokenSigner>,
    config: AuthConfig,
}

impl std::fmt::Debug for SessionService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionService").finish()
    }
}

impl SessionService {
    /// Create a new session service.
    pub fn new(
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        hasher: Arc<PasswordHasher>,
        signer: Arc<TokenSigner>,
        config: AuthConfig,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
            signer,
            config,
        }
    }

    /// Perform the complete login flow.
    ///
    /// The same generic error covers unknown email, wrong password, and
    /// locked accounts, and unknown accounts still burn a dummy hash
    /// comparison, so the timing and the message never confirm whether an
    /// account exists or is locked.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        tenant_id: Option<Uuid>,
        service: &str,
    ) -> AppResult<LoginResult> {
        let user = match self.users.find_by_email(email).await? {
            Some(user) => user,
            None => {
                self.burn_dummy_verification(password).await;
                return Err(invalid_credentials());
            }
        };

        // Lockout is enforced before the password is even checked.
        if user.is_locked() {
            self.burn_dummy_verification(password).await;
            return Err(invalid_credentials());
        }

        let Some(stored_hash) = user.password_hash.clone() else {
            // External-identity account with no password.
            self.burn_dummy_verification(password).await;
            return Err(invalid_credentials());
        };

        let password_valid = self.verify_password(password, stored_hash).await?;

        if !password_valid {
            self.handle_failed_login(&user).await?;
            return Err(invalid_credentials());
        }

        if user.failed_login_attempts > 0 {
            self.users.reset_login_failures(user.id).await?;
        }
        let _ = self.users.touch_last_login(user.id, Utc::now()).await;

        let result = self.open_session(user.id, tenant_id, service).await?;

        info!(
            user_id = %user.id,
            session_id = %result.session.id,
            service = %service,
            "Login successful"
        );

        Ok(result)
    }

    /// Rotate a refresh token and issue a new access token.
    ///
    /// Refresh tokens are one-time-use: every successful refresh replaces
    /// the stored digest. A mismatched service audience is rejected, and
    /// an expired session is revoked on this first touch.
    pub async fn refresh(&self, refresh_token: &str, service: &str) -> AppResult<LoginResult> {
        let hash = sha256_hex(refresh_token);

        let session = self
            .sessions
            .find_by_refresh_hash(&hash)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid refresh token"))?;

        if session.is_expired() {
            // Lazy revocation: no background sweep is needed for correctness.
            self.sessions.revoke(session.id).await?;
            return Err(AppError::authentication("Session has expired"));
        }

        if session.service != service {
            return Err(AppError::authentication("Refresh audience mismatch"));
        }

        let new_refresh = generate_refresh_token();
        self.sessions
            .rotate_refresh_hash(session.id, &sha256_hex(&new_refresh))
            .await?;

        let access = self.signer.issue_session_token(
            session.user_id,
            session.tenant_id,
            session.id,
            &session.service,
        )?;

        info!(
            user_id = %session.user_id,
            session_id = %session.id,
            "Session refreshed"
        );

        Ok(LoginResult {
            access,
            refresh_token: new_refresh,
            session,
        })
    }

    /// Revoke a session (logout).
    pub async fn logout(&self, session_id: Uuid) -> AppResult<()> {
        self.sessions.revoke(session_id).await?;
        info!(session_id = %session_id, "Session revoked");
        Ok(())
    }

    /// Revoke every live session of a user (admin tooling).
    pub async fn revoke_all_for_user(&self, user_id: Uuid) -> AppResult<u64> {
        let revoked = self.sessions.revoke_all_for_user(user_id).await?;
        info!(user_id = %user_id, revoked, "All user sessions revoked");
        Ok(revoked)
    }

    /// Validate that a session referenced by a verified token is still
    /// live, revoking it lazily if it expired.
    pub async fn validate_session(&self, session_id: Uuid) -> AppResult<Session> {
        let session = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or_else(|| AppError::authentication("Session not found"))?;

        if session.revoked_at.is_some() {
            return Err(AppError::authentication("Session has been revoked"));
        }

        if session.is_expired() {
            self.sessions.revoke(session.id).await?;
            return Err(AppError::authentication("Session has expired"));
        }

        Ok(session)
    }

    /// Upsert the session row for (user, tenant, service) and issue tokens.
    ///
    /// A second login for the same triple replaces the existing refresh
    /// token, implicitly invalidating the previous one.
    async fn open_session(
        &self,
        user_id: Uuid,
        tenant_id: Option<Uuid>,
        service: &str,
    ) -> AppResult<LoginResult> {
        let refresh_token = generate_refresh_token();
        let expires_at = Utc::now() + chrono::Duration::hours(self.config.session_ttl_hours as i64);

        let session = self
            .sessions
            .upsert(&UpsertSession {
                user_id,
                tenant_id,
                service: service.to_string(),
                refresh_token_hash: sha256_hex(&refresh_token),
                expires_at,
            })
            .await?;

        let access = self
            .signer
            .issue_session_token(user_id, tenant_id, session.id, service)?;

        Ok(LoginResult {
            access,
            refresh_token,
            session,
        })
    }

    /// Increment the failed-login counter, locking the account once the
    /// threshold is reached.
    async fn handle_failed_login(&self, user: &User) -> AppResult<()> {
        let attempts = user.failed_login_attempts + 1;

        if attempts >= self.config.max_failed_attempts {
            let locked_until =
                Utc::now() + chrono::Duration::minutes(self.config.lockout_duration_minutes as i64);

            self.users
                .record_login_failure(user.id, attempts, Some(locked_until))
                .await?;

            warn!(
                user_id = %user.id,
                attempts,
                locked_until = %locked_until,
                "Account locked after repeated failed logins"
            );
        } else {
            self.users
                .record_login_failure(user.id, attempts, None)
                .await?;
        }

        Ok(())
    }

    /// PBKDF2 verification on the blocking pool; it is CPU-bound and must
    /// not stall the async executor.
    async fn verify_password(&self, password: &str, stored_hash: String) -> AppResult<bool> {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &stored_hash))
            .await
            .map_err(|e| AppError::internal(format!("Verification task failed: {e}")))?
    }

    /// Same work as a real verification, against the dummy hash.
    async fn burn_dummy_verification(&self, password: &str) {
        let hasher = self.hasher.clone();
        let password = password.to_string();
        let _ = tokio::task::spawn_blocking(move || hasher.verify_dummy(&password)).await;
    }
}

fn invalid_credentials() -> AppError {
    AppError::authentication("Invalid email or password")
}
