//! Email/password accounts against the GoTrue endpoint
//!
//! A signed-in [`Session`] is pushed into the shared [`SupabaseClient`] so
//! later data calls carry the user's token. [`SessionStore`] keeps the
//! session on disk between runs.

use crate::client::{SupabaseClient, NO_QUERY};
use crate::error::ApiError;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use smokespot_core::{ErrorCode, UserId};
use std::fs;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Tokens this close to expiry are treated as expired
const EXPIRY_MARGIN_SECS: i64 = 30;

/// GoTrue's message for a wrong email/password pair
const INVALID_LOGIN_MESSAGE: &str = "invalid login credentials";

/// Authentication failures
#[derive(Error, Debug)]
pub enum AuthError {
    /// Email or password left blank
    #[error("{0} is required")]
    MissingField(&'static str),

    /// GoTrue rejected the email/password pair
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The stored session can no longer be refreshed
    #[error("session expired, sign in again")]
    SessionExpired,

    /// Any other API failure
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Reading or writing the session file failed
    #[error("session file error: {0}")]
    Io(#[from] std::io::Error),

    /// The session file is not valid JSON
    #[error("corrupt session file: {0}")]
    Json(#[from] serde_json::Error),

    /// No per-user configuration directory on this platform
    #[error("could not determine a configuration directory")]
    NoConfigDir,
}

impl AuthError {
    /// Map to the shared error code table
    #[must_use]
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::MissingField(_) => ErrorCode::MissingField,
            Self::InvalidCredentials => ErrorCode::InvalidCredentials,
            Self::SessionExpired => ErrorCode::SessionExpired,
            Self::Api(e) => match e.code() {
                ErrorCode::DataApiError => ErrorCode::AuthError,
                other => other,
            },
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) | Self::NoConfigDir => ErrorCode::ConfigError,
        }
    }
}

/// Result type alias for auth operations
pub type AuthResult<T> = Result<T, AuthError>;

/// The account behind a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// Identifier stored as `created_by` / `uploaded_by`
    pub id: UserId,
    /// Account email
    #[serde(default)]
    pub email: Option<String>,
}

/// A signed-in user's tokens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// JWT sent as the bearer token
    pub access_token: String,
    /// Token exchanged for a new session on expiry
    pub refresh_token: String,
    /// When `access_token` stops being accepted
    pub expires_at: DateTime<Utc>,
    /// The signed-in account
    pub user: AuthUser,
}

impl Session {
    /// Whether the access token is expired at `now`
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.expires_at
    }

    /// Whether the access token is expired now
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// The signed-in user's id
    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user.id
    }
}

/// Token grant as returned by `/token` and `/signup`
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    expires_in: i64,
    #[serde(default)]
    expires_at: Option<i64>,
    user: AuthUser,
}

impl TokenResponse {
    fn into_session(self, now: DateTime<Utc>) -> AuthResult<Session> {
        let expires_at = match self.expires_at.and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)) {
            Some(at) => at,
            None => Duration::try_seconds(self.expires_in)
                .and_then(|lifetime| now.checked_add_signed(lifetime))
                .ok_or_else(|| {
                    ApiError::invalid_response(format!("token lifetime out of range: {}s", self.expires_in))
                })?,
        };

        Ok(Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            user: self.user,
        })
    }
}

/// `/signup` answers with a token grant, or with the bare user when the
/// project requires email confirmation.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SignUpResponse {
    Session(TokenResponse),
    User(AuthUser),
}

/// Result of [`AuthService::sign_up`]
#[derive(Debug, Clone, PartialEq)]
pub enum SignUpOutcome {
    /// The account is active and signed in
    SignedIn(Session),
    /// A confirmation email was sent; sign in after confirming
    ConfirmationRequired(AuthUser),
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// A 400 from `/token` is a bad password only when GoTrue says so; other
/// rejections such as an unconfirmed email keep the server's message.
fn sign_in_error(error: ApiError) -> AuthError {
    match &error {
        ApiError::ApiResponse { status: 400, message }
            if message.to_lowercase().contains(INVALID_LOGIN_MESSAGE) =>
        {
            AuthError::InvalidCredentials
        }
        _ => AuthError::Api(error),
    }
}

fn check_credentials<'a>(email: &'a str, password: &'a str) -> AuthResult<Credentials<'a>> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AuthError::MissingField("email"));
    }
    if password.is_empty() {
        return Err(AuthError::MissingField("password"));
    }
    Ok(Credentials { email, password })
}

/// Sign-in, sign-up and session refresh
#[derive(Clone)]
pub struct AuthService {
    client: SupabaseClient,
}

impl AuthService {
    /// Authenticate requests made through `client` (and its clones)
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }

    /// Make `session` the identity of subsequent requests
    pub fn activate(&self, session: &Session) {
        self.client.set_access_token(Some(session.access_token.clone()));
    }

    /// Sign in with email and password
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let credentials = check_credentials(email, password)?;

        let response: TokenResponse = self
            .client
            .post(
                &self.client.auth_endpoint("token"),
                &[("grant_type", "password")],
                &credentials,
                None,
            )
            .await
            .map_err(sign_in_error)?;

        let session = response.into_session(Utc::now())?;
        self.activate(&session);
        info!(user_id = %session.user.id, "Signed in");
        Ok(session)
    }

    /// Create an account
    #[instrument(skip(self, password))]
    pub async fn sign_up(&self, email: &str, password: &str) -> AuthResult<SignUpOutcome> {
        let credentials = check_credentials(email, password)?;

        let response: SignUpResponse = self
            .client
            .post(&self.client.auth_endpoint("signup"), NO_QUERY, &credentials, None)
            .await?;

        Ok(match response {
            SignUpResponse::Session(tokens) => {
                let session = tokens.into_session(Utc::now())?;
                self.activate(&session);
                info!(user_id = %session.user.id, "Signed up");
                SignUpOutcome::SignedIn(session)
            }
            SignUpResponse::User(user) => {
                info!(user_id = %user.id, "Signed up, awaiting email confirmation");
                SignUpOutcome::ConfirmationRequired(user)
            }
        })
    }

    /// Exchange the refresh token for a new session
    #[instrument(skip(self, session), fields(user_id = %session.user.id))]
    pub async fn refresh(&self, session: &Session) -> AuthResult<Session> {
        let response: TokenResponse = self
            .client
            .post(
                &self.client.auth_endpoint("token"),
                &[("grant_type", "refresh_token")],
                &RefreshRequest {
                    refresh_token: &session.refresh_token,
                },
                None,
            )
            .await
            .map_err(|e| {
                if e.is_client_error() {
                    AuthError::SessionExpired
                } else {
                    AuthError::Api(e)
                }
            })?;

        let refreshed = response.into_session(Utc::now())?;
        self.activate(&refreshed);
        debug!(expires_at = %refreshed.expires_at, "Session refreshed");
        Ok(refreshed)
    }

    /// Revoke the active session and return to anonymous access.
    ///
    /// The local token is dropped even when the server call fails.
    #[instrument(skip(self))]
    pub async fn sign_out(&self) -> AuthResult<()> {
        if !self.client.is_authenticated() {
            return Ok(());
        }

        let result = self
            .client
            .post_no_content(&self.client.auth_endpoint("logout"))
            .await;
        self.client.set_access_token(None);
        result?;
        info!("Signed out");
        Ok(())
    }

    /// Load the stored session, refreshing it once if it has expired.
    ///
    /// A session that cannot be refreshed is removed from the store and
    /// `None` is returned. Network failures are propagated and leave the
    /// store untouched.
    pub async fn restore(&self, store: &SessionStore) -> AuthResult<Option<Session>> {
        let Some(session) = store.load()? else {
            return Ok(None);
        };

        if !session.is_expired() {
            self.activate(&session);
            return Ok(Some(session));
        }

        match self.refresh(&session).await {
            Ok(refreshed) => {
                store.save(&refreshed)?;
                Ok(Some(refreshed))
            }
            Err(AuthError::SessionExpired) => {
                warn!(user_id = %session.user.id, "Stored session expired");
                store.clear()?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// JSON file holding the persisted session
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    /// Store at an explicit path
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config_dir>/smokespot/session.json`
    pub fn default_location() -> AuthResult<Self> {
        let dir = dirs::config_dir().ok_or(AuthError::NoConfigDir)?;
        Ok(Self::new(dir.join("smokespot").join("session.json")))
    }

    /// The stored session, if any
    pub fn load(&self) -> AuthResult<Option<Session>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(Some(serde_json::from_str(&content)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist `session`, replacing any previous one.
    ///
    /// On unix the file is readable by its owner only.
    pub fn save(&self, session: &Session) -> AuthResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(session)?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        // A file left by an older version keeps its mode on open
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(content.as_bytes())?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    /// Remove the stored session; a missing file is not an error
    pub fn clear(&self) -> AuthResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
