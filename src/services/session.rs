// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Session management: login, signup, sign-out and the auth guard.
//!
//! The session lives in a [`SessionStore`]: the persisted copy is read once
//! when the store is opened, after which the in-memory copy is
//! authoritative. Saves and clears write through to storage. Expiry is
//! exposed but never acted on automatically; an expired token surfaces as a
//! 401 on the next authenticated call.

use crate::error::{ClientError, FieldErrors, Result};
use crate::models::{Session, UserProfile};
use crate::services::api::{ApiClient, LogInRequest, SignUpRequest};
use crate::storage::Storage;
use crate::time_utils::now_ms;
use chrono::{DateTime, Utc};
use regex::Regex;
use std::borrow::Cow;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};
use validator::{Validate, ValidationError, ValidationErrors};

/// Default expiry buffer in seconds.
pub const EXPIRY_BUFFER_SECS: i64 = 30;

/// Symbols a password may (and must at least once) contain.
pub const PASSWORD_SYMBOLS: &str = "@$!%*?&";

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\S+@\S+\.\S+$").expect("email pattern compiles"));

/// Receives requests to show the login screen.
pub trait AuthPrompt: Send + Sync {
    fn request_login(&self, message: &str);
}

/// Prompt that only logs; for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPrompt;

impl AuthPrompt for LogPrompt {
    fn request_login(&self, message: &str) {
        tracing::info!(message, "Login required");
    }
}

/// Result of a successful signup: the account exists but must be verified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignupOutcome {
    VerificationSent { email: String },
}

// ─────────────────────────────────────────────────────────────────────────────
// SessionStore
// ─────────────────────────────────────────────────────────────────────────────

/// Cached session with write-through persistence.
pub struct SessionStore {
    cache: RwLock<Option<Session>>,
    storage: Storage,
}

impl SessionStore {
    /// Open the store, reading any persisted session exactly once.
    pub fn open(storage: Storage) -> Self {
        let cached = storage.load_session();
        if let Some(session) = &cached {
            tracing::debug!(user_id = %session.user.id, "Restored persisted session");
        }
        Self {
            cache: RwLock::new(cached),
            storage,
        }
    }

    pub fn current(&self) -> Option<Session> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.access_token.clone())
    }

    pub fn is_present(&self) -> bool {
        self.cache
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Cache and persist. The cache is updated even if the write fails.
    pub fn save(&self, session: Session) -> Result<()> {
        let persisted = self.storage.save_session(&session);
        *self.cache.write().unwrap_or_else(PoisonError::into_inner) = Some(session);
        persisted.map_err(ClientError::from)
    }

    pub fn clear(&self) {
        self.cache
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Err(e) = self.storage.clear_session() {
            tracing::warn!(error = %e, "Failed to remove persisted session");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Validation
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Validate)]
struct LoginForm {
    #[validate(length(min = 1, message = "이메일을 입력해 주세요."))]
    email: String,
    #[validate(length(min = 1, message = "비밀번호를 입력해 주세요."))]
    password: String,
}

#[derive(Debug, Validate)]
struct SignupForm {
    #[validate(length(min = 2, max = 100, message = "이름은 2자 이상 100자 이하로 입력해 주세요."))]
    name: String,
    #[validate(regex(path = *EMAIL_PATTERN, message = "올바른 이메일을 입력해 주세요."))]
    email: String,
    #[validate(
        length(min = 8, message = "비밀번호는 8자 이상이어야 합니다."),
        custom(function = "validate_password_strength")
    )]
    password: String,
}

impl SignupForm {
    fn check(&self) -> std::result::Result<(), FieldErrors> {
        let mut fields = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(errors) => field_messages(&errors),
        };

        // Empty input gets a "required" message instead of a format message.
        let required = [
            ("name", self.name.is_empty(), "이름을 입력해 주세요."),
            ("email", self.email.is_empty(), "이메일을 입력해 주세요."),
            ("password", self.password.is_empty(), "비밀번호를 입력해 주세요."),
        ];
        for (field, empty, message) in required {
            if empty {
                fields.insert(field.to_string(), message.to_string());
            }
        }

        if fields.is_empty() {
            Ok(())
        } else {
            Err(fields)
        }
    }
}

/// Password must use only letters, digits and [`PASSWORD_SYMBOLS`], with at
/// least one lowercase, uppercase, digit and symbol.
fn validate_password_strength(password: &str) -> std::result::Result<(), ValidationError> {
    let allowed = password
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || PASSWORD_SYMBOLS.contains(c));
    let strong = password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| PASSWORD_SYMBOLS.contains(c));

    if allowed && strong {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength").with_message(Cow::Borrowed(
            "비밀번호는 대문자/소문자/숫자/특수문자를 포함해야 합니다.",
        )))
    }
}

/// First message per field.
fn field_messages(errors: &ValidationErrors) -> FieldErrors {
    errors
        .field_errors()
        .iter()
        .filter_map(|(field, errs)| {
            errs.first().map(|e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                (field.to_string(), message)
            })
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// SessionManager
// ─────────────────────────────────────────────────────────────────────────────

/// Owns the authentication state and the login prompt.
pub struct SessionManager {
    api: ApiClient,
    store: SessionStore,
    prompt: Arc<dyn AuthPrompt>,
}

impl SessionManager {
    /// Create the manager, restoring any persisted session.
    pub fn new(api: ApiClient, storage: Storage, prompt: Arc<dyn AuthPrompt>) -> Self {
        Self {
            api,
            store: SessionStore::open(storage),
            prompt,
        }
    }

    /// Log in and cache the session.
    ///
    /// Server-side field errors (e.g. `{"email": "..."}`) are carried in the
    /// returned [`ClientError::Api`].
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let form = LoginForm {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        form.validate()
            .map_err(|e| ClientError::Validation(field_messages(&e)))?;

        let auth = self
            .api
            .log_in(&LogInRequest {
                email: form.email,
                password: form.password,
            })
            .await?;

        let session = Session::from_auth(auth, now_ms());
        if let Err(e) = self.store.save(session.clone()) {
            tracing::warn!(error = %e, "Session cached but not persisted");
        }

        tracing::info!(user_id = %session.user.id, "Logged in");
        Ok(session)
    }

    /// Register an account. Does not log in; the caller shows the
    /// "verification email sent" state.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<SignupOutcome> {
        let form = SignupForm {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        form.check().map_err(ClientError::Validation)?;

        let user = self
            .api
            .sign_up(&SignUpRequest {
                email: form.email.clone(),
                password: form.password,
                name: form.name,
            })
            .await?;

        tracing::info!(user_id = %user.id, "Signed up, verification pending");
        Ok(SignupOutcome::VerificationSent { email: form.email })
    }

    pub fn is_authenticated(&self) -> bool {
        self.store.is_present()
    }

    /// Guard for features that need an account: on failure the login prompt
    /// is raised with `message` and `false` is returned.
    pub fn require_authenticated(&self, message: &str) -> bool {
        if self.is_authenticated() {
            return true;
        }
        self.prompt.request_login(message);
        false
    }

    /// Raise the login prompt (e.g. after a 401).
    pub fn prompt_login(&self, message: &str) {
        self.prompt.request_login(message);
    }

    pub fn current(&self) -> Option<Session> {
        self.store.current()
    }

    pub fn access_token(&self) -> Option<String> {
        self.store.access_token()
    }

    /// Whether the cached session is expired at `now` (with the default buffer).
    /// No session counts as expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.store
            .current()
            .map_or(true, |s| s.is_expired(now, EXPIRY_BUFFER_SECS))
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// Only ever called explicitly.
    pub async fn refresh(&self) -> Result<Session> {
        let mut session = self
            .store
            .current()
            .ok_or_else(|| ClientError::AuthRequired("no session to refresh".to_string()))?;

        let tokens = self.api.refresh_token(&session.refresh_token).await?;
        session.apply_refresh(tokens, now_ms());
        self.store.save(session.clone())?;

        tracing::info!(user_id = %session.user.id, "Access token refreshed");
        Ok(session)
    }

    /// Fetch the profile of the logged-in user.
    pub async fn current_user(&self) -> Result<UserProfile> {
        let token = self
            .access_token()
            .ok_or_else(|| ClientError::AuthRequired("not logged in".to_string()))?;
        self.api.current_user(&token).await
    }

    /// Clear the cached and persisted session, then revoke the refresh
    /// token server-side on a best-effort basis.
    pub async fn sign_out(&self) {
        let previous = self.store.current();
        self.store.clear();

        let Some(session) = previous else {
            return;
        };
        if let Err(e) = self.api.log_out(&session.refresh_token).await {
            tracing::warn!(error = %e, "Server logout failed, local session cleared anyway");
        }
        tracing::info!(user_id = %session.user.id, "Signed out");
    }
}
