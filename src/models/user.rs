// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account and session models.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// User profile as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: String,
    pub created_at: String,
    #[serde(default)]
    pub last_login_at: Option<String>,
}

/// Successful login payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub user: UserProfile,
}

/// Token refresh payload (no refresh token rotation, no user).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Authenticated session, persisted as JSON under the auth storage key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: UserProfile,
    /// When the access token was issued (Unix epoch milliseconds)
    pub issued_at: i64,
}

impl Session {
    /// Build a session from a login response issued at `issued_at` (epoch ms).
    pub fn from_auth(auth: AuthResponse, issued_at: i64) -> Self {
        Self {
            access_token: auth.access_token,
            refresh_token: auth.refresh_token,
            token_type: auth.token_type,
            expires_in: auth.expires_in,
            user: auth.user,
            issued_at,
        }
    }

    /// Instant at which the access token stops being valid.
    pub fn expires_at(&self) -> DateTime<Utc> {
        let expires_ms = self.issued_at + self.expires_in * 1000;
        DateTime::from_timestamp_millis(expires_ms).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// True when `now + buffer` has reached the expiry instant.
    pub fn is_expired(&self, now: DateTime<Utc>, buffer_secs: i64) -> bool {
        now + Duration::seconds(buffer_secs) >= self.expires_at()
    }

    /// Replace the access token after an explicit refresh.
    pub fn apply_refresh(&mut self, tokens: TokenResponse, issued_at: i64) {
        self.access_token = tokens.access_token;
        self.token_type = tokens.token_type;
        self.expires_in = tokens.expires_in;
        self.issued_at = issued_at;
    }

    /// A persisted session is only usable with a token and a user id.
    pub fn is_usable(&self) -> bool {
        !self.access_token.is_empty() && !self.user.id.is_empty()
    }
}
