// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Verification email resend with a per-address cooldown.
//!
//! The time of the last send is persisted as epoch milliseconds under
//! `email_resend_{email}`, so the cooldown survives restarts.

use crate::error::ClientError;
use crate::services::api::ApiClient;
use crate::storage::{keys, Storage};
use chrono::{DateTime, Utc};

/// Seconds between two resends to the same address.
pub const RESEND_COOLDOWN_SECS: i64 = 180;

/// Server message fragment meaning "already sent recently".
const RECENTLY_SENT_MARKER: &str = "최근에 발송되었습니다";

#[derive(Debug, thiserror::Error)]
pub enum ResendError {
    #[error("Resend available in {0}s")]
    CoolingDown(i64),

    #[error("Verification email was sent recently")]
    RecentlySent,

    #[error(transparent)]
    Failed(ClientError),
}

impl ResendError {
    /// Message to show the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            ResendError::CoolingDown(_) | ResendError::RecentlySent => {
                "인증 이메일이 최근에 발송되었습니다. 잠시 후 다시 시도해주세요."
            }
            ResendError::Failed(ClientError::Api(_)) => {
                "이메일 발송에 실패했습니다. 잠시 후 다시 시도해주세요."
            }
            ResendError::Failed(_) => "네트워크 오류가 발생했습니다.",
        }
    }
}

/// Shown after a successful resend.
pub const RESEND_SUCCESS_MESSAGE: &str = "인증 이메일을 다시 발송했습니다. 잠시 후 확인해주세요.";

pub struct VerificationService {
    api: ApiClient,
    storage: Storage,
}

impl VerificationService {
    pub fn new(api: ApiClient, storage: Storage) -> Self {
        Self { api, storage }
    }

    /// Seconds until `email` may be resent at `now`; 0 when allowed.
    pub fn remaining_cooldown(&self, email: &str, now: DateTime<Utc>) -> i64 {
        let Some(sent_at) = self
            .storage
            .get_raw(&keys::resend_stamp(email))
            .and_then(|raw| raw.trim().trim_matches('"').parse::<i64>().ok())
        else {
            return 0;
        };
        let elapsed = (now.timestamp_millis() - sent_at).div_euclid(1000);
        (RESEND_COOLDOWN_SECS - elapsed).clamp(0, RESEND_COOLDOWN_SECS)
    }

    pub async fn resend(&self, email: &str) -> Result<&'static str, ResendError> {
        self.resend_at(email, Utc::now()).await
    }

    /// Resend the verification email unless `email` is cooling down, and
    /// return the notice to show.
    ///
    /// A server "sent recently" rejection restarts the full cooldown.
    pub async fn resend_at(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<&'static str, ResendError> {
        let email = email.trim();
        let remaining = self.remaining_cooldown(email, now);
        if remaining > 0 {
            return Err(ResendError::CoolingDown(remaining));
        }

        match self.api.resend_verification(email).await {
            Ok(()) => {
                self.stamp(email, now);
                tracing::info!(email, "Verification email resent");
                Ok(RESEND_SUCCESS_MESSAGE)
            }
            Err(ClientError::Api(api))
                if api.status == 400 && api.message.contains(RECENTLY_SENT_MARKER) =>
            {
                self.stamp(email, now);
                tracing::debug!(email, "Server reports a recent send, cooling down");
                Err(ResendError::RecentlySent)
            }
            Err(e) => {
                tracing::warn!(email, error = %e, "Verification resend failed");
                Err(ResendError::Failed(e))
            }
        }
    }

    fn stamp(&self, email: &str, now: DateTime<Utc>) {
        let key = keys::resend_stamp(email);
        if let Err(e) = self.storage.set_raw(&key, &now.timestamp_millis().to_string()) {
            tracing::warn!(email, error = %e, "Failed to persist resend time");
        }
    }
}
