// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Push notification boundary.
//!
//! Delivery is external. This side registers the device token with the
//! backend once signed in, and describes how a background message is
//! displayed and what a click on it does.

use crate::error::{ClientError, Result};
use crate::services::api::ApiClient;
use crate::services::session::SessionManager;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// Title used when a message carries none.
pub const DEFAULT_TITLE: &str = "새 알림";

/// Dedup tag: a newer notification replaces an older one.
pub const NOTIFICATION_TAG: &str = "beach-notification";

pub const NOTIFICATION_ICON: &str = "/assets/icons/icon-192x192.png";
pub const NOTIFICATION_BADGE: &str = "/assets/icons/badge-72x72.png";

pub struct NotificationService {
    api: ApiClient,
    session: Arc<SessionManager>,
}

impl NotificationService {
    pub fn new(api: ApiClient, session: Arc<SessionManager>) -> Self {
        Self { api, session }
    }

    fn token(&self) -> Result<String> {
        self.session
            .access_token()
            .ok_or_else(|| ClientError::AuthRequired("not logged in".to_string()))
    }

    /// Register this device's push token for the signed-in user.
    pub async fn register_device_token(&self, fcm_token: &str) -> Result<()> {
        let fcm_token = fcm_token.trim();
        if fcm_token.is_empty() {
            let mut fields = crate::error::FieldErrors::new();
            fields.insert("fcmToken".to_string(), "empty device token".to_string());
            return Err(ClientError::Validation(fields));
        }

        let token = self.token()?;
        self.api.register_device_token(&token, fcm_token).await?;
        tracing::info!("Push device token registered");
        Ok(())
    }

    pub async fn set_enabled(&self, enabled: bool) -> Result<()> {
        let token = self.token()?;
        self.api.update_notification_settings(&token, enabled).await?;
        tracing::info!(enabled, "Notification setting updated");
        Ok(())
    }
}

#[derive(Debug, Default, Deserialize)]
struct PushPayload {
    #[serde(default)]
    notification: Option<PushNotification>,
    #[serde(default)]
    data: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct PushNotification {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    body: Option<String>,
}

/// How a background message is displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundNotification {
    pub title: String,
    pub body: String,
    pub icon: &'static str,
    pub badge: &'static str,
    pub tag: &'static str,
    /// Stay visible until dismissed
    pub require_interaction: bool,
    pub data: Option<Value>,
}

impl BackgroundNotification {
    /// Build the display for a raw push payload. Never fails; missing or
    /// malformed parts fall back to defaults.
    pub fn from_payload(payload: &Value) -> Self {
        let parsed: PushPayload = serde_json::from_value(payload.clone()).unwrap_or_default();
        let notification = parsed.notification.unwrap_or_default();

        Self {
            title: notification
                .title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            body: notification.body.unwrap_or_default(),
            icon: NOTIFICATION_ICON,
            badge: NOTIFICATION_BADGE,
            tag: NOTIFICATION_TAG,
            require_interaction: true,
            data: parsed.data,
        }
    }
}

/// What a notification click does.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickAction {
    /// Focus the already-open window at this index
    Focus(usize),
    /// Open a new window at this URL
    Open(String),
}

/// Resolve a click: focus the first open window on `origin`, else open the
/// app root.
pub fn resolve_click<S: AsRef<str>>(origin: &str, open_windows: &[S]) -> ClickAction {
    let origin = origin.trim_end_matches('/');
    match open_windows
        .iter()
        .position(|url| url.as_ref().starts_with(origin))
    {
        Some(index) => ClickAction::Focus(index),
        None => ClickAction::Open(format!("{}/", origin)),
    }
}
