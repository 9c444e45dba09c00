// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! BeachCheck REST API client.
//!
//! Handles:
//! - Auth (login, signup, refresh, logout, verification resend)
//! - Beach lookup and the location-based beach list
//! - Favorites and reservations (bearer authenticated)
//! - Push device token registration
//!
//! Every non-2xx response becomes an [`ApiError`]; nothing is retried.

use crate::config::Config;
use crate::error::{ApiError, ClientError, Result};
use crate::models::beach::decode_beach_list;
use crate::models::{
    AuthResponse, Beach, Coordinates, ReservationCreateRequest, ReservationResponse,
    TokenResponse, UserProfile,
};
use reqwest::{header, RequestBuilder, StatusCode};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;

/// BeachCheck API client.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the API at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ClientError::transport)?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(config.api_base_url.clone(), config.request_timeout)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    // ─── Auth ────────────────────────────────────────────────────────────────

    pub async fn log_in(&self, payload: &LogInRequest) -> Result<AuthResponse> {
        let request = self.http.post(self.url("/api/auth/login")).json(payload);
        self.send_json(request).await
    }

    /// Create an account. The server sends a verification email; no tokens are issued.
    pub async fn sign_up(&self, payload: &SignUpRequest) -> Result<UserProfile> {
        let request = self.http.post(self.url("/api/auth/signup")).json(payload);
        self.send_json(request).await
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse> {
        let request = self
            .http
            .post(self.url("/api/auth/refresh"))
            .json(&RefreshTokenRequest { refresh_token });
        self.send_json(request).await
    }

    /// Revoke a refresh token server-side.
    pub async fn log_out(&self, refresh_token: &str) -> Result<()> {
        let request = self
            .http
            .post(self.url("/api/auth/logout"))
            .json(&RefreshTokenRequest { refresh_token });
        self.send_empty(request).await
    }

    pub async fn current_user(&self, access_token: &str) -> Result<UserProfile> {
        let request = self
            .http
            .get(self.url("/api/auth/me"))
            .bearer_auth(access_token);
        self.send_json(request).await
    }

    pub async fn resend_verification(&self, email: &str) -> Result<()> {
        let request = self
            .http
            .post(self.url("/api/auth/resend-verification"))
            .json(&serde_json::json!({ "email": email }));
        self.send_empty(request).await
    }

    // ─── Beaches ─────────────────────────────────────────────────────────────

    /// Beaches within `radius_km` of `coords`.
    ///
    /// The token is optional; when present the server fills in `isFavorite`.
    pub async fn nearby_beaches(
        &self,
        coords: Coordinates,
        radius_km: f64,
        access_token: Option<&str>,
    ) -> Result<Vec<Beach>> {
        let mut request = self.http.get(self.url("/api/beaches")).query(&[
            ("lat", coords.lat.to_string()),
            ("lon", coords.lng.to_string()),
            ("radiusKm", radius_km.to_string()),
        ]);
        if let Some(token) = access_token {
            request = request.bearer_auth(token);
        }

        let payload: serde_json::Value = self.send_json(request).await?;
        Ok(decode_beach_list(payload))
    }

    /// Look up one beach by code; `None` on 404.
    pub async fn beach_by_code(&self, code: &str) -> Result<Option<Beach>> {
        let url = self.url(&format!("/api/beaches/{}", urlencoding::encode(code)));
        let response = self
            .http
            .get(&url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(ClientError::transport)?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let response = check_response(response).await?;
        let mut beach: Beach = response.json().await.map_err(ClientError::transport)?;
        if beach.code.is_empty() {
            beach.code = code.to_string();
        }
        Ok(Some(beach))
    }

    // ─── Favorites ───────────────────────────────────────────────────────────

    pub async fn list_favorites(&self, access_token: &str) -> Result<Vec<Beach>> {
        let request = self
            .http
            .get(self.url("/api/favorites"))
            .bearer_auth(access_token);
        let payload: serde_json::Value = self.send_json(request).await?;
        Ok(decode_beach_list(payload))
    }

    pub async fn add_favorite(&self, access_token: &str, beach_id: &str) -> Result<FavoriteResponse> {
        let request = self
            .http
            .post(self.favorite_url(beach_id, ""))
            .bearer_auth(access_token);
        self.send_json(request).await
    }

    pub async fn remove_favorite(
        &self,
        access_token: &str,
        beach_id: &str,
    ) -> Result<FavoriteResponse> {
        let request = self
            .http
            .delete(self.favorite_url(beach_id, ""))
            .bearer_auth(access_token);
        self.send_json(request).await
    }

    pub async fn toggle_favorite(
        &self,
        access_token: &str,
        beach_id: &str,
    ) -> Result<FavoriteResponse> {
        let request = self
            .http
            .put(self.favorite_url(beach_id, "/toggle"))
            .bearer_auth(access_token);
        self.send_json(request).await
    }

    pub async fn check_favorite(&self, access_token: &str, beach_id: &str) -> Result<bool> {
        let request = self
            .http
            .get(self.favorite_url(beach_id, "/check"))
            .bearer_auth(access_token);
        let check: FavoriteCheck = self.send_json(request).await?;
        Ok(check.is_favorite)
    }

    fn favorite_url(&self, beach_id: &str, suffix: &str) -> String {
        self.url(&format!(
            "/api/favorites/{}{}",
            urlencoding::encode(beach_id),
            suffix
        ))
    }

    // ─── Reservations ────────────────────────────────────────────────────────

    pub async fn create_reservation(
        &self,
        access_token: &str,
        beach_id: &str,
        payload: &ReservationCreateRequest,
    ) -> Result<ReservationResponse> {
        let url = self.url(&format!(
            "/api/beaches/{}/reservations",
            urlencoding::encode(beach_id)
        ));
        let request = self.http.post(&url).bearer_auth(access_token).json(payload);
        self.send_json(request).await
    }

    pub async fn delete_reservation(
        &self,
        access_token: &str,
        beach_id: &str,
        reservation_id: &str,
    ) -> Result<()> {
        let url = self.url(&format!(
            "/api/beaches/{}/reservations/{}",
            urlencoding::encode(beach_id),
            urlencoding::encode(reservation_id)
        ));
        let request = self.http.delete(&url).bearer_auth(access_token);
        self.send_empty(request).await
    }

    pub async fn my_reservations(&self, access_token: &str) -> Result<Vec<ReservationResponse>> {
        let request = self
            .http
            .get(self.url("/api/beaches/reservations"))
            .bearer_auth(access_token);
        self.send_json(request).await
    }

    // ─── Notifications ───────────────────────────────────────────────────────

    pub async fn register_device_token(&self, access_token: &str, fcm_token: &str) -> Result<()> {
        let request = self
            .http
            .post(self.url("/api/notifications/fcm-token"))
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "fcmToken": fcm_token }));
        self.send_empty(request).await
    }

    pub async fn update_notification_settings(&self, access_token: &str, enabled: bool) -> Result<()> {
        let request = self
            .http
            .put(self.url("/api/notifications/settings"))
            .bearer_auth(access_token)
            .json(&serde_json::json!({ "enabled": enabled }));
        self.send_empty(request).await
    }

    // ─── Plumbing ────────────────────────────────────────────────────────────

    /// Send a request and decode the JSON body.
    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(ClientError::transport)?;

        let response = check_response(response).await?;
        response
            .json()
            .await
            .map_err(|e| ClientError::Decode(format!("JSON parse error: {}", e)))
    }

    /// Send a request whose response body is irrelevant.
    async fn send_empty(&self, request: RequestBuilder) -> Result<()> {
        let response = request
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(ClientError::transport)?;

        check_response(response).await?;
        Ok(())
    }
}

/// Pass through a successful response, convert anything else to [`ApiError`].
async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();
    let body = response.text().await.unwrap_or_default();

    let error = ApiError::from_body(status.as_u16(), &content_type, &body);
    tracing::debug!(status = status.as_u16(), code = ?error.code, "API request failed");
    Err(ClientError::Api(error))
}

/// `POST /api/auth/login` body.
#[derive(Debug, Clone, Serialize)]
pub struct LogInRequest {
    pub email: String,
    pub password: String,
}

/// `POST /api/auth/signup` body.
#[derive(Debug, Clone, Serialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshTokenRequest<'a> {
    refresh_token: &'a str,
}

/// Response of the favorite add/remove/toggle endpoints.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteResponse {
    #[serde(default)]
    pub message: String,
    pub is_favorite: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FavoriteCheck {
    is_favorite: bool,
}
