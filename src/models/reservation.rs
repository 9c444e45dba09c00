// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Reservation wire types and the locally saved reservation record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Congestion level shown on the calendar heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionStatus {
    Free,
    Normal,
    Busy,
}

impl CongestionStatus {
    /// Korean label used in the UI.
    pub fn label(&self) -> &'static str {
        match self {
            CongestionStatus::Free => "여유",
            CongestionStatus::Normal => "보통",
            CongestionStatus::Busy => "혼잡",
        }
    }
}

/// Body of `POST /api/beaches/{beachId}/reservations`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationCreateRequest {
    /// ISO-8601 UTC instant, e.g. `2025-10-24T12:00:00.000Z`
    pub reserved_at_utc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<String>,
}

/// Reservation record returned by the API.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    #[serde(deserialize_with = "de_text")]
    pub reservation_id: String,
    #[serde(default)]
    pub status: String,
    /// Instant as sent by the server (string or epoch number)
    #[serde(default, deserialize_with = "de_text")]
    pub reserved_at_utc: String,
    #[serde(default, deserialize_with = "de_text")]
    pub beach_id: String,
    #[serde(default)]
    pub event_id: Option<String>,
    #[serde(default, deserialize_with = "de_text")]
    pub created_at_utc: String,
}

fn de_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// A reservation the user made, kept in the persisted saved-dates list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDate {
    pub id: String,
    #[serde(default)]
    pub reservation_id: Option<String>,
    #[serde(default)]
    pub beach_id: Option<String>,
    pub beach_name: String,
    /// Local calendar date of the visit
    pub date: NaiveDate,
    /// Local hour of the visit, 0..=23
    pub hour: u32,
    pub status: CongestionStatus,
    pub created_at: DateTime<Utc>,
}
