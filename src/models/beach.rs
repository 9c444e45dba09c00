// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Beach model and lenient decoding of API payloads.
//!
//! The API is treated as an external contract whose field types drift
//! (numeric ids, coordinates as strings, extra status values). Decoding
//! never fails on a field: each one falls back to a documented default.

use geo::{Distance, Haversine, Point};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Crowding level reported for a beach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BeachStatus {
    Free,
    Normal,
    Busy,
    #[default]
    Unknown,
}

impl BeachStatus {
    /// Map a raw status string. `open` reads as `normal`, `closed` and
    /// anything unrecognized read as `unknown`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "free" => BeachStatus::Free,
            "normal" | "open" => BeachStatus::Normal,
            "busy" => BeachStatus::Busy,
            _ => BeachStatus::Unknown,
        }
    }
}

impl<'de> Deserialize<'de> for BeachStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => BeachStatus::parse_lenient(&s),
            _ => BeachStatus::Unknown,
        })
    }
}

/// Device coordinates in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A beach as returned by `/api/beaches`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beach {
    #[serde(default, deserialize_with = "de_string")]
    pub id: String,
    /// Stable short key (e.g. `HAEUNDAE`) used by curated filters
    #[serde(default, deserialize_with = "de_string")]
    pub code: String,
    #[serde(default, deserialize_with = "de_string")]
    pub name: String,
    #[serde(default)]
    pub status: BeachStatus,
    #[serde(default = "nan", deserialize_with = "de_coord")]
    pub latitude: f64,
    #[serde(default = "nan", deserialize_with = "de_coord")]
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "de_opt_string")]
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub tag: Option<String>,
    #[serde(default, deserialize_with = "de_truthy")]
    pub is_favorite: bool,
}

impl Beach {
    /// Great-circle distance from `from`, or `None` when coordinates are missing.
    pub fn distance_km(&self, from: Coordinates) -> Option<f64> {
        if !self.latitude.is_finite() || !self.longitude.is_finite() {
            return None;
        }
        let here = Point::new(from.lng, from.lat);
        let there = Point::new(self.longitude, self.latitude);
        Some(Haversine.distance(here, there) / 1000.0)
    }

    /// Case-insensitive substring match on name or code. `needle` must already be lowercase.
    pub fn matches_query(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.code.to_lowercase().contains(needle)
    }
}

fn nan() -> f64 {
    f64::NAN
}

fn de_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn de_opt_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn de_coord<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .unwrap_or(f64::NAN),
        _ => f64::NAN,
    })
}

fn de_truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Null => false,
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// Decode a beach-list payload. A non-array body yields an empty list;
/// elements that are not objects are skipped.
pub fn decode_beach_list(payload: Value) -> Vec<Beach> {
    match payload {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<Beach>(item) {
                Ok(beach) => Some(beach),
                Err(e) => {
                    tracing::warn!(error = %e, "Skipping undecodable beach entry");
                    None
                }
            })
            .collect(),
        _ => Vec::new(),
    }
}
