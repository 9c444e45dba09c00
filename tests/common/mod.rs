// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use beachcheck_client::config::Config;
use beachcheck_client::models::Session;
use beachcheck_client::services::AuthPrompt;
use beachcheck_client::storage::Storage;
use beachcheck_client::BeachCheck;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use wiremock::MockServer;

pub const TEST_TOKEN: &str = "test-access-token";

/// Login prompt that records every request.
#[derive(Default)]
pub struct RecordingPrompt {
    messages: Mutex<Vec<String>>,
}

impl AuthPrompt for RecordingPrompt {
    fn request_login(&self, message: &str) {
        self.messages.lock().unwrap().push(message.to_string());
    }
}

#[allow(dead_code)]
impl RecordingPrompt {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }

    pub fn count(&self) -> usize {
        self.messages.lock().unwrap().len()
    }
}

/// Test config pointing at a mock server.
#[allow(dead_code)]
pub fn test_config(server: &MockServer) -> Config {
    Config {
        api_base_url: server.uri(),
        ..Config::default()
    }
}

/// Create a test app over in-memory storage.
/// Returns the app, its storage and the recording prompt.
#[allow(dead_code)]
pub fn create_test_app(config: Config) -> (BeachCheck, Storage, Arc<RecordingPrompt>) {
    let storage = Storage::in_memory();
    let (app, prompt) = create_test_app_with_storage(config, storage.clone());
    (app, storage, prompt)
}

#[allow(dead_code)]
pub fn create_test_app_with_storage(
    config: Config,
    storage: Storage,
) -> (BeachCheck, Arc<RecordingPrompt>) {
    let prompt = Arc::new(RecordingPrompt::default());
    let app = BeachCheck::new(config, storage, prompt.clone()).expect("Failed to build app");
    (app, prompt)
}

#[allow(dead_code)]
pub fn user_json() -> Value {
    json!({
        "id": "user-1",
        "email": "sea@example.com",
        "name": "바다",
        "role": "USER",
        "createdAt": "2024-06-01T00:00:00Z",
        "lastLoginAt": null
    })
}

/// Login response body.
#[allow(dead_code)]
pub fn auth_json(access_token: &str) -> Value {
    json!({
        "accessToken": access_token,
        "refreshToken": "test-refresh-token",
        "tokenType": "Bearer",
        "expiresIn": 3600,
        "user": user_json()
    })
}

/// Persist a session so the next app built on `storage` starts signed in.
#[allow(dead_code)]
pub fn seed_session(storage: &Storage) {
    let session: Session = serde_json::from_value(json!({
        "accessToken": TEST_TOKEN,
        "refreshToken": "test-refresh-token",
        "tokenType": "Bearer",
        "expiresIn": 3600,
        "user": user_json(),
        "issuedAt": chrono::Utc::now().timestamp_millis()
    }))
    .unwrap();
    storage.save_session(&session).unwrap();
}

#[allow(dead_code)]
pub fn beach_json(id: &str, code: &str, name: &str, is_favorite: bool) -> Value {
    json!({
        "id": id,
        "code": code,
        "name": name,
        "status": "normal",
        "latitude": 35.1587,
        "longitude": 129.1604,
        "updatedAt": "2024-08-15T05:00:00Z",
        "tag": null,
        "isFavorite": is_favorite
    })
}

/// Haeundae, Songdo and Gwangalli, with Songdo flagged as a favorite.
#[allow(dead_code)]
pub fn busan_beaches() -> Value {
    json!([
        beach_json("1", "HAEUNDAE", "해운대해수욕장", false),
        beach_json("2", "SONGDO", "송도해수욕장", true),
        beach_json("3", "GWANGALLI", "광안리해수욕장", false)
    ])
}
