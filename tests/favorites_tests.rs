// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

mod common;

use beachcheck_client::config::Config;
use beachcheck_client::error::ClientError;
use beachcheck_client::models::Coordinates;
use beachcheck_client::services::favorites::{FAVORITE_LOGIN_MESSAGE, TOGGLE_FAILED_MESSAGE};
use beachcheck_client::services::{FavoriteError, FavoritesSource, FeedOutcome, LocationState};
use beachcheck_client::storage::{keys, Storage};
use common::{
    beach_json, busan_beaches, create_test_app, create_test_app_with_storage, seed_session,
    test_config, TEST_TOKEN,
};
use serde_json::json;
use wiremock::matchers::{any, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_guest_toggle_is_local_only() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let (app, storage, prompt) = create_test_app(test_config(&server));

    let outcome = app.toggle_favorite("7").await.unwrap();
    assert!(outcome.is_favorite);
    assert_eq!(outcome.source, FavoritesSource::Local);
    assert!(app.favorites().contains("7"));
    assert_eq!(storage.load_favorite_ids(), vec!["7"]);

    let outcome = app.toggle_favorite("7").await.unwrap();
    assert!(!outcome.is_favorite);
    assert!(!app.favorites().contains("7"));
    assert!(storage.load_favorite_ids().is_empty());
    assert_eq!(prompt.count(), 0);
}

#[tokio::test]
async fn test_toggle_without_guest_mode_prompts() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let config = Config {
        guest_favorites: false,
        ..test_config(&server)
    };
    let (app, storage, prompt) = create_test_app(config);

    let err = app.toggle_favorite("7").await.unwrap_err();
    assert!(matches!(err, FavoriteError::AuthRequired));
    assert_eq!(err.user_message(), FAVORITE_LOGIN_MESSAGE);
    assert!(!app.favorites().contains("7"));
    assert!(storage.get_raw(keys::FAVORITES).is_none());
    assert_eq!(prompt.messages(), vec![FAVORITE_LOGIN_MESSAGE]);
}

#[tokio::test]
async fn test_malformed_local_favorites_load_empty() {
    let server = MockServer::start().await;
    let storage = Storage::in_memory();
    storage.set_raw(keys::FAVORITES, "{not json").unwrap();

    let (app, _) = create_test_app_with_storage(test_config(&server), storage);
    assert_eq!(app.start().await, FavoritesSource::Local);
    assert!(app.favorites().is_empty());
}

#[tokio::test]
async fn test_signed_in_load_uses_server_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .and(header("authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            beach_json("1", "HAEUNDAE", "해운대해수욕장", true),
            beach_json("3", "GWANGALLI", "광안리해수욕장", true)
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let storage = Storage::in_memory();
    seed_session(&storage);
    storage.set_raw(keys::FAVORITES, r#"["9"]"#).unwrap();
    let (app, _) = create_test_app_with_storage(test_config(&server), storage);

    assert_eq!(app.start().await, FavoritesSource::Server);
    assert_eq!(app.favorites().ids(), vec!["1", "3"]);
}

#[tokio::test]
async fn test_server_load_failure_falls_back_to_local() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let storage = Storage::in_memory();
    seed_session(&storage);
    storage.set_raw(keys::FAVORITES, r#"["9", 10]"#).unwrap();
    let (app, _) = create_test_app_with_storage(test_config(&server), storage);

    assert_eq!(app.start().await, FavoritesSource::Local);
    assert_eq!(app.favorites().ids(), vec!["10", "9"]);
}

#[tokio::test]
async fn test_feed_flags_are_unioned_not_overwritten() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            beach_json("1", "HAEUNDAE", "해운대해수욕장", true)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/beaches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(busan_beaches()))
        .mount(&server)
        .await;

    let storage = Storage::in_memory();
    seed_session(&storage);
    let (app, _) = create_test_app_with_storage(test_config(&server), storage.clone());
    app.start().await;

    let outcome = app
        .update_location(LocationState::Granted(Coordinates::new(35.1, 129.1)))
        .await;
    assert_eq!(outcome, FeedOutcome::Loaded(3));

    // "1" from the favorites list, "2" from the feed flag.
    assert_eq!(app.favorites().ids(), vec!["1", "2"]);
    // Signed in: never written locally.
    assert!(storage.get_raw(keys::FAVORITES).is_none());
}

#[tokio::test]
async fn test_server_toggle_updates_set_and_feed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/beaches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(busan_beaches()))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/favorites/3/toggle"))
        .and(header("authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "찜 목록에 추가되었습니다.",
            "isFavorite": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let storage = Storage::in_memory();
    seed_session(&storage);
    let (app, _) = create_test_app_with_storage(test_config(&server), storage);
    app.update_location(LocationState::Granted(Coordinates::new(35.1, 129.1)))
        .await;

    let outcome = app.toggle_favorite("3").await.unwrap();
    assert!(outcome.is_favorite);
    assert_eq!(outcome.source, FavoritesSource::Server);
    assert!(app.favorites().contains("3"));

    let gwangalli = app
        .feed()
        .beaches()
        .into_iter()
        .find(|b| b.id == "3")
        .unwrap();
    assert!(gwangalli.is_favorite);
}

#[tokio::test]
async fn test_failed_server_toggle_keeps_previous_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            beach_json("1", "HAEUNDAE", "해운대해수욕장", true)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/favorites/1/toggle"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let storage = Storage::in_memory();
    seed_session(&storage);
    let (app, prompt) = create_test_app_with_storage(test_config(&server), storage);
    app.start().await;

    let err = app.toggle_favorite("1").await.unwrap_err();
    assert!(matches!(err, FavoriteError::Failed(ClientError::Api(ref e)) if e.status == 500));
    assert_eq!(err.user_message(), TOGGLE_FAILED_MESSAGE);
    assert_eq!(app.favorites().ids(), vec!["1"]);
    assert_eq!(prompt.count(), 0);
}

#[tokio::test]
async fn test_unauthorized_toggle_prompts_login() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/api/favorites/2/toggle"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let storage = Storage::in_memory();
    seed_session(&storage);
    let (app, prompt) = create_test_app_with_storage(test_config(&server), storage);

    let err = app.toggle_favorite("2").await.unwrap_err();
    assert!(matches!(err, FavoriteError::SessionExpired));
    assert!(!app.favorites().contains("2"));
    assert_eq!(prompt.messages(), vec![FAVORITE_LOGIN_MESSAGE]);
}

#[tokio::test]
async fn test_sign_out_returns_to_local_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/favorites"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            beach_json("1", "HAEUNDAE", "해운대해수욕장", true)
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/auth/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let storage = Storage::in_memory();
    seed_session(&storage);
    storage.set_raw(keys::FAVORITES, r#"["5"]"#).unwrap();
    let (app, _) = create_test_app_with_storage(test_config(&server), storage);
    app.start().await;
    assert_eq!(app.favorites().ids(), vec!["1"]);

    app.sign_out().await;
    assert_eq!(app.favorites().ids(), vec!["5"]);
}
