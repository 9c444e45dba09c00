// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

mod common;

use beachcheck_client::models::{BeachStatus, Coordinates};
use beachcheck_client::services::feed::FEED_ERROR_MESSAGE;
use beachcheck_client::services::{CuratedTag, FeedOutcome, FeedPhase, LocationState};
use beachcheck_client::storage::Storage;
use common::{
    beach_json, busan_beaches, create_test_app, create_test_app_with_storage, seed_session,
    test_config, TEST_TOKEN,
};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{any, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn at(lat: f64, lng: f64) -> LocationState {
    LocationState::Granted(Coordinates::new(lat, lng))
}

#[tokio::test]
async fn test_no_fetch_without_coordinates() {
    let server = MockServer::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (app, _, _) = create_test_app(test_config(&server));
    assert_eq!(app.feed().phase(), FeedPhase::Locating);

    assert_eq!(app.update_location(LocationState::Pending).await, FeedOutcome::Skipped);
    assert_eq!(app.feed().phase(), FeedPhase::Locating);

    assert_eq!(app.update_location(LocationState::Denied).await, FeedOutcome::Skipped);
    assert_eq!(app.feed().phase(), FeedPhase::PermissionRequired);
}

#[tokio::test]
async fn test_one_request_per_distinct_coordinate() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/beaches"))
        .and(query_param("lat", "35.1587"))
        .and(query_param("lon", "129.1604"))
        .and(query_param("radiusKm", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(busan_beaches()))
        .expect(1)
        .mount(&server)
        .await;

    let (app, _, _) = create_test_app(test_config(&server));
    assert_eq!(app.update_location(at(35.1587, 129.1604)).await, FeedOutcome::Loaded(3));
    assert_eq!(app.update_location(at(35.1587, 129.1604)).await, FeedOutcome::Skipped);

    assert_eq!(app.feed().phase(), FeedPhase::Ready);
    assert!(!app.feed().is_loading());
    assert_eq!(app.feed().current_beach().map(|b| b.id), Some("1".to_string()));
    assert_eq!(app.feed().beaches()[1].status, BeachStatus::Normal);
}

#[tokio::test]
async fn test_latest_coordinate_wins_out_of_order() {
    let server = MockServer::start().await;
    // The first request resolves last.
    Mock::given(method("GET"))
        .and(path("/api/beaches"))
        .and(query_param("lat", "35.1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([beach_json("1", "HAEUNDAE", "해운대해수욕장", false)]))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/beaches"))
        .and(query_param("lat", "35.2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([beach_json("2", "SONGDO", "송도해수욕장", false)])),
        )
        .mount(&server)
        .await;

    let (app, _, _) = create_test_app(test_config(&server));
    let (first, second) = tokio::join!(
        app.update_location(at(35.1, 129.0)),
        app.update_location(at(35.2, 129.0))
    );

    assert_eq!(first, FeedOutcome::Cancelled);
    assert_eq!(second, FeedOutcome::Loaded(1));

    let ids: Vec<String> = app.feed().beaches().into_iter().map(|b| b.id).collect();
    assert_eq!(ids, vec!["2"]);
    assert_eq!(app.feed().error(), None);
    assert_eq!(app.feed().phase(), FeedPhase::Ready);
}

#[tokio::test]
async fn test_cancel_is_silent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/beaches"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(busan_beaches())
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let (app, _, _) = create_test_app(test_config(&server));
    let cancel = async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        app.feed().cancel();
    };
    let (outcome, ()) = tokio::join!(app.update_location(at(35.1, 129.0)), cancel);

    assert_eq!(outcome, FeedOutcome::Cancelled);
    assert!(app.feed().beaches().is_empty());
    assert!(!app.feed().is_loading());
    assert_eq!(app.feed().error(), None);
}

#[tokio::test]
async fn test_error_clears_loading_and_sets_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/beaches"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let (app, _, _) = create_test_app(test_config(&server));
    let outcome = app.update_location(at(35.1, 129.0)).await;

    assert_eq!(outcome, FeedOutcome::Failed("API Error: 500".to_string()));
    assert!(!app.feed().is_loading());
    assert_eq!(
        app.feed().phase(),
        FeedPhase::Failed("API Error: 500".to_string())
    );
}

#[tokio::test]
async fn test_network_error_uses_generic_message() {
    // Nothing listens on the discard port.
    let config = beachcheck_client::config::Config {
        api_base_url: "http://127.0.0.1:9".to_string(),
        request_timeout: Duration::from_secs(2),
        ..Default::default()
    };
    let (app, _, _) = create_test_app(config);

    let outcome = app.update_location(at(35.1, 129.0)).await;
    assert_eq!(outcome, FeedOutcome::Failed(FEED_ERROR_MESSAGE.to_string()));
    assert!(!app.feed().is_loading());
}

#[tokio::test]
async fn test_signed_in_feed_sends_bearer() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/beaches"))
        .and(header("authorization", format!("Bearer {}", TEST_TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(busan_beaches()))
        .expect(1)
        .mount(&server)
        .await;

    let storage = Storage::in_memory();
    seed_session(&storage);
    let (app, _) = create_test_app_with_storage(test_config(&server), storage);
    assert_eq!(app.update_location(at(35.1, 129.0)).await, FeedOutcome::Loaded(3));
}

#[tokio::test]
async fn test_visible_beaches_and_search_submit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/beaches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(busan_beaches()))
        .mount(&server)
        .await;

    let (app, _, _) = create_test_app(test_config(&server));
    app.update_location(at(35.1, 129.0)).await;

    app.set_curated_tag(Some(CuratedTag::Trending));
    let codes: Vec<String> = app.visible_beaches().into_iter().map(|b| b.code).collect();
    assert_eq!(codes, vec!["GWANGALLI", "SONGDO"]);

    let found = app.search_submit(" 광안리 ").unwrap();
    assert_eq!(found.id, "3");
    assert_eq!(app.feed().current_beach().map(|b| b.id), Some("3".to_string()));
    assert!(app.search_submit("제주").is_none());
}

#[tokio::test]
async fn test_failed_position_can_be_fetched_again() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/beaches"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/beaches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(busan_beaches()))
        .expect(1)
        .mount(&server)
        .await;

    let (app, _, _) = create_test_app(test_config(&server));
    assert_eq!(
        app.update_location(at(35.1, 129.0)).await,
        FeedOutcome::Failed("API Error: 503".to_string())
    );

    // Same position, device has not moved.
    assert_eq!(app.update_location(at(35.1, 129.0)).await, FeedOutcome::Loaded(3));
    assert_eq!(app.feed().phase(), FeedPhase::Ready);
    assert_eq!(app.feed().error(), None);
    assert_eq!(app.feed().beaches().len(), 3);
}

#[tokio::test]
async fn test_refresh_refetches_current_position() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/beaches"))
        .and(query_param("lat", "35.1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(busan_beaches()))
        .expect(2)
        .mount(&server)
        .await;

    let (app, _, _) = create_test_app(test_config(&server));
    assert_eq!(app.refresh_feed().await, FeedOutcome::Skipped);

    assert_eq!(app.update_location(at(35.1, 129.0)).await, FeedOutcome::Loaded(3));
    assert_eq!(app.refresh_feed().await, FeedOutcome::Loaded(3));
    assert_eq!(app.feed().phase(), FeedPhase::Ready);
}

#[tokio::test]
async fn test_cancel_when_idle_allows_refetch() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/beaches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(busan_beaches()))
        .expect(2)
        .mount(&server)
        .await;

    let (app, _, _) = create_test_app(test_config(&server));
    assert_eq!(app.update_location(at(35.1, 129.0)).await, FeedOutcome::Loaded(3));

    app.feed().cancel();
    assert_eq!(app.update_location(at(35.1, 129.0)).await, FeedOutcome::Loaded(3));
}

#[tokio::test]
async fn test_distance_from_current_position() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/beaches"))
        .respond_with(ResponseTemplate::new(200).set_body_json(busan_beaches()))
        .mount(&server)
        .await;

    let (app, _, _) = create_test_app(test_config(&server));
    app.update_location(at(35.1587, 129.1604)).await;
    let haeundae = app.feed().beaches()[0].clone();
    assert!(app.feed().distance_km(&haeundae).unwrap() < 0.01);

    // Busan station is roughly 11 km from Haeundae.
    app.update_location(at(35.1151, 129.0422)).await;
    let km = app.feed().distance_km(&haeundae).unwrap();
    assert!((9.0..13.0).contains(&km), "distance was {km}");

    app.update_location(LocationState::Denied).await;
    assert_eq!(app.feed().distance_km(&haeundae), None);
}
