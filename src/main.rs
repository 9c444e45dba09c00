// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! BeachCheck command-line client
//!
//! Fetches the beaches near a position, applies an optional curated
//! filter and prints the result as JSON.

use anyhow::Context;
use beachcheck_client::{
    config::Config,
    models::Coordinates,
    services::{CuratedTag, FeedOutcome, LocationState, LogPrompt},
    storage::Storage,
    BeachCheck,
};
use std::env;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Busan City Hall, used when no position is given.
const DEFAULT_POSITION: (f64, f64) = (35.1796, 129.0756);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(api = %config.api_base_url, "Starting BeachCheck client");

    let storage = Storage::open_file(&config.storage_path)
        .with_context(|| format!("Failed to open {}", config.storage_path.display()))?;
    let app = BeachCheck::new(config, storage, Arc::new(LogPrompt))?;

    if let (Ok(email), Ok(password)) = (env::var("BEACHCHECK_EMAIL"), env::var("BEACHCHECK_PASSWORD")) {
        let session = app.log_in(&email, &password).await?;
        tracing::info!(user = %session.user.name, "Logged in");
    } else {
        let source = app.start().await;
        tracing::debug!(?source, "Favorites loaded");
    }

    let position = Coordinates::new(
        env_f64("BEACHCHECK_LAT")?.unwrap_or(DEFAULT_POSITION.0),
        env_f64("BEACHCHECK_LNG")?.unwrap_or(DEFAULT_POSITION.1),
    );
    if let Ok(raw) = env::var("BEACHCHECK_TAG") {
        let tag: CuratedTag = raw.parse().map_err(anyhow::Error::msg)?;
        app.set_curated_tag(Some(tag));
    }
    if let Ok(query) = env::var("BEACHCHECK_QUERY") {
        app.set_search_query(&query);
    }

    match app.update_location(LocationState::Granted(position)).await {
        FeedOutcome::Failed(message) => anyhow::bail!(message),
        outcome => tracing::debug!(?outcome, "Feed updated"),
    }

    let beaches = app.visible_beaches();
    tracing::info!(count = beaches.len(), "Beaches after filters");
    let annotated = beaches
        .iter()
        .map(|beach| {
            let mut value = serde_json::to_value(beach)?;
            let distance = app.feed().distance_km(beach);
            if let (Some(obj), Some(km)) = (value.as_object_mut(), distance) {
                let rounded = (km * 10.0).round() / 10.0;
                obj.insert("distanceKm".to_string(), serde_json::json!(rounded));
            }
            Ok(value)
        })
        .collect::<serde_json::Result<Vec<_>>>()?;
    println!("{}", serde_json::to_string_pretty(&annotated)?);
    Ok(())
}

fn env_f64(name: &str) -> anyhow::Result<Option<f64>> {
    env::var(name)
        .ok()
        .map(|v| v.trim().parse::<f64>().with_context(|| format!("Invalid {}: {}", name, v)))
        .transpose()
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("beachcheck_client=debug".parse().unwrap())
                .add_directive("info".parse().unwrap()),
        )
        .with(format)
        .init();
}
