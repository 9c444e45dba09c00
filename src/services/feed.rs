// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Location-driven beach feed.
//!
//! Each new coordinate triggers one fetch of nearby beaches. A newer
//! coordinate (or [`BeachFeed::cancel`]) cancels the fetch in flight, and a
//! cancelled fetch never touches the visible state: last write wins by
//! cancellation.

use crate::error::ClientError;
use crate::models::{Beach, Coordinates};
use crate::services::api::ApiClient;
use crate::services::session::SessionManager;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;

/// Shown when a fetch fails without a usable server message.
pub const FEED_ERROR_MESSAGE: &str = "해수욕장 정보를 불러오지 못했습니다.";

/// Geolocation capability state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationState {
    /// Waiting for the first fix
    Pending,
    /// The user refused location access
    Denied,
    Granted(Coordinates),
}

/// What the feed view should render.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedPhase {
    /// No coordinates yet: loading affordance
    Locating,
    /// Permission denied: ask for location access
    PermissionRequired,
    Loading,
    Ready,
    Failed(String),
}

/// Result of one [`BeachFeed::update_location`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedOutcome {
    /// Fetched and applied this many beaches
    Loaded(usize),
    /// Superseded or cancelled; nothing applied
    Cancelled,
    /// No fetch needed (no coordinates, or unchanged coordinates)
    Skipped,
    Failed(String),
}

#[derive(Default)]
struct FeedState {
    location: Option<LocationState>,
    last_coords: Option<Coordinates>,
    beaches: Vec<Beach>,
    current: Option<Beach>,
    loading: bool,
    error: Option<String>,
    in_flight: Option<CancellationToken>,
}

/// Nearby-beach list keyed by the device position.
pub struct BeachFeed {
    api: ApiClient,
    session: Arc<SessionManager>,
    radius_km: f64,
    state: Mutex<FeedState>,
}

impl BeachFeed {
    pub fn new(api: ApiClient, session: Arc<SessionManager>, radius_km: f64) -> Self {
        Self {
            api,
            session,
            radius_km,
            state: Mutex::new(FeedState::default()),
        }
    }

    fn state(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// React to a geolocation update.
    ///
    /// Only a changed `Granted` coordinate fetches. The lock is never held
    /// across the request.
    pub async fn update_location(&self, location: LocationState) -> FeedOutcome {
        let (coords, token) = {
            let mut state = self.state();
            state.location = Some(location);

            let LocationState::Granted(coords) = location else {
                return FeedOutcome::Skipped;
            };
            if state.last_coords == Some(coords) {
                return FeedOutcome::Skipped;
            }

            if let Some(previous) = state.in_flight.take() {
                previous.cancel();
            }
            let token = CancellationToken::new();
            state.in_flight = Some(token.clone());
            state.last_coords = Some(coords);
            state.loading = true;
            state.error = None;
            (coords, token)
        };

        tracing::debug!(lat = coords.lat, lng = coords.lng, "Fetching nearby beaches");
        let access_token = self.session.access_token();

        let result = tokio::select! {
            biased;
            _ = token.cancelled() => Err(ClientError::Cancelled),
            r = self.api.nearby_beaches(coords, self.radius_km, access_token.as_deref()) => r,
        };

        let mut state = self.state();
        if token.is_cancelled() {
            tracing::debug!(lat = coords.lat, lng = coords.lng, "Discarding superseded beach fetch");
            return FeedOutcome::Cancelled;
        }

        state.in_flight = None;
        state.loading = false;

        match result {
            Ok(beaches) => {
                let count = beaches.len();
                if state.current.is_none() {
                    state.current = beaches.first().cloned();
                }
                state.beaches = beaches;
                tracing::info!(count, radius_km = self.radius_km, "Nearby beaches loaded");
                FeedOutcome::Loaded(count)
            }
            Err(e) if e.is_cancelled() => FeedOutcome::Cancelled,
            Err(e) => {
                let message = match &e {
                    ClientError::Api(api) => format!("API Error: {}", api.status),
                    _ => FEED_ERROR_MESSAGE.to_string(),
                };
                tracing::warn!(error = %e, "Beach feed failed");
                // A failed position may be fetched again.
                state.last_coords = None;
                state.error = Some(message.clone());
                FeedOutcome::Failed(message)
            }
        }
    }

    /// Cancel any fetch in flight (the consuming view went away). The same
    /// coordinates fetch again on the next update.
    pub fn cancel(&self) {
        let mut state = self.state();
        if let Some(token) = state.in_flight.take() {
            token.cancel();
            state.loading = false;
        }
        state.last_coords = None;
    }

    /// Fetch again at the current location, even if it has not moved.
    pub async fn refresh(&self) -> FeedOutcome {
        let location = {
            let mut state = self.state();
            state.last_coords = None;
            state.location
        };
        match location {
            Some(location) => self.update_location(location).await,
            None => FeedOutcome::Skipped,
        }
    }

    pub fn phase(&self) -> FeedPhase {
        let state = self.state();
        match state.location {
            None | Some(LocationState::Pending) => FeedPhase::Locating,
            Some(LocationState::Denied) => FeedPhase::PermissionRequired,
            Some(LocationState::Granted(_)) => {
                if state.loading {
                    FeedPhase::Loading
                } else if let Some(message) = &state.error {
                    FeedPhase::Failed(message.clone())
                } else {
                    FeedPhase::Ready
                }
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn beaches(&self) -> Vec<Beach> {
        self.state().beaches.clone()
    }

    /// The beach currently being viewed (defaults to the first loaded).
    pub fn current_beach(&self) -> Option<Beach> {
        self.state().current.clone()
    }

    /// Great-circle distance of `beach` from the current position, if known.
    pub fn distance_km(&self, beach: &Beach) -> Option<f64> {
        match self.state().location {
            Some(LocationState::Granted(coords)) => beach.distance_km(coords),
            _ => None,
        }
    }

    /// Make `beach_id` the current beach. Returns false if it is not loaded.
    pub fn select_beach(&self, beach_id: &str) -> bool {
        let mut state = self.state();
        match state.beaches.iter().find(|b| b.id == beach_id).cloned() {
            Some(beach) => {
                state.current = Some(beach);
                true
            }
            None => false,
        }
    }

    /// Set `isFavorite` on the loaded copy of a beach.
    pub fn patch_favorite(&self, beach_id: &str, is_favorite: bool) {
        let mut state = self.state();
        for beach in state.beaches.iter_mut().filter(|b| b.id == beach_id) {
            beach.is_favorite = is_favorite;
        }
        if let Some(current) = state.current.as_mut().filter(|b| b.id == beach_id) {
            current.is_favorite = is_favorite;
        }
    }
}
