// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! BeachCheck client core: check how crowded Busan's beaches are.
//!
//! This crate provides the client-side state behind the BeachCheck app:
//! session handling, favorites, the location-driven beach feed, curated
//! filters and the reservation calendar, all over the BeachCheck REST API.

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;
pub mod time_utils;

use chrono::Utc;
use config::Config;
use error::Result;
use models::{Beach, Session};
use services::{
    apply_filters, first_match, ApiClient, AuthPrompt, BeachFeed, CuratedTag, FavoriteError,
    Favorites, FavoritesSource, FeedOutcome, FilterState, LocationState, NotificationService,
    ReservationCalendar, SavedDates, SessionManager, SignupOutcome, ToggleOutcome,
    VerificationService,
};
use std::sync::{Arc, PoisonError, RwLock};
use storage::{Storage, StorageError, Theme};

/// Application handle owning every client component.
pub struct BeachCheck {
    config: Config,
    storage: Storage,
    api: ApiClient,
    session: Arc<SessionManager>,
    feed: Arc<BeachFeed>,
    favorites: Favorites,
    saved_dates: Arc<SavedDates>,
    verification: VerificationService,
    notifications: NotificationService,
    filter: RwLock<FilterState>,
}

impl BeachCheck {
    /// Wire up the components. Any persisted session is restored here.
    pub fn new(config: Config, storage: Storage, prompt: Arc<dyn AuthPrompt>) -> Result<Self> {
        let api = ApiClient::from_config(&config)?;
        let session = Arc::new(SessionManager::new(api.clone(), storage.clone(), prompt));
        let feed = Arc::new(BeachFeed::new(
            api.clone(),
            session.clone(),
            config.search_radius_km,
        ));
        let favorites = Favorites::new(
            api.clone(),
            session.clone(),
            storage.clone(),
            feed.clone(),
            config.guest_favorites,
        );
        let saved_dates = Arc::new(SavedDates::new(api.clone(), session.clone(), storage.clone()));
        let verification = VerificationService::new(api.clone(), storage.clone());
        let notifications = NotificationService::new(api.clone(), session.clone());

        tracing::debug!(base_url = api.base_url(), "BeachCheck client initialized");
        Ok(Self {
            config,
            storage,
            api,
            session,
            feed,
            favorites,
            saved_dates,
            verification,
            notifications,
            filter: RwLock::new(FilterState::default()),
        })
    }

    /// Load favorites for the restored auth state.
    pub async fn start(&self) -> FavoritesSource {
        self.favorites.load().await
    }

    pub async fn log_in(&self, email: &str, password: &str) -> Result<Session> {
        let session = self.session.login(email, password).await?;
        self.favorites.load().await;
        Ok(session)
    }

    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<SignupOutcome> {
        self.session.signup(name, email, password).await
    }

    /// Sign out and drop signed-in-only state.
    pub async fn sign_out(&self) {
        self.session.sign_out().await;
        self.filter
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .show_favorites_only = false;
        self.favorites.reset_to_local();
    }

    /// Feed a geolocation update; favorite flags of a fresh list are merged.
    pub async fn update_location(&self, location: LocationState) -> FeedOutcome {
        let outcome = self.feed.update_location(location).await;
        if let FeedOutcome::Loaded(_) = outcome {
            self.favorites.merge_server_flags(&self.feed.beaches());
        }
        outcome
    }

    /// Fetch the feed again at the current position (retry after a failure).
    pub async fn refresh_feed(&self) -> FeedOutcome {
        let outcome = self.feed.refresh().await;
        if let FeedOutcome::Loaded(_) = outcome {
            self.favorites.merge_server_flags(&self.feed.beaches());
        }
        outcome
    }

    pub async fn toggle_favorite(
        &self,
        beach_id: &str,
    ) -> std::result::Result<ToggleOutcome, FavoriteError> {
        self.favorites.toggle(beach_id).await
    }

    // ─── Filters ─────────────────────────────────────────────────────────────

    pub fn filter(&self) -> FilterState {
        self.filter
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update_filter(&self, update: impl FnOnce(&mut FilterState)) {
        update(&mut self.filter.write().unwrap_or_else(PoisonError::into_inner));
    }

    pub fn set_search_query(&self, query: &str) {
        self.update_filter(|f| f.search_query = query.to_string());
    }

    pub fn set_show_favorites_only(&self, enabled: bool) {
        self.update_filter(|f| f.show_favorites_only = enabled);
    }

    pub fn set_curated_tag(&self, tag: Option<CuratedTag>) {
        self.update_filter(|f| f.curated_tag = tag);
    }

    /// The feed after the current filters.
    pub fn visible_beaches(&self) -> Vec<Beach> {
        apply_filters(&self.feed.beaches(), &self.favorites.snapshot(), &self.filter())
    }

    /// Jump to the first beach matching `query`, making it current.
    pub fn search_submit(&self, query: &str) -> Option<Beach> {
        let beaches = self.feed.beaches();
        let found = first_match(&beaches, query)?.clone();
        self.feed.select_beach(&found.id);
        Some(found)
    }

    // ─── Calendar ────────────────────────────────────────────────────────────

    /// A fresh reservation calendar opened on the current local month.
    pub fn calendar(&self) -> ReservationCalendar {
        ReservationCalendar::new(
            self.api.clone(),
            self.session.clone(),
            self.saved_dates.clone(),
            self.config.local_offset,
            Utc::now(),
        )
    }

    // ─── Theme ───────────────────────────────────────────────────────────────

    pub fn theme(&self) -> Theme {
        self.storage.load_theme()
    }

    pub fn set_theme(&self, theme: Theme) -> std::result::Result<(), StorageError> {
        self.storage.save_theme(theme)
    }

    // ─── Components ──────────────────────────────────────────────────────────

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    pub fn feed(&self) -> &BeachFeed {
        &self.feed
    }

    pub fn favorites(&self) -> &Favorites {
        &self.favorites
    }

    pub fn saved_dates(&self) -> &SavedDates {
        &self.saved_dates
    }

    pub fn verification(&self) -> &VerificationService {
        &self.verification
    }

    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }
}
