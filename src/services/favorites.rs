// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Favorites reconciliation.
//!
//! Signed in, the server is authoritative: the set is loaded from
//! `GET /api/favorites`, unioned with `isFavorite` flags from every feed
//! load, and changed only by a successful server toggle. Signed out, the
//! set is exactly the locally persisted id list, and every change is
//! written back to storage.

use crate::error::{ClientError, Result};
use crate::models::Beach;
use crate::services::api::ApiClient;
use crate::services::feed::BeachFeed;
use crate::services::session::SessionManager;
use crate::storage::Storage;
use dashmap::DashSet;
use std::collections::HashSet;
use std::sync::Arc;

/// Login prompt raised when a guest tries to use favorites.
pub const FAVORITE_LOGIN_MESSAGE: &str = "찜과 알림을 관리하려면 로그인하세요.";

/// Shown when a server toggle fails.
pub const TOGGLE_FAILED_MESSAGE: &str = "찜 상태 변경에 실패했습니다. 다시 시도해주세요.";

/// A toggle that did not change the set.
#[derive(Debug, thiserror::Error)]
pub enum FavoriteError {
    /// Signed out without guest mode; the login prompt was raised
    #[error("Login required")]
    AuthRequired,

    /// The server rejected the token; the login prompt was raised
    #[error("Session expired")]
    SessionExpired,

    #[error(transparent)]
    Failed(ClientError),
}

impl FavoriteError {
    /// Message to show the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            FavoriteError::AuthRequired | FavoriteError::SessionExpired => {
                FAVORITE_LOGIN_MESSAGE
            }
            FavoriteError::Failed(_) => TOGGLE_FAILED_MESSAGE,
        }
    }
}

/// Where the current favorite set came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoritesSource {
    Server,
    Local,
}

/// Result of a successful toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleOutcome {
    pub beach_id: String,
    pub is_favorite: bool,
    pub source: FavoritesSource,
}

/// The favorite-id set and its persistence policy.
pub struct Favorites {
    api: ApiClient,
    session: Arc<SessionManager>,
    storage: Storage,
    feed: Arc<BeachFeed>,
    ids: DashSet<String>,
    guest_mode: bool,
}

impl Favorites {
    /// `guest_mode` lets signed-out users keep a local-only favorite list;
    /// without it, toggling while signed out raises the login prompt.
    pub fn new(
        api: ApiClient,
        session: Arc<SessionManager>,
        storage: Storage,
        feed: Arc<BeachFeed>,
        guest_mode: bool,
    ) -> Self {
        Self {
            api,
            session,
            storage,
            feed,
            ids: DashSet::new(),
            guest_mode,
        }
    }

    /// Load the set for the current auth state.
    ///
    /// A failed server load falls back to the local list rather than
    /// leaving the set empty.
    pub async fn load(&self) -> FavoritesSource {
        let Some(token) = self.session.access_token() else {
            self.load_local();
            return FavoritesSource::Local;
        };

        match self.api.list_favorites(&token).await {
            Ok(beaches) => {
                self.replace(beaches.into_iter().map(|b| b.id));
                tracing::info!(count = self.ids.len(), "Loaded favorites from server");
                FavoritesSource::Server
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load favorites from server, using local list");
                self.load_local();
                FavoritesSource::Local
            }
        }
    }

    /// Replace the set with the persisted local list.
    pub fn load_local(&self) {
        self.replace(self.storage.load_favorite_ids());
        tracing::debug!(count = self.ids.len(), "Loaded local favorites");
    }

    /// Union in `isFavorite` flags from a fetched beach list. Only applies
    /// while signed in. Returns how many ids were new.
    pub fn merge_server_flags(&self, beaches: &[Beach]) -> usize {
        if !self.session.is_authenticated() {
            return 0;
        }
        let added = beaches
            .iter()
            .filter(|b| b.is_favorite)
            .filter(|b| self.ids.insert(b.id.clone()))
            .count();
        if added > 0 {
            tracing::debug!(added, "Merged favorite flags from feed");
        }
        added
    }

    /// Flip membership of `beach_id`.
    ///
    /// Signed out with guest mode: local flip, persisted, no network.
    /// Signed out without it: login prompt and [`FavoriteError::AuthRequired`].
    /// Signed in: server toggle; the set only changes on success, and a 401
    /// raises the login prompt.
    pub async fn toggle(
        &self,
        beach_id: &str,
    ) -> std::result::Result<ToggleOutcome, FavoriteError> {
        let Some(token) = self.session.access_token() else {
            if !self.guest_mode {
                self.session.require_authenticated(FAVORITE_LOGIN_MESSAGE);
                return Err(FavoriteError::AuthRequired);
            }
            let is_favorite = self.flip_local(beach_id);
            return Ok(ToggleOutcome {
                beach_id: beach_id.to_string(),
                is_favorite,
                source: FavoritesSource::Local,
            });
        };

        let response = match self.api.toggle_favorite(&token, beach_id).await {
            Ok(response) => response,
            Err(e) if e.is_unauthorized() => {
                tracing::warn!(beach_id, "Favorite toggle rejected, session expired");
                self.session.prompt_login(FAVORITE_LOGIN_MESSAGE);
                return Err(FavoriteError::SessionExpired);
            }
            Err(e) => {
                tracing::error!(beach_id, error = %e, "Failed to toggle favorite");
                return Err(FavoriteError::Failed(e));
            }
        };

        if response.is_favorite {
            self.ids.insert(beach_id.to_string());
        } else {
            self.ids.remove(beach_id);
        }
        self.feed.patch_favorite(beach_id, response.is_favorite);

        tracing::info!(beach_id, is_favorite = response.is_favorite, "Favorite toggled");
        Ok(ToggleOutcome {
            beach_id: beach_id.to_string(),
            is_favorite: response.is_favorite,
            source: FavoritesSource::Server,
        })
    }

    /// Ask the server whether `beach_id` is a favorite; signed out, answer
    /// from the local set.
    pub async fn check(&self, beach_id: &str) -> Result<bool> {
        match self.session.access_token() {
            Some(token) => self.api.check_favorite(&token, beach_id).await,
            None => Ok(self.contains(beach_id)),
        }
    }

    /// Discard server-sourced state and return to the local list (sign-out).
    pub fn reset_to_local(&self) {
        self.load_local();
    }

    pub fn contains(&self, beach_id: &str) -> bool {
        self.ids.contains(beach_id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Sorted ids.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ids.iter().map(|id| id.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn snapshot(&self) -> HashSet<String> {
        self.ids.iter().map(|id| id.key().clone()).collect()
    }

    fn replace(&self, ids: impl IntoIterator<Item = String>) {
        self.ids.clear();
        for id in ids {
            self.ids.insert(id);
        }
    }

    fn flip_local(&self, beach_id: &str) -> bool {
        let is_favorite = if self.ids.remove(beach_id).is_some() {
            false
        } else {
            self.ids.insert(beach_id.to_string());
            true
        };

        if let Err(e) = self.storage.save_favorite_ids(&self.ids()) {
            tracing::warn!(error = %e, "Failed to persist local favorites");
        }
        tracing::debug!(beach_id, is_favorite, "Toggled local favorite");
        is_favorite
    }
}
