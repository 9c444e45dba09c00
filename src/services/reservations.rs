// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Saved reservations: the locally persisted list plus its server
//! counterpart.
//!
//! Entries are only ever appended or removed by id, never edited.

use crate::error::{ClientError, Result};
use crate::models::{ReservationResponse, SavedDate};
use crate::services::api::ApiClient;
use crate::services::session::SessionManager;
use crate::storage::{Storage, StorageError};
use chrono::Datelike;
use std::sync::{Arc, Mutex, PoisonError};

pub struct SavedDates {
    api: ApiClient,
    session: Arc<SessionManager>,
    storage: Storage,
    // Serializes load-modify-save of the persisted list.
    write_lock: Mutex<()>,
}

impl SavedDates {
    pub fn new(api: ApiClient, session: Arc<SessionManager>, storage: Storage) -> Self {
        Self {
            api,
            session,
            storage,
            write_lock: Mutex::new(()),
        }
    }

    /// All saved reservations in creation order.
    pub fn all(&self) -> Vec<SavedDate> {
        self.storage.load_saved_dates()
    }

    /// Saved reservations in `year`/`month` (1-based).
    pub fn for_month(&self, year: i32, month: u32) -> Vec<SavedDate> {
        self.all()
            .into_iter()
            .filter(|d| d.date.year() == year && d.date.month() == month)
            .collect()
    }

    /// Append `entry` to the persisted list.
    pub fn add(&self, entry: SavedDate) -> std::result::Result<(), StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut dates = self.storage.load_saved_dates();
        tracing::debug!(id = %entry.id, beach = %entry.beach_name, "Saving reservation locally");
        dates.push(entry);
        self.storage.save_saved_dates(&dates)
    }

    /// Drop the entry with `id` locally. Returns whether one was removed.
    pub fn remove(&self, id: &str) -> std::result::Result<bool, StorageError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut dates = self.storage.load_saved_dates();
        let before = dates.len();
        dates.retain(|d| d.id != id);
        if dates.len() == before {
            return Ok(false);
        }
        self.storage.save_saved_dates(&dates)?;
        Ok(true)
    }

    /// The signed-in user's reservations as known to the server.
    pub async fn remote(&self) -> Result<Vec<ReservationResponse>> {
        let token = self
            .session
            .access_token()
            .ok_or_else(|| ClientError::AuthRequired("not logged in".to_string()))?;
        self.api.my_reservations(&token).await
    }

    /// Cancel a reservation: delete it on the server first (when it has a
    /// server identity), then locally. A failed server delete leaves the
    /// local entry in place.
    pub async fn cancel(&self, entry: &SavedDate) -> Result<()> {
        if let (Some(reservation_id), Some(beach_id)) = (&entry.reservation_id, &entry.beach_id) {
            let token = self
                .session
                .access_token()
                .ok_or_else(|| ClientError::AuthRequired("not logged in".to_string()))?;
            self.api
                .delete_reservation(&token, beach_id, reservation_id)
                .await?;
            tracing::info!(%reservation_id, %beach_id, "Reservation deleted on server");
        }

        self.remove(&entry.id)?;
        Ok(())
    }
}
