// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - client feature logic.

pub mod api;
pub mod calendar;
pub mod favorites;
pub mod feed;
pub mod filter;
pub mod notifications;
pub mod reservations;
pub mod session;
pub mod verification;

pub use api::{ApiClient, FavoriteResponse};
pub use calendar::{
    CalendarError, DayCell, ReservationCalendar, ReservationError, ReservationNotice,
    ReservationTarget, SelectedSlot,
};
pub use favorites::{FavoriteError, Favorites, FavoritesSource, ToggleOutcome};
pub use feed::{BeachFeed, FeedOutcome, FeedPhase, LocationState};
pub use filter::{apply_filters, first_match, CuratedTag, FilterState};
pub use notifications::{BackgroundNotification, ClickAction, NotificationService};
pub use reservations::SavedDates;
pub use session::{AuthPrompt, LogPrompt, SessionManager, SignupOutcome};
pub use verification::{ResendError, VerificationService};
