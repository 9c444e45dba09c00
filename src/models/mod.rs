// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod beach;
pub mod reservation;
pub mod user;

pub use beach::{Beach, BeachStatus, Coordinates};
pub use reservation::{CongestionStatus, ReservationCreateRequest, ReservationResponse, SavedDate};
pub use user::{AuthResponse, Session, TokenResponse, UserProfile};
