// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Calendar heatmap and reservation view-model.
//!
//! Congestion on the calendar is a deterministic function of
//! `(year, month, day, hour)`, so the grid and the selected-slot summary
//! always agree. Months are 1-based throughout.

use crate::error::ClientError;
use crate::models::{CongestionStatus, ReservationCreateRequest, SavedDate};
use crate::services::api::ApiClient;
use crate::services::reservations::SavedDates;
use crate::services::session::SessionManager;
use crate::time_utils::{format_hour_slot, format_korean_date, format_utc_rfc3339, KOREAN_WEEKDAYS};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeZone, Timelike, Utc};
use std::sync::Arc;

/// Login prompt raised when a guest tries to reserve.
pub const RESERVATION_LOGIN_MESSAGE: &str = "로그인이 필요합니다.";

/// Invalid calendar coordinates.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CalendarError {
    #[error("Invalid month: {0}")]
    InvalidMonth(u32),

    #[error("Invalid day {day} for {year}-{month:02}")]
    InvalidDay { year: i32, month: u32, day: u32 },

    #[error("Invalid hour: {0}")]
    InvalidHour(u32),
}

/// Deterministic congestion for day-of-month `day` at `hour`.
///
/// Weekends bias midday toward busy; weekdays bias toward free.
pub fn seeded_status(day: u32, hour: u32, is_weekend: bool) -> CongestionStatus {
    use CongestionStatus::{Busy, Free, Normal};

    let seed = (day * 100 + hour) % 7;

    if is_weekend {
        return match hour {
            11..=17 => {
                if seed < 5 {
                    Busy
                } else {
                    Normal
                }
            }
            9..=10 | 18..=19 => match seed {
                0..=2 => Normal,
                3..=5 => Busy,
                _ => Free,
            },
            _ => {
                if seed < 5 {
                    Free
                } else {
                    Normal
                }
            }
        };
    }

    match hour {
        12..=16 => {
            if seed < 4 {
                Busy
            } else {
                Normal
            }
        }
        10..=11 | 17..=18 => match seed {
            0..=2 => Normal,
            3..=5 => Free,
            _ => Busy,
        },
        _ => {
            if seed < 6 {
                Free
            } else {
                Normal
            }
        }
    }
}

fn first_of_month(year: i32, month: u32) -> Result<NaiveDate, CalendarError> {
    NaiveDate::from_ymd_opt(year, month, 1).ok_or(CalendarError::InvalidMonth(month))
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, CalendarError> {
    NaiveDate::from_ymd_opt(year, month, day).ok_or(CalendarError::InvalidDay { year, month, day })
}

fn check_hour(hour: u32) -> Result<(), CalendarError> {
    if hour > 23 {
        return Err(CalendarError::InvalidHour(hour));
    }
    Ok(())
}

fn is_weekend(date: NaiveDate) -> bool {
    date.weekday().num_days_from_sunday() % 6 == 0
}

/// Congestion for one calendar slot.
pub fn congestion_status(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
) -> Result<CongestionStatus, CalendarError> {
    check_hour(hour)?;
    let date = date(year, month, day)?;
    Ok(seeded_status(day, hour, is_weekend(date)))
}

/// Number of days in `month`: the day before the first of the next month.
pub fn days_in_month(year: i32, month: u32) -> Result<u32, CalendarError> {
    let first = first_of_month(year, month)?;
    let next = if month == 12 {
        first_of_month(year + 1, 1)?
    } else {
        first_of_month(year, month + 1)?
    };
    next.pred_opt()
        .map(|last| last.day())
        .ok_or(CalendarError::InvalidMonth(month))
}

/// Weekday of the 1st, 0 = Sunday.
pub fn first_weekday(year: i32, month: u32) -> Result<u32, CalendarError> {
    Ok(first_of_month(year, month)?
        .weekday()
        .num_days_from_sunday())
}

/// One day in the month grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub day: u32,
    pub weekday: &'static str,
    pub status: CongestionStatus,
}

/// Month grid: `first_weekday` leading `None` cells, then one cell per day
/// colored for `hour`.
pub fn month_grid(year: i32, month: u32, hour: u32) -> Result<Vec<Option<DayCell>>, CalendarError> {
    check_hour(hour)?;
    let padding = first_weekday(year, month)? as usize;
    let days = days_in_month(year, month)?;

    let mut cells: Vec<Option<DayCell>> = vec![None; padding];
    cells.reserve(days as usize);
    for day in 1..=days {
        let date = date(year, month, day)?;
        cells.push(Some(DayCell {
            date,
            day,
            weekday: KOREAN_WEEKDAYS[date.weekday().num_days_from_sunday() as usize],
            status: seeded_status(day, hour, is_weekend(date)),
        }));
    }
    Ok(cells)
}

// ─────────────────────────────────────────────────────────────────────────────
// Reservation
// ─────────────────────────────────────────────────────────────────────────────

/// Why a reservation was not made.
#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("Login required")]
    AuthRequired,

    #[error("No date selected")]
    NoDateSelected,

    #[error("No beach id")]
    MissingBeach,

    #[error("Reservation time is not in the future")]
    PastTime,

    #[error("Invalid local time")]
    InvalidTime,

    #[error("Session expired")]
    SessionExpired,

    /// The server refused with an error code or message
    #[error("Rejected ({code:?}): {message}")]
    Rejected {
        code: Option<String>,
        message: String,
    },

    #[error(transparent)]
    Failed(ClientError),
}

impl ReservationError {
    /// Message to show the user.
    pub fn user_message(&self) -> String {
        match self {
            ReservationError::AuthRequired | ReservationError::SessionExpired => {
                RESERVATION_LOGIN_MESSAGE.to_string()
            }
            ReservationError::NoDateSelected => "날짜를 먼저 선택해 주세요.".to_string(),
            ReservationError::MissingBeach => "해수욕장 정보가 없습니다.".to_string(),
            ReservationError::PastTime => "현재 시각 이후만 예약할 수 있어요.".to_string(),
            ReservationError::InvalidTime => "날짜/시간 형식을 확인해 주세요.".to_string(),
            ReservationError::Rejected { message, .. } => message.clone(),
            ReservationError::Failed(_) => "예약에 실패했어요.".to_string(),
        }
    }

    fn from_client(error: ClientError) -> Self {
        let api = match error {
            ClientError::Api(api) => api,
            other => return ReservationError::Failed(other),
        };
        if api.status == 401 {
            return ReservationError::SessionExpired;
        }

        let message = match api.code.as_deref() {
            Some("RESERVATION_PAST_TIME") => "현재 시각 이후만 예약할 수 있어요.".to_string(),
            Some("RESERVATION_INVALID_TIME") => "날짜/시간 형식을 확인해 주세요.".to_string(),
            Some("RESERVATION_DUPLICATE") => "예약이 중복되었습니다.".to_string(),
            Some("BEACH_NOT_FOUND") => "해수욕장을 찾을 수 없어요.".to_string(),
            _ if !api.message.trim().is_empty() => api.message.clone(),
            _ => "예약에 실패했어요.".to_string(),
        };
        ReservationError::Rejected {
            code: api.code,
            message,
        }
    }
}

/// What is being reserved.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservationTarget {
    pub beach_id: Option<String>,
    pub beach_name: String,
    /// Event the visit is for; blank means none
    pub event_id: Option<String>,
}

/// Success notification.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationNotice {
    pub title: String,
    pub description: String,
    pub saved: SavedDate,
}

/// The selected slot and its congestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectedSlot {
    pub date: NaiveDate,
    pub hour: u32,
    pub status: CongestionStatus,
}

impl SelectedSlot {
    pub fn weekday(&self) -> &'static str {
        KOREAN_WEEKDAYS[self.date.weekday().num_days_from_sunday() as usize]
    }

    /// Summary line under the calendar, e.g. `2024년 8월 15일 (목) 14:00 · 혼잡`.
    pub fn summary(&self) -> String {
        format!(
            "{} {} · {}",
            format_korean_date(self.date),
            format_hour_slot(self.hour),
            self.status.label()
        )
    }
}

/// View-model behind the monthly heatmap and its reserve button.
pub struct ReservationCalendar {
    api: ApiClient,
    session: Arc<SessionManager>,
    saved: Arc<SavedDates>,
    offset: FixedOffset,
    year: i32,
    month: u32,
    selected: Option<NaiveDate>,
    hour: u32,
}

impl ReservationCalendar {
    /// Calendar showing the month of `now` in `offset`, hour preset to the
    /// current local hour, no date selected.
    pub fn new(
        api: ApiClient,
        session: Arc<SessionManager>,
        saved: Arc<SavedDates>,
        offset: FixedOffset,
        now: DateTime<Utc>,
    ) -> Self {
        let local = now.with_timezone(&offset);
        Self {
            api,
            session,
            saved,
            offset,
            year: local.year(),
            month: local.month(),
            selected: None,
            hour: local.hour(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// Weekday header labels, Sunday first.
    pub fn weekday_labels(&self) -> [&'static str; 7] {
        KOREAN_WEEKDAYS
    }

    pub fn show_month(&mut self, year: i32, month: u32) -> Result<(), CalendarError> {
        first_of_month(year, month)?;
        self.year = year;
        self.month = month;
        Ok(())
    }

    pub fn prev_month(&mut self) {
        if self.month == 1 {
            self.year -= 1;
            self.month = 12;
        } else {
            self.month -= 1;
        }
    }

    pub fn next_month(&mut self) {
        if self.month == 12 {
            self.year += 1;
            self.month = 1;
        } else {
            self.month += 1;
        }
    }

    /// Grid for the shown month at the selected hour.
    pub fn grid(&self) -> Vec<Option<DayCell>> {
        // Shown month and hour are validated on every change.
        month_grid(self.year, self.month, self.hour).unwrap_or_default()
    }

    /// Select `day` of the shown month.
    pub fn select_date(&mut self, day: u32) -> Result<SelectedSlot, CalendarError> {
        let date = date(self.year, self.month, day)?;
        self.selected = Some(date);
        Ok(self.slot(date))
    }

    /// Change the hour; the selected date (if any) is kept.
    pub fn select_hour(&mut self, hour: u32) -> Result<Option<SelectedSlot>, CalendarError> {
        check_hour(hour)?;
        self.hour = hour;
        Ok(self.selected())
    }

    pub fn selected(&self) -> Option<SelectedSlot> {
        self.selected.map(|date| self.slot(date))
    }

    fn slot(&self, date: NaiveDate) -> SelectedSlot {
        SelectedSlot {
            date,
            hour: self.hour,
            status: seeded_status(date.day(), self.hour, is_weekend(date)),
        }
    }

    /// Reserve the selected slot now.
    pub async fn submit_reservation(
        &self,
        target: &ReservationTarget,
    ) -> Result<ReservationNotice, ReservationError> {
        self.submit_reservation_at(target, Utc::now()).await
    }

    /// Reserve the selected slot, judging "the future" against `now`.
    pub async fn submit_reservation_at(
        &self,
        target: &ReservationTarget,
        now: DateTime<Utc>,
    ) -> Result<ReservationNotice, ReservationError> {
        if !self.session.require_authenticated(RESERVATION_LOGIN_MESSAGE) {
            return Err(ReservationError::AuthRequired);
        }
        let slot = self.selected().ok_or(ReservationError::NoDateSelected)?;
        let beach_id = target
            .beach_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(ReservationError::MissingBeach)?;

        let local = slot
            .date
            .and_hms_opt(slot.hour, 0, 0)
            .and_then(|naive| self.offset.from_local_datetime(&naive).single())
            .ok_or(ReservationError::InvalidTime)?;
        let instant = local.with_timezone(&Utc);
        if instant <= now {
            return Err(ReservationError::PastTime);
        }

        let token = self
            .session
            .access_token()
            .ok_or(ReservationError::AuthRequired)?;
        let request = ReservationCreateRequest {
            reserved_at_utc: format_utc_rfc3339(instant),
            event_id: target
                .event_id
                .as_deref()
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string),
        };

        let response = match self.api.create_reservation(&token, beach_id, &request).await {
            Ok(response) => response,
            Err(e) => {
                let error = ReservationError::from_client(e);
                if matches!(error, ReservationError::SessionExpired) {
                    self.session.prompt_login(RESERVATION_LOGIN_MESSAGE);
                }
                tracing::warn!(beach_id, error = %error, "Reservation failed");
                return Err(error);
            }
        };

        let saved = SavedDate {
            id: response.reservation_id.clone(),
            reservation_id: Some(response.reservation_id.clone()),
            beach_id: Some(if response.beach_id.is_empty() {
                beach_id.to_string()
            } else {
                response.beach_id.clone()
            }),
            beach_name: target.beach_name.clone(),
            date: slot.date,
            hour: slot.hour,
            status: slot.status,
            created_at: now,
        };
        if let Err(e) = self.saved.add(saved.clone()) {
            tracing::warn!(error = %e, "Reservation made but not saved locally");
        }

        tracing::info!(
            beach_id,
            reservation_id = %response.reservation_id,
            reserved_at = %request.reserved_at_utc,
            "Reservation created"
        );
        Ok(ReservationNotice {
            title: "예약이 완료되었어요.".to_string(),
            description: format!(
                "{} - {} {}",
                target.beach_name,
                format_korean_date(slot.date),
                format_hour_slot(slot.hour)
            ),
            saved,
        })
    }
}
