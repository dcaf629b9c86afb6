use std::fmt;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;

use crate::utils::business_day::minute_of_day;

/// The four daily windows the service has always opened, in `HH:MM-HH:MM` form.
pub const DEFAULT_WINDOWS: &str = "00:00-15:00,15:01-18:00,19:00-20:00,21:00-22:00";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WindowParseError {
    #[error("window '{0}' must look like HH:MM-HH:MM")]
    Malformed(String),
    #[error("'{0}' is not a valid HH:MM time")]
    InvalidTime(String),
    #[error("window '{0}' ends before it starts")]
    Inverted(String),
}

/// Wall-clock minute of the day, 0..1440.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct MinuteOfDay(u16);

impl MinuteOfDay {
    pub fn new(hour: u16, minute: u16) -> Option<Self> {
        (hour < 24 && minute < 60).then_some(Self(hour * 60 + minute))
    }

    pub fn minutes(self) -> u16 {
        self.0
    }

    fn parse(raw: &str) -> Result<Self, WindowParseError> {
        let invalid = || WindowParseError::InvalidTime(raw.to_string());
        let (h, m) = raw.split_once(':').ok_or_else(invalid)?;

        if h.is_empty() || h.len() > 2 || m.len() != 2 {
            return Err(invalid());
        }

        let hour: u16 = h.parse().map_err(|_| invalid())?;
        let minute: u16 = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).ok_or_else(invalid)
    }
}

impl fmt::Display for MinuteOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

/// Inclusive daily check-in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AttendanceWindow {
    pub start: MinuteOfDay,
    pub end: MinuteOfDay,
}

impl AttendanceWindow {
    pub fn contains(&self, minute: u16) -> bool {
        minute >= self.start.minutes() && minute <= self.end.minutes()
    }

    /// `HH:MM` lower bound, compared lexically against stored check-in times.
    pub fn start_label(&self) -> String {
        self.start.to_string()
    }

    pub fn end_label(&self) -> String {
        self.end.to_string()
    }
}

impl fmt::Display for AttendanceWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Ordered window list. Lookups return the first window that matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowSchedule {
    windows: Vec<AttendanceWindow>,
}

impl WindowSchedule {
    pub fn new(windows: Vec<AttendanceWindow>) -> Self {
        Self { windows }
    }

    /// Parses a comma separated list such as `08:00-12:00,13:00-17:00`.
    /// A blank string yields an empty schedule that never matches.
    pub fn parse(raw: &str) -> Result<Self, WindowParseError> {
        let windows = raw
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| {
                let (start, end) = part
                    .split_once('-')
                    .ok_or_else(|| WindowParseError::Malformed(part.to_string()))?;
                let start = MinuteOfDay::parse(start.trim())?;
                let end = MinuteOfDay::parse(end.trim())?;

                if start > end {
                    return Err(WindowParseError::Inverted(part.to_string()));
                }
                Ok(AttendanceWindow { start, end })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { windows })
    }

    pub fn windows(&self) -> &[AttendanceWindow] {
        &self.windows
    }

    pub fn find(&self, minute: u16) -> Option<&AttendanceWindow> {
        self.windows.iter().find(|w| w.contains(minute))
    }

    /// Window open at `now`, judged on the local clock in `tz`.
    pub fn evaluate(&self, now: DateTime<Utc>, tz: Tz) -> Option<&AttendanceWindow> {
        self.find(minute_of_day(now, tz))
    }
}
