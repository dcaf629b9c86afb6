use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike, Utc};
use chrono_tz::Tz;

/// A local calendar day in the configured timezone, with its UTC bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusinessDay {
    pub date: NaiveDate,
    /// inclusive
    pub start: DateTime<Utc>,
    /// exclusive
    pub end: DateTime<Utc>,
}

impl BusinessDay {
    /// Business day that contains `now` in `tz`.
    pub fn containing(now: DateTime<Utc>, tz: Tz) -> Self {
        let date = now.with_timezone(&tz).date_naive();
        let next = date.checked_add_days(Days::new(1)).unwrap_or(date);

        Self {
            date,
            start: local_midnight(date, tz),
            end: local_midnight(next, tz),
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

// Zones that skip midnight on a DST switch have no local 00:00; the first
// instant of that date is then the end of the gap.
fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Utc> {
    let midnight = date.and_time(NaiveTime::MIN);

    if let Some(start) = tz.from_local_datetime(&midnight).earliest() {
        return start.with_timezone(&Utc);
    }

    (1..=180)
        .map(|minutes| midnight + chrono::Duration::minutes(minutes))
        .find_map(|probe: NaiveDateTime| tz.from_local_datetime(&probe).earliest())
        .map(|start| start.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&midnight))
}

/// Minutes since local midnight.
pub fn minute_of_day(now: DateTime<Utc>, tz: Tz) -> u16 {
    let local = now.with_timezone(&tz);
    (local.hour() * 60 + local.minute()) as u16
}

/// Local wall-clock time formatted as `HH:MM`.
pub fn local_time_label(now: DateTime<Utc>, tz: Tz) -> String {
    now.with_timezone(&tz).format("%H:%M").to_string()
}
