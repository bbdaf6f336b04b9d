use chrono::{DateTime, Duration, NaiveDate, Utc};

/// Source of "now" for sessions, pools and play dates.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Wall-clock time.
    #[must_use]
    pub fn system() -> Self {
        Self::System
    }

    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    /// Calendar day (UTC) of `now()`. Play dates are tracked at this granularity.
    #[must_use]
    pub fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// The same clock moved `days` calendar days ahead. A system clock is
    /// returned unchanged.
    #[must_use]
    pub fn days_later(self, days: i64) -> Self {
        match self {
            Clock::System => Clock::System,
            Clock::Fixed(at) => Clock::Fixed(at + Duration::days(days)),
        }
    }
}

/// The day before `day`, saturating at the minimum representable date.
#[must_use]
pub fn previous_day(day: NaiveDate) -> NaiveDate {
    day.pred_opt().unwrap_or(day)
}

/// Seconds since the epoch of `fixed_now()`: 2024-03-15T12:00:00Z.
pub const FIXED_NOW_SECS: i64 = 1_710_504_000;

/// A deterministic instant for tests.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH + Duration::seconds(FIXED_NOW_SECS)
}

#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_lands_mid_march() {
        assert_eq!(
            fixed_clock().today(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
        );
    }

    #[test]
    fn days_later_crosses_midnight() {
        let clock = fixed_clock();
        assert_eq!(previous_day(clock.days_later(1).today()), clock.today());
        assert!(matches!(Clock::system().days_later(3), Clock::System));
    }
}
