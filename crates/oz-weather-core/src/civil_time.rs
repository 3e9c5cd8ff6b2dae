use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;

/// Source of "now" for a page load.
pub trait Clock: Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Always reports the same instant. Used for reproducible builds and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Wall-clock date and hour as seen in a named timezone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CivilTime {
    /// `YYYY-MM-DD`
    pub today: String,
    /// 0..=23, midnight is 0.
    pub current_hour: u32,
}

impl CivilTime {
    /// Resolves `instant` through the zone's own rules, so DST shifts apply.
    pub fn at(instant: DateTime<Utc>, tz: Tz) -> Self {
        let local = instant.with_timezone(&tz);
        Self {
            today: local.format("%Y-%m-%d").to_string(),
            current_hour: local.hour(),
        }
    }

    pub fn now(clock: &impl Clock, tz: Tz) -> Self {
        Self::at(clock.now(), tz)
    }
}
