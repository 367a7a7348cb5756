//! Manually driven clock for ordering-sensitive tests.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Local, TimeDelta, Utc};
use mockable::Clock;

/// Clock frozen at a start instant and moved forward explicitly.
///
/// Time is kept as microseconds since the Unix epoch.
pub struct MutableClock {
    micros: AtomicI64,
}

impl MutableClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            micros: AtomicI64::new(start.timestamp_micros()),
        }
    }

    /// Move the clock forward so later writes sort after earlier ones.
    pub fn advance_seconds(&self, seconds: i64) {
        let step = TimeDelta::seconds(seconds)
            .num_microseconds()
            .unwrap_or(i64::MAX);
        self.micros.fetch_add(step, Ordering::SeqCst);
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_micros(self.micros.load(Ordering::SeqCst)).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stands_still_until_advanced() {
        let start = Utc
            .with_ymd_and_hms(2025, 3, 1, 9, 30, 0)
            .single()
            .expect("valid instant");
        let clock = MutableClock::new(start);
        assert_eq!(clock.utc(), start);

        clock.advance_seconds(90);
        assert_eq!(clock.utc(), start + TimeDelta::seconds(90));
    }
}
