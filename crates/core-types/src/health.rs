use crate::DependencyState;
use chrono::{DateTime, TimeDelta, Utc};

/// A point-in-time read of uptime and data store reachability.
/// Computed fresh for every health request and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthSnapshot {
    pub generated_at: DateTime<Utc>,
    pub process_started_at: DateTime<Utc>,
    pub uptime: TimeDelta,
    pub dependency_reachable: bool,
    pub dependency_state: DependencyState,
}

impl HealthSnapshot {
    pub fn new(
        process_started_at: DateTime<Utc>,
        generated_at: DateTime<Utc>,
        dependency_state: DependencyState,
    ) -> Self {
        // A clock stepping backwards must not produce a negative uptime.
        let uptime = (generated_at - process_started_at).max(TimeDelta::zero());
        Self {
            generated_at,
            process_started_at,
            uptime,
            dependency_reachable: dependency_state.is_connected(),
            dependency_state,
        }
    }

    pub fn uptime_ms(&self) -> i64 {
        self.uptime.num_milliseconds()
    }

    pub fn uptime_display(&self) -> String {
        format_uptime(self.uptime)
    }
}

/// Renders an uptime with its largest non-zero unit and the next one below it,
/// e.g. `"2 nap, 5 óra"` or `"3 perc, 12 másodperc"`.
pub fn format_uptime(uptime: TimeDelta) -> String {
    let total = uptime.num_seconds().max(0);
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let seconds = total % 60;

    if days > 0 {
        format!("{days} nap, {hours} óra")
    } else if hours > 0 {
        format!("{hours} óra, {minutes} perc")
    } else if minutes > 0 {
        format!("{minutes} perc, {seconds} másodperc")
    } else {
        format!("{seconds} másodperc")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_and_hours_only_once_a_day_has_passed() {
        // 1 day, 1 hour, 1 minute, 1 second.
        assert_eq!(format_uptime(TimeDelta::milliseconds(90_061_000)), "1 nap, 1 óra");
        assert_eq!(format_uptime(TimeDelta::hours(53)), "2 nap, 5 óra");
    }

    #[test]
    fn falls_through_to_smaller_units() {
        assert_eq!(format_uptime(TimeDelta::seconds(3_660)), "1 óra, 1 perc");
        assert_eq!(format_uptime(TimeDelta::seconds(192)), "3 perc, 12 másodperc");
        assert_eq!(format_uptime(TimeDelta::milliseconds(4_999)), "4 másodperc");
        assert_eq!(format_uptime(TimeDelta::zero()), "0 másodperc");
    }

    #[test]
    fn snapshot_derives_uptime_and_reachability() {
        let started = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let now = started + TimeDelta::milliseconds(90_061_000);

        let snapshot = HealthSnapshot::new(started, now, DependencyState::Unreachable);
        assert_eq!(snapshot.uptime_ms(), 90_061_000);
        assert!(!snapshot.dependency_reachable);
        assert_eq!(snapshot.uptime_display(), "1 nap, 1 óra");

        let skewed = HealthSnapshot::new(now, started, DependencyState::Connected);
        assert_eq!(skewed.uptime_ms(), 0);
        assert!(skewed.dependency_reachable);
    }
}
