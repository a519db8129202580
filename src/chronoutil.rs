//! Time sources and time formatting.
use {
    chrono::{DateTime, Duration, Utc},
    std::fmt::Debug,
};

/// A source of the current time.
///
/// Signing stamps requests with [`now`][Clock::now]; timestamp validation compares the request
/// against it. Tests substitute a fixed instant so they never race the wall clock.
pub trait Clock: Debug + Send + Sync {
    /// Return the current time.
    fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A fixed instant acts as a clock that never advances.
impl Clock for DateTime<Utc> {
    #[inline]
    fn now(&self) -> DateTime<Utc> {
        *self
    }
}

/// Render a grace window the way it appears in error messages: whole minutes when possible,
/// seconds otherwise.
pub(crate) fn duration_to_string(duration: Duration) -> String {
    let millis = duration.num_milliseconds();
    if millis % 1000 != 0 {
        return format!("{} ms", millis);
    }

    let secs = duration.num_seconds();
    if secs != 0 && secs % 60 == 0 {
        format!("{} min", duration.num_minutes())
    } else {
        format!("{} sec", secs)
    }
}

#[cfg(test)]
mod tests {
    use {
        super::{duration_to_string, Clock, SystemClock},
        chrono::{DateTime, Duration, Utc},
    };

    #[test_log::test]
    fn test_duration_formatting() {
        assert_eq!(duration_to_string(Duration::seconds(0)).as_str(), "0 sec");
        assert_eq!(duration_to_string(Duration::seconds(32)).as_str(), "32 sec");
        assert_eq!(duration_to_string(Duration::seconds(60)).as_str(), "1 min");
        assert_eq!(duration_to_string(Duration::seconds(61)).as_str(), "61 sec");
        assert_eq!(duration_to_string(Duration::seconds(600)).as_str(), "10 min");
        assert_eq!(duration_to_string(Duration::milliseconds(500)).as_str(), "500 ms");
        assert_eq!(duration_to_string(Duration::milliseconds(1500)).as_str(), "1500 ms");
        assert_eq!(duration_to_string(Duration::milliseconds(2000)).as_str(), "2 sec");
    }

    #[test_log::test]
    fn test_fixed_clock() {
        let fixed = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).expect("failed to create DateTime");
        assert_eq!(fixed.now(), fixed);
        assert_eq!(fixed.now().timestamp(), 1_700_000_000);
    }

    #[test_log::test]
    fn test_system_clock_advances() {
        let before = Utc::now();
        let now = SystemClock.now();
        assert!(now >= before);
    }
}
