use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Expiration timestamp meaning "never expires"
pub const NO_EXPIRATION: i64 = 0;

/// How long a newly written entry should live
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Expiration {
    /// Use the cache's configured default expiration
    #[default]
    Default,
    /// The entry never expires
    Never,
    /// The entry expires this long after it is written.
    ///
    /// A zero duration is treated the same as [`Expiration::Default`].
    After(Duration),
}

impl Expiration {
    /// Resolves this request into an absolute expiration timestamp.
    ///
    /// `fallback` is consulted for [`Expiration::Default`]; if the fallback is
    /// itself `Default` (or a zero duration) the entry never expires.
    pub fn deadline(self, fallback: Expiration, now: i64) -> i64 {
        let ttl = match self {
            Expiration::Default => fallback,
            Expiration::After(d) if d.is_zero() => fallback,
            other => other,
        };

        match ttl {
            Expiration::After(d) if !d.is_zero() => {
                let nanos = i64::try_from(d.as_nanos()).unwrap_or(i64::MAX);
                now.saturating_add(nanos)
            }
            _ => NO_EXPIRATION,
        }
    }
}

/// Current wall-clock time as nanoseconds since the Unix epoch
pub(crate) fn now_nanos() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| i64::try_from(d.as_nanos()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

/// Represents a stored value with its absolute expiration time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<V> {
    value: V,
    expiration: i64,
}

impl<V> Entry<V> {
    /// Creates a new entry; `expiration` is Unix nanoseconds, `0` for never
    pub fn new(value: V, expiration: i64) -> Self {
        Self { value, expiration }
    }

    /// Returns a reference to the stored value
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consumes the entry, returning the stored value
    pub fn into_value(self) -> V {
        self.value
    }

    /// Returns the expiration timestamp (`0` means never)
    pub fn expiration(&self) -> i64 {
        self.expiration
    }

    /// Checks if this entry had expired at the given instant
    pub fn is_expired_at(&self, now: i64) -> bool {
        self.expiration > NO_EXPIRATION && now > self.expiration
    }

    /// Checks if this entry has expired
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(now_nanos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECOND: i64 = 1_000_000_000;

    #[test]
    fn test_entry_not_expired() {
        let entry = Entry::new("test_value", now_nanos() + 60 * SECOND);

        assert_eq!(*entry.value(), "test_value");
        assert!(!entry.is_expired());
    }

    #[test]
    fn test_entry_expired() {
        let entry = Entry::new("test_value", now_nanos() - SECOND);

        assert!(entry.is_expired());
    }

    #[test]
    fn test_zero_expiration_never_expires() {
        let entry = Entry::new("forever", NO_EXPIRATION);

        assert!(!entry.is_expired());
        assert!(!entry.is_expired_at(i64::MAX));
    }

    #[test]
    fn test_expired_only_strictly_after_deadline() {
        let entry = Entry::new(1u32, 1_000);

        assert!(!entry.is_expired_at(999));
        assert!(!entry.is_expired_at(1_000));
        assert!(entry.is_expired_at(1_001));
    }

    #[test]
    fn test_deadline_explicit_duration() {
        let ttl = Expiration::After(Duration::from_secs(5));
        assert_eq!(ttl.deadline(Expiration::Never, 100), 100 + 5 * SECOND);
    }

    #[test]
    fn test_deadline_never() {
        let fallback = Expiration::After(Duration::from_secs(5));
        assert_eq!(Expiration::Never.deadline(fallback, 100), NO_EXPIRATION);
    }

    #[test]
    fn test_deadline_default_uses_fallback() {
        let fallback = Expiration::After(Duration::from_secs(2));
        assert_eq!(Expiration::Default.deadline(fallback, 10), 10 + 2 * SECOND);
        assert_eq!(Expiration::Default.deadline(Expiration::Never, 10), NO_EXPIRATION);
        // A default of "default" has nothing left to resolve to.
        assert_eq!(Expiration::Default.deadline(Expiration::Default, 10), NO_EXPIRATION);
    }

    #[test]
    fn test_deadline_zero_duration_is_default() {
        let fallback = Expiration::After(Duration::from_secs(3));
        assert_eq!(
            Expiration::After(Duration::ZERO).deadline(fallback, 0),
            3 * SECOND
        );
    }

    #[test]
    fn test_deadline_saturates_on_huge_duration() {
        let ttl = Expiration::After(Duration::MAX);
        assert_eq!(ttl.deadline(Expiration::Never, now_nanos()), i64::MAX);
    }
}
