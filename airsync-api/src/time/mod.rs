use std::sync::atomic::{AtomicI32, Ordering};

use time::{OffsetDateTime, UtcOffset};

/// Wall-clock source for sample timestamps.
pub trait TimeProvider: Send + Sync {
    fn now(&self) -> OffsetDateTime;
}

/// Looks up the UTC offset in effect at an instant, `None` when unknown.
pub type OffsetResolver = fn(OffsetDateTime) -> Option<UtcOffset>;

fn local_offset_at(instant: OffsetDateTime) -> Option<UtcOffset> {
    UtcOffset::local_offset_at(instant).ok()
}

#[derive(Debug)]
enum Zone {
    Fixed(UtcOffset),
    /// Offset resolved per reading so daylight saving changes are followed.
    /// `last` holds the most recent offset in whole seconds.
    Resolved { resolve: OffsetResolver, last: AtomicI32 },
}

/// Reads the system clock in the local time zone.
///
/// The offset is looked up again on every call. Some platforms refuse the
/// lookup once several threads run; the clock then keeps the last offset it
/// saw, or UTC if it never saw one.
#[derive(Debug)]
pub struct SystemClock {
    zone: Zone,
}

impl SystemClock {
    pub fn new() -> Self {
        Self::with_resolver(local_offset_at)
    }

    pub fn with_resolver(resolve: OffsetResolver) -> Self {
        let initial = resolve(OffsetDateTime::now_utc()).unwrap_or(UtcOffset::UTC);

        Self {
            zone: Zone::Resolved {
                resolve,
                last: AtomicI32::new(initial.whole_seconds()),
            },
        }
    }

    pub fn with_offset(offset: UtcOffset) -> Self {
        Self {
            zone: Zone::Fixed(offset),
        }
    }

    /// Offset at `instant`.
    pub fn offset_at(&self, instant: OffsetDateTime) -> UtcOffset {
        match &self.zone {
            Zone::Fixed(offset) => *offset,
            Zone::Resolved { resolve, last } => match resolve(instant) {
                Some(offset) => {
                    last.store(offset.whole_seconds(), Ordering::Relaxed);
                    offset
                }
                None => UtcOffset::from_whole_seconds(last.load(Ordering::Relaxed)).unwrap_or(UtcOffset::UTC),
            },
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl TimeProvider for SystemClock {
    fn now(&self) -> OffsetDateTime {
        let now = OffsetDateTime::now_utc();
        now.to_offset(self.offset_at(now))
    }
}

#[cfg(test)]
mod tests {
    use time::macros::offset;

    use super::*;

    #[test]
    fn test_system_clock_uses_configured_offset() {
        let clock = SystemClock::with_offset(offset!(+2));
        assert_eq!(clock.now().offset(), offset!(+2));
    }

    // Offset in hours handed out by `switching_zone`; 99 means unknown.
    static ZONE_HOURS: AtomicI32 = AtomicI32::new(1);

    fn switching_zone(_: OffsetDateTime) -> Option<UtcOffset> {
        match ZONE_HOURS.load(Ordering::SeqCst) {
            99 => None,
            hours => UtcOffset::from_hms(hours as i8, 0, 0).ok(),
        }
    }

    #[test]
    fn test_system_clock_follows_offset_changes() {
        ZONE_HOURS.store(1, Ordering::SeqCst);
        let clock = SystemClock::with_resolver(switching_zone);
        assert_eq!(clock.now().offset(), offset!(+1));

        // Daylight saving starts
        ZONE_HOURS.store(2, Ordering::SeqCst);
        assert_eq!(clock.now().offset(), offset!(+2));

        // Lookup refused, the last known offset stays
        ZONE_HOURS.store(99, Ordering::SeqCst);
        assert_eq!(clock.now().offset(), offset!(+2));
    }

    #[test]
    fn test_unknown_zone_falls_back_to_utc() {
        let clock = SystemClock::with_resolver(|_| None);
        assert_eq!(clock.now().offset(), UtcOffset::UTC);
    }
}
