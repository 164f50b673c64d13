use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

/// Millisecond-resolution time source consumed by the session engine.
///
/// The engine never reads the wall clock directly; deadlines are compared
/// against whatever `Clock` it was constructed with, so tests can drive
/// time by hand.
pub trait Clock {
    /// Current time in milliseconds from an arbitrary fixed epoch.
    fn now_ms(&self) -> u64;
}

/// Production clock backed by `std::time::Instant`.
#[derive(Debug)]
pub struct SystemClock {
    start: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

/// Hand-driven clock for deterministic tests. Clones share the same
/// underlying time, so a test keeps one handle while the engine owns
/// another.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    current_ms: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_ms(&self, ms: u64) {
        self.current_ms.set(ms);
    }

    pub fn advance_ms(&self, delta: u64) {
        self.current_ms.set(self.current_ms.get() + delta);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.current_ms.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_starts_at_zero() {
        let clock = ManualClock::new();
        assert_eq!(clock.now_ms(), 0);
    }

    #[test]
    fn manual_clock_advance_accumulates() {
        let clock = ManualClock::new();
        clock.advance_ms(1_000);
        assert_eq!(clock.now_ms(), 1_000);
        clock.advance_ms(500);
        assert_eq!(clock.now_ms(), 1_500);
    }

    #[test]
    fn manual_clock_set_overrides() {
        let clock = ManualClock::new();
        clock.advance_ms(300);
        clock.set_ms(5_000);
        assert_eq!(clock.now_ms(), 5_000);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let handle = clock.clone();
        handle.advance_ms(250);
        assert_eq!(clock.now_ms(), 250);
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let t1 = clock.now_ms();
        let t2 = clock.now_ms();
        assert!(t2 >= t1);
    }
}
