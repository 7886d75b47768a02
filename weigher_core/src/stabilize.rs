//! Debounced stability detection over a stream of weight readings.

use std::time::{Duration, Instant};

/// Observable pipeline output: every accepted reading either changes the
/// displayed weight or contributes to declaring it stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightEvent {
    /// The weight differs from the previous reading.
    Changed(i32),
    /// The weight has held unchanged for the full stabilization window and
    /// has not already been announced as stable.
    Stabilized(i32),
}

#[derive(Debug)]
pub struct StabilizationTracker {
    last_weight: Option<i32>,
    last_change_at: Instant,
    last_stable_weight: Option<i32>,
    window: Duration,
}

impl StabilizationTracker {
    pub fn new(cfg: &crate::StabilizeCfg, now: Instant) -> Self {
        Self {
            last_weight: None,
            last_change_at: now,
            last_stable_weight: None,
            window: cfg.window,
        }
    }

    /// Feed one reading; returns the event it produced, if any.
    ///
    /// Any change resets the stabilization timer, including a change back to
    /// a value that was previously announced stable. An unchanged weight is
    /// announced stable once the window elapses, and never re-announced
    /// until a different weight has been seen stabilizing in between.
    pub fn observe(&mut self, weight_kg: i32, observed_at: Instant) -> Option<WeightEvent> {
        if self.last_weight != Some(weight_kg) {
            self.last_weight = Some(weight_kg);
            self.last_change_at = observed_at;
            return Some(WeightEvent::Changed(weight_kg));
        }

        let elapsed = observed_at.saturating_duration_since(self.last_change_at);
        if elapsed >= self.window && self.last_stable_weight != Some(weight_kg) {
            self.last_stable_weight = Some(weight_kg);
            return Some(WeightEvent::Stabilized(weight_kg));
        }
        tracing::trace!(
            weight_kg,
            elapsed_ms = elapsed.as_millis() as u64,
            "weight unchanged"
        );
        None
    }

    pub fn last_stable_weight(&self) -> Option<i32> {
        self.last_stable_weight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StabilizeCfg;

    fn tracker(t0: Instant) -> StabilizationTracker {
        StabilizationTracker::new(&StabilizeCfg::default(), t0)
    }

    #[test]
    fn first_reading_is_a_change() {
        let t0 = Instant::now();
        let mut tr = tracker(t0);
        assert_eq!(tr.observe(0, t0), Some(WeightEvent::Changed(0)));
    }

    #[test]
    fn change_resets_the_window() {
        let t0 = Instant::now();
        let mut tr = tracker(t0);
        tr.observe(10, t0);
        // 2s of 10, then a change; the old elapsed time must not count
        // toward stabilizing the new value.
        assert_eq!(tr.observe(10, t0 + Duration::from_secs(2)), None);
        assert_eq!(
            tr.observe(20, t0 + Duration::from_millis(2500)),
            Some(WeightEvent::Changed(20))
        );
        assert_eq!(tr.observe(20, t0 + Duration::from_secs(4)), None);
        assert_eq!(
            tr.observe(20, t0 + Duration::from_millis(5500)),
            Some(WeightEvent::Stabilized(20))
        );
    }
}
