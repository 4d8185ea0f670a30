use crate::data::filter::TimeMode;

// ---------------------------------------------------------------------------
// Interaction counter
// ---------------------------------------------------------------------------

/// Session-scoped count of time-mode changes.
///
/// Held by the host's session state and threaded through explicitly; the
/// first observed mode counts as a change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionState {
    pub count: u64,
    pub last_mode: Option<TimeMode>,
}

impl InteractionState {
    /// Record the currently active mode. Increments only when it differs
    /// from the last one seen, so redundant repaints never double count.
    #[must_use]
    pub fn record_mode_change(self, current: TimeMode) -> Self {
        if self.last_mode == Some(current) {
            return self;
        }
        log::debug!("time mode changed: {:?} -> {current:?}", self.last_mode);
        InteractionState {
            count: self.count + 1,
            last_mode: Some(current),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::TimeMode::*;

    fn counts(modes: &[TimeMode]) -> Vec<u64> {
        let mut state = InteractionState::default();
        modes
            .iter()
            .map(|&m| {
                state = state.record_mode_change(m);
                state.count
            })
            .collect()
    }

    #[test]
    fn starts_unset() {
        let s = InteractionState::default();
        assert_eq!(s.count, 0);
        assert_eq!(s.last_mode, None);
    }

    #[test]
    fn first_observation_counts() {
        let s = InteractionState::default().record_mode_change(HourRange);
        assert_eq!(s.count, 1);
        assert_eq!(s.last_mode, Some(HourRange));
    }

    #[test]
    fn mode_sequence() {
        assert_eq!(
            counts(&[AnyTime, AnyTime, SingleHour, SingleHour, AnyTime]),
            vec![1, 1, 2, 2, 3]
        );
    }

    #[test]
    fn repeated_mode_is_idempotent() {
        let once = InteractionState::default().record_mode_change(SingleHour);
        let twice = once.record_mode_change(SingleHour);
        assert_eq!(once, twice);
    }

    #[test]
    fn count_never_decreases() {
        let seq = [HourRange, AnyTime, AnyTime, HourRange, SingleHour, SingleHour, AnyTime];
        let c = counts(&seq);
        assert!(c.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*c.last().unwrap(), 5);
    }
}
