//! Reference-counted loading indicator.
//!
//! # Design
//! Concurrent requests share one overlay. Each request holds a
//! `LoadingGuard`; the overlay is shown when the first guard is taken and
//! hidden when the last one is dropped. Because release happens in `Drop`,
//! it also runs when a request returns early, panics, or its future is
//! dropped mid-flight.

use std::sync::{Arc, Mutex, PoisonError};

use crate::feedback::LoadingIndicator;

pub struct LoadingTracker {
    indicator: Arc<dyn LoadingIndicator>,
    open: Mutex<usize>,
}

impl LoadingTracker {
    pub fn new(indicator: Arc<dyn LoadingIndicator>) -> Self {
        Self {
            indicator,
            open: Mutex::new(0),
        }
    }

    /// Register an in-flight request, showing the indicator on 0 → 1.
    pub fn acquire(self: &Arc<Self>) -> LoadingGuard {
        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        *open += 1;
        if *open == 1 {
            self.indicator.show();
        }
        LoadingGuard {
            tracker: Arc::clone(self),
        }
    }

    pub fn open_count(&self) -> usize {
        *self.open.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self) {
        let mut open = self.open.lock().unwrap_or_else(PoisonError::into_inner);
        *open = open.saturating_sub(1);
        if *open == 0 {
            self.indicator.hide();
        }
    }
}

impl std::fmt::Debug for LoadingTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingTracker").field("open", &self.open_count()).finish()
    }
}

/// One request's hold on the loading indicator. Released exactly once, on drop.
#[must_use = "dropping the guard immediately hides the indicator"]
pub struct LoadingGuard {
    tracker: Arc<LoadingTracker>,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.tracker.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingIndicator;

    fn tracker() -> (Arc<RecordingIndicator>, Arc<LoadingTracker>) {
        let indicator = Arc::new(RecordingIndicator::default());
        let tracker = Arc::new(LoadingTracker::new(indicator.clone()));
        (indicator, tracker)
    }

    #[test]
    fn single_request_shows_then_hides() {
        let (indicator, tracker) = tracker();
        let guard = tracker.acquire();
        assert_eq!(indicator.shows(), 1);
        assert!(indicator.visible());
        drop(guard);
        assert_eq!(indicator.hides(), 1);
        assert!(!indicator.visible());
        assert_eq!(tracker.open_count(), 0);
    }

    #[test]
    fn overlapping_requests_share_one_indicator() {
        let (indicator, tracker) = tracker();
        let first = tracker.acquire();
        let second = tracker.acquire();
        assert_eq!(indicator.shows(), 1);
        assert_eq!(tracker.open_count(), 2);

        drop(first);
        assert!(indicator.visible(), "still one request in flight");
        assert_eq!(indicator.hides(), 0);

        drop(second);
        assert_eq!(indicator.hides(), 1);
        assert!(!indicator.visible());
    }

    #[test]
    fn guard_released_on_panic() {
        let (indicator, tracker) = tracker();
        let t = Arc::clone(&tracker);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
            let _guard = t.acquire();
            panic!("interceptor blew up");
        }));
        assert!(result.is_err());
        assert_eq!(tracker.open_count(), 0);
        assert_eq!(indicator.hides(), 1);
    }

    #[test]
    fn indicator_shown_again_after_idle() {
        let (indicator, tracker) = tracker();
        drop(tracker.acquire());
        drop(tracker.acquire());
        assert_eq!(indicator.shows(), 2);
        assert_eq!(indicator.hides(), 2);
    }
}
