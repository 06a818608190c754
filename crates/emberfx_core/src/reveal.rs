//! One-shot reveal-on-scroll bookkeeping.
//!
//! Generic over the element handle so the browser glue can track DOM
//! elements directly while tests use plain ids.

use tracing::debug;

use crate::config::RevealConfig;

/// How tagged elements get revealed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RevealMode {
    /// Wait for each element to intersect the viewport.
    Observe {
        /// Visible fraction that triggers the reveal.
        threshold: f32,
    },
    /// Reveal everything at once (reduced motion or no observer).
    Immediate,
}

impl RevealMode {
    /// Picks the mode for a host.
    #[must_use]
    pub fn select(config: &RevealConfig, reduced_motion: bool, observer_supported: bool) -> Self {
        if reduced_motion || !observer_supported {
            Self::Immediate
        } else {
            Self::Observe {
                threshold: config.threshold,
            }
        }
    }
}

/// Tracks which tagged elements are still waiting to be revealed.
#[derive(Debug, Clone)]
pub struct RevealTracker<K> {
    mode: RevealMode,
    pending: Vec<K>,
    revealed: usize,
}

impl<K: PartialEq + Clone> RevealTracker<K> {
    /// Starts tracking `elements`.
    pub fn new(
        elements: impl IntoIterator<Item = K>,
        config: &RevealConfig,
        reduced_motion: bool,
        observer_supported: bool,
    ) -> Self {
        let mode = RevealMode::select(config, reduced_motion, observer_supported);
        if mode == RevealMode::Immediate {
            debug!(reduced_motion, observer_supported, "reveal falls back to immediate");
        }
        Self {
            mode,
            pending: elements.into_iter().collect(),
            revealed: 0,
        }
    }

    /// Selected mode.
    #[must_use]
    pub fn mode(&self) -> RevealMode {
        self.mode
    }

    /// Elements to reveal right away. Empty unless the mode is immediate.
    pub fn initial_reveals(&mut self) -> Vec<K> {
        if self.mode != RevealMode::Immediate {
            return Vec::new();
        }
        self.revealed += self.pending.len();
        std::mem::take(&mut self.pending)
    }

    /// Handles one intersection report.
    ///
    /// Returns true the first time `element` intersects: the caller adds the
    /// visible class and stops observing it.
    pub fn on_intersection(&mut self, element: &K, is_intersecting: bool) -> bool {
        if !is_intersecting {
            return false;
        }
        match self.pending.iter().position(|pending| pending == element) {
            Some(index) => {
                self.pending.swap_remove(index);
                self.revealed += 1;
                true
            }
            None => false,
        }
    }

    /// Elements still waiting.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Elements revealed so far.
    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.revealed
    }

    /// Returns true once nothing is left to observe.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_element_revealed_once() {
        let mut tracker = RevealTracker::new([1, 2, 3], &RevealConfig::default(), false, true);
        assert!(tracker.initial_reveals().is_empty());

        assert!(!tracker.on_intersection(&2, false));
        assert!(tracker.on_intersection(&2, true));
        assert!(!tracker.on_intersection(&2, true));
        assert_eq!(tracker.pending_count(), 2);

        assert!(tracker.on_intersection(&1, true));
        assert!(tracker.on_intersection(&3, true));
        assert!(tracker.is_complete());
        assert_eq!(tracker.revealed_count(), 3);
    }

    #[test]
    fn test_unknown_element_ignored() {
        let mut tracker = RevealTracker::new([1], &RevealConfig::default(), false, true);
        assert!(!tracker.on_intersection(&9, true));
        assert_eq!(tracker.pending_count(), 1);
    }

    #[test]
    fn test_reduced_motion_reveals_all() {
        let mut tracker = RevealTracker::new(["a", "b"], &RevealConfig::default(), true, true);
        assert_eq!(tracker.mode(), RevealMode::Immediate);
        assert_eq!(tracker.initial_reveals(), vec!["a", "b"]);
        assert!(tracker.is_complete());
        assert!(tracker.initial_reveals().is_empty());
    }

    #[test]
    fn test_missing_observer_reveals_all() {
        let mut tracker = RevealTracker::new([7, 8], &RevealConfig::default(), false, false);
        assert_eq!(tracker.initial_reveals().len(), 2);
        assert_eq!(tracker.revealed_count(), 2);
    }

    #[test]
    fn test_observe_mode_uses_threshold() {
        let config = RevealConfig {
            threshold: 0.4,
            ..RevealConfig::default()
        };
        let tracker = RevealTracker::new([0], &config, false, true);
        assert_eq!(tracker.mode(), RevealMode::Observe { threshold: 0.4 });
    }
}
