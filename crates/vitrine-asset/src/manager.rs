//! Batch progress tracking

use crate::error::AssetLoadError;
use crate::loader::AssetKey;
use std::collections::HashSet;

/// Notification produced while a batch resolves
#[derive(Debug, Clone, PartialEq)]
pub enum LoadEvent {
    /// A request failed; it still counts as resolved
    Failed(AssetLoadError),
    Progress {
        url: String,
        loaded: usize,
        total: usize,
    },
    /// Every tracked request resolved; emitted once per batch
    Completed,
}

/// Aggregates per-request resolutions into progress and one completion.
///
/// All requests must be tracked before the first one resolves, otherwise
/// `loaded == total` could be reached early.
#[derive(Debug, Default)]
pub struct LoadingManager {
    pending: HashSet<AssetKey>,
    total: usize,
    loaded: usize,
    completed: bool,
}

impl LoadingManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a request. Returns false for a key already tracked.
    pub fn track(&mut self, key: AssetKey) -> bool {
        if self.completed || !self.pending.insert(key) {
            return false;
        }
        self.total += 1;
        true
    }

    /// Record that `key` finished, successfully or with `error`.
    ///
    /// Unknown and already-resolved keys produce no events.
    pub fn resolve(
        &mut self,
        key: AssetKey,
        url: &str,
        error: Option<AssetLoadError>,
    ) -> Vec<LoadEvent> {
        if !self.pending.remove(&key) {
            tracing::debug!("Ignoring resolution for untracked asset {}", key);
            return Vec::new();
        }

        let mut events = Vec::with_capacity(3);
        if let Some(err) = error {
            events.push(LoadEvent::Failed(err));
        }

        self.loaded += 1;
        events.push(LoadEvent::Progress {
            url: url.to_string(),
            loaded: self.loaded,
            total: self.total,
        });

        if self.loaded == self.total && !self.completed {
            self.completed = true;
            events.push(LoadEvent::Completed);
        }

        events
    }

    /// Whole-number percentage in [0, 100]
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return if self.completed { 100 } else { 0 };
        }
        ((self.loaded * 100) / self.total) as u8
    }

    pub fn loaded(&self) -> usize {
        self.loaded
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_complete(&self) -> bool {
        self.completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vitrine_core::CharacterSlot;

    fn character(i: usize) -> AssetKey {
        AssetKey::Character(CharacterSlot::ALL[i])
    }

    fn tracked_batch() -> LoadingManager {
        let mut manager = LoadingManager::new();
        manager.track(AssetKey::Background);
        for i in 0..3 {
            manager.track(character(i));
        }
        manager
    }

    #[test]
    fn progress_is_monotonic_and_completes_once() {
        let mut manager = tracked_batch();
        let mut last = manager.percent();
        let mut completions = 0;
        let mut hundreds = 0;

        for key in [character(2), AssetKey::Background, character(0), character(1)] {
            let events = manager.resolve(key, "x", None);
            completions += events
                .iter()
                .filter(|e| matches!(e, LoadEvent::Completed))
                .count();
            let pct = manager.percent();
            assert!(pct >= last);
            if pct == 100 && last != 100 {
                hundreds += 1;
            }
            last = pct;
        }

        assert_eq!(completions, 1);
        assert_eq!(hundreds, 1);
        assert!(manager.is_complete());
    }

    #[test]
    fn failures_count_as_resolved() {
        let mut manager = LoadingManager::new();
        manager.track(AssetKey::Background);
        manager.track(AssetKey::BackgroundTexture);

        let err = AssetLoadError::new("/models/nebula_field.hdr", "not found");
        let events = manager.resolve(AssetKey::BackgroundTexture, "tex", Some(err.clone()));
        assert_eq!(events[0], LoadEvent::Failed(err));
        assert_eq!(manager.percent(), 50);

        let events = manager.resolve(AssetKey::Background, "bg", None);
        assert_eq!(events.last(), Some(&LoadEvent::Completed));
    }

    #[test]
    fn duplicate_and_unknown_resolutions_are_ignored() {
        let mut manager = tracked_batch();
        assert!(!manager.track(AssetKey::Background));
        assert_eq!(manager.total(), 4);

        assert_eq!(manager.resolve(character(0), "a", None).len(), 1);
        assert!(manager.resolve(character(0), "a", None).is_empty());
        assert!(manager.resolve(AssetKey::MarkerModel, "m", None).is_empty());
        assert_eq!(manager.loaded(), 1);
    }

    #[test]
    fn progress_event_carries_counts() {
        let mut manager = tracked_batch();
        let events = manager.resolve(character(1), "/glb/typing.glb", None);
        assert_eq!(
            events,
            vec![LoadEvent::Progress {
                url: "/glb/typing.glb".to_string(),
                loaded: 1,
                total: 4
            }]
        );
    }
}
