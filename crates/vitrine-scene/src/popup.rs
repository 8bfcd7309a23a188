//! Popup visibility state machine and the clock it runs on

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};
use vitrine_core::CharacterSlot;

/// How long the exit transition runs before the selection is cleared
pub const CLOSE_DELAY: Duration = Duration::from_millis(300);

/// Monotonic time source
pub trait Clock {
    /// Time since an arbitrary fixed origin
    fn now(&self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for Rc<C> {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Wall clock, measured from construction
#[derive(Debug, Clone, Copy)]
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
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Manually advanced clock for tests and replays
#[derive(Debug, Default)]
pub struct FakeClock {
    now: Cell<Duration>,
}

impl FakeClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Clock for FakeClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

/// Which content panel a slot opens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Skills,
    Intro,
    Gallery,
}

impl Panel {
    pub fn for_slot(slot: CharacterSlot) -> Self {
        match slot {
            CharacterSlot::Sleeping => Panel::Skills,
            CharacterSlot::Typing => Panel::Intro,
            CharacterSlot::Banging => Panel::Gallery,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PopupState {
    #[default]
    Hidden,
    Visible(CharacterSlot),
    /// Exit transition running since `since`
    Closing { slot: CharacterSlot, since: Duration },
}

#[derive(Debug, Clone, Default)]
pub struct Popup {
    state: PopupState,
}

impl Popup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PopupState {
        self.state
    }

    /// Show `slot`'s panel; also cancels a running exit transition
    pub fn show(&mut self, slot: CharacterSlot) {
        self.state = PopupState::Visible(slot);
    }

    /// Start the exit transition. Does nothing unless visible.
    pub fn close(&mut self, now: Duration) {
        if let PopupState::Visible(slot) = self.state {
            self.state = PopupState::Closing { slot, since: now };
        }
    }

    /// Finish an exit transition that has run for `CLOSE_DELAY`.
    ///
    /// Returns true exactly when the popup becomes hidden, which is when
    /// the selection should be cleared.
    pub fn tick(&mut self, now: Duration) -> bool {
        match self.state {
            PopupState::Closing { since, .. } if now.saturating_sub(since) >= CLOSE_DELAY => {
                self.state = PopupState::Hidden;
                true
            }
            _ => false,
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self.state, PopupState::Visible(_))
    }

    /// Panel to draw, including while it fades out
    pub fn panel(&self) -> Option<Panel> {
        match self.state {
            PopupState::Hidden => None,
            PopupState::Visible(slot) | PopupState::Closing { slot, .. } => Some(Panel::for_slot(slot)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_to_panel_mapping() {
        assert_eq!(Panel::for_slot(CharacterSlot::Sleeping), Panel::Skills);
        assert_eq!(Panel::for_slot(CharacterSlot::Typing), Panel::Intro);
        assert_eq!(Panel::for_slot(CharacterSlot::Banging), Panel::Gallery);
    }

    #[test]
    fn close_waits_for_delay() {
        let clock = FakeClock::new();
        let mut popup = Popup::new();
        popup.show(CharacterSlot::Typing);
        assert!(popup.is_visible());

        popup.close(clock.now());
        assert!(!popup.is_visible());
        assert_eq!(popup.panel(), Some(Panel::Intro));

        clock.advance(Duration::from_millis(299));
        assert!(!popup.tick(clock.now()));

        clock.advance(Duration::from_millis(1));
        assert!(popup.tick(clock.now()));
        assert_eq!(popup.state(), PopupState::Hidden);
        assert!(!popup.tick(clock.now()));
    }

    #[test]
    fn reopening_cancels_close() {
        let clock = FakeClock::new();
        let mut popup = Popup::new();
        popup.show(CharacterSlot::Sleeping);
        popup.close(clock.now());
        popup.show(CharacterSlot::Banging);
        clock.advance(Duration::from_secs(1));
        assert!(!popup.tick(clock.now()));
        assert_eq!(popup.panel(), Some(Panel::Gallery));
    }

    #[test]
    fn closing_hidden_popup_is_noop() {
        let mut popup = Popup::new();
        popup.close(Duration::ZERO);
        assert_eq!(popup.state(), PopupState::Hidden);
    }

    #[test]
    fn rc_clock_shares_time() {
        let clock = Rc::new(FakeClock::new());
        let shared: Box<dyn Clock> = Box::new(Rc::clone(&clock));
        clock.advance(Duration::from_millis(42));
        assert_eq!(shared.now(), Duration::from_millis(42));
    }
}
