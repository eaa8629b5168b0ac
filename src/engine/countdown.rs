/// Per-item countdown owned by the engine.
///
/// Reaching zero stops the countdown but never finalizes the item; that stays
/// an explicit host action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Countdown {
    remaining: u32,
    running: bool,
}

impl Countdown {
    pub fn new(remaining: u32, running: bool) -> Self {
        Self {
            remaining,
            running: running && remaining > 0,
        }
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn start(&mut self) {
        self.running = self.remaining > 0;
    }

    pub(crate) fn stop(&mut self) {
        self.running = false;
    }

    /// Restore the full duration without touching the running flag
    pub(crate) fn reset(&mut self, seconds: u32) {
        self.remaining = seconds;
    }

    /// Advance one tick. Returns whether anything changed.
    pub(crate) fn tick(&mut self) -> bool {
        if !self.running {
            return false;
        }

        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining == 0 {
            self.running = false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_only_while_running() {
        let mut countdown = Countdown::new(3, false);
        assert!(!countdown.tick());
        assert_eq!(countdown.remaining(), 3);

        countdown.start();
        assert!(countdown.tick());
        assert_eq!(countdown.remaining(), 2);
    }

    #[test]
    fn test_reaching_zero_stops() {
        let mut countdown = Countdown::new(2, true);
        countdown.tick();
        countdown.tick();

        assert_eq!(countdown.remaining(), 0);
        assert!(!countdown.is_running());
        assert!(!countdown.tick());
    }

    #[test]
    fn test_reset_keeps_running_flag() {
        let mut countdown = Countdown::new(5, false);
        countdown.reset(60);
        assert_eq!(countdown.remaining(), 60);
        assert!(!countdown.is_running());

        countdown.start();
        countdown.reset(30);
        assert!(countdown.is_running());
    }

    #[test]
    fn test_cannot_start_at_zero() {
        let mut countdown = Countdown::new(0, true);
        assert!(!countdown.is_running());

        countdown.start();
        assert!(!countdown.is_running());
    }
}
