use crate::{Millis, MS_PER_MINUTE, MS_PER_SECOND};

/// Fixed decrement applied on every timer tick. Cadence drift is not
/// corrected against the end instant.
pub const TICK_MS: Millis = MS_PER_SECOND;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimerState {
    Idle,
    Running,
    Paused,
}

/// Observable phase, folding the overtime flag into the running state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    Overtime,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Toggled {
    Started,
    Paused,
}

/// Countdown that keeps running past zero into negative overtime.
#[derive(Debug)]
pub struct CountdownTimer {
    state: TimerState,
    remaining_ms: Millis,
    configured_ms: Millis,
    overtime: bool,
    end_at_ms: Option<u64>,
}

impl CountdownTimer {
    pub fn new(configured_ms: Millis) -> Self {
        let configured_ms = configured_ms.max(0);
        Self {
            state: TimerState::Idle,
            remaining_ms: configured_ms,
            configured_ms,
            overtime: false,
            end_at_ms: None,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn phase(&self) -> TimerPhase {
        match self.state {
            TimerState::Running if self.overtime => TimerPhase::Overtime,
            TimerState::Running => TimerPhase::Running,
            TimerState::Paused => TimerPhase::Paused,
            TimerState::Idle => TimerPhase::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn is_overtime(&self) -> bool {
        self.overtime
    }

    pub fn remaining_ms(&self) -> Millis {
        self.remaining_ms
    }

    pub fn configured_ms(&self) -> Millis {
        self.configured_ms
    }

    /// Projected end instant; set while running and after a pause.
    pub fn end_at_ms(&self) -> Option<u64> {
        self.end_at_ms
    }

    /// Applies a freshly normalized duration while the timer is not running.
    /// The new duration starts a fresh countdown, so any overtime ends here.
    /// Returns true when this resolved an overtime.
    pub fn configure(&mut self, configured_ms: Millis) -> bool {
        if self.is_running() {
            return false;
        }
        self.configured_ms = configured_ms.max(0);
        self.remaining_ms = self.configured_ms;
        self.end_at_ms = None;
        std::mem::replace(&mut self.overtime, false)
    }

    pub fn toggle(&mut self, now_ms: u64) -> Toggled {
        let toggled = match self.state {
            TimerState::Idle | TimerState::Paused => {
                self.state = TimerState::Running;
                Toggled::Started
            }
            TimerState::Running => {
                self.state = TimerState::Paused;
                Toggled::Paused
            }
        };
        self.end_at_ms = Some(project(now_ms, self.remaining_ms));
        log::debug!("timer {:?} with {}ms remaining", toggled, self.remaining_ms);
        toggled
    }

    /// One 1-second tick. Returns true exactly when this tick crossed into
    /// overtime.
    pub fn tick(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        let entered = self.remaining_ms <= 0 && !self.overtime;
        if entered {
            self.overtime = true;
            log::debug!("timer entered overtime");
        }
        self.remaining_ms = self.remaining_ms.saturating_sub(TICK_MS);
        log::trace!("timer tick: {}", self.remaining_ms);
        entered
    }

    /// Back to idle with a duration recomputed from the input fields.
    pub fn reset(&mut self, configured_ms: Millis) {
        self.state = TimerState::Idle;
        self.overtime = false;
        self.end_at_ms = None;
        self.configured_ms = configured_ms.max(0);
        self.remaining_ms = self.configured_ms;
    }

    /// Adds (or removes) whole minutes. Returns true when this resolved an
    /// overtime.
    pub fn extend(&mut self, minutes: i64, now_ms: u64) -> bool {
        self.remaining_ms = self
            .remaining_ms
            .saturating_add(minutes.saturating_mul(MS_PER_MINUTE));
        let resolved = self.overtime && self.remaining_ms > 0;
        if resolved {
            self.overtime = false;
        }
        self.end_at_ms = Some(project(now_ms, self.remaining_ms));
        log::debug!("timer extended by {}min to {}ms", minutes, self.remaining_ms);
        resolved
    }
}

fn project(now_ms: u64, remaining_ms: Millis) -> u64 {
    if remaining_ms >= 0 {
        now_ms.saturating_add(remaining_ms as u64)
    } else {
        now_ms.saturating_sub(remaining_ms.unsigned_abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_countdown_basic() {
        let mut cd = CountdownTimer::new(10_000);
        assert_eq!(cd.phase(), TimerPhase::Idle);
        assert_eq!(cd.remaining_ms(), 10_000);

        assert_eq!(cd.toggle(1000), Toggled::Started);
        assert_eq!(cd.end_at_ms(), Some(11_000));
        assert_eq!(cd.phase(), TimerPhase::Running);

        for _ in 0..5 {
            assert!(!cd.tick());
        }
        assert_eq!(cd.remaining_ms(), 5_000);

        assert_eq!(cd.toggle(9000), Toggled::Paused);
        assert_eq!(cd.phase(), TimerPhase::Paused);
        assert_eq!(cd.end_at_ms(), Some(14_000));
        assert!(!cd.tick());
        assert_eq!(cd.remaining_ms(), 5_000);
    }

    #[test]
    fn test_overtime_entered_once() {
        let mut cd = CountdownTimer::new(5_000);
        cd.toggle(0);
        let crossings = (0..6).filter(|_| cd.tick()).count();
        assert_eq!(crossings, 1);
        assert_eq!(cd.remaining_ms(), -1_000);
        assert!(cd.is_overtime());
        assert_eq!(cd.phase(), TimerPhase::Overtime);

        // Keeps counting down
        assert!(!cd.tick());
        assert_eq!(cd.remaining_ms(), -2_000);
    }

    #[test]
    fn test_zero_duration_still_runs() {
        let mut cd = CountdownTimer::new(0);
        assert_eq!(cd.toggle(0), Toggled::Started);
        assert!(cd.tick());
        assert_eq!(cd.remaining_ms(), -1_000);
    }

    #[test]
    fn test_extend_clears_overtime() {
        let mut cd = CountdownTimer::new(0);
        cd.toggle(0);
        cd.tick();
        assert_eq!(cd.remaining_ms(), -1_000);

        assert!(cd.extend(5, 2_000));
        assert_eq!(cd.remaining_ms(), 299_000);
        assert!(!cd.is_overtime());
        assert_eq!(cd.end_at_ms(), Some(301_000));
    }

    #[test]
    fn test_extend_not_enough_keeps_overtime() {
        let mut cd = CountdownTimer::new(0);
        cd.toggle(0);
        for _ in 0..120 {
            cd.tick();
        }
        assert_eq!(cd.remaining_ms(), -120_000);
        assert!(!cd.extend(1, 200_000));
        assert!(cd.is_overtime());
        assert_eq!(cd.remaining_ms(), -60_000);
        assert_eq!(cd.end_at_ms(), Some(140_000));
    }

    #[test]
    fn test_negative_extend() {
        let mut cd = CountdownTimer::new(120_000);
        cd.extend(-1, 0);
        assert_eq!(cd.remaining_ms(), 60_000);
    }

    #[test]
    fn test_reset_uses_new_configuration() {
        let mut cd = CountdownTimer::new(5_000);
        cd.toggle(0);
        for _ in 0..7 {
            cd.tick();
        }
        cd.reset(30_000);
        assert_eq!(cd.phase(), TimerPhase::Idle);
        assert_eq!(cd.remaining_ms(), 30_000);
        assert!(!cd.is_overtime());
        assert_eq!(cd.end_at_ms(), None);
    }

    #[test]
    fn test_configure_ignored_while_running() {
        let mut cd = CountdownTimer::new(5_000);
        cd.toggle(0);
        assert!(!cd.configure(60_000));
        assert_eq!(cd.configured_ms(), 5_000);

        cd.toggle(100);
        cd.configure(60_000);
        assert_eq!(cd.remaining_ms(), 60_000);
        assert_eq!(cd.state(), TimerState::Paused);
    }

    #[test]
    fn test_configure_zero_ends_overtime() {
        let mut cd = CountdownTimer::new(1_000);
        cd.toggle(0);
        cd.tick();
        assert!(cd.tick());
        cd.toggle(2_000);

        assert!(cd.configure(0));
        assert!(!cd.is_overtime());
        assert_eq!(cd.remaining_ms(), 0);

        // The fresh zero-length countdown crosses again
        cd.toggle(3_000);
        assert!(cd.tick());
        assert!(cd.is_overtime());
    }
}
