//! Debounced switching between the stopwatch and timer views.
//!
//! A transition walks fade-out → swap → fade-in → settled. While one is in
//! flight, requests only overwrite a single queued target, so the latest
//! request wins.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Mode {
    Stopwatch,
    Timer,
}

impl Mode {
    pub fn label(self) -> &'static str {
        match self {
            Mode::Stopwatch => "Stopwatch",
            Mode::Timer => "Timer",
        }
    }
}

/// Where an in-flight transition is waiting.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    /// Old view fading out; the swap comes next.
    FadingOut,
    /// Active flags swapped; the fade-in comes next.
    Swapped,
    /// New view fading in; settling comes next.
    FadingIn,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Transition {
    pub from: Mode,
    pub to: Mode,
    pub phase: Phase,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SwitchRequest {
    /// Target already active.
    Ignored,
    /// A transition is in flight; the target replaced any earlier queued one.
    Queued,
    Started(Transition),
}

/// Result of advancing the in-flight transition by one phase.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Step {
    Swapped(Transition),
    FadingIn(Transition),
    /// Transition done; `next` is the queued one that started in its place.
    Settled { to: Mode, next: Option<Transition> },
    Idle,
}

/// Presentation delays between phases. Not a correctness contract.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct TransitionDelays {
    pub before_swap_ms: u64,
    pub before_fade_in_ms: u64,
    pub before_settle_ms: u64,
}

impl Default for TransitionDelays {
    fn default() -> Self {
        Self {
            before_swap_ms: 60,
            before_fade_in_ms: 15,
            before_settle_ms: 200,
        }
    }
}

impl TransitionDelays {
    /// How long to wait in `phase` before advancing.
    pub fn after(&self, phase: Phase) -> u64 {
        match phase {
            Phase::FadingOut => self.before_swap_ms,
            Phase::Swapped => self.before_fade_in_ms,
            Phase::FadingIn => self.before_settle_ms,
        }
    }
}

#[derive(Debug)]
pub struct ModeSwitcher {
    active: Mode,
    transition: Option<Transition>,
    queued: Option<Mode>,
}

impl ModeSwitcher {
    pub fn new(active: Mode) -> Self {
        Self {
            active,
            transition: None,
            queued: None,
        }
    }

    pub fn active(&self) -> Mode {
        self.active
    }

    pub fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub fn transition(&self) -> Option<Transition> {
        self.transition
    }

    pub fn queued(&self) -> Option<Mode> {
        self.queued
    }

    pub fn request(&mut self, target: Mode) -> SwitchRequest {
        if self.transition.is_some() {
            self.queued = Some(target);
            log::debug!("switch to {:?} queued", target);
            return SwitchRequest::Queued;
        }
        if target == self.active {
            return SwitchRequest::Ignored;
        }
        SwitchRequest::Started(self.begin(target))
    }

    fn begin(&mut self, target: Mode) -> Transition {
        let transition = Transition {
            from: self.active,
            to: target,
            phase: Phase::FadingOut,
        };
        self.transition = Some(transition);
        log::debug!("switching {:?} -> {:?}", transition.from, transition.to);
        transition
    }

    pub fn advance(&mut self) -> Step {
        let Some(mut transition) = self.transition else {
            return Step::Idle;
        };
        match transition.phase {
            Phase::FadingOut => {
                self.active = transition.to;
                transition.phase = Phase::Swapped;
                self.transition = Some(transition);
                Step::Swapped(transition)
            }
            Phase::Swapped => {
                transition.phase = Phase::FadingIn;
                self.transition = Some(transition);
                Step::FadingIn(transition)
            }
            Phase::FadingIn => {
                self.transition = None;
                let next = match self.queued.take() {
                    Some(target) if target != self.active => Some(self.begin(target)),
                    _ => None,
                };
                Step::Settled {
                    to: transition.to,
                    next,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(sw: &mut ModeSwitcher) -> Vec<Mode> {
        let mut actives = Vec::new();
        while sw.is_transitioning() {
            sw.advance();
            actives.push(sw.active());
        }
        actives
    }

    #[test]
    fn test_three_phases_in_order() {
        let mut sw = ModeSwitcher::new(Mode::Stopwatch);
        let SwitchRequest::Started(t) = sw.request(Mode::Timer) else {
            panic!("switch did not start");
        };
        assert_eq!(t.phase, Phase::FadingOut);
        assert_eq!(sw.active(), Mode::Stopwatch);

        assert!(matches!(sw.advance(), Step::Swapped(t) if t.to == Mode::Timer));
        assert_eq!(sw.active(), Mode::Timer);
        assert!(matches!(sw.advance(), Step::FadingIn(_)));
        assert_eq!(sw.advance(), Step::Settled { to: Mode::Timer, next: None });
        assert!(!sw.is_transitioning());
        assert_eq!(sw.advance(), Step::Idle);
    }

    #[test]
    fn test_switch_to_active_is_noop() {
        let mut sw = ModeSwitcher::new(Mode::Timer);
        assert_eq!(sw.request(Mode::Timer), SwitchRequest::Ignored);
        assert!(!sw.is_transitioning());
    }

    #[test]
    fn test_latest_queued_request_wins() {
        let mut sw = ModeSwitcher::new(Mode::Stopwatch);
        assert!(matches!(sw.request(Mode::Timer), SwitchRequest::Started(_)));
        assert_eq!(sw.request(Mode::Stopwatch), SwitchRequest::Queued);
        assert_eq!(sw.request(Mode::Timer), SwitchRequest::Queued);
        assert_eq!(sw.queued(), Some(Mode::Timer));

        let actives = settle(&mut sw);
        assert_eq!(sw.active(), Mode::Timer);
        // Never flips back to the stopwatch
        assert!(actives.iter().all(|&m| m == Mode::Timer));
        assert_eq!(sw.queued(), None);
    }

    #[test]
    fn test_queued_different_target_runs_next() {
        let mut sw = ModeSwitcher::new(Mode::Stopwatch);
        sw.request(Mode::Timer);
        sw.advance();
        sw.request(Mode::Stopwatch);
        sw.advance();

        match sw.advance() {
            Step::Settled { to, next: Some(next) } => {
                assert_eq!(to, Mode::Timer);
                assert_eq!(next.from, Mode::Timer);
                assert_eq!(next.to, Mode::Stopwatch);
            }
            other => panic!("unexpected step {:?}", other),
        }
        settle(&mut sw);
        assert_eq!(sw.active(), Mode::Stopwatch);
    }

    #[test]
    fn test_default_delays() {
        let d = TransitionDelays::default();
        assert_eq!(d.after(Phase::FadingOut), 60);
        assert_eq!(d.after(Phase::Swapped), 15);
        assert_eq!(d.after(Phase::FadingIn), 200);
    }
}
