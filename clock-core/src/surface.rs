//! Collaborator contracts the controller renders into.

use crate::input::DurationFields;
use crate::mode::Mode;
use crate::stopwatch::Lap;
use crate::Millis;

/// Remaining-time band, for colouring the timer text.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Urgency {
    Normal,
    /// Ten seconds or less left.
    Warning,
    Expired,
}

impl Urgency {
    pub const WARNING_MS: Millis = 10_000;

    pub fn of(remaining_ms: Millis) -> Self {
        if remaining_ms > Self::WARNING_MS {
            Urgency::Normal
        } else if remaining_ms > 0 {
            Urgency::Warning
        } else {
            Urgency::Expired
        }
    }
}

/// Where to show the "timer running" marker.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum IndicatorPlacement {
    /// Inside the timer view (timer is the active mode).
    TimerView,
    /// On the timer mode tab (stopwatch is showing).
    TimerTab,
}

pub trait Presenter {
    fn show_stopwatch_time(&mut self, text: &str);
    fn append_lap(&mut self, lap: Lap, text: &str);
    fn clear_laps(&mut self);

    fn show_timer_time(&mut self, text: &str, urgency: Urgency);
    /// Monotonic instant the countdown reaches zero, if projected.
    fn show_end_projection(&mut self, end_at_ms: Option<u64>);
    fn set_overtime(&mut self, overtime: bool);
    /// Extend / stop actions offered while in overtime.
    fn show_completion_actions(&mut self, visible: bool);
    fn show_inputs(&mut self, fields: &DurationFields, enabled: bool);
    fn show_timer_indicator(&mut self, placement: Option<IndicatorPlacement>);

    fn fade_out(&mut self, mode: Mode);
    fn swap_active(&mut self, active: Mode);
    fn fade_in(&mut self, mode: Mode);
    fn set_resizing(&mut self, _resizing: bool) {}
}

pub trait AlarmPlayer {
    fn play(&mut self);
    fn pause(&mut self);
    fn seek_to_start(&mut self);
}
