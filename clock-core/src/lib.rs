//! Pure timing logic library with no platform dependencies.
//! Testable on host; the terminal front-end supplies the clock and the
//! collaborators.

pub mod controller;
pub mod countdown;
pub mod expr;
pub mod input;
pub mod mode;
pub mod schedule;
pub mod stopwatch;
pub mod surface;

pub use controller::{Controller, Settings};
pub use countdown::{CountdownTimer, TimerPhase, TimerState, Toggled};
pub use expr::ExprError;
pub use input::{DurationFields, Field};
pub use mode::{Mode, ModeSwitcher, Phase, Step, SwitchRequest, Transition, TransitionDelays};
pub use schedule::{Scheduler, TickSource, VirtualScheduler};
pub use stopwatch::{Lap, Stopwatch};
pub use surface::{AlarmPlayer, IndicatorPlacement, Presenter, Urgency};

/// Signed millisecond count. Timer durations may go negative (overtime).
pub type Millis = i64;

pub const MS_PER_SECOND: Millis = 1_000;
pub const MS_PER_MINUTE: Millis = 60 * MS_PER_SECOND;
pub const MS_PER_HOUR: Millis = 60 * MS_PER_MINUTE;

/// Format milliseconds as "HH:MM:SS.CC" (centiseconds)
pub fn format_hms_cs(ms: u64) -> String {
    let total_secs = ms / 1000;
    let cs = (ms % 1000) / 10;
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    format!("{:02}:{:02}:{:02}.{:02}", h, m, s, cs)
}

/// Format signed milliseconds as "HH:MM:SS", prefixed with '-' in overtime.
pub fn format_signed_hms(ms: Millis) -> String {
    let sign = if ms < 0 { "-" } else { "" };
    let total_secs = ms.unsigned_abs() / 1000;
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    format!("{}{:02}:{:02}:{:02}", sign, h, m, s)
}

/// Total milliseconds for an hours/minutes/seconds triple, saturating.
pub fn hms_to_ms(hours: u64, minutes: u64, seconds: u64) -> Millis {
    let secs = hours
        .saturating_mul(3600)
        .saturating_add(minutes.saturating_mul(60))
        .saturating_add(seconds);
    Millis::try_from(secs.saturating_mul(1000)).unwrap_or(Millis::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_hms_cs() {
        assert_eq!(format_hms_cs(0), "00:00:00.00");
        assert_eq!(format_hms_cs(12_340), "00:00:12.34");
        assert_eq!(format_hms_cs(3_661_999), "01:01:01.99");
    }

    #[test]
    fn test_format_signed_hms() {
        assert_eq!(format_signed_hms(0), "00:00:00");
        assert_eq!(format_signed_hms(61_000), "00:01:01");
        assert_eq!(format_signed_hms(3_661_000), "01:01:01");
        assert_eq!(format_signed_hms(-1_000), "-00:00:01");
        assert_eq!(format_signed_hms(-3_600_000), "-01:00:00");
    }

    #[test]
    fn test_format_keeps_large_hours() {
        assert_eq!(format_signed_hms(100 * MS_PER_HOUR), "100:00:00");
    }

    #[test]
    fn test_hms_to_ms() {
        assert_eq!(hms_to_ms(0, 0, 5), 5_000);
        assert_eq!(hms_to_ms(1, 2, 3), 3_723_000);
        assert_eq!(hms_to_ms(u64::MAX, 0, 0), Millis::MAX);
    }
}
