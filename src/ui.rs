use std::io::{self, Write};

use chrono::{Local, TimeDelta};
use clock_core::{DurationFields, Field, IndicatorPlacement, Lap, Mode, Presenter, Urgency};
use crossterm::cursor::{Hide, MoveTo, Show};
use crossterm::style::{
    Attribute, Color, Print, ResetColor, SetAttribute, SetBackgroundColor, SetForegroundColor,
};
use crossterm::terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, queue};
use num_traits::{FromPrimitive, ToPrimitive};

use crate::alerts::AlertConfig;

/// Keyboard focus in the timer view. Cycles Commands → Hours → Minutes →
/// Seconds → Commands.
#[derive(Clone, Copy, PartialEq, Eq, Debug, num_derive::FromPrimitive, num_derive::ToPrimitive)]
pub enum Focus {
    Commands = 0,
    Hours,
    Minutes,
    Seconds,
}

impl Focus {
    pub fn next(self) -> Self {
        let index = self.to_u8().unwrap_or(0);
        Focus::from_u8((index + 1) % 4).unwrap_or(Focus::Commands)
    }

    pub fn field(self) -> Option<Field> {
        match self {
            Focus::Commands => None,
            Focus::Hours => Some(Field::Hours),
            Focus::Minutes => Some(Field::Minutes),
            Focus::Seconds => Some(Field::Seconds),
        }
    }
}

/// Restores the terminal when dropped.
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen, Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        execute!(io::stdout(), Show, LeaveAlternateScreen).ok();
        terminal::disable_raw_mode().ok();
    }
}

/// Everything the controller has published, plus local view state.
pub struct TerminalView {
    alerts: AlertConfig,
    active: Mode,
    faded: bool,
    resizing: bool,
    stopwatch_text: String,
    laps: Vec<(Lap, String)>,
    pub lap_scroll_offset: usize,
    timer_text: String,
    urgency: Urgency,
    end_at_ms: Option<u64>,
    overtime: bool,
    completion_visible: bool,
    fields: DurationFields,
    inputs_enabled: bool,
    indicator: Option<IndicatorPlacement>,
    pub focus: Focus,
    pub help_visible: bool,
    dirty: bool,
}

impl TerminalView {
    pub fn new(alerts: AlertConfig) -> Self {
        Self {
            alerts,
            active: Mode::Stopwatch,
            faded: false,
            resizing: false,
            stopwatch_text: String::new(),
            laps: Vec::new(),
            lap_scroll_offset: 0,
            timer_text: String::new(),
            urgency: Urgency::Normal,
            end_at_ms: None,
            overtime: false,
            completion_visible: false,
            fields: DurationFields::default(),
            inputs_enabled: true,
            indicator: None,
            focus: Focus::Commands,
            help_visible: false,
            dirty: true,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn lap_count(&self) -> usize {
        self.laps.len()
    }

    pub fn inputs_enabled(&self) -> bool {
        self.inputs_enabled
    }

    /// Draws when something changed since the last draw.
    pub fn redraw<W: Write>(&mut self, out: &mut W, now_ms: u64) -> io::Result<()> {
        if !self.dirty {
            return Ok(());
        }
        self.dirty = false;
        let (width, height) = terminal::size().unwrap_or((80, 24));
        self.draw(out, now_ms, width, height)
    }

    pub fn draw<W: Write>(&self, out: &mut W, now_ms: u64, width: u16, height: u16) -> io::Result<()> {
        queue!(out, MoveTo(0, 0), Clear(ClearType::All))?;

        if self.help_visible {
            for (row, line) in help_text(self.active).lines().enumerate() {
                queue!(out, MoveTo(2, row as u16 + 1), Print(line))?;
            }
            queue!(out, MoveTo(2, height.saturating_sub(2)), Print("Press any key to close"))?;
            return out.flush();
        }

        self.draw_tabs(out)?;

        if self.faded {
            queue!(out, SetAttribute(Attribute::Dim))?;
        }
        match self.active {
            Mode::Stopwatch => self.draw_stopwatch(out, height)?,
            Mode::Timer => self.draw_timer(out, now_ms, width)?,
        }
        queue!(out, SetAttribute(Attribute::Reset), ResetColor)?;

        let hints = match (self.active, self.focus) {
            (Mode::Stopwatch, _) => "enter start/stop  l lap  r reset  ↑↓ scroll  ←→ mode  ? help  q quit",
            (Mode::Timer, Focus::Commands) => "enter start/pause  r reset  tab edit  +/- extend  ? help  q quit",
            (Mode::Timer, _) => "type a number or sum  tab next field  enter/esc done",
        };
        queue!(out, MoveTo(0, height.saturating_sub(1)), SetAttribute(Attribute::Dim), Print(hints))?;
        queue!(out, SetAttribute(Attribute::Reset))?;
        out.flush()
    }

    fn draw_tabs<W: Write>(&self, out: &mut W) -> io::Result<()> {
        queue!(out, MoveTo(2, 0))?;
        for mode in [Mode::Stopwatch, Mode::Timer] {
            if mode == self.active {
                queue!(out, SetAttribute(Attribute::Reverse))?;
            }
            queue!(out, Print(format!(" {} ", mode.label())), SetAttribute(Attribute::Reset))?;
            if mode == Mode::Timer && self.indicator == Some(IndicatorPlacement::TimerTab) {
                queue!(out, SetForegroundColor(Color::Green), Print(" ●"), ResetColor)?;
            }
            queue!(out, Print("  "))?;
        }
        if self.resizing {
            queue!(out, SetAttribute(Attribute::Dim), Print("…"), SetAttribute(Attribute::Reset))?;
        }
        Ok(())
    }

    fn draw_stopwatch<W: Write>(&self, out: &mut W, height: u16) -> io::Result<()> {
        queue!(out, MoveTo(2, 2), SetAttribute(Attribute::Bold), Print(&self.stopwatch_text))?;
        queue!(out, SetAttribute(Attribute::NormalIntensity))?;

        if self.laps.is_empty() {
            return Ok(());
        }
        queue!(out, MoveTo(2, 4), Print(format!("Laps ({})", self.laps.len())))?;

        let top = 5u16;
        let rows = height.saturating_sub(top + 2) as usize;
        let end = self.laps.len().saturating_sub(self.lap_scroll_offset);
        let start = end.saturating_sub(rows);
        for (row, (lap, text)) in self.laps[start..end].iter().enumerate() {
            queue!(
                out,
                MoveTo(4, top + row as u16),
                Print(format!("Lap {:<4} {}", lap.index, text))
            )?;
        }
        Ok(())
    }

    fn draw_timer<W: Write>(&self, out: &mut W, now_ms: u64, width: u16) -> io::Result<()> {
        let color = match self.urgency {
            Urgency::Normal => Color::Reset,
            Urgency::Warning | Urgency::Expired => Color::Red,
        };
        queue!(
            out,
            MoveTo(2, 2),
            SetForegroundColor(color),
            SetAttribute(Attribute::Bold),
            Print(&self.timer_text),
            SetAttribute(Attribute::NormalIntensity),
            ResetColor
        )?;
        if self.overtime {
            queue!(out, SetForegroundColor(Color::Red), Print("  overtime"), ResetColor)?;
        }
        if self.indicator == Some(IndicatorPlacement::TimerView) {
            queue!(out, SetForegroundColor(Color::Green), Print("  ● running"), ResetColor)?;
        }

        queue!(out, MoveTo(2, 4))?;
        for (label, field, focus) in [
            ("HH", Field::Hours, Focus::Hours),
            ("MM", Field::Minutes, Focus::Minutes),
            ("SS", Field::Seconds, Focus::Seconds),
        ] {
            queue!(out, Print(format!("{} ", label)))?;
            if !self.inputs_enabled {
                queue!(out, SetAttribute(Attribute::Dim))?;
            } else if self.focus == focus {
                queue!(out, SetAttribute(Attribute::Reverse))?;
            }
            queue!(
                out,
                Print(format!("[{:>3}]", self.fields.text(field))),
                SetAttribute(Attribute::NoReverse),
                SetAttribute(Attribute::NormalIntensity),
                Print("  ")
            )?;
        }

        if let Some(end_at_ms) = self.end_at_ms {
            queue!(out, MoveTo(2, 6), Print(format!("Ends at {}", wall_clock(end_at_ms, now_ms))))?;
        }

        if self.completion_visible && self.alerts.banner {
            let banner = " TIME'S UP   + extend   a silence   x stop & reset ";
            let col = width.saturating_sub(banner.chars().count() as u16) / 2;
            queue!(
                out,
                MoveTo(col, 8),
                SetForegroundColor(Color::White),
                SetBackgroundColor(Color::Red),
                Print(banner),
                ResetColor
            )?;
        }
        Ok(())
    }
}

impl Presenter for TerminalView {
    fn show_stopwatch_time(&mut self, text: &str) {
        self.stopwatch_text = text.to_string();
        self.dirty = true;
    }

    fn append_lap(&mut self, lap: Lap, text: &str) {
        self.laps.push((lap, text.to_string()));
        // Follow the newest lap
        self.lap_scroll_offset = 0;
        self.dirty = true;
    }

    fn clear_laps(&mut self) {
        self.laps.clear();
        self.lap_scroll_offset = 0;
        self.dirty = true;
    }

    fn show_timer_time(&mut self, text: &str, urgency: Urgency) {
        self.timer_text = text.to_string();
        self.urgency = urgency;
        self.dirty = true;
    }

    fn show_end_projection(&mut self, end_at_ms: Option<u64>) {
        self.end_at_ms = end_at_ms;
        self.dirty = true;
    }

    fn set_overtime(&mut self, overtime: bool) {
        self.overtime = overtime;
        self.dirty = true;
    }

    fn show_completion_actions(&mut self, visible: bool) {
        self.completion_visible = visible;
        self.dirty = true;
    }

    fn show_inputs(&mut self, fields: &DurationFields, enabled: bool) {
        self.fields = fields.clone();
        self.inputs_enabled = enabled;
        if !enabled {
            self.focus = Focus::Commands;
        }
        self.dirty = true;
    }

    fn show_timer_indicator(&mut self, placement: Option<IndicatorPlacement>) {
        self.indicator = placement;
        self.dirty = true;
    }

    fn fade_out(&mut self, mode: Mode) {
        log::trace!("fading out {:?}", mode);
        self.faded = true;
        self.dirty = true;
    }

    fn swap_active(&mut self, active: Mode) {
        self.active = active;
        self.focus = Focus::Commands;
        self.dirty = true;
    }

    fn fade_in(&mut self, mode: Mode) {
        log::trace!("fading in {:?}", mode);
        self.faded = false;
        self.dirty = true;
    }

    fn set_resizing(&mut self, resizing: bool) {
        self.resizing = resizing;
        self.dirty = true;
    }
}

/// Local wall-clock time of a monotonic instant, or a placeholder when it
/// falls outside what chrono can represent.
fn wall_clock(at_ms: u64, now_ms: u64) -> String {
    let end = i64::try_from(at_ms)
        .ok()
        .zip(i64::try_from(now_ms).ok())
        .and_then(|(at, now)| at.checked_sub(now))
        .and_then(TimeDelta::try_milliseconds)
        .and_then(|delta| Local::now().checked_add_signed(delta));
    match end {
        Some(end) => end.format("%H:%M:%S").to_string(),
        None => "--:--:--".to_string(),
    }
}

fn help_text(mode: Mode) -> &'static str {
    match mode {
        Mode::Stopwatch => {
            "STOPWATCH HELP\n\n\
             Enter  Start/Stop\n\
             l      Record lap\n\
             r      Reset\n\
             Up/Dn  Scroll laps\n\
             Right  Timer (F2)\n\
             q      Quit"
        }
        Mode::Timer => {
            "TIMER HELP\n\n\
             Enter  Start/Pause\n\
             r      Reset to fields\n\
             Tab    Edit HH / MM / SS\n\
             +  -   Extend / shorten\n\
             a      Silence alarm\n\
             x      Stop alarm & reset\n\
             Left   Stopwatch (F1)\n\
             q      Quit\n\n\
             Fields accept sums like 2*30 or 90÷2"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_cycles() {
        assert_eq!(Focus::Commands.next(), Focus::Hours);
        assert_eq!(Focus::Hours.next(), Focus::Minutes);
        assert_eq!(Focus::Seconds.next(), Focus::Commands);
        assert_eq!(Focus::Commands.field(), None);
        assert_eq!(Focus::Minutes.field(), Some(Field::Minutes));
    }

    #[test]
    fn test_new_lap_scrolls_to_bottom() {
        let mut view = TerminalView::new(AlertConfig::default());
        view.append_lap(Lap { index: 1, elapsed_ms: 10 }, "00:00:00.01");
        view.lap_scroll_offset = 1;
        view.append_lap(Lap { index: 2, elapsed_ms: 20 }, "00:00:00.02");
        assert_eq!(view.lap_scroll_offset, 0);
        assert_eq!(view.lap_count(), 2);
    }

    #[test]
    fn test_disabling_inputs_drops_focus() {
        let mut view = TerminalView::new(AlertConfig::default());
        view.focus = Focus::Seconds;
        view.show_inputs(&DurationFields::new(0, 1, 0), false);
        assert_eq!(view.focus, Focus::Commands);
        assert!(!view.inputs_enabled());
    }

    #[test]
    fn test_draw_timer_view() {
        let mut view = TerminalView::new(AlertConfig::default());
        view.swap_active(Mode::Timer);
        view.show_timer_time("-00:00:03", Urgency::Expired);
        view.show_completion_actions(true);
        let mut out = Vec::new();
        view.draw(&mut out, 0, 80, 24).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("-00:00:03"));
        assert!(text.contains("TIME'S UP"));
    }

    #[test]
    fn test_far_end_time_shows_placeholder() {
        assert_eq!(wall_clock(u64::MAX, 0), "--:--:--");
        assert_eq!(wall_clock(i64::MAX as u64, 1_000), "--:--:--");
        assert_eq!(wall_clock(5_000, 5_000).len(), 8);
        assert_ne!(wall_clock(5_000, 5_000), "--:--:--");

        // 3 000 000 000 hours from now
        let mut view = TerminalView::new(AlertConfig::default());
        view.swap_active(Mode::Timer);
        view.show_end_projection(Some(3_000_000_000 * 3_600_000));
        let mut out = Vec::new();
        view.draw(&mut out, 0, 80, 24).unwrap();
        assert!(String::from_utf8_lossy(&out).contains("Ends at --:--:--"));
    }

    #[test]
    fn test_banner_can_be_hidden() {
        let mut view = TerminalView::new(AlertConfig { bell: true, banner: false });
        view.swap_active(Mode::Timer);
        view.show_completion_actions(true);
        let mut out = Vec::new();
        view.draw(&mut out, 0, 80, 24).unwrap();
        assert!(!String::from_utf8_lossy(&out).contains("TIME'S UP"));
    }
}
