//! Owns both state machines, the input fields and the mode switcher, and
//! turns their outcomes into presenter, alarm and scheduler calls.
//!
//! Every entry point is a discrete event (key press, tick). Operations whose
//! preconditions fail do nothing.

use crate::countdown::{CountdownTimer, Toggled, TICK_MS};
use crate::input::{DurationFields, Field};
use crate::mode::{Mode, ModeSwitcher, Phase, Step, SwitchRequest, Transition, TransitionDelays};
use crate::schedule::{Scheduler, TickSource, VirtualScheduler};
use crate::stopwatch::Stopwatch;
use crate::surface::{AlarmPlayer, IndicatorPlacement, Presenter, Urgency};
use crate::{format_hms_cs, format_signed_hms};

#[derive(Clone, Copy, Debug)]
pub struct Settings {
    /// Stopwatch refresh period.
    pub resolution_ms: u64,
    pub delays: TransitionDelays,
    pub initial_mode: Mode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            resolution_ms: 10,
            delays: TransitionDelays::default(),
            initial_mode: Mode::Stopwatch,
        }
    }
}

pub struct Controller<P, A, S> {
    stopwatch: Stopwatch,
    timer: CountdownTimer,
    fields: DurationFields,
    switcher: ModeSwitcher,
    settings: Settings,
    presenter: P,
    alarm: A,
    scheduler: S,
}

impl<P: Presenter, A: AlarmPlayer, S: Scheduler> Controller<P, A, S> {
    pub fn new(fields: DurationFields, settings: Settings, presenter: P, alarm: A, scheduler: S) -> Self {
        let mut ctrl = Self {
            stopwatch: Stopwatch::new(),
            timer: CountdownTimer::new(fields.duration_ms()),
            fields,
            switcher: ModeSwitcher::new(settings.initial_mode),
            settings,
            presenter,
            alarm,
            scheduler,
        };
        ctrl.publish_all();
        ctrl
    }

    pub fn stopwatch(&self) -> &Stopwatch {
        &self.stopwatch
    }

    pub fn timer(&self) -> &CountdownTimer {
        &self.timer
    }

    pub fn fields(&self) -> &DurationFields {
        &self.fields
    }

    pub fn switcher(&self) -> &ModeSwitcher {
        &self.switcher
    }

    pub fn active_mode(&self) -> Mode {
        self.switcher.active()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn alarm(&self) -> &A {
        &self.alarm
    }

    pub fn alarm_mut(&mut self) -> &mut A {
        &mut self.alarm
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    fn publish_all(&mut self) {
        self.presenter.swap_active(self.switcher.active());
        self.presenter.clear_laps();
        self.publish_stopwatch();
        self.publish_timer();
        self.presenter.show_end_projection(None);
        self.presenter.set_overtime(false);
        self.presenter.show_completion_actions(false);
        self.presenter.show_inputs(&self.fields, true);
        self.publish_indicator();
    }

    fn publish_stopwatch(&mut self) {
        let text = format_hms_cs(self.stopwatch.elapsed_ms());
        self.presenter.show_stopwatch_time(&text);
    }

    fn publish_timer(&mut self) {
        let remaining = self.timer.remaining_ms();
        let text = format_signed_hms(remaining);
        self.presenter.show_timer_time(&text, Urgency::of(remaining));
    }

    fn publish_indicator(&mut self) {
        let placement = self.timer.is_running().then(|| match self.switcher.active() {
            Mode::Timer => IndicatorPlacement::TimerView,
            Mode::Stopwatch => IndicatorPlacement::TimerTab,
        });
        self.presenter.show_timer_indicator(placement);
    }

    // Stopwatch

    pub fn start_stopwatch(&mut self, now_ms: u64) {
        if !self.stopwatch.start(now_ms) {
            return;
        }
        self.scheduler.cancel(TickSource::Stopwatch);
        self.scheduler.every(TickSource::Stopwatch, self.settings.resolution_ms);
        self.publish_stopwatch();
    }

    pub fn stop_stopwatch(&mut self, now_ms: u64) {
        if !self.stopwatch.stop(now_ms) {
            return;
        }
        self.scheduler.cancel(TickSource::Stopwatch);
        self.publish_stopwatch();
    }

    pub fn toggle_stopwatch(&mut self, now_ms: u64) {
        if self.stopwatch.is_running() {
            self.stop_stopwatch(now_ms);
        } else {
            self.start_stopwatch(now_ms);
        }
    }

    pub fn reset_stopwatch(&mut self) {
        self.scheduler.cancel(TickSource::Stopwatch);
        self.stopwatch.reset();
        self.presenter.clear_laps();
        self.publish_stopwatch();
        log::debug!("stopwatch reset");
    }

    pub fn lap(&mut self, now_ms: u64) {
        let Some(lap) = self.stopwatch.lap(now_ms) else {
            return;
        };
        let text = format_hms_cs(lap.elapsed_ms);
        self.publish_stopwatch();
        self.presenter.append_lap(lap, &text);
    }

    // Timer

    pub fn toggle_timer(&mut self, now_ms: u64) {
        self.scheduler.cancel(TickSource::Timer);
        match self.timer.toggle(now_ms) {
            Toggled::Started => {
                self.scheduler.every(TickSource::Timer, TICK_MS as u64);
                self.presenter.show_inputs(&self.fields, false);
            }
            Toggled::Paused => {
                self.presenter.show_inputs(&self.fields, true);
            }
        }
        self.presenter.show_end_projection(self.timer.end_at_ms());
        self.publish_timer();
        self.publish_indicator();
    }

    pub fn reset_timer(&mut self) {
        self.scheduler.cancel(TickSource::Timer);
        self.timer.reset(self.fields.duration_ms());
        self.silence_alarm();
        self.presenter.set_overtime(false);
        self.presenter.show_completion_actions(false);
        self.presenter.show_end_projection(None);
        self.presenter.show_inputs(&self.fields, true);
        self.publish_timer();
        self.publish_indicator();
        log::debug!("timer reset to {}ms", self.timer.configured_ms());
    }

    pub fn extend_timer(&mut self, minutes: i64, now_ms: u64) {
        self.timer.extend(minutes, now_ms);
        self.silence_alarm();
        self.presenter.set_overtime(self.timer.is_overtime());
        self.presenter.show_completion_actions(false);
        self.presenter.show_end_projection(self.timer.end_at_ms());
        self.publish_timer();
    }

    /// Stops the sound only; the countdown is untouched.
    pub fn stop_alarm(&mut self) {
        self.silence_alarm();
    }

    pub fn stop_alarm_and_reset(&mut self) {
        self.silence_alarm();
        self.reset_timer();
    }

    fn silence_alarm(&mut self) {
        self.alarm.pause();
        self.alarm.seek_to_start();
    }

    fn on_timer_tick(&mut self) {
        if !self.timer.is_running() {
            return;
        }
        if self.timer.tick() {
            self.alarm.play();
            self.presenter.set_overtime(true);
            self.presenter.show_completion_actions(true);
        }
        self.publish_timer();
    }

    // Inputs

    pub fn edit_field(&mut self, field: Field, raw: &str) {
        if self.timer.is_running() {
            return;
        }
        self.fields.edit(field, raw);
        self.apply_fields();
    }

    pub fn commit_field(&mut self, field: Field) {
        if self.timer.is_running() {
            return;
        }
        self.fields.commit(field);
        self.apply_fields();
    }

    fn apply_fields(&mut self) {
        if self.timer.configure(self.fields.duration_ms()) {
            self.silence_alarm();
            self.presenter.set_overtime(false);
            self.presenter.show_completion_actions(false);
        }
        self.presenter.show_inputs(&self.fields, true);
        self.presenter.show_end_projection(None);
        self.publish_timer();
    }

    // Mode switching

    pub fn switch_to(&mut self, target: Mode) {
        if let SwitchRequest::Started(transition) = self.switcher.request(target) {
            self.begin_transition(transition);
        }
    }

    fn begin_transition(&mut self, transition: Transition) {
        self.presenter.set_resizing(true);
        if transition.to == Mode::Timer {
            self.publish_timer();
        }
        self.presenter.fade_out(transition.from);
        self.schedule_phase(Phase::FadingOut);
    }

    fn schedule_phase(&mut self, phase: Phase) {
        self.scheduler
            .once(TickSource::ModeTransition, self.settings.delays.after(phase));
    }

    fn advance_transition(&mut self) {
        match self.switcher.advance() {
            Step::Swapped(transition) => {
                self.presenter.swap_active(transition.to);
                self.schedule_phase(Phase::Swapped);
            }
            Step::FadingIn(transition) => {
                self.presenter.fade_in(transition.to);
                self.publish_indicator();
                self.schedule_phase(Phase::FadingIn);
            }
            Step::Settled { to, next } => {
                self.presenter.set_resizing(false);
                log::debug!("switched to {:?}", to);
                if let Some(next) = next {
                    self.begin_transition(next);
                }
            }
            Step::Idle => {}
        }
    }

    /// Dispatches a scheduled wakeup.
    pub fn on_tick(&mut self, source: TickSource, now_ms: u64) {
        match source {
            TickSource::Stopwatch => {
                if self.stopwatch.tick(now_ms).is_some() {
                    self.publish_stopwatch();
                }
            }
            TickSource::Timer => self.on_timer_tick(),
            TickSource::ModeTransition => self.advance_transition(),
        }
    }
}

impl<P: Presenter, A: AlarmPlayer> Controller<P, A, VirtualScheduler> {
    /// Fires every simulated wakeup due up to `until_ms`, in order.
    pub fn advance_to(&mut self, until_ms: u64) {
        while let Some((at_ms, source)) = self.scheduler.next_due(until_ms) {
            self.on_tick(source, at_ms);
        }
        self.scheduler.set_now(until_ms);
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }
}
