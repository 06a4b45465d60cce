mod alerts;
mod args;
mod pump;
mod ui;

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::thread;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use clock_core::controller::Settings;
use clock_core::{Controller, DurationFields, Field, Mode, Phase, TickSource};
use crossbeam_channel::{unbounded, Receiver, Sender};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::alerts::{AlertConfig, BellAlarm};
use crate::args::Args;
use crate::pump::{pump_thread, PumpScheduler};
use crate::ui::{Focus, TerminalGuard, TerminalView};

/// Messages into the main loop. All state lives on the main thread.
#[derive(Debug)]
pub enum AppMsg {
    Key(KeyEvent),
    Pump { source: TickSource, generation: u64 },
    Resize,
    InputClosed,
}

struct App {
    controller: Controller<TerminalView, BellAlarm, PumpScheduler>,
    extend_minutes: i64,
    epoch: Instant,
}

impl App {
    fn new(args: &Args, scheduler: PumpScheduler) -> Self {
        let alerts = AlertConfig {
            bell: !args.no_bell,
            banner: !args.no_banner,
        };
        let settings = Settings {
            resolution_ms: args.resolution_ms,
            initial_mode: args.mode.into(),
            ..Settings::default()
        };
        let controller = Controller::new(
            DurationFields::new(args.hours, args.minutes, args.seconds),
            settings,
            TerminalView::new(alerts),
            BellAlarm::new(alerts),
            scheduler,
        );
        Self {
            controller,
            extend_minutes: args.extend_minutes,
            epoch: Instant::now(),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    fn view(&mut self) -> &mut TerminalView {
        self.controller.presenter_mut()
    }

    fn redraw<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        let now = self.now_ms();
        self.view().redraw(out, now)
    }

    fn handle_pump<W: Write>(&mut self, source: TickSource, generation: u64, out: &mut W) -> io::Result<()> {
        if !self.controller.scheduler().is_current(source, generation) {
            log::trace!("dropping stale {:?} tick", source);
            return Ok(());
        }
        // The swap drops field focus, so settle any typed text first
        let swapping = self.controller.switcher().transition().map(|t| t.phase) == Some(Phase::FadingOut);
        if source == TickSource::ModeTransition && swapping {
            self.leave_field();
        }
        let now = self.now_ms();
        self.controller.on_tick(source, now);
        let alarm = self.controller.alarm_mut();
        if source == TickSource::Timer && alarm.is_playing() {
            alarm.ring(out)?;
        }
        Ok(())
    }

    /// Returns true when the app should quit.
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return true;
        }

        // If help screen is showing, any key dismisses it
        if self.view().help_visible {
            self.view().help_visible = false;
            self.view().mark_dirty();
            return false;
        }

        // F-keys always switch modes, even mid-edit
        match key.code {
            KeyCode::F(1) => {
                self.leave_field();
                self.controller.switch_to(Mode::Stopwatch);
                return false;
            }
            KeyCode::F(2) => {
                self.leave_field();
                self.controller.switch_to(Mode::Timer);
                return false;
            }
            _ => {}
        }

        if let Some(field) = self.controller.presenter().focus.field() {
            self.handle_key_field(field, key.code);
            return false;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('?') => {
                self.view().help_visible = true;
                self.view().mark_dirty();
            }
            KeyCode::Left => self.controller.switch_to(Mode::Stopwatch),
            KeyCode::Right => self.controller.switch_to(Mode::Timer),
            code => match self.controller.active_mode() {
                Mode::Stopwatch => self.handle_key_stopwatch(code),
                Mode::Timer => self.handle_key_timer(code),
            },
        }
        false
    }

    fn handle_key_stopwatch(&mut self, code: KeyCode) {
        let now = self.now_ms();
        match code {
            KeyCode::Enter | KeyCode::Char(' ') => self.controller.toggle_stopwatch(now),
            KeyCode::Char('l') => self.controller.lap(now),
            KeyCode::Char('r') => self.controller.reset_stopwatch(),
            KeyCode::Up => {
                let view = self.view();
                if view.lap_scroll_offset + 1 < view.lap_count() {
                    view.lap_scroll_offset += 1;
                    view.mark_dirty();
                }
            }
            KeyCode::Down => {
                let view = self.view();
                if view.lap_scroll_offset > 0 {
                    view.lap_scroll_offset -= 1;
                    view.mark_dirty();
                }
            }
            _ => {}
        }
    }

    fn handle_key_timer(&mut self, code: KeyCode) {
        let now = self.now_ms();
        match code {
            KeyCode::Enter | KeyCode::Char(' ') => self.controller.toggle_timer(now),
            KeyCode::Char('r') => self.controller.reset_timer(),
            KeyCode::Char('+') | KeyCode::Char('e') => {
                self.controller.extend_timer(self.extend_minutes, now)
            }
            KeyCode::Char('-') => self.controller.extend_timer(self.extend_minutes.saturating_neg(), now),
            KeyCode::Char('a') => self.controller.stop_alarm(),
            KeyCode::Char('x') => self.controller.stop_alarm_and_reset(),
            KeyCode::Tab | KeyCode::Char('i') => {
                let view = self.view();
                if view.inputs_enabled() {
                    view.focus = Focus::Hours;
                    view.mark_dirty();
                }
            }
            _ => {}
        }
    }

    fn handle_key_field(&mut self, field: Field, code: KeyCode) {
        match code {
            KeyCode::Char(c) => {
                let mut text = self.controller.fields().text(field).to_string();
                text.push(c);
                self.controller.edit_field(field, &text);
            }
            KeyCode::Backspace => {
                let mut text = self.controller.fields().text(field).to_string();
                text.pop();
                self.controller.edit_field(field, &text);
            }
            KeyCode::Tab => {
                self.controller.commit_field(field);
                let view = self.view();
                view.focus = view.focus.next();
                view.mark_dirty();
            }
            KeyCode::Enter | KeyCode::Esc => self.leave_field(),
            _ => {}
        }
    }

    /// Commits the focused field, if any, and returns focus to commands.
    fn leave_field(&mut self) {
        if let Some(field) = self.controller.presenter().focus.field() {
            self.controller.commit_field(field);
        }
        let view = self.view();
        view.focus = Focus::Commands;
        view.mark_dirty();
    }
}

fn input_thread(main: Sender<AppMsg>) {
    loop {
        let msg = match event::read() {
            Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => AppMsg::Key(key),
            Ok(Event::Resize(_, _)) => AppMsg::Resize,
            Ok(_) => continue,
            Err(e) => {
                log::error!("can't read terminal input: {}", e);
                AppMsg::InputClosed
            }
        };
        let closed = matches!(msg, AppMsg::InputClosed);
        if main.send(msg).is_err() || closed {
            break;
        }
    }
}

fn event_loop<W: Write>(app: &mut App, events: &Receiver<AppMsg>, out: &mut W) -> Result<()> {
    app.redraw(out).context("can't draw")?;
    loop {
        match events.recv().context("event channel closed")? {
            AppMsg::Key(key) => {
                if app.handle_key(key) {
                    return Ok(());
                }
            }
            AppMsg::Pump { source, generation } => {
                app.handle_pump(source, generation, out).context("can't ring alarm")?;
            }
            AppMsg::Resize => app.view().mark_dirty(),
            AppMsg::InputClosed => return Ok(()),
        }
        app.redraw(out).context("can't draw")?;
    }
}

fn init_logging(log_file: Option<&Path>) -> Result<()> {
    // The UI owns the terminal, so logs only go to a file
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("can't create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run(args: Args) -> Result<()> {
    init_logging(args.log_file.as_deref())?;
    log::info!("dualclock PID is {}", std::process::id());

    let (main_tx, main_rx) = unbounded();
    let (ctl_tx, ctl_rx) = unbounded();

    let pump_main = main_tx.clone();
    let pump = thread::Builder::new()
        .name("pump".into())
        .spawn(move || pump_thread(ctl_rx, pump_main))
        .context("can't spawn pump thread")?;

    let guard = TerminalGuard::enter().context("can't set up terminal")?;
    thread::Builder::new()
        .name("input".into())
        .spawn(move || input_thread(main_tx))
        .context("can't spawn input thread")?;

    let mut app = App::new(&args, PumpScheduler::new(ctl_tx));
    let mut out = io::stdout();
    let result = event_loop(&mut app, &main_rx, &mut out);

    // Clean up
    app.controller.scheduler().quit();
    pump.join().ok();
    drop(guard);
    log::info!("dualclock exiting");
    result
}

fn main() {
    let args = Args::parse();
    std::process::exit(match run(args) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("error: {:#}", e);
            1
        }
    });
}
