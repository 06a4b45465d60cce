//! Tick pump: a thread that owns the wakeup deadlines and posts `Pump`
//! messages to the main loop.
//!
//! Cancels travel over a channel, so a tick can already be queued when its
//! source is cancelled. Each arm/cancel bumps a per-source generation and the
//! main loop drops ticks whose generation is no longer current.

use std::time::{Duration, Instant};

use clock_core::{Scheduler, TickSource};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};

use crate::AppMsg;

#[derive(Debug)]
pub enum PumpCtl {
    Arm {
        source: TickSource,
        generation: u64,
        delay_ms: u64,
        interval_ms: Option<u64>,
    },
    Cancel(TickSource),
    Quit,
}

struct Slot {
    generation: u64,
    due: Instant,
    interval: Option<Duration>,
}

pub fn pump_thread(ctl: Receiver<PumpCtl>, main: Sender<AppMsg>) {
    let mut slots: [Option<Slot>; 3] = [None, None, None];

    loop {
        let next_due = slots.iter().flatten().map(|slot| slot.due).min();
        let received = match next_due {
            Some(due) => ctl.recv_deadline(due),
            // Block-wait when nothing is armed
            None => ctl.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(PumpCtl::Arm {
                source,
                generation,
                delay_ms,
                interval_ms,
            }) => {
                let due = deadline(Instant::now(), Duration::from_millis(delay_ms));
                if due.is_none() {
                    log::warn!("{:?} delay of {}ms is out of range; not armed", source, delay_ms);
                }
                slots[source.index()] = due.map(|due| Slot {
                    generation,
                    due,
                    interval: interval_ms.map(Duration::from_millis),
                });
            }
            Ok(PumpCtl::Cancel(source)) => {
                slots[source.index()] = None;
            }
            Ok(PumpCtl::Quit) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {
                let now = Instant::now();
                for source in TickSource::ALL {
                    let index = source.index();
                    let (generation, due, interval) = match &slots[index] {
                        Some(armed) if armed.due <= now => (armed.generation, armed.due, armed.interval),
                        _ => continue,
                    };
                    slots[index] = interval.and_then(|interval| {
                        let next = deadline(due, interval)?;
                        // Late ticks are dropped rather than bunched
                        let next = if next <= now { deadline(now, interval)? } else { next };
                        Some(Slot {
                            generation,
                            due: next,
                            interval: Some(interval),
                        })
                    });
                    if main.send(AppMsg::Pump { source, generation }).is_err() {
                        return;
                    }
                }
            }
        }
    }
    log::debug!("pump thread exiting");
}

/// `from + after`, or `None` when that is past what `Instant` can hold.
fn deadline(from: Instant, after: Duration) -> Option<Instant> {
    from.checked_add(after)
}

/// [`Scheduler`] backed by the pump thread.
pub struct PumpScheduler {
    ctl: Sender<PumpCtl>,
    generations: [u64; 3],
}

impl PumpScheduler {
    pub fn new(ctl: Sender<PumpCtl>) -> Self {
        Self {
            ctl,
            generations: [0; 3],
        }
    }

    /// Whether a tick stamped with `generation` is still wanted.
    pub fn is_current(&self, source: TickSource, generation: u64) -> bool {
        self.generations[source.index()] == generation
    }

    pub fn quit(&self) {
        self.send(PumpCtl::Quit);
    }

    fn bump(&mut self, source: TickSource) -> u64 {
        let generation = &mut self.generations[source.index()];
        *generation += 1;
        *generation
    }

    fn arm(&mut self, source: TickSource, delay_ms: u64, interval_ms: Option<u64>) {
        let generation = self.bump(source);
        self.send(PumpCtl::Arm {
            source,
            generation,
            delay_ms,
            interval_ms,
        });
    }

    fn send(&self, msg: PumpCtl) {
        if let Err(e) = self.ctl.send(msg) {
            log::warn!("pump is gone: {:?}", e.into_inner());
        }
    }
}

impl Scheduler for PumpScheduler {
    fn every(&mut self, source: TickSource, interval_ms: u64) {
        let interval_ms = interval_ms.max(1);
        self.arm(source, interval_ms, Some(interval_ms));
    }

    fn once(&mut self, source: TickSource, delay_ms: u64) {
        self.arm(source, delay_ms, None);
    }

    fn cancel(&mut self, source: TickSource) {
        self.bump(source);
        self.send(PumpCtl::Cancel(source));
    }
}
