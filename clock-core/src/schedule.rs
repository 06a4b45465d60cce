//! Tick scheduling seam. Production code backs this with a pump thread;
//! tests use [`VirtualScheduler`] to step simulated time.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum TickSource {
    Stopwatch,
    Timer,
    ModeTransition,
}

impl TickSource {
    pub const ALL: [TickSource; 3] = [
        TickSource::Stopwatch,
        TickSource::Timer,
        TickSource::ModeTransition,
    ];

    pub fn index(self) -> usize {
        match self {
            TickSource::Stopwatch => 0,
            TickSource::Timer => 1,
            TickSource::ModeTransition => 2,
        }
    }
}

/// Scheduling a source replaces any earlier schedule of the same source.
pub trait Scheduler {
    /// Fire `source` every `interval_ms`, first firing one interval from now.
    fn every(&mut self, source: TickSource, interval_ms: u64);
    /// Fire `source` once after `delay_ms`.
    fn once(&mut self, source: TickSource, delay_ms: u64);
    fn cancel(&mut self, source: TickSource);
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    due_ms: u64,
    interval_ms: Option<u64>,
}

/// Deterministic scheduler over simulated milliseconds.
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    now_ms: u64,
    slots: [Option<Slot>; 3],
}

impl VirtualScheduler {
    pub fn new(now_ms: u64) -> Self {
        Self {
            now_ms,
            slots: [None; 3],
        }
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn is_scheduled(&self, source: TickSource) -> bool {
        self.slots[source.index()].is_some()
    }

    /// Pops the earliest firing due at or before `until_ms`, moving simulated
    /// time to it. Periodic sources are re-armed. Ties fire in
    /// [`TickSource::ALL`] order.
    pub fn next_due(&mut self, until_ms: u64) -> Option<(u64, TickSource)> {
        let source = TickSource::ALL
            .into_iter()
            .filter_map(|s| self.slots[s.index()].map(|slot| (slot.due_ms, s)))
            .filter(|&(due, _)| due <= until_ms)
            .min_by_key(|&(due, s)| (due, s.index()))
            .map(|(_, s)| s)?;

        let slot = &mut self.slots[source.index()];
        let fired = (*slot)?;
        *slot = fired.interval_ms.map(|interval_ms| Slot {
            due_ms: fired.due_ms.saturating_add(interval_ms),
            interval_ms: Some(interval_ms),
        });
        self.now_ms = self.now_ms.max(fired.due_ms);
        Some((fired.due_ms, source))
    }

    /// Moves simulated time forward without firing anything.
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }
}

impl Scheduler for VirtualScheduler {
    fn every(&mut self, source: TickSource, interval_ms: u64) {
        let interval_ms = interval_ms.max(1);
        self.slots[source.index()] = Some(Slot {
            due_ms: self.now_ms.saturating_add(interval_ms),
            interval_ms: Some(interval_ms),
        });
    }

    fn once(&mut self, source: TickSource, delay_ms: u64) {
        self.slots[source.index()] = Some(Slot {
            due_ms: self.now_ms.saturating_add(delay_ms),
            interval_ms: None,
        });
    }

    fn cancel(&mut self, source: TickSource) {
        self.slots[source.index()] = None;
    }
}
