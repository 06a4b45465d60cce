/// A recorded elapsed-time snapshot.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Lap {
    /// 1-based, in recording order.
    pub index: u32,
    pub elapsed_ms: u64,
}

/// Elapsed-time state machine. Callers pass the current monotonic instant
/// into every time-dependent operation.
#[derive(Debug, Default)]
pub struct Stopwatch {
    running: bool,
    reference_ms: u64,
    elapsed_ms: u64,
    laps: Vec<Lap>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Last computed elapsed time.
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn laps(&self) -> &[Lap] {
        &self.laps
    }

    pub fn lap_count(&self) -> usize {
        self.laps.len()
    }

    /// Returns false when already running.
    pub fn start(&mut self, now_ms: u64) -> bool {
        if self.running {
            return false;
        }
        // Resuming keeps prior elapsed time
        self.reference_ms = now_ms.saturating_sub(self.elapsed_ms);
        self.running = true;
        log::debug!("stopwatch started at {} (elapsed {})", now_ms, self.elapsed_ms);
        true
    }

    /// Recomputes elapsed from `now_ms`. Returns the new value, or None when
    /// stopped.
    pub fn tick(&mut self, now_ms: u64) -> Option<u64> {
        if !self.running {
            return None;
        }
        self.elapsed_ms = now_ms.saturating_sub(self.reference_ms);
        log::trace!("stopwatch tick: {}", self.elapsed_ms);
        Some(self.elapsed_ms)
    }

    /// Returns false when not running.
    pub fn stop(&mut self, now_ms: u64) -> bool {
        if !self.running {
            return false;
        }
        self.tick(now_ms);
        self.running = false;
        log::debug!("stopwatch stopped at {}", self.elapsed_ms);
        true
    }

    pub fn reset(&mut self) {
        self.running = false;
        self.reference_ms = 0;
        self.elapsed_ms = 0;
        self.laps.clear();
    }

    pub fn lap(&mut self, now_ms: u64) -> Option<Lap> {
        let elapsed_ms = self.tick(now_ms)?;
        let lap = Lap {
            index: self.laps.len() as u32 + 1,
            elapsed_ms,
        };
        self.laps.push(lap);
        Some(lap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stopwatch_basic() {
        let mut sw = Stopwatch::new();
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed_ms(), 0);

        assert!(sw.start(1000));
        assert_eq!(sw.tick(1500), Some(500));
        assert_eq!(sw.tick(2000), Some(1000));

        assert!(sw.stop(2500));
        assert_eq!(sw.elapsed_ms(), 1500);
        assert_eq!(sw.tick(5000), None);
        assert_eq!(sw.elapsed_ms(), 1500); // Frozen while stopped

        sw.start(5000);
        assert_eq!(sw.tick(5500), Some(2000));

        sw.reset();
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed_ms(), 0);
    }

    #[test]
    fn test_start_wait_stop() {
        let mut sw = Stopwatch::new();
        sw.start(10_000);
        sw.stop(11_500);
        assert_eq!(sw.elapsed_ms(), 1500);
    }

    #[test]
    fn test_start_stop_accumulates() {
        let mut sw = Stopwatch::new();
        sw.start(0);
        sw.stop(300);
        sw.start(1000);
        sw.stop(1200);
        assert_eq!(sw.elapsed_ms(), 500);
    }

    #[test]
    fn test_redundant_calls_are_ignored() {
        let mut sw = Stopwatch::new();
        assert!(!sw.stop(100));
        assert!(sw.start(100));
        assert!(!sw.start(400)); // Does not move the reference
        sw.stop(600);
        assert_eq!(sw.elapsed_ms(), 500);
    }

    #[test]
    fn test_lap() {
        let mut sw = Stopwatch::new();
        assert_eq!(sw.lap(100), None);

        sw.start(0);
        let lap1 = sw.lap(5000).unwrap();
        assert_eq!(lap1, Lap { index: 1, elapsed_ms: 5000 });

        let lap2 = sw.lap(8000).unwrap();
        assert_eq!(lap2, Lap { index: 2, elapsed_ms: 8000 });
        assert_eq!(sw.lap_count(), 2);
        assert_eq!(sw.laps().last(), Some(&lap2));

        sw.stop(9000);
        assert_eq!(sw.lap(9500), None);

        sw.reset();
        assert_eq!(sw.lap_count(), 0);
    }
}
