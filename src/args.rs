//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use clock_core::Mode;

#[derive(Clone, Copy, PartialEq, Eq, Debug, ValueEnum)]
pub enum StartMode {
    Stopwatch,
    Timer,
}

impl From<StartMode> for Mode {
    fn from(mode: StartMode) -> Self {
        match mode {
            StartMode::Stopwatch => Mode::Stopwatch,
            StartMode::Timer => Mode::Timer,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "dualclock",
    about = "Stopwatch and countdown timer with an overtime alarm",
    after_help = "\
EXAMPLES:
    dualclock                                 Stopwatch, 5 minute timer ready
    dualclock --mode timer --minutes 25       Open on a 25 minute timer
    dualclock --seconds 90 --no-bell          90s timer (shown as 1:30), silent"
)]
pub struct Args {
    /// Initial hours field
    #[arg(long, default_value_t = 0)]
    pub hours: u64,

    /// Initial minutes field
    #[arg(long, default_value_t = 5)]
    pub minutes: u64,

    /// Initial seconds field
    #[arg(long, default_value_t = 0)]
    pub seconds: u64,

    /// Minutes added (or removed) by the extend keys
    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub extend_minutes: i64,

    /// Stopwatch refresh period in milliseconds (1 to 60000)
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..=60_000))]
    pub resolution_ms: u64,

    /// View shown at start-up
    #[arg(long, value_enum, default_value_t = StartMode::Stopwatch)]
    pub mode: StartMode,

    /// Do not ring the terminal bell in overtime
    #[arg(long)]
    pub no_bell: bool,

    /// Hide the overtime banner
    #[arg(long)]
    pub no_banner: bool,

    /// Write logs here (filter with RUST_LOG); logging is off without it
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,
}
