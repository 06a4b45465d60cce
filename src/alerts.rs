use std::io::{self, Write};

use clock_core::AlarmPlayer;

#[derive(Clone, Copy, Debug)]
pub struct AlertConfig {
    pub bell: bool,
    pub banner: bool,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            bell: true,
            banner: true,
        }
    }
}

/// Terminal-bell alarm. "Playing" loops one bell per ring call.
pub struct BellAlarm {
    config: AlertConfig,
    playing: bool,
    position: u32,
}

impl BellAlarm {
    pub fn new(config: AlertConfig) -> Self {
        Self {
            config,
            playing: false,
            position: 0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Bells rung since the last rewind.
    pub fn position(&self) -> u32 {
        self.position
    }

    pub fn ring<W: Write>(&mut self, out: &mut W) -> io::Result<()> {
        if !self.playing {
            return Ok(());
        }
        self.position += 1;
        if self.config.bell {
            out.write_all(b"\x07")?;
            out.flush()?;
        }
        Ok(())
    }
}

impl AlarmPlayer for BellAlarm {
    fn play(&mut self) {
        if !self.playing {
            log::info!("alarm started");
        }
        self.playing = true;
    }

    fn pause(&mut self) {
        if self.playing {
            log::info!("alarm stopped after {} rings", self.position());
        }
        self.playing = false;
    }

    fn seek_to_start(&mut self) {
        self.position = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rings_only_while_playing() {
        let mut alarm = BellAlarm::new(AlertConfig::default());
        let mut out = Vec::new();
        alarm.ring(&mut out).unwrap();
        assert!(out.is_empty());

        alarm.play();
        alarm.ring(&mut out).unwrap();
        alarm.ring(&mut out).unwrap();
        assert_eq!(out, b"\x07\x07");
        assert_eq!(alarm.position(), 2);

        alarm.pause();
        alarm.seek_to_start();
        alarm.ring(&mut out).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(alarm.position(), 0);
    }

    #[test]
    fn test_muted_bell_still_plays() {
        let mut alarm = BellAlarm::new(AlertConfig { bell: false, banner: true });
        let mut out = Vec::new();
        alarm.play();
        alarm.ring(&mut out).unwrap();
        assert!(alarm.is_playing());
        assert!(out.is_empty());
        assert_eq!(alarm.position(), 1);
    }
}
