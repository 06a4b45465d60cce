//! Hours/minutes/seconds text fields and their normalization.
//!
//! Edits keep plain integers canonical and leave arithmetic text pending until
//! the field is committed (loses focus). Nothing here fails: bad input is
//! coerced to a valid value.

use crate::expr;
use crate::{hms_to_ms, Millis};

const EXPRESSION_SYMBOLS: &[char] = &['+', '-', '*', '/', '(', ')', '.'];

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Field {
    Hours,
    Minutes,
    Seconds,
}

impl Field {
    pub const ALL: [Field; 3] = [Field::Hours, Field::Minutes, Field::Seconds];
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct DurationFields {
    hours: String,
    minutes: String,
    seconds: String,
}

impl Default for DurationFields {
    fn default() -> Self {
        Self::new(0, 0, 0)
    }
}

impl DurationFields {
    /// Builds carry-normalized fields.
    pub fn new(hours: u64, minutes: u64, seconds: u64) -> Self {
        let (h, m, s) = carry(hours, minutes, seconds);
        Self {
            hours: h.to_string(),
            minutes: m.to_string(),
            seconds: s.to_string(),
        }
    }

    pub fn text(&self, field: Field) -> &str {
        match field {
            Field::Hours => &self.hours,
            Field::Minutes => &self.minutes,
            Field::Seconds => &self.seconds,
        }
    }

    fn text_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Hours => &mut self.hours,
            Field::Minutes => &mut self.minutes,
            Field::Seconds => &mut self.seconds,
        }
    }

    /// True while any field holds unevaluated expression text.
    pub fn has_pending_expression(&self) -> bool {
        Field::ALL
            .iter()
            .any(|&f| plain_integer(self.text(f)).is_none())
    }

    /// Numeric values as currently read, using the leading integer of any
    /// pending field.
    pub fn values(&self) -> (u64, u64, u64) {
        let read = |f| {
            let text = self.text(f);
            plain_integer(text).unwrap_or_else(|| clamp_non_negative(leading_integer(text)))
        };
        (read(Field::Hours), read(Field::Minutes), read(Field::Seconds))
    }

    pub fn duration_ms(&self) -> Millis {
        let (h, m, s) = self.values();
        hms_to_ms(h, m, s)
    }

    /// Handles a keystroke-level change of one field.
    pub fn edit(&mut self, field: Field, raw: &str) {
        let trimmed = raw.trim();
        let slot = self.text_mut(field);
        if trimmed.is_empty() {
            *slot = "0".to_string();
        } else {
            let cleaned: String = expr::replace_aliases(trimmed)
                .chars()
                .filter(|c| c.is_ascii_digit() || EXPRESSION_SYMBOLS.contains(c))
                .collect();
            *slot = match plain_integer(&cleaned) {
                Some(value) => value.to_string(),
                None if cleaned.is_empty() => "0".to_string(),
                None => cleaned,
            };
        }
        self.normalize();
    }

    /// Handles loss of focus: evaluates the field and normalizes.
    pub fn commit(&mut self, field: Field) {
        let text = self.text(field).trim().to_string();
        let value = if text.is_empty() {
            0
        } else {
            match expr::evaluate(&text) {
                Ok(result) => clamp_float(result),
                Err(err) => {
                    log::debug!("{:?} field {:?}: {}, using plain integer", field, text, err);
                    clamp_non_negative(leading_integer(&text))
                }
            }
        };
        *self.text_mut(field) = value.to_string();
        self.normalize();
    }

    /// Rolls excess seconds into minutes and minutes into hours. Skipped while
    /// an expression is pending. Returns whether it ran.
    pub fn normalize(&mut self) -> bool {
        if self.has_pending_expression() {
            return false;
        }
        let (h, m, s) = self.values();
        *self = Self::new(h, m, s);
        true
    }
}

/// Carry-normalization: 0 ≤ minutes, seconds < 60, total preserved.
pub fn carry(hours: u64, minutes: u64, seconds: u64) -> (u64, u64, u64) {
    let minutes = minutes.saturating_add(seconds / 60);
    let seconds = seconds % 60;
    let hours = hours.saturating_add(minutes / 60);
    let minutes = minutes % 60;
    (hours, minutes, seconds)
}

fn plain_integer(text: &str) -> Option<u64> {
    if text.is_empty() || !text.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    Some(text.parse::<u64>().unwrap_or(u64::MAX))
}

/// Leading optionally-signed integer, 0 when there is none.
fn leading_integer(text: &str) -> i64 {
    let text = text.trim_start();
    let (negative, rest) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return 0;
    }
    let magnitude = digits.parse::<i64>().unwrap_or(i64::MAX);
    if negative {
        -magnitude
    } else {
        magnitude
    }
}

fn clamp_non_negative(value: i64) -> u64 {
    value.max(0) as u64
}

fn clamp_float(value: f64) -> u64 {
    // Saturating cast
    value.floor().max(0.0) as u64
}
