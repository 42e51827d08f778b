//! Timed MIDI byte scripts for offline rendering.
//!
//! One event per line: a time in milliseconds followed by hex bytes.
//! `#` starts a comment. Events are played in time order; events with the
//! same time keep their file order.
//!
//! ```text
//! # program 3, then a two-note legato phrase
//! 0     C0 03
//! 0     90 3C 64
//! 400   90 40 64
//! 450   80 3C 00
//! 1200  80 40 00
//! ```

use anyhow::Context;

/// One timed chunk of MIDI bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptEvent {
    /// Offset from the start of the render.
    pub time_ms: u32,
    /// Raw bytes fed to the receiver.
    pub bytes: Vec<u8>,
}

impl ScriptEvent {
    /// Sample index at which the event is delivered.
    pub fn sample_at(&self, sample_rate: u32) -> u64 {
        u64::from(self.time_ms) * u64::from(sample_rate) / 1000
    }
}

/// Parses a script, returning its events sorted by time.
pub fn parse_script(text: &str) -> anyhow::Result<Vec<ScriptEvent>> {
    let mut events = Vec::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or("").trim();
        if line.is_empty() {
            continue;
        }
        let mut fields = line.split_whitespace();
        let time_ms = fields
            .next()
            .and_then(|t| t.parse::<u32>().ok())
            .with_context(|| format!("line {}: expected a time in milliseconds", line_no + 1))?;
        let bytes = fields
            .map(|b| {
                let b = b.trim_start_matches("0x");
                u8::from_str_radix(b, 16)
                    .with_context(|| format!("line {}: invalid hex byte '{}'", line_no + 1, b))
            })
            .collect::<anyhow::Result<Vec<u8>>>()?;
        if bytes.is_empty() {
            anyhow::bail!("line {}: no MIDI bytes", line_no + 1);
        }
        events.push(ScriptEvent { time_ms, bytes });
    }
    events.sort_by_key(|e| e.time_ms);
    Ok(events)
}
