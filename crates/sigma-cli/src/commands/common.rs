//! Shared CLI helpers used across multiple commands.

use anyhow::Context;
use sigma_config::{FACTORY_PRESETS, PatchParams, factory_preset, find_preset, number_of_presets};
use std::path::Path;

/// A patch resolved from the command line.
pub struct ResolvedPatch {
    /// Factory table index, when the patch came from the table.
    pub index: Option<usize>,
    /// The patch itself.
    pub patch: PatchParams,
}

/// Resolve a patch by factory index, factory name, or TOML file path.
///
/// Searches in this order:
/// 1. Factory preset index (`0`, `1`, ...)
/// 2. Factory preset name (case-insensitive)
/// 3. File path to a `.toml` patch
pub fn load_patch(name: &str) -> anyhow::Result<ResolvedPatch> {
    if let Ok(index) = name.parse::<usize>() {
        let patch = factory_preset(index)?;
        return Ok(ResolvedPatch {
            index: Some(index),
            patch: *patch,
        });
    }

    if let Some((index, patch)) = find_preset(name) {
        return Ok(ResolvedPatch {
            index: Some(index),
            patch: *patch,
        });
    }

    let path = Path::new(name);
    if path.exists() {
        let patch = PatchParams::load(path)
            .with_context(|| format!("failed to load patch '{}'", path.display()))?;
        return Ok(ResolvedPatch { index: None, patch });
    }

    anyhow::bail!(
        "Preset '{}' not found ({} factory presets). Use 'sigma presets list' to see them.",
        name,
        number_of_presets()
    )
}

/// Parse a note given as a MIDI number (`60`) or a name (`C4`, `F#3`, `Bb2`).
///
/// Octave numbering puts middle C (note 60) at `C4`.
pub fn parse_note(s: &str) -> Result<u8, String> {
    if let Ok(n) = s.parse::<u8>() {
        return if n <= 127 {
            Ok(n)
        } else {
            Err(format!("note {} out of range (0-127)", n))
        };
    }

    let mut chars = s.chars();
    let letter = chars.next().ok_or("empty note")?;
    let base: i32 = match letter.to_ascii_uppercase() {
        'C' => 0,
        'D' => 2,
        'E' => 4,
        'F' => 5,
        'G' => 7,
        'A' => 9,
        'B' => 11,
        _ => return Err(format!("invalid note name: '{}'", s)),
    };
    let rest = chars.as_str();
    let (accidental, octave) = match rest.chars().next() {
        Some('#') => (1, &rest[1..]),
        Some('b') => (-1, &rest[1..]),
        _ => (0, rest),
    };
    let octave: i32 = octave
        .parse()
        .map_err(|_| format!("invalid octave in note '{}'", s))?;
    let note = (octave + 1) * 12 + base + accidental;
    u8::try_from(note)
        .ok()
        .filter(|&n| n <= 127)
        .ok_or_else(|| format!("note '{}' out of range (0-127)", s))
}

/// File-name friendly form of a preset name.
pub fn slug(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else {
                '_'
            }
        })
        .collect()
}

/// All factory presets with their indices.
pub fn factory_presets() -> impl Iterator<Item = (usize, &'static PatchParams)> {
    FACTORY_PRESETS.iter().enumerate()
}
