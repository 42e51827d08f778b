//! Double-buffered patch for atomic multi-field edits.
//!
//! The control side edits the back slot and commits it as a whole; the
//! audio side swaps on its next tick. A patch with only some of its fields
//! changed is never visible to the engine.

use sigma_config::PatchParams;

/// Two patch slots: the one the engine plays and the one being edited.
///
/// # Example
///
/// ```rust
/// use sigma_synth::StagedPatch;
/// use sigma_config::PatchParams;
///
/// let mut staged = StagedPatch::new(PatchParams::INIT);
/// staged.edit().env_attack_time = 250;
/// staged.edit().env_decay_time = 900;
/// assert_eq!(staged.active().env_attack_time, 10);
///
/// staged.commit();
/// let swapped = staged.take_pending().unwrap();
/// assert_eq!(swapped.env_attack_time, 250);
/// assert_eq!(swapped.env_decay_time, 900);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct StagedPatch {
    slots: [PatchParams; 2],
    active: usize,
    pending: bool,
}

impl StagedPatch {
    /// Both slots start as `patch`, nothing pending.
    pub fn new(patch: PatchParams) -> Self {
        Self {
            slots: [patch; 2],
            active: 0,
            pending: false,
        }
    }

    /// Patch currently in use by the engine.
    pub fn active(&self) -> &PatchParams {
        &self.slots[self.active]
    }

    /// Back slot, for editing. Changes are invisible until [`commit`](Self::commit).
    pub fn edit(&mut self) -> &mut PatchParams {
        &mut self.slots[self.active ^ 1]
    }

    /// Marks the back slot ready for the next swap.
    pub fn commit(&mut self) {
        self.pending = true;
    }

    /// Replaces the back slot with `patch` and commits it.
    pub fn stage(&mut self, patch: &PatchParams) {
        *self.edit() = *patch;
        self.commit();
    }

    /// True when a committed patch is waiting.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Swaps in a committed patch, if any, and returns it.
    ///
    /// The new back slot is refreshed from the new active slot so the next
    /// edit starts from what is playing.
    pub fn take_pending(&mut self) -> Option<&PatchParams> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        self.active ^= 1;
        self.slots[self.active ^ 1] = self.slots[self.active];
        Some(&self.slots[self.active])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sigma_config::factory_presets::FACTORY_PRESETS;

    #[test]
    fn test_uncommitted_edits_stay_hidden() {
        let mut staged = StagedPatch::new(PatchParams::INIT);
        staged.edit().lfo_freq_x10 = 120;
        assert!(!staged.is_pending());
        assert!(staged.take_pending().is_none());
        assert_eq!(staged.active().lfo_freq_x10, PatchParams::INIT.lfo_freq_x10);
    }

    #[test]
    fn test_swap_then_edit_starts_from_active() {
        let mut staged = StagedPatch::new(PatchParams::INIT);
        staged.stage(&FACTORY_PRESETS[4]);
        assert_eq!(staged.take_pending(), Some(&FACTORY_PRESETS[4]));
        assert_eq!(staged.active(), &FACTORY_PRESETS[4]);

        // back slot now mirrors the active patch, not the stale INIT
        staged.edit().limiter_level_pc = 80;
        staged.commit();
        let next = staged.take_pending().unwrap();
        assert_eq!(next.name, FACTORY_PRESETS[4].name);
        assert_eq!(next.limiter_level_pc, 80);
    }

    #[test]
    fn test_second_take_is_empty() {
        let mut staged = StagedPatch::new(PatchParams::INIT);
        staged.commit();
        assert!(staged.take_pending().is_some());
        assert!(staged.take_pending().is_none());
    }
}
