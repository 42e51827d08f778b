//! MIDI control-surface state: channel, mode, gate and controller values.

/// Controller numbers handled by the synth.
pub mod cc {
    /// Modulation wheel MSB.
    pub const MODULATION: u8 = 1;
    /// Breath controller MSB.
    pub const BREATH: u8 = 2;
    /// Channel volume MSB.
    pub const VOLUME: u8 = 7;
    /// Expression MSB.
    pub const EXPRESSION: u8 = 11;
    /// Offset from an MSB controller to its LSB partner.
    pub const LSB_OFFSET: u8 = 32;
    /// Legato footswitch.
    pub const LEGATO: u8 = 68;
    /// All sound off.
    pub const ALL_SOUND_OFF: u8 = 120;
    /// All notes off.
    pub const ALL_NOTES_OFF: u8 = 123;
    /// Omni mode off.
    pub const OMNI_OFF: u8 = 124;
    /// Omni mode on.
    pub const OMNI_ON: u8 = 125;
    /// Mono mode on.
    pub const MONO_ON: u8 = 126;
    /// Poly mode on.
    pub const POLY_ON: u8 = 127;
}

/// MIDI receive mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MidiMode {
    /// Poly, all channels.
    OmniOnPoly,
    /// Mono, all channels.
    #[default]
    OmniOnMono,
    /// Poly, receive channel only.
    OmniOffPoly,
    /// Mono, receive channel only.
    OmniOffMono,
}

impl MidiMode {
    /// Responds on every channel.
    pub fn is_omni(self) -> bool {
        matches!(self, Self::OmniOnPoly | Self::OmniOnMono)
    }

    /// One note at a time, with legato available.
    pub fn is_mono(self) -> bool {
        matches!(self, Self::OmniOnMono | Self::OmniOffMono)
    }

    /// Same mono/poly setting with omni switched.
    pub fn with_omni(self, omni: bool) -> Self {
        match (omni, self.is_mono()) {
            (true, true) => Self::OmniOnMono,
            (true, false) => Self::OmniOnPoly,
            (false, true) => Self::OmniOffMono,
            (false, false) => Self::OmniOffPoly,
        }
    }

    /// Same omni setting with mono switched.
    pub fn with_mono(self, mono: bool) -> Self {
        match (self.is_omni(), mono) {
            (true, true) => Self::OmniOnMono,
            (true, false) => Self::OmniOnPoly,
            (false, true) => Self::OmniOffMono,
            (false, false) => Self::OmniOffPoly,
        }
    }
}

/// Performance state written by the MIDI controller.
///
/// 14-bit controllers are kept as received: an MSB write clears the low
/// seven bits, a following LSB write fills them in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ControlSurface {
    channel: u8,
    mode: MidiMode,
    gate: bool,
    held_note: Option<u8>,
    legato: bool,
    pitch_bend: i16,
    modulation: u16,
    expression: u16,
}

impl Default for ControlSurface {
    fn default() -> Self {
        Self::new(1, MidiMode::default())
    }
}

impl ControlSurface {
    /// Full-scale 14-bit controller value.
    pub const CONTROLLER_MAX: u16 = 0x3FFF;

    /// Creates the power-up state: gate closed, bend centered, modulation
    /// off and expression at full scale.
    pub fn new(channel: u8, mode: MidiMode) -> Self {
        Self {
            channel: channel.clamp(1, 16),
            mode,
            gate: false,
            held_note: None,
            legato: false,
            pitch_bend: 0,
            modulation: 0,
            expression: Self::CONTROLLER_MAX,
        }
    }

    /// Receive channel, 1..=16.
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Sets the receive channel, clamped to 1..=16.
    pub fn set_channel(&mut self, channel: u8) {
        self.channel = channel.clamp(1, 16);
    }

    /// Receive mode.
    pub fn mode(&self) -> MidiMode {
        self.mode
    }

    /// Sets the receive mode.
    pub fn set_mode(&mut self, mode: MidiMode) {
        self.mode = mode;
    }

    /// True when a message on `channel` should be acted on.
    pub fn accepts(&self, channel: u8) -> bool {
        self.mode.is_omni() || channel == self.channel
    }

    /// True while a note is held.
    pub fn gate(&self) -> bool {
        self.gate
    }

    /// Note currently held.
    pub fn held_note(&self) -> Option<u8> {
        self.held_note
    }

    /// Records a note press.
    pub fn press(&mut self, note: u8) {
        self.gate = true;
        self.held_note = Some(note);
    }

    /// Records a note release. Returns false when `note` is not the held
    /// note, in which case nothing changes.
    pub fn release(&mut self, note: u8) -> bool {
        if self.held_note != Some(note) {
            return false;
        }
        self.release_all();
        true
    }

    /// Closes the gate regardless of the held note.
    pub fn release_all(&mut self) {
        self.gate = false;
        self.held_note = None;
    }

    /// Legato footswitch state.
    pub fn legato(&self) -> bool {
        self.legato
    }

    /// Sets the legato footswitch.
    pub fn set_legato(&mut self, on: bool) {
        self.legato = on;
    }

    /// Pitch bend, signed around center.
    pub fn pitch_bend(&self) -> i16 {
        self.pitch_bend
    }

    /// Records a pitch bend.
    pub fn set_pitch_bend(&mut self, value: i16) {
        self.pitch_bend = value;
    }

    /// Modulation wheel, 14-bit.
    pub fn modulation(&self) -> u16 {
        self.modulation
    }

    /// Expression (breath, volume or expression pedal), 14-bit.
    pub fn expression(&self) -> u16 {
        self.expression
    }

    /// Applies an MSB write to the modulation wheel.
    pub fn set_modulation_msb(&mut self, value: u8) {
        self.modulation = msb(value);
    }

    /// Applies an LSB write to the modulation wheel.
    pub fn set_modulation_lsb(&mut self, value: u8) {
        self.modulation = lsb(self.modulation, value);
    }

    /// Applies an MSB write to expression.
    pub fn set_expression_msb(&mut self, value: u8) {
        self.expression = msb(value);
    }

    /// Applies an LSB write to expression.
    pub fn set_expression_lsb(&mut self, value: u8) {
        self.expression = lsb(self.expression, value);
    }
}

fn msb(value: u8) -> u16 {
    u16::from(value & 0x7F) << 7
}

fn lsb(current: u16, value: u8) -> u16 {
    (current & !0x7F) | u16::from(value & 0x7F)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_omni_accepts_every_channel() {
        let surface = ControlSurface::new(3, MidiMode::OmniOnMono);
        assert!((1..=16).all(|ch| surface.accepts(ch)));

        let surface = ControlSurface::new(3, MidiMode::OmniOffMono);
        assert!(surface.accepts(3));
        assert!(!surface.accepts(1));
    }

    #[test]
    fn test_mode_switches_preserve_other_axis() {
        let mode = MidiMode::OmniOnMono.with_omni(false);
        assert_eq!(mode, MidiMode::OmniOffMono);
        assert_eq!(mode.with_mono(false), MidiMode::OmniOffPoly);
        assert_eq!(MidiMode::OmniOffPoly.with_omni(true), MidiMode::OmniOnPoly);
    }

    #[test]
    fn test_fourteen_bit_controllers() {
        let mut surface = ControlSurface::default();
        surface.set_modulation_msb(0x40);
        assert_eq!(surface.modulation(), 0x2000);
        surface.set_modulation_lsb(0x7F);
        assert_eq!(surface.modulation(), 0x207F);
        surface.set_modulation_msb(0x7F);
        assert_eq!(surface.modulation(), 0x3F80);
    }

    #[test]
    fn test_release_only_for_held_note() {
        let mut surface = ControlSurface::default();
        surface.press(60);
        surface.press(64);
        assert!(!surface.release(60));
        assert!(surface.gate());
        assert!(surface.release(64));
        assert!(!surface.gate());
    }

    #[test]
    fn test_channel_clamped() {
        assert_eq!(ControlSurface::new(0, MidiMode::OmniOffMono).channel(), 1);
        assert_eq!(ControlSurface::new(20, MidiMode::OmniOffMono).channel(), 16);
    }
}
