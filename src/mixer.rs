//! Audio mixer and DAC stage
//!
//! The mixer gates each channel with its tone and noise bits (register R7),
//! picks either the fixed volume or the envelope level, converts the digital
//! amplitude through the chip's DAC table and spreads it across the stereo
//! field with the channel's pan weights.

use std::f64::consts::FRAC_PI_2;
use std::ops::{Add, AddAssign, Div, Sub};

use bitflags::bitflags;

use crate::generators::NUM_CHANNELS;
use crate::tables::{ChipType, DAC_TABLE_SIZE};
use crate::{AyumiError, Result};

/// Highest fixed channel volume
pub const MAX_VOLUME: u8 = 15;

bitflags! {
    /// Per-channel mixer flags
    ///
    /// Unlike register R7 (active-low), a set flag means the source is
    /// enabled for the channel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MixerFlags: u8 {
        /// Tone bit gates the channel
        const TONE = 0b001;
        /// Noise bit gates the channel
        const NOISE = 0b010;
        /// Envelope level replaces the fixed volume
        const ENVELOPE = 0b100;
    }
}

impl MixerFlags {
    /// Build flags from three independent booleans
    pub fn from_enables(tone: bool, noise: bool, envelope: bool) -> Self {
        let mut flags = MixerFlags::empty();
        flags.set(MixerFlags::TONE, tone);
        flags.set(MixerFlags::NOISE, noise);
        flags.set(MixerFlags::ENVELOPE, envelope);
        flags
    }

    /// AND-gate mixing law: a source silences the channel only when it is
    /// enabled and its bit is low.
    #[inline]
    pub fn gate(self, tone_bit: bool, noise_bit: bool) -> bool {
        (tone_bit || !self.contains(MixerFlags::TONE))
            && (noise_bit || !self.contains(MixerFlags::NOISE))
    }
}

/// One stereo output frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StereoSample {
    /// Left channel sample
    pub left: f64,
    /// Right channel sample
    pub right: f64,
}

impl StereoSample {
    /// Silent frame
    pub const ZERO: StereoSample = StereoSample {
        left: 0.0,
        right: 0.0,
    };

    /// Create a frame from its two sides
    #[inline]
    pub fn new(left: f64, right: f64) -> Self {
        Self { left, right }
    }
}

impl Add for StereoSample {
    type Output = StereoSample;

    #[inline]
    fn add(self, rhs: StereoSample) -> StereoSample {
        StereoSample::new(self.left + rhs.left, self.right + rhs.right)
    }
}

impl AddAssign for StereoSample {
    #[inline]
    fn add_assign(&mut self, rhs: StereoSample) {
        self.left += rhs.left;
        self.right += rhs.right;
    }
}

impl Sub for StereoSample {
    type Output = StereoSample;

    #[inline]
    fn sub(self, rhs: StereoSample) -> StereoSample {
        StereoSample::new(self.left - rhs.left, self.right - rhs.right)
    }
}

impl Div<f64> for StereoSample {
    type Output = StereoSample;

    #[inline]
    fn div(self, rhs: f64) -> StereoSample {
        StereoSample::new(self.left / rhs, self.right / rhs)
    }
}

/// Stereo placement of a channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pan {
    position: f64,
    equal_power: bool,
    left: f64,
    right: f64,
}

impl Pan {
    /// Centered, linear law
    pub const CENTER: Pan = Pan {
        position: 0.5,
        equal_power: false,
        left: 0.5,
        right: 0.5,
    };

    /// Create a pan setting.
    ///
    /// `position` runs from 0.0 (hard left) to 1.0 (hard right). The linear
    /// law splits the amplitude as `1 - pan` / `pan`; the equal-power law uses
    /// `cos(pan * pi/2)` / `sin(pan * pi/2)` so that perceived loudness stays
    /// constant across the field.
    pub fn new(position: f64, equal_power: bool) -> Result<Self> {
        if !(0.0..=1.0).contains(&position) {
            return Err(AyumiError::invalid(format!(
                "pan must be in 0.0..=1.0, got {position}"
            )));
        }
        let (left, right) = if equal_power {
            let angle = position * FRAC_PI_2;
            (angle.cos(), angle.sin())
        } else {
            (1.0 - position, position)
        };
        Ok(Self {
            position,
            equal_power,
            left,
            right,
        })
    }

    /// Pan position (0.0-1.0)
    #[inline]
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Whether the equal-power law is used
    #[inline]
    pub fn is_equal_power(&self) -> bool {
        self.equal_power
    }

    /// Left gain
    #[inline]
    pub fn left(&self) -> f64 {
        self.left
    }

    /// Right gain
    #[inline]
    pub fn right(&self) -> f64 {
        self.right
    }

    /// Spread a magnitude across both sides
    #[inline]
    pub fn apply(&self, magnitude: f64) -> StereoSample {
        StereoSample::new(magnitude * self.left, magnitude * self.right)
    }
}

impl Default for Pan {
    fn default() -> Self {
        Pan::CENTER
    }
}

/// Per-channel mixer settings
#[derive(Clone, Debug, Default)]
pub struct ChannelControl {
    volume: u8,
    pan: Pan,
    flags: MixerFlags,
    /// User mute flag
    muted: bool,
}

impl ChannelControl {
    /// Set the fixed volume (0-15)
    pub fn set_volume(&mut self, volume: u8) -> Result<()> {
        if volume > MAX_VOLUME {
            return Err(AyumiError::invalid(format!(
                "volume must be in 0..=15, got {volume}"
            )));
        }
        self.volume = volume;
        Ok(())
    }

    /// Set the fixed volume from amplitude register bits 0-3
    #[inline]
    pub(crate) fn load_volume(&mut self, value: u8) {
        self.volume = value & MAX_VOLUME;
    }

    /// Fixed volume
    #[inline]
    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Set stereo placement
    pub fn set_pan(&mut self, pan: f64, equal_power: bool) -> Result<()> {
        self.pan = Pan::new(pan, equal_power)?;
        Ok(())
    }

    /// Stereo placement
    #[inline]
    pub fn pan(&self) -> Pan {
        self.pan
    }

    /// Set mixer flags
    #[inline]
    pub fn set_flags(&mut self, flags: MixerFlags) {
        self.flags = flags;
    }

    /// Mixer flags
    #[inline]
    pub fn flags(&self) -> MixerFlags {
        self.flags
    }

    /// Mute or unmute the channel
    #[inline]
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Whether the channel is muted
    #[inline]
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Digital amplitude index (0-31) for the given oscillator bits
    #[inline]
    pub fn level_index(&self, tone_bit: bool, noise_bit: bool, envelope_level: u8) -> usize {
        if !self.flags.gate(tone_bit, noise_bit) {
            return 0;
        }
        if self.flags.contains(MixerFlags::ENVELOPE) {
            envelope_level as usize
        } else {
            (self.volume as usize) * 2 + 1
        }
    }
}

/// Audio mixer and output stage
#[derive(Clone, Debug)]
pub struct Mixer {
    dac: &'static [f64; DAC_TABLE_SIZE],
    /// Per-channel state
    channels: [ChannelControl; NUM_CHANNELS],
    /// Last DAC magnitude per channel (before panning)
    last_levels: [f64; NUM_CHANNELS],
}

impl Mixer {
    /// Create a mixer using the DAC table of `chip_type`
    pub fn new(chip_type: ChipType) -> Self {
        Self {
            dac: chip_type.dac_table(),
            channels: Default::default(),
            last_levels: [0.0; NUM_CHANNELS],
        }
    }

    /// Channel settings
    #[inline]
    pub fn channel(&self, index: usize) -> &ChannelControl {
        &self.channels[index]
    }

    /// Mutable channel settings
    #[inline]
    pub fn channel_mut(&mut self, index: usize) -> &mut ChannelControl {
        &mut self.channels[index]
    }

    /// DAC magnitude of each channel at the last mix
    #[inline]
    pub fn last_levels(&self) -> [f64; NUM_CHANNELS] {
        self.last_levels
    }

    /// Mix one PSG tick worth of oscillator output into a stereo frame
    ///
    /// # Arguments
    ///
    /// * `tone_bits` - Output bit of each tone generator
    /// * `noise_bit` - Shared noise output bit
    /// * `envelope_level` - Shared envelope level (0-31)
    #[inline]
    pub fn mix(
        &mut self,
        tone_bits: [bool; NUM_CHANNELS],
        noise_bit: bool,
        envelope_level: u8,
    ) -> StereoSample {
        let mut out = StereoSample::ZERO;
        for (i, ch) in self.channels.iter().enumerate() {
            let magnitude = if ch.muted {
                0.0
            } else {
                self.dac[ch.level_index(tone_bits[i], noise_bit, envelope_level)]
            };
            self.last_levels[i] = magnitude;
            out += ch.pan.apply(magnitude);
        }
        out
    }

    /// Reset all channel settings, keeping the DAC table
    pub fn reset(&mut self) {
        self.channels = Default::default();
        self.last_levels = [0.0; NUM_CHANNELS];
    }
}
