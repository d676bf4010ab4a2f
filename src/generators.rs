//! Tone and noise generators
//!
//! Both generators are clocked in PSG ticks: the chip clock divided by 8, the
//! fastest rate at which anything inside the chip changes.
//! - Tone generators toggle their output every `period` ticks
//! - The noise generator shifts its LFSR every `2 * period` ticks

use std::fmt;

use log::warn;

use crate::{AyumiError, Result};

/// Number of tone channels
pub const NUM_CHANNELS: usize = 3;

/// Width of the noise shift register
const LFSR_BITS: u32 = 17;

/// Tone channel id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToneChannel {
    /// Channel A
    A = 0,
    /// Channel B
    B = 1,
    /// Channel C
    C = 2,
}

impl ToneChannel {
    /// All channels in register order
    pub const ALL: [ToneChannel; NUM_CHANNELS] = [ToneChannel::A, ToneChannel::B, ToneChannel::C];

    /// Channel index (0 = A, 1 = B, 2 = C)
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ToneChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToneChannel::A => write!(f, "A"),
            ToneChannel::B => write!(f, "B"),
            ToneChannel::C => write!(f, "C"),
        }
    }
}

/// Validate a period register value.
///
/// The chip cannot represent a zero period; it behaves like period 1.
pub(crate) fn effective_period(what: &str, period: i32) -> Result<u32> {
    if period < 0 {
        return Err(AyumiError::invalid(format!(
            "{what} period must be non-negative, got {period}"
        )));
    }
    Ok((period as u32).max(1))
}

/// Validate a period and cut it to the width of its register.
pub(crate) fn masked_period(what: &str, period: i32, mask: u16) -> Result<u16> {
    effective_period(what, period)?;
    Ok((period & i32::from(mask)) as u16)
}

/// Square-wave generator for a single channel
#[derive(Clone, Debug)]
pub struct ToneGenerator {
    /// Half-period in PSG ticks (never zero)
    period: u32,
    /// Ticks elapsed in the current half-cycle
    counter: u32,
    /// Current output level
    output: bool,
}

impl ToneGenerator {
    /// Create a new tone generator in its reset state (period 1, output low)
    pub fn new() -> Self {
        Self {
            period: 1,
            counter: 0,
            output: false,
        }
    }

    /// Set the tone period.
    ///
    /// The new period applies from the next tick; the running half-cycle
    /// counter is kept.
    pub fn set_period(&mut self, period: i32) -> Result<()> {
        self.period = effective_period("tone", period)?;
        Ok(())
    }

    /// Set the period from register R0-R5 contents
    #[inline]
    pub(crate) fn load_period(&mut self, period: u16) {
        self.period = u32::from(period).max(1);
    }

    /// Effective period in PSG ticks (at least 1)
    #[inline]
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Current output bit
    #[inline]
    pub fn output(&self) -> bool {
        self.output
    }

    /// Advance by one PSG tick and return the output bit
    #[inline]
    pub fn tick(&mut self) -> bool {
        self.counter += 1;
        if self.counter >= self.period {
            self.counter = 0;
            self.output = !self.output;
        }
        self.output
    }

    /// Advance by `ticks` PSG ticks
    pub fn step(&mut self, ticks: u32) -> bool {
        for _ in 0..ticks {
            self.tick();
        }
        self.output
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ToneGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Noise generator using a 17-bit LFSR
///
/// Shared by all three channels. Feedback is `bit0 ^ bit3`, shifted in at
/// bit 16, which gives the maximal 131071-step sequence of the hardware.
#[derive(Clone, Debug)]
pub struct NoiseGenerator {
    /// Period from register R6 (never zero)
    period: u32,
    /// Ticks elapsed since the last shift
    counter: u32,
    /// 17-bit shift register, must be non-zero
    lfsr: u32,
}

impl NoiseGenerator {
    /// Create a new noise generator
    pub fn new() -> Self {
        Self {
            period: 1,
            counter: 0,
            lfsr: 1,
        }
    }

    /// Set the noise period
    pub fn set_period(&mut self, period: i32) -> Result<()> {
        self.period = effective_period("noise", period)?;
        Ok(())
    }

    /// Set the period from register R6 contents
    #[inline]
    pub(crate) fn load_period(&mut self, period: u16) {
        self.period = u32::from(period).max(1);
    }

    /// Effective period (at least 1)
    #[inline]
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Current shift register contents
    #[inline]
    pub fn lfsr(&self) -> u32 {
        self.lfsr
    }

    /// Current output bit (LFSR bit 0)
    #[inline]
    pub fn output(&self) -> bool {
        self.lfsr & 1 != 0
    }

    /// Advance by one PSG tick and return the output bit
    ///
    /// The noise counter runs at half the tone rate.
    #[inline]
    pub fn tick(&mut self) -> bool {
        self.counter += 1;
        if self.counter >= self.period << 1 {
            self.counter = 0;
            self.shift();
        }
        self.output()
    }

    /// Advance by `ticks` PSG ticks
    pub fn step(&mut self, ticks: u32) -> bool {
        for _ in 0..ticks {
            self.tick();
        }
        self.output()
    }

    /// Shift the LFSR by one position
    #[inline]
    fn shift(&mut self) {
        let bit = (self.lfsr ^ (self.lfsr >> 3)) & 1;
        self.lfsr = (self.lfsr >> 1) | (bit << (LFSR_BITS - 1));
        if self.lfsr == 0 {
            warn!("noise LFSR reached zero, reseeding");
            self.lfsr = 1;
        }
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new()
    }
}
