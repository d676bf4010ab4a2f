//! Envelope generator
//!
//! The envelope is a shared 32-step amplitude ramp that any channel can use
//! instead of its fixed volume. Register R13 selects one of 16 shapes; each
//! shape is four control bits that decide what happens once the first ramp
//! completes:
//!
//! | bit | name      | effect                                              |
//! |-----|-----------|-----------------------------------------------------|
//! | 3   | CONTINUE  | keep cycling after the first ramp (else drop to 0)  |
//! | 2   | ATTACK    | first ramp counts up (else down)                    |
//! | 1   | ALTERNATE | reverse direction after every ramp                  |
//! | 0   | HOLD      | freeze after the first ramp                         |
//!
//! ```text
//! 0-3, 9   \_______      8   \\\\\\\\      12  ////////
//! 4-7, 15  /_______      10  \/\/\/\/      14  /\/\/\/\
//!                        11  \‾‾‾‾‾‾‾      13  /‾‾‾‾‾‾‾
//! ```

use std::fmt;

use bitflags::bitflags;
use log::trace;

use crate::generators::effective_period;
use crate::tables::MAX_LEVEL;
use crate::{AyumiError, Result};

bitflags! {
    /// Control bits of an envelope shape (register R13)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShapeFlags: u8 {
        /// Freeze after the first ramp
        const HOLD = 0b0001;
        /// Reverse direction after every ramp
        const ALTERNATE = 0b0010;
        /// First ramp counts up
        const ATTACK = 0b0100;
        /// Keep cycling after the first ramp
        const CONTINUE = 0b1000;
    }
}

/// Envelope Shape Control - Register R13
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum EnvelopeShape {
    /// 0000: Decay once, then silence
    #[default]
    Decay0 = 0x00,
    /// 0001: Decay once, then silence
    Decay1 = 0x01,
    /// 0010: Decay once, then silence
    Decay2 = 0x02,
    /// 0011: Decay once, then silence
    Decay3 = 0x03,
    /// 0100: Attack once, then silence
    Attack0 = 0x04,
    /// 0101: Attack once, then silence
    Attack1 = 0x05,
    /// 0110: Attack once, then silence
    Attack2 = 0x06,
    /// 0111: Attack once, then silence
    Attack3 = 0x07,
    /// 1000: Repeating sawtooth down (buzzer)
    SawtoothDown = 0x08,
    /// 1001: Decay once, then silence
    DecayHoldLow = 0x09,
    /// 1010: Repeating triangle starting high
    TriangleDown = 0x0A,
    /// 1011: Decay once, then hold at maximum
    DecayHoldHigh = 0x0B,
    /// 1100: Repeating sawtooth up (buzzer)
    SawtoothUp = 0x0C,
    /// 1101: Attack once, then hold at maximum
    AttackHoldHigh = 0x0D,
    /// 1110: Repeating triangle starting low
    TriangleUp = 0x0E,
    /// 1111: Attack once, then silence
    AttackHoldLow = 0x0F,
}

impl EnvelopeShape {
    /// Create from raw register value (upper nibble ignored)
    pub fn from_value(val: u8) -> Self {
        match val & 0x0F {
            0x00 => EnvelopeShape::Decay0,
            0x01 => EnvelopeShape::Decay1,
            0x02 => EnvelopeShape::Decay2,
            0x03 => EnvelopeShape::Decay3,
            0x04 => EnvelopeShape::Attack0,
            0x05 => EnvelopeShape::Attack1,
            0x06 => EnvelopeShape::Attack2,
            0x07 => EnvelopeShape::Attack3,
            0x08 => EnvelopeShape::SawtoothDown,
            0x09 => EnvelopeShape::DecayHoldLow,
            0x0A => EnvelopeShape::TriangleDown,
            0x0B => EnvelopeShape::DecayHoldHigh,
            0x0C => EnvelopeShape::SawtoothUp,
            0x0D => EnvelopeShape::AttackHoldHigh,
            0x0E => EnvelopeShape::TriangleUp,
            _ => EnvelopeShape::AttackHoldLow,
        }
    }

    /// Create from a register value, rejecting values above 15
    pub fn try_from_value(val: u8) -> Result<Self> {
        if val > 0x0F {
            return Err(AyumiError::invalid(format!(
                "envelope shape must be in 0..=15, got {val}"
            )));
        }
        Ok(Self::from_value(val))
    }

    /// Register value of this shape
    #[inline]
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Decoded control bits
    #[inline]
    pub fn flags(self) -> ShapeFlags {
        ShapeFlags::from_bits_truncate(self as u8)
    }

    /// Whether the shape keeps moving forever
    pub fn is_repeating(self) -> bool {
        let flags = self.flags();
        flags.contains(ShapeFlags::CONTINUE) && !flags.contains(ShapeFlags::HOLD)
    }

    /// Level the envelope freezes at once a non-repeating shape completes
    fn terminal_level(self) -> u8 {
        let flags = self.flags();
        if !flags.contains(ShapeFlags::CONTINUE) {
            return 0;
        }
        if flags.contains(ShapeFlags::ATTACK) != flags.contains(ShapeFlags::ALTERNATE) {
            MAX_LEVEL
        } else {
            0
        }
    }
}

impl fmt::Display for EnvelopeShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EnvelopeShape::Decay0
            | EnvelopeShape::Decay1
            | EnvelopeShape::Decay2
            | EnvelopeShape::Decay3
            | EnvelopeShape::DecayHoldLow => write!(f, "Decay"),
            EnvelopeShape::Attack0
            | EnvelopeShape::Attack1
            | EnvelopeShape::Attack2
            | EnvelopeShape::Attack3
            | EnvelopeShape::AttackHoldLow => write!(f, "Attack"),
            EnvelopeShape::SawtoothDown => write!(f, "Sawtooth-Down (Buzzer)"),
            EnvelopeShape::TriangleDown => write!(f, "Triangle-Down"),
            EnvelopeShape::DecayHoldHigh => write!(f, "Decay-Hold-High"),
            EnvelopeShape::SawtoothUp => write!(f, "Sawtooth-Up (Buzzer)"),
            EnvelopeShape::AttackHoldHigh => write!(f, "Attack-Hold-High"),
            EnvelopeShape::TriangleUp => write!(f, "Triangle-Up"),
        }
    }
}

/// Envelope generator with 16 hardware shapes
#[derive(Clone, Debug)]
pub struct EnvelopeGenerator {
    /// Period from registers R11/R12 (never zero)
    period: u32,
    /// Ticks elapsed since the last step
    counter: u32,
    shape: EnvelopeShape,
    /// Position within the current 32-step ramp
    step: u8,
    /// Direction of the current ramp
    rising: bool,
    /// Frozen at `held_level`
    holding: bool,
    held_level: u8,
}

impl EnvelopeGenerator {
    /// Create a new envelope generator (period 1, shape 0, restarted)
    pub fn new() -> Self {
        let mut env = Self {
            period: 1,
            counter: 0,
            shape: EnvelopeShape::default(),
            step: 0,
            rising: false,
            holding: false,
            held_level: 0,
        };
        env.restart();
        env
    }

    /// Set the envelope period
    pub fn set_period(&mut self, period: i32) -> Result<()> {
        self.period = effective_period("envelope", period)?;
        Ok(())
    }

    /// Set the period from register R11/R12 contents
    #[inline]
    pub(crate) fn load_period(&mut self, period: u16) {
        self.period = u32::from(period).max(1);
    }

    /// Effective period (at least 1)
    #[inline]
    pub fn period(&self) -> u32 {
        self.period
    }

    /// Set the envelope shape from register R13.
    ///
    /// Writing the shape register always restarts the envelope, even when
    /// the shape is unchanged.
    pub fn set_shape(&mut self, shape: u8) -> Result<()> {
        self.load_shape(EnvelopeShape::try_from_value(shape)?);
        Ok(())
    }

    /// Select a decoded shape and restart
    pub(crate) fn load_shape(&mut self, shape: EnvelopeShape) {
        self.shape = shape;
        self.restart();
        trace!("envelope restarted with shape {} ({shape})", shape.value());
    }

    /// Current shape
    #[inline]
    pub fn shape(&self) -> EnvelopeShape {
        self.shape
    }

    /// Position within the current ramp (0-31)
    #[inline]
    pub fn step_index(&self) -> u8 {
        self.step
    }

    /// Whether a non-repeating shape has reached its terminal level
    #[inline]
    pub fn is_holding(&self) -> bool {
        self.holding
    }

    /// Restart the current shape from its first step
    pub fn restart(&mut self) {
        self.counter = 0;
        self.step = 0;
        self.rising = self.shape.flags().contains(ShapeFlags::ATTACK);
        self.holding = false;
        self.held_level = 0;
    }

    /// Current amplitude index (0-31)
    #[inline]
    pub fn level(&self) -> u8 {
        if self.holding {
            self.held_level
        } else if self.rising {
            self.step
        } else {
            MAX_LEVEL - self.step
        }
    }

    /// Advance by one PSG tick and return the level
    #[inline]
    pub fn tick(&mut self) -> u8 {
        self.counter += 1;
        if self.counter >= self.period {
            self.counter = 0;
            self.advance();
        }
        self.level()
    }

    /// Advance by `ticks` PSG ticks
    pub fn step(&mut self, ticks: u32) -> u8 {
        for _ in 0..ticks {
            self.tick();
        }
        self.level()
    }

    /// Move to the next envelope step
    fn advance(&mut self) {
        if self.holding {
            return;
        }
        if self.step < MAX_LEVEL {
            self.step += 1;
            return;
        }

        // End of a ramp
        if self.shape.is_repeating() {
            if self.shape.flags().contains(ShapeFlags::ALTERNATE) {
                self.rising = !self.rising;
            }
            self.step = 0;
        } else {
            self.holding = true;
            self.held_level = self.shape.terminal_level();
        }
    }

    /// Reset to initial state
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for EnvelopeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
