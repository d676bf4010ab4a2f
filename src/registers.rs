//! Register map
//!
//! The chip exposes sixteen 8-bit registers. R0-R13 drive the sound
//! generators; R14/R15 are the general-purpose I/O ports and are only
//! stored. Periods wider than a byte are split into a fine (low) and a coarse
//! (high) register, and every register implements only some of its bits.

use std::fmt;

/// Number of addressable registers
pub const NUM_REGISTERS: usize = 16;

/// Bits implemented by each register; unused bits read back as zero
pub const REG_MASK: [u8; NUM_REGISTERS] = [
    0xFF, 0x0F, 0xFF, 0x0F, 0xFF, 0x0F, 0x1F, 0xFF, 0x1F, 0x1F, 0x1F, 0xFF, 0xFF, 0x0F, 0xFF, 0xFF,
];

/// Width of a tone period (R0-R5, 12 bits)
pub const TONE_PERIOD_MASK: u16 = 0x0FFF;
/// Width of the noise period (R6, 5 bits)
pub const NOISE_PERIOD_MASK: u16 = 0x001F;
/// Width of the envelope period (R11/R12, 16 bits)
pub const ENVELOPE_PERIOD_MASK: u16 = 0xFFFF;

/// Amplitude register bit that hands the channel over to the envelope
pub const AMPLITUDE_ENVELOPE_BIT: u8 = 0x10;

/// Register address, in hardware order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Register {
    /// R0: tone A period, bits 0-7
    ToneAFine,
    /// R1: tone A period, bits 8-11
    ToneACoarse,
    /// R2: tone B period, bits 0-7
    ToneBFine,
    /// R3: tone B period, bits 8-11
    ToneBCoarse,
    /// R4: tone C period, bits 0-7
    ToneCFine,
    /// R5: tone C period, bits 8-11
    ToneCCoarse,
    /// R6: noise period
    NoisePeriod,
    /// R7: tone/noise enables, active low
    Mixer,
    /// R8: channel A volume and envelope bit
    AmplitudeA,
    /// R9: channel B volume and envelope bit
    AmplitudeB,
    /// R10: channel C volume and envelope bit
    AmplitudeC,
    /// R11: envelope period, bits 0-7
    EnvelopeFine,
    /// R12: envelope period, bits 8-15
    EnvelopeCoarse,
    /// R13: envelope shape, restarts the envelope when written
    EnvelopeShape,
    /// R14: I/O port A
    IoPortA,
    /// R15: I/O port B
    IoPortB,
}

impl Register {
    /// Every register, indexed by address
    pub const ALL: [Register; NUM_REGISTERS] = [
        Register::ToneAFine,
        Register::ToneACoarse,
        Register::ToneBFine,
        Register::ToneBCoarse,
        Register::ToneCFine,
        Register::ToneCCoarse,
        Register::NoisePeriod,
        Register::Mixer,
        Register::AmplitudeA,
        Register::AmplitudeB,
        Register::AmplitudeC,
        Register::EnvelopeFine,
        Register::EnvelopeCoarse,
        Register::EnvelopeShape,
        Register::IoPortA,
        Register::IoPortB,
    ];

    /// Look up a register by address; `None` above R15
    #[inline]
    pub fn from_addr(addr: u8) -> Option<Self> {
        Self::ALL.get(addr as usize).copied()
    }

    /// Register address (0-15)
    #[inline]
    pub fn addr(self) -> u8 {
        self as u8
    }

    /// Implemented bits of this register
    #[inline]
    pub fn mask(self) -> u8 {
        REG_MASK[self as usize]
    }

    /// Short lowercase name
    pub fn name(self) -> &'static str {
        match self {
            Register::ToneAFine => "tone A fine",
            Register::ToneACoarse => "tone A coarse",
            Register::ToneBFine => "tone B fine",
            Register::ToneBCoarse => "tone B coarse",
            Register::ToneCFine => "tone C fine",
            Register::ToneCCoarse => "tone C coarse",
            Register::NoisePeriod => "noise period",
            Register::Mixer => "mixer",
            Register::AmplitudeA => "amplitude A",
            Register::AmplitudeB => "amplitude B",
            Register::AmplitudeC => "amplitude C",
            Register::EnvelopeFine => "envelope fine",
            Register::EnvelopeCoarse => "envelope coarse",
            Register::EnvelopeShape => "envelope shape",
            Register::IoPortA => "port A",
            Register::IoPortB => "port B",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "R{} {}", self.addr(), self.name())
    }
}
