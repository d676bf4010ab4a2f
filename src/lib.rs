//! AY-3-8910 / YM2149 PSG synthesis core
//!
//! A cycle-accurate emulator of the General Instrument AY-3-8910 and the
//! Yamaha YM2149 programmable sound generators, producing a deterministic
//! stream of stereo samples from the chip registers.
//!
//! # Features
//! - Three square-wave tone channels, shared 17-bit LFSR noise
//! - Envelope generator with all 16 hardware shapes (32-step resolution)
//! - Measured nonlinear DAC tables for both chip variants
//! - Linear and equal-power stereo panning per channel
//! - Exact fractional clock decimation (no pitch drift over long runs)
//! - DC offset removal as an explicit, inspectable step
//!
//! # Quick start
//! ```
//! use ayumi::{Chip, ChipType, ToneChannel};
//!
//! # fn main() -> ayumi::Result<()> {
//! let mut chip = Chip::new(ChipType::Ay, 44_100, 1_773_400)?;
//! chip.tone(ToneChannel::A)
//!     .period(254)?
//!     .volume(15)?
//!     .mixer(true, false, false);
//! chip.envelope().period(600)?.shape(12)?;
//!
//! for _ in 0..441 {
//!     chip.process();
//!     chip.remove_dc();
//!     let frame = chip.sample();
//!     assert!(frame.left.is_finite() && frame.right.is_finite());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Raw register access
//! Song formats that store register frames can drive the chip through
//! [`Chip::write_register`], which applies the hardware register widths:
//! ```
//! use ayumi::{Chip, ChipType};
//!
//! # fn main() -> ayumi::Result<()> {
//! let mut chip = Chip::new(ChipType::Ym, 44_100, 2_000_000)?;
//! chip.write_register(0x00, 0x1C)?; // Tone A Lo
//! chip.write_register(0x01, 0x01)?; // Tone A Hi
//! chip.write_register(0x07, 0x3E)?; // Tone A only
//! chip.write_register(0x08, 0x0F)?; // Volume A
//! chip.process();
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

pub mod chip;
pub mod config;
pub mod dc_filter;
pub mod decimator;
pub mod envelope;
pub mod generators;
pub mod mixer;
pub mod registers;
pub mod tables;

/// Error types for PSG emulator operations
///
/// Every failure the core can report is a caller bug: an out-of-range
/// register value or an impossible clock configuration. Rendering itself
/// never fails.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum AyumiError {
    /// Out-of-range register value or construction parameter
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl AyumiError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        AyumiError::InvalidArgument(msg.into())
    }
}

/// Result type for emulator operations
pub type Result<T> = std::result::Result<T, AyumiError>;

// Public API exports
pub use chip::{Chip, EnvelopeControl, NoiseControl, ToneControl};
pub use config::ChipConfig;
pub use dc_filter::DcFilter;
pub use decimator::ClockDecimator;
pub use envelope::{EnvelopeGenerator, EnvelopeShape};
pub use generators::{NoiseGenerator, ToneChannel, ToneGenerator, NUM_CHANNELS};
pub use mixer::{ChannelControl, Mixer, MixerFlags, Pan, StereoSample};
pub use registers::Register;
pub use tables::ChipType;
