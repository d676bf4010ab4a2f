//! Chip configuration
//!
//! A [`ChipConfig`] bundles everything fixed at construction time. It is
//! serde-serializable so hosts can keep it next to their own settings.
//!
//! ```
//! use ayumi::{Chip, ChipConfig};
//!
//! # fn main() -> ayumi::Result<()> {
//! let chip = Chip::from_config(&ChipConfig::atari_st(48_000))?;
//! assert_eq!(chip.clock_hz(), 2_000_000);
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};

use crate::tables::ChipType;
use crate::{AyumiError, Result};

const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// ZX Spectrum 128 PSG clock
pub const ZX_SPECTRUM_CLOCK: u32 = 1_773_400;
/// Atari ST PSG clock
pub const ATARI_ST_CLOCK: u32 = 2_000_000;
/// Amstrad CPC PSG clock
pub const AMSTRAD_CPC_CLOCK: u32 = 1_000_000;
/// MSX PSG clock
pub const MSX_CLOCK: u32 = 1_789_772;

/// Construction parameters of a [`Chip`](crate::Chip)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChipConfig {
    /// Emulated chip variant
    pub chip_type: ChipType,
    /// Output sample rate in Hz
    pub sample_rate: u32,
    /// Chip input clock in Hz
    pub clock_hz: u32,
}

impl ChipConfig {
    /// Configuration for an arbitrary machine
    pub fn new(chip_type: ChipType, sample_rate: u32, clock_hz: u32) -> Self {
        Self {
            chip_type,
            sample_rate,
            clock_hz,
        }
    }

    /// ZX Spectrum 128 (AY-3-8912 at 1.7734 MHz)
    pub fn zx_spectrum(sample_rate: u32) -> Self {
        Self::new(ChipType::Ay, sample_rate, ZX_SPECTRUM_CLOCK)
    }

    /// Atari ST (YM2149 at 2 MHz)
    pub fn atari_st(sample_rate: u32) -> Self {
        Self::new(ChipType::Ym, sample_rate, ATARI_ST_CLOCK)
    }

    /// Amstrad CPC (AY-3-8912 at 1 MHz)
    pub fn amstrad_cpc(sample_rate: u32) -> Self {
        Self::new(ChipType::Ay, sample_rate, AMSTRAD_CPC_CLOCK)
    }

    /// MSX (AY-3-8910 at 1.7898 MHz)
    pub fn msx(sample_rate: u32) -> Self {
        Self::new(ChipType::Ay, sample_rate, MSX_CLOCK)
    }

    /// Check that both rates are positive
    pub fn validate(&self) -> Result<()> {
        if self.sample_rate == 0 {
            return Err(AyumiError::invalid("sample rate must be positive"));
        }
        if self.clock_hz == 0 {
            return Err(AyumiError::invalid("chip clock must be positive"));
        }
        Ok(())
    }
}

impl Default for ChipConfig {
    fn default() -> Self {
        Self::zx_spectrum(DEFAULT_SAMPLE_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(ChipConfig::atari_st(44_100).chip_type, ChipType::Ym);
        assert_eq!(ChipConfig::amstrad_cpc(44_100).clock_hz, 1_000_000);
        assert_eq!(ChipConfig::default().sample_rate, 44_100);
        assert!(ChipConfig::msx(48_000).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero() {
        assert!(ChipConfig::new(ChipType::Ay, 0, 1_000_000).validate().is_err());
        assert!(ChipConfig::new(ChipType::Ym, 44_100, 0).validate().is_err());
    }

    #[test]
    fn test_config_json() {
        let cfg = ChipConfig::atari_st(48_000);
        let json = serde_json::to_string(&cfg).unwrap();
        assert_eq!(
            json,
            r#"{"chip_type":"ym","sample_rate":48000,"clock_hz":2000000}"#
        );
        let back: ChipConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_config_json_defaults_missing_fields() {
        let cfg: ChipConfig = serde_json::from_str(r#"{"chip_type":"ym"}"#).unwrap();
        assert_eq!(cfg.chip_type, ChipType::Ym);
        assert_eq!(cfg.clock_hz, ZX_SPECTRUM_CLOCK);
    }
}
