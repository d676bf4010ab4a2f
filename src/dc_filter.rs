//! DC offset removal filter
//!
//! Summing three gated DAC outputs gives a signal that never goes negative,
//! so its long-run mean sits well above zero. This filter tracks that mean
//! with a one-pole low pass and subtracts it.

use crate::mixer::StereoSample;

/// Time constant of the running mean, in samples
const TIME_CONSTANT: f64 = 1024.0;

/// DC offset removal filter (one-pole high pass, independent per side)
#[derive(Clone, Debug, Default)]
pub struct DcFilter {
    /// Running mean of the raw input
    mean: StereoSample,
}

impl DcFilter {
    /// Create a new DC filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a sample and return the DC-adjusted value
    #[inline]
    pub fn process(&mut self, raw: StereoSample) -> StereoSample {
        self.mean.left += (raw.left - self.mean.left) / TIME_CONSTANT;
        self.mean.right += (raw.right - self.mean.right) / TIME_CONSTANT;
        raw - self.mean
    }

    /// Current DC estimate
    #[inline]
    pub fn mean(&self) -> StereoSample {
        self.mean
    }

    /// Reset the filter state
    pub fn reset(&mut self) {
        self.mean = StereoSample::ZERO;
    }
}
