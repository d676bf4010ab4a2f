//! Chip clock to output sample rate conversion
//!
//! The chip clock and the host sample rate are independent and rarely
//! integer multiples. The decimator hands out whole chip clocks per output
//! sample Bresenham-style: the fractional remainder is carried forward, so the
//! per-sample count alternates between floor and ceiling and the long-run
//! total is exact.

use crate::{AyumiError, Result};

/// Chip clocks per PSG tick (the chip's fixed input prescaler)
pub const CLOCKS_PER_TICK: u32 = 8;

/// Clock budget of one output sample
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleWindow {
    /// Chip clocks consumed by this sample
    pub clocks: u32,
    /// PSG ticks (clock / 8) that complete inside this sample
    pub ticks: u32,
}

/// Fractional clock accumulator
#[derive(Debug, Clone)]
pub struct ClockDecimator {
    clock_hz: u32,
    sample_rate: u32,
    /// Numerator of the fractional clock carried to the next sample
    remainder: u64,
    /// Chip clocks not yet forming a full PSG tick
    prescaler: u32,
    total_clocks: u64,
}

impl ClockDecimator {
    /// Create a decimator for `clock_hz` chip clocks per second and
    /// `sample_rate` output samples per second
    pub fn new(clock_hz: u32, sample_rate: u32) -> Result<Self> {
        if clock_hz == 0 {
            return Err(AyumiError::invalid("chip clock must be positive"));
        }
        if sample_rate == 0 {
            return Err(AyumiError::invalid("sample rate must be positive"));
        }
        Ok(Self {
            clock_hz,
            sample_rate,
            remainder: 0,
            prescaler: 0,
            total_clocks: 0,
        })
    }

    /// Chip clock frequency in Hz
    #[inline]
    pub fn clock_hz(&self) -> u32 {
        self.clock_hz
    }

    /// Output sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Average chip clocks per output sample
    pub fn clocks_per_sample(&self) -> f64 {
        self.clock_hz as f64 / self.sample_rate as f64
    }

    /// Total chip clocks handed out since construction or reset
    #[inline]
    pub fn total_clocks(&self) -> u64 {
        self.total_clocks
    }

    /// Advance by one output sample
    #[inline]
    pub fn next_window(&mut self) -> SampleWindow {
        let acc = self.remainder + self.clock_hz as u64;
        let rate = self.sample_rate as u64;
        // remainder < rate, so the quotient never exceeds clock_hz
        let clocks = (acc / rate) as u32;
        self.remainder = acc % rate;
        self.total_clocks += clocks as u64;

        let pending = self.prescaler as u64 + clocks as u64;
        self.prescaler = (pending % CLOCKS_PER_TICK as u64) as u32;
        SampleWindow {
            clocks,
            ticks: (pending / CLOCKS_PER_TICK as u64) as u32,
        }
    }

    /// Restart timing from zero
    pub fn reset(&mut self) {
        self.remainder = 0;
        self.prescaler = 0;
        self.total_clocks = 0;
    }
}
