//! PSG chip facade
//!
//! [`Chip`] owns every piece of oscillator, mixer and filter state. Hosts
//! program it through the descriptor handles returned by [`Chip::tone`],
//! [`Chip::noise`] and [`Chip::envelope`] (or through raw register writes),
//! then pull audio one frame at a time:
//!
//! ```
//! use ayumi::{Chip, ChipType, ToneChannel};
//!
//! # fn main() -> ayumi::Result<()> {
//! let mut chip = Chip::new(ChipType::Ym, 48_000, 2_000_000)?;
//! chip.tone(ToneChannel::B).period(284)?.volume(12)?.pan(0.8, true)?;
//! chip.tone(ToneChannel::B).mixer(true, false, false);
//!
//! chip.process();
//! let unfiltered = chip.raw_sample();
//! chip.remove_dc();
//! let frame = chip.sample();
//! assert!(frame.left <= unfiltered.left);
//! # Ok(())
//! # }
//! ```

use log::{debug, trace};

use crate::config::ChipConfig;
use crate::dc_filter::DcFilter;
use crate::decimator::ClockDecimator;
use crate::envelope::{EnvelopeGenerator, EnvelopeShape};
use crate::generators::{masked_period, NoiseGenerator, ToneChannel, ToneGenerator, NUM_CHANNELS};
use crate::mixer::{ChannelControl, Mixer, MixerFlags, StereoSample};
use crate::registers::{
    Register, AMPLITUDE_ENVELOPE_BIT, ENVELOPE_PERIOD_MASK, NOISE_PERIOD_MASK, NUM_REGISTERS,
    TONE_PERIOD_MASK,
};
use crate::tables::ChipType;
use crate::{AyumiError, Result};

/// R7 value after reset: every tone and noise source disabled
const MIXER_RESET: u8 = 0x3F;

/// AY-3-8910 / YM2149 emulator
#[derive(Debug, Clone)]
pub struct Chip {
    chip_type: ChipType,
    decimator: ClockDecimator,
    tones: [ToneGenerator; NUM_CHANNELS],
    noise: NoiseGenerator,
    envelope: EnvelopeGenerator,
    mixer: Mixer,
    dc: DcFilter,
    /// Register file as a song would read it back
    regs: [u8; NUM_REGISTERS],
    /// Mixer output of the last `process()`, before DC removal
    raw: StereoSample,
    /// Value returned by `sample()`
    output: StereoSample,
}

impl Chip {
    /// Create a new chip.
    ///
    /// # Arguments
    /// - `chip_type` - emulated chip variant
    /// - `sample_rate` - output samples per second
    /// - `clock_hz` - chip input clock frequency
    ///
    /// Fails with [`AyumiError::InvalidArgument`] if either rate is zero.
    pub fn new(chip_type: ChipType, sample_rate: u32, clock_hz: u32) -> Result<Self> {
        let decimator = ClockDecimator::new(clock_hz, sample_rate)?;
        debug!(
            "created {chip_type} at {clock_hz} Hz, {sample_rate} Hz output ({:.3} clocks/sample)",
            decimator.clocks_per_sample()
        );
        let mut regs = [0; NUM_REGISTERS];
        regs[Register::Mixer as usize] = MIXER_RESET;
        Ok(Self {
            chip_type,
            decimator,
            tones: Default::default(),
            noise: NoiseGenerator::new(),
            envelope: EnvelopeGenerator::new(),
            mixer: Mixer::new(chip_type),
            dc: DcFilter::new(),
            regs,
            raw: StereoSample::ZERO,
            output: StereoSample::ZERO,
        })
    }

    /// Create a chip from a [`ChipConfig`]
    pub fn from_config(config: &ChipConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.chip_type, config.sample_rate, config.clock_hz)
    }

    /// Reset every generator, register and filter to the power-on state.
    ///
    /// Chip type and clocks are kept.
    pub fn reset(&mut self) {
        for tone in &mut self.tones {
            tone.reset();
        }
        self.noise.reset();
        self.envelope.reset();
        self.mixer.reset();
        self.dc.reset();
        self.decimator.reset();
        self.regs = [0; NUM_REGISTERS];
        self.regs[Register::Mixer as usize] = MIXER_RESET;
        self.raw = StereoSample::ZERO;
        self.output = StereoSample::ZERO;
        debug!("{} reset", self.chip_type);
    }

    /// Emulated chip variant
    #[inline]
    pub fn chip_type(&self) -> ChipType {
        self.chip_type
    }

    /// Chip clock frequency in Hz
    #[inline]
    pub fn clock_hz(&self) -> u32 {
        self.decimator.clock_hz()
    }

    /// Output sample rate in Hz
    #[inline]
    pub fn sample_rate(&self) -> u32 {
        self.decimator.sample_rate()
    }

    /// Chip clocks consumed since construction or reset
    #[inline]
    pub fn total_clocks(&self) -> u64 {
        self.decimator.total_clocks()
    }

    /// Returns the control handle of a tone channel
    pub fn tone(&mut self, channel: ToneChannel) -> ToneControl<'_> {
        ToneControl {
            chip: self,
            channel,
        }
    }

    /// Returns the control handle of the noise generator
    pub fn noise(&mut self) -> NoiseControl<'_> {
        NoiseControl { chip: self }
    }

    /// Returns the control handle of the envelope generator
    pub fn envelope(&mut self) -> EnvelopeControl<'_> {
        EnvelopeControl { chip: self }
    }

    /// Tone generator state of a channel
    #[inline]
    pub fn tone_generator(&self, channel: ToneChannel) -> &ToneGenerator {
        &self.tones[channel.index()]
    }

    /// Noise generator state
    #[inline]
    pub fn noise_generator(&self) -> &NoiseGenerator {
        &self.noise
    }

    /// Envelope generator state
    #[inline]
    pub fn envelope_generator(&self) -> &EnvelopeGenerator {
        &self.envelope
    }

    /// Mixer settings of a channel
    #[inline]
    pub fn channel(&self, channel: ToneChannel) -> &ChannelControl {
        self.mixer.channel(channel.index())
    }

    /// DAC magnitude of each channel at the most recent PSG tick
    #[inline]
    pub fn channel_levels(&self) -> [f64; NUM_CHANNELS] {
        self.mixer.last_levels()
    }

    /// Advance the engine by one output sample's worth of chip clocks.
    ///
    /// Every PSG tick inside the window is mixed and the results are
    /// averaged into the pending sample. Returns the number of chip clocks
    /// consumed.
    pub fn process(&mut self) -> u32 {
        let window = self.decimator.next_window();
        self.raw = if window.ticks == 0 {
            self.mix_current()
        } else {
            let mut acc = StereoSample::ZERO;
            for _ in 0..window.ticks {
                acc += self.tick();
            }
            acc / window.ticks as f64
        };
        self.output = self.raw;
        window.clocks
    }

    /// Remove the DC offset from the pending sample
    ///
    /// Call once per `process()`; the filter state advances on every call.
    pub fn remove_dc(&mut self) {
        self.output = self.dc.process(self.raw);
    }

    /// Current stereo sample
    #[inline]
    pub fn sample(&self) -> StereoSample {
        self.output
    }

    /// Pending sample before DC removal
    #[inline]
    pub fn raw_sample(&self) -> StereoSample {
        self.raw
    }

    /// Render one DC-filtered frame per slot of `buffer`
    pub fn render(&mut self, buffer: &mut [StereoSample]) {
        for frame in buffer.iter_mut() {
            self.process();
            self.remove_dc();
            *frame = self.output;
        }
    }

    /// Advance every generator by one PSG tick and mix
    #[inline]
    fn tick(&mut self) -> StereoSample {
        let noise_bit = self.noise.tick();
        let envelope_level = self.envelope.tick();
        let tone_bits = [
            self.tones[0].tick(),
            self.tones[1].tick(),
            self.tones[2].tick(),
        ];
        self.mixer.mix(tone_bits, noise_bit, envelope_level)
    }

    /// Mix the current generator outputs without advancing them
    fn mix_current(&mut self) -> StereoSample {
        let tone_bits = [
            self.tones[0].output(),
            self.tones[1].output(),
            self.tones[2].output(),
        ];
        self.mixer.mix(tone_bits, self.noise.output(), self.envelope.level())
    }

    /// Write a raw register value (R0-R15).
    ///
    /// Values are masked to the bits the register implements, as on the
    /// hardware. Writing R13 restarts the envelope. Fails only for register
    /// numbers above 15.
    pub fn write_register(&mut self, reg: u8, value: u8) -> Result<()> {
        let register = Register::from_addr(reg).ok_or_else(|| {
            AyumiError::invalid(format!("register must be in 0..=15, got {reg}"))
        })?;
        self.apply_register(register, value);
        Ok(())
    }

    /// Read a register value (0 for addresses above 15)
    pub fn read_register(&self, reg: u8) -> u8 {
        self.regs.get(reg as usize).copied().unwrap_or(0)
    }

    /// Load all 16 registers at once (one song frame)
    pub fn load_registers(&mut self, regs: &[u8; NUM_REGISTERS]) {
        for (&register, &value) in Register::ALL.iter().zip(regs) {
            self.apply_register(register, value);
        }
    }

    /// Dump all 16 registers
    pub fn dump_registers(&self) -> [u8; NUM_REGISTERS] {
        self.regs
    }

    /// Store a register and update the generator it drives
    fn apply_register(&mut self, register: Register, value: u8) {
        let value = value & register.mask();
        let reg = register.addr() as usize;
        self.regs[reg] = value;
        trace!("{register} <- {value:#04x}");

        match register {
            Register::ToneAFine
            | Register::ToneACoarse
            | Register::ToneBFine
            | Register::ToneBCoarse
            | Register::ToneCFine
            | Register::ToneCCoarse => {
                let ch = reg >> 1;
                let period = self.period_from_regs(ch * 2);
                self.tones[ch].load_period(period);
            }
            Register::NoisePeriod => self.noise.load_period(u16::from(value)),
            Register::Mixer => {
                for ch in 0..NUM_CHANNELS {
                    self.apply_register_flags(ch);
                }
            }
            Register::AmplitudeA | Register::AmplitudeB | Register::AmplitudeC => {
                let ch = reg - Register::AmplitudeA as usize;
                self.mixer.channel_mut(ch).load_volume(value);
                self.apply_register_flags(ch);
            }
            Register::EnvelopeFine | Register::EnvelopeCoarse => {
                let period = self.period_from_regs(Register::EnvelopeFine as usize);
                self.envelope.load_period(period);
            }
            Register::EnvelopeShape => self.envelope.load_shape(EnvelopeShape::from_value(value)),
            Register::IoPortA | Register::IoPortB => {}
        }
    }

    /// Period stored in a fine/coarse register pair
    #[inline]
    fn period_from_regs(&self, fine: usize) -> u16 {
        (u16::from(self.regs[fine + 1]) << 8) | u16::from(self.regs[fine])
    }

    /// Rebuild a channel's mixer flags from R7 and its amplitude register
    fn apply_register_flags(&mut self, ch: usize) {
        let mixer = self.regs[Register::Mixer as usize];
        let amplitude = self.regs[Register::AmplitudeA as usize + ch];
        let flags = MixerFlags::from_enables(
            mixer & (1 << ch) == 0,
            mixer & (1 << (ch + 3)) == 0,
            amplitude & AMPLITUDE_ENVELOPE_BIT != 0,
        );
        self.mixer.channel_mut(ch).set_flags(flags);
    }
}

/// Control handle of one tone channel
///
/// Setters validate their argument, leave the chip untouched on failure and
/// return the handle for chaining.
#[derive(Debug)]
pub struct ToneControl<'a> {
    chip: &'a mut Chip,
    channel: ToneChannel,
}

impl ToneControl<'_> {
    /// Changes the tone period of the channel
    ///
    /// Fails if `period` < 0. Only the low 12 bits are kept, as in R0-R5;
    /// period 0 behaves as 1.
    pub fn period(&mut self, period: i32) -> Result<&mut Self> {
        let period = masked_period("tone", period, TONE_PERIOD_MASK)?;
        let ch = self.channel.index();
        self.chip.tones[ch].load_period(period);
        self.chip.regs[ch * 2] = (period & 0xFF) as u8;
        self.chip.regs[ch * 2 + 1] = (period >> 8) as u8;
        Ok(self)
    }

    /// Changes the stereo placement of the channel
    ///
    /// # Arguments
    /// - `pan` - 0.0 (left) to 1.0 (right)
    /// - `equal_power` - use the constant-power pan law instead of linear
    pub fn pan(&mut self, pan: f64, equal_power: bool) -> Result<&mut Self> {
        self.chip
            .mixer
            .channel_mut(self.channel.index())
            .set_pan(pan, equal_power)?;
        Ok(self)
    }

    /// Changes the fixed volume of the channel (0-15)
    pub fn volume(&mut self, volume: u8) -> Result<&mut Self> {
        let ch = self.channel.index();
        self.chip.mixer.channel_mut(ch).set_volume(volume)?;
        let reg = &mut self.chip.regs[Register::AmplitudeA as usize + ch];
        *reg = (*reg & AMPLITUDE_ENVELOPE_BIT) | volume;
        Ok(self)
    }

    /// Changes the mixer flags of the channel
    ///
    /// # Arguments
    /// - `tone` - tone bit gates the channel
    /// - `noise` - noise bit gates the channel
    /// - `envelope` - envelope level replaces the fixed volume
    pub fn mixer(&mut self, tone: bool, noise: bool, envelope: bool) -> &mut Self {
        let ch = self.channel.index();
        self.chip
            .mixer
            .channel_mut(ch)
            .set_flags(MixerFlags::from_enables(tone, noise, envelope));

        let tone_bit = 1u8 << ch;
        let noise_bit = 1u8 << (ch + 3);
        let mut r7 = self.chip.regs[Register::Mixer as usize] & !(tone_bit | noise_bit);
        if !tone {
            r7 |= tone_bit;
        }
        if !noise {
            r7 |= noise_bit;
        }
        self.chip.regs[Register::Mixer as usize] = r7;

        let amplitude = &mut self.chip.regs[Register::AmplitudeA as usize + ch];
        *amplitude &= 0x0F;
        if envelope {
            *amplitude |= AMPLITUDE_ENVELOPE_BIT;
        }
        self
    }

    /// Mutes or unmutes the channel without touching its registers
    pub fn mute(&mut self, muted: bool) -> &mut Self {
        self.chip
            .mixer
            .channel_mut(self.channel.index())
            .set_muted(muted);
        self
    }
}

/// Control handle of the shared noise generator
#[derive(Debug)]
pub struct NoiseControl<'a> {
    chip: &'a mut Chip,
}

impl NoiseControl<'_> {
    /// Changes the noise period
    ///
    /// Fails if `period` < 0. Only the low 5 bits are kept, as in R6;
    /// period 0 behaves as 1.
    pub fn period(&mut self, period: i32) -> Result<&mut Self> {
        let period = masked_period("noise", period, NOISE_PERIOD_MASK)?;
        self.chip.noise.load_period(period);
        self.chip.regs[Register::NoisePeriod as usize] = period as u8;
        Ok(self)
    }
}

/// Control handle of the shared envelope generator
#[derive(Debug)]
pub struct EnvelopeControl<'a> {
    chip: &'a mut Chip,
}

impl EnvelopeControl<'_> {
    /// Changes the envelope period
    ///
    /// Fails if `period` < 0. Only the low 16 bits are kept, as in
    /// R11/R12; period 0 behaves as 1.
    pub fn period(&mut self, period: i32) -> Result<&mut Self> {
        let period = masked_period("envelope", period, ENVELOPE_PERIOD_MASK)?;
        self.chip.envelope.load_period(period);
        self.chip.regs[Register::EnvelopeFine as usize] = (period & 0xFF) as u8;
        self.chip.regs[Register::EnvelopeCoarse as usize] = (period >> 8) as u8;
        Ok(self)
    }

    /// Changes the envelope shape (0-15) and restarts the envelope
    pub fn shape(&mut self, shape: u8) -> Result<&mut Self> {
        self.chip.envelope.set_shape(shape)?;
        self.chip.regs[Register::EnvelopeShape as usize] = shape;
        Ok(self)
    }
}
