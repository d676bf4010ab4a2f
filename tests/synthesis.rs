use approx::{assert_abs_diff_eq, assert_relative_eq};
use ayumi::{Chip, ChipType, NoiseGenerator, StereoSample, ToneChannel};

const CLOCK: u32 = 1_000_000;
/// One PSG tick per output sample at this rate
const TICK_RATE: u32 = CLOCK / 8;

fn tone_a_chip(chip_type: ChipType, sample_rate: u32, period: i32) -> Chip {
    let mut chip = Chip::new(chip_type, sample_rate, CLOCK).unwrap();
    chip.tone(ToneChannel::A)
        .period(period)
        .unwrap()
        .volume(15)
        .unwrap()
        .mixer(true, false, false);
    chip
}

fn raw_frames(chip: &mut Chip, count: usize) -> Vec<StereoSample> {
    (0..count)
        .map(|_| {
            chip.process();
            chip.raw_sample()
        })
        .collect()
}

fn rising_edges(frames: &[StereoSample], threshold: f64) -> usize {
    let mut high = false;
    let mut edges = 0;
    for frame in frames {
        let now = frame.left > threshold;
        if now && !high {
            edges += 1;
        }
        high = now;
    }
    edges
}

#[test]
fn tone_frequency_follows_period() {
    for period in [0, 1, 10, 100, 250] {
        let mut chip = tone_a_chip(ChipType::Ay, TICK_RATE, period);
        let frames = raw_frames(&mut chip, TICK_RATE as usize);

        let expected = CLOCK as f64 / (16.0 * period.max(1) as f64);
        let measured = rising_edges(&frames, 0.25) as f64;
        assert!(
            (measured - expected).abs() <= 1.0,
            "period {period}: {measured} cycles, expected {expected}"
        );
    }
}

#[test]
fn noise_shifts_every_two_periods() {
    for period in [1, 5, 31] {
        let mut noise = NoiseGenerator::new();
        noise.set_period(period).unwrap();
        let mut last = noise.lfsr();
        let mut shifts = 0;
        for _ in 0..2 * period as u32 * 1000 {
            noise.tick();
            if noise.lfsr() != last {
                shifts += 1;
                last = noise.lfsr();
            }
        }
        assert_eq!(shifts, 1000, "period {period}");
    }
}

#[test]
fn lfsr_never_reaches_zero() {
    let mut noise = NoiseGenerator::new();
    for _ in 0..1_000_000 {
        noise.tick();
        assert_ne!(noise.lfsr(), 0);
        assert!(noise.lfsr() < 1 << 17);
    }
}

#[test]
fn envelope_output_is_periodic() {
    let mut chip = Chip::new(ChipType::Ym, TICK_RATE, CLOCK).unwrap();
    chip.tone(ToneChannel::A).mixer(false, false, true);
    chip.envelope().period(4).unwrap().shape(8).unwrap();

    // 32 steps of 4 ticks each
    let frames = raw_frames(&mut chip, 512);
    for i in 0..512 - 128 {
        assert_eq!(frames[i], frames[i + 128], "sample {i}");
    }
}

#[test]
fn dac_table_follows_chip_type() {
    let level = |chip_type: ChipType, volume: u8| {
        let mut chip = Chip::new(chip_type, 44_100, CLOCK).unwrap();
        chip.tone(ToneChannel::A).volume(volume).unwrap();
        chip.process();
        chip.raw_sample().left
    };

    for chip_type in [ChipType::Ay, ChipType::Ym] {
        assert_eq!(level(chip_type, 0), 0.0);
        assert_eq!(level(chip_type, 15), 0.5);
        for volume in 0..15 {
            let table = chip_type.dac_table();
            assert_eq!(
                level(chip_type, volume),
                table[volume as usize * 2 + 1] * 0.5
            );
            assert!(level(chip_type, volume) < level(chip_type, volume + 1));
        }
    }
    assert_ne!(level(ChipType::Ay, 8), level(ChipType::Ym, 8));
}

#[test]
fn dc_removal_converges() {
    let mut chip = tone_a_chip(ChipType::Ay, 44_100, 100);
    let filtered: Vec<f64> = (0..44_100)
        .map(|_| {
            chip.process();
            chip.remove_dc();
            chip.sample().left
        })
        .collect();

    let mean = |frames: &[f64]| frames.iter().sum::<f64>() / frames.len() as f64;
    let early = mean(&filtered[..1024]);
    let late = mean(&filtered[44_100 - 4_410..]);
    assert!(early > 0.1, "early mean {early}");
    assert!(late.abs() < 0.01, "late mean {late}");
}

#[test]
fn decimator_consumes_exact_clock() {
    for (sample_rate, clock) in [(44_100, 1_000_000), (48_000, 1_773_400), (22_050, 2_000_000)] {
        let mut chip = Chip::new(ChipType::Ym, sample_rate, clock).unwrap();
        let total: u64 = (0..sample_rate).map(|_| chip.process() as u64).sum();
        assert_eq!(total, clock as u64, "{clock} Hz at {sample_rate} Hz");
    }
}

#[test]
fn boundary_values() {
    let mut chip = Chip::new(ChipType::Ay, 44_100, CLOCK).unwrap();

    assert!(chip.tone(ToneChannel::A).volume(15).is_ok());
    assert!(chip.tone(ToneChannel::A).volume(16).is_err());
    assert!(chip.tone(ToneChannel::B).period(0).is_ok());
    assert_eq!(chip.tone_generator(ToneChannel::B).period(), 1);
    assert!(chip.tone(ToneChannel::B).period(-1).is_err());
    assert!(chip.tone(ToneChannel::C).pan(0.0, false).is_ok());
    assert!(chip.tone(ToneChannel::C).pan(1.0, true).is_ok());
    assert!(chip.tone(ToneChannel::C).pan(-0.01, false).is_err());
    assert!(chip.tone(ToneChannel::C).pan(f64::NAN, true).is_err());
    assert!(chip.noise().period(0).is_ok());
    assert!(chip.noise().period(-1).is_err());
    assert!(chip.envelope().shape(15).is_ok());
    assert!(chip.envelope().shape(16).is_err());
    assert!(chip.envelope().period(0).is_ok());

    assert!(Chip::new(ChipType::Ay, 0, CLOCK).is_err());
    assert!(Chip::new(ChipType::Ay, 44_100, 0).is_err());
}

#[test]
fn hard_pan_positions() {
    let mut chip = Chip::new(ChipType::Ay, 44_100, CLOCK).unwrap();
    chip.tone(ToneChannel::A).volume(15).unwrap().pan(0.0, false).unwrap();
    chip.process();
    assert_eq!(chip.raw_sample(), StereoSample::new(1.0, 0.0));

    chip.tone(ToneChannel::A).pan(1.0, true).unwrap();
    chip.process();
    assert_abs_diff_eq!(chip.raw_sample().left, 0.0, epsilon = 1e-12);
    assert_relative_eq!(chip.raw_sample().right, 1.0);

    chip.tone(ToneChannel::A).pan(0.5, true).unwrap();
    chip.process();
    let expected = std::f64::consts::FRAC_PI_4.cos();
    assert_relative_eq!(chip.raw_sample().left, expected);
    assert_relative_eq!(chip.raw_sample().right, expected);
}

#[test]
fn square_wave_end_to_end() {
    let mut chip = tone_a_chip(ChipType::Ay, 44_100, 100);
    let frames = raw_frames(&mut chip, 1000);

    let eps = 1e-9;
    for frame in &frames {
        assert_eq!(frame.left, frame.right);
        assert!((0.0..=0.5).contains(&frame.left), "{}", frame.left);
    }
    let settled = frames
        .iter()
        .filter(|f| f.left == 0.0 || f.left == 0.5)
        .count();
    assert!(settled >= 900, "{settled} settled samples");

    // Straddling samples hold the previous state
    let mut high = false;
    let mut changes = Vec::new();
    for (i, frame) in frames.iter().enumerate() {
        let now = if frame.left >= 0.5 - eps {
            true
        } else if frame.left <= eps {
            false
        } else {
            high
        };
        if now != high {
            changes.push(i);
        }
        high = now;
    }
    assert_eq!(changes.len(), 28);

    // 800 chip clocks per half period is 35.28 samples
    for pair in changes.windows(2) {
        let run = pair[1] - pair[0];
        assert!((34..=37).contains(&run), "run of {run} samples");
    }
}

#[test]
fn identical_programming_renders_identically() {
    let render = || {
        let mut chip = Chip::new(ChipType::Ym, 48_000, 2_000_000).unwrap();
        chip.tone(ToneChannel::B)
            .period(300)
            .unwrap()
            .volume(11)
            .unwrap()
            .mixer(true, true, false);
        chip.noise().period(7).unwrap();
        let mut buffer = vec![StereoSample::ZERO; 2048];
        chip.render(&mut buffer);
        buffer
    };
    assert_eq!(render(), render());
}
