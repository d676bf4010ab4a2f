//! Benchmarks for the chip render path
//!
//! Run with: cargo bench --bench chip

use ayumi::{Chip, ChipType, StereoSample, ToneChannel};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

const SAMPLE_RATE: u32 = 44_100;
const CLOCK: u32 = 2_000_000;

fn tone_chip() -> Chip {
    let mut chip = Chip::new(ChipType::Ym, SAMPLE_RATE, CLOCK).expect("valid rates");
    chip.write_register(0, 0x1C).expect("R0"); // Tone A period low
    chip.write_register(1, 0x01).expect("R1"); // Tone A period high (440 Hz)
    chip.write_register(7, 0x3E).expect("R7"); // Tone A only
    chip.write_register(8, 0x0F).expect("R8"); // Tone A volume max
    chip
}

fn bench_process(c: &mut Criterion) {
    let mut group = c.benchmark_group("process");
    let mut chip = tone_chip();

    for samples in [100, 1000, 10000].iter() {
        group.bench_with_input(
            BenchmarkId::from_parameter(samples),
            samples,
            |b, &samples| {
                b.iter(|| {
                    for _ in 0..samples {
                        chip.process();
                        chip.remove_dc();
                        black_box(chip.sample());
                    }
                });
            },
        );
    }

    group.finish();
}

fn bench_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render");
    let mut chip = tone_chip();

    for frames in [882, 4410, 44100].iter() {
        let mut buffer = vec![StereoSample::ZERO; *frames];
        group.bench_with_input(BenchmarkId::from_parameter(frames), frames, |b, _| {
            b.iter(|| {
                chip.render(&mut buffer);
                black_box(&buffer);
            });
        });
    }

    group.finish();
}

fn bench_register_frame(c: &mut Criterion) {
    let mut chip = Chip::new(ChipType::Ay, SAMPLE_RATE, 1_773_400).expect("valid rates");

    // One song frame: all 16 registers, then 882 samples (50 Hz at 44.1 kHz)
    let frame_regs: [u8; 16] = [
        0x10, 0x01, // R0-R1: Tone A period
        0x20, 0x02, // R2-R3: Tone B period
        0x30, 0x03, // R4-R5: Tone C period
        0x10, // R6: Noise period
        0x36, // R7: tone A+B+C, noise A
        0x0F, // R8: Tone A volume
        0x0C, // R9: Tone B volume
        0x10, // R10: Tone C on envelope
        0x00, 0x10, // R11-R12: Envelope period
        0x0E, // R13: Envelope shape (triangle)
        0x00, 0x00, // R14-R15: I/O ports
    ];

    c.bench_function("register_frame_882_samples", |b| {
        b.iter(|| {
            chip.load_registers(black_box(&frame_regs));
            for _ in 0..882 {
                chip.process();
                black_box(chip.raw_sample());
            }
        });
    });
}

fn bench_envelope_and_noise(c: &mut Criterion) {
    let mut chip = Chip::new(ChipType::Ym, SAMPLE_RATE, CLOCK).expect("valid rates");
    chip.noise().period(16).expect("noise period");
    chip.envelope()
        .period(0x100)
        .expect("envelope period")
        .shape(0x0A)
        .expect("envelope shape");
    for channel in ToneChannel::ALL {
        chip.tone(channel)
            .period(0x80 + channel.index() as i32 * 0x40)
            .expect("tone period")
            .pan(channel.index() as f64 / 2.0, true)
            .expect("pan")
            .mixer(true, true, true);
    }

    c.bench_function("envelope_noise_three_channels", |b| {
        b.iter(|| {
            for _ in 0..1000 {
                chip.process();
                chip.remove_dc();
                black_box(chip.sample());
            }
        });
    });
}

criterion_group!(
    benches,
    bench_process,
    bench_render,
    bench_register_frame,
    bench_envelope_and_noise
);
criterion_main!(benches);
