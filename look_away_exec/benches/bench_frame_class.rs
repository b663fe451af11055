//! # Frame Classifier Benchmark

use comms_if::eqpt::cam::ImageFrame;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

use look_away_lib::frame_class::FrameClassifier;

/// VGA RGB8 frame dimensions
const HEIGHT: u32 = 480;
const STEP: u32 = 640 * 3;

fn frame_class_benchmark(c: &mut Criterion) {
    let len = (HEIGHT * STEP) as usize;

    // A uniform frame must be scanned in full
    let uniform = ImageFrame::new(HEIGHT, STEP, vec![42; len]).unwrap();

    // Only the final byte differs, also a full scan
    let mut data = vec![42; len];
    data[len - 1] = 0;
    let last_differs = ImageFrame::new(HEIGHT, STEP, data).unwrap();

    c.bench_function("classify uniform VGA rgb8", |b| {
        b.iter(|| FrameClassifier.classify(black_box(&uniform)))
    });

    c.bench_function("classify VGA rgb8, last byte differs", |b| {
        b.iter(|| FrameClassifier.classify(black_box(&last_differs)))
    });
}

criterion_group!(benches, frame_class_benchmark);
criterion_main!(benches);
