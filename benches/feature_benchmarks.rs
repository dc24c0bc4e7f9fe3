use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use emg_features::config::{PipelineConfig, WindowingConfig};
use emg_features::processing::windowing::stride_windows;
use emg_features::processing::{Feature, FeaturePipeline};
use emg_features::table::Recording;

const SAMPLE_RATE_HZ: f64 = 5120.0;
const WINDOW_SIZES: &[usize] = &[128, 256, 512, 1024];
const CHANNEL_COUNTS: &[usize] = &[1, 4, 8, 16];

fn test_signal(len: usize, phase: f64) -> Vec<f64> {
    (0..len)
        .map(|i| {
            let t = i as f64 / SAMPLE_RATE_HZ;
            (2.0 * std::f64::consts::PI * 80.0 * t + phase).sin()
                + 0.3 * (2.0 * std::f64::consts::PI * 450.0 * t).sin()
        })
        .collect()
}

fn test_recording(channels: usize, len: usize) -> Recording {
    let mut recording = Recording::new((0..len as i64).collect()).expect("increasing index");
    for channel in 1..=channels {
        recording
            .add_column(format!("EMG_{}", channel), test_signal(len, channel as f64))
            .expect("unique channel");
    }
    recording
}

fn benchmark_windowing(c: &mut Criterion) {
    let mut group = c.benchmark_group("windowing");
    let signal = test_signal(51_200, 0.0);

    for &window in WINDOW_SIZES {
        group.throughput(Throughput::Elements(signal.len() as u64));
        group.bench_with_input(BenchmarkId::new("stride_windows", window), &window, |b, &window| {
            b.iter(|| stride_windows(black_box(&signal), window, window / 2).map(|w| w.len()))
        });
    }

    group.finish();
}

fn benchmark_features(c: &mut Criterion) {
    let mut group = c.benchmark_group("features");
    let signal = test_signal(51_200, 0.0);
    let windowing = WindowingConfig::new(500, 250);

    let features = [
        Feature::Rms,
        Feature::Wl,
        Feature::Mav1,
        Feature::Ar { order: 4 },
        Feature::Cc { order: 4 },
        Feature::Mnf,
        Feature::Mdf,
        Feature::Dpr { band: (20.0, 500.0), n: 5 },
        Feature::Max { order: 4, cutoff: 40.0 },
        Feature::Sampleen { m: 2, r: 0.2 },
        Feature::Bc { y_box_size_multiplier: 0.01, subsampling: 2 },
    ];

    for feature in &features {
        group.bench_with_input(BenchmarkId::new("compute", feature.name()), feature, |b, feature| {
            b.iter(|| feature.compute(black_box(&signal), &windowing))
        });
    }

    group.finish();
}

fn benchmark_channels(c: &mut Criterion) {
    let mut group = c.benchmark_group("channels");
    let windowing = WindowingConfig::new(500, 250);

    for &channels in CHANNEL_COUNTS {
        let recording = test_recording(channels, 25_600);
        group.throughput(Throughput::Elements((channels * recording.len()) as u64));

        for parallel in [false, true] {
            let label = if parallel { "parallel" } else { "sequential" };
            group.bench_with_input(BenchmarkId::new(label, channels), &recording, |b, recording| {
                let mut pipeline = FeaturePipeline::new(windowing, PipelineConfig { parallel_channels: parallel });
                b.iter(|| pipeline.apply_feature(black_box(recording), &Feature::Ar { order: 4 }))
            });
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_windowing, benchmark_features, benchmark_channels);
criterion_main!(benches);
