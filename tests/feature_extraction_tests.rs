// tests/feature_extraction_tests.rs
//! End-to-end checks of individual features through the public registry

use emg_features::config::WindowingConfig;
use emg_features::processing::features::{autoregressive, Feature, FeatureValues};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f64::consts::PI;

fn scalar(feature: &Feature, signal: &[f64], windowing: &WindowingConfig) -> Vec<f64> {
    match feature.compute(signal, windowing).unwrap().values {
        FeatureValues::Scalar(values) => values.to_vec(),
        FeatureValues::Vector(_) => panic!("{} should produce one value per window", feature.name()),
    }
}

fn sine(frequency: f64, sample_rate: f64, len: usize) -> Vec<f64> {
    (0..len)
        .map(|i| (2.0 * PI * frequency * i as f64 / sample_rate).sin())
        .collect()
}

#[test]
fn test_sine_mean_and_peak_frequency() {
    // 2 s of a 10 Hz sine at 5120 Hz
    let signal = sine(10.0, 5120.0, 10240);
    let windowing = WindowingConfig::new(500, 250);

    let mnf = scalar(&Feature::Mnf, &signal, &windowing);
    let pkf = scalar(&Feature::Pkf, &signal, &windowing);

    assert_eq!(mnf.len(), 39);
    assert_eq!(pkf.len(), 39);
    for (mean, peak) in mnf.iter().zip(&pkf) {
        assert!((mean - 10.0).abs() < 1.0, "MNF {}", mean);
        assert!((peak - 10.0).abs() < 1.0, "PKF {}", peak);
    }
}

#[test]
fn test_constant_signal_features() {
    let c: f64 = -1.5;
    let signal = vec![c; 120];
    let windowing = WindowingConfig::new(30, 10);

    for value in scalar(&Feature::Rms, &signal, &windowing) {
        assert!((value - c.abs()).abs() < 1e-12);
    }
    for value in scalar(&Feature::Var, &signal, &windowing) {
        assert!(value.abs() < 1e-12);
    }
    for value in scalar(&Feature::Ssi, &signal, &windowing) {
        assert!((value - 30.0 * c * c).abs() < 1e-9);
    }
    // indeterminate, not missing
    assert!(scalar(&Feature::Kurt, &signal, &windowing).iter().all(|v| v.is_nan()));
}

#[test]
fn test_increasing_signal_has_no_sign_changes() {
    let signal: Vec<f64> = (1..=200).map(|i| i as f64 * 0.01).collect();
    let windowing = WindowingConfig::new(25, 7);

    let zc = scalar(&Feature::Zc { threshold: 0.0 }, &signal, &windowing);
    let ssc = scalar(&Feature::Ssc { threshold: 0.0 }, &signal, &windowing);
    assert!(zc.iter().chain(&ssc).all(|&v| v == 0.0));
}

#[test]
fn test_mav_and_mav1_agree_on_short_windows() {
    let mut rng = StdRng::seed_from_u64(11);
    let signal: Vec<f64> = (0..64).map(|_| rng.gen_range(-2.0..2.0)).collect();

    for window in 1..=4 {
        let windowing = WindowingConfig::new(window, 1);
        let mav = scalar(&Feature::Mav, &signal, &windowing);
        let mav1 = scalar(&Feature::Mav1, &signal, &windowing);
        for (a, b) in mav.iter().zip(&mav1) {
            assert!((a - b).abs() < 1e-12);
        }
    }
}

#[test]
fn test_ar2_recovery_and_cepstral_closed_form() {
    let (a1, a2) = (0.6, -0.3);
    let mut rng = StdRng::seed_from_u64(42);

    let mut x = vec![0.0, 0.0];
    for t in 2..5100 {
        let noise: f64 = rng.gen_range(-1.0..1.0);
        x.push(a1 * x[t - 1] + a2 * x[t - 2] + noise);
    }
    let signal = &x[100..];
    let windowing = WindowingConfig::new(5000, 5000);

    let ar = match (Feature::Ar { order: 2 }).compute(signal, &windowing).unwrap().values {
        FeatureValues::Vector(values) => values,
        FeatureValues::Scalar(_) => panic!("ar is a vector feature"),
    };
    assert_eq!(ar.dim(), (1, 2));
    // oldest lag first: [a2, a1]
    assert!((ar[[0, 0]] - a2).abs() < 0.05, "a2 = {}", ar[[0, 0]]);
    assert!((ar[[0, 1]] - a1).abs() < 0.05, "a1 = {}", ar[[0, 1]]);

    let cc = match (Feature::Cc { order: 2 }).compute(signal, &windowing).unwrap().values {
        FeatureValues::Vector(values) => values,
        FeatureValues::Scalar(_) => panic!("cc is a vector feature"),
    };
    let c0 = -ar[[0, 0]];
    let c1 = -ar[[0, 1]] - ar[[0, 1]] * c0 * 0.5;
    assert!((cc[[0, 0]] - c0).abs() < 1e-9);
    assert!((cc[[0, 1]] - c1).abs() < 1e-9);
    // c0 = -a2 > 0 and c1 = -a1 (1 + c0 / 2) < 0
    assert!(cc[[0, 0]] > 0.25 && cc[[0, 1]] < -0.6);

    // transforming the AR matrix directly leaves it unchanged
    let before = ar.clone();
    let direct = autoregressive::cepstral_coefficients(&ar);
    assert_eq!(ar, before);
    assert!((direct[[0, 1]] - c1).abs() < 1e-9);
}

#[test]
fn test_every_registered_feature_runs() {
    let mut rng = StdRng::seed_from_u64(3);
    let signal: Vec<f64> = (0..2048)
        .map(|i| (2.0 * PI * 80.0 * i as f64 / 5120.0).sin() + 0.3 * rng.gen_range(-1.0f64..1.0))
        .collect();
    let windowing = WindowingConfig::new(256, 128);

    let features = vec![
        Feature::Iav,
        Feature::Aac,
        Feature::Apen { m: 2, r: 0.2 },
        Feature::Ar { order: 4 },
        Feature::Cc { order: 4 },
        Feature::Dasdv,
        Feature::Kurt,
        Feature::Log,
        Feature::Mav1,
        Feature::Mav2,
        Feature::Mav,
        Feature::Mavslp,
        Feature::Mhw,
        Feature::Mtw { windowslope: 0.2 },
        Feature::Myop { threshold: 0.5 },
        Feature::Rms,
        Feature::Sampleen { m: 2, r: 0.2 },
        Feature::Skew,
        Feature::Ssc { threshold: 0.001 },
        Feature::Ssi,
        Feature::Tm { order: 3 },
        Feature::Var,
        Feature::V { v: 3.0 },
        Feature::Wamp { threshold: 0.1 },
        Feature::Wl,
        Feature::Zc { threshold: 0.05 },
        Feature::Mnf,
        Feature::Mdf,
        Feature::Pkf,
        Feature::Mnp,
        Feature::Ttp,
        Feature::Sm { order: 2 },
        Feature::Fr { flb: (20.0, 200.0), fhb: (200.0, 1000.0) },
        Feature::Vcf,
        Feature::Psr { n: 3 },
        Feature::Snr { powerband: (20.0, 500.0), noiseband: (500.0, 2000.0) },
        Feature::Dpr { band: (20.0, 1000.0), n: 5 },
        Feature::Ohm,
        Feature::Max { order: 4, cutoff: 40.0 },
        Feature::Smr { n: 5 },
        Feature::Bc { y_box_size_multiplier: 0.01, subsampling: 2 },
        Feature::Psdfd { power_box_size_multiplier: 1e-6, subsampling: 1 },
    ];
    assert_eq!(features.len(), Feature::NAMES.len());

    for feature in &features {
        let output = feature.compute(&signal, &windowing).unwrap();
        let expected = if matches!(feature, Feature::Mavslp) { 14 } else { 15 };
        assert_eq!(output.len(), expected, "{}", feature.name());
    }
}
