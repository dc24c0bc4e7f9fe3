// tests/windowing_properties.rs
//! Property checks of the strided window view

use emg_features::config::WindowingConfig;
use emg_features::processing::windowing::{stride_windows, window_count};
use emg_features::processing::Feature;
use proptest::prelude::*;

proptest! {
    #[test]
    fn window_count_matches_formula(len in 0usize..2000, window in 1usize..300, step in 1usize..300) {
        let signal = vec![0.0; len];
        let windows = stride_windows(&signal, window, step).unwrap();

        let expected = if len < window { 0 } else { (len - window) / step + 1 };
        prop_assert_eq!(windows.len(), expected);
        prop_assert_eq!(window_count(len, window, step), expected);
        prop_assert_eq!(windows.view().ncols(), window);
    }

    #[test]
    fn rows_alias_source_slices(
        signal in prop::collection::vec(-1e3f64..1e3, 1..600),
        window in 1usize..64,
        step in 1usize..64,
    ) {
        let windows = stride_windows(&signal, window, step).unwrap();

        for (i, row) in windows.rows().enumerate() {
            let start = i * step;
            prop_assert_eq!(row.as_slice(), Some(&signal[start..start + window]));
        }
        if let Some(&last) = windows.last_positions().last() {
            prop_assert!(last < signal.len());
            // the next window would run past the end
            prop_assert!(last + step >= signal.len());
        }
    }

    #[test]
    fn scalar_features_emit_one_value_per_window(
        signal in prop::collection::vec(-10f64..10.0, 0..400),
        window in 2usize..50,
        step in 1usize..50,
    ) {
        let windowing = WindowingConfig::new(window, step);
        for feature in [Feature::Rms, Feature::Wl, Feature::Iav, Feature::Dasdv] {
            let output = feature.compute(&signal, &windowing).unwrap();
            prop_assert_eq!(output.len(), window_count(signal.len(), window, step));
            prop_assert_eq!(output.positions, stride_windows(&signal, window, step).unwrap().last_positions());
        }
    }
}
