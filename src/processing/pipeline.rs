// src/processing/pipeline.rs
//! Multi-channel and batch feature extraction over a [`Recording`]

use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::config::constants::channels;
use crate::config::{FeatureSetConfig, PipelineConfig, WindowingConfig};
use crate::error::EmgResult;
use crate::processing::features::{Feature, FeatureOutput, ForceFeature};
use crate::table::{Channel, ChannelFamily, FeatureTable, Recording};

/// Counters accumulated over the lifetime of a pipeline
#[derive(Debug, Default, Clone)]
pub struct PerformanceMetrics {
    /// Feature requests applied
    pub features_computed: u64,
    /// Channel evaluations, summed over requests
    pub channels_processed: u64,
    /// Rows of the joined per-request tables
    pub windows_computed: u64,
    /// Wall time spent in feature requests
    pub total_processing_time_s: f64,
    /// Slowest single request
    pub max_feature_time_s: f64,
}

/// Applies features to every channel of a recording and joins the results
pub struct FeaturePipeline {
    windowing: WindowingConfig,
    config: PipelineConfig,
    performance_metrics: PerformanceMetrics,
}

impl FeaturePipeline {
    /// Pipeline applying features with `windowing`
    pub fn new(windowing: WindowingConfig, config: PipelineConfig) -> Self {
        Self {
            windowing,
            config,
            performance_metrics: PerformanceMetrics::default(),
        }
    }

    /// Pipeline with the windowing and driver settings of a feature set
    pub fn from_config(config: &FeatureSetConfig) -> Self {
        Self::new(config.windowing, config.pipeline.clone())
    }

    /// One EMG feature over every EMG channel, outer-joined in channel order
    pub fn apply_feature(&mut self, recording: &Recording, feature: &Feature) -> EmgResult<FeatureTable> {
        let windowing = self.windowing;
        let parallel = self.config.parallel_channels;
        self.apply_with(recording, feature, &windowing, parallel)
    }

    /// Look a feature up by name, then apply it
    pub fn apply_named(
        &mut self,
        recording: &Recording,
        name: &str,
        params: toml::Table,
    ) -> EmgResult<FeatureTable> {
        let feature = Feature::from_params(name, params)?;
        self.apply_feature(recording, &feature)
    }

    /// One force feature over every force channel
    pub fn apply_force_feature(&mut self, recording: &Recording, feature: ForceFeature) -> EmgResult<FeatureTable> {
        let windowing = self.windowing;
        let parallel = self.config.parallel_channels;
        self.apply_force_with(recording, feature, &windowing, parallel)
    }

    /// Every request of `request`, outer-joined, with metadata re-attached
    ///
    /// All requests are validated before the first one is computed.
    pub fn run(&mut self, recording: &Recording, request: &FeatureSetConfig) -> EmgResult<FeatureTable> {
        request.validate()?;

        let windowing = request.windowing;
        let parallel = request.pipeline.parallel_channels;
        let start = Instant::now();
        info!(
            features = request.features.len(),
            force_features = request.force_features.len(),
            window = windowing.window,
            step = windowing.step,
            "starting feature extraction"
        );

        let mut table = FeatureTable::new();
        for feature in &request.features {
            let features = self.apply_with(recording, feature, &windowing, parallel)?;
            table = table.outer_join(&features)?;
        }
        for &feature in &request.force_features {
            let features = self.apply_force_with(recording, feature, &windowing, parallel)?;
            table = table.outer_join(&features)?;
        }

        let exclude_force = !request.force_features.is_empty();
        for (name, values) in recording.metadata_columns(exclude_force) {
            debug!(column = name, "re-attaching metadata column");
            table.attach_column(name, recording.index(), values)?;
        }

        info!(
            rows = table.len(),
            columns = table.width(),
            elapsed = %format!("{:.2}s", start.elapsed().as_secs_f64()),
            "feature extraction finished"
        );
        Ok(table)
    }

    /// Get current performance metrics
    pub fn get_performance_metrics(&self) -> &PerformanceMetrics {
        &self.performance_metrics
    }

    /// Reset performance metrics
    pub fn reset_metrics(&mut self) {
        self.performance_metrics = PerformanceMetrics::default();
    }

    fn apply_with(
        &mut self,
        recording: &Recording,
        feature: &Feature,
        windowing: &WindowingConfig,
        parallel: bool,
    ) -> EmgResult<FeatureTable> {
        feature.validate(windowing)?;
        info!(feature = feature.name(), "extracting {}", feature.description());

        let start = Instant::now();
        let channels = recording.channels(ChannelFamily::Emg);
        let compute = |channel: &Channel<'_>| {
            channel_table(recording, channel, feature.name(), || feature.compute(channel.samples, windowing))
        };
        let table = join_channels(&channels, parallel, compute)?;

        self.record(start, channels.len(), table.len());
        Ok(table)
    }

    fn apply_force_with(
        &mut self,
        recording: &Recording,
        feature: ForceFeature,
        windowing: &WindowingConfig,
        parallel: bool,
    ) -> EmgResult<FeatureTable> {
        let label = format!("{}{}", channels::FORCE_LABEL_PREFIX, feature.name());
        info!(feature = feature.name(), "extracting force feature {}", label);

        let start = Instant::now();
        let channels = recording.channels(ChannelFamily::Force);
        let compute = |channel: &Channel<'_>| {
            channel_table(recording, channel, &label, || feature.compute(channel.samples, windowing))
        };
        let table = join_channels(&channels, parallel, compute)?;

        self.record(start, channels.len(), table.len());
        Ok(table)
    }

    fn record(&mut self, start: Instant, channel_count: usize, rows: usize) {
        let elapsed = start.elapsed().as_secs_f64();
        info!(elapsed = %format!("{:.2}s", elapsed), channels = channel_count, rows, "feature done");

        let metrics = &mut self.performance_metrics;
        metrics.features_computed += 1;
        metrics.channels_processed += channel_count as u64;
        metrics.windows_computed += rows as u64;
        metrics.total_processing_time_s += elapsed;
        if elapsed > metrics.max_feature_time_s {
            metrics.max_feature_time_s = elapsed;
        }
    }
}

/// Compute every channel, then outer-join the per-channel tables in channel order
fn join_channels<F>(channels: &[Channel<'_>], parallel: bool, compute: F) -> EmgResult<FeatureTable>
where
    F: Fn(&Channel<'_>) -> EmgResult<FeatureTable> + Sync + Send,
{
    if channels.is_empty() {
        warn!("recording has no channels for this feature");
    }

    let tables: Vec<EmgResult<FeatureTable>> = if parallel {
        channels.par_iter().map(&compute).collect()
    } else {
        channels.iter().map(&compute).collect()
    };

    tables
        .into_iter()
        .try_fold(FeatureTable::new(), |joined, table| joined.outer_join(&table?))
}

/// Feature table of one channel: its labelled columns keyed by window end
fn channel_table(
    recording: &Recording,
    channel: &Channel<'_>,
    name: &str,
    compute: impl FnOnce() -> EmgResult<FeatureOutput>,
) -> EmgResult<FeatureTable> {
    #[cfg(feature = "performance_monitoring")]
    let started = Instant::now();

    let output = compute()?;
    let keys = recording.keys_at(&output.positions)?;
    let columns = output
        .labels(name, channel.id)
        .into_iter()
        .zip(output.columns())
        .collect();

    #[cfg(feature = "performance_monitoring")]
    debug!(
        channel = channel.name,
        elapsed_ms = started.elapsed().as_secs_f64() * 1e3,
        "channel timing"
    );

    debug!(channel = channel.name, windows = output.len(), "channel done");
    FeatureTable::from_columns(keys, columns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording() -> Recording {
        let n = 40;
        Recording::new((0..n as i64).map(|k| k * 10).collect())
            .unwrap()
            .with_column("EMG_1", (0..n).map(|i| (i as f64 * 0.5).sin()).collect())
            .unwrap()
            .with_column("EMG_2", (0..n).map(|i| (i as f64 * 0.3).cos()).collect())
            .unwrap()
            .with_column("FORCE_1", (0..n).map(|i| i as f64).collect())
            .unwrap()
            .with_column("label", vec![1.0; n])
            .unwrap()
    }

    #[test]
    fn test_apply_feature_labels() {
        let mut pipeline = FeaturePipeline::new(WindowingConfig::new(10, 5), PipelineConfig::default());
        let table = pipeline.apply_feature(&recording(), &Feature::Rms).unwrap();

        assert_eq!(table.column_names(), vec!["rms_1", "rms_2"]);
        assert_eq!(table.len(), 7);
        assert_eq!(table.index()[0], 90);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let windowing = WindowingConfig::new(16, 4);
        let feature = Feature::Ar { order: 2 };

        let parallel = FeaturePipeline::new(windowing, PipelineConfig { parallel_channels: true })
            .apply_feature(&recording(), &feature)
            .unwrap();
        let sequential = FeaturePipeline::new(windowing, PipelineConfig { parallel_channels: false })
            .apply_feature(&recording(), &feature)
            .unwrap();

        assert_eq!(parallel, sequential);
        assert_eq!(parallel.column_names(), vec!["ar_1_0", "ar_1_1", "ar_2_0", "ar_2_1"]);
    }

    #[test]
    fn test_force_labels() {
        let mut pipeline = FeaturePipeline::new(WindowingConfig::new(10, 10), PipelineConfig::default());
        let table = pipeline.apply_force_feature(&recording(), ForceFeature::Last).unwrap();

        assert_eq!(table.column_names(), vec!["FORCE_last_1"]);
        assert_eq!(table.value(90, "FORCE_last_1"), Some(9.0));
    }

    #[test]
    fn test_metrics() {
        let mut pipeline = FeaturePipeline::new(WindowingConfig::new(10, 5), PipelineConfig::default());
        pipeline.apply_feature(&recording(), &Feature::Mav).unwrap();
        pipeline.apply_feature(&recording(), &Feature::Wl).unwrap();

        let metrics = pipeline.get_performance_metrics();
        assert_eq!(metrics.features_computed, 2);
        assert_eq!(metrics.channels_processed, 4);

        pipeline.reset_metrics();
        assert_eq!(pipeline.get_performance_metrics().features_computed, 0);
    }
}
