//! Sweep configuration types.

use std::time::Duration;

use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

const DAY: u64 = 24 * 60 * 60;

/// Configuration for a sweep.
///
/// Every heuristic threshold used by the analyzers lives here so callers can
/// tune them. Missing fields in serialized configs fall back to the defaults.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct SweepConfig {
    /// Photos fingerprinted per chunk before yielding.
    #[builder(default = "50")]
    pub signature_chunk_size: usize,

    /// Photos categorized between yields.
    #[builder(default = "25")]
    pub categorize_yield_every: usize,

    /// Fingerprint each chunk on the rayon pool.
    #[builder(default = "false")]
    pub parallel_signatures: bool,

    /// Size quantum for signatures, in bytes.
    #[builder(default = "1000")]
    pub size_bucket_bytes: u64,

    /// Time quantum for signatures, in milliseconds.
    #[builder(default = "60_000")]
    pub time_bucket_ms: i64,

    /// The filename pass only runs for photos with fewer duplicates than this.
    #[builder(default = "10")]
    pub filename_pass_below: usize,

    /// The filename pass stops adding once a photo has this many duplicates.
    #[builder(default = "20")]
    pub max_duplicates: usize,

    /// Neighbors examined on each side in creation-time order.
    #[builder(default = "25")]
    pub similarity_radius: usize,

    /// Stop looking after this many similar neighbors.
    #[builder(default = "5")]
    pub max_similar: usize,

    /// Similar neighbors needed for a burst.
    #[builder(default = "3")]
    pub burst_min_similar: usize,

    /// Allowed size difference as a fraction of the photo's own size.
    #[builder(default = "0.1")]
    pub similar_size_ratio: f64,

    /// Lower bound on the allowed size difference, in bytes.
    #[builder(default = "10_000")]
    pub similar_size_floor: u64,

    /// Allowed capture time difference, in milliseconds.
    #[builder(default = "60_000")]
    pub similar_time_window_ms: i64,

    /// Width/height difference below which a photo counts as square.
    #[builder(default = "10")]
    pub screenshot_square_tolerance: u32,

    /// Per-axis tolerance against known screen resolutions, in pixels.
    #[builder(default = "50")]
    pub screenshot_resolution_tolerance: u32,

    /// Known device screen resolutions (width, height), portrait.
    #[builder(default = "default_screen_resolutions()")]
    pub screen_resolutions: Vec<(u32, u32)>,

    /// Photos smaller than this many bytes are low quality.
    #[builder(default = "50_000")]
    pub low_quality_min_size: u64,

    /// Bytes-per-pixel check applies above this pixel count.
    #[builder(default = "1_000_000")]
    pub low_quality_min_pixels: u64,

    /// Minimum bytes per pixel for large photos.
    #[builder(default = "0.1")]
    pub low_quality_min_bytes_per_pixel: f64,

    /// Photos older than this are old and unused.
    #[builder(default = "Duration::from_secs(365 * DAY)")]
    pub old_unused_after: Duration,

    /// Reference time for age calculations (default: now).
    #[builder(default = "Utc::now()")]
    pub reference_time: DateTime<Utc>,
}

/// Common phone, tablet and desktop screen resolutions.
pub fn default_screen_resolutions() -> Vec<(u32, u32)> {
    vec![
        (720, 1280),
        (750, 1334),
        (828, 1792),
        (1080, 1920),
        (1080, 2340),
        (1080, 2400),
        (1125, 2436),
        (1170, 2532),
        (1179, 2556),
        (1242, 2688),
        (1284, 2778),
        (1290, 2796),
        (1440, 2560),
        (1440, 3200),
        (1536, 2048),
        (1668, 2388),
        (2048, 2732),
        (1366, 768),
        (1920, 1080),
        (2560, 1440),
    ]
}

impl SweepConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        let defaults = SweepConfig::default();
        SweepConfig {
            signature_chunk_size: self
                .signature_chunk_size
                .unwrap_or(defaults.signature_chunk_size),
            categorize_yield_every: self
                .categorize_yield_every
                .unwrap_or(defaults.categorize_yield_every),
            similarity_radius: self.similarity_radius.unwrap_or(defaults.similarity_radius),
            size_bucket_bytes: self.size_bucket_bytes.unwrap_or(defaults.size_bucket_bytes),
            time_bucket_ms: self.time_bucket_ms.unwrap_or(defaults.time_bucket_ms),
            similar_size_ratio: self.similar_size_ratio.unwrap_or(defaults.similar_size_ratio),
            low_quality_min_bytes_per_pixel: self
                .low_quality_min_bytes_per_pixel
                .unwrap_or(defaults.low_quality_min_bytes_per_pixel),
            ..defaults
        }
        .validate()
    }
}

impl SweepConfig {
    /// Create a new config builder.
    pub fn builder() -> SweepConfigBuilder {
        SweepConfigBuilder::default()
    }

    /// Check the config for values the analyzers cannot work with.
    ///
    /// Builders run this automatically; deserialized configs must call it.
    pub fn validate(&self) -> Result<(), String> {
        if self.signature_chunk_size == 0 {
            return Err("Signature chunk size must be greater than zero".to_string());
        }
        if self.categorize_yield_every == 0 {
            return Err("Categorize yield interval must be greater than zero".to_string());
        }
        if self.similarity_radius == 0 {
            return Err("Similarity radius must be greater than zero".to_string());
        }
        if self.size_bucket_bytes == 0 || self.time_bucket_ms <= 0 {
            return Err("Signature buckets must be greater than zero".to_string());
        }
        for (name, ratio) in [
            ("similar_size_ratio", self.similar_size_ratio),
            ("low_quality_min_bytes_per_pixel", self.low_quality_min_bytes_per_pixel),
        ] {
            if !ratio.is_finite() || ratio < 0.0 {
                return Err(format!("{name} must be a finite, non-negative number"));
            }
        }
        Ok(())
    }

    /// Age of a creation timestamp relative to the reference time.
    ///
    /// Timestamps in the future have zero age.
    pub fn age_of(&self, creation_time_ms: i64) -> Duration {
        let age_ms = self.reference_time.timestamp_millis().saturating_sub(creation_time_ms);
        Duration::from_millis(u64::try_from(age_ms).unwrap_or(0))
    }
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            signature_chunk_size: 50,
            categorize_yield_every: 25,
            parallel_signatures: false,
            size_bucket_bytes: 1000,
            time_bucket_ms: 60_000,
            filename_pass_below: 10,
            max_duplicates: 20,
            similarity_radius: 25,
            max_similar: 5,
            burst_min_similar: 3,
            similar_size_ratio: 0.1,
            similar_size_floor: 10_000,
            similar_time_window_ms: 60_000,
            screenshot_square_tolerance: 10,
            screenshot_resolution_tolerance: 50,
            screen_resolutions: default_screen_resolutions(),
            low_quality_min_size: 50_000,
            low_quality_min_pixels: 1_000_000,
            low_quality_min_bytes_per_pixel: 0.1,
            old_unused_after: Duration::from_secs(365 * DAY),
            reference_time: Utc::now(),
        }
    }
}
