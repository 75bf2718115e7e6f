//! Chunked, cooperative sweep scheduler.

use std::time::Duration;

use photosweep_analyze::{Categorizer, DuplicateIndex, SignatureGenerator, SweepReport};
use photosweep_core::{
    CategorizedPhoto, PhotoMetadata, Signature, SweepConfig, SweepError, SweepWarning,
};
use rayon::prelude::*;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::progress::{
    CATEGORIZE_END_PERCENT, COMPLETE_PERCENT, GROUPING_PERCENT, ProgressReporter,
    STARTING_PERCENT, SweepPhase, SweepProgress, band,
};

/// Result of a completed sweep.
#[derive(Debug, Clone)]
pub struct SweepOutcome {
    /// One entry per input photo, in input order.
    pub photos: Vec<CategorizedPhoto>,
    /// Non-fatal problems encountered during the sweep.
    pub warnings: Vec<SweepWarning>,
    /// Wall time of the sweep.
    pub elapsed: Duration,
}

impl SweepOutcome {
    /// Check if any warnings were recorded.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Summarize the categorized photos.
    pub fn report(&self) -> SweepReport {
        SweepReport::from_photos(&self.photos)
    }

    /// Take the categorized photos.
    pub fn into_photos(self) -> Vec<CategorizedPhoto> {
        self.photos
    }
}

/// Sweeps a photo library in three phases: signatures, grouping, and
/// categorization.
///
/// Work is split into chunks and the scanner yields to the runtime between
/// them. Dropping the sweep future at one of those points abandons the sweep
/// without producing partial output.
pub struct SweepScanner {
    config: SweepConfig,
    progress_tx: broadcast::Sender<SweepProgress>,
}

impl SweepScanner {
    /// Create a scanner with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SweepConfig::default())
    }

    /// Create a scanner with a custom configuration.
    pub fn with_config(config: SweepConfig) -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            config,
            progress_tx,
        }
    }

    /// Get the configuration.
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Subscribe to sweep progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<SweepProgress> {
        self.progress_tx.subscribe()
    }

    /// Sweep photos without a progress callback.
    pub async fn scan(&self, photos: &[PhotoMetadata]) -> SweepOutcome {
        self.scan_with_progress(photos, |_| {}).await
    }

    /// Sweep photos, reporting overall completion in percent.
    ///
    /// The callback sees non-decreasing values ending at exactly 100. A
    /// panicking callback does not abort the sweep.
    pub async fn scan_with_progress<F>(&self, photos: &[PhotoMetadata], on_progress: F) -> SweepOutcome
    where
        F: FnMut(u8),
    {
        let total = photos.len();
        let mut reporter = ProgressReporter::new(on_progress, &self.progress_tx);
        reporter.report(SweepPhase::Starting, STARTING_PERCENT, 0, total);

        if photos.is_empty() {
            reporter.report(SweepPhase::Complete, COMPLETE_PERCENT, 0, 0);
            return SweepOutcome {
                photos: Vec::new(),
                elapsed: reporter.elapsed(),
                warnings: reporter.into_warnings(),
            };
        }

        info!(target: "photosweep::scan", total, "starting sweep");

        let (signatures, mut warnings) = self.compute_signatures(photos, &mut reporter).await;

        let index = DuplicateIndex::build(photos, &signatures, &self.config);
        reporter.report(SweepPhase::Grouping, GROUPING_PERCENT, total, total);
        debug!(
            target: "photosweep::scan",
            groups = index.signature_groups(),
            with_duplicates = index.photos_with_duplicates(),
            "duplicate index built"
        );

        let results = self.categorize(photos, &signatures, &index, &mut reporter).await;
        reporter.report(SweepPhase::Complete, COMPLETE_PERCENT, total, total);

        let elapsed = reporter.elapsed();
        warnings.extend(reporter.into_warnings());
        info!(
            target: "photosweep::scan",
            total,
            warnings = warnings.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "sweep complete"
        );

        SweepOutcome {
            photos: results,
            warnings,
            elapsed,
        }
    }

    /// Sweep photos on a dedicated current-thread runtime.
    ///
    /// Must not be called from within an async context.
    pub fn scan_blocking<F>(
        &self,
        photos: &[PhotoMetadata],
        on_progress: F,
    ) -> Result<SweepOutcome, SweepError>
    where
        F: FnMut(u8),
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .map_err(|source| SweepError::Runtime { source })?;

        Ok(runtime.block_on(self.scan_with_progress(photos, on_progress)))
    }

    /// Compute signatures chunk by chunk, keeping input order.
    async fn compute_signatures<F>(
        &self,
        photos: &[PhotoMetadata],
        reporter: &mut ProgressReporter<'_, F>,
    ) -> (Vec<Signature>, Vec<SweepWarning>)
    where
        F: FnMut(u8),
    {
        let total = photos.len();
        let chunk_size = self.config.signature_chunk_size.max(1);
        let generator = SignatureGenerator::from_config(&self.config);

        let mut signatures = Vec::with_capacity(total);
        let mut warnings = Vec::new();

        for chunk in photos.chunks(chunk_size) {
            let generated: Vec<(Signature, Option<SweepWarning>)> = if self.config.parallel_signatures {
                chunk
                    .par_iter()
                    .map(|photo| generator.generate_or_fallback(photo))
                    .collect()
            } else {
                chunk
                    .iter()
                    .map(|photo| generator.generate_or_fallback(photo))
                    .collect()
            };

            for (signature, warning) in generated {
                signatures.push(signature);
                warnings.extend(warning);
            }

            let done = signatures.len();
            reporter.report(
                SweepPhase::Signatures,
                band(STARTING_PERCENT, GROUPING_PERCENT, done, total),
                done,
                total,
            );
            tokio::task::yield_now().await;
        }

        debug!(
            target: "photosweep::scan",
            total,
            degraded = warnings.len(),
            "signatures computed"
        );

        (signatures, warnings)
    }

    async fn categorize<F>(
        &self,
        photos: &[PhotoMetadata],
        signatures: &[Signature],
        index: &DuplicateIndex,
        reporter: &mut ProgressReporter<'_, F>,
    ) -> Vec<CategorizedPhoto>
    where
        F: FnMut(u8),
    {
        let total = photos.len();
        let yield_every = self.config.categorize_yield_every.max(1);
        let categorizer = Categorizer::new(photos, signatures, index, &self.config);

        let mut results = Vec::with_capacity(total);
        for i in 0..total {
            results.push(categorizer.categorize(i));

            let done = i + 1;
            if done % yield_every == 0 {
                reporter.report(
                    SweepPhase::Categorizing,
                    band(GROUPING_PERCENT, CATEGORIZE_END_PERCENT, done, total),
                    done,
                    total,
                );
                tokio::task::yield_now().await;
            }
        }

        results
    }
}

impl Default for SweepScanner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photosweep_core::Category;

    fn photos(n: usize) -> Vec<PhotoMetadata> {
        (0..n)
            .map(|i| {
                PhotoMetadata::new(format!("{i}"), format!("DCIM/IMG_{i:04}.jpg"))
                    .with_dimensions(4032, 3024)
                    .with_size(2_000_000 + i as u64 * 1_000_000)
                    .with_creation_time(1_700_000_000_000 + i as i64 * 3_600_000)
            })
            .collect()
    }

    #[tokio::test]
    async fn test_progress_bands() {
        let scanner = SweepScanner::new();
        let mut seen = Vec::new();

        let outcome = scanner
            .scan_with_progress(&photos(100), |p| seen.push(p))
            .await;

        assert_eq!(outcome.photos.len(), 100);
        // Start, two signature chunks, grouping, four categorize ticks, done
        assert_eq!(seen, vec![5, 27, 50, 50, 61, 72, 83, 95, 100]);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let scanner = SweepScanner::new();
        let mut seen = Vec::new();

        let outcome = scanner.scan_with_progress(&[], |p| seen.push(p)).await;

        assert!(outcome.photos.is_empty());
        assert!(!outcome.has_warnings());
        assert_eq!(seen.last(), Some(&100));
    }

    #[tokio::test]
    async fn test_subscribe_receives_updates() {
        let scanner = SweepScanner::new();
        let mut rx = scanner.subscribe();

        scanner.scan(&photos(3)).await;

        let mut last = None;
        while let Ok(progress) = rx.try_recv() {
            last = Some(progress);
        }
        let last = last.unwrap();
        assert!(last.is_complete());
        assert_eq!(last.percent, 100);
        assert_eq!(last.total, 3);
    }

    #[tokio::test]
    async fn test_degraded_signature_warning() {
        let scanner = SweepScanner::new();
        let input = vec![
            PhotoMetadata::new("", "x.jpg")
                .with_dimensions(10, 20)
                .with_size(30)
                .with_creation_time(5),
            PhotoMetadata::new("scan", "Scans/1965.jpg")
                .with_dimensions(10, 20)
                .with_size(30)
                .with_creation_time(-157_766_400_000),
        ];

        let outcome = scanner.scan(&input).await;

        assert_eq!(outcome.photos[0].signature().as_str(), "10|20|30");
        assert_ne!(outcome.photos[1].signature().as_str(), "10|20|30");
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].photo_id.as_deref(), Some(""));
    }

    #[test]
    fn test_scan_blocking() {
        let scanner = SweepScanner::new();
        let outcome = scanner.scan_blocking(&photos(2), |_| {}).unwrap();

        assert_eq!(outcome.photos.len(), 2);
        assert!(outcome.photos.iter().all(|p| !p.has_category(Category::Duplicate)));
    }
}
