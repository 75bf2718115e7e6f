//! Sweep scheduling for photosweep.
//!
//! This crate runs the analysis phases over a whole library without
//! starving the host runtime.
//!
//! # Overview
//!
//! `photosweep-scan` drives a sweep in three phases:
//!
//! - **Signatures** in fixed-size chunks, optionally parallel via rayon
//! - **Grouping** into the duplicate index
//! - **Categorization** with a cooperative yield every few photos
//!
//! Overall progress is reported as a percentage that never decreases and
//! always ends at 100.
//!
//! # Example
//!
//! ```rust
//! use photosweep_scan::{PhotoMetadata, SweepScanner};
//!
//! let photos = vec![
//!     PhotoMetadata::new("1", "DCIM/IMG_001.jpg")
//!         .with_dimensions(4032, 3024)
//!         .with_size(2_500_000)
//!         .with_creation_time(1_700_000_000_000),
//! ];
//!
//! let scanner = SweepScanner::new();
//! let outcome = scanner
//!     .scan_blocking(&photos, |percent| println!("{percent}%"))
//!     .unwrap();
//!
//! assert_eq!(outcome.photos.len(), 1);
//! ```
//!
//! # Progress Monitoring
//!
//! Subscribe to detailed progress updates:
//!
//! ```rust,no_run
//! use photosweep_scan::SweepScanner;
//!
//! let scanner = SweepScanner::new();
//! let mut progress_rx = scanner.subscribe();
//!
//! // Handle progress in a separate task
//! tokio::spawn(async move {
//!     while let Ok(progress) = progress_rx.recv().await {
//!         println!("{}: {}%", progress.phase, progress.percent);
//!     }
//! });
//! ```

mod progress;
mod scanner;

pub use progress::{SweepPhase, SweepProgress};
pub use scanner::{SweepOutcome, SweepScanner};

// Re-export core types for convenience
pub use photosweep_core::{
    CategorizedPhoto, Category, PhotoMetadata, SweepConfig, SweepError, SweepWarning, WarningKind,
};
