//! Analysis algorithms for photosweep.
//!
//! This crate classifies photo records by metadata alone:
//!
//! - **Signatures** - Deterministic fingerprints of quantized metadata
//! - **Duplicate detection** - Signature grouping plus a bounded filename pass
//! - **Similarity scanning** - Burst and near-duplicate detection in a
//!   fixed creation-time window
//! - **Category rules** - Screenshots, low quality, old photos
//! - **Reports** - Duplicate clusters, category groups, sweep summaries
//!
//! # Duplicate Detection
//!
//! Uses a two-phase algorithm for efficiency:
//!
//! 1. Group photos by signature (near O(n))
//! 2. For photos with few matches, add photos with the same normalized
//!    filename, up to a cap
//!
//! ```rust
//! use photosweep_analyze::{Categorizer, DuplicateIndex, SignatureGenerator};
//! use photosweep_core::{Category, PhotoMetadata, Signature, SweepConfig};
//!
//! let photos = vec![
//!     PhotoMetadata::new("1", "DCIM/IMG_001.jpg")
//!         .with_dimensions(4032, 3024)
//!         .with_size(2_500_000)
//!         .with_creation_time(1_700_000_000_000),
//!     PhotoMetadata::new("2", "DCIM/IMG_001 (1).jpg")
//!         .with_dimensions(4032, 3024)
//!         .with_size(2_500_100)
//!         .with_creation_time(1_700_000_010_000),
//! ];
//!
//! let config = SweepConfig::default();
//! let generator = SignatureGenerator::from_config(&config);
//! let signatures: Vec<Signature> = photos
//!     .iter()
//!     .map(|p| generator.generate_or_fallback(p).0)
//!     .collect();
//! let index = DuplicateIndex::build(&photos, &signatures, &config);
//!
//! let results = Categorizer::new(&photos, &signatures, &index, &config).categorize_all();
//! assert!(results[0].has_category(Category::Duplicate));
//! assert_eq!(results[1].duplicate_ids(), &["1"]);
//! ```
//!
//! Scheduling these phases in chunks with progress reporting is the job of
//! `photosweep-scan`.

mod categorize;
mod clusters;
mod duplicates;
mod filename;
mod report;
mod rules;
mod signature;
mod similarity;

pub use categorize::Categorizer;
pub use clusters::{DuplicateGroup, DuplicateReport, duplicate_clusters};
pub use duplicates::DuplicateIndex;
pub use filename::normalize_filename;
pub use report::{CategoryStats, SweepReport, group_by_category};
pub use rules::CategoryRules;
pub use signature::SignatureGenerator;
pub use similarity::{Similarity, SimilarityMatch, SimilarityScanner};

// Re-export core types
pub use photosweep_core::{CategorizedPhoto, Category, PhotoMetadata, Signature, SweepConfig};
