//! Duplicate detection by signature grouping.
//!
//! Uses a two-phase algorithm:
//! 1. Group photos by signature (one pass, O(n))
//! 2. For photos with few signature matches, add photos sharing the same
//!    normalized filename, up to a cap
//!
//! The second phase recovers renamed or re-exported copies whose quantized
//! size or time differ. Near-duplicates that differ in every field are left
//! to the similarity scanner.

use std::collections::{BTreeSet, HashMap};

use photosweep_core::{PhotoId, PhotoMetadata, Signature, SweepConfig};
use tracing::debug;

use crate::filename::normalize_filename;

/// Signature and filename index over one sweep's photos.
///
/// Built once per sweep and dropped with it; nothing is shared between runs.
#[derive(Debug, Clone)]
pub struct DuplicateIndex {
    /// Duplicate positions for each photo, ascending, excluding itself.
    duplicates: Vec<Vec<usize>>,
    /// Number of signatures shared by more than one photo.
    signature_groups: usize,
}

impl DuplicateIndex {
    /// Build the index.
    ///
    /// `signatures[i]` must be the signature of `photos[i]`.
    pub fn build(photos: &[PhotoMetadata], signatures: &[Signature], config: &SweepConfig) -> Self {
        debug_assert_eq!(photos.len(), signatures.len());

        // Phase 1: Group by signature
        let mut by_signature: HashMap<&Signature, Vec<usize>> = HashMap::new();
        for (index, signature) in signatures.iter().enumerate() {
            by_signature.entry(signature).or_default().push(index);
        }
        let signature_groups = by_signature.values().filter(|v| v.len() > 1).count();

        // Filename index for the secondary pass; empty names never match
        let bases: Vec<String> = photos
            .iter()
            .map(|p| normalize_filename(p.file_name()))
            .collect();
        let mut by_filename: HashMap<&str, Vec<usize>> = HashMap::new();
        for (index, base) in bases.iter().enumerate() {
            if !base.is_empty() {
                by_filename.entry(base.as_str()).or_default().push(index);
            }
        }

        // Phase 2: Per-photo candidates
        let mut duplicates: Vec<BTreeSet<usize>> = Vec::with_capacity(photos.len());
        let mut filename_matches = 0usize;
        for (index, signature) in signatures.iter().enumerate() {
            let mut found: BTreeSet<usize> = by_signature
                .get(signature)
                .into_iter()
                .flatten()
                .copied()
                .filter(|&other| other != index)
                .collect();

            if found.len() < config.filename_pass_below {
                let candidates = by_filename.get(bases[index].as_str()).into_iter().flatten();
                for &other in candidates {
                    if found.len() >= config.max_duplicates {
                        break;
                    }
                    if other != index && found.insert(other) {
                        filename_matches += 1;
                    }
                }
            }

            duplicates.push(found);
        }

        // Caps may cut one side of a pair; close over symmetry.
        for index in 0..duplicates.len() {
            let others: Vec<usize> = duplicates[index].iter().copied().collect();
            for other in others {
                duplicates[other].insert(index);
            }
        }

        debug!(
            target: "photosweep::duplicates",
            photos = photos.len(),
            signature_groups,
            filename_matches,
            "built duplicate index"
        );

        Self {
            duplicates: duplicates
                .into_iter()
                .map(|set| set.into_iter().collect())
                .collect(),
            signature_groups,
        }
    }

    /// Positions of the photos duplicating the photo at `index`.
    pub fn duplicates_of(&self, index: usize) -> &[usize] {
        self.duplicates.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check if the photo at `index` has any duplicates.
    pub fn has_duplicates(&self, index: usize) -> bool {
        !self.duplicates_of(index).is_empty()
    }

    /// Ids of the photos duplicating the photo at `index`.
    pub fn duplicate_ids(&self, index: usize, photos: &[PhotoMetadata]) -> Vec<PhotoId> {
        self.duplicates_of(index)
            .iter()
            .filter_map(|&other| photos.get(other))
            .map(|p| p.id.clone())
            .collect()
    }

    /// Number of photos that have at least one duplicate.
    pub fn photos_with_duplicates(&self) -> usize {
        self.duplicates.iter().filter(|d| !d.is_empty()).count()
    }

    /// Number of signatures shared by more than one photo.
    pub fn signature_groups(&self) -> usize {
        self.signature_groups
    }

    /// Number of photos indexed.
    pub fn len(&self) -> usize {
        self.duplicates.len()
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.duplicates.is_empty()
    }
}
