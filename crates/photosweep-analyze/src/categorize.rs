//! Per-photo categorization.

use photosweep_core::{CategorizedPhoto, Category, PhotoMetadata, Signature, SweepConfig};

use crate::duplicates::DuplicateIndex;
use crate::rules::CategoryRules;
use crate::similarity::{SimilarityMatch, SimilarityScanner};

/// Merges duplicate, similarity and rule results into categorized photos.
///
/// Duplicates take priority: the similarity scan only runs for photos with
/// no duplicates.
pub struct Categorizer<'a> {
    photos: &'a [PhotoMetadata],
    signatures: &'a [Signature],
    index: &'a DuplicateIndex,
    scanner: SimilarityScanner<'a>,
    rules: CategoryRules<'a>,
}

impl<'a> Categorizer<'a> {
    /// Create a categorizer for one sweep.
    ///
    /// `signatures` and `index` must have been built from `photos`.
    pub fn new(
        photos: &'a [PhotoMetadata],
        signatures: &'a [Signature],
        index: &'a DuplicateIndex,
        config: &'a SweepConfig,
    ) -> Self {
        Self {
            photos,
            signatures,
            index,
            scanner: SimilarityScanner::new(photos, config),
            rules: CategoryRules::new(config),
        }
    }

    /// Number of photos this categorizer covers.
    pub fn len(&self) -> usize {
        self.photos.len()
    }

    /// Check if there is nothing to categorize.
    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    /// Categorize the photo at input position `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds.
    pub fn categorize(&self, index: usize) -> CategorizedPhoto {
        let photo = &self.photos[index];
        let duplicate_ids = self.index.duplicate_ids(index, self.photos);

        let similarity = if duplicate_ids.is_empty() {
            self.scanner.scan(index)
        } else {
            SimilarityMatch::default()
        };

        let mut categories = Vec::with_capacity(4);
        if !duplicate_ids.is_empty() {
            categories.push(Category::Duplicate);
        }
        if let Some(kind) = similarity.kind {
            categories.push(kind.category());
        }
        categories.extend(self.rules.categories(photo));

        CategorizedPhoto::new(
            photo.clone(),
            self.signatures[index].clone(),
            categories,
            duplicate_ids,
            similarity.count(),
        )
    }

    /// Categorize every photo in input order.
    pub fn categorize_all(&self) -> Vec<CategorizedPhoto> {
        (0..self.photos.len()).map(|i| self.categorize(i)).collect()
    }
}
