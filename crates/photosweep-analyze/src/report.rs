//! Category views and sweep summaries.

use indexmap::IndexMap;
use itertools::Itertools;
use photosweep_core::{CategorizedPhoto, Category};
use serde::{Deserialize, Serialize};

use crate::clusters::DuplicateReport;

/// Group photos by category label.
///
/// A photo appears under every category it carries. Keys follow the
/// canonical category order; categories with no photos are absent.
pub fn group_by_category(
    photos: &[CategorizedPhoto],
) -> IndexMap<Category, Vec<&CategorizedPhoto>> {
    let mut groups: IndexMap<Category, Vec<&CategorizedPhoto>> = IndexMap::new();
    for photo in photos {
        for &category in photo.categories() {
            groups.entry(category).or_default().push(photo);
        }
    }
    groups.sort_keys();
    groups
}

/// Statistics for one category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: Category,
    /// Number of photos carrying the category.
    pub photo_count: u64,
    /// Total size of those photos.
    pub total_size: u64,
}

/// Summary of a completed sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// Per-category statistics in canonical order.
    pub categories: Vec<CategoryStats>,
    /// Total photos swept.
    pub total_photos: u64,
    /// Total size of all photos.
    pub total_size: u64,
    /// Photos that matched at least one category.
    pub flagged_photos: u64,
    /// Space reclaimable by deleting all but one photo per duplicate cluster.
    pub reclaimable_bytes: u64,
    /// Number of duplicate clusters.
    pub duplicate_groups: usize,
}

impl SweepReport {
    /// Summarize categorized photos.
    pub fn from_photos(photos: &[CategorizedPhoto]) -> Self {
        let categories = group_by_category(photos)
            .into_iter()
            .map(|(category, members)| CategoryStats {
                category,
                photo_count: members.len() as u64,
                total_size: members.iter().map(|p| p.photo().size).sum(),
            })
            .collect();

        let duplicates = DuplicateReport::from_photos(photos);

        Self {
            categories,
            total_photos: photos.len() as u64,
            total_size: photos.iter().map(|p| p.photo().size).sum(),
            flagged_photos: photos.iter().filter(|p| !p.categories().is_empty()).count() as u64,
            reclaimable_bytes: duplicates.total_wasted_space,
            duplicate_groups: duplicates.group_count,
        }
    }

    /// Statistics for one category, if any photo carries it.
    pub fn stats(&self, category: Category) -> Option<&CategoryStats> {
        self.categories.iter().find(|s| s.category == category)
    }

    /// The category holding the most bytes.
    pub fn largest_category(&self) -> Option<&CategoryStats> {
        self.categories.iter().max_by_key(|s| s.total_size)
    }

    /// Categories ordered by photo count, most populated first.
    pub fn by_photo_count(&self) -> Vec<&CategoryStats> {
        self.categories
            .iter()
            .sorted_by(|a, b| b.photo_count.cmp(&a.photo_count))
            .collect()
    }
}
