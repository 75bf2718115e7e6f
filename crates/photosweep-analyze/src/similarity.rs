//! Windowed similarity scanning for bursts and near-duplicates.
//!
//! Each photo is compared only with a fixed number of neighbors on either
//! side in creation-time order, so the cost per photo is bounded and a full
//! scan is O(n). Photos whose close matches fall outside the window are
//! missed; that is the price of predictable runtime on large libraries.

use photosweep_core::{Category, PhotoId, PhotoMetadata, SweepConfig};
use serde::{Deserialize, Serialize};

/// Outcome of a similarity scan for one photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Similarity {
    /// One or two similar neighbors.
    Similar,
    /// Enough similar neighbors to be a burst.
    Burst,
}

impl Similarity {
    /// The category this outcome maps to.
    pub fn category(self) -> Category {
        match self {
            Self::Similar => Category::Similar,
            Self::Burst => Category::Burst,
        }
    }
}

/// Similar neighbors found for one photo.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimilarityMatch {
    /// Input positions of the similar neighbors, in scan order.
    pub neighbors: Vec<usize>,
    /// Classification, if any neighbor matched.
    pub kind: Option<Similarity>,
}

impl SimilarityMatch {
    /// Number of similar neighbors found.
    pub fn count(&self) -> usize {
        self.neighbors.len()
    }

    /// Ids of the similar neighbors.
    pub fn neighbor_ids(&self, photos: &[PhotoMetadata]) -> Vec<PhotoId> {
        self.neighbors
            .iter()
            .filter_map(|&i| photos.get(i))
            .map(|p| p.id.clone())
            .collect()
    }
}

/// Scans creation-time neighborhoods for similar photos.
///
/// The scanner sorts positions by creation time itself (stable, so equal
/// times keep input order); callers may pass photos in any order.
#[derive(Debug)]
pub struct SimilarityScanner<'a> {
    photos: &'a [PhotoMetadata],
    /// Input positions in creation-time order.
    order: Vec<usize>,
    /// Rank in `order` of each input position.
    rank: Vec<usize>,
    radius: usize,
    max_similar: usize,
    burst_min_similar: usize,
    size_ratio: f64,
    size_floor: u64,
    time_window_ms: i64,
}

impl<'a> SimilarityScanner<'a> {
    /// Create a scanner over `photos`.
    pub fn new(photos: &'a [PhotoMetadata], config: &SweepConfig) -> Self {
        let mut order: Vec<usize> = (0..photos.len()).collect();
        order.sort_by_key(|&i| photos[i].creation_time);

        let mut rank = vec![0; photos.len()];
        for (position, &index) in order.iter().enumerate() {
            rank[index] = position;
        }

        Self {
            photos,
            order,
            rank,
            radius: config.similarity_radius,
            max_similar: config.max_similar,
            burst_min_similar: config.burst_min_similar,
            size_ratio: config.similar_size_ratio,
            size_floor: config.similar_size_floor,
            time_window_ms: config.similar_time_window_ms,
        }
    }

    /// Find similar neighbors of the photo at input position `index`.
    pub fn scan(&self, index: usize) -> SimilarityMatch {
        let Some(photo) = self.photos.get(index) else {
            return SimilarityMatch::default();
        };

        let center = self.rank[index];
        let start = center.saturating_sub(self.radius);
        let end = (center + self.radius + 1).min(self.order.len());

        let mut neighbors = Vec::new();
        for &other in &self.order[start..end] {
            if neighbors.len() >= self.max_similar {
                break;
            }
            if other != index && self.is_similar(photo, &self.photos[other]) {
                neighbors.push(other);
            }
        }

        let kind = match neighbors.len() {
            0 => None,
            n if n >= self.burst_min_similar => Some(Similarity::Burst),
            _ => Some(Similarity::Similar),
        };

        SimilarityMatch { neighbors, kind }
    }

    /// Check whether `other` looks like another shot of `photo`.
    ///
    /// The size tolerance is relative to `photo`, so the relation is not
    /// strictly symmetric.
    pub fn is_similar(&self, photo: &PhotoMetadata, other: &PhotoMetadata) -> bool {
        if photo.width != other.width || photo.height != other.height {
            return false;
        }

        let size_diff = photo.size.abs_diff(other.size) as f64;
        let size_tolerance = (self.size_ratio * photo.size as f64).max(self.size_floor as f64);
        if size_diff >= size_tolerance {
            return false;
        }

        photo.creation_time.abs_diff(other.creation_time) < self.time_window_ms.unsigned_abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(id: &str, size: u64, time: i64) -> PhotoMetadata {
        PhotoMetadata::new(id, format!("{id}.jpg"))
            .with_dimensions(4000, 3000)
            .with_size(size)
            .with_creation_time(time)
    }

    #[test]
    fn test_is_similar_thresholds() {
        let photos = vec![frame("a", 3_000_000, 0)];
        let scanner = SimilarityScanner::new(&photos, &SweepConfig::default());
        let base = &photos[0];

        assert!(scanner.is_similar(base, &frame("b", 3_200_000, 59_999)));
        assert!(!scanner.is_similar(base, &frame("c", 3_400_000, 0)));
        assert!(!scanner.is_similar(base, &frame("d", 3_000_000, 60_000)));

        let rotated = frame("e", 3_000_000, 0).with_dimensions(3000, 4000);
        assert!(!scanner.is_similar(base, &rotated));
    }

    #[test]
    fn test_size_floor_for_small_files() {
        let photos = vec![frame("a", 20_000, 0)];
        let scanner = SimilarityScanner::new(&photos, &SweepConfig::default());

        // 10% would be 2 KB; the 10 KB floor applies instead
        assert!(scanner.is_similar(&photos[0], &frame("b", 29_000, 0)));
        assert!(!scanner.is_similar(&photos[0], &frame("c", 30_000, 0)));
    }

    #[test]
    fn test_similar_and_burst() {
        let photos = vec![
            frame("a", 3_000_000, 0),
            frame("b", 3_010_000, 1_000),
            frame("c", 3_020_000, 2_000),
            frame("d", 3_030_000, 3_000),
            frame("x", 9_000_000, 4_000),
            frame("y", 1_000_000, 500_000),
            frame("z", 1_005_000, 501_000),
        ];
        let scanner = SimilarityScanner::new(&photos, &SweepConfig::default());

        let burst = scanner.scan(0);
        assert_eq!(burst.neighbors, vec![1, 2, 3]);
        assert_eq!(burst.kind, Some(Similarity::Burst));

        let pair = scanner.scan(5);
        assert_eq!(pair.neighbor_ids(&photos), vec![PhotoId::from("z")]);
        assert_eq!(pair.kind, Some(Similarity::Similar));

        let alone = scanner.scan(4);
        assert_eq!(alone.count(), 0);
        assert_eq!(alone.kind, None);
    }

    #[test]
    fn test_max_similar_cap() {
        let photos: Vec<PhotoMetadata> = (0..10)
            .map(|i| frame(&format!("p{i}"), 3_000_000, i * 100))
            .collect();
        let scanner = SimilarityScanner::new(&photos, &SweepConfig::default());

        assert_eq!(scanner.scan(0).count(), 5);
    }

    #[test]
    fn test_window_radius() {
        let config = SweepConfig::builder()
            .similarity_radius(1usize)
            .build()
            .unwrap();
        // Three identical frames; "c" is two positions from "a".
        let photos = vec![
            frame("a", 3_000_000, 0),
            frame("b", 3_000_000, 10),
            frame("c", 3_000_000, 20),
        ];
        let scanner = SimilarityScanner::new(&photos, &config);

        assert_eq!(scanner.scan(0).neighbors, vec![1]);
        assert_eq!(scanner.scan(1).neighbors, vec![0, 2]);
    }

    #[test]
    fn test_unsorted_input_is_scanned_in_time_order() {
        let config = SweepConfig::builder()
            .similarity_radius(1usize)
            .build()
            .unwrap();
        // Input order puts the unrelated photo between the pair.
        let photos = vec![
            frame("a", 3_000_000, 0),
            frame("far", 3_000_000, 10_000_000),
            frame("b", 3_000_000, 500),
        ];
        let scanner = SimilarityScanner::new(&photos, &config);

        assert_eq!(scanner.scan(0).neighbors, vec![2]);
        assert_eq!(scanner.scan(2).neighbors, vec![0]);
        assert_eq!(scanner.scan(1).kind, None);
    }
}
