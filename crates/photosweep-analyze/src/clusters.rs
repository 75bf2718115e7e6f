//! Duplicate cluster extraction from categorized photos.

use std::cmp::Reverse;
use std::collections::{HashMap, VecDeque};

use photosweep_core::{CategorizedPhoto, PhotoId, Signature};
use serde::{Deserialize, Serialize};

/// A maximal group of photos connected through duplicate references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Signature of the first member, in input order.
    pub signature: Signature,

    /// Ids of all members, in input order.
    pub photo_ids: Vec<PhotoId>,

    /// Combined size of all members.
    pub total_size: u64,

    /// Bytes freed by keeping only the keeper.
    pub wasted_bytes: u64,

    /// Suggested member to keep: most pixels, then largest, then earliest.
    pub keeper_id: PhotoId,
}

impl DuplicateGroup {
    /// Get the number of photos in the group.
    pub fn count(&self) -> usize {
        self.photo_ids.len()
    }

    /// Number of photos that could be deleted while keeping one.
    pub fn deletable_count(&self) -> usize {
        self.photo_ids.len().saturating_sub(1)
    }

    /// Ids of every member except the keeper.
    pub fn deletable_ids(&self) -> impl Iterator<Item = &PhotoId> {
        self.photo_ids.iter().filter(move |id| **id != self.keeper_id)
    }
}

/// Duplicate clusters across a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// Groups of duplicates, sorted by wasted space descending.
    pub groups: Vec<DuplicateGroup>,

    /// Total space that could be reclaimed.
    pub total_wasted_space: u64,

    /// Number of photos analyzed.
    pub photos_analyzed: u64,

    /// Number of photos that belong to a group.
    pub photos_with_duplicates: u64,

    /// Number of groups.
    pub group_count: usize,
}

impl DuplicateReport {
    /// Build clusters from categorized photos.
    pub fn from_photos(photos: &[CategorizedPhoto]) -> Self {
        let mut groups = duplicate_clusters(photos);
        groups.sort_by_key(|g| Reverse(g.wasted_bytes));

        Self {
            total_wasted_space: groups.iter().map(|g| g.wasted_bytes).sum(),
            photos_analyzed: photos.len() as u64,
            photos_with_duplicates: groups.iter().map(|g| g.count() as u64).sum(),
            group_count: groups.len(),
            groups,
        }
    }

    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Keep only the `n` groups wasting the most space.
    pub fn truncate(&mut self, n: usize) {
        self.groups.truncate(n);
    }
}

/// Extract maximal duplicate clusters.
///
/// Photos are connected when either lists the other in its duplicate ids;
/// each photo lands in at most one cluster. Ids that do not belong to the
/// given photos are ignored. Clusters are ordered by their first member.
pub fn duplicate_clusters(photos: &[CategorizedPhoto]) -> Vec<DuplicateGroup> {
    let positions: HashMap<&str, usize> = photos
        .iter()
        .enumerate()
        .map(|(i, p)| (p.id(), i))
        .collect();

    // Undirected adjacency so a one-sided reference still links both photos
    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); photos.len()];
    for (i, photo) in photos.iter().enumerate() {
        for id in photo.duplicate_ids() {
            if let Some(&j) = positions.get(id.as_str()) {
                if j != i {
                    adjacency[i].push(j);
                    adjacency[j].push(i);
                }
            }
        }
    }

    let mut visited = vec![false; photos.len()];
    let mut clusters = Vec::new();

    for start in 0..photos.len() {
        if visited[start] || adjacency[start].is_empty() {
            continue;
        }

        let mut members = Vec::new();
        let mut queue = VecDeque::from([start]);
        visited[start] = true;
        while let Some(current) = queue.pop_front() {
            members.push(current);
            for &next in &adjacency[current] {
                if !visited[next] {
                    visited[next] = true;
                    queue.push_back(next);
                }
            }
        }
        members.sort_unstable();

        clusters.push(build_group(photos, &members));
    }

    clusters
}

fn build_group(photos: &[CategorizedPhoto], members: &[usize]) -> DuplicateGroup {
    let total_size: u64 = members.iter().map(|&i| photos[i].photo().size).sum();

    let keeper = members
        .iter()
        .copied()
        .max_by_key(|&i| {
            let photo = photos[i].photo();
            (photo.pixel_count(), photo.size, Reverse(i))
        })
        .unwrap_or(members[0]);
    let keeper_size = photos[keeper].photo().size;

    DuplicateGroup {
        signature: photos[members[0]].signature().clone(),
        photo_ids: members.iter().map(|&i| photos[i].photo().id.clone()).collect(),
        total_size,
        wasted_bytes: total_size - keeper_size,
        keeper_id: photos[keeper].photo().id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use photosweep_core::{Category, PhotoMetadata};

    fn photo(id: &str, size: u64, dims: (u32, u32), duplicates: &[&str]) -> CategorizedPhoto {
        let categories = if duplicates.is_empty() {
            vec![]
        } else {
            vec![Category::Duplicate]
        };
        CategorizedPhoto::new(
            PhotoMetadata::new(id, format!("{id}.jpg"))
                .with_dimensions(dims.0, dims.1)
                .with_size(size),
            Signature::new(format!("sig-{id}")),
            categories,
            duplicates.iter().map(|d| PhotoId::from(*d)),
            0,
        )
    }

    #[test]
    fn test_transitive_clusters() {
        let photos = vec![
            photo("a", 100, (10, 10), &["b"]),
            photo("b", 300, (10, 10), &["a", "c"]),
            photo("c", 200, (10, 10), &["b"]),
            photo("d", 50, (10, 10), &[]),
            photo("e", 70, (20, 20), &["f"]),
            photo("f", 90, (10, 10), &["e"]),
        ];

        let clusters = duplicate_clusters(&photos);

        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].photo_ids, vec!["a", "b", "c"]);
        assert_eq!(clusters[0].keeper_id, "b");
        assert_eq!(clusters[0].total_size, 600);
        assert_eq!(clusters[0].wasted_bytes, 300);
        assert_eq!(clusters[0].signature.as_str(), "sig-a");

        // More pixels wins over a larger file
        assert_eq!(clusters[1].keeper_id, "e");
        assert_eq!(clusters[1].wasted_bytes, 90);
        assert_eq!(clusters[1].deletable_ids().collect::<Vec<_>>(), vec!["f"]);
    }

    #[test]
    fn test_each_photo_in_one_cluster() {
        let photos = vec![
            photo("a", 1, (1, 1), &["b", "c"]),
            photo("b", 1, (1, 1), &["a"]),
            photo("c", 1, (1, 1), &["a", "missing"]),
        ];

        let clusters = duplicate_clusters(&photos);

        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].count(), 3);
        assert_eq!(clusters[0].deletable_count(), 2);
        // Equal candidates keep the earliest
        assert_eq!(clusters[0].keeper_id, "a");
    }

    #[test]
    fn test_report_sorted_by_waste() {
        let photos = vec![
            photo("a", 10, (1, 1), &["b"]),
            photo("b", 10, (1, 1), &["a"]),
            photo("c", 500, (1, 1), &["d"]),
            photo("d", 500, (1, 1), &["c"]),
        ];

        let mut report = DuplicateReport::from_photos(&photos);

        assert!(report.has_duplicates());
        assert_eq!(report.group_count, 2);
        assert_eq!(report.groups[0].photo_ids, vec!["c", "d"]);
        assert_eq!(report.total_wasted_space, 510);
        assert_eq!(report.photos_with_duplicates, 4);

        report.truncate(1);
        assert_eq!(report.groups.len(), 1);
    }

    #[test]
    fn test_no_duplicates() {
        let photos = vec![photo("a", 10, (1, 1), &[])];
        let report = DuplicateReport::from_photos(&photos);

        assert!(!report.has_duplicates());
        assert_eq!(report.photos_analyzed, 1);
    }
}
