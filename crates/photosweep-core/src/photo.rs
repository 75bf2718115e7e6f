//! Photo records, signatures, and category labels.

use std::collections::HashSet;
use std::fmt;

use compact_str::CompactString;
use serde::{Deserialize, Deserializer, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoStaticStr};

/// Opaque unique identifier of a photo.
pub type PhotoId = CompactString;

/// Metadata for one photo, as supplied by the media store.
///
/// Numeric fields that are missing or `null` in serialized input default to
/// zero, so every record can be fingerprinted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoMetadata {
    /// Opaque unique id.
    pub id: PhotoId,
    /// Opaque locator; only its trailing segment is read.
    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,
    /// Width in pixels.
    #[serde(default, deserialize_with = "null_as_default")]
    pub width: u32,
    /// Height in pixels.
    #[serde(default, deserialize_with = "null_as_default")]
    pub height: u32,
    /// File size in bytes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub size: u64,
    /// Creation time in epoch milliseconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub creation_time: i64,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl PhotoMetadata {
    /// Create a record with an id and uri; all numeric fields are zero.
    pub fn new(id: impl Into<PhotoId>, uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            uri: uri.into(),
            ..Self::default()
        }
    }

    /// Set the pixel dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the file size in bytes.
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    /// Set the creation time in epoch milliseconds.
    pub fn with_creation_time(mut self, creation_time: i64) -> Self {
        self.creation_time = creation_time;
        self
    }

    /// Total number of pixels.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Trailing path segment of the uri.
    pub fn file_name(&self) -> &str {
        self.uri
            .rsplit(['/', '\\'])
            .next()
            .unwrap_or(self.uri.as_str())
    }
}

/// Deterministic fingerprint derived from quantized metadata.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Signature(CompactString);

impl Signature {
    /// Wrap an already computed signature string.
    pub fn new(value: impl Into<CompactString>) -> Self {
        Self(value.into())
    }

    /// Get the signature as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Cleanup category a photo may be placed in.
///
/// Categories are not exclusive; the declaration order is the canonical
/// order used when a photo carries several labels.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Category {
    /// Shares a signature or normalized filename with another photo.
    Duplicate,
    /// One or two close neighbors in time, size and dimensions.
    Similar,
    /// Three or more close neighbors.
    Burst,
    /// Screen-shaped dimensions.
    Screenshot,
    /// Too small, or too few bytes per pixel.
    LowQuality,
    /// Not taken within the retention window.
    OldUnused,
}

impl Category {
    /// Human-readable title for reports.
    pub fn title(self) -> &'static str {
        match self {
            Self::Duplicate => "Duplicates",
            Self::Similar => "Similar",
            Self::Burst => "Bursts",
            Self::Screenshot => "Screenshots",
            Self::LowQuality => "Low quality",
            Self::OldUnused => "Old & unused",
        }
    }
}

/// A photo together with its classification results.
///
/// Built once per input record by the categorizer; the constructor enforces
/// that categories are unique and that the duplicate count matches the ids.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedPhoto {
    #[serde(flatten)]
    photo: PhotoMetadata,
    signature: Signature,
    categories: Vec<Category>,
    duplicate_ids: Vec<PhotoId>,
    duplicate_count: usize,
    similar_count: usize,
}

impl CategorizedPhoto {
    /// Assemble a categorized photo.
    pub fn new(
        photo: PhotoMetadata,
        signature: Signature,
        categories: impl IntoIterator<Item = Category>,
        duplicate_ids: impl IntoIterator<Item = PhotoId>,
        similar_count: usize,
    ) -> Self {
        let mut categories: Vec<Category> = categories.into_iter().collect();
        categories.sort();
        categories.dedup();

        // First occurrence wins, order kept
        let mut seen: HashSet<PhotoId> = HashSet::new();
        let unique_ids: Vec<PhotoId> = duplicate_ids
            .into_iter()
            .filter(|id| *id != photo.id && seen.insert(id.clone()))
            .collect();

        Self {
            duplicate_count: unique_ids.len(),
            photo,
            signature,
            categories,
            duplicate_ids: unique_ids,
            similar_count,
        }
    }

    pub fn photo(&self) -> &PhotoMetadata {
        &self.photo
    }

    pub fn id(&self) -> &str {
        &self.photo.id
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Category labels in canonical order.
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Check whether the photo carries a category.
    pub fn has_category(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    /// Ids of the other photos this one duplicates.
    pub fn duplicate_ids(&self) -> &[PhotoId] {
        &self.duplicate_ids
    }

    pub fn duplicate_count(&self) -> usize {
        self.duplicate_count
    }

    pub fn similar_count(&self) -> usize {
        self.similar_count
    }

    /// Give back the original metadata record.
    pub fn into_photo(self) -> PhotoMetadata {
        self.photo
    }
}
