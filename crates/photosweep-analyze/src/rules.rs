//! Standalone per-photo category rules.
//!
//! These rules look at one photo at a time and are independent of each
//! other, so a photo may match any combination of them.

use photosweep_core::{Category, PhotoMetadata, SweepConfig};

/// Screenshot, low-quality and age rules driven by a sweep config.
#[derive(Debug, Clone, Copy)]
pub struct CategoryRules<'a> {
    config: &'a SweepConfig,
}

impl<'a> CategoryRules<'a> {
    pub fn new(config: &'a SweepConfig) -> Self {
        Self { config }
    }

    /// Square-ish, or within tolerance of a known screen resolution in
    /// either orientation.
    pub fn is_screenshot(&self, photo: &PhotoMetadata) -> bool {
        if photo.width.abs_diff(photo.height) < self.config.screenshot_square_tolerance {
            return true;
        }

        let tolerance = self.config.screenshot_resolution_tolerance;
        let near = |a: u32, b: u32| a.abs_diff(b) <= tolerance;
        self.config.screen_resolutions.iter().any(|&(width, height)| {
            (near(photo.width, width) && near(photo.height, height))
                || (near(photo.width, height) && near(photo.height, width))
        })
    }

    /// Too small overall, or a large image stored with too few bytes per
    /// pixel.
    pub fn is_low_quality(&self, photo: &PhotoMetadata) -> bool {
        if photo.size < self.config.low_quality_min_size {
            return true;
        }

        let pixels = photo.pixel_count();
        pixels > self.config.low_quality_min_pixels
            && (photo.size as f64 / pixels as f64) < self.config.low_quality_min_bytes_per_pixel
    }

    /// Taken longer ago than the retention window.
    pub fn is_old_unused(&self, photo: &PhotoMetadata) -> bool {
        self.config.age_of(photo.creation_time) > self.config.old_unused_after
    }

    /// All standalone categories the photo matches, in canonical order.
    pub fn categories(&self, photo: &PhotoMetadata) -> Vec<Category> {
        let checks = [
            (Category::Screenshot, self.is_screenshot(photo)),
            (Category::LowQuality, self.is_low_quality(photo)),
            (Category::OldUnused, self.is_old_unused(photo)),
        ];
        checks
            .into_iter()
            .filter_map(|(category, matched)| matched.then_some(category))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    fn now(config: &SweepConfig) -> i64 {
        config.reference_time.timestamp_millis()
    }

    #[test]
    fn test_phone_screenshot() {
        let config = SweepConfig::default();
        let rules = CategoryRules::new(&config);
        let photo = PhotoMetadata::new("s", "Screenshot.png")
            .with_dimensions(1080, 1920)
            .with_size(500_000)
            .with_creation_time(now(&config));

        assert!(rules.is_screenshot(&photo));
        assert!(!rules.is_low_quality(&photo));
        assert_eq!(rules.categories(&photo), vec![Category::Screenshot]);
    }

    #[test]
    fn test_screenshot_tolerance_and_orientation() {
        let config = SweepConfig::default();
        let rules = CategoryRules::new(&config);

        let near = PhotoMetadata::new("a", "a.png").with_dimensions(1130, 1870);
        assert!(rules.is_screenshot(&near));

        let landscape = PhotoMetadata::new("b", "b.png").with_dimensions(2532, 1170);
        assert!(rules.is_screenshot(&landscape));

        let camera = PhotoMetadata::new("c", "c.jpg").with_dimensions(4032, 3024);
        assert!(!rules.is_screenshot(&camera));

        let square = PhotoMetadata::new("d", "d.jpg").with_dimensions(3000, 2991);
        assert!(rules.is_screenshot(&square));
    }

    #[test]
    fn test_low_quality() {
        let config = SweepConfig::default();
        let rules = CategoryRules::new(&config);

        let tiny = PhotoMetadata::new("a", "a.jpg")
            .with_dimensions(640, 480)
            .with_size(49_999);
        assert!(rules.is_low_quality(&tiny));

        // 4 MP at 300 KB is 0.075 bytes per pixel
        let starved = PhotoMetadata::new("b", "b.jpg")
            .with_dimensions(2000, 2000)
            .with_size(300_000);
        assert!(rules.is_low_quality(&starved));

        let fine = PhotoMetadata::new("c", "c.jpg")
            .with_dimensions(4032, 3024)
            .with_size(3_000_000);
        assert!(!rules.is_low_quality(&fine));

        // Small images skip the bytes-per-pixel check
        let small = PhotoMetadata::new("d", "d.jpg")
            .with_dimensions(1000, 1000)
            .with_size(60_000);
        assert!(!rules.is_low_quality(&small));
    }

    #[test]
    fn test_old_unused() {
        let config = SweepConfig::default();
        let rules = CategoryRules::new(&config);

        let old = PhotoMetadata::new("a", "a.jpg").with_creation_time(now(&config) - 400 * DAY_MS);
        assert!(rules.is_old_unused(&old));

        let recent = PhotoMetadata::new("b", "b.jpg").with_creation_time(now(&config) - 30 * DAY_MS);
        assert!(!rules.is_old_unused(&recent));

        let boundary = PhotoMetadata::new("c", "c.jpg").with_creation_time(now(&config) - 365 * DAY_MS);
        assert!(!rules.is_old_unused(&boundary));
    }
}
