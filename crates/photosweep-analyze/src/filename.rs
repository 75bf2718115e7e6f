//! Filename normalization for copy/variant matching.

use std::sync::LazyLock;

use regex::Regex;

static COUNTER_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:\s*\(\d+\))+$").expect("counter pattern is valid"));
static COPY_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)-copy$").expect("copy pattern is valid"));
static NUMBERED_SUFFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-\d+$").expect("numbered pattern is valid"));

/// Normalize a file name so that copies and re-exports share one base.
///
/// Strips trailing ` (N)` counters, then a `-copy` suffix, then a single
/// trailing `-<digits>`, all from the stem; the extension is kept. The
/// result is lowercase.
///
/// ```
/// use photosweep_analyze::normalize_filename;
///
/// assert_eq!(normalize_filename("IMG_001 (1).jpg"), "img_001.jpg");
/// assert_eq!(normalize_filename("Sunset-Copy.PNG"), "sunset.png");
/// ```
pub fn normalize_filename(file_name: &str) -> String {
    let (stem, extension) = match file_name.rfind('.') {
        Some(dot) if dot > 0 => file_name.split_at(dot),
        _ => (file_name, ""),
    };

    let stem = COUNTER_SUFFIX.replace(stem, "");
    let stem = COPY_SUFFIX.replace(&stem, "");
    let stem = NUMBERED_SUFFIX.replace(&stem, "");

    format!("{stem}{extension}").to_lowercase()
}
