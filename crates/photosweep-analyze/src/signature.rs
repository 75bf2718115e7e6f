//! Metadata signatures.
//!
//! A signature fingerprints the quantized metadata of a photo: dimensions,
//! size rounded to kilobytes, creation time floored to the minute, and the
//! normalized filename. Photos re-exported or copied within the same minute
//! collide onto the same signature. The hash is a 32-bit polynomial rolling
//! hash, so unrelated photos may occasionally collide too.

use photosweep_core::{PhotoMetadata, Signature, SweepConfig, SweepError, SweepWarning};
use tracing::warn;

use crate::filename::normalize_filename;

const BASE36_DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Computes signatures from photo metadata.
#[derive(Debug, Clone, Copy)]
pub struct SignatureGenerator {
    size_bucket_bytes: u64,
    time_bucket_ms: i64,
}

impl SignatureGenerator {
    /// Create a generator with the default 1 KB / 1 minute quanta.
    pub fn new() -> Self {
        Self {
            size_bucket_bytes: 1000,
            time_bucket_ms: 60_000,
        }
    }

    /// Create a generator using the quanta of a sweep config.
    pub fn from_config(config: &SweepConfig) -> Self {
        Self {
            size_bucket_bytes: config.size_bucket_bytes.max(1),
            time_bucket_ms: config.time_bucket_ms.max(1),
        }
    }

    /// Compute the signature of a photo.
    ///
    /// Fails only for records without an id. Creation times before the
    /// epoch are valid and floor into negative buckets.
    pub fn generate(&self, photo: &PhotoMetadata) -> Result<Signature, SweepError> {
        if photo.id.is_empty() {
            return Err(SweepError::invalid_metadata(&*photo.id, "photo id is empty"));
        }

        let canonical = self.canonical_form(photo);
        Ok(Signature::new(to_base36(rolling_hash(&canonical))))
    }

    /// Compute the signature, falling back to the coarse form on failure.
    ///
    /// The warning is returned so callers can surface it; it is also logged.
    pub fn generate_or_fallback(&self, photo: &PhotoMetadata) -> (Signature, Option<SweepWarning>) {
        match self.generate(photo) {
            Ok(signature) => (signature, None),
            Err(err) => {
                warn!(target: "photosweep::signature", id = %photo.id, "{err}");
                let warning = SweepWarning::degraded_signature(photo.id.clone(), &err);
                (Self::fallback(photo), Some(warning))
            }
        }
    }

    /// Coarse `width|height|size` signature used when generation fails.
    pub fn fallback(photo: &PhotoMetadata) -> Signature {
        Signature::new(format!("{}|{}|{}", photo.width, photo.height, photo.size))
    }

    /// The delimited string of quantized fields that gets hashed.
    pub fn canonical_form(&self, photo: &PhotoMetadata) -> String {
        format!(
            "{}|{}|{}|{}|{}",
            photo.width,
            photo.height,
            self.size_bucket(photo.size),
            self.time_bucket(photo.creation_time),
            normalize_filename(photo.file_name()),
        )
    }

    /// Size rounded half-up to the size quantum.
    pub fn size_bucket(&self, size: u64) -> u64 {
        let quotient = size / self.size_bucket_bytes;
        let remainder = size % self.size_bucket_bytes;
        if remainder >= self.size_bucket_bytes - remainder {
            quotient + 1
        } else {
            quotient
        }
    }

    /// Creation time floored to the time quantum.
    pub fn time_bucket(&self, creation_time: i64) -> i64 {
        creation_time.div_euclid(self.time_bucket_ms)
    }
}

impl Default for SignatureGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// 32-bit polynomial rolling hash over UTF-16 code units, made non-negative.
fn rolling_hash(input: &str) -> u32 {
    input
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            hash.wrapping_mul(31).wrapping_add(i32::from(unit))
        })
        .unsigned_abs()
}

fn to_base36(mut value: u32) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while value > 0 {
        digits.push(char::from(BASE36_DIGITS[(value % 36) as usize]));
        value /= 36;
    }
    digits.iter().rev().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(uri: &str) -> PhotoMetadata {
        PhotoMetadata::new("1", uri)
            .with_dimensions(1080, 1920)
            .with_size(500_000)
            .with_creation_time(1_700_000_000_000)
    }

    #[test]
    fn test_rolling_hash() {
        assert_eq!(rolling_hash(""), 0);
        assert_eq!(rolling_hash("a"), 97);
        assert_eq!(rolling_hash("hello"), 99_162_322);
        // Wraps to i32::MIN, whose absolute value only fits unsigned.
        assert_eq!(rolling_hash("polygenelubricants"), 2_147_483_648);
    }

    #[test]
    fn test_base36() {
        assert_eq!(to_base36(0), "0");
        assert_eq!(to_base36(97), "2p");
        assert_eq!(to_base36(99_162_322), "1n1e4y");
        assert_eq!(to_base36(2_147_483_648), "zik0zk");
    }

    #[test]
    fn test_quantization() {
        let generator = SignatureGenerator::new();

        assert_eq!(generator.size_bucket(0), 0);
        assert_eq!(generator.size_bucket(499), 0);
        assert_eq!(generator.size_bucket(500), 1);
        assert_eq!(generator.size_bucket(1499), 1);
        assert_eq!(generator.size_bucket(1500), 2);

        assert_eq!(generator.time_bucket(0), 0);
        assert_eq!(generator.time_bucket(59_999), 0);
        assert_eq!(generator.time_bucket(60_000), 1);
        assert_eq!(generator.time_bucket(-1), -1);
        assert_eq!(generator.time_bucket(-60_000), -1);
        assert_eq!(generator.time_bucket(-60_001), -2);
    }

    #[test]
    fn test_size_bucket_with_huge_quantum() {
        let generator = SignatureGenerator::from_config(&SweepConfig {
            size_bucket_bytes: u64::MAX,
            ..SweepConfig::default()
        });

        assert_eq!(generator.size_bucket(u64::MAX / 2), 0);
        assert_eq!(generator.size_bucket(u64::MAX / 2 + 1), 1);
        assert_eq!(generator.size_bucket(u64::MAX - 1), 1);
    }

    #[test]
    fn test_canonical_form() {
        let generator = SignatureGenerator::new();
        let canonical = generator.canonical_form(&photo("DCIM/IMG_001 (1).jpg"));
        assert_eq!(canonical, "1080|1920|500|28333333|img_001.jpg");
    }

    #[test]
    fn test_generate_is_hash_of_canonical_form() {
        let generator = SignatureGenerator::new();
        let signature = generator.generate(&photo("DCIM/IMG_001.jpg")).unwrap();
        assert_eq!(signature.as_str(), "64wxna");
    }

    #[test]
    fn test_generate_rejects_missing_id() {
        let generator = SignatureGenerator::new();

        let anonymous = PhotoMetadata::new("", "a.jpg");
        assert!(generator.generate(&anonymous).is_err());
    }

    #[test]
    fn test_generate_accepts_pre_epoch_photos() {
        let generator = SignatureGenerator::new();
        let wedding = PhotoMetadata::new("a", "Scans/wedding.jpg")
            .with_dimensions(3000, 2000)
            .with_size(1_500_000)
            .with_creation_time(-157_766_400_000);
        let birthday = PhotoMetadata::new("b", "Scans/birthday.jpg")
            .with_dimensions(3000, 2000)
            .with_size(1_500_000)
            .with_creation_time(-63_158_400_000);

        let (a, warning) = generator.generate_or_fallback(&wedding);
        assert!(warning.is_none());
        let (b, warning) = generator.generate_or_fallback(&birthday);
        assert!(warning.is_none());

        assert_ne!(a, b);
        assert_ne!(a, SignatureGenerator::fallback(&wedding));
        assert_eq!(
            generator.canonical_form(&wedding),
            "3000|2000|1500|-2629440|wedding.jpg"
        );
    }

    #[test]
    fn test_fallback() {
        let generator = SignatureGenerator::new();
        let anonymous = PhotoMetadata::new("", "a.jpg")
            .with_dimensions(1080, 1920)
            .with_size(500_000);

        let (signature, warning) = generator.generate_or_fallback(&anonymous);
        assert_eq!(signature.as_str(), "1080|1920|500000");
        assert!(warning.is_some());

        let (_, warning) = generator.generate_or_fallback(&photo("a.jpg"));
        assert!(warning.is_none());
    }
}
