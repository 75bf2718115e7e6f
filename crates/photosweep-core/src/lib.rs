//! Core types and configuration for photosweep.
//!
//! This crate provides the fundamental data structures shared by the
//! analysis and scanning crates: photo metadata records, signatures,
//! category labels, categorized results, and the sweep configuration.

mod config;
mod error;
mod photo;

pub use config::{SweepConfig, SweepConfigBuilder, default_screen_resolutions};
pub use error::{SweepError, SweepWarning, WarningKind};
pub use photo::{CategorizedPhoto, Category, PhotoId, PhotoMetadata, Signature};
