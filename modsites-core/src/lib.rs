//! Core models for comparing modification-site sets on transcripts.
//!
//! This crate holds the records every other modsites crate passes around:
//!
//! - [`Site`](models::Site): a scored, stranded point annotation on the genome
//! - [`TranscriptModel`](models::TranscriptModel): the exonic 5'UTR / CDS / 3'UTR
//!   layout of one transcript, with coordinate projection onto the transcript
//! - [`SiteSet`](models::SiteSet): a BED6-backed collection of sites
//!
//! All coordinates are 0-based and half-open, as in BED.
//!
//! # Example
//!
//! ```
//! use modsites_core::models::{FeatureKind, Segment, Strand, TranscriptModel};
//!
//! let tx = TranscriptModel::new(
//!     "tx1",
//!     "chr1",
//!     Strand::Plus,
//!     vec![
//!         Segment::new(FeatureKind::FivePrimeUtr, 100, 120),
//!         Segment::new(FeatureKind::Cds, 120, 180),
//!         Segment::new(FeatureKind::ThreePrimeUtr, 180, 200),
//!     ],
//! )
//! .unwrap();
//!
//! let hit = tx.locate(150).unwrap();
//! assert_eq!(hit.kind, FeatureKind::Cds);
//! assert_eq!(hit.relative_position, 0.5);
//! ```

pub mod errors;
pub mod models;
pub mod utils;

pub use errors::ModelError;
