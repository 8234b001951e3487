//! Interval overlap queries for transcript lookup.
//!
//! A modification-site run asks one question thousands of times: which
//! transcripts cover this coordinate? This crate answers it with an
//! Augmented Interval List per chromosome.
//!
//! ```rust
//! use modsites_overlaprs::{AIList, Interval, Overlapper};
//!
//! let transcripts = vec![
//!     Interval { start: 100u32, end: 200, val: "tx1" },
//!     Interval { start: 150, end: 300, val: "tx2" },
//!     Interval { start: 400, end: 500, val: "tx3" },
//! ];
//!
//! let index = AIList::build(transcripts);
//! let mut hits: Vec<&str> = index.find_iter(160, 161).map(|iv| iv.val).collect();
//! hits.sort();
//! assert_eq!(hits, vec!["tx1", "tx2"]);
//! ```

/// Augmented Interval List implementation.
///
/// See [`AIList`] for details.
pub mod ailist;

/// The `[start, end)` interval type shared by every index.
pub mod interval;

/// Per-chromosome indexing.
///
/// See [`MultiChromOverlapper`](multi_chrom_overlapper::MultiChromOverlapper).
pub mod multi_chrom_overlapper;

/// Core traits for overlap operations.
///
/// See [`Overlapper`] for the main trait.
pub mod traits;

// re-exports
pub use self::ailist::AIList;
pub use self::interval::Interval;
pub use self::multi_chrom_overlapper::MultiChromOverlapper;
pub use self::traits::Overlapper;
