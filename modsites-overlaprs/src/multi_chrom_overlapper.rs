//! Genome-wide interval indexing.
//!
//! [`MultiChromOverlapper`] keeps one [`AIList`] per chromosome so that a
//! query only ever scans intervals on its own chromosome.
//!
//! ```
//! use modsites_overlaprs::{Interval, MultiChromOverlapper};
//!
//! let index = MultiChromOverlapper::from_intervals(vec![
//!     ("chr1".to_string(), Interval { start: 1000u32, end: 2000, val: 0usize }),
//!     ("chr1".to_string(), Interval { start: 5000, end: 6000, val: 1 }),
//!     ("chr2".to_string(), Interval { start: 1000, end: 3000, val: 2 }),
//! ]);
//!
//! let hits: Vec<usize> = index.find_point("chr2", 1500).map(|iv| iv.val).collect();
//! assert_eq!(hits, vec![2]);
//! assert_eq!(index.find_point("chrX", 1500).count(), 0);
//! ```

use fxhash::FxHashMap as HashMap;
use num_traits::{PrimInt, Saturating, Unsigned};

use crate::{AIList, Interval, Overlapper};

/// A genome-wide index for overlap queries across multiple chromosomes.
#[derive(Debug, Clone)]
pub struct MultiChromOverlapper<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    index_maps: HashMap<String, AIList<I, T>>,
}

impl<I, T> MultiChromOverlapper<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Build the index from `(chromosome, interval)` pairs.
    pub fn from_intervals<It>(intervals: It) -> Self
    where
        It: IntoIterator<Item = (String, Interval<I, T>)>,
    {
        let mut by_chr: HashMap<String, Vec<Interval<I, T>>> = HashMap::default();
        for (chr, interval) in intervals {
            by_chr.entry(chr).or_default().push(interval);
        }

        let index_maps = by_chr
            .into_iter()
            .map(|(chr, ivs)| (chr, AIList::build(ivs)))
            .collect();

        MultiChromOverlapper { index_maps }
    }

    /// Intervals on `chr` overlapping `[start, end)`. Unknown chromosomes yield nothing.
    pub fn find_iter<'a>(
        &'a self,
        chr: &str,
        start: I,
        end: I,
    ) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a> {
        match self.index_maps.get(chr) {
            Some(index) => index.find_iter(start, end),
            None => Box::new(std::iter::empty()),
        }
    }

    pub fn find(&self, chr: &str, start: I, end: I) -> Vec<Interval<I, T>> {
        self.find_iter(chr, start, end).cloned().collect()
    }

    /// Intervals on `chr` containing `pos`.
    pub fn find_point<'a>(
        &'a self,
        chr: &str,
        pos: I,
    ) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a> {
        self.find_iter(chr, pos, Saturating::saturating_add(pos, I::one()))
    }

    pub fn contains_chr(&self, chr: &str) -> bool {
        self.index_maps.contains_key(chr)
    }

    /// Total number of indexed intervals.
    pub fn len(&self) -> usize {
        self.index_maps.values().map(|index| index.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
