use num_traits::{PrimInt, Unsigned};

/// Represent a range from [start, end)
/// Inclusive start, exclusive of end
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    pub start: I,
    pub end: I,
    pub val: T,
}

impl<I, T> Interval<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Check if the interval overlaps `[start, end)`
    #[inline]
    pub fn overlap(&self, start: I, end: I) -> bool {
        self.start < end && self.end > start
    }

    /// Check if a single coordinate falls inside the interval
    #[inline]
    pub fn contains(&self, pos: I) -> bool {
        self.start <= pos && pos < self.end
    }
}
