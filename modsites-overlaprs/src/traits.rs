use num_traits::{PrimInt, Saturating, Unsigned};

use crate::Interval;

pub trait Overlapper<I, T>: Send + Sync
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn build(intervals: Vec<Interval<I, T>>) -> Self
    where
        Self: Sized;

    /// All stored intervals overlapping `[start, end)`.
    fn find(&self, start: I, end: I) -> Vec<Interval<I, T>> {
        self.find_iter(start, end).cloned().collect()
    }

    fn find_iter<'a>(
        &'a self,
        start: I,
        end: I,
    ) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a>;

    /// All stored intervals containing `pos`. Nothing contains `I::max_value()`.
    fn find_point<'a>(&'a self, pos: I) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a> {
        self.find_iter(pos, Saturating::saturating_add(pos, I::one()))
    }
}
