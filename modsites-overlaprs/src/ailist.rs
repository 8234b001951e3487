use num_traits::{PrimInt, Unsigned};

use crate::{Interval, Overlapper};

/// Number of contained intervals within the look-ahead window that pushes an
/// interval out of the current component.
const MIN_COVERAGE: usize = 10;

/// An Augmented Interval List.
///
/// From the following article: <https://academic.oup.com/bioinformatics/article/35/23/4907/5509521>
///
/// Intervals are sorted by start and decomposed into components. Long intervals
/// that would cover many of their successors are moved to a later component,
/// so each component's running maximum end stays tight and the backwards scan
/// in a query can stop early.
///
/// Transcript annotations are exactly the kind of input this helps with: one
/// long pre-mRNA span frequently covers dozens of short isoforms.
///
/// # Examples
///
/// ```
/// use modsites_overlaprs::{AIList, Interval, Overlapper};
///
/// let index = AIList::build(vec![
///     Interval { start: 1000u32, end: 2000, val: "TX1" },
///     Interval { start: 1500, end: 2500, val: "TX2" },
///     Interval { start: 5000, end: 6000, val: "TX3" },
/// ]);
///
/// assert_eq!(index.find(1800, 2200).len(), 2);
/// assert_eq!(index.find_point(5999).count(), 1);
/// assert_eq!(index.find_point(6000).count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    components: Vec<Component<I, T>>,
}

/// One decomposed, start-sorted run of intervals.
#[derive(Debug, Clone)]
struct Component<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    intervals: Vec<Interval<I, T>>,
    /// Largest end seen at or before each index.
    max_ends: Vec<I>,
}

impl<I, T> Component<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn new(intervals: Vec<Interval<I, T>>) -> Self {
        let mut max_ends = Vec::with_capacity(intervals.len());
        let mut max = I::zero();
        for iv in intervals.iter() {
            max = max.max(iv.end);
            max_ends.push(max);
        }
        Component {
            intervals,
            max_ends,
        }
    }

    fn query(&self, start: I, end: I) -> impl Iterator<Item = &Interval<I, T>> + '_ {
        let upper = self.intervals.partition_point(|iv| iv.start < end);

        // walk backwards from the last interval starting before `end`;
        // once the running max end is at or before `start`, nothing earlier can overlap
        (0..upper)
            .rev()
            .take_while(move |&i| self.max_ends[i] > start)
            .map(move |i| &self.intervals[i])
            .filter(move |iv| iv.end > start)
    }
}

impl<I, T> AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    /// Split start-sorted intervals into the ones that stay in this component
    /// and the ones deferred to the next.
    fn decompose(intervals: Vec<Interval<I, T>>) -> (Vec<Interval<I, T>>, Vec<Interval<I, T>>) {
        let mut kept = Vec::with_capacity(intervals.len());
        let mut deferred = Vec::new();

        for (index, interval) in intervals.iter().enumerate() {
            let covered = intervals
                .iter()
                .skip(index + 1)
                .take(MIN_COVERAGE * 2 - 1)
                .filter(|next| interval.end > next.end)
                .count();

            if covered >= MIN_COVERAGE {
                deferred.push(interval.clone());
            } else {
                kept.push(interval.clone());
            }
        }

        (kept, deferred)
    }

    /// Returns the number of intervals in the AIList.
    pub fn len(&self) -> usize {
        self.components.iter().map(|c| c.intervals.len()).sum()
    }

    /// Returns `true` if the AIList contains no intervals.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<I, T> Overlapper<I, T> for AIList<I, T>
where
    I: PrimInt + Unsigned + Send + Sync,
    T: Eq + Clone + Send + Sync,
{
    fn build(intervals: Vec<Interval<I, T>>) -> Self
    where
        Self: Sized,
    {
        let mut remaining = intervals;
        remaining.sort_by_key(|iv| iv.start);

        let mut components = Vec::new();
        while !remaining.is_empty() {
            // the last interval never covers anything, so `kept` is never empty
            let (kept, deferred) = Self::decompose(remaining);
            components.push(Component::new(kept));
            remaining = deferred;
        }

        AIList { components }
    }

    fn find_iter<'a>(
        &'a self,
        start: I,
        end: I,
    ) -> Box<dyn Iterator<Item = &'a Interval<I, T>> + 'a> {
        Box::new(
            self.components
                .iter()
                .flat_map(move |component| component.query(start, end)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn intervals() -> Vec<Interval<u32, &'static str>> {
        vec![
            Interval {
                start: 1,
                end: 5,
                val: "a",
            },
            Interval {
                start: 3,
                end: 7,
                val: "b",
            },
            Interval {
                start: 6,
                end: 10,
                val: "c",
            },
            Interval {
                start: 8,
                end: 12,
                val: "d",
            },
        ]
    }

    fn sorted_vals(found: Vec<Interval<u32, &'static str>>) -> Vec<&'static str> {
        let mut vals: Vec<&str> = found.into_iter().map(|iv| iv.val).collect();
        vals.sort();
        vals
    }

    #[rstest]
    #[case(2, 4, vec!["a", "b"])]
    #[case(5, 6, vec!["b"])]
    #[case(7, 8, vec!["c"])]
    #[case(0, 1, vec![])]
    #[case(12, 20, vec![])]
    #[case(0, 100, vec!["a", "b", "c", "d"])]
    fn test_find(
        intervals: Vec<Interval<u32, &'static str>>,
        #[case] start: u32,
        #[case] end: u32,
        #[case] expected: Vec<&'static str>,
    ) {
        let index = AIList::build(intervals);
        assert_eq!(sorted_vals(index.find(start, end)), expected);
    }

    #[rstest]
    fn test_end_is_exclusive(intervals: Vec<Interval<u32, &'static str>>) {
        let index = AIList::build(intervals);
        assert_eq!(index.find_point(4).count(), 2);

        let vals: Vec<&str> = index.find_point(5).map(|iv| iv.val).collect();
        assert_eq!(vals, vec!["b"]);
    }

    #[rstest]
    fn test_len(intervals: Vec<Interval<u32, &'static str>>) {
        let index = AIList::build(intervals);
        assert_eq!(index.len(), 4);
        assert!(!index.is_empty());
    }

    #[rstest]
    fn test_empty() {
        let index: AIList<u32, &str> = AIList::build(vec![]);
        assert!(index.is_empty());
        assert_eq!(index.find(0, 100).len(), 0);
    }

    #[rstest]
    fn test_long_interval_goes_to_later_component() {
        // one span covering 30 short isoforms
        let mut intervals = vec![Interval {
            start: 0u32,
            end: 10_000,
            val: 0usize,
        }];
        for i in 1..=30u32 {
            intervals.push(Interval {
                start: i * 100,
                end: i * 100 + 50,
                val: i as usize,
            });
        }

        let index = AIList::build(intervals);
        assert_eq!(index.components.len(), 2);
        assert_eq!(index.len(), 31);

        let mut hits: Vec<usize> = index.find_point(1520).map(|iv| iv.val).collect();
        hits.sort();
        assert_eq!(hits, vec![0, 15]);

        let hits: Vec<usize> = index.find_point(9000).map(|iv| iv.val).collect();
        assert_eq!(hits, vec![0]);
    }

    #[rstest]
    fn test_matches_brute_force() {
        let intervals: Vec<Interval<u32, u32>> = (0..200u32)
            .map(|i| {
                let start = (i * 37) % 1000;
                let end = start + 1 + (i * 13) % 300;
                Interval { start, end, val: i }
            })
            .collect();
        let index = AIList::build(intervals.clone());

        for q in (0..1300u32).step_by(7) {
            let mut expected: Vec<u32> = intervals
                .iter()
                .filter(|iv| iv.overlap(q, q + 25))
                .map(|iv| iv.val)
                .collect();
            expected.sort();
            let mut found: Vec<u32> = index.find_iter(q, q + 25).map(|iv| iv.val).collect();
            found.sort();
            assert_eq!(found, expected, "query at {q}");
        }
    }

    #[rstest]
    fn test_point_query_at_coordinate_limit() {
        let index = AIList::build(vec![
            Interval {
                start: u32::MAX - 10,
                end: u32::MAX,
                val: "last",
            },
            Interval {
                start: 0,
                end: 10,
                val: "first",
            },
        ]);

        let hits: Vec<&str> = index.find_point(u32::MAX - 1).map(|iv| iv.val).collect();
        assert_eq!(hits, vec!["last"]);
        assert_eq!(index.find_point(u32::MAX).count(), 0);
    }
}
