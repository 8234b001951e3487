//! Spatial co-occurrence of two site sets.

use std::collections::BTreeMap;

use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
use modsites_core::models::{FeatureKind, Site, Strand};
use serde::Serialize;

use crate::annotate::AnnotatedSite;
use crate::metagene::median;

/// A site that can be paired, with the transcript feature it was annotated with.
pub trait PairableSite: AsRef<Site> {
    /// Raw sites carry no annotation and report `Unassigned`.
    fn feature(&self) -> FeatureKind {
        FeatureKind::Unassigned
    }
}

impl PairableSite for Site {}

impl PairableSite for AnnotatedSite {
    fn feature(&self) -> FeatureKind {
        AnnotatedSite::feature(self)
    }
}

impl<T: PairableSite + ?Sized> PairableSite for &T {
    fn feature(&self) -> FeatureKind {
        (**self).feature()
    }
}

/// A site from set A paired with its nearest site from set B.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoOccurrencePair {
    pub site_a: String,
    pub site_b: String,
    pub chr: String,
    pub strand: Strand,
    pub center_a: u32,
    pub center_b: u32,
    /// Positive when B lies 3' of A along the strand.
    pub distance: i64,
    pub feature_a: FeatureKind,
    pub feature_b: FeatureKind,
}

/// Number of pairs joining an A site in `feature_a` with a B site in `feature_b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureCombination {
    pub feature_a: FeatureKind,
    pub feature_b: FeatureKind,
    pub count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DistanceSummary {
    pub mean: f64,
    pub median: f64,
    pub min: u64,
    pub max: u64,
}

/// Venn-style counts of a pairing plus the spread of absolute pair distances.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlapSummary {
    pub n_a: usize,
    pub n_b: usize,
    /// A sites with a partner, equal to the pair count.
    pub overlapping_a: usize,
    /// Distinct B sites used by at least one pair.
    pub overlapping_b: usize,
    pub a_only: usize,
    pub b_only: usize,
    pub distance: Option<DistanceSummary>,
    /// Pair counts per feature combination, ordered 5' to 3' by A then B feature.
    pub feature_combinations: Vec<FeatureCombination>,
}

fn signed_distance(strand: Strand, center_a: u32, center_b: u32) -> i64 {
    let d = center_b as i64 - center_a as i64;
    match strand {
        Strand::Minus => -d,
        _ => d,
    }
}

///
/// Pair every A site with its nearest B site on the same chromosome and strand.
///
/// A pair qualifies when the centers are at most `window` bases apart. Among
/// qualifying B sites the closest wins, ties going to the lower B id. B sites
/// may be shared between A sites. Output follows the order of `sites_a`.
/// Each pair records the feature of both its sites.
///
/// # Arguments
/// - sites_a: first site set
/// - sites_b: second site set
/// - window: maximum center distance in bases
///
pub fn detect_pairs<A, B>(sites_a: &[A], sites_b: &[B], window: u32) -> Vec<CoOccurrencePair>
where
    A: PairableSite,
    B: PairableSite,
{
    let mut by_group: HashMap<(&str, Strand), Vec<(u32, &Site, FeatureKind)>> = HashMap::default();
    for b in sites_b {
        let site = b.as_ref();
        by_group
            .entry((site.chr(), site.strand()))
            .or_default()
            .push((site.center(), site, b.feature()));
    }
    for group in by_group.values_mut() {
        group.sort_by(|(ca, a, _), (cb, b, _)| ca.cmp(cb).then_with(|| a.id().cmp(b.id())));
    }

    let mut pairs = Vec::new();
    for site_a in sites_a {
        let a = site_a.as_ref();
        let Some(group) = by_group.get(&(a.chr(), a.strand())) else {
            continue;
        };

        let center = a.center();
        let lo = center.saturating_sub(window);
        let hi = center.saturating_add(window);
        let first = group.partition_point(|(c, _, _)| *c < lo);

        let nearest = group[first..]
            .iter()
            .take_while(|(c, _, _)| *c <= hi)
            .min_by(|(ca, a_site, _), (cb, b_site, _)| {
                ca.abs_diff(center)
                    .cmp(&cb.abs_diff(center))
                    .then_with(|| a_site.id().cmp(b_site.id()))
            });

        if let Some(&(center_b, b, feature_b)) = nearest {
            pairs.push(CoOccurrencePair {
                site_a: a.id().to_string(),
                site_b: b.id().to_string(),
                chr: a.chr().to_string(),
                strand: a.strand(),
                center_a: center,
                center_b,
                distance: signed_distance(a.strand(), center, center_b),
                feature_a: site_a.feature(),
                feature_b,
            });
        }
    }

    pairs
}

/// Summarize a pairing between sets of `n_a` and `n_b` sites.
pub fn summarize_overlap(n_a: usize, n_b: usize, pairs: &[CoOccurrencePair]) -> OverlapSummary {
    let overlapping_a = pairs.len();
    let overlapping_b = pairs
        .iter()
        .map(|p| p.site_b.as_str())
        .collect::<HashSet<_>>()
        .len();

    let distance = (!pairs.is_empty()).then(|| {
        let abs: Vec<u64> = pairs.iter().map(|p| p.distance.unsigned_abs()).collect();
        let as_f64: Vec<f64> = abs.iter().map(|&d| d as f64).collect();
        DistanceSummary {
            mean: as_f64.iter().sum::<f64>() / as_f64.len() as f64,
            median: median(&as_f64).unwrap_or(0.0),
            min: abs.iter().copied().min().unwrap_or(0),
            max: abs.iter().copied().max().unwrap_or(0),
        }
    });

    let mut combinations: BTreeMap<(FeatureKind, FeatureKind), usize> = BTreeMap::new();
    for pair in pairs {
        *combinations
            .entry((pair.feature_a, pair.feature_b))
            .or_default() += 1;
    }
    let feature_combinations = combinations
        .into_iter()
        .map(|((feature_a, feature_b), count)| FeatureCombination {
            feature_a,
            feature_b,
            count,
        })
        .collect();

    OverlapSummary {
        n_a,
        n_b,
        overlapping_a,
        overlapping_b,
        a_only: n_a.saturating_sub(overlapping_a),
        b_only: n_b.saturating_sub(overlapping_b),
        distance,
        feature_combinations,
    }
}
