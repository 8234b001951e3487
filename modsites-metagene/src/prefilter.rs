//! Site pre-filtering before annotation.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::index::sample;

use modsites_core::models::Site;

///
/// Drop low-confidence sites and cap the set size.
///
/// Sites scoring below `min_score` are removed first. If more than `max_sites`
/// remain, a uniform random subset of that size is kept, chosen with a `StdRng`
/// seeded from `seed`. Survivors stay in their input order, and the same seed
/// always keeps the same sites.
///
pub fn prefilter(
    sites: Vec<Site>,
    min_score: Option<f64>,
    max_sites: Option<usize>,
    seed: u64,
) -> Vec<Site> {
    let kept: Vec<Site> = match min_score {
        Some(min) => sites.into_iter().filter(|s| s.score() >= min).collect(),
        None => sites,
    };

    match max_sites {
        Some(cap) if kept.len() > cap => {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut chosen = sample(&mut rng, kept.len(), cap).into_vec();
            chosen.sort_unstable();

            let mut chosen = chosen.into_iter().peekable();
            kept.into_iter()
                .enumerate()
                .filter(|(i, _)| chosen.next_if_eq(i).is_some())
                .map(|(_, site)| site)
                .collect()
        }
        _ => kept,
    }
}
