//! # Positional statistics for RNA modification sites
//!
//! `modsites-metagene` compares two sets of modification sites (pseudouridine
//! and m6A, say) by where they fall on transcripts:
//!
//! - [`annotate`](annotate::annotate) assigns each site a feature (5'UTR, CDS, 3'UTR)
//!   and a relative position along the exonic path of its transcript
//! - [`profile`](metagene::profile) bins those positions into a smoothed metagene density
//! - [`detect_pairs`](cooccurrence::detect_pairs) pairs sites of the two sets that lie
//!   within a distance window
//! - the [`statistics`] module tests whether feature split, positional distribution
//!   or co-occurrence differ from chance
//!
//! [`compare`](report::compare) runs the whole pipeline.
//!
//! ## Example
//!
//! ```rust
//! use modsites_core::models::{FeatureKind, Segment, Site, Strand, TranscriptModel};
//! use modsites_metagene::{AnnotateOptions, ProfileOptions, TranscriptIndex, annotate, profile};
//!
//! let tx = TranscriptModel::new(
//!     "TX1",
//!     "chr1",
//!     Strand::Plus,
//!     vec![
//!         Segment::new(FeatureKind::FivePrimeUtr, 100, 150),
//!         Segment::new(FeatureKind::Cds, 150, 250),
//!         Segment::new(FeatureKind::ThreePrimeUtr, 250, 300),
//!     ],
//! )
//! .unwrap();
//! let index = TranscriptIndex::new(vec![tx]);
//!
//! let sites = vec![
//!     Site::new("s1", "chr1", 120, 121, Strand::Plus, 1.0).unwrap(),
//!     Site::new("s2", "chr1", 200, 201, Strand::Plus, 1.0).unwrap(),
//! ];
//! let annotated = annotate(&sites, &index, &AnnotateOptions::default());
//! assert_eq!(annotated[1].feature(), FeatureKind::Cds);
//! assert_eq!(annotated[1].relative_position(), Some(0.5));
//!
//! let profile = profile(&annotated, &ProfileOptions::default()).unwrap();
//! assert_eq!(profile.n_binned, 2);
//! ```
pub mod annotate;
pub mod config;
pub mod cooccurrence;
pub mod errors;
pub mod gtf;
pub mod metagene;
pub mod prefilter;
pub mod report;
pub mod statistics;

// re-exports
pub use annotate::{AnnotateOptions, AnnotatedSite, TranscriptIndex, annotate};
pub use config::RunConfig;
pub use cooccurrence::{
    CoOccurrencePair, FeatureCombination, OverlapSummary, PairableSite, detect_pairs,
    summarize_overlap,
};
pub use errors::ModSitesError;
pub use gtf::{GtfOptions, TranscriptSet};
pub use metagene::{
    FeatureSummary, MetageneProfile, PositionalSummary, ProfileOptions, Smoothing, profile,
};
pub use prefilter::prefilter;
pub use report::{ComparisonReport, SitePopulation, TestOutcome, compare};
pub use statistics::{
    EffectSize, TestResult, enrichment_test, feature_distribution_test,
    positional_distribution_test,
};

#[cfg(test)]
mod tests {
    use super::*;

    use modsites_core::models::{FeatureKind, Segment, Site, Strand, TranscriptModel};
    use pretty_assertions::assert_eq;
    use rstest::*;

    fn site(id: String, chr: &str, pos: u32, strand: Strand) -> Site {
        Site::new(id, chr, pos, pos + 1, strand, 1.0).unwrap()
    }

    /// Three 300 nt transcripts, each 5UTR 100 | CDS 100 | 3UTR 100.
    #[fixture]
    fn three_transcripts() -> TranscriptIndex {
        let plus = |id: &str, chr: &str, start: u32| {
            TranscriptModel::new(
                id,
                chr,
                Strand::Plus,
                vec![
                    Segment::new(FeatureKind::FivePrimeUtr, start, start + 100),
                    Segment::new(FeatureKind::Cds, start + 100, start + 200),
                    Segment::new(FeatureKind::ThreePrimeUtr, start + 200, start + 300),
                ],
            )
            .unwrap()
        };
        let minus = TranscriptModel::new(
            "TXC",
            "chr2",
            Strand::Minus,
            vec![
                Segment::new(FeatureKind::FivePrimeUtr, 5200, 5300),
                Segment::new(FeatureKind::Cds, 5100, 5200),
                Segment::new(FeatureKind::ThreePrimeUtr, 5000, 5100),
            ],
        )
        .unwrap();
        TranscriptIndex::new(vec![plus("TXA", "chr1", 1000), plus("TXB", "chr1", 3000), minus])
    }

    #[rstest]
    fn test_feature_split_is_recovered(three_transcripts: TranscriptIndex) {
        let placements = [
            ("chr1", 1010, Strand::Plus), // TXA 5UTR
            ("chr2", 5250, Strand::Minus), // TXC 5UTR
            ("chr1", 1100, Strand::Plus), // TXA first CDS nucleotide
            ("chr1", 1150, Strand::Plus),
            ("chr1", 3120, Strand::Plus),
            ("chr1", 3199, Strand::Plus), // TXB last CDS nucleotide
            ("chr2", 5150, Strand::Minus),
            ("chr2", 5100, Strand::Minus),
            ("chr1", 3299, Strand::Plus), // TXB last nucleotide
            ("chr2", 5000, Strand::Minus), // TXC last nucleotide
        ];
        let sites: Vec<Site> = placements
            .iter()
            .enumerate()
            .map(|(i, (chr, pos, strand))| site(format!("s{}", i), chr, *pos, *strand))
            .collect();

        let annotated = annotate(&sites, &three_transcripts, &AnnotateOptions::default());
        let profile = profile(&annotated, &ProfileOptions::default()).unwrap();

        let features = &profile.features;
        assert_eq!(features.five_prime_utr, 2);
        assert_eq!(features.cds, 6);
        assert_eq!(features.three_prime_utr, 2);
        assert_eq!(features.unassigned, 0);
        assert_eq!(features.percentage(FeatureKind::Cds), Some(60.0));
        assert!((profile.density.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[rstest]
    fn test_assignment_is_permutation_invariant(three_transcripts: TranscriptIndex) {
        let sites: Vec<Site> = (0..60u32)
            .map(|i| site(format!("s{}", i), "chr1", 950 + i * 41, Strand::Plus))
            .collect();
        let forward = annotate(&sites, &three_transcripts, &AnnotateOptions::default());

        let mut shuffled = sites.clone();
        shuffled.rotate_left(17);
        shuffled.reverse();
        let mut transcripts = three_transcripts.transcripts().to_vec();
        transcripts.rotate_left(1);
        let reindexed = TranscriptIndex::new(transcripts);
        let backward = annotate(&shuffled, &reindexed, &AnnotateOptions::default());

        for annotated in backward {
            let original = forward
                .iter()
                .find(|a| a.site().id() == annotated.site().id())
                .unwrap();
            assert_eq!(&annotated, original);
        }
    }

    #[rstest]
    fn test_separated_positional_distributions() {
        // set A in bins 0-10, set B in bins 90-99
        let a: Vec<f64> = (0..40).map(|i| i as f64 * 0.1 / 40.0).collect();
        let b: Vec<f64> = (0..40).map(|i| 0.9 + i as f64 * 0.099 / 40.0).collect();
        let result = positional_distribution_test(&a, &b).unwrap();

        assert!((result.statistic - 1.0).abs() < 1e-12);
        assert!(result.p_value < 0.001);
    }

    #[rstest]
    fn test_planted_pairs_are_found_and_enriched() {
        let mut sites_a = Vec::new();
        let mut sites_b = Vec::new();
        for j in 0..5u32 {
            let pos = 10_000 * (j + 1);
            sites_a.push(site(format!("a_planted{}", j), "chr1", pos, Strand::Plus));
            sites_b.push(site(format!("b_planted{}", j), "chr1", pos + 10 * (j + 1), Strand::Plus));
        }
        for i in 0..995u32 {
            let pos = 1_000_000 + i * 1000;
            sites_a.push(site(format!("a{}", i), "chr1", pos, Strand::Plus));
            sites_b.push(site(format!("b{}", i), "chr1", pos + 500, Strand::Plus));
        }

        let pairs = detect_pairs(&sites_a, &sites_b, 50);
        assert_eq!(pairs.len(), 5);
        assert!(pairs.iter().all(|p| p.distance.unsigned_abs() <= 50));
        assert!(pairs.iter().all(|p| p.site_a.starts_with("a_planted")));

        let result = enrichment_test(1000, 1000, 10_000_000, pairs.len() as u64).unwrap();
        assert!(result.p_value < 1e-4);
        match result.effect_size {
            EffectSize::OddsRatio {
                fold_enrichment, ..
            } => assert!((fold_enrichment - 50.0).abs() < 1e-9),
            other => panic!("unexpected effect size {:?}", other),
        }
    }

    #[rstest]
    fn test_empty_input(three_transcripts: TranscriptIndex) {
        let annotated = annotate::<Site>(&[], &three_transcripts, &AnnotateOptions::default());
        let profile = profile(&annotated, &ProfileOptions::default()).unwrap();

        assert!(profile.density.iter().all(|&d| d == 0.0));
        assert!(matches!(
            feature_distribution_test(&profile.features, &profile.features),
            Err(ModSitesError::InsufficientData { .. })
        ));
        assert!(matches!(
            positional_distribution_test(&[], &[]),
            Err(ModSitesError::InsufficientData { .. })
        ));
        assert!(matches!(
            enrichment_test(0, 0, 1000, 0),
            Err(ModSitesError::InsufficientData { .. })
        ));
    }
}
