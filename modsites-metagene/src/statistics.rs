//! Statistical tests comparing two site sets.
//!
//! - [`feature_distribution_test`]: chi-square test on the 5'UTR / CDS / 3'UTR split
//! - [`positional_distribution_test`]: two-sample Kolmogorov–Smirnov test on relative positions
//! - [`enrichment_test`]: hypergeometric test of co-occurrence counts, with odds ratio
//!
//! Every test returns a [`TestResult`], or [`ModSitesError::InsufficientData`]
//! when the data cannot support it.

use std::f64::consts::PI;

use modsites_core::models::FeatureKind;
use serde::Serialize;
use statrs::distribution::{ChiSquared, ContinuousCDF, DiscreteCDF, Hypergeometric};

use crate::errors::ModSitesError;
use crate::metagene::{FeatureSummary, median};

pub const FEATURE_DISTRIBUTION_TEST: &str = "feature_distribution_chi_square";
pub const POSITIONAL_DISTRIBUTION_TEST: &str = "positional_distribution_ks";
pub const ENRICHMENT_TEST: &str = "cooccurrence_enrichment_hypergeometric";

/// Smallest expected cell count accepted by the chi-square approximation.
const MIN_EXPECTED_COUNT: f64 = 5.0;

/// z for a two-sided 95% interval.
const Z_95: f64 = 1.959963984540054;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EffectSize {
    CramersV {
        value: f64,
    },
    /// Differences of A minus B.
    PositionalShift {
        mean_difference: f64,
        median_difference: f64,
    },
    OddsRatio {
        value: f64,
        ci_low: f64,
        ci_high: f64,
        expected_overlap: f64,
        fold_enrichment: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResult {
    pub test: String,
    pub statistic: f64,
    pub p_value: f64,
    pub degrees_of_freedom: Option<u32>,
    pub n_a: u64,
    pub n_b: u64,
    pub effect_size: EffectSize,
}

///
/// Chi-square test of independence on the 3×2 table of assigned feature counts.
///
/// Degrees of freedom are 2. Effect size is Cramér's V.
///
/// # Errors
/// `InsufficientData` when either set has no assigned sites or an expected
/// cell count falls below 5.
///
pub fn feature_distribution_test(
    a: &FeatureSummary,
    b: &FeatureSummary,
) -> Result<TestResult, ModSitesError> {
    let n_a = a.total_assigned as f64;
    let n_b = b.total_assigned as f64;
    if a.total_assigned == 0 || b.total_assigned == 0 {
        return Err(ModSitesError::insufficient(
            FEATURE_DISTRIBUTION_TEST,
            "both sets need at least one assigned site",
        ));
    }
    let n = n_a + n_b;

    let mut chi2 = 0.0;
    for kind in FeatureKind::ASSIGNED {
        let obs_a = a.count(kind) as f64;
        let obs_b = b.count(kind) as f64;
        let row = obs_a + obs_b;

        for (observed, column) in [(obs_a, n_a), (obs_b, n_b)] {
            let expected = row * column / n;
            if expected < MIN_EXPECTED_COUNT {
                return Err(ModSitesError::insufficient(
                    FEATURE_DISTRIBUTION_TEST,
                    format!(
                        "expected count {:.2} for {} is below {}",
                        expected, kind, MIN_EXPECTED_COUNT
                    ),
                ));
            }
            chi2 += (observed - expected).powi(2) / expected;
        }
    }

    let dist = ChiSquared::new(2.0).map_err(|e| ModSitesError::Numeric(e.to_string()))?;
    let p_value = dist.sf(chi2).clamp(0.0, 1.0);

    // min(rows - 1, cols - 1) is 1 for a 3x2 table
    let cramers_v = (chi2 / n).sqrt();

    Ok(TestResult {
        test: FEATURE_DISTRIBUTION_TEST.to_string(),
        statistic: chi2,
        p_value,
        degrees_of_freedom: Some(2),
        n_a: a.total_assigned as u64,
        n_b: b.total_assigned as u64,
        effect_size: EffectSize::CramersV { value: cramers_v },
    })
}

/// Two-sample Kolmogorov–Smirnov statistic `D = max |F_a - F_b|`.
///
/// Both samples must be sorted ascending. Equal values are stepped over together
/// so ties never open a spurious gap.
pub fn ks_statistic(a: &[f64], b: &[f64]) -> f64 {
    let (na, nb) = (a.len() as f64, b.len() as f64);
    let (mut i, mut j) = (0, 0);
    let mut d: f64 = 0.0;

    while i < a.len() && j < b.len() {
        let x = a[i].min(b[j]);
        while i < a.len() && a[i] <= x {
            i += 1;
        }
        while j < b.len() && b[j] <= x {
            j += 1;
        }
        d = d.max((i as f64 / na - j as f64 / nb).abs());
    }
    d
}

///
/// Survival function of the Kolmogorov distribution, `Q(λ) = P(K > λ)`.
///
/// Uses the alternating series `2 Σ (-1)^(j-1) exp(-2 j² λ²)` for larger λ and the
/// Jacobi-transformed series for small λ, where the first one converges slowly.
///
pub fn kolmogorov_sf(lambda: f64) -> f64 {
    if lambda <= 0.0 {
        return 1.0;
    }

    if lambda < 1.18 {
        let scale = -PI * PI / (8.0 * lambda * lambda);
        let mut cdf = 0.0;
        for j in 1..=20 {
            let k = (2 * j - 1) as f64;
            let term = (scale * k * k).exp();
            cdf += term;
            if term < 1e-16 {
                break;
            }
        }
        cdf *= (2.0 * PI).sqrt() / lambda;
        return (1.0 - cdf).clamp(0.0, 1.0);
    }

    let mut sum = 0.0;
    let mut sign = 1.0;
    for j in 1..=100 {
        let jf = j as f64;
        let term = (-2.0 * jf * jf * lambda * lambda).exp();
        sum += sign * term;
        if term < 1e-16 {
            break;
        }
        sign = -sign;
    }
    (2.0 * sum).clamp(0.0, 1.0)
}

///
/// Two-sample Kolmogorov–Smirnov test on relative positions.
///
/// The p-value uses the Kolmogorov limiting distribution with Stephens'
/// small-sample correction. Effect size is the difference in mean and median
/// position (A minus B).
///
/// # Errors
/// `InsufficientData` when either sample has fewer than two positions;
/// `MalformedInput` when a position is not finite.
///
pub fn positional_distribution_test(a: &[f64], b: &[f64]) -> Result<TestResult, ModSitesError> {
    if a.len() < 2 || b.len() < 2 {
        return Err(ModSitesError::insufficient(
            POSITIONAL_DISTRIBUTION_TEST,
            format!(
                "each sample needs at least 2 positions, got {} and {}",
                a.len(),
                b.len()
            ),
        ));
    }
    if let Some(bad) = a.iter().chain(b.iter()).find(|p| !p.is_finite()) {
        return Err(ModSitesError::malformed(format!(
            "relative position {} is not finite",
            bad
        )));
    }

    let mut sorted_a = a.to_vec();
    let mut sorted_b = b.to_vec();
    sorted_a.sort_by(f64::total_cmp);
    sorted_b.sort_by(f64::total_cmp);

    let d = ks_statistic(&sorted_a, &sorted_b);

    let (na, nb) = (a.len() as f64, b.len() as f64);
    let ne = na * nb / (na + nb);
    let lambda = (ne.sqrt() + 0.12 + 0.11 / ne.sqrt()) * d;
    let p_value = kolmogorov_sf(lambda);

    let mean = |xs: &[f64]| xs.iter().sum::<f64>() / xs.len() as f64;
    let mean_difference = mean(a) - mean(b);
    let median_difference = median(&sorted_a).unwrap_or(0.0) - median(&sorted_b).unwrap_or(0.0);

    Ok(TestResult {
        test: POSITIONAL_DISTRIBUTION_TEST.to_string(),
        statistic: d,
        p_value,
        degrees_of_freedom: None,
        n_a: a.len() as u64,
        n_b: b.len() as u64,
        effect_size: EffectSize::PositionalShift {
            mean_difference,
            median_difference,
        },
    })
}

///
/// Hypergeometric test for excess co-occurrence.
///
/// Reports `P(X >= overlap)` for `X` the overlap of `n_a` draws from a
/// population of `universe` containing `n_b` successes. The odds ratio comes
/// from the 2×2 table `[[k, n_a - k], [n_b - k, U - n_a - n_b + k]]`; a zero cell
/// adds 0.5 to every cell.
///
/// # Arguments
/// - n_a: size of set A
/// - n_b: size of set B
/// - universe: number of positions either set could occupy
/// - overlap: observed co-occurring A sites
///
pub fn enrichment_test(
    n_a: u64,
    n_b: u64,
    universe: u64,
    overlap: u64,
) -> Result<TestResult, ModSitesError> {
    if universe == 0 || n_a == 0 || n_b == 0 {
        return Err(ModSitesError::insufficient(
            ENRICHMENT_TEST,
            format!(
                "universe and both set sizes must be non-zero (universe={}, n_a={}, n_b={})",
                universe, n_a, n_b
            ),
        ));
    }
    if n_a > universe || n_b > universe {
        return Err(ModSitesError::InvalidArgument(format!(
            "set sizes {} and {} cannot exceed the universe {}",
            n_a, n_b, universe
        )));
    }
    if overlap > n_a.min(n_b) {
        return Err(ModSitesError::InvalidArgument(format!(
            "overlap {} exceeds the smaller set size {}",
            overlap,
            n_a.min(n_b)
        )));
    }
    if n_a + n_b - overlap > universe {
        return Err(ModSitesError::InvalidArgument(format!(
            "n_a + n_b - overlap = {} exceeds the universe {}",
            n_a + n_b - overlap,
            universe
        )));
    }

    let p_value = match overlap {
        0 => 1.0,
        k => Hypergeometric::new(universe, n_b, n_a)
            .map_err(|e| ModSitesError::Numeric(e.to_string()))?
            .sf(k - 1)
            .clamp(0.0, 1.0),
    };

    let mut cells = [
        overlap as f64,
        (n_a - overlap) as f64,
        (n_b - overlap) as f64,
        (universe - n_a - n_b + overlap) as f64,
    ];
    if cells.iter().any(|&c| c == 0.0) {
        cells.iter_mut().for_each(|c| *c += 0.5);
    }
    let [a, b, c, d] = cells;
    let odds_ratio = (a * d) / (b * c);
    let se = cells.iter().map(|x| 1.0 / x).sum::<f64>().sqrt();
    let ln_or = odds_ratio.ln();

    let expected_overlap = n_a as f64 * n_b as f64 / universe as f64;
    let fold_enrichment = overlap as f64 / expected_overlap;

    Ok(TestResult {
        test: ENRICHMENT_TEST.to_string(),
        statistic: overlap as f64,
        p_value,
        degrees_of_freedom: None,
        n_a,
        n_b,
        effect_size: EffectSize::OddsRatio {
            value: odds_ratio,
            ci_low: (ln_or - Z_95 * se).exp(),
            ci_high: (ln_or + Z_95 * se).exp(),
            expected_overlap,
            fold_enrichment,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn assert_insufficient(result: Result<TestResult, ModSitesError>, expected_test: &str) {
        match result {
            Err(ModSitesError::InsufficientData { test, .. }) => assert_eq!(test, expected_test),
            other => panic!("expected InsufficientData, got {:?}", other),
        }
    }

    #[rstest]
    fn test_chi_square_identical_distributions() {
        let a = FeatureSummary::from_counts(20, 60, 20, 3);
        let b = FeatureSummary::from_counts(20, 60, 20, 0);
        let result = feature_distribution_test(&a, &b).unwrap();

        assert_eq!(result.statistic, 0.0);
        assert!((result.p_value - 1.0).abs() < 1e-12);
        assert_eq!(result.degrees_of_freedom, Some(2));
        assert_eq!((result.n_a, result.n_b), (100, 100));
    }

    #[rstest]
    fn test_chi_square_known_value() {
        // table [[10, 30], [50, 40], [40, 30]]
        let a = FeatureSummary::from_counts(10, 50, 40, 0);
        let b = FeatureSummary::from_counts(30, 40, 30, 0);
        let result = feature_distribution_test(&a, &b).unwrap();

        // expected 20/45/35 in both columns
        let chi2 = 2.0 * (100.0 / 20.0 + 25.0 / 45.0 + 25.0 / 35.0);
        assert!((result.statistic - chi2).abs() < 1e-9);
        // df = 2 survival function is exp(-x / 2)
        assert!((result.p_value - (-chi2 / 2.0).exp()).abs() < 1e-9);

        match result.effect_size {
            EffectSize::CramersV { value } => assert!((value - (chi2 / 200.0).sqrt()).abs() < 1e-12),
            other => panic!("unexpected effect size {:?}", other),
        }
    }

    #[rstest]
    #[case(FeatureSummary::from_counts(0, 0, 0, 10), FeatureSummary::from_counts(20, 60, 20, 0))]
    #[case(FeatureSummary::from_counts(1, 60, 20, 0), FeatureSummary::from_counts(1, 60, 20, 0))]
    fn test_chi_square_insufficient(#[case] a: FeatureSummary, #[case] b: FeatureSummary) {
        assert_insufficient(feature_distribution_test(&a, &b), FEATURE_DISTRIBUTION_TEST);
    }

    #[rstest]
    #[case(vec![0.1, 0.2, 0.3], vec![0.1, 0.2, 0.3], 0.0)]
    #[case(vec![0.1, 0.2], vec![0.8, 0.9], 1.0)]
    #[case(vec![0.1, 0.5, 0.5, 0.9], vec![0.5, 0.5], 0.25)]
    #[case(vec![0.1, 0.2, 0.3, 0.4], vec![0.25, 0.35], 0.5)]
    fn test_ks_statistic(#[case] a: Vec<f64>, #[case] b: Vec<f64>, #[case] expected: f64) {
        assert!((ks_statistic(&a, &b) - expected).abs() < 1e-12);
    }

    #[rstest]
    #[case(0.0, 1.0)]
    #[case(0.5, 0.9639452436648751)]
    #[case(1.0, 0.26999967167735456)]
    #[case(1.36, 0.04949)]
    #[case(2.0, 0.0006709252557796953)]
    fn test_kolmogorov_sf(#[case] lambda: f64, #[case] expected: f64) {
        assert!((kolmogorov_sf(lambda) - expected).abs() < 1e-4);
    }

    #[rstest]
    fn test_kolmogorov_sf_branches_agree() {
        let below = kolmogorov_sf(1.18 - 1e-9);
        let above = kolmogorov_sf(1.18);
        assert!((below - above).abs() < 1e-8);
    }

    #[rstest]
    fn test_ks_separated_samples() {
        // A in the first tenth of the transcript, B in the last tenth
        let a: Vec<f64> = (0..30).map(|i| i as f64 / 300.0).collect();
        let b: Vec<f64> = (0..30).map(|i| 0.9 + i as f64 / 300.0).collect();
        let result = positional_distribution_test(&a, &b).unwrap();

        assert!((result.statistic - 1.0).abs() < 1e-12);
        assert!(result.p_value < 0.001);
        match result.effect_size {
            EffectSize::PositionalShift {
                mean_difference,
                median_difference,
            } => {
                assert!((mean_difference + 0.9).abs() < 1e-9);
                assert!((median_difference + 0.9).abs() < 1e-9);
            }
            other => panic!("unexpected effect size {:?}", other),
        }
    }

    #[rstest]
    fn test_ks_same_sample_is_not_significant() {
        let a: Vec<f64> = (0..50).map(|i| i as f64 / 50.0).collect();
        let result = positional_distribution_test(&a, &a).unwrap();
        assert_eq!(result.statistic, 0.0);
        assert_eq!(result.p_value, 1.0);
    }

    #[rstest]
    fn test_ks_needs_two_positions() {
        assert_insufficient(
            positional_distribution_test(&[0.5], &[0.1, 0.2]),
            POSITIONAL_DISTRIBUTION_TEST,
        );
        assert_insufficient(positional_distribution_test(&[], &[]), POSITIONAL_DISTRIBUTION_TEST);
    }

    #[rstest]
    fn test_enrichment_known_values() {
        // U = 10, 4 successes, 3 draws: P(X >= 2) = (C(4,2)C(6,1) + C(4,3)) / C(10,3) = 40 / 120
        let result = enrichment_test(3, 4, 10, 2).unwrap();
        assert!((result.p_value - 1.0 / 3.0).abs() < 1e-9);

        match result.effect_size {
            EffectSize::OddsRatio {
                value,
                ci_low,
                ci_high,
                expected_overlap,
                fold_enrichment,
            } => {
                // [[2, 1], [2, 5]]
                assert!((value - 5.0).abs() < 1e-12);
                assert!(ci_low < value && value < ci_high);
                assert!((expected_overlap - 1.2).abs() < 1e-12);
                assert!((fold_enrichment - 2.0 / 1.2).abs() < 1e-12);
            }
            other => panic!("unexpected effect size {:?}", other),
        }
    }

    #[rstest]
    fn test_enrichment_zero_cell_correction() {
        // [[0, 5], [5, 90]] -> every cell + 0.5
        let result = enrichment_test(5, 5, 100, 0).unwrap();
        assert_eq!(result.p_value, 1.0);
        match result.effect_size {
            EffectSize::OddsRatio { value, .. } => {
                assert!((value - (0.5 * 90.5) / (5.5 * 5.5)).abs() < 1e-12)
            }
            other => panic!("unexpected effect size {:?}", other),
        }
    }

    #[rstest]
    #[case(0, 5, 100)]
    #[case(5, 0, 100)]
    #[case(5, 5, 0)]
    fn test_enrichment_insufficient(#[case] n_a: u64, #[case] n_b: u64, #[case] universe: u64) {
        assert_insufficient(enrichment_test(n_a, n_b, universe, 0), ENRICHMENT_TEST);
    }

    #[rstest]
    #[case(5, 5, 100, 6)]
    #[case(200, 5, 100, 1)]
    #[case(60, 60, 100, 10)]
    fn test_enrichment_inconsistent_counts(
        #[case] n_a: u64,
        #[case] n_b: u64,
        #[case] universe: u64,
        #[case] overlap: u64,
    ) {
        assert!(matches!(
            enrichment_test(n_a, n_b, universe, overlap),
            Err(ModSitesError::InvalidArgument(_))
        ));
    }
}
