//! Metagene profiles.
//!
//! Relative transcript positions are binned into `n_bins` equal bins over
//! `[0, 1]`, normalized to a density and smoothed. Alongside the density the
//! profile carries per-feature counts and descriptive statistics of the
//! positions that went into it.

use modsites_core::models::FeatureKind;
use serde::{Deserialize, Serialize};

use crate::annotate::AnnotatedSite;
use crate::errors::ModSitesError;

/// How the normalized bin series is smoothed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Smoothing {
    /// Savitzky–Golay filter, polynomial order 2.
    #[default]
    SavitzkyGolay,
    MovingAverage,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProfileOptions {
    pub n_bins: usize,
    /// Odd number of bins in the smoothing window.
    pub smoothing_window: usize,
    pub smoothing: Smoothing,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        ProfileOptions {
            n_bins: 100,
            smoothing_window: 9,
            smoothing: Smoothing::default(),
        }
    }
}

impl ProfileOptions {
    pub fn validate(&self) -> Result<(), ModSitesError> {
        if self.n_bins == 0 {
            return Err(ModSitesError::InvalidConfig(
                "n_bins must be at least 1".to_string(),
            ));
        }
        if self.smoothing_window == 0 || self.smoothing_window % 2 == 0 {
            return Err(ModSitesError::InvalidConfig(format!(
                "smoothing_window must be a positive odd number, got {}",
                self.smoothing_window
            )));
        }
        Ok(())
    }
}

/// Count and share of one assigned feature kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureShare {
    pub feature: FeatureKind,
    pub count: usize,
    /// Percentage of assigned sites, 0 when nothing was assigned.
    pub percentage: f64,
}

///
/// Site counts per feature kind.
///
/// Percentages are relative to the assigned sites only; unassigned sites are
/// counted but never part of a share.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureSummary {
    pub five_prime_utr: usize,
    pub cds: usize,
    pub three_prime_utr: usize,
    pub unassigned: usize,
    pub total_assigned: usize,
    pub shares: Vec<FeatureShare>,
}

impl FeatureSummary {
    pub fn from_counts(
        five_prime_utr: usize,
        cds: usize,
        three_prime_utr: usize,
        unassigned: usize,
    ) -> Self {
        let total_assigned = five_prime_utr + cds + three_prime_utr;
        let shares = [
            (FeatureKind::FivePrimeUtr, five_prime_utr),
            (FeatureKind::Cds, cds),
            (FeatureKind::ThreePrimeUtr, three_prime_utr),
        ]
        .into_iter()
        .map(|(feature, count)| FeatureShare {
            feature,
            count,
            percentage: if total_assigned == 0 {
                0.0
            } else {
                100.0 * count as f64 / total_assigned as f64
            },
        })
        .collect();

        FeatureSummary {
            five_prime_utr,
            cds,
            three_prime_utr,
            unassigned,
            total_assigned,
            shares,
        }
    }

    pub fn from_sites(sites: &[AnnotatedSite]) -> Self {
        let (mut utr5, mut cds, mut utr3, mut unassigned) = (0, 0, 0, 0);
        for site in sites {
            match site.feature() {
                FeatureKind::FivePrimeUtr => utr5 += 1,
                FeatureKind::Cds => cds += 1,
                FeatureKind::ThreePrimeUtr => utr3 += 1,
                FeatureKind::Unassigned => unassigned += 1,
            }
        }
        FeatureSummary::from_counts(utr5, cds, utr3, unassigned)
    }

    pub fn count(&self, kind: FeatureKind) -> usize {
        match kind {
            FeatureKind::FivePrimeUtr => self.five_prime_utr,
            FeatureKind::Cds => self.cds,
            FeatureKind::ThreePrimeUtr => self.three_prime_utr,
            FeatureKind::Unassigned => self.unassigned,
        }
    }

    /// Percentage of assigned sites in `kind`. `None` for `Unassigned`.
    pub fn percentage(&self, kind: FeatureKind) -> Option<f64> {
        self.shares
            .iter()
            .find(|share| share.feature == kind)
            .map(|share| share.percentage)
    }

    pub fn total(&self) -> usize {
        self.total_assigned + self.unassigned
    }
}

/// Descriptive statistics of relative positions.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PositionalSummary {
    pub n: usize,
    pub mean: Option<f64>,
    /// Sample standard deviation, needs at least two positions.
    pub std_dev: Option<f64>,
    pub median: Option<f64>,
}

impl PositionalSummary {
    pub fn from_positions(positions: &[f64]) -> Self {
        let n = positions.len();
        if n == 0 {
            return PositionalSummary {
                n,
                mean: None,
                std_dev: None,
                median: None,
            };
        }

        let mean = positions.iter().sum::<f64>() / n as f64;
        let std_dev = (n > 1).then(|| {
            let ss: f64 = positions.iter().map(|p| (p - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        });

        PositionalSummary {
            n,
            mean: Some(mean),
            std_dev,
            median: median(positions),
        }
    }
}

/// Median of a sample, `None` when empty.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    Some(match sorted.len() % 2 {
        0 => (sorted[mid - 1] + sorted[mid]) / 2.0,
        _ => sorted[mid],
    })
}

/// Relative positions of the assigned sites, in input order.
pub fn relative_positions(sites: &[AnnotatedSite]) -> Vec<f64> {
    sites.iter().filter_map(|s| s.relative_position()).collect()
}

///
/// Density profile of one site set over the transcript body.
///
/// Bin `i` covers `[i / n_bins, (i + 1) / n_bins)`; the last bin also holds
/// position `1.0`.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetageneProfile {
    pub n_bins: usize,
    pub counts: Vec<u64>,
    /// Smoothed, normalized density. Sums to 1, or all zero when nothing was binned.
    pub density: Vec<f64>,
    pub n_binned: usize,
    pub features: FeatureSummary,
    pub positions: PositionalSummary,
    pub smoothing: Smoothing,
    pub smoothing_window: usize,
}

impl MetageneProfile {
    /// Half-open range of relative positions covered by bin `i`.
    pub fn bin_range(&self, i: usize) -> (f64, f64) {
        let n = self.n_bins as f64;
        (i as f64 / n, (i + 1) as f64 / n)
    }
}

/// Bin index of a position in `[0, 1]`.
#[inline]
pub fn bin_index(position: f64, n_bins: usize) -> usize {
    ((position * n_bins as f64).floor() as usize).min(n_bins - 1)
}

/// Savitzky–Golay smoothing coefficients for a quadratic fit over `window` points.
pub fn savitzky_golay_coefficients(window: usize) -> Vec<f64> {
    let m = (window / 2) as f64;
    let denom = (2.0 * m - 1.0) * (2.0 * m + 1.0) * (2.0 * m + 3.0);
    (0..window)
        .map(|k| {
            let i = k as f64 - m;
            3.0 * (3.0 * m * m + 3.0 * m - 1.0 - 5.0 * i * i) / denom
        })
        .collect()
}

///
/// Smooth a series with a centered window.
///
/// Positions whose window would run off either end keep their input value.
/// Windows of 1, or at least as long as the series, leave it unchanged.
///
pub fn smooth(values: &[f64], window: usize, method: Smoothing) -> Vec<f64> {
    let n = values.len();
    if window <= 1 || window >= n {
        return values.to_vec();
    }

    let coefficients = match method {
        Smoothing::None => return values.to_vec(),
        Smoothing::SavitzkyGolay => savitzky_golay_coefficients(window),
        Smoothing::MovingAverage => vec![1.0 / window as f64; window],
    };

    let half = window / 2;
    let mut smoothed = values.to_vec();
    for (i, out) in smoothed.iter_mut().enumerate().take(n - half).skip(half) {
        *out = values[i - half..=i + half]
            .iter()
            .zip(coefficients.iter())
            .map(|(v, c)| v * c)
            .sum();
    }
    smoothed
}

fn normalize(values: &[f64]) -> Option<Vec<f64>> {
    let total: f64 = values.iter().sum();
    (total > 0.0).then(|| values.iter().map(|v| v / total).collect())
}

///
/// Build the metagene profile of one annotated site set.
///
/// Unassigned sites are left out of the bins but counted in the feature summary.
/// Smoothed values below zero are clamped before renormalizing; if that leaves
/// nothing, the unsmoothed density is returned instead.
///
/// # Arguments
/// - sites: annotated sites
/// - options: bin count and smoothing settings
///
pub fn profile(
    sites: &[AnnotatedSite],
    options: &ProfileOptions,
) -> Result<MetageneProfile, ModSitesError> {
    options.validate()?;

    let n_bins = options.n_bins;
    let mut counts = vec![0u64; n_bins];
    let mut positions = Vec::with_capacity(sites.len());

    for site in sites {
        let Some(position) = site.relative_position() else {
            continue;
        };
        if !position.is_finite() || !(0.0..=1.0).contains(&position) {
            return Err(ModSitesError::malformed(format!(
                "site {}: relative position {} is outside [0, 1]",
                site.site().id(),
                position
            )));
        }
        counts[bin_index(position, n_bins)] += 1;
        positions.push(position);
    }

    let raw: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
    let density = match normalize(&raw) {
        None => vec![0.0; n_bins],
        Some(normalized) => {
            let clamped: Vec<f64> = smooth(&normalized, options.smoothing_window, options.smoothing)
                .into_iter()
                .map(|v| v.max(0.0))
                .collect();
            normalize(&clamped).unwrap_or(normalized)
        }
    };

    Ok(MetageneProfile {
        n_bins,
        counts,
        density,
        n_binned: positions.len(),
        features: FeatureSummary::from_sites(sites),
        positions: PositionalSummary::from_positions(&positions),
        smoothing: options.smoothing,
        smoothing_window: options.smoothing_window,
    })
}
