//! One full comparison of two site sets.

use modsites_core::models::Site;
use serde::Serialize;

use crate::annotate::{AnnotatedSite, TranscriptIndex, annotate};
use crate::config::RunConfig;
use crate::cooccurrence::{CoOccurrencePair, OverlapSummary, detect_pairs, summarize_overlap};
use crate::errors::ModSitesError;
use crate::metagene::{MetageneProfile, profile, relative_positions};
use crate::prefilter::prefilter;
use crate::statistics::{
    ENRICHMENT_TEST, TestResult, enrichment_test, feature_distribution_test,
    positional_distribution_test,
};

/// A statistical test that either ran or was skipped for lack of data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TestOutcome {
    Completed(TestResult),
    Skipped { test: String, reason: String },
}

impl TestOutcome {
    /// Turn `InsufficientData` into a skipped test; any other error is returned.
    fn from_result(result: Result<TestResult, ModSitesError>) -> Result<Self, ModSitesError> {
        match result {
            Ok(result) => Ok(TestOutcome::Completed(result)),
            Err(ModSitesError::InsufficientData { test, reason }) => {
                Ok(TestOutcome::Skipped { test, reason })
            }
            Err(e) => Err(e),
        }
    }

    pub fn test_name(&self) -> &str {
        match self {
            TestOutcome::Completed(result) => &result.test,
            TestOutcome::Skipped { test, .. } => test,
        }
    }

    pub fn result(&self) -> Option<&TestResult> {
        match self {
            TestOutcome::Completed(result) => Some(result),
            TestOutcome::Skipped { .. } => None,
        }
    }
}

/// Sites that take part in pairing and the enrichment test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SitePopulation {
    /// Every site. Used with an explicit universe size.
    AllSites,
    /// Sites assigned to a transcript feature. Used when the universe is the
    /// total exonic length, which no other site can lie in.
    AssignedSites,
}

impl SitePopulation {
    pub fn select<'a>(&self, sites: &'a [AnnotatedSite]) -> Vec<&'a AnnotatedSite> {
        match self {
            SitePopulation::AllSites => sites.iter().collect(),
            SitePopulation::AssignedSites => sites.iter().filter(|s| s.is_assigned()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonReport {
    pub config: RunConfig,
    pub universe_size: u64,
    pub population: SitePopulation,
    pub annotated_a: Vec<AnnotatedSite>,
    pub annotated_b: Vec<AnnotatedSite>,
    pub profile_a: MetageneProfile,
    pub profile_b: MetageneProfile,
    pub pairs: Vec<CoOccurrencePair>,
    pub overlap: OverlapSummary,
    pub tests: Vec<TestOutcome>,
}

///
/// Run the whole comparison of set A against set B.
///
/// Sites are pre-filtered, annotated against `index` and profiled; pairs are
/// detected and the three tests run. The enrichment universe is
/// `config.universe_size`, or the total exonic length of the index when unset.
/// In the second case only assigned sites are paired and counted, so set sizes
/// and overlap refer to the same positions as the universe.
///
/// A test whose data cannot support it is recorded as skipped. This includes
/// set sizes that exceed the universe.
///
/// # Arguments
/// - sites_a: first site set
/// - sites_b: second site set
/// - index: transcripts to annotate against
/// - config: run settings
///
pub fn compare(
    sites_a: Vec<Site>,
    sites_b: Vec<Site>,
    index: &TranscriptIndex,
    config: &RunConfig,
) -> Result<ComparisonReport, ModSitesError> {
    config.validate()?;

    let sites_a = prefilter(sites_a, config.min_score, config.max_sites, config.seed);
    let sites_b = prefilter(sites_b, config.min_score, config.max_sites, config.seed);

    let annotate_options = config.annotate_options();
    let annotated_a = annotate(&sites_a, index, &annotate_options);
    let annotated_b = annotate(&sites_b, index, &annotate_options);

    let profile_options = config.profile_options();
    let profile_a = profile(&annotated_a, &profile_options)?;
    let profile_b = profile(&annotated_b, &profile_options)?;

    let (universe_size, population) = match config.universe_size {
        Some(size) => (size, SitePopulation::AllSites),
        None => (index.total_exonic_length(), SitePopulation::AssignedSites),
    };
    let pool_a = population.select(&annotated_a);
    let pool_b = population.select(&annotated_b);

    let pairs = detect_pairs(&pool_a, &pool_b, config.window);
    let overlap = summarize_overlap(pool_a.len(), pool_b.len(), &pairs);

    let enrichment = match enrichment_test(
        pool_a.len() as u64,
        pool_b.len() as u64,
        universe_size,
        pairs.len() as u64,
    ) {
        Err(ModSitesError::InvalidArgument(reason)) => TestOutcome::Skipped {
            test: ENRICHMENT_TEST.to_string(),
            reason,
        },
        result => TestOutcome::from_result(result)?,
    };

    let tests = vec![
        TestOutcome::from_result(feature_distribution_test(
            &profile_a.features,
            &profile_b.features,
        ))?,
        TestOutcome::from_result(positional_distribution_test(
            &relative_positions(&annotated_a),
            &relative_positions(&annotated_b),
        ))?,
        enrichment,
    ];

    Ok(ComparisonReport {
        config: config.clone(),
        universe_size,
        population,
        annotated_a,
        annotated_b,
        profile_a,
        profile_b,
        pairs,
        overlap,
        tests,
    })
}
