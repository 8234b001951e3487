use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::ArgMatches;
use tracing::{info, warn};

use modsites_core::models::SiteSet;
use modsites_core::utils::ChromStyle;
use modsites_metagene::{
    ComparisonReport, GtfOptions, RunConfig, TestOutcome, TranscriptIndex, TranscriptSet, compare,
};

/// Inputs of one `compare` run, resolved from the command line.
#[derive(Debug, Clone)]
pub struct CompareArgs {
    pub sites_a: PathBuf,
    pub sites_b: PathBuf,
    pub gtf: PathBuf,
    pub config: RunConfig,
    pub gtf_options: GtfOptions,
}

impl CompareArgs {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let path = |name: &str| -> Result<PathBuf> {
            matches
                .get_one::<String>(name)
                .map(PathBuf::from)
                .with_context(|| format!("--{} is required", name))
        };

        let mut config = match matches.get_one::<String>("config") {
            Some(p) => RunConfig::try_from(Path::new(p))
                .with_context(|| format!("Failed to load config file: {}", p))?,
            None => RunConfig::default(),
        };
        if let Some(&bins) = matches.get_one::<usize>("bins") {
            config.n_bins = bins;
        }
        if let Some(&window) = matches.get_one::<u32>("window") {
            config.window = window;
        }

        Ok(CompareArgs {
            sites_a: path("sites-a")?,
            sites_b: path("sites-b")?,
            gtf: path("gtf")?,
            config,
            gtf_options: GtfOptions {
                protein_coding_only: matches.get_flag("protein-coding"),
                ensembl_to_ucsc: matches.get_flag("ensembl-to-ucsc"),
            },
        })
    }
}

fn load_sites(path: &Path, ensembl_to_ucsc: bool) -> Result<SiteSet> {
    let set = SiteSet::try_from(path)
        .with_context(|| format!("Failed to load site file: {}", path.display()))?;
    info!("Loaded {} sites from {}", set.len(), path.display());

    Ok(match ensembl_to_ucsc {
        true => set.normalize_chroms(ChromStyle::Ucsc),
        false => set,
    })
}

/// Number of sites on chromosomes that carry no transcript.
fn count_off_annotation(sites: &SiteSet, index: &TranscriptIndex) -> usize {
    sites.iter().filter(|s| !index.contains_chr(s.chr())).count()
}

/// Load every input and run the comparison.
pub fn compare_files(args: &CompareArgs) -> Result<ComparisonReport> {
    let sites_a = load_sites(&args.sites_a, args.gtf_options.ensembl_to_ucsc)?;
    let sites_b = load_sites(&args.sites_b, args.gtf_options.ensembl_to_ucsc)?;

    let transcripts = TranscriptSet::from_gtf(&args.gtf, &args.gtf_options)
        .with_context(|| format!("Failed to load GTF: {}", args.gtf.display()))?;
    if transcripts.is_empty() {
        warn!("No coding transcripts found in {}", args.gtf.display());
    }
    info!(
        "Loaded {} transcripts ({} nt exonic)",
        transcripts.len(),
        transcripts.total_exonic_length()
    );

    let index = transcripts.into_index();
    for (sites, path) in [(&sites_a, &args.sites_a), (&sites_b, &args.sites_b)] {
        let missing = count_off_annotation(sites, &index);
        if missing > 0 {
            warn!(
                "{} of {} sites in {} lie on chromosomes without transcripts; check chromosome naming (--ensembl-to-ucsc)",
                missing,
                sites.len(),
                path.display()
            );
        }
    }

    let report = compare(sites_a.sites, sites_b.sites, &index, &args.config)
        .context("Comparison failed")?;

    info!(
        "Paired {} / {} sites, found {} co-occurring pairs",
        report.overlap.n_a,
        report.overlap.n_b,
        report.pairs.len()
    );
    for test in report.tests.iter() {
        match test {
            TestOutcome::Completed(result) => {
                info!("{}: statistic={:.4} p={:.3e}", result.test, result.statistic, result.p_value)
            }
            TestOutcome::Skipped { test, reason } => warn!("{} skipped: {}", test, reason),
        }
    }

    Ok(report)
}

pub fn run_compare(matches: &ArgMatches) -> Result<()> {
    let args = CompareArgs::from_matches(matches)?;
    let output_path = matches.get_one::<String>("output");

    let report = compare_files(&args)?;

    let json =
        serde_json::to_string_pretty(&report).context("Failed to serialize output to JSON")?;

    match output_path {
        Some(p) => {
            let mut file = File::create(Path::new(p))
                .with_context(|| format!("Failed to create output file: {}", p))?;
            file.write_all(json.as_bytes())?;
            info!("Output written to {}", p);
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(json.as_bytes())?;
            writeln!(stdout)?;
        }
    }

    Ok(())
}
