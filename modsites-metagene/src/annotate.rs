//! Feature annotation of modification sites.
//!
//! Each site is projected onto the transcript that covers its center and gets
//! a feature kind (5'UTR, CDS or 3'UTR) plus a relative position along the
//! exonic path of that transcript. Sites outside every exon stay unassigned.

use std::cmp::Ordering;

use modsites_core::models::{FeatureKind, Site, TranscriptHit, TranscriptModel};
use modsites_overlaprs::{Interval, MultiChromOverlapper};
use serde::Serialize;

use crate::errors::ModSitesError;

/// Transcripts indexed by genomic span, one interval list per chromosome.
///
/// The index owns its transcripts; interval payloads are positions into that list.
#[derive(Debug, Clone)]
pub struct TranscriptIndex {
    transcripts: Vec<TranscriptModel>,
    index: MultiChromOverlapper<u32, usize>,
}

impl TranscriptIndex {
    pub fn new(transcripts: Vec<TranscriptModel>) -> Self {
        let intervals = transcripts.iter().enumerate().map(|(i, tx)| {
            (
                tx.chr().to_string(),
                Interval {
                    start: tx.span_start(),
                    end: tx.span_end(),
                    val: i,
                },
            )
        });
        let index = MultiChromOverlapper::from_intervals(intervals);

        TranscriptIndex { transcripts, index }
    }

    pub fn transcripts(&self) -> &[TranscriptModel] {
        &self.transcripts
    }

    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    /// Whether any transcript lies on `chr`.
    pub fn contains_chr(&self, chr: &str) -> bool {
        self.index.contains_chr(chr)
    }

    /// Transcripts whose span contains `pos` on `chr`, in no particular order.
    ///
    /// Spans include introns; use [`TranscriptModel::locate`] to check exonic overlap.
    pub fn candidates<'a>(
        &'a self,
        chr: &str,
        pos: u32,
    ) -> impl Iterator<Item = &'a TranscriptModel> + 'a {
        self.index
            .find_point(chr, pos)
            .map(move |iv| &self.transcripts[iv.val])
    }

    /// Sum of exonic lengths over all transcripts.
    pub fn total_exonic_length(&self) -> u64 {
        self.transcripts
            .iter()
            .map(|tx| tx.exonic_length() as u64)
            .sum()
    }
}

impl From<Vec<TranscriptModel>> for TranscriptIndex {
    fn from(transcripts: Vec<TranscriptModel>) -> Self {
        TranscriptIndex::new(transcripts)
    }
}

///
/// A site together with its transcript annotation.
///
/// Either all three of `feature`, `transcript_id` and `relative_position` carry an
/// assignment, or the feature is `Unassigned` and the other two are `None`.
///
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnotatedSite {
    #[serde(flatten)]
    site: Site,
    feature: FeatureKind,
    transcript_id: Option<String>,
    relative_position: Option<f64>,
}

impl AnnotatedSite {
    pub fn unassigned(site: Site) -> Self {
        AnnotatedSite {
            site,
            feature: FeatureKind::Unassigned,
            transcript_id: None,
            relative_position: None,
        }
    }

    ///
    /// Build an assigned site. The feature must be one of the three transcript
    /// features and the position must be a finite value in `[0, 1)`.
    ///
    pub fn assigned(
        site: Site,
        feature: FeatureKind,
        transcript_id: impl Into<String>,
        relative_position: f64,
    ) -> Result<Self, ModSitesError> {
        if !feature.is_assigned() {
            return Err(ModSitesError::malformed(format!(
                "site {}: an assigned site needs a transcript feature, got {}",
                site.id(),
                feature
            )));
        }
        if !relative_position.is_finite() || !(0.0..1.0).contains(&relative_position) {
            return Err(ModSitesError::malformed(format!(
                "site {}: relative position {} is outside [0, 1)",
                site.id(),
                relative_position
            )));
        }

        Ok(AnnotatedSite {
            site,
            feature,
            transcript_id: Some(transcript_id.into()),
            relative_position: Some(relative_position),
        })
    }

    fn from_hit(site: Site, transcript: &TranscriptModel, hit: TranscriptHit) -> Self {
        AnnotatedSite {
            site,
            feature: hit.kind,
            transcript_id: Some(transcript.id().to_string()),
            relative_position: Some(hit.relative_position),
        }
    }

    pub fn site(&self) -> &Site {
        &self.site
    }

    pub fn feature(&self) -> FeatureKind {
        self.feature
    }

    pub fn transcript_id(&self) -> Option<&str> {
        self.transcript_id.as_deref()
    }

    pub fn relative_position(&self) -> Option<f64> {
        self.relative_position
    }

    pub fn is_assigned(&self) -> bool {
        self.feature.is_assigned()
    }
}

impl AsRef<Site> for AnnotatedSite {
    fn as_ref(&self) -> &Site {
        &self.site
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnnotateOptions {
    /// Only consider transcripts on the site's strand. Unstranded sites match either strand.
    pub stranded: bool,
}

///
/// Order transcripts by preference when a site lands in several.
///
/// Protein-coding first, then longer exonic length, then lower id.
///
fn isoform_preference(a: &TranscriptModel, b: &TranscriptModel) -> Ordering {
    b.is_protein_coding()
        .cmp(&a.is_protein_coding())
        .then_with(|| b.exonic_length().cmp(&a.exonic_length()))
        .then_with(|| a.id().cmp(b.id()))
}

/// Annotate one site against the index.
pub fn annotate_site(
    site: &Site,
    index: &TranscriptIndex,
    options: &AnnotateOptions,
) -> AnnotatedSite {
    let center = site.center();

    let best = index
        .candidates(site.chr(), center)
        .filter(|tx| !options.stranded || site.strand().is_compatible(&tx.strand()))
        .filter_map(|tx| tx.locate(center).map(|hit| (tx, hit)))
        .min_by(|(a, _), (b, _)| isoform_preference(a, b));

    match best {
        Some((tx, hit)) => AnnotatedSite::from_hit(site.clone(), tx, hit),
        None => AnnotatedSite::unassigned(site.clone()),
    }
}

///
/// Annotate every site, one output per input in input order.
///
/// # Arguments
/// - sites: sites to annotate
/// - index: transcript index to look sites up in
/// - options: annotation options
///
pub fn annotate<S: AsRef<Site>>(
    sites: &[S],
    index: &TranscriptIndex,
    options: &AnnotateOptions,
) -> Vec<AnnotatedSite> {
    sites
        .iter()
        .map(|site| annotate_site(site.as_ref(), index, options))
        .collect()
}
