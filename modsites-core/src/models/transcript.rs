#[cfg(feature = "serde")]
use serde::Serialize;

use crate::errors::ModelError;
use crate::models::{FeatureKind, Strand};

/// One exonic piece of a transcript, labelled with the feature it belongs to.
///
/// Represents the range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Segment {
    pub kind: FeatureKind,
    pub start: u32,
    pub end: u32,
}

impl Segment {
    pub fn new(kind: FeatureKind, start: u32, end: u32) -> Self {
        Segment { kind, start, end }
    }

    pub fn len(&self) -> u32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    #[inline]
    pub fn contains(&self, pos: u32) -> bool {
        self.start <= pos && pos < self.end
    }
}

/// Where a genomic coordinate lands on a transcript.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TranscriptHit {
    pub kind: FeatureKind,
    /// Index of the containing segment, in transcript order.
    pub segment_index: usize,
    /// Nucleotides from the transcript's 5' end along the exonic path.
    pub offset: u32,
    /// `offset / exonic_length`, in `[0, 1)`.
    pub relative_position: f64,
}

///
/// Exonic structure of one transcript.
///
/// Segments are stored in transcript order, 5' to 3'. On the minus strand that is
/// descending genomic order. The constructor enforces that segments are non-empty,
/// non-overlapping, ordered along the transcript, and that feature kinds never go
/// backwards (no 5'UTR after CDS, no CDS after 3'UTR).
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct TranscriptModel {
    id: String,
    gene_name: Option<String>,
    chr: String,
    strand: Strand,
    segments: Vec<Segment>,
    exonic_length: u32,
}

impl TranscriptModel {
    pub fn new(
        id: impl Into<String>,
        chr: impl Into<String>,
        strand: Strand,
        segments: Vec<Segment>,
    ) -> Result<Self, ModelError> {
        let id = id.into();
        let malformed = |reason: String| ModelError::MalformedInput(format!("transcript {}: {}", id, reason));

        if !strand.is_known() {
            return Err(malformed("strand must be '+' or '-'".to_string()));
        }
        if segments.is_empty() {
            return Err(malformed("no segments".to_string()));
        }

        for (i, segment) in segments.iter().enumerate() {
            if segment.is_empty() {
                return Err(malformed(format!(
                    "segment {} is empty ({}-{})",
                    i, segment.start, segment.end
                )));
            }
            if !segment.kind.is_assigned() {
                return Err(malformed(format!("segment {} has no feature kind", i)));
            }
        }

        for (i, pair) in segments.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);
            let ordered = match strand {
                Strand::Minus => next.end <= prev.start,
                _ => prev.end <= next.start,
            };
            if !ordered {
                return Err(malformed(format!(
                    "segments {} ({}-{}) and {} ({}-{}) overlap or are out of transcript order",
                    i,
                    prev.start,
                    prev.end,
                    i + 1,
                    next.start,
                    next.end
                )));
            }
            if next.kind < prev.kind {
                return Err(malformed(format!(
                    "{} segment follows {} segment",
                    next.kind, prev.kind
                )));
            }
        }

        let exonic_length = segments.iter().map(|s| s.len()).sum();

        Ok(TranscriptModel {
            id,
            gene_name: None,
            chr: chr.into(),
            strand,
            segments,
            exonic_length,
        })
    }

    pub fn with_gene_name(mut self, gene_name: impl Into<String>) -> Self {
        self.gene_name = Some(gene_name.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn gene_name(&self) -> Option<&str> {
        self.gene_name.as_deref()
    }

    pub fn chr(&self) -> &str {
        &self.chr
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Sum of segment lengths.
    pub fn exonic_length(&self) -> u32 {
        self.exonic_length
    }

    /// Leftmost genomic coordinate covered by the transcript.
    pub fn span_start(&self) -> u32 {
        match self.strand {
            Strand::Minus => self.segments[self.segments.len() - 1].start,
            _ => self.segments[0].start,
        }
    }

    /// Genomic end (exclusive) of the transcript.
    pub fn span_end(&self) -> u32 {
        match self.strand {
            Strand::Minus => self.segments[0].end,
            _ => self.segments[self.segments.len() - 1].end,
        }
    }

    pub fn is_protein_coding(&self) -> bool {
        self.segments.iter().any(|s| s.kind == FeatureKind::Cds)
    }

    ///
    /// Project a genomic coordinate onto the transcript.
    ///
    /// Returns `None` for coordinates outside every segment (intronic or off the
    /// transcript). The offset is counted from the 5' end of the transcript, so on
    /// the minus strand it grows as the genomic coordinate shrinks.
    ///
    pub fn locate(&self, pos: u32) -> Option<TranscriptHit> {
        let mut upstream: u32 = 0;
        for (segment_index, segment) in self.segments.iter().enumerate() {
            if segment.contains(pos) {
                let within = match self.strand {
                    Strand::Minus => segment.end - 1 - pos,
                    _ => pos - segment.start,
                };
                let offset = upstream + within;
                return Some(TranscriptHit {
                    kind: segment.kind,
                    segment_index,
                    offset,
                    relative_position: offset as f64 / self.exonic_length as f64,
                });
            }
            upstream += segment.len();
        }
        None
    }
}
