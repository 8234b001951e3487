//! Transcript models from GTF annotations.
//!
//! `exon`, `CDS`, `start_codon` and `stop_codon` records are grouped by
//! `transcript_id`. The coding bounds of a transcript are the extent of its CDS
//! and codon records; exons are split at those bounds into 5'UTR, CDS and
//! 3'UTR segments. Transcripts without coding records are skipped.

use std::io::BufRead;
use std::path::{Path, PathBuf};

use fxhash::FxHashMap as HashMap;

use modsites_core::ModelError;
use modsites_core::models::{FeatureKind, Segment, Strand, TranscriptModel};
use modsites_core::utils::{ChromStyle, get_dynamic_reader, normalize_chrom_name};

use crate::annotate::TranscriptIndex;
use crate::errors::ModSitesError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GtfOptions {
    /// Keep only transcripts whose biotype is `protein_coding`.
    ///
    /// `transcript_type`/`transcript_biotype` is used when present, otherwise
    /// `gene_type`/`gene_biotype`.
    pub protein_coding_only: bool,
    /// Rename Ensembl chromosomes to UCSC style (`1` -> `chr1`, `MT` -> `chrM`).
    pub ensembl_to_ucsc: bool,
}

/// Everything collected for one transcript while reading.
struct TranscriptRecord {
    id: String,
    chr: String,
    strand: Strand,
    gene_name: Option<String>,
    transcript_biotype: Option<String>,
    gene_biotype: Option<String>,
    exons: Vec<(u32, u32)>,
    /// Extent of CDS, start codon and stop codon records.
    coding: Option<(u32, u32)>,
}

impl TranscriptRecord {
    fn biotype(&self) -> Option<&str> {
        self.transcript_biotype
            .as_deref()
            .or(self.gene_biotype.as_deref())
    }

    fn into_model(mut self) -> Result<Option<TranscriptModel>, ModelError> {
        let Some((cds_start, cds_end)) = self.coding else {
            return Ok(None);
        };

        self.exons.sort_unstable();

        let (upstream, downstream) = match self.strand {
            Strand::Minus => (FeatureKind::ThreePrimeUtr, FeatureKind::FivePrimeUtr),
            _ => (FeatureKind::FivePrimeUtr, FeatureKind::ThreePrimeUtr),
        };

        let mut segments = Vec::with_capacity(self.exons.len() + 2);
        for &(start, end) in self.exons.iter() {
            let pieces = [
                (upstream, start, end.min(cds_start)),
                (FeatureKind::Cds, start.max(cds_start), end.min(cds_end)),
                (downstream, start.max(cds_end), end),
            ];
            for (kind, s, e) in pieces {
                if s < e {
                    segments.push(Segment::new(kind, s, e));
                }
            }
        }

        if self.strand == Strand::Minus {
            segments.reverse();
        }

        let model = TranscriptModel::new(self.id, self.chr, self.strand, segments)?;
        Ok(Some(match self.gene_name {
            Some(name) => model.with_gene_name(name),
            None => model,
        }))
    }
}

/// Extract the value of `key` from a GTF attributes string (column 9).
///
/// Looks for the pattern `key "VALUE"` and returns VALUE.
fn extract_gtf_attribute(attrs: &str, key: &str) -> Option<String> {
    attrs.split(';').find_map(|field| {
        let (k, v) = field.trim().split_once(' ')?;
        if k != key {
            return None;
        }
        Some(v.trim().trim_matches('"').to_string())
    })
}

/// Transcript models loaded from one annotation file, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct TranscriptSet {
    pub transcripts: Vec<TranscriptModel>,
    pub path: Option<PathBuf>,
}

impl TranscriptSet {
    ///
    /// Load coding transcript models from a GTF (or GTF.gz) file.
    ///
    /// GTF coordinates are 1-based inclusive and become 0-based half-open.
    /// A transcript whose records disagree on chromosome or strand, or whose
    /// exons overlap, fails the whole load.
    ///
    /// # Arguments
    /// - path: path to the GTF file
    /// - options: biotype filter and chromosome renaming
    ///
    pub fn from_gtf(path: &Path, options: &GtfOptions) -> Result<Self, ModSitesError> {
        let reader = get_dynamic_reader(path)?;
        let source_name = path.display().to_string();
        let malformed = |line: usize, reason: String| {
            ModSitesError::Model(ModelError::MalformedLine {
                source_name: source_name.clone(),
                line,
                reason,
            })
        };

        let mut records: Vec<TranscriptRecord> = Vec::new();
        let mut by_id: HashMap<String, usize> = HashMap::default();

        for (line_idx, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = line_idx + 1;
            if line.starts_with('#') || line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').collect();
            if fields.len() < 9 {
                continue;
            }

            let feature_type = fields[2];
            if !matches!(feature_type, "exon" | "CDS" | "start_codon" | "stop_codon") {
                continue;
            }

            let attrs = fields[8];
            let Some(transcript_id) = extract_gtf_attribute(attrs, "transcript_id") else {
                continue;
            };

            let chr = match options.ensembl_to_ucsc {
                true => normalize_chrom_name(fields[0], ChromStyle::Ucsc),
                false => fields[0].to_string(),
            };

            let start = fields[3]
                .parse::<u32>()
                .map_err(|e| malformed(line_number, format!("start '{}': {}", fields[3], e)))?;
            let end = fields[4]
                .parse::<u32>()
                .map_err(|e| malformed(line_number, format!("end '{}': {}", fields[4], e)))?;
            if start == 0 || start > end {
                return Err(malformed(
                    line_number,
                    format!("invalid GTF interval {}-{}", start, end),
                ));
            }
            // 1-based inclusive -> 0-based half-open
            let start = start - 1;

            let strand: Strand = fields[6]
                .parse()
                .map_err(|e: ModelError| malformed(line_number, e.to_string()))?;

            let idx = match by_id.get(&transcript_id) {
                Some(&idx) => idx,
                None => {
                    records.push(TranscriptRecord {
                        id: transcript_id.clone(),
                        chr: chr.clone(),
                        strand,
                        gene_name: extract_gtf_attribute(attrs, "gene_name")
                            .or_else(|| extract_gtf_attribute(attrs, "gene_id")),
                        transcript_biotype: extract_gtf_attribute(attrs, "transcript_type")
                            .or_else(|| extract_gtf_attribute(attrs, "transcript_biotype")),
                        gene_biotype: extract_gtf_attribute(attrs, "gene_type")
                            .or_else(|| extract_gtf_attribute(attrs, "gene_biotype")),
                        exons: Vec::new(),
                        coding: None,
                    });
                    by_id.insert(transcript_id.clone(), records.len() - 1);
                    records.len() - 1
                }
            };
            let record = &mut records[idx];

            if record.chr != chr || record.strand != strand {
                return Err(malformed(
                    line_number,
                    format!(
                        "transcript {} is on {}{} but this record is on {}{}",
                        transcript_id, record.chr, record.strand, chr, strand
                    ),
                ));
            }

            match feature_type {
                "exon" => record.exons.push((start, end)),
                _ => {
                    record.coding = Some(match record.coding {
                        Some((s, e)) => (s.min(start), e.max(end)),
                        None => (start, end),
                    });
                }
            }
        }

        let mut transcripts = Vec::with_capacity(records.len());
        for record in records {
            if options.protein_coding_only && record.biotype() != Some("protein_coding") {
                continue;
            }
            if let Some(model) = record.into_model()? {
                transcripts.push(model);
            }
        }

        Ok(TranscriptSet {
            transcripts,
            path: Some(path.to_path_buf()),
        })
    }

    pub fn len(&self) -> usize {
        self.transcripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TranscriptModel> {
        self.transcripts.iter()
    }

    /// Sum of exonic lengths, the default universe for enrichment tests.
    pub fn total_exonic_length(&self) -> u64 {
        self.transcripts
            .iter()
            .map(|tx| tx.exonic_length() as u64)
            .sum()
    }

    pub fn into_index(self) -> TranscriptIndex {
        TranscriptIndex::new(self.transcripts)
    }
}

impl From<Vec<TranscriptModel>> for TranscriptSet {
    fn from(transcripts: Vec<TranscriptModel>) -> Self {
        TranscriptSet {
            transcripts,
            path: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Write;

    fn get_test_path(file_name: &str) -> PathBuf {
        std::env::current_dir()
            .unwrap()
            .join("../tests/data")
            .join(file_name)
    }

    fn write_gtf(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".gtf").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    fn spans(tx: &TranscriptModel) -> Vec<(FeatureKind, u32, u32)> {
        tx.segments()
            .iter()
            .map(|s| (s.kind, s.start, s.end))
            .collect()
    }

    #[rstest]
    fn test_gtf_basic_parsing() {
        let set = TranscriptSet::from_gtf(&get_test_path("genes.gtf"), &GtfOptions::default())
            .unwrap();

        let ids: Vec<&str> = set.iter().map(|tx| tx.id()).collect();
        // TX3 has no coding records
        assert_eq!(ids, vec!["TX1", "TX1b", "TX2", "TX4"]);
        assert_eq!(set.total_exonic_length(), 300 + 100 + 300 + 900);
    }

    #[rstest]
    fn test_gtf_plus_strand_segments() {
        let set = TranscriptSet::from_gtf(&get_test_path("genes.gtf"), &GtfOptions::default())
            .unwrap();
        let tx1 = &set.transcripts[0];

        assert_eq!(tx1.gene_name(), Some("GENE1"));
        assert_eq!(tx1.strand(), Strand::Plus);
        assert_eq!(
            spans(tx1),
            vec![
                (FeatureKind::FivePrimeUtr, 1000, 1050),
                (FeatureKind::Cds, 1050, 1100),
                (FeatureKind::Cds, 1200, 1353),
                (FeatureKind::ThreePrimeUtr, 1353, 1400),
            ]
        );
        assert_eq!(tx1.exonic_length(), 300);
    }

    #[rstest]
    fn test_gtf_minus_strand_segments_in_transcript_order() {
        let set = TranscriptSet::from_gtf(&get_test_path("genes.gtf"), &GtfOptions::default())
            .unwrap();
        let tx2 = &set.transcripts[2];

        assert_eq!(tx2.id(), "TX2");
        assert_eq!(
            spans(tx2),
            vec![
                (FeatureKind::FivePrimeUtr, 5250, 5300),
                (FeatureKind::Cds, 5100, 5250),
                (FeatureKind::ThreePrimeUtr, 5000, 5100),
            ]
        );
    }

    #[rstest]
    fn test_gtf_protein_coding_filter() {
        let options = GtfOptions {
            protein_coding_only: true,
            ..Default::default()
        };
        let set = TranscriptSet::from_gtf(&get_test_path("genes.gtf"), &options).unwrap();

        // TX4 is a retained intron in a protein coding gene
        let ids: Vec<&str> = set.iter().map(|tx| tx.id()).collect();
        assert_eq!(ids, vec!["TX1", "TX1b", "TX2"]);
    }

    #[rstest]
    fn test_gtf_ensembl_to_ucsc_conversion() {
        let file = write_gtf(
            "1\tsrc\texon\t11\t50\t.\t+\t.\tgene_id \"G\"; transcript_id \"T\";\n\
             1\tsrc\tCDS\t21\t40\t.\t+\t.\tgene_id \"G\"; transcript_id \"T\";\n\
             MT\tsrc\texon\t11\t50\t.\t-\t.\tgene_id \"M\"; transcript_id \"TM\";\n\
             MT\tsrc\tCDS\t11\t50\t.\t-\t.\tgene_id \"M\"; transcript_id \"TM\";\n",
        );
        let options = GtfOptions {
            ensembl_to_ucsc: true,
            ..Default::default()
        };
        let set = TranscriptSet::from_gtf(file.path(), &options).unwrap();

        let chrs: Vec<&str> = set.iter().map(|tx| tx.chr()).collect();
        assert_eq!(chrs, vec!["chr1", "chrM"]);
        // no gene_name attribute: fall back to gene_id
        assert_eq!(set.transcripts[0].gene_name(), Some("G"));
        assert_eq!(spans(&set.transcripts[1]), vec![(FeatureKind::Cds, 10, 50)]);
    }

    #[rstest]
    fn test_gtf_bad_coordinate_is_error() {
        let file = write_gtf("chr1\tsrc\texon\tabc\t50\t.\t+\t.\ttranscript_id \"T\";\n");
        let err = TranscriptSet::from_gtf(file.path(), &GtfOptions::default()).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[rstest]
    fn test_gtf_strand_disagreement_is_error() {
        let file = write_gtf(
            "chr1\tsrc\texon\t1\t50\t.\t+\t.\ttranscript_id \"T\";\n\
             chr1\tsrc\tCDS\t10\t40\t.\t-\t.\ttranscript_id \"T\";\n",
        );
        let err = TranscriptSet::from_gtf(file.path(), &GtfOptions::default()).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[rstest]
    fn test_gtf_overlapping_exons_is_error() {
        let file = write_gtf(
            "chr1\tsrc\texon\t1\t50\t.\t+\t.\ttranscript_id \"T\";\n\
             chr1\tsrc\texon\t40\t90\t.\t+\t.\ttranscript_id \"T\";\n\
             chr1\tsrc\tCDS\t10\t80\t.\t+\t.\ttranscript_id \"T\";\n",
        );
        let result = TranscriptSet::from_gtf(file.path(), &GtfOptions::default());
        assert!(matches!(
            result,
            Err(ModSitesError::Model(ModelError::MalformedInput(_)))
        ));
    }

    #[rstest]
    #[case("gene_id \"G1\"; transcript_id \"TX1\";", "transcript_id", Some("TX1"))]
    #[case("gene_id \"G1\"; transcript_id \"TX1\";", "gene_id", Some("G1"))]
    #[case("gene_id \"G1\"; transcript_id \"TX1\";", "gene_name", None)]
    #[case("gene_id \"G1\"; transcript_id_2 \"X\";", "transcript_id", None)]
    fn test_extract_gtf_attribute(
        #[case] attrs: &str,
        #[case] key: &str,
        #[case] expected: Option<&str>,
    ) {
        assert_eq!(extract_gtf_attribute(attrs, key).as_deref(), expected);
    }
}
