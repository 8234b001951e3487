use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Transcript feature a site falls in.
///
/// The three assigned kinds appear in this order along every transcript,
/// 5' to 3'. `Unassigned` marks sites that overlap no exonic segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FeatureKind {
    #[cfg_attr(feature = "serde", serde(rename = "5UTR"))]
    FivePrimeUtr,
    #[cfg_attr(feature = "serde", serde(rename = "CDS"))]
    Cds,
    #[cfg_attr(feature = "serde", serde(rename = "3UTR"))]
    ThreePrimeUtr,
    #[cfg_attr(feature = "serde", serde(rename = "unassigned"))]
    Unassigned,
}

impl FeatureKind {
    /// The kinds a transcript segment may carry, in transcript order.
    pub const ASSIGNED: [FeatureKind; 3] = [
        FeatureKind::FivePrimeUtr,
        FeatureKind::Cds,
        FeatureKind::ThreePrimeUtr,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FeatureKind::FivePrimeUtr => "5UTR",
            FeatureKind::Cds => "CDS",
            FeatureKind::ThreePrimeUtr => "3UTR",
            FeatureKind::Unassigned => "unassigned",
        }
    }

    pub fn is_assigned(&self) -> bool {
        !matches!(self, FeatureKind::Unassigned)
    }
}

impl Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::*;

    #[rstest]
    fn test_labels() {
        let labels: Vec<String> = FeatureKind::ASSIGNED.iter().map(|k| k.to_string()).collect();
        assert_eq!(labels, vec!["5UTR", "CDS", "3UTR"]);
        assert!(!FeatureKind::Unassigned.is_assigned());
    }

    #[rstest]
    fn test_transcript_order() {
        let mut kinds = vec![
            FeatureKind::ThreePrimeUtr,
            FeatureKind::Cds,
            FeatureKind::FivePrimeUtr,
        ];
        kinds.sort();
        assert_eq!(kinds, FeatureKind::ASSIGNED.to_vec());
    }
}
