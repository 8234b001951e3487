use std::fmt::{self, Display};

#[cfg(feature = "serde")]
use serde::Serialize;

use crate::errors::ModelError;
use crate::models::Strand;

///
/// A single modification site: a scored, stranded interval, usually one nucleotide wide.
///
/// Sites are immutable once built; their identity is the `id` field.
///
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct Site {
    id: String,
    chr: String,
    start: u32,
    end: u32,
    strand: Strand,
    score: f64,
}

impl Site {
    ///
    /// Build a site, rejecting `start > end` and non-finite scores.
    ///
    pub fn new(
        id: impl Into<String>,
        chr: impl Into<String>,
        start: u32,
        end: u32,
        strand: Strand,
        score: f64,
    ) -> Result<Self, ModelError> {
        let id = id.into();
        if start > end {
            return Err(ModelError::MalformedInput(format!(
                "site {}: start {} is greater than end {}",
                id, start, end
            )));
        }
        if !score.is_finite() {
            return Err(ModelError::MalformedInput(format!(
                "site {}: score must be finite, got {}",
                id, score
            )));
        }
        Ok(Site {
            id,
            chr: chr.into(),
            start,
            end,
            strand,
            score,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn chr(&self) -> &str {
        &self.chr
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn strand(&self) -> Strand {
        self.strand
    }

    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn width(&self) -> u32 {
        self.end - self.start
    }

    /// Reference coordinate of the site: `start + width / 2`.
    ///
    /// For single-nucleotide sites this is `start`.
    pub fn center(&self) -> u32 {
        self.start + self.width() / 2
    }

    /// Copy of this site with its chromosome renamed.
    pub fn with_chr(&self, chr: impl Into<String>) -> Site {
        Site {
            chr: chr.into(),
            ..self.clone()
        }
    }

    pub fn as_string(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}",
            self.chr, self.start, self.end, self.id, self.score, self.strand
        )
    }
}

impl AsRef<Site> for Site {
    fn as_ref(&self) -> &Site {
        self
    }
}

impl Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_string())
    }
}
