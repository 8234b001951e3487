use std::fmt::{self, Display};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;

/// Strand of a site or transcript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Strand {
    #[cfg_attr(feature = "serde", serde(rename = "+"))]
    Plus,
    #[cfg_attr(feature = "serde", serde(rename = "-"))]
    Minus,
    #[cfg_attr(feature = "serde", serde(rename = "."))]
    Unstranded,
}

impl Strand {
    pub fn as_char(&self) -> char {
        match self {
            Strand::Plus => '+',
            Strand::Minus => '-',
            Strand::Unstranded => '.',
        }
    }

    /// `true` for `+` and `-`.
    pub fn is_known(&self) -> bool {
        !matches!(self, Strand::Unstranded)
    }

    /// Two strands are compatible when they are equal or either one is unstranded.
    pub fn is_compatible(&self, other: &Strand) -> bool {
        !self.is_known() || !other.is_known() || self == other
    }
}

impl TryFrom<char> for Strand {
    type Error = ModelError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value {
            '+' => Ok(Strand::Plus),
            '-' => Ok(Strand::Minus),
            '.' => Ok(Strand::Unstranded),
            other => Err(ModelError::MalformedInput(format!(
                "unknown strand '{}'",
                other
            ))),
        }
    }
}

impl FromStr for Strand {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Strand::try_from(c),
            _ => Err(ModelError::MalformedInput(format!("unknown strand '{}'", s))),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}
