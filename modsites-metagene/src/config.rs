use std::fs::read_to_string;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::annotate::AnnotateOptions;
use crate::errors::ModSitesError;
use crate::metagene::{ProfileOptions, Smoothing};

///
/// Settings for one comparison run, usually read from a TOML file.
///
/// Every field is optional in the file; missing fields take their defaults.
///
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub n_bins: usize,
    pub smoothing_window: usize,
    pub smoothing: Smoothing,
    /// Co-occurrence window in bases.
    pub window: u32,
    pub min_score: Option<f64>,
    pub max_sites: Option<usize>,
    pub seed: u64,
    /// Enrichment universe. Falls back to the total exonic length of the transcripts.
    pub universe_size: Option<u64>,
    pub stranded: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        let profile = ProfileOptions::default();
        RunConfig {
            n_bins: profile.n_bins,
            smoothing_window: profile.smoothing_window,
            smoothing: profile.smoothing,
            window: 50,
            min_score: None,
            max_sites: None,
            seed: 42,
            universe_size: None,
            stranded: false,
        }
    }
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), ModSitesError> {
        self.profile_options().validate()?;
        if self.universe_size == Some(0) {
            return Err(ModSitesError::InvalidConfig(
                "universe_size must be positive".to_string(),
            ));
        }
        match self.min_score {
            Some(min_score) if !min_score.is_finite() => Err(ModSitesError::InvalidConfig(
                format!("min_score must be finite, got {}", min_score),
            )),
            _ => Ok(()),
        }
    }

    pub fn profile_options(&self) -> ProfileOptions {
        ProfileOptions {
            n_bins: self.n_bins,
            smoothing_window: self.smoothing_window,
            smoothing: self.smoothing,
        }
    }

    pub fn annotate_options(&self) -> AnnotateOptions {
        AnnotateOptions {
            stranded: self.stranded,
        }
    }
}

impl TryFrom<&Path> for RunConfig {
    type Error = ModSitesError;

    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let toml_str = read_to_string(path)?;
        let config: RunConfig = toml::from_str(&toml_str)?;
        config.validate()?;
        Ok(config)
    }
}
