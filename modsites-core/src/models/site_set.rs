use std::io::BufRead;
use std::path::{Path, PathBuf};

use crate::errors::ModelError;
use crate::models::{Site, Strand};
use crate::utils::{ChromStyle, get_dynamic_reader, normalize_chrom_name};

///
/// SiteSet struct, the representation of a BED6 file of modification sites.
///
/// Columns are `chrom start end name score strand`. Only the first three are
/// required: a missing name becomes `chrom:start-end`, a missing or `.` score
/// becomes 0, a missing strand becomes unstranded.
///
#[derive(Clone, Debug, Default)]
pub struct SiteSet {
    pub sites: Vec<Site>,
    pub header: Option<String>,
    pub path: Option<PathBuf>,
}

impl TryFrom<&Path> for SiteSet {
    type Error = ModelError;

    ///
    /// Create a new [SiteSet] from a bed file.
    ///
    /// # Arguments:
    /// - value: path to bed file on disk.
    fn try_from(value: &Path) -> Result<Self, ModelError> {
        let reader = get_dynamic_reader(value)?;
        let source_name = value.display().to_string();

        let mut sites: Vec<Site> = Vec::new();
        let mut header = String::new();
        let mut first_line = true;

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = i + 1;

            if line.trim().is_empty() {
                continue;
            }

            if line.starts_with("browser") | line.starts_with("track") | line.starts_with('#') {
                header.push_str(&line);
                first_line = false;
                continue;
            }

            // column header like `chrom start end ...` without '#'
            if first_line {
                first_line = false;
                let second = line.split('\t').nth(1);
                if second.is_some_and(|s| s.parse::<u32>().is_err()) {
                    header.push_str(&line);
                    continue;
                }
            }

            let site = parse_bed6_line(&line).map_err(|reason| ModelError::MalformedLine {
                source_name: source_name.clone(),
                line: line_number,
                reason,
            })?;
            sites.push(site);
        }

        if sites.is_empty() {
            return Err(ModelError::EmptySiteSet(source_name));
        }

        Ok(SiteSet {
            sites,
            header: match header.is_empty() {
                true => None,
                false => Some(header),
            },
            path: Some(value.to_owned()),
        })
    }
}

impl TryFrom<&str> for SiteSet {
    type Error = ModelError;

    fn try_from(value: &str) -> Result<Self, ModelError> {
        SiteSet::try_from(Path::new(value))
    }
}

impl TryFrom<PathBuf> for SiteSet {
    type Error = ModelError;

    fn try_from(value: PathBuf) -> Result<Self, ModelError> {
        SiteSet::try_from(value.as_path())
    }
}

impl From<Vec<Site>> for SiteSet {
    fn from(sites: Vec<Site>) -> Self {
        SiteSet {
            sites,
            header: None,
            path: None,
        }
    }
}

impl<'a> IntoIterator for &'a SiteSet {
    type Item = &'a Site;
    type IntoIter = std::slice::Iter<'a, Site>;

    fn into_iter(self) -> Self::IntoIter {
        self.sites.iter()
    }
}

impl SiteSet {
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Site> {
        self.sites.iter()
    }

    /// Consume the set, renaming every chromosome to one convention.
    pub fn normalize_chroms(self, style: ChromStyle) -> SiteSet {
        let sites = self
            .sites
            .iter()
            .map(|s| s.with_chr(normalize_chrom_name(s.chr(), style)))
            .collect();
        SiteSet { sites, ..self }
    }
}

fn parse_bed6_line(line: &str) -> Result<Site, String> {
    let fields: Vec<&str> = line.split('\t').collect();
    if fields.len() < 3 {
        return Err(format!("expected at least 3 columns, found {}", fields.len()));
    }

    let chr = fields[0];
    let start: u32 = fields[1]
        .parse()
        .map_err(|_| format!("cannot parse start position '{}'", fields[1]))?;
    let end: u32 = fields[2]
        .parse()
        .map_err(|_| format!("cannot parse end position '{}'", fields[2]))?;

    let id = match fields.get(3) {
        Some(name) if !name.is_empty() && *name != "." => name.to_string(),
        _ => format!("{}:{}-{}", chr, start, end),
    };

    let score = match fields.get(4) {
        Some(s) if !s.is_empty() && *s != "." => s
            .parse::<f64>()
            .map_err(|_| format!("cannot parse score '{}'", s))?,
        _ => 0.0,
    };

    let strand = match fields.get(5) {
        Some(s) if !s.is_empty() => s.parse::<Strand>().map_err(|e| e.to_string())?,
        _ => Strand::Unstranded,
    };

    Site::new(id, chr, start, end, strand, score).map_err(|e| e.to_string())
}
