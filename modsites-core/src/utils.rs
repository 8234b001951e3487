use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use flate2::read::MultiGzDecoder;

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> std::io::Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).map_err(|e| {
        std::io::Error::new(e.kind(), format!("Failed to open file {:?}: {}", path, e))
    })?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

/// Chromosome naming convention to normalize to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromStyle {
    /// `chr1`, `chrX`, `chrM`
    Ucsc,
    /// `1`, `X`, `MT`
    Ensembl,
}

///
/// Rename a chromosome to the given convention.
///
/// Site sets and annotations often come from sources that disagree on the `chr`
/// prefix; comparing them needs one convention. Mitochondria are mapped between
/// `chrM` and `MT`.
///
pub fn normalize_chrom_name(chr: &str, style: ChromStyle) -> String {
    let bare = chr.strip_prefix("chr").unwrap_or(chr);
    match style {
        ChromStyle::Ucsc => match bare {
            "MT" => "chrM".to_string(),
            _ => format!("chr{}", bare),
        },
        ChromStyle::Ensembl => match bare {
            "M" => "MT".to_string(),
            _ => bare.to_string(),
        },
    }
}
