use std::ffi::OsStr;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path).with_context(|| format!("Failed to open file: {:?}", path))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// Check whether a cached output can be reused: it must exist, be non-empty,
/// and be at least as new as every source it was derived from.
///
/// This is the single freshness check every pipeline stage consults before
/// recomputing an externally-costly artifact. Staleness is never an error;
/// a missing or unreadable source simply means "recompute".
///
/// # Arguments
///
/// - output: the derived artifact
/// - sources: the files the artifact was computed from
///
pub fn is_fresh(output: &Path, sources: &[&Path]) -> Result<bool> {
    let out_meta = match fs::metadata(output) {
        Ok(meta) => meta,
        Err(_) => return Ok(false),
    };
    if out_meta.len() == 0 {
        return Ok(false);
    }
    let out_mtime = out_meta
        .modified()
        .with_context(|| format!("Failed to read mtime of {:?}", output))?;

    for source in sources {
        let src_mtime = match fs::metadata(source).and_then(|m| m.modified()) {
            Ok(mtime) => mtime,
            Err(_) => return Ok(false),
        };
        if src_mtime > out_mtime {
            return Ok(false);
        }
    }

    Ok(true)
}

///
/// Insert a suffix before the final extension: `sample.vcf` + `fixed` becomes
/// `sample.fixed.vcf`.
///
pub fn add_suffix(path: &Path, suffix: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let new_name = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}.{}.{}", stem, suffix, ext),
        None => format!("{}.{}", stem, suffix),
    };
    path.with_file_name(new_name)
}

///
/// Count the lines of a text file, used for record-count integrity checks.
///
pub fn count_lines(path: &Path) -> Result<usize> {
    let reader = get_dynamic_reader(path)?;
    let mut count = 0;
    for line in reader.lines() {
        line?;
        count += 1;
    }
    Ok(count)
}
