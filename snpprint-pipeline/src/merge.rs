//! Concatenates per-sample fingerprint FASTA files, in input sample order,
//! into the cohort fingerprint file consumed by downstream comparison.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use snpprint_core::utils::is_fresh;

///
/// Merge fingerprints into the cohort file. Skipped entirely when the cohort
/// file is already newer than every constituent fingerprint, so an unchanged
/// re-run performs no recomputation.
///
pub fn merge_fingerprints(fastas: &[PathBuf], cohort: &Path) -> Result<PathBuf> {
    let sources: Vec<&Path> = fastas.iter().map(|p| p.as_path()).collect();
    if is_fresh(cohort, &sources)? {
        return Ok(cohort.to_path_buf());
    }

    let file = File::create(cohort)
        .with_context(|| format!("Failed to create {}", cohort.display()))?;
    let mut out = BufWriter::new(file);
    for fasta in fastas {
        let mut input = File::open(fasta)
            .with_context(|| format!("Failed to open fingerprint {}", fasta.display()))?;
        io::copy(&mut input, &mut out)?;
    }
    out.flush()?;

    Ok(cohort.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::thread::sleep;
    use std::time::Duration;
    use tempfile::TempDir;

    fn write_fasta(dir: &TempDir, name: &str, seq: &str) -> PathBuf {
        let path = dir.path().join(format!("{}.fasta", name));
        fs::write(&path, format!(">{}\n{}\n", name, seq)).unwrap();
        path
    }

    #[test]
    fn test_merge_preserves_sample_order() {
        let dir = TempDir::new().unwrap();
        let s2 = write_fasta(&dir, "S2", "NNCT");
        let s1 = write_fasta(&dir, "S1", "CTGG");
        let cohort = dir.path().join("fingerprints.fasta");

        merge_fingerprints(&[s1, s2], &cohort).unwrap();

        assert_eq!(
            fs::read_to_string(&cohort).unwrap(),
            ">S1\nCTGG\n>S2\nNNCT\n"
        );
    }

    #[test]
    fn test_merge_is_idempotent_without_recomputation() {
        let dir = TempDir::new().unwrap();
        let s1 = write_fasta(&dir, "S1", "CT");
        let cohort = dir.path().join("fingerprints.fasta");

        sleep(Duration::from_millis(50));
        merge_fingerprints(&[s1.clone()], &cohort).unwrap();
        let content_before = fs::read_to_string(&cohort).unwrap();
        let mtime_before = fs::metadata(&cohort).unwrap().modified().unwrap();

        sleep(Duration::from_millis(50));
        merge_fingerprints(&[s1], &cohort).unwrap();

        assert_eq!(fs::read_to_string(&cohort).unwrap(), content_before);
        let mtime_after = fs::metadata(&cohort).unwrap().modified().unwrap();
        assert_eq!(mtime_before, mtime_after);
    }

    #[test]
    fn test_changed_fingerprint_triggers_rebuild() {
        let dir = TempDir::new().unwrap();
        let s1 = write_fasta(&dir, "S1", "CT");
        let cohort = dir.path().join("fingerprints.fasta");
        merge_fingerprints(&[s1.clone()], &cohort).unwrap();

        sleep(Duration::from_millis(50));
        fs::write(&s1, ">S1\nGG\n").unwrap();
        merge_fingerprints(&[s1], &cohort).unwrap();

        assert_eq!(fs::read_to_string(&cohort).unwrap(), ">S1\nGG\n");
    }
}
