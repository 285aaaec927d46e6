//! Sex consistency checking. This module computes the average call depth
//! statistic and hands it, with the sex-linked panel subset, to an external
//! sex determination collaborator. It never decides sex itself and never
//! overrides the collaborator's result.

use std::path::Path;

use anyhow::{Result, ensure};

use snpprint_core::models::SexCall;

use crate::vcf::VcfFile;

///
/// Average total depth (`DP`) across all of a sample's variant records.
/// Every queried locus contributes to the denominator; a record with a
/// missing or non-numeric `DP` contributes zero depth. An empty record set
/// is fatal: there is nothing to average.
///
pub fn average_depth(vcf_path: &Path) -> Result<f64> {
    let vcf = VcfFile::read(vcf_path)?;
    let mut total: u64 = 0;
    let mut count: usize = 0;
    for record in vcf.records() {
        total += u64::from(record.depth().unwrap_or(0));
        count += 1;
    }
    ensure!(
        count > 0,
        "No variant records to average depth over in {}",
        vcf_path.display()
    );
    Ok(total as f64 / count as f64)
}

/// Input contract for the external sex determination collaborator.
#[derive(Debug, Clone)]
pub struct SexContext<'a> {
    pub work_dir: &'a Path,
    pub bam: &'a Path,
    pub average_depth: f64,
    pub genome_build: &'a str,
    pub sex_panel: &'a Path,
    pub min_male_loci: usize,
}

/// External collaborator boundary: determines a sample's sex from coverage
/// over the sex-linked panel subset.
pub trait SexDeterminer {
    fn determine_sex(&self, ctx: &SexContext) -> Result<SexCall>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_average_depth() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("S1.vcf");
        fs::write(
            &path,
            "##fileformat=VCFv4.2\n\
             chr1\t100\trs1\tC\tT\t228\tPASS\tTYPE=SNV;DP=30\tGT\t0/1\n\
             chr1\t200\trs2\t.\t.\t0\tPASS\tTYPE=REF;DP=.\tGT\t./.\n\
             chr1\t300\trs3\tG\t.\t228\tPASS\tTYPE=REF;DP=15\tGT\t0/0\n",
        )
        .unwrap();

        // Missing DP counts as zero depth but still contributes a record.
        assert_eq!(average_depth(&path).unwrap(), 15.0);
    }

    #[test]
    fn test_average_depth_without_records_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("S1.vcf");
        fs::write(&path, "##fileformat=VCFv4.2\n").unwrap();
        assert!(average_depth(&path).is_err());
    }
}
