//! Normalization of the malformed no-call records VarDict emits in pileup
//! debug mode: empty REF/ALT alleles become the explicit `.` no-call symbol,
//! and empty or `NA` INFO values on those records become `.`.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::vcf::rewrite_in_place;

///
/// Repair a converted VarDict VCF in place. Well-formed records pass through
/// unchanged; the repaired file atomically replaces the original after the
/// record-count integrity check.
///
pub fn repair_vcf(path: &Path) -> Result<PathBuf> {
    rewrite_in_place(path, "fixed", |record| {
        if record.is_no_call() {
            record.ref_allele = ".".to_string();
            record.alt_allele = ".".to_string();
            for field in record.info.iter_mut() {
                if matches!(field.value.as_deref(), Some("") | Some("NA")) {
                    field.value = Some(".".to_string());
                }
            }
        }
        Ok(())
    })?;
    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use snpprint_core::utils::count_lines;
    use std::fs;
    use tempfile::TempDir;

    const HEADER: &str = "##fileformat=VCFv4.2\n#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tS1\n";

    fn write_vcf(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("S1.vcf");
        fs::write(&path, format!("{}{}", HEADER, body)).unwrap();
        path
    }

    #[test]
    fn test_no_call_record_is_normalized() {
        let dir = TempDir::new().unwrap();
        let path = write_vcf(
            &dir,
            "chr1\t200\t.\t\t\t0\tPASS\tSAMPLE=S1;TYPE=REF;DP=0;SN=NA;HICOV=\tGT\t./.\n",
        );

        repair_vcf(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            format!(
                "{}chr1\t200\t.\t.\t.\t0\tPASS\tSAMPLE=S1;TYPE=REF;DP=0;SN=.;HICOV=.\tGT\t./.\n",
                HEADER
            )
        );
    }

    #[test]
    fn test_called_record_passes_through() {
        let dir = TempDir::new().unwrap();
        let body = "chr1\t100\t.\tC\tT\t228\tPASS\tSAMPLE=S1;TYPE=SNV;DP=30;SN=NA\tGT\t0/1\n";
        let path = write_vcf(&dir, body);

        repair_vcf(&path).unwrap();

        // NA values are only rewritten on no-call records.
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, format!("{}{}", HEADER, body));
    }

    #[test]
    fn test_line_count_preserved() {
        let dir = TempDir::new().unwrap();
        let path = write_vcf(
            &dir,
            "chr1\t100\t.\tC\tT\t228\tPASS\tTYPE=SNV;DP=30\tGT\t0/1\n\
             chr1\t200\t.\t\t\t0\tPASS\tTYPE=REF;DP=0;SN=NA\tGT\t./.\n",
        );
        let before = count_lines(&path).unwrap();

        repair_vcf(&path).unwrap();

        assert_eq!(count_lines(&path).unwrap(), before);
    }

    #[test]
    fn test_repair_is_idempotent() {
        let dir = TempDir::new().unwrap();
        let path = write_vcf(
            &dir,
            "chr1\t200\t.\t\t\t0\tPASS\tTYPE=REF;DP=0;SN=NA;HICOV=\tGT\t./.\n",
        );

        repair_vcf(&path).unwrap();
        let first = fs::read_to_string(&path).unwrap();
        repair_vcf(&path).unwrap();
        let second = fs::read_to_string(&path).unwrap();

        assert_eq!(first, second);
    }
}
