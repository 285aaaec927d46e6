//! Encodes a sample's annotated variant records into its fingerprint: one
//! canonical two-character genotype code per autosomal panel locus, in panel
//! order, with depth/filter masking resolving to the `NN` sentinel.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fxhash::FxHashMap;

use snpprint_core::models::{ChromosomeClass, Locus};
use snpprint_core::utils::is_fresh;

use crate::consts::{DISQUALIFYING_FILTERS, NO_CALL};
use crate::vcf::{VariantRecord, VcfFile};

///
/// Genotype code for one variant record under masking policy.
///
/// Returns `None` for sex-linked chromosomes: X heterozygosity depends on the
/// sample's sex, so those records are excluded from fingerprint content
/// rather than masked. Otherwise the code is the two called allele bases in
/// sorted order, or `NN` when the record fails the depth cutoff (strictly
/// below), carries a disqualifying FILTER tag, or has no called genotype.
///
pub fn genotype_code(record: &VariantRecord, depth_cutoff: u32) -> Option<String> {
    if ChromosomeClass::of(&record.chrom) == ChromosomeClass::SexLinked {
        return None;
    }

    let depth_ok = record.depth().is_some_and(|dp| dp >= depth_cutoff);
    let filters_ok = !record
        .filters
        .iter()
        .any(|f| DISQUALIFYING_FILTERS.contains(&f.as_str()));

    let code = match record.genotype_bases() {
        Some((a, b)) if depth_ok && filters_ok => {
            let (first, second) = if a <= b { (a, b) } else { (b, a) };
            format!("{}{}", first, second)
        }
        _ => NO_CALL.to_string(),
    };
    Some(code)
}

///
/// Build the fingerprint sequence for one sample by enumerating the autosomal
/// panel loci in panel order. A locus the caller produced no record for at
/// all encodes to `NN`, so every fingerprint in the cohort has length equal
/// to the autosomal panel size.
///
pub fn encode_records(
    autosomal: &[Locus],
    records: &[&VariantRecord],
    depth_cutoff: u32,
) -> String {
    let by_pos: FxHashMap<(&str, u32), &VariantRecord> = records
        .iter()
        .map(|r| ((r.chrom.as_str(), r.pos), *r))
        .collect();

    let mut seq = String::with_capacity(autosomal.len() * 2);
    for locus in autosomal {
        let code = by_pos
            .get(&(locus.chrom.as_str(), locus.pos()))
            .and_then(|record| genotype_code(record, depth_cutoff))
            .unwrap_or_else(|| NO_CALL.to_string());
        seq.push_str(&code);
    }
    seq
}

///
/// Encode one sample's VCF into a single-record FASTA fingerprint file,
/// reusing an existing fingerprint that is newer than its source VCF.
///
pub fn vcf_to_fingerprint(
    sample_name: &str,
    vcf_path: &Path,
    fasta_path: &Path,
    autosomal: &[Locus],
    depth_cutoff: u32,
) -> Result<PathBuf> {
    if is_fresh(fasta_path, &[vcf_path])? {
        return Ok(fasta_path.to_path_buf());
    }

    let vcf = VcfFile::read(vcf_path)?;
    let records: Vec<&VariantRecord> = vcf.records().collect();
    let seq = encode_records(autosomal, &records, depth_cutoff);

    let file = File::create(fasta_path)
        .with_context(|| format!("Failed to create {}", fasta_path.display()))?;
    let mut out = BufWriter::new(file);
    writeln!(out, ">{}", sample_name)?;
    writeln!(out, "{}", seq)?;
    out.flush()?;

    Ok(fasta_path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DEPTH_CUTOFF;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn record(line: &str) -> VariantRecord {
        VariantRecord::parse(line).unwrap()
    }

    fn locus(chrom: &str, start: u32) -> Locus {
        Locus {
            chrom: chrom.to_string(),
            start,
            end: start + 1,
            rs_id: format!("rs{}", start),
            gene: "GENE".to_string(),
        }
    }

    #[test]
    fn test_heterozygous_call_is_canonically_sorted() {
        // REF=T ALT=C yields gt bases (T, C); the code must still be CT.
        let rec = record("chr1\t100\trs1\tT\tC\t228\tPASS\tTYPE=SNV;DP=30\tGT\t0/1");
        assert_eq!(genotype_code(&rec, DEPTH_CUTOFF), Some("CT".to_string()));
    }

    #[rstest]
    #[case(5, Some("CT".to_string()))] // boundary: DP == cutoff passes
    #[case(30, Some("CT".to_string()))]
    #[case(4, Some(NO_CALL.to_string()))] // strictly below cutoff masks
    #[case(0, Some(NO_CALL.to_string()))]
    fn test_depth_cutoff_boundary(#[case] dp: u32, #[case] expected: Option<String>) {
        let rec = record(&format!(
            "chr1\t100\trs1\tC\tT\t228\tPASS\tTYPE=SNV;DP={}\tGT\t0/1",
            dp
        ));
        assert_eq!(genotype_code(&rec, 5), expected);
    }

    #[rstest]
    #[case("InGap")]
    #[case("MSI12")]
    #[case("PASS;InGap")]
    fn test_disqualifying_filter_masks_call(#[case] filter: &str) {
        let rec = record(&format!(
            "chr1\t100\trs1\tC\tT\t228\t{}\tTYPE=SNV;DP=30\tGT\t0/1",
            filter
        ));
        assert_eq!(genotype_code(&rec, DEPTH_CUTOFF), Some(NO_CALL.to_string()));
    }

    #[test]
    fn test_other_filters_do_not_mask() {
        let rec = record("chr1\t100\trs1\tC\tT\t228\tQ10\tTYPE=SNV;DP=30\tGT\t0/1");
        assert_eq!(genotype_code(&rec, DEPTH_CUTOFF), Some("CT".to_string()));
    }

    #[test]
    fn test_sex_linked_record_is_excluded() {
        let rec = record("chrX\t200\trs2\tA\tA\t228\tPASS\tTYPE=REF;DP=20\tGT\t0/0");
        assert_eq!(genotype_code(&rec, DEPTH_CUTOFF), None);
    }

    #[test]
    fn test_missing_depth_masks_call() {
        let rec = record("chr1\t100\trs1\tC\tT\t228\tPASS\tTYPE=SNV;DP=.\tGT\t0/1");
        assert_eq!(genotype_code(&rec, DEPTH_CUTOFF), Some(NO_CALL.to_string()));
    }

    #[test]
    fn test_fingerprint_length_equals_autosomal_panel_size() {
        let autosomal = [locus("chr1", 99), locus("chr2", 199), locus("chr3", 299)];
        let rec = record("chr1\t100\trs99\tC\tT\t228\tPASS\tTYPE=SNV;DP=30\tGT\t0/1");

        // Records exist for one locus only; the other slots become NN.
        let seq = encode_records(&autosomal, &[&rec], DEPTH_CUTOFF);
        assert_eq!(seq, "CTNNNN");
        assert_eq!(seq.len(), autosomal.len() * 2);
    }

    #[test]
    fn test_hom_ref_call() {
        let rec = record("chr1\t100\trs1\tG\t.\t228\tPASS\tTYPE=REF;DP=25\tGT\t0/0");
        assert_eq!(genotype_code(&rec, DEPTH_CUTOFF), Some("GG".to_string()));
    }
}
