use std::fs::{self, File};
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result, bail, ensure};

use snpprint_core::utils::{add_suffix, count_lines, get_dynamic_reader};

// ============================================================================
// Record Model
// ============================================================================

/// One INFO entry. The value is kept verbatim (including sentinel values like
/// `NA` or `.`) so fields this pipeline does not interpret round-trip
/// byte-exactly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InfoField {
    pub key: String,
    pub value: Option<String>,
}

/// One variant record of a VCF file.
///
/// The fields this pipeline interprets (position, alleles, FILTER, `DP`, the
/// sample `GT`) are typed; everything else is carried opaquely so a parsed
/// and re-serialized record is identical to its source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantRecord {
    pub chrom: String,
    pub pos: u32,
    pub id: String,
    pub ref_allele: String,
    pub alt_allele: String,
    pub qual: String,
    pub filters: Vec<String>,
    pub info: Vec<InfoField>,
    pub format: Option<String>,
    pub samples: Vec<String>,
}

impl VariantRecord {
    pub fn parse(line: &str) -> Result<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        ensure!(
            fields.len() >= 8,
            "VCF record has {} fields, expected at least 8: {}",
            fields.len(),
            line
        );

        let pos = fields[1]
            .parse()
            .with_context(|| format!("Invalid POS field in VCF record: {}", line))?;

        Ok(Self {
            chrom: fields[0].to_string(),
            pos,
            id: fields[2].to_string(),
            ref_allele: fields[3].to_string(),
            alt_allele: fields[4].to_string(),
            qual: fields[5].to_string(),
            filters: fields[6].split(';').map(str::to_string).collect(),
            info: parse_info(fields[7]),
            format: fields.get(8).map(|s| s.to_string()),
            samples: fields
                .get(9..)
                .map(|rest| rest.iter().map(|s| s.to_string()).collect())
                .unwrap_or_default(),
        })
    }

    pub fn to_line(&self) -> String {
        let info = self
            .info
            .iter()
            .map(|f| match &f.value {
                Some(v) => format!("{}={}", f.key, v),
                None => f.key.clone(),
            })
            .collect::<Vec<_>>()
            .join(";");

        let mut fields = vec![
            self.chrom.clone(),
            self.pos.to_string(),
            self.id.clone(),
            self.ref_allele.clone(),
            self.alt_allele.clone(),
            self.qual.clone(),
            self.filters.join(";"),
            info,
        ];
        if let Some(format) = &self.format {
            fields.push(format.clone());
            fields.extend(self.samples.iter().cloned());
        }
        fields.join("\t")
    }

    /// Total depth from the INFO `DP` field, if present and numeric.
    pub fn depth(&self) -> Option<u32> {
        self.info
            .iter()
            .find(|f| f.key == "DP")
            .and_then(|f| f.value.as_deref())
            .and_then(|v| v.parse().ok())
    }

    /// Set an INFO value, replacing an existing entry or appending a new one.
    pub fn set_info(&mut self, key: &str, value: &str) {
        match self.info.iter_mut().find(|f| f.key == key) {
            Some(field) => field.value = Some(value.to_string()),
            None => self.info.push(InfoField {
                key: key.to_string(),
                value: Some(value.to_string()),
            }),
        }
    }

    /// Whether this is a pileup no-call record (empty or `.` reference).
    pub fn is_no_call(&self) -> bool {
        self.ref_allele.is_empty() || self.ref_allele == "."
    }

    /// The two called allele bases of the first sample, resolved through the
    /// REF/ALT columns. `None` when the genotype is missing or either allele
    /// cannot be resolved to a base.
    pub fn genotype_bases(&self) -> Option<(String, String)> {
        let format = self.format.as_deref()?;
        let sample = self.samples.first()?;
        let gt_index = format.split(':').position(|key| key == "GT")?;
        let gt = sample.split(':').nth(gt_index)?;
        if gt.contains('.') {
            return None;
        }
        let mut alleles = gt.split(['/', '|']);
        let a = self.allele_base(alleles.next()?)?;
        let b = self.allele_base(alleles.next()?)?;
        Some((a, b))
    }

    fn allele_base(&self, index: &str) -> Option<String> {
        let index: usize = index.parse().ok()?;
        let base = if index == 0 {
            self.ref_allele.as_str()
        } else {
            self.alt_allele.split(',').nth(index - 1)?
        };
        if base.is_empty() || base == "." {
            return None;
        }
        Some(base.to_string())
    }
}

fn parse_info(raw: &str) -> Vec<InfoField> {
    raw.split(';')
        .map(|entry| match entry.split_once('=') {
            Some((key, value)) => InfoField {
                key: key.to_string(),
                value: Some(value.to_string()),
            },
            None => InfoField {
                key: entry.to_string(),
                value: None,
            },
        })
        .collect()
}

// ============================================================================
// File Model
// ============================================================================

#[derive(Debug, Clone)]
pub enum VcfLine {
    Header(String),
    Record(VariantRecord),
}

/// A VCF file held fully in memory, headers and records in original order.
#[derive(Debug, Clone)]
pub struct VcfFile {
    pub lines: Vec<VcfLine>,
}

impl VcfFile {
    pub fn read(path: &Path) -> Result<Self> {
        let reader = get_dynamic_reader(path)?;
        let mut lines = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.starts_with('#') {
                lines.push(VcfLine::Header(line));
            } else {
                let record = VariantRecord::parse(&line)
                    .with_context(|| format!("{}:{}", path.display(), idx + 1))?;
                lines.push(VcfLine::Record(record));
            }
        }
        Ok(Self { lines })
    }

    pub fn write_to(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut out = BufWriter::new(file);
        for line in &self.lines {
            match line {
                VcfLine::Header(header) => writeln!(out, "{}", header)?,
                VcfLine::Record(record) => writeln!(out, "{}", record.to_line())?,
            }
        }
        out.flush()?;
        Ok(())
    }

    pub fn records(&self) -> impl Iterator<Item = &VariantRecord> {
        self.lines.iter().filter_map(|line| match line {
            VcfLine::Record(record) => Some(record),
            VcfLine::Header(_) => None,
        })
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

///
/// Parse a VCF, apply a per-record transformation, serialize to a suffixed
/// sibling file, and atomically replace the original once the record-count
/// integrity check passes.
///
/// A line-count mismatch between input and output is a fatal integrity
/// violation: it signals the transformation diverged from the caller's
/// output format, and the pipeline must not silently lose or duplicate
/// records.
///
pub fn rewrite_in_place<F>(path: &Path, suffix: &str, mut transform: F) -> Result<()>
where
    F: FnMut(&mut VariantRecord) -> Result<()>,
{
    let mut vcf = VcfFile::read(path)?;
    let expected = vcf.line_count();

    for line in vcf.lines.iter_mut() {
        if let VcfLine::Record(record) = line {
            transform(record)?;
        }
    }

    let tmp = add_suffix(path, suffix);
    vcf.write_to(&tmp)?;

    let written = count_lines(&tmp)?;
    if written != expected {
        let _ = fs::remove_file(&tmp);
        bail!(
            "Record count changed while rewriting {}: {} lines in, {} lines out",
            path.display(),
            expected,
            written
        );
    }

    fs::rename(&tmp, path)
        .with_context(|| format!("Failed to replace {} with {}", path.display(), tmp.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SNV_LINE: &str = "chr1\t100\t.\tC\tT\t228\tPASS\tSAMPLE=S1;TYPE=SNV;DP=30;AF=0.5\tGT:DP:VD\t0/1:30:15";

    #[test]
    fn test_parse_serialize_roundtrip() {
        let record = VariantRecord::parse(SNV_LINE).unwrap();
        assert_eq!(record.to_line(), SNV_LINE);
    }

    #[test]
    fn test_roundtrip_preserves_no_call_artifacts() {
        // Pileup-debug no-call line: empty REF/ALT, NA and empty INFO values.
        let line = "chr1\t200\t.\t\t\t0\tPASS\tSAMPLE=S1;TYPE=REF;DP=0;SN=NA;HICOV=\tGT\t./.";
        let record = VariantRecord::parse(line).unwrap();
        assert!(record.is_no_call());
        assert_eq!(record.to_line(), line);
    }

    #[test]
    fn test_depth_accessor() {
        let record = VariantRecord::parse(SNV_LINE).unwrap();
        assert_eq!(record.depth(), Some(30));

        let no_dp = "chr1\t100\t.\tC\tT\t228\tPASS\tTYPE=SNV;DP=.\tGT\t0/1";
        let record = VariantRecord::parse(no_dp).unwrap();
        assert_eq!(record.depth(), None);
    }

    #[test]
    fn test_genotype_bases_resolution() {
        let record = VariantRecord::parse(SNV_LINE).unwrap();
        assert_eq!(
            record.genotype_bases(),
            Some(("C".to_string(), "T".to_string()))
        );

        let hom_alt = "chr1\t100\t.\tC\tT\t228\tPASS\tTYPE=SNV;DP=30\tGT\t1/1";
        let record = VariantRecord::parse(hom_alt).unwrap();
        assert_eq!(
            record.genotype_bases(),
            Some(("T".to_string(), "T".to_string()))
        );

        let uncalled = "chr1\t100\t.\tC\tT\t0\tPASS\tTYPE=REF;DP=0\tGT\t./.";
        let record = VariantRecord::parse(uncalled).unwrap();
        assert_eq!(record.genotype_bases(), None);
    }

    #[test]
    fn test_set_info_replaces_or_appends() {
        let mut record = VariantRecord::parse(SNV_LINE).unwrap();
        record.set_info("GENE", "GENEA");
        assert!(record.to_line().ends_with("AF=0.5;GENE=GENEA\tGT:DP:VD\t0/1:30:15"));
        record.set_info("GENE", "GENEB");
        let line = record.to_line();
        assert!(line.contains("GENE=GENEB"));
        assert!(!line.contains("GENE=GENEA"));
    }

    #[test]
    fn test_short_record_is_fatal() {
        assert!(VariantRecord::parse("chr1\t100\t.\tC\tT").is_err());
    }

    #[test]
    fn test_integrity_failure_leaves_no_temp_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("S1.vcf");
        std::fs::write(&path, format!("{}\n", SNV_LINE)).unwrap();

        // A transform that smuggles a newline into a field breaks the
        // line-count contract.
        let err = rewrite_in_place(&path, "fixed", |record| {
            record.id = "rs1\nrs2".to_string();
            Ok(())
        })
        .unwrap_err();

        assert!(err.to_string().contains("lines out"));
        assert!(!add_suffix(&path, "fixed").exists());
        // The original file is untouched.
        assert_eq!(std::fs::read_to_string(&path).unwrap(), format!("{}\n", SNV_LINE));
    }
}
