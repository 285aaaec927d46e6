//! Attaches panel metadata to caller output: every variant record gets the
//! gene symbol as a `GENE` INFO entry and its ID overwritten with the panel
//! rsID, looked up by exact `(chromosome, position)` match.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fxhash::FxHashMap;

use snpprint_core::models::Locus;

use crate::vcf::rewrite_in_place;

///
/// Annotate a sample's VCF in place from the panel loci.
///
/// A lookup miss is fatal: the caller emitted a variant outside the requested
/// panel, which signals a panel/version mismatch the pipeline must not
/// tolerate. The annotated file atomically replaces the original after the
/// record-count integrity check.
///
pub fn annotate_vcf(path: &Path, panel: &[Locus]) -> Result<PathBuf> {
    let by_pos: FxHashMap<(&str, u32), (&str, &str)> = panel
        .iter()
        .map(|locus| {
            (
                (locus.chrom.as_str(), locus.pos()),
                (locus.rs_id.as_str(), locus.gene.as_str()),
            )
        })
        .collect();

    rewrite_in_place(path, "ann", |record| {
        let (rs_id, gene) = by_pos
            .get(&(record.chrom.as_str(), record.pos))
            .with_context(|| {
                format!(
                    "Variant {}:{} in {} does not match any panel locus",
                    record.chrom,
                    record.pos,
                    path.display()
                )
            })?;
        record.id = rs_id.to_string();
        record.set_info("GENE", gene);
        Ok(())
    })?;
    Ok(path.to_path_buf())
}
