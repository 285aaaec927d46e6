//! Splits the SNP panel into its autosomal and sex-linked subsets. The
//! autosomal subset drives variant calling and fingerprint content; the
//! sex-linked subset feeds the sex consistency check.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use snpprint_core::models::{Locus, Panel};
use snpprint_core::utils::is_fresh;

///
/// Write `<stem>.autosomal.bed` and `<stem>.sex.bed` into the work
/// directory, preserving panel order within each subset. Both files are
/// reused when newer than the panel source file.
///
pub fn split_panel(panel: &Panel, work_dir: &Path) -> Result<(PathBuf, PathBuf)> {
    let source = panel
        .path
        .as_deref()
        .context("Panel has no backing file to split")?;
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "panel".to_string());

    let autosomal_bed = work_dir.join(format!("{}.autosomal.bed", stem));
    let sex_bed = work_dir.join(format!("{}.sex.bed", stem));

    if is_fresh(&autosomal_bed, &[source])? && is_fresh(&sex_bed, &[source])? {
        return Ok((autosomal_bed, sex_bed));
    }

    write_subset(&autosomal_bed, panel.autosomal())?;
    write_subset(&sex_bed, panel.sex_linked())?;

    Ok((autosomal_bed, sex_bed))
}

fn write_subset<'a>(path: &Path, loci: impl Iterator<Item = &'a Locus>) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    for locus in loci {
        writeln!(out, "{}", locus.as_bed_line())?;
    }
    out.flush()?;
    Ok(())
}
