//! Per-sample VarDict dispatch: runs the external caller in pileup debug
//! mode against the autosomal panel, then converts its raw table to VCF
//! through the strand-bias and validation filters, keeping only header lines
//! and records tagged `TYPE=SNV` or `TYPE=REF`.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use anyhow::{Context, Result, ensure};

use snpprint_core::models::SampleRef;
use snpprint_core::utils::{add_suffix, is_fresh};

use crate::config::CallerConfig;

/// Resolved external tool locations for one pipeline run.
#[derive(Debug, Clone)]
pub struct CallerTools {
    vardict_dir: PathBuf,
    samtools: PathBuf,
}

impl CallerTools {
    ///
    /// Resolve tool paths up front. A missing caller is a configuration
    /// error, not a per-sample data error, so this runs once before any job
    /// is dispatched.
    ///
    pub fn resolve(config: &CallerConfig) -> Result<Self> {
        let vardict_dir = config.resolve_vardict_dir()?;
        let samtools = config
            .samtools
            .clone()
            .unwrap_or_else(|| PathBuf::from("samtools"));
        Ok(Self {
            vardict_dir,
            samtools,
        })
    }

    ///
    /// Index the alignment file if no index exists yet. VarDict requires an
    /// indexed BAM for pileup.
    ///
    pub fn ensure_bam_index(&self, bam: &Path) -> Result<()> {
        let mut sibling = bam.as_os_str().to_owned();
        sibling.push(".bai");
        if PathBuf::from(sibling).is_file() || bam.with_extension("bai").is_file() {
            return Ok(());
        }

        let status = Command::new(&self.samtools)
            .arg("index")
            .arg(bam)
            .status()
            .with_context(|| format!("Failed to run samtools index on {}", bam.display()))?;
        ensure!(
            status.success(),
            "samtools index exited with {} for {}",
            status,
            bam.display()
        );
        Ok(())
    }

    ///
    /// Run the pileup job for one sample. Writes the raw VarDict table to
    /// `<vcf_dir>/<name>_vars.txt` and the converted VCF to
    /// `<vcf_dir>/<name>.vcf`, and returns the VCF path.
    ///
    /// The job is skip-if-reusable: when the raw table is newer than both the
    /// BAM and the panel, and the VCF is newer than the raw table, the cached
    /// VCF path is returned without invoking anything.
    ///
    pub fn pileup_sample(
        &self,
        sample: &SampleRef,
        vcf_dir: &Path,
        reference: &Path,
        panel_bed: &Path,
        threads: usize,
    ) -> Result<PathBuf> {
        let raw = vcf_dir.join(format!("{}_vars.txt", sample.name));
        let vcf = vcf_dir.join(format!("{}.vcf", sample.name));

        if is_fresh(&raw, &[sample.bam.as_path(), panel_bed])?
            && is_fresh(&vcf, &[raw.as_path()])?
        {
            return Ok(vcf);
        }

        self.ensure_bam_index(&sample.bam)?;

        let raw_out = File::create(&raw)
            .with_context(|| format!("Failed to create {}", raw.display()))?;
        let status = Command::new(self.vardict_dir.join("vardict.pl"))
            .arg("-G")
            .arg(reference)
            .arg("-N")
            .arg(&sample.name)
            .arg("-b")
            .arg(&sample.bam)
            .arg("-th")
            .arg(threads.max(1).to_string())
            .arg("-p")
            .arg("-D")
            .arg(panel_bed)
            .stdout(Stdio::from(raw_out))
            .status()
            .with_context(|| format!("Failed to run vardict.pl for sample {}", sample.name))?;
        ensure!(
            status.success(),
            "vardict.pl exited with {} for sample {}",
            status,
            sample.name
        );

        self.convert_to_vcf(&raw, &vcf, &sample.name)?;
        Ok(vcf)
    }

    ///
    /// `cut -f-34 <raw> | teststrandbias.R | var2vcf_valid.pl`, filtered
    /// in-process down to header lines and `TYPE=SNV` / `TYPE=REF` records.
    ///
    /// The filtered output reaches the final path only after every stage has
    /// exited cleanly; a failed conversion must not leave an artifact the
    /// next run's freshness check would serve from cache.
    ///
    fn convert_to_vcf(&self, raw: &Path, vcf: &Path, sample: &str) -> Result<()> {
        let tmp = add_suffix(vcf, "part");
        if let Err(e) = self.run_conversion(raw, &tmp, sample) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        fs::rename(&tmp, vcf).with_context(|| {
            format!("Failed to replace {} with {}", vcf.display(), tmp.display())
        })?;
        Ok(())
    }

    fn run_conversion(&self, raw: &Path, out_path: &Path, sample: &str) -> Result<()> {
        let raw_in = File::open(raw)
            .with_context(|| format!("Failed to open {}", raw.display()))?;

        let mut cut = Command::new("cut")
            .arg("-f-34")
            .stdin(Stdio::from(raw_in))
            .stdout(Stdio::piped())
            .spawn()
            .context("Failed to spawn cut")?;
        let cut_out = cut.stdout.take().context("cut stdout unavailable")?;

        let mut bias = Command::new(self.vardict_dir.join("teststrandbias.R"))
            .stdin(Stdio::from(cut_out))
            .stdout(Stdio::piped())
            .spawn()
            .context("Failed to spawn teststrandbias.R")?;
        let bias_out = bias
            .stdout
            .take()
            .context("teststrandbias.R stdout unavailable")?;

        let mut convert = Command::new(self.vardict_dir.join("var2vcf_valid.pl"))
            .stdin(Stdio::from(bias_out))
            .stdout(Stdio::piped())
            .spawn()
            .context("Failed to spawn var2vcf_valid.pl")?;
        let convert_out = convert
            .stdout
            .take()
            .context("var2vcf_valid.pl stdout unavailable")?;

        let out_file = File::create(out_path)
            .with_context(|| format!("Failed to create {}", out_path.display()))?;
        let mut out = BufWriter::new(out_file);
        for line in BufReader::new(convert_out).lines() {
            let line = line?;
            if line.starts_with('#') || line.contains("TYPE=SNV") || line.contains("TYPE=REF") {
                writeln!(out, "{}", line)?;
            }
        }
        out.flush()?;

        let stages: [(&str, &mut Child); 3] = [
            ("cut", &mut cut),
            ("teststrandbias.R", &mut bias),
            ("var2vcf_valid.pl", &mut convert),
        ];
        for (name, child) in stages {
            let status = child
                .wait()
                .with_context(|| format!("Failed waiting for {}", name))?;
            ensure!(
                status.success(),
                "{} exited with {} while converting output for sample {}",
                name,
                status,
                sample
            );
        }
        Ok(())
    }
}
