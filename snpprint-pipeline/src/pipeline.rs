//! The `genotype` entry point: orchestrates panel splitting, parallel
//! variant-call dispatch, record repair and annotation, fingerprint encoding
//! and merging, and the per-sample sex consistency check.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, ensure};
use fxhash::FxHashMap;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use snpprint_core::models::{Locus, Panel, SampleRef, SexCall};

use crate::annotate::annotate_vcf;
use crate::caller::CallerTools;
use crate::config::{GenomeRegistry, PipelineConfig};
use crate::consts::{COHORT_FASTA, MIN_MALE_LOCI};
use crate::encode::vcf_to_fingerprint;
use crate::merge::merge_fingerprints;
use crate::panel::split_panel;
use crate::repair::repair_vcf;
use crate::sex::{SexContext, SexDeterminer, average_depth};

/// Everything a pipeline run produces.
#[derive(Debug)]
pub struct GenotypeOutput {
    /// The cohort fingerprint FASTA, one record per sample in input order.
    pub cohort_fasta: PathBuf,
    /// Repaired and annotated VCF per sample.
    pub vcf_by_sample: FxHashMap<String, PathBuf>,
    /// Sex call per sample.
    pub sex_by_sample: FxHashMap<String, SexCall>,
}

///
/// Run the fingerprint extraction pipeline for a cohort.
///
/// Either fully succeeds or fails with a diagnostic naming the sample and
/// stage; no partial cohort file is produced. Re-running against unchanged
/// inputs reuses cached per-sample artifacts instead of re-invoking the
/// external caller.
///
#[allow(clippy::too_many_arguments)]
pub fn genotype(
    samples: &[SampleRef],
    panel_bed: &Path,
    config: &PipelineConfig,
    output_dir: &Path,
    work_dir: &Path,
    genome_build: &str,
    registry: &dyn GenomeRegistry,
    sex_determiner: &(dyn SexDeterminer + Sync),
) -> Result<GenotypeOutput> {
    ensure!(!samples.is_empty(), "No samples to genotype");
    fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create output dir {}", output_dir.display()))?;
    fs::create_dir_all(work_dir)
        .with_context(|| format!("Failed to create work dir {}", work_dir.display()))?;

    let panel = Panel::from_bed(panel_bed)
        .with_context(|| format!("Failed to read SNP panel {}", panel_bed.display()))?;
    let (autosomal_bed, sex_bed) = split_panel(&panel, work_dir)?;
    let autosomal: Vec<Locus> = panel.autosomal().cloned().collect();
    ensure!(
        !autosomal.is_empty(),
        "SNP panel {} has no autosomal loci",
        panel_bed.display()
    );

    // Environment errors surface here, before any job is dispatched.
    let assets = registry.resolve(genome_build)?;
    let tools = CallerTools::resolve(&config.caller)?;

    let vcf_dir = output_dir.join("vcf");
    fs::create_dir_all(&vcf_dir)?;

    // One caller job per sample on a bounded pool; jobs share nothing mutable
    // and results are keyed by sample name, not completion order.
    let pool = ThreadPoolBuilder::new()
        .num_threads(config.parallel.jobs.max(1))
        .build()
        .context("Failed to build dispatcher worker pool")?;

    let progress = ProgressBar::new(samples.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap(),
    );
    progress.set_message("Calling variants");

    let called: Vec<(String, PathBuf)> = pool.install(|| {
        samples
            .par_iter()
            .map(|sample| {
                let vcf = tools
                    .pileup_sample(
                        sample,
                        &vcf_dir,
                        &assets.reference_fasta,
                        &autosomal_bed,
                        config.parallel.threads_per_job,
                    )
                    .with_context(|| {
                        format!("Variant calling failed for sample {}", sample.name)
                    })?;
                progress.inc(1);
                Ok((sample.name.clone(), vcf))
            })
            .collect::<Result<Vec<_>>>()
    })?;
    progress.finish_and_clear();

    let vcf_by_sample: FxHashMap<String, PathBuf> = called.into_iter().collect();

    for sample in samples {
        let vcf = &vcf_by_sample[&sample.name];
        repair_vcf(vcf)
            .with_context(|| format!("Repairing caller output for sample {}", sample.name))?;
        annotate_vcf(vcf, &autosomal)
            .with_context(|| format!("Annotating variants for sample {}", sample.name))?;
    }

    // Fingerprint encoding and the sex check both read the annotated VCFs
    // and are independent of each other.
    let (cohort, sex_by_sample) = rayon::join(
        || -> Result<PathBuf> {
            let fastas = samples
                .iter()
                .map(|sample| {
                    let fasta = work_dir.join(format!("{}.fasta", sample.name));
                    vcf_to_fingerprint(
                        &sample.name,
                        &vcf_by_sample[&sample.name],
                        &fasta,
                        &autosomal,
                        config.depth_cutoff,
                    )
                    .with_context(|| format!("Encoding fingerprint for sample {}", sample.name))
                })
                .collect::<Result<Vec<_>>>()?;
            merge_fingerprints(&fastas, &output_dir.join(COHORT_FASTA))
        },
        || -> Result<FxHashMap<String, SexCall>> {
            samples
                .iter()
                .map(|sample| {
                    let avg_depth = average_depth(&vcf_by_sample[&sample.name])?;
                    let sample_work = work_dir.join(&sample.name);
                    fs::create_dir_all(&sample_work)?;
                    let ctx = SexContext {
                        work_dir: &sample_work,
                        bam: &sample.bam,
                        average_depth: avg_depth,
                        genome_build,
                        sex_panel: &sex_bed,
                        min_male_loci: MIN_MALE_LOCI,
                    };
                    let call = sex_determiner.determine_sex(&ctx).with_context(|| {
                        format!("Sex determination failed for sample {}", sample.name)
                    })?;
                    Ok((sample.name.clone(), call))
                })
                .collect()
        },
    );

    Ok(GenotypeOutput {
        cohort_fasta: cohort?,
        vcf_by_sample,
        sex_by_sample: sex_by_sample?,
    })
}
