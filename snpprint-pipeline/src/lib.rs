//! # Snpprint: SNP Fingerprint Extraction Pipeline
//!
//! Turns sequencing alignments (BAM files) for a cohort of samples into
//! compact, fixed-length genetic fingerprints over a curated panel of SNP
//! loci, suitable for sample-identity verification and relatedness
//! comparison.
//!
//! ## Overview
//!
//! The pipeline splits the SNP panel by chromosome class, dispatches
//! per-sample VarDict pileup jobs in parallel, repairs and annotates the
//! resulting VCF records, encodes each autosomal locus into a canonical
//! two-character genotype code under depth/filter masking policy, merges
//! per-sample sequences into one cohort FASTA, and cross-checks each
//! sample's inferred sex against the sex-linked panel subset.
//!
//! The run either fully succeeds (cohort fingerprint file plus per-sample
//! sex calls) or fails with a diagnostic naming the sample and stage; a
//! partial cohort file is never produced, since a missing sample would break
//! the fixed fingerprint length shared by the whole cohort.
//!
//! ## Module Structure
//!
//! - [`config`] - Parallelism, caller tool resolution, genome registry
//! - [`panel`] - Autosomal / sex-linked panel splitting
//! - [`caller`] - VarDict dispatch and VCF conversion per sample
//! - [`vcf`] - Typed variant record model with round-trip serialization
//! - [`repair`] - Normalization of malformed pileup no-call records
//! - [`annotate`] - Gene symbol / rsID annotation by panel position
//! - [`encode`] - Genotype encoding into fingerprint sequences
//! - [`merge`] - Cohort fingerprint concatenation
//! - [`sex`] - Average-depth statistic and the sex determination boundary
//! - [`pipeline`] - The `genotype` orchestration entry point

pub mod annotate;
pub mod caller;
pub mod config;
pub mod consts;
pub mod encode;
pub mod merge;
pub mod panel;
pub mod pipeline;
pub mod repair;
pub mod sex;
pub mod vcf;

pub use config::{CallerConfig, GenomeAssets, GenomeRegistry, ParallelConfig, PipelineConfig, StaticRegistry};
pub use pipeline::{genotype, GenotypeOutput};
pub use sex::{SexContext, SexDeterminer};
