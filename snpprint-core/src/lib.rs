//! Core library for snpprint: the SNP panel data model and shared utilities
//! used by the fingerprint extraction pipeline.
//!
//! ## Module Structure
//!
//! - [`models`] - Panel loci, samples and sex calls
//! - [`utils`] - Dynamic readers and freshness checks for cached artifacts
//! - [`errors`] - Typed panel parsing errors

pub mod errors;
pub mod models;
pub mod utils;

pub use models::{ChromosomeClass, Locus, Panel, SampleRef, SexCall};
