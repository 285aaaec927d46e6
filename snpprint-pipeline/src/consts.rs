/// Minimum total depth for a locus to be called; records strictly below the
/// cutoff are masked to `NN`.
pub const DEPTH_CUTOFF: u32 = 5;

/// Sentinel genotype code for uncalled or masked loci.
pub const NO_CALL: &str = "NN";

/// FILTER tags that disqualify a call regardless of depth.
pub const DISQUALIFYING_FILTERS: [&str; 2] = ["MSI12", "InGap"];

/// Minimum number of sex-linked loci required for a male call by the sex
/// determination collaborator.
pub const MIN_MALE_LOCI: usize = 1;

/// Name of the cohort fingerprint file written to the output directory.
pub const COHORT_FASTA: &str = "fingerprints.fasta";
