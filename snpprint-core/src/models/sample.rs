use std::fmt::{self, Display};
use std::path::PathBuf;

///
/// One cohort sample: a name and the indexed alignment (BAM) file backing it.
/// Immutable input, owned by the pipeline caller.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRef {
    pub name: String,
    pub bam: PathBuf,
}

impl SampleRef {
    pub fn new(name: impl Into<String>, bam: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            bam: bam.into(),
        }
    }
}

///
/// Sex inferred for a sample from coverage over the sex-linked panel subset.
/// Stored alongside the sample, never part of the fingerprint itself.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SexCall {
    Male,
    Female,
    Unknown,
}

impl Display for SexCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SexCall::Male => "male",
            SexCall::Female => "female",
            SexCall::Unknown => "unknown",
        };
        write!(f, "{}", label)
    }
}
