use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail, ensure};
use fxhash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::consts::DEPTH_CUTOFF;

// ============================================================================
// Parallelism
// ============================================================================

/// Bounds for the dispatcher worker pool: one variant-calling job per sample,
/// at most `jobs` running at once, each allowed `threads_per_job` caller
/// threads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParallelConfig {
    #[serde(default = "default_jobs")]
    pub jobs: usize,
    #[serde(default = "default_threads_per_job")]
    pub threads_per_job: usize,
}

fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn default_threads_per_job() -> usize {
    1
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            threads_per_job: default_threads_per_job(),
        }
    }
}

// ============================================================================
// Caller tool resolution
// ============================================================================

/// Where to find the VarDict scripts and samtools.
///
/// Resolution is an explicit, enumerated order instead of branching on the
/// ambient execution environment: an explicit directory override wins, then
/// any configured known install directory that actually contains
/// `vardict.pl`, then a `PATH` search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallerConfig {
    /// Explicit VarDict install directory; takes precedence over everything.
    #[serde(default)]
    pub vardict_dir: Option<PathBuf>,
    /// Site-specific install directories to probe, in order.
    #[serde(default)]
    pub known_dirs: Vec<PathBuf>,
    /// samtools binary used for on-demand BAM indexing; defaults to `samtools`
    /// on `PATH`.
    #[serde(default)]
    pub samtools: Option<PathBuf>,
}

impl CallerConfig {
    /// Resolve the directory holding `vardict.pl`, `teststrandbias.R` and
    /// `var2vcf_valid.pl`. A missing tool is a configuration error that
    /// aborts the whole run.
    pub fn resolve_vardict_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.vardict_dir {
            ensure!(
                dir.join("vardict.pl").is_file(),
                "vardict.pl not found in configured directory {}",
                dir.display()
            );
            return Ok(dir.clone());
        }

        for dir in &self.known_dirs {
            if dir.join("vardict.pl").is_file() {
                return Ok(dir.clone());
            }
        }

        if let Some(found) = find_in_path("vardict.pl") {
            if let Some(parent) = found.parent() {
                return Ok(parent.to_path_buf());
            }
        }

        bail!("vardict.pl is not in PATH and no install directory is configured")
    }
}

/// Search `PATH` for an executable file with the given name.
fn find_in_path(name: &str) -> Option<PathBuf> {
    let path = env::var_os("PATH")?;
    env::split_paths(&path)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// Pipeline configuration
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub parallel: ParallelConfig,
    #[serde(default)]
    pub caller: CallerConfig,
    #[serde(default = "default_depth_cutoff")]
    pub depth_cutoff: u32,
}

fn default_depth_cutoff() -> u32 {
    DEPTH_CUTOFF
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallel: ParallelConfig::default(),
            caller: CallerConfig::default(),
            depth_cutoff: DEPTH_CUTOFF,
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

// ============================================================================
// Genome registry
// ============================================================================

/// Reference assets resolved for one genome build.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenomeAssets {
    pub reference_fasta: PathBuf,
}

/// External collaborator boundary: resolves a genome build identifier to its
/// reference assets.
pub trait GenomeRegistry {
    fn resolve(&self, build: &str) -> Result<GenomeAssets>;
}

/// In-memory registry mapping build identifiers to reference paths.
#[derive(Debug, Clone, Default)]
pub struct StaticRegistry {
    assets: FxHashMap<String, GenomeAssets>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reference(mut self, build: impl Into<String>, fasta: impl Into<PathBuf>) -> Self {
        self.assets.insert(
            build.into(),
            GenomeAssets {
                reference_fasta: fasta.into(),
            },
        );
        self
    }
}

impl GenomeRegistry for StaticRegistry {
    fn resolve(&self, build: &str) -> Result<GenomeAssets> {
        self.assets
            .get(build)
            .cloned()
            .with_context(|| format!("Unknown genome build: {}", build))
    }
}
