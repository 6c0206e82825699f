use crate::model::Mix;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::{fmt::Debug, fs, ops::RangeBounds, path::Path};

/// Sweep configuration parameters.
///
/// Loaded from a TOML file and validated before use.
/// See [`Config::from_file`] for loading.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Config {
    pub model: ModelConfig,
    pub sweep: SweepConfig,
    pub output: OutputConfig,
}

/// Parameters shared by every run of the sweep.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Number of agents.
    pub n_agents: usize,
    /// Number of steps per run.
    pub n_steps: usize,
    /// Standard deviation of the movement noise per coordinate.
    pub std_dev_move: f64,
}

/// Axes of the sweep grid.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct SweepConfig {
    /// Population mixes, each an ordered list of archetype blocks.
    pub mixes: Vec<Mix>,
    /// Interaction radii.
    pub radii: Vec<f64>,
    /// Incubation periods (passed through to runs, not used by the rule).
    pub incubation_periods: Vec<u32>,
    /// Number of repetitions per grid point.
    pub n_reps: usize,
    /// Base seed; drawn from the OS when absent.
    pub seed: Option<u64>,
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Render network snapshots at the first, middle and last step.
    pub snapshots: bool,
}

impl Config {
    /// Load a [`Config`] from a file.
    ///
    /// The file must be TOML-encoded and contain a serialized [`Config`].
    /// Performs validation on all parameters before returning.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, deserialized,
    /// or if the configuration values are invalid.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Self> {
        let file = file.as_ref();
        let contents =
            fs::read_to_string(file).with_context(|| format!("failed to read {file:?}"))?;

        Self::from_toml(&contents)
    }

    /// Parse and validate a [`Config`] from TOML text.
    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents).context("failed to deserialize config")?;

        config.validate().context("failed to validate config")?;

        Ok(config)
    }

    /// Total number of runs performed by the sweep.
    pub fn n_runs(&self) -> usize {
        self.sweep.mixes.len()
            * self.sweep.radii.len()
            * self.sweep.incubation_periods.len()
            * self.sweep.n_reps
    }

    fn validate(&self) -> Result<()> {
        check_num(self.model.n_agents, 1..100_000).context("invalid number of agents")?;
        check_num(self.model.n_steps, 1..1_000_000).context("invalid number of steps")?;
        check_num(self.model.std_dev_move, 0.0..1.0)
            .context("invalid movement standard deviation")?;

        check_len(&self.sweep.mixes).context("invalid mixes")?;
        for (i_mix, mix) in self.sweep.mixes.iter().enumerate() {
            check_mix(mix, self.model.n_agents).with_context(|| format!("invalid mix {i_mix}"))?;
        }
        check_unique(&self.sweep.mixes).context("invalid mixes")?;

        check_len(&self.sweep.radii).context("invalid radii")?;
        for &radius in &self.sweep.radii {
            if radius.is_nan() {
                bail!("radius must be a number");
            }
            // Not fatal: such a radius only yields isolated agents.
            if radius <= 0.0 {
                log::warn!("radius {radius} is not positive, agents will never connect");
            }
        }
        check_unique(&self.sweep.radii).context("invalid radii")?;

        check_len(&self.sweep.incubation_periods).context("invalid incubation periods")?;
        for &period in &self.sweep.incubation_periods {
            check_num(period, 1..).context("invalid incubation period")?;
        }
        check_unique(&self.sweep.incubation_periods).context("invalid incubation periods")?;

        check_num(self.sweep.n_reps, 1..10_000).context("invalid number of repetitions")?;

        Ok(())
    }
}

fn check_num<T, R>(num: T, range: R) -> Result<()>
where
    T: PartialOrd + Debug,
    R: RangeBounds<T> + Debug,
{
    if !range.contains(&num) {
        bail!("number must be in the range {range:?}, but is {num:?}");
    }
    Ok(())
}

fn check_len<T>(vec: &[T]) -> Result<()> {
    if vec.is_empty() {
        bail!("list must not be empty");
    }
    Ok(())
}

// Snapshot files are named after the axis values, so a repeated value
// would have two runs write the same file.
fn check_unique<T: PartialEq + Debug>(vec: &[T]) -> Result<()> {
    for (i, val) in vec.iter().enumerate() {
        if vec[..i].contains(val) {
            bail!("list must not repeat values, but {val:?} appears twice");
        }
    }
    Ok(())
}

fn check_mix(mix: &Mix, n_agents: usize) -> Result<()> {
    check_len(&mix.0)?;
    let total = mix.total();
    if total != n_agents {
        bail!("archetype counts must sum to {n_agents}, but sum to {total}");
    }
    Ok(())
}
