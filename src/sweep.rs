use crate::config::{Config, ModelConfig, SweepConfig};
use crate::engine::Engine;
use crate::model::{Mix, Tally};
use crate::snapshot::SnapshotSink;
use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};

/// One point of the sweep grid.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepPoint {
    /// Position in the sweep enumeration; selects the random stream.
    pub idx: usize,
    pub mix: Mix,
    pub radius: f64,
    pub incubation_period: u32,
    /// Repetition index, used as the run identifier.
    pub rep: usize,
}

/// Outcome of a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRow {
    pub mix: String,
    pub radius: f64,
    pub incubation_period: u32,
    pub rep: usize,
    #[serde(rename = "learner-solidarist")]
    pub n_solidarist: usize,
    #[serde(rename = "learner-mercenary")]
    pub n_mercenary: usize,
}

impl ResultRow {
    pub fn new(point: &SweepPoint, tally: Tally) -> Self {
        Self {
            mix: point.mix.label(),
            radius: point.radius,
            incubation_period: point.incubation_period,
            rep: point.rep,
            n_solidarist: tally.n_solidarist,
            n_mercenary: tally.n_mercenary,
        }
    }
}

/// Enumerate the grid in nested order: mix, radius, incubation period,
/// repetition.
pub fn sweep_points(sweep: &SweepConfig) -> impl Iterator<Item = SweepPoint> + '_ {
    sweep
        .mixes
        .iter()
        .flat_map(move |mix| {
            sweep.radii.iter().flat_map(move |&radius| {
                sweep.incubation_periods.iter().flat_map(move |&period| {
                    (0..sweep.n_reps).map(move |rep| (mix, radius, period, rep))
                })
            })
        })
        .enumerate()
        .map(|(idx, (mix, radius, incubation_period, rep))| SweepPoint {
            idx,
            mix: mix.clone(),
            radius,
            incubation_period,
            rep,
        })
}

/// Simulate a single sweep point from scratch.
pub fn run_point(
    model: &ModelConfig,
    point: &SweepPoint,
    seed: u64,
    sink: &dyn SnapshotSink,
) -> Result<ResultRow> {
    let mut engine = Engine::generate_initial_condition(model.clone(), point.clone(), seed)
        .context("failed to generate initial condition")?;

    let tally = engine
        .perform_simulation(sink)
        .context("failed to perform simulation")?;

    let n_stable_max = engine
        .population()
        .agents()
        .iter()
        .filter(|agt| agt.is_learner())
        .map(|agt| agt.n_stable())
        .max()
        .unwrap_or(0);
    log::debug!("{point:?} finished with {tally:?}, longest stable streak {n_stable_max}");

    Ok(ResultRow::new(point, tally))
}

/// Run every point of the sweep and collect one row per point, in
/// enumeration order.
///
/// Runs share no state and are spread over the rayon thread pool.
pub fn perform_sweep(
    cfg: &Config,
    seed: u64,
    sink: &(dyn SnapshotSink + Sync),
) -> Result<Vec<ResultRow>> {
    let points: Vec<_> = sweep_points(&cfg.sweep).collect();
    let n_runs = points.len();
    let n_done = AtomicUsize::new(0);

    points
        .par_iter()
        .map(|point| -> Result<ResultRow> {
            let row = run_point(&cfg.model, point, seed, sink)
                .with_context(|| format!("failed to run {point:?}"))?;

            let n_done = n_done.fetch_add(1, Ordering::Relaxed) + 1;
            let progress = 100.0 * n_done as f64 / n_runs as f64;
            log::info!("completed {progress:06.2}%");

            Ok(row)
        })
        .collect()
}
