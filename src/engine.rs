use crate::config::ModelConfig;
use crate::graph::ProximityGraph;
use crate::model::{Population, Tally};
use crate::rule::update_attitudes;
use crate::snapshot::{Snapshot, SnapshotSink};
use crate::sweep::SweepPoint;
use anyhow::{Context, Result};
use rand::prelude::*;
use rand_chacha::ChaCha12Rng;
use rand_distr::Normal;

/// Simulation engine for a single run.
///
/// Holds the model parameters, the sweep point being simulated, the
/// population and the run's own random number generator.
pub struct Engine {
    model: ModelConfig,
    point: SweepPoint,
    pop: Population,
    rng: ChaCha12Rng,
}

impl Engine {
    /// Create a new `Engine` with a random initial population.
    ///
    /// The generator is seeded with `seed` and switched to the stream of the
    /// sweep point, so every point draws independent numbers and the same
    /// seed always reproduces the same run.
    pub fn generate_initial_condition(
        model: ModelConfig,
        point: SweepPoint,
        seed: u64,
    ) -> Result<Self> {
        let mut rng = ChaCha12Rng::seed_from_u64(seed);
        rng.set_stream(point.idx as u64);

        let pop = Population::new(model.n_agents, &point.mix, &mut rng)
            .context("failed to initialize population")?;

        Ok(Self {
            model,
            point,
            pop,
            rng,
        })
    }

    pub fn population(&self) -> &Population {
        &self.pop
    }

    /// Perform every step of the run and return the final learner tally.
    ///
    /// Snapshots are handed to `sink` at the first, middle and last step,
    /// after that step's update.
    pub fn perform_simulation(&mut self, sink: &dyn SnapshotSink) -> Result<Tally> {
        let n_steps = self.model.n_steps;
        let snapshot_steps = snapshot_steps(n_steps);

        for step in 0..n_steps {
            let graph = self
                .perform_step()
                .with_context(|| format!("failed to perform step {step}"))?;

            if snapshot_steps.contains(&step) {
                let snap = Snapshot {
                    point: &self.point,
                    step,
                    graph: &graph,
                    pop: &self.pop,
                };
                sink.capture(&snap)
                    .with_context(|| format!("failed to capture snapshot at step {step}"))?;
            }
        }

        Ok(self.pop.tally())
    }

    fn perform_step(&mut self) -> Result<ProximityGraph> {
        // Move every agent before looking at who is close to whom.
        self.move_agents().context("failed to move agents")?;

        let graph = ProximityGraph::build(&self.pop.positions(), self.point.radius);

        let n_changed = update_attitudes(&graph, &mut self.pop);
        log::debug!(
            "{} nodes, {} edges, {n_changed} learners changed attitude",
            graph.n_nodes(),
            graph.n_edges()
        );

        Ok(graph)
    }

    fn move_agents(&mut self) -> Result<()> {
        let move_dist = Normal::new(0.0, self.model.std_dev_move)?;
        for agt in self.pop.agents_mut() {
            let delta = [
                move_dist.sample(&mut self.rng),
                move_dist.sample(&mut self.rng),
            ];
            agt.displace(delta);
        }
        Ok(())
    }
}

/// Steps at which a snapshot is taken: first, middle and last.
pub fn snapshot_steps(n_steps: usize) -> [usize; 3] {
    [0, n_steps / 2, n_steps.saturating_sub(1)]
}
