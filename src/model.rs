//! Simulation data types.

use anyhow::{Result, bail};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Point in the unit square.
pub type Point = [f64; 2];

/// Fixed underlying type of an agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Solidarist,
    Mercenary,
    Learner,
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Archetype::Solidarist => f.write_str("solidarist"),
            Archetype::Mercenary => f.write_str("mercenary"),
            Archetype::Learner => f.write_str("learner"),
        }
    }
}

/// Attitude an agent currently expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attitude {
    Solidarist,
    Mercenary,
}

impl fmt::Display for Attitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attitude::Solidarist => f.write_str("solidarist"),
            Attitude::Mercenary => f.write_str("mercenary"),
        }
    }
}

/// Agent of the simulation.
///
/// Non-learners express their archetype forever; learners start out
/// mercenary and may switch once per step.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    id: usize,
    archetype: Archetype,
    attitude: Attitude,
    n_stable: u32,
    pos: Point,
}

impl Agent {
    /// Create a new agent with a given archetype at a given position.
    pub fn new(id: usize, archetype: Archetype, pos: Point) -> Self {
        let attitude = match archetype {
            Archetype::Solidarist => Attitude::Solidarist,
            Archetype::Mercenary | Archetype::Learner => Attitude::Mercenary,
        };
        Self {
            id,
            archetype,
            attitude,
            n_stable: 0,
            pos,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn archetype(&self) -> Archetype {
        self.archetype
    }

    pub fn is_learner(&self) -> bool {
        self.archetype == Archetype::Learner
    }

    pub fn attitude(&self) -> Attitude {
        self.attitude
    }

    /// Number of consecutive updates without an attitude change.
    pub fn n_stable(&self) -> u32 {
        self.n_stable
    }

    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Label used when rendering: `learner-<attitude>` for learners,
    /// the plain attitude otherwise.
    pub fn display_label(&self) -> String {
        match self.archetype() {
            Archetype::Learner => format!("learner-{}", self.attitude),
            Archetype::Solidarist | Archetype::Mercenary => self.attitude.to_string(),
        }
    }

    /// Adopt an attitude after an update, returning whether it changed.
    ///
    /// Non-learners keep their attitude and are left untouched.
    pub fn adopt(&mut self, attitude: Attitude) -> bool {
        if !self.is_learner() {
            return false;
        }
        if attitude != self.attitude {
            self.attitude = attitude;
            self.n_stable = 0;
            true
        } else {
            self.n_stable += 1;
            false
        }
    }

    /// Shift the agent by `delta`, clamping each coordinate into `[0, 1]`.
    pub fn displace(&mut self, delta: Point) {
        for (coord, d) in self.pos.iter_mut().zip(delta) {
            *coord = (*coord + d).clamp(0.0, 1.0);
        }
    }
}

/// Ordered archetype blocks of a population, e.g.
/// `[["solidarist", 10], ["mercenary", 30], ["learner", 60]]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mix(pub Vec<(Archetype, usize)>);

impl Mix {
    pub fn total(&self) -> usize {
        self.0.iter().map(|&(_, count)| count).sum()
    }

    /// Compact label such as `solidarist10_mercenary30_learner60`.
    pub fn label(&self) -> String {
        self.0
            .iter()
            .map(|(archetype, count)| format!("{archetype}{count}"))
            .collect::<Vec<_>>()
            .join("_")
    }
}

/// Learner attitude counts at the end of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Tally {
    pub n_solidarist: usize,
    pub n_mercenary: usize,
}

/// Arena of agents keyed by id.
///
/// Agent `i` is stored at index `i`; agents are never added or removed
/// once the population is built.
#[derive(Debug, Clone)]
pub struct Population {
    agt_vec: Vec<Agent>,
}

impl Population {
    /// Create a population of `n_agents` from a mix of archetype blocks.
    ///
    /// All positions are drawn first, uniformly over the unit square, then
    /// consecutive id ranges are assigned to each block in mix order.
    ///
    /// # Errors
    /// Returns an error if the mix holds more agents than `n_agents`.
    pub fn new<R: Rng>(n_agents: usize, mix: &Mix, rng: &mut R) -> Result<Self> {
        let total = mix.total();
        if total > n_agents {
            bail!("mix holds {total} agents, but population size is {n_agents}");
        }
        if total < n_agents {
            log::warn!("mix holds {total} agents, ids {total}..{n_agents} stay unfilled");
        }

        let pos_vec: Vec<Point> = (0..n_agents)
            .map(|_| [rng.random::<f64>(), rng.random::<f64>()])
            .collect();

        let mut agt_vec = Vec::with_capacity(total);
        for &(archetype, count) in &mix.0 {
            for _ in 0..count {
                let id = agt_vec.len();
                agt_vec.push(Agent::new(id, archetype, pos_vec[id]));
            }
        }

        Ok(Self { agt_vec })
    }

    /// Build a population from agents whose ids are `0..len`.
    #[cfg(test)]
    pub fn from_agents(agt_vec: Vec<Agent>) -> Result<Self> {
        for (idx, agt) in agt_vec.iter().enumerate() {
            if agt.id() != idx {
                bail!("agent at index {idx} has id {}", agt.id());
            }
        }
        Ok(Self { agt_vec })
    }

    pub fn get(&self, id: usize) -> Option<&Agent> {
        self.agt_vec.get(id)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agt_vec
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agt_vec
    }

    pub fn positions(&self) -> Vec<Point> {
        self.agt_vec.iter().map(Agent::pos).collect()
    }

    /// Count learners by the attitude they currently express.
    pub fn tally(&self) -> Tally {
        let mut tally = Tally::default();
        for agt in self.agt_vec.iter().filter(|agt| agt.is_learner()) {
            match agt.attitude() {
                Attitude::Solidarist => tally.n_solidarist += 1,
                Attitude::Mercenary => tally.n_mercenary += 1,
            }
        }
        tally
    }
}
