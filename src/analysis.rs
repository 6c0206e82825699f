use crate::export::{read_rows, write_rows};
use crate::stats::Accumulator;
use crate::sweep::ResultRow;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Aggregate statistics of every repetition of one configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub mix: String,
    pub radius: f64,
    pub incubation_period: u32,
    pub n_reps: usize,
    pub solidarist_mean: f64,
    pub solidarist_std_dev: f64,
    pub mercenary_mean: f64,
    pub mercenary_std_dev: f64,
}

struct Group {
    mix: String,
    radius: f64,
    incubation_period: u32,
    solidarist: Accumulator,
    mercenary: Accumulator,
}

impl Group {
    fn matches(&self, row: &ResultRow) -> bool {
        self.mix == row.mix
            && self.radius == row.radius
            && self.incubation_period == row.incubation_period
    }
}

/// Groups result rows by configuration, in first-seen order.
pub struct Analyzer {
    groups: Vec<Group>,
}

impl Analyzer {
    pub fn new() -> Self {
        Self { groups: Vec::new() }
    }

    pub fn add_row(&mut self, row: &ResultRow) {
        let i_group = match self.groups.iter().position(|group| group.matches(row)) {
            Some(i_group) => i_group,
            None => {
                self.groups.push(Group {
                    mix: row.mix.clone(),
                    radius: row.radius,
                    incubation_period: row.incubation_period,
                    solidarist: Accumulator::new(),
                    mercenary: Accumulator::new(),
                });
                self.groups.len() - 1
            }
        };

        let group = &mut self.groups[i_group];
        group.solidarist.add(row.n_solidarist as f64);
        group.mercenary.add(row.n_mercenary as f64);
    }

    pub fn add_file<P: AsRef<Path>>(&mut self, file: P) -> Result<()> {
        let rows: Vec<ResultRow> = read_rows(file).context("failed to read result rows")?;
        for row in &rows {
            self.add_row(row);
        }
        Ok(())
    }

    pub fn report(&self) -> Vec<SummaryRow> {
        self.groups
            .iter()
            .map(|group| {
                let solidarist = group.solidarist.report();
                let mercenary = group.mercenary.report();
                SummaryRow {
                    mix: group.mix.clone(),
                    radius: group.radius,
                    incubation_period: group.incubation_period,
                    n_reps: group.solidarist.n_vals(),
                    solidarist_mean: solidarist.mean,
                    solidarist_std_dev: solidarist.std_dev,
                    mercenary_mean: mercenary.mean,
                    mercenary_std_dev: mercenary.std_dev,
                }
            })
            .collect()
    }

    pub fn save_results<P: AsRef<Path>>(&self, file: P) -> Result<()> {
        write_rows(&self.report(), file).context("failed to write summary rows")
    }
}
