use crate::analysis::Analyzer;
use crate::config::Config;
use crate::export::write_rows;
use crate::snapshot::{NoSnapshots, SnapshotSink, SvgSnapshots};
use crate::sweep::perform_sweep;
use anyhow::{Context, Result};
use glob::glob;
use rand::prelude::*;
use std::{
    fs,
    path::{Path, PathBuf},
};

pub struct Manager {
    sim_dir: PathBuf,
    cfg: Config,
}

impl Manager {
    pub fn new<P: AsRef<Path>>(sim_dir: P) -> Result<Self> {
        let sim_dir = sim_dir.as_ref().to_path_buf();

        let cfg =
            Config::from_file(sim_dir.join("config.toml")).context("failed to construct cfg")?;
        log::info!("{cfg:#?}");

        Ok(Self { sim_dir, cfg })
    }

    pub fn run_sweep(&self) -> Result<()> {
        let seed = match self.cfg.sweep.seed {
            Some(seed) => seed,
            None => rand::rng().random(),
        };
        log::info!("running {} runs with seed {seed}", self.cfg.n_runs());

        let svg_sink;
        let sink: &(dyn SnapshotSink + Sync) = if self.cfg.output.snapshots {
            let snapshot_dir = self.snapshot_dir();
            fs::create_dir_all(&snapshot_dir)
                .with_context(|| format!("failed to create {snapshot_dir:?}"))?;
            svg_sink = SvgSnapshots::new(snapshot_dir);
            &svg_sink
        } else {
            &NoSnapshots
        };

        let rows = perform_sweep(&self.cfg, seed, sink).context("failed to perform sweep")?;

        let results_file = self.results_file();
        write_rows(&rows, &results_file)
            .with_context(|| format!("failed to write {results_file:?}"))?;
        log::info!("wrote {results_file:?}");

        Ok(())
    }

    pub fn analyze_sweep(&self) -> Result<()> {
        let mut analyzer = Analyzer::new();

        let results_file = self.results_file();
        analyzer
            .add_file(&results_file)
            .with_context(|| format!("failed to add {results_file:?}"))?;

        let summary_file = self.summary_file();
        analyzer
            .save_results(&summary_file)
            .with_context(|| format!("failed to save {summary_file:?}"))?;
        log::info!("wrote {summary_file:?}");

        Ok(())
    }

    pub fn clean_sweep(&self) -> Result<()> {
        for file in [self.results_file(), self.summary_file()] {
            if file.exists() {
                fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
                log::info!("removed {file:?}");
            }
        }

        let snapshot_dir = self.snapshot_dir();
        if !snapshot_dir.is_dir() {
            return Ok(());
        }

        let pattern = snapshot_dir.join("snapshot_*.svg");
        let pattern = pattern.to_str().context("pattern is not valid UTF-8")?;
        let mut n_removed = 0;
        for file in glob(pattern)
            .context("failed to glob snapshot files")?
            .filter_map(Result::ok)
        {
            fs::remove_file(&file).with_context(|| format!("failed to remove {file:?}"))?;
            n_removed += 1;
        }
        log::info!("removed {n_removed} snapshots");

        if fs::read_dir(&snapshot_dir)?.next().is_none() {
            fs::remove_dir(&snapshot_dir)
                .with_context(|| format!("failed to remove {snapshot_dir:?}"))?;
        }

        Ok(())
    }

    fn results_file(&self) -> PathBuf {
        self.sim_dir.join("results.csv")
    }

    fn summary_file(&self) -> PathBuf {
        self.sim_dir.join("summary.csv")
    }

    fn snapshot_dir(&self) -> PathBuf {
        self.sim_dir.join("snapshots")
    }
}
