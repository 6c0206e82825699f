use crate::graph::ProximityGraph;
use crate::model::{Agent, Point, Population};
use crate::sweep::SweepPoint;
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::path::{Path, PathBuf};

/// State of a run at a designated step.
pub struct Snapshot<'a> {
    pub point: &'a SweepPoint,
    pub step: usize,
    pub graph: &'a ProximityGraph,
    pub pop: &'a Population,
}

impl Snapshot<'_> {
    /// File name derived from the run parameters, e.g.
    /// `snapshot_r0.05_inc1_solidarist10_mercenary30_learner60_run0_step49`.
    pub fn file_stem(&self) -> String {
        format!(
            "snapshot_r{}_inc{}_{}_run{}_step{}",
            self.point.radius,
            self.point.incubation_period,
            self.point.mix.label(),
            self.point.rep,
            self.step
        )
    }
}

/// Consumer of run snapshots.
///
/// Called once the state for the step is final; it must not (and cannot)
/// modify the run.
pub trait SnapshotSink {
    fn capture(&self, snap: &Snapshot) -> Result<()>;
}

/// Sink that discards every snapshot.
pub struct NoSnapshots;

impl SnapshotSink for NoSnapshots {
    fn capture(&self, _snap: &Snapshot) -> Result<()> {
        Ok(())
    }
}

/// Sink that renders each snapshot as an SVG network plot.
pub struct SvgSnapshots {
    dir: PathBuf,
}

const IMG_SIZE: u32 = 800;
const IMG_MARGIN: i32 = 40;
const NODE_SIZE: i32 = 4;

impl SvgSnapshots {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn file(&self, snap: &Snapshot) -> PathBuf {
        self.dir.join(format!("{}.svg", snap.file_stem()))
    }
}

impl SnapshotSink for SvgSnapshots {
    fn capture(&self, snap: &Snapshot) -> Result<()> {
        let file = self.file(snap);
        render(snap, &file).with_context(|| format!("failed to render {file:?}"))?;
        log::debug!("wrote {file:?}");
        Ok(())
    }
}

fn render(snap: &Snapshot, file: &Path) -> Result<()> {
    let root = SVGBackend::new(file, (IMG_SIZE, IMG_SIZE)).into_drawing_area();
    root.fill(&WHITE)?;

    let span = (IMG_SIZE as i32 - 2 * IMG_MARGIN) as f64;
    let to_px = |pos: Point| -> (i32, i32) {
        (
            IMG_MARGIN + (pos[0] * span).round() as i32,
            IMG_MARGIN + ((1.0 - pos[1]) * span).round() as i32,
        )
    };

    let agt_vec = snap.pop.agents();
    let edge_style = BLACK.mix(0.3).stroke_width(1);
    for (i, j) in snap.graph.edges() {
        let (Some(a), Some(b)) = (agt_vec.get(i), agt_vec.get(j)) else {
            continue;
        };
        root.draw(&PathElement::new(
            vec![to_px(a.pos()), to_px(b.pos())],
            edge_style,
        ))?;
    }

    for agt in agt_vec {
        root.draw(&Circle::new(
            to_px(agt.pos()),
            NODE_SIZE,
            node_color(agt).filled(),
        ))?;
    }

    let title = format!("Run {} - Step {}", snap.point.rep, snap.step);
    root.draw(&Text::new(
        title,
        (IMG_MARGIN, IMG_MARGIN / 3),
        ("sans-serif", 20).into_font(),
    ))?;

    root.present()?;

    Ok(())
}

const PURPLE: RGBColor = RGBColor(128, 0, 128);
const GRAY: RGBColor = RGBColor(128, 128, 128);

fn node_color(agt: &Agent) -> RGBColor {
    match agt.display_label().as_str() {
        "solidarist" => RED,
        "mercenary" => BLUE,
        "learner-solidarist" => YELLOW,
        "learner-mercenary" => PURPLE,
        _ => GRAY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Archetype, Attitude, Mix};
    use std::{env, fs};

    fn point() -> SweepPoint {
        SweepPoint {
            idx: 0,
            mix: Mix(vec![(Archetype::Solidarist, 1), (Archetype::Learner, 2)]),
            radius: 0.5,
            incubation_period: 1,
            rep: 3,
        }
    }

    fn pop() -> Population {
        Population::from_agents(vec![
            Agent::new(0, Archetype::Solidarist, [0.1, 0.1]),
            Agent::new(1, Archetype::Learner, [0.2, 0.2]),
            Agent::new(2, Archetype::Learner, [0.9, 0.9]),
        ])
        .unwrap()
    }

    #[test]
    fn file_stem_encodes_parameters() {
        let point = point();
        let pop = pop();
        let graph = ProximityGraph::build(&pop.positions(), point.radius);
        let snap = Snapshot {
            point: &point,
            step: 49,
            graph: &graph,
            pop: &pop,
        };
        assert_eq!(
            snap.file_stem(),
            "snapshot_r0.5_inc1_solidarist1_learner2_run3_step49"
        );
    }

    #[test]
    fn colors_follow_display_labels() {
        let mut learner = Agent::new(0, Archetype::Learner, [0.0, 0.0]);
        assert_eq!(node_color(&learner).rgb(), PURPLE.rgb());
        learner.adopt(Attitude::Solidarist);
        assert_eq!(node_color(&learner).rgb(), YELLOW.rgb());
        let mercenary = Agent::new(1, Archetype::Mercenary, [0.0, 0.0]);
        assert_eq!(node_color(&mercenary).rgb(), BLUE.rgb());
    }

    #[test]
    fn svg_snapshot_is_written() {
        let dir = env::temp_dir().join("sodalis_svg_snapshot");
        fs::remove_dir_all(&dir).ok();
        fs::create_dir_all(&dir).unwrap();

        let point = point();
        let pop = pop();
        let graph = ProximityGraph::build(&pop.positions(), point.radius);
        let snap = Snapshot {
            point: &point,
            step: 0,
            graph: &graph,
            pop: &pop,
        };
        let sink = SvgSnapshots::new(&dir);
        sink.capture(&snap).unwrap();

        let contents = fs::read_to_string(sink.file(&snap)).unwrap();
        assert!(contents.contains("<svg"));
        assert!(contents.contains("<circle"));

        fs::remove_dir_all(&dir).ok();
    }
}
