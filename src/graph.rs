use crate::model::Point;

/// Undirected proximity graph over agent ids.
///
/// Every id `0..n_nodes` is a node, isolated or not. Rebuilt from scratch
/// each step; no edge survives from the previous one.
#[derive(Debug, Clone, PartialEq)]
pub struct ProximityGraph {
    adj_vec: Vec<Vec<usize>>,
}

impl ProximityGraph {
    /// Connect every pair of points whose distance lies strictly between
    /// 0 and `radius`.
    ///
    /// A non-positive radius yields only isolated nodes.
    pub fn build(pos_vec: &[Point], radius: f64) -> Self {
        let n_nodes = pos_vec.len();
        let mut adj_vec = vec![Vec::new(); n_nodes];

        for i in 0..n_nodes {
            for j in (i + 1)..n_nodes {
                let dist = distance(pos_vec[i], pos_vec[j]);
                if dist > 0.0 && dist < radius {
                    adj_vec[i].push(j);
                    adj_vec[j].push(i);
                }
            }
        }

        Self { adj_vec }
    }

    pub fn n_nodes(&self) -> usize {
        self.adj_vec.len()
    }

    pub fn n_edges(&self) -> usize {
        self.adj_vec.iter().map(Vec::len).sum::<usize>() / 2
    }

    /// Neighbors of `id` in ascending order; empty for isolated or unknown ids.
    pub fn neighbors(&self, id: usize) -> &[usize] {
        self.adj_vec.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Each edge once, as `(i, j)` with `i < j`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.adj_vec.iter().enumerate().flat_map(|(i, adj)| {
            adj.iter()
                .copied()
                .filter(move |&j| i < j)
                .map(move |j| (i, j))
        })
    }
}

fn distance(a: Point, b: Point) -> f64 {
    (a[0] - b[0]).hypot(a[1] - b[1])
}
