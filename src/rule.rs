use crate::graph::ProximityGraph;
use crate::model::{Attitude, Population};

/// Attitude a learner adopts given its neighbors' attitudes.
///
/// Solidarist only on a strict solidarist majority, mercenary otherwise
/// (ties included). `None` when there are no neighbors.
pub fn majority_attitude<I>(neighbor_attitudes: I) -> Option<Attitude>
where
    I: IntoIterator<Item = Attitude>,
{
    let mut n_total = 0;
    let mut n_solidarist = 0;
    for attitude in neighbor_attitudes {
        n_total += 1;
        if attitude == Attitude::Solidarist {
            n_solidarist += 1;
        }
    }

    if n_total == 0 {
        return None;
    }
    if 2 * n_solidarist > n_total {
        Some(Attitude::Solidarist)
    } else {
        Some(Attitude::Mercenary)
    }
}

/// Update every learner from its neighbors in `graph`.
///
/// All decisions are taken against the attitudes as they stood before the
/// call, then applied at once. Isolated learners are left untouched.
/// Returns the number of learners whose attitude changed.
pub fn update_attitudes(graph: &ProximityGraph, pop: &mut Population) -> usize {
    let decisions: Vec<(usize, Attitude)> = pop
        .agents()
        .iter()
        .filter(|agt| agt.is_learner())
        .filter_map(|agt| {
            let neighbor_attitudes = graph
                .neighbors(agt.id())
                .iter()
                .filter_map(|&id| pop.get(id))
                .map(|nbr| nbr.attitude());
            majority_attitude(neighbor_attitudes).map(|attitude| (agt.id(), attitude))
        })
        .collect();

    let agt_vec = pop.agents_mut();
    let mut n_changed = 0;
    for (id, attitude) in decisions {
        if agt_vec[id].adopt(attitude) {
            n_changed += 1;
        }
    }
    n_changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Agent, Archetype};

    use Attitude::{Mercenary as M, Solidarist as S};

    #[test]
    fn strict_majority_is_solidarist() {
        assert_eq!(majority_attitude([S, S, M]), Some(S));
        assert_eq!(majority_attitude([S]), Some(S));
    }

    #[test]
    fn tie_resolves_to_mercenary() {
        assert_eq!(majority_attitude([S, M]), Some(M));
        assert_eq!(majority_attitude([S, S, M, M]), Some(M));
        assert_eq!(majority_attitude([M, M, M]), Some(M));
    }

    #[test]
    fn no_neighbors_means_no_decision() {
        assert_eq!(majority_attitude(Vec::<Attitude>::new()), None);
    }

    #[test]
    fn isolated_learner_keeps_attitude_and_counter() {
        let mut learner = Agent::new(0, Archetype::Learner, [0.1, 0.1]);
        learner.adopt(S);
        learner.adopt(S);
        let far = Agent::new(1, Archetype::Mercenary, [0.9, 0.9]);
        let mut pop = Population::from_agents(vec![learner, far]).unwrap();

        let graph = ProximityGraph::build(&pop.positions(), 0.1);
        assert_eq!(update_attitudes(&graph, &mut pop), 0);

        let learner = pop.get(0).unwrap();
        assert_eq!(learner.attitude(), S);
        assert_eq!(learner.n_stable(), 1);
    }

    #[test]
    fn updates_are_simultaneous() {
        // Learner 2 flips, but learner 3 must still see its old attitude.
        let agt_vec = vec![
            Agent::new(0, Archetype::Solidarist, [0.50, 0.50]),
            Agent::new(1, Archetype::Solidarist, [0.50, 0.54]),
            Agent::new(2, Archetype::Learner, [0.53, 0.52]),
            Agent::new(3, Archetype::Learner, [0.57, 0.52]),
        ];
        let mut pop = Population::from_agents(agt_vec).unwrap();
        let graph = ProximityGraph::build(&pop.positions(), 0.05);
        assert_eq!(graph.neighbors(2), &[0, 1, 3]);
        assert_eq!(graph.neighbors(3), &[2]);

        assert_eq!(update_attitudes(&graph, &mut pop), 1);
        assert_eq!(pop.get(2).unwrap().attitude(), S);
        assert_eq!(pop.get(3).unwrap().attitude(), M);
        assert_eq!(pop.get(3).unwrap().n_stable(), 1);
    }

    #[test]
    fn learner_flips_on_majority_and_resets_counter() {
        let agt_vec = vec![
            Agent::new(0, Archetype::Solidarist, [0.50, 0.50]),
            Agent::new(1, Archetype::Solidarist, [0.50, 0.52]),
            Agent::new(2, Archetype::Mercenary, [0.52, 0.52]),
            Agent::new(3, Archetype::Learner, [0.51, 0.51]),
        ];
        let mut pop = Population::from_agents(agt_vec).unwrap();
        let graph = ProximityGraph::build(&pop.positions(), 0.05);

        assert_eq!(graph.neighbors(3), &[0, 1, 2]);
        assert_eq!(update_attitudes(&graph, &mut pop), 1);
        assert_eq!(pop.get(3).unwrap().attitude(), S);
        assert_eq!(pop.get(3).unwrap().n_stable(), 0);

        for id in 0..3 {
            let agt = pop.get(id).unwrap();
            assert_eq!(agt.n_stable(), 0);
        }
        assert_eq!(pop.get(0).unwrap().attitude(), S);
        assert_eq!(pop.get(2).unwrap().attitude(), M);
    }
}
