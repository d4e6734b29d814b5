//! Semi-Howard 策略迭代: 计算最大平均环 (Max-Plus 特征值) 与关键环。
use std::cmp::Ordering;

use log::debug;
use petgraph::graph::{EdgeIndex, Graph, NodeIndex};
use petgraph::visit::EdgeRef;

use crate::net::core::PetriNet;
use crate::net::error::NetError;
use crate::net::ids::TransitionId;
use crate::net::index_vec::Idx;
use crate::net::structure::{Arc, NodeRef};

const EPSILON: f64 = 1e-9;
const MAX_ITERATIONS: usize = 1000;

/// Output of the policy iteration, one entry per graph node.
#[derive(Debug, Clone)]
pub struct SemiHoward {
    /// Cycle-time vector (eigenvalue per connected component).
    pub chi: Vec<f64>,
    /// Bias vector (eigenvector up to an additive constant).
    pub v: Vec<f64>,
    /// Optimal predecessor per node.
    pub policy: Vec<usize>,
    /// Connected components of the optimal policy.
    pub components: usize,
    pub iterations: usize,
}

/// Critical cycle of an event graph with the per-transition cycle times.
#[derive(Debug, Clone)]
pub struct CriticalCycle {
    pub arcs: Vec<Arc>,
    pub cycle_time: Vec<f64>,
    pub bias: Vec<f64>,
    pub components: usize,
    pub iterations: usize,
}

/// Policy iteration on the dependency digraph described by flat triplets:
/// arc `k` runs from node `ij[2k]` to node `ij[2k + 1]` and carries a
/// duration and a delay (token count). The mean of a cycle is the ratio of
/// its summed durations over its summed delays; the algorithm maximizes it.
///
/// Fails when a node has no outgoing dependency or when the optimal policy
/// closes a cycle without any delay (no steady cycle time exists).
pub fn semi_howard(
    ij: &[usize],
    durations: &[f64],
    delays: &[f64],
    n_nodes: usize,
) -> Result<SemiHoward, NetError> {
    let n_arcs = durations.len();
    if ij.len() != 2 * n_arcs || delays.len() != n_arcs || ij.iter().any(|&node| node >= n_nodes) {
        return Err(NetError::NoPolicy);
    }

    let mut graph: Graph<(), (f64, f64)> = Graph::with_capacity(n_nodes, n_arcs);
    let nodes: Vec<NodeIndex> = (0..n_nodes).map(|_| graph.add_node(())).collect();
    for k in 0..n_arcs {
        graph.add_edge(nodes[ij[2 * k]], nodes[ij[2 * k + 1]], (durations[k], delays[k]));
    }

    // initial greedy policy: the heaviest outgoing arc per node
    let mut policy: Vec<EdgeIndex> = Vec::with_capacity(n_nodes);
    for &node in &nodes {
        let best = graph
            .edges(node)
            .max_by(|a, b| {
                a.weight()
                    .0
                    .partial_cmp(&b.weight().0)
                    .unwrap_or(Ordering::Equal)
            })
            .map(|edge| edge.id());
        match best {
            Some(edge) => policy.push(edge),
            None => return Err(NetError::NoPolicy),
        }
    }

    let mut chi = vec![0.0; n_nodes];
    let mut v = vec![0.0; n_nodes];
    let mut components = 0;
    let mut iterations = 0;

    loop {
        iterations += 1;
        if iterations > MAX_ITERATIONS {
            return Err(NetError::NoPolicy);
        }
        components = evaluate_policy(&graph, &policy, &mut chi, &mut v)?;

        // first improve the cycle time, then the bias at fixed cycle time
        let mut improved = false;
        for (i, &node) in nodes.iter().enumerate() {
            let mut best = chi[target_of(&graph, policy[i])];
            for edge in graph.edges(node) {
                let j = edge.target().index();
                if chi[j] > best + EPSILON {
                    best = chi[j];
                    policy[i] = edge.id();
                    improved = true;
                }
            }
        }
        if improved {
            continue;
        }

        for (i, &node) in nodes.iter().enumerate() {
            let mut best = policy_value(&graph, policy[i], chi[i], &v);
            for edge in graph.edges(node) {
                let j = edge.target().index();
                if (chi[j] - chi[i]).abs() > EPSILON {
                    continue;
                }
                let value = policy_value(&graph, edge.id(), chi[i], &v);
                if value > best + EPSILON {
                    best = value;
                    policy[i] = edge.id();
                    improved = true;
                }
            }
        }
        if !improved {
            break;
        }
    }

    debug!("policy iteration converged after {iterations} iteration(s), {components} component(s)");
    Ok(SemiHoward {
        chi,
        v,
        policy: policy
            .iter()
            .map(|&edge| target_of(&graph, edge))
            .collect(),
        components,
        iterations,
    })
}

fn target_of(graph: &Graph<(), (f64, f64)>, edge: EdgeIndex) -> usize {
    graph
        .edge_endpoints(edge)
        .expect("policy edges exist")
        .1
        .index()
}

fn policy_value(graph: &Graph<(), (f64, f64)>, edge: EdgeIndex, chi: f64, v: &[f64]) -> f64 {
    let (duration, delay) = *graph.edge_weight(edge).expect("policy edges exist");
    duration - chi * delay + v[target_of(graph, edge)]
}

/// Value determination: the policy graph is functional, so it splits into
/// cycles with trees hanging off them. Every cycle fixes the cycle time of
/// its component; tree nodes inherit it while accumulating bias.
fn evaluate_policy(
    graph: &Graph<(), (f64, f64)>,
    policy: &[EdgeIndex],
    chi: &mut [f64],
    v: &mut [f64],
) -> Result<usize, NetError> {
    const UNSEEN: u8 = 0;
    const ON_PATH: u8 = 1;
    const RESOLVED: u8 = 2;

    let n = policy.len();
    let mut state = vec![UNSEEN; n];
    let mut components = 0;

    for start in 0..n {
        if state[start] != UNSEEN {
            continue;
        }

        let mut path = Vec::new();
        let mut cursor = start;
        while state[cursor] == UNSEEN {
            state[cursor] = ON_PATH;
            path.push(cursor);
            cursor = target_of(graph, policy[cursor]);
        }

        if state[cursor] == ON_PATH {
            // a fresh cycle: fix its mean and anchor the bias at its head
            let head = path.iter().position(|&node| node == cursor).expect("on path");
            let cycle = &path[head..];
            let mut sum_durations = 0.0;
            let mut sum_delays = 0.0;
            for &node in cycle {
                let (duration, delay) =
                    *graph.edge_weight(policy[node]).expect("policy edges exist");
                sum_durations += duration;
                sum_delays += delay;
            }
            if sum_delays <= EPSILON {
                return Err(NetError::NoPolicy);
            }
            let mean = sum_durations / sum_delays;
            components += 1;

            chi[cursor] = mean;
            v[cursor] = 0.0;
            state[cursor] = RESOLVED;
            for &node in cycle.iter().rev() {
                if node == cursor {
                    continue;
                }
                let successor = target_of(graph, policy[node]);
                let (duration, delay) =
                    *graph.edge_weight(policy[node]).expect("policy edges exist");
                chi[node] = mean;
                v[node] = duration - mean * delay + v[successor];
                state[node] = RESOLVED;
            }
        }

        // unwind the tree prefix, successors first
        for &node in path.iter().rev() {
            if state[node] == RESOLVED {
                continue;
            }
            let successor = target_of(graph, policy[node]);
            let (duration, delay) = *graph.edge_weight(policy[node]).expect("policy edges exist");
            chi[node] = chi[successor];
            v[node] = duration - chi[successor] * delay + v[successor];
            state[node] = RESOLVED;
        }
    }
    Ok(components)
}

impl PetriNet {
    /// Runs the Semi-Howard solver on the event graph and reconstructs the
    /// critical cycle: from every transition the optimal predecessor is
    /// reachable back through exactly one place, whose two arcs join the
    /// result. The arcs are also kept on the net for display.
    pub fn find_critical_cycle(&mut self) -> Result<CriticalCycle, NetError> {
        self.check_event_graph()?;

        let n_nodes = self.transitions.len();
        let n_arcs = self.places.len();
        let mut ij = Vec::with_capacity(2 * n_arcs);
        let mut durations = Vec::with_capacity(n_arcs);
        let mut delays = Vec::with_capacity(n_arcs);

        for place in self.places.iter() {
            let inbound = self.arcs[place.arcs_in[0]];
            let outbound = self.arcs[place.arcs_out[0]];
            let (NodeRef::Transition(from), NodeRef::Transition(to)) = (inbound.from, outbound.to)
            else {
                unreachable!("event graph: places sit between two transitions");
            };
            // transposed on purpose: node `to` depends on node `from`
            ij.push(to.index());
            ij.push(from.index());
            durations.push(inbound.duration as f64);
            delays.push(place.tokens as f64);
        }

        let solved = semi_howard(&ij, &durations, &delays, n_nodes)?;
        if solved.components == 0 {
            return Err(NetError::NoPolicy);
        }

        let mut arcs = Vec::with_capacity(2 * n_nodes);
        for (to, &from) in solved.policy.iter().enumerate() {
            let to = NodeRef::Transition(TransitionId::from_usize(to));
            let predecessor = &self.transitions[TransitionId::from_usize(from)];
            for &ai in predecessor.arcs_out.iter() {
                let first = self.arcs[ai];
                let NodeRef::Place(place) = first.to else {
                    continue;
                };
                let second = self.arcs[self.places[place].arcs_out[0]];
                if second.to == to {
                    arcs.push(first);
                    arcs.push(second);
                    break;
                }
            }
        }

        self.critical = arcs.clone();
        Ok(CriticalCycle {
            arcs,
            cycle_time: solved.chi,
            bias: solved.v,
            components: solved.components,
            iterations: solved.iterations,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::structure::NodeRef::{Place as P, Transition as T};

    #[test]
    fn two_node_cycle_mean() {
        // T0 -> T1 with duration 3, back with duration 5, one token each way
        let ij = [1, 0, 0, 1];
        let result = semi_howard(&ij, &[3.0, 5.0], &[1.0, 1.0], 2).unwrap();
        assert_eq!(result.components, 1);
        assert!((result.chi[0] - 4.0).abs() < 1e-9);
        assert!((result.chi[1] - 4.0).abs() < 1e-9);
        assert_eq!(result.policy, vec![1, 0]);
    }

    #[test]
    fn tree_nodes_inherit_the_cycle_time() {
        // cycle 0 <-> 1 (mean 2), node 2 hangs off node 0
        let ij = [1, 0, 0, 1, 2, 0];
        let result = semi_howard(&ij, &[2.0, 2.0, 10.0], &[1.0, 1.0, 1.0], 3).unwrap();
        assert_eq!(result.components, 1);
        assert!((result.chi[2] - 2.0).abs() < 1e-9);
        assert_eq!(result.policy[2], 0);
    }

    #[test]
    fn best_of_two_cycles_wins() {
        // node 0 may loop on itself (mean 1) or go through node 1 (mean 3)
        let ij = [0, 0, 0, 1, 1, 0];
        let result = semi_howard(&ij, &[1.0, 4.0, 2.0], &[1.0, 1.0, 1.0], 2).unwrap();
        assert_eq!(result.components, 1);
        assert!((result.chi[0] - 3.0).abs() < 1e-9);
        assert_eq!(result.policy[0], 1);
    }

    #[test]
    fn disconnected_node_has_no_policy() {
        let result = semi_howard(&[0, 0], &[1.0], &[1.0], 2);
        assert!(matches!(result, Err(NetError::NoPolicy)));
    }

    #[test]
    fn tokenless_cycle_is_rejected() {
        let ij = [1, 0, 0, 1];
        let result = semi_howard(&ij, &[3.0, 5.0], &[0.0, 0.0], 2);
        assert!(matches!(result, Err(NetError::NoPolicy)));
    }

    #[test]
    fn critical_cycle_of_a_two_transition_loop() {
        let mut net = PetriNet::default();
        let t0 = net.add_transition(0.0, 0.0);
        let t1 = net.add_transition(2.0, 0.0);
        let p0 = net.add_place(1.0, 0.0, 1);
        let p1 = net.add_place(1.0, 2.0, 1);
        net.add_arc(T(t0), P(p0), 3.0).unwrap();
        net.add_arc(P(p0), T(t1), 0.0).unwrap();
        net.add_arc(T(t1), P(p1), 5.0).unwrap();
        net.add_arc(P(p1), T(t0), 0.0).unwrap();

        let cycle = net.find_critical_cycle().unwrap();
        assert_eq!(cycle.components, 1);
        for time in &cycle.cycle_time {
            assert!((time - 4.0).abs() < 1e-9);
        }
        // two transitions, each contributing a place and its two arcs
        assert_eq!(cycle.arcs.len(), 4);
        assert_eq!(net.critical_cycle_arcs().len(), 4);
    }
}
