//! 发射语义: 使能判定、可燃令牌计数与单步仿真。
use log::debug;
use rand::seq::SliceRandom;

use crate::net::core::PetriNet;
use crate::net::ids::TransitionId;
use crate::net::structure::{FiringPolicy, NetKind, NodeRef};

impl PetriNet {
    /// A transition is enabled when it is a source (no input arc) or every
    /// input place holds at least one token. Reads the adjacency index.
    pub fn is_enabled(&self, id: TransitionId) -> bool {
        let transition = &self.transitions[id];
        transition.arcs_in.iter().all(|&idx| {
            let NodeRef::Place(place) = self.arcs[idx].from else {
                return false;
            };
            self.places[place].tokens > 0
        })
    }

    /// Number of tokens the transition can burn: one for an armed source,
    /// zero when the receptivity does not hold, otherwise the tightest input
    /// place decides.
    pub fn burnable(&self, id: TransitionId) -> u64 {
        let transition = &self.transitions[id];
        if transition.arcs_in.is_empty() {
            return transition.receptivity as u64;
        }
        if !transition.receptivity {
            return 0;
        }

        let mut burnt = u64::MAX;
        for &idx in transition.arcs_in.iter() {
            let NodeRef::Place(place) = self.arcs[idx].from else {
                return 0;
            };
            let tokens = self.places[place].tokens;
            if tokens == 0 {
                return 0;
            }
            burnt = burnt.min(tokens);
        }
        burnt
    }

    /// One complete simulation pass over all transitions, in a fair random
    /// order. Returns how many transitions fired. Structure is invariant
    /// across the run; only tokens and receptivities move.
    pub fn step(&mut self) -> usize {
        self.rebuild_adjacency();

        // 惰性重建乱序工作表, 仅在结构变化后
        if self.shuffled.len() != self.transitions.len() {
            self.shuffled = self.transitions.indices().collect();
        }
        let mut order = std::mem::take(&mut self.shuffled);
        order.shuffle(&mut rand::thread_rng());

        let mut fired = 0;
        for &id in order.iter() {
            let burnt = match self.settings.firing {
                FiringPolicy::OneByOne => self.burnable(id).min(1),
                FiringPolicy::MaxPossible => self.burnable(id),
            };
            if burnt == 0 {
                continue;
            }
            fired += 1;
            debug!("transition {} burns {burnt} token(s)", self.transitions[id].key());

            // tokens arrive within the same step, so sources stay armed
            // across steps like any other transition
            let inputs: Vec<usize> = self.transitions[id].arcs_in.iter().copied().collect();
            for idx in inputs {
                if let NodeRef::Place(place) = self.arcs[idx].from {
                    self.places[place].tokens -= burnt;
                }
            }
            if self.kind() == NetKind::Petri {
                // plain Petri: the user arms each firing by hand
                self.transitions[id].receptivity = false;
            }

            let outputs: Vec<usize> = self.transitions[id].arcs_out.iter().copied().collect();
            let cap = self.settings.max_tokens;
            for idx in outputs {
                if let NodeRef::Place(place) = self.arcs[idx].to {
                    let tokens = &mut self.places[place].tokens;
                    *tokens = tokens.saturating_add(burnt).min(cap);
                }
            }
        }

        self.shuffled = order;
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::ids::PlaceId;

    fn arm_all(net: &mut PetriNet) {
        for transition in net.transitions.iter_mut() {
            transition.receptivity = true;
        }
    }

    #[test]
    fn disabled_without_tokens() {
        let mut net = PetriNet::default();
        let p0 = net.add_place(0.0, 0.0, 0);
        let t0 = net.add_transition(1.0, 0.0);
        net.add_arc(NodeRef::Place(p0), NodeRef::Transition(t0), 0.0)
            .unwrap();
        net.rebuild_adjacency();
        assert!(!net.is_enabled(t0));
        assert_eq!(net.burnable(t0), 0);
    }

    #[test]
    fn source_keeps_producing_in_timed_petri() {
        let mut net = PetriNet::default();
        let t0 = net.add_transition(0.0, 0.0);
        let p0 = net.add_place(1.0, 0.0, 0);
        net.add_arc(NodeRef::Transition(t0), NodeRef::Place(p0), 0.0)
            .unwrap();

        assert_eq!(net.step(), 1);
        assert_eq!(net.places[p0].tokens, 1);
        // the source stays armed and delivers on every step
        assert_eq!(net.step(), 1);
        assert_eq!(net.places[p0].tokens, 2);
        assert!(net.transitions[t0].receptivity);
    }

    #[test]
    fn petri_source_waits_for_manual_rearming() {
        let mut net = PetriNet::new(NetKind::Petri);
        let t0 = net.add_transition(0.0, 0.0);
        let p0 = net.add_place(1.0, 0.0, 0);
        net.add_arc(NodeRef::Transition(t0), NodeRef::Place(p0), 0.0)
            .unwrap();
        net.transitions[t0].receptivity = true;

        assert_eq!(net.step(), 1);
        assert_eq!(net.places[p0].tokens, 1);
        // the firing consumed the arming, nothing moves until the user
        // arms the source again
        assert_eq!(net.step(), 0);
        assert_eq!(net.places[p0].tokens, 1);
        net.transitions[t0].receptivity = true;
        assert_eq!(net.step(), 1);
        assert_eq!(net.places[p0].tokens, 2);
    }

    #[test]
    fn tightest_input_place_bounds_the_burn() {
        let mut net = PetriNet::new(NetKind::Petri);
        let p0 = net.add_place(0.0, 0.0, 5);
        let p1 = net.add_place(0.0, 1.0, 2);
        let p2 = net.add_place(2.0, 0.0, 0);
        let t0 = net.add_transition(1.0, 0.0);
        net.add_arc(NodeRef::Place(p0), NodeRef::Transition(t0), 0.0)
            .unwrap();
        net.add_arc(NodeRef::Place(p1), NodeRef::Transition(t0), 0.0)
            .unwrap();
        net.add_arc(NodeRef::Transition(t0), NodeRef::Place(p2), 0.0)
            .unwrap();
        arm_all(&mut net);

        assert_eq!(net.step(), 1);
        assert_eq!(net.places[p0].tokens, 3);
        assert_eq!(net.places[p1].tokens, 0);
        assert_eq!(net.places[p2].tokens, 2);
    }

    #[test]
    fn one_by_one_policy_caps_the_burn() {
        let mut net = PetriNet::new(NetKind::TimedPetri);
        let p0 = net.add_place(0.0, 0.0, 4);
        let p1 = net.add_place(2.0, 0.0, 0);
        let t0 = net.add_transition(1.0, 0.0);
        net.add_arc(NodeRef::Place(p0), NodeRef::Transition(t0), 0.0)
            .unwrap();
        net.add_arc(NodeRef::Transition(t0), NodeRef::Place(p1), 0.0)
            .unwrap();

        assert_eq!(net.step(), 1);
        assert_eq!(net.places[p0].tokens, 3);
        assert_eq!(net.places[p1].tokens, 1);
    }

    #[test]
    fn grafcet_saturates_at_one_token() {
        let mut net = PetriNet::new(NetKind::Grafcet);
        let p0 = net.add_place(0.0, 0.0, 1);
        let p1 = net.add_place(2.0, 0.0, 1);
        let t0 = net.add_transition(1.0, 0.0);
        net.add_arc(NodeRef::Place(p0), NodeRef::Transition(t0), 0.0)
            .unwrap();
        net.add_arc(NodeRef::Transition(t0), NodeRef::Place(p1), 0.0)
            .unwrap();
        net.reset_receptivities();

        net.step();
        assert!(net.places.iter().all(|p| p.tokens <= 1));
        assert_eq!(net.places[PlaceId::new(1)].tokens, 1);
    }
}
