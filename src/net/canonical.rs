//! 事件图规范形变换: 多令牌库所展开、边界令牌外推。
use crate::net::core::PetriNet;
use crate::net::error::NetError;
use crate::net::ids::{PlaceId, TransitionId};
use crate::net::structure::NodeRef;

impl PetriNet {
    /// Copies the net into its canonical form: every place holds at most one
    /// token and no token sits next to a source or sink transition. Only
    /// defined on event graphs.
    ///
    /// A place with `k > 1` tokens becomes a chain of `k` single-token
    /// places separated by fresh transitions; hop durations sum, the
    /// original inbound duration rides the final hop so the dater semantics
    /// are unchanged.
    pub fn to_canonical(&mut self) -> Result<PetriNet, NetError> {
        self.check_event_graph()?;

        let mut canonic = self.clone();
        canonic.rebuild_adjacency();

        // multi-token places, planned before mutating anything
        let explosions: Vec<(PlaceId, TransitionId, f32, u64)> = canonic
            .places
            .iter()
            .filter(|place| place.tokens > 1)
            .map(|place| {
                let arc = canonic.arcs[place.arcs_in[0]];
                let NodeRef::Transition(feeder) = arc.from else {
                    unreachable!("event graph: place fed by a transition");
                };
                (place.id, feeder, arc.duration, place.tokens)
            })
            .collect();

        for (place, feeder, duration, tokens) in explosions {
            canonic.remove_arc(NodeRef::Transition(feeder), NodeRef::Place(place))?;
            let (x, y) = (canonic.places[place].x, canonic.places[place].y);

            let mut from = feeder;
            for hop in 1..tokens {
                let offset = hop as f32 * 15.0;
                let link = canonic.add_place(x + offset, y + offset, 1);
                canonic.add_arc(NodeRef::Transition(from), NodeRef::Place(link), 0.0)?;
                let relay = canonic.add_transition(x + offset + 5.0, y + offset);
                canonic.add_arc(NodeRef::Place(link), NodeRef::Transition(relay), 0.0)?;
                from = relay;
            }
            canonic.places[place].tokens = 1;
            canonic.add_arc(NodeRef::Transition(from), NodeRef::Place(place), duration)?;
        }

        // single-token places touching the boundary
        canonic.rebuild_adjacency();
        let mut input_pushes = Vec::new();
        let mut output_pushes = Vec::new();
        for place in canonic.places.iter() {
            if place.tokens != 1 {
                continue;
            }
            let inbound = canonic.arcs[place.arcs_in[0]];
            if let NodeRef::Transition(feeder) = inbound.from {
                if canonic.transitions[feeder].is_input() {
                    input_pushes.push((place.id, feeder, inbound.duration));
                }
            }
            let outbound = canonic.arcs[place.arcs_out[0]];
            if let NodeRef::Transition(consumer) = outbound.to {
                if canonic.transitions[consumer].is_output() {
                    output_pushes.push((place.id, consumer));
                }
            }
        }

        for (place, feeder, duration) in input_pushes {
            canonic.remove_arc(NodeRef::Transition(feeder), NodeRef::Place(place))?;
            let (x, y) = (canonic.places[place].x, canonic.places[place].y);
            let buffer = canonic.add_place(x - 20.0, y, 0);
            let relay = canonic.add_transition(x - 10.0, y);
            // the duration stays on the arc leaving the system input
            canonic.add_arc(NodeRef::Transition(feeder), NodeRef::Place(buffer), duration)?;
            canonic.add_arc(NodeRef::Place(buffer), NodeRef::Transition(relay), 0.0)?;
            canonic.add_arc(NodeRef::Transition(relay), NodeRef::Place(place), 0.0)?;
        }

        for (place, consumer) in output_pushes {
            canonic.remove_arc(NodeRef::Place(place), NodeRef::Transition(consumer))?;
            let (x, y) = (canonic.places[place].x, canonic.places[place].y);
            let relay = canonic.add_transition(x + 10.0, y);
            let buffer = canonic.add_place(x + 20.0, y, 0);
            canonic.add_arc(NodeRef::Place(place), NodeRef::Transition(relay), 0.0)?;
            canonic.add_arc(NodeRef::Transition(relay), NodeRef::Place(buffer), 0.0)?;
            canonic.add_arc(NodeRef::Place(buffer), NodeRef::Transition(consumer), 0.0)?;
        }

        canonic.rebuild_adjacency();
        canonic.modified = true;
        Ok(canonic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn self_loop_with_three_tokens_becomes_a_chain() {
        let mut net = PetriNet::default();
        let t0 = net.add_transition(0.0, 0.0);
        let p0 = net.add_place(1.0, 0.0, 3);
        net.add_arc(NodeRef::Transition(t0), NodeRef::Place(p0), 2.0)
            .unwrap();
        net.add_arc(NodeRef::Place(p0), NodeRef::Transition(t0), 0.0)
            .unwrap();

        let mut canonic = net.to_canonical().unwrap();
        assert!(canonic.is_event_graph());
        assert_eq!(canonic.places().len(), 3);
        assert!(canonic.places().iter().all(|p| p.tokens == 1));
        let total: f32 = canonic
            .arcs()
            .iter()
            .filter(|a| !a.from.is_place())
            .map(|a| a.duration)
            .sum();
        assert_eq!(total, 2.0);
    }

    #[test]
    fn boundary_tokens_are_pushed_inward() {
        let mut net = PetriNet::default();
        let t0 = net.add_transition(0.0, 0.0); // input
        let t1 = net.add_transition(2.0, 0.0); // state
        let t2 = net.add_transition(4.0, 0.0); // output
        let p0 = net.add_place(1.0, 0.0, 1);
        let p1 = net.add_place(3.0, 0.0, 1);
        net.add_arc(NodeRef::Transition(t0), NodeRef::Place(p0), 1.0)
            .unwrap();
        net.add_arc(NodeRef::Place(p0), NodeRef::Transition(t1), 0.0)
            .unwrap();
        net.add_arc(NodeRef::Transition(t1), NodeRef::Place(p1), 2.0)
            .unwrap();
        net.add_arc(NodeRef::Place(p1), NodeRef::Transition(t2), 0.0)
            .unwrap();

        let mut canonic = net.to_canonical().unwrap();
        assert!(canonic.is_event_graph());
        canonic.rebuild_adjacency();
        for place in canonic.places().iter() {
            if place.tokens == 0 {
                continue;
            }
            let feeder = canonic.arcs()[place.arcs_in[0]].from;
            let consumer = canonic.arcs()[place.arcs_out[0]].to;
            if let NodeRef::Transition(id) = feeder {
                assert!(!canonic.transition(id).unwrap().is_input());
            }
            if let NodeRef::Transition(id) = consumer {
                assert!(!canonic.transition(id).unwrap().is_output());
            }
        }
    }
}
