//! 事件图的计数器形与 dater 形文本表示。
use std::fmt::Write;

use crate::net::core::PetriNet;
use crate::net::structure::NodeRef;

impl PetriNet {
    /// Min-plus counter form, one commented recurrence per non-source
    /// transition: `T(t) = min(tokens + T'(t - duration), ...)`.
    pub fn counter_form(&mut self, comment: &str) -> String {
        self.rebuild_adjacency();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{comment}Timed event graph represented as its counter form:"
        );
        for transition in self.transitions.iter() {
            if transition.arcs_in.is_empty() {
                continue;
            }
            let _ = write!(out, "{comment}{}(t) = min(", transition.key());
            let mut outer = "";
            for &ai in transition.arcs_in.iter() {
                let NodeRef::Place(place) = self.arcs[ai].from else {
                    continue;
                };
                let place = &self.places[place];
                let _ = write!(out, "{outer}{} + ", place.tokens);
                let mut inner = "";
                for &ao in place.arcs_in.iter() {
                    let feeder = self.arcs[ao];
                    let _ = write!(
                        out,
                        "{inner}{}(t - {})",
                        feeder.from.key(),
                        feeder.duration
                    );
                    inner = ", ";
                }
                outer = ", ";
            }
            let _ = writeln!(out, ");");
        }
        out
    }

    /// Max-plus dater form, one commented recurrence per non-source
    /// transition: `T(n) = max(duration + T'(n - tokens), ...)`.
    pub fn dater_form(&mut self, comment: &str) -> String {
        self.rebuild_adjacency();
        let mut out = String::new();
        let _ = writeln!(
            out,
            "{comment}Timed event graph represented as its dater form:"
        );
        for transition in self.transitions.iter() {
            if transition.arcs_in.is_empty() {
                continue;
            }
            let _ = write!(out, "{comment}{}(n) = max(", transition.key());
            let mut outer = "";
            for &ai in transition.arcs_in.iter() {
                let NodeRef::Place(place) = self.arcs[ai].from else {
                    continue;
                };
                let place = &self.places[place];
                let _ = write!(out, "{outer}");
                let mut inner = "";
                for &ao in place.arcs_in.iter() {
                    let feeder = self.arcs[ao];
                    let _ = write!(
                        out,
                        "{inner}{} + {}(n - {})",
                        feeder.duration,
                        feeder.from.key(),
                        place.tokens
                    );
                    inner = ", ";
                }
                outer = ", ";
            }
            let _ = writeln!(out, ");");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::structure::NodeRef::{Place as P, Transition as T};

    fn loop_net() -> PetriNet {
        let mut net = PetriNet::default();
        let t0 = net.add_transition(0.0, 0.0);
        let t1 = net.add_transition(2.0, 0.0);
        let p0 = net.add_place(1.0, 0.0, 1);
        let p1 = net.add_place(1.0, 2.0, 0);
        net.add_arc(T(t0), P(p0), 2.0).unwrap();
        net.add_arc(P(p0), T(t1), 0.0).unwrap();
        net.add_arc(T(t1), P(p1), 3.0).unwrap();
        net.add_arc(P(p1), T(t0), 0.0).unwrap();
        net
    }

    #[test]
    fn dater_form_lists_predecessors() {
        let text = loop_net().dater_form("# ");
        assert!(text.starts_with("# Timed event graph"));
        assert!(text.contains("# T0(n) = max(3 + T1(n - 0));"));
        assert!(text.contains("# T1(n) = max(2 + T0(n - 1));"));
    }

    #[test]
    fn counter_form_lists_tokens() {
        let text = loop_net().counter_form("# ");
        assert!(text.contains("# T0(t) = min(0 + T1(t - 3));"));
        assert!(text.contains("# T1(t) = min(1 + T0(t - 2));"));
    }
}
