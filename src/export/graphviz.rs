use std::fmt::Write;
use std::fs;
use std::path::Path;

use crate::net::core::PetriNet;
use crate::net::error::NetError;

pub fn render_dot(net: &mut PetriNet) -> String {
    net.rebuild_adjacency();
    let mut out = String::new();

    let _ = writeln!(out, "digraph G {{");
    let _ = writeln!(out, "node [shape=circle, color=blue]");
    for place in net.places().iter() {
        let _ = write!(out, "  {} [label=\"{}", place.key(), place.caption);
        if place.tokens > 0 {
            let _ = write!(out, "\\n{}&bull;", place.tokens);
        }
        let _ = writeln!(out, "\"];");
    }

    let _ = writeln!(out, "node [shape=box, color=red]");
    for transition in net.transitions().iter() {
        if net.burnable(transition.id) > 0 {
            let _ = writeln!(
                out,
                "  {} [label=\"{}\", color=green];",
                transition.key(),
                transition.caption
            );
        } else {
            let _ = writeln!(out, "  {} [label=\"{}\"];", transition.key(), transition.caption);
        }
    }

    let _ = writeln!(out, "edge [style=\"\"]");
    for arc in net.arcs() {
        let _ = write!(out, "  {} -> {}", arc.from, arc.to);
        if !arc.from.is_place() {
            let _ = write!(out, " [label=\"{}\"]", arc.duration);
        }
        let _ = writeln!(out, ";");
    }
    let _ = writeln!(out, "}}");
    out
}

pub fn export_graphviz(net: &mut PetriNet, path: &Path) -> Result<(), NetError> {
    fs::write(path, render_dot(net))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::structure::NodeRef::{Place as P, Transition as T};

    #[test]
    fn tokens_and_durations_are_labeled() {
        let mut net = PetriNet::default();
        let p0 = net.add_place(0.0, 0.0, 2);
        let t0 = net.add_transition(1.0, 0.0);
        net.add_arc(P(p0), T(t0), 0.0).unwrap();
        net.add_arc(T(t0), P(p0), 1.5).unwrap();

        let dot = render_dot(&mut net);
        assert!(dot.starts_with("digraph G {"));
        assert!(dot.contains("P0 [label=\"P0\\n2&bull;\"];"));
        // t0 is enabled, hence green
        assert!(dot.contains("T0 [label=\"T0\", color=green];"));
        assert!(dot.contains("  P0 -> T0;"));
        assert!(dot.contains("  T0 -> P0 [label=\"1.5\"];"));
    }
}
