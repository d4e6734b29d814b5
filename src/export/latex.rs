use std::fmt::Write;
use std::fs;
use std::path::Path;

use crate::net::core::PetriNet;
use crate::net::error::NetError;

const PREAMBLE: &str = r"\documentclass[border = 0.2cm]{standalone}
\usepackage{tikz}
\usetikzlibrary{petri,positioning}
\begin{document}
\begin{tikzpicture}
";

pub fn render_latex(net: &mut PetriNet, scale_x: f32, scale_y: f32) -> String {
    net.rebuild_adjacency();
    let mut out = String::from(PREAMBLE);

    let _ = writeln!(out, "\n% Places");
    for place in net.places().iter() {
        let _ = writeln!(
            out,
            "\\node[place, label=above:${}$, fill=blue!25, draw=blue!75, tokens={}] ({}) at ({}, {}) {{}};",
            place.caption,
            place.tokens,
            place.key(),
            (place.x * scale_x) as i32,
            (-place.y * scale_y) as i32,
        );
    }

    let _ = writeln!(out, "\n% Transitions");
    for transition in net.transitions().iter() {
        let color = if net.burnable(transition.id) > 0 {
            "green"
        } else {
            "red"
        };
        let _ = writeln!(
            out,
            "\\node[transition, label=above:${}$, fill={color}!25, draw={color}!75] ({}) at ({}, {}) {{}};",
            transition.caption,
            transition.key(),
            (transition.x * scale_x) as i32,
            (-transition.y * scale_y) as i32,
        );
    }

    let _ = writeln!(out, "\n% Arcs");
    for arc in net.arcs() {
        if arc.from.is_place() {
            let _ = writeln!(out, "\\draw[-latex, thick] ({}) -- ({});", arc.from, arc.to);
        } else {
            let _ = writeln!(
                out,
                "\\draw[-latex, thick] ({}) -- node[midway, above right] {{{:.2}}} ({});",
                arc.from, arc.duration, arc.to
            );
        }
    }

    out.push_str("\n\\end{tikzpicture}\n\\end{document}\n");
    out
}

pub fn export_latex(
    net: &mut PetriNet,
    path: &Path,
    scale_x: f32,
    scale_y: f32,
) -> Result<(), NetError> {
    fs::write(path, render_latex(net, scale_x, scale_y))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::structure::NodeRef::{Place as P, Transition as T};

    #[test]
    fn petri_library_nodes_and_scaled_positions() {
        let mut net = PetriNet::default();
        let p0 = net.add_place(2.0, 3.0, 1);
        let t0 = net.add_transition(4.0, 0.0);
        net.add_arc(T(t0), P(p0), 1.0).unwrap();

        let tex = render_latex(&mut net, 10.0, 10.0);
        assert!(tex.contains("\\usetikzlibrary{petri,positioning}"));
        assert!(tex.contains("tokens=1] (P0) at (20, -30) {};"));
        assert!(tex.contains("node[midway, above right] {1.00} (P0);"));
    }
}
