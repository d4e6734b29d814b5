use std::fmt::Write;
use std::fs;
use std::path::Path;

use crate::net::core::PetriNet;
use crate::net::error::NetError;

pub fn render_symfony(net: &mut PetriNet, name: &str) -> String {
    net.rebuild_adjacency();
    let mut out = String::new();

    let _ = writeln!(out, "framework:");
    let _ = writeln!(out, "    workflows:");
    let _ = writeln!(out, "        {name}:");
    let _ = writeln!(out, "            type: 'workflow'");
    let _ = writeln!(out, "            audit_trail:");
    let _ = writeln!(out, "                enabled: true");
    let _ = writeln!(out, "            marking_store:");
    let _ = writeln!(out, "                type: 'method'");
    let _ = writeln!(out, "                property: 'currentPlace'");

    let _ = writeln!(out, "            initial_marking:");
    for place in net.places().iter().filter(|p| p.tokens > 0) {
        let _ = writeln!(out, "                - {}", place.caption);
    }

    let _ = writeln!(out, "            places:");
    for place in net.places().iter() {
        let _ = writeln!(out, "                - {}", place.caption);
    }

    let _ = writeln!(out, "            transitions:");
    for transition in net.transitions().iter() {
        let _ = writeln!(out, "                {}:", transition.caption);
        let _ = writeln!(out, "                    from:");
        for &idx in transition.arcs_in.iter() {
            let from = net.arcs()[idx].from;
            let _ = writeln!(out, "                        - {}", net.node_caption(from));
        }
        let _ = writeln!(out, "                    to:");
        for &idx in transition.arcs_out.iter() {
            let to = net.arcs()[idx].to;
            let _ = writeln!(out, "                        - {}", net.node_caption(to));
        }
    }
    out
}

pub fn export_symfony(net: &mut PetriNet, path: &Path, name: &str) -> Result<(), NetError> {
    fs::write(path, render_symfony(net, name))?;
    Ok(())
}
