//! Julia Max-Plus 脚本导出: 邻接矩阵、dater/counter 形与 `(D, A, B, C)` 系统。
use std::fmt::Write;
use std::fs;
use std::path::Path;

use crate::net::core::PetriNet;
use crate::net::error::NetError;
use crate::net::structure::NodeRef;

pub fn render_julia(net: &mut PetriNet) -> Result<String, NetError> {
    net.check_event_graph()?;
    let mut canonic = net.to_canonical()?;
    canonic.assign_role_indices();

    let mut out = String::new();
    let _ = writeln!(out, "# This file has been generated");
    let _ = writeln!(out);
    let _ = writeln!(out, "using MaxPlus, SparseArrays");
    let _ = writeln!(out);

    let _ = writeln!(out, "## Petri Transitions:");
    for transition in canonic.transitions().iter().filter(|t| t.is_input()) {
        let _ = writeln!(out, "# {}: input (U{})", transition.key(), transition.index + 1);
    }
    for transition in canonic.transitions().iter().filter(|t| t.is_state()) {
        let _ = writeln!(out, "# {}: state (X{})", transition.key(), transition.index + 1);
    }
    for transition in canonic.transitions().iter().filter(|t| t.is_output()) {
        let _ = writeln!(out, "# {}: output (Y{})", transition.key(), transition.index + 1);
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "## Timed event graph depict as two graph adjacency matrices:");
    let _ = writeln!(out, "# Nodes are Transitions.");
    let _ = writeln!(out, "# Arcs are Places and therefore have tokens and durations");
    let (tokens, durations) = canonic.to_adjacency_matrices()?;
    for place in canonic.places().iter() {
        let inbound = canonic.arcs()[place.arcs_in[0]];
        let outbound = canonic.arcs()[place.arcs_out[0]];
        let (NodeRef::Transition(from), NodeRef::Transition(to)) = (inbound.from, outbound.to)
        else {
            continue;
        };
        let _ = writeln!(
            out,
            "# Arc {}: {} -> {} (Duration: {}, Tokens: {})",
            place.key(),
            from,
            to,
            inbound.duration,
            place.tokens
        );
    }
    let _ = writeln!(out, "N = sparse({tokens}) # Tokens");
    let _ = writeln!(out, "T = sparse({durations}) # Durations");

    let _ = writeln!(out);
    out.push_str(&net.counter_form("# "));
    let _ = writeln!(out);
    out.push_str(&net.dater_form("# "));

    let sys = net.to_sys_lin()?;
    let _ = writeln!(out);
    let _ = writeln!(out, "## Max-Plus implicit linear dynamic system of the dater form:");
    let _ = writeln!(out, "# X(n) = D X(n) (+) A X(n-1) (+) B U(n)");
    let _ = writeln!(out, "# Y(n) = C X(n)");
    let _ = writeln!(out, "D = sparse({}) # States without tokens", sys.d);
    let _ = writeln!(out, "A = sparse({}) # States with 1 token", sys.a);
    let _ = writeln!(out, "B = sparse({}) # Inputs", sys.b);
    let _ = writeln!(out, "C = sparse({}) # Outputs", sys.c);
    let _ = writeln!(out, "S = MPSysLin(A, B, C, D)");

    let _ = writeln!(out);
    let _ = writeln!(out, "l,v = semihoward(S.D, S.A)");
    Ok(out)
}

pub fn export_julia(net: &mut PetriNet, path: &Path) -> Result<(), NetError> {
    let script = render_julia(net)?;
    fs::write(path, script)?;
    Ok(())
}
