//! PNEditor 四文件导出: `.pns` 网结构与 `.pnl` 版面为小端序 32 位二进制,
//! `.pnkp`/`.pnk` 为纯文本标题表。
use std::fs;
use std::path::Path;

use crate::net::core::PetriNet;
use crate::net::error::NetError;
use crate::net::index_vec::Idx;
use crate::net::structure::NodeRef;

fn push_i32(out: &mut Vec<u8>, value: usize) {
    out.extend_from_slice(&(value as i32).to_le_bytes());
}

fn push_f32(out: &mut Vec<u8>, value: f32) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Logical structure: place markings, then per transition its successor and
/// predecessor place ids.
pub fn render_pns(net: &mut PetriNet) -> Vec<u8> {
    net.rebuild_adjacency();
    let mut out = Vec::new();

    push_i32(&mut out, net.places().len());
    for place in net.places().iter() {
        push_i32(&mut out, place.tokens as usize);
    }

    push_i32(&mut out, net.transitions().len());
    for transition in net.transitions().iter() {
        push_i32(&mut out, transition.arcs_out.len());
        for &idx in transition.arcs_out.iter() {
            if let NodeRef::Place(id) = net.arcs()[idx].to {
                push_i32(&mut out, id.index());
            }
        }
        push_i32(&mut out, transition.arcs_in.len());
        for &idx in transition.arcs_in.iter() {
            if let NodeRef::Place(id) = net.arcs()[idx].from {
                push_i32(&mut out, id.index());
            }
        }
    }
    out
}

/// Layout: transition coordinates first, then place coordinates.
pub fn render_pnl(net: &PetriNet) -> Vec<u8> {
    let mut out = Vec::new();
    for transition in net.transitions().iter() {
        push_f32(&mut out, transition.x);
        push_f32(&mut out, transition.y);
    }
    for place in net.places().iter() {
        push_f32(&mut out, place.x);
        push_f32(&mut out, place.y);
    }
    out
}

/// Writes the four companion files next to `path`, swapping its extension.
pub fn export_pneditor(net: &mut PetriNet, path: &Path) -> Result<(), NetError> {
    fs::write(path.with_extension("pns"), render_pns(net))?;
    fs::write(path.with_extension("pnl"), render_pnl(net))?;

    let mut captions = String::new();
    for place in net.places().iter() {
        captions.push_str(&place.caption);
        captions.push('\n');
    }
    fs::write(path.with_extension("pnkp"), captions)?;

    let mut captions = String::new();
    for transition in net.transitions().iter() {
        captions.push_str(&transition.caption);
        captions.push('\n');
    }
    fs::write(path.with_extension("pnk"), captions)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::structure::NodeRef::{Place as P, Transition as T};

    #[test]
    fn structure_is_little_endian_int32() {
        let mut net = PetriNet::default();
        let p0 = net.add_place(0.0, 0.0, 2);
        let t0 = net.add_transition(1.0, 0.0);
        net.add_arc(P(p0), T(t0), 0.0).unwrap();

        let bytes = render_pns(&mut net);
        // one place with two tokens, one transition: no successor, one
        // predecessor (place 0)
        let expected: Vec<i32> = vec![1, 2, 1, 0, 1, 0];
        let decoded: Vec<i32> = bytes
            .chunks_exact(4)
            .map(|b| i32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        assert_eq!(decoded, expected);
    }

    #[test]
    fn layout_stores_transitions_before_places() {
        let mut net = PetriNet::default();
        net.add_place(3.0, 4.0, 0);
        net.add_transition(1.0, 2.0);

        let bytes = render_pnl(&net);
        let decoded: Vec<f32> = bytes
            .chunks_exact(4)
            .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
            .collect();
        assert_eq!(decoded, vec![1.0, 2.0, 3.0, 4.0]);
    }
}
