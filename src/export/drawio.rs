use std::fmt::Write;
use std::fs;
use std::path::Path;

use crate::export::{PLACE_RADIUS, TRANS_HEIGHT, TRANS_WIDTH};
use crate::net::core::PetriNet;
use crate::net::error::NetError;

const SCALE: f32 = 2.0;

const HEADER: &str = r#"<mxfile host="Electron" version="21.1.2" type="device">
  <diagram name="Page-1" id="net">
    <mxGraphModel dx="1362" dy="843" grid="1" gridSize="10" guides="1" tooltips="1" connect="1" arrows="1" fold="1" page="1" pageScale="1" pageWidth="1169" pageHeight="827" math="0" shadow="0">
      <root>
        <mxCell id="0" />
        <mxCell id="1" parent="0" />
"#;

const FOOTER: &str = r#"      </root>
    </mxGraphModel>
  </diagram>
</mxfile>
"#;

pub fn render_drawio(net: &mut PetriNet) -> String {
    net.rebuild_adjacency();
    let mut out = String::from(HEADER);

    for place in net.places().iter() {
        let _ = writeln!(
            out,
            "        <mxCell id=\"{}\" value=\"{}\" style=\"ellipse;whiteSpace=wrap;html=1;aspect=fixed;\" vertex=\"1\" parent=\"1\">\n          <mxGeometry x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" as=\"geometry\" />\n        </mxCell>",
            place.key(),
            place.caption,
            place.x,
            place.y,
            PLACE_RADIUS * SCALE,
            PLACE_RADIUS * SCALE,
        );
    }

    for transition in net.transitions().iter() {
        let _ = writeln!(
            out,
            "        <mxCell id=\"{}\" value=\"{}\" style=\"whiteSpace=wrap;html=1;aspect=fixed;\" vertex=\"1\" parent=\"1\">\n          <mxGeometry x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" as=\"geometry\" />\n        </mxCell>",
            transition.key(),
            transition.caption,
            transition.x,
            transition.y,
            TRANS_WIDTH * SCALE,
            TRANS_HEIGHT * SCALE,
        );
    }

    for arc in net.arcs() {
        let (from_x, from_y) = net.node_position(arc.from);
        let (to_x, to_y) = net.node_position(arc.to);
        let _ = writeln!(
            out,
            "        <mxCell id=\"{from}{to}\" value=\"\" style=\"endArrow=classic;html=1;rounded=0;exitX=0.5;exitY=1;exitDx=0;exitDy=0;entryX=0.5;entryY=0;entryDx=0;entryDy=0;\" edge=\"1\" parent=\"1\" source=\"{from}\" target=\"{to}\">\n          <mxGeometry width=\"50\" height=\"50\" relative=\"1\" as=\"geometry\">\n            <mxPoint x=\"{from_x}\" y=\"{from_y}\" as=\"sourcePoint\" />\n            <mxPoint x=\"{to_x}\" y=\"{to_y}\" as=\"targetPoint\" />\n          </mxGeometry>\n        </mxCell>",
            from = arc.from,
            to = arc.to,
        );
    }

    out.push_str(FOOTER);
    out
}

pub fn export_drawio(net: &mut PetriNet, path: &Path) -> Result<(), NetError> {
    fs::write(path, render_drawio(net))?;
    Ok(())
}
