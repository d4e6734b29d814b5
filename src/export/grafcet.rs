//! GRAFCET C++ 代码生成: 生成头文件与待实现的骨架源文件一对。
//!
//! The generated class drives its steps from an MQTT collaborator: it
//! subscribes to `pneditor/<namespace>` and publishes after every cycle a
//! message starting with the byte 'T' followed by one boolean byte per
//! transition. Receptivities `T<i>()` and step actions `P<i>()` are hooks
//! the user implements in the companion source file.
use std::fmt::Write;
use std::fs;
use std::path::Path;

use crate::net::core::PetriNet;
use crate::net::error::NetError;
use crate::net::index_vec::Idx;
use crate::net::structure::NodeRef;

pub fn render_header(net: &mut PetriNet, namespace: &str) -> String {
    net.rebuild_adjacency();
    let guard = format!("GENERATED_GRAFCET_{}_HPP", namespace.to_uppercase());
    let mut out = String::new();

    let _ = writeln!(out, "// This file has been generated and you should avoid editing it.");
    let _ = writeln!(out, "// Note: the code generator is still experimental !");
    let _ = writeln!(out);
    let _ = writeln!(out, "#ifndef {guard}");
    let _ = writeln!(out, "#  define {guard}");
    let _ = writeln!(out);
    let _ = writeln!(out, "#  include \"MQTT.hpp\"");
    let _ = writeln!(out);
    let _ = writeln!(out, "namespace {namespace} {{");
    let _ = writeln!(out);
    let _ = writeln!(out, "class Grafcet: public MQTT");
    let _ = writeln!(out, "{{");
    let _ = writeln!(out, "public:");
    let _ = writeln!(out);
    let _ = writeln!(out, "    Grafcet() {{ initGPIO(); reset(); }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "    std::string& topic() {{ return m_topic; }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "    void reset()");
    let _ = writeln!(out, "    {{");
    for place in net.places().iter() {
        let _ = writeln!(
            out,
            "        X[{}] = {}; // {}",
            place.id.index(),
            if place.tokens > 0 { "true" } else { "false" },
            place.caption
        );
    }
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "    void step()");
    let _ = writeln!(out, "    {{");
    let _ = writeln!(out, "        doActions();");
    let _ = writeln!(out, "        readInputs();");
    let _ = writeln!(out, "        setTransitions();");
    let _ = writeln!(out, "        setSteps();");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "private:");
    let _ = writeln!(out);
    let _ = writeln!(out, "    virtual void onConnected(int rc) override;");
    let _ = writeln!(
        out,
        "    virtual void onMessageReceived(const struct mosquitto_message& message) override;"
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "    void publish()");
    let _ = writeln!(out, "    {{");
    let _ = writeln!(out, "        static char message[MAX_TRANSITIONS + 1u] = {{ 'T' }};");
    let _ = writeln!(out);
    let _ = writeln!(out, "        for (size_t i = 0u; i < MAX_TRANSITIONS; ++i)");
    let _ = writeln!(out, "            message[i + 1u] = T[i];");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "        MQTT::publish(topic().c_str(), std::string(message, MAX_TRANSITIONS + 1u), MQTT::QoS::QoS0);"
    );
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "    void initGPIO();");
    let _ = writeln!(out, "    void readInputs();");
    let _ = writeln!(out);
    let _ = writeln!(out, "    void doActions()");
    let _ = writeln!(out, "    {{");
    for place in net.places().iter() {
        let i = place.id.index();
        let _ = writeln!(out, "        if (X[{i}]) {{ P{i}(); }}");
    }
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "    void setTransitions()");
    let _ = writeln!(out, "    {{");
    for transition in net.transitions().iter() {
        let i = transition.id.index();
        let _ = write!(out, "        T[{i}] =");
        for &idx in transition.arcs_in.iter() {
            if let NodeRef::Place(place) = net.arcs()[idx].from {
                let _ = write!(out, " X[{}] &&", place.index());
            }
        }
        let _ = writeln!(out, " T{i}();");
    }
    let _ = writeln!(out, "        publish();");
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "    void setSteps()");
    let _ = writeln!(out, "    {{");
    for transition in net.transitions().iter() {
        let _ = writeln!(out, "        if (T[{}])", transition.id.index());
        let _ = writeln!(out, "        {{");
        for &idx in transition.arcs_in.iter() {
            if let NodeRef::Place(place) = net.arcs()[idx].from {
                let _ = writeln!(out, "            X[{}] = false;", place.index());
            }
        }
        for &idx in transition.arcs_out.iter() {
            if let NodeRef::Place(place) = net.arcs()[idx].to {
                let _ = writeln!(out, "            X[{}] = true;", place.index());
            }
        }
        let _ = writeln!(out, "        }}");
    }
    let _ = writeln!(out, "    }}");
    let _ = writeln!(out);
    let _ = writeln!(out, "private: // You have to implement the following methods in the C++ file");
    let _ = writeln!(out);
    for transition in net.transitions().iter() {
        let _ = writeln!(out, "    //! \\brief Receptivity of transition {}: \"{}\"", transition.id.index(), transition.caption);
        let _ = writeln!(out, "    bool T{}() const;", transition.id.index());
    }
    for place in net.places().iter() {
        let _ = writeln!(out, "    //! \\brief Actions on step {}: \"{}\"", place.id.index(), place.caption);
        let _ = writeln!(out, "    void P{}();", place.id.index());
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "private:");
    let _ = writeln!(out);
    let _ = writeln!(out, "    static const size_t MAX_STEPS = {}u;", net.places().len());
    let _ = writeln!(
        out,
        "    static const size_t MAX_TRANSITIONS = {}u;",
        net.transitions().len()
    );
    let _ = writeln!(out, "    //! \\brief Steps");
    let _ = writeln!(out, "    bool X[MAX_STEPS];");
    let _ = writeln!(out, "    //! \\brief Transitions");
    let _ = writeln!(out, "    bool T[MAX_TRANSITIONS];");
    let _ = writeln!(out, "    //! \\brief MQTT topic to talk with the Petri net editor");
    let _ = writeln!(out, "    std::string m_topic = \"pneditor/{namespace}\";");
    let _ = writeln!(out, "}};");
    let _ = writeln!(out);
    let _ = writeln!(out, "}} // namespace {namespace}");
    let _ = writeln!(out, "#endif // {guard}");
    out
}

pub fn render_skeleton(net: &PetriNet, namespace: &str, header: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "// Skeleton to fill: receptivities and step actions.");
    let _ = writeln!(out, "#include \"{header}\"");
    let _ = writeln!(out);
    let _ = writeln!(out, "namespace {namespace} {{");
    let _ = writeln!(out);
    let _ = writeln!(out, "void Grafcet::initGPIO() {{}}");
    let _ = writeln!(out, "void Grafcet::readInputs() {{}}");
    let _ = writeln!(out);
    let _ = writeln!(out, "void Grafcet::onConnected(int /*rc*/)");
    let _ = writeln!(out, "{{");
    let _ = writeln!(out, "    subscribe(topic().c_str(), MQTT::QoS::QoS0);");
    let _ = writeln!(out, "}}");
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "void Grafcet::onMessageReceived(const struct mosquitto_message& /*message*/) {{}}"
    );
    let _ = writeln!(out);
    for transition in net.transitions().iter() {
        let _ = writeln!(
            out,
            "bool Grafcet::T{}() const {{ return true; }}",
            transition.id.index()
        );
    }
    let _ = writeln!(out);
    for place in net.places().iter() {
        let _ = writeln!(out, "void Grafcet::P{}() {{}}", place.id.index());
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "}} // namespace {namespace}");
    out
}

/// Writes the header at `path` and the skeleton next to it with a `.cpp`
/// extension.
pub fn export_grafcet_cpp(net: &mut PetriNet, path: &Path, namespace: &str) -> Result<(), NetError> {
    let header = render_header(net, namespace);
    fs::write(path, header)?;

    let header_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "grafcet.hpp".to_string());
    let skeleton = render_skeleton(net, namespace, &header_name);
    fs::write(path.with_extension("cpp"), skeleton)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::structure::NetKind;
    use crate::net::structure::NodeRef::{Place as P, Transition as T};

    fn two_step_grafcet() -> PetriNet {
        let mut net = PetriNet::new(NetKind::Grafcet);
        let p0 = net.add_place(0.0, 0.0, 1);
        let p1 = net.add_place(2.0, 0.0, 0);
        let t0 = net.add_transition(1.0, 0.0);
        net.add_arc(P(p0), T(t0), 0.0).unwrap();
        net.add_arc(T(t0), P(p1), 0.0).unwrap();
        net
    }

    #[test]
    fn header_wires_steps_and_transitions() {
        let mut net = two_step_grafcet();
        let header = render_header(&mut net, "machine");
        assert!(header.contains("#ifndef GENERATED_GRAFCET_MACHINE_HPP"));
        assert!(header.contains("namespace machine {"));
        assert!(header.contains("        X[0] = true; // P0"));
        assert!(header.contains("        X[1] = false; // P1"));
        assert!(header.contains("        T[0] = X[0] && T0();"));
        assert!(header.contains("            X[0] = false;"));
        assert!(header.contains("            X[1] = true;"));
        assert!(header.contains("std::string m_topic = \"pneditor/machine\";"));
    }

    #[test]
    fn skeleton_stubs_every_hook() {
        let mut net = two_step_grafcet();
        net.rebuild_adjacency();
        let skeleton = render_skeleton(&net, "machine", "machine.hpp");
        assert!(skeleton.contains("#include \"machine.hpp\""));
        assert!(skeleton.contains("bool Grafcet::T0() const { return true; }"));
        assert!(skeleton.contains("void Grafcet::P0() {}"));
        assert!(skeleton.contains("void Grafcet::P1() {}"));
    }
}
