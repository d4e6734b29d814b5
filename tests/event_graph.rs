//! 事件图分析端到端场景: 规范形、邻接矩阵、线性系统与关键环。
use timed_petri::net::NodeRef::{Place as P, Transition as T};
use timed_petri::{NetError, PetriNet};

#[test]
fn canonical_form_explodes_tokens_into_a_chain() {
    // one cycle T0 -> P0(3 tokens, duration 2) -> T0
    let mut net = PetriNet::default();
    let t0 = net.add_transition(0.0, 0.0);
    let p0 = net.add_place(1.0, 0.0, 3);
    net.add_arc(T(t0), P(p0), 2.0).unwrap();
    net.add_arc(P(p0), T(t0), 0.0).unwrap();

    let mut canonic = net.to_canonical().unwrap();
    assert!(canonic.is_event_graph());
    assert_eq!(canonic.places().len(), 3);
    assert!(canonic.places().iter().all(|p| p.tokens == 1));

    let chain_duration: f32 = canonic
        .arcs()
        .iter()
        .filter(|arc| !arc.from.is_place())
        .map(|arc| arc.duration)
        .sum();
    assert_eq!(chain_duration, 2.0);
}

#[test]
fn adjacency_matrices_of_a_simple_loop() {
    // T0 -> P0(1 token, duration 2) -> T1 -> P1(0 tokens, duration 3) -> T0
    let mut net = PetriNet::default();
    let t0 = net.add_transition(0.0, 0.0);
    let t1 = net.add_transition(2.0, 0.0);
    let p0 = net.add_place(1.0, 0.0, 1);
    let p1 = net.add_place(1.0, 2.0, 0);
    net.add_arc(T(t0), P(p0), 2.0).unwrap();
    net.add_arc(P(p0), T(t1), 0.0).unwrap();
    net.add_arc(T(t1), P(p1), 3.0).unwrap();
    net.add_arc(P(p1), T(t0), 0.0).unwrap();

    let (tokens, durations) = net.to_adjacency_matrices().unwrap();
    assert_eq!(tokens.get(1, 0), Some(1.0));
    assert_eq!(tokens.get(0, 1), Some(0.0));
    assert_eq!(durations.get(1, 0), Some(2.0));
    assert_eq!(durations.get(0, 1), Some(3.0));
}

#[test]
fn syslin_classifies_inputs_states_and_outputs() {
    // T0 (input) -> P0(1, d=1) -> T1 (state) -> P1(0, d=2) -> T2 (output)
    let mut net = PetriNet::default();
    let t0 = net.add_transition(0.0, 0.0);
    let t1 = net.add_transition(2.0, 0.0);
    let t2 = net.add_transition(4.0, 0.0);
    let p0 = net.add_place(1.0, 0.0, 1);
    let p1 = net.add_place(3.0, 0.0, 0);
    net.add_arc(T(t0), P(p0), 1.0).unwrap();
    net.add_arc(P(p0), T(t1), 0.0).unwrap();
    net.add_arc(T(t1), P(p1), 2.0).unwrap();
    net.add_arc(P(p1), T(t2), 0.0).unwrap();

    let sys = net.to_sys_lin().unwrap();
    assert_eq!(sys.b.get(0, 0), Some(1.0));
    assert_eq!(sys.c.get(0, 0), Some(2.0));
    assert_eq!(sys.a.len(), 1);
    assert!(sys.d.is_empty());
}

#[test]
fn critical_cycle_of_two_transition_loop() {
    // durations 3 and 5, one token each: mean is (3 + 5) / 2 = 4
    let mut net = PetriNet::default();
    let t0 = net.add_transition(0.0, 0.0);
    let t1 = net.add_transition(2.0, 0.0);
    let p0 = net.add_place(1.0, 0.0, 1);
    let p1 = net.add_place(1.0, 2.0, 1);
    net.add_arc(T(t0), P(p0), 3.0).unwrap();
    net.add_arc(P(p0), T(t1), 0.0).unwrap();
    net.add_arc(T(t1), P(p1), 5.0).unwrap();
    net.add_arc(P(p1), T(t0), 0.0).unwrap();

    let cycle = net.find_critical_cycle().unwrap();
    for time in &cycle.cycle_time {
        assert!((time - 4.0).abs() < 1e-9);
    }
    assert_eq!(cycle.arcs.len(), 4);
}

#[test]
fn analyses_refuse_non_event_graphs() {
    let mut net = PetriNet::default();
    let p0 = net.add_place(0.0, 0.0, 1);
    let t0 = net.add_transition(1.0, 0.0);
    let t1 = net.add_transition(2.0, 0.0);
    net.add_arc(P(p0), T(t0), 0.0).unwrap();
    net.add_arc(P(p0), T(t1), 0.0).unwrap();

    assert!(matches!(
        net.to_adjacency_matrices(),
        Err(NetError::NotAnEventGraph(_))
    ));
    assert!(matches!(net.to_sys_lin(), Err(NetError::NotAnEventGraph(_))));
    assert!(matches!(
        net.find_critical_cycle(),
        Err(NetError::NotAnEventGraph(arcs)) if !arcs.is_empty()
    ));
}
