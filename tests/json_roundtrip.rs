//! 存档回环: 保存后重载得到同构网。
use std::env;
use std::path::PathBuf;

use timed_petri::net::NodeRef::{Place as P, Transition as T};
use timed_petri::PetriNet;

fn scratch_file(name: &str) -> PathBuf {
    env::temp_dir().join(name)
}

#[test]
fn save_then_load_is_isomorphic() {
    let mut net = PetriNet::default();
    let p0 = net.add_place(10.0, 20.5, 3);
    let p1 = net.add_place(30.0, 40.0, 0);
    let t0 = net.add_transition(20.0, 30.0);
    net.place_mut(p0).unwrap().caption = "upstream".to_string();
    net.transition_mut(t0).unwrap().angle = 45;
    net.add_arc(P(p0), T(t0), 0.0).unwrap();
    net.add_arc(T(t0), P(p1), 2.5).unwrap();

    let path = scratch_file("timed_petri_roundtrip.json");
    net.save(&path).unwrap();

    let mut loaded = PetriNet::default();
    loaded.load(&path).unwrap();

    assert_eq!(loaded.places().len(), net.places().len());
    assert_eq!(loaded.transitions().len(), net.transitions().len());
    for (original, copy) in net.places().iter().zip(loaded.places().iter()) {
        assert_eq!(original.id, copy.id);
        assert_eq!(original.caption, copy.caption);
        assert_eq!((original.x, original.y), (copy.x, copy.y));
        assert_eq!(original.tokens, copy.tokens);
    }
    for (original, copy) in net.transitions().iter().zip(loaded.transitions().iter()) {
        assert_eq!(original.id, copy.id);
        assert_eq!(original.angle, copy.angle);
    }
    for (original, copy) in net.arcs().iter().zip(loaded.arcs()) {
        assert_eq!(original, copy);
    }
}

#[test]
fn failed_load_leaves_the_net_cleared() {
    let mut net = PetriNet::default();
    net.add_place(0.0, 0.0, 1);

    let path = scratch_file("timed_petri_broken.json");
    std::fs::write(&path, "{ not json at all").unwrap();
    assert!(net.load(&path).is_err());
    assert!(net.is_empty());
}

#[test]
fn loading_a_missing_file_reports_io_failure() {
    let mut net = PetriNet::default();
    let path = scratch_file("timed_petri_definitely_missing.json");
    let _ = std::fs::remove_file(&path);
    assert!(matches!(
        net.load(&path),
        Err(timed_petri::NetError::Io(_))
    ));
}
