//! 图模型静态结构: 库所、变迁、弧与每网独立的发射配置。
use std::fmt;

use smallvec::SmallVec;

use crate::net::ids::{PlaceId, TransitionId};

/// Arc indices into [`crate::net::PetriNet`]'s arc list. Small nets dominate,
/// most nodes carry a handful of arcs.
pub type ArcList = SmallVec<[usize; 4]>;

/// The four net flavours sharing one graph model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetKind {
    Petri,
    TimedPetri,
    TimedEventGraph,
    Grafcet,
}

impl fmt::Display for NetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NetKind::Petri => "Petri net",
            NetKind::TimedPetri => "timed Petri net",
            NetKind::TimedEventGraph => "timed event graph",
            NetKind::Grafcet => "GRAFCET",
        };
        write!(f, "{name}")
    }
}

/// How many tokens an enabled transition burns per simulation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FiringPolicy {
    /// One token per enabled transition, fairer for conflicting transitions.
    OneByOne,
    /// The tightest input place decides the burnt count.
    MaxPossible,
}

/// Per-net firing configuration. GRAFCET caps every place at one token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub max_tokens: u64,
    pub firing: FiringPolicy,
}

impl Settings {
    pub fn for_kind(kind: NetKind) -> Self {
        match kind {
            NetKind::Grafcet => Self {
                max_tokens: 1,
                firing: FiringPolicy::OneByOne,
            },
            NetKind::Petri => Self {
                max_tokens: u64::MAX,
                firing: FiringPolicy::MaxPossible,
            },
            NetKind::TimedPetri | NetKind::TimedEventGraph => Self {
                max_tokens: u64::MAX,
                firing: FiringPolicy::OneByOne,
            },
        }
    }
}

/// A node of the bipartite graph, referenced by kind and dense id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    Place(PlaceId),
    Transition(TransitionId),
}

impl NodeRef {
    pub fn is_place(self) -> bool {
        matches!(self, NodeRef::Place(_))
    }

    pub fn key(self) -> String {
        self.to_string()
    }

    /// Parses a user key such as "P3" or "T0". Existence is not checked here.
    pub fn parse(key: &str) -> Option<Self> {
        let id = key.get(1..)?.parse::<u32>().ok()?;
        match key.as_bytes().first()? {
            b'P' => Some(NodeRef::Place(PlaceId::new(id))),
            b'T' => Some(NodeRef::Transition(TransitionId::new(id))),
            _ => None,
        }
    }
}

impl fmt::Display for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeRef::Place(id) => write!(f, "{id}"),
            NodeRef::Transition(id) => write!(f, "{id}"),
        }
    }
}

/// A place holds tokens. The adjacency lists are a derived index rebuilt by
/// [`crate::net::PetriNet::rebuild_adjacency`]; the arc list is the source of
/// truth.
#[derive(Debug, Clone)]
pub struct Place {
    pub id: PlaceId,
    pub caption: String,
    pub x: f32,
    pub y: f32,
    pub tokens: u64,
    pub arcs_in: ArcList,
    pub arcs_out: ArcList,
}

impl Place {
    pub fn new(id: PlaceId, caption: &str, x: f32, y: f32, tokens: u64) -> Self {
        let caption = if caption.is_empty() {
            id.key()
        } else {
            caption.to_string()
        };
        Self {
            id,
            caption,
            x,
            y,
            tokens,
            arcs_in: ArcList::new(),
            arcs_out: ArcList::new(),
        }
    }

    pub fn key(&self) -> String {
        self.id.key()
    }
}

/// A transition fires when every input place holds a token and its
/// receptivity holds. `index` is scratch storage for the Max-Plus
/// translation.
#[derive(Debug, Clone)]
pub struct Transition {
    pub id: TransitionId,
    pub caption: String,
    pub x: f32,
    pub y: f32,
    pub angle: i32,
    pub receptivity: bool,
    pub index: usize,
    pub arcs_in: ArcList,
    pub arcs_out: ArcList,
}

impl Transition {
    pub fn new(id: TransitionId, caption: &str, x: f32, y: f32, angle: i32, armed: bool) -> Self {
        let caption = if caption.is_empty() {
            id.key()
        } else {
            caption.to_string()
        };
        Self {
            id,
            caption,
            x,
            y,
            angle,
            receptivity: armed,
            index: 0,
            arcs_in: ArcList::new(),
            arcs_out: ArcList::new(),
        }
    }

    pub fn key(&self) -> String {
        self.id.key()
    }

    /// A source for the system: no upstream place feeds it.
    pub fn is_input(&self) -> bool {
        self.arcs_in.is_empty() && !self.arcs_out.is_empty()
    }

    /// A sink for the system: nothing downstream consumes it.
    pub fn is_output(&self) -> bool {
        !self.arcs_in.is_empty() && self.arcs_out.is_empty()
    }

    pub fn is_state(&self) -> bool {
        !self.arcs_in.is_empty() && !self.arcs_out.is_empty()
    }
}

/// Directed arc between two nodes of different kinds. A duration is only
/// meaningful on Transition -> Place arcs; analyses ignore it on the
/// Place -> Transition direction. Non-finite durations collapse to zero.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arc {
    pub from: NodeRef,
    pub to: NodeRef,
    pub duration: f32,
}

impl Arc {
    pub fn new(from: NodeRef, to: NodeRef, duration: f32) -> Self {
        let duration = if duration.is_finite() { duration } else { 0.0 };
        Self { from, to, duration }
    }
}
