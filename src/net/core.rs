//! 网容器与结构操作: 增删节点与弧、二级邻接索引、事件图判定。
use log::debug;

use crate::net::error::NetError;
use crate::net::ids::{PlaceId, TransitionId};
use crate::net::index_vec::IndexVec;
use crate::net::structure::{Arc, NetKind, NodeRef, Place, Settings, Transition};

/// Container owning places, transitions and arcs. Arcs reference nodes by
/// dense ids; the per-node `arcs_in`/`arcs_out` lists are a secondary index
/// that may go stale between a structural mutation and the next
/// [`rebuild_adjacency`](Self::rebuild_adjacency) call.
#[derive(Debug, Clone)]
pub struct PetriNet {
    kind: NetKind,
    pub settings: Settings,
    pub(crate) places: IndexVec<PlaceId, Place>,
    pub(crate) transitions: IndexVec<TransitionId, Transition>,
    pub(crate) arcs: Vec<Arc>,
    next_place_id: u32,
    next_transition_id: u32,
    pub modified: bool,
    /// Working list reused across simulation steps.
    pub(crate) shuffled: Vec<TransitionId>,
    /// Arcs of the last critical cycle, for display.
    pub(crate) critical: Vec<Arc>,
}

impl PetriNet {
    pub fn new(kind: NetKind) -> Self {
        Self {
            kind,
            settings: Settings::for_kind(kind),
            places: IndexVec::new(),
            transitions: IndexVec::new(),
            arcs: Vec::new(),
            next_place_id: 0,
            next_transition_id: 0,
            modified: false,
            shuffled: Vec::new(),
            critical: Vec::new(),
        }
    }

    pub fn kind(&self) -> NetKind {
        self.kind
    }

    /// Switches the net flavour: adjusts the firing settings, clamps every
    /// place to the new token bound and resets receptivities.
    pub fn change_kind(&mut self, kind: NetKind) {
        self.kind = kind;
        self.settings = Settings::for_kind(kind);
        for place in self.places.iter_mut() {
            place.tokens = place.tokens.min(self.settings.max_tokens);
        }
        self.reset_receptivities();
    }

    /// In the plain Petri flavour transitions wait to be armed by the user;
    /// everywhere else receptivities default to true.
    pub fn reset_receptivities(&mut self) {
        let armed = self.kind != NetKind::Petri;
        for transition in self.transitions.iter_mut() {
            transition.receptivity = armed;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.places.is_empty() && self.transitions.is_empty()
    }

    /// Removes all nodes and arcs, resets id counters and the modified flag.
    pub fn clear(&mut self) {
        self.places.clear();
        self.transitions.clear();
        self.arcs.clear();
        self.shuffled.clear();
        self.critical.clear();
        self.next_place_id = 0;
        self.next_transition_id = 0;
        self.modified = false;
    }

    pub fn places(&self) -> &IndexVec<PlaceId, Place> {
        &self.places
    }

    pub fn transitions(&self) -> &IndexVec<TransitionId, Transition> {
        &self.transitions
    }

    pub fn arcs(&self) -> &[Arc] {
        &self.arcs
    }

    pub fn place(&self, id: PlaceId) -> Option<&Place> {
        self.places.get(id)
    }

    pub fn place_mut(&mut self, id: PlaceId) -> Option<&mut Place> {
        self.places.get_mut(id)
    }

    pub fn transition(&self, id: TransitionId) -> Option<&Transition> {
        self.transitions.get(id)
    }

    pub fn transition_mut(&mut self, id: TransitionId) -> Option<&mut Transition> {
        self.transitions.get_mut(id)
    }

    pub fn add_place(&mut self, x: f32, y: f32, tokens: u64) -> PlaceId {
        self.modified = true;
        let id = PlaceId::new(self.next_place_id);
        self.next_place_id += 1;
        self.places.push(Place::new(id, "", x, y, tokens))
    }

    /// Loader entry point: the explicit id bumps the counter past it. Ids
    /// stay dense, so the only admissible id is the next free slot.
    pub fn add_place_with_id(
        &mut self,
        id: u32,
        caption: &str,
        x: f32,
        y: f32,
        tokens: u64,
    ) -> PlaceId {
        debug_assert_eq!(id as usize, self.places.len());
        self.modified = true;
        if id + 1 > self.next_place_id {
            self.next_place_id = id + 1;
        }
        self.places.push(Place::new(PlaceId::new(id), caption, x, y, tokens))
    }

    pub fn add_transition(&mut self, x: f32, y: f32) -> TransitionId {
        self.modified = true;
        let id = TransitionId::new(self.next_transition_id);
        self.next_transition_id += 1;
        let armed = self.kind == NetKind::TimedPetri;
        self.transitions.push(Transition::new(id, "", x, y, 0, armed))
    }

    pub fn add_transition_with_id(
        &mut self,
        id: u32,
        caption: &str,
        x: f32,
        y: f32,
        angle: i32,
    ) -> TransitionId {
        debug_assert_eq!(id as usize, self.transitions.len());
        self.modified = true;
        if id + 1 > self.next_transition_id {
            self.next_transition_id = id + 1;
        }
        let armed = self.kind == NetKind::TimedPetri;
        self.transitions
            .push(Transition::new(TransitionId::new(id), caption, x, y, angle, armed))
    }

    pub fn contains(&self, node: NodeRef) -> bool {
        match node {
            NodeRef::Place(id) => self.places.get(id).is_some(),
            NodeRef::Transition(id) => self.transitions.get(id).is_some(),
        }
    }

    /// Resolves a user key such as "P42" or "T0" to an existing node.
    pub fn find_node(&self, key: &str) -> Result<NodeRef, NetError> {
        let node = NodeRef::parse(key).ok_or_else(|| NetError::BadNodeKey(key.to_string()))?;
        if self.contains(node) {
            Ok(node)
        } else {
            Err(NetError::UnknownNode(key.to_string()))
        }
    }

    pub fn node_position(&self, node: NodeRef) -> (f32, f32) {
        match node {
            NodeRef::Place(id) => (self.places[id].x, self.places[id].y),
            NodeRef::Transition(id) => (self.transitions[id].x, self.transitions[id].y),
        }
    }

    pub fn node_caption(&self, node: NodeRef) -> &str {
        match node {
            NodeRef::Place(id) => &self.places[id].caption,
            NodeRef::Transition(id) => &self.transitions[id].caption,
        }
    }

    pub fn find_arc(&self, from: NodeRef, to: NodeRef) -> Option<usize> {
        self.arcs
            .iter()
            .position(|arc| arc.from == from && arc.to == to)
    }

    /// Adds an arc between two nodes of different kinds. Fails on duplicate
    /// arcs, unknown endpoints and same-kind endpoints.
    pub fn add_arc(&mut self, from: NodeRef, to: NodeRef, duration: f32) -> Result<(), NetError> {
        self.check_arc_endpoints(from, to)?;
        if from.is_place() == to.is_place() {
            return Err(NetError::NotBipartite {
                from: from.key(),
                to: to.key(),
            });
        }
        self.push_arc(from, to, duration);
        Ok(())
    }

    /// Tolerant flavour for interactive use: a same-kind connection inserts a
    /// bridging node of the opposite kind at the segment midpoint and links
    /// it with two arcs, both carrying the requested duration. Returns the
    /// bridge node when one was inserted.
    pub fn add_arc_tolerant(
        &mut self,
        from: NodeRef,
        to: NodeRef,
        duration: f32,
    ) -> Result<Option<NodeRef>, NetError> {
        self.check_arc_endpoints(from, to)?;
        if from.is_place() != to.is_place() {
            self.push_arc(from, to, duration);
            return Ok(None);
        }

        let (from_x, from_y) = self.node_position(from);
        let (to_x, to_y) = self.node_position(to);
        let x = to_x + (from_x - to_x) / 2.0;
        let y = to_y + (from_y - to_y) / 2.0;

        let bridge = if to.is_place() {
            NodeRef::Transition(self.add_transition(x, y))
        } else {
            NodeRef::Place(self.add_place(x, y, 0))
        };
        debug!("inserted bridge node {bridge} between {from} and {to}");
        self.push_arc(from, bridge, duration);
        self.push_arc(bridge, to, duration);
        Ok(Some(bridge))
    }

    fn check_arc_endpoints(&self, from: NodeRef, to: NodeRef) -> Result<(), NetError> {
        if !self.contains(from) {
            return Err(NetError::UnknownNode(from.key()));
        }
        if !self.contains(to) {
            return Err(NetError::UnknownNode(to.key()));
        }
        if self.find_arc(from, to).is_some() {
            return Err(NetError::DuplicateArc {
                from: from.key(),
                to: to.key(),
            });
        }
        Ok(())
    }

    /// Appends the arc and maintains both sides of the adjacency index.
    fn push_arc(&mut self, from: NodeRef, to: NodeRef, duration: f32) {
        let idx = self.arcs.len();
        self.arcs.push(Arc::new(from, to, duration));
        match from {
            NodeRef::Place(id) => self.places[id].arcs_out.push(idx),
            NodeRef::Transition(id) => self.transitions[id].arcs_out.push(idx),
        }
        match to {
            NodeRef::Place(id) => self.places[id].arcs_in.push(idx),
            NodeRef::Transition(id) => self.transitions[id].arcs_in.push(idx),
        }
        self.modified = true;
    }

    /// Swap-removes the arc. The adjacency index is left stale; callers
    /// rebuild before the next read.
    pub fn remove_arc(&mut self, from: NodeRef, to: NodeRef) -> Result<(), NetError> {
        let idx = self.find_arc(from, to).ok_or(NetError::UnknownArc {
            from: from.key(),
            to: to.key(),
        })?;
        self.arcs.swap_remove(idx);
        self.modified = true;
        Ok(())
    }

    /// Removes a node with all incident arcs. The last node of the same kind
    /// is swapped into the vacated id and arcs pointing at it are rewritten,
    /// keeping ids dense. Restores the adjacency index afterwards.
    pub fn remove_node(&mut self, node: NodeRef) -> Result<(), NetError> {
        if !self.contains(node) {
            return Err(NetError::UnknownNode(node.key()));
        }

        let mut i = self.arcs.len();
        while i > 0 {
            i -= 1;
            if self.arcs[i].from == node || self.arcs[i].to == node {
                self.arcs.swap_remove(i);
            }
        }

        match node {
            NodeRef::Place(id) => {
                let last = self.places.last_idx().expect("checked non-empty");
                self.places.swap_remove(id);
                if id != last {
                    let moved = &mut self.places[id];
                    if moved.caption == moved.id.key() {
                        moved.caption = id.key();
                    }
                    moved.id = id;
                    self.rewire(NodeRef::Place(last), NodeRef::Place(id));
                }
                self.next_place_id -= 1;
            }
            NodeRef::Transition(id) => {
                let last = self.transitions.last_idx().expect("checked non-empty");
                self.transitions.swap_remove(id);
                if id != last {
                    let moved = &mut self.transitions[id];
                    if moved.caption == moved.id.key() {
                        moved.caption = id.key();
                    }
                    moved.id = id;
                    self.rewire(NodeRef::Transition(last), NodeRef::Transition(id));
                }
                self.next_transition_id -= 1;
            }
        }

        self.modified = true;
        self.rebuild_adjacency();
        Ok(())
    }

    fn rewire(&mut self, old: NodeRef, new: NodeRef) {
        for arc in self.arcs.iter_mut() {
            if arc.from == old {
                arc.from = new;
            }
            if arc.to == old {
                arc.to = new;
            }
        }
    }

    /// Clears every node's `arcs_in`/`arcs_out` and rescans the arc list.
    pub fn rebuild_adjacency(&mut self) {
        for place in self.places.iter_mut() {
            place.arcs_in.clear();
            place.arcs_out.clear();
        }
        for transition in self.transitions.iter_mut() {
            transition.arcs_in.clear();
            transition.arcs_out.clear();
        }
        for (idx, arc) in self.arcs.iter().enumerate() {
            match arc.from {
                NodeRef::Place(id) => self.places[id].arcs_out.push(idx),
                NodeRef::Transition(id) => self.transitions[id].arcs_out.push(idx),
            }
            match arc.to {
                NodeRef::Place(id) => self.places[id].arcs_in.push(idx),
                NodeRef::Transition(id) => self.transitions[id].arcs_in.push(idx),
            }
        }
    }

    /// The net is an event graph iff every place has exactly one input and
    /// one output arc. On failure the offending arcs are reported for visual
    /// diagnosis; the empty net is not an event graph.
    pub fn check_event_graph(&mut self) -> Result<(), NetError> {
        if self.is_empty() {
            return Err(NetError::NotAnEventGraph(Vec::new()));
        }
        self.rebuild_adjacency();

        let mut violated = false;
        let mut offending = Vec::new();
        for place in self.places.iter() {
            if place.arcs_in.len() == 1 && place.arcs_out.len() == 1 {
                continue;
            }
            violated = true;
            for &idx in place.arcs_in.iter().chain(place.arcs_out.iter()) {
                offending.push(self.arcs[idx]);
            }
        }
        if violated {
            Err(NetError::NotAnEventGraph(offending))
        } else {
            Ok(())
        }
    }

    pub fn is_event_graph(&mut self) -> bool {
        self.check_event_graph().is_ok()
    }

    /// Arcs of the last critical cycle computed by
    /// [`find_critical_cycle`](Self::find_critical_cycle).
    pub fn critical_cycle_arcs(&self) -> &[Arc] {
        &self.critical
    }

    pub fn marks(&self) -> Vec<u64> {
        self.places.iter().map(|place| place.tokens).collect()
    }

    pub fn set_marks(&mut self, marks: &[u64]) -> Result<(), NetError> {
        if marks.len() != self.places.len() {
            return Err(NetError::MarkingMismatch {
                expected: self.places.len(),
                got: marks.len(),
            });
        }
        for (place, &tokens) in self.places.iter_mut().zip(marks) {
            place.tokens = tokens;
        }
        Ok(())
    }
}

impl Default for PetriNet {
    fn default() -> Self {
        Self::new(NetKind::TimedPetri)
    }
}
