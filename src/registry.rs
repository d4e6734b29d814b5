//! 句柄表: 以整数句柄管理多个网实例, 供外部数值环境调用。
//!
//! 句柄即槽位下标, 从不复用; `destroy` 仅清空槽位。非法句柄一律返回
//! `false`/`-1`/`None` 并写日志, 错误不跨边界抛出。
use std::path::Path;

use log::error;

use crate::maxplus::sparse::SparseMatrix;
use crate::maxplus::syslin::SysLin;
use crate::net::core::PetriNet;
use crate::net::ids::{PlaceId, TransitionId};
use crate::net::structure::{NetKind, NodeRef};

/// Position and marking snapshot of a place, for external callers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaceState {
    pub x: f32,
    pub y: f32,
    pub tokens: u64,
}

/// Position snapshot of a transition.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionState {
    pub x: f32,
    pub y: f32,
}

/// Process-wide ordered store of owned nets. Not thread-safe: callers
/// serialize access externally.
#[derive(Debug, Default)]
pub struct Registry {
    nets: Vec<Option<PetriNet>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    fn net(&self, handle: usize) -> Option<&PetriNet> {
        match self.nets.get(handle) {
            Some(Some(net)) => Some(net),
            _ => {
                error!("unknown Petri net handle {handle}");
                None
            }
        }
    }

    fn net_mut(&mut self, handle: usize) -> Option<&mut PetriNet> {
        match self.nets.get_mut(handle) {
            Some(Some(net)) => Some(net),
            _ => {
                error!("unknown Petri net handle {handle}");
                None
            }
        }
    }

    pub fn create(&mut self) -> usize {
        self.nets.push(Some(PetriNet::new(NetKind::TimedPetri)));
        self.nets.len() - 1
    }

    pub fn copy(&mut self, handle: usize) -> i64 {
        let Some(net) = self.net(handle).cloned() else {
            return -1;
        };
        self.nets.push(Some(net));
        (self.nets.len() - 1) as i64
    }

    /// Frees the slot. The handle is never handed out again.
    pub fn destroy(&mut self, handle: usize) -> bool {
        match self.nets.get_mut(handle) {
            Some(slot @ Some(_)) => {
                *slot = None;
                true
            }
            _ => {
                error!("unknown Petri net handle {handle}");
                false
            }
        }
    }

    pub fn reset(&mut self, handle: usize) -> bool {
        match self.net_mut(handle) {
            Some(net) => {
                net.clear();
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self, handle: usize) -> Option<bool> {
        self.net(handle).map(|net| net.is_empty())
    }

    pub fn count_places(&self, handle: usize) -> i64 {
        self.net(handle)
            .map_or(-1, |net| net.places().len() as i64)
    }

    pub fn count_transitions(&self, handle: usize) -> i64 {
        self.net(handle)
            .map_or(-1, |net| net.transitions().len() as i64)
    }

    pub fn places(&self, handle: usize) -> Option<Vec<PlaceState>> {
        self.net(handle).map(|net| {
            net.places()
                .iter()
                .map(|p| PlaceState {
                    x: p.x,
                    y: p.y,
                    tokens: p.tokens,
                })
                .collect()
        })
    }

    pub fn place(&self, handle: usize, id: u32) -> Option<PlaceState> {
        let place = self.net(handle)?.place(PlaceId::new(id));
        if place.is_none() {
            error!("unknown place {id}");
        }
        place.map(|p| PlaceState {
            x: p.x,
            y: p.y,
            tokens: p.tokens,
        })
    }

    pub fn transitions(&self, handle: usize) -> Option<Vec<TransitionState>> {
        self.net(handle).map(|net| {
            net.transitions()
                .iter()
                .map(|t| TransitionState { x: t.x, y: t.y })
                .collect()
        })
    }

    pub fn transition(&self, handle: usize, id: u32) -> Option<TransitionState> {
        let transition = self.net(handle)?.transition(TransitionId::new(id));
        if transition.is_none() {
            error!("unknown transition {id}");
        }
        transition.map(|t| TransitionState { x: t.x, y: t.y })
    }

    pub fn marks(&self, handle: usize) -> Option<Vec<u64>> {
        self.net(handle).map(|net| net.marks())
    }

    pub fn set_marks(&mut self, handle: usize, marks: &[u64]) -> bool {
        let Some(net) = self.net_mut(handle) else {
            return false;
        };
        match net.set_marks(marks) {
            Ok(()) => true,
            Err(err) => {
                error!("{err}");
                false
            }
        }
    }

    pub fn add_place(&mut self, handle: usize, x: f32, y: f32, tokens: u64) -> i64 {
        match self.net_mut(handle) {
            Some(net) => net.add_place(x, y, tokens).raw() as i64,
            None => -1,
        }
    }

    pub fn add_transition(&mut self, handle: usize, x: f32, y: f32) -> i64 {
        match self.net_mut(handle) {
            Some(net) => net.add_transition(x, y).raw() as i64,
            None => -1,
        }
    }

    pub fn remove_place(&mut self, handle: usize, id: u32) -> bool {
        self.remove_node(handle, NodeRef::Place(PlaceId::new(id)))
    }

    pub fn remove_transition(&mut self, handle: usize, id: u32) -> bool {
        self.remove_node(handle, NodeRef::Transition(TransitionId::new(id)))
    }

    fn remove_node(&mut self, handle: usize, node: NodeRef) -> bool {
        let Some(net) = self.net_mut(handle) else {
            return false;
        };
        match net.remove_node(node) {
            Ok(()) => true,
            Err(err) => {
                error!("{err}");
                false
            }
        }
    }

    /// Returns the index of the added arc, or -1.
    pub fn add_arc(&mut self, handle: usize, from: &str, to: &str, duration: f32) -> i64 {
        let Some(net) = self.net_mut(handle) else {
            return -1;
        };
        let linked = net
            .find_node(from)
            .and_then(|from| Ok((from, net.find_node(to)?)))
            .and_then(|(from, to)| net.add_arc(from, to, duration));
        match linked {
            Ok(()) => (net.arcs().len() - 1) as i64,
            Err(err) => {
                error!("{err}");
                -1
            }
        }
    }

    pub fn remove_arc(&mut self, handle: usize, from: &str, to: &str) -> bool {
        let Some(net) = self.net_mut(handle) else {
            return false;
        };
        let removed = net
            .find_node(from)
            .and_then(|from| Ok((from, net.find_node(to)?)))
            .and_then(|(from, to)| net.remove_arc(from, to));
        match removed {
            Ok(()) => true,
            Err(err) => {
                error!("{err}");
                false
            }
        }
    }

    pub fn tokens(&self, handle: usize, id: u32) -> i64 {
        match self.net(handle).and_then(|net| net.place(PlaceId::new(id))) {
            Some(place) => place.tokens as i64,
            None => -1,
        }
    }

    pub fn set_tokens(&mut self, handle: usize, id: u32, tokens: u64) -> bool {
        match self
            .net_mut(handle)
            .and_then(|net| net.place_mut(PlaceId::new(id)))
        {
            Some(place) => {
                place.tokens = tokens;
                true
            }
            None => {
                error!("unknown place {id}");
                false
            }
        }
    }

    pub fn save(&self, handle: usize, path: &Path) -> bool {
        let Some(net) = self.net(handle) else {
            return false;
        };
        match net.save(path) {
            Ok(()) => true,
            Err(err) => {
                error!("{err}");
                false
            }
        }
    }

    pub fn load(&mut self, handle: usize, path: &Path) -> bool {
        let Some(net) = self.net_mut(handle) else {
            return false;
        };
        match net.load(path) {
            Ok(()) => true,
            Err(err) => {
                error!("{err}");
                false
            }
        }
    }

    pub fn is_event_graph(&mut self, handle: usize) -> Option<bool> {
        self.net_mut(handle).map(|net| net.is_event_graph())
    }

    /// Canonicalizes into a fresh slot and returns its handle.
    pub fn to_canonical(&mut self, handle: usize) -> i64 {
        let Some(net) = self.net_mut(handle) else {
            return -1;
        };
        match net.to_canonical() {
            Ok(canonic) => {
                self.nets.push(Some(canonic));
                (self.nets.len() - 1) as i64
            }
            Err(err) => {
                error!("{err}");
                -1
            }
        }
    }

    pub fn to_adjacency_matrices(&mut self, handle: usize) -> Option<(SparseMatrix, SparseMatrix)> {
        let net = self.net_mut(handle)?;
        match net.to_adjacency_matrices() {
            Ok(matrices) => Some(matrices),
            Err(err) => {
                error!("{err}");
                None
            }
        }
    }

    pub fn to_sys_lin(&mut self, handle: usize) -> Option<SysLin> {
        let net = self.net_mut(handle)?;
        match net.to_sys_lin() {
            Ok(sys) => Some(sys),
            Err(err) => {
                error!("{err}");
                None
            }
        }
    }

    pub fn dater_form(&mut self, handle: usize) -> Option<String> {
        let net = self.net_mut(handle)?;
        if let Err(err) = net.check_event_graph() {
            error!("{err}");
            return None;
        }
        Some(net.dater_form("# "))
    }

    pub fn counter_form(&mut self, handle: usize) -> Option<String> {
        let net = self.net_mut(handle)?;
        if let Err(err) = net.check_event_graph() {
            error!("{err}");
            return None;
        }
        Some(net.counter_form("# "))
    }
}
