//! 事件图的 Max-Plus 线性表示: 邻接矩阵形与隐式 dater 状态方程。
use crate::maxplus::sparse::SparseMatrix;
use crate::net::core::PetriNet;
use crate::net::error::NetError;
use crate::net::index_vec::Idx;
use crate::net::structure::NodeRef;

/// How many transitions play each role in the linear system.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoleCensus {
    pub inputs: usize,
    pub states: usize,
    pub outputs: usize,
}

/// Implicit Max-Plus dater system over the canonical event graph:
/// `X(n) = D X(n) ⊕ A X(n-1) ⊕ B U(n); Y(n) = C X(n)`.
#[derive(Debug, Clone)]
pub struct SysLin {
    pub d: SparseMatrix,
    pub a: SparseMatrix,
    pub b: SparseMatrix,
    pub c: SparseMatrix,
    pub census: RoleCensus,
}

impl PetriNet {
    /// Labels every transition with a per-role consecutive matrix index
    /// (inputs, states and outputs each count from zero) and returns the
    /// census. Requires a rebuilt adjacency index.
    pub fn assign_role_indices(&mut self) -> RoleCensus {
        let mut census = RoleCensus::default();
        for transition in self.transitions.iter_mut() {
            if transition.is_input() {
                transition.index = census.inputs;
                census.inputs += 1;
            } else if transition.is_state() {
                transition.index = census.states;
                census.states += 1;
            } else if transition.is_output() {
                transition.index = census.outputs;
                census.outputs += 1;
            }
        }
        census
    }

    /// Merges each place with its two arcs into a single weighted arc on
    /// transitions and returns the token and duration adjacency matrices
    /// `(N, T)`, both `|transitions| x |transitions|`. Row/column are
    /// transposed on purpose for the column-vector convention `x <- M x`.
    pub fn to_adjacency_matrices(&mut self) -> Result<(SparseMatrix, SparseMatrix), NetError> {
        self.check_event_graph()?;

        let side = self.transitions.len();
        let mut tokens = SparseMatrix::with_dim(side, side);
        let mut durations = SparseMatrix::with_dim(side, side);

        for place in self.places.iter() {
            let inbound = self.arcs[place.arcs_in[0]];
            let outbound = self.arcs[place.arcs_out[0]];
            let (NodeRef::Transition(from), NodeRef::Transition(to)) = (inbound.from, outbound.to)
            else {
                unreachable!("event graph: places sit between two transitions");
            };
            tokens.add(to.index(), from.index(), place.tokens as f64);
            durations.add(to.index(), from.index(), inbound.duration as f64);
        }
        Ok((tokens, durations))
    }

    /// Builds the implicit dater-form system over the canonical form of the
    /// net: input arcs feed `B`, state-to-state arcs feed `A` (one token on
    /// the place) or `D` (no token), arcs reaching an output feed `C`.
    pub fn to_sys_lin(&mut self) -> Result<SysLin, NetError> {
        let mut canonic = self.to_canonical()?;
        let census = canonic.assign_role_indices();

        let mut sys = SysLin {
            d: SparseMatrix::with_dim(census.states, census.states),
            a: SparseMatrix::with_dim(census.states, census.states),
            b: SparseMatrix::with_dim(census.inputs, census.inputs),
            c: SparseMatrix::with_dim(census.outputs, census.outputs),
            census,
        };

        for arc in canonic.arcs.iter() {
            let NodeRef::Transition(from) = arc.from else {
                continue;
            };
            let source = &canonic.transitions[from];
            if source.is_input() {
                sys.b.add(source.index, source.index, arc.duration as f64);
                continue;
            }

            let NodeRef::Place(place) = arc.to else {
                unreachable!("bipartite: transition arcs end on places");
            };
            let place = &canonic.places[place];
            for &idx in place.arcs_out.iter() {
                let NodeRef::Transition(to) = canonic.arcs[idx].to else {
                    continue;
                };
                let sink = &canonic.transitions[to];
                if sink.is_state() {
                    if place.tokens == 1 {
                        sys.a.add(sink.index, source.index, arc.duration as f64);
                    } else {
                        sys.d.add(sink.index, source.index, arc.duration as f64);
                    }
                } else if sink.is_output() {
                    sys.c.add(source.index, source.index, arc.duration as f64);
                }
            }
        }
        Ok(sys)
    }
}
