//! # Petri 网图模型 (Place/Transition 双部图)
//!
//! 同一图模型承载四种网型: 普通 Petri 网、时间 Petri 网、时间事件图与
//! GRAFCET。库所与变迁按类别持有稠密 id (`P0..`, `T0..`), 弧表为唯一事实
//! 来源, 节点上的 `arcs_in`/`arcs_out` 为按需重建的二级索引。
//!
//! * 结构操作: 增删库所/变迁/弧, 同类连接可容忍模式自动插桥;
//! * 发射语义: 使能判定、可燃计数、公平乱序单步仿真;
//! * 事件图判定与规范形变换, 供 Max-Plus 线性系统构造使用。
//!
//! ## 示例
//!
//! ```rust
//! use timed_petri::net::{NetKind, NodeRef, PetriNet};
//!
//! let mut net = PetriNet::new(NetKind::TimedPetri);
//! let p0 = net.add_place(0.0, 0.0, 1);
//! let t0 = net.add_transition(1.0, 0.0);
//! net.add_arc(NodeRef::Place(p0), NodeRef::Transition(t0), 0.0).unwrap();
//!
//! net.rebuild_adjacency();
//! assert!(net.is_enabled(t0));
//! assert_eq!(net.step(), 1);
//! ```

pub mod canonical;
pub mod core;
pub mod error;
pub mod ids;
pub mod index_vec;
pub mod simulation;
pub mod structure;

pub use core::PetriNet;
pub use error::NetError;
pub use ids::{PlaceId, TransitionId};
pub use index_vec::{Idx, IndexVec};
pub use structure::{Arc, ArcList, FiringPolicy, NetKind, NodeRef, Place, Settings, Transition};
