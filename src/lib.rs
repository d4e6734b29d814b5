//! # 时间 Petri 网编辑引擎
//!
//! 一套图模型四种语义: 普通/时间 Petri 网、时间事件图与 GRAFCET。提供
//! 结构编辑、令牌流仿真、事件图的 Max-Plus 线性系统构造与 Semi-Howard
//! 关键环分析, 以及面向绘图工具、外部求解器与代码生成的只写导出器。
//!
//! 渲染器、MQTT 运行时与外语绑定层均为外部协作者, 这里只提供它们依赖的
//! 引擎契约 ([`registry::Registry`] 即句柄表门面)。

pub mod export;
pub mod io;
pub mod maxplus;
pub mod net;
pub mod registry;

pub use maxplus::{CriticalCycle, SparseMatrix, SysLin};
pub use net::{FiringPolicy, NetError, NetKind, NodeRef, PetriNet, PlaceId, TransitionId};
pub use registry::Registry;
