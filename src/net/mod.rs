//! 网络模拟模块
//!
//! 此模块包含网络模拟的核心组件：数据包、单向信道、链路、
//! 端点、转发表和仿真上下文。

// 子模块声明
mod channel;
mod endpoint;
mod id;
mod link;
mod network;
mod node;
mod packet;
mod routing;
mod stats;

// 重新导出公共接口
pub use channel::Channel;
pub use endpoint::{Delivered, Endpoint};
pub use id::{ChannelId, FlowId, LinkId, NodeId};
pub use link::Link;
pub use network::{DEFAULT_ROUTE_REFRESH_TICKS, Network};
pub use node::{NodeKind, Router};
pub use packet::{CTRL_PKT_BITS, DATA_PKT_BITS, HEADER_BITS, Packet, PacketKind};
pub use routing::{Edge, Forwarding, HopCountRoutes};
pub use stats::Stats;
