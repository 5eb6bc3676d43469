//! 节点类型
//!
//! 节点要么是主机（端点，流的源/宿），要么是路由器（只转发）。
//! 转发决策在 `Network` 层完成；路由器本体只回答时延探测。

use super::endpoint::{Delivered, Endpoint};
use super::id::NodeId;
use super::packet::{Packet, PacketKind};
use crate::sim::SimTime;
use tracing::trace;

/// 路由器节点。多跳转发由上下文借助转发表完成；
/// 寻址到路由器本身的只允许是探测/路由载荷。
#[derive(Debug)]
pub struct Router {
    pub id: NodeId,
    pub name: String,
}

impl Router {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// 处理寻址到路由器自身的包。
    /// 数据/ACK 包到达路由器说明拓扑接线有误，必须立刻暴露。
    pub fn receive(&mut self, pkt: Packet, now: SimTime) -> Delivered {
        match pkt.kind {
            PacketKind::Handshake => {
                trace!(router = %self.name, src = ?pkt.src, "回应时延探测");
                let mut reply = Packet::new(
                    self.id,
                    pkt.src,
                    pkt.flow,
                    pkt.seq,
                    PacketKind::HandshakeAck { stamp: pkt.sent_at },
                );
                reply.sent_at = now;
                Delivered::Reply(reply)
            }
            PacketKind::HandshakeAck { .. } | PacketKind::Routing => Delivered::Ignored,
            _ => panic!(
                "router {} received {:?} addressed to itself (topology wiring bug)",
                self.name, pkt.kind
            ),
        }
    }
}

/// 网络节点。
#[derive(Debug)]
pub enum NodeKind {
    Host(Endpoint),
    Router(Router),
}

impl NodeKind {
    pub fn id(&self) -> NodeId {
        match self {
            NodeKind::Host(h) => h.id,
            NodeKind::Router(r) => r.id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            NodeKind::Host(h) => &h.name,
            NodeKind::Router(r) => &r.name,
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self, NodeKind::Host(_))
    }
}
