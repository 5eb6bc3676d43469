//! 端点（主机）
//!
//! 接收侧的累计确认逻辑：维护每条流已见序号的集合，
//! 对每个数据包回发“下一个期望序号”的累计 ACK。
//! 端点自身不做任何拥塞逻辑；收到的 ACK 原样交还给所属的流。

use std::collections::{BTreeSet, HashMap};

use super::id::{FlowId, NodeId};
use super::packet::{Packet, PacketKind};
use crate::sim::SimTime;
use tracing::{debug, trace};

/// 端点处理一个到达包后的动作，由 `Network` 负责落实。
/// 以返回值而非回调表达，避免组件间的循环引用。
#[derive(Debug)]
pub enum Delivered {
    /// 需要回发一个包（ACK / SynAck / HandshakeAck）。
    Reply(Packet),
    /// 交给所属流的 ACK 处理入口。
    ToFlow(FlowId, Packet),
    /// 无需动作（重复包已幂等吸收，或载荷由外部协作者消费）。
    Ignored,
}

/// 主机端点。`received[f]` 在流 f 的生命周期内只增不减。
#[derive(Debug)]
pub struct Endpoint {
    pub id: NodeId,
    pub name: String,
    received: HashMap<FlowId, BTreeSet<u64>>,
}

impl Endpoint {
    pub fn new(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            received: HashMap::new(),
        }
    }

    /// 某条流的累计 ACK 值：从 0 起最长连续前缀的长度。
    pub fn ack_value(&self, flow: FlowId) -> u64 {
        let Some(seen) = self.received.get(&flow) else {
            return 0;
        };
        let mut ack = 0u64;
        for &s in seen {
            if s == ack {
                ack += 1;
            } else if s > ack {
                break;
            }
        }
        ack
    }

    /// 处理一个交付到本端点的包。
    /// 到达一个并非发给本端点的包属于接线错误，必须立刻暴露。
    pub fn receive(&mut self, pkt: Packet, now: SimTime) -> Delivered {
        assert_eq!(
            pkt.dst, self.id,
            "endpoint {} received packet addressed to {:?}",
            self.name, pkt.dst
        );

        match pkt.kind {
            PacketKind::Data => {
                let flow = pkt
                    .flow
                    .unwrap_or_else(|| panic!("data packet without flow id at {}", self.name));
                // 幂等插入：重复/乱序到达不是错误。
                let fresh = self.received.entry(flow).or_default().insert(pkt.seq);
                let ack = self.ack_value(flow);
                trace!(
                    endpoint = %self.name,
                    flow = ?flow,
                    seq = pkt.seq,
                    fresh,
                    ack,
                    "收到数据包，回发累计 ACK"
                );
                let mut reply = Packet::new(
                    self.id,
                    pkt.src,
                    Some(flow),
                    pkt.seq,
                    PacketKind::Ack {
                        ack,
                        for_seq: pkt.seq,
                    },
                );
                reply.sent_at = now;
                Delivered::Reply(reply)
            }
            PacketKind::Ack { .. } | PacketKind::SynAck { .. } => {
                let flow = pkt
                    .flow
                    .unwrap_or_else(|| panic!("ack packet without flow id at {}", self.name));
                Delivered::ToFlow(flow, pkt)
            }
            PacketKind::Syn => {
                debug!(endpoint = %self.name, src = ?pkt.src, "收到 Syn，回发 SynAck");
                let mut reply = Packet::new(
                    self.id,
                    pkt.src,
                    pkt.flow,
                    pkt.seq,
                    PacketKind::SynAck { stamp: pkt.sent_at },
                );
                reply.sent_at = now;
                Delivered::Reply(reply)
            }
            PacketKind::Handshake => {
                // 时延探测：回显对方的发送时间戳。
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
            // 路由载荷与探测回显由外部协作者消费；核心到此为止。
            PacketKind::HandshakeAck { .. } | PacketKind::Routing => Delivered::Ignored,
        }
    }
}
