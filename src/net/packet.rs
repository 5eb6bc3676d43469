//! 数据包类型
//!
//! 定义网络数据包及其相关操作。
//! 包大小由类型唯一决定：数据包为固定 MTU，控制包为小的固定尺寸。

use super::id::{FlowId, NodeId};
use crate::sim::SimTime;

/// 数据包大小（bit）：1024 字节 MTU。
pub const DATA_PKT_BITS: u64 = 1024 * 8;
/// 控制包大小（bit）：ACK / 握手等均为 64 字节。
pub const CTRL_PKT_BITS: u64 = 64 * 8;
/// 包头大小（bit）：数据包载荷 = MTU - 包头。
pub const HEADER_BITS: u64 = 20 * 8;

/// 包类型。ACK 携带累计确认值与被确认的数据包序号；
/// SynAck / HandshakeAck 回显对方的发送时间戳，供 RTT 估计使用。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketKind {
    Data,
    Ack { ack: u64, for_seq: u64 },
    Syn,
    SynAck { stamp: SimTime },
    Handshake,
    HandshakeAck { stamp: SimTime },
    Routing,
}

impl PacketKind {
    /// 由类型推导包大小（bit）。
    pub fn size_bits(self) -> u64 {
        match self {
            PacketKind::Data => DATA_PKT_BITS,
            PacketKind::Routing => DATA_PKT_BITS,
            _ => CTRL_PKT_BITS,
        }
    }
}

/// 网络数据包。除 `sent_at` 外不可变：重传是同一序号的新发送事件，
/// 只刷新 `sent_at`，不产生新的包身份。
#[derive(Debug, Clone)]
pub struct Packet {
    pub src: NodeId,
    pub dst: NodeId,
    pub flow: Option<FlowId>,
    pub seq: u64,
    pub kind: PacketKind,
    pub size_bits: u64,
    /// 入队时写入的瞬态时间戳，仅用于 RTT 采样，不参与身份判定。
    pub sent_at: SimTime,
}

impl Packet {
    pub fn new(src: NodeId, dst: NodeId, flow: Option<FlowId>, seq: u64, kind: PacketKind) -> Self {
        Self {
            src,
            dst,
            flow,
            seq,
            kind,
            size_bits: kind.size_bits(),
            sent_at: SimTime::ZERO,
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self.kind, PacketKind::Data)
    }

    pub fn is_ack(&self) -> bool {
        matches!(self.kind, PacketKind::Ack { .. })
    }
}
