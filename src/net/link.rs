//! 双向链路
//!
//! 一条物理链路 = 两条端点互换的单向信道；
//! 这里聚合两个方向的丢包与占用统计。

use super::id::ChannelId;

/// 双向链路：持有两条反向信道的句柄，信道本体在 `Network` 的 arena 里。
#[derive(Debug, Clone, Copy)]
pub struct Link {
    pub forward: ChannelId,
    pub reverse: ChannelId,
}

impl Link {
    pub fn new(forward: ChannelId, reverse: ChannelId) -> Self {
        Self { forward, reverse }
    }

    pub fn channels(&self) -> [ChannelId; 2] {
        [self.forward, self.reverse]
    }
}
