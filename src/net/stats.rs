//! 统计信息
//!
//! 定义网络仿真统计数据结构。

/// 全网累计计数。丢包在这里聚合一份，各信道另有自己的计数。
#[derive(Debug, Default)]
pub struct Stats {
    pub delivered_pkts: u64,
    pub delivered_bits: u64,
    pub dropped_pkts: u64,
    pub dropped_bits: u64,
}
