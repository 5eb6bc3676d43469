//! 双主机拓扑构建
//!
//! 最小实验拓扑：h0 <-> h1，一条双向链路。

use super::error::{TopologyError, validate_link};
use crate::net::{LinkId, Network, NodeId};
use crate::sim::SimTime;

/// 双主机拓扑配置选项。
#[derive(Debug, Clone)]
pub struct TwoHostOpts {
    pub dt: SimTime,
    pub rate_bps: u64,
    pub prop_delay: SimTime,
    pub buffer_bits: u64,
}

impl Default for TwoHostOpts {
    fn default() -> Self {
        Self {
            dt: SimTime::from_micros(100),
            rate_bps: 10_000_000, // 10 Mbps
            prop_delay: SimTime::from_millis(10),
            buffer_bits: 64 * 8192, // 64 个数据包
        }
    }
}

/// 构建双主机拓扑。
///
/// 拓扑结构：h0 <-> h1
/// 返回：(上下文, h0, h1, 链路)
pub fn build_two_host(
    opts: &TwoHostOpts,
) -> Result<(Network, NodeId, NodeId, LinkId), TopologyError> {
    if opts.dt == SimTime::ZERO {
        return Err(TopologyError::ZeroDt);
    }
    validate_link(opts.rate_bps, opts.prop_delay, opts.buffer_bits)?;

    let mut net = Network::new(opts.dt);
    let h0 = net.add_host("h0");
    let h1 = net.add_host("h1");
    let link = net.connect(h0, h1, opts.rate_bps, opts.prop_delay, opts.buffer_bits);
    Ok((net, h0, h1, link))
}
