//! 链式多跳拓扑构建
//!
//! h0 <-> r0 <-> r1 <-> ... <-> h1：两台主机隔着一排路由器。
//! 所有流共享中间的路由器链，用来观察竞争下的拥塞行为。

use super::error::{TopologyError, validate_link};
use crate::net::{Network, NodeId};
use crate::sim::SimTime;

/// 链式拓扑配置选项。
#[derive(Debug, Clone)]
pub struct ChainOpts {
    pub dt: SimTime,
    pub routers: usize,
    /// 主机接入链路的速率。
    pub edge_rate_bps: u64,
    /// 路由器之间（瓶颈）链路的速率。
    pub core_rate_bps: u64,
    pub prop_delay: SimTime,
    pub buffer_bits: u64,
}

impl Default for ChainOpts {
    fn default() -> Self {
        Self {
            dt: SimTime::from_micros(100),
            routers: 2,
            edge_rate_bps: 100_000_000, // 100 Mbps
            core_rate_bps: 10_000_000,  // 10 Mbps 瓶颈
            prop_delay: SimTime::from_millis(5),
            buffer_bits: 64 * 8192,
        }
    }
}

/// 构建链式拓扑。
///
/// 返回：(上下文, h0, h1, 路由器列表)
pub fn build_chain(
    opts: &ChainOpts,
) -> Result<(Network, NodeId, NodeId, Vec<NodeId>), TopologyError> {
    if opts.dt == SimTime::ZERO {
        return Err(TopologyError::ZeroDt);
    }
    if opts.routers == 0 {
        return Err(TopologyError::EmptyChain);
    }
    validate_link(opts.edge_rate_bps, opts.prop_delay, opts.buffer_bits)?;
    validate_link(opts.core_rate_bps, opts.prop_delay, opts.buffer_bits)?;

    let mut net = Network::new(opts.dt);
    let h0 = net.add_host("h0");
    let h1 = net.add_host("h1");
    let routers: Vec<NodeId> = (0..opts.routers)
        .map(|i| net.add_router(format!("r{i}")))
        .collect();

    net.connect(h0, routers[0], opts.edge_rate_bps, opts.prop_delay, opts.buffer_bits);
    for w in routers.windows(2) {
        net.connect(w[0], w[1], opts.core_rate_bps, opts.prop_delay, opts.buffer_bits);
    }
    net.connect(
        *routers.last().expect("routers non-empty"),
        h1,
        opts.edge_rate_bps,
        opts.prop_delay,
        opts.buffer_bits,
    );

    Ok((net, h0, h1, routers))
}
