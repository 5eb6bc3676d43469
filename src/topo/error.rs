//! 拓扑配置错误
//!
//! 配置类错误面向操作者报告，不重试：带着清晰信息以非零退出。
//! 核心宁可在启动前失败，也不在不一致的拓扑上运行。

use crate::net::DATA_PKT_BITS;
use crate::sim::SimTime;
use thiserror::Error;

/// 运行时长的健全上限（仿真秒）。
pub const MAX_RUN: SimTime = SimTime(10_000 * 1_000_000_000);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TopologyError {
    #[error("link rate must be positive")]
    ZeroRate,

    #[error("propagation delay must be positive")]
    ZeroDelay,

    #[error("simulation step dt must be positive")]
    ZeroDt,

    #[error("buffer capacity {0} bits cannot hold a single data packet")]
    BufferTooSmall(u64),

    #[error("a flow must carry at least one packet")]
    EmptyFlow,

    #[error("chain topology needs at least one router")]
    EmptyChain,

    #[error("run length {0:?} exceeds the sanity ceiling")]
    RunTooLong(SimTime),
}

/// 校验一条链路的参数。
pub fn validate_link(rate_bps: u64, prop_delay: SimTime, capacity_bits: u64) -> Result<(), TopologyError> {
    if rate_bps == 0 {
        return Err(TopologyError::ZeroRate);
    }
    if prop_delay == SimTime::ZERO {
        return Err(TopologyError::ZeroDelay);
    }
    if capacity_bits < DATA_PKT_BITS {
        return Err(TopologyError::BufferTooSmall(capacity_bits));
    }
    Ok(())
}

/// 校验运行时长。
pub fn validate_run(until: SimTime) -> Result<(), TopologyError> {
    if until > MAX_RUN {
        return Err(TopologyError::RunTooLong(until));
    }
    Ok(())
}
