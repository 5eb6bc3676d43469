//! 仿真时钟
//!
//! 固定步长的离散时钟：每个 tick 前进 `dt`。
//! 事件式调度在本仿真器里不存在；所有“等待”都表现为
//! 各组件在每个 tick 对照当前时间做的状态检查。

use super::time::SimTime;
use tracing::trace;

/// 固定步长时钟。
#[derive(Debug, Clone)]
pub struct Clock {
    now: SimTime,
    dt: SimTime,
    ticks: u64,
}

impl Clock {
    /// 创建时钟；`dt` 必须大于零（由拓扑构建层校验）。
    pub fn new(dt: SimTime) -> Self {
        debug_assert!(dt > SimTime::ZERO, "dt must be positive");
        Self {
            now: SimTime::ZERO,
            dt,
            ticks: 0,
        }
    }

    /// 当前仿真时间。
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// 步长。
    pub fn dt(&self) -> SimTime {
        self.dt
    }

    /// 已经执行过的 tick 数。
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// 前进一个 tick。只由 `Network::tick` 在所有组件动作完成后调用。
    pub fn advance(&mut self) {
        self.now = self.now.saturating_add(self.dt);
        self.ticks = self.ticks.wrapping_add(1);
        trace!(now = ?self.now, ticks = self.ticks, "时钟前进");
    }
}

impl Default for Clock {
    /// 默认步长 100µs（即原型的 dt = 1e-4 s）。
    fn default() -> Self {
        Clock::new(SimTime::from_micros(100))
    }
}
