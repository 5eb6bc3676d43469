//! 仿真时间类型
//!
//! 定义仿真时间及其单位转换。

/// 仿真时间（纳秒）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct SimTime(pub u64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0);

    /// 一个足够远的“永不触发”时刻（用于尚未设置的超时）。
    pub const FAR_FUTURE: SimTime = SimTime(u64::MAX / 4);

    pub fn from_nanos(ns: u64) -> SimTime {
        SimTime(ns)
    }
    pub fn from_micros(us: u64) -> SimTime {
        SimTime(us.saturating_mul(1_000))
    }
    pub fn from_millis(ms: u64) -> SimTime {
        SimTime(ms.saturating_mul(1_000_000))
    }
    pub fn from_secs(s: u64) -> SimTime {
        SimTime(s.saturating_mul(1_000_000_000))
    }

    pub fn as_nanos(self) -> u64 {
        self.0
    }

    /// 秒（浮点），用于 FAST 窗口等比值计算。
    pub fn as_secs_f64(self) -> f64 {
        self.0 as f64 / 1e9
    }

    /// 饱和加法。
    pub fn saturating_add(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_add(rhs.0))
    }

    /// 饱和减法（时间差）。
    pub fn saturating_sub(self, rhs: SimTime) -> SimTime {
        SimTime(self.0.saturating_sub(rhs.0))
    }

    /// 饱和倍乘（RTO 退避用）。
    pub fn saturating_mul(self, k: u64) -> SimTime {
        SimTime(self.0.saturating_mul(k))
    }
}
