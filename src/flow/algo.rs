//! 拥塞控制算法
//!
//! 封闭的算法变体：Reno（AIMD）与 FAST（基于时延的比例控制）。
//! 算法在流构造时选定一次；丢包处理（超时、快速重传/恢复）
//! 是状态机的公共部分，这里只负责收到新 ACK 后的窗口增长。

use super::flow::FlowState;
use crate::sim::SimTime;
use tracing::trace;

/// FAST 算法参数。
#[derive(Debug, Clone)]
pub struct FastConfig {
    /// 目标缓冲包数 α，必须为正。
    pub alpha: f64,
    /// 步进系数 γ ∈ (0, 1]。
    pub gamma: f64,
    /// 窗口重算周期。
    pub update_interval: SimTime,
}

impl Default for FastConfig {
    fn default() -> Self {
        Self {
            alpha: 15.0,
            gamma: 0.5,
            update_interval: SimTime::from_millis(20),
        }
    }
}

/// FAST 的运行时状态。
#[derive(Debug, Clone)]
pub struct FastState {
    cfg: FastConfig,
    min_rtt: Option<SimTime>,
    next_update_at: SimTime,
}

impl FastState {
    fn new(cfg: FastConfig) -> Self {
        Self {
            cfg,
            min_rtt: None,
            next_update_at: SimTime::ZERO,
        }
    }

    pub fn min_rtt(&self) -> Option<SimTime> {
        self.min_rtt
    }

    /// 周期性窗口更新：w ← min(2w, (1-γ)w + γ((minRTT/RTT)·w + α))。
    fn update(&mut self, cwnd: &mut f64, rtt: SimTime, now: SimTime) {
        if now < self.next_update_at {
            return;
        }
        let base_rtt = self.min_rtt.unwrap_or(rtt);
        let ratio = if rtt > SimTime::ZERO {
            base_rtt.as_secs_f64() / rtt.as_secs_f64()
        } else {
            1.0
        };
        let w = *cwnd;
        let target = (1.0 - self.cfg.gamma) * w + self.cfg.gamma * (ratio * w + self.cfg.alpha);
        *cwnd = (2.0 * w).min(target);
        self.next_update_at = now.saturating_add(self.cfg.update_interval);
        trace!(cwnd = *cwnd, ratio, "FAST 窗口更新");
    }
}

/// 拥塞控制算法变体。
#[derive(Debug, Clone)]
pub enum CongestionAlgorithm {
    Reno,
    Fast(FastState),
}

impl CongestionAlgorithm {
    pub fn reno() -> Self {
        CongestionAlgorithm::Reno
    }

    pub fn fast(cfg: FastConfig) -> Self {
        CongestionAlgorithm::Fast(FastState::new(cfg))
    }

    pub fn name(&self) -> &'static str {
        match self {
            CongestionAlgorithm::Reno => "reno",
            CongestionAlgorithm::Fast(_) => "fast",
        }
    }

    /// 新 RTT 样本（已按 Karn 规则过滤）。
    pub fn on_rtt_sample(&mut self, rtt: SimTime) {
        if let CongestionAlgorithm::Fast(f) = self {
            f.min_rtt = Some(match f.min_rtt {
                Some(m) if m <= rtt => m,
                _ => rtt,
            });
        }
    }

    /// 收到推进窗口的新 ACK 后的增长规则。
    /// 慢启动每 ACK +1，达到 ssthresh 进入拥塞避免；
    /// 拥塞避免阶段 Reno 每 ACK +1/cwnd，FAST 按周期重算。
    pub fn on_new_ack(
        &mut self,
        state: &mut FlowState,
        cwnd: &mut f64,
        ssthresh: f64,
        rtt: SimTime,
        now: SimTime,
    ) {
        match *state {
            FlowState::SlowStart => {
                *cwnd += 1.0;
                if *cwnd >= ssthresh {
                    *state = FlowState::CongestionAvoidance;
                    if let CongestionAlgorithm::Fast(f) = self {
                        f.next_update_at = now.saturating_add(f.cfg.update_interval);
                    }
                }
            }
            FlowState::CongestionAvoidance => match self {
                CongestionAlgorithm::Reno => {
                    // 每 ACK +1/cwnd，近似每 RTT +1 MSS。
                    *cwnd += 1.0 / *cwnd;
                }
                CongestionAlgorithm::Fast(f) => f.update(cwnd, rtt, now),
            },
            // 快速恢复阶段的窗口演化由状态机的膨胀逻辑承担。
            FlowState::FastRecovery => {}
        }
    }
}
