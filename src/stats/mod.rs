//! 观测采样
//!
//! 每 tick 对各流与各信道的只读指标采样一次（可配置步长），
//! 产出可序列化的时间序列，供外部的统计/绘图协作者消费。

use serde::{Deserialize, Serialize};

use crate::flow::{Flow, FlowState};
use crate::net::Channel;
use crate::sim::SimTime;

/// 一条流在某时刻的采样行。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlowSample {
    pub t_ns: u64,
    pub flow: usize,
    pub cwnd: f64,
    pub ssthresh: f64,
    pub rtt_ns: u64,
    pub window_start: u64,
    pub state: FlowStateTag,
    pub done: bool,
}

/// 一条信道在某时刻的采样行。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSample {
    pub t_ns: u64,
    pub channel: usize,
    pub occupancy_bits: u64,
    pub capacity_bits: u64,
    pub drops: u64,
}

/// 采样里用的状态标签。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FlowStateTag {
    SlowStart,
    CongestionAvoidance,
    FastRecovery,
}

impl From<FlowState> for FlowStateTag {
    fn from(s: FlowState) -> Self {
        match s {
            FlowState::SlowStart => FlowStateTag::SlowStart,
            FlowState::CongestionAvoidance => FlowStateTag::CongestionAvoidance,
            FlowState::FastRecovery => FlowStateTag::FastRecovery,
        }
    }
}

/// 整个运行的采样结果。
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct Trace {
    pub flows: Vec<FlowSample>,
    pub channels: Vec<ChannelSample>,
}

/// 采样器。`every` 控制步长：每 N 个 tick 记一行。
#[derive(Debug)]
pub struct Recorder {
    every: u64,
    ticks_seen: u64,
    trace: Trace,
}

impl Recorder {
    pub fn new(every: u64) -> Self {
        Self {
            every: every.max(1),
            ticks_seen: 0,
            trace: Trace::default(),
        }
    }

    pub fn sample(&mut self, now: SimTime, flows: &[Flow], channels: &[Channel]) {
        let take = self.ticks_seen % self.every == 0;
        self.ticks_seen += 1;
        if !take {
            return;
        }
        for f in flows {
            self.trace.flows.push(FlowSample {
                t_ns: now.as_nanos(),
                flow: f.id.0,
                cwnd: f.cwnd(),
                ssthresh: f.ssthresh(),
                rtt_ns: f.rtt().as_nanos(),
                window_start: f.window_start(),
                state: f.state().into(),
                done: f.is_done(),
            });
        }
        for (i, ch) in channels.iter().enumerate() {
            self.trace.channels.push(ChannelSample {
                t_ns: now.as_nanos(),
                channel: i,
                occupancy_bits: ch.occupancy_bits(),
                capacity_bits: ch.capacity_bits(),
                drops: ch.drops(),
            });
        }
    }

    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    pub fn into_trace(self) -> Trace {
        self.trace
    }
}
