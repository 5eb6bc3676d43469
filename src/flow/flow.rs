//! 流：发送端拥塞控制状态机
//!
//! 每条流持有一段固定长度的数据包序列，按拥塞窗口推进发送，
//! 消费接收端回发的累计 ACK：新 ACK 推进窗口并驱动增长，
//! 重复 ACK 触发快速重传/快速恢复，超时回退到慢启动（go-back-N）。
//! RTT 采样遵循 Karn 规则：只取恰好发送过一次的包。

use std::collections::BTreeMap;

use super::algo::CongestionAlgorithm;
use crate::net::{FlowId, NodeId, Packet, PacketKind};
use crate::sim::SimTime;
use tracing::{debug, info, trace};

/// 拥塞控制状态。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowState {
    SlowStart,
    CongestionAvoidance,
    FastRecovery,
}

/// 一个未确认序号的发送记录。重传是同一序号的新发送事件：
/// 刷新 `sent_at` 并递增 `transmits`。
#[derive(Debug, Clone, Copy)]
pub struct SentRecord {
    pub sent_at: SimTime,
    pub transmits: u32,
}

/// 流配置。
#[derive(Debug, Clone)]
pub struct FlowConfig {
    /// 流开始发送的时刻。
    pub start_at: SimTime,
    /// 初始 RTT 估计（首个样本到来前的超时基准）。
    pub init_rtt: SimTime,
    /// 初始拥塞窗口（包）。
    pub init_cwnd: f64,
    /// 初始慢启动阈值（包）；大值表示"尚无阈值"。
    pub init_ssthresh: f64,
    /// 窗口上限；实验用来钉住发送窗口，None 表示不限。
    pub max_cwnd: Option<f64>,
    /// 发数据前先以 Syn/SynAck 握手并用其播种 RTT 估计。
    pub handshake: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            start_at: SimTime::ZERO,
            init_rtt: SimTime::from_secs(1),
            init_cwnd: 1.0,
            init_ssthresh: 1000.0,
            max_cwnd: None,
            handshake: false,
        }
    }
}

/// 发送端的一条流。
#[derive(Debug)]
pub struct Flow {
    pub id: FlowId,
    pub src: NodeId,
    pub dst: NodeId,
    cfg: FlowConfig,
    algo: CongestionAlgorithm,

    /// 构造时一次性生成的数据包序列；发送时克隆并盖上新的 `sent_at`。
    packets: Vec<Packet>,

    state: FlowState,
    cwnd: f64,
    ssthresh: f64,
    window_start: u64,
    rtt: SimTime,
    rto: SimTime,
    timeout_at: SimTime,
    outstanding: BTreeMap<u64, SentRecord>,
    last_ack: Option<u64>,
    dup_acks: u32,
    done: bool,

    connected: bool,
    start_time: Option<SimTime>,
    done_time: Option<SimTime>,
    retransmits: u64,
}

impl Flow {
    pub fn new(
        id: FlowId,
        src: NodeId,
        dst: NodeId,
        total_packets: u64,
        cfg: FlowConfig,
        algo: CongestionAlgorithm,
    ) -> Self {
        let packets = (0..total_packets)
            .map(|seq| Packet::new(src, dst, Some(id), seq, PacketKind::Data))
            .collect();
        let rtt = cfg.init_rtt;
        let connected = !cfg.handshake;
        Self {
            id,
            src,
            dst,
            state: FlowState::SlowStart,
            cwnd: cfg.init_cwnd,
            ssthresh: cfg.init_ssthresh,
            window_start: 0,
            rtt,
            rto: rtt,
            timeout_at: SimTime::FAR_FUTURE,
            outstanding: BTreeMap::new(),
            last_ack: None,
            dup_acks: 0,
            done: false,
            connected,
            start_time: None,
            done_time: None,
            retransmits: 0,
            cfg,
            algo,
            packets,
        }
    }

    /// 每 tick 调用一次：先查超时，再把窗口允许且尚未在途的序号发出去。
    /// 返回要入队的包，由上下文沿下一跳信道发送。
    pub fn on_tick(&mut self, now: SimTime) -> Vec<Packet> {
        if self.done || now < self.cfg.start_at {
            return Vec::new();
        }
        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
        if !self.connected {
            return self.tick_handshake(now);
        }
        // 超时从任意状态回退：快速重传的包也可能丢，
        // 快速恢复不能豁免超时检查，否则流会被永久卡死。
        if now >= self.timeout_at {
            return self.on_timeout(now);
        }
        // 快速恢复期间不按窗口发送；发送由重复 ACK 的膨胀驱动。
        if self.state == FlowState::FastRecovery {
            return Vec::new();
        }
        self.send_window(now)
    }

    /// 超时：回到慢启动，go-back-N 只重传最老的未确认包，
    /// RTO 翻倍并以新值作为冷却，避免单次丢包在一个 RTT 内级联触发。
    fn on_timeout(&mut self, now: SimTime) -> Vec<Packet> {
        info!(
            flow = ?self.id,
            cwnd = self.cwnd,
            window_start = self.window_start,
            rto = ?self.rto,
            "⏰ 超时，回退慢启动"
        );
        self.ssthresh = (self.cwnd / 2.0).max(1.0);
        self.cwnd = 1.0;
        self.state = FlowState::SlowStart;
        self.dup_acks = 0;

        // 晚于 window_start 的在途记录作废：这些序号须重新发送。
        self.outstanding.retain(|&s, _| s <= self.window_start);

        let pkt = self.transmit(self.window_start, now);
        self.retransmits += 1;

        self.rto = self.rto.saturating_mul(2);
        self.timeout_at = now.saturating_add(self.rto);
        vec![pkt]
    }

    /// 发送窗口内所有尚未在途的序号。
    fn send_window(&mut self, now: SimTime) -> Vec<Packet> {
        let effective = match self.cfg.max_cwnd {
            Some(cap) => self.cwnd.min(cap),
            None => self.cwnd,
        };
        let end = self
            .window_start
            .saturating_add(effective.round() as u64)
            .min(self.total_packets());

        let was_idle = self.outstanding.is_empty();
        let mut out = Vec::new();
        for seq in self.window_start..end {
            if self.outstanding.contains_key(&seq) {
                continue;
            }
            out.push(self.transmit(seq, now));
        }
        if was_idle && !out.is_empty() {
            // 窗口从空转入在途：武装超时定时器。
            self.timeout_at = now.saturating_add(self.rto);
        }
        out
    }

    /// 发送（或重传）一个序号：登记发送记录并产出数据包。
    /// 引用超出包序列的序号属于编程错误。
    fn transmit(&mut self, seq: u64, now: SimTime) -> Packet {
        let total = self.total_packets();
        assert!(
            seq < total,
            "flow {:?} referenced sequence {} beyond total {}",
            self.id,
            seq,
            total
        );
        let rec = self.outstanding.entry(seq).or_insert(SentRecord {
            sent_at: now,
            transmits: 0,
        });
        rec.sent_at = now;
        rec.transmits += 1;
        trace!(flow = ?self.id, seq, transmits = rec.transmits, "发送数据包");

        let mut pkt = self.packets[seq as usize].clone();
        pkt.sent_at = now;
        pkt
    }

    /// ACK 处理入口：由端点把收到的 ACK 原样转交到这里。
    /// 返回因本次 ACK 立即触发的发送（快速重传、窗口膨胀）。
    pub fn process_ack(&mut self, pkt: &Packet, now: SimTime) -> Vec<Packet> {
        assert_eq!(
            pkt.flow,
            Some(self.id),
            "ack delivered to the wrong flow: {:?}",
            pkt.flow
        );
        assert!(
            pkt.src == self.dst && pkt.dst == self.src,
            "ack endpoints {:?}->{:?} do not match flow {:?} ({:?}->{:?})",
            pkt.src,
            pkt.dst,
            self.id,
            self.src,
            self.dst
        );
        if self.done {
            return Vec::new();
        }

        match pkt.kind {
            PacketKind::SynAck { stamp } => {
                self.on_synack(stamp, now);
                Vec::new()
            }
            PacketKind::Ack { ack, for_seq } => self.on_ack(ack, for_seq, now),
            _ => panic!("flow {:?} received non-ack packet {:?}", self.id, pkt.kind),
        }
    }

    fn on_synack(&mut self, stamp: SimTime, now: SimTime) {
        if self.connected {
            return;
        }
        self.connected = true;
        self.rtt = now.saturating_sub(stamp);
        self.rto = self.rtt.saturating_mul(2);
        self.timeout_at = SimTime::FAR_FUTURE;
        debug!(flow = ?self.id, rtt = ?self.rtt, "握手完成，RTT 估计已播种");
    }

    fn on_ack(&mut self, ack: u64, for_seq: u64, now: SimTime) -> Vec<Packet> {
        // 累计确认到最后一个序号：流完成，且不可逆。
        if ack >= self.total_packets() {
            self.done = true;
            self.done_time = Some(now);
            self.outstanding.clear();
            info!(flow = ?self.id, at = ?now, "✅ 流完成");
            return Vec::new();
        }

        if self.last_ack == Some(ack) {
            return self.on_dup_ack(ack, now);
        }

        // 真正推进的新 ACK。
        self.dup_acks = 0;
        self.last_ack = Some(ack);
        // 快速恢复的窗口膨胀可能已把 window_start 推到 ack 之前；保持单调。
        self.window_start = self.window_start.max(ack);

        // Karn：只用恰好发送过一次的包采样 RTT。
        if let Some(rec) = self.outstanding.get(&for_seq) {
            if rec.transmits == 1 {
                self.rtt = now.saturating_sub(rec.sent_at);
                self.rto = self.rtt.saturating_mul(2);
                self.algo.on_rtt_sample(self.rtt);
                trace!(flow = ?self.id, rtt = ?self.rtt, rto = ?self.rto, "RTT 采样");
            }
        }
        self.timeout_at = now.saturating_add(self.rto);

        // 已确认的在途记录出窗。
        self.outstanding = self.outstanding.split_off(&ack);

        if self.state == FlowState::FastRecovery {
            self.state = FlowState::CongestionAvoidance;
            debug!(flow = ?self.id, "退出快速恢复");
        }

        self.algo
            .on_new_ack(&mut self.state, &mut self.cwnd, self.ssthresh, self.rtt, now);
        Vec::new()
    }

    fn on_dup_ack(&mut self, ack: u64, now: SimTime) -> Vec<Packet> {
        self.dup_acks += 1;
        trace!(flow = ?self.id, ack, dup_acks = self.dup_acks, "重复 ACK");

        if self.state != FlowState::FastRecovery && self.dup_acks == 3 {
            // 快速重传：收缩阈值、膨胀三个重复的窗口、补发缺失段。
            self.ssthresh = (self.cwnd / 2.0).max(2.0);
            self.cwnd = self.ssthresh + 3.0;
            self.state = FlowState::FastRecovery;
            let pkt = self.transmit(ack, now);
            self.retransmits += 1;
            info!(
                flow = ?self.id,
                missing = ack,
                ssthresh = self.ssthresh,
                cwnd = self.cwnd,
                "🔁 三次重复 ACK，快速重传"
            );
            return vec![pkt];
        }

        if self.state == FlowState::FastRecovery {
            // 窗口膨胀：每个额外的重复 ACK 允许再发一个新包。
            self.window_start += 1;
            return self.send_window(now);
        }
        Vec::new()
    }

    fn tick_handshake(&mut self, now: SimTime) -> Vec<Packet> {
        if self.timeout_at != SimTime::FAR_FUTURE && now < self.timeout_at {
            return Vec::new();
        }
        // 首次或超时重发 Syn，RTO 退避。
        let mut syn = Packet::new(self.src, self.dst, Some(self.id), 0, PacketKind::Syn);
        syn.sent_at = now;
        self.timeout_at = now.saturating_add(self.rto);
        self.rto = self.rto.saturating_mul(2);
        debug!(flow = ?self.id, "发送 Syn");
        vec![syn]
    }

    // ---- 只读访问器（供每 tick 的观测采样使用）----

    pub fn total_packets(&self) -> u64 {
        self.packets.len() as u64
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn cwnd(&self) -> f64 {
        self.cwnd
    }

    pub fn ssthresh(&self) -> f64 {
        self.ssthresh
    }

    pub fn window_start(&self) -> u64 {
        self.window_start
    }

    pub fn rtt(&self) -> SimTime {
        self.rtt
    }

    pub fn rto(&self) -> SimTime {
        self.rto
    }

    pub fn dup_acks(&self) -> u32 {
        self.dup_acks
    }

    pub fn outstanding_pkts(&self) -> usize {
        self.outstanding.len()
    }

    pub fn outstanding_record(&self, seq: u64) -> Option<SentRecord> {
        self.outstanding.get(&seq).copied()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn retransmits(&self) -> u64 {
        self.retransmits
    }

    pub fn start_time(&self) -> Option<SimTime> {
        self.start_time
    }

    pub fn done_time(&self) -> Option<SimTime> {
        self.done_time
    }

    pub fn algorithm(&self) -> &CongestionAlgorithm {
        &self.algo
    }
}
