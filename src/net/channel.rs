//! 单向信道（HalfLink）
//!
//! 链路的一个方向：有界的尾丢弃缓冲、按速率串行化出队、
//! 传播时延后交付。串行化与传播分离：前者受带宽约束
//! （把 bit 推上线的时间），后者受时延约束（bit 走到对端的时间），
//! 两者独立作用于吞吐。

use std::collections::VecDeque;

use super::id::NodeId;
use super::packet::Packet;
use crate::sim::SimTime;
use tracing::{debug, trace};

/// 单向信道。缓冲占用以 bit 计，任何时刻不超过容量；
/// `in_flight` 按到达时间非降序排列（FIFO 串行化保证）。
#[derive(Debug)]
pub struct Channel {
    pub src: NodeId,
    pub dst: NodeId,
    rate_bps: u64,
    prop_delay: SimTime,
    capacity_bits: u64,
    occupancy_bits: u64,
    q: VecDeque<Packet>,
    next_dequeue_at: SimTime,
    in_flight: VecDeque<(Packet, SimTime)>,
    drops: u64,
    dropped_bits: u64,
}

impl Channel {
    pub fn new(
        src: NodeId,
        dst: NodeId,
        rate_bps: u64,
        prop_delay: SimTime,
        capacity_bits: u64,
    ) -> Self {
        Self {
            src,
            dst,
            rate_bps,
            prop_delay,
            capacity_bits,
            occupancy_bits: 0,
            q: VecDeque::new(),
            next_dequeue_at: SimTime::ZERO,
            in_flight: VecDeque::new(),
            drops: 0,
            dropped_bits: 0,
        }
    }

    /// 串行化指定 bit 数所需时间（纳秒，向上取整）。
    pub fn tx_time(&self, bits: u64) -> SimTime {
        if self.rate_bps == 0 {
            return SimTime::FAR_FUTURE;
        }
        let nanos = ((bits as u128).saturating_mul(1_000_000_000u128)
            + (self.rate_bps as u128 - 1))
            / self.rate_bps as u128;
        SimTime(nanos.min(u64::MAX as u128) as u64)
    }

    /// 入队：容量足够则接受，否则整包丢弃（drop-tail，不抢占已排队的包）。
    /// 丢弃不是错误，而是发送端经由超时/重复 ACK 间接消费的背压信号。
    pub fn enqueue(&mut self, pkt: Packet, now: SimTime) -> Result<(), Packet> {
        if self.occupancy_bits.saturating_add(pkt.size_bits) > self.capacity_bits {
            self.drops = self.drops.saturating_add(1);
            self.dropped_bits = self.dropped_bits.saturating_add(pkt.size_bits);
            debug!(
                src = ?self.src,
                dst = ?self.dst,
                size_bits = pkt.size_bits,
                occupancy = self.occupancy_bits,
                capacity = self.capacity_bits,
                "缓冲已满，丢包"
            );
            return Err(pkt);
        }

        let was_empty = self.q.is_empty();
        self.occupancy_bits += pkt.size_bits;
        if was_empty {
            // 队列原本为空：下一次出队时刻由这个包的串行化时间决定。
            self.next_dequeue_at = now.saturating_add(self.tx_time(pkt.size_bits));
        }
        trace!(
            src = ?self.src,
            dst = ?self.dst,
            size_bits = pkt.size_bits,
            occupancy = self.occupancy_bits,
            next_dequeue_at = ?self.next_dequeue_at,
            "入队"
        );
        self.q.push_back(pkt);
        Ok(())
    }

    /// 每 tick 执行一次：至多出队一个串行化完成的包进入传播，
    /// 然后按到达顺序取出所有已到达对端的包返回给调用者交付。
    pub fn tick(&mut self, now: SimTime, dt: SimTime) -> Vec<Packet> {
        if now >= self.next_dequeue_at {
            if let Some(pkt) = self.q.pop_front() {
                self.occupancy_bits -= pkt.size_bits;
                let arrive_at = now.saturating_add(self.prop_delay);
                trace!(
                    src = ?self.src,
                    dst = ?self.dst,
                    seq = pkt.seq,
                    arrive_at = ?arrive_at,
                    "串行化完成，进入传播"
                );
                self.in_flight.push_back((pkt, arrive_at));

                self.next_dequeue_at = match self.q.front() {
                    Some(next) => now.saturating_add(self.tx_time(next.size_bits)),
                    None => now.saturating_add(dt),
                };
            } else {
                self.next_dequeue_at = now.saturating_add(dt);
            }
        }

        let mut delivered = Vec::new();
        while let Some((_, at)) = self.in_flight.front() {
            if *at > now {
                break;
            }
            let (pkt, _) = self.in_flight.pop_front().expect("front checked");
            delivered.push(pkt);
        }
        delivered
    }

    pub fn occupancy_bits(&self) -> u64 {
        self.occupancy_bits
    }

    pub fn capacity_bits(&self) -> u64 {
        self.capacity_bits
    }

    pub fn queued_pkts(&self) -> usize {
        self.q.len()
    }

    pub fn in_flight_pkts(&self) -> usize {
        self.in_flight.len()
    }

    pub fn drops(&self) -> u64 {
        self.drops
    }

    pub fn dropped_bits(&self) -> u64 {
        self.dropped_bits
    }

    pub fn rate_bps(&self) -> u64 {
        self.rate_bps
    }

    pub fn prop_delay(&self) -> SimTime {
        self.prop_delay
    }
}
