//! 仿真上下文
//!
//! `Network` 是唯一的所有者：节点、信道、链路、流都按值放在
//! 各自的 arena 里，组件之间只通过索引句柄经由它互相解析，
//! 不存在全局注册表，也不存在循环所有权。
//! 它同时驱动固定步长的 tick 循环，保证每 tick 内的组件顺序
//! 稳定且确定（按插入序）。

use super::channel::Channel;
use super::endpoint::{Delivered, Endpoint};
use super::id::{ChannelId, FlowId, LinkId, NodeId};
use super::link::Link;
use super::node::{NodeKind, Router};
use super::packet::Packet;
use super::routing::{Edge, Forwarding, HopCountRoutes};
use super::stats::Stats;
use crate::flow::{CongestionAlgorithm, Flow, FlowConfig};
use crate::sim::{Clock, SimTime};
use crate::stats::Recorder;
use tracing::{debug, info, trace};

/// 默认的路由刷新周期（tick 数）。
pub const DEFAULT_ROUTE_REFRESH_TICKS: u64 = 1_000;

/// 仿真上下文（拓扑 + 时钟 + 流）。
pub struct Network {
    clock: Clock,
    nodes: Vec<NodeKind>,
    channels: Vec<Channel>,
    links: Vec<Link>,
    edges: Vec<Edge>,
    flows: Vec<Flow>,
    routes: Box<dyn Forwarding>,
    refresh_every: u64,
    recorder: Option<Recorder>,
    pub stats: Stats,
}

impl Network {
    pub fn new(dt: SimTime) -> Self {
        Self {
            clock: Clock::new(dt),
            nodes: Vec::new(),
            channels: Vec::new(),
            links: Vec::new(),
            edges: Vec::new(),
            flows: Vec::new(),
            routes: Box::new(HopCountRoutes::new()),
            refresh_every: DEFAULT_ROUTE_REFRESH_TICKS,
            recorder: None,
            stats: Stats::default(),
        }
    }

    /// 添加主机节点。
    pub fn add_host(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeKind::Host(Endpoint::new(id, name)));
        id
    }

    /// 添加路由器节点。
    pub fn add_router(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeKind::Router(Router::new(id, name)));
        id
    }

    /// 连接两个节点：一条双向链路 = 两条反向信道。
    pub fn connect(
        &mut self,
        a: NodeId,
        b: NodeId,
        rate_bps: u64,
        prop_delay: SimTime,
        capacity_bits: u64,
    ) -> LinkId {
        let fwd = ChannelId(self.channels.len());
        self.channels
            .push(Channel::new(a, b, rate_bps, prop_delay, capacity_bits));
        let rev = ChannelId(self.channels.len());
        self.channels
            .push(Channel::new(b, a, rate_bps, prop_delay, capacity_bits));

        self.edges.push((a, b, fwd));
        self.edges.push((b, a, rev));
        self.routes.mark_dirty();

        let id = LinkId(self.links.len());
        self.links.push(Link::new(fwd, rev));
        debug!(link = ?id, a = ?a, b = ?b, rate_bps, "链路已连接");
        id
    }

    /// 注册一条流。流的两端必须是主机：接错属于编程错误。
    pub fn add_flow(
        &mut self,
        src: NodeId,
        dst: NodeId,
        total_packets: u64,
        cfg: FlowConfig,
        algo: CongestionAlgorithm,
    ) -> FlowId {
        assert!(src != dst, "flow endpoints must differ");
        assert!(
            self.nodes[src.0].is_host() && self.nodes[dst.0].is_host(),
            "flow endpoints must be hosts: {:?} -> {:?}",
            src,
            dst
        );
        let id = FlowId(self.flows.len());
        self.flows.push(Flow::new(id, src, dst, total_packets, cfg, algo));
        info!(flow = ?id, src = ?src, dst = ?dst, total_packets, "流已注册");
        id
    }

    /// 替换转发实现（外部协作者注入点）。
    pub fn set_forwarding(&mut self, routes: Box<dyn Forwarding>) {
        self.routes = routes;
    }

    /// 路由刷新周期（tick 数）。
    pub fn set_route_refresh_ticks(&mut self, every: u64) {
        assert!(every > 0, "route refresh period must be positive");
        self.refresh_every = every;
    }

    pub fn set_recorder(&mut self, rec: Recorder) {
        self.recorder = Some(rec);
    }

    pub fn take_recorder(&mut self) -> Option<Recorder> {
        self.recorder.take()
    }

    /// 执行一个 tick，四个阶段的顺序是协议账目正确性的前提：
    /// 信道先行服务，其后才轮到流发送，因此流在第 t 个 tick
    /// 入队的包最早在第 t+1 个 tick 开始串行化。
    pub fn tick(&mut self) {
        let now = self.clock.now();
        let dt = self.clock.dt();

        // 阶段 1：所有信道各服务一个量子，交付已到达的包。
        for i in 0..self.channels.len() {
            let delivered = self.channels[i].tick(now, dt);
            if delivered.is_empty() {
                continue;
            }
            let at = self.channels[i].dst;
            for pkt in delivered {
                self.handle_arrival(at, pkt, now);
            }
        }

        // 阶段 2：周期性触发外部路由刷新。
        if self.clock.ticks() % self.refresh_every == 0 {
            self.routes.ensure_built(self.nodes.len(), &self.edges);
        }

        // 阶段 3：流执行超时/发送逻辑，把新包推入出向信道。
        for f in 0..self.flows.len() {
            let sends = self.flows[f].on_tick(now);
            if sends.is_empty() {
                continue;
            }
            let from = self.flows[f].src;
            for pkt in sends {
                self.send_from(from, pkt, now);
            }
        }

        // 每 tick 采样一次观测值。
        if let Some(mut rec) = self.recorder.take() {
            rec.sample(now, &self.flows, &self.channels);
            self.recorder = Some(rec);
        }

        // 阶段 4：时间前进。
        self.clock.advance();
    }

    /// 运行到指定仿真时刻；所有流完成后提前返回。
    pub fn run_until(&mut self, until: SimTime) {
        info!(until = ?until, flows = self.flows.len(), "▶️  开始运行仿真");
        while self.clock.now() < until {
            self.tick();
            if !self.flows.is_empty() && self.flows.iter().all(Flow::is_done) {
                info!(now = ?self.clock.now(), "所有流已完成");
                break;
            }
        }
    }

    /// 一个包在某节点落地：要么继续转发，要么交给节点处理。
    fn handle_arrival(&mut self, at: NodeId, pkt: Packet, now: SimTime) {
        if pkt.dst != at {
            // 中间跳：解析下一跳信道继续转发。
            trace!(at = ?at, dst = ?pkt.dst, seq = pkt.seq, "中间跳转发");
            self.send_from(at, pkt, now);
            return;
        }

        self.stats.delivered_pkts += 1;
        self.stats.delivered_bits += pkt.size_bits;

        let action = match &mut self.nodes[at.0] {
            NodeKind::Host(ep) => ep.receive(pkt, now),
            NodeKind::Router(r) => r.receive(pkt, now),
        };
        match action {
            Delivered::Reply(reply) => self.send_from(at, reply, now),
            Delivered::ToFlow(fid, ack) => {
                let sends = self.flows[fid.0].process_ack(&ack, now);
                let from = self.flows[fid.0].src;
                for pkt in sends {
                    self.send_from(from, pkt, now);
                }
            }
            Delivered::Ignored => {}
        }
    }

    /// 沿下一跳信道入队。目的地无法解析说明拓扑配置不一致，
    /// 必须响亮地失败而不是带病运行；丢包则只计数，静默消化。
    fn send_from(&mut self, from: NodeId, pkt: Packet, now: SimTime) {
        let ch = self
            .routes
            .resolve_next_hop(from, pkt.dst)
            .unwrap_or_else(|| panic!("no route from {:?} to {:?}", from, pkt.dst));
        if let Err(dropped) = self.channels[ch.0].enqueue(pkt, now) {
            self.stats.dropped_pkts += 1;
            self.stats.dropped_bits += dropped.size_bits;
        }
    }

    // ---- 只读访问 ----

    pub fn now(&self) -> SimTime {
        self.clock.now()
    }

    pub fn dt(&self) -> SimTime {
        self.clock.dt()
    }

    pub fn ticks(&self) -> u64 {
        self.clock.ticks()
    }

    pub fn node_name(&self, id: NodeId) -> &str {
        self.nodes[id.0].name()
    }

    pub fn flow(&self, id: FlowId) -> &Flow {
        &self.flows[id.0]
    }

    pub fn flows(&self) -> &[Flow] {
        &self.flows
    }

    pub fn channel(&self, id: ChannelId) -> &Channel {
        &self.channels[id.0]
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn link(&self, id: LinkId) -> Link {
        self.links[id.0]
    }

    /// 一条链路两个方向的累计丢包数。
    pub fn link_drops(&self, id: LinkId) -> u64 {
        self.links[id.0]
            .channels()
            .iter()
            .map(|ch| self.channels[ch.0].drops())
            .sum()
    }
}
