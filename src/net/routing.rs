//! 转发能力
//!
//! 核心对路由唯一的要求：给定目的节点，解析出下一跳信道。
//! 表如何算出来（Dijkstra/距离向量等）属于外部协作者；
//! 这里只定义能力接口，并提供一个按最短跳数预计算的默认实现。

use std::collections::{HashMap, VecDeque};

use super::id::{ChannelId, NodeId};
use tracing::debug;

/// 拓扑的有向边：(源节点, 目的节点, 承载信道)。
pub type Edge = (NodeId, NodeId, ChannelId);

/// 转发能力。两次刷新之间必须幂等；核心只读，从不修改表内容。
pub trait Forwarding: std::fmt::Debug {
    /// 解析从 `from` 去往 `dst` 的下一跳信道。
    fn resolve_next_hop(&self, from: NodeId, dst: NodeId) -> Option<ChannelId>;

    /// 基于当前拓扑确保表是最新的（脏则重建）。
    fn ensure_built(&mut self, n_nodes: usize, edges: &[Edge]);

    /// 拓扑变化后标脏，下次刷新时重建。
    fn mark_dirty(&mut self);
}

/// 默认实现：对每个目的节点在反向图上做 BFS，
/// 为每个 (from, dst) 预计算一条最短跳数路径的下一跳。
/// 等价候选取边表中最先出现的，保证确定性。
#[derive(Debug, Default)]
pub struct HopCountRoutes {
    dirty: bool,
    next_hops: HashMap<(NodeId, NodeId), ChannelId>,
}

impl HopCountRoutes {
    pub fn new() -> Self {
        Self {
            dirty: true,
            next_hops: HashMap::new(),
        }
    }
}

impl Forwarding for HopCountRoutes {
    fn resolve_next_hop(&self, from: NodeId, dst: NodeId) -> Option<ChannelId> {
        self.next_hops.get(&(from, dst)).copied()
    }

    fn ensure_built(&mut self, n_nodes: usize, edges: &[Edge]) {
        if !self.dirty {
            return;
        }

        let mut adj: Vec<Vec<(NodeId, ChannelId)>> = vec![Vec::new(); n_nodes];
        let mut rev_adj: Vec<Vec<NodeId>> = vec![Vec::new(); n_nodes];
        for &(from, to, ch) in edges {
            adj[from.0].push((to, ch));
            rev_adj[to.0].push(from);
        }

        self.next_hops.clear();
        let mut dist: Vec<i32> = vec![i32::MAX; n_nodes];
        let mut q: VecDeque<NodeId> = VecDeque::new();

        for dst_idx in 0..n_nodes {
            dist.fill(i32::MAX);
            q.clear();

            let dst = NodeId(dst_idx);
            dist[dst_idx] = 0;
            q.push_back(dst);

            // 反向图 BFS 得到各节点到 dst 的最短跳数。
            while let Some(v) = q.pop_front() {
                let dv = dist[v.0];
                for &pred in &rev_adj[v.0] {
                    if dist[pred.0] == i32::MAX {
                        dist[pred.0] = dv.saturating_add(1);
                        q.push_back(pred);
                    }
                }
            }

            for from_idx in 0..n_nodes {
                let from = NodeId(from_idx);
                if from == dst || dist[from_idx] == i32::MAX {
                    continue;
                }
                for &(nh, ch) in &adj[from_idx] {
                    if dist[nh.0] == dist[from_idx] - 1 {
                        self.next_hops.insert((from, dst), ch);
                        break;
                    }
                }
            }
        }

        debug!(entries = self.next_hops.len(), "转发表已重建");
        self.dirty = false;
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
