//! 标识符类型
//!
//! 定义节点、信道、链路和流的唯一标识符。
//! 所有跨组件引用都通过这些索引句柄经 `Network` 解析，
//! 不存在任何全局注册表。

/// 节点标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

/// 单向信道（HalfLink）标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChannelId(pub usize);

/// 双向链路标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkId(pub usize);

/// 流标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FlowId(pub usize);
