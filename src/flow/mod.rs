//! 流与拥塞控制模块
//!
//! 此模块包含发送端状态机与可选的拥塞控制算法变体。

// 子模块声明
mod algo;
mod flow;

// 重新导出公共接口
pub use algo::{CongestionAlgorithm, FastConfig, FastState};
pub use flow::{Flow, FlowConfig, FlowState, SentRecord};
