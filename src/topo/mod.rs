//! 实验拓扑构建
//!
//! 拓扑文件格式解析属于外部协作者；这里只提供实验用的
//! 程序化构建器，并在启动前做配置校验。

// 子模块声明
mod chain;
mod error;
mod two_host;

// 重新导出公共接口
pub use chain::{ChainOpts, build_chain};
pub use error::{MAX_RUN, TopologyError, validate_link, validate_run};
pub use two_host::{TwoHostOpts, build_two_host};
