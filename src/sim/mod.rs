//! 仿真核心模块
//!
//! 此模块包含离散时间仿真的核心组件：仿真时间与固定步长时钟。

// 子模块声明
mod clock;
mod time;

// 重新导出公共接口
pub use clock::Clock;
pub use time::SimTime;
