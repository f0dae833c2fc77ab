//! # Helm UART 驱动层
//!
//! 本模块把一条全双工、含噪声的串行链路变成可靠的载荷流，包括：
//! - 接收端同步状态机（标记搜索、缓冲、超时恢复、重同步）
//! - 单 IO 线程管理（链路句柄、接收缓冲、超时时钟全部独占于该线程）
//! - 阻塞式 `send` / `receive` 外观（调用方排队等待完成信号）
//! - 性能指标（原子计数器）
//!
//! ## 使用场景
//!
//! 一个 [`UartDriver`] 实例对应链路的一端（主端或从端），
//! 大多数用户应该使用 `helm-client` 提供的会话角色封装。

pub mod command;
mod error;
pub mod framer;
pub mod metrics;
pub mod pipeline;
mod uart;

pub use command::IoRequest;
pub use error::DriverError;
pub use framer::Framer;
pub use metrics::{DriverMetrics, MetricsSnapshot};
pub use pipeline::{PipelineConfig, io_loop};
pub use uart::UartDriver;
