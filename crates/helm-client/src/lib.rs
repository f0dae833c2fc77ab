//! # Helm 会话层
//!
//! 驱动之上的薄角色封装，把请求/应答交换组装成两个角色：
//!
//! - [`UartMaster`]: 发出请求并等待响应；一次交换没有等到有效
//!   响应时以错误哨兵载荷收场，循环继续而不中止
//! - [`UartSlave`]: 无界服务循环；每成功收到一个载荷就回发恰好
//!   一个应答，空转周期记一条警告后继续
//!
//! 帧级损坏和超时都在驱动层自愈，这里只看到成功解码的载荷
//! 或显式的超时信号。

mod master;
mod slave;

pub use master::UartMaster;
pub use slave::UartSlave;
