//! IO 线程请求类型
//!
//! 调用方把请求排进单工作线程的队列，并在完成通道上阻塞等待。
//! 工作线程严格按提交顺序出队执行，因此同一时刻最多只有一个写
//! 操作、一个接收提取在进行，这是并发模型的核心不变式。

use crate::error::DriverError;
use crossbeam_channel::Sender;
use helm_protocol::Payload;
use std::time::Duration;

/// 提交给 IO 线程的请求
///
/// 每个请求携带自己的完成通道（容量 1），结果经由它送回阻塞中的
/// 调用方。IO 线程发送结果时调用方可能已经放弃等待，发送失败
/// 直接忽略。
pub enum IoRequest {
    /// 编码并写出一帧
    Send {
        payload: Payload,
        done: Sender<Result<(), DriverError>>,
    },

    /// 运行接收状态机直到解出下一帧
    ///
    /// `budget` 为 `Some` 时，第一次 RX 超时（缓冲清空）即以
    /// [`DriverError::RxTimeout`] 结束本次请求；为 `None` 时超时仅
    /// 记录并继续等待。
    Receive {
        budget: Option<Duration>,
        done: Sender<Result<Payload, DriverError>>,
    },
}
