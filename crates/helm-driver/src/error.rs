//! 驱动层错误类型定义

use helm_protocol::ProtocolError;
use helm_serial::SerialError;
use thiserror::Error;

/// 驱动层错误类型
///
/// 帧级损坏（CRC 失败、假标记）不在此列：它们由接收端状态机
/// 本地重同步消化，只记录日志和指标，永远不会作为错误返回给调用方。
#[derive(Error, Debug)]
pub enum DriverError {
    /// 串口链路错误
    #[error("Serial link error: {0}")]
    Serial(#[from] SerialError),

    /// 协议层错误（载荷构造失败）
    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// 驱动已关闭，操作被拒绝
    #[error("Driver is closed")]
    Closed,

    /// 命令通道已断开（IO 线程退出）
    #[error("Command channel closed")]
    ChannelClosed,

    /// 限时接收在预算内没有等到完整载荷
    ///
    /// 接收缓冲已被清空（恢复动作），链路本身仍然健康。
    #[error("RX timeout waiting for a complete frame")]
    RxTimeout,

    /// IO 线程错误
    #[error("IO thread error: {0}")]
    IoThread(String),
}
