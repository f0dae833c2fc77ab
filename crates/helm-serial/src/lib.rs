//! # Helm Serial Link Layer
//!
//! 串口硬件抽象层，提供统一的字节链路接口。
//!
//! 接收端状态机只依赖三个非阻塞原语：`bytes_available` / `read` /
//! `write_all`，物理细节（打开设备、波特率）全部收在后端实现里。
//!
//! ## 后端
//!
//! - [`TtyLink`]: 基于 `serialport` crate 的物理串口后端
//! - `mock::MockLink`: 无硬件依赖的测试后端（需要 `mock` feature）

use thiserror::Error;

pub mod tty;

#[cfg(any(test, feature = "mock"))]
pub mod mock;

pub use tty::TtyLink;

/// 串口链路层统一错误类型
#[derive(Error, Debug)]
pub enum SerialError {
    /// 底层 IO 错误
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 打开串口设备失败
    #[error("Failed to open serial port {port}: {message}")]
    Open { port: String, message: String },

    /// 其他串口后端错误
    #[error("Serial port error: {0}")]
    Port(String),
}

impl From<serialport::Error> for SerialError {
    fn from(e: serialport::Error) -> Self {
        SerialError::Port(e.to_string())
    }
}

/// 字节链路抽象
///
/// 接收端状态机和 IO 线程对物理传输的全部要求。
/// 除 `write_all` 可能阻塞到链路缓冲区接受数据外，其余操作不阻塞：
/// `read` 只返回当前已到达的字节。
pub trait SerialLink {
    /// 当前可读字节数
    fn bytes_available(&mut self) -> Result<usize, SerialError>;

    /// 读取已到达的字节（最多 `buf.len()` 个），返回实际读取数
    ///
    /// 无数据时返回 `Ok(0)`，不等待帧边界。
    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError>;

    /// 写出全部字节并冲刷
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError>;
}
