//! # Helm Protocol
//!
//! Helm 驱动协议的载荷编解码（无硬件依赖）
//!
//! ## 模块
//!
//! - `crc8`: CRC-8 完整性校验（查表法 + 位循环法）
//! - `payload`: `Payload` 应用层记录（命令码 + 四个驱动轮值）
//! - `wire`: 固定 21 字节线上帧格式的编码与解码
//!
//! ## 字节序
//!
//! 线上格式全部使用小端字节序（little-endian），
//! 浮点字段为 IEEE-754 单精度。

pub mod crc8;
pub mod payload;
pub mod wire;

// 重新导出常用类型
pub use payload::{CMD_ACK, CMD_ERROR, CMD_MOTION, Payload};
pub use wire::{FRAME_SIZE, MARKER_SIZE, PAYLOAD_SIZE, SYNC_MARKER};

use thiserror::Error;

/// 协议层错误类型
///
/// 解码失败（`SizeMismatch` / `BadMarker` / `IntegrityMismatch`）由接收端
/// 状态机本地恢复，不会穿透到会话层；只有 `InvalidCommand` 会在构造时
/// 直接返回给应用代码。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    /// 命令码不是恰好 2 个 ASCII 字母
    #[error("Invalid command: expected 2 ASCII letters, got {0:?}")]
    InvalidCommand(String),

    /// 输入长度不等于帧长
    #[error("Invalid frame size: expected {expected}, got {actual}")]
    SizeMismatch { expected: usize, actual: usize },

    /// 帧头不是同步标记
    #[error("Invalid sync marker")]
    BadMarker,

    /// CRC 校验失败
    #[error("CRC mismatch: expected 0x{expected:02X}, got 0x{actual:02X}")]
    IntegrityMismatch { expected: u8, actual: u8 },
}
