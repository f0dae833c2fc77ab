//! 驱动层性能指标
//!
//! 零开销原子计数器，用于监控链路健康状态。所有计数器都使用
//! 原子操作，可以在任何线程安全地读取，不会引入锁竞争。

use std::sync::atomic::{AtomicU64, Ordering};

/// 驱动实时指标
///
/// IO 线程更新，任意线程读取快照。
///
/// # 使用示例
///
/// ```rust
/// use helm_driver::DriverMetrics;
/// use std::sync::Arc;
/// use std::sync::atomic::Ordering;
///
/// let metrics = Arc::new(DriverMetrics::default());
/// metrics.frames_decoded.fetch_add(1, Ordering::Relaxed);
///
/// let snapshot = metrics.snapshot();
/// assert_eq!(snapshot.frames_decoded, 1);
/// ```
#[derive(Debug, Default)]
pub struct DriverMetrics {
    /// 成功解码的接收帧数
    pub frames_decoded: AtomicU64,

    /// 成功写出的发送帧数
    pub frames_sent: AtomicU64,

    /// 候选帧解码失败次数（CRC 失败或假标记命中）
    ///
    /// 每次失败都会触发一次单字节重同步。偶发为正常现象（线路噪声）；
    /// 持续增长说明波特率不匹配或接线故障。
    pub integrity_errors: AtomicU64,

    /// RX 超时次数（缓冲被清空的恢复动作）
    pub rx_timeouts: AtomicU64,

    /// 作为噪声丢弃的字节数（标记前导噪声 + 无标记修剪 + 重同步）
    pub bytes_discarded: AtomicU64,
}

impl DriverMetrics {
    /// 创建新的指标集（全零）
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取一致性快照
    ///
    /// 各计数器独立读取（Relaxed），跨计数器不保证瞬时一致，
    /// 用于监控足够。
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            integrity_errors: self.integrity_errors.load(Ordering::Relaxed),
            rx_timeouts: self.rx_timeouts.load(Ordering::Relaxed),
            bytes_discarded: self.bytes_discarded.load(Ordering::Relaxed),
        }
    }
}

/// 指标快照（普通整数，便于日志和断言）
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub frames_decoded: u64,
    pub frames_sent: u64,
    pub integrity_errors: u64,
    pub rx_timeouts: u64,
    pub bytes_discarded: u64,
}
