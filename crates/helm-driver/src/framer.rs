//! 接收端同步状态机
//!
//! 把传输层送来的原始字节流切成完整的、通过校验的载荷。
//! 状态机只有两个状态：未定位标记（搜索）和已定位标记等待整帧（累积），
//! 每成功提取一帧就回到搜索状态。
//!
//! 纯逻辑：不做任何 IO，时钟由调用方注入，
//! 同一实现同时服务阻塞式和轮询式的等待方式。
//!
//! ## 恢复策略
//!
//! - 无标记时只保留缓冲区尾部 `MARKER_SIZE - 1` 字节，
//!   纯噪声下缓冲区不会无界增长；
//! - 候选帧解码失败时只丢弃标记首字节再搜索，
//!   损坏数据内部的假标记不会吞掉紧随其后的真标记；
//! - 超过超时预算没有新字节到达时清空整个缓冲区，
//!   半帧残留不会永久卡住接收端。

use crate::metrics::DriverMetrics;
use helm_protocol::{FRAME_SIZE, MARKER_SIZE, Payload, SYNC_MARKER};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tracing::{trace, warn};

/// 全扫描定位同步标记
///
/// 快路径（缓冲区即以标记开头）只是优化，两者结果必须一致。
fn find_marker(buf: &[u8]) -> Option<usize> {
    buf.windows(MARKER_SIZE).position(|w| w == &SYNC_MARKER)
}

/// 接收端状态机
///
/// 接收缓冲与超时时钟由本结构独占；IO 线程是唯一的调用方。
pub struct Framer {
    /// 接收缓冲（原则上无界，实际被主动修剪）
    buf: Vec<u8>,
    /// 超时预算
    timeout: Duration,
    /// 最后一次字节到达（或缓冲清空）的时刻
    last_activity: Instant,
    /// 指标计数器（与 IO 线程共享）
    metrics: Arc<DriverMetrics>,
}

impl Framer {
    /// 创建状态机
    pub fn new(timeout: Duration, metrics: Arc<DriverMetrics>) -> Self {
        Self {
            buf: Vec::new(),
            timeout,
            last_activity: Instant::now(),
            metrics,
        }
    }

    /// 调整超时预算（每次接收请求可以带自己的预算）
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// 追加新到达的字节并重置超时时钟
    pub fn push(&mut self, bytes: &[u8], now: Instant) {
        if bytes.is_empty() {
            return;
        }
        self.buf.extend_from_slice(bytes);
        self.last_activity = now;
        trace!(
            "framer: +{} bytes, buffer size now {}",
            bytes.len(),
            self.buf.len()
        );
    }

    /// 把超时时钟重置到 `now`（新的接收请求从新窗口开始计时）
    pub fn mark_activity(&mut self, now: Instant) {
        self.last_activity = now;
    }

    /// 尝试从缓冲区提取一个完整载荷
    ///
    /// 内部循环消化所有可判定的数据：丢噪声、等整帧、解码失败时
    /// 单字节重同步，直到提取出一帧或缓冲区不足以继续判定。
    pub fn try_extract(&mut self) -> Option<Payload> {
        loop {
            // 快路径：缓冲区已以标记开头，免去全扫描
            let idx = if self.buf.starts_with(&SYNC_MARKER) {
                0
            } else {
                match find_marker(&self.buf) {
                    Some(idx) => idx,
                    None => {
                        // 无标记：只保留可能构成半个标记的尾部
                        if self.buf.len() > MARKER_SIZE - 1 {
                            let discard = self.buf.len() - (MARKER_SIZE - 1);
                            self.discard_front(discard);
                        }
                        return None;
                    },
                }
            };

            // 标记前的字节是噪声
            if idx > 0 {
                self.discard_front(idx);
            }

            // 标记已就位但整帧未到齐：继续累积
            if self.buf.len() < FRAME_SIZE {
                return None;
            }

            match Payload::from_frame(&self.buf[..FRAME_SIZE]) {
                Ok(payload) => {
                    self.buf.drain(..FRAME_SIZE);
                    self.metrics.frames_decoded.fetch_add(1, Ordering::Relaxed);
                    return Some(payload);
                },
                Err(e) => {
                    // 候选帧损坏（提取以标记为锚，只可能是校验失败）。
                    // 只丢标记首字节重新搜索：紧随其后的真标记仍可命中。
                    warn!("frame decode error: {}; resyncing", e);
                    self.discard_front(1);
                    self.metrics.integrity_errors.fetch_add(1, Ordering::Relaxed);
                },
            }
        }
    }

    /// 超时检查
    ///
    /// 自最后一次字节到达起超过预算时，清空缓冲区并重置时钟，
    /// 返回 `true` 由调用方记录。这是半帧停滞和持续无标记的
    /// 唯一恢复动作，不是致命错误。
    pub fn check_timeout(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_activity) <= self.timeout {
            return false;
        }
        if !self.buf.is_empty() {
            self.metrics
                .bytes_discarded
                .fetch_add(self.buf.len() as u64, Ordering::Relaxed);
            self.buf.clear();
        }
        self.last_activity = now;
        true
    }

    /// 当前缓冲字节数
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    fn discard_front(&mut self, n: usize) {
        self.buf.drain(..n);
        self.metrics
            .bytes_discarded
            .fetch_add(n as u64, Ordering::Relaxed);
    }
}
