//! IO 循环模块
//!
//! 单个后台线程串行化一条链路上的全部物理 IO 和接收状态机变更：
//! 链路句柄、接收缓冲、超时时钟都只被这个线程触碰。
//! 调用方通过 `IoRequest` 队列提交操作并阻塞等待完成信号。

use crate::command::IoRequest;
use crate::error::DriverError;
use crate::framer::Framer;
use crate::metrics::DriverMetrics;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use helm_serial::SerialLink;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// IO 循环配置
///
/// # Example
///
/// ```
/// use helm_driver::PipelineConfig;
///
/// // 默认配置（25ms RX 超时，500µs 空转间隔）
/// let config = PipelineConfig::default();
///
/// // 从端通常用更宽的超时预算
/// let config = PipelineConfig {
///     rx_timeout_ms: 250,
///     ..PipelineConfig::default()
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// RX 超时预算（毫秒）。
    /// 自最后一次字节到达起超过该时长仍凑不出完整帧时清空接收缓冲。
    pub rx_timeout_ms: u64,
    /// 接收轮询的空转休眠（微秒）。
    /// 必须让出控制权而不是硬自旋，避免饿死同线程的超时检查。
    pub poll_interval_us: u64,
    /// 单次从链路读取的最大字节数
    pub read_chunk: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            rx_timeout_ms: 25,
            poll_interval_us: 500,
            read_chunk: 64,
        }
    }
}

/// IO 线程主循环
///
/// 按提交顺序出队执行请求；队列断开或运行标志清零后退出。
/// 出队等待带 10ms 超时，保证关闭信号最迟在一个周期内被察觉。
pub fn io_loop<L: SerialLink>(
    mut link: L,
    cmd_rx: Receiver<IoRequest>,
    running: Arc<AtomicBool>,
    metrics: Arc<DriverMetrics>,
    config: PipelineConfig,
) {
    let mut framer = Framer::new(
        Duration::from_millis(config.rx_timeout_ms),
        metrics.clone(),
    );

    loop {
        if !running.load(Ordering::Relaxed) {
            break;
        }
        match cmd_rx.recv_timeout(Duration::from_millis(10)) {
            Ok(IoRequest::Send { payload, done }) => {
                let result = write_frame(&mut link, &payload, &metrics);
                let _ = done.send(result);
            },
            Ok(IoRequest::Receive { budget, done }) => {
                let result =
                    receive_frame(&mut link, &mut framer, budget, &running, &metrics, &config);
                let _ = done.send(result);
            },
            // 周期性醒来检查运行标志
            Err(RecvTimeoutError::Timeout) => continue,
            // 驱动句柄已全部释放
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }
    debug!("io loop exited");
}

/// 编码并写出一帧
fn write_frame<L: SerialLink>(
    link: &mut L,
    payload: &helm_protocol::Payload,
    metrics: &DriverMetrics,
) -> Result<(), DriverError> {
    let frame = payload.to_frame();
    link.write_all(&frame)?;
    metrics.frames_sent.fetch_add(1, Ordering::Relaxed);
    trace!("sent: {}", payload);
    Ok(())
}

/// 运行接收状态机直到解出一帧
///
/// 每个轮询周期：搬运已到达的字节 → 尝试提取 → 超时检查 → 协作休眠。
/// 运行标志清零时以 [`DriverError::Closed`] 结束，保证 `close()`
/// 能打断进行中的接收。
fn receive_frame<L: SerialLink>(
    link: &mut L,
    framer: &mut Framer,
    budget: Option<Duration>,
    running: &AtomicBool,
    metrics: &DriverMetrics,
    config: &PipelineConfig,
) -> Result<helm_protocol::Payload, DriverError> {
    let mut scratch = vec![0u8; config.read_chunk.max(1)];
    let idle = Duration::from_micros(config.poll_interval_us);

    framer.set_timeout(budget.unwrap_or(Duration::from_millis(config.rx_timeout_ms)));
    // 新的接收从新的超时窗口开始计时
    framer.mark_activity(Instant::now());

    loop {
        if !running.load(Ordering::Relaxed) {
            return Err(DriverError::Closed);
        }

        if link.bytes_available()? > 0 {
            let n = link.read(&mut scratch)?;
            if n > 0 {
                framer.push(&scratch[..n], Instant::now());
            }
        }

        if let Some(payload) = framer.try_extract() {
            debug!("received: {}", payload);
            return Ok(payload);
        }

        if framer.check_timeout(Instant::now()) {
            metrics.rx_timeouts.fetch_add(1, Ordering::Relaxed);
            warn!("UART RX timeout; buffer cleared");
            if budget.is_some() {
                return Err(DriverError::RxTimeout);
            }
        }

        // 协作让出：微秒级精度优于 std::thread::sleep 的毫秒粒度
        spin_sleep::sleep(idle);
    }
}
