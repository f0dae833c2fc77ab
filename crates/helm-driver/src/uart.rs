//! 驱动对外 API
//!
//! `UartDriver` 封装 IO 线程和请求队列，向同步调用方提供阻塞式
//! `send` / `receive`。一个实例对应链路的一端，实例之间不共享
//! 任何状态。

use crate::command::IoRequest;
use crate::error::DriverError;
use crate::metrics::{DriverMetrics, MetricsSnapshot};
use crate::pipeline::{PipelineConfig, io_loop};
use crossbeam_channel::Sender;
use helm_serial::SerialLink;
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{info, warn};

/// 关闭时等待 IO 线程退出的上限
const JOIN_TIMEOUT: Duration = Duration::from_secs(1);

/// 带超时的线程 join 扩展
trait JoinTimeout {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()>;
}

impl<T: Send + 'static> JoinTimeout for JoinHandle<T> {
    fn join_timeout(self, timeout: Duration) -> std::thread::Result<()> {
        use std::sync::mpsc;

        let (tx, rx) = mpsc::channel();
        // 看门狗线程代为 join，自己在通道上限时等待
        std::thread::spawn(move || {
            let _ = tx.send(self.join());
        });

        match rx.recv_timeout(timeout) {
            Ok(join_result) => join_result.map(|_| ()),
            Err(mpsc::RecvTimeoutError::Timeout) => {
                // 超时：看门狗线程继续挂着，进程退出时由 OS 清理
                Err(Box::new(std::io::Error::new(
                    std::io::ErrorKind::TimedOut,
                    "Thread join timeout",
                )))
            },
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionReset,
                "Thread panicked during join",
            ))),
        }
    }
}

/// UART 链路驱动（对外 API）
///
/// 创建时把链路移交给专属 IO 线程；之后所有物理 IO 和接收状态机
/// 变更都发生在那个线程里。调用方提交请求后在完成通道上阻塞，
/// 请求严格按提交顺序生效。
///
/// # 生命周期
///
/// [`close`](UartDriver::close) 向 IO 线程发出停止信号、等待其静默，
/// 之后链路句柄随线程一起释放；关闭后的任何操作返回
/// [`DriverError::Closed`]。`Drop` 执行同样的序列，重复关闭无害。
///
/// # 示例
///
/// ```no_run
/// use helm_driver::{PipelineConfig, UartDriver};
/// use helm_protocol::Payload;
/// use helm_serial::TtyLink;
///
/// let link = TtyLink::open("/dev/serial0", 115200)?;
/// let driver = UartDriver::new(link, PipelineConfig::default())?;
///
/// driver.send(Payload::new("MO", 1.0, 1.0, 1.0, 1.0)?)?;
/// let response = driver.receive()?;
/// println!("{response}");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct UartDriver {
    /// 请求发送端。关闭时必须在 join 之前置 `None`（断开通道），
    /// 否则 `io_loop` 可能收不到 `Disconnected` 而卡住退出。
    cmd_tx: Mutex<Option<Sender<IoRequest>>>,
    /// IO 线程句柄（close 时 join）
    io_thread: Mutex<Option<JoinHandle<()>>>,
    /// 运行标志（清零可打断进行中的接收）
    is_running: Arc<AtomicBool>,
    /// 性能指标
    metrics: Arc<DriverMetrics>,
}

impl UartDriver {
    /// 创建驱动并启动 IO 线程
    ///
    /// # 参数
    /// - `link`: 串口链路（移动到 IO 线程，此后由其独占）
    /// - `config`: IO 循环配置
    ///
    /// # 错误
    /// - [`DriverError::IoThread`]: 线程创建失败
    pub fn new<L>(link: L, config: PipelineConfig) -> Result<Self, DriverError>
    where
        L: SerialLink + Send + 'static,
    {
        // 有界队列，容量 10：设计目标是每端单一调用方，排队属于异常路径
        let (cmd_tx, cmd_rx) = crossbeam_channel::bounded(10);
        let is_running = Arc::new(AtomicBool::new(true));
        let metrics = Arc::new(DriverMetrics::new());

        let running = is_running.clone();
        let metrics_for_io = metrics.clone();
        let io_thread = std::thread::Builder::new()
            .name("helm-uart-io".to_string())
            .spawn(move || {
                io_loop(link, cmd_rx, running, metrics_for_io, config);
            })
            .map_err(|e| DriverError::IoThread(e.to_string()))?;

        info!("UART driver ready");
        Ok(Self {
            cmd_tx: Mutex::new(Some(cmd_tx)),
            io_thread: Mutex::new(Some(io_thread)),
            is_running,
            metrics,
        })
    }

    /// 编码并发送一个载荷，阻塞到写出完成
    pub fn send(&self, payload: helm_protocol::Payload) -> Result<(), DriverError> {
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        self.submit(IoRequest::Send {
            payload,
            done: done_tx,
        })?;
        done_rx.recv().map_err(|_| DriverError::ChannelClosed)?
    }

    /// 阻塞接收下一个载荷
    ///
    /// RX 超时只触发内部缓冲清空（记录日志和指标），调用会继续等待；
    /// 墙钟上无上界，除非驱动被关闭。
    pub fn receive(&self) -> Result<helm_protocol::Payload, DriverError> {
        self.receive_inner(None)
    }

    /// 限时接收下一个载荷
    ///
    /// 自最后一次字节到达起超过 `budget` 仍未凑出完整帧时，
    /// 清空缓冲并返回 [`DriverError::RxTimeout`]。
    pub fn receive_timeout(
        &self,
        budget: Duration,
    ) -> Result<helm_protocol::Payload, DriverError> {
        self.receive_inner(Some(budget))
    }

    fn receive_inner(
        &self,
        budget: Option<Duration>,
    ) -> Result<helm_protocol::Payload, DriverError> {
        let (done_tx, done_rx) = crossbeam_channel::bounded(1);
        self.submit(IoRequest::Receive {
            budget,
            done: done_tx,
        })?;
        done_rx.recv().map_err(|_| DriverError::ChannelClosed)?
    }

    /// 指标快照
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// 驱动是否仍在运行
    pub fn is_open(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// 关闭驱动
    ///
    /// 停止信号 → 断开请求队列 → 等待 IO 线程静默，之后链路句柄
    /// 随线程栈释放，保证返回后不再有任何 IO。进行中的接收/发送
    /// 以 [`DriverError::Closed`] 结束。允许并发/重复调用，
    /// 后续调用是空操作。
    pub fn close(&self) {
        if self.is_running.swap(false, Ordering::Relaxed) {
            info!("closing UART driver");
        }

        // 先断开通道，再 join
        drop(self.cmd_tx.lock().take());

        if let Some(handle) = self.io_thread.lock().take() {
            if handle.join_timeout(JOIN_TIMEOUT).is_err() {
                warn!("IO thread did not exit within {:?}", JOIN_TIMEOUT);
            }
        }
    }

    /// 提交请求。克隆发送端后立刻放锁，阻塞等待期间不持有任何锁。
    fn submit(&self, request: IoRequest) -> Result<(), DriverError> {
        if !self.is_running.load(Ordering::Relaxed) {
            return Err(DriverError::Closed);
        }
        let tx = self
            .cmd_tx
            .lock()
            .as_ref()
            .cloned()
            .ok_or(DriverError::Closed)?;
        tx.send(request).map_err(|_| DriverError::ChannelClosed)
    }
}

impl Drop for UartDriver {
    fn drop(&mut self) {
        self.close();
    }
}
