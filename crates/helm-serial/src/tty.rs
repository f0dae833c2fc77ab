//! 物理串口后端
//!
//! 基于 `serialport` crate 的 TTY 实现。
//!
//! ## 限制
//!
//! - 波特率在打开时设定，运行期不变
//! - 设备独占：一个 `TtyLink` 对应一个串口句柄，跨实例不共享
//! - 权限要求：Linux 下可能需要 `dialout` 组权限

use crate::{SerialError, SerialLink};
use std::io::{Read, Write};
use std::time::Duration;
use tracing::{debug, info};

/// 读超时。链路层 `read` 语义是"返回已到达的字节"，
/// 这里的超时只是底层句柄的轮询粒度，超时会被折算成 `Ok(0)`。
const READ_TIMEOUT: Duration = Duration::from_millis(10);

/// 物理串口链路
///
/// 构造即打开设备（等价于协议层的 `open()`：已打开的链路再"打开"
/// 没有意义，幂等性由构造语义保证）。句柄随 `TtyLink` 一起释放。
///
/// # 示例
///
/// ```no_run
/// use helm_serial::{SerialLink, TtyLink};
///
/// let mut link = TtyLink::open("/dev/serial0", 115200).unwrap();
/// link.write_all(b"zz").unwrap();
/// ```
pub struct TtyLink {
    /// 串口句柄
    port: Box<dyn serialport::SerialPort>,
    /// 设备路径（如 "/dev/serial0"）
    path: String,
}

impl TtyLink {
    /// 打开串口设备
    ///
    /// # 参数
    /// - `path`: 设备路径（如 `/dev/serial0`、`/dev/ttyUSB0`）
    /// - `baud`: 波特率（协议默认 115200）
    ///
    /// # 错误
    /// - [`SerialError::Open`]: 设备不存在、被占用或权限不足
    pub fn open(path: &str, baud: u32) -> Result<Self, SerialError> {
        let port = serialport::new(path, baud)
            .timeout(READ_TIMEOUT)
            .open()
            .map_err(|e| SerialError::Open {
                port: path.to_string(),
                message: e.to_string(),
            })?;
        info!("serial port {} opened at {} baud", path, baud);
        Ok(Self {
            port,
            path: path.to_string(),
        })
    }

    /// 设备路径
    pub fn path(&self) -> &str {
        &self.path
    }
}

impl SerialLink for TtyLink {
    fn bytes_available(&mut self) -> Result<usize, SerialError> {
        Ok(self.port.bytes_to_read()? as usize)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        match self.port.read(buf) {
            Ok(n) => Ok(n),
            // 超时即"暂无数据"，交给上层的轮询节奏处理
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(0),
            Err(e) => Err(e.into()),
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        self.port.write_all(bytes)?;
        self.port.flush()?;
        debug!("wrote {} bytes to {}", bytes.len(), self.path);
        Ok(())
    }
}

impl Drop for TtyLink {
    fn drop(&mut self) {
        info!("serial port {} closed", self.path);
    }
}
