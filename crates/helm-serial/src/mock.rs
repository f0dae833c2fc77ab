//! Mock 串口后端
//!
//! 无硬件依赖的内存链路，用于测试与回环演示：
//!
//! - [`MockLink::new`] 返回链路和一个 [`MockLinkHandle`]，
//!   测试侧通过句柄注入接收字节、取走已写出的字节；
//! - [`MockLink::pair`] 返回一对交叉连接的端点，
//!   主从两个会话可以在同一进程内完成完整交换。

use crate::{SerialError, SerialLink};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

type SharedBuf = Arc<Mutex<VecDeque<u8>>>;

/// 内存串口链路
pub struct MockLink {
    /// 本端点读到的字节来自这里
    rx: SharedBuf,
    /// 本端点写出的字节进入这里
    tx: SharedBuf,
}

/// 测试侧句柄：向链路注入/取出字节
#[derive(Clone)]
pub struct MockLinkHandle {
    rx: SharedBuf,
    tx: SharedBuf,
}

impl MockLink {
    /// 创建链路和测试句柄
    pub fn new() -> (Self, MockLinkHandle) {
        let rx: SharedBuf = Arc::new(Mutex::new(VecDeque::new()));
        let tx: SharedBuf = Arc::new(Mutex::new(VecDeque::new()));
        (
            Self {
                rx: rx.clone(),
                tx: tx.clone(),
            },
            MockLinkHandle { rx, tx },
        )
    }

    /// 创建一对交叉连接的端点（A 写出的字节成为 B 的输入，反之亦然）
    pub fn pair() -> (Self, Self) {
        let a_to_b: SharedBuf = Arc::new(Mutex::new(VecDeque::new()));
        let b_to_a: SharedBuf = Arc::new(Mutex::new(VecDeque::new()));
        (
            Self {
                rx: b_to_a.clone(),
                tx: a_to_b.clone(),
            },
            Self {
                rx: a_to_b,
                tx: b_to_a,
            },
        )
    }
}

impl SerialLink for MockLink {
    fn bytes_available(&mut self) -> Result<usize, SerialError> {
        Ok(self.rx.lock().len())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, SerialError> {
        let mut rx = self.rx.lock();
        let mut n = 0;
        while n < buf.len() {
            match rx.pop_front() {
                Some(byte) => {
                    buf[n] = byte;
                    n += 1;
                },
                None => break,
            }
        }
        Ok(n)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), SerialError> {
        self.tx.lock().extend(bytes.iter().copied());
        Ok(())
    }
}

impl MockLinkHandle {
    /// 注入字节，之后链路的 `read` 会读到它们
    pub fn inject(&self, bytes: &[u8]) {
        self.rx.lock().extend(bytes.iter().copied());
    }

    /// 取走链路到目前为止写出的全部字节
    pub fn drain_written(&self) -> Vec<u8> {
        self.tx.lock().drain(..).collect()
    }

    /// 尚未被链路读走的注入字节数
    pub fn pending_rx(&self) -> usize {
        self.rx.lock().len()
    }
}
