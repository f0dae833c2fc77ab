//! 从端会话角色

use helm_driver::{DriverError, UartDriver};
use helm_protocol::Payload;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

/// 默认接收预算（从端比主端宽松一个量级）
const DEFAULT_RECEIVE_BUDGET: Duration = Duration::from_millis(250);

/// UART 从端
///
/// 应答的一方：每成功收到一个载荷就回发恰好一个全零 `"AK"` 应答，
/// 然后把载荷交给应用回调。空转周期（预算内无载荷）记一条警告后
/// 继续，不重试、不中止。
pub struct UartSlave {
    driver: UartDriver,
    /// 单个服务周期等待载荷的预算
    receive_budget: Duration,
}

impl UartSlave {
    /// 创建从端会话
    pub fn new(driver: UartDriver) -> Self {
        Self {
            driver,
            receive_budget: DEFAULT_RECEIVE_BUDGET,
        }
    }

    /// 调整接收预算
    pub fn with_receive_budget(mut self, budget: Duration) -> Self {
        self.receive_budget = budget;
        self
    }

    /// 执行一个服务周期
    ///
    /// 收到载荷时回发应答并返回 `Ok(Some(payload))`；
    /// 预算内无载荷返回 `Ok(None)`；链路错误和关闭照常传播。
    pub fn poll_once(&self) -> Result<Option<Payload>, DriverError> {
        match self.driver.receive_timeout(self.receive_budget) {
            Ok(payload) => {
                debug!("slave received: {}", payload);
                self.driver.send(Payload::ack())?;
                Ok(Some(payload))
            },
            Err(DriverError::RxTimeout) => {
                warn!("receive cycle yielded no packet");
                Ok(None)
            },
            Err(e) => Err(e),
        }
    }

    /// 无界服务循环
    ///
    /// `running` 清零后干净返回；循环中驱动被关闭同样视为正常
    /// 停机。其余错误向上传播。
    pub fn serve<F>(&self, running: &AtomicBool, mut on_payload: F) -> Result<(), DriverError>
    where
        F: FnMut(&Payload),
    {
        info!("slave serving");
        while running.load(Ordering::Relaxed) {
            match self.poll_once() {
                Ok(Some(payload)) => on_payload(&payload),
                Ok(None) => continue,
                Err(DriverError::Closed) | Err(DriverError::ChannelClosed) => break,
                Err(e) => return Err(e),
            }
        }
        info!("slave stopped");
        Ok(())
    }

    /// 关闭底层驱动
    pub fn close(&self) {
        self.driver.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use helm_driver::PipelineConfig;
    use helm_serial::mock::MockLink;

    fn slave_with_handle() -> (UartSlave, helm_serial::mock::MockLinkHandle) {
        let (link, handle) = MockLink::new();
        let driver = UartDriver::new(link, PipelineConfig::default()).unwrap();
        (
            UartSlave::new(driver).with_receive_budget(Duration::from_millis(50)),
            handle,
        )
    }

    /// 收到合法运动命令后恰好回发一个全零应答
    #[test]
    fn test_acknowledges_received_payload() {
        let (slave, handle) = slave_with_handle();
        let motion = Payload::new("MO", 10.0, 20.0, -10.0, -20.0).unwrap();
        handle.inject(&motion.to_frame());

        let received = slave.poll_once().unwrap();
        assert_eq!(received, Some(motion));
        assert_eq!(handle.drain_written(), Payload::ack().to_frame().to_vec());
    }

    #[test]
    fn test_empty_cycle_yields_none_and_no_ack() {
        let (slave, handle) = slave_with_handle();
        assert_eq!(slave.poll_once().unwrap(), None);
        assert!(handle.drain_written().is_empty());
    }

    /// 损坏帧不产生应答；后续合法帧照常应答
    #[test]
    fn test_corrupted_frame_produces_no_ack() {
        let (slave, handle) = slave_with_handle();
        let motion = Payload::new("MO", 1.0, 2.0, 3.0, 4.0).unwrap();
        let mut corrupt = motion.to_frame();
        corrupt[12] ^= 0x55;

        handle.inject(&corrupt);
        assert_eq!(slave.poll_once().unwrap(), None);
        assert!(handle.drain_written().is_empty());

        handle.inject(&motion.to_frame());
        assert_eq!(slave.poll_once().unwrap(), Some(motion));
        assert_eq!(handle.drain_written(), Payload::ack().to_frame().to_vec());
    }
}
