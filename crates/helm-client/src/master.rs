//! 主端会话角色

use helm_driver::{DriverError, UartDriver};
use helm_protocol::{CMD_MOTION, Payload};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// 默认响应预算
const DEFAULT_RESPONSE_BUDGET: Duration = Duration::from_millis(25);

/// UART 主端
///
/// 发起请求/应答交换的一方。交换语义：发送一帧，限时等待响应；
/// 预算内没有等到有效载荷时返回错误哨兵（命令码 `"ER"`，字段全
/// `-1.0`），调用方据此决定继续或放弃，会话本身不会中止。
pub struct UartMaster {
    driver: UartDriver,
    /// 单次交换等待响应的预算
    response_budget: Duration,
}

impl UartMaster {
    /// 创建主端会话
    pub fn new(driver: UartDriver) -> Self {
        Self {
            driver,
            response_budget: DEFAULT_RESPONSE_BUDGET,
        }
    }

    /// 调整响应预算
    pub fn with_response_budget(mut self, budget: Duration) -> Self {
        self.response_budget = budget;
        self
    }

    /// 发送一个载荷
    pub fn send_payload(&self, payload: Payload) -> Result<(), DriverError> {
        self.driver.send(payload)?;
        info!("master sent: {}", payload);
        Ok(())
    }

    /// 限时等待一个响应载荷
    pub fn receive_payload(&self) -> Result<Payload, DriverError> {
        let payload = self.driver.receive_timeout(self.response_budget)?;
        info!("master received: {}", payload);
        Ok(payload)
    }

    /// 完整的一次交换：发送请求，等待响应
    ///
    /// 预算内没有等到有效响应时返回 [`Payload::error_sentinel`]；
    /// 链路错误和关闭仍然作为错误传播。
    pub fn send_receive_payload(&self, payload: Payload) -> Result<Payload, DriverError> {
        self.send_payload(payload)?;
        match self.receive_payload() {
            Ok(response) => Ok(response),
            Err(DriverError::RxTimeout) => {
                error!("no valid response received; substituting error payload");
                Ok(Payload::error_sentinel())
            },
            Err(e) => Err(e),
        }
    }

    /// 持续交换循环
    ///
    /// 每个周期从 `source` 取一个驱动值，组装运动命令
    /// （前两轮取该值，后两轮固定 -10.0 / -20.0，与手动速度测试
    /// 一致），执行一次交换并记录耗时。`running` 清零或 `source`
    /// 返回 `None` 后返回。
    pub fn run<F>(
        &self,
        running: &AtomicBool,
        interval: Duration,
        mut source: F,
    ) -> Result<(), DriverError>
    where
        F: FnMut() -> Option<f32>,
    {
        while running.load(Ordering::Relaxed) {
            let Some(value) = source() else {
                break;
            };
            let payload = Payload::new(CMD_MOTION, value, value, -10.0, -20.0)?;

            let started = Instant::now();
            let response = self.send_receive_payload(payload)?;
            let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

            if response == Payload::error_sentinel() {
                warn!("exchange failed after {:.2} ms", elapsed_ms);
            } else {
                info!("exchange round-trip: {:.2} ms", elapsed_ms);
            }

            if !interval.is_zero() {
                std::thread::sleep(interval);
            }
        }
        Ok(())
    }

    /// 关闭底层驱动
    pub fn close(&self) {
        self.driver.close();
    }
}
