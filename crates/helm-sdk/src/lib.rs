//! # Helm SDK
//!
//! Helm UART 驱动协议栈的统一入口。
//!
//! ## 分层
//!
//! ```text
//! Session Layer (client)    主/从角色，请求/应答交换
//!     ↓
//! Driver Layer (driver)     接收状态机 + 单 IO 线程 + 阻塞外观
//!     ↓
//! Link Layer (serial)       bytes_available / read / write_all
//!     ↓
//! Protocol Layer (protocol) 21 字节帧，CRC-8 完整性校验
//! ```
//!
//! ## 快速开始
//!
//! ```no_run
//! use helm_sdk::client::UartMaster;
//! use helm_sdk::driver::{PipelineConfig, UartDriver};
//! use helm_sdk::protocol::Payload;
//! use helm_sdk::serial::TtyLink;
//!
//! let link = TtyLink::open("/dev/serial0", 115200)?;
//! let master = UartMaster::new(UartDriver::new(link, PipelineConfig::default())?);
//!
//! let request = Payload::new("MO", 10.0, 20.0, -10.0, -20.0)?;
//! let response = master.send_receive_payload(request)?;
//! println!("{response}");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub use helm_client as client;
pub use helm_driver as driver;
pub use helm_protocol as protocol;
pub use helm_serial as serial;
