//! # Helm CLI
//!
//! 串口主/从会话命令行工具。
//!
//! ```bash
//! # 主端：每 250ms 发送一条计数器驱动的运动命令
//! helm-cli master --port /dev/serial0
//!
//! # 从端：应答每个收到的载荷
//! helm-cli slave --port /dev/ttyUSB0
//! ```
//!
//! 日志级别通过 `RUST_LOG` 控制（默认 `info`），Ctrl-C 干净停机。

use anyhow::Result;
use clap::{Parser, Subcommand};
use helm_sdk::client::{UartMaster, UartSlave};
use helm_sdk::driver::{PipelineConfig, UartDriver};
use helm_sdk::serial::TtyLink;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Helm UART 会话工具
#[derive(Parser, Debug)]
#[command(name = "helm-cli")]
#[command(about = "Master/slave sessions over the Helm UART drive protocol", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 主端循环：发送运动命令并等待应答
    Master {
        /// 串口设备路径
        #[arg(long, default_value = "/dev/serial0")]
        port: String,

        /// 波特率
        #[arg(long, default_value_t = 115200)]
        baud: u32,

        /// 发送条数（0 = 不限）
        #[arg(long, default_value_t = 0)]
        count: u64,

        /// 发送间隔（毫秒）
        #[arg(long, default_value_t = 250)]
        interval_ms: u64,
    },

    /// 从端循环：应答每个收到的载荷
    Slave {
        /// 串口设备路径
        #[arg(long, default_value = "/dev/serial0")]
        port: String,

        /// 波特率
        #[arg(long, default_value_t = 115200)]
        baud: u32,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = running.clone();
        ctrlc::set_handler(move || {
            info!("ctrl-c caught, stopping");
            running.store(false, Ordering::Relaxed);
        })?;
    }

    match cli.command {
        Commands::Master {
            port,
            baud,
            count,
            interval_ms,
        } => run_master(&port, baud, count, interval_ms, &running),
        Commands::Slave { port, baud } => run_slave(&port, baud, &running),
    }
}

fn run_master(
    port: &str,
    baud: u32,
    count: u64,
    interval_ms: u64,
    running: &Arc<AtomicBool>,
) -> Result<()> {
    let link = TtyLink::open(port, baud)?;
    let master = UartMaster::new(UartDriver::new(link, PipelineConfig::default())?);
    info!("UART master ready on {} at {} baud", port, baud);

    // 计数器数据源，与手动速度测试相同
    let mut sent = 0u64;
    master.run(running, Duration::from_millis(interval_ms), move || {
        if count > 0 && sent >= count {
            return None;
        }
        sent += 1;
        Some(sent as f32)
    })?;

    master.close();
    Ok(())
}

fn run_slave(port: &str, baud: u32, running: &Arc<AtomicBool>) -> Result<()> {
    let link = TtyLink::open(port, baud)?;
    let config = PipelineConfig {
        rx_timeout_ms: 250,
        ..PipelineConfig::default()
    };
    let slave = UartSlave::new(UartDriver::new(link, config)?);
    info!("UART slave ready on {} at {} baud", port, baud);

    slave.serve(running, |payload| {
        info!("rx: {}", payload);
    })?;

    slave.close();
    Ok(())
}
