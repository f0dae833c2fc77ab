//! 应用层载荷记录
//!
//! `Payload` 是协议的应用层单元：一个 2 字母命令码加四个驱动轮浮点值
//! （左前 `pfwd`、右前 `sfwd`、左后 `paft`、右后 `saft`）。
//! 构造后不可变，按值在各层之间移动。

use crate::ProtocolError;
use std::fmt;

/// 运动命令码（携带 4 个驱动轮目标值）
pub const CMD_MOTION: &str = "MO";

/// 应答命令码（全零载荷）
pub const CMD_ACK: &str = "AK";

/// 本地错误哨兵命令码（从不上线）
pub const CMD_ERROR: &str = "ER";

/// 协议应用层记录
///
/// # 不变式
///
/// 命令码恰好为 2 个 ASCII 字母，存储时统一转为大写。
/// 任何一个 `Payload` 实例都满足该不变式：唯一的构造入口
/// [`Payload::new`] 会拒绝非法命令码。
///
/// # 示例
///
/// ```rust
/// use helm_protocol::Payload;
///
/// let payload = Payload::new("mo", 10.0, 20.0, -10.0, -20.0).unwrap();
/// assert_eq!(payload.cmd(), "MO");
/// assert!(Payload::new("m1", 0.0, 0.0, 0.0, 0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Payload {
    /// 命令码（2 个大写 ASCII 字母）
    cmd: [u8; 2],
    /// 左前轮（port forward）
    pub pfwd: f32,
    /// 右前轮（starboard forward）
    pub sfwd: f32,
    /// 左后轮（port aft）
    pub paft: f32,
    /// 右后轮（starboard aft）
    pub saft: f32,
}

impl Payload {
    /// 创建新的载荷
    ///
    /// # 错误
    ///
    /// 命令码不是恰好 2 个 ASCII 字母时返回
    /// [`ProtocolError::InvalidCommand`]。大小写会被归一化为大写，
    /// 除此之外不做任何静默修正。
    pub fn new(
        cmd: &str,
        pfwd: f32,
        sfwd: f32,
        paft: f32,
        saft: f32,
    ) -> Result<Self, ProtocolError> {
        let bytes = cmd.as_bytes();
        if bytes.len() != 2 || !bytes.iter().all(|b| b.is_ascii_alphabetic()) {
            return Err(ProtocolError::InvalidCommand(cmd.to_string()));
        }
        Ok(Self {
            cmd: [
                bytes[0].to_ascii_uppercase(),
                bytes[1].to_ascii_uppercase(),
            ],
            pfwd,
            sfwd,
            paft,
            saft,
        })
    }

    /// 应答载荷：命令码 `"AK"`，四个字段全为 `0.0`
    ///
    /// 从端每成功收到一个载荷就回发恰好一个应答。
    pub fn ack() -> Self {
        Self {
            cmd: [b'A', b'K'],
            pfwd: 0.0,
            sfwd: 0.0,
            paft: 0.0,
            saft: 0.0,
        }
    }

    /// 本地错误哨兵：命令码 `"ER"`，四个字段全为 `-1.0`
    ///
    /// 主端在一次交换未收到有效响应时用它替代返回值，从不上线发送。
    pub fn error_sentinel() -> Self {
        Self {
            cmd: [b'E', b'R'],
            pfwd: -1.0,
            sfwd: -1.0,
            paft: -1.0,
            saft: -1.0,
        }
    }

    /// 命令码（2 个大写 ASCII 字母）
    #[inline]
    pub fn cmd(&self) -> &str {
        // 不变式保证 cmd 恒为合法 ASCII
        std::str::from_utf8(&self.cmd).unwrap_or("??")
    }

    /// 命令码原始字节
    #[inline]
    pub(crate) fn cmd_bytes(&self) -> [u8; 2] {
        self.cmd
    }

    /// 由已校验的命令码字节直接构造（解码路径内部使用）
    pub(crate) fn from_parts(cmd: [u8; 2], pfwd: f32, sfwd: f32, paft: f32, saft: f32) -> Self {
        Self {
            cmd,
            pfwd,
            sfwd,
            paft,
            saft,
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Payload(cmd={}, pfwd={:.2}, sfwd={:.2}, paft={:.2}, saft={:.2})",
            self.cmd(),
            self.pfwd,
            self.sfwd,
            self.paft,
            self.saft
        )
    }
}
