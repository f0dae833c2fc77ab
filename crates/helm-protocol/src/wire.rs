//! 线上帧格式
//!
//! 一帧固定 21 字节，全部小端：
//!
//! ```text
//! offset 0..2   同步标记（固定 2 字节常量）
//! offset 2..4   命令码（2 个大写 ASCII 字母）
//! offset 4..20  四个 IEEE-754 单精度浮点：pfwd, sfwd, paft, saft
//! offset 20     CRC-8 校验字节（覆盖 2..20，不含同步标记）
//! ```
//!
//! 帧长在链路整个生命周期内固定，没有版本字段；
//! 协议变更需要两端离线协商。

use crate::ProtocolError;
use crate::crc8::crc8;
use crate::payload::Payload;

/// 同步标记：`b"zz"`，取可打印字符便于串口调试。
///
/// 链路级固定常量，不支持按帧配置。
pub const SYNC_MARKER: [u8; 2] = [0x7A, 0x7A];

/// 同步标记长度
pub const MARKER_SIZE: usize = 2;

/// 命令码长度
pub const CMD_SIZE: usize = 2;

/// 载荷长度（命令码 + 4 × f32，不含标记与 CRC）
pub const PAYLOAD_SIZE: usize = CMD_SIZE + 4 * 4;

/// CRC 校验字节长度
pub const CRC_SIZE: usize = 1;

/// 完整帧长（标记 + 载荷 + CRC = 21 字节）
pub const FRAME_SIZE: usize = MARKER_SIZE + PAYLOAD_SIZE + CRC_SIZE;

impl Payload {
    /// 编码为完整线上帧
    ///
    /// 对构造合法的载荷永不失败：先序列化命令码与四个浮点，
    /// 再对载荷区计算 CRC，最后冠以同步标记。
    pub fn to_frame(&self) -> [u8; FRAME_SIZE] {
        let mut frame = [0u8; FRAME_SIZE];
        frame[..MARKER_SIZE].copy_from_slice(&SYNC_MARKER);
        frame[2..4].copy_from_slice(&self.cmd_bytes());
        frame[4..8].copy_from_slice(&self.pfwd.to_le_bytes());
        frame[8..12].copy_from_slice(&self.sfwd.to_le_bytes());
        frame[12..16].copy_from_slice(&self.paft.to_le_bytes());
        frame[16..20].copy_from_slice(&self.saft.to_le_bytes());
        frame[FRAME_SIZE - 1] = crc8(&frame[MARKER_SIZE..MARKER_SIZE + PAYLOAD_SIZE]);
        frame
    }

    /// 从完整线上帧解码
    ///
    /// # 错误
    ///
    /// - [`ProtocolError::SizeMismatch`]: 输入不是恰好 [`FRAME_SIZE`] 字节
    /// - [`ProtocolError::BadMarker`]: 帧头不是 [`SYNC_MARKER`]
    /// - [`ProtocolError::IntegrityMismatch`]: CRC 校验失败
    /// - [`ProtocolError::InvalidCommand`]: CRC 通过但命令码不是 2 个字母
    ///   （对端实现缺陷，同样按解码失败处理）
    pub fn from_frame(frame: &[u8]) -> Result<Self, ProtocolError> {
        if frame.len() != FRAME_SIZE {
            return Err(ProtocolError::SizeMismatch {
                expected: FRAME_SIZE,
                actual: frame.len(),
            });
        }
        if frame[..MARKER_SIZE] != SYNC_MARKER {
            return Err(ProtocolError::BadMarker);
        }

        let body = &frame[MARKER_SIZE..MARKER_SIZE + PAYLOAD_SIZE];
        let expected = crc8(body);
        let actual = frame[FRAME_SIZE - 1];
        if expected != actual {
            return Err(ProtocolError::IntegrityMismatch { expected, actual });
        }

        let cmd = [body[0], body[1]];
        if !cmd.iter().all(|b| b.is_ascii_alphabetic()) {
            return Err(ProtocolError::InvalidCommand(
                String::from_utf8_lossy(&cmd).into_owned(),
            ));
        }
        let cmd = [cmd[0].to_ascii_uppercase(), cmd[1].to_ascii_uppercase()];

        // 不变式成立（2 个 ASCII 字母，已大写），可以直接构造
        Ok(Payload::from_parts(
            cmd,
            f32::from_le_bytes(body[2..6].try_into().expect("fixed slice")),
            f32::from_le_bytes(body[6..10].try_into().expect("fixed slice")),
            f32::from_le_bytes(body[10..14].try_into().expect("fixed slice")),
            f32::from_le_bytes(body[14..18].try_into().expect("fixed slice")),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn motion() -> Payload {
        Payload::new("MO", 10.0, 20.0, -10.0, -20.0).unwrap()
    }

    /// 具体场景：MO (10.0, 20.0, -10.0, -20.0) 编码为 21 字节帧
    #[test]
    fn test_concrete_motion_frame() {
        let frame = motion().to_frame();
        assert_eq!(frame.len(), FRAME_SIZE);
        assert_eq!(&frame[..2], &SYNC_MARKER);
        assert_eq!(&frame[2..4], b"MO");
        assert_eq!(&frame[4..8], &10.0f32.to_le_bytes());
        assert_eq!(&frame[8..12], &20.0f32.to_le_bytes());
        assert_eq!(&frame[12..16], &(-10.0f32).to_le_bytes());
        assert_eq!(&frame[16..20], &(-20.0f32).to_le_bytes());
        assert_eq!(frame[20], crc8(&frame[2..20]));

        let decoded = Payload::from_frame(&frame).unwrap();
        assert_eq!(decoded.cmd(), "MO");
        assert_eq!(
            (decoded.pfwd, decoded.sfwd, decoded.paft, decoded.saft),
            (10.0, 20.0, -10.0, -20.0)
        );
    }

    #[test]
    fn test_size_mismatch() {
        let frame = motion().to_frame();
        assert!(matches!(
            Payload::from_frame(&frame[..FRAME_SIZE - 1]),
            Err(ProtocolError::SizeMismatch {
                expected: FRAME_SIZE,
                actual: 20
            })
        ));
        assert!(matches!(
            Payload::from_frame(&[]),
            Err(ProtocolError::SizeMismatch { .. })
        ));
    }

    #[test]
    fn test_bad_marker() {
        let mut frame = motion().to_frame();
        frame[0] = 0xAA;
        assert!(matches!(
            Payload::from_frame(&frame),
            Err(ProtocolError::BadMarker)
        ));
    }

    #[test]
    fn test_crc_valid_but_nonalpha_command_rejected() {
        // 构造一个 CRC 正确但命令码非字母的帧
        let mut frame = motion().to_frame();
        frame[2] = b'1';
        frame[FRAME_SIZE - 1] = crc8(&frame[2..20]);
        assert!(matches!(
            Payload::from_frame(&frame),
            Err(ProtocolError::InvalidCommand(_))
        ));
    }

    /// 单比特翻转（载荷区或校验字节）必定被检出
    #[test]
    fn test_single_bit_flips_detected() {
        let frame = motion().to_frame();
        for byte in MARKER_SIZE..FRAME_SIZE {
            for bit in 0..8 {
                let mut corrupted = frame;
                corrupted[byte] ^= 1 << bit;
                assert!(
                    matches!(
                        Payload::from_frame(&corrupted),
                        Err(ProtocolError::IntegrityMismatch { .. })
                    ),
                    "flip at byte {byte} bit {bit} was not detected"
                );
            }
        }
    }

    /// 双比特翻转的检出特性（在 CRC 层面穷举验证）
    ///
    /// 码字为载荷区 + 校验字节共 152 位。生成多项式含 (x+1) 因子，
    /// 全部奇数重量错误必检出；其 7 次本原因子阶为 127，因此仅当
    /// 两处翻转恰好相距 127 位时构成碰撞，其余组合必检出。
    #[test]
    fn test_double_bit_flips_collide_only_at_distance_127() {
        let frame = motion().to_frame();
        let codeword = &frame[MARKER_SIZE..FRAME_SIZE]; // 19 字节 = 152 位
        let total_bits = codeword.len() * 8;

        let mut collisions = 0usize;
        for i in 0..total_bits {
            for j in (i + 1)..total_bits {
                let mut corrupted = [0u8; FRAME_SIZE - MARKER_SIZE];
                corrupted.copy_from_slice(codeword);
                corrupted[i / 8] ^= 1 << (7 - (i % 8));
                corrupted[j / 8] ^= 1 << (7 - (j % 8));

                let detected =
                    crc8(&corrupted[..PAYLOAD_SIZE]) != corrupted[PAYLOAD_SIZE];
                if j - i == 127 {
                    assert!(!detected, "expected collision at bits ({i}, {j})");
                    collisions += 1;
                } else {
                    assert!(detected, "undetected flip pair at bits ({i}, {j})");
                }
            }
        }
        assert_eq!(collisions, total_bits - 127);
    }

    proptest! {
        /// 编解码往返：浮点逐位一致，命令码一致
        #[test]
        fn prop_roundtrip(
            c0 in b'a'..=b'z',
            c1 in b'A'..=b'Z',
            pfwd in any::<f32>(),
            sfwd in any::<f32>(),
            paft in any::<f32>(),
            saft in any::<f32>(),
        ) {
            let cmd = String::from_utf8(vec![c0, c1]).unwrap();
            let payload = Payload::new(&cmd, pfwd, sfwd, paft, saft).unwrap();
            let decoded = Payload::from_frame(&payload.to_frame()).unwrap();
            prop_assert_eq!(decoded.cmd(), cmd.to_ascii_uppercase());
            // NaN 不满足 ==，按位比较
            prop_assert_eq!(decoded.pfwd.to_bits(), pfwd.to_bits());
            prop_assert_eq!(decoded.sfwd.to_bits(), sfwd.to_bits());
            prop_assert_eq!(decoded.paft.to_bits(), paft.to_bits());
            prop_assert_eq!(decoded.saft.to_bits(), saft.to_bits());
        }
    }
}
