//! CRC-8 完整性校验
//!
//! 多项式 `0x07`（x⁸ + x² + x + 1），初始值 `0x00`，MSB-first，
//! 无输入/输出反射。主路径使用编译期生成的 256 项查找表，
//! 位循环实现保留用于交叉验证（两者必须逐位一致）。

/// CRC-8 生成多项式
pub const CRC8_POLY: u8 = 0x07;

/// CRC-8 初始值
pub const CRC8_INIT: u8 = 0x00;

/// 256 项查找表（编译期生成）
const CRC8_TABLE: [u8; 256] = build_table();

const fn build_table() -> [u8; 256] {
    let mut table = [0u8; 256];
    let mut i = 0usize;
    while i < 256 {
        let mut crc = i as u8;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC8_POLY
            } else {
                crc << 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// 计算 CRC-8（查表法）
///
/// 热路径：每帧解码都会调用一次。
#[inline]
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = CRC8_INIT;
    for &byte in data {
        crc = CRC8_TABLE[(crc ^ byte) as usize];
    }
    crc
}

/// 计算 CRC-8（位循环法）
///
/// 与查表法结果必须逐位一致，保留用于测试交叉验证。
pub fn crc8_bitwise(data: &[u8]) -> u8 {
    let mut crc = CRC8_INIT;
    for &byte in data {
        crc ^= byte;
        for _ in 0..8 {
            crc = if crc & 0x80 != 0 {
                (crc << 1) ^ CRC8_POLY
            } else {
                crc << 1
            };
        }
    }
    crc
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// 标准校验值：CRC-8/ATM 对 "123456789" 的结果为 0xF4
    #[test]
    fn test_crc8_check_value() {
        assert_eq!(crc8(b"123456789"), 0xF4);
        assert_eq!(crc8_bitwise(b"123456789"), 0xF4);
    }

    #[test]
    fn test_crc8_empty_is_init() {
        assert_eq!(crc8(&[]), CRC8_INIT);
        assert_eq!(crc8_bitwise(&[]), CRC8_INIT);
    }

    #[test]
    fn test_crc8_single_zero_byte() {
        // 0x00 经过 8 次移位仍为 0
        assert_eq!(crc8(&[0x00]), 0x00);
    }

    #[test]
    fn test_table_matches_bitwise_all_single_bytes() {
        for byte in 0u8..=255 {
            assert_eq!(
                crc8(&[byte]),
                crc8_bitwise(&[byte]),
                "mismatch for byte 0x{byte:02X}"
            );
        }
    }

    proptest! {
        /// 查表法与位循环法对任意 0-64 字节序列逐位一致
        #[test]
        fn prop_table_matches_bitwise(data in proptest::collection::vec(any::<u8>(), 0..=64)) {
            prop_assert_eq!(crc8(&data), crc8_bitwise(&data));
        }
    }
}
