//! # LSB 隐写引擎
//!
//! 在 RGBA 像素缓冲区的 R、G、B 通道低位中写入或读取比特流。
//! 比特按字节内 MSB 优先的顺序消费，Alpha 通道永远不被触碰。

use crate::constants::{BYTES_PER_PIXEL, CHANNELS, N_LSB};
use crate::error::{CodecError, Result};

/// 每个通道参与隐写的低位数，只能通过 [`LsbDepth::new`] 构造，取值恒在 `1..=8` 之内。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LsbDepth(u32);

impl LsbDepth {
    /// Cat 与 Dog 载体使用的深度 ([`N_LSB`])。
    pub const CARRIER: Self = match Self::new(N_LSB) {
        Some(depth) => depth,
        None => panic!("N_LSB must be within 1..=8"),
    };

    /// `bits` 不在 `1..=8` 范围内时返回 `None`。
    pub const fn new(bits: u32) -> Option<Self> {
        if matches!(bits, 1..=8) {
            Some(Self(bits))
        } else {
            None
        }
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

/// `pixels` 在每通道 `depth` 位下能承载的比特数。
pub fn capacity_bits(pixels: &[u8], depth: LsbDepth) -> usize {
    (pixels.len() / BYTES_PER_PIXEL) * CHANNELS as usize * depth.get() as usize
}

/// 将 `payload` 嵌入 `carrier` 的低 `depth` 位，返回新的像素缓冲区。
///
/// 载荷耗尽时，最后一个只写了一部分的通道其余低位置零，
/// 之后的通道和像素保持原样。
///
/// # Errors
///
/// 载荷比特数超过载体容量时返回 [`CodecError::PayloadTooLarge`]。
pub fn lsb_interleave(carrier: &[u8], payload: &[u8], depth: LsbDepth) -> Result<Vec<u8>> {
    let n_lsb = depth.get();
    let total_bits = payload.len() * 8;
    let available = capacity_bits(carrier, depth);
    if total_bits > available {
        return Err(CodecError::PayloadTooLarge(format!(
            "The steganographic payload extends beyond the carrier capacity. Required: {total_bits} bits, Available: {available} bits."
        )));
    }

    let mut out = carrier.to_vec();
    let mask = ((0xFF_u32 >> n_lsb) << n_lsb) as u8;
    let mut bit_index = 0;

    'embed: for pixel in out.chunks_exact_mut(BYTES_PER_PIXEL) {
        for channel in pixel.iter_mut().take(CHANNELS as usize) {
            if bit_index >= total_bits {
                break 'embed;
            }

            let mut value = 0u8;
            for shift in (0..n_lsb).rev() {
                if bit_index >= total_bits {
                    break;
                }
                let bit = (payload[bit_index / 8] >> (7 - bit_index % 8)) & 1;
                value |= bit << shift;
                bit_index += 1;
            }

            *channel = (*channel & mask) | value;
        }
    }

    Ok(out)
}

/// 从 `stego` 的低 `depth` 位中读取 `num_bits` 个比特，返回 `ceil(num_bits / 8)` 字节。
///
/// 最后一个字节中超出 `num_bits` 的位保持为零；
/// 请求超过载体容量时，多出的部分同样为零。
pub fn lsb_deinterleave(stego: &[u8], num_bits: usize, depth: LsbDepth) -> Vec<u8> {
    let n_lsb = depth.get();
    let mut out = vec![0u8; num_bits.div_ceil(8)];
    let mut bit_index = 0;

    'extract: for pixel in stego.chunks_exact(BYTES_PER_PIXEL) {
        for &channel in pixel.iter().take(CHANNELS as usize) {
            for shift in (0..n_lsb).rev() {
                if bit_index >= num_bits {
                    break 'extract;
                }
                let bit = (channel >> shift) & 1;
                out[bit_index / 8] |= bit << (7 - bit_index % 8);
                bit_index += 1;
            }
        }
    }

    out
}
