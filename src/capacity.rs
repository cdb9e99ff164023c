//! # 容量计算与分辨率选择
//!
//! 在任何加密工作开始之前，根据压缩后的载荷大小和 Cat 图像的宽高比，
//! 从标准分辨率表中挑选一个足以容纳全部三层数据的输出分辨率。

use crate::constants::{
    AES_OVERHEAD_BYTES, CARRIER_ID_TOTAL_BYTES, CHANNELS, HEADER_BYTES, MAX_CARRIER_PIXELS, N_LSB,
};
use crate::error::{CodecError, Result};
use crate::resolutions::{AspectCategory, ResolutionEntry, STANDARD_RESOLUTIONS};

/// 选中的目标分辨率。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// 目标宽度 (竖向 Cat 时已交换)。
    pub width: u32,
    /// 目标高度 (竖向 Cat 时已交换)。
    pub height: u32,
    /// 单张载体可嵌入的字节数。
    pub capacity_per_carrier: u64,
    pub label: &'static str,
}

/// 返回 `height x width` 载体可嵌入的字节数：`floor(h * w * 3 * 3 / 8)`。
pub fn available_bytes(height: u32, width: u32) -> u64 {
    u64::from(height) * u64::from(width) * CHANNELS * u64::from(N_LSB) / 8
}

/// 三层封装后、两张载体合计需要的最少字节数。
pub fn required_total_bytes(compressed_len: usize, file_name_len: usize) -> u64 {
    (HEADER_BYTES + file_name_len + compressed_len) as u64
        + AES_OVERHEAD_BYTES
        + CARRIER_ID_TOTAL_BYTES
}

/// 单张载体至少需要承载的字节数。
pub fn required_bytes_per_carrier(compressed_len: usize, file_name_len: usize) -> u64 {
    required_total_bytes(compressed_len, file_name_len).div_ceil(2)
}

fn entry_capacity(entry: &ResolutionEntry) -> u64 {
    available_bytes(entry.height, entry.width)
}

/// 根据 Cat 图像的宽高比类别选择最小的合格标准分辨率。
///
/// Cat 图像原始尺寸只用于确定类别和方向；结果只取决于类别和所需容量。
///
/// # Errors
///
/// 同类别中没有分辨率能容纳所需数据，或选中项超过像素上限时，
/// 返回 [`CodecError::PayloadTooLarge`]。
pub fn select_resolution(
    compressed_len: usize,
    file_name_len: usize,
    cat_width: u32,
    cat_height: u32,
) -> Result<Resolution> {
    let bytes_per_carrier = required_bytes_per_carrier(compressed_len, file_name_len);
    let portrait = cat_width < cat_height;
    let category = AspectCategory::classify(cat_width, cat_height);

    let too_large = || {
        let actual_mb = compressed_len as f64 / (1024.0 * 1024.0);
        CodecError::PayloadTooLarge(format!(
            "Compressed payload is {actual_mb:.1} MB but no {category} resolution can hold it (maximum supported size is approximately 36 MB). Reduce payload size."
        ))
    };

    let entry = STANDARD_RESOLUTIONS
        .iter()
        .filter(|e| e.category() == category)
        .filter(|e| entry_capacity(e) >= bytes_per_carrier)
        .min_by_key(|e| e.pixel_count())
        .ok_or_else(too_large)?;

    if entry.pixel_count() > MAX_CARRIER_PIXELS {
        return Err(too_large());
    }

    let (width, height) = if portrait {
        (entry.height, entry.width)
    } else {
        (entry.width, entry.height)
    };

    Ok(Resolution {
        width,
        height,
        capacity_per_carrier: entry_capacity(entry),
        label: entry.label,
    })
}

/// 不区分类别，返回能容纳 `bytes_per_carrier` 的像素数最少的分辨率。
///
/// 仅供提示使用，从不报错。
pub fn find_minimum_entry(bytes_per_carrier: u64) -> Option<&'static ResolutionEntry> {
    STANDARD_RESOLUTIONS
        .iter()
        .filter(|e| entry_capacity(e) >= bytes_per_carrier)
        .min_by_key(|e| e.pixel_count())
}
