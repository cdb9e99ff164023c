//! # 编解码流程编排
//!
//! [`MatryoshkaCodec`] 通过构造函数注入三个端口，把容量计算、三层封装、
//! 条带拆分和 LSB 隐写组合成完整的编码与解码流程。
//!
//! 编码：明文 → 压缩 → 第三层 → 加密 → 第二层 → 条带拆分 → 第一层 → LSB 嵌入。
//! 解码按相反顺序执行。每一步失败都会立即返回，不做任何重试。

use tracing::{debug, info};

use crate::adapters::{AesGcmCrypto, RasterImageAdapter, ZlibCompressor};
use crate::capacity::{
    Resolution, find_minimum_entry, required_bytes_per_carrier, select_resolution,
};
use crate::constants::{AES_OVERHEAD_BYTES, CARRIER_ID_TOTAL_BYTES, MAX_FILENAME_BYTES};
use crate::error::{CodecError, Result};
use crate::matryoshka::{
    pack_layer1, pack_layer2, pack_layer3, unpack_layer1_data, unpack_layer1_id, unpack_layer2,
    unpack_layer3,
};
use crate::ports::{CarrierImage, Compressor, CryptoAdapter, ImageAdapter};
use crate::resolutions::ResolutionEntry;
use crate::steganography::{LsbDepth, capacity_bits, lsb_deinterleave, lsb_interleave};
use crate::striping::{stripe, weave};

/// 一次编码所需的输入。
#[derive(Debug, Clone, Copy)]
pub struct EncodeRequest<'a> {
    /// 待隐藏的文件内容，不能为空。
    pub treasure: &'a [u8],
    pub file_name: &'a str,
    /// Cat 图像的原始文件字节。
    pub cat: &'a [u8],
    /// Dog 图像的原始文件字节。
    pub dog: &'a [u8],
    /// Cat 图像的原始宽度，决定宽高比类别和方向。
    pub cat_width: u32,
    pub cat_height: u32,
}

/// 编码结果：两张尺寸相同的隐写像素缓冲区。
#[derive(Debug, Clone)]
pub struct EncodeOutput {
    pub cat: CarrierImage,
    pub dog: CarrierImage,
    pub resolution: Resolution,
    /// 压缩后的载荷大小，仅供展示。
    pub compressed_size: usize,
}

/// 解码结果，与对应编码的输入逐字节一致。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeOutput {
    pub file_name: String,
    pub treasure: Vec<u8>,
}

/// [`MatryoshkaCodec::plan`] 的估算结果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CarrierPlan {
    pub compressed_size: usize,
    pub bytes_per_carrier: u64,
    pub entry: Option<&'static ResolutionEntry>,
}

/// 套娃隐写编解码器。
#[derive(Debug, Clone)]
pub struct MatryoshkaCodec<C, I, K> {
    compressor: C,
    images: I,
    crypto: K,
}

/// 使用 zlib、`image` 与 AES-256-GCM 的默认编解码器。
pub type DefaultCodec = MatryoshkaCodec<ZlibCompressor, RasterImageAdapter, AesGcmCrypto>;

impl Default for DefaultCodec {
    fn default() -> Self {
        Self::new(
            ZlibCompressor::default(),
            RasterImageAdapter::default(),
            AesGcmCrypto,
        )
    }
}

impl DefaultCodec {
    /// 使用指定 zlib 压缩级别 (0..=9) 的默认编解码器，超出范围时回退到默认级别。
    pub fn with_level(level: u32) -> Self {
        Self::new(
            ZlibCompressor::new(level),
            RasterImageAdapter::default(),
            AesGcmCrypto,
        )
    }
}

impl<C, I, K> MatryoshkaCodec<C, I, K>
where
    C: Compressor,
    I: ImageAdapter,
    K: CryptoAdapter,
{
    pub fn new(compressor: C, images: I, crypto: K) -> Self {
        Self {
            compressor,
            images,
            crypto,
        }
    }

    pub fn images(&self) -> &I {
        &self.images
    }

    /// 将文件隐藏到两张载体图像中。
    ///
    /// # Errors
    ///
    /// * `ERR_EMPTY_PAYLOAD`：文件为空。
    /// * `ERR_FILENAME_TOO_LONG`：文件名超过 255 字节。
    /// * `ERR_PAYLOAD_TOO_LARGE`：没有标准分辨率能容纳载荷。
    /// * 端口返回的任何错误原样透传。
    pub fn encode(&self, request: &EncodeRequest<'_>) -> Result<EncodeOutput> {
        if request.treasure.is_empty() {
            return Err(CodecError::EmptyPayload);
        }

        let name_len = request.file_name.len();
        if name_len > MAX_FILENAME_BYTES {
            return Err(CodecError::FileNameTooLong(name_len));
        }

        let compressed = self.compressor.compress(request.treasure)?;
        debug!(
            original = request.treasure.len(),
            compressed = compressed.len(),
            "payload compressed"
        );

        let resolution = select_resolution(
            compressed.len(),
            name_len,
            request.cat_width,
            request.cat_height,
        )?;
        info!(
            label = resolution.label,
            width = resolution.width,
            height = resolution.height,
            capacity = resolution.capacity_per_carrier,
            "selected carrier resolution"
        );

        let cat = self
            .images
            .resize_stretch(request.cat, resolution.width, resolution.height)?;
        let dog = self
            .images
            .resize_stretch(request.dog, resolution.width, resolution.height)?;

        // 加上下层的 60 + 2 字节开销后恰好填满两张载体
        let layer3_capacity = (2 * resolution.capacity_per_carrier
            - AES_OVERHEAD_BYTES
            - CARRIER_ID_TOTAL_BYTES) as usize;
        let plaintext = pack_layer3(&compressed, request.file_name, layer3_capacity)?;

        let sealed = self.crypto.encrypt(&plaintext)?;
        let stream = pack_layer2(&sealed);
        let (even, odd) = stripe(&stream);

        let cat_frame = pack_layer1(&even, true, |n| self.crypto.random_bytes(n));
        let dog_frame = pack_layer1(&odd, false, |n| self.crypto.random_bytes(n));
        debug!(
            layer3 = plaintext.len(),
            layer2 = stream.len(),
            cat_frame = cat_frame.len(),
            dog_frame = dog_frame.len(),
            "frames packed"
        );

        let cat = CarrierImage {
            pixels: lsb_interleave(&cat.pixels, &cat_frame, LsbDepth::CARRIER)?,
            ..cat
        };
        let dog = CarrierImage {
            pixels: lsb_interleave(&dog.pixels, &dog_frame, LsbDepth::CARRIER)?,
            ..dog
        };

        Ok(EncodeOutput {
            cat,
            dog,
            resolution,
            compressed_size: compressed.len(),
        })
    }

    /// 估算隐藏 `treasure` 所需的最小载体，不区分宽高比类别。
    ///
    /// 仅作提示：找不到合适分辨率时 `entry` 为 `None`，而不是报错。
    pub fn plan(&self, treasure: &[u8], file_name: &str) -> Result<CarrierPlan> {
        if treasure.is_empty() {
            return Err(CodecError::EmptyPayload);
        }
        if file_name.len() > MAX_FILENAME_BYTES {
            return Err(CodecError::FileNameTooLong(file_name.len()));
        }

        let compressed_size = self.compressor.compress(treasure)?.len();
        let bytes_per_carrier = required_bytes_per_carrier(compressed_size, file_name.len());

        Ok(CarrierPlan {
            compressed_size,
            bytes_per_carrier,
            entry: find_minimum_entry(bytes_per_carrier),
        })
    }

    /// 从两张隐写图像中恢复文件。两张图像的顺序无关紧要。
    ///
    /// # Errors
    ///
    /// * `ERR_HEADER_MISMATCH`：Carrier ID 奇偶相同，或两张图像尺寸不同。
    /// * `ERR_CRYPTO`：认证失败。
    /// * `ERR_DECOMPRESS`：提取出的载荷无法解压。
    /// * 图像端口的 `ERR_UNSUPPORTED_FORMAT` 原样透传。
    pub fn decode(&self, first: &[u8], second: &[u8]) -> Result<DecodeOutput> {
        let first = self.images.load_pixels(first)?;
        let second = self.images.load_pixels(second)?;

        let (cat, dog) = unpack_layer1_id(first, second, lsb_deinterleave)?;
        if cat.pixel_count() != dog.pixel_count() {
            return Err(CodecError::HeaderMismatch(format!(
                "Invalid pairing. Carriers must have identical dimensions (got {}x{} and {}x{}).",
                cat.width, cat.height, dog.width, dog.height
            )));
        }
        debug!(width = cat.width, height = cat.height, "identified cat and dog carriers");

        // 长度字段在解密之前不可信，始终提取整张载体的容量
        let total_bits = capacity_bits(&cat.pixels, LsbDepth::CARRIER);
        let cat_bytes = lsb_deinterleave(&cat.pixels, total_bits, LsbDepth::CARRIER);
        let dog_bytes = lsb_deinterleave(&dog.pixels, total_bits, LsbDepth::CARRIER);

        let stream = weave(unpack_layer1_data(&cat_bytes), unpack_layer1_data(&dog_bytes));
        let sealed = unpack_layer2(&stream)?;
        let plaintext = self.crypto.decrypt(&sealed)?;

        let frame = unpack_layer3(&plaintext)?;
        let treasure = self.compressor.decompress(&frame.compressed)?;
        debug!(
            compressed = frame.compressed.len(),
            recovered = treasure.len(),
            "payload recovered"
        );

        Ok(DecodeOutput {
            file_name: frame.file_name,
            treasure,
        })
    }
}
