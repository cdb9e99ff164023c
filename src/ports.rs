//! # 外部能力端口
//!
//! 编解码核心只通过这三个 trait 访问压缩、图像和加密能力。
//! 具体实现位于 [`crate::adapters`]，测试中可以替换为确定性的模拟实现。

use crate::error::Result;
use crate::matryoshka::SealedPayload;

/// RGBA 像素缓冲区 (每像素 4 字节) 及其尺寸。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CarrierImage {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

impl CarrierImage {
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }
}

impl AsRef<[u8]> for CarrierImage {
    fn as_ref(&self) -> &[u8] {
        &self.pixels
    }
}

/// [`ImageAdapter::downscale_to_limit`] 的结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundedImage {
    pub image: CarrierImage,
    /// 是否因超过像素上限而被缩小。
    pub downscaled: bool,
}

/// 无损压缩端口。
pub trait Compressor {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>>;

    /// 输入损坏时返回 `ERR_DECOMPRESS`。
    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>>;
}

/// 图像解码与缩放端口。像素输出中 Alpha 恒为 255。
pub trait ImageAdapter {
    /// 不支持的格式返回 `ERR_UNSUPPORTED_FORMAT`。
    fn load_pixels(&self, file: &[u8]) -> Result<CarrierImage>;

    /// 不保持宽高比，拉伸到恰好 `width x height`。
    fn resize_stretch(&self, file: &[u8], width: u32, height: u32) -> Result<CarrierImage>;

    /// 像素数超过 `max_pixels` 时按比例缩小，否则原样解码。
    fn downscale_to_limit(&self, file: &[u8], max_pixels: u64) -> Result<BoundedImage>;
}

/// AEAD 加密与安全随机数端口。
pub trait CryptoAdapter {
    /// 每次调用都使用新的一次性 key 和 IV。
    fn encrypt(&self, plaintext: &[u8]) -> Result<SealedPayload>;

    /// 认证失败返回 `ERR_CRYPTO`。
    fn decrypt(&self, sealed: &SealedPayload) -> Result<Vec<u8>>;

    /// `len` 个密码学安全的随机字节。
    fn random_bytes(&self, len: usize) -> Vec<u8>;
}

impl<C: Compressor + ?Sized> Compressor for &C {
    fn compress(&self, data: &[u8]) -> Result<Vec<u8>> {
        (**self).compress(data)
    }

    fn decompress(&self, data: &[u8]) -> Result<Vec<u8>> {
        (**self).decompress(data)
    }
}

impl<I: ImageAdapter + ?Sized> ImageAdapter for &I {
    fn load_pixels(&self, file: &[u8]) -> Result<CarrierImage> {
        (**self).load_pixels(file)
    }

    fn resize_stretch(&self, file: &[u8], width: u32, height: u32) -> Result<CarrierImage> {
        (**self).resize_stretch(file, width, height)
    }

    fn downscale_to_limit(&self, file: &[u8], max_pixels: u64) -> Result<BoundedImage> {
        (**self).downscale_to_limit(file, max_pixels)
    }
}

impl<K: CryptoAdapter + ?Sized> CryptoAdapter for &K {
    fn encrypt(&self, plaintext: &[u8]) -> Result<SealedPayload> {
        (**self).encrypt(plaintext)
    }

    fn decrypt(&self, sealed: &SealedPayload) -> Result<Vec<u8>> {
        (**self).decrypt(sealed)
    }

    fn random_bytes(&self, len: usize) -> Vec<u8> {
        (**self).random_bytes(len)
    }
}
