//! # 端口的具体实现
//!
//! * [`ZlibCompressor`]：基于 `flate2` 的 zlib 压缩。
//! * [`RasterImageAdapter`]：基于 `image` 的解码、缩放与 PNG 输出。
//! * [`AesGcmCrypto`]：基于 `aes-gcm` 的 AES-256-GCM 与 `rand` 安全随机数。

mod compressor;
mod crypto;
mod raster;

pub use compressor::ZlibCompressor;
pub use crypto::AesGcmCrypto;
pub use raster::RasterImageAdapter;
