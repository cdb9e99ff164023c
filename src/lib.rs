//! # treasure_map 库
//!
//! 本库包含 "藏宝图" 双图隐写工具的核心逻辑：
//! 文件经过压缩、AES-256-GCM 加密和奇偶条带拆分后，
//! 以三层套娃帧的形式写入 Cat 与 Dog 两张图像的 RGB 低位。
//! 任何一张图像单独都不泄露信息，两张一起才能逐字节恢复原始文件及其文件名。

// 声明库包含的所有模块。

pub mod adapters;
pub mod capacity;
pub mod cli;
pub mod codec;
pub mod constants;
pub mod error;
pub mod handler;
pub mod matryoshka;
pub mod ports;
pub mod resolutions;
pub mod steganography;
pub mod striping;

pub use codec::{CarrierPlan, DecodeOutput, DefaultCodec, EncodeOutput, EncodeRequest, MatryoshkaCodec};
pub use error::CodecError;
