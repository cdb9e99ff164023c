//! # 错误类型模块
//!
//! 编解码流水线中所有可能出现的失败都归入 [`CodecError`]。
//! 每个变体携带一条面向用户的说明，并通过 [`CodecError::code`] 暴露稳定的错误代码。

use thiserror::Error;

/// 编解码核心及其端口返回的封闭错误集合。
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// 待隐藏的文件长度为零。
    #[error("Treasure Map file is empty. Please select a file with content.")]
    EmptyPayload,

    /// 文件名的 UTF-8 编码超过 255 字节。
    #[error("Filename is too long ({0} bytes). Maximum is 255 UTF-8 bytes.")]
    FileNameTooLong(usize),

    /// 没有任何标准分辨率能够容纳所需数据。
    #[error("{0}")]
    PayloadTooLarge(String),

    /// 两张图像不是同一次编码会话产生的 Cat/Dog 对。
    #[error("{0}")]
    HeaderMismatch(String),

    /// AES-GCM 认证失败。
    #[error("{0}")]
    Crypto(String),

    /// 压缩端口无法生成输出。内存中的 zlib 编码几乎不会失败，
    /// 但端口以 `Result` 返回而不是 `unwrap`，其他压缩实现的失败也归入此类。
    #[error("{0}")]
    Compress(String),

    /// 解压端口拒绝了提取出的数据。
    #[error("{0}")]
    Decompress(String),

    /// 图像端口无法识别的图像格式，原样透传。
    #[error("{0}")]
    UnsupportedFormat(String),
}

impl CodecError {
    /// 返回稳定的错误代码，例如 `ERR_HEADER_MISMATCH`。
    pub fn code(&self) -> &'static str {
        match self {
            Self::EmptyPayload => "ERR_EMPTY_PAYLOAD",
            Self::FileNameTooLong(_) => "ERR_FILENAME_TOO_LONG",
            Self::PayloadTooLarge(_) => "ERR_PAYLOAD_TOO_LARGE",
            Self::HeaderMismatch(_) => "ERR_HEADER_MISMATCH",
            Self::Crypto(_) => "ERR_CRYPTO",
            Self::Compress(_) => "ERR_COMPRESS",
            Self::Decompress(_) => "ERR_DECOMPRESS",
            Self::UnsupportedFormat(_) => "ERR_UNSUPPORTED_FORMAT",
        }
    }

    pub(crate) fn header_mismatch() -> Self {
        Self::HeaderMismatch(
            "Invalid pairing. Both images must belong to the same encoding session.".into(),
        )
    }

    pub(crate) fn crypto() -> Self {
        Self::Crypto(
            "Decryption failed. Ensure both images are from the same encoding session and have not been modified or re-compressed."
                .into(),
        )
    }

    pub(crate) fn decompress() -> Self {
        Self::Decompress("Decompression failed. Data payload may be corrupt.".into())
    }
}

/// 核心模块使用的结果类型别名。
pub type Result<T> = std::result::Result<T, CodecError>;
