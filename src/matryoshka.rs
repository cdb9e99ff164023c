//! # 套娃式三层帧封装
//!
//! * 第三层 (明文)：`actualLen(4, 大端) | nameLen(1) | 文件名 | 压缩载荷 | 零填充`
//! * 第二层 (密文流)：`key(32) | iv(12) | ciphertext+tag`
//! * 第一层 (单张载体)：`carrierId(1) | 条带数据`，ID 的最低位区分 Cat (0) 与 Dog (1)
//!
//! 第三层的填充刻意使用零而非随机数：AES-GCM 的输出与明文结构无关，
//! 加密后的零填充与噪声不可区分。

use crate::constants::{HEADER_BYTES, IV_LEN, KEY_LEN, MAX_FILENAME_BYTES, TAG_LEN};
use crate::error::{CodecError, Result};
use crate::steganography::LsbDepth;

/// 第三层解析结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlainFrame {
    pub file_name: String,
    pub compressed: Vec<u8>,
}

/// 第二层内容：一次性密钥、IV 与带认证标签的密文。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedPayload {
    pub key: [u8; KEY_LEN],
    pub iv: [u8; IV_LEN],
    pub ciphertext: Vec<u8>,
}

/// 构造长度恰好为 `capacity` 的第三层帧，剩余部分以零填充。
///
/// # Errors
///
/// * 文件名超过 255 字节时返回 [`CodecError::FileNameTooLong`]。
/// * `capacity` 放不下头部、文件名和载荷时返回 [`CodecError::PayloadTooLarge`]。
pub fn pack_layer3(compressed: &[u8], file_name: &str, capacity: usize) -> Result<Vec<u8>> {
    let name = file_name.as_bytes();
    if name.len() > MAX_FILENAME_BYTES {
        return Err(CodecError::FileNameTooLong(name.len()));
    }

    let needed = HEADER_BYTES + name.len() + compressed.len();
    if capacity < needed {
        return Err(CodecError::PayloadTooLarge(format!(
            "Plaintext frame needs {needed} bytes but only {capacity} are available."
        )));
    }

    let actual_len = u32::try_from(1 + name.len() + compressed.len()).map_err(|_| {
        CodecError::PayloadTooLarge("Payload length does not fit the 32-bit length field.".into())
    })?;

    let mut frame = vec![0u8; capacity];
    frame[..4].copy_from_slice(&actual_len.to_be_bytes());
    frame[4] = name.len() as u8;
    frame[HEADER_BYTES..HEADER_BYTES + name.len()].copy_from_slice(name);
    frame[HEADER_BYTES + name.len()..needed].copy_from_slice(compressed);

    Ok(frame)
}

/// 解析第三层帧，忽略尾部填充。文件名按 UTF-8 解码，非法序列以替换字符代替。
///
/// # Errors
///
/// 长度字段越界时返回 [`CodecError::Decompress`]。
pub fn unpack_layer3(frame: &[u8]) -> Result<PlainFrame> {
    let Some((len_bytes, rest)) = frame.split_first_chunk::<4>() else {
        return Err(CodecError::decompress());
    };
    let Some((&name_len, _)) = rest.split_first() else {
        return Err(CodecError::decompress());
    };

    let actual_len = u32::from_be_bytes(*len_bytes) as usize;
    let name_end = HEADER_BYTES + usize::from(name_len);
    let payload_end = 4usize.saturating_add(actual_len);

    if payload_end < name_end || payload_end > frame.len() {
        return Err(CodecError::decompress());
    }

    Ok(PlainFrame {
        file_name: String::from_utf8_lossy(&frame[HEADER_BYTES..name_end]).into_owned(),
        compressed: frame[name_end..payload_end].to_vec(),
    })
}

/// 直接拼接 `key | iv | ciphertext`。
pub fn pack_layer2(sealed: &SealedPayload) -> Vec<u8> {
    let mut out = Vec::with_capacity(KEY_LEN + IV_LEN + sealed.ciphertext.len());
    out.extend_from_slice(&sealed.key);
    out.extend_from_slice(&sealed.iv);
    out.extend_from_slice(&sealed.ciphertext);
    out
}

/// 按固定偏移拆分第二层。
///
/// # Errors
///
/// 数据流短于 key + iv + tag 时不可能通过认证，返回 [`CodecError::Crypto`]。
pub fn unpack_layer2(stream: &[u8]) -> Result<SealedPayload> {
    if stream.len() < KEY_LEN + IV_LEN + TAG_LEN {
        return Err(CodecError::crypto());
    }

    let (key, rest) = stream
        .split_first_chunk::<KEY_LEN>()
        .ok_or_else(CodecError::crypto)?;
    let (iv, ciphertext) = rest
        .split_first_chunk::<IV_LEN>()
        .ok_or_else(CodecError::crypto)?;

    Ok(SealedPayload {
        key: *key,
        iv: *iv,
        ciphertext: ciphertext.to_vec(),
    })
}

/// 在条带数据前加上一个随机 Carrier ID 字节，并强制其奇偶性。
///
/// `random` 以请求的字节数调用一次；返回空时以零作为填充。
pub fn pack_layer1<R>(striped: &[u8], is_even: bool, random: R) -> Vec<u8>
where
    R: FnOnce(usize) -> Vec<u8>,
{
    let filler = random(1).first().copied().unwrap_or(0);
    let id = if is_even { filler & 0xFE } else { filler | 0x01 };

    let mut out = Vec::with_capacity(1 + striped.len());
    out.push(id);
    out.extend_from_slice(striped);
    out
}

/// 读取两张图像各自嵌入的第一个字节，按奇偶性分配角色，返回 `(cat, dog)`。
///
/// # Errors
///
/// 两个 ID 奇偶相同时返回 [`CodecError::HeaderMismatch`]。
pub fn unpack_layer1_id<T, F>(first: T, second: T, extract: F) -> Result<(T, T)>
where
    T: AsRef<[u8]>,
    F: Fn(&[u8], usize, LsbDepth) -> Vec<u8>,
{
    let first_id = extract(first.as_ref(), 8, LsbDepth::CARRIER).first().copied().unwrap_or(0);
    let second_id = extract(second.as_ref(), 8, LsbDepth::CARRIER).first().copied().unwrap_or(0);

    let first_even = first_id % 2 == 0;
    let second_even = second_id % 2 == 0;

    match (first_even, second_even) {
        (true, false) => Ok((first, second)),
        (false, true) => Ok((second, first)),
        _ => Err(CodecError::header_mismatch()),
    }
}

/// 去掉 Carrier ID 字节。
pub fn unpack_layer1_data(bytes: &[u8]) -> &[u8] {
    bytes.get(1..).unwrap_or_default()
}
