/// 每个通道用于隐写的最低有效位数。
/// 每个像素的 R、G、B 三个通道各存储 3 bits，因此每个像素可承载 9 bits。
pub const N_LSB: u32 = 3;

/// 参与隐写的颜色通道数 (R, G, B)。Alpha 通道永远不被读写。
pub const CHANNELS: u64 = 3;

/// RGBA 像素缓冲区中每个像素所占的字节数。
pub const BYTES_PER_PIXEL: usize = 4;

/// 载体图像允许的最大像素数 (4096 x 4096)。
pub const MAX_CARRIER_PIXELS: u64 = 16_777_216;

/// AES-256 一次性密钥长度 (字节)。
pub const KEY_LEN: usize = 32;

/// AES-GCM 初始化向量长度 (字节)。
pub const IV_LEN: usize = 12;

/// AES-GCM 认证标签长度 (字节)。
pub const TAG_LEN: usize = 16;

/// 加密层的固定开销：key(32) + iv(12) + tag(16)。
pub const AES_OVERHEAD_BYTES: u64 = (KEY_LEN + IV_LEN + TAG_LEN) as u64;

/// 两张载体图像各自的 Carrier ID 字节之和。
pub const CARRIER_ID_TOTAL_BYTES: u64 = 2;

/// 第三层明文帧头部：actualLen(4, 大端) + nameLen(1)。
pub const HEADER_BYTES: usize = 5;

/// 未指定 `--level` 时使用的 zlib 压缩级别。
pub const DEFAULT_COMPRESSION_LEVEL: u32 = 6;

/// 判定 Cat 与 Dog 宽高比不同的阈值。
pub const ASPECT_RATIO_TOLERANCE: f64 = 0.01;

/// 文件名 UTF-8 编码后的最大字节数。
pub const MAX_FILENAME_BYTES: usize = 255;

/// Cat 图像输出文件名前缀。
pub const CAT_OUTPUT_PREFIX: &str = "c_";

/// Dog 图像输出文件名前缀。
pub const DOG_OUTPUT_PREFIX: &str = "d_";
