//! # 命令处理逻辑模块
//!
//! 包含处理 `encode`、`decode` 和 `plan` 子命令的高级业务逻辑。
//! 本模块负责协调文件 I/O、调用编解码核心以及向用户报告结果。

use crate::cli::{DecodeArgs, EncodeArgs, PlanArgs};
use crate::codec::{DefaultCodec, EncodeRequest};
use crate::constants::{
    ASPECT_RATIO_TOLERANCE, CAT_OUTPUT_PREFIX, DOG_OUTPUT_PREFIX, MAX_CARRIER_PIXELS,
};
use crate::error::CodecError;
use crate::ports::{BoundedImage, CarrierImage, ImageAdapter};
use anyhow::{Context, Result};
use colored::Colorize;
use std::borrow::Cow;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// 恢复出的文件名无法安全使用时的替代名称。
const FALLBACK_RECOVERED_NAME: &str = "recovered.bin";

fn read_file(path: &Path, what: &str) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| {
        format!(
            "Unable to read {} file: {}",
            what,
            path.to_string_lossy().red().bold()
        )
    })
}

fn write_file(path: &Path, contents: &[u8]) -> Result<()> {
    fs::write(path, contents).with_context(|| {
        format!(
            "Unable to write to target file: {}",
            path.to_string_lossy().red().bold()
        )
    })
}

/// 未指定 `--force` 时拒绝覆盖已存在的文件。
fn ensure_writable(path: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(
        force || !path.exists(),
        "Output file already exists: {}. \nUse --force to overwrite it.",
        path.to_string_lossy().red().bold()
    );
    Ok(())
}

fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "carrier".to_string())
}

/// 把核心错误包装为带错误代码的 `anyhow::Error`，原始错误保留在错误链中。
fn codec_failure(action: &'static str) -> impl FnOnce(CodecError) -> anyhow::Error {
    move |err| {
        let code = err.code();
        anyhow::Error::new(err).context(format!("{} failed [{}]", action, code.red().bold()))
    }
}

/// 载体超过像素上限时先按比例缩小，并重新编码为 PNG 供后续拉伸使用。
fn bound_carrier<'a>(
    codec: &DefaultCodec,
    role: &str,
    path: &Path,
    raw: &'a [u8],
) -> Result<(Cow<'a, [u8]>, BoundedImage)> {
    let bounded = codec
        .images()
        .downscale_to_limit(raw, MAX_CARRIER_PIXELS)
        .map_err(codec_failure("Loading carrier image"))
        .with_context(|| format!("{} image: {}", role, path.to_string_lossy()))?;

    if !bounded.downscaled {
        return Ok((Cow::Borrowed(raw), bounded));
    }

    warn!(
        role,
        width = bounded.image.width,
        height = bounded.image.height,
        "carrier exceeded pixel ceiling and was downscaled"
    );
    println!(
        "{}: Image exceeds maximum pixel count. It was automatically downscaled to {}x{}.",
        role.yellow().bold(),
        bounded.image.width,
        bounded.image.height
    );

    let png = codec
        .images()
        .encode_png(&bounded.image)
        .with_context(|| format!("Unable to re-encode downscaled {} image", role))?;
    Ok((Cow::Owned(png), bounded))
}

/// Dog 会被拉伸到 Cat 的尺寸，两者宽高比相差超过 [`ASPECT_RATIO_TOLERANCE`] 时返回 `true`。
fn aspect_ratio_differs(cat: &CarrierImage, dog: &CarrierImage) -> bool {
    let ratio = |image: &CarrierImage| f64::from(image.width) / f64::from(image.height);
    (ratio(cat) - ratio(dog)).abs() > ASPECT_RATIO_TOLERANCE
}

/// 处理 'Encode' 命令的执行逻辑。
///
/// 读取藏宝图与两张载体图像，检查输出路径，必要时缩小超大的载体，
/// Dog 与 Cat 宽高比不同时给出拉伸提示，以 `--level` 指定的压缩级别
/// 调用编码核心，最后把 Cat 与 Dog 两张 PNG 写入输出目录。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `EncodeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入文件，或输出文件已存在且未指定 `--force`。
/// * 编码核心返回错误 (空文件、文件名过长、载荷过大、图像格式不支持)。
/// * 无法写入输出图像。
pub fn handle_encode(args: EncodeArgs) -> Result<()> {
    let codec = DefaultCodec::with_level(args.level);

    let treasure = read_file(&args.treasure, "treasure map")?;
    let cat_raw = read_file(&args.cat, "cat image")?;
    let dog_raw = read_file(&args.dog, "dog image")?;

    let file_name = args
        .treasure
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let out_dir = args.out_dir.clone().unwrap_or_else(|| parent_dir(&args.cat));
    let cat_dest = out_dir.join(format!("{}{}.png", CAT_OUTPUT_PREFIX, file_stem(&args.cat)));
    let dog_dest = out_dir.join(format!("{}{}.png", DOG_OUTPUT_PREFIX, file_stem(&args.dog)));
    ensure_writable(&cat_dest, args.force)?;
    ensure_writable(&dog_dest, args.force)?;

    let (cat_bytes, cat) = bound_carrier(&codec, "Cat", &args.cat, &cat_raw)?;
    let (dog_bytes, dog) = bound_carrier(&codec, "Dog", &args.dog, &dog_raw)?;

    if aspect_ratio_differs(&cat.image, &dog.image) {
        warn!(
            cat_width = cat.image.width,
            cat_height = cat.image.height,
            dog_width = dog.image.width,
            dog_height = dog.image.height,
            "dog aspect ratio differs from cat, dog will be stretched"
        );
        println!(
            "{}: Dog Image aspect ratio differs from Cat Image. Dog will be stretched to match.",
            "Dog".yellow().bold()
        );
    }

    let output = codec
        .encode(&EncodeRequest {
            treasure: &treasure,
            file_name: &file_name,
            cat: &cat_bytes,
            dog: &dog_bytes,
            cat_width: cat.image.width,
            cat_height: cat.image.height,
        })
        .map_err(codec_failure("Encoding"))?;

    for (image, dest) in [(&output.cat, &cat_dest), (&output.dog, &dog_dest)] {
        let png = codec
            .images()
            .encode_png(image)
            .context("Unable to encode the stego image as PNG")?;
        write_file(dest, &png)?;
    }

    println!(
        "The treasure map has been hidden in {}x{} ({}) carriers, compressed size {} bytes:",
        output.resolution.width,
        output.resolution.height,
        output.resolution.label.green().bold(),
        output.compressed_size.to_string().green().bold()
    );
    println!("  Cat: {}", cat_dest.to_string_lossy().green().bold());
    println!("  Dog: {}", dog_dest.to_string_lossy().green().bold());
    println!("Keep both images together and never re-compress them.");

    Ok(())
}

/// 只保留文件名的最后一个路径分量，防止载荷中的路径逃出输出目录。
fn safe_file_name(name: &str) -> String {
    Path::new(name)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| FALLBACK_RECOVERED_NAME.to_string())
}

/// 处理 'Decode' 命令的执行逻辑。
///
/// 读取两张隐写图像 (顺序任意)，调用解码核心恢复文件，
/// 并以嵌入时的文件名写入输出目录。
///
/// # Arguments
///
/// * `args` - 包含输入/输出路径的 `DecodeArgs` 结构体。
///
/// # Errors
///
/// 如果发生以下任一情况，将返回错误：
/// * 无法读取输入图像。
/// * 两张图像不是同一会话的 Cat/Dog 对，或已被修改、重新压缩。
/// * 输出文件已存在且未指定 `--force`，或无法写入。
pub fn handle_decode(args: DecodeArgs) -> Result<()> {
    let codec = DefaultCodec::default();

    let first = read_file(&args.first, "image")?;
    let second = read_file(&args.second, "image")?;

    let decoded = codec
        .decode(&first, &second)
        .map_err(codec_failure("Decoding"))?;

    let out_dir = args.out_dir.unwrap_or_else(|| parent_dir(&args.first));
    let dest = out_dir.join(safe_file_name(&decoded.file_name));
    ensure_writable(&dest, args.force)?;
    write_file(&dest, &decoded.treasure)?;

    println!(
        "The treasure map has been successfully recovered and saved: {}",
        dest.to_string_lossy().green().bold()
    );
    Ok(())
}

/// 处理 'Plan' 命令的执行逻辑。
///
/// 压缩文件后计算每张载体至少需要的容量，并报告所有类别中
/// 像素数最少且足够容纳的标准分辨率。
///
/// # Errors
///
/// 无法读取文件，或文件为空、文件名过长时返回错误。
pub fn handle_plan(args: PlanArgs) -> Result<()> {
    let codec = DefaultCodec::with_level(args.level);
    let treasure = read_file(&args.treasure, "treasure map")?;

    let file_name = args.name.unwrap_or_else(|| {
        args.treasure
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    let plan = codec
        .plan(&treasure, &file_name)
        .map_err(codec_failure("Planning"))?;

    println!(
        "Compressed size: {} bytes, required per carrier: {} bytes",
        plan.compressed_size.to_string().green().bold(),
        plan.bytes_per_carrier.to_string().green().bold()
    );

    match plan.entry {
        Some(entry) => println!(
            "Smallest standard resolution: {} ({}x{}, {})",
            entry.label.green().bold(),
            entry.width,
            entry.height,
            entry.category()
        ),
        None => println!(
            "{}",
            "No standard resolution can hold this file. Reduce payload size.".red().bold()
        ),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recovered_name_cannot_escape_output_dir() {
        assert_eq!(safe_file_name("notes.txt"), "notes.txt");
        assert_eq!(safe_file_name("../../etc/passwd"), "passwd");
        assert_eq!(safe_file_name("/abs/secret.key"), "secret.key");
        assert_eq!(safe_file_name(".."), FALLBACK_RECOVERED_NAME);
        assert_eq!(safe_file_name(""), FALLBACK_RECOVERED_NAME);
    }

    fn shape(width: u32, height: u32) -> CarrierImage {
        CarrierImage {
            pixels: Vec::new(),
            width,
            height,
        }
    }

    #[test]
    fn stretched_dog_is_detected_by_aspect_ratio() {
        assert!(aspect_ratio_differs(&shape(100, 75), &shape(60, 60)));
        assert!(aspect_ratio_differs(&shape(1920, 1080), &shape(1080, 1920)));
        assert!(!aspect_ratio_differs(&shape(100, 75), &shape(400, 300)));
        assert!(!aspect_ratio_differs(&shape(60, 60), &shape(61, 61)));
    }

    #[test]
    fn small_ratio_drift_is_tolerated() {
        // 1.005 在阈值之内，1.02 超出
        assert!(!aspect_ratio_differs(&shape(200, 200), &shape(201, 200)));
        assert!(aspect_ratio_differs(&shape(100, 100), &shape(102, 100)));
    }

    #[test]
    fn output_names_use_role_prefix() {
        assert_eq!(file_stem(Path::new("/tmp/kitty.jpeg")), "kitty");
        assert_eq!(parent_dir(Path::new("kitty.png")), PathBuf::from(""));
    }
}
