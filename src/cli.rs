//! # 命令行接口模块
//!
//! 使用 `clap` 定义了程序的命令行结构，包括子命令和参数。
//! 所有用户通过命令行与程序交互的入口点都在此模块中定义。

use crate::constants::DEFAULT_COMPRESSION_LEVEL;
use clap::Parser;
use std::path::PathBuf;

/// 把一个秘密文件 (藏宝图) 拆分隐藏到两张普通图像 (Cat 与 Dog) 中，两张合在一起才能恢复。
#[derive(Parser, Debug)]
#[command(
    version,
    about,
    long_about = "把一个秘密文件 (藏宝图) 压缩、加密并拆分后，以 LSB 隐写的方式藏进两张图像。\n任何一张单独的图像都不泄露信息，两张一起才能恢复原始文件及其文件名。"
)]
pub struct Cli {
    /// 输出调试日志到 stderr。
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令：encode (隐藏)、decode (恢复) 和 plan (容量估算)。
#[derive(Parser, Debug)]
pub enum Commands {
    /// 将文件隐藏到 Cat 与 Dog 两张图像中，输出两张 PNG。
    Encode(EncodeArgs),

    /// 从两张隐写 PNG 中恢复原始文件，图像顺序任意。
    Decode(DecodeArgs),

    /// 估算隐藏某个文件所需的最小标准分辨率。
    Plan(PlanArgs),
}

/// 'encode' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct EncodeArgs {
    /// 要隐藏的文件 (藏宝图)。
    #[arg(short, long)]
    pub treasure: PathBuf,

    /// Cat 图像，其宽高比决定输出分辨率。
    #[arg(short, long)]
    pub cat: PathBuf,

    /// Dog 图像，会被拉伸到与 Cat 相同的尺寸。
    #[arg(short, long)]
    pub dog: PathBuf,

    /// 输出目录，默认为 Cat 图像所在目录。
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,

    /// zlib 压缩级别，0 (不压缩) 到 9 (最高压缩率)。
    #[arg(short, long, default_value_t = DEFAULT_COMPRESSION_LEVEL, value_parser = clap::value_parser!(u32).range(0..=9))]
    pub level: u32,
}

/// 'decode' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct DecodeArgs {
    /// 第一张隐写图像。
    #[arg(short = 'a', long)]
    pub first: PathBuf,

    /// 第二张隐写图像。
    #[arg(short = 'b', long)]
    pub second: PathBuf,

    /// 恢复文件的输出目录，默认为第一张图像所在目录。
    #[arg(short, long)]
    pub out_dir: Option<PathBuf>,

    /// 覆盖已存在的输出文件。
    #[arg(short, long)]
    pub force: bool,
}

/// 'plan' 命令所需的参数。
#[derive(Parser, Debug)]
pub struct PlanArgs {
    /// 要估算的文件。
    #[arg(short, long)]
    pub treasure: PathBuf,

    /// 嵌入时使用的文件名，默认取自文件路径。
    #[arg(short, long)]
    pub name: Option<String>,

    /// zlib 压缩级别，应与 encode 时使用的级别一致。
    #[arg(short, long, default_value_t = DEFAULT_COMPRESSION_LEVEL, value_parser = clap::value_parser!(u32).range(0..=9))]
    pub level: u32,
}
