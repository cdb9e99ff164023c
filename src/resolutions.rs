//! # 标准分辨率表
//!
//! 17 个固定的横向分辨率 (宽 >= 高)，分属三个宽高比类别。
//! 类别在运行时由宽高推导，不在表中重复存储。

use std::fmt;

/// 标准分辨率表中的一项。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionEntry {
    pub width: u32,
    pub height: u32,
    pub label: &'static str,
}

impl ResolutionEntry {
    const fn new(width: u32, height: u32, label: &'static str) -> Self {
        Self {
            width,
            height,
            label,
        }
    }

    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn category(&self) -> AspectCategory {
        AspectCategory::classify(self.width, self.height)
    }
}

/// 宽高比类别。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AspectCategory {
    /// 1:1
    Square,
    /// 4:3
    Standard,
    /// 16:9
    Wide,
}

impl AspectCategory {
    /// 1 与 4/3 的中点。
    const SQUARE_UPPER: f64 = 1.1667;
    /// 4/3 与 16/9 的中点。
    const STANDARD_UPPER: f64 = 1.5556;

    /// 按 `max(w,h) / min(w,h)` 归类，与方向无关。
    pub fn classify(width: u32, height: u32) -> Self {
        let long = f64::from(width.max(height));
        let short = f64::from(width.min(height).max(1));
        let ratio = long / short;

        if ratio < Self::SQUARE_UPPER {
            Self::Square
        } else if ratio < Self::STANDARD_UPPER {
            Self::Standard
        } else {
            Self::Wide
        }
    }
}

impl fmt::Display for AspectCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Square => "1:1",
            Self::Standard => "4:3",
            Self::Wide => "16:9",
        };
        f.write_str(label)
    }
}

/// 每个类别内按像素数升序排列。
pub const STANDARD_RESOLUTIONS: [ResolutionEntry; 17] = [
    // 4:3
    ResolutionEntry::new(320, 240, "qVGA"),
    ResolutionEntry::new(640, 480, "VGA"),
    ResolutionEntry::new(800, 600, "SVGA"),
    ResolutionEntry::new(1024, 768, "XGA"),
    ResolutionEntry::new(1600, 1200, "UXGA"),
    ResolutionEntry::new(2048, 1536, "QXGA"),
    ResolutionEntry::new(4032, 3024, "iPhone 12MP"),
    // 16:9
    ResolutionEntry::new(640, 360, "360p"),
    ResolutionEntry::new(1280, 720, "720p"),
    ResolutionEntry::new(1920, 1080, "1080p"),
    ResolutionEntry::new(2560, 1440, "QHD"),
    ResolutionEntry::new(3840, 2160, "4K UHD"),
    // 1:1
    ResolutionEntry::new(256, 256, "256sq"),
    ResolutionEntry::new(512, 512, "512sq"),
    ResolutionEntry::new(1024, 1024, "1024sq"),
    ResolutionEntry::new(2048, 2048, "2048sq"),
    ResolutionEntry::new(4096, 4096, "4096sq"),
];
