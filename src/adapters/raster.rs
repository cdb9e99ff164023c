use std::io::Cursor;

use image::error::{ImageError, ImageResult, ParameterError, ParameterErrorKind};
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbaImage};

use crate::error::{CodecError, Result};
use crate::ports::{BoundedImage, CarrierImage, ImageAdapter};

/// 基于 `image` 的图像端口，缩放使用 `filter` 指定的滤波器。
#[derive(Debug, Clone, Copy)]
pub struct RasterImageAdapter {
    filter: FilterType,
}

impl RasterImageAdapter {
    pub fn new(filter: FilterType) -> Self {
        Self { filter }
    }

    /// 将像素缓冲区编码为不含元数据的 RGBA PNG。
    ///
    /// # Errors
    ///
    /// 缓冲区长度与尺寸不符或编码失败时返回错误。
    pub fn encode_png(&self, image: &CarrierImage) -> ImageResult<Vec<u8>> {
        let buffer = RgbaImage::from_raw(image.width, image.height, image.pixels.clone())
            .ok_or_else(|| {
                ImageError::Parameter(ParameterError::from_kind(
                    ParameterErrorKind::DimensionMismatch,
                ))
            })?;

        let mut out = Cursor::new(Vec::new());
        buffer.write_to(&mut out, ImageFormat::Png)?;
        Ok(out.into_inner())
    }
}

impl Default for RasterImageAdapter {
    fn default() -> Self {
        Self::new(FilterType::Triangle)
    }
}

fn decode(file: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(file).map_err(|e| {
        CodecError::UnsupportedFormat(format!(
            "Unsupported image format ({e}). Accepted formats: JPEG, PNG, WebP, BMP, GIF, TIFF, QOI."
        ))
    })
}

/// 转为 RGBA8 并把 Alpha 统一设为 255。
fn into_carrier(image: DynamicImage) -> CarrierImage {
    let mut rgba = image.into_rgba8();
    rgba.pixels_mut().for_each(|p| p.0[3] = 255);
    let (width, height) = rgba.dimensions();

    CarrierImage {
        pixels: rgba.into_raw(),
        width,
        height,
    }
}

impl ImageAdapter for RasterImageAdapter {
    fn load_pixels(&self, file: &[u8]) -> Result<CarrierImage> {
        decode(file).map(into_carrier)
    }

    fn resize_stretch(&self, file: &[u8], width: u32, height: u32) -> Result<CarrierImage> {
        let image = decode(file)?;
        if image.dimensions() == (width, height) {
            return Ok(into_carrier(image));
        }
        Ok(into_carrier(image.resize_exact(width, height, self.filter)))
    }

    fn downscale_to_limit(&self, file: &[u8], max_pixels: u64) -> Result<BoundedImage> {
        let image = decode(file)?;
        let (width, height) = image.dimensions();
        let pixels = u64::from(width) * u64::from(height);

        if pixels <= max_pixels {
            return Ok(BoundedImage {
                image: into_carrier(image),
                downscaled: false,
            });
        }

        let scale = (max_pixels as f64 / pixels as f64).sqrt();
        let new_width = ((f64::from(width) * scale).floor() as u32).max(1);
        let new_height = ((f64::from(height) * scale).floor() as u32).max(1);

        Ok(BoundedImage {
            image: into_carrier(image.resize_exact(new_width, new_height, self.filter)),
            downscaled: true,
        })
    }
}
