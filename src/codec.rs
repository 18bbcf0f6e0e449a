//! Fronteira com os codecs de imagem.
//!
//! A decodificação WebP é feita pela libwebp nativa (via `libwebp-sys`);
//! JPEG e PNG são gerados pelo crate `image`.

use crate::config::OutputFormat;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::{ExtendedColorType, ImageEncoder};
use libwebp_sys::VP8StatusCode;
use std::mem::MaybeUninit;
use thiserror::Error;

/// Imagem decodificada, em memória apenas durante a conversão de um arquivo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub width: u32,
    pub height: u32,
    pub has_alpha: bool,
    /// Pixels em ordem de linhas: RGB (3 bytes) ou RGBA (4 bytes).
    pub pixels: Vec<u8>,
}

impl DecodedImage {
    pub fn bytes_per_pixel(&self) -> usize {
        if self.has_alpha {
            4
        } else {
            3
        }
    }

    fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * self.bytes_per_pixel()
    }
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("dados WebP inválidos (status {0})")]
    InvalidHeader(i32),
    #[error("WebP animado não é suportado")]
    Animated,
    #[error("falha ao decodificar os dados WebP")]
    DecodeFailed,
}

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("buffer de pixels inválido: esperado {expected} bytes, obtido {actual}")]
    BufferSize { expected: usize, actual: usize },
    #[error(transparent)]
    Image(#[from] image::ImageError),
}

pub trait WebpDecode {
    fn decode(&self, data: &[u8]) -> Result<DecodedImage, DecodeError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct LibWebpDecoder;

impl WebpDecode for LibWebpDecoder {
    fn decode(&self, data: &[u8]) -> Result<DecodedImage, DecodeError> {
        let mut features = MaybeUninit::<libwebp_sys::WebPBitstreamFeatures>::uninit();
        let status = unsafe {
            libwebp_sys::WebPGetFeatures(data.as_ptr(), data.len(), features.as_mut_ptr())
        };
        if status != VP8StatusCode::VP8_STATUS_OK {
            return Err(DecodeError::InvalidHeader(status as i32));
        }
        let features = unsafe { features.assume_init() };

        if features.has_animation != 0 {
            return Err(DecodeError::Animated);
        }
        let has_alpha = features.has_alpha != 0;

        let mut width: i32 = 0;
        let mut height: i32 = 0;
        let ptr = unsafe {
            if has_alpha {
                libwebp_sys::WebPDecodeRGBA(data.as_ptr(), data.len(), &mut width, &mut height)
            } else {
                libwebp_sys::WebPDecodeRGB(data.as_ptr(), data.len(), &mut width, &mut height)
            }
        };
        if ptr.is_null() {
            return Err(DecodeError::DecodeFailed);
        }

        let channels = if has_alpha { 4 } else { 3 };
        let size = (width as usize) * (height as usize) * channels;
        let pixels = unsafe {
            let vec = std::slice::from_raw_parts(ptr, size).to_vec();
            libwebp_sys::WebPFree(ptr as *mut _);
            vec
        };

        Ok(DecodedImage {
            width: width as u32,
            height: height as u32,
            has_alpha,
            pixels,
        })
    }
}

/// Codifica a imagem no formato de saída.
///
/// JPEG não tem canal alfa: nesse caso o alfa é descartado e apenas RGB é
/// gravado. PNG preserva RGBA.
pub fn encode(
    image: &DecodedImage,
    format: OutputFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    let expected = image.expected_len();
    if image.pixels.len() != expected {
        return Err(EncodeError::BufferSize {
            expected,
            actual: image.pixels.len(),
        });
    }

    let mut out = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let stripped;
            let rgb: &[u8] = if image.has_alpha {
                stripped = strip_alpha(&image.pixels);
                &stripped
            } else {
                &image.pixels
            };
            JpegEncoder::new_with_quality(&mut out, quality).write_image(
                rgb,
                image.width,
                image.height,
                ExtendedColorType::Rgb8,
            )?;
        }
        OutputFormat::Png => {
            let color = if image.has_alpha {
                ExtendedColorType::Rgba8
            } else {
                ExtendedColorType::Rgb8
            };
            PngEncoder::new(&mut out).write_image(
                &image.pixels,
                image.width,
                image.height,
                color,
            )?;
        }
    }
    Ok(out)
}

fn strip_alpha(rgba: &[u8]) -> Vec<u8> {
    rgba.chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect()
}
