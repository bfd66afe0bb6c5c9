use std::io::Cursor;

use ::image::codecs::jpeg::{JpegDecoder, JpegEncoder};
use ::image::codecs::png::{CompressionType, FilterType, PngDecoder, PngEncoder};
use ::image::{DynamicImage, ImageDecoder, ImageEncoder, ImageFormat};
use camino::Utf8Path;

use super::ImageOptimizer;
use crate::error::ToolError;

/// JPEG quality used when re-encoding.
const JPEG_QUALITY: u8 = 80;

/// Image optimizer that re-encodes PNG and JPEG files with the `image`
/// crate. Other formats pass through untouched.
///
/// Metadata is not copied wholesale, so the EXIF orientation is baked into
/// the pixels and the ICC profile is embedded again. The result renders the
/// same way as the source.
pub struct Reencode;

impl ImageOptimizer for Reencode {
    fn optimize(&self, path: &Utf8Path, data: &[u8]) -> Result<Vec<u8>, ToolError> {
        let mut buffer = Vec::new();

        match ImageFormat::from_path(path) {
            Ok(ImageFormat::Png) => {
                let (img, icc) = decode(PngDecoder::new(Cursor::new(data))?)?;
                let mut encoder = PngEncoder::new_with_quality(
                    &mut buffer,
                    CompressionType::Best,
                    FilterType::Adaptive,
                );
                embed_icc(&mut encoder, path, icc);
                img.write_with_encoder(encoder)?;
            }
            Ok(ImageFormat::Jpeg) => {
                let (img, icc) = decode(JpegDecoder::new(Cursor::new(data))?)?;
                let mut encoder = JpegEncoder::new_with_quality(&mut buffer, JPEG_QUALITY);
                embed_icc(&mut encoder, path, icc);
                img.to_rgb8().write_with_encoder(encoder)?;
            }
            _ => return Ok(data.to_vec()),
        }

        Ok(buffer)
    }
}

/// Decodes the image upright, together with its colour profile.
fn decode(mut decoder: impl ImageDecoder) -> Result<(DynamicImage, Option<Vec<u8>>), ToolError> {
    let orientation = decoder.orientation()?;
    let icc = decoder.icc_profile()?;

    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);

    Ok((img, icc))
}

fn embed_icc(encoder: &mut impl ImageEncoder, path: &Utf8Path, icc: Option<Vec<u8>>) {
    if let Some(icc) = icc {
        if let Err(e) = encoder.set_icc_profile(icc) {
            tracing::warn!("{path}: colour profile dropped: {e}");
        }
    }
}
