use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, RgbImage};
use img_parts::{Bytes, ImageEXIF};

/// Both output dimensions stay within this bound.
pub const MAX_DIMENSION: u32 = 800;
/// Re-encode quality, out of 100.
pub const JPEG_QUALITY: u8 = 90;

const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("image decode failed: {0}")]
    Decode(String),
    #[error("image scale failed: {0}")]
    Scale(String),
    #[error("image encode failed: {0}")]
    Encode(String),
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    pub max_dim: u32,
    pub quality: u8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_dim: MAX_DIMENSION,
            quality: JPEG_QUALITY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ResizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

pub struct ImagePipeline {
    config: PipelineConfig,
}

impl ImagePipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Decode, scale-to-fit and re-encode as JPEG.
    pub fn process(&self, bytes: &[u8]) -> Result<ResizedImage, PipelineError> {
        let rgb = decode_rgb8(bytes)?;
        let (width, height) = rgb.dimensions();
        if width == 0 || height == 0 {
            return Err(PipelineError::Scale("invalid image dimensions".to_string()));
        }

        let (target_width, target_height) = scale_to_fit(width, height, self.config.max_dim);
        let rgb = if (target_width, target_height) == (width, height) {
            rgb
        } else {
            imageops::resize(&rgb, target_width, target_height, FilterType::Lanczos3)
        };

        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, self.config.quality.min(100))
            .write_image(
                rgb.as_raw(),
                target_width,
                target_height,
                ExtendedColorType::Rgb8,
            )
            .map_err(|err| PipelineError::Encode(err.to_string()))?;

        Ok(ResizedImage {
            bytes: out,
            width: target_width,
            height: target_height,
        })
    }
}

/// Outcome of [`ingest`]. `data_url` is always usable; `degraded` carries the
/// error that forced the raw-bytes fallback, if any.
#[derive(Debug)]
pub struct IngestOutcome {
    pub data_url: String,
    pub degraded: Option<PipelineError>,
}

/// Turn selected file bytes into a displayable data URL. Never fails: when the
/// pipeline rejects the bytes for any reason, the original bytes are inlined
/// unmodified under their reported mime type.
pub fn ingest(bytes: &[u8], mime: &str) -> IngestOutcome {
    let pipeline = ImagePipeline::new(PipelineConfig::default());
    match pipeline.process(bytes) {
        Ok(resized) => IngestOutcome {
            data_url: encode_data_url("image/jpeg", &resized.bytes),
            degraded: None,
        },
        Err(err) => {
            let mime = mime.trim();
            let mime = if mime.is_empty() { FALLBACK_MIME } else { mime };
            IngestOutcome {
                data_url: encode_data_url(mime, bytes),
                degraded: Some(err),
            }
        }
    }
}

/// Target dimensions for fitting `width`×`height` within `max_dim` on both
/// axes, preserving aspect ratio. Each axis rounds to the nearest integer
/// independently, so the ratio may drift by up to a pixel.
pub fn scale_to_fit(width: u32, height: u32, max_dim: u32) -> (u32, u32) {
    if max_dim == 0 || (width <= max_dim && height <= max_dim) {
        return (width, height);
    }
    let scale = (max_dim as f32 / width as f32).min(max_dim as f32 / height as f32);
    let next_width = ((width as f32) * scale).round().max(1.0) as u32;
    let next_height = ((height as f32) * scale).round().max(1.0) as u32;
    (next_width, next_height)
}

/// Decode to RGB8 with EXIF orientation applied. The browser applied the
/// orientation tag implicitly when drawing to a canvas; here it has to happen
/// before scaling or portrait phone photos come out sideways.
pub fn decode_rgb8(bytes: &[u8]) -> Result<RgbImage, PipelineError> {
    let orientation = extract_exif_orientation(bytes);
    let image =
        image::load_from_memory(bytes).map_err(|err| PipelineError::Decode(err.to_string()))?;
    let rgb = image.to_rgb8();
    Ok(match orientation {
        Some(orientation) => apply_orientation(rgb, orientation),
        None => rgb,
    })
}

pub fn encode_data_url(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

pub fn extract_exif(bytes: &[u8]) -> Option<Vec<u8>> {
    let data = Bytes::copy_from_slice(bytes);

    if let Ok(jpeg) = img_parts::jpeg::Jpeg::from_bytes(data.clone()) {
        if let Some(exif) = jpeg.exif() {
            return Some(exif.as_ref().to_vec());
        }
    }
    if let Ok(png) = img_parts::png::Png::from_bytes(data.clone()) {
        if let Some(exif) = png.exif() {
            return Some(exif.as_ref().to_vec());
        }
    }
    if let Ok(webp) = img_parts::webp::WebP::from_bytes(data) {
        if let Some(exif) = webp.exif() {
            return Some(exif.as_ref().to_vec());
        }
    }
    None
}

pub fn extract_exif_orientation(bytes: &[u8]) -> Option<u16> {
    parse_exif_orientation(&extract_exif(bytes)?)
}

// Minimal TIFF walk over IFD0 for the orientation tag (0x0112). A malformed
// blob yields None, never an error.
fn parse_exif_orientation(exif: &[u8]) -> Option<u16> {
    let tiff = exif.strip_prefix(b"Exif\0\0").unwrap_or(exif);
    let le = match tiff.get(..2)? {
        b"II" => true,
        b"MM" => false,
        _ => return None,
    };
    let read_u16 = |offset: usize| -> Option<u16> {
        let raw: [u8; 2] = tiff.get(offset..offset + 2)?.try_into().ok()?;
        Some(if le {
            u16::from_le_bytes(raw)
        } else {
            u16::from_be_bytes(raw)
        })
    };
    let read_u32 = |offset: usize| -> Option<u32> {
        let raw: [u8; 4] = tiff.get(offset..offset + 4)?.try_into().ok()?;
        Some(if le {
            u32::from_le_bytes(raw)
        } else {
            u32::from_be_bytes(raw)
        })
    };

    if read_u16(2)? != 42 {
        return None;
    }
    let ifd = read_u32(4)? as usize;
    let entries = read_u16(ifd)? as usize;
    for index in 0..entries {
        let entry = ifd + 2 + index * 12;
        if read_u16(entry)? != 0x0112 {
            continue;
        }
        // SHORT with count 1: the value sits inline in the payload field.
        if read_u16(entry + 2)? != 3 || read_u32(entry + 4)? != 1 {
            return None;
        }
        return read_u16(entry + 8).filter(|value| (1..=8).contains(value));
    }
    None
}

fn apply_orientation(rgb: RgbImage, orientation: u16) -> RgbImage {
    match orientation {
        2 => imageops::flip_horizontal(&rgb),
        3 => imageops::rotate180(&rgb),
        4 => imageops::flip_vertical(&rgb),
        5 => imageops::rotate270(&imageops::flip_horizontal(&rgb)),
        6 => imageops::rotate90(&rgb),
        7 => imageops::rotate90(&imageops::flip_horizontal(&rgb)),
        8 => imageops::rotate270(&rgb),
        _ => rgb,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::codecs::png::PngEncoder;
    use image::ImageFormat;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = gradient(width, height);
        let mut out = Vec::new();
        PngEncoder::new(&mut out)
            .write_image(image.as_raw(), width, height, ExtendedColorType::Rgb8)
            .expect("encode fixture");
        out
    }

    fn jpeg_bytes(image: &RgbImage) -> Vec<u8> {
        let (width, height) = image.dimensions();
        let mut out = Vec::new();
        JpegEncoder::new_with_quality(&mut out, 90)
            .write_image(image.as_raw(), width, height, ExtendedColorType::Rgb8)
            .expect("encode fixture");
        out
    }

    fn exif_orientation_blob(le: bool, orientation: u16) -> Vec<u8> {
        let u16_bytes = |value: u16| {
            if le {
                value.to_le_bytes()
            } else {
                value.to_be_bytes()
            }
        };
        let u32_bytes = |value: u32| {
            if le {
                value.to_le_bytes()
            } else {
                value.to_be_bytes()
            }
        };
        let mut blob = b"Exif\0\0".to_vec();
        blob.extend_from_slice(if le { b"II" } else { b"MM" });
        blob.extend_from_slice(&u16_bytes(42));
        blob.extend_from_slice(&u32_bytes(8));
        blob.extend_from_slice(&u16_bytes(1));
        blob.extend_from_slice(&u16_bytes(0x0112));
        blob.extend_from_slice(&u16_bytes(3));
        blob.extend_from_slice(&u32_bytes(1));
        blob.extend_from_slice(&u16_bytes(orientation));
        blob.extend_from_slice(&u16_bytes(0));
        blob
    }

    #[test]
    fn scale_to_fit_keeps_images_already_within_bounds() {
        assert_eq!(scale_to_fit(640, 480, 800), (640, 480));
        assert_eq!(scale_to_fit(800, 800, 800), (800, 800));
        assert_eq!(scale_to_fit(1, 1, 800), (1, 1));
    }

    #[test]
    fn scale_to_fit_downscales_both_orientations() {
        assert_eq!(scale_to_fit(1600, 1200, 800), (800, 600));
        assert_eq!(scale_to_fit(1200, 1600, 800), (600, 800));
        assert_eq!(scale_to_fit(2000, 2000, 800), (800, 800));
    }

    #[test]
    fn scale_to_fit_pins_the_larger_axis_and_holds_aspect() {
        for (width, height) in [(1601u32, 901u32), (3001, 977), (977, 3001), (4032, 3024)] {
            let (next_width, next_height) = scale_to_fit(width, height, 800);
            assert_eq!(next_width.max(next_height), 800);
            // The smaller axis may be off by the half-pixel the rounding ate.
            let implied = 800.0 * (width.min(height) as f64 / width.max(height) as f64);
            let actual = next_width.min(next_height) as f64;
            assert!((implied - actual).abs() <= 0.501);
        }
    }

    #[test]
    fn scale_to_fit_never_rounds_an_axis_to_zero() {
        assert_eq!(scale_to_fit(10_000, 3, 800), (800, 1));
    }

    #[test]
    fn process_round_trips_to_the_target_dimensions() {
        let pipeline = ImagePipeline::new(PipelineConfig::default());
        let resized = pipeline.process(&png_bytes(1600, 1200)).expect("process");
        assert_eq!((resized.width, resized.height), (800, 600));
        assert_eq!(
            image::guess_format(&resized.bytes).expect("format"),
            ImageFormat::Jpeg
        );
        let decoded = image::load_from_memory(&resized.bytes).expect("decode output");
        assert_eq!((decoded.width(), decoded.height()), (800, 600));
    }

    #[test]
    fn process_leaves_small_images_at_their_original_size() {
        let pipeline = ImagePipeline::new(PipelineConfig::default());
        let resized = pipeline.process(&png_bytes(320, 240)).expect("process");
        assert_eq!((resized.width, resized.height), (320, 240));
    }

    #[test]
    fn decode_applies_exif_orientation() {
        let plain = jpeg_bytes(&gradient(64, 32));
        let tagged = img_parts::jpeg::Jpeg::from_bytes(Bytes::from(plain))
            .map(|mut jpeg| {
                jpeg.set_exif(Some(exif_orientation_blob(true, 6).into()));
                jpeg.encoder().bytes().to_vec()
            })
            .expect("attach exif");
        let rgb = decode_rgb8(&tagged).expect("decode");
        assert_eq!(rgb.dimensions(), (32, 64));
    }

    #[test]
    fn orientation_parser_reads_both_endiannesses() {
        assert_eq!(
            parse_exif_orientation(&exif_orientation_blob(true, 6)),
            Some(6)
        );
        assert_eq!(
            parse_exif_orientation(&exif_orientation_blob(false, 3)),
            Some(3)
        );
        assert_eq!(parse_exif_orientation(b"garbage"), None);
        assert_eq!(parse_exif_orientation(&[]), None);
    }

    #[test]
    fn rotation_moves_pixels_where_expected() {
        let mut image = RgbImage::new(2, 1);
        image.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        image.put_pixel(1, 0, image::Rgb([0, 255, 0]));
        let rotated = apply_orientation(image, 6);
        assert_eq!(rotated.dimensions(), (1, 2));
        assert_eq!(rotated.get_pixel(0, 0), &image::Rgb([255, 0, 0]));
        assert_eq!(rotated.get_pixel(0, 1), &image::Rgb([0, 255, 0]));
    }

    #[test]
    fn ingest_resizes_valid_images() {
        let outcome = ingest(&png_bytes(1600, 1200), "image/png");
        assert!(outcome.degraded.is_none());
        assert!(outcome.data_url.starts_with("data:image/jpeg;base64,"));
    }

    #[test]
    fn ingest_falls_back_to_the_original_bytes_on_garbage() {
        let bytes = b"definitely not an image";
        let outcome = ingest(bytes, "image/png");
        assert!(matches!(outcome.degraded, Some(PipelineError::Decode(_))));
        let payload = outcome
            .data_url
            .strip_prefix("data:image/png;base64,")
            .expect("fallback keeps the reported mime");
        assert_eq!(STANDARD.decode(payload).expect("base64"), bytes);
    }

    #[test]
    fn ingest_fallback_defaults_the_mime_when_missing() {
        let outcome = ingest(b"junk", "  ");
        assert!(outcome
            .data_url
            .starts_with("data:application/octet-stream;base64,"));
    }
}
