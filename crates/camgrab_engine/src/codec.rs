use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CodecError {
    #[error("empty payload")]
    Empty,
    #[error("failed to decode {byte_len} bytes: {message}")]
    DecodeFailure { byte_len: usize, message: String },
    #[error("failed to encode image: {message}")]
    EncodeFailure { message: String },
}

/// Turns fetched bytes into an image and back into bytes for saving.
pub trait ImageCodec: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError>;
    fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>, CodecError>;
    /// File extension for encoded output, without the dot.
    fn extension(&self) -> &str;
}

/// Decodes JPEG or PNG snapshots, always saves JPEG.
#[derive(Debug, Clone, Copy)]
pub struct JpegCodec {
    pub quality: u8,
}

impl Default for JpegCodec {
    fn default() -> Self {
        Self { quality: 90 }
    }
}

impl JpegCodec {
    pub fn with_quality(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }
}

impl ImageCodec for JpegCodec {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage, CodecError> {
        if bytes.is_empty() {
            return Err(CodecError::Empty);
        }
        image::load_from_memory(bytes).map_err(|err| CodecError::DecodeFailure {
            byte_len: bytes.len(),
            message: err.to_string(),
        })
    }

    fn encode(&self, image: &DynamicImage) -> Result<Vec<u8>, CodecError> {
        // JPEG has no alpha channel.
        let rgb = DynamicImage::ImageRgb8(image.to_rgb8());
        let mut buf = Vec::new();
        rgb.write_with_encoder(JpegEncoder::new_with_quality(&mut buf, self.quality))
            .map_err(|err| CodecError::EncodeFailure {
                message: err.to_string(),
            })?;
        Ok(buf)
    }

    fn extension(&self) -> &str {
        "jpg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    #[test]
    fn encoded_jpeg_decodes_to_same_dimensions() {
        let codec = JpegCodec::default();
        let bytes = codec.encode(&DynamicImage::new_rgb8(10, 7)).unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8]));
        let decoded = codec.decode(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (10, 7));
    }

    #[test]
    fn alpha_is_dropped_on_encode() {
        let codec = JpegCodec::default();
        let rgba = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 128]));
        let bytes = codec.encode(&DynamicImage::ImageRgba8(rgba)).unwrap();
        assert_eq!(codec.decode(&bytes).unwrap().dimensions(), (4, 4));
    }

    #[test]
    fn garbage_is_a_decode_failure() {
        let codec = JpegCodec::default();
        let err = codec.decode(b"<html>camera offline</html>").unwrap_err();
        assert!(matches!(err, CodecError::DecodeFailure { byte_len: 27, .. }));
        assert_eq!(codec.decode(&[]).unwrap_err(), CodecError::Empty);
    }

    #[test]
    fn quality_is_clamped() {
        assert_eq!(JpegCodec::with_quality(0).quality, 1);
        assert_eq!(JpegCodec::with_quality(250).quality, 100);
    }
}
