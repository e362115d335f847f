use crate::domain::image_processor_trait::ImageProcessor;
use crate::domain::negative;
use super::error::InfrastructureError;
use image::error::{ImageFormatHint, UnsupportedError, UnsupportedErrorKind};
use image::io::Reader as ImageReader;
use image::{DynamicImage, ImageError, ImageFormat as InnerImageFormat};
use std::io::Cursor;

pub struct DefaultImageProcessor;

impl DefaultImageProcessor {
    pub fn new() -> Self {
        Self
    }

    pub fn decode(
        &self,
        image_bytes: Vec<u8>,
        input_format_opt: Option<InnerImageFormat>,
    ) -> Result<(DynamicImage, InnerImageFormat), InfrastructureError> {
        let reader = match input_format_opt {
            Some(format) => ImageReader::with_format(Cursor::new(image_bytes), format),
            None => ImageReader::new(Cursor::new(image_bytes)).with_guessed_format()?,
        };

        // マジックバイトから判定できなければ画像ではない
        let Some(format) = reader.format() else {
            return Err(InfrastructureError::DecodeError(ImageError::Unsupported(
                UnsupportedError::from_format_and_kind(
                    ImageFormatHint::Unknown,
                    UnsupportedErrorKind::Format(ImageFormatHint::Unknown),
                ),
            )));
        };

        let image = reader.decode().map_err(InfrastructureError::DecodeError)?;
        Ok((image, format))
    }

    pub fn encode(
        &self,
        image: &DynamicImage,
        output_format: InnerImageFormat,
    ) -> Result<Vec<u8>, InfrastructureError> {
        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, output_format)
            .map_err(InfrastructureError::EncodeError)?;
        Ok(buffer.into_inner())
    }
}

impl ImageProcessor for DefaultImageProcessor {
    fn invert_image(
        &self,
        image_bytes: Vec<u8>,
        input_format_opt: Option<InnerImageFormat>,
        output_format_opt: Option<InnerImageFormat>,
    ) -> Result<(Vec<u8>, InnerImageFormat), InfrastructureError> {
        let (image, input_format) = self.decode(image_bytes, input_format_opt)?;
        let inverted = negative::invert(&image)?;

        let output_format = output_format_opt.unwrap_or(input_format);
        let encoded = self.encode(&inverted, output_format)?;
        log::debug!(
            "inverted {}x{} {:?} image ({:?} -> {:?})",
            image.width(),
            image.height(),
            image.color(),
            input_format,
            output_format
        );

        Ok((encoded, output_format))
    }
}
