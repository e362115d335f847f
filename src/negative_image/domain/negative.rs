use image::{DynamicImage, ImageBuffer, Pixel, Primitive};

use crate::domain::error::DomainError;
use crate::domain::channel_layout::ChannelLayout;

// 色チャンネルだけ max - v に反転する (8bit: 255, 16bit: 65535, float: 1.0)
// アルファはそのままコピー。サイズ・チャンネル数・ビット深度は変えない
pub fn invert(image: &DynamicImage) -> Result<DynamicImage, DomainError> {
    let layout = ChannelLayout::of(image.color())?;

    let inverted = match image {
        DynamicImage::ImageLuma8(buffer) => DynamicImage::ImageLuma8(invert_buffer(buffer, layout)),
        DynamicImage::ImageRgb8(buffer) => DynamicImage::ImageRgb8(invert_buffer(buffer, layout)),
        DynamicImage::ImageRgba8(buffer) => DynamicImage::ImageRgba8(invert_buffer(buffer, layout)),
        DynamicImage::ImageLuma16(buffer) => DynamicImage::ImageLuma16(invert_buffer(buffer, layout)),
        DynamicImage::ImageRgb16(buffer) => DynamicImage::ImageRgb16(invert_buffer(buffer, layout)),
        DynamicImage::ImageRgba16(buffer) => DynamicImage::ImageRgba16(invert_buffer(buffer, layout)),
        DynamicImage::ImageRgb32F(buffer) => DynamicImage::ImageRgb32F(invert_buffer(buffer, layout)),
        DynamicImage::ImageRgba32F(buffer) => DynamicImage::ImageRgba32F(invert_buffer(buffer, layout)),
        other => {
            return Err(DomainError::UnsupportedFormat {
                channels: other.color().channel_count(),
                detail: format!("{:?}", other.color()),
            })
        }
    };

    Ok(inverted)
}

pub fn invert_sample<T: Primitive>(value: T) -> T {
    T::DEFAULT_MAX_VALUE - value
}

fn invert_buffer<P>(
    buffer: &ImageBuffer<P, Vec<P::Subpixel>>,
    layout: ChannelLayout,
) -> ImageBuffer<P, Vec<P::Subpixel>>
where
    P: Pixel,
{
    let mut inverted = buffer.clone();
    let color_channels = layout.color_channels();

    for pixel in inverted.chunks_exact_mut(layout.channel_count()) {
        for sample in &mut pixel[..color_channels] {
            *sample = invert_sample(*sample);
        }
    }

    inverted
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayAlphaImage, GrayImage, ImageBuffer, Luma, Rgb, RgbImage, Rgba, RgbaImage};
    use proptest::prelude::*;

    fn from_raw(channels: usize, width: u32, height: u32, data: Vec<u8>) -> DynamicImage {
        match channels {
            1 => DynamicImage::ImageLuma8(GrayImage::from_raw(width, height, data).unwrap()),
            3 => DynamicImage::ImageRgb8(RgbImage::from_raw(width, height, data).unwrap()),
            4 => DynamicImage::ImageRgba8(RgbaImage::from_raw(width, height, data).unwrap()),
            n => panic!("no 8-bit test raster with {} channels", n),
        }
    }

    fn supported_raster() -> impl Strategy<Value = DynamicImage> {
        (prop::sample::select(vec![1usize, 3, 4]), 1u32..6, 1u32..6).prop_flat_map(
            |(channels, width, height)| {
                prop::collection::vec(any::<u8>(), (width * height) as usize * channels)
                    .prop_map(move |data| from_raw(channels, width, height, data))
            },
        )
    }

    fn from_raw16(channels: usize, width: u32, height: u32, data: Vec<u16>) -> DynamicImage {
        match channels {
            1 => DynamicImage::ImageLuma16(ImageBuffer::<Luma<u16>, _>::from_raw(width, height, data).unwrap()),
            3 => DynamicImage::ImageRgb16(ImageBuffer::<Rgb<u16>, _>::from_raw(width, height, data).unwrap()),
            4 => DynamicImage::ImageRgba16(ImageBuffer::<Rgba<u16>, _>::from_raw(width, height, data).unwrap()),
            n => panic!("no 16-bit test raster with {} channels", n),
        }
    }

    fn samples16(image: &DynamicImage) -> Vec<u16> {
        match image {
            DynamicImage::ImageLuma16(buffer) => buffer.as_raw().clone(),
            DynamicImage::ImageRgb16(buffer) => buffer.as_raw().clone(),
            DynamicImage::ImageRgba16(buffer) => buffer.as_raw().clone(),
            other => panic!("not a 16-bit test raster: {:?}", other.color()),
        }
    }

    fn supported_raster16() -> impl Strategy<Value = DynamicImage> {
        (prop::sample::select(vec![1usize, 3, 4]), 1u32..5, 1u32..5).prop_flat_map(
            |(channels, width, height)| {
                prop::collection::vec(any::<u16>(), (width * height) as usize * channels)
                    .prop_map(move |data| from_raw16(channels, width, height, data))
            },
        )
    }

    #[test]
    fn test_invert_grayscale_2x2() {
        let image = from_raw(1, 2, 2, vec![0, 128, 255, 64]);

        let inverted = invert(&image).unwrap();

        assert_eq!(inverted.as_bytes(), &[255, 127, 0, 191]);
    }

    #[test]
    fn test_invert_rgba_keeps_opacity() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1, 1, Rgba([10, 20, 30, 200])));

        let inverted = invert(&image).unwrap().to_rgba8();

        assert_eq!(inverted.get_pixel(0, 0), &Rgba([245, 235, 225, 200]));
    }

    #[test]
    fn test_invert_rgb_touches_every_channel() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 1, Rgb([0, 100, 255])));

        let inverted = invert(&image).unwrap();

        assert_eq!(inverted.as_bytes(), &[255, 155, 0, 255, 155, 0, 255, 155, 0]);
    }

    #[test]
    fn test_invert_16bit_uses_full_range() {
        let gray: ImageBuffer<Luma<u16>, Vec<u16>> = ImageBuffer::from_pixel(1, 1, Luma([1000]));
        let rgba: ImageBuffer<Rgba<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(1, 1, Rgba([0, 1, 65535, 4242]));

        let gray = invert(&DynamicImage::ImageLuma16(gray)).unwrap().into_luma16();
        let rgba = invert(&DynamicImage::ImageRgba16(rgba)).unwrap().into_rgba16();

        assert_eq!(gray.get_pixel(0, 0), &Luma([64535]));
        assert_eq!(rgba.get_pixel(0, 0), &Rgba([65535, 65534, 0, 4242]));
    }

    #[test]
    fn test_invert_float_subtracts_from_one() {
        let image: ImageBuffer<Rgba<f32>, Vec<f32>> =
            ImageBuffer::from_pixel(1, 1, Rgba([0.0, 0.25, 1.0, 0.5]));

        let inverted = invert(&DynamicImage::ImageRgba32F(image)).unwrap().into_rgba32f();

        assert_eq!(inverted.get_pixel(0, 0), &Rgba([1.0, 0.75, 0.0, 0.5]));
    }

    #[test]
    fn test_invert_rejects_gray_alpha() {
        let image = DynamicImage::ImageLumaA8(GrayAlphaImage::new(2, 2));

        match invert(&image) {
            Err(DomainError::UnsupportedFormat { channels, .. }) => assert_eq!(channels, 2),
            other => panic!("Expected UnsupportedFormat, got {:?}", other),
        }
    }

    #[test]
    fn test_invert_leaves_input_untouched() {
        let image = from_raw(3, 1, 1, vec![1, 2, 3]);

        let _ = invert(&image).unwrap();

        assert_eq!(image.as_bytes(), &[1, 2, 3]);
    }

    #[test]
    fn test_invert_sample_bounds() {
        assert_eq!(invert_sample(0u8), 255);
        assert_eq!(invert_sample(255u8), 0);
        assert_eq!(invert_sample(0u16), u16::MAX);
    }

    proptest! {
        #[test]
        fn double_inversion_restores_input(image in supported_raster()) {
            let twice = invert(&invert(&image).unwrap()).unwrap();

            prop_assert_eq!(twice.color(), image.color());
            prop_assert_eq!(twice.as_bytes(), image.as_bytes());
        }

        #[test]
        fn double_inversion_restores_16bit_input(image in supported_raster16()) {
            let once = invert(&image).unwrap();
            let twice = invert(&once).unwrap();
            let channels = image.color().channel_count() as usize;

            prop_assert_eq!(twice.color(), image.color());
            prop_assert_eq!(samples16(&twice), samples16(&image));

            let before = samples16(&image);
            let after = samples16(&once);
            for (input, output) in before.chunks_exact(channels).zip(after.chunks_exact(channels)) {
                for c in 0..channels {
                    if channels == 4 && c == 3 {
                        prop_assert_eq!(output[c], input[c]);
                    } else {
                        prop_assert_eq!(output[c], u16::MAX - input[c]);
                    }
                }
            }
        }

        #[test]
        fn inversion_preserves_shape_and_opacity(image in supported_raster()) {
            let inverted = invert(&image).unwrap();
            let channels = image.color().channel_count() as usize;

            prop_assert_eq!(inverted.width(), image.width());
            prop_assert_eq!(inverted.height(), image.height());
            prop_assert_eq!(inverted.color(), image.color());

            let before = image.as_bytes().chunks_exact(channels);
            let after = inverted.as_bytes().chunks_exact(channels);
            for (input, output) in before.zip(after) {
                for c in 0..channels {
                    if channels == 4 && c == 3 {
                        prop_assert_eq!(output[c], input[c]);
                    } else {
                        prop_assert_eq!(output[c], 255 - input[c]);
                    }
                }
            }
        }
    }
}
