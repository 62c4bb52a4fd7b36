use crate::preprocessing::Quantize;
use image::RgbaImage;

/// Channels strictly below this value are halved
pub const DARK_THRESHOLD: u8 = 128;

/// Darken dark tones: every R, G, B value below [`DARK_THRESHOLD`] is
/// multiplied by 0.5, anything else is kept. Alpha is never read.
///
/// Applying this twice keeps halving, so it is not idempotent.
pub fn apply(image: &RgbaImage, quantize: Quantize) -> RgbaImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        for channel in pixel.0.iter_mut().take(3) {
            if *channel < DARK_THRESHOLD {
                *channel = quantize.store(*channel as f64 * 0.5);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_contrast_halves_dark_values() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([50, 50, 50, 255]));
        let result = apply(&img, Quantize::Truncate);
        assert_eq!(result.get_pixel(0, 0).0, [25, 25, 25, 255]);
    }

    #[test]
    fn test_contrast_keeps_light_values() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([128, 128, 128, 255]));
        img.put_pixel(1, 0, Rgba([200, 200, 200, 255]));

        let result = apply(&img, Quantize::Truncate);

        assert_eq!(result.get_pixel(0, 0).0, [128, 128, 128, 255]);
        assert_eq!(result.get_pixel(1, 0).0, [200, 200, 200, 255]);
    }

    #[test]
    fn test_contrast_boundary() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([127, 127, 127, 9]));
        let result = apply(&img, Quantize::Truncate);
        assert_eq!(result.get_pixel(0, 0).0, [63, 63, 63, 9]);
    }

    #[test]
    fn test_contrast_channels_are_independent() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([10, 130, 51, 3]));
        assert_eq!(
            apply(&img, Quantize::Truncate).get_pixel(0, 0).0,
            [5, 130, 25, 3]
        );
        assert_eq!(
            apply(&img, Quantize::RoundHalfEven).get_pixel(0, 0).0,
            [5, 130, 26, 3]
        );
    }

    #[test]
    fn test_contrast_single_application_only() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([100, 100, 100, 255]));
        let once = apply(&img, Quantize::Truncate);
        let twice = apply(&once, Quantize::Truncate);
        assert_eq!(once.get_pixel(0, 0).0[0], 50);
        assert_eq!(twice.get_pixel(0, 0).0[0], 25);
    }
}
