use crate::preprocessing::Quantize;
use image::RgbaImage;

/// Replace R, G and B with their average, leaving alpha alone.
///
/// The average is taken from the pixel's original channels before any of
/// them is overwritten.
pub fn apply(image: &RgbaImage, quantize: Quantize) -> RgbaImage {
    let mut out = image.clone();
    for pixel in out.pixels_mut() {
        let [r, g, b, _] = pixel.0;
        let avg = quantize.store((r as f64 + g as f64 + b as f64) / 3.0);
        pixel.0[0] = avg;
        pixel.0[1] = avg;
        pixel.0[2] = avg;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_grayscale_averages_original_channels() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([100, 50, 0, 255]));
        let result = apply(&img, Quantize::Truncate);
        assert_eq!(result.get_pixel(0, 0).0, [50, 50, 50, 255]);
    }

    #[test]
    fn test_grayscale_leaves_alpha() {
        let mut img = RgbaImage::new(3, 1);
        img.put_pixel(0, 0, Rgba([255, 0, 0, 0]));
        img.put_pixel(1, 0, Rgba([0, 255, 0, 17]));
        img.put_pixel(2, 0, Rgba([0, 0, 255, 200]));

        let result = apply(&img, Quantize::Truncate);

        assert_eq!(result.get_pixel(0, 0).0, [85, 85, 85, 0]);
        assert_eq!(result.get_pixel(1, 0).0, [85, 85, 85, 17]);
        assert_eq!(result.get_pixel(2, 0).0, [85, 85, 85, 200]);
    }

    #[test]
    fn test_grayscale_fraction_depends_on_quantize() {
        let img = RgbaImage::from_pixel(1, 1, Rgba([1, 1, 0, 255]));
        assert_eq!(apply(&img, Quantize::Truncate).get_pixel(0, 0).0[0], 0);
        assert_eq!(apply(&img, Quantize::RoundHalfEven).get_pixel(0, 0).0[0], 1);
    }

    #[test]
    fn test_grayscale_does_not_touch_input() {
        let img = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 40]));
        let _ = apply(&img, Quantize::Truncate);
        assert_eq!(img.get_pixel(1, 1).0, [10, 20, 30, 40]);
    }
}
