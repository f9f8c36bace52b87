use std::path::Path;

use glam::Vec3A;
use image::{ImageBuffer, Rgb, Rgb32FImage, Rgba, RgbaImage};
use log::info;

use crate::error::{Error, Result};

/// Clamped display conversion, with optional 2.2 gamma.
pub fn to_rgba(mut color: Vec3A, gamma_correct: bool) -> [u8; 4] {
    if !color.is_finite() {
        color = Vec3A::ZERO;
    }

    color = color.clamp(Vec3A::ZERO, Vec3A::ONE);
    if gamma_correct {
        color = color.powf(1.0 / 2.2);
    }

    color *= 255.0;
    [
        color.x.round() as u8,
        color.y.round() as u8,
        color.z.round() as u8,
        255,
    ]
}

fn check_size(pixels: &[Vec3A], width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::InvalidResolution { width, height });
    }

    let expected = width as usize * height as usize;
    if pixels.len() != expected {
        return Err(Error::FrameSizeMismatch {
            expected,
            got: pixels.len(),
        });
    }

    Ok(())
}

pub fn to_rgba_image(
    pixels: &[Vec3A],
    width: u32,
    height: u32,
    gamma_correct: bool,
) -> Result<RgbaImage> {
    check_size(pixels, width, height)?;

    Ok(ImageBuffer::from_fn(width, height, |x, y| {
        Rgba(to_rgba(pixels[(x + y * width) as usize], gamma_correct))
    }))
}

pub fn to_hdr_image(pixels: &[Vec3A], width: u32, height: u32) -> Result<Rgb32FImage> {
    check_size(pixels, width, height)?;

    Ok(ImageBuffer::from_fn(width, height, |x, y| {
        Rgb(pixels[(x + y * width) as usize].to_array())
    }))
}

/// Writes the image, as floats for `.hdr` and `.exr` and as tonemapped 8 bit
/// otherwise.
pub fn save_image(
    path: impl AsRef<Path>,
    pixels: &[Vec3A],
    width: u32,
    height: u32,
    gamma_correct: bool,
) -> Result<()> {
    let path = path.as_ref();

    let is_float = path
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            extension.eq_ignore_ascii_case("hdr") || extension.eq_ignore_ascii_case("exr")
        });

    if is_float {
        to_hdr_image(pixels, width, height)?.save(path)?;
    } else {
        to_rgba_image(pixels, width, height, gamma_correct)?.save(path)?;
    }

    info!("saved {}x{} image to {}", width, height, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::vec3a;

    #[test]
    fn hdr_values_are_clamped_for_display() {
        assert_eq!(to_rgba(vec3a(2.0, 0.5, -1.0), false), [255, 128, 0, 255]);
        assert_eq!(to_rgba(Vec3A::splat(f32::NAN), false), [0, 0, 0, 255]);
        assert_eq!(to_rgba(Vec3A::ONE, true), [255, 255, 255, 255]);
        assert!(to_rgba(Vec3A::splat(0.2), true)[0] > to_rgba(Vec3A::splat(0.2), false)[0]);
    }

    #[test]
    fn images_are_row_major() {
        let pixels = [Vec3A::ZERO, Vec3A::X, Vec3A::Y, Vec3A::Z];
        let image = to_rgba_image(&pixels, 2, 2, false).expect("sizes match");

        assert_eq!(image.get_pixel(1, 0).0, [255, 0, 0, 255]);
        assert_eq!(image.get_pixel(0, 1).0, [0, 255, 0, 255]);

        assert!(matches!(
            to_rgba_image(&pixels, 3, 2, false),
            Err(Error::FrameSizeMismatch { expected: 6, got: 4 })
        ));
    }

    #[test]
    fn saves_png_and_hdr() {
        let dir = tempfile::tempdir().expect("temp dir");
        let pixels = vec![vec3a(0.5, 1.5, 0.25); 6];

        let png = dir.path().join("frame.png");
        save_image(&png, &pixels, 3, 2, true).expect("png");
        let decoded = image::open(&png).expect("readable png").to_rgba8();
        assert_eq!(decoded.dimensions(), (3, 2));

        let hdr = dir.path().join("frame.hdr");
        save_image(&hdr, &pixels, 3, 2, false).expect("hdr");
        let decoded = image::open(&hdr).expect("readable hdr").to_rgb32f();
        assert!((decoded.get_pixel(0, 0).0[1] - 1.5).abs() < 0.05);
    }
}
