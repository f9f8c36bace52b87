use std::f32::consts::PI;

use glam::{vec2, vec3a, Vec2, Vec3A};

/// Per pixel random stream.
///
/// Seeded from the pixel index and the frame index only, so a frame can be
/// re-rendered bit for bit no matter how the image was split into tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sampler {
    seed: u32,
    counter: u32,
}

impl Sampler {
    pub fn new(pixel_index: u32, frame_index: u32) -> Sampler {
        let mut frame_seed = frame_index ^ 0x9e37_79b9;
        let frame_hash = pcg_hash(&mut frame_seed);

        Sampler {
            seed: pixel_index.wrapping_mul(0x85eb_ca6b) ^ frame_hash,
            counter: 0,
        }
    }

    pub fn next_u32(&mut self) -> u32 {
        let mut state = self
            .seed
            .wrapping_add(self.counter.wrapping_mul(0x9e37_79b9));
        self.counter = self.counter.wrapping_add(1);

        pcg_hash(&mut state)
    }

    /// Uniform value in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        // 24 bits fit the f32 mantissa exactly, so the result never rounds up to 1.0
        (self.next_u32() >> 8) as f32 / (1u32 << 24) as f32
    }

    pub fn next_vec2(&mut self) -> Vec2 {
        let x = self.next_f32();
        let y = self.next_f32();
        vec2(x, y)
    }
}

/// Cosine weighted direction around `normal`, pdf = cos(theta) / pi.
pub fn cosine_hemisphere(normal: Vec3A, sample: Vec2) -> Vec3A {
    let radius = sample.x.sqrt();
    let phi = 2.0 * PI * sample.y;
    let local = vec3a(
        radius * phi.cos(),
        radius * phi.sin(),
        (1.0 - sample.x).max(0.0).sqrt(),
    );

    let (tangent, bitangent) = orthonormal_basis(normal);
    (tangent * local.x + bitangent * local.y + normal * local.z).normalize_or_zero()
}

// Duff et al., "Building an Orthonormal Basis, Revisited"
fn orthonormal_basis(n: Vec3A) -> (Vec3A, Vec3A) {
    let sign = 1.0_f32.copysign(n.z);
    let a = -1.0 / (sign + n.z);
    let b = n.x * n.y * a;

    (
        vec3a(1.0 + sign * n.x * n.x * a, sign * b, -sign * n.x),
        vec3a(b, sign + n.y * n.y * a, -n.y),
    )
}

pub fn pcg_hash(seed: &mut u32) -> u32 {
    let state = seed.wrapping_mul(747796405).wrapping_add(2891336453);
    let word = ((state >> ((state >> 28) + 4)) ^ state).wrapping_mul(277803737);

    *seed = (word >> 22) ^ word;

    *seed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_pixel_and_frame_give_same_stream() {
        let mut a = Sampler::new(17, 3);
        let mut b = Sampler::new(17, 3);

        for _ in 0..32 {
            assert_eq!(a.next_f32().to_bits(), b.next_f32().to_bits());
        }
    }

    #[test]
    fn streams_differ_between_frames_and_pixels() {
        let first = Sampler::new(5, 0).next_vec2();
        assert_ne!(first, Sampler::new(5, 1).next_vec2());
        assert_ne!(first, Sampler::new(6, 0).next_vec2());
    }

    #[test]
    fn hemisphere_directions_face_the_normal() {
        let mut sampler = Sampler::new(9, 2);
        let normal = vec3a(0.3, -0.8, 0.2).normalize();

        for _ in 0..256 {
            let direction = cosine_hemisphere(normal, sampler.next_vec2());
            assert!((direction.length() - 1.0).abs() < 1e-4);
            assert!(direction.dot(normal) >= -1e-4);
        }
    }

    #[test]
    fn values_stay_in_unit_interval() {
        let mut sampler = Sampler::new(0, 0);
        let mut sum = 0.0;
        let n = 10_000;

        for _ in 0..n {
            let value = sampler.next_f32();
            assert!((0.0..1.0).contains(&value));
            sum += value;
        }

        let mean = sum / n as f32;
        assert!((mean - 0.5).abs() < 0.02, "mean {mean}");
    }
}
