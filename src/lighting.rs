//! Direct illumination from the area light.

use std::f32::consts::PI;

use glam::{Vec2, Vec3A};

use crate::buffers::AreaLight;
use crate::intersect::{Intersector, Ray};
use crate::mask::RayCategory;

/// Offset along the surface normal for the shadow ray origin.
pub const SHADOW_RAY_BIAS: f32 = 1e-3;
/// Shortening of the shadow ray so it stops before the sampled light point.
pub const SHADOW_RAY_END_BIAS: f32 = 1e-3;
/// Light samples closer than this contribute nothing.
pub const MIN_LIGHT_DISTANCE: f32 = 1e-4;

/// A surface point being shaded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfacePoint {
    pub position: Vec3A,
    pub normal: Vec3A,
    pub albedo: Vec3A,
}

/// Point on the light quad for a sample in [0, 1)^2.
pub fn sample_light_point(light: &AreaLight, sample: Vec2) -> Vec3A {
    light.position()
        + (sample.x * 2.0 - 1.0) * light.right()
        + (sample.y * 2.0 - 1.0) * light.up()
}

/// One sample estimate of the radiance reflected at `surface` from the light.
///
/// Returns zero for back facing configurations, occluded samples and any
/// degenerate or non-finite input.
pub fn direct_lighting<I: Intersector + ?Sized>(
    scene: &I,
    surface: &SurfacePoint,
    light: &AreaLight,
    sample: Vec2,
) -> Vec3A {
    let normal = surface.normal.normalize_or_zero();
    let light_area = light.area();

    if normal == Vec3A::ZERO || !(light_area > 0.0) || !light_area.is_finite() {
        return Vec3A::ZERO;
    }

    let light_point = sample_light_point(light, sample);
    let to_light = light_point - surface.position;
    let distance = to_light.length();

    if !(distance > MIN_LIGHT_DISTANCE) || !distance.is_finite() {
        return Vec3A::ZERO;
    }

    let direction = to_light / distance;
    let light_normal = light.forward().normalize_or_zero();

    let surface_cosine = normal.dot(direction);
    let light_cosine = light_normal.dot(-direction);

    if surface_cosine <= 0.0 || light_cosine <= 0.0 {
        return Vec3A::ZERO;
    }

    let shadow_ray = Ray::with_max_distance(
        surface.position + normal * SHADOW_RAY_BIAS,
        direction,
        distance - SHADOW_RAY_END_BIAS,
    );

    if scene.occluded(&shadow_ray, RayCategory::Shadow.mask()) {
        return Vec3A::ZERO;
    }

    let radiance = light.color() * surface.albedo * surface_cosine * light_cosine * light_area
        / (PI * distance * distance);

    if radiance.is_finite() {
        radiance
    } else {
        Vec3A::ZERO
    }
}
