//! The boundary between the shading core and whatever acceleration structure
//! answers ray queries.

use glam::Vec3A;

use crate::mask::{ObjectCategory, RayMask};

/// Hits closer than this are treated as self intersections and ignored.
pub const MIN_HIT_DISTANCE: f32 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3A,
    pub direction: Vec3A,
    pub max_distance: f32,
}

impl Ray {
    pub fn new(origin: Vec3A, direction: Vec3A) -> Ray {
        Ray {
            origin,
            direction,
            max_distance: f32::INFINITY,
        }
    }

    pub fn with_max_distance(origin: Vec3A, direction: Vec3A, max_distance: f32) -> Ray {
        Ray {
            origin,
            direction,
            max_distance,
        }
    }

    pub fn at(&self, distance: f32) -> Vec3A {
        self.origin + self.direction * distance
    }

    pub fn accepts_distance(&self, distance: f32) -> bool {
        distance > MIN_HIT_DISTANCE && distance < self.max_distance
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    pub distance: f32,
    pub category: ObjectCategory,
    pub normal: Vec3A,
    /// Diffuse albedo for geometry, emitted radiance for lights.
    pub color: Vec3A,
}

impl Hit {
    pub fn albedo(&self) -> Vec3A {
        match self.category {
            ObjectCategory::Geometry => self.color,
            ObjectCategory::Light => Vec3A::ZERO,
        }
    }

    pub fn emission(&self) -> Vec3A {
        match self.category {
            ObjectCategory::Geometry => Vec3A::ZERO,
            ObjectCategory::Light => self.color,
        }
    }
}

/// Nearest hit queries under a visibility mask.
///
/// Implementations must be deterministic for a given ray, mask and scene, and
/// must never report a hit on an object whose category the mask excludes.
pub trait Intersector: Sync {
    fn intersect(&self, ray: &Ray, mask: RayMask) -> Option<Hit>;

    /// Any hit query, used for shadow rays.
    fn occluded(&self, ray: &Ray, mask: RayMask) -> bool {
        self.intersect(ray, mask).is_some()
    }
}

impl<T: Intersector + ?Sized> Intersector for &T {
    fn intersect(&self, ray: &Ray, mask: RayMask) -> Option<Hit> {
        (**self).intersect(ray, mask)
    }

    fn occluded(&self, ray: &Ray, mask: RayMask) -> bool {
        (**self).occluded(ray, mask)
    }
}
