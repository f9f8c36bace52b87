//! Ray and object categories.
//!
//! Objects are tagged with a single category bit, rays carry the set of
//! categories they are allowed to hit. The intersection service only ever
//! compares the two with a bitwise and.

pub const TRIANGLE_MASK_GEOMETRY: u32 = 1;
pub const TRIANGLE_MASK_LIGHT: u32 = 2;

pub const RAY_MASK_PRIMARY: u32 = TRIANGLE_MASK_GEOMETRY | TRIANGLE_MASK_LIGHT;
pub const RAY_MASK_SHADOW: u32 = TRIANGLE_MASK_GEOMETRY;
pub const RAY_MASK_SECONDARY: u32 = TRIANGLE_MASK_GEOMETRY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectCategory {
    Geometry,
    Light,
}

impl ObjectCategory {
    pub const fn bits(self) -> u32 {
        match self {
            ObjectCategory::Geometry => TRIANGLE_MASK_GEOMETRY,
            ObjectCategory::Light => TRIANGLE_MASK_LIGHT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RayCategory {
    Primary,
    Shadow,
    /// Bounce rays. Only issued when more than one bounce is configured.
    Secondary,
}

impl RayCategory {
    pub const fn mask(self) -> RayMask {
        match self {
            RayCategory::Primary => RayMask(RAY_MASK_PRIMARY),
            RayCategory::Shadow => RayMask(RAY_MASK_SHADOW),
            RayCategory::Secondary => RayMask(RAY_MASK_SECONDARY),
        }
    }
}

/// Opaque visibility mask handed to the intersection service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RayMask(u32);

impl RayMask {
    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn accepts(self, category: ObjectCategory) -> bool {
        self.0 & category.bits() != 0
    }
}

impl From<RayCategory> for RayMask {
    fn from(category: RayCategory) -> Self {
        category.mask()
    }
}

pub const fn allowed(ray: RayCategory, object: ObjectCategory) -> bool {
    ray.mask().accepts(object)
}
