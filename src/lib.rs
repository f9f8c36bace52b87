//! Progressive ray tracer for triangle scenes lit by a single area light.
//!
//! Every frame casts one jittered primary ray per pixel, shades hits with a
//! shadow tested sample of the area light and folds the result into a running
//! per pixel mean. The image is split into column stripes that are shaded in
//! parallel with rayon.

pub mod accumulator;
pub mod buffers;
pub mod camera;
pub mod config;
pub mod define_scene;
pub mod dispatch;
pub mod error;
pub mod image_output;
pub mod intersect;
pub mod lighting;
pub mod mask;
pub mod renderer;
pub mod sampling;
pub mod triangle_object;

pub use buffers::{AreaLight, Camera, Uniforms};
pub use error::{Error, Result};
pub use intersect::{Hit, Intersector, Ray};
pub use mask::{allowed, ObjectCategory, RayCategory, RayMask};
pub use renderer::{FrameSetup, FrameStatus, RenderSettings, Renderer};
pub use triangle_object::TriangleScene;
