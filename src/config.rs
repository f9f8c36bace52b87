use std::path::PathBuf;

use glam::Vec3A;

use crate::error::{Error, Result};
use crate::renderer::RenderSettings;

/// Optional mesh placed in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshConfig {
    pub path: PathBuf,
    pub scale: f32,
    pub position: Vec3A,
    /// Degrees around x, y and z.
    pub rotation: Vec3A,
    pub color: Vec3A,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub width: u32,
    pub height: u32,
    /// Tile width in pixels.
    pub blocks_wide: u32,
    /// Progressive frames to accumulate.
    pub frames: u32,
    pub settings: RenderSettings,
    pub vertical_fov: f32,
    pub light_color: Vec3A,
    pub threads: Option<usize>,
    pub gamma_correct: bool,
    pub output: PathBuf,
    pub mesh: Option<MeshConfig>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            width: 512,
            height: 512,
            blocks_wide: 16,
            frames: 64,
            settings: RenderSettings::default(),
            vertical_fov: 45.0,
            light_color: Vec3A::splat(4.0),
            threads: None,
            gamma_correct: true,
            output: PathBuf::from("render.png"),
            mesh: None,
        }
    }
}

impl RenderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidResolution {
                width: self.width,
                height: self.height,
            });
        }

        if self.blocks_wide == 0 {
            return Err(Error::InvalidTileWidth);
        }

        Ok(())
    }
}
