use std::sync::atomic::AtomicBool;
use std::time::Instant;

use glam::Vec3A;
use log::{debug, info, warn};

use crate::accumulator::Accumulator;
use crate::buffers::{AreaLight, Camera, Uniforms};
use crate::camera::primary_ray;
use crate::dispatch::dispatch_tiles;
use crate::error::{Error, Result};
use crate::intersect::{Intersector, Ray};
use crate::lighting::{direct_lighting, SurfacePoint, SHADOW_RAY_BIAS};
use crate::mask::{ObjectCategory, RayCategory};
use crate::sampling::{cosine_hemisphere, Sampler};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderSettings {
    /// Path vertices shaded per pixel. 1 means primary hit plus direct light.
    pub max_bounces: u32,
    /// Shadow rays averaged per shading event.
    pub light_samples: u32,
}

impl Default for RenderSettings {
    fn default() -> Self {
        RenderSettings {
            max_bounces: 1,
            light_samples: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// The frame was folded into the accumulated image.
    Committed { frame_index: u32 },
    /// The frame was cancelled in flight and nothing was committed.
    Abandoned,
}

/// Radiance estimate for one pixel of one frame.
///
/// Depends only on its arguments, so any split of the image into tiles gives
/// the same result for the pixel.
pub fn shade_pixel<I: Intersector + ?Sized>(
    scene: &I,
    uniforms: &Uniforms,
    settings: &RenderSettings,
    x: u32,
    y: u32,
) -> Vec3A {
    let pixel_index = x + y * uniforms.width;
    let mut sampler = Sampler::new(pixel_index, uniforms.frame_index);

    let jitter = sampler.next_vec2();
    let mut ray = primary_ray(&uniforms.camera, x, y, jitter, uniforms.width, uniforms.height);
    let mut ray_category = RayCategory::Primary;

    let mut throughput = Vec3A::ONE;
    let mut radiance = Vec3A::ZERO;
    let light_samples = settings.light_samples.max(1);

    for _ in 0..settings.max_bounces.max(1) {
        let Some(hit) = scene.intersect(&ray, ray_category.mask()) else {
            break;
        };

        if hit.category == ObjectCategory::Light {
            // only the front of the emitter is visible
            if ray.direction.dot(hit.normal) < 0.0 {
                radiance += throughput * hit.emission();
            }
            break;
        }

        let surface = SurfacePoint {
            position: ray.at(hit.distance),
            normal: hit.normal,
            albedo: hit.albedo(),
        };

        let mut direct = Vec3A::ZERO;
        for _ in 0..light_samples {
            direct += direct_lighting(scene, &surface, &uniforms.light, sampler.next_vec2());
        }
        radiance += throughput * direct / light_samples as f32;

        // cosine sampled diffuse bounce, the albedo is the whole path weight
        throughput *= surface.albedo;
        if throughput == Vec3A::ZERO {
            break;
        }

        let normal = surface.normal.normalize_or_zero();
        ray = Ray::new(
            surface.position + normal * SHADOW_RAY_BIAS,
            cosine_hemisphere(normal, sampler.next_vec2()),
        );
        ray_category = RayCategory::Secondary;
    }

    if radiance.is_finite() {
        radiance
    } else {
        Vec3A::ZERO
    }
}

/// Renders frames through the tiled pipeline and accumulates them.
#[derive(Debug)]
pub struct Renderer {
    pub settings: RenderSettings,
    accumulator: Accumulator,
    thread_pool: Option<rayon::ThreadPool>,
}

impl Renderer {
    pub fn new(settings: RenderSettings) -> Renderer {
        Renderer {
            settings,
            accumulator: Accumulator::default(),
            thread_pool: None,
        }
    }

    /// Runs the tiles on `thread_pool` instead of the global rayon pool.
    pub fn with_thread_pool(mut self, thread_pool: rayon::ThreadPool) -> Renderer {
        self.thread_pool = Some(thread_pool);
        self
    }

    pub fn accumulated_image(&self) -> &[Vec3A] {
        self.accumulator.image()
    }

    pub fn accumulator(&self) -> &Accumulator {
        &self.accumulator
    }

    pub fn render_frame<I: Intersector + ?Sized>(
        &mut self,
        scene: &I,
        uniforms: &Uniforms,
    ) -> Result<FrameStatus> {
        self.render_frame_cancellable(scene, uniforms, &AtomicBool::new(false))
    }

    /// Renders and commits one frame unless `cancel` is raised before every
    /// tile finished, in which case the accumulated image is left as it was.
    pub fn render_frame_cancellable<I: Intersector + ?Sized>(
        &mut self,
        scene: &I,
        uniforms: &Uniforms,
        cancel: &AtomicBool,
    ) -> Result<FrameStatus> {
        if uniforms.width == 0 || uniforms.height == 0 {
            return Err(Error::InvalidResolution {
                width: uniforms.width,
                height: uniforms.height,
            });
        }
        if uniforms.blocks_wide == 0 {
            return Err(Error::InvalidTileWidth);
        }

        let start_time = Instant::now();
        let settings = self.settings;

        let render = || {
            dispatch_tiles(
                uniforms.width,
                uniforms.height,
                uniforms.blocks_wide,
                cancel,
                |x, y| shade_pixel(scene, uniforms, &settings, x, y),
            )
        };

        let frame = match &self.thread_pool {
            Some(thread_pool) => thread_pool.install(render),
            None => render(),
        };

        let Some(frame) = frame else {
            warn!("frame {} abandoned", uniforms.frame_index);
            return Ok(FrameStatus::Abandoned);
        };

        self.accumulator.commit(&frame, uniforms.frame_index)?;

        debug!(
            "frame {} rendered in {:.2} ms",
            uniforms.frame_index,
            start_time.elapsed().as_micros() as f32 / 1000.0
        );

        Ok(FrameStatus::Committed {
            frame_index: uniforms.frame_index,
        })
    }
}

/// Builds the [`Uniforms`] for each frame and owns the frame counter.
///
/// The counter goes back to 0 whenever the camera, the light or the
/// resolution differ from the previous frame, or after an abandoned frame.
#[derive(Debug, Clone)]
pub struct FrameSetup {
    pub blocks_wide: u32,
    previous: Option<Uniforms>,
    frame_index: u32,
}

impl FrameSetup {
    pub fn new(blocks_wide: u32) -> FrameSetup {
        FrameSetup {
            blocks_wide,
            previous: None,
            frame_index: 0,
        }
    }

    pub fn next_uniforms(
        &mut self,
        width: u32,
        height: u32,
        camera: Camera,
        light: AreaLight,
    ) -> Uniforms {
        let changed = match &self.previous {
            Some(previous) => {
                previous.width != width
                    || previous.height != height
                    || previous.camera != camera
                    || previous.light != light
            }
            None => true,
        };

        if changed && self.frame_index != 0 {
            info!("view changed, restarting accumulation");
            self.frame_index = 0;
        }

        let uniforms = Uniforms {
            width,
            height,
            blocks_wide: self.blocks_wide,
            frame_index: self.frame_index,
            camera,
            light,
        };

        self.previous = Some(uniforms);
        uniforms
    }

    /// Advances the counter after `status` was returned for the last uniforms.
    pub fn finish_frame(&mut self, status: FrameStatus) {
        match status {
            FrameStatus::Committed { frame_index } => self.frame_index = frame_index + 1,
            FrameStatus::Abandoned => self.reset(),
        }
    }

    pub fn reset(&mut self) {
        self.frame_index = 0;
        self.previous = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intersect::Hit;
    use crate::mask::RayMask;
    use glam::vec3a;

    /// Infinite plane at z = -1 facing the camera, optionally emissive.
    struct Wall {
        category: ObjectCategory,
    }

    impl Intersector for Wall {
        fn intersect(&self, ray: &Ray, mask: RayMask) -> Option<Hit> {
            if !mask.accepts(self.category) || ray.direction.z >= 0.0 {
                return None;
            }
            let distance = (-1.0 - ray.origin.z) / ray.direction.z;
            ray.accepts_distance(distance).then(|| Hit {
                distance,
                category: self.category,
                normal: Vec3A::Z,
                color: Vec3A::splat(2.0),
            })
        }
    }

    fn uniforms(frame_index: u32) -> Uniforms {
        Uniforms {
            width: 4,
            height: 2,
            blocks_wide: 2,
            frame_index,
            camera: Camera::new(Vec3A::ZERO, Vec3A::X, Vec3A::Y, -Vec3A::Z),
            light: AreaLight::new(
                vec3a(0.0, 0.0, -0.5),
                -Vec3A::Z,
                vec3a(0.1, 0.0, 0.0),
                vec3a(0.0, 0.1, 0.0),
                Vec3A::ONE,
            ),
        }
    }

    #[test]
    fn primary_rays_see_emitters() {
        let wall = Wall {
            category: ObjectCategory::Light,
        };
        let color = shade_pixel(&wall, &uniforms(0), &RenderSettings::default(), 1, 1);
        assert_eq!(color, Vec3A::splat(2.0));
    }

    #[test]
    fn misses_are_black() {
        let wall = Wall {
            category: ObjectCategory::Geometry,
        };
        let mut looking_away = uniforms(0);
        looking_away.camera.forward = Vec3A::Z.into();

        let color = shade_pixel(&wall, &looking_away, &RenderSettings::default(), 2, 1);
        assert_eq!(color, Vec3A::ZERO);
    }

    #[test]
    fn zero_sized_frames_are_rejected() {
        let wall = Wall {
            category: ObjectCategory::Geometry,
        };
        let mut renderer = Renderer::new(RenderSettings::default());

        let mut empty = uniforms(0);
        empty.width = 0;
        assert!(matches!(
            renderer.render_frame(&wall, &empty),
            Err(Error::InvalidResolution { .. })
        ));

        let mut no_tiles = uniforms(0);
        no_tiles.blocks_wide = 0;
        assert!(matches!(
            renderer.render_frame(&wall, &no_tiles),
            Err(Error::InvalidTileWidth)
        ));
    }

    #[test]
    fn abandoned_frame_commits_nothing() {
        let wall = Wall {
            category: ObjectCategory::Light,
        };
        let mut renderer = Renderer::new(RenderSettings::default());
        renderer
            .render_frame(&wall, &uniforms(0))
            .expect("first frame");
        let before = renderer.accumulated_image().to_vec();

        let cancel = AtomicBool::new(true);
        let status = renderer
            .render_frame_cancellable(&wall, &uniforms(1), &cancel)
            .expect("cancelled frames are not errors");

        assert_eq!(status, FrameStatus::Abandoned);
        assert_eq!(renderer.accumulated_image(), before.as_slice());
        assert_eq!(renderer.accumulator().frame_count(), 1);
    }

    #[test]
    fn frame_setup_counts_and_resets() {
        let base = uniforms(0);
        let mut setup = FrameSetup::new(2);

        let first = setup.next_uniforms(4, 2, base.camera, base.light);
        assert_eq!(first.frame_index, 0);
        setup.finish_frame(FrameStatus::Committed { frame_index: 0 });

        let second = setup.next_uniforms(4, 2, base.camera, base.light);
        assert_eq!(second.frame_index, 1);
        setup.finish_frame(FrameStatus::Committed { frame_index: 1 });

        let mut moved = base.camera;
        moved.position = [0.0, 0.0, 1.0];
        let third = setup.next_uniforms(4, 2, moved, base.light);
        assert_eq!(third.frame_index, 0);
        setup.finish_frame(FrameStatus::Committed { frame_index: 0 });

        let resized = setup.next_uniforms(8, 2, moved, base.light);
        assert_eq!(resized.frame_index, 0);
        setup.finish_frame(FrameStatus::Abandoned);

        let after_abandon = setup.next_uniforms(8, 2, moved, base.light);
        assert_eq!(after_abandon.frame_index, 0);
    }
}
