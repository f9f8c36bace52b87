use glam::{vec2, vec3a, Quat, Vec2, Vec3A};

use crate::buffers;
use crate::intersect::Ray;

/// Builds the primary ray through pixel `(x, y)`.
///
/// `jitter` is the sub pixel offset in [0, 1)^2. Row 0 is the top of the image.
pub fn primary_ray(
    camera: &buffers::Camera,
    x: u32,
    y: u32,
    jitter: Vec2,
    width: u32,
    height: u32,
) -> Ray {
    let pixel = vec2(x as f32, y as f32) + jitter;
    let uv = pixel / vec2(width as f32, height as f32);

    // normalized between -1 and 1, y pointing up
    let ndc = vec2(uv.x * 2.0 - 1.0, 1.0 - uv.y * 2.0);

    let direction =
        (camera.forward() + ndc.x * camera.right() + ndc.y * camera.up()).normalize_or_zero();

    Ray::new(camera.position(), direction)
}

/// Host side camera state that produces the per frame [`buffers::Camera`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub position: Vec3A,
    pub direction: Vec3A,
    pub world_up: Vec3A,
    pub vertical_fov: f32,

    pub movement_speed: f32,
    turning_speed: f32,
}

impl CameraRig {
    pub fn new(position: Vec3A, direction: Vec3A) -> CameraRig {
        CameraRig {
            position,
            direction: direction.normalize_or_zero(),
            world_up: Vec3A::Y,
            vertical_fov: 45.0,

            movement_speed: 0.05,
            turning_speed: 0.003,
        }
    }

    pub fn with_vertical_fov(mut self, degrees: f32) -> CameraRig {
        self.vertical_fov = degrees;
        self
    }

    fn right_direction(&self) -> Vec3A {
        self.direction.cross(self.world_up).normalize_or_zero()
    }

    /// Camera basis with `right` and `up` scaled to the image plane extents,
    /// so that the [-1, 1] pixel mapping covers the field of view.
    pub fn basis(&self, width: u32, height: u32) -> buffers::Camera {
        let forward = self.direction;
        let right = self.right_direction();
        let up = right.cross(forward).normalize_or_zero();

        let aspect_ratio = width as f32 / height.max(1) as f32;
        let image_plane_height = (self.vertical_fov.to_radians() / 2.0).tan();
        let image_plane_width = aspect_ratio * image_plane_height;

        buffers::Camera::new(
            self.position,
            right * image_plane_width,
            up * image_plane_height,
            forward,
        )
    }

    /// Moves along the view direction and its right vector. Returns true when
    /// the camera moved.
    pub fn translate(&mut self, forward_amount: f32, right_amount: f32, timestep: f32) -> bool {
        if forward_amount == 0.0 && right_amount == 0.0 {
            return false;
        }

        let right_direction = self.right_direction();
        self.position += timestep * self.movement_speed * forward_amount * self.direction;
        self.position += timestep * self.movement_speed * right_amount * right_direction;

        true
    }

    /// Rotates by a pointer delta in pixels. Returns true when the camera turned.
    pub fn rotate(&mut self, pointer_delta: Vec2) -> bool {
        if pointer_delta == Vec2::ZERO {
            return false;
        }

        let pitch_delta: f32 = pointer_delta.y * self.turning_speed;
        let yaw_delta: f32 = pointer_delta.x * self.turning_speed;

        let right_rotation = Quat::from_axis_angle(self.right_direction().into(), pitch_delta);
        let up_rotation = Quat::from_axis_angle(self.world_up.into(), -yaw_delta);

        let q: Quat = (right_rotation * up_rotation).normalize();
        self.direction = Vec3A::from(q.mul_vec3(self.direction.into())).normalize_or_zero();

        true
    }
}

impl Default for CameraRig {
    fn default() -> Self {
        CameraRig::new(vec3a(0.0, 1.0, 3.38), vec3a(0.0, 0.0, -1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn straight_camera() -> buffers::Camera {
        buffers::Camera::new(Vec3A::ZERO, Vec3A::X, Vec3A::Y, -Vec3A::Z)
    }

    #[test]
    fn center_of_image_looks_forward() {
        let camera = straight_camera();
        let ray = primary_ray(&camera, 1, 1, vec2(0.0, 0.0), 2, 2);

        assert_eq!(ray.origin, Vec3A::ZERO);
        assert!((ray.direction - -Vec3A::Z).length() < 1e-6);
    }

    #[test]
    fn row_zero_is_the_top_of_the_image() {
        let camera = straight_camera();
        let top_left = primary_ray(&camera, 0, 0, vec2(0.5, 0.5), 2, 2);
        let bottom_right = primary_ray(&camera, 1, 1, vec2(0.5, 0.5), 2, 2);

        assert!(top_left.direction.y > 0.0);
        assert!(top_left.direction.x < 0.0);
        assert!(bottom_right.direction.y < 0.0);
        assert!(bottom_right.direction.x > 0.0);
    }

    #[test]
    fn corner_direction_follows_the_basis() {
        let camera = straight_camera();
        let ray = primary_ray(&camera, 0, 0, Vec2::ZERO, 4, 4);

        let expected = vec3a(-1.0, 1.0, -1.0).normalize();
        assert!((ray.direction - expected).length() < 1e-6);
    }

    #[test]
    fn basis_spans_the_field_of_view() {
        let rig = CameraRig::new(Vec3A::ZERO, -Vec3A::Z).with_vertical_fov(90.0);
        let camera = rig.basis(200, 100);

        assert!((camera.forward() - -Vec3A::Z).length() < 1e-6);
        assert!((camera.up() - Vec3A::Y).length() < 1e-5);
        assert!((camera.right() - 2.0 * Vec3A::X).length() < 1e-5);
    }

    #[test]
    fn rig_reports_movement() {
        let mut rig = CameraRig::default();
        assert!(!rig.translate(0.0, 0.0, 1.0));
        assert!(!rig.rotate(Vec2::ZERO));

        let before = rig;
        assert!(rig.translate(1.0, 0.0, 1.0));
        assert!(rig.position.z < before.position.z);

        assert!(rig.rotate(vec2(10.0, 0.0)));
        assert!((rig.direction.length() - 1.0).abs() < 1e-5);
        assert_ne!(rig.direction, before.direction);
    }
}
