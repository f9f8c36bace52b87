use glam::{vec3a, Mat4, Quat, Vec3A};

use crate::buffers::AreaLight;
use crate::camera::CameraRig;
use crate::mask::ObjectCategory;
use crate::triangle_object::{Faces, TriangleScene};

const WHITE: Vec3A = vec3a(0.725, 0.71, 0.68);
const RED: Vec3A = vec3a(0.63, 0.065, 0.05);
const GREEN: Vec3A = vec3a(0.14, 0.45, 0.091);

fn transform(translation: [f32; 3], rotation_y: f32, scale: [f32; 3]) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        scale.into(),
        Quat::from_rotation_y(rotation_y),
        translation.into(),
    )
}

/// Cornell box spanning x, z in [-1, 1] and y in [0, 2], with the emitter
/// just below the ceiling. `light_color` is the emitted radiance of the quad.
pub fn cornell_box(light_color: Vec3A) -> TriangleScene {
    let mut scene = TriangleScene::new();

    // light source
    scene.add_cube(
        Faces::POSITIVE_Y,
        light_color,
        transform([0.0, 1.0, 0.0], 0.0, [0.5, 1.98, 0.5]),
        true,
        ObjectCategory::Light,
    );

    let room = transform([0.0, 1.0, 0.0], 0.0, [2.0, 2.0, 2.0]);

    // top, bottom and back walls
    scene.add_cube(
        Faces::NEGATIVE_Y | Faces::POSITIVE_Y | Faces::NEGATIVE_Z,
        WHITE,
        room,
        true,
        ObjectCategory::Geometry,
    );
    // left wall
    scene.add_cube(Faces::NEGATIVE_X, RED, room, true, ObjectCategory::Geometry);
    // right wall
    scene.add_cube(Faces::POSITIVE_X, GREEN, room, true, ObjectCategory::Geometry);

    // short box
    scene.add_cube(
        Faces::ALL,
        WHITE,
        transform([0.3275, 0.3, 0.3725], -0.3, [0.6, 0.6, 0.6]),
        false,
        ObjectCategory::Geometry,
    );
    // tall box
    scene.add_cube(
        Faces::ALL,
        WHITE,
        transform([-0.335, 0.6, -0.29], 0.3, [0.6, 1.2, 0.6]),
        false,
        ObjectCategory::Geometry,
    );

    scene
}

/// The emitter matching the light quad of [`cornell_box`].
pub fn cornell_light(color: Vec3A) -> AreaLight {
    AreaLight::new(
        vec3a(0.0, 1.98, 0.0),
        vec3a(0.0, -1.0, 0.0),
        vec3a(0.25, 0.0, 0.0),
        vec3a(0.0, 0.0, 0.25),
        color,
    )
}

pub fn cornell_camera() -> CameraRig {
    CameraRig::new(vec3a(0.0, 1.0, 3.38), vec3a(0.0, 0.0, -1.0))
}
