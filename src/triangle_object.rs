use std::f32::consts::PI;
use std::fs::File;
use std::io::BufReader;
use std::ops::BitOr;
use std::path::Path;

use glam::{vec3a, Mat3A, Mat4, Vec3A};
use log::{debug, info};

use crate::error::{Error, Result};
use crate::intersect::{Hit, Intersector, Ray};
use crate::mask::{ObjectCategory, RayMask};

const BOUNDS_PADDING: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneTriangle {
    a: Vec3A,
    edge_ab: Vec3A,
    edge_ac: Vec3A,
    normal: Vec3A,
    pub min_bounds: Vec3A,
    pub max_bounds: Vec3A,
}

impl SceneTriangle {
    pub fn new(a: Vec3A, b: Vec3A, c: Vec3A) -> SceneTriangle {
        // precalculations to save on compute

        let edge_ab = b - a;
        let edge_ac = c - a;

        let normal = edge_ab.cross(edge_ac).normalize_or_zero();

        SceneTriangle {
            a,
            edge_ab,
            edge_ac,
            normal,
            min_bounds: a.min(b).min(c),
            max_bounds: a.max(b).max(c),
        }
    }

    pub fn normal(&self) -> Vec3A {
        self.normal
    }

    pub fn flipped(mut self) -> SceneTriangle {
        self.normal = -self.normal;
        self
    }

    /// Möller–Trumbore, returns the hit distance along `ray`.
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let p = ray.direction.cross(self.edge_ac);
        let determinant = self.edge_ab.dot(p);

        if determinant.abs() < 1e-10 {
            // ray is parallel to the triangle
            return None;
        }

        let inverse_determinant = 1.0 / determinant;
        let to_origin = ray.origin - self.a;

        let u = to_origin.dot(p) * inverse_determinant;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = to_origin.cross(self.edge_ab);
        let v = ray.direction.dot(q) * inverse_determinant;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let distance = self.edge_ac.dot(q) * inverse_determinant;
        ray.accepts_distance(distance).then_some(distance)
    }
}

#[derive(Debug, Clone)]
pub struct SceneObject {
    pub category: ObjectCategory,
    /// Albedo for geometry, emitted radiance for lights.
    pub color: Vec3A,
    pub min_bounds: Vec3A,
    pub max_bounds: Vec3A,
    pub object_triangles: Vec<SceneTriangle>,
}

impl SceneObject {
    pub fn new(
        triangles: Vec<SceneTriangle>,
        color: Vec3A,
        category: ObjectCategory,
    ) -> SceneObject {
        let (min_bounds, max_bounds) = triangles.iter().fold(
            (Vec3A::splat(f32::MAX), Vec3A::splat(f32::MIN)),
            |(min, max), triangle| (min.min(triangle.min_bounds), max.max(triangle.max_bounds)),
        );

        SceneObject {
            category,
            color,
            min_bounds: min_bounds - BOUNDS_PADDING,
            max_bounds: max_bounds + BOUNDS_PADDING,
            object_triangles: triangles,
        }
    }

    /// Slab test against the object bounds.
    fn bounds_hit(&self, ray: &Ray, inverse_direction: Vec3A) -> bool {
        let t0 = (self.min_bounds - ray.origin) * inverse_direction;
        let t1 = (self.max_bounds - ray.origin) * inverse_direction;

        let t_near = t0.min(t1).max_element();
        let t_far = t0.max(t1).min_element();

        t_near <= t_far && t_far > 0.0 && t_near < ray.max_distance
    }
}

/// Cube faces, combined with `|`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Faces(u8);

impl Faces {
    pub const POSITIVE_X: Faces = Faces(1);
    pub const NEGATIVE_X: Faces = Faces(2);
    pub const POSITIVE_Y: Faces = Faces(4);
    pub const NEGATIVE_Y: Faces = Faces(8);
    pub const POSITIVE_Z: Faces = Faces(16);
    pub const NEGATIVE_Z: Faces = Faces(32);
    pub const ALL: Faces = Faces(63);

    pub fn contains(self, other: Faces) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Faces {
    type Output = Faces;

    fn bitor(self, rhs: Faces) -> Faces {
        Faces(self.0 | rhs.0)
    }
}

/// Brute force intersection service over a list of triangle objects.
#[derive(Debug, Clone, Default)]
pub struct TriangleScene {
    pub objects: Vec<SceneObject>,
}

impl TriangleScene {
    pub fn new() -> TriangleScene {
        TriangleScene::default()
    }

    pub fn triangle_count(&self) -> usize {
        self.objects
            .iter()
            .map(|obj| obj.object_triangles.len())
            .sum()
    }

    pub fn add_object(&mut self, object: SceneObject) {
        if object.object_triangles.is_empty() {
            debug!("skipping empty {:?} object", object.category);
            return;
        }

        self.objects.push(object);
    }

    /// Adds a unit cube centered on the origin, transformed by `transform`,
    /// keeping only the requested faces.
    pub fn add_cube(
        &mut self,
        faces: Faces,
        color: Vec3A,
        transform: Mat4,
        inward_normals: bool,
        category: ObjectCategory,
    ) {
        let cube_vertices: Vec<Vec3A> = [
            vec3a(-0.5, -0.5, -0.5),
            vec3a(0.5, -0.5, -0.5),
            vec3a(-0.5, 0.5, -0.5),
            vec3a(0.5, 0.5, -0.5),
            vec3a(-0.5, -0.5, 0.5),
            vec3a(0.5, -0.5, 0.5),
            vec3a(-0.5, 0.5, 0.5),
            vec3a(0.5, 0.5, 0.5),
        ]
        .iter()
        .map(|&vertex| transform.transform_point3a(vertex))
        .collect();

        let face_indexes = [
            (Faces::NEGATIVE_X, [0, 4, 6, 2]),
            (Faces::POSITIVE_X, [1, 3, 7, 5]),
            (Faces::NEGATIVE_Y, [0, 1, 5, 4]),
            (Faces::POSITIVE_Y, [2, 6, 7, 3]),
            (Faces::NEGATIVE_Z, [0, 2, 3, 1]),
            (Faces::POSITIVE_Z, [4, 5, 7, 6]),
        ];

        let mut triangles = Vec::with_capacity(12);

        for (face, [i0, i1, i2, i3]) in face_indexes {
            if !faces.contains(face) {
                continue;
            }

            let (v0, v1, v2, v3) = (
                cube_vertices[i0],
                cube_vertices[i1],
                cube_vertices[i2],
                cube_vertices[i3],
            );

            for triangle in [SceneTriangle::new(v0, v1, v2), SceneTriangle::new(v0, v2, v3)] {
                triangles.push(if inward_normals {
                    triangle.flipped()
                } else {
                    triangle
                });
            }
        }

        self.add_object(SceneObject::new(triangles, color, category));
    }

    /// Loads an STL mesh, normalized to a unit diagonal, scaled, rotated by
    /// `rotation` degrees and placed so that its lowest point rests on
    /// `position`.
    pub fn add_stl(
        &mut self,
        path: impl AsRef<Path>,
        scale: f32,
        position: Vec3A,
        rotation: Vec3A,
        color: Vec3A,
    ) -> Result<()> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|source| Error::MeshIo {
            path: path.to_path_buf(),
            source,
        })?;
        let mut reader = BufReader::new(file);

        let stl_file = stl_io::read_stl(&mut reader).map_err(|error| Error::InvalidMesh {
            path: path.to_path_buf(),
            reason: error.to_string(),
        })?;

        if stl_file.faces.is_empty() || scale <= 0.0 {
            return Err(Error::InvalidMesh {
                path: path.to_path_buf(),
                reason: format!(
                    "{} faces at scale {scale}, need at least one face and a positive scale",
                    stl_file.faces.len()
                ),
            });
        }

        // into vector of vec3a
        let original_points: Vec<Vec3A> = stl_file
            .vertices
            .iter()
            .map(|&vertex| vec3a(vertex[0], vertex[1], vertex[2]))
            .collect();

        let points = normalize_model(original_points, rotation);
        let points: Vec<Vec3A> = points.iter().map(|&point| point * scale).collect();

        let (min_coords, _) = get_bounding_box(&points);
        let surface_offset = position - min_coords * Vec3A::Y;

        let points: Vec<Vec3A> = points.iter().map(|&point| point + surface_offset).collect();

        let triangles: Vec<SceneTriangle> = stl_file
            .faces
            .iter()
            .map(|face| {
                let [a, b, c] = face.vertices;
                SceneTriangle::new(points[a], points[b], points[c])
            })
            .collect();

        info!(
            "loaded {} triangles from {}",
            triangles.len(),
            path.display()
        );

        self.add_object(SceneObject::new(
            triangles,
            color,
            ObjectCategory::Geometry,
        ));

        Ok(())
    }
}

impl Intersector for TriangleScene {
    fn intersect(&self, ray: &Ray, mask: RayMask) -> Option<Hit> {
        let inverse_direction = ray.direction.recip();

        let mut closest: Option<Hit> = None;
        let mut max_distance = ray.max_distance;

        for object in &self.objects {
            if !mask.accepts(object.category) {
                continue;
            }

            let bounded_ray = Ray::with_max_distance(ray.origin, ray.direction, max_distance);
            if !object.bounds_hit(&bounded_ray, inverse_direction) {
                continue;
            }

            for triangle in &object.object_triangles {
                if let Some(distance) = triangle.intersect(&bounded_ray) {
                    if distance < max_distance {
                        max_distance = distance;
                        closest = Some(Hit {
                            distance,
                            category: object.category,
                            normal: triangle.normal(),
                            color: object.color,
                        });
                    }
                }
            }
        }

        closest
    }

    fn occluded(&self, ray: &Ray, mask: RayMask) -> bool {
        let inverse_direction = ray.direction.recip();

        self.objects
            .iter()
            .filter(|object| mask.accepts(object.category))
            .filter(|object| object.bounds_hit(ray, inverse_direction))
            .any(|object| {
                object
                    .object_triangles
                    .iter()
                    .any(|triangle| triangle.intersect(ray).is_some())
            })
    }
}

fn normalize_model(mut points: Vec<Vec3A>, rotation: Vec3A) -> Vec<Vec3A> {
    points = rotate_to_angle(points, rotation);

    let (min_coords, max_coords) = get_bounding_box(&points);

    let average = (min_coords + max_coords) / 2.0;

    let scale: f32 = 1.0 / min_coords.distance(max_coords).max(f32::EPSILON);
    let transformation = average * scale;

    points
        .iter()
        .map(|&point| point * scale - transformation)
        .collect::<Vec<_>>()
}

fn rotate_to_angle(points: Vec<Vec3A>, rotation: Vec3A) -> Vec<Vec3A> {
    fn deg_to_rad(deg: f32) -> f32 {
        deg * (PI / 180.0)
    }

    let rotation_x = Mat3A::from_rotation_x(deg_to_rad(rotation.x));
    let rotation_y = Mat3A::from_rotation_y(deg_to_rad(rotation.y));
    let rotation_z = Mat3A::from_rotation_z(deg_to_rad(rotation.z));

    let rotation = rotation_z * rotation_y * rotation_x;

    points
        .iter()
        .map(|&point| rotation * point)
        .collect::<Vec<_>>()
}

fn get_bounding_box(points: &[Vec3A]) -> (Vec3A, Vec3A) {
    points.iter().fold(
        (Vec3A::splat(f32::MAX), Vec3A::splat(f32::MIN)),
        |(min, max), &point| (min.min(point), max.max(point)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::RayCategory;
    use glam::Vec3;
    use std::io::Write;

    fn floor_and_light() -> TriangleScene {
        let mut scene = TriangleScene::new();
        // floor at y = 0 facing up
        scene.add_cube(
            Faces::NEGATIVE_Y,
            Vec3A::splat(0.5),
            Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0)) * Mat4::from_scale(Vec3::splat(2.0)),
            true,
            ObjectCategory::Geometry,
        );
        // light quad at y = 1 facing down
        scene.add_cube(
            Faces::NEGATIVE_Y,
            Vec3A::splat(4.0),
            Mat4::from_translation(Vec3::new(0.0, 1.5, 0.0)),
            false,
            ObjectCategory::Light,
        );
        scene
    }

    #[test]
    fn triangle_hit_distance() {
        let triangle = SceneTriangle::new(
            vec3a(-1.0, -1.0, -2.0),
            vec3a(1.0, -1.0, -2.0),
            vec3a(0.0, 1.0, -2.0),
        );

        let ray = Ray::new(Vec3A::ZERO, -Vec3A::Z);
        let distance = triangle.intersect(&ray).expect("ray should hit");
        assert!((distance - 2.0).abs() < 1e-6);

        let miss = Ray::new(vec3a(5.0, 0.0, 0.0), -Vec3A::Z);
        assert!(triangle.intersect(&miss).is_none());

        let short = Ray::with_max_distance(Vec3A::ZERO, -Vec3A::Z, 1.5);
        assert!(triangle.intersect(&short).is_none());
    }

    #[test]
    fn cube_faces_and_normals() {
        let mut scene = TriangleScene::new();
        scene.add_cube(
            Faces::ALL,
            Vec3A::ONE,
            Mat4::IDENTITY,
            false,
            ObjectCategory::Geometry,
        );
        assert_eq!(scene.triangle_count(), 12);

        let ray = Ray::new(vec3a(0.0, 0.0, 3.0), -Vec3A::Z);
        let hit = scene
            .intersect(&ray, RayCategory::Primary.mask())
            .expect("ray should hit the cube");
        assert!((hit.distance - 2.5).abs() < 1e-5);
        assert!((hit.normal - Vec3A::Z).length() < 1e-5);

        let mut inward = TriangleScene::new();
        inward.add_cube(
            Faces::POSITIVE_Z | Faces::NEGATIVE_Z,
            Vec3A::ONE,
            Mat4::IDENTITY,
            true,
            ObjectCategory::Geometry,
        );
        assert_eq!(inward.triangle_count(), 4);
        let hit = inward
            .intersect(&ray, RayCategory::Primary.mask())
            .expect("ray should hit the box");
        assert!((hit.normal - -Vec3A::Z).length() < 1e-5);
    }

    #[test]
    fn masks_hide_the_light_from_shadow_rays() {
        let scene = floor_and_light();
        let up = Ray::new(vec3a(0.0, 0.01, 0.0), Vec3A::Y);

        let primary = scene
            .intersect(&up, RayCategory::Primary.mask())
            .expect("primary ray should see the light");
        assert_eq!(primary.category, ObjectCategory::Light);
        assert_eq!(primary.emission(), Vec3A::splat(4.0));
        assert_eq!(primary.albedo(), Vec3A::ZERO);

        assert!(scene.intersect(&up, RayCategory::Shadow.mask()).is_none());
        assert!(!scene.occluded(&up, RayCategory::Shadow.mask()));

        let down = Ray::new(vec3a(0.0, 0.5, 0.0), -Vec3A::Y);
        let floor = scene
            .intersect(&down, RayCategory::Shadow.mask())
            .expect("shadow ray should hit the floor");
        assert_eq!(floor.category, ObjectCategory::Geometry);
        assert!((floor.distance - 0.5).abs() < 1e-5);
        assert!((floor.normal - Vec3A::Y).length() < 1e-5);
    }

    #[test]
    fn missing_mesh_is_an_error() {
        let mut scene = TriangleScene::new();
        let result = scene.add_stl(
            "does/not/exist.stl",
            1.0,
            Vec3A::ZERO,
            Vec3A::ZERO,
            Vec3A::ONE,
        );
        assert!(matches!(result, Err(Error::MeshIo { .. })));
        assert!(scene.objects.is_empty());
    }

    #[test]
    fn ascii_stl_rests_on_the_floor() {
        let mut file = tempfile::Builder::new()
            .suffix(".stl")
            .tempfile()
            .expect("temp file");
        write!(
            file,
            "solid tri\n\
             facet normal 0 0 1\n\
             outer loop\n\
             vertex 0 0 0\n\
             vertex 2 0 0\n\
             vertex 0 2 0\n\
             endloop\n\
             endfacet\n\
             endsolid tri\n"
        )
        .expect("write stl");

        let mut scene = TriangleScene::new();
        scene
            .add_stl(file.path(), 1.0, Vec3A::ZERO, Vec3A::ZERO, Vec3A::ONE)
            .expect("stl should load");

        assert_eq!(scene.triangle_count(), 1);
        assert!(scene.objects[0].min_bounds.y.abs() < 1e-3);
    }
}
