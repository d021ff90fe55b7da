//! Bounding volumes and row-major matrix helpers
//!
//! Matrices are stored row-major and applied to row vectors (`v * M`), so the
//! translation lives in the last row. glam is column-major; reading a row-major
//! array with `from_cols_array_2d` yields the transpose, which applied to a
//! column vector is exactly `v * M`.

use glam::{Mat4, Vec3A, Vec4};
use serde::{Deserialize, Serialize};

/// Row-major 4x4 matrix
pub type Matrix4x4 = [[f32; 4]; 4];

pub const IDENTITY: Matrix4x4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Sphere enclosing a set of points
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingSphere {
    pub center: [f32; 3],
    pub radius: f32,
}

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Aabb {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

/// Oriented box; the transform is always identity for computed boxes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientedBoundingBox {
    pub center: [f32; 3],
    pub transform: [[f32; 3]; 3],
    /// Half extents along each axis
    pub size: [f32; 3],
}

impl Default for OrientedBoundingBox {
    fn default() -> Self {
        Self {
            center: [0.0; 3],
            transform: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
            size: [0.0; 3],
        }
    }
}

/// All bounding data stored for a mesh or mesh object
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingInfo {
    pub sphere: BoundingSphere,
    pub aabb: Aabb,
    pub obb: OrientedBoundingBox,
}

impl Aabb {
    /// Component-wise min and max of `points`, or a zero box if there are none
    pub fn from_points(points: &[Vec3A]) -> Self {
        let Some(first) = points.first() else {
            return Self::default();
        };
        let (min, max) = points
            .iter()
            .fold((*first, *first), |(min, max), p| (min.min(*p), max.max(*p)));
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn union(&self, other: &Self) -> Self {
        let min = Vec3A::from(self.min).min(Vec3A::from(other.min));
        let max = Vec3A::from(self.max).max(Vec3A::from(other.max));
        Self {
            min: min.into(),
            max: max.into(),
        }
    }

    pub fn center(&self) -> Vec3A {
        (Vec3A::from(self.min) + Vec3A::from(self.max)) * 0.5
    }

    pub fn half_size(&self) -> Vec3A {
        (Vec3A::from(self.max) - Vec3A::from(self.min)) * 0.5
    }
}

/// Sphere centered on the box center with the farthest point on its surface
pub fn calculate_bounding_sphere(points: &[Vec3A]) -> BoundingSphere {
    sphere_around(Aabb::from_points(points).center(), points)
}

fn sphere_around(center: Vec3A, points: &[Vec3A]) -> BoundingSphere {
    let radius = points
        .iter()
        .map(|p| p.distance(center))
        .fold(0.0f32, f32::max);
    BoundingSphere {
        center: center.into(),
        radius,
    }
}

/// Compute the sphere, box, and oriented box for a set of positions
pub fn calculate_bounding_info(points: &[Vec3A]) -> BoundingInfo {
    let aabb = Aabb::from_points(points);
    let center = aabb.center();
    BoundingInfo {
        sphere: sphere_around(center, points),
        aabb,
        obb: OrientedBoundingBox {
            center: center.into(),
            size: aabb.half_size().into(),
            ..Default::default()
        },
    }
}

/// Sphere enclosing every sphere in `spheres`
///
/// The center is the center of the union of the spheres' bounding boxes.
pub fn union_spheres(spheres: &[BoundingSphere]) -> BoundingSphere {
    let boxes: Vec<Aabb> = spheres
        .iter()
        .map(|s| {
            let c = Vec3A::from(s.center);
            Aabb {
                min: (c - s.radius).into(),
                max: (c + s.radius).into(),
            }
        })
        .collect();
    let Some(first) = boxes.first() else {
        return BoundingSphere::default();
    };
    let center = boxes.iter().fold(*first, |acc, b| acc.union(b)).center();
    let radius = spheres
        .iter()
        .map(|s| Vec3A::from(s.center).distance(center) + s.radius)
        .fold(0.0f32, f32::max);
    BoundingSphere {
        center: center.into(),
        radius,
    }
}

// ============================================================================
// Row-Major Matrix Helpers
// ============================================================================

/// glam matrix that maps column vectors the way `m` maps row vectors
#[inline]
pub fn mat4_from_rows(m: &Matrix4x4) -> Mat4 {
    Mat4::from_cols_array_2d(m)
}

#[inline]
pub fn rows_from_mat4(m: Mat4) -> Matrix4x4 {
    m.to_cols_array_2d()
}

/// Row-major product `a * b`
pub fn mul_rows(a: &Matrix4x4, b: &Matrix4x4) -> Matrix4x4 {
    // (A * B)^T = B^T * A^T
    rows_from_mat4(mat4_from_rows(b) * mat4_from_rows(a))
}

/// Row-major inverse
pub fn invert_rows(m: &Matrix4x4) -> Matrix4x4 {
    rows_from_mat4(mat4_from_rows(m).inverse())
}

/// Flatten a matrix to 16 floats in row order
#[inline]
pub fn flatten(m: &Matrix4x4) -> [f32; 16] {
    bytemuck::cast(*m)
}

#[inline]
pub fn unflatten(values: [f32; 16]) -> Matrix4x4 {
    bytemuck::cast(values)
}

/// Apply `transform` to homogeneous row vectors in place
pub fn transform_row_vectors(points: &mut [Vec4], transform: &Matrix4x4) {
    let matrix = mat4_from_rows(transform);
    for point in points.iter_mut() {
        *point = matrix * *point;
    }
}
