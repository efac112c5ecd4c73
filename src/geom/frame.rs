//! Orthonormal right-handed reference frames ("planes").
//!
//! Every constructor accepts partial or degenerate hints and falls back to a
//! deterministic frame instead of failing. Frames are `Copy` values; all
//! operations return a new frame.

use serde::{Deserialize, Serialize};

use super::core::{Point3, Tolerance, Vec3, orthogonal_vector};
use super::curve::Line3;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    pub origin: Point3,
    pub x_axis: Vec3,
    pub y_axis: Vec3,
    pub z_axis: Vec3,
}

impl Default for Frame {
    fn default() -> Self {
        Self::world_xy(Point3::ORIGIN)
    }
}

impl Frame {
    /// World XY frame at `origin`.
    #[must_use]
    pub const fn world_xy(origin: Point3) -> Self {
        Self {
            origin,
            x_axis: Vec3::X,
            y_axis: Vec3::Y,
            z_axis: Vec3::Z,
        }
    }

    /// World XZ frame at `origin`; x = +X, y = +Z, normal = -Y.
    #[must_use]
    pub fn world_xz(origin: Point3) -> Self {
        Self::from_axes(origin, Vec3::X, Vec3::Z, -Vec3::Y)
    }

    /// World YZ frame at `origin`.
    #[must_use]
    pub fn world_yz(origin: Point3) -> Self {
        Self::from_axes(origin, Vec3::Y, Vec3::Z, Vec3::X)
    }

    /// Core normalization routine.
    ///
    /// `z` falls back to +Z, `x` to `orthogonal_vector(z)`, `y` to `z × x`.
    /// The axes are then forced orthogonal with `x = y × z`, `y = z × x`.
    /// When `y` is parallel to `z` the cross product vanishes; `x` is then
    /// taken from the x hint projected off `z` so the result stays valid.
    #[must_use]
    pub fn from_axes(origin: Point3, x_hint: Vec3, y_hint: Vec3, z_hint: Vec3) -> Self {
        let z = z_hint.unit_or(Vec3::Z);
        let x = x_hint.normalized().unwrap_or_else(|| orthogonal_vector(z));
        let y = y_hint.normalized().unwrap_or_else(|| z.cross(x));

        let x = y.cross(z).normalized().unwrap_or_else(|| {
            x.reject_from(z)
                .normalized()
                .unwrap_or_else(|| orthogonal_vector(z))
        });
        let y = z.cross(x).unit_or_zero();

        Self {
            origin,
            x_axis: x,
            y_axis: y,
            z_axis: z,
        }
    }

    /// Frame at `origin` whose z axis is `normal` (or +Z when degenerate).
    #[must_use]
    pub fn from_normal(origin: Point3, normal: Vec3) -> Self {
        let z = normal.unit_or(Vec3::Z);
        let x = orthogonal_vector(z);
        Self::from_axes(origin, x, z.cross(x), z)
    }

    /// Frame through three points with origin `a` and x axis towards `b`.
    ///
    /// Colinear or coincident points give the world XY frame at `a`.
    #[must_use]
    pub fn from_three_points(a: Point3, b: Point3, c: Point3) -> Self {
        let ab = b - a;
        let ac = c - a;
        let Some(z) = ab.cross(ac).normalized() else {
            return Self::world_xy(a);
        };
        let x = ab.normalized().unwrap_or_else(|| orthogonal_vector(z));
        let y = z.cross(x).unit_or_zero();
        Self::from_axes(a, x, y, z)
    }

    /// Frame containing `line` (x along the line) and `point`.
    #[must_use]
    pub fn from_line_and_point(line: Line3, point: Point3) -> Self {
        Self::from_direction_and_reference(line.start, line.direction(), point - line.start)
    }

    /// Frame spanned by the directions of two lines, with origin at the start
    /// of `primary`. Parallel lines fall back to the offset between their starts.
    #[must_use]
    pub fn from_two_lines(primary: Line3, secondary: Line3) -> Self {
        let x = primary.direction().unit_or(Vec3::X);
        let mut reference = secondary.direction();
        if reference.reject_from(x).is_degenerate() {
            reference = secondary.start - primary.start;
        }
        Self::from_direction_and_reference(primary.start, x, reference)
    }

    fn from_direction_and_reference(origin: Point3, direction: Vec3, reference: Vec3) -> Self {
        let x = direction.unit_or(Vec3::X);
        let reference = reference
            .reject_from(x)
            .normalized()
            .unwrap_or_else(|| orthogonal_vector(x));
        let normal = x
            .cross(reference)
            .normalized()
            .unwrap_or_else(|| orthogonal_vector(x));
        let y = normal.cross(x).unit_or_zero();
        Self::from_axes(origin, x, y, normal)
    }

    /// Orients `candidate` consistently with `reference`.
    ///
    /// The candidate is flipped when its normal opposes the reference normal.
    /// Then the candidate or its 180° rotation about z is picked, whichever
    /// keeps x and y closest to the reference axes.
    #[must_use]
    pub fn align(reference: &Self, candidate: &Self) -> Self {
        let mut target = *candidate;
        if target.z_axis.dot(reference.z_axis) < 0.0 {
            target.x_axis = -target.x_axis;
            target.y_axis = -target.y_axis;
            target.z_axis = -target.z_axis;
        }

        let rotated = Self {
            x_axis: -target.x_axis,
            y_axis: -target.y_axis,
            ..target
        };
        let score = |frame: &Self| {
            frame.x_axis.dot(reference.x_axis) + frame.y_axis.dot(reference.y_axis)
        };
        let best = if score(&rotated) > score(&target) {
            rotated
        } else {
            target
        };
        Self::from_axes(best.origin, best.x_axis, best.y_axis, best.z_axis)
    }

    /// Aligns every frame to its predecessor.
    ///
    /// Without a `master` the first frame is kept as is and anchors the chain.
    #[must_use]
    pub fn align_sequence(frames: &[Self], master: Option<&Self>) -> Vec<Self> {
        let mut result = Vec::with_capacity(frames.len());
        let mut reference = master.copied();
        for frame in frames {
            let aligned = match reference {
                Some(reference) => Self::align(&reference, frame),
                None => *frame,
            };
            reference = Some(aligned);
            result.push(aligned);
        }
        result
    }

    /// Local `(u, v, w)` coordinates of `point`.
    #[must_use]
    pub fn coordinates(&self, point: Point3) -> [f64; 3] {
        let relative = point - self.origin;
        [
            relative.dot(self.x_axis),
            relative.dot(self.y_axis),
            relative.dot(self.z_axis),
        ]
    }

    /// World point at local coordinates `(u, v, w)`.
    #[must_use]
    pub fn point_at(&self, u: f64, v: f64, w: f64) -> Point3 {
        self.origin + self.x_axis * u + self.y_axis * v + self.z_axis * w
    }

    /// Projection of `point` onto the frame plane, its `(u, v)` and the signed
    /// distance along the normal.
    #[must_use]
    pub fn closest_point(&self, point: Point3) -> (Point3, [f64; 2], f64) {
        let [u, v, w] = self.coordinates(point);
        (self.point_at(u, v, 0.0), [u, v], w)
    }

    #[must_use]
    pub fn offset(&self, distance: f64) -> Self {
        Self {
            origin: self.origin + self.z_axis * distance,
            ..*self
        }
    }

    #[must_use]
    pub fn with_origin(&self, origin: Point3) -> Self {
        Self { origin, ..*self }
    }

    /// Optionally swaps x/y and reverses either axis; z follows from handedness.
    #[must_use]
    pub fn flip(&self, reverse_x: bool, reverse_y: bool, swap_axes: bool) -> Self {
        let (mut x, mut y) = (self.x_axis, self.y_axis);
        if swap_axes {
            std::mem::swap(&mut x, &mut y);
        }
        if reverse_x {
            x = -x;
        }
        if reverse_y {
            y = -y;
        }
        let z = x.cross(y).normalized().unwrap_or(self.z_axis);
        Self::from_axes(self.origin, x, y, z)
    }

    /// Rotates x and y about the frame normal by `angle` radians.
    #[must_use]
    pub fn rotate(&self, angle: f64) -> Self {
        if !angle.is_finite() || angle.abs() < Tolerance::DEFAULT.eps {
            return *self;
        }
        let (sin, cos) = angle.sin_cos();
        let x = self.x_axis * cos + self.y_axis * sin;
        let y = self.y_axis * cos - self.x_axis * sin;
        Self::from_axes(self.origin, x, y, self.z_axis)
    }

    /// Replaces the normal while keeping x as close to the old x as possible.
    #[must_use]
    pub fn adjust_normal(&self, normal: Vec3) -> Self {
        let z = normal.normalized().unwrap_or(self.z_axis);
        let x = self
            .x_axis
            .reject_from(z)
            .normalized()
            .or_else(|| self.y_axis.reject_from(z).normalized())
            .unwrap_or_else(|| orthogonal_vector(z));
        Self::from_axes(self.origin, x, z.cross(x), z)
    }

    /// Rotates about z so x points along `direction` projected into the
    /// plane. Returns the rotation angle; degenerate directions give angle 0.
    #[must_use]
    pub fn align_to_direction(&self, direction: Vec3) -> (Self, f64) {
        let Some(target) = direction.reject_from(self.z_axis).normalized() else {
            return (*self, 0.0);
        };
        let cos = target.dot(self.x_axis).clamp(-1.0, 1.0);
        let sin = target.dot(self.y_axis);
        let angle = sin.atan2(cos);
        (self.rotate(angle), angle)
    }

    /// Unit axes, mutually orthogonal and right-handed within `tol`.
    #[must_use]
    pub fn is_orthonormal(&self, tol: Tolerance) -> bool {
        let unit = |v: Vec3| (v.length() - 1.0).abs() <= tol.eps;
        unit(self.x_axis)
            && unit(self.y_axis)
            && unit(self.z_axis)
            && self.x_axis.dot(self.y_axis).abs() <= tol.eps
            && self.y_axis.dot(self.z_axis).abs() <= tol.eps
            && self.z_axis.dot(self.x_axis).abs() <= tol.eps
            && tol.approx_eq_vec3(self.x_axis.cross(self.y_axis), self.z_axis)
    }
}
