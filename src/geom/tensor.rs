//! 3×3 symmetric tensors and a cyclic Jacobi eigen solver.
//!
//! Two consumers: point-cloud plane fitting ([`fit_plane`]) and the
//! directional summary of a superposed field ([`FieldTensor`]).

use std::ops::{Add, AddAssign, Mul};

use serde::{Deserialize, Serialize};

use super::core::{Point3, Tolerance, Vec3, orthogonal_vector};
use super::frame::Frame;

// ─────────────────────────────────────────────────────────────────────────────
// SymmetricTensor
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SymmetricTensor {
    pub xx: f64,
    pub xy: f64,
    pub xz: f64,
    pub yy: f64,
    pub yz: f64,
    pub zz: f64,
}

impl SymmetricTensor {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);

    #[must_use]
    pub const fn new(xx: f64, xy: f64, xz: f64, yy: f64, yz: f64, zz: f64) -> Self {
        Self { xx, xy, xz, yy, yz, zz }
    }

    #[must_use]
    pub const fn diagonal(a: f64, b: f64, c: f64) -> Self {
        Self::new(a, 0.0, 0.0, b, 0.0, c)
    }

    /// `v ⊗ v`.
    #[must_use]
    pub fn outer(v: Vec3) -> Self {
        Self::new(
            v.x * v.x,
            v.x * v.y,
            v.x * v.z,
            v.y * v.y,
            v.y * v.z,
            v.z * v.z,
        )
    }

    #[must_use]
    pub fn trace(&self) -> f64 {
        self.xx + self.yy + self.zz
    }

    /// Copy with every non-finite component replaced by zero.
    #[must_use]
    pub fn sanitized(&self) -> Self {
        let f = |value: f64| if value.is_finite() { value } else { 0.0 };
        Self::new(f(self.xx), f(self.xy), f(self.xz), f(self.yy), f(self.yz), f(self.zz))
    }

    #[must_use]
    pub fn to_matrix(&self) -> [[f64; 3]; 3] {
        [
            [self.xx, self.xy, self.xz],
            [self.xy, self.yy, self.yz],
            [self.xz, self.yz, self.zz],
        ]
    }
}

impl Add for SymmetricTensor {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(
            self.xx + rhs.xx,
            self.xy + rhs.xy,
            self.xz + rhs.xz,
            self.yy + rhs.yy,
            self.yz + rhs.yz,
            self.zz + rhs.zz,
        )
    }
}

impl AddAssign for SymmetricTensor {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Mul<f64> for SymmetricTensor {
    type Output = Self;
    fn mul(self, rhs: f64) -> Self::Output {
        Self::new(
            self.xx * rhs,
            self.xy * rhs,
            self.xz * rhs,
            self.yy * rhs,
            self.yz * rhs,
            self.zz * rhs,
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Jacobi eigen decomposition
// ─────────────────────────────────────────────────────────────────────────────

/// Iteration budget and convergence threshold of the Jacobi solver.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JacobiOptions {
    pub max_iterations: usize,
    pub tolerance: f64,
}

impl Default for JacobiOptions {
    fn default() -> Self {
        Self {
            max_iterations: 32,
            tolerance: Tolerance::EIGEN.eps,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EigenPair {
    pub value: f64,
    pub vector: Vec3,
}

/// Eigenpairs in diagonal order, plus solver bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EigenResult {
    pub pairs: [EigenPair; 3],
    pub iterations: usize,
    /// False when the iteration budget ran out first; the pairs are then a
    /// best-effort approximation.
    pub converged: bool,
}

impl EigenResult {
    /// Pairs ordered by `|value|`, largest first.
    #[must_use]
    pub fn sorted_by_magnitude_desc(&self) -> [EigenPair; 3] {
        let mut pairs = self.pairs;
        pairs.sort_by(|a, b| b.value.abs().total_cmp(&a.value.abs()));
        pairs
    }

    /// Pairs ordered by signed value, smallest first.
    #[must_use]
    pub fn sorted_ascending(&self) -> [EigenPair; 3] {
        let mut pairs = self.pairs;
        pairs.sort_by(|a, b| a.value.total_cmp(&b.value));
        pairs
    }
}

#[must_use]
pub fn eigen_decompose(tensor: &SymmetricTensor) -> EigenResult {
    eigen_decompose_with(tensor, JacobiOptions::default())
}

/// Cyclic Jacobi rotation with a 2-of-3 pivot heuristic.
///
/// Never fails: on exhaustion the partially diagonalised result is returned
/// with `converged == false`.
#[must_use]
pub fn eigen_decompose_with(tensor: &SymmetricTensor, options: JacobiOptions) -> EigenResult {
    let mut m = tensor.sanitized().to_matrix();
    let mut v = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];
    let mut iterations = 0;
    let mut converged = false;

    while iterations <= options.max_iterations {
        let (mut p, mut q) = (0, 1);
        if m[0][1].abs() < m[0][2].abs() {
            q = 2;
        }
        if m[p][q].abs() < m[1][2].abs() {
            p = 1;
            q = 2;
        }
        if m[p][q].abs() < options.tolerance {
            converged = true;
            break;
        }
        if iterations == options.max_iterations {
            break;
        }
        iterations += 1;

        let app = m[p][p];
        let aqq = m[q][q];
        let apq = m[p][q];
        let angle = 0.5 * (2.0 * apq).atan2(aqq - app);
        let (s, c) = angle.sin_cos();

        for k in 0..3 {
            if k == p || k == q {
                continue;
            }
            let mkp = m[k][p];
            let mkq = m[k][q];
            m[k][p] = c * mkp - s * mkq;
            m[p][k] = m[k][p];
            m[k][q] = c * mkq + s * mkp;
            m[q][k] = m[k][q];
        }
        m[p][p] = c * c * app - 2.0 * s * c * apq + s * s * aqq;
        m[q][q] = s * s * app + 2.0 * s * c * apq + c * c * aqq;
        m[p][q] = 0.0;
        m[q][p] = 0.0;

        for row in &mut v {
            let vp = row[p];
            let vq = row[q];
            row[p] = c * vp - s * vq;
            row[q] = s * vp + c * vq;
        }
    }

    if !converged {
        log::debug!(
            "jacobi: iteration budget {} exhausted, returning best effort",
            options.max_iterations
        );
    }

    let column = |j: usize| Vec3::new(v[0][j], v[1][j], v[2][j]);
    EigenResult {
        pairs: [
            EigenPair { value: m[0][0], vector: column(0) },
            EigenPair { value: m[1][1], vector: column(1) },
            EigenPair { value: m[2][2], vector: column(2) },
        ],
        iterations,
        converged,
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Plane fitting
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlaneFit {
    pub frame: Frame,
    /// Largest absolute out-of-plane distance over the input points.
    pub deviation: f64,
}

/// Least-squares plane through `points`.
///
/// - no points: world XY frame
/// - one point: world XY frame at that point
/// - two points: x along the segment, normal from `orthogonal_vector`
/// - coincident points: world XY frame at their centroid
/// - otherwise: PCA, normal = eigenvector of the smallest eigenvalue
#[must_use]
pub fn fit_plane(points: &[Point3]) -> PlaneFit {
    let exact = |frame| PlaneFit { frame, deviation: 0.0 };
    match points {
        [] => exact(Frame::default()),
        [single] => exact(Frame::world_xy(*single)),
        [a, b] => {
            let x = (*b - *a).unit_or(Vec3::X);
            let normal = orthogonal_vector(x);
            exact(Frame::from_axes(*a, x, normal.cross(x), normal))
        }
        _ => {
            let Some(centroid) = Point3::centroid(points) else {
                return exact(Frame::default());
            };
            let covariance = points.iter().fold(SymmetricTensor::ZERO, |acc, point| {
                acc + SymmetricTensor::outer(*point - centroid)
            });

            let eigen = eigen_decompose(&covariance);
            if eigen
                .pairs
                .iter()
                .all(|pair| pair.value.abs() <= Tolerance::DEFAULT.eps)
            {
                return exact(Frame::world_xy(centroid));
            }
            let normal = eigen.sorted_ascending()[0].vector.unit_or(Vec3::Z);

            let x = (points[0] - centroid)
                .reject_from(normal)
                .normalized()
                .unwrap_or_else(|| orthogonal_vector(normal));
            let frame = Frame::from_axes(centroid, x, normal.cross(x), normal);

            let deviation = points
                .iter()
                .map(|point| frame.coordinates(*point)[2].abs())
                .fold(0.0_f64, f64::max);
            PlaneFit { frame, deviation }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Field tensor summary
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrincipalDirection {
    pub magnitude: f64,
    pub direction: Vec3,
}

/// Accumulated field tensor with its principal directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTensor {
    pub matrix: SymmetricTensor,
    /// Sorted by `|magnitude|`, largest first.
    pub principal: Vec<PrincipalDirection>,
    /// `sqrt(max(0, trace))`.
    pub total_magnitude: f64,
}

impl FieldTensor {
    #[must_use]
    pub fn from_matrix(matrix: SymmetricTensor) -> Self {
        let eigen = eigen_decompose(&matrix);
        let principal = eigen
            .sorted_by_magnitude_desc()
            .iter()
            .map(|pair| PrincipalDirection {
                magnitude: pair.value,
                direction: pair.vector.unit_or_zero(),
            })
            .collect();
        Self {
            matrix,
            principal,
            total_magnitude: matrix.sanitized().trace().max(0.0).sqrt(),
        }
    }
}

impl Default for FieldTensor {
    fn default() -> Self {
        Self::from_matrix(SymmetricTensor::ZERO)
    }
}
