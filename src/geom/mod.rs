//! Geometry kernel: numeric guards, frames, tensors, fields, streamlines and
//! curve search. Everything here is pure and works on value types.

mod core;
mod curve;
mod field;
mod frame;
mod streamline;
mod tensor;

pub use self::core::{BBox, Point3, Tolerance, Vec3, clamp_finite, finite_or, orthogonal_vector};
pub use curve::{
    Curve3, CurveError, CurveQuery, CurveSearchOptions, FnCurve, Line3, Polyline3,
    closest_point, pull_points, sort_along_curve,
};
pub use field::{
    FIELD_EPSILON, Field, FieldBounds, FieldContribution, FieldEvaluation, FieldSample,
    FieldSection, FieldSource, GridSampling, LineCharge, MAX_GRID_SAMPLES, PointCharge,
    SegmentForce, SourceKind, SourceModel, SourceSample, SpinForce, UniformForce,
};
pub use frame::Frame;
pub use streamline::{
    IntegratorOrder, MAX_SPEED, MIN_SPEED, StreamlineOptions, field_direction, integrate,
    integrate_with,
};
pub use tensor::{
    EigenPair, EigenResult, FieldTensor, JacobiOptions, PlaneFit, PrincipalDirection,
    SymmetricTensor, eigen_decompose, eigen_decompose_with, fit_plane,
};

#[cfg(test)]
mod tests;
