//! Composable vector fields built from physical-analogy sources.
//!
//! A [`Field`] is an ordered list of [`FieldSource`]s. Evaluation
//! superposes every source whose bounds contain the query point and
//! summarises the result, including a [`FieldTensor`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::core::{BBox, Point3, Tolerance, Vec3};
use super::curve::Line3;
use super::frame::Frame;
use super::tensor::{FieldTensor, SymmetricTensor};

/// Softening term shared by the source formulas.
pub const FIELD_EPSILON: f64 = 1e-9;

/// Sub-segment cap for line charges; keeps very long segments bounded.
const MAX_LINE_CHARGE_SEGMENTS: usize = 10_000;

// ─────────────────────────────────────────────────────────────────────────────
// Source contract
// ─────────────────────────────────────────────────────────────────────────────

/// Output of a single source at a point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSample {
    pub vector: Vec3,
    pub strength: f64,
    /// Source-specific tensor; when absent the composition synthesises
    /// `direction ⊗ direction · |strength|`.
    pub tensor: Option<SymmetricTensor>,
}

impl FieldSample {
    const fn plain(vector: Vec3, strength: f64) -> Self {
        Self {
            vector,
            strength,
            tensor: None,
        }
    }
}

/// Pure point → sample function. Implementations hold immutable parameters.
pub trait SourceSample {
    fn sample(&self, point: Point3) -> FieldSample;
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointCharge {
    pub position: Point3,
    pub charge: f64,
    pub decay: f64,
}

impl SourceSample for PointCharge {
    fn sample(&self, point: Point3) -> FieldSample {
        let offset = point - self.position;
        let distance = offset.length();
        if distance <= FIELD_EPSILON {
            return FieldSample::plain(Vec3::ZERO, self.charge.abs());
        }
        let decay = self.decay.max(0.0);
        let magnitude = self.charge / (distance + FIELD_EPSILON).powf(decay);
        FieldSample::plain(offset / distance * magnitude, magnitude.abs())
    }
}

/// Charge spread evenly along a segment with a fixed inverse-square falloff.
///
/// Each piece acts like a point charge. A piece whose midpoint coincides with
/// the query point adds no vector but still counts `|charge / pieces|` towards
/// the strength.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineCharge {
    pub segment: Line3,
    pub charge: f64,
}

impl LineCharge {
    /// `max(8, round(4 · length))`, capped at 10 000 so degenerate inputs
    /// stay bounded.
    #[must_use]
    pub fn segment_count(&self) -> usize {
        let estimate = (4.0 * self.segment.length()).round();
        if estimate.is_finite() && estimate > 8.0 {
            (estimate as usize).min(MAX_LINE_CHARGE_SEGMENTS)
        } else {
            8
        }
    }
}

impl SourceSample for LineCharge {
    fn sample(&self, point: Point3) -> FieldSample {
        let segments = self.segment_count();
        let charge_per_segment = self.charge / segments as f64;

        let mut vector = Vec3::ZERO;
        let mut strength = 0.0;
        let mut tensor = SymmetricTensor::ZERO;
        for i in 0..segments {
            let t = (i as f64 + 0.5) / segments as f64;
            let offset = point - self.segment.start.lerp(self.segment.end, t);
            let Some(direction) = offset.normalized() else {
                // Same guard as a point charge: no direction, full strength.
                strength += charge_per_segment.abs();
                continue;
            };
            let magnitude = charge_per_segment / (offset.length_squared() + FIELD_EPSILON);
            vector = vector + direction * magnitude;
            strength += magnitude.abs();
            tensor += SymmetricTensor::outer(direction) * magnitude.abs();
        }

        FieldSample {
            vector,
            strength,
            tensor: Some(tensor),
        }
    }
}

/// Vortex around the z axis of `frame`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpinForce {
    pub frame: Frame,
    pub strength: f64,
    pub radius: f64,
    pub decay: f64,
}

impl SourceSample for SpinForce {
    fn sample(&self, point: Point3) -> FieldSample {
        let [x, y, z] = self.frame.coordinates(point);
        let tangential = self.frame.x_axis * -y + self.frame.y_axis * x;
        let Some(direction) = tangential.normalized() else {
            return FieldSample::plain(Vec3::ZERO, 0.0);
        };

        let radius = self.radius.abs().max(FIELD_EPSILON);
        let decay = self.decay.max(0.0);
        let radial = x.hypot(y);
        let horizontal = (1.0 + radial / radius).powf(-(decay + 1.0));
        let vertical = 1.0 / (1.0 + z.abs() / radius);
        let magnitude = self.strength * horizontal * vertical;
        FieldSample::plain(direction * magnitude, magnitude.abs())
    }
}

/// Pull along a segment plus a weaker push away from it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SegmentForce {
    pub segment: Line3,
}

impl SourceSample for SegmentForce {
    fn sample(&self, point: Point3) -> FieldSample {
        let closest = self.segment.closest_point_clamped(point);
        let offset = point - closest;
        let falloff = 1.0 / (1.0 + offset.length_squared());
        let axial = self.segment.direction().unit_or_zero() * falloff;
        let radial = offset.unit_or_zero() * (0.5 * falloff);
        let vector = axial + radial;
        FieldSample::plain(vector, vector.length())
    }
}

/// Same vector everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UniformForce {
    pub vector: Vec3,
}

impl SourceSample for UniformForce {
    fn sample(&self, _point: Point3) -> FieldSample {
        FieldSample::plain(self.vector, self.vector.length())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceKind {
    PointCharge,
    LineCharge,
    Spin,
    SegmentForce,
    Uniform,
}

impl SourceKind {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::PointCharge => "point charge",
            Self::LineCharge => "line charge",
            Self::Spin => "spin force",
            Self::SegmentForce => "segment force",
            Self::Uniform => "uniform force",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum SourceModel {
    PointCharge(PointCharge),
    LineCharge(LineCharge),
    Spin(SpinForce),
    SegmentForce(SegmentForce),
    Uniform(UniformForce),
}

impl SourceModel {
    #[must_use]
    pub fn kind(&self) -> SourceKind {
        match self {
            Self::PointCharge(_) => SourceKind::PointCharge,
            Self::LineCharge(_) => SourceKind::LineCharge,
            Self::Spin(_) => SourceKind::Spin,
            Self::SegmentForce(_) => SourceKind::SegmentForce,
            Self::Uniform(_) => SourceKind::Uniform,
        }
    }
}

impl SourceSample for SourceModel {
    fn sample(&self, point: Point3) -> FieldSample {
        match self {
            Self::PointCharge(source) => source.sample(point),
            Self::LineCharge(source) => source.sample(point),
            Self::Spin(source) => source.sample(point),
            Self::SegmentForce(source) => source.sample(point),
            Self::Uniform(source) => source.sample(point),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bounds and sources
// ─────────────────────────────────────────────────────────────────────────────

/// Box that is axis-aligned in `frame` coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBounds {
    pub frame: Frame,
    pub local: BBox,
}

impl FieldBounds {
    /// World-aligned box between two corners.
    #[must_use]
    pub fn world(a: Point3, b: Point3) -> Self {
        Self {
            frame: Frame::default(),
            local: BBox::new(a, b),
        }
    }

    /// Box spanning two corners given in world space, aligned to `frame`.
    #[must_use]
    pub fn in_frame(frame: Frame, a: Point3, b: Point3) -> Self {
        Self {
            frame,
            local: BBox::new(
                Point3::from_array(frame.coordinates(a)),
                Point3::from_array(frame.coordinates(b)),
            ),
        }
    }

    /// Inclusive containment with a [`FIELD_EPSILON`] margin.
    #[must_use]
    pub fn contains(&self, point: Point3) -> bool {
        let local = Point3::from_array(self.frame.coordinates(point));
        self.local
            .contains_point_with(local, Tolerance::new(FIELD_EPSILON))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSource {
    pub model: SourceModel,
    /// Absent bounds mean the source acts everywhere.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<FieldBounds>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

impl FieldSource {
    #[must_use]
    pub fn new(model: SourceModel) -> Self {
        Self {
            model,
            bounds: None,
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: Option<FieldBounds>) -> Self {
        self.bounds = bounds;
        self
    }

    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn kind(&self) -> SourceKind {
        self.model.kind()
    }

    #[must_use]
    pub fn acts_at(&self, point: Point3) -> bool {
        self.bounds.is_none_or(|bounds| bounds.contains(point))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Field
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Field {
    pub sources: Vec<FieldSource>,
    /// Declared bounds; empty means undeclared. Descriptive only, gating
    /// happens per source.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bounds: Vec<FieldBounds>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldContribution {
    /// Position of the source in [`Field::sources`].
    pub index: usize,
    pub kind: SourceKind,
    pub vector: Vec3,
    pub strength: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldEvaluation {
    pub point: Point3,
    pub vector: Vec3,
    pub magnitude: f64,
    /// Unit vector, or zero when the magnitude is below [`FIELD_EPSILON`].
    pub direction: Vec3,
    /// Sum of `|strength|` over the contributing sources.
    pub strength: f64,
    pub tensor: FieldTensor,
    pub contributions: Vec<FieldContribution>,
}

impl FieldEvaluation {
    /// Cosine between the field direction and `normal`; 0 without direction.
    #[must_use]
    pub fn alignment(&self, normal: Vec3) -> f64 {
        self.direction.dot(normal.unit_or_zero())
    }
}

impl Field {
    /// Single-source field; the source bounds become the declared bounds.
    #[must_use]
    pub fn from_source(source: FieldSource) -> Self {
        Self {
            bounds: source.bounds.into_iter().collect(),
            sources: vec![source],
            metadata: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Superposes every source acting at `point`.
    #[must_use]
    pub fn evaluate(&self, point: Point3) -> FieldEvaluation {
        let mut vector = Vec3::ZERO;
        let mut strength = 0.0;
        let mut tensor = SymmetricTensor::ZERO;
        let mut contributions = Vec::new();

        for (index, source) in self.sources.iter().enumerate() {
            if !source.acts_at(point) {
                continue;
            }
            let sample = source.model.sample(point);
            if !sample.vector.is_finite() || !sample.strength.is_finite() {
                log::trace!("field: skipping non-finite {} at {point:?}", source.kind().name());
                continue;
            }
            let weight = sample.strength.abs();
            vector = vector + sample.vector;
            strength += weight;
            tensor += sample
                .tensor
                .unwrap_or_else(|| SymmetricTensor::outer(sample.vector.unit_or_zero()) * weight);
            contributions.push(FieldContribution {
                index,
                kind: source.kind(),
                vector: sample.vector,
                strength: sample.strength,
            });
        }

        let magnitude = vector.length();
        let direction = if magnitude > FIELD_EPSILON {
            vector / magnitude
        } else {
            Vec3::ZERO
        };

        FieldEvaluation {
            point,
            vector,
            magnitude,
            direction,
            strength,
            tensor: FieldTensor::from_matrix(tensor),
            contributions,
        }
    }

    /// Concatenates sources and declared bounds in input order. With exactly
    /// one input declaring bounds the result carries just that input's list.
    #[must_use]
    pub fn merge(fields: &[Self]) -> Self {
        let mut merged = Self::default();
        for field in fields {
            merged.sources.extend(field.sources.iter().cloned());
            merged.bounds.extend(field.bounds.iter().copied());
            merged
                .metadata
                .extend(field.metadata.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        merged
    }

    /// One single-source field per source, each keeping this field's
    /// declared bounds and metadata.
    #[must_use]
    pub fn split(&self) -> Vec<Self> {
        self.sources
            .iter()
            .map(|source| Self {
                sources: vec![source.clone()],
                bounds: self.bounds.clone(),
                metadata: self.metadata.clone(),
            })
            .collect()
    }

    /// Evaluations over a regular grid on `section`, u-major.
    #[must_use]
    pub fn sample_grid(&self, section: &FieldSection, sampling: GridSampling) -> Vec<FieldEvaluation> {
        let points = section.grid_points(sampling);

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            points.into_par_iter().map(|point| self.evaluate(point)).collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            points.into_iter().map(|point| self.evaluate(point)).collect()
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Grid sampling
// ─────────────────────────────────────────────────────────────────────────────

/// Upper bound per axis for [`GridSampling::new`].
pub const MAX_GRID_SAMPLES: usize = 1024;

/// Sample counts along u and v, each in `1..=MAX_GRID_SAMPLES`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSampling {
    pub u_count: usize,
    pub v_count: usize,
}

impl Default for GridSampling {
    fn default() -> Self {
        Self::new(10, 10)
    }
}

impl GridSampling {
    #[must_use]
    pub fn new(u_count: usize, v_count: usize) -> Self {
        Self {
            u_count: u_count.clamp(1, MAX_GRID_SAMPLES),
            v_count: v_count.clamp(1, MAX_GRID_SAMPLES),
        }
    }
}

/// Rectangle `[u.0, u.1] × [v.0, v.1]` in the coordinates of `frame`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldSection {
    pub frame: Frame,
    pub u: (f64, f64),
    pub v: (f64, f64),
}

impl Default for FieldSection {
    fn default() -> Self {
        Self {
            frame: Frame::default(),
            u: (-0.5, 0.5),
            v: (-0.5, 0.5),
        }
    }
}

impl FieldSection {
    /// Section on the frame through `a`, `b`, `c`, spanning their extents.
    #[must_use]
    pub fn from_points(a: Point3, b: Point3, c: Point3) -> Self {
        let frame = Frame::from_three_points(a, b, c);
        let coords = [a, b, c].map(|p| frame.coordinates(p));
        let extent = |axis: usize| {
            coords.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
                (lo.min(c[axis]), hi.max(c[axis]))
            })
        };
        Self {
            frame,
            u: extent(0),
            v: extent(1),
        }
    }

    #[must_use]
    pub fn sample_point(&self, u_index: usize, v_index: usize, sampling: GridSampling) -> Point3 {
        let ratio = |index: usize, count: usize| {
            if count <= 1 {
                0.0
            } else {
                index as f64 / (count as f64 - 1.0)
            }
        };
        let u = self.u.0 + (self.u.1 - self.u.0) * ratio(u_index, sampling.u_count);
        let v = self.v.0 + (self.v.1 - self.v.0) * ratio(v_index, sampling.v_count);
        self.frame.point_at(u, v, 0.0)
    }

    #[must_use]
    pub fn grid_points(&self, sampling: GridSampling) -> Vec<Point3> {
        let capacity = sampling.u_count.saturating_mul(sampling.v_count);
        let mut points = Vec::with_capacity(capacity.min(MAX_GRID_SAMPLES));
        for u in 0..sampling.u_count {
            for v in 0..sampling.v_count {
                points.push(self.sample_point(u, v, sampling));
            }
        }
        points
    }
}
