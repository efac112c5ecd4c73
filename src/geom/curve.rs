//! Parametric curves and coarse-to-fine closest-point search.
//!
//! Curves are evaluated through the normalized parameter `t ∈ [0, 1]`. A curve
//! may declare a native domain; [`CurveQuery::map_to_domain`] rescales a
//! search result into it.

use serde::{Deserialize, Serialize};

use super::core::{Point3, Vec3};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CurveError {
    #[error("polyline requires at least 2 points, got {0}")]
    TooFewPoints(usize),
    #[error("polyline point {0} is not finite")]
    NonFinitePoint(usize),
}

/// Opaque curve evaluator.
pub trait Curve3 {
    /// Point at normalized parameter `t ∈ [0, 1]`, `None` when the curve
    /// cannot produce one.
    fn point_at(&self, t: f64) -> Option<Point3>;

    #[must_use]
    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Concrete curves
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Line3 {
    pub start: Point3,
    pub end: Point3,
}

impl Line3 {
    #[must_use]
    pub const fn new(start: Point3, end: Point3) -> Self {
        Self { start, end }
    }

    #[must_use]
    pub const fn direction(self) -> Vec3 {
        self.end.sub_point(self.start)
    }

    #[must_use]
    pub fn length(self) -> f64 {
        self.direction().length()
    }

    /// Closest point on the segment, clamped to its end points.
    #[must_use]
    pub fn closest_point_clamped(self, point: Point3) -> Point3 {
        let direction = self.direction();
        let length_sq = direction.length_squared();
        if length_sq <= f64::EPSILON {
            return self.start;
        }
        let t = ((point - self.start).dot(direction) / length_sq).clamp(0.0, 1.0);
        self.start.lerp(self.end, t)
    }
}

impl Curve3 for Line3 {
    fn point_at(&self, t: f64) -> Option<Point3> {
        let point = self.start.lerp(self.end, t);
        point.is_finite().then_some(point)
    }
}

/// Arc-length parameterised polyline, optionally closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PolylineParts", into = "PolylineParts")]
pub struct Polyline3 {
    points: Vec<Point3>,
    closed: bool,
}

#[derive(Serialize, Deserialize)]
struct PolylineParts {
    points: Vec<Point3>,
    #[serde(default)]
    closed: bool,
}

impl TryFrom<PolylineParts> for Polyline3 {
    type Error = CurveError;

    fn try_from(parts: PolylineParts) -> Result<Self, Self::Error> {
        Self::new(parts.points, parts.closed)
    }
}

impl From<Polyline3> for PolylineParts {
    fn from(polyline: Polyline3) -> Self {
        Self {
            points: polyline.points,
            closed: polyline.closed,
        }
    }
}

impl Polyline3 {
    pub fn new(mut points: Vec<Point3>, closed: bool) -> Result<Self, CurveError> {
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(CurveError::NonFinitePoint(index));
        }
        if closed && points.len() > 2 && points.first() == points.last() {
            points.pop();
        }
        if points.len() < 2 {
            return Err(CurveError::TooFewPoints(points.len()));
        }
        Ok(Self { points, closed })
    }

    #[must_use]
    pub fn points(&self) -> &[Point3] {
        &self.points
    }

    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn segments(&self) -> impl Iterator<Item = Line3> + '_ {
        let closing = self
            .closed
            .then(|| self.points.last().zip(self.points.first()))
            .flatten()
            .map(|(last, first)| Line3::new(*last, *first));
        self.points
            .windows(2)
            .map(|pair| Line3::new(pair[0], pair[1]))
            .chain(closing)
    }

    #[must_use]
    pub fn length(&self) -> f64 {
        self.segments().map(Line3::length).sum()
    }
}

impl Curve3 for Polyline3 {
    fn point_at(&self, t: f64) -> Option<Point3> {
        if !t.is_finite() {
            return None;
        }
        let total = self.length();
        if total <= 0.0 || !total.is_finite() {
            return self.points.first().copied();
        }

        let mut remaining = t.clamp(0.0, 1.0) * total;
        let mut last = None;
        for segment in self.segments() {
            let length = segment.length();
            if remaining <= length && length > 0.0 {
                return Some(segment.start.lerp(segment.end, remaining / length));
            }
            remaining -= length;
            last = Some(segment.end);
        }
        last
    }
}

/// Adapts a host-supplied evaluator closure to [`Curve3`].
pub struct FnCurve<F> {
    evaluate: F,
    domain: (f64, f64),
}

impl<F> FnCurve<F>
where
    F: Fn(f64) -> Option<Point3>,
{
    pub fn new(evaluate: F) -> Self {
        Self {
            evaluate,
            domain: (0.0, 1.0),
        }
    }

    #[must_use]
    pub fn with_domain(mut self, start: f64, end: f64) -> Self {
        self.domain = (start, end);
        self
    }
}

impl<F> Curve3 for FnCurve<F>
where
    F: Fn(f64) -> Option<Point3>,
{
    fn point_at(&self, t: f64) -> Option<Point3> {
        (self.evaluate)(t).filter(|point| point.is_finite())
    }

    fn domain(&self) -> (f64, f64) {
        self.domain
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Closest-point search
// ─────────────────────────────────────────────────────────────────────────────

const MIN_SAMPLE_COUNT: usize = 8;
const REFINEMENT_SAMPLES: usize = 11;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveSearchOptions {
    /// Uniform samples in the coarse pass; raised to at least 8.
    pub sample_count: usize,
    pub refinement_rounds: usize,
}

impl Default for CurveSearchOptions {
    fn default() -> Self {
        Self {
            sample_count: 128,
            refinement_rounds: 4,
        }
    }
}

impl CurveSearchOptions {
    #[must_use]
    pub fn with_sample_count(mut self, sample_count: usize) -> Self {
        self.sample_count = sample_count;
        self
    }

    #[must_use]
    pub fn with_refinement_rounds(mut self, rounds: usize) -> Self {
        self.refinement_rounds = rounds;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurveQuery {
    /// Normalized parameter in `[0, 1]`.
    pub t: f64,
    pub point: Point3,
    pub distance: f64,
    pub distance_sq: f64,
}

impl CurveQuery {
    /// `t` rescaled into `domain`.
    #[must_use]
    pub fn map_to_domain(&self, domain: (f64, f64)) -> f64 {
        let (start, end) = domain;
        start + self.t * (end - start)
    }
}

struct Best {
    t: f64,
    point: Point3,
    distance_sq: f64,
}

impl Best {
    fn consider(best: &mut Option<Self>, curve: &impl Curve3, query: Point3, t: f64) {
        let Some(point) = curve.point_at(t) else {
            return;
        };
        let distance_sq = point.distance_squared_to(query);
        if !distance_sq.is_finite() {
            return;
        }
        if best.as_ref().is_none_or(|b| distance_sq < b.distance_sq) {
            *best = Some(Self { t, point, distance_sq });
        }
    }
}

/// Approximate closest point on `curve` to `query`.
///
/// Uniform sampling followed by window-halving refinement around the best
/// sample. Not guaranteed to find the global optimum. Returns `None` if the
/// curve never produced a point.
#[must_use]
pub fn closest_point(
    curve: &impl Curve3,
    query: Point3,
    options: &CurveSearchOptions,
) -> Option<CurveQuery> {
    let sample_count = options.sample_count.max(MIN_SAMPLE_COUNT);
    let mut best: Option<Best> = None;

    for i in 0..sample_count {
        let t = i as f64 / (sample_count - 1) as f64;
        Best::consider(&mut best, curve, query, t);
    }

    let mut radius = 1.0 / sample_count as f64;
    for _ in 0..options.refinement_rounds {
        let Some(center) = best.as_ref().map(|b| b.t) else {
            break;
        };
        let lo = (center - radius).max(0.0);
        let hi = (center + radius).min(1.0);
        for j in 0..REFINEMENT_SAMPLES {
            let t = lo + (hi - lo) * j as f64 / (REFINEMENT_SAMPLES - 1) as f64;
            Best::consider(&mut best, curve, query, t);
        }
        radius *= 0.5;
    }

    best.map(|b| CurveQuery {
        t: b.t,
        point: b.point,
        distance: b.distance_sq.sqrt(),
        distance_sq: b.distance_sq,
    })
}

/// Indices of `points` ordered by their closest parameter on `curve`.
///
/// The sort is stable; points the search cannot place keep their relative
/// order at the end.
#[must_use]
pub fn sort_along_curve(
    curve: &impl Curve3,
    points: &[Point3],
    options: &CurveSearchOptions,
) -> Vec<usize> {
    let mut keyed: Vec<(usize, Option<f64>)> = points
        .iter()
        .enumerate()
        .map(|(index, point)| (index, closest_point(curve, *point, options).map(|q| q.t)))
        .collect();
    keyed.sort_by(|a, b| match (a.1, b.1) {
        (Some(ta), Some(tb)) => ta.total_cmp(&tb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => std::cmp::Ordering::Equal,
    });
    keyed.into_iter().map(|(index, _)| index).collect()
}

/// Closest-point result for every point.
#[must_use]
pub fn pull_points(
    curve: &impl Curve3,
    points: &[Point3],
    options: &CurveSearchOptions,
) -> Vec<Option<CurveQuery>> {
    points
        .iter()
        .map(|point| closest_point(curve, *point, options))
        .collect()
}
