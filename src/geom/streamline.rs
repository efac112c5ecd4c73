//! Streamline integration through a [`Field`].

use serde::{Deserialize, Serialize};

use super::core::{Point3, Vec3, clamp_finite, finite_or};
use super::field::{FIELD_EPSILON, Field};

/// Speed band applied to the unit field direction.
pub const MIN_SPEED: f64 = 0.1;
pub const MAX_SPEED: f64 = 5.0;

/// Explicit integrator used per step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntegratorOrder {
    Euler,
    Midpoint,
    /// Plain average of three chained samples, not classical RK3 weighting.
    ThreeSample,
    #[default]
    RungeKutta4,
}

impl IntegratorOrder {
    /// Maps 1..=4 onto the integrators; out-of-range values are clamped.
    #[must_use]
    pub fn from_index(order: i64) -> Self {
        match order {
            i64::MIN..=1 => Self::Euler,
            2 => Self::Midpoint,
            3 => Self::ThreeSample,
            _ => Self::RungeKutta4,
        }
    }

    #[must_use]
    pub fn index(self) -> u8 {
        match self {
            Self::Euler => 1,
            Self::Midpoint => 2,
            Self::ThreeSample => 3,
            Self::RungeKutta4 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StreamlineOptions {
    pub steps: usize,
    pub step_size: f64,
    pub order: IntegratorOrder,
}

impl Default for StreamlineOptions {
    fn default() -> Self {
        Self {
            steps: 25,
            step_size: 0.5,
            order: IntegratorOrder::RungeKutta4,
        }
    }
}

impl StreamlineOptions {
    #[must_use]
    pub fn with_steps(mut self, steps: usize) -> Self {
        self.steps = steps;
        self
    }

    #[must_use]
    pub fn with_step_size(mut self, step_size: f64) -> Self {
        self.step_size = step_size;
        self
    }

    #[must_use]
    pub fn with_order(mut self, order: IntegratorOrder) -> Self {
        self.order = order;
        self
    }
}

/// Speed-clamped field direction at `point`, `None` where the field vanishes.
#[must_use]
pub fn field_direction(field: &Field, point: Point3) -> Option<Vec3> {
    let evaluation = field.evaluate(point);
    if evaluation.magnitude.is_nan() || evaluation.magnitude <= FIELD_EPSILON {
        return None;
    }
    let speed = clamp_finite(evaluation.magnitude, MIN_SPEED, MAX_SPEED);
    Some(evaluation.direction * speed)
}

/// Traces a streamline from `seed`. The seed is always the first point.
#[must_use]
pub fn integrate(field: &Field, seed: Point3, options: &StreamlineOptions) -> Vec<Point3> {
    integrate_with(|point| field_direction(field, point), seed, options)
}

/// Same stepper over an arbitrary direction function.
///
/// Stops after `options.steps` steps, when `direction` yields `None` at the
/// start of a step, or when a step moves less than [`FIELD_EPSILON`].
pub fn integrate_with<F>(direction: F, seed: Point3, options: &StreamlineOptions) -> Vec<Point3>
where
    F: Fn(Point3) -> Option<Vec3>,
{
    let h = finite_or(options.step_size, StreamlineOptions::default().step_size);
    let mut points = Vec::with_capacity(options.steps.min(1024) + 1);
    points.push(seed);

    let mut point = seed;
    for step in 0..options.steps {
        let Some(k1) = direction(point) else {
            log::trace!("streamline: no direction after {step} steps");
            break;
        };

        let slope = match options.order {
            IntegratorOrder::Euler => k1,
            IntegratorOrder::Midpoint => {
                let k2 = direction(point + k1 * (h * 0.5)).unwrap_or(k1);
                (k1 + k2) * 0.5
            }
            IntegratorOrder::ThreeSample => {
                let k2 = direction(point + k1 * (h * 0.5)).unwrap_or(k1);
                let k3 = direction(point + k2 * (h * 0.5)).unwrap_or(k2);
                (k1 + k2 + k3) / 3.0
            }
            IntegratorOrder::RungeKutta4 => {
                let k2 = direction(point + k1 * (h * 0.5)).unwrap_or(k1);
                let k3 = direction(point + k2 * (h * 0.5)).unwrap_or(k2);
                let k4 = direction(point + k3 * h).unwrap_or(k3);
                (k1 + k2 * 2.0 + k3 * 2.0 + k4) / 6.0
            }
        };

        let next = point + slope * h;
        if next.distance_squared_to(point) < FIELD_EPSILON * FIELD_EPSILON {
            log::trace!("streamline: stalled after {step} steps");
            break;
        }
        points.push(next);
        point = next;
    }

    points
}
