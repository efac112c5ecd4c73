//! Implementaties van Grasshopper "Vector → Field" componenten.
//!
//! De componenten bouwen [`Field`]-waarden op, combineren ze en bemonsteren
//! ze. De fysica zit volledig in `geom::field`; hier gebeurt alleen de
//! vertaling van pinnen naar kerneltypes en terug.

use std::collections::BTreeMap;

use crate::geom::{
    Field, FieldEvaluation, FieldSection, FieldSource, GridSampling, IntegratorOrder, Line3,
    LineCharge, PointCharge, SegmentForce, SourceModel, SpinForce, StreamlineOptions, integrate,
};
use crate::value::{ColorValue, CurveValue, Value};

use super::coerce::{
    to_bounds, to_color, to_count, to_curve, to_field, to_fields, to_frame, to_point, to_points,
    to_scalar,
};
use super::{Component, ComponentError, ComponentResult, OutputMap};

const PIN_OUTPUT_DISPLAY: &str = "D";
const PIN_OUTPUT_FIELD: &str = "F";
const PIN_OUTPUT_FIELDS: &str = "F";
const PIN_OUTPUT_TENSOR: &str = "T";
const PIN_OUTPUT_STRENGTH: &str = "S";
const PIN_OUTPUT_CURVE: &str = "C";

const DEFAULT_POSITIVE_COLOUR: ColorValue = ColorValue {
    r: 0.95,
    g: 0.45,
    b: 0.35,
};
const DEFAULT_NEGATIVE_COLOUR: ColorValue = ColorValue {
    r: 0.35,
    g: 0.55,
    b: 0.95,
};

/// Beschikbare componenten binnen deze module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    TensorDisplay,
    SpinForce,
    ScalarDisplay,
    DirectionDisplay,
    LineCharge,
    EvaluateField,
    FieldLine,
    BreakField,
    PerpendicularDisplay,
    PointCharge,
    VectorForce,
    MergeFields,
}

/// Metadata voor registraties in de componentregistry.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub guids: &'static [&'static str],
    pub names: &'static [&'static str],
    pub kind: ComponentKind,
}

/// Volledige lijst van componentregistraties voor de vector-field componenten.
pub const REGISTRATIONS: &[Registration] = &[
    Registration {
        guids: &["{08619b6d-f9c4-4cb2-adcd-90959f08dc0d}"],
        names: &["Tensor Display", "FTensor"],
        kind: ComponentKind::TensorDisplay,
    },
    Registration {
        guids: &["{4b59e893-d4ee-4e31-ae24-a489611d1088}"],
        names: &["Spin Force", "FSpin"],
        kind: ComponentKind::SpinForce,
    },
    Registration {
        guids: &["{55f9ce6a-490c-4f25-a536-a3d47b794752}"],
        names: &["Scalar Display", "FScalar"],
        kind: ComponentKind::ScalarDisplay,
    },
    Registration {
        guids: &["{5ba20fab-6d71-48ea-a98f-cb034db6bbdc}"],
        names: &["Direction Display", "FDir"],
        kind: ComponentKind::DirectionDisplay,
    },
    Registration {
        guids: &["{8cc9eb88-26a7-4baa-a896-13e5fc12416a}"],
        names: &["Line Charge", "LCharge"],
        kind: ComponentKind::LineCharge,
    },
    Registration {
        guids: &["{a7c9f738-f8bd-4f64-8e7f-33341183e493}"],
        names: &["Evaluate Field", "EvF"],
        kind: ComponentKind::EvaluateField,
    },
    Registration {
        guids: &["{add6be3e-c57f-4740-96e4-5680abaa9169}"],
        names: &["Field Line", "FLine"],
        kind: ComponentKind::FieldLine,
    },
    Registration {
        guids: &["{b27d53bc-e713-475d-81fd-71cdd8de2e58}"],
        names: &["Break Field", "BreakF"],
        kind: ComponentKind::BreakField,
    },
    Registration {
        guids: &["{bf106e4c-68f4-476f-b05b-9c15fb50e078}"],
        names: &["Perpendicular Display", "FPerp"],
        kind: ComponentKind::PerpendicularDisplay,
    },
    Registration {
        guids: &["{cffdbaf3-8d33-4b38-9cad-c264af9fc3f4}"],
        names: &["Point Charge", "PCharge"],
        kind: ComponentKind::PointCharge,
    },
    Registration {
        guids: &["{d27cc1ea-9ef7-47bf-8ee2-c6662da0e3d9}"],
        names: &["Vector Force", "FVector"],
        kind: ComponentKind::VectorForce,
    },
    Registration {
        guids: &["{d9a6fbd2-2e9f-472e-8147-33bf0233a115}"],
        names: &["Merge Fields", "MergeF"],
        kind: ComponentKind::MergeFields,
    },
];

impl Component for ComponentKind {
    fn evaluate(&self, inputs: &[Value]) -> ComponentResult {
        match self {
            Self::TensorDisplay => evaluate_tensor_display(inputs),
            Self::SpinForce => evaluate_spin_force(inputs),
            Self::ScalarDisplay => evaluate_scalar_display(inputs),
            Self::DirectionDisplay => evaluate_direction_display(inputs),
            Self::LineCharge => evaluate_line_charge(inputs),
            Self::EvaluateField => evaluate_field_value(inputs),
            Self::FieldLine => evaluate_field_line(inputs),
            Self::BreakField => evaluate_break_field(inputs),
            Self::PerpendicularDisplay => evaluate_perpendicular_display(inputs),
            Self::PointCharge => evaluate_point_charge(inputs),
            Self::VectorForce => evaluate_vector_force(inputs),
            Self::MergeFields => evaluate_merge_fields(inputs),
        }
    }
}

impl ComponentKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::TensorDisplay => "Tensor Display",
            Self::SpinForce => "Spin Force",
            Self::ScalarDisplay => "Scalar Display",
            Self::DirectionDisplay => "Direction Display",
            Self::LineCharge => "Line Charge",
            Self::EvaluateField => "Evaluate Field",
            Self::FieldLine => "Field Line",
            Self::BreakField => "Break Field",
            Self::PerpendicularDisplay => "Perpendicular Display",
            Self::PointCharge => "Point Charge",
            Self::VectorForce => "Vector Force",
            Self::MergeFields => "Merge Fields",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Bronnen
// ─────────────────────────────────────────────────────────────────────────────

fn evaluate_point_charge(inputs: &[Value]) -> ComponentResult {
    let position = to_point(inputs.first())?
        .ok_or_else(|| ComponentError::new("Point Charge vereist minimaal een punt"))?;
    let charge = to_scalar(inputs.get(1), 1.0)?;
    let decay = to_scalar(inputs.get(2), 2.0)?.max(0.0);
    let bounds = to_bounds(inputs.get(3))?;

    let source = FieldSource::new(SourceModel::PointCharge(PointCharge {
        position,
        charge,
        decay,
    }))
    .with_bounds(bounds);
    Ok(field_output(Field::from_source(source)))
}

fn evaluate_line_charge(inputs: &[Value]) -> ComponentResult {
    let segment = require_segment(inputs.first(), "Line Charge")?;
    let charge = to_scalar(inputs.get(1), 1.0)?;
    let bounds = to_bounds(inputs.get(2))?;

    let source =
        FieldSource::new(SourceModel::LineCharge(LineCharge { segment, charge })).with_bounds(bounds);
    Ok(field_output(Field::from_source(source)))
}

fn evaluate_vector_force(inputs: &[Value]) -> ComponentResult {
    let segment = require_segment(inputs.first(), "Vector Force")?;
    let bounds = to_bounds(inputs.get(1))?;

    let source =
        FieldSource::new(SourceModel::SegmentForce(SegmentForce { segment })).with_bounds(bounds);
    Ok(field_output(Field::from_source(source)))
}

fn evaluate_spin_force(inputs: &[Value]) -> ComponentResult {
    let frame = to_frame(inputs.first())?.unwrap_or_default();
    let strength = to_scalar(inputs.get(1), 1.0)?;
    let radius = to_scalar(inputs.get(2), 1.0)?.abs();
    let decay = to_scalar(inputs.get(3), 2.0)?.max(0.0);
    let bounds = to_bounds(inputs.get(4))?;

    let source = FieldSource::new(SourceModel::Spin(SpinForce {
        frame,
        strength,
        radius,
        decay,
    }))
    .with_bounds(bounds);
    Ok(field_output(Field::from_source(source)))
}

// ─────────────────────────────────────────────────────────────────────────────
// Samenstelling en evaluatie
// ─────────────────────────────────────────────────────────────────────────────

fn evaluate_merge_fields(inputs: &[Value]) -> ComponentResult {
    let mut fields = Vec::new();
    for input in inputs {
        fields.extend(to_fields(Some(input))?);
    }
    Ok(field_output(Field::merge(&fields)))
}

fn evaluate_break_field(inputs: &[Value]) -> ComponentResult {
    let field = to_field(inputs.first())?.unwrap_or_default();
    let parts = field.split().into_iter().map(Value::Field).collect();

    let mut outputs = BTreeMap::new();
    outputs.insert(PIN_OUTPUT_FIELDS.to_owned(), Value::List(parts));
    Ok(outputs)
}

fn evaluate_field_value(inputs: &[Value]) -> ComponentResult {
    let field = require_field(inputs.first(), "Evaluate Field")?;
    let points = to_points(inputs.get(1))?;
    if points.is_empty() {
        return Err(ComponentError::new("Evaluate Field vereist een punt"));
    }

    let evaluations: Vec<FieldEvaluation> =
        points.into_iter().map(|point| field.evaluate(point)).collect();
    let mut tensors: Vec<Value> = evaluations.iter().map(tensor_entry).collect();
    let mut strengths: Vec<Value> = evaluations
        .iter()
        .map(|evaluation| Value::Number(evaluation.strength))
        .collect();

    let mut outputs = BTreeMap::new();
    if tensors.len() == 1 {
        outputs.insert(PIN_OUTPUT_TENSOR.to_owned(), tensors.remove(0));
        outputs.insert(PIN_OUTPUT_STRENGTH.to_owned(), strengths.remove(0));
    } else {
        outputs.insert(PIN_OUTPUT_TENSOR.to_owned(), Value::List(tensors));
        outputs.insert(PIN_OUTPUT_STRENGTH.to_owned(), Value::List(strengths));
    }
    Ok(outputs)
}

fn evaluate_field_line(inputs: &[Value]) -> ComponentResult {
    let field = require_field(inputs.first(), "Field Line")?;
    let seed = to_point(inputs.get(1))?
        .ok_or_else(|| ComponentError::new("Field Line vereist een startpunt"))?;
    let defaults = StreamlineOptions::default();
    let steps = to_count(inputs.get(2), defaults.steps)?;
    let step_size = to_scalar(inputs.get(3), defaults.step_size)?;
    let order = to_scalar(inputs.get(4), f64::from(defaults.order.index()))?;

    let options = defaults
        .with_steps(steps)
        .with_step_size(step_size)
        .with_order(IntegratorOrder::from_index(order.round() as i64));
    let line = integrate(&field, seed, &options);

    let mut outputs = BTreeMap::new();
    outputs.insert(PIN_OUTPUT_CURVE.to_owned(), Value::points(line));
    Ok(outputs)
}

// ─────────────────────────────────────────────────────────────────────────────
// Weergave-data
// ─────────────────────────────────────────────────────────────────────────────

struct DisplayGrid {
    section: FieldSection,
    evaluations: Vec<FieldEvaluation>,
}

fn sample_display(inputs: &[Value], context: &'static str) -> Result<DisplayGrid, ComponentError> {
    let field = require_field(inputs.first(), context)?;
    let section = parse_section(inputs.get(1))?;
    let sampling = parse_samples(inputs.get(2))?;
    let evaluations = field.sample_grid(&section, sampling);
    Ok(DisplayGrid {
        section,
        evaluations,
    })
}

fn display_output(entries: Vec<Value>) -> OutputMap {
    let mut outputs = BTreeMap::new();
    outputs.insert(PIN_OUTPUT_DISPLAY.to_owned(), Value::List(entries));
    outputs
}

fn evaluate_tensor_display(inputs: &[Value]) -> ComponentResult {
    let grid = sample_display(inputs, "Tensor Display")?;
    let entries = grid.evaluations.iter().map(tensor_entry).collect();
    Ok(display_output(entries))
}

fn evaluate_scalar_display(inputs: &[Value]) -> ComponentResult {
    let grid = sample_display(inputs, "Scalar Display")?;
    let entries = grid
        .evaluations
        .iter()
        .map(|evaluation| {
            Value::List(vec![
                Value::point(evaluation.point),
                Value::Number(evaluation.magnitude),
            ])
        })
        .collect();
    Ok(display_output(entries))
}

fn evaluate_direction_display(inputs: &[Value]) -> ComponentResult {
    let grid = sample_display(inputs, "Direction Display")?;
    let entries = grid
        .evaluations
        .iter()
        .map(|evaluation| {
            Value::List(vec![
                Value::point(evaluation.point),
                Value::vector(evaluation.direction),
            ])
        })
        .collect();
    Ok(display_output(entries))
}

fn evaluate_perpendicular_display(inputs: &[Value]) -> ComponentResult {
    let grid = sample_display(inputs, "Perpendicular Display")?;
    let positive = to_color(inputs.get(3))?.unwrap_or(DEFAULT_POSITIVE_COLOUR);
    let negative = to_color(inputs.get(4))?.unwrap_or(DEFAULT_NEGATIVE_COLOUR);
    let normal = grid.section.frame.z_axis;

    let entries = grid
        .evaluations
        .iter()
        .map(|evaluation| {
            let factor = (evaluation.alignment(normal) + 1.0) / 2.0;
            Value::List(vec![
                Value::point(evaluation.point),
                Value::Color(negative.lerp(positive, factor)),
            ])
        })
        .collect();
    Ok(display_output(entries))
}

/// `[punt, vector, grootte, richting, hoofdrichtingen]`; elke hoofdrichting
/// is geschaald met haar eigenwaarde.
fn tensor_entry(evaluation: &FieldEvaluation) -> Value {
    let principal = evaluation
        .tensor
        .principal
        .iter()
        .map(|direction| Value::vector(direction.direction * direction.magnitude))
        .collect();
    Value::List(vec![
        Value::point(evaluation.point),
        Value::vector(evaluation.vector),
        Value::Number(evaluation.magnitude),
        Value::vector(evaluation.direction),
        Value::List(principal),
    ])
}

// ─────────────────────────────────────────────────────────────────────────────
// Invoer
// ─────────────────────────────────────────────────────────────────────────────

fn require_field(value: Option<&Value>, context: &'static str) -> Result<Field, ComponentError> {
    to_field(value)?.ok_or_else(|| ComponentError::new(format!("{context} vereist een veld")))
}

fn require_segment(value: Option<&Value>, context: &'static str) -> Result<Line3, ComponentError> {
    match to_curve(value)? {
        Some(CurveValue::Line(line)) => Ok(line),
        Some(CurveValue::Polyline(_)) => Err(ComponentError::new(format!(
            "{context} verwacht een lijnsegment, kreeg een polylijn"
        ))),
        None => Err(ComponentError::new(format!(
            "{context} vereist minimaal een lijn"
        ))),
    }
}

/// Doorsnede: een vlak met standaardafmetingen, of drie punten die het vlak
/// én de afmetingen bepalen.
fn parse_section(value: Option<&Value>) -> Result<FieldSection, ComponentError> {
    let points = match value {
        Some(Value::List(values)) if values.len() >= 3 => to_points(value)?,
        _ => {
            return Ok(to_frame(value)?
                .map(|frame| FieldSection {
                    frame,
                    ..FieldSection::default()
                })
                .unwrap_or_default());
        }
    };
    match points.as_slice() {
        [a, b, c, ..] => Ok(FieldSection::from_points(*a, *b, *c)),
        _ => Err(ComponentError::new(
            "doorsnede vereist drie geldige punten",
        )),
    }
}

/// Aantal monsters: één getal voor beide richtingen, of een paar `[u, v]`.
fn parse_samples(value: Option<&Value>) -> Result<GridSampling, ComponentError> {
    let defaults = GridSampling::default();
    match value {
        Some(Value::List(values)) if values.len() >= 2 => {
            let u = to_count(values.first(), defaults.u_count)?;
            let v = to_count(values.get(1), u)?;
            Ok(GridSampling::new(u, v))
        }
        _ => {
            let count = to_count(value, defaults.u_count)?;
            Ok(GridSampling::new(count, count))
        }
    }
}

fn field_output(field: Field) -> OutputMap {
    let mut outputs = BTreeMap::new();
    outputs.insert(PIN_OUTPUT_FIELD.to_owned(), Value::Field(field));
    outputs
}

#[cfg(test)]
mod tests {
    use super::{Component, ComponentKind};
    use crate::geom::{Field, Frame, Line3, Point3, Vec3};
    use crate::value::{ColorValue, CurveValue, Value};

    fn field_of(kind: ComponentKind, inputs: &[Value]) -> Field {
        let outputs = kind.evaluate(inputs).expect("component slaagt");
        outputs
            .get("F")
            .expect("veld-uitvoer")
            .expect_field()
            .expect("een veld")
            .clone()
    }

    fn unit_charge() -> Value {
        Value::Field(field_of(
            ComponentKind::PointCharge,
            &[Value::Point([0.0, 0.0, 0.0])],
        ))
    }

    #[test]
    fn point_charge_uses_defaults() {
        let field = field_of(ComponentKind::PointCharge, &[Value::Point([1.0, 0.0, 0.0])]);
        assert_eq!(field.sources.len(), 1);
        let evaluation = field.evaluate(Point3::new(2.0, 0.0, 0.0));
        assert!((evaluation.magnitude - 1.0).abs() < 1e-6);
        assert!(field.bounds.is_empty());

        let err = ComponentKind::PointCharge.evaluate(&[]).unwrap_err();
        assert_eq!(err.to_string(), "Point Charge vereist minimaal een punt");
    }

    #[test]
    fn bounds_pin_gates_the_source() {
        let bounds = Value::List(vec![
            Value::Point([-1.0, -1.0, -1.0]),
            Value::Point([1.0, 1.0, 1.0]),
        ]);
        let field = field_of(
            ComponentKind::PointCharge,
            &[Value::Point([0.0, 0.0, 0.0]), Value::Null, Value::Null, bounds],
        );
        assert_eq!(field.bounds.len(), 1);
        assert!(field.evaluate(Point3::new(5.0, 0.0, 0.0)).contributions.is_empty());
        assert_eq!(field.evaluate(Point3::new(0.5, 0.0, 0.0)).contributions.len(), 1);
    }

    #[test]
    fn vector_force_requires_a_segment() {
        let line = Value::Curve(CurveValue::Line(Line3::new(
            Point3::ORIGIN,
            Point3::new(2.0, 0.0, 0.0),
        )));
        let field = field_of(ComponentKind::VectorForce, &[line]);
        let evaluation = field.evaluate(Point3::new(1.0, 0.0, 0.0));
        assert!((evaluation.vector.x - 1.0).abs() < 1e-9);

        let err = ComponentKind::VectorForce.evaluate(&[Value::Null]).unwrap_err();
        assert_eq!(err.to_string(), "Vector Force vereist minimaal een lijn");
    }

    #[test]
    fn merge_and_break_round_trip_sources() {
        let spin = Value::Field(field_of(ComponentKind::SpinForce, &[]));
        let merged = field_of(ComponentKind::MergeFields, &[unit_charge(), spin]);
        assert_eq!(merged.sources.len(), 2);

        let outputs = ComponentKind::BreakField
            .evaluate(&[Value::Field(merged)])
            .expect("component slaagt");
        let parts = outputs["F"].expect_list().expect("lijst");
        assert_eq!(parts.len(), 2);

        let empty = field_of(ComponentKind::MergeFields, &[]);
        assert!(empty.is_empty());
    }

    #[test]
    fn evaluate_field_reports_tensor_and_strength() {
        let outputs = ComponentKind::EvaluateField
            .evaluate(&[unit_charge(), Value::Point([0.0, 2.0, 0.0])])
            .expect("component slaagt");
        let strength = outputs["S"].expect_number().expect("sterkte");
        assert!((strength - 0.25).abs() < 1e-9);
        let tensor = outputs["T"].expect_list().expect("tensor-data");
        assert_eq!(tensor.len(), 5);
        assert_eq!(tensor[3], Value::Vector([0.0, 1.0, 0.0]));

        let err = ComponentKind::EvaluateField
            .evaluate(&[unit_charge()])
            .unwrap_err();
        assert_eq!(err.to_string(), "Evaluate Field vereist een punt");
    }

    #[test]
    fn field_line_integrates_with_pins() {
        let uniform = Field::from_source(crate::geom::FieldSource::new(
            crate::geom::SourceModel::Uniform(crate::geom::UniformForce { vector: Vec3::X }),
        ));
        let outputs = ComponentKind::FieldLine
            .evaluate(&[
                Value::Field(uniform),
                Value::Point([0.0, 0.0, 0.0]),
                Value::Number(4.0),
                Value::Number(1.0),
                Value::Number(1.0),
            ])
            .expect("component slaagt");
        let points = outputs["C"].expect_list().expect("punten");
        assert_eq!(points.len(), 5);
        assert_eq!(points[4], Value::Point([4.0, 0.0, 0.0]));
    }

    #[test]
    fn displays_sample_the_section_grid() {
        let section = Value::Frame(Frame::world_xy(Point3::new(0.0, 0.0, 1.0)));
        let outputs = ComponentKind::ScalarDisplay
            .evaluate(&[unit_charge(), section.clone(), Value::Number(3.0)])
            .expect("component slaagt");
        let entries = outputs["D"].expect_list().expect("lijst");
        assert_eq!(entries.len(), 9);

        let outputs = ComponentKind::DirectionDisplay
            .evaluate(&[
                unit_charge(),
                section,
                Value::List(vec![Value::Number(2.0), Value::Number(4.0)]),
            ])
            .expect("component slaagt");
        assert_eq!(outputs["D"].expect_list().expect("lijst").len(), 8);

        let outputs = ComponentKind::TensorDisplay
            .evaluate(&[unit_charge()])
            .expect("component slaagt");
        assert_eq!(outputs["D"].expect_list().expect("lijst").len(), 100);
    }

    #[test]
    fn huge_sample_counts_are_capped() {
        let section = Value::Frame(Frame::world_xy(Point3::ORIGIN));
        let outputs = ComponentKind::ScalarDisplay
            .evaluate(&[
                unit_charge(),
                section,
                Value::List(vec![Value::Number(1e19), Value::Number(3.0)]),
            ])
            .expect("component slaagt");
        let entries = outputs["D"].expect_list().expect("lijst");
        assert_eq!(entries.len(), crate::geom::MAX_GRID_SAMPLES * 3);
    }

    #[test]
    fn perpendicular_display_blends_colours() {
        let uniform = Field::from_source(crate::geom::FieldSource::new(
            crate::geom::SourceModel::Uniform(crate::geom::UniformForce { vector: Vec3::Z }),
        ));
        let outputs = ComponentKind::PerpendicularDisplay
            .evaluate(&[
                Value::Field(uniform),
                Value::Null,
                Value::Number(1.0),
                Value::Color(ColorValue::new(1.0, 0.0, 0.0)),
                Value::Color(ColorValue::new(0.0, 0.0, 1.0)),
            ])
            .expect("component slaagt");
        let entries = outputs["D"].expect_list().expect("lijst");
        assert_eq!(entries.len(), 1);
        let entry = entries[0].expect_list().expect("paar");
        assert_eq!(entry[1], Value::Color(ColorValue::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn displays_require_a_field() {
        let err = ComponentKind::ScalarDisplay.evaluate(&[]).unwrap_err();
        assert_eq!(err.to_string(), "Scalar Display vereist een veld");
    }
}
