//! Implementaties van Grasshopper "Vector → Plane" componenten.
//!
//! Alle vlakken worden via [`Frame`] opgebouwd, zodat gedegenereerde invoer
//! altijd een geldig orthonormaal vlak oplevert.

use std::collections::BTreeMap;

use crate::geom::{Frame, Line3, Point3, Vec3, fit_plane, orthogonal_vector};
use crate::value::{CurveValue, Value};

use super::coerce::{to_boolean, to_curve, to_frame, to_point, to_points, to_scalar, to_vector};
use super::{Component, ComponentError, ComponentResult};

const PIN_OUTPUT_PLANE: &str = "P";
const PIN_OUTPUT_PLANES: &str = "P";
const PIN_OUTPUT_DEVIATION: &str = "dx";
const PIN_OUTPUT_ORIGIN: &str = "O";
const PIN_OUTPUT_X_AXIS: &str = "X";
const PIN_OUTPUT_Y_AXIS: &str = "Y";
const PIN_OUTPUT_Z_AXIS: &str = "Z";
const PIN_OUTPUT_U: &str = "X";
const PIN_OUTPUT_V: &str = "Y";
const PIN_OUTPUT_W: &str = "Z";
const PIN_OUTPUT_PROJECTED_POINT: &str = "P";
const PIN_OUTPUT_UV: &str = "uv";
const PIN_OUTPUT_DISTANCE: &str = "D";
const PIN_OUTPUT_ANGLE: &str = "A";
const PIN_OUTPUT_POINT: &str = "P";

/// Beschikbare componentvarianten binnen deze module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    XYPlane,
    AlignPlanes,
    PlaneFit,
    PlaneOffset,
    Deconstruct,
    PlaneCoordinates,
    PlaneOrigin,
    XZPlane,
    AdjustPlane,
    PlaneClosestPoint,
    ConstructPlane,
    FlipPlane,
    PlaneThreePoint,
    LinePoint,
    PlaneNormal,
    LineLine,
    AlignPlane,
    RotatePlane,
    YZPlane,
    PointOriented,
}

/// Metadata voor registraties in de componentregistry.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub guids: &'static [&'static str],
    pub names: &'static [&'static str],
    pub kind: ComponentKind,
}

/// Volledige lijst van componentregistraties voor de vector-plane componenten.
pub const REGISTRATIONS: &[Registration] = &[
    Registration {
        guids: &["{17b7152b-d30d-4d50-b9ef-c9fe25576fc2}"],
        names: &["XY Plane", "XY"],
        kind: ComponentKind::XYPlane,
    },
    Registration {
        guids: &["{2318aee8-01fe-4ea8-9524-6966023fc622}"],
        names: &["Align Planes", "Align"],
        kind: ComponentKind::AlignPlanes,
    },
    Registration {
        guids: &["{33bfc73c-19b2-480b-81e6-f3523a012ea6}"],
        names: &["Plane Fit", "PlFit"],
        kind: ComponentKind::PlaneFit,
    },
    Registration {
        guids: &["{3a0c7bda-3d22-4588-8bab-03f57a52a6ea}"],
        names: &["Plane Offset", "Pl Offset"],
        kind: ComponentKind::PlaneOffset,
    },
    Registration {
        guids: &["{3cd2949b-4ea8-4ffb-a70c-5c380f9f46ea}"],
        names: &["Deconstruct Plane", "DePlane"],
        kind: ComponentKind::Deconstruct,
    },
    Registration {
        guids: &["{5f127fa4-ca61-418e-bb2d-e3739d900f1f}"],
        names: &["Plane Coordinates", "PlCoord"],
        kind: ComponentKind::PlaneCoordinates,
    },
    Registration {
        guids: &["{75eec078-a905-47a1-b0d2-0934182b1e3d}"],
        names: &["Plane Origin", "Pl Origin"],
        kind: ComponentKind::PlaneOrigin,
    },
    Registration {
        guids: &["{8cc3a196-f6a0-49ea-9ed9-0cb343a3ae64}"],
        names: &["XZ Plane", "XZ"],
        kind: ComponentKind::XZPlane,
    },
    Registration {
        guids: &["{9ce34996-d8c6-40d3-b442-1a7c8c093614}"],
        names: &["Adjust Plane", "PAdjust"],
        kind: ComponentKind::AdjustPlane,
    },
    Registration {
        guids: &["{b075c065-efda-4c9f-9cc9-288362b1b4b9}"],
        names: &["Plane Closest Point", "CP"],
        kind: ComponentKind::PlaneClosestPoint,
    },
    Registration {
        guids: &["{bc3e379e-7206-4e7b-b63a-ff61f4b38a3e}"],
        names: &["Construct Plane", "Pl"],
        kind: ComponentKind::ConstructPlane,
    },
    Registration {
        guids: &["{c73e1ed0-82a2-40b0-b4df-8f10e445d60b}"],
        names: &["Flip Plane", "PFlip"],
        kind: ComponentKind::FlipPlane,
    },
    Registration {
        guids: &["{c98a6015-7a2f-423c-bc66-bdc505249b45}"],
        names: &["Plane 3Pt", "Pl 3Pt"],
        kind: ComponentKind::PlaneThreePoint,
    },
    Registration {
        guids: &["{ccc3f2ff-c9f6-45f8-aa30-8a924a9bda36}"],
        names: &["Line + Pt", "LnPt"],
        kind: ComponentKind::LinePoint,
    },
    Registration {
        guids: &["{cfb6b17f-ca82-4f5d-b604-d4f69f569de3}"],
        names: &["Plane Normal"],
        kind: ComponentKind::PlaneNormal,
    },
    Registration {
        guids: &["{d788ad7f-6d68-4106-8b2f-9e55e6e107c0}"],
        names: &["Line + Line", "LnLn"],
        kind: ComponentKind::LineLine,
    },
    Registration {
        guids: &["{e76040ec-3b91-41e1-8e00-c74c23b89391}"],
        names: &["Align Plane"],
        kind: ComponentKind::AlignPlane,
    },
    Registration {
        guids: &["{f6f14b09-6497-4564-8403-09e4eb5a6b82}"],
        names: &["Rotate Plane", "PRot"],
        kind: ComponentKind::RotatePlane,
    },
    Registration {
        guids: &["{fad344bc-09b1-4855-a2e6-437ef5715fe3}"],
        names: &["YZ Plane", "YZ"],
        kind: ComponentKind::YZPlane,
    },
    Registration {
        guids: &["{aa333235-5922-424c-9002-1e0b866a854b}"],
        names: &["Point Oriented", "Point UVW"],
        kind: ComponentKind::PointOriented,
    },
];

impl Component for ComponentKind {
    fn evaluate(&self, inputs: &[Value]) -> ComponentResult {
        match self {
            Self::XYPlane => evaluate_world_plane(inputs, Frame::world_xy),
            Self::XZPlane => evaluate_world_plane(inputs, Frame::world_xz),
            Self::YZPlane => evaluate_world_plane(inputs, Frame::world_yz),
            Self::AlignPlanes => evaluate_align_planes(inputs),
            Self::PlaneFit => evaluate_plane_fit(inputs),
            Self::PlaneOffset => evaluate_plane_offset(inputs),
            Self::Deconstruct => evaluate_deconstruct(inputs),
            Self::PlaneCoordinates => evaluate_plane_coordinates(inputs),
            Self::PlaneOrigin => evaluate_plane_origin(inputs),
            Self::AdjustPlane => evaluate_adjust_plane(inputs),
            Self::PlaneClosestPoint => evaluate_plane_closest_point(inputs),
            Self::ConstructPlane => evaluate_construct_plane(inputs),
            Self::FlipPlane => evaluate_flip_plane(inputs),
            Self::PlaneThreePoint => evaluate_plane_three_point(inputs),
            Self::LinePoint => evaluate_line_point(inputs),
            Self::PlaneNormal => evaluate_plane_normal(inputs),
            Self::LineLine => evaluate_line_line(inputs),
            Self::AlignPlane => evaluate_align_plane(inputs),
            Self::RotatePlane => evaluate_rotate_plane(inputs),
            Self::PointOriented => evaluate_point_oriented(inputs),
        }
    }
}

impl ComponentKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::XYPlane => "XY Plane",
            Self::AlignPlanes => "Align Planes",
            Self::PlaneFit => "Plane Fit",
            Self::PlaneOffset => "Plane Offset",
            Self::Deconstruct => "Deconstruct Plane",
            Self::PlaneCoordinates => "Plane Coordinates",
            Self::PlaneOrigin => "Plane Origin",
            Self::XZPlane => "XZ Plane",
            Self::AdjustPlane => "Adjust Plane",
            Self::PlaneClosestPoint => "Plane Closest Point",
            Self::ConstructPlane => "Construct Plane",
            Self::FlipPlane => "Flip Plane",
            Self::PlaneThreePoint => "Plane 3Pt",
            Self::LinePoint => "Line + Pt",
            Self::PlaneNormal => "Plane Normal",
            Self::LineLine => "Line + Line",
            Self::AlignPlane => "Align Plane",
            Self::RotatePlane => "Rotate Plane",
            Self::YZPlane => "YZ Plane",
            Self::PointOriented => "Point Oriented",
        }
    }
}

/// Eén vlak per oorsprong; zonder oorsprong het vlak door de wereldoorsprong.
fn evaluate_world_plane(inputs: &[Value], make: impl Fn(Point3) -> Frame) -> ComponentResult {
    let origins = to_points(inputs.first())?;
    if origins.len() <= 1 {
        let origin = origins.first().copied().unwrap_or(Point3::ORIGIN);
        Ok(single_plane_output(make(origin)))
    } else {
        Ok(planes_output(origins.into_iter().map(make).collect()))
    }
}

fn evaluate_align_planes(inputs: &[Value]) -> ComponentResult {
    let planes = collect_planes(inputs.first())?;
    let master = to_frame(inputs.get(1))?;
    Ok(planes_output(Frame::align_sequence(&planes, master.as_ref())))
}

fn evaluate_plane_fit(inputs: &[Value]) -> ComponentResult {
    let points = to_points(inputs.first())?;
    let fit = fit_plane(&points);

    let mut outputs = single_plane_output(fit.frame);
    outputs.insert(PIN_OUTPUT_DEVIATION.to_owned(), Value::Number(fit.deviation));
    Ok(outputs)
}

fn evaluate_plane_offset(inputs: &[Value]) -> ComponentResult {
    let plane = require_plane(inputs.first(), "Plane Offset")?;
    let offset = to_scalar(inputs.get(1), 0.0)?;
    Ok(single_plane_output(plane.offset(offset)))
}

fn evaluate_deconstruct(inputs: &[Value]) -> ComponentResult {
    let plane = require_plane(inputs.first(), "Deconstruct Plane")?;
    let mut outputs = BTreeMap::new();
    outputs.insert(PIN_OUTPUT_ORIGIN.to_owned(), Value::point(plane.origin));
    outputs.insert(PIN_OUTPUT_X_AXIS.to_owned(), Value::vector(plane.x_axis));
    outputs.insert(PIN_OUTPUT_Y_AXIS.to_owned(), Value::vector(plane.y_axis));
    outputs.insert(PIN_OUTPUT_Z_AXIS.to_owned(), Value::vector(plane.z_axis));
    Ok(outputs)
}

fn evaluate_plane_coordinates(inputs: &[Value]) -> ComponentResult {
    let point = require_point(inputs.first(), "Plane Coordinates")?;
    let plane = to_frame(inputs.get(1))?.unwrap_or_default();

    let [u, v, w] = plane.coordinates(point);
    let mut outputs = BTreeMap::new();
    outputs.insert(PIN_OUTPUT_U.to_owned(), Value::Number(u));
    outputs.insert(PIN_OUTPUT_V.to_owned(), Value::Number(v));
    outputs.insert(PIN_OUTPUT_W.to_owned(), Value::Number(w));
    Ok(outputs)
}

fn evaluate_plane_origin(inputs: &[Value]) -> ComponentResult {
    let plane = require_plane(inputs.first(), "Plane Origin")?;
    let origin = to_point(inputs.get(1))?.unwrap_or(plane.origin);
    Ok(single_plane_output(plane.with_origin(origin)))
}

fn evaluate_adjust_plane(inputs: &[Value]) -> ComponentResult {
    let plane = require_plane(inputs.first(), "Adjust Plane")?;
    let normal = to_vector(inputs.get(1))?.unwrap_or(plane.z_axis);
    Ok(single_plane_output(plane.adjust_normal(normal)))
}

fn evaluate_plane_closest_point(inputs: &[Value]) -> ComponentResult {
    let point = require_point(inputs.first(), "Plane Closest Point")?;
    let plane = require_plane(inputs.get(1), "Plane Closest Point")?;

    let (projected, [u, v], distance) = plane.closest_point(point);
    let mut outputs = BTreeMap::new();
    outputs.insert(
        PIN_OUTPUT_PROJECTED_POINT.to_owned(),
        Value::point(projected),
    );
    outputs.insert(PIN_OUTPUT_UV.to_owned(), Value::Point([u, v, 0.0]));
    outputs.insert(PIN_OUTPUT_DISTANCE.to_owned(), Value::Number(distance));
    Ok(outputs)
}

fn evaluate_construct_plane(inputs: &[Value]) -> ComponentResult {
    let origin = to_point(inputs.first())?.unwrap_or(Point3::ORIGIN);
    let x_axis = to_vector(inputs.get(1))?
        .and_then(Vec3::normalized)
        .unwrap_or(Vec3::X);
    let mut y_axis = to_vector(inputs.get(2))?
        .and_then(Vec3::normalized)
        .unwrap_or_else(|| orthogonal_vector(x_axis));
    if x_axis.cross(y_axis).is_degenerate() {
        y_axis = orthogonal_vector(x_axis);
    }
    let plane = Frame::from_axes(origin, x_axis, y_axis, x_axis.cross(y_axis));
    Ok(single_plane_output(plane))
}

fn evaluate_flip_plane(inputs: &[Value]) -> ComponentResult {
    let plane = require_plane(inputs.first(), "Flip Plane")?;
    let reverse_x = to_boolean(inputs.get(1), false)?;
    let reverse_y = to_boolean(inputs.get(2), false)?;
    let swap_axes = to_boolean(inputs.get(3), false)?;
    Ok(single_plane_output(plane.flip(reverse_x, reverse_y, swap_axes)))
}

fn evaluate_plane_three_point(inputs: &[Value]) -> ComponentResult {
    let a = require_point(inputs.first(), "Plane 3Pt")?;
    let b = require_point(inputs.get(1), "Plane 3Pt")?;
    let c = require_point(inputs.get(2), "Plane 3Pt")?;
    Ok(single_plane_output(Frame::from_three_points(a, b, c)))
}

fn evaluate_line_point(inputs: &[Value]) -> ComponentResult {
    let line = require_line(inputs.first(), "Line + Pt")?;
    let point = require_point(inputs.get(1), "Line + Pt")?;
    Ok(single_plane_output(Frame::from_line_and_point(line, point)))
}

fn evaluate_plane_normal(inputs: &[Value]) -> ComponentResult {
    let origins = to_points(inputs.first())?;
    let normal = to_vector(inputs.get(1))?.unwrap_or(Vec3::Z);
    let make_plane = |origin: Point3| Frame::from_normal(origin, normal);

    if origins.len() <= 1 {
        let origin = origins.first().copied().unwrap_or(Point3::ORIGIN);
        Ok(single_plane_output(make_plane(origin)))
    } else {
        Ok(planes_output(origins.into_iter().map(make_plane).collect()))
    }
}

fn evaluate_line_line(inputs: &[Value]) -> ComponentResult {
    let line_a = require_line(inputs.first(), "Line + Line")?;
    let line_b = require_line(inputs.get(1), "Line + Line")?;
    Ok(single_plane_output(Frame::from_two_lines(line_a, line_b)))
}

fn evaluate_align_plane(inputs: &[Value]) -> ComponentResult {
    let plane = require_plane(inputs.first(), "Align Plane")?;
    let direction = to_vector(inputs.get(1))?.unwrap_or(Vec3::ZERO);

    let (aligned, angle) = plane.align_to_direction(direction);
    let mut outputs = single_plane_output(aligned);
    outputs.insert(PIN_OUTPUT_ANGLE.to_owned(), Value::Number(angle));
    Ok(outputs)
}

fn evaluate_rotate_plane(inputs: &[Value]) -> ComponentResult {
    let plane = require_plane(inputs.first(), "Rotate Plane")?;
    let angle = to_scalar(inputs.get(1), 0.0)?;
    Ok(single_plane_output(plane.rotate(angle)))
}

fn evaluate_point_oriented(inputs: &[Value]) -> ComponentResult {
    let plane = to_frame(inputs.first())?.unwrap_or_default();
    let u = to_scalar(inputs.get(1), 0.0)?;
    let v = to_scalar(inputs.get(2), 0.0)?;
    let w = to_scalar(inputs.get(3), 0.0)?;

    let mut outputs = BTreeMap::new();
    outputs.insert(
        PIN_OUTPUT_POINT.to_owned(),
        Value::point(plane.point_at(u, v, w)),
    );
    Ok(outputs)
}

fn single_plane_output(plane: Frame) -> BTreeMap<String, Value> {
    let mut outputs = BTreeMap::new();
    outputs.insert(PIN_OUTPUT_PLANE.to_owned(), Value::Frame(plane));
    outputs
}

fn planes_output(planes: Vec<Frame>) -> BTreeMap<String, Value> {
    let mut outputs = BTreeMap::new();
    outputs.insert(
        PIN_OUTPUT_PLANES.to_owned(),
        Value::List(planes.into_iter().map(Value::Frame).collect()),
    );
    outputs
}

fn require_plane(value: Option<&Value>, context: &'static str) -> Result<Frame, ComponentError> {
    to_frame(value)?.ok_or_else(|| ComponentError::new(format!("{context} vereist een vlak")))
}

fn require_point(value: Option<&Value>, context: &'static str) -> Result<Point3, ComponentError> {
    to_point(value)?.ok_or_else(|| ComponentError::new(format!("{context} vereist een punt")))
}

/// Lijnsegment uit een curve; een polylijn telt als koorde van begin naar eind.
fn require_line(value: Option<&Value>, context: &'static str) -> Result<Line3, ComponentError> {
    match to_curve(value)? {
        Some(CurveValue::Line(line)) => Ok(line),
        Some(CurveValue::Polyline(polyline)) => {
            let points = polyline.points();
            match (points.first(), points.last()) {
                (Some(start), Some(end)) => Ok(Line3::new(*start, *end)),
                _ => Err(ComponentError::new(format!("{context} vereist een lijn"))),
            }
        }
        None => Err(ComponentError::new(format!("{context} vereist een lijn"))),
    }
}

fn collect_planes(value: Option<&Value>) -> Result<Vec<Frame>, ComponentError> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    match value {
        Value::List(values) => {
            let mut planes = Vec::with_capacity(values.len());
            for entry in values {
                planes.extend(collect_planes(Some(entry))?);
            }
            Ok(planes)
        }
        other => Ok(to_frame(Some(other))?.into_iter().collect()),
    }
}
