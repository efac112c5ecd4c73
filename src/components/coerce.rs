//! Smalle conversies van `Value` naar de canonieke kerneltypes.
//!
//! Alle functies accepteren een ontbrekende pin (`None`) of `Value::Null`
//! als "geen invoer". Een lijst met één element wordt uitgepakt; verder
//! wordt niets stilzwijgend omgezet. Een getal is dus nooit een punt.

use crate::geom::{Field, FieldBounds, Frame, Point3, Vec3, finite_or};
use crate::value::{ColorValue, CurveValue, Value};

use super::ComponentError;

/// Pakt `Null` en lijsten met één element uit; `None` betekent geen invoer.
fn unwrap_single(value: Option<&Value>) -> Option<&Value> {
    match value? {
        Value::Null => None,
        Value::List(values) if values.is_empty() => None,
        Value::List(values) if values.len() == 1 => unwrap_single(values.first()),
        other => Some(other),
    }
}

fn mismatch(expected: &str, found: &Value) -> ComponentError {
    ComponentError::new(format!("verwachtte {expected}, kreeg {}", found.kind()))
}

/// Getal of `fallback` wanneer de invoer ontbreekt of niet eindig is.
pub fn to_scalar(value: Option<&Value>, fallback: f64) -> Result<f64, ComponentError> {
    match unwrap_single(value) {
        None => Ok(fallback),
        Some(Value::Number(number)) => Ok(finite_or(*number, fallback)),
        Some(other) => Err(mismatch("een getal", other)),
    }
}

/// Niet-negatief aantal, afgerond.
pub fn to_count(value: Option<&Value>, fallback: usize) -> Result<usize, ComponentError> {
    let number = to_scalar(value, fallback as f64)?;
    Ok(number.round().max(0.0) as usize)
}

pub fn to_boolean(value: Option<&Value>, fallback: bool) -> Result<bool, ComponentError> {
    match unwrap_single(value) {
        None => Ok(fallback),
        Some(Value::Boolean(flag)) => Ok(*flag),
        Some(other) => Err(mismatch("een booleaanse waarde", other)),
    }
}

/// Punt; niet-eindige coördinaten gelden als ontbrekende invoer.
pub fn to_point(value: Option<&Value>) -> Result<Option<Point3>, ComponentError> {
    match unwrap_single(value) {
        None => Ok(None),
        Some(Value::Point(coords)) => {
            let point = Point3::from_array(*coords);
            Ok(point.is_finite().then_some(point))
        }
        Some(other) => Err(mismatch("een punt", other)),
    }
}

/// Alle punten uit een (geneste) lijst, in volgorde. `Null` wordt overgeslagen.
pub fn to_points(value: Option<&Value>) -> Result<Vec<Point3>, ComponentError> {
    let mut points = Vec::new();
    if let Some(value) = value {
        collect_points(value, &mut points)?;
    }
    Ok(points)
}

fn collect_points(value: &Value, points: &mut Vec<Point3>) -> Result<(), ComponentError> {
    match value {
        Value::Null => Ok(()),
        Value::Point(coords) => {
            let point = Point3::from_array(*coords);
            if point.is_finite() {
                points.push(point);
            }
            Ok(())
        }
        Value::List(values) => values
            .iter()
            .try_for_each(|entry| collect_points(entry, points)),
        other => Err(mismatch("een punt", other)),
    }
}

pub fn to_vector(value: Option<&Value>) -> Result<Option<Vec3>, ComponentError> {
    match unwrap_single(value) {
        None => Ok(None),
        Some(Value::Vector(coords)) => {
            let vector = Vec3::from_array(*coords);
            Ok(vector.is_finite().then_some(vector))
        }
        Some(other) => Err(mismatch("een vector", other)),
    }
}

/// Assenstelsel. Een los punt betekent het wereld-XY-vlak door dat punt.
/// Aangeleverde assen worden opnieuw orthonormaal gemaakt.
pub fn to_frame(value: Option<&Value>) -> Result<Option<Frame>, ComponentError> {
    match unwrap_single(value) {
        None => Ok(None),
        Some(Value::Frame(frame)) => {
            let origin = if frame.origin.is_finite() {
                frame.origin
            } else {
                Point3::ORIGIN
            };
            Ok(Some(Frame::from_axes(
                origin,
                frame.x_axis,
                frame.y_axis,
                frame.z_axis,
            )))
        }
        Some(Value::Point(coords)) => {
            let point = Point3::from_array(*coords);
            Ok(point.is_finite().then(|| Frame::world_xy(point)))
        }
        Some(other) => Err(mismatch("een vlak", other)),
    }
}

pub fn to_curve(value: Option<&Value>) -> Result<Option<CurveValue>, ComponentError> {
    match unwrap_single(value) {
        None => Ok(None),
        Some(Value::Curve(curve)) => Ok(Some(curve.clone())),
        Some(other) => Err(mismatch("een curve", other)),
    }
}

pub fn to_field(value: Option<&Value>) -> Result<Option<Field>, ComponentError> {
    match unwrap_single(value) {
        None => Ok(None),
        Some(Value::Field(field)) => Ok(Some(field.clone())),
        Some(other) => Err(mismatch("een veld", other)),
    }
}

/// Alle velden uit een (geneste) lijst, in volgorde.
pub fn to_fields(value: Option<&Value>) -> Result<Vec<Field>, ComponentError> {
    fn collect(value: &Value, fields: &mut Vec<Field>) -> Result<(), ComponentError> {
        match value {
            Value::Null => Ok(()),
            Value::Field(field) => {
                fields.push(field.clone());
                Ok(())
            }
            Value::List(values) => values.iter().try_for_each(|entry| collect(entry, fields)),
            other => Err(mismatch("een veld", other)),
        }
    }

    let mut fields = Vec::new();
    if let Some(value) = value {
        collect(value, &mut fields)?;
    }
    Ok(fields)
}

/// Begrenzing: twee hoekpunten in wereldcoördinaten, eventueel voorafgegaan
/// door het vlak waarin de doos uitgelijnd is.
pub fn to_bounds(value: Option<&Value>) -> Result<Option<FieldBounds>, ComponentError> {
    let Some(value) = value else {
        return Ok(None);
    };
    match value {
        Value::Null => Ok(None),
        Value::List(values) if values.is_empty() => Ok(None),
        Value::List(values) if values.len() == 1 => to_bounds(values.first()),
        Value::List(values) => match values.as_slice() {
            [Value::Frame(_), a, b] => {
                let frame = to_frame(values.first())?.unwrap_or_default();
                let (a, b) = bounds_corners(a, b)?;
                Ok(Some(FieldBounds::in_frame(frame, a, b)))
            }
            [a, b] => {
                let (a, b) = bounds_corners(a, b)?;
                Ok(Some(FieldBounds::world(a, b)))
            }
            _ => Err(ComponentError::new(format!(
                "begrenzing verwacht twee hoekpunten, kreeg {} waarden",
                values.len()
            ))),
        },
        other => Err(mismatch("een begrenzing", other)),
    }
}

fn bounds_corners(a: &Value, b: &Value) -> Result<(Point3, Point3), ComponentError> {
    let a = to_point(Some(a))?;
    let b = to_point(Some(b))?;
    a.zip(b)
        .ok_or_else(|| ComponentError::new("begrenzing bevat een ongeldig hoekpunt"))
}

pub fn to_color(value: Option<&Value>) -> Result<Option<ColorValue>, ComponentError> {
    match unwrap_single(value) {
        None => Ok(None),
        Some(Value::Color(colour)) => Ok(Some(ColorValue::new(colour.r, colour.g, colour.b))),
        Some(other) => Err(mismatch("een kleur", other)),
    }
}
