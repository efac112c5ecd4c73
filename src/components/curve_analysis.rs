//! Implementaties van Grasshopper "Curve → Analysis" componenten die op de
//! benaderende curvezoekfunctie leunen.

use std::collections::BTreeMap;

use crate::geom::{
    Curve3, CurveQuery, CurveSearchOptions, Point3, closest_point, pull_points, sort_along_curve,
};
use crate::value::{CurveValue, Value};

use super::coerce::{to_count, to_curve, to_points};
use super::{Component, ComponentError, ComponentResult};

const PIN_OUTPUT_POINT: &str = "P";
const PIN_OUTPUT_POINTS: &str = "P";
const PIN_OUTPUT_PARAMETER: &str = "t";
const PIN_OUTPUT_DISTANCE: &str = "D";
const PIN_OUTPUT_INDICES: &str = "I";

/// Beschikbare componenten binnen deze module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    CurveClosestPoint,
    SortAlongCurve,
    PullPoint,
}

/// Metadata voor registraties in de componentregistry.
#[derive(Debug, Clone, Copy)]
pub struct Registration {
    pub guids: &'static [&'static str],
    pub names: &'static [&'static str],
    pub kind: ComponentKind,
}

/// Volledige lijst van componentregistraties voor de curve-analyse.
pub const REGISTRATIONS: &[Registration] = &[
    Registration {
        guids: &["{2dc44b22-b1dd-460a-a704-6462d6e91096}"],
        names: &["Curve Closest Point", "CrvCP"],
        kind: ComponentKind::CurveClosestPoint,
    },
    Registration {
        guids: &["{59aaebf8-6654-46b7-8386-89223c773978}"],
        names: &["Sort Along Curve", "AlongCrv"],
        kind: ComponentKind::SortAlongCurve,
    },
    Registration {
        guids: &[
            "{902289da-28dc-454b-98d4-b8f8aa234516}",
            "{cf3a0865-4882-46bd-91a1-d512acf95be4}",
        ],
        names: &["Pull Point", "Pull"],
        kind: ComponentKind::PullPoint,
    },
];

impl Component for ComponentKind {
    fn evaluate(&self, inputs: &[Value]) -> ComponentResult {
        match self {
            Self::CurveClosestPoint => evaluate_curve_closest_point(inputs),
            Self::SortAlongCurve => evaluate_sort_along_curve(inputs),
            Self::PullPoint => evaluate_pull_point(inputs),
        }
    }
}

impl ComponentKind {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CurveClosestPoint => "Curve Closest Point",
            Self::SortAlongCurve => "Sort Along Curve",
            Self::PullPoint => "Pull Point",
        }
    }
}

/// Invoer: punt, curve en optioneel het aantal grove monsters.
fn evaluate_curve_closest_point(inputs: &[Value]) -> ComponentResult {
    let context = "Curve Closest Point";
    let point = to_points(inputs.first())?
        .into_iter()
        .next()
        .ok_or_else(|| ComponentError::new(format!("{context} vereist een punt")))?;
    let curve = require_curve(inputs.get(1), context)?;
    let options = search_options(inputs.get(2))?;

    let query = closest_point(&curve, point, &options).ok_or_else(|| unplaceable(context, 0))?;

    let mut outputs = BTreeMap::new();
    outputs.insert(PIN_OUTPUT_POINT.to_owned(), Value::point(query.point));
    outputs.insert(
        PIN_OUTPUT_PARAMETER.to_owned(),
        Value::Number(query.map_to_domain(curve.domain())),
    );
    outputs.insert(
        PIN_OUTPUT_DISTANCE.to_owned(),
        Value::Number(query.distance),
    );
    Ok(outputs)
}

fn evaluate_sort_along_curve(inputs: &[Value]) -> ComponentResult {
    let context = "Sort Along Curve";
    let points = to_points(inputs.first())?;
    let curve = require_curve(inputs.get(1), context)?;
    let options = search_options(inputs.get(2))?;

    let order = sort_along_curve(&curve, &points, &options);
    let sorted: Vec<Point3> = order.iter().map(|&index| points[index]).collect();

    let mut outputs = BTreeMap::new();
    outputs.insert(PIN_OUTPUT_POINTS.to_owned(), Value::points(sorted));
    outputs.insert(
        PIN_OUTPUT_INDICES.to_owned(),
        Value::numbers(order.into_iter().map(|index| index as f64)),
    );
    Ok(outputs)
}

/// Zoals Curve Closest Point, maar voor een hele puntenlijst.
fn evaluate_pull_point(inputs: &[Value]) -> ComponentResult {
    let context = "Pull Point";
    let points = to_points(inputs.first())?;
    let curve = require_curve(inputs.get(1), context)?;
    let options = search_options(inputs.get(2))?;
    let domain = curve.domain();

    let queries: Vec<CurveQuery> = pull_points(&curve, &points, &options)
        .into_iter()
        .enumerate()
        .map(|(index, query)| query.ok_or_else(|| unplaceable(context, index)))
        .collect::<Result<_, _>>()?;

    let mut outputs = BTreeMap::new();
    outputs.insert(
        PIN_OUTPUT_POINTS.to_owned(),
        Value::points(queries.iter().map(|query| query.point)),
    );
    outputs.insert(
        PIN_OUTPUT_PARAMETER.to_owned(),
        Value::numbers(queries.iter().map(|query| query.map_to_domain(domain))),
    );
    outputs.insert(
        PIN_OUTPUT_DISTANCE.to_owned(),
        Value::numbers(queries.iter().map(|query| query.distance)),
    );
    Ok(outputs)
}

fn require_curve(value: Option<&Value>, context: &str) -> Result<CurveValue, ComponentError> {
    to_curve(value)?.ok_or_else(|| ComponentError::new(format!("{context} vereist een curve")))
}

fn search_options(value: Option<&Value>) -> Result<CurveSearchOptions, ComponentError> {
    let defaults = CurveSearchOptions::default();
    let samples = to_count(value, defaults.sample_count)?;
    Ok(defaults.with_sample_count(samples))
}

fn unplaceable(context: &str, index: usize) -> ComponentError {
    ComponentError::new(format!(
        "{context} kon punt {index} niet op de curve plaatsen"
    ))
}

#[cfg(test)]
mod tests {
    use super::{Component, ComponentKind};
    use crate::geom::{Line3, Point3, Polyline3};
    use crate::value::{CurveValue, Value};

    fn line() -> Value {
        Value::Curve(CurveValue::Line(Line3::new(
            Point3::ORIGIN,
            Point3::new(4.0, 0.0, 0.0),
        )))
    }

    #[test]
    fn closest_point_on_line() {
        let outputs = ComponentKind::CurveClosestPoint
            .evaluate(&[Value::Point([1.0, 2.0, 0.0]), line()])
            .expect("component slaagt");

        let point = outputs["P"].expect_point().expect("punt");
        assert!((point[0] - 1.0).abs() < 1e-3);
        assert!(point[1].abs() < 1e-12);
        let t = outputs["t"].expect_number().expect("parameter");
        assert!((t - 0.25).abs() < 1e-3);
        let distance = outputs["D"].expect_number().expect("afstand");
        assert!((distance - 2.0).abs() < 1e-6);
    }

    #[test]
    fn closest_point_requires_inputs() {
        let err = ComponentKind::CurveClosestPoint
            .evaluate(&[Value::Point([1.0, 2.0, 0.0])])
            .unwrap_err();
        assert_eq!(err.to_string(), "Curve Closest Point vereist een curve");

        let err = ComponentKind::CurveClosestPoint
            .evaluate(&[Value::Null, line()])
            .unwrap_err();
        assert_eq!(err.to_string(), "Curve Closest Point vereist een punt");
    }

    #[test]
    fn sort_along_curve_reports_indices() {
        let points = Value::List(vec![
            Value::Point([3.0, 1.0, 0.0]),
            Value::Point([0.0, 1.0, 0.0]),
            Value::Point([2.0, -1.0, 0.0]),
        ]);
        let outputs = ComponentKind::SortAlongCurve
            .evaluate(&[points, line()])
            .expect("component slaagt");

        assert_eq!(outputs["I"], Value::numbers([1.0, 2.0, 0.0]));
        let sorted = outputs["P"].expect_list().expect("punten");
        assert_eq!(sorted[0], Value::Point([0.0, 1.0, 0.0]));
        assert_eq!(sorted[2], Value::Point([3.0, 1.0, 0.0]));
    }

    #[test]
    fn sort_along_curve_accepts_empty_lists() {
        let outputs = ComponentKind::SortAlongCurve
            .evaluate(&[Value::List(Vec::new()), line()])
            .expect("component slaagt");
        assert_eq!(outputs["P"], Value::List(Vec::new()));
        assert_eq!(outputs["I"], Value::List(Vec::new()));
    }

    #[test]
    fn pull_point_projects_every_point() {
        let polyline = Polyline3::new(
            vec![
                Point3::ORIGIN,
                Point3::new(2.0, 0.0, 0.0),
                Point3::new(2.0, 2.0, 0.0),
            ],
            false,
        )
        .expect("geldige polylijn");
        let points = Value::List(vec![
            Value::Point([1.0, -1.0, 0.0]),
            Value::Point([3.0, 2.0, 0.0]),
        ]);
        let outputs = ComponentKind::PullPoint
            .evaluate(&[points, Value::Curve(CurveValue::Polyline(polyline))])
            .expect("component slaagt");

        let distances = outputs["D"].expect_list().expect("afstanden");
        assert_eq!(distances.len(), 2);
        for distance in distances {
            let distance = distance.expect_number().expect("getal");
            assert!((distance - 1.0).abs() < 1e-6);
        }
        let parameters = outputs["t"].expect_list().expect("parameters");
        let last = parameters[1].expect_number().expect("getal");
        assert!((last - 1.0).abs() < 1e-9);
    }
}
