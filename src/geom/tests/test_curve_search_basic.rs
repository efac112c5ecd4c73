use crate::geom::{
    Curve3, CurveError, CurveSearchOptions, FnCurve, Line3, Point3, Polyline3, closest_point,
    pull_points, sort_along_curve,
};

fn straight() -> FnCurve<impl Fn(f64) -> Option<Point3>> {
    let a = Point3::new(0.0, 0.0, 0.0);
    let b = Point3::new(10.0, 0.0, 0.0);
    FnCurve::new(move |t| Some(a.lerp(b, t)))
}

#[test]
fn midpoint_of_straight_line_is_found() {
    let curve = straight();
    let query = closest_point(&curve, Point3::new(5.0, 0.0, 0.0), &CurveSearchOptions::default())
        .expect("curve yields points");
    assert!((query.t - 0.5).abs() < 1e-3);
    assert!(query.distance < 1e-2);
    assert!((query.distance * query.distance - query.distance_sq).abs() < 1e-12);
}

#[test]
fn offset_query_reports_distance() {
    let line = Line3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 4.0, 0.0));
    let query = closest_point(&line, Point3::new(3.0, 1.0, 0.0), &CurveSearchOptions::default())
        .expect("line yields points");
    assert!((query.t - 0.25).abs() < 1e-3);
    assert!((query.distance - 3.0).abs() < 1e-3);
}

#[test]
fn end_points_are_reachable() {
    let line = Line3::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0));
    let before = closest_point(&line, Point3::new(-5.0, 1.0, 0.0), &CurveSearchOptions::default())
        .expect("line yields points");
    assert_eq!(before.t, 0.0);
    let after = closest_point(&line, Point3::new(5.0, 1.0, 0.0), &CurveSearchOptions::default())
        .expect("line yields points");
    assert_eq!(after.t, 1.0);
}

#[test]
fn curve_without_points_yields_none() {
    let curve = FnCurve::new(|_t| None);
    assert!(closest_point(&curve, Point3::ORIGIN, &CurveSearchOptions::default()).is_none());

    let non_finite = FnCurve::new(|_t| Some(Point3::new(f64::NAN, 0.0, 0.0)));
    assert!(closest_point(&non_finite, Point3::ORIGIN, &CurveSearchOptions::default()).is_none());
}

#[test]
fn partial_curve_is_searched_where_defined() {
    let curve = FnCurve::new(|t: f64| (t >= 0.5).then(|| Point3::new(t, 0.0, 0.0)));
    let query = closest_point(&curve, Point3::ORIGIN, &CurveSearchOptions::default())
        .expect("upper half is defined");
    assert!(query.t >= 0.5);
    assert!((query.t - 0.5).abs() < 0.01);
}

#[test]
fn sample_count_has_a_floor() {
    let curve = straight();
    let options = CurveSearchOptions::default()
        .with_sample_count(1)
        .with_refinement_rounds(0);
    let query = closest_point(&curve, Point3::new(10.0 / 7.0, 0.0, 0.0), &options)
        .expect("curve yields points");
    // Eight uniform samples hit t = 1/7 exactly.
    assert!((query.t - 1.0 / 7.0).abs() < 1e-12);
}

#[test]
fn domain_mapping_rescales_parameter() {
    let curve = straight().with_domain(2.0, 6.0);
    let query = closest_point(&curve, Point3::new(5.0, 0.0, 0.0), &CurveSearchOptions::default())
        .expect("curve yields points");
    assert!((query.map_to_domain(curve.domain()) - 4.0).abs() < 1e-2);
}

#[test]
fn polyline_is_arc_length_parameterised() {
    let polyline = Polyline3::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(3.0, 0.0, 0.0),
            Point3::new(3.0, 1.0, 0.0),
        ],
        false,
    )
    .expect("valid polyline");
    assert_eq!(polyline.length(), 4.0);
    assert_eq!(polyline.point_at(0.75), Some(Point3::new(3.0, 0.0, 0.0)));
    assert_eq!(polyline.point_at(1.0), Some(Point3::new(3.0, 1.0, 0.0)));

    let query = closest_point(&polyline, Point3::new(4.0, 0.5, 0.0), &CurveSearchOptions::default())
        .expect("polyline yields points");
    assert!((query.t - 0.875).abs() < 1e-3);
}

#[test]
fn closed_polyline_wraps_to_start() {
    let square = Polyline3::new(
        vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ],
        true,
    )
    .expect("valid polyline");
    assert_eq!(square.points().len(), 4);
    assert_eq!(square.length(), 4.0);
    assert_eq!(square.point_at(0.875), Some(Point3::new(0.0, 0.5, 0.0)));
}

#[test]
fn polyline_construction_errors() {
    assert_eq!(
        Polyline3::new(vec![Point3::ORIGIN], false),
        Err(CurveError::TooFewPoints(1))
    );
    assert_eq!(
        Polyline3::new(vec![Point3::ORIGIN, Point3::new(f64::NAN, 0.0, 0.0)], false),
        Err(CurveError::NonFinitePoint(1))
    );
}

#[test]
fn sort_and_pull_points() {
    let curve = straight();
    let points = [
        Point3::new(8.0, 1.0, 0.0),
        Point3::new(2.0, -1.0, 0.0),
        Point3::new(5.0, 0.0, 3.0),
    ];
    let options = CurveSearchOptions::default();
    assert_eq!(sort_along_curve(&curve, &points, &options), vec![1, 2, 0]);

    let pulled = pull_points(&curve, &points, &options);
    assert_eq!(pulled.len(), 3);
    let third = pulled[2].expect("pulled point");
    assert!((third.distance - 3.0).abs() < 1e-3);
}
