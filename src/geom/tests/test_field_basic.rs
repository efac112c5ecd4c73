use crate::geom::{
    FIELD_EPSILON, Field, FieldBounds, FieldSection, FieldSource, Frame, GridSampling, Line3,
    LineCharge, MAX_GRID_SAMPLES, Point3, PointCharge, SegmentForce, SourceKind, SourceModel,
    SourceSample, SpinForce, Tolerance, UniformForce, Vec3,
};

const TOL: Tolerance = Tolerance::LOOSE;

fn point_charge(position: Point3, charge: f64, decay: f64) -> FieldSource {
    FieldSource::new(SourceModel::PointCharge(PointCharge {
        position,
        charge,
        decay,
    }))
}

fn uniform(vector: Vec3) -> FieldSource {
    FieldSource::new(SourceModel::Uniform(UniformForce { vector }))
}

#[test]
fn unit_point_charge_falls_off_with_decay() {
    let field = Field::from_source(point_charge(Point3::ORIGIN, 1.0, 2.0));
    for d in [0.5, 1.0, 3.0] {
        let evaluation = field.evaluate(Point3::new(0.0, d, 0.0));
        let expected = 1.0 / (d + FIELD_EPSILON).powi(2);
        assert!((evaluation.magnitude - expected).abs() < 1e-12);
        assert!(TOL.approx_eq_vec3(evaluation.direction, Vec3::Y));
        assert!((evaluation.strength - expected).abs() < 1e-12);
    }
}

#[test]
fn point_charge_singularity_is_guarded() {
    let sample = PointCharge {
        position: Point3::new(1.0, 1.0, 1.0),
        charge: -3.0,
        decay: 2.0,
    }
    .sample(Point3::new(1.0, 1.0, 1.0));
    assert_eq!(sample.vector, Vec3::ZERO);
    assert_eq!(sample.strength, 3.0);
}

#[test]
fn negative_charge_points_inward() {
    let field = Field::from_source(point_charge(Point3::ORIGIN, -1.0, 1.0));
    let evaluation = field.evaluate(Point3::new(2.0, 0.0, 0.0));
    assert!(evaluation.vector.x < 0.0);
    assert!(evaluation.strength > 0.0);
}

#[test]
fn line_charge_is_symmetric_and_supplies_tensor() {
    let source = LineCharge {
        segment: Line3::new(Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)),
        charge: 1.0,
    };
    let sample = source.sample(Point3::new(0.0, 1.0, 0.0));
    assert!(sample.vector.x.abs() < 1e-12);
    assert!(sample.vector.y > 0.0);
    let tensor = sample.tensor.expect("line charge supplies a tensor");
    assert!((tensor.trace() - sample.strength).abs() < 1e-9);

    // Short segment still uses eight sub-segments, each with a fixed inverse-square falloff.
    let short = LineCharge {
        segment: Line3::new(Point3::ORIGIN, Point3::new(0.0, 0.0, 0.1)),
        charge: 8.0,
    };
    let far = Point3::new(100.0, 0.0, 0.05);
    let sample = short.sample(far);
    assert!((sample.vector.length() - 8.0 / (100.0 * 100.0)).abs() < 1e-6);
}

#[test]
fn spin_force_circulates_and_vanishes_on_axis() {
    let spin = SpinForce {
        frame: Frame::default(),
        strength: 2.0,
        radius: 1.0,
        decay: 1.0,
    };
    let on_axis = spin.sample(Point3::new(0.0, 0.0, 5.0));
    assert_eq!(on_axis.vector, Vec3::ZERO);

    let sample = spin.sample(Point3::new(1.0, 0.0, 0.0));
    assert!(TOL.approx_eq_vec3(sample.vector.unit_or_zero(), Vec3::Y));
    // s · (1 + 1)^-(d + 1) · 1 / (1 + 0)
    assert!((sample.vector.length() - 0.5).abs() < 1e-12);

    let lifted = spin.sample(Point3::new(1.0, 0.0, 1.0));
    assert!((lifted.vector.length() - 0.25).abs() < 1e-12);
}

#[test]
fn segment_force_combines_axial_and_radial() {
    let force = SegmentForce {
        segment: Line3::new(Point3::ORIGIN, Point3::new(2.0, 0.0, 0.0)),
    };
    let on_segment = force.sample(Point3::new(1.0, 0.0, 0.0));
    assert!(TOL.approx_eq_vec3(on_segment.vector, Vec3::X));

    let beside = force.sample(Point3::new(1.0, 1.0, 0.0));
    assert!(TOL.approx_eq_vec3(beside.vector, Vec3::new(0.5, 0.25, 0.0)));

    let beyond = force.sample(Point3::new(3.0, 0.0, 0.0));
    assert!(TOL.approx_eq_vec3(beyond.vector, Vec3::new(0.75, 0.0, 0.0)));
}

#[test]
fn bounds_gate_sources_inclusively() {
    let bounds = FieldBounds::world(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
    let field = Field::from_source(uniform(Vec3::X).with_bounds(Some(bounds)));
    assert_eq!(field.bounds.len(), 1);

    assert_eq!(field.evaluate(Point3::new(1.0, 1.0, 1.0)).contributions.len(), 1);
    assert_eq!(field.evaluate(Point3::new(1.0 + 1e-10, 0.0, 0.0)).contributions.len(), 1);
    let outside = field.evaluate(Point3::new(1.1, 0.0, 0.0));
    assert!(outside.contributions.is_empty());
    assert_eq!(outside.vector, Vec3::ZERO);
    assert_eq!(outside.direction, Vec3::ZERO);
}

#[test]
fn framed_bounds_follow_their_frame() {
    let frame = Frame::default().rotate(std::f64::consts::FRAC_PI_4);
    let bounds = FieldBounds {
        frame,
        local: crate::geom::BBox::new(Point3::new(0.0, -0.1, -0.1), Point3::new(2.0, 0.1, 0.1)),
    };
    let diagonal = Point3::new(1.0, 1.0, 0.0);
    assert!(bounds.contains(diagonal));
    assert!(!bounds.contains(Point3::new(1.0, 0.0, 0.0)));
}

#[test]
fn evaluation_superposes_and_accumulates_tensor() {
    let field = Field::merge(&[
        Field::from_source(uniform(Vec3::new(2.0, 0.0, 0.0))),
        Field::from_source(uniform(Vec3::new(0.0, -1.0, 0.0))),
    ]);
    let evaluation = field.evaluate(Point3::new(5.0, 5.0, 5.0));
    assert!(TOL.approx_eq_vec3(evaluation.vector, Vec3::new(2.0, -1.0, 0.0)));
    assert!((evaluation.strength - 3.0).abs() < 1e-12);
    assert_eq!(evaluation.contributions.len(), 2);
    assert_eq!(evaluation.contributions[1].index, 1);
    assert_eq!(evaluation.contributions[0].kind, SourceKind::Uniform);

    // dir ⊗ dir · |strength| per source: diag(2, 1, 0).
    let tensor = &evaluation.tensor;
    assert!((tensor.matrix.xx - 2.0).abs() < 1e-12);
    assert!((tensor.matrix.yy - 1.0).abs() < 1e-12);
    assert!((tensor.total_magnitude - 3.0_f64.sqrt()).abs() < 1e-12);
    assert!((tensor.principal[0].magnitude - 2.0).abs() < 1e-9);
}

#[test]
fn empty_field_evaluates_to_zero() {
    let evaluation = Field::default().evaluate(Point3::new(1.0, 2.0, 3.0));
    assert_eq!(evaluation.magnitude, 0.0);
    assert_eq!(evaluation.direction, Vec3::ZERO);
    assert_eq!(evaluation.strength, 0.0);
    assert_eq!(evaluation.tensor.total_magnitude, 0.0);
}

#[test]
fn merge_preserves_order_and_counts() {
    let a = Field::merge(&[
        Field::from_source(point_charge(Point3::ORIGIN, 1.0, 2.0)),
        Field::from_source(uniform(Vec3::X)),
    ]);
    let b = Field::from_source(FieldSource::new(SourceModel::SegmentForce(SegmentForce {
        segment: Line3::new(Point3::ORIGIN, Point3::new(0.0, 1.0, 0.0)),
    })));

    let merged = Field::merge(&[a.clone(), b.clone()]);
    assert_eq!(merged.sources.len(), a.sources.len() + b.sources.len());
    let kinds: Vec<SourceKind> = merged.sources.iter().map(FieldSource::kind).collect();
    assert_eq!(
        kinds,
        vec![SourceKind::PointCharge, SourceKind::Uniform, SourceKind::SegmentForce]
    );
}

#[test]
fn merge_combines_declared_bounds_as_list() {
    let box_a = FieldBounds::world(Point3::ORIGIN, Point3::new(1.0, 1.0, 1.0));
    let box_b = FieldBounds::world(Point3::new(2.0, 2.0, 2.0), Point3::new(3.0, 3.0, 3.0));
    let bounded_a = Field::from_source(uniform(Vec3::X).with_bounds(Some(box_a)));
    let bounded_b = Field::from_source(uniform(Vec3::Y).with_bounds(Some(box_b)));
    let unbounded = Field::from_source(uniform(Vec3::Z));

    let one = Field::merge(&[bounded_a.clone(), unbounded.clone()]);
    assert_eq!(one.bounds, vec![box_a]);

    let two = Field::merge(&[bounded_a, unbounded.clone(), bounded_b]);
    assert_eq!(two.bounds, vec![box_a, box_b]);

    let none = Field::merge(&[unbounded.clone(), unbounded]);
    assert!(none.bounds.is_empty());
}

#[test]
fn split_returns_single_source_fields() {
    let field = Field::merge(&[
        Field::from_source(point_charge(Point3::ORIGIN, 1.0, 2.0).with_metadata("label", "a")),
        Field::from_source(uniform(Vec3::X)),
    ]);
    let parts = field.split();
    assert_eq!(parts.len(), 2);
    assert!(parts.iter().all(|part| part.sources.len() == 1));
    assert_eq!(parts[0].sources[0].metadata.get("label").map(String::as_str), Some("a"));
    assert_eq!(parts[1].sources[0].kind(), SourceKind::Uniform);
}

#[test]
fn grid_sampling_walks_the_section() {
    let field = Field::from_source(uniform(Vec3::Z));
    let section = FieldSection::default();
    let samples = field.sample_grid(&section, GridSampling::new(3, 2));
    assert_eq!(samples.len(), 6);
    assert_eq!(samples[0].point, Point3::new(-0.5, -0.5, 0.0));
    assert_eq!(samples[1].point, Point3::new(-0.5, 0.5, 0.0));
    assert_eq!(samples[5].point, Point3::new(0.5, 0.5, 0.0));
    assert!((samples[0].alignment(section.frame.z_axis) - 1.0).abs() < 1e-12);
}

#[test]
fn section_from_points_spans_extents() {
    let section = FieldSection::from_points(
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(4.0, 0.0, 0.0),
        Point3::new(1.0, 2.0, 0.0),
    );
    assert_eq!(section.u, (0.0, 4.0));
    assert_eq!(section.v, (0.0, 2.0));
    let single = section.sample_point(0, 0, GridSampling::new(1, 1));
    assert_eq!(single, Point3::ORIGIN);
}

#[test]
fn line_charge_piece_count_follows_length() {
    let along_x = |length: f64| LineCharge {
        segment: Line3::new(Point3::ORIGIN, Point3::new(length, 0.0, 0.0)),
        charge: 1.0,
    };
    assert_eq!(along_x(1.0).segment_count(), 8);
    assert_eq!(along_x(2.0).segment_count(), 8);
    assert_eq!(along_x(5.0).segment_count(), 20);
    assert_eq!(along_x(10.6).segment_count(), 42);
    assert_eq!(along_x(2500.0).segment_count(), 10_000);
    assert_eq!(along_x(1e6).segment_count(), 10_000);
    assert_eq!(along_x(f64::INFINITY).segment_count(), 8);
}

#[test]
fn line_charge_piece_on_query_point_keeps_its_strength() {
    let line = LineCharge {
        segment: Line3::new(Point3::new(-1.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)),
        charge: 8.0,
    };
    // Midpoint of piece 4 of 8 sits at x = 0.125.
    let query = Point3::new(0.125, 0.0, 0.0);
    let sample = line.sample(query);

    let mut expected = 1.0;
    for i in [0_u32, 1, 2, 3, 5, 6, 7] {
        let x = -1.0 + 2.0 * (f64::from(i) + 0.5) / 8.0;
        let distance = 0.125 - x;
        expected += 1.0 / (distance * distance + FIELD_EPSILON);
    }
    assert!(sample.strength.is_finite());
    assert!((sample.strength - expected).abs() < 1e-9);
}

#[test]
fn grid_sampling_counts_are_capped() {
    let sampling = GridSampling::new(usize::MAX / 2, 3);
    assert_eq!(sampling.u_count, MAX_GRID_SAMPLES);
    assert_eq!(sampling.v_count, 3);
    assert_eq!(GridSampling::new(0, 0), GridSampling::new(1, 1));

    let field = Field::from_source(uniform(Vec3::X));
    let samples = field.sample_grid(&FieldSection::default(), sampling);
    assert_eq!(samples.len(), MAX_GRID_SAMPLES * 3);
}
