//! Gesloten `Value`-enum waarmee componenten invoer ontvangen en resultaten
//! teruggeven. Serde-getagd zodat hosts waarden als JSON kunnen aanleveren.

use core::fmt;

use serde::{Deserialize, Serialize};
use time::PrimitiveDateTime;

use crate::geom::{Curve3, Field, Frame, Line3, Point3, Polyline3};

/// Beschikbare waardetypes aan de rand van de kernel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// Een enkele numerieke waarde.
    Number(f64),
    /// Een booleaanse waarde.
    Boolean(bool),
    /// Een 3D-punt.
    Point([f64; 3]),
    /// Een 3D-vector.
    Vector([f64; 3]),
    /// Een orthonormaal assenstelsel.
    Frame(Frame),
    /// Een lijn of polylijn.
    Curve(CurveValue),
    /// Een samengesteld vectorveld.
    Field(Field),
    /// Een RGB-kleur met kanalen in `[0, 1]`.
    Color(ColorValue),
    /// Een datum met tijd, zonder tijdzone.
    Date(PrimitiveDateTime),
    /// Labels en diagnostiek.
    Text(String),
    /// Een lijst van waarden.
    List(Vec<Value>),
    /// Ontbrekende invoer.
    Null,
}

impl Value {
    /// Geeft de variantnaam terug. Wordt gebruikt in foutmeldingen.
    #[must_use]
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Number(_) => ValueKind::Number,
            Self::Boolean(_) => ValueKind::Boolean,
            Self::Point(_) => ValueKind::Point,
            Self::Vector(_) => ValueKind::Vector,
            Self::Frame(_) => ValueKind::Frame,
            Self::Curve(_) => ValueKind::Curve,
            Self::Field(_) => ValueKind::Field,
            Self::Color(_) => ValueKind::Color,
            Self::Date(_) => ValueKind::Date,
            Self::Text(_) => ValueKind::Text,
            Self::List(_) => ValueKind::List,
            Self::Null => ValueKind::Null,
        }
    }

    #[must_use]
    pub fn point(point: Point3) -> Self {
        Self::Point(point.to_array())
    }

    #[must_use]
    pub fn vector(vector: crate::geom::Vec3) -> Self {
        Self::Vector(vector.to_array())
    }

    /// Lijst van punten, in volgorde.
    #[must_use]
    pub fn points(points: impl IntoIterator<Item = Point3>) -> Self {
        Self::List(points.into_iter().map(Self::point).collect())
    }

    /// Lijst van getallen, in volgorde.
    #[must_use]
    pub fn numbers(numbers: impl IntoIterator<Item = f64>) -> Self {
        Self::List(numbers.into_iter().map(Self::Number).collect())
    }

    /// Verwacht een lijst en geeft een slice terug.
    pub fn expect_list(&self) -> Result<&[Value], ValueError> {
        match self {
            Self::List(values) => Ok(values),
            _ => Err(ValueError::type_mismatch("List", self.kind())),
        }
    }

    /// Verwacht een `Number` en retourneert de f64-waarde.
    pub fn expect_number(&self) -> Result<f64, ValueError> {
        match self {
            Self::Number(value) => Ok(*value),
            _ => Err(ValueError::type_mismatch("Number", self.kind())),
        }
    }

    /// Verwacht een `Point` en retourneert de coördinaten.
    pub fn expect_point(&self) -> Result<[f64; 3], ValueError> {
        match self {
            Self::Point(point) => Ok(*point),
            _ => Err(ValueError::type_mismatch("Point", self.kind())),
        }
    }

    pub fn expect_frame(&self) -> Result<&Frame, ValueError> {
        match self {
            Self::Frame(frame) => Ok(frame),
            _ => Err(ValueError::type_mismatch("Frame", self.kind())),
        }
    }

    pub fn expect_field(&self) -> Result<&Field, ValueError> {
        match self {
            Self::Field(field) => Ok(field),
            _ => Err(ValueError::type_mismatch("Field", self.kind())),
        }
    }
}

/// Typefout voor wanneer een `Value` naar het verkeerde type wordt
/// geconverteerd.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("verwachtte type `{expected}` maar kreeg `{found}`")]
pub struct ValueError {
    expected: &'static str,
    found: ValueKind,
}

impl ValueError {
    #[must_use]
    pub fn type_mismatch(expected: &'static str, found: ValueKind) -> Self {
        Self { expected, found }
    }

    #[must_use]
    pub fn expected(&self) -> &'static str {
        self.expected
    }

    #[must_use]
    pub fn found(&self) -> ValueKind {
        self.found
    }
}

/// Beschrijft het soort `Value`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Number,
    Boolean,
    Point,
    Vector,
    Frame,
    Curve,
    Field,
    Color,
    Date,
    Text,
    List,
    Null,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Number => "Number",
            Self::Boolean => "Boolean",
            Self::Point => "Point",
            Self::Vector => "Vector",
            Self::Frame => "Frame",
            Self::Curve => "Curve",
            Self::Field => "Field",
            Self::Color => "Color",
            Self::Date => "Date",
            Self::Text => "Text",
            Self::List => "List",
            Self::Null => "Null",
        };
        f.write_str(name)
    }
}

/// RGB-kleur; kanalen worden bij constructie naar `[0, 1]` geklemd.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorValue {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl ColorValue {
    #[must_use]
    pub fn new(r: f64, g: f64, b: f64) -> Self {
        let channel = |c: f64| crate::geom::clamp_finite(c, 0.0, 1.0);
        Self {
            r: channel(r),
            g: channel(g),
            b: channel(b),
        }
    }

    /// Lineaire menging; `factor` 0 geeft `self`, 1 geeft `other`.
    #[must_use]
    pub fn lerp(self, other: Self, factor: f64) -> Self {
        let t = crate::geom::clamp_finite(factor, 0.0, 1.0);
        Self::new(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
        )
    }
}

/// Curve-invoer die de kernel zelf kan evalueren.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CurveValue {
    Line(Line3),
    Polyline(Polyline3),
}

impl Curve3 for CurveValue {
    fn point_at(&self, t: f64) -> Option<Point3> {
        match self {
            Self::Line(line) => line.point_at(t),
            Self::Polyline(polyline) => polyline.point_at(t),
        }
    }
}
