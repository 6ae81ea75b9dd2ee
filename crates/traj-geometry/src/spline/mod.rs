//! The spline curve engine.
//!
//! A [`Spline`] owns exactly one [`Shape`]: nothing, a single fixed point, or
//! a genuine B-spline curve. Every mutation goes through
//! [`Spline::set_shape`], which also drops the cached arc length and maximum
//! curvature; queries recompute them lazily.

mod closest;
mod compose;
mod frenet;
mod query;

use std::cell::Cell;
use std::fmt;

use serde::{Deserialize, Serialize};
use traj_core::traits::{BoundingBox, Validate};
use traj_core::{Result, SplineConfig, SplineError};
use traj_math::{Aabb3, DVec3, Point3};

use crate::curve::{BSplineCurve, Curve, SplineKind};
use crate::nurbs::{fit, knot};

pub use frenet::{FrenetFrame, PoseError};

/// Representation of a spline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Empty,
    /// Zero-extent curve at one fixed point
    Singleton(Point3),
    Curve(BSplineCurve),
}

#[derive(Debug, Clone, Default)]
struct DerivedCache {
    length: Cell<Option<f64>>,
    curvature_max: Cell<Option<f64>>,
}

/// A parametric curve of fixed dimension and order, with lazily cached
/// length and maximum curvature.
///
/// Two-dimensional splines are stored with `z = 0`; flat coordinate buffers
/// always use `dimension` values per point. Queries take `&self` and fill
/// the caches through interior mutability, so a `Spline` is not `Sync`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "SplineData")]
pub struct Spline {
    config: SplineConfig,
    shape: Shape,
    #[serde(skip)]
    cache: DerivedCache,
}

/// Serialized form of a [`Spline`], checked before it becomes one.
#[derive(Deserialize)]
struct SplineData {
    config: SplineConfig,
    shape: Shape,
}

impl TryFrom<SplineData> for Spline {
    type Error = SplineError;

    fn try_from(data: SplineData) -> Result<Self> {
        let mut spline = Self::new(data.config)?;
        if let Shape::Curve(c) = &data.shape {
            let count = c.control_points.len();
            if c.degree == 0 || !knot::is_clamped(c.degree, count, &c.knots) {
                return Err(SplineError::curve_fit(format!(
                    "knot vector of length {} is not a clamped vector for {} control points of degree {}",
                    c.knots.len(),
                    count,
                    c.degree
                )));
            }
            if let Some(weights) = &c.weights {
                if weights.len() != count || weights.iter().any(|&w| !(w > 0.0)) {
                    return Err(SplineError::curve_fit(
                        "rational weights must be positive, one per control point",
                    ));
                }
            }
        }
        spline.shape = data.shape;
        Ok(spline)
    }
}

impl Spline {
    /// Empty spline.
    pub fn new(config: SplineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            shape: Shape::Empty,
            cache: DerivedCache::default(),
        })
    }

    /// Spline interpolating `points` (flattened, `dimension` values each).
    pub fn from_points(config: SplineConfig, points: &[f64], parameters: Option<&[f64]>) -> Result<Self> {
        let mut spline = Self::new(config)?;
        spline.interpolate(points, parameters)?;
        Ok(spline)
    }

    pub fn config(&self) -> &SplineConfig {
        &self.config
    }

    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    pub fn curve_order(&self) -> usize {
        self.config.curve_order
    }

    pub fn geometric_resolution(&self) -> f64 {
        self.config.geometric_resolution
    }

    /// Change the resolution; the cached length and curvature are dropped
    /// since both depend on it.
    pub fn set_geometric_resolution(&mut self, resolution: f64) -> Result<()> {
        let config = self.config.with_resolution(resolution);
        config.validate()?;
        self.config = config;
        self.cache = DerivedCache::default();
        Ok(())
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn is_empty(&self) -> bool {
        matches!(self.shape, Shape::Empty)
    }

    pub fn is_singleton(&self) -> bool {
        matches!(self.shape, Shape::Singleton(_))
    }

    /// Number of control points; 1 for a singleton.
    pub fn point_count(&self) -> usize {
        match &self.shape {
            Shape::Empty => 0,
            Shape::Singleton(_) => 1,
            Shape::Curve(c) => c.control_points.len(),
        }
    }

    /// Parameter domain, `(0, 0)` unless the spline is a genuine curve.
    pub fn domain(&self) -> (f64, f64) {
        match &self.shape {
            Shape::Curve(c) => c.domain(),
            _ => (0.0, 0.0),
        }
    }

    pub fn start_param(&self) -> f64 {
        self.domain().0
    }

    pub fn end_param(&self) -> f64 {
        self.domain().1
    }

    pub fn kind(&self) -> Option<SplineKind> {
        match &self.shape {
            Shape::Curve(c) => Some(c.kind()),
            _ => None,
        }
    }

    pub fn is_rational(&self) -> bool {
        self.kind() == Some(SplineKind::Rational)
    }

    /// Single mutation path: replace the representation and drop caches.
    fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
        self.cache = DerivedCache::default();
    }

    pub fn clear(&mut self) {
        self.set_shape(Shape::Empty);
    }

    /// Fit the spline through `points`, `dimension` values per point.
    ///
    /// No points leave the spline empty, a single point makes it a
    /// singleton. Otherwise the curve interpolates every point, with the
    /// given strictly increasing `parameters` or chord-length ones starting
    /// at 0. On error the spline is left unchanged.
    pub fn interpolate(&mut self, points: &[f64], parameters: Option<&[f64]>) -> Result<()> {
        let points = self.unflatten(points, self.dimension())?;
        let shape = match points.as_slice() {
            [] => Shape::Empty,
            [point] => Shape::Singleton(*point),
            _ => Shape::Curve(fit::interpolate(&points, parameters, self.curve_order())?),
        };
        self.set_shape(shape);
        Ok(())
    }

    /// Rebuild the spline from control point coordinates and a knot vector.
    ///
    /// Rational coordinates are homogeneous, `dimension + 1` values per
    /// point with the weight last. `kind = None` keeps the current kind,
    /// which requires the spline to be a genuine curve. The degree follows
    /// from the knot vector length, which must be clamped.
    pub fn reset(&mut self, coordinates: &[f64], knots: &[f64], kind: Option<SplineKind>) -> Result<()> {
        let dim = self.dimension();
        if coordinates.is_empty() {
            self.clear();
            return Ok(());
        }
        if coordinates.len() == dim {
            let point = self.unflatten(coordinates, dim)?[0];
            self.set_shape(Shape::Singleton(point));
            return Ok(());
        }

        let kind = match kind.or(self.kind()) {
            Some(kind) => kind,
            None => {
                return Err(SplineError::InvalidOperation(
                    "reset() needs an explicit kind since this spline has no curve".into(),
                ))
            }
        };

        let stride = match kind {
            SplineKind::Polynomial => dim,
            SplineKind::Rational => dim + 1,
        };
        let rows = self.unflatten(coordinates, stride)?;
        let (control_points, weights): (Vec<Point3>, Option<Vec<f64>>) = match kind {
            SplineKind::Polynomial => (rows, None),
            SplineKind::Rational => {
                let weights: Vec<f64> = coordinates.chunks(stride).map(|c| c[dim]).collect();
                if weights.iter().any(|&w| !(w > 0.0)) {
                    return Err(SplineError::curve_fit("rational weights must be positive"));
                }
                let points = coordinates
                    .chunks(stride)
                    .zip(&weights)
                    .map(|(c, &w)| Self::point_from(&c[..dim]) / w)
                    .collect();
                (points, Some(weights))
            }
        };

        if control_points.len() == 1 {
            self.set_shape(Shape::Singleton(control_points[0]));
            return Ok(());
        }

        let count = control_points.len();
        if knots.len() <= count {
            return Err(SplineError::curve_fit(format!(
                "{} knots are too few for {} control points",
                knots.len(),
                count
            )));
        }
        let degree = knots.len() - count - 1;
        if degree == 0 || !knot::is_clamped(degree, count, knots) {
            return Err(SplineError::curve_fit(format!(
                "knot vector of length {} is not a clamped vector for {} control points",
                knots.len(),
                count
            )));
        }

        self.set_shape(Shape::Curve(BSplineCurve {
            degree,
            knots: knots.to_vec(),
            control_points,
            weights,
        }));
        Ok(())
    }

    /// Control point coordinates, homogeneous for rational curves; the
    /// point itself for a singleton.
    pub fn coordinates(&self) -> Vec<f64> {
        let dim = self.dimension();
        match &self.shape {
            Shape::Empty => Vec::new(),
            Shape::Singleton(p) => Self::flatten(*p, dim).collect(),
            Shape::Curve(c) => {
                let mut out = Vec::with_capacity(c.control_points.len() * (dim + 1));
                for (i, p) in c.control_points.iter().enumerate() {
                    match &c.weights {
                        Some(w) => {
                            out.extend(Self::flatten(*p * w[i], dim));
                            out.push(w[i]);
                        }
                        None => out.extend(Self::flatten(*p, dim)),
                    }
                }
                out
            }
        }
    }

    pub fn knots(&self) -> Vec<f64> {
        match &self.shape {
            Shape::Curve(c) => c.knots.clone(),
            _ => Vec::new(),
        }
    }

    /// The underlying curve, for operations undefined on degenerate shapes.
    pub fn curve(&self) -> Option<&BSplineCurve> {
        match &self.shape {
            Shape::Curve(c) => Some(c),
            _ => None,
        }
    }

    fn check_param(&self, t: f64) -> Result<()> {
        let (start, end) = self.domain();
        if t >= start && t <= end {
            Ok(())
        } else {
            Err(SplineError::OutOfRange {
                param: t,
                start,
                end,
            })
        }
    }

    fn check_dimension(&self, other: &Spline) -> Result<()> {
        if self.dimension() == other.dimension() {
            Ok(())
        } else {
            Err(SplineError::DimensionMismatch {
                expected: self.dimension(),
                actual: other.dimension(),
            })
        }
    }

    fn point_from(values: &[f64]) -> Point3 {
        DVec3::new(values[0], values[1], values.get(2).copied().unwrap_or(0.0))
    }

    fn flatten(p: Point3, dim: usize) -> impl Iterator<Item = f64> {
        p.to_array().into_iter().take(dim)
    }

    fn unflatten(&self, values: &[f64], stride: usize) -> Result<Vec<Point3>> {
        if values.len() % stride != 0 {
            return Err(SplineError::curve_fit(format!(
                "buffer of {} values is not a multiple of {}",
                values.len(),
                stride
            )));
        }
        let dim = self.dimension();
        Ok(values
            .chunks(stride)
            .map(|c| Self::point_from(&c[..dim]))
            .collect())
    }
}

/// Empty spatial spline with the default configuration.
impl Default for Spline {
    fn default() -> Self {
        Self {
            config: SplineConfig::default(),
            shape: Shape::Empty,
            cache: DerivedCache::default(),
        }
    }
}

impl BoundingBox for Spline {
    type Point = Point3;

    /// Box around the control polygon, which contains the curve.
    fn bounding_box(&self) -> Option<(Point3, Point3)> {
        let aabb = match &self.shape {
            Shape::Empty => None,
            Shape::Singleton(p) => Some(Aabb3::new(*p, *p)),
            Shape::Curve(c) => Aabb3::from_points(&c.control_points),
        }?;
        Some((aabb.min, aabb.max))
    }
}

impl fmt::Display for Spline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind() {
            Some(SplineKind::Polynomial) => "polynomial",
            Some(SplineKind::Rational) => "rational",
            None if self.is_singleton() => "singleton",
            None => "empty",
        };
        writeln!(f, "CURVE PROPERTIES")?;
        writeln!(f, "  Point count  : {}", self.point_count())?;
        writeln!(f, "  Order        : {}", self.curve().map_or(self.curve_order(), |c| c.order()))?;
        writeln!(f, "  Dimension    : {}", self.dimension())?;
        writeln!(f, "  Kind         : {}", kind)?;
        writeln!(f, "  Parameters   : {}->{}", self.start_param(), self.end_param())?;
        match self.curve_length() {
            Ok(length) => write!(f, "  Length       : {}", length),
            Err(_) => write!(f, "  Length       : n/a"),
        }
    }
}
