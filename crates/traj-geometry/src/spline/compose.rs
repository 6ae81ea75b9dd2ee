//! Appending, joining, reversing, simplifying and intersecting splines.

use traj_core::traits::BoundingBox;
use traj_core::{JoinDiagnostics, Result, SplineError};
use traj_math::{Aabb3, Point3, Vector3};

use super::{Shape, Spline};
use crate::intersect;
use crate::nurbs::fit::{self, Constraint};
use crate::nurbs::{ops, reduce};

/// One side of a bridging curve.
#[derive(Debug, Clone, Copy)]
enum BridgeEnd {
    /// A singleton: only the position is constrained
    Point(Point3),
    /// A curve end: position and tangent are constrained
    Curve { point: Point3, tangent: Vector3 },
}

impl BridgeEnd {
    fn point(&self) -> Point3 {
        match *self {
            BridgeEnd::Point(p) => p,
            BridgeEnd::Curve { point, .. } => point,
        }
    }
}

/// Constraints for a bridge over `[0, gap]` from `from` to `to`. The
/// tangent of a curve end follows its position on the way out and precedes
/// it on the way in, keeping the constraints ordered by parameter.
fn bridge_constraints(from: BridgeEnd, to: BridgeEnd, gap: f64) -> Vec<Constraint> {
    let mut constraints = Vec::with_capacity(4);
    match from {
        BridgeEnd::Point(p) => constraints.push(Constraint::point(0.0, p)),
        BridgeEnd::Curve { point, tangent } => {
            constraints.push(Constraint::point(0.0, point));
            constraints.push(Constraint::tangent(0.0, tangent));
        }
    }
    match to {
        BridgeEnd::Point(p) => constraints.push(Constraint::point(gap, p)),
        BridgeEnd::Curve { point, tangent } => {
            constraints.push(Constraint::point(gap, point));
            constraints.push(Constraint::tangent(gap, tangent));
        }
    }
    constraints
}

impl Spline {
    fn bridge_end(&self, param: f64) -> Result<BridgeEnd> {
        Ok(match &self.shape {
            Shape::Singleton(p) => BridgeEnd::Point(*p),
            _ => {
                let (point, tangent) = self.point_and_tangent_at(param)?;
                BridgeEnd::Curve { point, tangent }
            }
        })
    }

    fn join_diagnostics(&self, other: &Spline, gap: f64, constraints: &[Constraint]) -> JoinDiagnostics {
        let dim = self.dimension();
        let mut position = Point3::ZERO;
        let bridge_points = constraints
            .iter()
            .map(|c| {
                let row = if c.derivative == 0 {
                    position = c.value;
                    c.value
                } else {
                    position + c.value
                };
                Self::flatten(row, dim).collect()
            })
            .collect();
        JoinDiagnostics {
            gap,
            range: self.domain(),
            singleton: self.is_singleton(),
            other_range: other.domain(),
            other_singleton: other.is_singleton(),
            bridge_points,
        }
    }

    /// Concatenate `other` onto the end of this spline without a bridge.
    ///
    /// `other` is moved so that it starts where this spline ends and its
    /// parameters continue this spline's domain. An empty receiver becomes
    /// a copy of `other`; an empty or singleton `other` changes nothing.
    pub fn append(&mut self, other: &Spline) -> Result<()> {
        self.check_dimension(other)?;
        match (&self.shape, &other.shape) {
            (Shape::Empty, _) => self.set_shape(other.shape.clone()),
            (_, Shape::Empty | Shape::Singleton(_)) => {}
            (Shape::Singleton(_), Shape::Curve(_)) => {
                return Err(SplineError::InvalidOperation(
                    "cannot append a curve to a singleton".into(),
                ))
            }
            (Shape::Curve(a), Shape::Curve(b)) => {
                let joined = ops::concatenate(a, b);
                self.set_shape(Shape::Curve(joined));
            }
        }
        Ok(())
    }

    /// Join `other` onto the end of this spline.
    ///
    /// Ends closer than `tolerance` are appended directly. Wider gaps are
    /// closed with a bridging curve of the configured order that matches
    /// the position of both ends and the tangent of every end belonging to
    /// a genuine curve; a singleton receiver is replaced by that bridge.
    /// When the bridge cannot be fitted the spline is left unchanged and
    /// the error carries the join context.
    ///
    /// Two singletons closer than `tolerance` leave the receiver as it is
    /// rather than becoming a segment shorter than the tolerance; farther
    /// apart they become the straight segment between them.
    pub fn join(&mut self, other: &Spline, tolerance: f64) -> Result<()> {
        let tolerance = tolerance.max(0.0);
        self.check_dimension(other)?;

        match (&self.shape, &other.shape) {
            (Shape::Empty, _) => {
                self.set_shape(other.shape.clone());
                return Ok(());
            }
            (_, Shape::Empty) => return Ok(()),
            _ => {}
        }

        let from = self.bridge_end(self.end_param())?;
        let to = other.bridge_end(other.start_param())?;
        let gap = from.point().distance(to.point());

        if gap <= tolerance {
            return match (&self.shape, &other.shape) {
                (Shape::Singleton(_), Shape::Singleton(_)) => Ok(()),
                (Shape::Singleton(_), _) => {
                    self.set_shape(other.shape.clone());
                    Ok(())
                }
                _ => self.append(other),
            };
        }

        let constraints = bridge_constraints(from, to, gap);
        let bridge = match fit::interpolate_hermite(&constraints, self.curve_order()) {
            Ok(bridge) => bridge,
            Err(err) => {
                let diagnostics = self.join_diagnostics(other, gap, &constraints);
                log::warn!("failed to fit the bridging curve: {err}; {diagnostics}");
                return Err(SplineError::CurveFit {
                    reason: format!("cannot generate the bridging curve: {err}"),
                    diagnostics: Some(Box::new(diagnostics)),
                });
            }
        };

        log::debug!(
            "bridging a gap of {} with {} control points",
            gap,
            bridge.control_points.len()
        );

        match &self.shape {
            Shape::Curve(c) => {
                let joined = ops::concatenate(c, &bridge);
                self.set_shape(Shape::Curve(joined));
            }
            _ => self.set_shape(Shape::Curve(bridge)),
        }
        self.append(other)
    }

    /// Reverse the traversal direction over the same domain.
    pub fn reverse(&mut self) {
        if let Shape::Curve(c) = &self.shape {
            let reversed = ops::reverse(c);
            self.set_shape(Shape::Curve(reversed));
        }
    }

    /// Replace the curve by a least-squares approximation with fewer control
    /// points, keeping every axis within `tolerance` (the geometric
    /// resolution by default).
    ///
    /// Returns the achieved maximum error per axis. A curve that cannot be
    /// reduced within the iteration cap is kept as is, with zero error.
    /// Empty and singleton splines report a single zero.
    pub fn simplify(&mut self, tolerance: Option<f64>) -> Result<Vec<f64>> {
        let tolerance = tolerance.unwrap_or(self.geometric_resolution());
        let dim = self.dimension();
        let Shape::Curve(curve) = &self.shape else {
            return Ok(vec![0.0]);
        };

        match reduce::reduce(curve, tolerance)? {
            Some(reduction) => {
                log::debug!(
                    "simplified curve from {} to {} control points",
                    curve.control_points.len(),
                    reduction.curve.control_points.len()
                );
                self.set_shape(Shape::Curve(reduction.curve));
                Ok(Self::flatten(reduction.max_error, dim).collect())
            }
            None => Ok(vec![0.0; dim]),
        }
    }

    /// Whether the two splines come within `resolution` of each other.
    ///
    /// An empty side never intersects. Singletons intersect a curve they lie
    /// on, or another singleton within `resolution`.
    pub fn test_intersection(&self, other: &Spline, resolution: f64) -> Result<bool> {
        self.check_dimension(other)?;
        let (Some(a), Some(b)) = (self.bounding_box(), other.bounding_box()) else {
            return Ok(false);
        };
        if !Aabb3::new(a.0, a.1)
            .expand(resolution)
            .intersects(&Aabb3::new(b.0, b.1))
        {
            return Ok(false);
        }

        Ok(match (&self.shape, &other.shape) {
            (Shape::Singleton(p), Shape::Singleton(q)) => p.distance(*q) <= resolution,
            (Shape::Singleton(p), Shape::Curve(c)) | (Shape::Curve(c), Shape::Singleton(p)) => {
                intersect::point_on_curve(*p, c, resolution)
            }
            (Shape::Curve(a), Shape::Curve(b)) => intersect::curves_intersect(a, b, resolution),
            _ => false,
        })
    }
}
