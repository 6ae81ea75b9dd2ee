use std::fmt;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SplineError {
    #[error("Parameter {param} is outside the curve domain [{start}, {end}]")]
    OutOfRange { param: f64, start: f64, end: f64 },

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Curve fit error: {reason}{}", fit_context(.diagnostics))]
    CurveFit {
        reason: String,
        diagnostics: Option<Box<JoinDiagnostics>>,
    },

    #[error("Numerical error: {0}")]
    Numerical(String),

    #[error("Logic error: {0}")]
    Logic(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl SplineError {
    /// A fitting failure without join context.
    pub fn curve_fit(reason: impl Into<String>) -> Self {
        Self::CurveFit {
            reason: reason.into(),
            diagnostics: None,
        }
    }

    /// The join context attached to a bridging failure, if any.
    pub fn join_diagnostics(&self) -> Option<&JoinDiagnostics> {
        match self {
            Self::CurveFit {
                diagnostics: Some(d),
                ..
            } => Some(d),
            _ => None,
        }
    }
}

fn fit_context(diagnostics: &Option<Box<JoinDiagnostics>>) -> String {
    diagnostics
        .as_ref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, SplineError>;

/// Context captured when the bridging curve of a join cannot be fitted.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct JoinDiagnostics {
    /// Distance between the end of the receiver and the start of the argument.
    pub gap: f64,
    pub range: (f64, f64),
    pub singleton: bool,
    pub other_range: (f64, f64),
    pub other_singleton: bool,
    /// Bridge constraint rows, `dimension` coordinates each. Derivative rows
    /// are stored as the point they extrapolate to (position + tangent).
    pub bridge_points: Vec<Vec<f64>>,
}

impl fmt::Display for JoinDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "gap={} range=[{}, {}] singleton={} other.range=[{}, {}] other.singleton={} points=[",
            self.gap,
            self.range.0,
            self.range.1,
            self.singleton,
            self.other_range.0,
            self.other_range.1,
            self.other_singleton
        )?;
        for (i, point) in self.bridge_points.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{i}:")?;
            for c in point {
                write!(f, " {c}")?;
            }
        }
        write!(f, "]")
    }
}
