pub mod config;
pub mod error;
pub mod traits;

pub use config::SplineConfig;
pub use error::{JoinDiagnostics, Result, SplineError};
