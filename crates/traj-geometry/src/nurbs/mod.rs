//! NURBS kernel: knot vectors, evaluation, fitting, structural operations,
//! differential analysis, closest points and data reduction.

pub mod analysis;
pub mod closest;
pub mod eval;
pub mod fit;
pub mod knot;
pub mod ops;
pub mod reduce;

pub use closest::{ClosestPoints, LocalSearch};
pub use knot::{basis_function_derivs, basis_functions, find_span};
