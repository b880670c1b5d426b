//! ms-core: stable foundation for motorsim.
//!
//! Contains:
//! - units (uom SI types + constructors for battery and motor quantities)
//! - numeric (Real + tolerances + float helpers)
//! - error (shared error types)

pub mod error;
pub mod numeric;
pub mod units;

pub use error::{CoreError, CoreResult};
pub use numeric::*;
pub use units::*;
