//! Combination of receiver and probed donor data into one comparison surface.
//!
//! After a donor field has been transferred onto the receiver's points, the
//! two fields correspond point for point. [`compile_data`] computes the
//! per-point difference `donor - receiver` and keeps only the part of the
//! receiver surface where all three values are valid.
//!
//! Invalid data is marked with [`strain_types::SENTINEL`]. A delta is valid
//! iff it is strictly greater than [`strain_types::VALIDITY_THRESHOLD`].

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]

mod compile;
mod error;
mod params;

pub use compile::{compile_data, compute_delta, CompiledRow, CompiledSurface};
pub use error::{CompileError, CompileResult};
pub use params::CompileParams;
