//! Core value types for strain-field comparison.
//!
//! This crate provides the data model shared by every pipeline stage:
//!
//! - [`Surface`] - Triangulated point set with named scalar fields
//! - [`WedgeVolume`] - Thin triangular-prism volume extruded from a surface
//! - [`ScalarField`] - A named per-point sequence of `f64`
//! - [`Aabb`] - Axis-aligned bounding box
//!
//! All types are owned values. Pipeline stages take them by reference and
//! return new values; nothing is mutated in place.
//!
//! # Sentinel Values
//!
//! Scalar fields use [`SENTINEL`] (−1,000,000) to mark "no data here". Any
//! value at or below [`VALIDITY_THRESHOLD`] is treated as invalid; use
//! [`is_valid_value`] rather than comparing against the sentinel directly.
//!
//! # Example
//!
//! ```
//! use strain_types::{Point3, Surface};
//!
//! let surface = Surface::new(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2]],
//! )
//! .unwrap()
//! .with_field("strain", vec![0.1, 0.2, 0.3])
//! .unwrap();
//!
//! assert_eq!(surface.point_count(), 3);
//! assert_eq!(surface.field("strain").unwrap().values()[1], 0.2);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

mod bounds;
mod error;
mod field;
mod sentinel;
mod surface;
mod volume;

pub use bounds::Aabb;
pub use error::{TypesError, TypesResult};
pub use field::ScalarField;
pub use sentinel::{is_valid_value, SENTINEL, VALIDITY_THRESHOLD};
pub use surface::Surface;
pub use volume::WedgeVolume;

// Re-export nalgebra types for convenience
pub use nalgebra::{Point3, Vector3};
