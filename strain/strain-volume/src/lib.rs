//! Transfer of scalar data from a donor surface onto arbitrary points.
//!
//! A donor surface is extruded into a thin two-layer volume of wedge cells
//! ([`extrude_surface`]); the volume is then sampled at the points of a query
//! surface ([`probe_volume`]), using a bounding volume hierarchy
//! ([`CellLocator`]) for cell lookup and linear wedge shape functions
//! ([`wedge`]) for interpolation.
//!
//! Points outside every cell receive [`strain_types::SENTINEL`].
//!
//! # Example
//!
//! ```
//! use strain_volume::{extrude_surface, probe_volume};
//! use strain_types::{Point3, Surface};
//! use nalgebra::Vector3;
//!
//! let donor = Surface::new(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.0),
//!         Point3::new(1.0, 1.0, 0.0),
//!         Point3::new(0.0, 1.0, 0.0),
//!     ],
//!     vec![[0, 1, 2], [0, 2, 3]],
//! )
//! .unwrap()
//! .with_field("Instron Strain", vec![0.0, 1.0, 2.0, 1.0])
//! .unwrap();
//!
//! let volume = extrude_surface(&donor, Vector3::z()).unwrap();
//! let probed = probe_volume(&volume, &donor).unwrap();
//! assert_eq!(probed.outside, 0);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]

mod bvh;
mod error;
mod extrude;
mod params;
mod probe;
pub mod wedge;

pub use bvh::{CellHit, CellLocator, DEFAULT_LEAF_SIZE};
pub use error::{VolumeError, VolumeResult};
pub use extrude::{extrude_surface, extrude_surface_with};
pub use params::{ExtrudeParams, ProbeParams, DEFAULT_EXTRUDE_LENGTH, DEFAULT_PROBE_FIELD};
pub use probe::{probe_volume, probe_volume_with, ProbeResult};
