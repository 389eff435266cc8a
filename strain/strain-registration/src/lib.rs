//! Rigid alignment of a receiver surface onto a donor surface.
//!
//! The receiver is first placed by an [`InitialAlignment`] (identity,
//! explicit translate/rotate parameters, or three landmark pairs) and then
//! refined with rigid-body ICP against the donor's points.
//!
//! # Algorithms
//!
//! - **Kabsch** ([`compute_rigid_transform`]): closed-form least-squares rigid
//!   fit for paired points, used for landmarks and every ICP step
//! - **ICP** ([`icp_align_points`]): nearest-point correspondence search on a
//!   KD-tree, parallelised with rayon
//!
//! # Example
//!
//! ```
//! use strain_registration::{align_surfaces, AlignParams, InitialAlignment};
//! use strain_types::{Point3, Surface, Vector3};
//!
//! let donor = Surface::new(
//!     vec![
//!         Point3::new(0.0, 0.0, 0.0),
//!         Point3::new(1.0, 0.0, 0.1),
//!         Point3::new(0.0, 1.0, 0.2),
//!         Point3::new(1.0, 1.0, 0.4),
//!     ],
//!     vec![[0, 1, 2], [1, 3, 2]],
//! )
//! .unwrap();
//! let receiver = donor
//!     .with_points(donor.points().iter().map(|p| p + Vector3::new(10.0, 0.0, 0.0)).collect())
//!     .unwrap();
//!
//! let params = AlignParams::new().with_initial(InitialAlignment::Parameters {
//!     translation: Vector3::new(-10.0, 0.0, 0.0),
//!     rotation_degrees: [0.0, 0.0, 0.0],
//! });
//! let result = align_surfaces(&receiver, &donor, &params).unwrap();
//! assert!(result.rms_error < 1e-9);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
#![allow(clippy::module_name_repetitions)]

mod align;
mod error;
mod icp;
mod kabsch;
mod landmark;
mod transform;

pub use align::{align_surfaces, AlignParams, AlignmentResult, InitialAlignment};
pub use error::{RegistrationError, RegistrationResult};
pub use icp::{icp_align_points, IcpParams, IcpResult};
pub use kabsch::compute_rigid_transform;
pub use landmark::{align_landmarks, LandmarkPairs};
pub use transform::RigidTransform;
