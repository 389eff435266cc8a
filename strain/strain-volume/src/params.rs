//! Parameters for extrusion and probing.

use nalgebra::Vector3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default extrusion length, applied on each side of the surface.
pub const DEFAULT_EXTRUDE_LENGTH: f64 = 5.0;

/// Default name of the field written by probing.
pub const DEFAULT_PROBE_FIELD: &str = "Extracted Data";

/// Parameters for [`extrude_surface_with`](crate::extrude_surface_with).
///
/// # Example
///
/// ```
/// use strain_volume::ExtrudeParams;
/// use nalgebra::Vector3;
///
/// let params = ExtrudeParams::new(Vector3::new(0.0, 1.0, 0.0))
///     .with_length(2.5)
///     .with_field("Instron Strain");
/// assert_eq!(params.length, 2.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExtrudeParams {
    /// Extrusion direction; only its orientation matters (default: +Z).
    pub direction: Vector3<f64>,
    /// Offset of each layer from the surface (default: 5.0).
    pub length: f64,
    /// Field to carry into the volume. `None` uses the surface's only field.
    pub field: Option<String>,
}

impl Default for ExtrudeParams {
    fn default() -> Self {
        Self {
            direction: Vector3::z(),
            length: DEFAULT_EXTRUDE_LENGTH,
            field: None,
        }
    }
}

impl ExtrudeParams {
    /// Parameters for the given direction with default length.
    #[must_use]
    pub fn new(direction: Vector3<f64>) -> Self {
        Self {
            direction,
            ..Self::default()
        }
    }

    /// Sets the layer offset.
    #[must_use]
    pub const fn with_length(mut self, length: f64) -> Self {
        self.length = length;
        self
    }

    /// Selects the field to extrude by name.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// Parameters for [`probe_volume_with`](crate::probe_volume_with).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProbeParams {
    /// Name of the sampled field on the output surface.
    pub output_name: String,
}

impl Default for ProbeParams {
    fn default() -> Self {
        Self {
            output_name: DEFAULT_PROBE_FIELD.to_string(),
        }
    }
}

impl ProbeParams {
    /// Parameters with the default output name.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the output field name.
    #[must_use]
    pub fn with_output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = name.into();
        self
    }
}
