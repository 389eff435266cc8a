//! Named per-point scalar data.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A named sequence of scalar values, one per point.
///
/// Length is checked by the owning [`Surface`](crate::Surface) or
/// [`WedgeVolume`](crate::WedgeVolume), not by the field itself.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ScalarField {
    name: String,
    values: Vec<f64>,
}

impl ScalarField {
    /// Create a field.
    #[must_use]
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    /// Field name.
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Values, index-aligned to points.
    #[inline]
    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of values.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True if the field holds no values.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Same values under another name.
    #[must_use]
    pub fn renamed(&self, name: impl Into<String>) -> Self {
        Self::new(name, self.values.clone())
    }

    /// Consume the field, returning its values.
    #[must_use]
    pub fn into_values(self) -> Vec<f64> {
        self.values
    }
}
