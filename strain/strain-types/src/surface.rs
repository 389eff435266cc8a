//! Triangulated surface carrying named scalar fields.

use crate::{Aabb, ScalarField, TypesError, TypesResult};
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A triangulated point set with zero or more per-point scalar fields.
///
/// Fields are private so the two invariants always hold:
///
/// - every triangle index is a valid point index
/// - every field has exactly one value per point
///
/// All modifying operations consume or borrow `self` and return a new
/// surface; a surface handed to a pipeline stage is never changed.
///
/// # Example
///
/// ```
/// use strain_types::{Point3, Surface, TypesError};
///
/// let square = Surface::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(1.0, 1.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2], [0, 2, 3]],
/// )
/// .unwrap();
///
/// assert_eq!(square.triangle_count(), 2);
/// assert!(matches!(
///     square.field("strain"),
///     Err(TypesError::FieldNotFound { .. })
/// ));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Surface {
    points: Vec<Point3<f64>>,
    triangles: Vec<[u32; 3]>,
    fields: Vec<ScalarField>,
}

impl Surface {
    /// Create a surface with no scalar fields.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::TriangleIndexOutOfBounds`] if any triangle
    /// references a missing point.
    pub fn new(points: Vec<Point3<f64>>, triangles: Vec<[u32; 3]>) -> TypesResult<Self> {
        let point_count = points.len();
        for (triangle, tri) in triangles.iter().enumerate() {
            if let Some(&index) = tri.iter().find(|&&i| i as usize >= point_count) {
                return Err(TypesError::TriangleIndexOutOfBounds {
                    triangle,
                    index,
                    point_count,
                });
            }
        }
        Ok(Self {
            points,
            triangles,
            fields: Vec::new(),
        })
    }

    /// Attach a field, replacing any existing field with the same name.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::FieldLengthMismatch`] if `values` does not have
    /// one entry per point.
    pub fn with_field(mut self, name: impl Into<String>, values: Vec<f64>) -> TypesResult<Self> {
        let name = name.into();
        if values.len() != self.points.len() {
            return Err(TypesError::FieldLengthMismatch {
                name,
                expected: self.points.len(),
                got: values.len(),
            });
        }
        let field = ScalarField::new(name, values);
        match self.fields.iter_mut().find(|f| f.name() == field.name()) {
            Some(existing) => *existing = field,
            None => self.fields.push(field),
        }
        Ok(self)
    }

    /// Same topology and fields, with new point coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::PointCountMismatch`] if the point count changes.
    pub fn with_points(&self, points: Vec<Point3<f64>>) -> TypesResult<Self> {
        if points.len() != self.points.len() {
            return Err(TypesError::PointCountMismatch {
                expected: self.points.len(),
                got: points.len(),
            });
        }
        Ok(Self {
            points,
            triangles: self.triangles.clone(),
            fields: self.fields.clone(),
        })
    }

    /// Structural copy (points and triangles) with every field dropped.
    #[must_use]
    pub fn without_fields(&self) -> Self {
        Self {
            points: self.points.clone(),
            triangles: self.triangles.clone(),
            fields: Vec::new(),
        }
    }

    /// Point coordinates.
    #[inline]
    #[must_use]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Triangle connectivity.
    #[inline]
    #[must_use]
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// All scalar fields in insertion order.
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[ScalarField] {
        &self.fields
    }

    /// Number of points.
    #[inline]
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of triangles.
    #[inline]
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// True if the surface has no points.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Look up a field by name.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::FieldNotFound`] if no field has that name.
    pub fn field(&self, name: &str) -> TypesResult<&ScalarField> {
        self.fields
            .iter()
            .find(|f| f.name() == name)
            .ok_or_else(|| TypesError::FieldNotFound {
                name: name.to_string(),
            })
    }

    /// The only field on this surface.
    ///
    /// # Errors
    ///
    /// Returns [`TypesError::FieldNotFound`] if there are no fields and
    /// [`TypesError::AmbiguousField`] if there are several.
    pub fn single_field(&self) -> TypesResult<&ScalarField> {
        match self.fields.as_slice() {
            [only] => Ok(only),
            [] => Err(TypesError::FieldNotFound {
                name: String::from("<any>"),
            }),
            many => Err(TypesError::AmbiguousField { count: many.len() }),
        }
    }

    /// Resolve an optional field name: the named field, or the single field.
    ///
    /// # Errors
    ///
    /// As [`Surface::field`] or [`Surface::single_field`].
    pub fn field_or_single(&self, name: Option<&str>) -> TypesResult<&ScalarField> {
        match name {
            Some(name) => self.field(name),
            None => self.single_field(),
        }
    }

    /// Mean of all point coordinates, or `None` for an empty surface.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn centroid(&self) -> Option<Point3<f64>> {
        if self.points.is_empty() {
            return None;
        }
        let sum = self
            .points
            .iter()
            .fold(nalgebra::Vector3::zeros(), |acc, p| acc + p.coords);
        Some(Point3::from(sum / self.points.len() as f64))
    }

    /// Bounding box of all points.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.points)
    }
}
