//! Wedge (triangular prism) volume mesh.

use crate::{Aabb, ScalarField, TypesError, TypesResult};
use nalgebra::Point3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A two-layer volume of wedge cells with one scalar field.
///
/// Points `0..N` form the near layer and `N..2N` the far layer, where `N` is
/// [`layer_size`](Self::layer_size). Each cell is
/// `[a, b, c, a + N, b + N, c + N]` for a source triangle `[a, b, c]`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct WedgeVolume {
    points: Vec<Point3<f64>>,
    cells: Vec<[u32; 6]>,
    field: ScalarField,
    layer_size: usize,
}

impl WedgeVolume {
    /// Create a volume, validating point count, cell indices and field length.
    ///
    /// # Errors
    ///
    /// - [`TypesError::PointCountMismatch`] if `points.len() != 2 * layer_size`
    /// - [`TypesError::CellIndexOutOfBounds`] for an invalid cell index
    /// - [`TypesError::FieldLengthMismatch`] if the field is the wrong length
    pub fn new(
        points: Vec<Point3<f64>>,
        cells: Vec<[u32; 6]>,
        field: ScalarField,
        layer_size: usize,
    ) -> TypesResult<Self> {
        let point_count = points.len();
        if point_count != 2 * layer_size {
            return Err(TypesError::PointCountMismatch {
                expected: 2 * layer_size,
                got: point_count,
            });
        }
        for (cell, ids) in cells.iter().enumerate() {
            if let Some(&index) = ids.iter().find(|&&i| i as usize >= point_count) {
                return Err(TypesError::CellIndexOutOfBounds {
                    cell,
                    index,
                    point_count,
                });
            }
        }
        if field.len() != point_count {
            return Err(TypesError::FieldLengthMismatch {
                name: field.name().to_string(),
                expected: point_count,
                got: field.len(),
            });
        }
        Ok(Self {
            points,
            cells,
            field,
            layer_size,
        })
    }

    /// All points, near layer first.
    #[inline]
    #[must_use]
    pub fn points(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Wedge connectivity.
    #[inline]
    #[must_use]
    pub fn cells(&self) -> &[[u32; 6]] {
        &self.cells
    }

    /// The scalar field carried by the volume.
    #[inline]
    #[must_use]
    pub fn field(&self) -> &ScalarField {
        &self.field
    }

    /// Number of points per layer (`N`).
    #[inline]
    #[must_use]
    pub fn layer_size(&self) -> usize {
        self.layer_size
    }

    /// Total number of points (`2N`).
    #[inline]
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.len()
    }

    /// Number of wedge cells.
    #[inline]
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// The six vertex positions of a cell in local order.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is out of range.
    #[must_use]
    pub fn cell_vertices(&self, cell: usize) -> [Point3<f64>; 6] {
        self.cells[cell].map(|i| self.points[i as usize])
    }

    /// The six field values of a cell in local order.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is out of range.
    #[must_use]
    pub fn cell_values(&self, cell: usize) -> [f64; 6] {
        let values = self.field.values();
        self.cells[cell].map(|i| values[i as usize])
    }

    /// Bounding box of a cell.
    ///
    /// # Panics
    ///
    /// Panics if `cell` is out of range.
    #[must_use]
    pub fn cell_bounds(&self, cell: usize) -> Aabb {
        Aabb::from_points(&self.cell_vertices(cell))
    }

    /// Bounding box of the whole volume.
    #[must_use]
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.points)
    }
}
