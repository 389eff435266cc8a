//! Extrusion of a triangulated surface into a two-layer wedge volume.

use crate::{ExtrudeParams, VolumeError, VolumeResult};
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;
use strain_types::{ScalarField, Surface, WedgeVolume};
use tracing::info;

/// Extrudes `surface` along `direction` with the default length.
///
/// See [`extrude_surface_with`].
///
/// # Errors
///
/// As [`extrude_surface_with`].
pub fn extrude_surface(surface: &Surface, direction: Vector3<f64>) -> VolumeResult<WedgeVolume> {
    extrude_surface_with(surface, &ExtrudeParams::new(direction))
}

/// Builds a thin wedge volume around `surface`.
///
/// The direction is scaled to `params.length`, giving an offset `v`. The near
/// layer is every surface point moved by `-v`, the far layer every near point
/// moved by `+2v`, so the surface sits midway between them. Both layers carry
/// the source field value of their point. Each triangle `[a, b, c]` yields the
/// cell `[a, b, c, a + N, b + N, c + N]`.
///
/// # Errors
///
/// - [`VolumeError::InvalidDirection`] for a zero-length or non-finite direction
/// - [`VolumeError::InvalidParameter`] for a non-positive length
/// - [`VolumeError::Types`] if the field cannot be resolved
///
/// # Example
///
/// ```
/// use strain_volume::extrude_surface;
/// use strain_types::{Point3, Surface};
/// use nalgebra::Vector3;
///
/// let surface = Surface::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// )
/// .unwrap()
/// .with_field("strain", vec![1.0, 2.0, 3.0])
/// .unwrap();
///
/// let volume = extrude_surface(&surface, Vector3::new(0.0, 0.0, 2.0)).unwrap();
/// assert_eq!(volume.point_count(), 6);
/// assert_eq!(volume.cells()[0], [0, 1, 2, 3, 4, 5]);
/// assert_eq!(volume.points()[0].z, -5.0);
/// assert_eq!(volume.points()[3].z, 5.0);
/// ```
pub fn extrude_surface_with(
    surface: &Surface,
    params: &ExtrudeParams,
) -> VolumeResult<WedgeVolume> {
    let offset = extrusion_offset(params)?;
    let field = surface.field_or_single(params.field.as_deref())?;

    let near: Vec<Point3<f64>> = surface.points().par_iter().map(|p| p - offset).collect();
    let far: Vec<Point3<f64>> = near.par_iter().map(|p| p + 2.0 * offset).collect();

    let layer_size = surface.point_count();
    let mut points = near;
    points.extend(far);

    let mut values = Vec::with_capacity(2 * layer_size);
    values.extend_from_slice(field.values());
    values.extend_from_slice(field.values());

    #[allow(clippy::cast_possible_truncation)]
    let n = layer_size as u32;
    let cells: Vec<[u32; 6]> = surface
        .triangles()
        .iter()
        .map(|&[a, b, c]| [a, b, c, a + n, b + n, c + n])
        .collect();

    let volume = WedgeVolume::new(
        points,
        cells,
        ScalarField::new(field.name(), values),
        layer_size,
    )?;

    info!(
        points = volume.point_count(),
        cells = volume.cell_count(),
        field = field.name(),
        "surface extruded"
    );
    Ok(volume)
}

fn extrusion_offset(params: &ExtrudeParams) -> VolumeResult<Vector3<f64>> {
    let d = params.direction;
    let norm = d.norm();
    if !norm.is_finite() || norm == 0.0 {
        return Err(VolumeError::InvalidDirection {
            x: d.x,
            y: d.y,
            z: d.z,
        });
    }
    if !(params.length.is_finite() && params.length > 0.0) {
        return Err(VolumeError::InvalidParameter(format!(
            "extrusion length must be positive, got {}",
            params.length
        )));
    }
    Ok(d * (params.length / norm))
}
