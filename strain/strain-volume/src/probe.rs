//! Sampling a wedge volume's field at the points of a query surface.

use crate::{CellLocator, ProbeParams, VolumeError, VolumeResult};
use rayon::prelude::*;
use std::fmt;
use strain_types::{Surface, WedgeVolume, SENTINEL};
use tracing::{info, warn};

/// Fraction of missed points above which a warning is logged.
const MISS_WARNING_FRACTION: f64 = 0.5;

/// Outcome of probing.
#[derive(Debug, Clone)]
pub struct ProbeResult {
    /// Query geometry with a single field of sampled values.
    pub surface: Surface,
    /// Points that fell inside a cell.
    pub located: usize,
    /// Points outside every cell, written as [`SENTINEL`].
    pub outside: usize,
}

impl fmt::Display for ProbeResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "probed {} points: {} located, {} outside",
            self.located + self.outside,
            self.located,
            self.outside
        )
    }
}

/// Probes with default parameters (output field "Extracted Data").
///
/// # Errors
///
/// As [`probe_volume_with`].
pub fn probe_volume(volume: &WedgeVolume, query: &Surface) -> VolumeResult<ProbeResult> {
    probe_volume_with(volume, query, &ProbeParams::default())
}

/// Samples `volume` at every point of `query`.
///
/// For each point the containing cell is found and its six vertex values are
/// blended with the wedge shape-function weights. Points in no cell receive
/// [`SENTINEL`]. The output is a structural copy of `query` whose only field
/// is the sampled data; the query's own fields are dropped.
///
/// # Errors
///
/// Returns [`VolumeError::InvalidParameter`] for an empty output name.
///
/// # Example
///
/// ```
/// use strain_volume::{extrude_surface, probe_volume};
/// use strain_types::{Point3, Surface, SENTINEL};
/// use nalgebra::Vector3;
///
/// let donor = Surface::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2]],
/// )
/// .unwrap()
/// .with_field("strain", vec![2.0, 2.0, 2.0])
/// .unwrap();
/// let volume = extrude_surface(&donor, Vector3::z()).unwrap();
///
/// let query = Surface::new(
///     vec![Point3::new(0.2, 0.2, 0.3), Point3::new(5.0, 5.0, 0.0)],
///     vec![],
/// )
/// .unwrap();
/// let result = probe_volume(&volume, &query).unwrap();
///
/// let values = result.surface.field("Extracted Data").unwrap().values();
/// assert!((values[0] - 2.0).abs() < 1e-12);
/// assert_eq!(values[1], SENTINEL);
/// ```
pub fn probe_volume_with(
    volume: &WedgeVolume,
    query: &Surface,
    params: &ProbeParams,
) -> VolumeResult<ProbeResult> {
    if params.output_name.is_empty() {
        return Err(VolumeError::InvalidParameter(
            "probe output name must not be empty".to_string(),
        ));
    }

    let locator = CellLocator::build(volume);

    // Indexed collect: one slot per query point, filled independently
    let samples: Vec<Option<f64>> = query
        .points()
        .par_iter()
        .map(|point| {
            locator
                .find_cell(point)
                .map(|found| found.hit.interpolate(&volume.cell_values(found.cell)))
        })
        .collect();

    let located = samples.iter().filter(|s| s.is_some()).count();
    let outside = samples.len() - located;
    let values: Vec<f64> = samples.into_iter().map(|s| s.unwrap_or(SENTINEL)).collect();

    let surface = query
        .without_fields()
        .with_field(params.output_name.clone(), values)?;

    #[allow(clippy::cast_precision_loss)]
    let miss_fraction = if surface.is_empty() {
        0.0
    } else {
        outside as f64 / surface.point_count() as f64
    };
    if miss_fraction > MISS_WARNING_FRACTION {
        warn!(
            outside,
            total = surface.point_count(),
            "most query points fall outside the volume; check the alignment"
        );
    }
    info!(
        located,
        outside,
        cells = volume.cell_count(),
        nodes = locator.node_count(),
        "volume probed"
    );

    Ok(ProbeResult {
        surface,
        located,
        outside,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::extrude_surface;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;
    use strain_types::Point3;

    fn plate(n: u32, spacing: f64) -> Surface {
        let mut points = Vec::new();
        for j in 0..=n {
            for i in 0..=n {
                let (x, y) = (f64::from(i) * spacing, f64::from(j) * spacing);
                points.push(Point3::new(x, y, 0.02 * x * y));
            }
        }
        let row = n + 1;
        let mut triangles = Vec::new();
        for j in 0..n {
            for i in 0..n {
                let a = j * row + i;
                triangles.push([a, a + 1, a + row + 1]);
                triangles.push([a, a + row + 1, a + row]);
            }
        }
        let values = points.iter().map(|p| 3.0 * p.x - p.y + 0.5).collect();
        Surface::new(points, triangles)
            .unwrap()
            .with_field("Instron Strain", values)
            .unwrap()
    }

    #[test]
    fn test_probe_at_defining_points_reproduces_values() {
        let donor = plate(6, 0.5);
        let volume = extrude_surface(&donor, Vector3::z()).unwrap();
        let result = probe_volume(&volume, &donor).unwrap();

        assert_eq!(result.outside, 0);
        assert_eq!(result.located, donor.point_count());
        let sampled = result.surface.field("Extracted Data").unwrap().values();
        let original = donor.field("Instron Strain").unwrap().values();
        for (s, o) in sampled.iter().zip(original) {
            assert_relative_eq!(*s, *o, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_linear_field_interpolated_exactly() {
        // A field linear in x and y is reproduced inside each flat-based wedge
        let donor = plate(4, 1.0);
        let flat = donor
            .with_points(donor.points().iter().map(|p| Point3::new(p.x, p.y, 0.0)).collect())
            .unwrap();
        let volume = extrude_surface(&flat, Vector3::z()).unwrap();

        let query = Surface::new(
            vec![Point3::new(0.25, 0.6, 0.0), Point3::new(2.7, 3.1, -2.0)],
            vec![],
        )
        .unwrap();
        let values = probe_volume(&volume, &query).unwrap().surface;
        let values = values.single_field().unwrap().values();
        assert_relative_eq!(values[0], 3.0 * 0.25 - 0.6 + 0.5, epsilon = 1e-9);
        assert_relative_eq!(values[1], 3.0 * 2.7 - 3.1 + 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_outside_points_get_sentinel() {
        let donor = plate(3, 1.0);
        let volume = extrude_surface(&donor, Vector3::z()).unwrap();
        let query = Surface::new(
            vec![
                Point3::new(100.0, 100.0, 100.0),
                Point3::new(1.5, 1.5, 6.0),
                Point3::new(-0.5, 1.0, 0.0),
            ],
            vec![],
        )
        .unwrap();

        let result = probe_volume(&volume, &query).unwrap();
        assert_eq!(result.outside, 3);
        assert!(result
            .surface
            .single_field()
            .unwrap()
            .values()
            .iter()
            .all(|&v| v == SENTINEL));
    }

    #[test]
    fn test_query_fields_replaced() {
        let donor = plate(2, 1.0);
        let volume = extrude_surface(&donor, Vector3::z()).unwrap();
        let query = donor.with_field("stale", vec![0.0; 9]).unwrap();

        let params = ProbeParams::new().with_output_name("donor");
        let result = probe_volume_with(&volume, &query, &params).unwrap();
        assert_eq!(result.surface.fields().len(), 1);
        assert_eq!(result.surface.fields()[0].name(), "donor");
        assert_eq!(result.surface.triangles(), query.triangles());
        assert_eq!(result.surface.points(), query.points());
    }

    #[test]
    fn test_empty_output_name_rejected() {
        let donor = plate(1, 1.0);
        let volume = extrude_surface(&donor, Vector3::z()).unwrap();
        let params = ProbeParams::new().with_output_name("");
        assert!(matches!(
            probe_volume_with(&volume, &donor, &params),
            Err(VolumeError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_display() {
        let donor = plate(1, 1.0);
        let volume = extrude_surface(&donor, Vector3::z()).unwrap();
        let result = probe_volume(&volume, &donor).unwrap();
        assert_eq!(result.to_string(), "probed 4 points: 4 located, 0 outside");
    }
}
