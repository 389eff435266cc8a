//! Receiver/donor differencing and overlap filtering.

use crate::{CompileError, CompileParams, CompileResult};
use nalgebra::Point3;
use std::fmt;
use strain_types::{is_valid_value, Surface, SENTINEL};
use tracing::{debug, info};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// One surviving point of a compiled surface, ready for tabular export.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CompiledRow {
    /// Index in the compiled surface.
    pub index: usize,
    /// Index of the same point in the receiver surface.
    pub source_index: usize,
    /// Receiver value.
    pub receiver: f64,
    /// Donor value.
    pub donor: f64,
    /// `donor - receiver`.
    pub delta: f64,
    /// Point position.
    pub position: Point3<f64>,
}

/// Receiver geometry restricted to the valid overlap, with receiver, donor
/// and delta fields in that order.
///
/// Only built by [`compile_data`], so it serializes but does not
/// deserialize.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct CompiledSurface {
    surface: Surface,
    source_indices: Vec<usize>,
    source_point_count: usize,
    source_triangle_count: usize,
}

impl CompiledSurface {
    /// The filtered surface carrying the three output fields.
    #[must_use]
    pub const fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Consumes the result, returning the surface.
    #[must_use]
    pub fn into_surface(self) -> Surface {
        self.surface
    }

    fn values(&self, slot: usize) -> &[f64] {
        self.surface
            .fields()
            .get(slot)
            .map_or(&[], |f| f.values())
    }

    /// Receiver values, one per surviving point.
    #[must_use]
    pub fn receiver_values(&self) -> &[f64] {
        self.values(0)
    }

    /// Donor values, one per surviving point.
    #[must_use]
    pub fn donor_values(&self) -> &[f64] {
        self.values(1)
    }

    /// Delta values, one per surviving point.
    #[must_use]
    pub fn delta_values(&self) -> &[f64] {
        self.values(2)
    }

    /// Output field names: receiver, donor, delta.
    #[must_use]
    pub fn field_names(&self) -> [&str; 3] {
        let name = |slot: usize| self.surface.fields().get(slot).map_or("", |f| f.name());
        [name(0), name(1), name(2)]
    }

    /// Receiver index of compiled point `index`.
    #[must_use]
    pub fn source_index(&self, index: usize) -> Option<usize> {
        self.source_indices.get(index).copied()
    }

    /// Number of surviving points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.surface.point_count()
    }

    /// Points removed by the filter.
    #[must_use]
    pub fn discarded_points(&self) -> usize {
        self.source_point_count - self.surface.point_count()
    }

    /// Triangles removed by the filter.
    #[must_use]
    pub fn discarded_triangles(&self) -> usize {
        self.source_triangle_count - self.surface.triangle_count()
    }

    /// Row-per-point view in compiled order.
    pub fn rows(&self) -> impl Iterator<Item = CompiledRow> + '_ {
        let receiver = self.receiver_values();
        let donor = self.donor_values();
        let delta = self.delta_values();
        self.surface
            .points()
            .iter()
            .enumerate()
            .map(move |(index, position)| CompiledRow {
                index,
                source_index: self.source_indices[index],
                receiver: receiver[index],
                donor: donor[index],
                delta: delta[index],
                position: *position,
            })
    }
}

impl fmt::Display for CompiledSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "kept {} of {} points and {} of {} triangles",
            self.surface.point_count(),
            self.source_point_count,
            self.surface.triangle_count(),
            self.source_triangle_count
        )
    }
}

/// Per-point difference `donor - receiver`.
///
/// Where the receiver value is invalid (at or below the validity threshold),
/// the delta is [`SENTINEL`], so missing receiver data is never turned into
/// a spurious number. A sentinel donor value is subtracted as-is; the result
/// lands far below the threshold and is removed by the filter.
///
/// # Example
///
/// ```
/// use strain_compile::compute_delta;
/// use strain_types::SENTINEL;
///
/// let delta = compute_delta(&[1.0, SENTINEL, 0.5, -999_995.0], &[3.0, 2.0, SENTINEL, 2.0]);
/// assert_eq!(delta[0], 2.0);
/// assert_eq!(delta[1], SENTINEL);
/// assert_eq!(delta[2], SENTINEL - 0.5);
/// assert_eq!(delta[3], SENTINEL);
/// ```
#[must_use]
pub fn compute_delta(receiver: &[f64], donor: &[f64]) -> Vec<f64> {
    receiver
        .iter()
        .zip(donor)
        .map(|(&r, &d)| if is_valid_value(r) { d - r } else { SENTINEL })
        .collect()
}

/// Combines a receiver surface and a point-aligned donor surface.
///
/// The output carries the receiver's geometry with three fields (receiver,
/// donor, delta), restricted to the valid overlap: a triangle survives only
/// if all three of its points have a valid delta, and a point survives only
/// if a surviving triangle references it. Surviving points keep their
/// relative order and are renumbered compactly.
///
/// # Errors
///
/// - [`CompileError::InvalidParameter`] for empty or repeated output names
/// - [`CompileError::PointCountMismatch`] / [`CompileError::TopologyMismatch`]
///   if the surfaces do not correspond point for point
/// - [`CompileError::Types`] if an input field cannot be resolved
///
/// # Example
///
/// ```
/// use strain_compile::{compile_data, CompileParams};
/// use strain_types::{Point3, Surface, SENTINEL};
///
/// let geometry = Surface::new(
///     vec![
///         Point3::new(0.0, 0.0, 0.0),
///         Point3::new(1.0, 0.0, 0.0),
///         Point3::new(1.0, 1.0, 0.0),
///         Point3::new(0.0, 1.0, 0.0),
///     ],
///     vec![[0, 1, 2], [0, 2, 3]],
/// )
/// .unwrap();
/// let receiver = geometry.clone().with_field("strain", vec![1.0; 4]).unwrap();
/// let donor = geometry
///     .with_field("Extracted Data", vec![2.0, 2.0, 2.0, SENTINEL])
///     .unwrap();
///
/// let compiled = compile_data(&receiver, &donor, &CompileParams::default()).unwrap();
/// assert_eq!(compiled.surface().triangle_count(), 1);
/// assert_eq!(compiled.delta_values(), &[1.0, 1.0, 1.0]);
/// ```
pub fn compile_data(
    receiver: &Surface,
    donor: &Surface,
    params: &CompileParams,
) -> CompileResult<CompiledSurface> {
    params.validate()?;
    check_correspondence(receiver, donor)?;

    let receiver_values = receiver
        .field_or_single(params.receiver_field.as_deref())?
        .values();
    let donor_values = donor.field_or_single(params.donor_field.as_deref())?.values();
    let delta = compute_delta(receiver_values, donor_values);

    // Triangle survives iff all three points pass
    let kept_triangles: Vec<[u32; 3]> = receiver
        .triangles()
        .iter()
        .copied()
        .filter(|tri| tri.iter().all(|&i| is_valid_value(delta[i as usize])))
        .collect();

    let mut referenced = vec![false; receiver.point_count()];
    for tri in &kept_triangles {
        for &i in tri {
            referenced[i as usize] = true;
        }
    }

    let mut remap = vec![u32::MAX; receiver.point_count()];
    let mut source_indices = Vec::new();
    for (old, &used) in referenced.iter().enumerate() {
        if used {
            #[allow(clippy::cast_possible_truncation)]
            let new = source_indices.len() as u32;
            remap[old] = new;
            source_indices.push(old);
        }
    }

    let pick = |values: &[f64]| -> Vec<f64> { source_indices.iter().map(|&i| values[i]).collect() };
    let points = source_indices.iter().map(|&i| receiver.points()[i]).collect();
    let triangles = kept_triangles
        .iter()
        .map(|tri| tri.map(|i| remap[i as usize]))
        .collect();

    let surface = Surface::new(points, triangles)?
        .with_field(params.receiver_name.clone(), pick(receiver_values))?
        .with_field(params.donor_name.clone(), pick(donor_values))?
        .with_field(params.delta_name.clone(), pick(&delta))?;

    let compiled = CompiledSurface {
        surface,
        source_indices,
        source_point_count: receiver.point_count(),
        source_triangle_count: receiver.triangle_count(),
    };

    debug!(
        sentinel_receiver = receiver_values.iter().filter(|v| !is_valid_value(**v)).count(),
        sentinel_donor = donor_values.iter().filter(|v| !is_valid_value(**v)).count(),
        "invalid input values"
    );
    info!(
        kept_points = compiled.point_count(),
        discarded_points = compiled.discarded_points(),
        discarded_triangles = compiled.discarded_triangles(),
        "data compiled"
    );
    Ok(compiled)
}

fn check_correspondence(receiver: &Surface, donor: &Surface) -> CompileResult<()> {
    if receiver.point_count() != donor.point_count() {
        return Err(CompileError::PointCountMismatch {
            receiver: receiver.point_count(),
            donor: donor.point_count(),
        });
    }
    let (rt, dt) = (receiver.triangles(), donor.triangles());
    if let Some(triangle) = rt.iter().zip(dt).position(|(a, b)| a != b) {
        return Err(CompileError::TopologyMismatch { triangle });
    }
    if rt.len() != dt.len() {
        return Err(CompileError::TopologyMismatch {
            triangle: rt.len().min(dt.len()),
        });
    }
    Ok(())
}
