//! Bounding volume hierarchy over wedge cells.
//!
//! Nodes live in one flat arena. Each leaf addresses a contiguous range of a
//! permuted cell-id array, so a query touches two vectors and no pointers.
//! The hierarchy is built once and queried read-only, so it can be shared
//! across threads.

use crate::wedge::{self, WedgeHit};
use rayon::prelude::*;
use smallvec::SmallVec;
use strain_types::{Aabb, Point3, WedgeVolume};

/// Default maximum number of cells per leaf.
pub const DEFAULT_LEAF_SIZE: usize = 8;

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    /// Range `start..end` into `cell_ids`.
    Leaf { start: u32, end: u32 },
    /// Arena indices of the two children.
    Internal { left: u32, right: u32 },
}

#[derive(Debug, Clone)]
struct Node {
    bounds: Aabb,
    kind: NodeKind,
}

/// A successful cell lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellHit {
    /// Index of the containing cell.
    pub cell: usize,
    /// Location within that cell.
    pub hit: WedgeHit,
}

/// Finds the wedge cell containing a point.
///
/// When several cells contain a point (shared faces and edges), the one with
/// the lowest index is returned.
///
/// # Example
///
/// ```
/// use strain_volume::{extrude_surface, CellLocator};
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
/// .with_field("strain", vec![0.0; 3])
/// .unwrap();
/// let volume = extrude_surface(&surface, Vector3::z()).unwrap();
///
/// let locator = CellLocator::build(&volume);
/// assert_eq!(locator.find_cell(&Point3::new(0.2, 0.2, 1.0)).map(|h| h.cell), Some(0));
/// assert!(locator.find_cell(&Point3::new(0.2, 0.2, 6.0)).is_none());
/// ```
#[derive(Debug)]
pub struct CellLocator<'a> {
    volume: &'a WedgeVolume,
    nodes: Vec<Node>,
    cell_ids: Vec<u32>,
    cell_bounds: Vec<Aabb>,
}

impl<'a> CellLocator<'a> {
    /// Builds a locator with the default leaf size.
    #[must_use]
    pub fn build(volume: &'a WedgeVolume) -> Self {
        Self::build_with_leaf_size(volume, DEFAULT_LEAF_SIZE)
    }

    /// Builds a locator with at most `leaf_size` cells per leaf.
    #[must_use]
    pub fn build_with_leaf_size(volume: &'a WedgeVolume, leaf_size: usize) -> Self {
        // Pad boxes so points accepted by the parametric tolerance are found
        let cell_bounds: Vec<Aabb> = (0..volume.cell_count())
            .into_par_iter()
            .map(|cell| {
                let bounds = volume.cell_bounds(cell);
                bounds.padded(wedge::PARAMETRIC_TOLERANCE * bounds.size().norm())
            })
            .collect();

        #[allow(clippy::cast_possible_truncation)]
        let mut cell_ids: Vec<u32> = (0..cell_bounds.len() as u32).collect();
        let mut nodes = Vec::new();
        if !cell_ids.is_empty() {
            build_node(
                &mut nodes,
                &cell_bounds,
                &mut cell_ids,
                0,
                leaf_size.max(1),
            );
        }

        Self {
            volume,
            nodes,
            cell_ids,
            cell_bounds,
        }
    }

    /// The volume this locator indexes.
    #[must_use]
    pub const fn volume(&self) -> &'a WedgeVolume {
        self.volume
    }

    /// Number of arena nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Cells whose padded bounding box contains `point`, in ascending order.
    #[must_use]
    pub fn candidates(&self, point: &Point3<f64>) -> SmallVec<[u32; 16]> {
        let mut found: SmallVec<[u32; 16]> = SmallVec::new();
        if self.nodes.is_empty() {
            return found;
        }

        let mut stack: SmallVec<[u32; 32]> = SmallVec::new();
        stack.push(0);
        while let Some(index) = stack.pop() {
            let node = &self.nodes[index as usize];
            if !node.bounds.contains(point, 0.0) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { start, end } => {
                    found.extend(
                        self.cell_ids[start as usize..end as usize]
                            .iter()
                            .copied()
                            .filter(|&c| self.cell_bounds[c as usize].contains(point, 0.0)),
                    );
                }
                NodeKind::Internal { left, right } => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        found.sort_unstable();
        found
    }

    /// Finds the lowest-index cell containing `point`.
    #[must_use]
    pub fn find_cell(&self, point: &Point3<f64>) -> Option<CellHit> {
        self.candidates(point).into_iter().find_map(|cell| {
            let cell = cell as usize;
            wedge::locate(&self.volume.cell_vertices(cell), point).map(|hit| CellHit { cell, hit })
        })
    }
}

/// Builds the subtree over `ids` (located at `offset` in the full id array)
/// and returns its arena index.
fn build_node(
    nodes: &mut Vec<Node>,
    cell_bounds: &[Aabb],
    ids: &mut [u32],
    offset: usize,
    leaf_size: usize,
) -> u32 {
    let bounds = ids
        .iter()
        .fold(Aabb::empty(), |acc, &c| acc.merge(&cell_bounds[c as usize]));

    #[allow(clippy::cast_possible_truncation)]
    let index = nodes.len() as u32;

    if ids.len() <= leaf_size {
        #[allow(clippy::cast_possible_truncation)]
        nodes.push(Node {
            bounds,
            kind: NodeKind::Leaf {
                start: offset as u32,
                end: (offset + ids.len()) as u32,
            },
        });
        return index;
    }

    // Median split on the longest axis of the centroid spread
    let centers = Aabb::from_points(
        &ids.iter()
            .map(|&c| cell_bounds[c as usize].center())
            .collect::<Vec<_>>(),
    );
    let axis = centers.longest_axis();
    let mid = ids.len() / 2;
    ids.select_nth_unstable_by(mid, |&a, &b| {
        let ca = cell_bounds[a as usize].center()[axis];
        let cb = cell_bounds[b as usize].center()[axis];
        ca.total_cmp(&cb)
    });

    // Placeholder, patched once both children exist
    nodes.push(Node {
        bounds,
        kind: NodeKind::Internal { left: 0, right: 0 },
    });

    let (left_ids, right_ids) = ids.split_at_mut(mid);
    let left = build_node(nodes, cell_bounds, left_ids, offset, leaf_size);
    let right = build_node(nodes, cell_bounds, right_ids, offset + mid, leaf_size);
    nodes[index as usize].kind = NodeKind::Internal { left, right };
    index
}
